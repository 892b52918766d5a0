//! Query parameter provider abstraction

use crate::error::ProviderError;
use crate::params::ParameterSet;
use std::sync::Arc;

/// Produces the dynamic query parameters for each outgoing request.
///
/// Implementations are shared between every request-issuing worker, so they
/// must tolerate concurrent calls to [`parameters`](Self::parameters).
pub trait QueryParamProvider: Send + Sync {
    /// Append this request's parameters to `params` and return the result.
    ///
    /// Entries already present in `params` are kept unchanged and stay in
    /// front of the appended ones.
    fn parameters(&self, params: ParameterSet) -> Result<ParameterSet, ProviderError>;

    /// Release any resources held by the provider.
    ///
    /// Calls to [`parameters`](Self::parameters) made afterwards fail with
    /// [`ProviderError::Closed`]. Closing twice has no further effect.
    fn close(&self);
}

/// Outcome of constructing a provider from configuration.
///
/// Keeps "not configured" apart from "configuration failed", which is
/// reported through the surrounding `Result`.
#[derive(Debug)]
pub enum ProviderInit<P> {
    /// No parameter source was configured.
    Disabled,
    /// A provider is ready for use.
    Enabled(P),
}

impl<P> ProviderInit<P> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ProviderInit::Enabled(_))
    }

    pub fn into_option(self) -> Option<P> {
        match self {
            ProviderInit::Disabled => None,
            ProviderInit::Enabled(provider) => Some(provider),
        }
    }
}

impl<P: QueryParamProvider + 'static> ProviderInit<P> {
    /// Convert into a provider handle that can be cloned across workers.
    pub fn into_shared(self) -> Option<Arc<dyn QueryParamProvider>> {
        self.into_option()
            .map(|provider| Arc::new(provider) as Arc<dyn QueryParamProvider>)
    }
}
