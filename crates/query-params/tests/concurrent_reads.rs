//! Concurrent access to a shared CSV query parameter provider.

use reqparams_query_params::{
    CsvQueryParamProvider, ParameterSet, ProviderError, QueryParamProvider,
};
use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::NamedTempFile;

fn write_params_csv(rows: usize) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "user,id").unwrap();
    for i in 0..rows {
        writeln!(temp_file, "user{i},{i}").unwrap();
    }
    temp_file.flush().unwrap();
    temp_file
}

fn shared_provider(file: &NamedTempFile) -> Arc<dyn QueryParamProvider> {
    CsvQueryParamProvider::init(file.path())
        .unwrap()
        .into_shared()
        .unwrap()
}

#[test]
fn test_concurrent_callers_get_distinct_rows() {
    const ROWS: usize = 2000;
    const WORKERS: usize = 8;

    let file = write_params_csv(ROWS);
    let provider = shared_provider(&file);
    let barrier = Arc::new(Barrier::new(WORKERS));

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let provider = Arc::clone(&provider);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut ids = Vec::new();
                loop {
                    match provider.parameters(ParameterSet::new()) {
                        Ok(params) => {
                            let id: usize = params.get("id").unwrap().parse().unwrap();
                            assert_eq!(params.get("user"), Some(format!("user{id}").as_str()));
                            ids.push(id);
                        }
                        Err(err) => {
                            assert!(err.is_exhausted(), "unexpected error: {err}");
                            break;
                        }
                    }
                }
                ids
            })
        })
        .collect();

    let mut seen = HashSet::new();
    let mut total = 0;
    for handle in handles {
        let ids = handle.join().unwrap();
        // Each worker observes rows in file order.
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        total += ids.len();
        seen.extend(ids);
    }

    assert_eq!(total, ROWS, "no row may be delivered twice");
    assert_eq!(seen, (0..ROWS).collect::<HashSet<_>>(), "no row may be skipped");
}

#[test]
fn test_malformed_rows_do_not_deadlock_other_callers() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "user,id").unwrap();
    for i in 0..200 {
        if i % 3 == 0 {
            writeln!(temp_file, "broken{i}").unwrap();
        } else {
            writeln!(temp_file, "user{i},{i}").unwrap();
        }
    }
    temp_file.flush().unwrap();

    let provider = shared_provider(&temp_file);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let provider = Arc::clone(&provider);
            thread::spawn(move || {
                let (mut ok, mut malformed) = (0, 0);
                loop {
                    match provider.parameters(ParameterSet::new()) {
                        Ok(_) => ok += 1,
                        Err(ProviderError::MalformedRecord { values, .. }) => {
                            assert_eq!(values.len(), 1);
                            assert!(values[0].starts_with("broken"));
                            malformed += 1;
                        }
                        Err(err) => {
                            assert!(err.is_exhausted(), "unexpected error: {err}");
                            break;
                        }
                    }
                }
                (ok, malformed)
            })
        })
        .collect();

    let (ok, malformed) = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .fold((0, 0), |acc, (ok, malformed)| (acc.0 + ok, acc.1 + malformed));

    assert_eq!(malformed, 67);
    assert_eq!(ok, 133);
}

#[test]
fn test_close_while_callers_are_reading() {
    let file = write_params_csv(10_000);
    let provider = shared_provider(&file);

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let provider = Arc::clone(&provider);
            thread::spawn(move || loop {
                match provider.parameters(ParameterSet::new()) {
                    Ok(_) => continue,
                    Err(ProviderError::Closed) => return true,
                    Err(err) if err.is_exhausted() => return false,
                    Err(err) => panic!("unexpected error: {err}"),
                }
            })
        })
        .collect();

    provider.close();

    for reader in readers {
        // Each reader stops cleanly, either on close or on reaching the end first.
        reader.join().unwrap();
    }

    assert!(matches!(
        provider.parameters(ParameterSet::new()),
        Err(ProviderError::Closed)
    ));
}
