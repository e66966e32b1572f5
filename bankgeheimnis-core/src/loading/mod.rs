//! Loading of region boundaries and map features from external sources.
//!
//! Both sources are plain HTTP APIs; requests run synchronously with a
//! timeout and a bounded retry, since those calls are the only transient
//! failure points of a run.

mod config;
pub mod nominatim;
pub mod overpass;

use std::time::Duration;

pub use config::PipelineConfig;

use crate::{Error, Result};

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .user_agent(concat!("bankgeheimnis/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

/// Runs `call` up to `attempts` times, backing off exponentially between
/// network failures. Non-network errors are never retried.
pub(crate) fn with_retry<T>(
    what: &str,
    attempts: u32,
    mut call: impl FnMut() -> Result<T>,
) -> Result<T> {
    let attempts = attempts.max(1);
    let mut delay = Duration::from_secs(1);
    let mut last = None;
    for attempt in 1..=attempts {
        match call() {
            Ok(value) => return Ok(value),
            Err(Error::Network(err)) => {
                log::warn!("{what}: attempt {attempt}/{attempts} failed: {err}");
                last = Some(Error::Network(err));
                if attempt < attempts {
                    std::thread::sleep(delay);
                    delay *= 2;
                }
            }
            Err(other) => return Err(other),
        }
    }
    Err(last.unwrap_or_else(|| Error::InvalidData(format!("{what}: no attempts made"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_retry_returns_first_success() {
        let mut calls = 0;
        let result: Result<u32> = with_retry("test", 3, || {
            calls += 1;
            Ok(7)
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn with_retry_does_not_retry_fatal_errors() {
        let mut calls = 0;
        let result: Result<u32> = with_retry("test", 3, || {
            calls += 1;
            Err(Error::Extraction("broken payload".to_string()))
        });
        assert!(matches!(result, Err(Error::Extraction(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn with_retry_exhausts_attempts_on_network_errors() {
        // Port 0 is never connectable, so every attempt fails fast with a
        // transport error.
        let client = http_client(Duration::from_secs(2)).unwrap();
        let mut calls = 0;
        let result: Result<u32> = with_retry("test", 2, || {
            calls += 1;
            client.get("http://127.0.0.1:0/").send()?;
            Ok(0)
        });
        assert!(matches!(result, Err(Error::Network(_))));
        assert_eq!(calls, 2);
    }
}
