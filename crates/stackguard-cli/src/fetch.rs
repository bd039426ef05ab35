//! Setup-phase retrieval of a remote `stackguard.toml`.

use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_ATTEMPTS: u32 = 3;
const BACKOFF: Duration = Duration::from_millis(250);

pub trait HttpClient {
    fn get(&self, url: &str) -> Result<String>;
}

/// Blocking client with a per-attempt timeout.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stackguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("fetch {url}"))?;

        if !response.status().is_success() {
            bail!("HTTP request failed with status {}: {}", response.status(), url);
        }

        response
            .text()
            .with_context(|| format!("read response body from {url}"))
    }
}

/// Fetch `url`, retrying up to `attempts` times with linear backoff.
pub fn fetch_config<H: HttpClient>(client: &H, url: &str, attempts: u32) -> Result<String> {
    let attempts = attempts.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        match client.get(url) {
            Ok(text) => {
                tracing::info!(url, attempt, "fetched remote config");
                return Ok(text);
            }
            Err(err) => {
                tracing::warn!(url, attempt, error = %format!("{err:#}"), "config fetch failed");
                last_err = Some(err);
                if attempt < attempts {
                    std::thread::sleep(BACKOFF * attempt);
                }
            }
        }
    }
    let err = last_err.unwrap_or_else(|| anyhow::anyhow!("no attempt made"));
    Err(err.context(format!("fetch config from {url} after {attempts} attempt(s)")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Flaky {
        failures: u32,
        calls: Cell<u32>,
    }

    impl HttpClient for Flaky {
        fn get(&self, _url: &str) -> Result<String> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if n <= self.failures {
                bail!("connection reset");
            }
            Ok("profile = \"baseline\"\n".to_string())
        }
    }

    #[test]
    fn retries_until_success() {
        let client = Flaky {
            failures: 1,
            calls: Cell::new(0),
        };
        let text = fetch_config(&client, "https://example.invalid/stackguard.toml", 3)
            .expect("fetch");
        assert!(text.contains("baseline"));
        assert_eq!(client.calls.get(), 2);
    }

    #[test]
    fn gives_up_after_the_last_attempt() {
        let client = Flaky {
            failures: 5,
            calls: Cell::new(0),
        };
        let err = fetch_config(&client, "https://example.invalid/x", 2).expect_err("fails");
        assert_eq!(client.calls.get(), 2);
        let msg = format!("{err:#}");
        assert!(msg.contains("after 2 attempt(s)"));
        assert!(msg.contains("connection reset"));
    }
}
