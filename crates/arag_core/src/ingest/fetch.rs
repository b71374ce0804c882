use std::time::Duration;

use crate::error::AppError;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches a URL body as text. Non-success statuses are errors.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String, AppError>;
}

/// Blocking HTTP fetcher with a browser User-Agent and a fixed timeout.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(FETCH_TIMEOUT)
            .user_agent(user_agent)
            .build();
        Self { agent }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, AppError> {
        match self.agent.get(url).call() {
            Ok(resp) => resp.into_string().map_err(|e| {
                AppError::new("INGEST_FETCH_FAILED", "Failed to read response body")
                    .with_details(format!("url={url}; err={e}"))
                    .with_retryable(true)
            }),
            Err(ureq::Error::Status(status, _)) => Err(AppError::new(
                "INGEST_FETCH_FAILED",
                "URL returned a non-success status",
            )
            .with_details(format!("url={url}; status={status}"))
            .with_retryable(status == 429 || status >= 500)),
            Err(e) => Err(AppError::new("INGEST_FETCH_FAILED", "Failed to fetch URL")
                .with_details(format!("url={url}; err={e}"))
                .with_retryable(true)),
        }
    }
}
