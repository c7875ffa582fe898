//! Service locations injected into the HTTP collaborators.

use std::time::Duration;

use shared::protocol::{CHAT_ROUTE, EXPENSES_ROUTE};
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    expense_api: Url,
    chat_api: Url,
    request_timeout: Duration,
}

impl ServiceEndpoints {
    pub fn new(expense_api: &str, chat_api: &str) -> Result<Self, ClientError> {
        Ok(Self {
            expense_api: parse_base_url(expense_api)?,
            chat_api: parse_base_url(chat_api)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn expense_api(&self) -> &Url {
        &self.expense_api
    }

    pub fn chat_api(&self) -> &Url {
        &self.chat_api
    }

    pub fn expenses_url(&self) -> String {
        join_route(&self.expense_api, EXPENSES_ROUTE)
    }

    pub fn chat_url(&self) -> String {
        join_route(&self.chat_api, CHAT_ROUTE)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| ClientError::InvalidEndpoint {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidEndpoint {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

fn join_route(base: &Url, route: &str) -> String {
    format!("{}{route}", base.as_str().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_routes_without_double_slashes() {
        let endpoints =
            ServiceEndpoints::new("http://127.0.0.1:8000/", "http://localhost:9000/api")
                .expect("endpoints");
        assert_eq!(endpoints.expenses_url(), "http://127.0.0.1:8000/expenses");
        assert_eq!(endpoints.chat_url(), "http://localhost:9000/api/chat");
        assert_eq!(endpoints.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn rejects_unparseable_and_non_http_urls() {
        assert!(matches!(
            ServiceEndpoints::new("not a url", "http://localhost"),
            Err(ClientError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            ServiceEndpoints::new("http://localhost", "ftp://localhost"),
            Err(ClientError::InvalidEndpoint { .. })
        ));
    }
}
