//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, ClientResult};

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach the collaborators.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root; API paths are resolved against it.
    pub base_url: Url,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Background removal endpoint, if available.
    pub background_removal_url: Option<Url>,
}

impl ClientConfig {
    /// Configuration for a backend root URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL is malformed or not
    /// HTTP(S).
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Ok(Self {
            base_url: parse_root(base_url)?,
            user_agent: format!("pawcanvas/{}", env!("CARGO_PKG_VERSION")),
            timeout: DEFAULT_TIMEOUT,
            background_removal_url: None,
        })
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the background removal endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL is malformed.
    pub fn with_background_removal_url(mut self, url: &str) -> ClientResult<Self> {
        let parsed = Url::parse(url).map_err(|e| ClientError::InvalidUrl(format!("{url}: {e}")))?;
        self.background_removal_url = Some(parsed);
        Ok(self)
    }

    /// Resolve an API path (or an absolute URL) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the result is not a valid URL.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }
}

/// Parse a root URL and make sure relative joins append to its path.
fn parse_root(raw: &str) -> ClientResult<Url> {
    let mut url = Url::parse(raw).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl(format!(
            "{raw}: expected http or https"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let config = ClientConfig::new("https://pets.example/backend").expect("config");
        let url = config.endpoint("/api/auth/login/").expect("url");
        assert_eq!(url.as_str(), "https://pets.example/backend/api/auth/login/");
    }

    #[test]
    fn test_absolute_media_urls_pass_through() {
        let config = ClientConfig::new(DEFAULT_API_URL).expect("config");
        let url = config
            .endpoint("https://cdn.example/media/edit.png")
            .expect("url");
        assert_eq!(url.host_str(), Some("cdn.example"));
    }

    #[test]
    fn test_rejects_non_http() {
        assert!(matches!(
            ClientConfig::new("ftp://pets.example"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(ClientConfig::new("not a url").is_err());
    }
}
