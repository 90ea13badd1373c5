//! Background removal collaborator.

use async_trait::async_trait;
use reqwest::{header, Client};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Removes the background from a photo.
///
/// Input and output are PNG bytes.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Return a copy of `png` with the background made transparent.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or rejects the image.
    async fn remove_background(&self, png: Vec<u8>) -> ClientResult<Vec<u8>>;
}

/// Background remover backed by an HTTP endpoint that takes and returns
/// `image/png`.
#[derive(Debug, Clone)]
pub struct HttpBackgroundRemover {
    http: Client,
    endpoint: Url,
}

impl HttpBackgroundRemover {
    /// Remover for an explicit endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client fails to build.
    pub fn new(endpoint: Url, config: &ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .no_proxy()
            .build()?;
        Ok(Self { http, endpoint })
    }

    /// Remover for the endpoint named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoBackgroundRemover`] if no endpoint is
    /// configured.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let endpoint = config
            .background_removal_url
            .clone()
            .ok_or(ClientError::NoBackgroundRemover)?;
        Self::new(endpoint, config)
    }

    /// Endpoint in use.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl BackgroundRemover for HttpBackgroundRemover {
    async fn remove_background(&self, png: Vec<u8>) -> ClientResult<Vec<u8>> {
        tracing::debug!("Sending {} bytes to {}", png.len(), self.endpoint);
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "image/png")
            .body(png)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail: if detail.is_empty() {
                    "background removal failed".to_string()
                } else {
                    detail
                },
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ClientError::UnexpectedResponse(
                "background removal returned an empty body".to_string(),
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_endpoint() {
        let config = ClientConfig::new("http://localhost:8000").expect("config");
        assert!(matches!(
            HttpBackgroundRemover::from_config(&config),
            Err(ClientError::NoBackgroundRemover)
        ));

        let config = config
            .with_background_removal_url("http://localhost:5000/remove")
            .expect("url");
        let remover = HttpBackgroundRemover::from_config(&config).expect("remover");
        assert_eq!(remover.endpoint().path(), "/remove");
    }
}
