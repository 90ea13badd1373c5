//! Backend API client: authentication and saved edits.

use std::sync::Arc;

use pawcanvas_core::{EditMetadata, SavedEdit};
use reqwest::{header, multipart, Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::tokens::{SessionTokens, TokenStore};

const LOGIN_PATH: &str = "api/auth/login/";
const SIGNUP_PATH: &str = "api/auth/signup/";
const REFRESH_PATH: &str = "api/token/refresh/";
const EDITS_PATH: &str = "api/auth/edited-pet-images/";

/// File name of the flattened image in a saved edit upload.
pub const UPLOAD_FILENAME: &str = "edited-pet-image.png";

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 8;

const AUTH_FALLBACK: &str = "An error occurred. Please try again.";
const SAVE_FALLBACK: &str = "Failed to save edited image";

/// Signup form.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    /// Display name.
    pub username: String,
    /// Login email.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Must equal `password`.
    pub confirm_password: String,
}

/// Check a signup form before it is sent.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] if the password is shorter than
/// [`MIN_PASSWORD_LEN`], lacks a letter or a digit, or does not match its
/// confirmation.
pub fn validate_signup(request: &SignupRequest) -> ClientResult<()> {
    let password = &request.password;
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(long_enough && has_letter && has_digit) {
        return Err(ClientError::Validation(
            "Password must be at least 8 characters long and contain both letters and numbers."
                .to_string(),
        ));
    }
    if request.password != request.confirm_password {
        return Err(ClientError::Validation("Passwords do not match.".to_string()));
    }
    Ok(())
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Client for the PawCanvas backend.
///
/// Cheap to clone; clones share the HTTP pool and the token store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    http: Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client fails to build.
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .no_proxy()
            .build()?;
        Ok(Self {
            inner: Arc::new(InnerClient {
                http,
                config,
                tokens,
            }),
        })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Current session tokens.
    #[must_use]
    pub fn tokens(&self) -> Option<SessionTokens> {
        self.inner.tokens.tokens()
    }

    /// Whether a session is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_some()
    }

    /// Forget the session.
    pub fn logout(&self) {
        self.inner.tokens.clear();
        tracing::info!("Logged out");
    }

    /// Log in and store the issued tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] with the backend's message if
    /// the credentials are rejected, or an HTTP/JSON error.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<SessionTokens> {
        let url = self.inner.config.endpoint(LOGIN_PATH)?;
        let response = self
            .inner
            .http
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let tokens = self.read_tokens(response).await?;
        tracing::info!("Logged in as {email}");
        Ok(tokens)
    }

    /// Create an account and store the issued tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without contacting the backend if
    /// the form fails [`validate_signup`], otherwise the same errors as
    /// [`ApiClient::login`].
    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<SessionTokens> {
        validate_signup(request)?;
        let url = self.inner.config.endpoint(SIGNUP_PATH)?;
        let response = self.inner.http.post(url).json(request).send().await?;
        let tokens = self.read_tokens(response).await?;
        tracing::info!("Signed up {}", request.username);
        Ok(tokens)
    }

    async fn read_tokens(&self, response: Response) -> ClientResult<SessionTokens> {
        if !response.status().is_success() {
            return Err(error_from_response(response, AUTH_FALLBACK).await);
        }
        let tokens: SessionTokens = response.json().await?;
        self.inner.tokens.store(tokens.clone());
        Ok(tokens)
    }

    /// Exchange the refresh token for a new access token and store it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthenticated`] if no session is stored,
    /// or [`ClientError::Unauthorized`] if the refresh token is rejected.
    pub async fn refresh_access(&self) -> ClientResult<String> {
        let tokens = self
            .inner
            .tokens
            .tokens()
            .ok_or(ClientError::NotAuthenticated)?;
        let url = self.inner.config.endpoint(REFRESH_PATH)?;
        let response = self
            .inner
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh: &tokens.refresh,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            let err = error_from_response(response, "token refresh rejected").await;
            return Err(match err {
                ClientError::Api { detail, .. } => ClientError::Unauthorized(detail),
                other => other,
            });
        }
        let RefreshResponse { access } = response.json().await?;
        self.inner.tokens.set_access(access.clone());
        tracing::debug!("Access token refreshed");
        Ok(access)
    }

    /// Send a bearer-authenticated request.
    ///
    /// `build` is called again for the retry, so it must produce an
    /// equivalent request each time. A 401 triggers one refresh and one
    /// retry; the second response is returned as is.
    async fn send_authorized<F>(&self, build: F) -> ClientResult<Response>
    where
        F: Fn(&Client) -> ClientResult<RequestBuilder>,
    {
        let tokens = self
            .inner
            .tokens
            .tokens()
            .ok_or(ClientError::NotAuthenticated)?;
        let response = build(&self.inner.http)?
            .bearer_auth(&tokens.access)
            .send()
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::warn!("Access token rejected, refreshing");
        let access = self.refresh_access().await?;
        Ok(build(&self.inner.http)?.bearer_auth(access).send().await?)
    }

    /// List the user's saved edits.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthenticated`] without a session,
    /// [`ClientError::UnexpectedResponse`] if the backend does not answer
    /// with JSON, or the backend's error.
    pub async fn list_edits(&self) -> ClientResult<Vec<SavedEdit>> {
        let url = self.inner.config.endpoint(EDITS_PATH)?;
        let response = self
            .send_authorized(|http| Ok(http.get(url.clone())))
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to load saved edits").await);
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("application/json") {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected application/json, got {content_type:?}"
            )));
        }

        let edits: Vec<SavedEdit> = response.json().await?;
        tracing::debug!("Fetched {} saved edits", edits.len());
        Ok(edits)
    }

    /// Upload a flattened PNG with its metadata.
    ///
    /// Returns the stored record when the backend echoes one back.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] carrying the backend's `detail` (or a
    /// generic message) on failure.
    pub async fn save_edit(
        &self,
        png: Vec<u8>,
        metadata: &EditMetadata,
    ) -> ClientResult<Option<SavedEdit>> {
        let url = self.inner.config.endpoint(EDITS_PATH)?;
        let metadata = serde_json::to_string(metadata)?;
        let response = self
            .send_authorized(|http| {
                let image = multipart::Part::bytes(png.clone())
                    .file_name(UPLOAD_FILENAME)
                    .mime_str("image/png")?;
                let form = multipart::Form::new()
                    .part("edited_image", image)
                    .text("edit_metadata", metadata.clone());
                Ok(http.post(url.clone()).multipart(form))
            })
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, SAVE_FALLBACK).await);
        }

        let body = response.bytes().await?;
        let saved = serde_json::from_slice::<SavedEdit>(&body).ok();
        match &saved {
            Some(edit) => tracing::info!("Saved edit {}", edit.id),
            None => tracing::info!("Saved edit"),
        }
        Ok(saved)
    }

    /// Download the image behind a saved edit.
    ///
    /// Relative URLs resolve against the backend root.
    ///
    /// # Errors
    ///
    /// Returns the backend's error or an HTTP error.
    pub async fn fetch_image(&self, url: &str) -> ClientResult<Vec<u8>> {
        let url = self.inner.config.endpoint(url)?;
        let response = self.inner.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to fetch image").await);
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Turn an error response into a [`ClientError`], preferring the backend's
/// `detail` field.
async fn error_from_response(response: Response, fallback: &str) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail)
        .unwrap_or_else(|| fallback.to_string());

    if status == StatusCode::UNAUTHORIZED {
        ClientError::Unauthorized(detail)
    } else {
        ClientError::Api {
            status: status.as_u16(),
            detail,
        }
    }
}
