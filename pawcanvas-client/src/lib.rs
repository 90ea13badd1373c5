//! # PawCanvas Client
//!
//! Remote collaborators for the editor.
//!
//! ```text
//! ┌──────────────┐   save / load    ┌─────────────────────┐
//! │ EditorSession│ ───────────────▶ │ ApiClient (backend) │
//! │  (document)  │                  │  - JWT + refresh    │
//! │              │  remove_bg PNG   ├─────────────────────┤
//! │              │ ───────────────▶ │ BackgroundRemover   │
//! └──────────────┘                  └─────────────────────┘
//! ```
//!
//! Results coming back from the network are committed through remote
//! tickets, so a cleared or reloaded document drops them.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod background;
pub mod config;
pub mod error;
pub mod session;
pub mod tokens;

pub use api::{validate_signup, ApiClient, SignupRequest, MIN_PASSWORD_LEN, UPLOAD_FILENAME};
pub use background::{BackgroundRemover, HttpBackgroundRemover};
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::{ClientError, ClientResult};
pub use session::EditorSession;
pub use tokens::{MemoryTokenStore, SessionTokens, TokenStore};

/// Client version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
