//! # PawCanvas CLI
//!
//! Batch front end for the PawCanvas editor: decorate a pet photo, export it,
//! and manage saved edits on the backend.
//!
//! ## Usage
//!
//! ```bash
//! pawcanvas edit rex.jpg --filter sepia --overlay collar --text "Have you seen me?"
//! pawcanvas login rex@example.com --password woofwoof1
//! PAWCANVAS_TOKEN=... pawcanvas list
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Backend connection settings derived from the arguments
//! - `build_document` - Applies edit options to a fresh document
//! - `run` - Dispatches a parsed command

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pawcanvas_client::{
    ApiClient, BackgroundRemover, ClientConfig, EditorSession, HttpBackgroundRemover,
    MemoryTokenStore, SessionTokens, TokenStore, DEFAULT_API_URL,
};
use pawcanvas_core::{
    AspectRatio, Bitmap, CanvasDocument, CanvasResult, Filter, ImportOptions, ObjectSpec, Preset,
    DEFAULT_FILL,
};
use pawcanvas_renderer::{decode_bitmap, DocumentExporter, ExportConfig, RasterFormat};

/// Font size of caption text.
pub const TEXT_SIZE: f64 = 24.0;

/// Color of caption text.
pub const TEXT_FILL: &str = "#000000";

const TEXT_LEFT: f64 = 100.0;
const TEXT_TOP: f64 = 100.0;
const TEXT_LINE_SPACING: f64 = 40.0;

/// Command-line arguments for pawcanvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "pawcanvas")]
#[command(about = "Pet photo editor for lost-and-found reports")]
#[command(version)]
pub struct CliArgs {
    /// Backend root URL
    #[arg(long, global = true, env = "PAWCANVAS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Access token for the backend
    #[arg(long, global = true, env = "PAWCANVAS_TOKEN")]
    pub token: Option<String>,

    /// Refresh token used when the access token expires
    #[arg(long, global = true, env = "PAWCANVAS_REFRESH_TOKEN")]
    pub refresh_token: Option<String>,

    /// Background removal endpoint (PNG in, PNG out)
    #[arg(long, global = true, env = "PAWCANVAS_BG_REMOVAL_URL")]
    pub bg_removal_url: Option<String>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Decorate a photo and export it
    Edit(EditArgs),
    /// Log in and print the issued tokens as JSON
    Login {
        /// Account email
        email: String,
        /// Account password
        #[arg(long, env = "PAWCANVAS_PASSWORD")]
        password: String,
    },
    /// List saved edits
    List,
    /// Upload a photo as a saved edit
    Save {
        /// Photo to upload
        input: PathBuf,
        /// Filter to apply first
        #[arg(long)]
        filter: Option<Filter>,
    },
    /// Download a saved edit and export it
    Load {
        /// Saved edit id
        id: u64,
        /// Output file
        #[arg(long, default_value = pawcanvas_renderer::DOWNLOAD_FILENAME)]
        output: PathBuf,
    },
}

/// Options for `pawcanvas edit`.
#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    /// Photo to edit (PNG or JPEG)
    pub input: PathBuf,

    /// Filter: normal, grayscale, sepia, vintage, bright, brightness(x), contrast(x)
    #[arg(long)]
    pub filter: Option<Filter>,

    /// Surface aspect: original, 1:1, 4:5, 16:9
    #[arg(long)]
    pub aspect: Option<AspectRatio>,

    /// Caption line (repeatable)
    #[arg(long)]
    pub text: Vec<String>,

    /// Decoration: star, paw, hat, collar (repeatable)
    #[arg(long)]
    pub overlay: Vec<Preset>,

    /// Fill color for decorations
    #[arg(long, default_value = DEFAULT_FILL)]
    pub overlay_color: String,

    /// Canvas background color
    #[arg(long)]
    pub background: Option<String>,

    /// Strip the photo background through the removal service
    #[arg(long)]
    pub remove_bg: bool,

    /// Output file
    #[arg(long, short, default_value = pawcanvas_renderer::DOWNLOAD_FILENAME)]
    pub output: PathBuf,

    /// Output format: png or jpeg
    #[arg(long, default_value = "png")]
    pub format: RasterFormat,

    /// JPEG quality from 0.0 to 1.0
    #[arg(long, default_value = "1.0")]
    pub quality: f64,

    /// Output pixels per canvas pixel
    #[arg(long, default_value = "1.0")]
    pub multiplier: f64,

    /// Also write the document as JSON
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

/// Backend settings.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Backend root URL.
    pub api_url: String,
    /// Tokens passed on the command line.
    pub tokens: Option<SessionTokens>,
    /// Background removal endpoint.
    pub bg_removal_url: Option<String>,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            api_url: args.api_url.clone(),
            tokens: args.token.as_ref().map(|access| {
                SessionTokens::new(access.clone(), args.refresh_token.clone().unwrap_or_default())
            }),
            bg_removal_url: args.bg_removal_url.clone(),
        }
    }
}

impl CliConfig {
    /// Client configuration for these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is invalid.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.api_url)?;
        if let Some(url) = &self.bg_removal_url {
            config = config.with_background_removal_url(url)?;
        }
        Ok(config)
    }

    /// Backend client seeded with the configured tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn api_client(&self) -> anyhow::Result<ApiClient> {
        let store = MemoryTokenStore::new();
        if let Some(tokens) = &self.tokens {
            store.store(tokens.clone());
        }
        Ok(ApiClient::new(self.client_config()?, Arc::new(store))?)
    }

    /// Background remover for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint is configured.
    pub fn remover(&self) -> anyhow::Result<Arc<dyn BackgroundRemover>> {
        let remover = HttpBackgroundRemover::from_config(&self.client_config()?)
            .context("--remove-bg needs --bg-removal-url or PAWCANVAS_BG_REMOVAL_URL")?;
        Ok(Arc::new(remover))
    }
}

/// Build a document from a photo and the edit options.
///
/// Decorations and captions are added on top of the photo; the aspect
/// change comes last so everything is recentred together.
///
/// # Errors
///
/// Returns the first editing error encountered.
pub fn build_document(photo: Bitmap, args: &EditArgs) -> CanvasResult<CanvasDocument> {
    let mut doc = CanvasDocument::default();
    if let Some(color) = &args.background {
        doc.set_background(color.clone());
    }

    let photo_id = doc.import_image(photo, ImportOptions::default())?;
    if let Some(filter) = args.filter {
        doc.apply_filter(Some(photo_id), filter)?;
    }

    for preset in &args.overlay {
        doc.add_preset(*preset, &args.overlay_color)?;
    }

    let mut top = TEXT_TOP;
    for line in &args.text {
        doc.add_object(
            ObjectSpec::text(line.clone(), TEXT_SIZE)
                .with_fill(TEXT_FILL)
                .at(TEXT_LEFT, top),
        )?;
        top += TEXT_LINE_SPACING;
    }

    if let Some(aspect) = args.aspect {
        doc.change_surface_aspect(aspect);
    }
    // Leave the photo as the target for anything that follows.
    doc.select(photo_id)?;
    Ok(doc)
}

async fn read_photo(path: &Path) -> anyhow::Result<Bitmap> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    decode_bitmap(&bytes).with_context(|| format!("decoding {}", path.display()))
}

/// Run a parsed command.
///
/// # Errors
///
/// Returns any I/O, editing, rendering or backend error.
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config = CliConfig::from(&args);
    match args.command {
        Command::Edit(edit_args) => edit(&config, &edit_args).await,
        Command::Login { email, password } => {
            let tokens = config.api_client()?.login(&email, &password).await?;
            println!("{}", serde_json::to_string_pretty(&tokens)?);
            Ok(())
        }
        Command::List => {
            let edits = config.api_client()?.list_edits().await?;
            if edits.is_empty() {
                println!("No saved edits");
            }
            for edit in edits {
                let filter = edit
                    .edit_metadata
                    .and_then(|m| m.filters)
                    .map_or_else(|| "-".to_string(), |f| f.to_string());
                println!("{}\t{}\t{}", edit.id, filter, edit.edited_image_url);
            }
            Ok(())
        }
        Command::Save { input, filter } => {
            let photo = read_photo(&input).await?;
            let mut doc = CanvasDocument::default();
            let id = doc.import_image(photo, ImportOptions::default())?;
            if let Some(filter) = filter {
                doc.apply_filter(Some(id), filter)?;
            }
            let session = EditorSession::new(doc, config.api_client()?);
            match session.save().await? {
                Some(saved) => println!("Saved edit {}", saved.id),
                None => println!("Saved"),
            }
            Ok(())
        }
        Command::Load { id, output } => {
            let session = EditorSession::new(CanvasDocument::default(), config.api_client()?);
            let edit = session
                .recent_edits()
                .await?
                .into_iter()
                .find(|e| e.id == id)
                .with_context(|| format!("no saved edit with id {id}"))?;
            session.load_edit(&edit).await?;
            let doc = session.into_document();
            let png =
                DocumentExporter::with_defaults().export_raster(&doc, RasterFormat::Png, 1.0)?;
            write_output(&output, &png).await
        }
    }
}

async fn edit(config: &CliConfig, args: &EditArgs) -> anyhow::Result<()> {
    let photo = read_photo(&args.input).await?;
    let mut doc = build_document(photo, args)?;
    tracing::debug!("Built document with {} objects", doc.len());

    if args.remove_bg {
        let session = EditorSession::new(doc, config.api_client()?).with_remover(config.remover()?);
        if session.remove_background().await?.is_none() {
            tracing::warn!("Background removal result was discarded");
        }
        doc = session.into_document();
    }

    if let Some(path) = &args.snapshot {
        tokio::fs::write(path, doc.to_json()?)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let exporter =
        DocumentExporter::new(ExportConfig::default().with_multiplier(args.multiplier));
    let bytes = exporter.export_raster(&doc, args.format, args.quality)?;
    write_output(&args.output, &bytes).await
}

async fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
