//! Document export to PNG/JPEG.
//!
//! Documents are written out as SVG, one `<g>` per object carrying the
//! object's transform, then rasterized with resvg/tiny-skia. Export always
//! uses the identity viewport and never touches the document.

use std::fmt::Write;
use std::str::FromStr;
use std::sync::Arc;

use image::ImageEncoder;
use pawcanvas_core::{
    BoundingBox, CanvasDocument, CanvasObject, LayerEntry, ObjectKind, Origin, Size,
};

use crate::error::{RenderError, RenderResult};
use crate::image::bitmap_to_data_uri;

/// File name offered for downloads.
pub const DOWNLOAD_FILENAME: &str = "pet-edited-image.png";

/// Multiplier used for layer thumbnails.
pub const THUMBNAIL_MULTIPLIER: f64 = 0.1;

/// Raster output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterFormat {
    /// PNG image.
    #[default]
    Png,
    /// JPEG image.
    Jpeg,
}

impl RasterFormat {
    /// MIME type.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for RasterFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(RenderError::InvalidConfig(format!(
                "unsupported format: {other}"
            ))),
        }
    }
}

/// Configuration for document export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output pixels per surface pixel (default: 1.0).
    pub multiplier: f64,
    /// Replaces the document background when set.
    pub background: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            background: None,
        }
    }
}

impl ExportConfig {
    /// Set the output multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Override the background color.
    #[must_use]
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }
}

/// Flattens documents and objects into raster images.
pub struct DocumentExporter {
    config: ExportConfig,
    fonts: Arc<usvg::fontdb::Database>,
}

impl DocumentExporter {
    /// Create a new exporter with the given configuration.
    ///
    /// System fonts are loaded once here so text objects render.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let mut fonts = usvg::fontdb::Database::new();
        fonts.load_system_fonts();
        tracing::debug!("Loaded {} font faces for export", fonts.len());
        Self {
            config,
            fonts: Arc::new(fonts),
        }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Flatten the whole document.
    ///
    /// `quality` (0.0 to 1.0) only affects JPEG.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] for a bad quality or
    /// multiplier, or an export/encode error if rasterization fails.
    pub fn export_raster(
        &self,
        doc: &CanvasDocument,
        format: RasterFormat,
        quality: f64,
    ) -> RenderResult<Vec<u8>> {
        if !(0.0..=1.0).contains(&quality) {
            return Err(RenderError::InvalidConfig(format!(
                "quality must be within 0..=1, got {quality}"
            )));
        }
        let svg = self.render_to_svg(doc)?;
        let pixmap = self.rasterize_svg(&svg)?;
        tracing::debug!(
            "Exported {}x{} {:?}",
            pixmap.width(),
            pixmap.height(),
            format
        );

        match format {
            RasterFormat::Png => pixmap
                .encode_png()
                .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}"))),
            RasterFormat::Jpeg => encode_jpeg(&pixmap, quality),
        }
    }

    /// Render the document to an SVG string at the configured multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] for a non-positive multiplier,
    /// or an encode error if an embedded image cannot be encoded.
    pub fn render_to_svg(&self, doc: &CanvasDocument) -> RenderResult<String> {
        let Size { width, height } = doc.surface();
        let view = BoundingBox {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
        };
        let background = self
            .config
            .background
            .as_deref()
            .unwrap_or_else(|| doc.background());
        Self::svg_document(view, self.config.multiplier, Some(background), doc.objects())
    }

    /// Render one object cropped to its bounds at [`THUMBNAIL_MULTIPLIER`].
    ///
    /// # Errors
    ///
    /// Returns an export/encode error if rasterization fails.
    pub fn thumbnail(&self, object: &CanvasObject) -> RenderResult<Vec<u8>> {
        let svg = Self::svg_document(
            object.bounds,
            THUMBNAIL_MULTIPLIER,
            None,
            std::slice::from_ref(object),
        )?;
        self.rasterize_svg(&svg)?
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
    }

    /// Layer list, front-most first, with thumbnails.
    ///
    /// An object whose thumbnail fails to render gets none.
    #[must_use]
    pub fn layer_entries(&self, doc: &CanvasDocument) -> Vec<LayerEntry> {
        doc.objects()
            .iter()
            .rev()
            .map(|object| LayerEntry {
                thumbnail: self.thumbnail_or_none(object),
                ..LayerEntry::from_object(object)
            })
            .collect()
    }

    /// Thumbnail callback for [`pawcanvas_core::LayerPanel::entries`].
    #[must_use]
    pub fn thumbnail_or_none(&self, object: &CanvasObject) -> Option<Vec<u8>> {
        self.thumbnail(object)
            .map_err(|e| tracing::warn!("No thumbnail for {}: {e}", object.name))
            .ok()
    }

    fn svg_document(
        view: BoundingBox,
        multiplier: f64,
        background: Option<&str>,
        objects: &[CanvasObject],
    ) -> RenderResult<String> {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "multiplier must be positive, got {multiplier}"
            )));
        }
        let (out_w, out_h) = output_dimensions(view, multiplier);
        let (vw, vh) = (view.width().max(f64::EPSILON), view.height().max(f64::EPSILON));

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"{} {} {vw} {vh}\">",
            view.min_x, view.min_y,
        );
        if let Some(bg) = background {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{vw}\" height=\"{vh}\" fill=\"{}\"/>",
                view.min_x,
                view.min_y,
                escape_xml(bg),
            );
        }
        for object in objects {
            render_object_svg(&mut svg, object)?;
        }
        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fonts);
        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width().round() as u32;
        let px_h = tree.size().height().round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

impl Default for DocumentExporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn output_dimensions(view: BoundingBox, multiplier: f64) -> (u32, u32) {
    let w = (view.width() * multiplier).round().max(1.0) as u32;
    let h = (view.height() * multiplier).round().max(1.0) as u32;
    (w, h)
}

/// Flatten onto white and encode as JPEG.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn encode_jpeg(pixmap: &tiny_skia::Pixmap, quality: f64) -> RenderResult<Vec<u8>> {
    let (width, height) = (pixmap.width(), pixmap.height());
    // tiny-skia stores premultiplied RGBA, so compositing over white is
    // color + (255 - alpha).
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|p| {
            let inv = 255 - p[3];
            [
                p[0].saturating_add(inv),
                p[1].saturating_add(inv),
                p[2].saturating_add(inv),
            ]
        })
        .collect();

    let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut buf = std::io::Cursor::new(Vec::new());
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, q)
        .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Append one object as a transformed group.
fn render_object_svg(svg: &mut String, object: &CanvasObject) -> RenderResult<()> {
    let tf = &object.transform;
    let (w, h) = object.kind.intrinsic_size();
    let (ox, oy) = match tf.origin {
        Origin::TopLeft => (0.0, 0.0),
        Origin::Center => (w / 2.0, h / 2.0),
    };
    let fill = escape_xml(object.fill.as_deref().unwrap_or("none"));

    let _ = write!(
        svg,
        "<g transform=\"translate({},{}) rotate({}) scale({},{})",
        tf.left, tf.top, tf.angle, tf.scale_x, tf.scale_y,
    );
    if tf.origin == Origin::Center {
        let _ = write!(svg, " translate({},{})", -ox, -oy);
    }
    let _ = write!(svg, "\" opacity=\"{}\">", object.opacity);

    match &object.kind {
        ObjectKind::Rectangle {
            width,
            height,
            corner_radius,
        } => {
            let _ = write!(
                svg,
                "<rect width=\"{width}\" height=\"{height}\" rx=\"{corner_radius}\" ry=\"{corner_radius}\" fill=\"{fill}\"/>",
            );
        }

        ObjectKind::Circle { radius } => {
            let _ = write!(
                svg,
                "<circle cx=\"{radius}\" cy=\"{radius}\" r=\"{radius}\" fill=\"{fill}\"/>",
            );
        }

        ObjectKind::Triangle { width, height } => {
            let _ = write!(
                svg,
                "<polygon points=\"{},0 {width},{height} 0,{height}\" fill=\"{fill}\"/>",
                width / 2.0,
            );
        }

        ObjectKind::Polygon { points } => {
            let offset = object.kind.local_offset();
            let list = points
                .iter()
                .map(|p| format!("{},{}", p.x + offset.x, p.y + offset.y))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(svg, "<polygon points=\"{list}\" fill=\"{fill}\"/>");
        }

        ObjectKind::Path { data } => {
            let offset = object.kind.local_offset();
            let _ = write!(
                svg,
                "<path d=\"{}\" transform=\"translate({},{})\" fill=\"{fill}\"/>",
                escape_xml(data),
                offset.x,
                offset.y,
            );
        }

        ObjectKind::Text {
            content,
            font_size,
            font_family,
        } => {
            let _ = write!(
                svg,
                "<text x=\"0\" y=\"{font_size}\" font-size=\"{font_size}\" font-family=\"{}, sans-serif\" fill=\"{fill}\">{}</text>",
                escape_xml(font_family),
                escape_xml(content),
            );
        }

        ObjectKind::Image(data) => {
            let href = bitmap_to_data_uri(&data.current)?;
            let _ = write!(
                svg,
                "<image width=\"{}\" height=\"{}\" href=\"{href}\"/>",
                data.current.width, data.current.height,
            );
        }
    }

    svg.push_str("</g>");
    Ok(())
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
