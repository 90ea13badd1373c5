//! Canvas objects - the shapes, text and images a document is made of.

use kurbo::{BezPath, Shape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Bitmap, CanvasError, CanvasResult, Filter};

/// Unique identifier for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A point in object-local or surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which point of the object `left`/`top` refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Top-left corner of the unscaled box.
    #[default]
    TopLeft,
    /// Center of the box.
    Center,
}

/// Placement of an object on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position of the origin point.
    pub left: f64,
    /// Y position of the origin point.
    pub top: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Rotation in degrees, clockwise, around the origin point.
    pub angle: f64,
    /// Reference point for `left`/`top` and rotation.
    pub origin: Origin,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            origin: Origin::TopLeft,
        }
    }
}

impl Transform {
    /// Place the origin at `(left, top)`.
    #[must_use]
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            ..Self::default()
        }
    }

    /// Reject non-finite placement, scale, or rotation.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] naming the offending value.
    pub fn validate(&self) -> CanvasResult<()> {
        let values = [
            ("left", self.left),
            ("top", self.top),
            ("scale_x", self.scale_x),
            ("scale_y", self.scale_y),
            ("angle", self.angle),
        ];
        match values.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, v)) => Err(CanvasError::Validation(format!(
                "transform {name} must be finite, got {v}"
            ))),
            None => Ok(()),
        }
    }

    /// Map a point in the object's unscaled box to surface coordinates.
    #[must_use]
    pub fn apply(&self, local: Point, size: (f64, f64)) -> Point {
        let (ox, oy) = self.origin_offset(size);
        let sx = (local.x - ox) * self.scale_x;
        let sy = (local.y - oy) * self.scale_y;
        let (sin, cos) = self.angle.to_radians().sin_cos();
        Point::new(
            self.left + sx * cos - sy * sin,
            self.top + sx * sin + sy * cos,
        )
    }

    /// Map a surface point back into the object's unscaled box.
    ///
    /// Returns `None` when a scale factor is zero.
    #[must_use]
    pub fn invert(&self, surface: Point, size: (f64, f64)) -> Option<Point> {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return None;
        }
        let (ox, oy) = self.origin_offset(size);
        let dx = surface.x - self.left;
        let dy = surface.y - self.top;
        let (sin, cos) = (-self.angle.to_radians()).sin_cos();
        let rx = dx * cos - dy * sin;
        let ry = dx * sin + dy * cos;
        Some(Point::new(rx / self.scale_x + ox, ry / self.scale_y + oy))
    }

    fn origin_offset(&self, (w, h): (f64, f64)) -> (f64, f64) {
        match self.origin {
            Origin::TopLeft => (0.0, 0.0),
            Origin::Center => (w / 2.0, h / 2.0),
        }
    }
}

/// Partial transform update; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformPatch {
    /// New X position.
    pub left: Option<f64>,
    /// New Y position.
    pub top: Option<f64>,
    /// New horizontal scale.
    pub scale_x: Option<f64>,
    /// New vertical scale.
    pub scale_y: Option<f64>,
    /// New rotation in degrees.
    pub angle: Option<f64>,
}

impl TransformPatch {
    /// Uniform scale, as driven by a single scale slider.
    #[must_use]
    pub fn scale(factor: f64) -> Self {
        Self {
            scale_x: Some(factor),
            scale_y: Some(factor),
            ..Self::default()
        }
    }

    /// Move the object.
    #[must_use]
    pub fn position(left: f64, top: f64) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            ..Self::default()
        }
    }

    fn apply_to(&self, t: &mut Transform) {
        if let Some(v) = self.left {
            t.left = v;
        }
        if let Some(v) = self.top {
            t.top = v;
        }
        if let Some(v) = self.scale_x {
            t.scale_x = v;
        }
        if let Some(v) = self.scale_y {
            t.scale_y = v;
        }
        if let Some(v) = self.angle {
            t.angle = v;
        }
    }
}

/// Axis-aligned box in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum X.
    pub min_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl BoundingBox {
    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    fn enclosing(points: &[Point]) -> Self {
        points.iter().fold(
            Self {
                min_x: f64::INFINITY,
                min_y: f64::INFINITY,
                max_x: f64::NEG_INFINITY,
                max_y: f64::NEG_INFINITY,
            },
            |b, p| Self {
                min_x: b.min_x.min(p.x),
                min_y: b.min_y.min(p.y),
                max_x: b.max_x.max(p.x),
                max_y: b.max_y.max(p.y),
            },
        )
    }
}

/// Pixel data of an image object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// What is drawn: `filter` applied to `original`.
    pub current: Bitmap,
    /// Undecorated source pixels.
    pub original: Bitmap,
    /// Filter that produced `current`.
    #[serde(default)]
    pub filter: Filter,
}

impl ImageData {
    /// Wrap freshly decoded pixels.
    #[must_use]
    pub fn new(bitmap: Bitmap) -> Self {
        Self {
            current: bitmap.clone(),
            original: bitmap,
            filter: Filter::Normal,
        }
    }
}

/// The variant payload of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ObjectKind {
    /// An axis-aligned rectangle, optionally with rounded corners.
    Rectangle {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
        /// Corner radius (0 for square corners).
        #[serde(default)]
        corner_radius: f64,
    },

    /// A circle.
    Circle {
        /// Radius in pixels.
        radius: f64,
    },

    /// An isosceles triangle pointing up.
    Triangle {
        /// Base width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },

    /// A closed polygon (stars are polygons).
    Polygon {
        /// Vertices in local coordinates.
        points: Vec<Point>,
    },

    /// An SVG path (paw, hat and other overlays).
    Path {
        /// SVG path data.
        data: String,
    },

    /// A single-line text label.
    Text {
        /// Text content.
        content: String,
        /// Font size in pixels.
        font_size: f64,
        /// Font family.
        font_family: String,
    },

    /// A raster image.
    Image(ImageData),
}

impl ObjectKind {
    /// Title-case variant name, used for default object names.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Rectangle { .. } => "Rectangle",
            Self::Circle { .. } => "Circle",
            Self::Triangle { .. } => "Triangle",
            Self::Polygon { .. } => "Polygon",
            Self::Path { .. } => "Path",
            Self::Text { .. } => "Text",
            Self::Image(_) => "Image",
        }
    }

    /// Whether recoloring applies to this variant.
    #[must_use]
    pub fn has_fill(&self) -> bool {
        !matches!(self, Self::Image(_))
    }

    /// Reject geometry that cannot be drawn.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] describing the first bad field.
    pub fn validate(&self) -> CanvasResult<()> {
        fn positive(name: &str, v: f64) -> CanvasResult<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(CanvasError::Validation(format!(
                    "{name} must be a positive number, got {v}"
                )))
            }
        }

        match self {
            Self::Rectangle {
                width,
                height,
                corner_radius,
            } => {
                positive("width", *width)?;
                positive("height", *height)?;
                if !corner_radius.is_finite() || *corner_radius < 0.0 {
                    return Err(CanvasError::Validation(format!(
                        "corner radius must not be negative, got {corner_radius}"
                    )));
                }
                Ok(())
            }
            Self::Circle { radius } => positive("radius", *radius),
            Self::Triangle { width, height } => {
                positive("width", *width)?;
                positive("height", *height)
            }
            Self::Polygon { points } => {
                if points.len() < 3 {
                    return Err(CanvasError::Validation(format!(
                        "polygon needs at least 3 points, got {}",
                        points.len()
                    )));
                }
                if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                    return Err(CanvasError::Validation(
                        "polygon points must be finite".to_string(),
                    ));
                }
                Ok(())
            }
            Self::Path { data } => {
                let path = BezPath::from_svg(data)
                    .map_err(|e| CanvasError::Validation(format!("invalid path data: {e}")))?;
                if path.elements().is_empty() {
                    return Err(CanvasError::Validation("path data is empty".to_string()));
                }
                Ok(())
            }
            Self::Text {
                content, font_size, ..
            } => {
                if content.trim().is_empty() {
                    return Err(CanvasError::Validation("text must not be blank".to_string()));
                }
                positive("font size", *font_size)
            }
            // Bitmap construction already rejects empty images.
            Self::Image(_) => Ok(()),
        }
    }

    /// Unscaled `(width, height)` of the object's box.
    #[must_use]
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match self {
            Self::Rectangle { width, height, .. } | Self::Triangle { width, height } => {
                (*width, *height)
            }
            Self::Circle { radius } => (radius * 2.0, radius * 2.0),
            Self::Polygon { points } => {
                let b = BoundingBox::enclosing(points);
                (b.width(), b.height())
            }
            Self::Path { data } => BezPath::from_svg(data)
                .map(|p| {
                    let r = p.bounding_box();
                    (r.width(), r.height())
                })
                .unwrap_or((0.0, 0.0)),
            Self::Text {
                content, font_size, ..
            } => {
                #[allow(clippy::cast_precision_loss)]
                let chars = content.chars().count() as f64;
                (chars * font_size * TEXT_ADVANCE, font_size * TEXT_LINE_HEIGHT)
            }
            Self::Image(data) => (
                f64::from(data.current.width),
                f64::from(data.current.height),
            ),
        }
    }

    /// Offset that moves the variant's own coordinates into its box.
    ///
    /// Polygon points and path data may start anywhere; the box always
    /// starts at `(0, 0)`.
    #[must_use]
    pub fn local_offset(&self) -> Point {
        match self {
            Self::Polygon { points } => {
                let b = BoundingBox::enclosing(points);
                Point::new(-b.min_x, -b.min_y)
            }
            Self::Path { data } => BezPath::from_svg(data)
                .map(|p| {
                    let r = p.bounding_box();
                    Point::new(-r.x0, -r.y0)
                })
                .unwrap_or_default(),
            _ => Point::default(),
        }
    }
}

/// Average glyph advance as a fraction of the font size.
const TEXT_ADVANCE: f64 = 0.6;
/// Line height as a multiple of the font size.
const TEXT_LINE_HEIGHT: f64 = 1.16;

/// A canvas object with content and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Human-readable label shown in the layers panel.
    pub name: String,
    /// Variant payload.
    pub kind: ObjectKind,
    /// Placement on the surface.
    pub transform: Transform,
    /// Fill color; `None` for images.
    pub fill: Option<String>,
    /// Opacity from 0.0 to 1.0.
    pub opacity: f64,
    /// Whether the object can be selected.
    pub selectable: bool,
    /// Whether the object receives pointer events.
    pub interactive: bool,
    /// Cached surface-space bounds.
    pub bounds: BoundingBox,
}

impl CanvasObject {
    /// Check geometry, placement, and opacity, as [`ObjectSpec::build`] does.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] for the first unusable value.
    pub fn validate(&self) -> CanvasResult<()> {
        self.kind.validate()?;
        self.transform.validate()?;
        validate_opacity(self.opacity)
    }

    /// Whether this is an image object.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.kind, ObjectKind::Image(_))
    }

    /// Image pixels, if this is an image object.
    #[must_use]
    pub fn image(&self) -> Option<&ImageData> {
        match &self.kind {
            ObjectKind::Image(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable image pixels, if this is an image object.
    pub fn image_mut(&mut self) -> Option<&mut ImageData> {
        match &mut self.kind {
            ObjectKind::Image(data) => Some(data),
            _ => None,
        }
    }

    /// Recompute the cached bounding box from the transform and geometry.
    pub fn refresh_bounds(&mut self) {
        let (w, h) = self.kind.intrinsic_size();
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ]
        .map(|c| self.transform.apply(c, (w, h)));
        self.bounds = BoundingBox::enclosing(&corners);
    }

    /// Apply a partial transform update and refresh bounds.
    pub fn patch_transform(&mut self, patch: &TransformPatch) {
        patch.apply_to(&mut self.transform);
        self.refresh_bounds();
    }

    /// Translate so the bounds center lands on `target`.
    pub fn center_on(&mut self, target: Point) {
        let current = self.bounds.center();
        self.transform.left += target.x - current.x;
        self.transform.top += target.y - current.y;
        self.refresh_bounds();
    }

    /// Check if a surface point hits this object's box.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let size = self.kind.intrinsic_size();
        self.transform
            .invert(Point::new(x, y), size)
            .is_some_and(|p| p.x >= 0.0 && p.x <= size.0 && p.y >= 0.0 && p.y <= size.1)
    }
}

/// Everything needed to construct a [`CanvasObject`].
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    /// Variant payload.
    pub kind: ObjectKind,
    /// Initial placement.
    pub transform: Transform,
    /// Fill color; ignored for images.
    pub fill: Option<String>,
    /// Explicit name; overrides the generated one.
    pub name: Option<String>,
    /// Label used for the generated name instead of the variant title.
    pub label: Option<String>,
    /// Opacity from 0.0 to 1.0.
    pub opacity: f64,
}

impl ObjectSpec {
    /// Builder for an arbitrary variant at the origin.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            transform: Transform::default(),
            fill: None,
            name: None,
            label: None,
            opacity: 1.0,
        }
    }

    /// A `width` x `height` rectangle.
    #[must_use]
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::new(ObjectKind::Rectangle {
            width,
            height,
            corner_radius: 0.0,
        })
    }

    /// A circle of `radius`.
    #[must_use]
    pub fn circle(radius: f64) -> Self {
        Self::new(ObjectKind::Circle { radius })
    }

    /// A triangle inside a `width` x `height` box.
    #[must_use]
    pub fn triangle(width: f64, height: f64) -> Self {
        Self::new(ObjectKind::Triangle { width, height })
    }

    /// A polygon through `points`.
    #[must_use]
    pub fn polygon(points: Vec<Point>) -> Self {
        Self::new(ObjectKind::Polygon { points })
    }

    /// An SVG path.
    #[must_use]
    pub fn path(data: impl Into<String>) -> Self {
        Self::new(ObjectKind::Path { data: data.into() })
    }

    /// A text label in Arial.
    #[must_use]
    pub fn text(content: impl Into<String>, font_size: f64) -> Self {
        Self::new(ObjectKind::Text {
            content: content.into(),
            font_size,
            font_family: "Arial".to_string(),
        })
    }

    /// An image object from decoded pixels.
    #[must_use]
    pub fn image(bitmap: Bitmap) -> Self {
        Self::new(ObjectKind::Image(ImageData::new(bitmap)))
    }

    /// Place the origin at `(left, top)`.
    #[must_use]
    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.transform.left = left;
        self.transform.top = top;
        self
    }

    /// Set the full transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the fill color.
    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Set an explicit name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the label used for the generated name.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Validate and build the object. `ordinal` is the 1-based number used
    /// in the generated name.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] for unusable geometry or opacity.
    pub fn build(self, ordinal: usize) -> CanvasResult<CanvasObject> {
        self.kind.validate()?;
        self.transform.validate()?;
        validate_opacity(self.opacity)?;

        let name = self.name.unwrap_or_else(|| {
            let label = self.label.as_deref().unwrap_or_else(|| self.kind.title());
            format!("{label} {ordinal}")
        });
        let fill = if self.kind.has_fill() {
            Some(self.fill.unwrap_or_else(|| DEFAULT_FILL.to_string()))
        } else {
            None
        };

        let mut object = CanvasObject {
            id: ObjectId::new(),
            name,
            kind: self.kind,
            transform: self.transform,
            fill,
            opacity: self.opacity,
            selectable: true,
            interactive: true,
            bounds: BoundingBox::default(),
        };
        object.refresh_bounds();
        Ok(object)
    }
}

fn validate_opacity(opacity: f64) -> CanvasResult<()> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(CanvasError::Validation(format!(
            "opacity must be within 0..=1, got {opacity}"
        )))
    }
}

/// Fill used when a shape is created without a color.
pub const DEFAULT_FILL: &str = "#ff0000";

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_name_uses_variant_title() {
        let obj = ObjectSpec::rectangle(100.0, 100.0).build(1).expect("build");
        assert_eq!(obj.name, "Rectangle 1");
        assert_eq!(obj.fill.as_deref(), Some(DEFAULT_FILL));

        let obj = ObjectSpec::circle(5.0).with_label("Tag").build(7).expect("build");
        assert_eq!(obj.name, "Tag 7");
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(matches!(
            ObjectSpec::circle(-1.0).build(1),
            Err(CanvasError::Validation(_))
        ));
        assert!(ObjectSpec::rectangle(f64::NAN, 1.0).build(1).is_err());
        assert!(ObjectSpec::polygon(vec![Point::new(0.0, 0.0)]).build(1).is_err());
        assert!(ObjectSpec::text("   ", 24.0).build(1).is_err());
        assert!(ObjectSpec::path("not a path").build(1).is_err());
        assert!(ObjectSpec::rectangle(1.0, 1.0)
            .with_opacity(1.5)
            .build(1)
            .is_err());
    }

    #[test]
    fn test_rejects_non_finite_transform() {
        let err = ObjectSpec::rectangle(10.0, 10.0)
            .at(f64::NAN, 0.0)
            .build(1)
            .expect_err("nan left");
        assert!(matches!(err, CanvasError::Validation(ref msg) if msg.contains("left")));

        let mut transform = Transform::at(5.0, 5.0);
        transform.scale_y = f64::INFINITY;
        assert!(ObjectSpec::circle(3.0).with_transform(transform).build(1).is_err());

        transform.scale_y = 1.0;
        transform.angle = f64::NEG_INFINITY;
        assert!(ObjectSpec::circle(3.0).with_transform(transform).build(1).is_err());
    }

    #[test]
    fn test_object_validate_matches_build() {
        let mut obj = ObjectSpec::rectangle(10.0, 10.0).build(1).expect("build");
        obj.validate().expect("valid");

        obj.opacity = 5.0;
        assert!(matches!(obj.validate(), Err(CanvasError::Validation(_))));

        obj.opacity = 1.0;
        obj.transform.top = f64::NAN;
        assert!(obj.validate().is_err());
    }

    #[test]
    fn test_images_have_no_fill() {
        let bmp = Bitmap::solid(4, 2, [0, 0, 0, 255]).expect("bitmap");
        let obj = ObjectSpec::image(bmp).with_fill("#00ff00").build(1).expect("build");
        assert!(obj.fill.is_none());
        assert_eq!(obj.kind.intrinsic_size(), (4.0, 2.0));
    }

    #[test]
    fn test_bounds_follow_scale_and_origin() {
        let mut obj = ObjectSpec::rectangle(100.0, 50.0)
            .at(10.0, 20.0)
            .build(1)
            .expect("build");
        assert!(approx(obj.bounds.min_x, 10.0));
        assert!(approx(obj.bounds.max_y, 70.0));

        obj.transform.origin = Origin::Center;
        obj.patch_transform(&TransformPatch::scale(2.0));
        assert!(approx(obj.bounds.min_x, -90.0));
        assert!(approx(obj.bounds.max_x, 110.0));
        assert!(approx(obj.bounds.min_y, -30.0));
    }

    #[test]
    fn test_rotation_widens_bounds() {
        let mut obj = ObjectSpec::rectangle(100.0, 100.0).build(1).expect("build");
        obj.transform.origin = Origin::Center;
        obj.patch_transform(&TransformPatch {
            angle: Some(45.0),
            ..TransformPatch::default()
        });
        let diag = 100.0 * std::f64::consts::SQRT_2;
        assert!((obj.bounds.width() - diag).abs() < 1e-6);
    }

    #[test]
    fn test_patch_leaves_unset_fields() {
        let mut obj = ObjectSpec::triangle(10.0, 10.0)
            .at(5.0, 6.0)
            .build(1)
            .expect("build");
        obj.patch_transform(&TransformPatch {
            angle: Some(30.0),
            ..TransformPatch::default()
        });
        assert!(approx(obj.transform.left, 5.0));
        assert!(approx(obj.transform.top, 6.0));
        assert!(approx(obj.transform.angle, 30.0));
    }

    #[test]
    fn test_contains_point_with_rotation() {
        let mut obj = ObjectSpec::rectangle(100.0, 10.0)
            .at(50.0, 50.0)
            .build(1)
            .expect("build");
        obj.transform.origin = Origin::Center;
        obj.patch_transform(&TransformPatch {
            angle: Some(90.0),
            ..TransformPatch::default()
        });
        assert!(obj.contains_point(50.0, 90.0));
        assert!(!obj.contains_point(90.0, 50.0));
    }

    #[test]
    fn test_polygon_box_starts_at_zero() {
        let kind = ObjectKind::Polygon {
            points: vec![
                Point::new(-50.0, -20.0),
                Point::new(50.0, -20.0),
                Point::new(0.0, 30.0),
            ],
        };
        assert_eq!(kind.intrinsic_size(), (100.0, 50.0));
        assert_eq!(kind.local_offset(), Point::new(50.0, 20.0));
    }

    #[test]
    fn test_center_on_moves_bounds_center() {
        let mut obj = ObjectSpec::circle(50.0).at(100.0, 100.0).build(1).expect("build");
        obj.center_on(Point::new(300.0, 169.0));
        let c = obj.bounds.center();
        assert!(approx(c.x, 300.0));
        assert!(approx(c.y, 169.0));
    }
}
