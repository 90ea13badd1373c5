//! Ready-made decorations: the star shape and the pet overlays.

use std::f64::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    CanvasDocument, CanvasError, CanvasResult, ObjectId, ObjectKind, ObjectSpec, Point, Transform,
};

/// Paw print: four toes and a pad.
pub const PAW_PATH: &str = "M25,25 C33,20 38,25 40,40 C42,55 38,60 30,65 C22,60 18,55 20,40 \
C22,25 27,20 35,25 M45,5 C53,0 58,5 60,20 C62,35 58,40 50,45 C42,40 38,35 40,20 C42,5 47,0 55,5 \
M65,5 C73,0 78,5 80,20 C82,35 78,40 70,45 C62,40 58,35 60,20 C62,5 67,0 75,5 M85,25 C93,20 \
98,25 100,40 C102,55 98,60 90,65 C82,60 78,55 80,40 C82,25 87,20 95,25 M60,75 C70,60 80,60 \
90,75 C100,90 90,105 60,105 C30,105 20,90 30,75 C40,60 50,60 60,75";

/// Party hat.
pub const HAT_PATH: &str = "M10,50 L90,50 L80,10 C65,0 35,0 20,10 Z";

/// Color of the collar tag.
pub const TAG_FILL: &str = "rgba(255, 215, 0, 0.9)";

const PRESET_LEFT: f64 = 100.0;
const PRESET_TOP: f64 = 100.0;

/// A built-in decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Five-pointed star polygon.
    Star,
    /// Paw print path at half scale.
    Paw,
    /// Party hat path.
    Hat,
    /// Rounded collar plus a gold tag.
    Collar,
}

impl Preset {
    /// All presets.
    pub const ALL: [Self; 4] = [Self::Star, Self::Paw, Self::Hat, Self::Collar];

    /// Layer label used for generated names.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Star => "Star",
            Self::Paw => "Paw",
            Self::Hat => "Hat",
            Self::Collar => "Collar",
        }
    }
}

impl FromStr for Preset {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "star" => Ok(Self::Star),
            "paw" => Ok(Self::Paw),
            "hat" => Ok(Self::Hat),
            "collar" => Ok(Self::Collar),
            other => Err(CanvasError::Validation(format!("unknown preset: {other}"))),
        }
    }
}

/// Ten alternating outer/inner vertices, starting at the bottom point.
#[must_use]
pub fn star_points(outer: f64, inner: f64) -> Vec<Point> {
    (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = PI / 5.0 * f64::from(i);
            Point::new(radius * angle.sin(), radius * angle.cos())
        })
        .collect()
}

impl CanvasDocument {
    /// Add a preset decoration in `fill` at the usual spot.
    ///
    /// Returns the ids added, back to front. The collar's tag goes in first,
    /// so the collar band ends up in front and active.
    ///
    /// # Errors
    ///
    /// Propagates validation errors from [`CanvasDocument::add_object`].
    pub fn add_preset(&mut self, preset: Preset, fill: &str) -> CanvasResult<Vec<ObjectId>> {
        let ordinal = self.objects().len() + 1;
        let placed = |spec: ObjectSpec| {
            spec.with_transform(Transform::at(PRESET_LEFT, PRESET_TOP))
                .with_fill(fill)
                .with_label(preset.label())
        };

        let ids = match preset {
            Preset::Star => vec![self.add_object(placed(ObjectSpec::polygon(star_points(
                50.0, 25.0,
            ))))?],
            Preset::Paw => {
                let mut spec = placed(ObjectSpec::path(PAW_PATH));
                spec.transform.scale_x = 0.5;
                spec.transform.scale_y = 0.5;
                vec![self.add_object(spec)?]
            }
            Preset::Hat => vec![self.add_object(placed(ObjectSpec::path(HAT_PATH)))?],
            Preset::Collar => {
                let tag = self.add_object(
                    ObjectSpec::circle(15.0)
                        .at(190.0, 120.0)
                        .with_fill(TAG_FILL)
                        .with_name(format!("Tag {}", ordinal + 1)),
                )?;
                let band = self.add_object(
                    placed(ObjectSpec::new(ObjectKind::Rectangle {
                        width: 200.0,
                        height: 40.0,
                        corner_radius: 20.0,
                    }))
                    .with_name(format!("Collar {ordinal}")),
                )?;
                vec![tag, band]
            }
        };
        tracing::debug!("Added {} preset ({} objects)", preset.label(), ids.len());
        Ok(ids)
    }
}
