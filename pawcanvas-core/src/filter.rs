//! Per-pixel image filters.
//!
//! Filters always run against an image's original pixels, never against a
//! previously filtered result, so switching between them never compounds.
//! Every step writes back to 8-bit channels (clamped, rounded half to even)
//! before the next step reads them. Alpha is never touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Bitmap, CanvasError};

/// Default amount for [`Filter::Brightness`].
pub const DEFAULT_BRIGHTNESS: f64 = 0.2;
/// Default amount for [`Filter::Contrast`].
pub const DEFAULT_CONTRAST: f64 = 0.15;

/// A named filter that can be applied to an image object.
///
/// Serialized as its name (`"sepia"`, `"brightness(0.3)"`, ...); `normal`
/// restores the undecorated image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Filter {
    /// No filter, original pixels.
    #[default]
    Normal,
    /// `avg = R + (G+B)/3`, written to all three channels.
    Grayscale,
    /// Classic sepia matrix.
    Sepia,
    /// Adds `255 * amount` to every channel.
    Brightness(f64),
    /// Scales channels around mid-grey by the contrast factor for `amount`.
    Contrast(f64),
    /// Sepia, then contrast 0.15, then brightness 0.1.
    Vintage,
    /// Brightness 0.2, then contrast 0.15.
    Bright,
}

/// A single primitive pixel operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStep {
    /// Asymmetric grayscale average.
    Grayscale,
    /// Sepia tone matrix.
    Sepia,
    /// Additive brightness.
    Brightness(f64),
    /// Contrast around 128.
    Contrast(f64),
}

impl Filter {
    /// The ordered primitive steps this filter runs.
    #[must_use]
    pub fn steps(self) -> Vec<FilterStep> {
        match self {
            Self::Normal => Vec::new(),
            Self::Grayscale => vec![FilterStep::Grayscale],
            Self::Sepia => vec![FilterStep::Sepia],
            Self::Brightness(amount) => vec![FilterStep::Brightness(amount)],
            Self::Contrast(amount) => vec![FilterStep::Contrast(amount)],
            Self::Vintage => vec![
                FilterStep::Sepia,
                FilterStep::Contrast(DEFAULT_CONTRAST),
                FilterStep::Brightness(0.1),
            ],
            Self::Bright => vec![
                FilterStep::Brightness(DEFAULT_BRIGHTNESS),
                FilterStep::Contrast(DEFAULT_CONTRAST),
            ],
        }
    }

    /// Whether this filter leaves the image untouched.
    #[must_use]
    pub fn is_normal(self) -> bool {
        self == Self::Normal
    }

    /// Run the filter over a copy of `original`.
    #[must_use]
    pub fn apply(self, original: &Bitmap) -> Bitmap {
        let mut out = original.clone();
        for step in self.steps() {
            step.apply_in_place(out.pixels_mut());
        }
        out
    }
}

impl FilterStep {
    /// Apply this step to an RGBA buffer.
    pub fn apply_in_place(self, data: &mut [u8]) {
        for px in data.chunks_exact_mut(4) {
            let r = f64::from(px[0]);
            let g = f64::from(px[1]);
            let b = f64::from(px[2]);
            let [nr, ng, nb] = match self {
                Self::Grayscale => {
                    let avg = r + (g + b) / 3.0;
                    [avg, avg, avg]
                }
                Self::Sepia => [
                    r * 0.393 + g * 0.769 + b * 0.189,
                    r * 0.349 + g * 0.686 + b * 0.168,
                    r * 0.272 + g * 0.534 + b * 0.131,
                ],
                Self::Brightness(amount) => {
                    let delta = 255.0 * amount;
                    [r + delta, g + delta, b + delta]
                }
                Self::Contrast(amount) => {
                    let factor = contrast_factor(amount);
                    [
                        factor * (r - 128.0) + 128.0,
                        factor * (g - 128.0) + 128.0,
                        factor * (b - 128.0) + 128.0,
                    ]
                }
            };
            px[0] = clamp_channel(nr);
            px[1] = clamp_channel(ng);
            px[2] = clamp_channel(nb);
        }
    }
}

/// `259·(100·amount+255) / (255·(259−100·amount))`
#[must_use]
pub fn contrast_factor(amount: f64) -> f64 {
    let value = amount * 100.0;
    (259.0 * (value + 255.0)) / (255.0 * (259.0 - value))
}

/// Store a channel value the way a clamped byte array does.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Grayscale => f.write_str("grayscale"),
            Self::Sepia => f.write_str("sepia"),
            #[allow(clippy::float_cmp)]
            Self::Brightness(a) if *a == DEFAULT_BRIGHTNESS => f.write_str("brightness"),
            Self::Brightness(a) => write!(f, "brightness({a})"),
            #[allow(clippy::float_cmp)]
            Self::Contrast(a) if *a == DEFAULT_CONTRAST => f.write_str("contrast"),
            Self::Contrast(a) => write!(f, "contrast({a})"),
            Self::Vintage => f.write_str("vintage"),
            Self::Bright => f.write_str("bright"),
        }
    }
}

impl FromStr for Filter {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let (head, amount) = match name.split_once('(') {
            Some((head, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(|| {
                    CanvasError::Validation(format!("unterminated filter amount: {s}"))
                })?;
                let amount: f64 = inner.trim().parse().map_err(|_| {
                    CanvasError::Validation(format!("invalid filter amount: {s}"))
                })?;
                if !amount.is_finite() {
                    return Err(CanvasError::Validation(format!(
                        "filter amount must be finite: {s}"
                    )));
                }
                (head.trim().to_string(), Some(amount))
            }
            None => (name, None),
        };

        match (head.as_str(), amount) {
            ("" | "none" | "normal" | "null", None) => Ok(Self::Normal),
            ("grayscale", None) => Ok(Self::Grayscale),
            ("sepia", None) => Ok(Self::Sepia),
            ("vintage", None) => Ok(Self::Vintage),
            ("bright", None) => Ok(Self::Bright),
            ("brightness", a) => Ok(Self::Brightness(a.unwrap_or(DEFAULT_BRIGHTNESS))),
            ("contrast", a) => Ok(Self::Contrast(a.unwrap_or(DEFAULT_CONTRAST))),
            _ => Err(CanvasError::Validation(format!("unknown filter: {s}"))),
        }
    }
}

impl TryFrom<String> for Filter {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Filter> for String {
    fn from(filter: Filter) -> Self {
        filter.to_string()
    }
}
