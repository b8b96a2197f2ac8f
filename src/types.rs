use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::expression::ImageExpr;

/// Output encoding requested from the pixel service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "NPY")]
    Npy,
    #[serde(rename = "GEO_TIFF")]
    GeoTiff,
    #[serde(rename = "ZIPPED_GEO_TIFF")]
    ZippedGeoTiff,
    #[serde(rename = "PNG")]
    Png,
    #[serde(rename = "JPEG")]
    Jpeg,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Npy => write!(f, "NPY"),
            FileFormat::GeoTiff => write!(f, "GEO_TIFF"),
            FileFormat::ZippedGeoTiff => write!(f, "ZIPPED_GEO_TIFF"),
            FileFormat::Png => write!(f, "PNG"),
            FileFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Description of a rectangular image patch to fetch from the pixel service.
///
/// Width, height and the scale factors are in the physical units of the
/// coordinate reference system (meters for projected systems). `scale_y` is
/// conventionally negative for north-up rasters. `id` is an opaque
/// caller-defined value carried through to the result unchanged, for
/// downstream file naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    pub image: ImageExpr,
    pub file_format: FileFormat,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub crs: String,
    pub name: String,
    pub id: Value,
}

impl Patch {
    /// Check that the descriptor can produce a well-defined sampling grid.
    ///
    /// Zero or non-finite scales would yield NaN or infinite grid dimensions;
    /// those are rejected here rather than surfacing as a silently wrong
    /// request downstream.
    pub fn validate(&self) -> EeResult<()> {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return Err(EeError::InvalidPatch(format!(
                "pixel scale must be non-zero (scale_x={}, scale_y={})",
                self.scale_x, self.scale_y
            )));
        }
        if !self.scale_x.is_finite() || !self.scale_y.is_finite() {
            return Err(EeError::InvalidPatch(format!(
                "pixel scale must be finite (scale_x={}, scale_y={})",
                self.scale_x, self.scale_y
            )));
        }
        if !(self.width >= 0.0) || !(self.height >= 0.0) {
            return Err(EeError::InvalidPatch(format!(
                "patch extent must be non-negative (width={}, height={})",
                self.width, self.height
            )));
        }
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(EeError::InvalidPatch(format!(
                "patch extent must be finite (width={}, height={})",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Integer dimensions of the sampling grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

/// Six-parameter affine mapping from pixel grid coordinates to geographic
/// coordinates. The request builder only produces axis-aligned grids, so the
/// shear terms are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    pub scale_x: f64,
    pub shear_x: f64,
    pub translate_x: f64,
    pub shear_y: f64,
    pub scale_y: f64,
    pub translate_y: f64,
}

/// Sampling grid: dimensions, pixel-to-geo transform and CRS
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelGrid {
    pub dimensions: GridDimensions,
    pub affine_transform: AffineTransform,
    pub crs_code: String,
}

/// Wire-format request for the `image:computePixels` endpoint.
///
/// Derived entirely from a [`Patch`]; constructed, sent and discarded within
/// a single fetch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelRequest {
    pub expression: ImageExpr,
    pub file_format: FileFormat,
    pub grid: PixelGrid,
}

/// Raw pixel bytes plus the name/id of the patch that produced them
#[derive(Debug, Clone)]
pub struct PixelResult {
    pub pixels: Vec<u8>,
    pub name: String,
    pub id: Value,
}

/// Error types for pixel service operations
#[derive(Debug, thiserror::Error)]
pub enum EeError {
    #[error("Invalid patch descriptor: {0}")]
    InvalidPatch(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pixel service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for pixel service operations
pub type EeResult<T> = Result<T, EeError>;
