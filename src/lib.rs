//! eepatch: typed helpers for a remote Earth Engine style pixel service
//!
//! This library builds declarative image-expression graphs (Landsat 8
//! scaling and cloud masking, median composites, vector label masks) and
//! fetches rectangular pixel patches from the remote service that evaluates
//! them. No image algebra runs locally; the crate constructs requests and
//! forwards them.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    AffineTransform, EeError, EeResult, FileFormat, GridDimensions, Patch, PixelGrid,
    PixelRequest, PixelResult,
};

pub use crate::core::{
    create_composite_landsat8_sr, create_outline_mask, scale_and_mask_landsat8_sr,
    set_resampling_method, Filter, ImageExpr, Reducer, ResamplingMethod,
};

pub use crate::io::{build_pixel_request, PixelService};
