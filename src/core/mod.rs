//! Expression-graph construction modules

pub mod expression;
pub mod composite;
pub mod mask;

// Re-export main types
pub use expression::{Filter, ImageExpr, Reducer, ResamplingMethod};
pub use composite::{create_composite_landsat8_sr, scale_and_mask_landsat8_sr, set_resampling_method};
pub use mask::create_outline_mask;
