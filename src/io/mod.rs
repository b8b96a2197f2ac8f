//! I/O module for fetching pixels from the remote service

pub mod pixels;

pub use pixels::{build_pixel_request, PixelService};
