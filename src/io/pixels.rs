use crate::types::{
    AffineTransform, EeError, EeResult, GridDimensions, Patch, PixelGrid, PixelRequest,
    PixelResult,
};
use std::time::Duration;

/// Default timeout for a single computePixels call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the wire-format pixel request for a patch.
///
/// Grid dimensions are the integer truncation of `abs(extent / scale)`.
/// Truncation (not rounding) matches the service convention; non-integral
/// extent/scale ratios lose the fractional pixel. The affine transform is
/// axis-aligned: shear terms are fixed at zero.
pub fn build_pixel_request(patch: &Patch) -> EeResult<PixelRequest> {
    patch.validate()?;

    let width = (patch.width / patch.scale_x).abs() as u32;
    let height = (patch.height / patch.scale_y).abs() as u32;

    Ok(PixelRequest {
        expression: patch.image.clone(),
        file_format: patch.file_format,
        grid: PixelGrid {
            dimensions: GridDimensions { width, height },
            affine_transform: AffineTransform {
                scale_x: patch.scale_x,
                shear_x: 0.0,
                translate_x: patch.translate_x,
                shear_y: 0.0,
                scale_y: patch.scale_y,
                translate_y: patch.translate_y,
            },
            crs_code: patch.crs.clone(),
        },
    })
}

/// Blocking client for the remote pixel-computation endpoint
pub struct PixelService {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl PixelService {
    /// Create a client for the service rooted at `base_url` (for example
    /// `https://earthengine.googleapis.com/v1/projects/my-project`),
    /// authenticating every call with the given bearer token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> EeResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(PixelService {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Fetch the pixels of a single patch from the remote service.
    ///
    /// Builds the request, POSTs it to the `image:computePixels` endpoint and
    /// returns the raw response bytes together with the patch's name and id
    /// (carried through unchanged for downstream file naming). The call is
    /// synchronous and makes a single attempt; any retry policy belongs to
    /// the caller.
    pub fn fetch_pixels(&self, patch: &Patch) -> EeResult<PixelResult> {
        let request = build_pixel_request(patch)?;
        let url = format!("{}/image:computePixels", self.base_url);

        log::info!(
            "Fetching patch '{}' ({}x{} px, {}) from {}",
            patch.name,
            request.grid.dimensions.width,
            request.grid.dimensions.height,
            request.file_format,
            url
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "<unreadable response body>".to_string());
            log::warn!("Pixel fetch for '{}' failed: {} {}", patch.name, status, message);
            return Err(EeError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let pixels = response.bytes()?.to_vec();
        log::debug!("Received {} bytes for patch '{}'", pixels.len(), patch.name);

        Ok(PixelResult {
            pixels,
            name: patch.name.clone(),
            id: patch.id.clone(),
        })
    }
}
