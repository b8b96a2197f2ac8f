//! Landsat 8 surface reflectance scaling, QA masking and median compositing.
//!
//! These helpers only assemble expression graphs; the radiometry and the
//! reduction run on the remote service.

use crate::core::expression::{ImageExpr, ResamplingMethod};

/// Scale factor applied to the optical `SR_B.` bands
const OPTICAL_SCALE: f64 = 0.0000275;
/// Offset applied to the optical `SR_B.` bands
const OPTICAL_OFFSET: f64 = -0.2;
/// Scale factor applied to the thermal `ST_B.*` bands
const THERMAL_SCALE: f64 = 0.00341802;
/// Offset applied to the thermal `ST_B.*` bands (Kelvin)
const THERMAL_OFFSET: f64 = 149.0;

/// QA_PIXEL bits masked out when cloud masking is enabled:
/// bit 0 fill, bit 1 dilated cloud, bit 2 cirrus, bit 3 cloud,
/// bit 4 cloud shadow.
const QA_PIXEL_MASK_BITS: i64 = 0b11111;

/// Apply radiometric scaling factors to a Landsat 8 surface reflectance
/// image, optionally masking clouds and saturated pixels.
///
/// Optical and thermal bands are rescaled to reflectance and Kelvin and
/// overwrite the originals. When `do_mask` is set, pixels flagged by the
/// CFMASK quality band (`QA_PIXEL`) or with any radiometric saturation
/// (`QA_RADSAT != 0`) are masked out. The masks are derived from the input
/// image before the scaled bands replace the originals.
pub fn scale_and_mask_landsat8_sr(image: &ImageExpr, do_mask: bool) -> ImageExpr {
    let optical = image
        .select("SR_B.")
        .multiply(OPTICAL_SCALE)
        .add(OPTICAL_OFFSET);
    let thermal = image
        .select("ST_B.*")
        .multiply(THERMAL_SCALE)
        .add(THERMAL_OFFSET);

    let scaled = image
        .add_bands(&optical, true)
        .add_bands(&thermal, true);

    if do_mask {
        let qa_mask = image
            .select("QA_PIXEL")
            .bitwise_and(ImageExpr::constant_int(QA_PIXEL_MASK_BITS))
            .eq(ImageExpr::constant_int(0));
        let saturation_mask = image.select("QA_RADSAT").eq(ImageExpr::constant_int(0));

        scaled.update_mask(&qa_mask).update_mask(&saturation_mask)
    } else {
        scaled
    }
}

/// Build a pixel-wise median composite of a Landsat 8 surface reflectance
/// collection, scaling and masking each image first.
pub fn create_composite_landsat8_sr(collection: &ImageExpr, do_mask: bool) -> ImageExpr {
    collection
        .map(|image| scale_and_mask_landsat8_sr(&image, do_mask))
        .median()
}

/// Set the resampling method used for every image of a collection
pub fn set_resampling_method(collection: &ImageExpr, method: ResamplingMethod) -> ImageExpr {
    collection.map(|image| image.resample(method))
}
