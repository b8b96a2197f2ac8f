//! Rasterization of vector outlines into label masks.

use crate::core::expression::{Filter, ImageExpr, Reducer};

/// Build a label mask from a feature collection of outlines.
///
/// Pixels covered by an outline take the feature's `label` attribute value
/// (first overlapping feature wins); uncovered pixels stay masked. An
/// optional filter includes or excludes outlines before rasterization. With
/// `make_binary` set, every label greater than zero collapses to 1, giving a
/// plain 0/1 mask.
pub fn create_outline_mask(
    asset_path: &str,
    filter: Option<&Filter>,
    make_binary: bool,
) -> ImageExpr {
    let mut outlines = ImageExpr::feature_collection(asset_path);
    if let Some(filter) = filter {
        outlines = outlines.filter(filter);
    }

    let mask = outlines.reduce_to_image(&["label"], Reducer::First);

    if make_binary {
        mask.where_(&mask.gt(0.0), 1.0)
    } else {
        mask
    }
}
