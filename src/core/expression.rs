//! Declarative image expression graphs.
//!
//! All image algebra in this crate is expressed as a serializable graph that
//! the remote service evaluates. Nothing here touches pixels: each combinator
//! only wraps its operands in a new function-invocation node. The resulting
//! value is forwarded to the service byte-for-byte by the request builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// An opaque, serializable image (or collection) expression.
///
/// Wraps the JSON graph directly, so arbitrary service-defined expressions
/// can be passed through via [`ImageExpr::from_value`] without this crate
/// understanding them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageExpr(Value);

/// Resampling method applied per image before reprojection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplingMethod {
    Bilinear,
    Bicubic,
}

impl std::fmt::Display for ResamplingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResamplingMethod::Bilinear => write!(f, "bilinear"),
            ResamplingMethod::Bicubic => write!(f, "bicubic"),
        }
    }
}

/// Reducer applied when rasterizing feature properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Value of the first overlapping feature wins
    First,
    /// Pixel-wise median across overlapping features
    Median,
}

impl Reducer {
    fn to_node(self) -> Value {
        let name = match self {
            Reducer::First => "Reducer.first",
            Reducer::Median => "Reducer.median",
        };
        json!({ "functionName": name, "arguments": {} })
    }
}

/// Predicate over collection elements, serialized as a filter node
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Property equals a constant
    Eq { name: String, value: Value },
    /// Property does not equal a constant
    NotEq { name: String, value: Value },
    /// Element timestamp falls within [start, end)
    DateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// All sub-filters hold
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(name: &str, value: impl Into<Value>) -> Self {
        Filter::Eq {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn not_eq(name: &str, value: impl Into<Value>) -> Self {
        Filter::NotEq {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Filter::DateRange { start, end }
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub(crate) fn to_node(&self) -> Value {
        match self {
            Filter::Eq { name, value } => json!({
                "functionName": "Filter.equals",
                "arguments": {
                    "leftField": name,
                    "rightValue": { "constantValue": value },
                }
            }),
            Filter::NotEq { name, value } => json!({
                "functionName": "Filter.notEquals",
                "arguments": {
                    "leftField": name,
                    "rightValue": { "constantValue": value },
                }
            }),
            Filter::DateRange { start, end } => json!({
                "functionName": "Filter.dateRangeContains",
                "arguments": {
                    "leftValue": {
                        "start": start.to_rfc3339(),
                        "end": end.to_rfc3339(),
                    },
                    "rightField": "system:time_start",
                }
            }),
            Filter::And(filters) => json!({
                "functionName": "Filter.and",
                "arguments": {
                    "filters": filters.iter().map(Filter::to_node).collect::<Vec<_>>(),
                }
            }),
        }
    }
}

impl ImageExpr {
    /// Load a single image asset by id
    pub fn image(asset_id: &str) -> Self {
        Self::invoke("Image.load", json!({ "id": asset_id }))
    }

    /// Load an image collection asset by id
    pub fn collection(asset_id: &str) -> Self {
        Self::invoke("ImageCollection.load", json!({ "id": asset_id }))
    }

    /// Load a feature collection (vector) asset by id
    pub fn feature_collection(asset_id: &str) -> Self {
        Self::invoke("FeatureCollection.load", json!({ "id": asset_id }))
    }

    /// Constant-valued image
    pub fn constant(value: f64) -> Self {
        Self::invoke("Image.constant", json!({ "value": value }))
    }

    /// Constant-valued image with an integer value (exact bitmask semantics)
    pub fn constant_int(value: i64) -> Self {
        Self::invoke("Image.constant", json!({ "value": value }))
    }

    /// Wrap a pre-built expression graph without interpreting it
    pub fn from_value(value: Value) -> Self {
        ImageExpr(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn invoke(function_name: &str, arguments: Value) -> Self {
        ImageExpr(json!({
            "functionName": function_name,
            "arguments": arguments,
        }))
    }

    /// Select bands matching a name or regular expression pattern
    pub fn select(&self, pattern: &str) -> Self {
        Self::invoke(
            "Image.select",
            json!({ "input": self.0, "bandSelectors": [pattern] }),
        )
    }

    pub fn multiply(&self, other: impl Into<ImageExpr>) -> Self {
        self.binary("Image.multiply", other)
    }

    pub fn add(&self, other: impl Into<ImageExpr>) -> Self {
        self.binary("Image.add", other)
    }

    pub fn bitwise_and(&self, other: impl Into<ImageExpr>) -> Self {
        self.binary("Image.bitwiseAnd", other)
    }

    pub fn eq(&self, other: impl Into<ImageExpr>) -> Self {
        self.binary("Image.eq", other)
    }

    pub fn gt(&self, other: impl Into<ImageExpr>) -> Self {
        self.binary("Image.gt", other)
    }

    fn binary(&self, function_name: &str, other: impl Into<ImageExpr>) -> Self {
        Self::invoke(
            function_name,
            json!({ "image1": self.0, "image2": other.into().0 }),
        )
    }

    /// Replace pixels where `test` is non-zero with `value`
    pub fn where_(&self, test: &ImageExpr, value: impl Into<ImageExpr>) -> Self {
        Self::invoke(
            "Image.where",
            json!({ "input": self.0, "test": test.0, "value": value.into().0 }),
        )
    }

    /// Mask out pixels where `mask` is zero
    pub fn update_mask(&self, mask: &ImageExpr) -> Self {
        Self::invoke(
            "Image.updateMask",
            json!({ "image": self.0, "mask": mask.0 }),
        )
    }

    /// Append the bands of `src`; with `overwrite` set, bands whose names
    /// already exist replace the originals in place.
    pub fn add_bands(&self, src: &ImageExpr, overwrite: bool) -> Self {
        Self::invoke(
            "Image.addBands",
            json!({ "dstImg": self.0, "srcImg": src.0, "overwrite": overwrite }),
        )
    }

    /// Set the resampling method used when the service reprojects this image
    pub fn resample(&self, method: ResamplingMethod) -> Self {
        Self::invoke(
            "Image.resample",
            json!({ "image": self.0, "mode": method.to_string() }),
        )
    }

    /// Apply a per-image function over a collection.
    ///
    /// The closure receives a placeholder expression standing for each
    /// element; whatever graph it returns becomes the mapped function body.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnOnce(ImageExpr) -> ImageExpr,
    {
        let body = f(ImageExpr(json!({ "argumentReference": "image" })));
        Self::invoke(
            "ImageCollection.map",
            json!({
                "collection": self.0,
                "baseAlgorithm": {
                    "functionDefinition": {
                        "argumentNames": ["image"],
                        "body": body.0,
                    }
                },
            }),
        )
    }

    /// Pixel-wise median over a collection
    pub fn median(&self) -> Self {
        Self::invoke("reduce.median", json!({ "collection": self.0 }))
    }

    /// Keep only the elements matching `filter`
    pub fn filter(&self, filter: &Filter) -> Self {
        Self::invoke(
            "Collection.filter",
            json!({ "collection": self.0, "filter": filter.to_node() }),
        )
    }

    /// Keep only elements whose timestamp falls within [start, end)
    pub fn filter_date(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.filter(&Filter::date_range(start, end))
    }

    /// Rasterize feature properties into image bands using `reducer` to
    /// combine overlapping features
    pub fn reduce_to_image(&self, properties: &[&str], reducer: Reducer) -> Self {
        Self::invoke(
            "FeatureCollection.reduceToImage",
            json!({
                "collection": self.0,
                "properties": properties,
                "reducer": reducer.to_node(),
            }),
        )
    }
}

impl From<f64> for ImageExpr {
    fn from(value: f64) -> Self {
        ImageExpr::constant(value)
    }
}

impl From<i64> for ImageExpr {
    fn from(value: i64) -> Self {
        ImageExpr::constant_int(value)
    }
}

impl From<&ImageExpr> for ImageExpr {
    fn from(expr: &ImageExpr) -> Self {
        expr.clone()
    }
}
