//! Pure rendering of an upload result into the dashboard view-model.
//!
//! Nothing here performs I/O; the controller owns the current view and the
//! front-end decides how to draw it.

use shared::{domain::DetectedObject, protocol::UploadResult};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    fn when(condition: bool) -> Self {
        if condition {
            Self::Shown
        } else {
            Self::Hidden
        }
    }

    pub fn is_shown(self) -> bool {
        self == Self::Shown
    }
}

/// One detection: a bar sized by confidence and its accuracy label.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub name: String,
    /// Filled share of the bar, clamped to `0.0..=1.0`.
    pub bar_fraction: f64,
    /// CSS-style width, e.g. `"87.3%"`, clamped to `0%..=100%`.
    pub bar_width: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryView {
    pub visibility: Visibility,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultDetails {
    pub dominant_color: Option<String>,
    pub shapes: Vec<String>,
    pub dimensions: Option<String>,
    pub uniqueness_score: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub results_area: Visibility,
    pub processed_image_src: String,
    /// Full response, pretty printed with the server's key order.
    pub raw_json: String,
    pub formatted_results: Vec<ResultRow>,
    pub extracted: GalleryView,
    pub related: GalleryView,
    pub details: ResultDetails,
}

/// Builds the view for a successful upload.
///
/// `raw` is the response body as received, so fields this client does not
/// model still appear in the raw panel. Relative asset URLs are resolved
/// against `base`.
pub fn render_upload_result(
    result: &UploadResult,
    raw: &serde_json::Value,
    base: &Url,
) -> DashboardView {
    DashboardView {
        results_area: Visibility::Shown,
        processed_image_src: resolve_asset_url(base, &result.processed_image_url),
        raw_json: serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string()),
        formatted_results: result.objects.iter().map(render_row).collect(),
        extracted: render_gallery(base, &result.extracted_items_urls),
        related: render_gallery(base, &result.related_images),
        details: render_details(result),
    }
}

/// `0.873` -> `"87.3%"`.
///
/// The percentage is rounded once, from its exact binary value, with exact
/// ties going away from zero.
pub fn format_confidence(confidence: f64) -> String {
    format!("{}%", percent_to_fixed(confidence * 100.0))
}

pub fn resolve_asset_url(base: &Url, raw: &str) -> String {
    base.join(raw)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn percent_to_fixed(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0.0".into();
    }
    // A double sits exactly on a hundredths `5` only when it is a whole
    // number of quarters with an odd count (`x.25`, `x.75`).
    let quarters = value.abs() * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        let tenths = (value.abs() * 10.0 + 0.5).floor();
        return format!("{:.1}", (tenths / 10.0).copysign(value));
    }
    format!("{value:.1}")
}

fn render_row(object: &DetectedObject) -> ResultRow {
    let bar_fraction = if object.confidence.is_nan() {
        0.0
    } else {
        object.confidence.clamp(0.0, 1.0)
    };
    ResultRow {
        name: object.name.clone(),
        bar_fraction,
        bar_width: format!("{}%", percent_to_fixed(bar_fraction * 100.0)),
        label: format!("{} Accuracy", format_confidence(object.confidence)),
    }
}

fn render_gallery(base: &Url, urls: &[String]) -> GalleryView {
    GalleryView {
        visibility: Visibility::when(!urls.is_empty()),
        images: urls.iter().map(|url| resolve_asset_url(base, url)).collect(),
    }
}

fn render_details(result: &UploadResult) -> ResultDetails {
    ResultDetails {
        dominant_color: result.dominant_color.map(|color| color.to_hex()),
        shapes: result.shapes.clone(),
        dimensions: result
            .dimensions
            .map(|d| format!("{}x{} px", d.width, d.height)),
        uniqueness_score: result.uniqueness_score.map(|score| format!("{score:.2}")),
        tags: result.tags.clone(),
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
