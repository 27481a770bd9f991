use super::*;

use serde_json::json;
use shared::domain::{Dimensions, RgbColor};

fn base() -> Url {
    Url::parse("http://127.0.0.1:5000").expect("base url")
}

fn render(raw: serde_json::Value) -> DashboardView {
    let result: UploadResult = serde_json::from_value(raw.clone()).expect("upload result");
    render_upload_result(&result, &raw, &base())
}

#[test]
fn confidence_renders_as_one_decimal_percentage() {
    assert_eq!(format_confidence(0.873), "87.3%");
    assert_eq!(format_confidence(1.0), "100.0%");
    assert_eq!(format_confidence(0.0), "0.0%");
    assert_eq!(format_confidence(0.0015), "0.1%");
    assert_eq!(format_confidence(0.0255), "2.5%");

    let view = render(json!({
        "processed_image_url": "/static/uploads/processed_a.jpg",
        "objects": [{"name": "cat", "confidence": 0.873}]
    }));
    assert_eq!(
        view.formatted_results,
        vec![ResultRow {
            name: "cat".into(),
            bar_fraction: 0.873,
            bar_width: "87.3%".into(),
            label: "87.3% Accuracy".into(),
        }]
    );
}

#[test]
fn exact_halves_round_away_from_zero() {
    assert_eq!(percent_to_fixed(0.25), "0.3");
    assert_eq!(percent_to_fixed(1.25), "1.3");
    assert_eq!(percent_to_fixed(2.75), "2.8");
    assert_eq!(percent_to_fixed(-0.25), "-0.3");
    assert_eq!(percent_to_fixed(0.15), "0.1");
    assert_eq!(percent_to_fixed(87.3), "87.3");
}

#[test]
fn negative_confidence_leaves_bar_empty() {
    let view = render(json!({
        "processed_image_url": "/p.jpg",
        "objects": [{"name": "odd", "confidence": -0.5}]
    }));
    assert_eq!(view.formatted_results[0].bar_fraction, 0.0);
    assert_eq!(view.formatted_results[0].bar_width, "0.0%");
    assert_eq!(view.formatted_results[0].label, "-50.0% Accuracy");
}

#[test]
fn bar_width_is_clamped_but_label_is_not() {
    let view = render(json!({
        "processed_image_url": "/p.jpg",
        "objects": [{"name": "odd", "confidence": 1.2}]
    }));
    assert_eq!(view.formatted_results[0].bar_fraction, 1.0);
    assert_eq!(view.formatted_results[0].bar_width, "100.0%");
    assert_eq!(view.formatted_results[0].label, "120.0% Accuracy");
}

#[test]
fn empty_objects_render_no_rows() {
    let view = render(json!({"processed_image_url": "/p.jpg", "objects": []}));
    assert!(view.formatted_results.is_empty());
    assert_eq!(view.results_area, Visibility::Shown);
}

#[test]
fn galleries_follow_their_own_sequences() {
    let hidden = render(json!({"processed_image_url": "/p.jpg"}));
    assert_eq!(hidden.extracted.visibility, Visibility::Hidden);
    assert!(hidden.extracted.images.is_empty());
    assert_eq!(hidden.related.visibility, Visibility::Hidden);

    let view = render(json!({
        "processed_image_url": "/p.jpg",
        "extracted_items_urls": [
            "/static/uploads/crops/crop_0_a.jpg",
            "/static/uploads/crops/crop_1_a.jpg"
        ],
        "related_images": []
    }));
    assert_eq!(view.extracted.visibility, Visibility::Shown);
    assert_eq!(
        view.extracted.images,
        vec![
            "http://127.0.0.1:5000/static/uploads/crops/crop_0_a.jpg".to_string(),
            "http://127.0.0.1:5000/static/uploads/crops/crop_1_a.jpg".to_string(),
        ]
    );
    assert_eq!(view.related.visibility, Visibility::Hidden);
}

#[test]
fn absolute_urls_are_kept() {
    let view = render(json!({
        "processed_image_url": "https://cdn.example.com/out.jpg",
        "related_images": ["https://cdn.example.com/r1.jpg"]
    }));
    assert_eq!(view.processed_image_src, "https://cdn.example.com/out.jpg");
    assert_eq!(view.related.images, vec!["https://cdn.example.com/r1.jpg"]);
    assert!(view.related.visibility.is_shown());
}

#[test]
fn raw_panel_keeps_unmodelled_fields_in_order() {
    let raw: serde_json::Value = serde_json::from_str(
        r#"{"zeta": 1, "processed_image_url": "/p.jpg", "alpha": [true]}"#,
    )
    .expect("raw");
    let result: UploadResult = serde_json::from_value(raw.clone()).expect("result");
    let view = render_upload_result(&result, &raw, &base());

    assert_eq!(
        view.raw_json,
        "{\n  \"zeta\": 1,\n  \"processed_image_url\": \"/p.jpg\",\n  \"alpha\": [\n    true\n  ]\n}"
    );
}

#[test]
fn details_summarise_image_analysis() {
    let mut result = UploadResult::new("/p.jpg");
    result.dominant_color = Some(RgbColor(255, 128, 0));
    result.dimensions = Some(Dimensions {
        width: 640,
        height: 480,
    });
    result.uniqueness_score = Some(3.456);
    result.shapes = vec!["Triangle".into()];
    result.tags = vec!["dog".into(), "person".into()];

    let raw = serde_json::to_value(&result).expect("raw");
    let view = render_upload_result(&result, &raw, &base());
    assert_eq!(view.details.dominant_color.as_deref(), Some("#ff8000"));
    assert_eq!(view.details.dimensions.as_deref(), Some("640x480 px"));
    assert_eq!(view.details.uniqueness_score.as_deref(), Some("3.46"));
    assert_eq!(view.details.shapes, vec!["Triangle"]);
    assert_eq!(view.details.tags, vec!["dog", "person"]);
}
