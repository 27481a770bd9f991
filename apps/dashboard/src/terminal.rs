//! Plain-text drawing of the dashboard view-model.

use std::fmt::Write as _;

use client_core::{DashboardView, FeedEntry, GalleryView, ResultRow, UserAlert};

const BAR_CELLS: usize = 20;

pub fn print_view(view: &DashboardView) {
    print!("{}", format_view(view));
}

pub fn print_alert(alert: &UserAlert) {
    eprintln!("! {}", alert.message);
}

pub fn print_feed_entry(entry: &FeedEntry) {
    println!("{}", format_feed_entry(entry));
}

pub fn format_view(view: &DashboardView) -> String {
    let mut out = String::new();
    if !view.results_area.is_shown() {
        return out;
    }

    let _ = writeln!(out, "Processed image: {}", view.processed_image_src);
    let _ = writeln!(out, "Detections:");
    if view.formatted_results.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    let name_width = view
        .formatted_results
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0);
    for row in &view.formatted_results {
        let _ = writeln!(
            out,
            "  {:<name_width$}  [{}]  {}",
            row.name,
            bar(row),
            row.label
        );
    }

    write_gallery(&mut out, "Extracted items", &view.extracted);
    write_gallery(&mut out, "Related images", &view.related);

    let details = &view.details;
    let mut facts = Vec::new();
    if let Some(color) = &details.dominant_color {
        facts.push(format!("dominant colour {color}"));
    }
    if let Some(dimensions) = &details.dimensions {
        facts.push(dimensions.clone());
    }
    if let Some(score) = &details.uniqueness_score {
        facts.push(format!("uniqueness {score}"));
    }
    if !details.shapes.is_empty() {
        facts.push(format!("shapes: {}", details.shapes.join(", ")));
    }
    if !details.tags.is_empty() {
        facts.push(format!("tags: {}", details.tags.join(", ")));
    }
    if !facts.is_empty() {
        let _ = writeln!(out, "Details: {}", facts.join(" | "));
    }
    out
}

pub fn format_feed_entry(entry: &FeedEntry) -> String {
    match entry.uploaded_at {
        Some(at) => format!(
            "[{}] {} - {} ({})",
            at.format("%H:%M:%S"),
            entry.username,
            entry.caption,
            entry.image_url
        ),
        None => format!("{} - {} ({})", entry.username, entry.caption, entry.image_url),
    }
}

fn bar(row: &ResultRow) -> String {
    let filled = (row.bar_fraction.clamp(0.0, 1.0) * BAR_CELLS as f64).round() as usize;
    let filled = filled.min(BAR_CELLS);
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_CELLS - filled))
}

fn write_gallery(out: &mut String, title: &str, gallery: &GalleryView) {
    if !gallery.visibility.is_shown() {
        return;
    }
    let _ = writeln!(out, "{title} ({}):", gallery.images.len());
    for image in &gallery.images {
        let _ = writeln!(out, "  {image}");
    }
}
