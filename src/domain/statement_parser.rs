//! Locates the income statement inside a full filing submission and pulls
//! the target metrics out of its main table.
//!
//! A submission bundles every exhibit as a `<DOCUMENT>` block; the first one
//! is the periodic report itself. Pages are delimited by `<hr>` rules styled
//! `page-break-after: always`.

use scraper::{ElementRef, Html};
use tracing::debug;

use super::income_statement::{parse_value, ExtractedMetrics, Metric};

const HEADING_TERMS: [&str; 3] = ["income", "operations", "earnings"];
const EXCLUDED_HEADING_TERM: &str = "comprehensive";
const MIN_TABLE_WIDTH_PCT: f64 = 99.5;

/// Extract metrics from a raw submission. A filing without a recognisable
/// statement yields an empty result.
pub fn extract_income_statement(submission: &str) -> ExtractedMetrics {
    let mut metrics = ExtractedMetrics::new();

    let html = Html::parse_document(submission);
    let Some(exhibit) = first_element(html.root_element(), "document") else {
        debug!("submission has no document block");
        return metrics;
    };

    if let Some(name) = exhibit_filename(exhibit) {
        debug!(filename = %name, "parsing exhibit");
    }

    for page in segment_pages(exhibit) {
        let page = Html::parse_document(&page);
        if !is_income_statement_page(&page) {
            continue;
        }
        debug!("income statement page found");

        let Some(table) = primary_table(&page) else {
            continue;
        };
        debug!("statement table found");

        for row in table_rows(table) {
            apply_row(&row, &mut metrics);
        }
    }

    metrics
}

/// Split the serialized exhibit on its page-break rules.
///
/// The split is on the literal serialized form of each marker, so the pages
/// are raw markup fragments that are re-parsed independently.
pub fn segment_pages(exhibit: ElementRef<'_>) -> Vec<String> {
    let mut markers: Vec<String> = elements_named(exhibit, "hr")
        .filter(|hr| {
            hr.value()
                .attr("style")
                .and_then(|s| style_property(s, "page-break-after"))
                .is_some_and(|v| v == "always")
        })
        .map(|hr| hr.html())
        .collect();
    markers.sort();
    markers.dedup();

    let mut pages = vec![exhibit.html()];
    for marker in &markers {
        pages = pages
            .iter()
            .flat_map(|page| page.split(marker.as_str()))
            .map(str::to_string)
            .collect();
    }
    pages
}

/// A page carries the statement when a centred `div` or `p` heading names
/// income, operations or earnings, is not the comprehensive-income
/// statement, and is not itself wrapping a table.
pub fn is_income_statement_page(page: &Html) -> bool {
    page.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "div" | "p"))
        .any(is_statement_heading)
}

fn is_statement_heading(el: ElementRef<'_>) -> bool {
    let centred = el
        .value()
        .attr("style")
        .and_then(|s| style_property(s, "text-align"))
        .is_some_and(|v| v == "center");
    if !centred {
        return false;
    }

    let text = stripped_text(el).to_lowercase();
    HEADING_TERMS.iter().any(|t| text.contains(t))
        && !text.contains(EXCLUDED_HEADING_TERM)
        && first_element_below(el, "table").is_none()
}

/// First table declared wider than 99.5%.
pub fn primary_table(page: &Html) -> Option<ElementRef<'_>> {
    elements_named(page.root_element(), "table").find(|table| {
        table
            .value()
            .attr("style")
            .and_then(width_percent)
            .is_some_and(|w| w > MIN_TABLE_WIDTH_PCT)
    })
}

/// Lowercased cell texts per row, with blank and bare `$` cells removed.
pub fn table_rows(table: ElementRef<'_>) -> Vec<Vec<String>> {
    elements_named(table, "tr")
        .map(|row| {
            elements_named(row, "td")
                .map(stripped_text)
                .filter(|text| !text.is_empty() && text != "$")
                .map(|text| text.to_lowercase())
                .collect()
        })
        .collect()
}

/// Match a row's label against the vocabulary and record its value for
/// every metric not yet seen.
pub fn apply_row(cells: &[String], metrics: &mut ExtractedMetrics) {
    let [label, value, ..] = cells else {
        return;
    };
    for metric in Metric::ALL {
        if metric.matches_label(label) && !metrics.contains(metric) {
            metrics.record_first(metric, parse_value(value));
        }
    }
}

/// Value of one declaration in an inline style, lowercased with whitespace removed.
pub fn style_property(style: &str, property: &str) -> Option<String> {
    style.split(';').find_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        if key.trim().eq_ignore_ascii_case(property) {
            Some(
                value
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_lowercase(),
            )
        } else {
            None
        }
    })
}

fn width_percent(style: &str) -> Option<f64> {
    let width = style_property(style, "width")?;
    width.strip_suffix('%')?.parse().ok()
}

/// Concatenation of the element's trimmed text nodes.
fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

fn exhibit_filename(exhibit: ElementRef<'_>) -> Option<String> {
    let filename = first_element(exhibit, "filename")?;
    filename
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

/// Elements named `name` at or below `root`, in document order.
fn elements_named<'a>(root: ElementRef<'a>, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}

fn first_element<'a>(root: ElementRef<'a>, name: &'a str) -> Option<ElementRef<'a>> {
    elements_named(root, name).next()
}

fn first_element_below<'a>(root: ElementRef<'a>, name: &'a str) -> Option<ElementRef<'a>> {
    elements_named(root, name).find(|el| el.id() != root.id())
}
