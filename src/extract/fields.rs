use super::text::{normalize, strip_unit};
use super::ExtractionError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static FOUR_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("valid year pattern"));

// Row classes of the "technical data" table on a detail page
pub const FIRST_REG_ROW: &str = "field-month_and_year";
pub const TYPE_ROW: &str = "field-liik";
pub const BODY_TYPE_ROW: &str = "field-keretyyp";
pub const ENGINE_ROW: &str = "field-mootorvoimsus";
pub const FUEL_ROW: &str = "field-kytus";
pub const MILEAGE_ROW: &str = "field-labisoit";
pub const DRIVE_TYPE_ROW: &str = "field-vedavsild";
pub const GEARBOX_ROW: &str = "field-kaigukast_kaikudega";
pub const COLOR_ROW: &str = "field-varvus";
pub const DISCOUNT_PRICE_ROW: &str = "field-soodushind";
pub const PRICE_ROW: &str = "field-hind";

const VALUE_CELL: &str = "td.field";
const VALUE_SPAN: &str = "span.value";
const HISTORY_PANEL: &str = "div.vHistoryReport__vehicle";
const MAKE_SPAN: &str = r#"span[class~="-make"]"#;

fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn find<'a>(scope: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>, ExtractionError> {
    let selector = selector(css)?;
    Ok(scope.select(&selector).next())
}

fn container<'a>(
    scope: ElementRef<'a>,
    field: &'static str,
    css: &str,
) -> Result<ElementRef<'a>, ExtractionError> {
    find(scope, css)?.ok_or_else(|| ExtractionError::MissingContainer {
        field,
        selector: css.to_string(),
    })
}

fn value<'a>(
    scope: ElementRef<'a>,
    field: &'static str,
    css: &str,
) -> Result<ElementRef<'a>, ExtractionError> {
    find(scope, css)?.ok_or_else(|| ExtractionError::MissingValue {
        field,
        selector: css.to_string(),
    })
}

fn element_text(field: &'static str, element: ElementRef<'_>) -> Result<String, ExtractionError> {
    let raw: String = element.text().collect();
    normalize(Some(raw.as_str())).ok_or(ExtractionError::EmptyValue { field })
}

/// `tr.<row_class> > td.field > span.value`, normalized
fn labeled_row(doc: &Html, field: &'static str, row_class: &str) -> Result<String, ExtractionError> {
    let row = container(doc.root_element(), field, &format!("tr.{row_class}"))?;
    let cell = value(row, field, VALUE_CELL)?;
    let span = value(cell, field, VALUE_SPAN)?;
    element_text(field, span)
}

/// "07/2006" -> "2006"; otherwise the first 4-digit run, else the text as-is
pub fn year_from_text(text: &str) -> String {
    if let Some((_, year)) = text.rsplit_once('/') {
        return year.to_string();
    }
    if text.chars().count() >= 4 {
        if let Some(found) = FOUR_DIGITS.find(text) {
            return found.as_str().to_string();
        }
    }
    text.to_string()
}

pub fn price_digits(raw: Option<&str>) -> Option<String> {
    normalize(raw)
        .map(|text| strip_unit(&text, "EUR"))
        .filter(|price| !price.is_empty())
}

pub fn extract_first_reg(doc: &Html) -> Result<String, ExtractionError> {
    labeled_row(doc, "first_reg", FIRST_REG_ROW).map(|text| year_from_text(&text))
}

pub fn extract_type(doc: &Html) -> Result<String, ExtractionError> {
    labeled_row(doc, "type", TYPE_ROW)
}

pub fn extract_body_type(doc: &Html) -> Result<String, ExtractionError> {
    labeled_row(doc, "body_type", BODY_TYPE_ROW)
}

/// Whole engine cell, e.g. "2.0 103kW"; not split into displacement and power
pub fn extract_engine(doc: &Html) -> Result<String, ExtractionError> {
    labeled_row(doc, "engine", ENGINE_ROW)
}

pub fn extract_fuel(doc: &Html) -> Result<String, ExtractionError> {
    labeled_row(doc, "fuel", FUEL_ROW)
}

pub fn extract_mileage(doc: &Html) -> Result<String, ExtractionError> {
    labeled_row(doc, "mileage", MILEAGE_ROW).map(|text| strip_unit(&text, "km"))
}

pub fn extract_drive_type(doc: &Html) -> Result<String, ExtractionError> {
    labeled_row(doc, "drive_type", DRIVE_TYPE_ROW)
}

pub fn extract_gearbox(doc: &Html) -> Result<String, ExtractionError> {
    labeled_row(doc, "gearbox", GEARBOX_ROW)
}

pub fn extract_color(doc: &Html) -> Result<String, ExtractionError> {
    labeled_row(doc, "color", COLOR_ROW)
}

/// Manufacturer name from the vehicle history panel.
///
/// The panel shows "Make Model ..." in one span; only the make span is read.
pub fn extract_brand(doc: &Html) -> Result<String, ExtractionError> {
    let panel = container(doc.root_element(), "brand", HISTORY_PANEL)?;
    let make = value(panel, "brand", MAKE_SPAN)?;
    element_text("brand", make)
}

fn price_row(doc: &Html, row_class: &str) -> Result<String, ExtractionError> {
    let row = container(doc.root_element(), "price", &format!("tr.{row_class}"))?;
    let span = value(row, "price", VALUE_SPAN)?;
    let text = element_text("price", span)?;
    price_digits(Some(text.as_str())).ok_or(ExtractionError::EmptyValue { field: "price" })
}

/// Discount price when the listing has one, list price otherwise
pub fn extract_price(doc: &Html) -> Result<String, ExtractionError> {
    match price_row(doc, DISCOUNT_PRICE_ROW) {
        Ok(price) => return Ok(price),
        Err(err @ ExtractionError::Selector { .. }) => return Err(err),
        Err(err) => debug!("No discount price: {}", err),
    }
    price_row(doc, PRICE_ROW)
}
