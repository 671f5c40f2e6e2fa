/// Collapse every whitespace run (NBSP included) to one space and trim.
///
/// Returns `None` when there is nothing left.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let collapsed = raw?.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Drop a unit suffix plus any spaces left inside a number ("9 990 EUR" -> "9990")
pub fn strip_unit(text: &str, unit: &str) -> String {
    text.replace(unit, "")
        .replace(['\u{a0}', ' '], "")
        .trim()
        .to_string()
}
