/// Folds spreadsheet headers such as `"Batch Number"`, `"batch-number"`, or
/// `"\u{feff}batch_number"` onto the same snake_case key.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let words: Vec<String> = cleaned
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect();
    let key = words.join("_");

    match key.as_str() {
        "ph" => "ph_level".to_string(),
        "contaminant" | "contamination" => "contaminant_level".to_string(),
        "purity" => "active_ingredient_purity".to_string(),
        "disposition" | "accepted/rejected" => "accepted_or_rejected".to_string(),
        _ => key,
    }
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_header(value)
}
