use super::normalizer::normalize_header;
use crate::workflows::quality::domain::BatchSnapshot;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;
use std::io::Read;
use std::str::FromStr;

/// One data row with its spreadsheet line number and the raw cell values
/// keyed by normalized header.
#[derive(Debug)]
pub(crate) struct ParsedRow {
    pub(crate) row: usize,
    pub(crate) data: BTreeMap<String, String>,
    pub(crate) snapshot: Result<BatchSnapshot, String>,
}

/// Reads every data row. Only an unreadable header aborts; a malformed row is
/// returned with its error so the caller can keep going.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ParsedRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        // Line 1 holds the headers.
        let row = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                rows.push(ParsedRow {
                    row,
                    data: BTreeMap::new(),
                    snapshot: Err(err.to_string()),
                });
                continue;
            }
        };

        let data: BTreeMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();

        if data.values().all(|value| value.is_empty()) {
            continue;
        }

        let snapshot = snapshot_from_row(&data);
        rows.push(ParsedRow {
            row,
            data,
            snapshot,
        });
    }

    Ok(rows)
}

fn snapshot_from_row(data: &BTreeMap<String, String>) -> Result<BatchSnapshot, String> {
    let batch_number = cell(data, "batch_number")
        .ok_or_else(|| "batch_number is required".to_string())?
        .to_string();

    Ok(BatchSnapshot {
        batch_number,
        name: text(data, "name"),
        quantity: number(data, "quantity")?,
        temperature: number(data, "temperature")?,
        humidity: number(data, "humidity")?,
        ph_level: number(data, "ph_level")?,
        contaminant_level: number(data, "contaminant_level")?,
        active_ingredient_purity: number(data, "active_ingredient_purity")?,
        manufacture_date: date(data, "manufacture_date")?,
        expiry_date: date(data, "expiry_date")?,
        accepted_or_rejected: text(data, "accepted_or_rejected"),
        supplier: text(data, "supplier"),
        manufacturer: text(data, "manufacturer"),
        category: text(data, "category"),
        price: number(data, "price")?,
        inspected_by: text(data, "inspected_by"),
        created_at: timestamp(data, "created_at")?,
    })
}

fn cell<'a>(data: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    data.get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn text(data: &BTreeMap<String, String>, key: &str) -> Option<String> {
    cell(data, key).map(str::to_string)
}

fn number<T: FromStr>(data: &BTreeMap<String, String>, key: &str) -> Result<Option<T>, String> {
    cell(data, key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| format!("invalid value '{raw}' for {key}: expected a number"))
        })
        .transpose()
}

fn date(data: &BTreeMap<String, String>, key: &str) -> Result<Option<NaiveDate>, String> {
    cell(data, key)
        .map(|raw| {
            parse_date(raw).ok_or_else(|| {
                format!("invalid date '{raw}' for {key}: expected YYYY-MM-DD")
            })
        })
        .transpose()
}

fn timestamp(data: &BTreeMap<String, String>, key: &str) -> Result<Option<DateTime<Utc>>, String> {
    cell(data, key)
        .map(|raw| {
            parse_timestamp(raw).ok_or_else(|| {
                format!("invalid timestamp '{raw}' for {key}: expected RFC 3339 or YYYY-MM-DD")
            })
        })
        .transpose()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    parse_date(trimmed)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
pub(crate) fn parse_timestamp_for_tests(value: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(value)
}
