//! CSV ingestion adapter: descriptor -> normalized row set.
//!
//! Wraps the `csv` tokenizer and, for remote sources, an HTTP fetch with
//! encoding auto-detection. Normalization applies uniform typing rules:
//! numeric strings become numbers,
//! empty fields become null, blank lines are skipped, and rows where every
//! field is null/empty are dropped (trailing blank lines defense).
//!
//! This is the one visible-latency operation in the pipeline and the sole
//! suspension point before first render.

use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{IngestError, IngestResult};
use crate::models::{Row, RowSet};
use crate::registry::{DatasetDescriptor, DatasetSource};

/// Load and tokenize the CSV content for a dataset descriptor.
pub async fn ingest(descriptor: &DatasetDescriptor, config: &Config) -> IngestResult<RowSet> {
    let content = match descriptor.source {
        DatasetSource::Inline(text) => text.to_string(),
        DatasetSource::Remote(name) => fetch_remote(&config.resolve_url(name)).await?,
    };

    let rows = tokenize(&content)?;
    debug!(dataset = descriptor.id, rows = rows.len(), "ingested dataset");
    Ok(rows)
}

/// Fetch a remote CSV resource and decode its bytes.
///
/// Any transport failure or non-success status is a `SourceUnavailable`;
/// the caller shows a single explanatory message and stops the load.
async fn fetch_remote(url: &str) -> IngestResult<String> {
    let response = reqwest::get(url).await.map_err(|e| {
        warn!(url, error = %e, "CSV fetch failed");
        IngestError::SourceUnavailable { reason: e.to_string() }
    })?;

    if !response.status().is_success() {
        return Err(IngestError::SourceUnavailable {
            reason: format!("status {}", response.status().as_u16()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| IngestError::SourceUnavailable { reason: e.to_string() })?;

    let encoding = detect_encoding(&bytes);
    Ok(decode_content(&bytes, &encoding))
}

/// Detect the encoding of raw CSV bytes.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the detected encoding, falling back to
/// lossy UTF-8 for anything unrecognized.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding {
        "iso-8859-1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Tokenize CSV text into a normalized row set.
///
/// Header row required; a structural tokenizer error (or a body with no
/// header at all) is `MalformedContent`.
pub fn tokenize(content: &str) -> IngestResult<RowSet> {
    if content.trim().is_empty() {
        return Err(IngestError::MalformedContent { reason: "empty CSV body".into() });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::MalformedContent { reason: e.to_string() })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::MalformedContent { reason: "no headers found".into() });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::MalformedContent { reason: e.to_string() })?;

        // Blank lines are skipped outright.
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let mut row = Row::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).map(infer_value).unwrap_or(Value::Null);
            row.insert(header.clone(), value);
        }

        // Defends against rows that only look non-blank before typing.
        if row.values().all(is_empty_cell) {
            continue;
        }

        rows.push(row);
    }

    Ok(RowSet { headers, rows })
}

/// Automatic type inference: integers, then floats, otherwise strings.
/// Empty fields become null.
fn infer_value(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        // Number::from_f64 rejects NaN/inf, which must stay strings.
        if let Some(number) = Number::from_f64(f) {
            return Value::Number(number);
        }
    }
    Value::String(trimmed.to_string())
}

fn is_empty_cell(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
