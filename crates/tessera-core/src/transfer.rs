//! # CSV Transfer
//!
//! Parsing of price import files and rendering of price exports.
//!
//! ## Import Format
//! ```text
//! variant_id,sku,currency_code,amount,region_id,min_quantity,max_quantity
//! variant_123,,eur,2999,,,
//! ,SKU-001,usd,3299,,,
//! ```
//! `currency_code` and `amount` headers are required; each row needs either
//! `variant_id` or `sku`. Amounts are always smallest-unit integers.
//! Row numbers in errors are 1-based file lines, so the first data row is 2.
//!
//! ## Export Format
//! Adds `variant_title`, `product_title` and `formatted_amount`, so an export
//! can be edited and fed back as an import.

use base64::Engine;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Currency;
use crate::types::PriceCreateInput;

/// Headers an import file must contain.
pub const REQUIRED_IMPORT_HEADERS: [&str; 2] = ["currency_code", "amount"];

/// Header row of every export, in column order.
pub const EXPORT_HEADERS: [&str; 10] = [
    "variant_id",
    "sku",
    "variant_title",
    "product_title",
    "currency_code",
    "amount",
    "formatted_amount",
    "region_id",
    "min_quantity",
    "max_quantity",
];

// =============================================================================
// Payload Decoding
// =============================================================================

/// Encoding of an uploaded CSV payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvFormat {
    #[default]
    Text,
    Base64,
}

/// Turns an uploaded payload into CSV text.
pub fn decode_payload(data: &str, format: CsvFormat) -> CoreResult<String> {
    match format {
        CsvFormat::Text => Ok(data.to_string()),
        CsvFormat::Base64 => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(data.trim())
                .map_err(|e| CoreError::Csv(format!("csv_data is not valid base64: {}", e)))?;
            String::from_utf8(bytes)
                .map_err(|_| CoreError::Csv("csv_data is not valid UTF-8".to_string()))
        }
    }
}

// =============================================================================
// Import
// =============================================================================

/// One parsed data row of an import file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// File line number (header is line 1).
    pub row: usize,
    pub variant_id: Option<String>,
    pub sku: Option<String>,
    pub currency_code: String,
    pub amount: f64,
    pub region_id: Option<String>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
}

impl ImportRow {
    /// The price write this row asks for.
    pub fn to_price_input(&self) -> PriceCreateInput {
        PriceCreateInput {
            currency_code: self.currency_code.clone(),
            amount: self.amount,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
        }
    }

    /// Builds the error entry for this row.
    pub fn error(&self, message: impl Into<String>) -> ImportRowError {
        ImportRowError {
            row: self.row,
            variant_id: self.variant_id.clone(),
            sku: self.sku.clone(),
            error: message.into(),
        }
    }
}

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ImportRowError {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub error: String,
}

/// Summary of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ImportResult {
    pub total_rows: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<ImportRowError>,
}

impl ImportResult {
    /// Records a failed row.
    pub fn fail(&mut self, error: ImportRowError) {
        self.failed += 1;
        self.errors.push(error);
    }
}

/// Outcome of parsing: usable rows plus rows rejected while parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedImport {
    pub total_rows: usize,
    pub rows: Vec<ImportRow>,
    pub errors: Vec<ImportRowError>,
}

impl ParsedImport {
    /// Starts an [`ImportResult`] that already counts the parse failures.
    pub fn into_result(self) -> (Vec<ImportRow>, ImportResult) {
        let result = ImportResult {
            total_rows: self.total_rows,
            successful: 0,
            failed: self.errors.len(),
            errors: self.errors,
        };
        (self.rows, result)
    }
}

struct Columns {
    variant_id: Option<usize>,
    sku: Option<usize>,
    currency_code: usize,
    amount: usize,
    region_id: Option<usize>,
    min_quantity: Option<usize>,
    max_quantity: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> CoreResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let (Some(currency_code), Some(amount)) = (find("currency_code"), find("amount")) else {
            return Err(CoreError::Csv(format!(
                "CSV must have headers: {} (and either variant_id or sku)",
                REQUIRED_IMPORT_HEADERS.join(", ")
            )));
        };

        Ok(Columns {
            variant_id: find("variant_id"),
            sku: find("sku"),
            currency_code,
            amount,
            region_id: find("region_id"),
            min_quantity: find("min_quantity"),
            max_quantity: find("max_quantity"),
        })
    }
}

fn cell(record: &csv::StringRecord, column: Option<usize>) -> Option<String> {
    column
        .and_then(|i| record.get(i))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_quantity(value: Option<String>, field: &str) -> Result<Option<i64>, String> {
    value
        .map(|v| v.parse::<i64>().map_err(|_| format!("Invalid {}: {}", field, v)))
        .transpose()
}

/// Parses an import file.
///
/// Fails as a whole only when the header row is unusable. Rows with missing
/// or malformed fields are returned as row errors.
pub fn parse_import(text: &str) -> CoreResult<ParsedImport> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.trim().as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CoreError::Csv(e.to_string()))?
        .clone();
    let columns = Columns::from_headers(&headers)?;

    let mut parsed = ParsedImport::default();

    for (index, record) in reader.records().enumerate() {
        let row = index + 2;
        parsed.total_rows += 1;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                parsed.errors.push(ImportRowError {
                    row,
                    variant_id: None,
                    sku: None,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let variant_id = cell(&record, columns.variant_id);
        let sku = cell(&record, columns.sku);
        let row_error = |error: String| ImportRowError {
            row,
            variant_id: variant_id.clone(),
            sku: sku.clone(),
            error,
        };

        if variant_id.is_none() && sku.is_none() {
            parsed
                .errors
                .push(row_error("Missing variant_id or sku".to_string()));
            continue;
        }

        let (Some(currency_code), Some(amount)) = (
            cell(&record, Some(columns.currency_code)),
            cell(&record, Some(columns.amount)),
        ) else {
            parsed
                .errors
                .push(row_error("Missing currency_code or amount".to_string()));
            continue;
        };

        let Ok(amount_value) = amount.parse::<f64>() else {
            parsed
                .errors
                .push(row_error(format!("Invalid amount: {}", amount)));
            continue;
        };

        let tiers = parse_quantity(cell(&record, columns.min_quantity), "min_quantity").and_then(
            |min| parse_quantity(cell(&record, columns.max_quantity), "max_quantity").map(|max| (min, max)),
        );
        let (min_quantity, max_quantity) = match tiers {
            Ok(tiers) => tiers,
            Err(message) => {
                parsed.errors.push(row_error(message));
                continue;
            }
        };

        parsed.rows.push(ImportRow {
            row,
            variant_id: variant_id.clone(),
            sku: sku.clone(),
            currency_code: currency_code.to_lowercase(),
            amount: amount_value,
            region_id: cell(&record, columns.region_id),
            min_quantity,
            max_quantity,
        });
    }

    Ok(parsed)
}

// =============================================================================
// Export
// =============================================================================

/// One exported `(variant, currency)` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub variant_id: String,
    pub sku: String,
    pub variant_title: String,
    pub product_title: String,
    pub currency_code: Currency,
    pub amount: i64,
    pub formatted_amount: String,
    pub region_id: Option<String>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
}

/// Renders export rows as CSV text, header first.
pub fn render_export(rows: &[ExportRow]) -> CoreResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    let csv_error = |e: csv::Error| CoreError::Csv(e.to_string());

    writer.write_record(EXPORT_HEADERS).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Csv(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "variant_id,sku,currency_code,amount,region_id,min_quantity,max_quantity";

    #[test]
    fn test_parse_valid_rows() {
        let text = format!("{HEADER}\nvariant_123,,EUR,2999,,,\n,SKU-001,usd,3299,reg_us,1,10\n");
        let parsed = parse_import(&text).unwrap();

        assert_eq!(parsed.total_rows, 2);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.rows[0].row, 2);
        assert_eq!(parsed.rows[0].variant_id.as_deref(), Some("variant_123"));
        assert_eq!(parsed.rows[0].currency_code, "eur");
        assert_eq!(parsed.rows[1].sku.as_deref(), Some("SKU-001"));
        assert_eq!(parsed.rows[1].region_id.as_deref(), Some("reg_us"));
        assert_eq!(parsed.rows[1].min_quantity, Some(1));
        assert_eq!(parsed.rows[1].max_quantity, Some(10));
    }

    #[test]
    fn test_missing_required_headers() {
        let err = parse_import("variant_id,amount\nv1,100").unwrap_err();
        assert!(matches!(err, CoreError::Csv(_)));
        assert!(err.to_string().contains("currency_code, amount"));
    }

    #[test]
    fn test_row_level_errors_do_not_abort() {
        let text = format!("{HEADER}\nvariant_1,,eur,,,,\n,,eur,100,,,\nvariant_2,,eur,abc,,,\nvariant_3,,eur,100,,x,\nvariant_4,,gbp,100,,,\n");
        let parsed = parse_import(&text).unwrap();

        assert_eq!(parsed.total_rows, 5);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].row, 6);

        let messages: Vec<_> = parsed.errors.iter().map(|e| (e.row, e.error.as_str())).collect();
        assert_eq!(
            messages,
            vec![
                (2, "Missing currency_code or amount"),
                (3, "Missing variant_id or sku"),
                (4, "Invalid amount: abc"),
                (5, "Invalid min_quantity: x"),
            ]
        );
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let parsed = parse_import("variant_id,currency_code,amount,region_id\nv1,eur,100").unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].region_id, None);
    }

    #[test]
    fn test_into_result_counts_parse_failures() {
        let parsed = parse_import("sku,currency_code,amount\n,eur,100\nSKU-1,eur,100").unwrap();
        let (rows, result) = parsed.into_result();

        assert_eq!(rows.len(), 1);
        assert_eq!(result.total_rows, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.successful, 0);
    }

    #[test]
    fn test_decode_base64_payload() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("currency_code,amount\n");
        let decoded = decode_payload(&encoded, CsvFormat::Base64).unwrap();
        assert_eq!(decoded, "currency_code,amount\n");

        assert!(decode_payload("%%%", CsvFormat::Base64).is_err());
        assert_eq!(decode_payload("a,b", CsvFormat::Text).unwrap(), "a,b");
    }

    #[test]
    fn test_render_export() {
        let rows = vec![ExportRow {
            variant_id: "variant_1".to_string(),
            sku: "SKU-1".to_string(),
            variant_title: "Large, Blue".to_string(),
            product_title: "T-Shirt".to_string(),
            currency_code: Currency::Eur,
            amount: 2999,
            formatted_amount: "29.99 €".to_string(),
            region_id: None,
            min_quantity: None,
            max_quantity: Some(10),
        }];

        let csv = render_export(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), EXPORT_HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "variant_1,SKU-1,\"Large, Blue\",T-Shirt,eur,2999,29.99 €,,,10"
        );
    }

    #[test]
    fn test_render_empty_export_has_header() {
        let csv = render_export(&[]).unwrap();
        assert_eq!(csv.trim_end(), EXPORT_HEADERS.join(","));
    }
}
