//! CSV ingest and normalization.
//!
//! This module is responsible for turning a sales CSV into a clean `Dataset`
//! that is safe to aggregate.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Graceful degradation** when the optional price column is absent
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Dataset, Month, Pricing, SalesRecord, normalize_product};
use crate::error::AppError;

const COL_PRODUCT: &str = "producto";
const COL_MONTH: &str = "mes";
const COL_QUANTITY: &str = "cantidad";
const COL_UNIT_PRICE: &str = "precio_unitario";

const REQUIRED_COLUMNS: [&str; 3] = [COL_PRODUCT, COL_MONTH, COL_QUANTITY];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the dataset plus bookkeeping about skipped rows.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and normalize a sales CSV.
pub fn load_sales(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ingest = read_sales(file, path)?;

    tracing::info!(
        path = %path.display(),
        rows_read = ingest.rows_read,
        rows_used = ingest.rows_used,
        skipped = ingest.row_errors.len(),
        "loaded sales table"
    );
    Ok(ingest)
}

/// Parse a sales table from any reader. `origin` is only used in messages.
pub fn read_sales<R: std::io::Read>(input: R, origin: &Path) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|source| AppError::Csv {
            path: origin.to_path_buf(),
            source,
        })?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let pricing = if header_map.contains_key(COL_UNIT_PRICE) {
        Pricing::Available
    } else {
        tracing::debug!("column `{COL_UNIT_PRICE}` not found; revenue outputs will be skipped");
        Pricing::Missing
    };

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    // Every grouped sum is bounded by this, so aggregation cannot overflow.
    let mut total_quantity = 0u64;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map))
            .and_then(|row| match total_quantity.checked_add(row.quantity) {
                Some(total) => Ok((row, total)),
                None => Err(format!(
                    "`cantidad` value {} overflows the table total.",
                    row.quantity
                )),
            });

        match parsed {
            Ok((row, total)) => {
                total_quantity = total;
                records.push(row);
            }
            Err(message) => {
                tracing::warn!(line, "skipping row: {message}");
                row_errors.push(RowError { line, message });
            }
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::EmptyDataset { rows_read });
    }

    Ok(IngestedData {
        dataset: Dataset::new(records, pricing),
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM;
    // without stripping it `producto` would be reported missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|col| !header_map.contains_key(*col))
        .collect();

    match missing.as_slice() {
        [] => Ok(()),
        [col] => Err(AppError::DataFormat(format!("Missing required column: `{col}`"))),
        cols => Err(AppError::DataFormat(format!(
            "Missing required columns: {}",
            cols.iter().map(|c| format!("`{c}`")).collect::<Vec<_>>().join(", ")
        ))),
    }
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<SalesRecord, String> {
    let product = normalize_product(get_required(record, header_map, COL_PRODUCT)?);
    if product.is_empty() {
        return Err("Empty `producto` value.".to_string());
    }

    let raw_month = get_required(record, header_map, COL_MONTH)?;
    let month = Month::parse(raw_month).ok_or_else(|| format!("Unknown month `{raw_month}`."))?;

    let quantity = parse_quantity(get_required(record, header_map, COL_QUANTITY)?)?;

    let unit_price = match get_optional(record, header_map, COL_UNIT_PRICE) {
        Some(raw) => Some(parse_unit_price(raw)?),
        None => None,
    };

    Ok(SalesRecord {
        product,
        month,
        quantity,
        unit_price,
    })
}

fn parse_quantity(raw: &str) -> Result<u64, String> {
    // Spreadsheet exports write whole numbers as `12.0`; nothing else
    // non-integral is a quantity.
    let digits = match raw.split_once('.') {
        Some((whole, frac)) if !frac.is_empty() && frac.bytes().all(|b| b == b'0') => whole,
        _ => raw,
    };
    match digits.parse::<u64>() {
        Ok(q) => Ok(q),
        Err(_) if raw.strip_prefix('-').is_some_and(|n| n.parse::<f64>().is_ok()) => {
            Err(format!("Negative `cantidad` value `{raw}`."))
        }
        Err(_) => Err(format!("Invalid `cantidad` value `{raw}`.")),
    }
}

fn parse_unit_price(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(_) => Err(format!("Invalid `precio_unitario` value `{raw}` (must be non-negative).")),
        Err(_) => Err(format!("Invalid `precio_unitario` value `{raw}`.")),
    }
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, name).ok_or_else(|| format!("Missing `{name}` value."))
}

/// Cell value for `name`, `None` if the column or the cell is empty.
fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = *header_map.get(name)?;
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read(csv: &str) -> Result<IngestedData, AppError> {
        read_sales(csv.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn loads_rows_and_detects_pricing() {
        let data = read("producto,mes,cantidad,precio_unitario\ncamisa,Enero,10,15.5\nZapato,Febrero,4,40\n").unwrap();
        assert_eq!(data.rows_read, 2);
        assert_eq!(data.rows_used, 2);
        assert!(data.dataset.has_pricing());
        assert_eq!(data.dataset.records[0].product, "Camisa");
        assert_eq!(data.dataset.records[0].unit_price, Some(15.5));
        assert_eq!(data.dataset.records[1].month, Month::Febrero);
    }

    #[test]
    fn missing_price_column_degrades() {
        let data = read("producto,mes,cantidad\nCamisa,Enero,10\n").unwrap();
        assert_eq!(data.dataset.pricing, Pricing::Missing);
        assert_eq!(data.dataset.records[0].unit_price, None);
    }

    #[test]
    fn missing_required_column_is_a_format_error() {
        let err = read("producto,cantidad\nCamisa,10\n").unwrap_err();
        assert!(matches!(err, AppError::DataFormat(ref msg) if msg.contains("`mes`")));
        assert_eq!(err.exit_code(), 2);

        let err = read("precio_unitario\n1.0\n").unwrap_err();
        assert!(matches!(err, AppError::DataFormat(ref msg) if msg.contains("columns")));
    }

    #[test]
    fn headers_are_case_and_bom_insensitive() {
        let data = read("\u{feff}Producto, MES ,Cantidad\npantalon,marzo,3\n").unwrap();
        assert_eq!(data.dataset.records[0].product, "Pantalon");
        assert_eq!(data.dataset.records[0].month, Month::Marzo);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let csv = "producto,mes,cantidad,precio_unitario\n\
                   Camisa,Enero,10,5\n\
                   Camisa,Julio,1,5\n\
                   Camisa,Enero,-3,5\n\
                   Camisa,Enero,abc,5\n\
                   ,Enero,1,5\n\
                   Camisa,Enero,2,-1\n\
                   Camisa,Enero,2.0,\n";
        let data = read(csv).unwrap();
        assert_eq!(data.rows_read, 7);
        assert_eq!(data.rows_used, 2);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6, 7]);
        assert!(data.row_errors[0].message.contains("Julio"));
        // Empty price cell keeps the row without a price.
        assert_eq!(data.dataset.records[1].quantity, 2);
        assert_eq!(data.dataset.records[1].unit_price, None);
    }

    #[test]
    fn quantity_accepts_integers_and_whole_decimals_only() {
        assert_eq!(parse_quantity("7"), Ok(7));
        assert_eq!(parse_quantity("12.0"), Ok(12));
        assert_eq!(parse_quantity("3.00"), Ok(3));
        assert!(parse_quantity("2.5").is_err());
        assert!(parse_quantity("1e3").is_err());
        assert!(parse_quantity("12.0e0").is_err());
        assert!(parse_quantity("12.").is_err());
        assert!(parse_quantity("-3").unwrap_err().starts_with("Negative"));
        assert!(parse_quantity("-1.5").unwrap_err().starts_with("Negative"));
    }

    #[test]
    fn rows_that_would_overflow_the_total_are_skipped() {
        let csv = format!("producto,mes,cantidad\nCamisa,Enero,{}\nCamisa,Febrero,1\nZapato,Marzo,0\n", u64::MAX);
        let data = read(&csv).unwrap();
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 3);
        assert!(data.row_errors[0].message.contains("overflows"));

        let totals = crate::report::aggregate::product_totals(&data.dataset);
        assert_eq!(totals["Camisa"], u64::MAX);
        assert_eq!(data.dataset.total_quantity(), u64::MAX);
    }

    #[test]
    fn all_rows_invalid_is_an_error() {
        let err = read("producto,mes,cantidad\nCamisa,Julio,1\n").unwrap_err();
        assert!(matches!(err, AppError::EmptyDataset { rows_read: 1 }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn load_sales_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "producto,mes,cantidad").unwrap();
        writeln!(file, "Zapato,Abril,7").unwrap();
        let data = load_sales(file.path()).unwrap();
        assert_eq!(data.dataset.total_quantity(), 7);
    }

    #[test]
    fn load_sales_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sales(&dir.path().join("ventas_tienda.csv")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
