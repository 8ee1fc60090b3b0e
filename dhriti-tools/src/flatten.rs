//! Nested JSON to spreadsheet flattening
//!
//! Turns a JSON export (for example a work-item dump) into one row per
//! record, with nested objects spread over dot-separated columns:
//!
//! ```text
//! {"workItems": [{"id": 1, "inputData": {"orig": "a"}}]}
//!
//! id,inputData.orig
//! 1,a
//! ```
//!
//! The sheet is written as an Excel workbook (`.xlsx`) by default, or as
//! CSV when the output ends in `.csv` or [`SheetFormat::Csv`] is asked for.
//!
//! # Example
//!
//! ```no_run
//! use dhriti_tools::flatten::{json_to_sheet, load_json, FlattenOptions};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), dhriti_tools::flatten::FlattenError> {
//! let data = load_json("export.json")?;
//! let path = json_to_sheet(data, Path::new("out/export.xlsx"), &FlattenOptions::default())?;
//! println!("Wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde_json::{Map, Number, Value};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Columns pulled to the front, in this order, when present
pub const DEFAULT_ID_COLUMNS: [&str; 4] = ["workItemId", "id", "uid", "uuid"];

/// Column used when a record is a bare scalar
pub const SCALAR_COLUMN: &str = "value";

/// Worksheet name used when none is given
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Flattening error
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SheetFormat {
    /// Excel workbook
    #[default]
    Xlsx,

    /// Comma-separated values
    Csv,
}

impl SheetFormat {
    /// Format implied by the output path: `.csv` is CSV, anything else xlsx
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => SheetFormat::Csv,
            _ => SheetFormat::Xlsx,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SheetFormat::Xlsx => "xlsx",
            SheetFormat::Csv => "csv",
        }
    }
}

/// Flattening options
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Key holding the record array; detected when None or not an array
    pub records_key: Option<String>,

    /// Columns moved to the front, in order, if present
    pub id_columns: Vec<String>,

    /// Worksheet name (xlsx only)
    pub sheet_name: String,

    /// Output format; inferred from the output path when None
    pub format: Option<SheetFormat>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            records_key: None,
            id_columns: DEFAULT_ID_COLUMNS.iter().map(|c| c.to_string()).collect(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            format: None,
        }
    }
}

/// One leaf value
///
/// Numbers and booleans stay typed so the workbook gets numeric cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Cell {
    fn from_leaf(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::String(s) => Cell::Text(s.clone()),
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => Cell::Number(n.clone()),
            // arrays stay JSON
            other => Cell::Text(other.to_string()),
        }
    }

    /// Text as written to CSV; empty cells are empty strings
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

/// Flattened records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,

    /// One cell per column; missing fields are empty
    pub rows: Vec<Vec<Cell>>,
}

/// Loads JSON from a file path, or parses the argument as JSON text when no
/// such file exists
pub fn load_json(source: &str) -> Result<Value, FlattenError> {
    let path = Path::new(source);

    if path.is_file() {
        tracing::debug!(path = %path.display(), "Reading JSON file");
        let raw = fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&raw)?);
    }

    Ok(serde_json::from_str(source)?)
}

/// Picks the list of records out of a JSON document
///
/// - Array: its items.
/// - Object: the `records_key` field if it is an array, else the array field
///   holding the most objects, else the object itself.
/// - Anything else: a single `{"value": ...}` record.
pub fn detect_records(data: Value, records_key: Option<&str>) -> Vec<Value> {
    match data {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(key) = records_key {
                if matches!(map.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(items)) = map.remove(key) {
                        return items;
                    }
                }
                tracing::warn!(records_key = key, "Records key missing or not an array, detecting");
            }

            let mut best: Option<(&String, usize)> = None;
            for (key, value) in &map {
                let Value::Array(items) = value else { continue };
                let objects = items.iter().filter(|v| v.is_object()).count();
                if objects == 0 {
                    continue;
                }
                // first key wins ties
                if best.map_or(true, |(_, count)| objects > count) {
                    best = Some((key, objects));
                }
            }

            match best.map(|(key, _)| key.clone()) {
                Some(key) => match map.remove(&key) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                },
                None => vec![Value::Object(map)],
            }
        }
        scalar => vec![scalar],
    }
}

/// Flattens one record into `(column, cell)` pairs in field order
pub fn flatten_record(record: &Value) -> Vec<(String, Cell)> {
    let mut cells = Vec::new();

    match record {
        Value::Object(map) => flatten_into(map, "", &mut cells),
        leaf => cells.push((SCALAR_COLUMN.to_string(), Cell::from_leaf(leaf))),
    }

    cells
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, cells: &mut Vec<(String, Cell)>) {
    for (key, value) in map {
        let column = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(nested) => flatten_into(nested, &column, cells),
            leaf => cells.push((column, Cell::from_leaf(leaf))),
        }
    }
}

/// Flattens records into a table
///
/// Columns appear in first-seen order across all records, then the id
/// columns that exist are moved to the front.
pub fn flatten(records: &[Value], id_columns: &[String]) -> Table {
    let flattened: Vec<Vec<(String, Cell)>> = records.iter().map(flatten_record).collect();

    let mut seen: Vec<&str> = Vec::new();
    let mut known: HashSet<&str> = HashSet::new();
    for row in &flattened {
        for (column, _) in row {
            if known.insert(column.as_str()) {
                seen.push(column.as_str());
            }
        }
    }

    let mut columns: Vec<String> = id_columns
        .iter()
        .filter(|c| known.contains(c.as_str()))
        .cloned()
        .collect();
    let front: HashSet<&str> = columns.iter().map(String::as_str).collect();
    let rest: Vec<String> = seen
        .iter()
        .filter(|c| !front.contains(*c))
        .map(|c| c.to_string())
        .collect();
    columns.extend(rest);

    let position: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| (column.as_str(), index))
        .collect();

    let rows = flattened
        .iter()
        .map(|row| {
            let mut cells = vec![Cell::Empty; columns.len()];
            for (column, cell) in row {
                if let Some(&index) = position.get(column.as_str()) {
                    cells[index] = cell.clone();
                }
            }
            cells
        })
        .collect();

    Table { columns, rows }
}

fn create_parent(output: &Path) -> Result<(), FlattenError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Writes a table as CSV, creating parent directories
pub fn write_csv(table: &Table, output: &Path) -> Result<PathBuf, FlattenError> {
    create_parent(output)?;

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::text))?;
    }
    writer.flush()?;

    Ok(output.to_path_buf())
}

/// Writes a table as a single-sheet workbook, creating parent directories
///
/// The header row is bold. Empty cells are left blank.
pub fn write_xlsx(table: &Table, output: &Path, sheet_name: &str) -> Result<PathBuf, FlattenError> {
    create_parent(output)?;

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, column) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_index(col)?, column, &header)?;
    }

    for (index, row) in table.rows.iter().enumerate() {
        let row_num = row_index(index + 1)?;
        for (col, cell) in row.iter().enumerate() {
            let col_num = col_index(col)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col_num, text)?;
                }
                Cell::Number(n) => match n.as_f64() {
                    Some(value) => {
                        worksheet.write_number(row_num, col_num, value)?;
                    }
                    None => {
                        worksheet.write_string(row_num, col_num, n.to_string())?;
                    }
                },
                Cell::Bool(b) => {
                    worksheet.write_boolean(row_num, col_num, *b)?;
                }
            }
        }
    }

    workbook.save(output)?;

    Ok(output.to_path_buf())
}

fn row_index(index: usize) -> Result<u32, XlsxError> {
    u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_index(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

/// Detects records, flattens them and writes the sheet
///
/// Returns the output path.
pub fn json_to_sheet(
    data: Value,
    output: &Path,
    options: &FlattenOptions,
) -> Result<PathBuf, FlattenError> {
    let records = detect_records(data, options.records_key.as_deref());
    let table = flatten(&records, &options.id_columns);
    let format = options.format.unwrap_or_else(|| SheetFormat::from_path(output));

    tracing::info!(
        records = table.rows.len(),
        columns = table.columns.len(),
        format = format.extension(),
        output = %output.display(),
        "Flattened JSON records"
    );

    match format {
        SheetFormat::Xlsx => write_xlsx(&table, output, &options.sheet_name),
        SheetFormat::Csv => write_csv(&table, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn default_ids() -> Vec<String> {
        FlattenOptions::default().id_columns
    }

    fn texts(row: &[Cell]) -> Vec<String> {
        row.iter().map(Cell::text).collect()
    }

    fn temp_output(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("dhriti-flatten-{}", uuid::Uuid::new_v4()))
            .join("nested")
            .join(name)
    }

    #[test]
    fn test_work_items_example() {
        let data = json!({"workItems": [{"id": 1, "inputData": {"orig": "a"}}]});
        let records = detect_records(data, None);
        let table = flatten(&records, &default_ids());

        assert_eq!(table.columns, vec!["id", "inputData.orig"]);
        assert_eq!(
            table.rows,
            vec![vec![Cell::Number(1.into()), Cell::Text("a".to_string())]]
        );
    }

    #[test]
    fn test_id_columns_move_to_front() {
        let records = vec![json!({"name": "x", "uid": "u-1", "workItemId": 7, "id": 3})];
        let table = flatten(&records, &default_ids());

        assert_eq!(table.columns, vec!["workItemId", "id", "uid", "name"]);
        assert_eq!(texts(&table.rows[0]), vec!["7", "3", "u-1", "x"]);
    }

    #[test]
    fn test_columns_union_in_first_seen_order() {
        let records = vec![json!({"a": 1, "b": {"c": null}}), json!({"d": true, "a": 2})];
        let table = flatten(&records, &[]);

        assert_eq!(table.columns, vec!["a", "b.c", "d"]);
        assert_eq!(texts(&table.rows[0]), vec!["1", "", ""]);
        assert_eq!(texts(&table.rows[1]), vec!["2", "", "true"]);
        assert_eq!(table.rows[1][2], Cell::Bool(true));
    }

    #[test]
    fn test_wide_sparse_records() {
        // each record adds its own column; every row still gets one cell per column
        let records: Vec<Value> = (0..300).map(|i| json!({ format!("f{}", i): i })).collect();
        let table = flatten(&records, &[]);

        assert_eq!(table.columns.len(), 300);
        assert_eq!(table.columns[299], "f299");
        assert!(table.rows.iter().all(|row| row.len() == 300));
        assert_eq!(table.rows[299][299], Cell::Number(299.into()));
        assert_eq!(table.rows[299][0], Cell::Empty);
    }

    #[test]
    fn test_arrays_are_json_cells() {
        let table = flatten(&[json!({"tags": ["a", "b"]})], &[]);
        assert_eq!(texts(&table.rows[0]), vec![r#"["a","b"]"#]);
    }

    #[test]
    fn test_detect_prefers_list_with_most_objects() {
        let data = json!({
            "meta": [{"k": 1}],
            "items": [{"id": 1}, {"id": 2}, "stray"],
            "labels": ["x", "y", "z", "w"]
        });
        let records = detect_records(data, None);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["id"], 1);
    }

    #[test]
    fn test_detect_explicit_records_key() {
        let data = json!({"a": [{"x": 1}, {"x": 2}], "b": [{"y": 1}]});
        assert_eq!(detect_records(data.clone(), Some("b")).len(), 1);

        // falls back to detection when the key isn't an array
        assert_eq!(detect_records(data, Some("missing")).len(), 2);
    }

    #[test]
    fn test_detect_single_object_and_scalar() {
        let records = detect_records(json!({"id": 5, "name": "solo"}), None);
        assert_eq!(records, vec![json!({"id": 5, "name": "solo"})]);

        let records = detect_records(json!(42), None);
        let table = flatten(&records, &default_ids());
        assert_eq!(table.columns, vec![SCALAR_COLUMN]);
        assert_eq!(texts(&table.rows[0]), vec!["42"]);
    }

    #[test]
    fn test_load_json_text_and_file() {
        assert_eq!(load_json(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
        assert!(matches!(load_json("{not json"), Err(FlattenError::Json(_))));

        let path = temp_output("input.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"[{"id": 9}]"#).unwrap();

        assert_eq!(load_json(path.to_str().unwrap()).unwrap(), json!([{"id": 9}]));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SheetFormat::from_path(Path::new("out/a.csv")), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_path(Path::new("A.CSV")), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_path(Path::new("a.xlsx")), SheetFormat::Xlsx);
        assert_eq!(SheetFormat::from_path(Path::new("no_extension")), SheetFormat::Xlsx);
    }

    #[test]
    fn test_json_to_sheet_writes_csv() {
        let output = temp_output("out.csv");
        let data = json!({"workItems": [
            {"id": 1, "inputData": {"orig": "hello, world"}},
            {"id": 2, "inputData": {"orig": "b"}, "extra": "z"}
        ]});

        let written = json_to_sheet(data, &output, &FlattenOptions::default()).unwrap();
        assert_eq!(written, output);

        let contents = fs::read_to_string(&output).unwrap();
        assert_eq!(
            contents,
            "id,inputData.orig,extra\n1,\"hello, world\",\n2,b,z\n"
        );
    }

    #[test]
    fn test_json_to_sheet_writes_xlsx() {
        let output = temp_output("out.xlsx");
        let data = json!([{"id": 1, "ok": true, "meta": {"lang": "pt"}}, {"id": 2}]);
        let options = FlattenOptions {
            sheet_name: "Work Items".to_string(),
            ..Default::default()
        };

        let written = json_to_sheet(data, &output, &options).unwrap();
        assert_eq!(written, output);

        // xlsx is a zip archive
        let bytes = fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let output = temp_output("export.out");
        let options = FlattenOptions {
            format: Some(SheetFormat::Csv),
            ..Default::default()
        };

        json_to_sheet(json!([{"id": 1}]), &output, &options).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "id\n1\n");
    }

    #[test]
    fn test_invalid_sheet_name_is_rejected() {
        let output = temp_output("bad.xlsx");
        let options = FlattenOptions {
            sheet_name: "a/b".to_string(),
            ..Default::default()
        };

        let err = json_to_sheet(json!([{"id": 1}]), &output, &options).unwrap_err();
        assert!(matches!(err, FlattenError::Xlsx(_)));
        assert!(!output.exists());
    }
}
