//! Flattens a nested JSON export into a spreadsheet
//!
//! ```bash
//! json-to-sheet export.json out/export.xlsx --records-key workItems --sheet-name Items
//! json-to-sheet '[{"id": 1, "a": {"b": 2}}]' out.csv --id-columns id,a.b
//! ```

use clap::Parser;
use dhriti_tools::flatten::{
    self, FlattenOptions, SheetFormat, DEFAULT_ID_COLUMNS, DEFAULT_SHEET_NAME,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "json-to-sheet", version, about = "Flatten nested JSON records into an xlsx or CSV sheet")]
struct Args {
    /// Path to a JSON file, or raw JSON text
    input: String,

    /// Output path; parent directories are created
    output: PathBuf,

    /// Key of the record array (detected when omitted)
    #[arg(long)]
    records_key: Option<String>,

    /// Columns to move to the front, in order
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_ID_COLUMNS.map(String::from))]
    id_columns: Vec<String>,

    /// Worksheet name (xlsx only)
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    sheet_name: String,

    /// Output format; `.csv` outputs default to csv, everything else to xlsx
    #[arg(long, value_enum)]
    format: Option<SheetFormat>,
}

fn main() -> anyhow::Result<()> {
    dhriti_tools::init_tracing("dhriti_tools=info");

    let args = Args::parse();

    let data = flatten::load_json(&args.input)?;
    let options = FlattenOptions {
        records_key: args.records_key,
        id_columns: args.id_columns,
        sheet_name: args.sheet_name,
        format: args.format,
    };

    let written = flatten::json_to_sheet(data, &args.output, &options)?;
    println!("{}", written.display());

    Ok(())
}
