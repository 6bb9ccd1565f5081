//! CSV table export
//!
//! One row per record, prefixed with its position in the flattened list.
//! Placeholders and absent fields are empty cells.

use crate::model::ItemRecord;
use crate::output::OutputResult;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column names after the leading index column
pub const COLUMNS: [&str; 6] = [
    "name",
    "library_of_congress_control_number",
    "date",
    "location_city",
    "location_state",
    "full_text",
];

/// Writes `records` to `output_path` as CSV
///
/// The table is written to a sibling temporary file and renamed into place,
/// so readers never see a half-written table.
///
/// # Arguments
///
/// * `records` - The flattened records of every job
/// * `output_path` - Path where the CSV file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the table
/// * `Err(OutputError)` - Failed to write the table
pub fn write_table(records: &[ItemRecord], output_path: &Path) -> OutputResult<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = output_path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    {
        let mut writer = BufWriter::new(File::create(tmp_path)?);
        writer.write_all(format_table(records).as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(tmp_path, output_path)?;
    Ok(())
}

/// Formats records as CSV text, header included
pub fn format_table(records: &[ItemRecord]) -> String {
    let mut csv = String::new();

    csv.push(',');
    csv.push_str(&COLUMNS.join(","));
    csv.push('\n');

    for (index, record) in records.iter().enumerate() {
        let cells: [Option<&str>; 6] = match record.document() {
            Some(doc) => [
                doc.name.as_deref(),
                doc.control_number.as_deref(),
                doc.date.as_deref(),
                doc.city.as_deref(),
                doc.state.as_deref(),
                doc.text.as_deref(),
            ],
            None => [None; 6],
        };

        csv.push_str(&index.to_string());
        for cell in cells {
            csv.push(',');
            csv.push_str(&escape(cell.unwrap_or("")));
        }
        csv.push('\n');
    }

    csv
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
