//! Roster export
//!
//! Produces the canonical seven-column roster, either as quoted
//! comma-separated text (UTF-8 with a byte-order mark, so spreadsheet
//! tools open it correctly) or as rows of cells for a sheet writer.
//! Attendance is exported as its localized label.

use chrono::NaiveDate;

use crate::roster::record::AttendeeRecord;

pub const EXPORT_HEADERS: [&str; 7] = [
    "名前（漢字）",
    "名前（カナ）",
    "現在のプログラム",
    "CS第一希望",
    "CS第二希望",
    "CS第三希望",
    "出席状況",
];

const UTF8_BOM: &str = "\u{feff}";

/// Header row plus one row per record, for spreadsheet output.
pub fn export_rows(records: &[AttendeeRecord]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(EXPORT_HEADERS.iter().map(|h| h.to_string()).collect());
    for record in records {
        rows.push(vec![
            record.kanji.clone(),
            record.kana.clone(),
            record.program.clone(),
            record.first_choice.clone(),
            record.second_choice.clone(),
            record.third_choice.clone(),
            record.attendance.label().to_string(),
        ]);
    }
    rows
}

/// Delimited text output: BOM-prefixed, every field double-quote wrapped.
pub fn export_csv(records: &[AttendeeRecord]) -> String {
    let body = export_rows(records)
        .iter()
        .map(|row| {
            row.iter()
                .map(|field| quote(field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{UTF8_BOM}{body}")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Suggested output filename, date-stamped: オープンキャンパス受付_YYYYMMDD.<ext>
pub fn export_filename(date: NaiveDate, extension: &str) -> String {
    format!("オープンキャンパス受付_{}.{extension}", date.format("%Y%m%d"))
}
