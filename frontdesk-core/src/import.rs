//! Tabular roster import
//!
//! Accepts a header row plus data rows, as delimited text or
//! spreadsheet-style cells, under one of two schemas:
//!
//! - split-name: exact headers 姓 / 名 / セイ / メイ / CS第一希望, with
//!   optional second/third choice and attendance columns
//! - combined (legacy): kanji-name, kana-name and program columns matched
//!   by header substring
//!
//! Split-name wins when both header sets are present. Rows missing a
//! required cell are silently dropped and surface only in the aggregate
//! skip count.

use tracing::debug;

use crate::error::{Error, Result};
use crate::roster::record::AttendanceState;

/// One accepted row, ready for the store to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedRow {
    pub kanji: String,
    pub kana: String,
    pub program: String,
    pub first_choice: String,
    pub second_choice: String,
    pub third_choice: String,
    pub attendance: AttendanceState,
}

/// Parse result: accepted rows plus the count of rows dropped for
/// missing required cells.
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub rows: Vec<ImportedRow>,
    pub skipped: usize,
}

/// Which header schema a file matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSchema {
    SplitName,
    Combined,
}

#[derive(Debug)]
enum SchemaMap {
    SplitName {
        sei: usize,
        mei: usize,
        sei_kana: usize,
        mei_kana: usize,
        cs1: usize,
        cs2: Option<usize>,
        cs3: Option<usize>,
        attendance: Option<usize>,
    },
    Combined {
        kanji: usize,
        kana: usize,
        program: usize,
        attendance: Option<usize>,
    },
}

impl SchemaMap {
    fn schema(&self) -> ImportSchema {
        match self {
            SchemaMap::SplitName { .. } => ImportSchema::SplitName,
            SchemaMap::Combined { .. } => ImportSchema::Combined,
        }
    }
}

/// Parse delimited text. Fields are comma-separated; stray double quotes
/// are stripped, a leading byte-order mark is ignored, blank lines are
/// skipped.
pub fn parse_csv(text: &str, no_preference: &str) -> Result<ParsedBatch> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rows: Vec<Vec<String>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split(',')
                .map(|cell| cell.replace('"', "").trim().to_string())
                .collect()
        })
        .collect();
    parse_cells(&rows, no_preference)
}

/// Parse spreadsheet-style rows of cells (first row is the header).
pub fn parse_cells(rows: &[Vec<String>], no_preference: &str) -> Result<ParsedBatch> {
    if rows.len() < 2 {
        return Err(Error::Schema {
            detail: "ファイルが正しくありません（データ行がありません）".to_string(),
        });
    }

    let map = detect_schema(&rows[0])?;
    debug!("Import header matched {:?} schema", map.schema());

    let mut batch = ParsedBatch::default();
    for row in &rows[1..] {
        match extract_row(&map, row, no_preference) {
            Some(parsed) => batch.rows.push(parsed),
            None => batch.skipped += 1,
        }
    }
    debug!(
        "Parsed {} row(s), skipped {}",
        batch.rows.len(),
        batch.skipped
    );
    Ok(batch)
}

fn detect_schema(headers: &[String]) -> Result<SchemaMap> {
    let mut sei = None;
    let mut mei = None;
    let mut sei_kana = None;
    let mut mei_kana = None;
    let mut cs1 = None;
    let mut cs2 = None;
    let mut cs3 = None;
    let mut kanji = None;
    let mut kana = None;
    let mut program = None;
    let mut attendance = None;

    for (index, header) in headers.iter().enumerate() {
        let h = header.trim();
        match h {
            "姓" => sei = sei.or(Some(index)),
            "名" => mei = mei.or(Some(index)),
            "セイ" => sei_kana = sei_kana.or(Some(index)),
            "メイ" => mei_kana = mei_kana.or(Some(index)),
            "CS第一希望" => cs1 = cs1.or(Some(index)),
            "CS第二希望" => cs2 = cs2.or(Some(index)),
            "CS第三希望" => cs3 = cs3.or(Some(index)),
            _ if h.contains("漢字") => kanji = kanji.or(Some(index)),
            _ if h.contains("カナ") => kana = kana.or(Some(index)),
            _ if h.contains("プロジェクト") || h.contains("プログラム") => {
                program = program.or(Some(index))
            }
            _ if h.contains("出席") || h.contains("参加") => {
                attendance = attendance.or(Some(index))
            }
            _ => {}
        }
    }

    if let (Some(sei), Some(mei), Some(sei_kana), Some(mei_kana), Some(cs1)) =
        (sei, mei, sei_kana, mei_kana, cs1)
    {
        return Ok(SchemaMap::SplitName {
            sei,
            mei,
            sei_kana,
            mei_kana,
            cs1,
            cs2,
            cs3,
            attendance,
        });
    }

    if let (Some(kanji), Some(kana), Some(program)) = (kanji, kana, program) {
        return Ok(SchemaMap::Combined {
            kanji,
            kana,
            program,
            attendance,
        });
    }

    Err(Error::Schema {
        detail: "必要な列が見つかりません。新フォーマット（姓、名、セイ、メイ、CS第一希望）または旧フォーマット（名前（漢字）、名前（カナ）、プログラム）が必要です。".to_string(),
    })
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|c| c.trim()).unwrap_or("")
}

fn opt_cell(row: &[String], index: Option<usize>) -> &str {
    index.map(|i| cell(row, i)).unwrap_or("")
}

fn extract_row(map: &SchemaMap, row: &[String], no_preference: &str) -> Option<ImportedRow> {
    match *map {
        SchemaMap::SplitName {
            sei,
            mei,
            sei_kana,
            mei_kana,
            cs1,
            cs2,
            cs3,
            attendance,
        } => {
            let (sei, mei) = (cell(row, sei), cell(row, mei));
            let (sei_kana, mei_kana) = (cell(row, sei_kana), cell(row, mei_kana));
            if sei.is_empty() || mei.is_empty() || sei_kana.is_empty() || mei_kana.is_empty() {
                return None;
            }

            let first_choice = cell(row, cs1).to_string();
            let program = if first_choice.is_empty() {
                no_preference.to_string()
            } else {
                first_choice.clone()
            };

            Some(ImportedRow {
                kanji: format!("{sei}{mei}"),
                kana: format!("{sei_kana}{mei_kana}"),
                program,
                first_choice,
                second_choice: opt_cell(row, cs2).to_string(),
                third_choice: opt_cell(row, cs3).to_string(),
                attendance: AttendanceState::from_import_text(opt_cell(row, attendance)),
            })
        }
        SchemaMap::Combined {
            kanji,
            kana,
            program,
            attendance,
        } => {
            let (kanji, kana, program) = (cell(row, kanji), cell(row, kana), cell(row, program));
            if kanji.is_empty() || kana.is_empty() || program.is_empty() {
                return None;
            }

            Some(ImportedRow {
                kanji: kanji.to_string(),
                kana: kana.to_string(),
                program: program.to_string(),
                // Legacy rows carry no stated preferences; the current
                // program stands in as the first choice.
                first_choice: program.to_string(),
                second_choice: String::new(),
                third_choice: String::new(),
                attendance: AttendanceState::from_import_text(opt_cell(row, attendance)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NO_PREF: &str = "希望なし";

    #[test]
    fn test_split_name_schema() {
        let csv = "姓,名,セイ,メイ,CS第一希望,CS第二希望,CS第三希望,出席\n\
                   田中,太郎,タナカ,タロウ,ロボット,ドローン,,present\n\
                   鈴木,花子,スズキ,ハナコ,,,,";
        let batch = parse_csv(csv, NO_PREF).unwrap();
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.skipped, 0);

        let taro = &batch.rows[0];
        assert_eq!(taro.kanji, "田中太郎");
        assert_eq!(taro.kana, "タナカタロウ");
        assert_eq!(taro.program, "ロボット");
        assert_eq!(taro.second_choice, "ドローン");
        assert_eq!(taro.attendance, AttendanceState::Present);

        // Blank first choice falls back to the no-preference program.
        let hanako = &batch.rows[1];
        assert_eq!(hanako.program, NO_PREF);
        assert_eq!(hanako.first_choice, "");
        assert_eq!(hanako.attendance, AttendanceState::Pending);
    }

    #[test]
    fn test_combined_schema_by_substring() {
        let csv = "名前（漢字）,名前（カナ）,現在のプログラム,出席状況\n\
                   田中太郎,タナカタロウ,ロボット,出席";
        let batch = parse_csv(csv, NO_PREF).unwrap();
        assert_eq!(batch.rows.len(), 1);
        let row = &batch.rows[0];
        assert_eq!(row.kanji, "田中太郎");
        assert_eq!(row.program, "ロボット");
        assert_eq!(row.first_choice, "ロボット");
        assert_eq!(row.attendance, AttendanceState::Present);
    }

    #[test]
    fn test_split_name_wins_over_combined() {
        // Both header sets present: split-name is tried first.
        let csv = "姓,名,セイ,メイ,CS第一希望,名前（漢字）,名前（カナ）,プログラム\n\
                   田中,太郎,タナカ,タロウ,ロボット,無視,ムシ,別";
        let batch = parse_csv(csv, NO_PREF).unwrap();
        assert_eq!(batch.rows[0].kanji, "田中太郎");
        assert_eq!(batch.rows[0].program, "ロボット");
    }

    #[test]
    fn test_partial_rows_silently_skipped() {
        let csv = "姓,名,セイ,メイ,CS第一希望\n\
                   田中,太郎,タナカ,タロウ,ロボット\n\
                   鈴木,,スズキ,,ロボット\n\
                   ,,,,";
        let batch = parse_csv(csv, NO_PREF).unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.skipped, 2);
    }

    #[test]
    fn test_unrecognized_headers_fail() {
        let csv = "name,email\nTaro,taro@example.com";
        assert!(matches!(
            parse_csv(csv, NO_PREF),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_header_only_file_fails() {
        let csv = "姓,名,セイ,メイ,CS第一希望\n";
        assert!(matches!(
            parse_csv(csv, NO_PREF),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_bom_and_quotes_are_stripped() {
        let csv = "\u{feff}\"名前（漢字）\",\"名前（カナ）\",\"プログラム\"\n\
                   \"田中太郎\",\"タナカタロウ\",\"ロボット\"";
        let batch = parse_csv(csv, NO_PREF).unwrap();
        assert_eq!(batch.rows[0].kanji, "田中太郎");
    }

    #[test]
    fn test_sheet_cells_parse_like_csv() {
        let rows: Vec<Vec<String>> = vec![
            vec!["姓", "名", "セイ", "メイ", "CS第一希望"]
                .into_iter()
                .map(String::from)
                .collect(),
            vec!["田中", "太郎", "タナカ", "タロウ", "ロボット"]
                .into_iter()
                .map(String::from)
                .collect(),
            // Short row: trailing cells are treated as empty.
            vec!["鈴木".to_string()],
        ];
        let batch = parse_cells(&rows, NO_PREF).unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.skipped, 1);
    }
}
