use std::fs;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use sheets2sheet::config::{ConvertConfig, SheetRule};
use sheets2sheet::convert;
use sheets2sheet::{ErrorKind, ToolError};
use tempfile::tempdir;

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Date(u16, u8, u8),
}

fn write_input(path: &Path, sheets: &[(&str, Vec<Vec<Cell<'_>>>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("sheet named");
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let (row_idx, col_idx) = (row_idx as u32, col_idx as u16);
                match cell {
                    Cell::Text(value) => {
                        worksheet
                            .write_string(row_idx, col_idx, *value)
                            .expect("string written");
                    }
                    Cell::Number(value) => {
                        worksheet
                            .write_number(row_idx, col_idx, *value)
                            .expect("number written");
                    }
                    Cell::Date(year, month, day) => {
                        let date =
                            ExcelDateTime::from_ymd(*year, *month, *day).expect("valid date");
                        let format = Format::new().set_num_format("yyyy-mm-dd");
                        worksheet
                            .write_datetime_with_format(row_idx, col_idx, &date, &format)
                            .expect("date written");
                    }
                }
            }
        }
    }
    workbook.save(path).expect("input saved");
}

fn read_output(path: &Path, sheet: &str) -> Range<DataType> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("output opened");
    workbook
        .worksheet_range(sheet)
        .expect("output sheet present")
        .expect("output sheet read")
}

fn text(range: &Range<DataType>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn row_text(range: &Range<DataType>, row: u32, width: u32) -> Vec<String> {
    (0..width).map(|col| text(range, row, col)).collect()
}

fn config_for(dir: &Path, rules: Vec<SheetRule>) -> ConvertConfig {
    ConvertConfig {
        input_file: dir.join("input.xlsx"),
        output_file: dir.join("output.xlsx"),
        output_sheet_name: "Merged".into(),
        sheet_records: rules,
    }
}

fn documents_workbook(path: &Path) {
    use Cell::{Number, Text};
    write_input(
        path,
        &[
            (
                "Documents",
                vec![
                    vec![Text("Document"), Text("Title"), Text("Year")],
                    vec![Text("DOC-2"), Text("Budget"), Number(2021.0)],
                    vec![Text("DOC-1"), Text("Charter"), Number(2019.0)],
                ],
            ),
            (
                "Signatures",
                vec![
                    vec![Text("Signer"), Text("Document")],
                    vec![Text("ana"), Text("DOC-1")],
                    vec![Text("bob"), Text("DOC-1")],
                    vec![Text("cid"), Text("DOC-1")],
                    vec![Text("dee"), Text("DOC-3")],
                ],
            ),
        ],
    );
}

#[test]
fn merges_sheets_into_one_row_per_key() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = config_for(
        temp_dir.path(),
        vec![
            SheetRule::new("Documents", 1, vec![2, 3]).with_header(true),
            SheetRule::new("Signatures", 2, vec![1])
                .with_header(true)
                .with_max_matches(2),
        ],
    );
    documents_workbook(&config.input_file);

    let summary = convert::convert(&config).expect("conversion succeeded");

    assert_eq!(summary.keys, 3);
    assert_eq!(summary.columns, 5);
    assert_eq!(summary.output, config.output_file);
    let range = read_output(&config.output_file, "Merged");
    assert_eq!(
        row_text(&range, 0, 5),
        ["Document", "Title", "Year", "Signer", "Signer"]
    );
    assert_eq!(row_text(&range, 1, 5), ["DOC-2", "Budget", "2021", "", ""]);
    assert_eq!(row_text(&range, 2, 5), ["DOC-1", "Charter", "2019", "ana", "bob"]);
    assert_eq!(row_text(&range, 3, 5), ["DOC-3", "", "", "dee", ""]);
    assert_eq!(text(&range, 4, 0), "");
}

#[test]
fn custom_delimiters_keep_matches_in_one_cell() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = config_for(
        temp_dir.path(),
        vec![
            SheetRule::new("Signatures", 2, vec![1])
                .with_header(true)
                .with_delimiters(";", "\n")
                .with_max_matches(5),
        ],
    );
    documents_workbook(&config.input_file);

    let summary = convert::convert(&config).expect("conversion succeeded");

    assert_eq!(summary.columns, 2);
    let range = read_output(&config.output_file, "Merged");
    assert_eq!(text(&range, 0, 1), "Signer\nSigner\nSigner\nSigner\nSigner");
    assert_eq!(text(&range, 1, 0), "DOC-1");
    assert_eq!(text(&range, 1, 1), "ana\nbob\ncid");
    assert_eq!(text(&range, 2, 1), "dee");
}

#[test]
fn missing_sheet_fails_without_output() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = config_for(
        temp_dir.path(),
        vec![
            SheetRule::new("Documents", 1, vec![2]),
            SheetRule::new("Approvals", 1, vec![2]),
        ],
    );
    documents_workbook(&config.input_file);
    fs::write(&config.output_file, b"stale").expect("stale output written");

    let error = convert::convert(&config).expect_err("conversion failed");

    assert!(matches!(error, ToolError::MissingSheet { ref sheet } if sheet == "Approvals"));
    assert!(!config.output_file.exists());
}

#[test]
fn out_of_range_column_names_sheet_and_index() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = config_for(temp_dir.path(), vec![SheetRule::new("Documents", 1, vec![2, 9])]);
    documents_workbook(&config.input_file);

    let error = convert::convert(&config).expect_err("conversion failed");

    assert_eq!(error.kind(), ErrorKind::ResourceNotFound);
    let message = error.to_string();
    assert!(message.contains("Documents"));
    assert!(message.contains('9'));
    assert!(!config.output_file.exists());
}

#[test]
fn missing_input_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = config_for(temp_dir.path(), vec![]);

    let error = convert::convert(&config).expect_err("conversion failed");

    assert!(matches!(error, ToolError::MissingInput(_)));
}

#[test]
fn convert_file_reads_json_configuration() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.xlsx");
    let output = temp_dir.path().join("output.xlsx");
    documents_workbook(&input);

    let config = serde_json::json!({
        "InputFile": input,
        "OutputFile": output,
        "OutputSheetName": "Merged",
        "SheetRecords": [
            { "SheetName": "Documents", "KeyIndex": 1, "ColumnIndexes": [2], "MaxMatchs": 1 }
        ]
    });
    let config_path = temp_dir.path().join("config.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config).expect("json"))
        .expect("config written");

    let summary = convert::convert_file(&config_path).expect("conversion succeeded");

    // Without a header row, row 1 is data and its key becomes a key too.
    assert_eq!(summary.keys, 3);
    let range = read_output(&output, "Merged");
    assert_eq!(text(&range, 0, 0), "");
    assert_eq!(text(&range, 0, 1), "SHEET: Documents, COLUMN: 2");
    assert_eq!(row_text(&range, 1, 2), ["Document", "Title"]);
}

#[test]
fn date_cells_keep_their_date_text() {
    use Cell::{Date, Text};
    let temp_dir = tempdir().expect("temporary directory");
    let config = config_for(
        temp_dir.path(),
        vec![SheetRule::new("Events", 1, vec![2, 3]).with_delimiters(" @ ", "\t")],
    );
    write_input(
        &config.input_file,
        &[(
            "Events",
            vec![vec![Text("EV-1"), Date(2021, 3, 15), Text("kickoff")]],
        )],
    );

    convert::convert(&config).expect("conversion succeeded");

    let range = read_output(&config.output_file, "Merged");
    assert_eq!(text(&range, 1, 0), "EV-1");
    assert_eq!(text(&range, 1, 1), "2021-03-15 @ kickoff");
}
