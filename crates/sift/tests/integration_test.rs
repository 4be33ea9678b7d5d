//! Integration tests for Sift.

use std::io::Write;
use tempfile::NamedTempFile;

use sift::{
    AssociativeOptions, FieldRef, FieldSlot, Options, RowLocation, Sift, SiftError,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content).expect("Failed to write to temp file");
    file
}

fn header_messages(sift: &Sift) -> Vec<String> {
    sift.errors(Some(RowLocation::Header), None)
        .into_iter()
        .map(|r| r.message)
        .collect()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_semicolon_table() {
    let sift = Sift::from_data("k1;k2\nv1;v2\nv3;v4", Options::default()).unwrap();

    assert_eq!(sift.source().delimiter, ';');
    assert_eq!(sift.header(), &["k1", "k2"]);
    assert_eq!(sift.table().rows(), &[vec!["v1", "v2"], vec!["v3", "v4"]]);
    assert_eq!(sift.column_count(), 2);
}

#[test]
fn test_from_file_tsv_with_bom() {
    let file = create_test_file(b"\xef\xbb\xbfsample_id\tdiagnosis\r\nS001\tCD\r\nS002\tUC\r\n");
    let sift = Sift::from_file(file.path(), Options::default()).unwrap();

    let source = sift.source();
    assert_eq!(source.path.as_deref(), Some(file.path()));
    assert_eq!(source.delimiter, '\t');
    assert!(source.had_bom);
    assert_eq!(source.line_count, 3);
    assert_eq!(sift.header(), &["sample_id", "diagnosis"]);
    assert_eq!(sift.row(2).unwrap(), &["S002", "UC"]);
}

#[test]
fn test_from_file_missing() {
    let result = Sift::from_file("/nonexistent/table.csv", Options::default());
    assert!(matches!(result, Err(SiftError::Io { .. })));
}

#[test]
fn test_explicit_dialect() {
    let options = Options::default().with_delimiter('|').with_quote('\'');
    let sift = Sift::from_data("a|b\n'x|y'|z", options).unwrap();

    assert_eq!(sift.row(1).unwrap(), &["x|y", "z"]);
}

#[test]
fn test_quoted_newline_keeps_line_numbers() {
    let options = Options::default().with_unique("id");
    let sift = Sift::from_data("id,note\n1,\"two\nlines\"\n1,x\n", options).unwrap();

    assert_eq!(sift.row_count(), 2);
    assert_eq!(sift.row(1).unwrap()[1], "two\nlines");
    assert_eq!(sift.table().line_numbers(), &[2, 4]);
    assert_eq!(
        sift.error(RowLocation::Row(1), &"id".into()),
        Some("duplicate value '1' on lines 2, 4")
    );
}

#[test]
fn test_prose_apostrophes_from_file() {
    let file = create_test_file(b"name;note\nO'Brien;it's fine\nSmith;y\nJones;don't\n");
    let sift = Sift::from_file(file.path(), Options::default().with_unique("name")).unwrap();

    assert_eq!(sift.source().quote, '\'');
    assert_eq!(sift.row_count(), 3);
    assert_eq!(sift.column(1, 1).unwrap(), vec!["it's fine", "y", "don't"]);
    assert_eq!(sift.table().line_numbers(), &[2, 3, 4]);
    assert!(!sift.has_error(None, None));
}

#[test]
fn test_empty_and_blank_inputs() {
    let sift = Sift::from_data("", Options::default()).unwrap();
    assert_eq!(sift.column_count(), 0);
    assert_eq!(header_messages(&sift), vec!["file is empty"]);

    let sift = Sift::from_data(" ", Options::default()).unwrap();
    assert_eq!(sift.column_count(), 1);
}

#[test]
fn test_rows_padded_to_widest() {
    let sift = Sift::from_data("a;b\nc;d;x;x\ne;f", Options::default()).unwrap();

    assert_eq!(sift.column_count(), 4);
    assert_eq!(
        sift.as_array(),
        vec![
            vec!["a", "b", "", ""],
            vec!["c", "d", "x", "x"],
            vec!["e", "f", "", ""],
        ]
    );
}

#[test]
fn test_header_normalization() {
    let options = Options::default().with_lower_field_names(true);
    let sift = Sift::from_data(" ID , Name ,id\n1,a,2", options).unwrap();

    assert_eq!(sift.header(), &["id", "name", "id"]);
    assert_eq!(header_messages(&sift), vec!["duplicate field names: id"]);

    // name lookup resolves to the first occurrence
    let rows = sift.as_associative(None);
    assert_eq!(rows[0]["id"], "2");
    assert_eq!(sift.errors(None, Some(&"ID".into())).len(), 0);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_required_field() {
    let options = Options::default().with_required("k1");
    let sift = Sift::from_data("k1,k2\nv1,v2\n,v4\nv5,v6", options).unwrap();

    assert!(sift.has_error(Some(RowLocation::Row(1)), Some(&"k1".into())));
    assert!(!sift.has_error(Some(RowLocation::Row(0)), None));
    assert!(!sift.has_error(Some(RowLocation::Row(2)), None));
    assert_eq!(sift.errors_count(None), 1);
}

#[test]
fn test_required_missing_cell_vs_not_null() {
    let options = Options::default()
        .with_check_fields_count(true)
        .with_required("b")
        .with_not_null("c");
    let sift = Sift::from_data("a,b,c\n1\n2,x,\n", options).unwrap();

    let b = FieldRef::from("b");
    let c = FieldRef::from("c");
    assert!(sift.has_error(Some(RowLocation::Row(0)), Some(&b)));
    // absent cells are not checked by not_null
    assert!(!sift.has_error(Some(RowLocation::Row(0)), Some(&c)));
    assert!(sift.has_error(Some(RowLocation::Row(1)), Some(&c)));
    assert!(sift.error_store().has_error(Some(RowLocation::Row(0)), Some(FieldSlot::Header)));
}

#[test]
fn test_unique_duplicates() {
    let options = Options::default().with_unique("id");
    let sift = Sift::from_data("id,name\n5,a\n6,b\n5,c", options).unwrap();

    let id = FieldRef::from("id");
    let expected = "duplicate value '5' on lines 2, 4";
    assert_eq!(sift.error(RowLocation::Row(0), &id), Some(expected));
    assert_eq!(sift.error(RowLocation::Row(2), &id), Some(expected));
    assert!(!sift.has_error(Some(RowLocation::Row(1)), None));
}

#[test]
fn test_unique_flags_shared_empty_key() {
    let options = Options::default().with_unique("id");
    let sift = Sift::from_data("id,x\n,1\n,2", options).unwrap();

    let id = FieldRef::from("id");
    assert!(sift.has_error(Some(RowLocation::Row(0)), Some(&id)));
    assert!(sift.has_error(Some(RowLocation::Row(1)), Some(&id)));
}

#[test]
fn test_unique_composite_key() {
    let options = Options::default().with_unique(FieldRef::group(["first", "last"]));
    let sift = Sift::from_data(
        "first,last,age\nJan,Novak,30\nJan,Dvorak,31\nJan,Novak,32",
        options,
    )
    .unwrap();

    let message = "duplicate value 'Jan, Novak' on lines 2, 4";
    assert_eq!(sift.error(RowLocation::Row(0), &"first".into()), Some(message));
    assert_eq!(sift.error(RowLocation::Row(2), &"last".into()), Some(message));
    assert_eq!(sift.errors_count(None), 4);
}

#[test]
fn test_allowed_fields() {
    let options = Options::default().with_allowed(["id", "name"]);
    let sift = Sift::from_data("id,name,extra\n1,a,b", options).unwrap();

    let messages = header_messages(&sift);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("extra"));
}

#[test]
fn test_allowed_regexp() {
    let options = Options::default()
        .with_allowed(["id"])
        .with_allowed_regexp("^attr_\\d+$");
    let sift = Sift::from_data("id,attr_1,attr_2\n1,a,b", options).unwrap();

    assert!(!sift.has_error(None, None));
}

#[test]
fn test_format_failure_keeps_cell() {
    let options = Options::default().with_format("id", "integer");
    let sift = Sift::from_data("id,name\nabc,a\n 7 ,b", options).unwrap();

    let id = FieldRef::from("id");
    assert!(sift.has_error(Some(RowLocation::Row(0)), Some(&id)));
    assert_eq!(sift.row(1).unwrap()[0], "abc");
    assert_eq!(sift.row(2).unwrap()[0], "7");
    assert_eq!(
        sift.error(RowLocation::Row(0), &id),
        Some("invalid integer value 'abc'")
    );
}

#[test]
fn test_format_null_value() {
    let options = Options::default()
        .with_format("amount", "float")
        .with_null_value("NULL");
    let sift = Sift::from_data("id;amount\n1;15,872\n2;  ", options).unwrap();

    assert_eq!(sift.column(1, 1).unwrap(), vec!["15.872", "NULL"]);
    assert!(!sift.has_error(None, None));
}

#[test]
fn test_fatal_configuration() {
    let bad_format = Options::default().with_format("id", "money");
    assert!(matches!(
        Sift::from_data("id\n1", bad_format),
        Err(SiftError::UnknownFormat(_))
    ));

    let bad_regexp = Options::default().with_allowed(["id"]).with_allowed_regexp("(");
    assert!(matches!(
        Sift::from_data("id\n1", bad_regexp),
        Err(SiftError::Regex(_))
    ));
}

#[test]
fn test_blank_lines_skipped_by_checks() {
    let options = Options::default()
        .with_required("id")
        .with_check_fields_count(true);
    let sift = Sift::from_data("id,name\n1,a\n\n2,b\n", options.clone()).unwrap();
    assert!(!sift.has_error(None, None));

    let sift = Sift::from_data(
        "id,name\n1,a\n\n2,b\n",
        options.with_skip_empty_lines(false),
    )
    .unwrap();
    assert!(sift.has_error(Some(RowLocation::Row(1)), None));
}

// =============================================================================
// Configuration & Output
// =============================================================================

#[test]
fn test_options_from_json() {
    let json = r#"{
        "required": ["id", 2],
        "unique": [["first", "last"]],
        "format": [{"field": "id", "format": "integer"}],
        "lower_field_names": true
    }"#;
    let options = Options::from_json(json).unwrap();
    let sift = Sift::from_data("ID,First,Last\n1,a,b\n,a,b", options).unwrap();

    assert!(sift.has_error(Some(RowLocation::Row(1)), Some(&"id".into())));
    assert!(sift.has_error(Some(RowLocation::Row(1)), Some(&"first".into())));
    assert!(sift.has_error(Some(RowLocation::Row(0)), Some(&FieldRef::Index(2))));
}

#[test]
fn test_error_store_json() {
    let options = Options::default().with_required("id");
    let sift = Sift::from_data("id\n\n", options.with_skip_empty_lines(false)).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&sift.error_store().to_json().unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["message"], "field is required");
}

#[test]
fn test_associative_view_from_file() {
    let file = create_test_file(b"k1;k2\nv1;v2\nv3;v4\n");
    let sift = Sift::from_file(file.path(), Options::default()).unwrap();

    let rows = sift.associative_rows(&AssociativeOptions::new().with_keys(["a", "b"]).with_offset(1));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["a"], "v3");
    assert_eq!(rows[1]["b"], "v4");
}
