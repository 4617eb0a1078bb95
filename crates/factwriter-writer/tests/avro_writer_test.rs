//! End-to-end tests: Avro schema + records in, fact files out, read back
//! through the Parquet Arrow reader.

use std::fs::File;
use std::path::{Path, PathBuf};

use apache_avro::types::{Record as AvroRecord, Value as AvroValue};
use apache_avro::Schema as AvroSchema;
use arrow::array::{Array, AsArray, RecordBatch};
use arrow::datatypes::{DataType, Float64Type, Int32Type, Int64Type};
use factwriter_config::{BadRecordAction, WriterConfig};
use factwriter_core::{AdaptationError, ConfigurationError, FieldKind, SchemaError};
use factwriter_writer::segment::{list_fact_files, FACT_FILE_EXT};
use factwriter_writer::{
    ColumnarWriter, WriterError, WriterState, SEGMENT_ID_KEY, SORT_COLUMNS_KEY,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::json;

const BASIC_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Acme",
    "fields": [
        {"name": "name", "type": "string"},
        {"name": "age", "type": "int"}
    ]
}"#;

const NESTED_SCHEMA: &str = r#"{
    "name": "address",
    "type": "record",
    "fields": [
        {"name": "name", "type": "string"},
        {"name": "age", "type": "int"},
        {"name": "address", "type": {
            "type": "record",
            "name": "my_address",
            "fields": [
                {"name": "street", "type": "string"},
                {"name": "city", "type": "string"}
            ]
        }}
    ]
}"#;

const COMPLEX_SCHEMA: &str = r#"{
    "name": "address",
    "type": "record",
    "fields": [
        {"name": "name", "type": "string"},
        {"name": "age", "type": "int"},
        {"name": "address", "type": {
            "type": "record",
            "name": "my_address",
            "fields": [
                {"name": "street", "type": "string"},
                {"name": "city", "type": "string"}
            ]
        }},
        {"name": "doorNum", "type": {
            "type": "array",
            "items": {"name": "EachdoorNums", "type": "int", "default": -1}
        }}
    ]
}"#;

fn parse(schema: &str) -> AvroSchema {
    AvroSchema::parse_str(schema).unwrap()
}

fn table_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("table")
}

fn null_segment(root: &Path) -> PathBuf {
    root.join("Fact").join("Part0").join("Segment_null")
}

fn read_batches(path: &Path) -> Vec<RecordBatch> {
    let file = File::open(path).unwrap();
    ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn read_all(paths: &[PathBuf]) -> Vec<RecordBatch> {
    paths.iter().flat_map(|path| read_batches(path)).collect()
}

fn total_rows(batches: &[RecordBatch]) -> usize {
    batches.iter().map(RecordBatch::num_rows).sum()
}

fn string_column(batches: &[RecordBatch], column: &str) -> Vec<String> {
    batches
        .iter()
        .flat_map(|batch| {
            let array = batch.column_by_name(column).unwrap().as_string::<i32>();
            (0..array.len())
                .map(|idx| array.value(idx).to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn test_write_basic() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), WriterConfig::new(&root)).unwrap();

    let record = json!({"name": "bob", "age": 10});
    for _ in 0..100 {
        writer.write(&record).unwrap();
    }
    let summary = writer.close().unwrap();

    let segment = null_segment(&root);
    assert!(segment.is_dir());
    assert_eq!(summary.segment_dir, segment);
    assert_eq!(summary.state, WriterState::Closed);
    assert_eq!(summary.rows_written, 100);
    assert_eq!(summary.rows_skipped, 0);

    let files = list_fact_files(&segment).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0], summary.files[0].path);
    assert!(files[0].to_string_lossy().ends_with(FACT_FILE_EXT));

    let batches = read_batches(&files[0]);
    assert_eq!(total_rows(&batches), 100);
    assert!(string_column(&batches, "name").iter().all(|n| n == "bob"));
}

#[test]
fn test_write_all_primitive() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let schema = parse(
        r#"{
            "name": "myrecord",
            "namespace": "org.apache.parquet.avro",
            "type": "record",
            "fields": [
                {"name": "myboolean", "type": "boolean"},
                {"name": "myint", "type": "int"},
                {"name": "mylong", "type": "long"},
                {"name": "myfloat", "type": "float"},
                {"name": "mydouble", "type": "double"},
                {"name": "mystring", "type": "string"}
            ]
        }"#,
    );

    let mut record = AvroRecord::new(&schema).unwrap();
    record.put("myboolean", true);
    record.put("myint", 10);
    record.put("mylong", 7775656565i64);
    record.put("myfloat", 23.5f32);
    record.put("mydouble", 44.56f64);
    record.put("mystring", "Ajantha");
    let record = AvroValue::from(record);

    let mut writer = ColumnarWriter::new(&schema, WriterConfig::new(&root)).unwrap();
    for _ in 0..100 {
        writer.write(&record).unwrap();
    }
    writer.close().unwrap();

    let files = list_fact_files(&null_segment(&root)).unwrap();
    assert_eq!(files.len(), 1);

    let batches = read_batches(&files[0]);
    assert_eq!(total_rows(&batches), 100);
    let batch = &batches[0];
    assert_eq!(
        batch.column_by_name("myfloat").unwrap().data_type(),
        &DataType::Float64
    );
    assert!(batch.column_by_name("myboolean").unwrap().as_boolean().value(0));
    assert_eq!(
        batch
            .column_by_name("myint")
            .unwrap()
            .as_primitive::<Int32Type>()
            .value(0),
        10
    );
    assert_eq!(
        batch
            .column_by_name("mylong")
            .unwrap()
            .as_primitive::<Int64Type>()
            .value(0),
        7775656565
    );
    assert_eq!(
        batch
            .column_by_name("myfloat")
            .unwrap()
            .as_primitive::<Float64Type>()
            .value(0),
        23.5
    );
    assert_eq!(
        batch
            .column_by_name("mydouble")
            .unwrap()
            .as_primitive::<Float64Type>()
            .value(0),
        44.56
    );
    assert_eq!(string_column(&batches, "mystring")[0], "Ajantha");
}

#[test]
fn test_write_nested_record() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let mut writer = ColumnarWriter::new(&parse(NESTED_SCHEMA), WriterConfig::new(&root)).unwrap();

    let record = json!({"name": "bob", "age": 10, "address": {"street": "abc", "city": "bang"}});
    for _ in 0..100 {
        writer.write(&record).unwrap();
    }
    writer.close().unwrap();

    let files = list_fact_files(&null_segment(&root)).unwrap();
    assert_eq!(files.len(), 1);

    let batches = read_batches(&files[0]);
    assert_eq!(total_rows(&batches), 100);
    for batch in &batches {
        let address = batch.column_by_name("address").unwrap().as_struct();
        let street = address.column_by_name("street").unwrap().as_string::<i32>();
        let city = address.column_by_name("city").unwrap().as_string::<i32>();
        for idx in 0..address.len() {
            assert!(!address.is_null(idx));
            assert_eq!(street.value(idx), "abc");
            assert_eq!(city.value(idx), "bang");
        }
    }
}

#[test]
fn test_write_complex_record() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let mut writer =
        ColumnarWriter::new(&parse(COMPLEX_SCHEMA), WriterConfig::new(&root)).unwrap();

    let record = json!({
        "name": "bob",
        "age": 10,
        "address": {"street": "abc", "city": "bang"},
        "doorNum": [1, 2, 3, 4]
    });
    for _ in 0..100 {
        writer.write(&record).unwrap();
    }
    writer.close().unwrap();

    let files = list_fact_files(&null_segment(&root)).unwrap();
    assert_eq!(files.len(), 1);

    let batches = read_batches(&files[0]);
    assert_eq!(total_rows(&batches), 100);
    let doors = batches[0].column_by_name("doorNum").unwrap().as_list::<i32>();
    let first = doors.value(0);
    assert_eq!(
        first.as_primitive::<Int32Type>().values().to_vec(),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn test_complex_column_as_sort_column_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let config = WriterConfig::new(&root).with_sort_by(["doorNum"]);

    let err = ColumnarWriter::new(&parse(COMPLEX_SCHEMA), config).err().unwrap();
    match err {
        WriterError::Configuration { source, .. } => assert_eq!(
            source,
            ConfigurationError::UnsortableColumn {
                column: "doorNum".to_string(),
                kind: FieldKind::Array,
            }
        ),
        other => panic!("unexpected error: {other}"),
    }

    assert!(!root.exists());
}

#[test]
fn test_unknown_sort_column_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = WriterConfig::new(table_path(&dir)).with_sort_by(["height"]);

    let err = ColumnarWriter::new(&parse(BASIC_SCHEMA), config).err().unwrap();
    assert!(matches!(
        err,
        WriterError::Configuration {
            source: ConfigurationError::UnknownColumn { .. },
            ..
        }
    ));
    assert_eq!(err.code(), "E002");
}

#[test]
fn test_unsupported_schema_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let schema = parse(
        r#"{"type": "record", "name": "r", "fields": [
            {"name": "payload", "type": "bytes"}
        ]}"#,
    );

    let err = ColumnarWriter::new(&schema, WriterConfig::new(table_path(&dir)))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        WriterError::Schema {
            source: SchemaError::UnsupportedType { ref path, .. },
            ..
        } if path == "payload"
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = WriterConfig::new(table_path(&dir)).with_max_file_bytes(0);

    let err = ColumnarWriter::new(&parse(BASIC_SCHEMA), config).err().unwrap();
    assert!(matches!(err, WriterError::InvalidConfig { .. }));
    assert!(err.to_string().contains("max_file_bytes"));
}

#[test]
fn test_small_threshold_splits_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let config = WriterConfig::new(&root).with_max_file_bytes(256);
    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), config).unwrap();

    for i in 0..100 {
        writer
            .write(&json!({"name": format!("person-{i:03}"), "age": i}))
            .unwrap();
    }
    let summary = writer.close().unwrap();

    let files = list_fact_files(&null_segment(&root)).unwrap();
    assert!(files.len() > 1);
    assert_eq!(files.len(), summary.files.len());
    assert_eq!(
        summary.files.iter().map(|f| f.row_count).sum::<u64>(),
        100
    );

    // Files are contiguous ranges in arrival order
    let ordered: Vec<PathBuf> = summary.files.iter().map(|f| f.path.clone()).collect();
    let names = string_column(&read_all(&ordered), "name");
    let expected: Vec<String> = (0..100).map(|i| format!("person-{i:03}")).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_sort_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let config = WriterConfig::new(&root).with_sort_by(["age"]);
    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), config).unwrap();

    let input = [
        ("carol", 30),
        ("alice", 20),
        ("erin", 10),
        ("dave", 30),
        ("bob", 20),
        ("frank", 10),
    ];
    for (name, age) in input {
        writer.write(&json!({"name": name, "age": age})).unwrap();
    }
    let summary = writer.close().unwrap();
    assert_eq!(summary.files.len(), 1);

    let batches = read_batches(&summary.files[0].path);
    assert_eq!(
        string_column(&batches, "name"),
        vec!["erin", "frank", "alice", "bob", "carol", "dave"]
    );
}

#[test]
fn test_existing_files_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let segment = null_segment(&root);
    std::fs::create_dir_all(&segment).unwrap();
    let existing = segment.join("earlier.carbondata");
    std::fs::write(&existing, b"not touched").unwrap();

    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), WriterConfig::new(&root)).unwrap();
    writer.write(&json!({"name": "bob", "age": 10})).unwrap();
    writer.close().unwrap();

    assert_eq!(std::fs::read(&existing).unwrap(), b"not touched");
    assert_eq!(list_fact_files(&segment).unwrap().len(), 2);
}

#[test]
fn test_segment_id_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let config = WriterConfig::new(&root)
        .with_segment_id("4")
        .with_sort_by(["name"]);
    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), config).unwrap();
    writer.write(&json!({"name": "bob", "age": 10})).unwrap();
    let summary = writer.close().unwrap();

    let segment = root.join("Fact").join("Part0").join("Segment_4");
    assert_eq!(summary.segment_dir, segment);
    let file = &summary.files[0];
    assert!(file.path.starts_with(&segment));
    assert!(file
        .path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .contains("-0-4-"));

    let bytes = std::fs::read(&file.path).unwrap();
    assert_eq!(file.file_size, bytes.len() as u64);
    assert_eq!(file.hash.as_bytes(), blake3::hash(&bytes).as_bytes());

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&file.path).unwrap()).unwrap();
    let kv = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .cloned()
        .unwrap_or_default();
    let lookup = |key: &str| {
        kv.iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.clone())
    };
    assert_eq!(lookup(SEGMENT_ID_KEY).as_deref(), Some("4"));
    assert_eq!(lookup(SORT_COLUMNS_KEY).as_deref(), Some("name"));
}

#[test]
fn test_non_transactional_writes_into_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let config = WriterConfig::new(&root).with_transactional(false);
    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), config).unwrap();
    writer.write(&json!({"name": "bob", "age": 10})).unwrap();
    writer.close().unwrap();

    assert_eq!(list_fact_files(&root).unwrap().len(), 1);
    assert!(!root.join("Fact").exists());
}

#[test]
fn test_close_is_idempotent_and_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), WriterConfig::new(&root)).unwrap();
    writer.write(&json!({"name": "bob", "age": 10})).unwrap();

    let first = writer.close().unwrap();
    let second = writer.close().unwrap();
    assert_eq!(first.files.len(), 1);
    assert_eq!(second.files.len(), 1);
    assert_eq!(first.files[0].path, second.files[0].path);
    assert_eq!(list_fact_files(&null_segment(&root)).unwrap().len(), 1);

    let err = writer.write(&json!({"name": "amy", "age": 11})).unwrap_err();
    assert!(matches!(err, WriterError::ClosedWriter { .. }));
    assert_eq!(writer.state(), WriterState::Closed);
}

#[test]
fn test_zero_rows_write_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), WriterConfig::new(&root)).unwrap();

    let summary = writer.close().unwrap();
    assert!(summary.files.is_empty());
    assert!(writer.data_files().is_empty());
    assert!(!root.exists());
}

#[test]
fn test_bad_record_aborts_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), WriterConfig::new(&root)).unwrap();
    writer.write(&json!({"name": "bob", "age": 10})).unwrap();

    let err = writer
        .write(&json!({"name": "amy", "age": "ten"}))
        .unwrap_err();
    match err {
        WriterError::Adaptation { source, .. } => assert_eq!(
            source,
            AdaptationError::TypeMismatch {
                path: "age".to_string(),
                expected: FieldKind::Int,
                actual: "string".to_string(),
            }
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(writer.state(), WriterState::Aborted);

    let err = writer.write(&json!({"name": "kim", "age": 12})).unwrap_err();
    assert!(matches!(err, WriterError::ClosedWriter { .. }));

    let summary = writer.close().unwrap();
    assert_eq!(summary.state, WriterState::Aborted);
    assert!(summary.files.is_empty());
    assert!(!root.exists());
}

#[test]
fn test_bad_records_skipped_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let config = WriterConfig::new(&root).with_bad_record_action(BadRecordAction::Skip);
    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), config).unwrap();

    writer.write(&json!({"name": "bob", "age": 10})).unwrap();
    writer.write(&json!({"name": "amy"})).unwrap();
    writer.write(&json!(["not", "a", "record"])).unwrap();
    writer.write(&json!({"name": "kim", "age": 12})).unwrap();
    assert_eq!(writer.buffered_rows(), 2);

    let summary = writer.close().unwrap();
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.rows_skipped, 2);

    let batches = read_all(&list_fact_files(&null_segment(&root)).unwrap());
    assert_eq!(string_column(&batches, "name"), vec!["bob", "kim"]);
}

#[test]
fn test_nullable_fields_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let schema = parse(
        r#"{"type": "record", "name": "r", "fields": [
            {"name": "name", "type": "string"},
            {"name": "nickname", "type": ["null", "string"], "default": null}
        ]}"#,
    );
    let mut writer = ColumnarWriter::new(&schema, WriterConfig::new(&root)).unwrap();
    writer.write(&json!({"name": "robert", "nickname": "bob"})).unwrap();
    writer.write(&json!({"name": "amy"})).unwrap();
    let summary = writer.close().unwrap();

    let batches = read_batches(&summary.files[0].path);
    let nickname = batches[0]
        .column_by_name("nickname")
        .unwrap()
        .as_string::<i32>();
    assert_eq!(nickname.value(0), "bob");
    assert!(nickname.is_null(1));
}

#[test]
fn test_reused_named_record_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    let schema = parse(
        r#"{"type": "record", "name": "person", "fields": [
            {"name": "name", "type": "string"},
            {"name": "home", "type": {"type": "record", "name": "addr", "fields": [
                {"name": "city", "type": "string"}
            ]}},
            {"name": "work", "type": "addr"}
        ]}"#,
    );
    let mut writer = ColumnarWriter::new(&schema, WriterConfig::new(&root)).unwrap();

    writer
        .write(&json!({"name": "bob", "home": {"city": "bang"}, "work": {"city": "pune"}}))
        .unwrap();
    writer.close().unwrap();

    let files = list_fact_files(&null_segment(&root)).unwrap();
    let batches = read_batches(&files[0]);
    assert_eq!(total_rows(&batches), 1);

    let city = |column: &str| {
        batches[0]
            .column_by_name(column)
            .unwrap()
            .as_struct()
            .column_by_name("city")
            .unwrap()
            .as_string::<i32>()
            .value(0)
            .to_string()
    };
    assert_eq!(city("home"), "bang");
    assert_eq!(city("work"), "pune");
}

#[test]
fn test_empty_nested_record_rejected_before_writes() {
    let dir = tempfile::tempdir().unwrap();
    let schema = parse(
        r#"{"type": "record", "name": "r", "fields": [
            {"name": "name", "type": "string"},
            {"name": "meta", "type": {"type": "record", "name": "m", "fields": []}}
        ]}"#,
    );

    let err = ColumnarWriter::new(&schema, WriterConfig::new(table_path(&dir)))
        .err()
        .unwrap();
    assert_eq!(err.code(), "E001");
    assert!(matches!(
        err,
        WriterError::Schema {
            source: SchemaError::EmptyRecord { ref path },
            ..
        } if path == "meta"
    ));
    assert!(!table_path(&dir).exists());
}

#[test]
fn test_unwritable_output_fails_close() {
    let dir = tempfile::tempdir().unwrap();
    let root = table_path(&dir);
    // A regular file where the output root directory should be
    std::fs::write(&root, b"not a directory").unwrap();

    let mut writer = ColumnarWriter::new(&parse(BASIC_SCHEMA), WriterConfig::new(&root)).unwrap();
    writer.write(&json!({"name": "bob", "age": 10})).unwrap();

    let err = writer.close().unwrap_err();
    assert_eq!(err.code(), "E005");
    assert!(matches!(err, WriterError::WriteFailure { .. }));
    assert_eq!(writer.state(), WriterState::Closed);
    assert!(writer.data_files().is_empty());

    let again = writer.close().unwrap();
    assert_eq!(again.state, WriterState::Closed);
    assert!(again.files.is_empty());
    assert_eq!(again.rows_written, 0);

    let err = writer.write(&json!({"name": "amy", "age": 11})).unwrap_err();
    assert!(matches!(err, WriterError::ClosedWriter { .. }));
    assert_eq!(std::fs::read(&root).unwrap(), b"not a directory");
}
