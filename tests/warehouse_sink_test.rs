// Integration tests for the in-memory warehouse sink

use fleetsync::{ColumnType, Sink, TableDescriptor, UpsertInstruction, WarehouseSink};
use serde_json::{json, Map, Value};

fn vehicles_table() -> TableDescriptor {
    TableDescriptor::new("vehicles", &["vehicle_name"])
        .with_column("vehicle_name", ColumnType::String)
        .with_column("arn", ColumnType::String)
}

fn upsert(value: Value) -> UpsertInstruction {
    let data: Map<String, Value> = value.as_object().cloned().unwrap();
    UpsertInstruction::new("vehicles", data)
}

#[test]
fn test_upsert_requires_declared_table() {
    let mut sink = WarehouseSink::new();
    let err = sink
        .upsert(upsert(json!({"vehicle_name": "car-1"})))
        .unwrap_err();
    assert!(err.to_string().contains("was not declared"));
}

#[test]
fn test_declare_rejects_invalid_descriptor() {
    let mut sink = WarehouseSink::new();
    let bad = TableDescriptor::new("vehicles", &["vehicle_name"]);
    assert!(sink.declare(&[bad]).is_err());
    assert!(sink.table_names().is_empty());
}

#[test]
fn test_duplicate_keys_last_write_wins() {
    let mut sink = WarehouseSink::new();
    sink.declare(&[vehicles_table()]).unwrap();

    sink.upsert(upsert(json!({"vehicle_name": "car-1", "arn": "arn:old"})))
        .unwrap();
    sink.upsert(upsert(json!({"vehicle_name": "car-2", "arn": "arn:2"})))
        .unwrap();
    sink.upsert(upsert(json!({"vehicle_name": "car-1", "arn": "arn:new"})))
        .unwrap();

    assert_eq!(sink.row_count("vehicles"), 2);
    let rows = sink.rows("vehicles");
    assert_eq!(rows[0]["vehicle_name"], "car-1");
    assert_eq!(rows[0]["arn"], "arn:new");
    assert_eq!(rows[1]["vehicle_name"], "car-2");
}

#[test]
fn test_redeclare_keeps_rows() {
    let mut sink = WarehouseSink::new();
    sink.declare(&[vehicles_table()]).unwrap();
    sink.upsert(upsert(json!({"vehicle_name": "car-1"}))).unwrap();

    sink.declare(&[vehicles_table()]).unwrap();
    assert_eq!(sink.row_count("vehicles"), 1);
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warehouse.json");

    let mut sink = WarehouseSink::new();
    sink.declare(&[vehicles_table()]).unwrap();
    sink.upsert(upsert(json!({"vehicle_name": "car-1", "arn": "arn:1"})))
        .unwrap();
    sink.save(&path).unwrap();

    assert!(!path.with_extension("tmp").exists());

    let loaded = WarehouseSink::load(&path).unwrap();
    assert_eq!(loaded.table_names(), vec!["vehicles"]);
    assert_eq!(loaded.rows("vehicles")[0]["arn"], "arn:1");
}

#[test]
fn test_unknown_table_has_no_rows() {
    let sink = WarehouseSink::new();
    assert!(sink.rows("vehicles").is_empty());
    assert_eq!(sink.row_count("vehicles"), 0);
}
