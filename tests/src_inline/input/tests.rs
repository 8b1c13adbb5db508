use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::memory::MemorySource;
use super::postgres::{select_sql, validate_table_name};
use super::snapshot::load_snapshot;
use super::*;
use crate::model::measures::MeasureSpec;
use crate::model::thresholds::SupportProfile;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("delay_kpi_input_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

fn write_gz(path: &Path, contents: &str) {
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    enc.write_all(contents.as_bytes()).unwrap();
    enc.finish().unwrap();
}

const TSV: &str = "entity_type\tentity_code\tkpi_family\tkpi_name\tkpi_value\toperated_flights\n\
airport\tJFK\tseverity\tavg_delay_severity_[min]\t5.5\t6000\n\
airline\tDL\tseverity\tavg_delay_severity_[min]\t25\t9000\n\
\n\
airport\tORD\tfrequency\tdelayed_flights_pct\t18.25\t1200\n";

fn row(entity_type: EntityType, code: &str, family: &str, name: &str, value: f64, flights: u64) -> CanonicalRow {
    CanonicalRow {
        entity_type,
        entity_code: code.to_string(),
        kpi_family: family.to_string(),
        kpi_name: name.to_string(),
        kpi_value: value,
        operated_flights: flights,
    }
}

#[test]
fn test_tsv_snapshot_parsing() {
    let dir = make_temp_dir();
    let path = dir.join("kpi.tsv");
    write_file(&path, TSV);

    let rows = load_snapshot(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        row(EntityType::Airport, "JFK", "severity", "avg_delay_severity_[min]", 5.5, 6000)
    );
    assert_eq!(rows[1].entity_type, EntityType::Airline);
    assert_eq!(rows[2].kpi_family, "frequency");
    assert_eq!(rows[2].operated_flights, 1200);
}

#[test]
fn test_tsv_columns_located_by_name() {
    let dir = make_temp_dir();
    let path = dir.join("kpi.tsv");
    write_file(
        &path,
        "operated_flights\tkpi_value\tkpi_name\tkpi_family\tentity_code\tENTITY_TYPE\n\
         7000\t12.0\tavg_delay_severity_[min]\tseverity\tAA\tairline\n",
    );

    let rows = load_snapshot(&path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entity_code, "AA");
    assert_eq!(rows[0].kpi_value, 12.0);
    assert_eq!(rows[0].operated_flights, 7000);
}

#[test]
fn test_gz_snapshot_parsing() {
    let dir = make_temp_dir();
    let path = dir.join("kpi.tsv.gz");
    write_gz(&path, TSV);

    let rows = load_snapshot(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].entity_code, "DL");
}

#[test]
fn test_json_snapshot_parsing() {
    let dir = make_temp_dir();
    let path = dir.join("kpi.json");
    write_file(
        &path,
        r#"[
  {"entity_type": "airport", "entity_code": "ATL", "kpi_family": "severity",
   "kpi_name": "avg_delay_severity_[min]", "kpi_value": 41.5, "operated_flights": 30000},
  {"entity_type": "heliport", "entity_code": "X1", "kpi_family": "severity",
   "kpi_name": "avg_delay_severity_[min]", "kpi_value": 3.0, "operated_flights": 9000},
  {"entity_type": "airline", "entity_code": "UA", "kpi_family": "severity",
   "kpi_name": "avg_delay_severity_[min]", "kpi_value": null, "operated_flights": 9000}
]"#,
    );

    let rows = load_snapshot(&path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entity_code, "ATL");
    assert_eq!(rows[0].kpi_value, 41.5);
}

#[test]
fn test_unknown_entity_type_skipped() {
    let dir = make_temp_dir();
    let path = dir.join("kpi.tsv");
    write_file(
        &path,
        "entity_type\tentity_code\tkpi_family\tkpi_name\tkpi_value\toperated_flights\n\
         route\tJFK-LAX\tseverity\tavg_delay_severity_[min]\t5\t6000\n\
         airport\tLAX\tseverity\tavg_delay_severity_[min]\t9\t6000\n",
    );

    let rows = load_snapshot(&path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entity_code, "LAX");
}

#[test]
fn test_malformed_value_names_line() {
    let dir = make_temp_dir();
    let path = dir.join("kpi.tsv");
    write_file(
        &path,
        "entity_type\tentity_code\tkpi_family\tkpi_name\tkpi_value\toperated_flights\n\
         airport\tLAX\tseverity\tavg_delay_severity_[min]\t9\t6000\n\
         airport\tSFO\tseverity\tavg_delay_severity_[min]\tabc\t6000\n",
    );

    match load_snapshot(&path) {
        Err(KpiError::Source { line, reason, .. }) => {
            assert_eq!(line, 3);
            assert!(reason.contains("kpi_value"));
        }
        other => panic!("expected source error, got {other:?}"),
    }
}

#[test]
fn test_missing_column_rejected() {
    let dir = make_temp_dir();
    let path = dir.join("kpi.tsv");
    write_file(&path, "entity_type\tentity_code\tkpi_value\n");

    match load_snapshot(&path) {
        Err(KpiError::Source { line, reason, .. }) => {
            assert_eq!(line, 1);
            assert!(reason.contains("kpi_family"));
        }
        other => panic!("expected source error, got {other:?}"),
    }
}

#[test]
fn test_missing_snapshot_is_data_unavailable() {
    let dir = make_temp_dir();
    let err = load_snapshot(&dir.join("absent.tsv")).unwrap_err();
    assert!(matches!(err, KpiError::DataUnavailable(_)));
}

#[test]
fn test_memory_source_applies_filters() {
    let profile = SupportProfile::default_v1();
    let mut source = MemorySource::new(vec![
        row(EntityType::Airport, "JFK", "severity", "avg_delay_severity_[min]", 5.0, 6000),
        row(EntityType::Airport, "ISP", "severity", "avg_delay_severity_[min]", 50.0, 4999),
        row(EntityType::Airport, "BOS", "severity", "avg_delay_severity_[min]", 8.0, 5000),
        row(EntityType::Airport, "JFK", "frequency", "delayed_flights_pct", 21.0, 6000),
        row(EntityType::Airport, "LGA", "severity", "other_kpi", 1.0, 9000),
    ]);

    let rows = source.fetch_rows(&MeasureSpec::severity(&profile)).unwrap();
    let codes: Vec<&str> = rows.iter().map(|r| r.entity_code.as_str()).collect();
    assert_eq!(codes, vec!["JFK", "BOS"]);
}

#[test]
fn test_open_source_snapshot() {
    let dir = make_temp_dir();
    let path = dir.join("kpi.tsv");
    write_file(&path, TSV);

    let mut source = open_source(&SourceConfig::Snapshot { path }).unwrap();
    assert_eq!(source.name(), "kpi.tsv");
    let rows = source
        .fetch_rows(&MeasureSpec::severity(&SupportProfile::default_v1()))
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_table_name_validation() {
    assert!(validate_table_name("mart.kpi_delay_canonical").is_ok());
    assert!(validate_table_name("kpi").is_ok());
    assert!(validate_table_name("").is_err());
    assert!(validate_table_name("mart.").is_err());
    assert!(validate_table_name("kpi; DROP TABLE kpi").is_err());
    assert!(validate_table_name("\"mart\".kpi").is_err());
}

#[test]
fn test_select_sql_binds_filters() {
    let sql = select_sql("mart.kpi_delay_canonical");
    assert!(sql.contains("FROM mart.kpi_delay_canonical"));
    assert!(sql.contains("kpi_family = $1"));
    assert!(sql.contains("kpi_name = $2"));
    assert!(sql.contains("operated_flights >= $3"));
}

#[test]
fn test_finite_value_drops_null_and_non_finite() {
    assert_eq!(finite_value(Some(12.5)), Some(12.5));
    assert_eq!(finite_value(Some(-3.0)), Some(-3.0));
    assert_eq!(finite_value(None), None);
    assert_eq!(finite_value(Some(f64::NAN)), None);
    assert_eq!(finite_value(Some(f64::INFINITY)), None);
    assert_eq!(finite_value(Some(f64::NEG_INFINITY)), None);
}

#[test]
fn test_tsv_non_finite_value_rejected() {
    let dir = make_temp_dir();
    let path = dir.join("kpi.tsv");
    write_file(
        &path,
        "entity_type\tentity_code\tkpi_family\tkpi_name\tkpi_value\toperated_flights\n\
         airport\tJFK\tseverity\tavg_delay_severity_[min]\tNaN\t6000\n",
    );

    let err = load_snapshot(&path).unwrap_err();
    assert!(matches!(err, KpiError::Source { line: 2, .. }));
}
