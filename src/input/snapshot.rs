use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::error::KpiError;
use crate::input::{CanonicalRow, finite_value};
use crate::model::entity::EntityType;

const COLUMNS: [&str; 6] = [
    "entity_type",
    "entity_code",
    "kpi_family",
    "kpi_name",
    "kpi_value",
    "operated_flights",
];

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    entity_type: String,
    entity_code: String,
    kpi_family: String,
    kpi_name: String,
    kpi_value: Option<f64>,
    operated_flights: u64,
}

/// Loads an exported canonical table. `.json` is a JSON array of rows, anything else is TSV
/// with a header; a trailing `.gz` is decompressed first.
pub fn load_snapshot(path: &Path) -> Result<Vec<CanonicalRow>, KpiError> {
    let reader = open_maybe_gz(path)?;
    if is_json(path) {
        parse_json(path, reader)
    } else {
        parse_tsv(path, reader)
    }
}

fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, KpiError> {
    let file = File::open(path).map_err(|e| {
        KpiError::DataUnavailable(format!("cannot open snapshot {}: {e}", path.display()))
    })?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn is_json(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    name.ends_with(".json") || name.ends_with(".json.gz")
}

fn parse_json(path: &Path, reader: impl Read) -> Result<Vec<CanonicalRow>, KpiError> {
    let raw: Vec<SnapshotRow> = serde_json::from_reader(reader).map_err(|e| KpiError::Source {
        path: path.to_path_buf(),
        line: e.line(),
        reason: e.to_string(),
    })?;

    let mut rows = Vec::with_capacity(raw.len());
    for (idx, row) in raw.into_iter().enumerate() {
        let entity_type = match row.entity_type.parse::<EntityType>() {
            Ok(t) => t,
            Err(msg) => {
                tracing::warn!(row = idx, "{msg}; skipping snapshot row");
                continue;
            }
        };
        let Some(kpi_value) = finite_value(row.kpi_value) else {
            tracing::warn!(row = idx, code = %row.entity_code, "null or non-finite kpi_value; skipping snapshot row");
            continue;
        };
        rows.push(CanonicalRow {
            entity_type,
            entity_code: row.entity_code,
            kpi_family: row.kpi_family,
            kpi_name: row.kpi_name,
            kpi_value,
            operated_flights: row.operated_flights,
        });
    }
    Ok(rows)
}

fn parse_tsv(path: &Path, mut reader: impl BufRead) -> Result<Vec<CanonicalRow>, KpiError> {
    let source_err = |line: usize, reason: String| KpiError::Source {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut buf = String::new();
    if reader.read_line(&mut buf)? == 0 {
        return Err(source_err(1, "snapshot is empty".to_string()));
    }
    let header: Vec<String> = buf
        .trim_end()
        .split('\t')
        .map(|s| s.trim().to_ascii_lowercase())
        .collect();

    let mut col_idx = [0usize; 6];
    for (slot, name) in col_idx.iter_mut().zip(COLUMNS) {
        *slot = header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| source_err(1, format!("missing column {name}")))?;
    }
    let [type_col, code_col, family_col, name_col, value_col, flights_col] = col_idx;

    let mut rows = Vec::new();
    let mut line_no = 1usize;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        let field = |idx: usize| fields.get(idx).copied().unwrap_or("");

        let entity_type = match field(type_col).parse::<EntityType>() {
            Ok(t) => t,
            Err(msg) => {
                tracing::warn!(line = line_no, "{msg}; skipping snapshot row");
                continue;
            }
        };
        let entity_code = field(code_col);
        if entity_code.is_empty() {
            tracing::warn!(line = line_no, "empty entity_code; skipping snapshot row");
            continue;
        }
        let raw_value = field(value_col);
        if raw_value.is_empty() || raw_value.eq_ignore_ascii_case("null") {
            tracing::warn!(line = line_no, code = entity_code, "null kpi_value; skipping snapshot row");
            continue;
        }
        let kpi_value = finite_value(raw_value.parse::<f64>().ok())
            .ok_or_else(|| source_err(line_no, format!("invalid kpi_value: {raw_value}")))?;
        let raw_flights = field(flights_col);
        let operated_flights = raw_flights
            .parse::<u64>()
            .map_err(|_| source_err(line_no, format!("invalid operated_flights: {raw_flights}")))?;

        rows.push(CanonicalRow {
            entity_type,
            entity_code: entity_code.to_string(),
            kpi_family: field(family_col).to_string(),
            kpi_name: field(name_col).to_string(),
            kpi_value,
            operated_flights,
        });
    }

    Ok(rows)
}
