use std::time::Duration;

use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use tokio::runtime::{Builder, Runtime};

use crate::error::KpiError;
use crate::input::{CanonicalRow, CanonicalSource, finite_value};
use crate::model::entity::EntityType;
use crate::model::measures::MeasureSpec;

const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Blocking PostgreSQL reader. Holds one pooled connection for the run; dropping it closes
/// the pool whether or not the run succeeded.
pub struct PostgresSource {
    runtime: Runtime,
    pool: PgPool,
    select_sql: String,
}

impl PostgresSource {
    pub fn connect(url: &str, table: &str) -> Result<Self, KpiError> {
        validate_table_name(table)?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let pool = runtime
            .block_on(
                PgPoolOptions::new()
                    .max_connections(1)
                    .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
                    .connect(url),
            )
            .map_err(|e| KpiError::DataUnavailable(e.to_string()))?;

        Ok(Self {
            runtime,
            pool,
            select_sql: select_sql(table),
        })
    }
}

impl CanonicalSource for PostgresSource {
    fn name(&self) -> &str {
        "postgres"
    }

    fn fetch_rows(&mut self, spec: &MeasureSpec) -> Result<Vec<CanonicalRow>, KpiError> {
        let min_support = i64::try_from(spec.min_support).unwrap_or(i64::MAX);
        let rows = self
            .runtime
            .block_on(
                sqlx::query(&self.select_sql)
                    .bind(&spec.family)
                    .bind(&spec.kpi_name)
                    .bind(min_support)
                    .fetch_all(&self.pool),
            )
            .map_err(|e| KpiError::DataUnavailable(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(parsed) = decode_row(row)? {
                out.push(parsed);
            }
        }
        Ok(out)
    }
}

impl Drop for PostgresSource {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
        tracing::debug!("postgres pool closed");
    }
}

fn decode_row(row: &PgRow) -> Result<Option<CanonicalRow>, KpiError> {
    let get_err = |e: sqlx::Error| KpiError::DataUnavailable(e.to_string());

    let raw_type: String = row.try_get("entity_type").map_err(get_err)?;
    let entity_code: String = row.try_get("entity_code").map_err(get_err)?;
    let entity_type = match raw_type.parse::<EntityType>() {
        Ok(t) => t,
        Err(msg) => {
            tracing::warn!(code = %entity_code, "{msg}; skipping row");
            return Ok(None);
        }
    };
    let kpi_value: Option<f64> = row.try_get("kpi_value").map_err(get_err)?;
    let Some(kpi_value) = finite_value(kpi_value) else {
        tracing::warn!(code = %entity_code, "null or non-finite kpi_value; skipping row");
        return Ok(None);
    };
    let operated_flights: i64 = row.try_get("operated_flights").map_err(get_err)?;

    Ok(Some(CanonicalRow {
        entity_type,
        entity_code,
        kpi_family: row.try_get("kpi_family").map_err(get_err)?,
        kpi_name: row.try_get("kpi_name").map_err(get_err)?,
        kpi_value,
        operated_flights: operated_flights.max(0) as u64,
    }))
}

pub fn select_sql(table: &str) -> String {
    format!(
        "SELECT entity_type, entity_code, kpi_family, kpi_name, \
         kpi_value::float8 AS kpi_value, operated_flights::int8 AS operated_flights \
         FROM {table} \
         WHERE kpi_family = $1 AND kpi_name = $2 AND operated_flights >= $3 \
         ORDER BY entity_type, entity_code"
    )
}

/// Table names are interpolated into SQL, so only `schema.table` identifiers pass.
pub fn validate_table_name(table: &str) -> Result<(), KpiError> {
    let valid = !table.is_empty()
        && table.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(KpiError::DataUnavailable(format!(
            "invalid table name: {table}"
        )))
    }
}
