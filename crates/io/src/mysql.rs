//! MySQL extraction source.
//!
//! One query joins each credit application with its client and two per-client
//! aggregates (payment history, real estate). Every column is cast in SQL to a
//! fixed wire type so decoding never depends on the server's column metadata.
//!
//! sqlx is async; the source runs it on a current-thread runtime built for the
//! duration of one `fetch` so the rest of the pipeline stays blocking.

use scorebridge_config::DatabaseSettings;
use scorebridge_core::{ColumnKind, Record, SOURCE_COLUMNS};
use serde_json::Value;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Row};

use crate::source::{RecordSource, SourceError};

/// Select expression for each source column, before casting.
const COLUMN_EXPRESSIONS: &[(&str, &str)] = &[
    ("id_solicitud", "s.id_solicitud"),
    ("id_cliente", "c.id_cliente"),
    ("ingresos_mensuales", "c.ingresos_mensuales"),
    ("anios_empleo", "c.anios_empleo"),
    ("tipo_contrato", "c.tipo_contrato"),
    ("deuda_total", "c.deuda_total"),
    ("limite_tc", "c.limite_tc"),
    ("comportamiento_pago", "c.comportamiento_pago"),
    ("fecha_alta_cliente", "c.fecha_alta_cliente"),
    ("edad", "c.edad"),
    ("sexo", "c.sexo"),
    ("nacionalidad", "c.nacionalidad"),
    ("comuna", "c.comuna"),
    ("etnia", "c.etnia"),
    ("monto_solicitado", "s.monto_solicitado"),
    ("plazo_meses", "s.plazo_meses"),
    ("tipo_producto", "s.tipo_producto"),
    ("canal_origen", "s.canal_origen"),
    ("tasa_interes_anual", "s.tasa_interes_anual"),
    ("fecha_solicitud", "s.fecha_solicitud"),
    ("incumplio", "s.incumplio"),
    ("max_dias_mora_historico", "hp.max_dias_mora_historico"),
    ("cantidad_atrasos", "hp.cantidad_atrasos"),
    ("patrimonio_inmobiliario", "br.patrimonio_inmobiliario"),
    ("tiene_propiedad_en_remate", "br.tiene_propiedad_en_remate"),
];

const FROM_CLAUSE: &str = "\
FROM solicitudes_credito s
JOIN clientes c ON c.id_cliente = s.id_cliente
LEFT JOIN (
    SELECT id_cliente,
           MAX(dias_atraso) AS max_dias_mora_historico,
           SUM(CASE WHEN dias_atraso > 0 THEN 1 ELSE 0 END) AS cantidad_atrasos
    FROM historial_pagos
    GROUP BY id_cliente
) hp ON hp.id_cliente = c.id_cliente
LEFT JOIN (
    SELECT id_cliente,
           SUM(avaluo_fiscal) AS patrimonio_inmobiliario,
           MAX(CASE WHEN en_remate = 1 THEN 1 ELSE 0 END) AS tiene_propiedad_en_remate
    FROM bienes_raices
    GROUP BY id_cliente
) br ON br.id_cliente = c.id_cliente";

/// Build the extraction query for at most `limit` rows.
pub fn extract_query(limit: usize) -> String {
    let select: Vec<String> = SOURCE_COLUMNS
        .iter()
        .map(|spec| {
            let expr = COLUMN_EXPRESSIONS
                .iter()
                .find(|(name, _)| *name == spec.name)
                .map(|(_, expr)| *expr)
                .unwrap_or(spec.name);
            format!("    {} AS {}", cast(expr, spec.kind), spec.name)
        })
        .collect();

    format!("SELECT\n{}\n{}\nLIMIT {}", select.join(",\n"), FROM_CLAUSE, limit)
}

fn cast(expr: &str, kind: ColumnKind) -> String {
    match kind {
        ColumnKind::Integer => format!("CAST({expr} AS SIGNED)"),
        ColumnKind::Number => format!("CAST({expr} AS DOUBLE)"),
        ColumnKind::Date => format!("DATE_FORMAT({expr}, '%Y-%m-%d')"),
        ColumnKind::Text | ColumnKind::Sex => format!("CAST({expr} AS CHAR)"),
    }
}

/// Joined application rows from the bank database.
pub struct MySqlSource {
    database: DatabaseSettings,
    limit: usize,
}

impl MySqlSource {
    pub fn new(database: DatabaseSettings, limit: usize) -> Self {
        Self { database, limit }
    }

    async fn fetch_async(&self) -> Result<Vec<Record>, SourceError> {
        let options = MySqlConnectOptions::new()
            .host(&self.database.host)
            .port(self.database.port)
            .username(&self.database.user)
            .password(&self.database.password)
            .database(&self.database.name);

        let mut conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| SourceError::Connect(e.to_string()))?;

        let sql = extract_query(self.limit);
        let rows = sqlx::query(&sql).fetch_all(&mut conn).await;

        if let Err(e) = conn.close().await {
            log::warn!("closing database connection failed: {e}");
        }

        let rows = rows.map_err(|e| SourceError::Query(e.to_string()))?;
        rows.iter().map(decode_row).collect()
    }
}

impl RecordSource for MySqlSource {
    fn describe(&self) -> String {
        format!(
            "mysql://{}@{}:{}/{}",
            self.database.user, self.database.host, self.database.port, self.database.name
        )
    }

    fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SourceError::Connect(format!("cannot start database runtime: {e}")))?;

        log::info!("extracting up to {} application(s) from {}", self.limit, self.describe());
        let records = runtime.block_on(self.fetch_async())?;
        log::info!("extracted {} application(s)", records.len());
        Ok(records)
    }
}

fn decode_row(row: &MySqlRow) -> Result<Record, SourceError> {
    let mut record = Record::new();
    for spec in SOURCE_COLUMNS {
        let value = match spec.kind {
            ColumnKind::Integer => row.try_get::<Option<i64>, _>(spec.name).map(|v| v.map(Value::from)),
            ColumnKind::Number => row.try_get::<Option<f64>, _>(spec.name).map(|v| v.map(Value::from)),
            ColumnKind::Text | ColumnKind::Sex | ColumnKind::Date => {
                row.try_get::<Option<String>, _>(spec.name).map(|v| v.map(Value::from))
            }
        }
        .map_err(|e| SourceError::Query(format!("column {}: {e}", spec.name)))?;
        record.insert(spec.name, value.unwrap_or(Value::Null));
    }
    Ok(record)
}
