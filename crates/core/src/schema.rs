//! Source column table.
//!
//! The extraction query, the coercion pass and the default fill all read
//! from [`SOURCE_COLUMNS`], so adding a column means adding one row here.

/// How a source column is typed after coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Whole number (ids, flags).
    Integer,
    /// Any numeric value; unparseable input becomes null.
    Number,
    /// Free text, trimmed.
    Text,
    /// Calendar date rendered as `YYYY-MM-DD`.
    Date,
    /// `M` / `F`, anything else becomes `NA`.
    Sex,
}

/// Value filled in when a column is null or absent after coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnDefault {
    Int(i64),
    Text(&'static str),
}

impl ColumnDefault {
    pub fn to_value(self) -> serde_json::Value {
        match self {
            Self::Int(n) => serde_json::Value::from(n),
            Self::Text(s) => serde_json::Value::from(s),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub default: Option<ColumnDefault>,
}

const fn col(name: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { name, kind, default: None }
}

const fn col_or(name: &'static str, kind: ColumnKind, default: ColumnDefault) -> ColumnSpec {
    ColumnSpec { name, kind, default: Some(default) }
}

use ColumnDefault::{Int, Text as TextDefault};
use ColumnKind::{Date, Integer, Number, Sex, Text};

/// Application + client + history aggregate columns, in extraction order.
pub const SOURCE_COLUMNS: &[ColumnSpec] = &[
    col("id_solicitud", Integer),
    col("id_cliente", Integer),
    col_or("ingresos_mensuales", Number, Int(0)),
    col("anios_empleo", Number),
    col("tipo_contrato", Text),
    col("deuda_total", Number),
    col("limite_tc", Number),
    col("comportamiento_pago", Number),
    col("fecha_alta_cliente", Date),
    col_or("edad", Number, Int(-1)),
    col("sexo", Sex),
    col("nacionalidad", Text),
    col("comuna", Text),
    col_or("etnia", Text, TextDefault("No Informado")),
    col("monto_solicitado", Number),
    col("plazo_meses", Number),
    col("tipo_producto", Text),
    col("canal_origen", Text),
    col("tasa_interes_anual", Number),
    col("fecha_solicitud", Date),
    col("incumplio", Integer),
    col_or("max_dias_mora_historico", Number, Int(0)),
    col_or("cantidad_atrasos", Number, Int(0)),
    col_or("patrimonio_inmobiliario", Number, Int(0)),
    col_or("tiene_propiedad_en_remate", Number, Int(0)),
];

/// Columns written to the dashboard file, in output order.
pub const OUTPUT_COLUMNS: &[&str] = &[
    "id_solicitud",
    "id_cliente",
    "comuna",
    "ingresos_mensuales",
    "edad",
    "sexo",
    "nacionalidad",
    "etnia",
    "monto_solicitado",
    "plazo_meses",
    "tipo_producto",
    "canal_origen",
    "tasa_interes_anual",
    "fecha_solicitud",
    "score_riesgo",
    "decision_legacy",
    "decision",
    "incumplio",
];

pub fn column(name: &str) -> Option<&'static ColumnSpec> {
    SOURCE_COLUMNS.iter().find(|c| c.name == name)
}
