//! `scorebridge-core`: record model shared by every pipeline stage.

pub mod coerce;
pub mod record;
pub mod schema;

pub use coerce::{coerce_record, coerce_records};
pub use record::{key_text, record_from_value, Record, CLIENT_KEY};
pub use schema::{ColumnDefault, ColumnKind, ColumnSpec, OUTPUT_COLUMNS, SOURCE_COLUMNS};
