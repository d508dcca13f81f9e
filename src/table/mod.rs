//! Tabular display of discovered objects
//!
//! Column specs with typed sorting, the interactive sort state and a
//! plain-text renderer.

pub mod columns;
pub mod field;
pub mod render;
pub mod sort;

pub use columns::reconciled_object_fields;
pub use field::{ColumnValue, Field, SortKey, SortType, column_index};
pub use render::{DEFAULT_MAX_COLUMN_WIDTH, render_table};
pub use sort::{TableSort, sort_rows};
