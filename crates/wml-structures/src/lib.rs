//! List Generation and the Table Virtual Grid & Reconciler (spec.md §4.7,
//! §4.8).

pub mod error;
pub mod list;
pub mod table;

pub use error::{Error, Result};
pub use list::{generate_list_fragment, GeneratedList};
pub use table::{generate_table_paragraph, ingest_table_grid, reconcile_table, TableOp};
