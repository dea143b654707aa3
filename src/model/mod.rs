//! Data model for forum-export tables.
//!
//! Raw CSV input is first read into a [`Table`] of optional string cells,
//! then validated and projected into a [`Dataset`] of [`Record`]s. The
//! cleaned result is a [`CleanedDataset`].

mod dataset;
mod record;
mod table;

pub use dataset::*;
pub use record::*;
pub use table::*;
