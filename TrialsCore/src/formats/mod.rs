//! File formats exchanged with the external tools

pub mod table;

pub use table::{
    KeyConvention, LineEnding, LocalizationTable, TableRow, normalize_key, parse_table,
    read_table, write_table, DEFAULT_NAMESPACE, TABLE_EXTENSION,
};
