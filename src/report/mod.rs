//! Result reporting: CSV emission/ingestion and console output

pub mod console;
pub mod csv;
pub mod files;

pub use csv::CsvTable;
