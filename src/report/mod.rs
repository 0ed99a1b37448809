//! Report output: JSON documents and formatted spreadsheets.

pub mod json;
pub mod spreadsheet;
