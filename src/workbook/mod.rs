pub mod reader;
pub mod writer;

pub use reader::{read_table, sheet_names};
pub use writer::{
    records_to_table, statistics_table, write_extraction_workbook, write_generation_workbook,
};
