//! Export core modules shared by the extractor and the generator.

#[cfg(feature = "excel")]
pub mod excel_core;
