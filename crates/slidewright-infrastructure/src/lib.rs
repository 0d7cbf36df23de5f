//! Infrastructure layer for Slidewright: file locations, configuration,
//! OAuth secret storage, and the CSV row source.

pub mod config_service;
pub mod csv_row_source;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::csv_row_source::CsvRowSource;
pub use crate::paths::SlidewrightPaths;
