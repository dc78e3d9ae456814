//! File I/O for the mortgage modification pipeline: readers for the two
//! pipe-delimited loan files and a JSON result writer.
//!
//! Both input files are headerless with fixed positional schemas — 23
//! columns for acquisition (loan-level) records, 29 columns for performance
//! (monthly reporting) records. Column names are supplied by the readers,
//! not read from the files.

mod acquisition;
mod domain;
mod error;
mod performance;
mod writer;

pub use acquisition::{ACQUISITION_COLUMNS, AcquisitionReader};
pub use domain::{AcquisitionRecord, LoanId, PerformanceRecord, RunName};
pub use error::IoError;
pub use performance::{PERFORMANCE_COLUMNS, PerformanceReader};
pub use writer::{ResultWriter, SearchEntry};
