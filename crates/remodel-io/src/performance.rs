//! Performance (monthly reporting) file reader.
//!
//! The pipeline only consumes two of the 29 columns — the loan identifier
//! and the modification flag — but every row is still validated against the
//! full positional schema so that a malformed file fails fast.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::IoError;
use crate::domain::{LoanId, PerformanceRecord};

/// Positional column names for the performance file.
///
/// The file itself carries no header row; this schema supplies the names.
pub const PERFORMANCE_COLUMNS: [&str; 29] = [
    "loan_id",
    "reporting_period",
    "servicer",
    "current_interest_rate",
    "current_upb",
    "loan_age",
    "months_to_maturity",
    "adjusted_months_to_maturity",
    "maturity_date",
    "msa",
    "delinquency_status",
    "modification_flag",
    "zero_balance_code",
    "zero_balance_date",
    "last_paid_installment_date",
    "foreclosure_date",
    "disposition_date",
    "foreclosure_costs",
    "preservation_repair_costs",
    "asset_recovery_costs",
    "misc_holding_expenses",
    "holding_taxes",
    "net_sale_proceeds",
    "credit_enhancement_proceeds",
    "repurchase_make_whole_proceeds",
    "other_foreclosure_proceeds",
    "non_interest_bearing_upb",
    "principal_forgiveness_upb",
    "foreclosure_writeoff_amount",
];

/// Index of the modification flag in [`PERFORMANCE_COLUMNS`].
const MODIFICATION_FLAG_COLUMN: usize = 11;

/// Reads monthly reporting records from a pipe-delimited performance file.
///
/// Expected format:
/// - No header row; 29 `|`-separated columns per [`PERFORMANCE_COLUMNS`]
/// - One row per loan per reporting period; duplicate loan IDs are expected
/// - Modification flag is `Y`, `N`, or empty (empty counts as not modified)
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::Parse`] | Malformed record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::ColumnCountMismatch`] | Row has other than 29 columns |
/// | [`IoError::EmptyLoanId`] | First column is empty |
/// | [`IoError::InvalidModificationFlag`] | Flag is not `Y`, `N`, or empty |
pub struct PerformanceReader {
    path: PathBuf,
}

impl PerformanceReader {
    /// Create a new reader for the given performance file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning one record per reporting period.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<PerformanceRecord>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        let mut n_modified = 0usize;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::Parse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != PERFORMANCE_COLUMNS.len() {
                return Err(IoError::ColumnCountMismatch {
                    path: self.path.clone(),
                    row_index,
                    expected: PERFORMANCE_COLUMNS.len(),
                    got: record.len(),
                });
            }

            let loan_id = record.get(0).unwrap_or("").to_string();
            if loan_id.is_empty() {
                return Err(IoError::EmptyLoanId {
                    path: self.path.clone(),
                    row_index,
                });
            }
            let raw_flag = record.get(MODIFICATION_FLAG_COLUMN).unwrap_or("");
            let modified = match raw_flag {
                "Y" => true,
                "N" | "" => false,
                other => {
                    return Err(IoError::InvalidModificationFlag {
                        path: self.path.clone(),
                        row_index,
                        raw: other.to_string(),
                    });
                }
            };
            if modified {
                n_modified += 1;
            }

            records.push(PerformanceRecord {
                loan_id: LoanId::new(loan_id),
                modified,
            });
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_periods = records.len(),
            n_modified, "performance records loaded"
        );

        Ok(records)
    }
}
