//! Acquisition (loan-level) file reader with full input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{AcquisitionRecord, LoanId};

/// Positional column names for the acquisition file.
///
/// The file itself carries no header row; this schema supplies the names.
pub const ACQUISITION_COLUMNS: [&str; 23] = [
    "loan_id",
    "channel",
    "seller_name",
    "interest_rate",
    "upb",
    "loan_term",
    "origination_date",
    "first_payment_date",
    "ltv",
    "cltv",
    "num_borrowers",
    "dti",
    "credit_score",
    "first_time_buyer",
    "loan_purpose",
    "property_type",
    "num_units",
    "occupancy_status",
    "property_state",
    "zip_short",
    "mortgage_insurance_pct",
    "product_type",
    "co_borrower_credit_score",
];

/// Reads loan-level records from a pipe-delimited acquisition file.
///
/// Expected format:
/// - No header row; 23 `|`-separated columns per [`ACQUISITION_COLUMNS`]
/// - One row per loan; loan IDs must be unique
/// - Empty numeric cells are missing values, not errors
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::Parse`] | Malformed record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::ColumnCountMismatch`] | Row has other than 23 columns |
/// | [`IoError::EmptyLoanId`] | First column is empty |
/// | [`IoError::UnparseableNumber`] | Non-empty numeric cell fails to parse |
/// | [`IoError::DuplicateLoanId`] | Same loan ID appears twice |
pub struct AcquisitionReader {
    path: PathBuf,
}

impl AcquisitionReader {
    /// Create a new reader for the given acquisition file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning one record per loan.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<AcquisitionRecord>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets rows with varying column counts through so that
        // our own ColumnCountMismatch check fires instead of a low-level
        // parse error.
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::Parse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != ACQUISITION_COLUMNS.len() {
                return Err(IoError::ColumnCountMismatch {
                    path: self.path.clone(),
                    row_index,
                    expected: ACQUISITION_COLUMNS.len(),
                    got: record.len(),
                });
            }

            let loan_id_str = record.get(0).unwrap_or("").to_string();
            if loan_id_str.is_empty() {
                return Err(IoError::EmptyLoanId {
                    path: self.path.clone(),
                    row_index,
                });
            }
            if let Some(&first_row) = seen.get(&loan_id_str) {
                return Err(IoError::DuplicateLoanId {
                    path: self.path.clone(),
                    loan_id: loan_id_str,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(loan_id_str.clone(), row_index);

            let text = |col: usize| record.get(col).unwrap_or("").to_string();
            let number = |col: usize| -> Result<Option<f64>, IoError> {
                self.parse_numeric(record.get(col).unwrap_or(""), row_index, col)
            };

            records.push(AcquisitionRecord {
                loan_id: LoanId::new(loan_id_str),
                channel: text(1),
                seller_name: text(2),
                interest_rate: number(3)?,
                upb: number(4)?,
                loan_term: number(5)?,
                origination_date: text(6),
                first_payment_date: text(7),
                ltv: number(8)?,
                cltv: number(9)?,
                num_borrowers: number(10)?,
                dti: number(11)?,
                credit_score: number(12)?,
                first_time_buyer: text(13),
                loan_purpose: text(14),
                property_type: text(15),
                num_units: number(16)?,
                occupancy_status: text(17),
                property_state: text(18),
                zip_short: text(19),
                mortgage_insurance_pct: number(20)?,
                product_type: text(21),
                co_borrower_credit_score: number(22)?,
            });
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        debug!(n_columns = ACQUISITION_COLUMNS.len(), "schema applied");
        info!(n_loans = records.len(), "acquisition records loaded");

        Ok(records)
    }

    /// Parse a numeric cell: empty means missing, anything else must be a
    /// finite float.
    fn parse_numeric(
        &self,
        raw: &str,
        row_index: usize,
        col: usize,
    ) -> Result<Option<f64>, IoError> {
        if raw.is_empty() {
            return Ok(None);
        }
        let parse_err = || IoError::UnparseableNumber {
            path: self.path.clone(),
            row_index,
            column: ACQUISITION_COLUMNS[col].to_string(),
            raw: raw.to_string(),
        };
        let value: f64 = raw.parse().map_err(|_| parse_err())?;
        if !value.is_finite() {
            return Err(parse_err());
        }
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    /// One valid 23-column acquisition row with the given loan ID.
    fn valid_row(loan_id: &str) -> String {
        format!(
            "{loan_id}|R|BANK OF TEST|6.625|245000|360|10/2007|12/2007|80|80|2|38|724|N|P|SF|1|P|CA|945|0|FRM|698"
        )
    }

    #[test]
    fn read_valid_rows() {
        let content = format!("{}\n{}\n", valid_row("L001"), valid_row("L002"));
        let f = write_file(&content);
        let records = AcquisitionReader::new(f.path()).read().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].loan_id.as_str(), "L001");
        assert_eq!(records[0].channel, "R");
        assert!((records[0].interest_rate.unwrap() - 6.625).abs() < 1e-12);
        assert!((records[0].credit_score.unwrap() - 724.0).abs() < f64::EPSILON);
        assert_eq!(records[0].property_state, "CA");
    }

    #[test]
    fn empty_numeric_cell_is_missing() {
        // dti (column 11) and co_borrower_credit_score (column 22) left empty
        let row = "L001|R|BANK OF TEST|6.625|245000|360|10/2007|12/2007|80|80|2||724|N|P|SF|1|P|CA|945|0|FRM|";
        let f = write_file(&format!("{row}\n"));
        let records = AcquisitionReader::new(f.path()).read().unwrap();
        assert!(records[0].dti.is_none());
        assert!(records[0].co_borrower_credit_score.is_none());
    }

    #[test]
    fn error_file_not_found() {
        let result = AcquisitionReader::new(Path::new("/nonexistent/acq.txt")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_file("");
        let result = AcquisitionReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_column_count_mismatch() {
        let content = format!("{}\nL002|R|BANK\n", valid_row("L001"));
        let f = write_file(&content);
        let result = AcquisitionReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::ColumnCountMismatch {
                row_index: 1,
                expected: 23,
                got: 3,
                ..
            })
        ));
    }

    #[test]
    fn error_unparseable_number() {
        let row = valid_row("L001").replace("6.625", "abc");
        let f = write_file(&format!("{row}\n"));
        let result = AcquisitionReader::new(f.path()).read();
        match result {
            Err(IoError::UnparseableNumber { column, raw, .. }) => {
                assert_eq!(column, "interest_rate");
                assert_eq!(raw, "abc");
            }
            other => panic!("expected UnparseableNumber, got {other:?}"),
        }
    }

    #[test]
    fn error_non_finite_number() {
        let row = valid_row("L001").replace("6.625", "NaN");
        let f = write_file(&format!("{row}\n"));
        let result = AcquisitionReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::UnparseableNumber { .. })));
    }

    #[test]
    fn error_empty_loan_id() {
        let content = format!("{}\n{}\n", valid_row("L001"), valid_row(""));
        let f = write_file(&content);
        let result = AcquisitionReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::EmptyLoanId { row_index: 1, .. })
        ));
    }

    #[test]
    fn error_duplicate_loan_id() {
        let content = format!(
            "{}\n{}\n{}\n",
            valid_row("L001"),
            valid_row("L002"),
            valid_row("L001")
        );
        let f = write_file(&content);
        let result = AcquisitionReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::DuplicateLoanId {
                first_row: 0,
                second_row: 2,
                ..
            })
        ));
    }

    #[test]
    fn insertion_order_preserved() {
        let content = format!(
            "{}\n{}\n{}\n",
            valid_row("ZZZ"),
            valid_row("AAA"),
            valid_row("MMM")
        );
        let f = write_file(&content);
        let records = AcquisitionReader::new(f.path()).read().unwrap();
        assert_eq!(records[0].loan_id.as_str(), "ZZZ");
        assert_eq!(records[1].loan_id.as_str(), "AAA");
        assert_eq!(records[2].loan_id.as_str(), "MMM");
    }
}
