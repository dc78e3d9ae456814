//! Domain types for remodel-io.

use crate::IoError;

/// A loan identifier.
///
/// Wraps the non-empty string from the first column of both input files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoanId(String);

impl LoanId {
    /// Create a new loan ID from a non-empty string.
    ///
    /// Readers reject empty cells with [`crate::IoError::EmptyLoanId`]
    /// before construction.
    pub(crate) fn new(id: String) -> Self {
        debug_assert!(!id.is_empty(), "loan ID must not be empty");
        Self(id)
    }

    /// Return the loan ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated run name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunName(String);

impl RunName {
    /// Parse and validate a run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidRunName`] if the name is empty or contains
    /// characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidRunName { name });
        }
        Ok(Self(name))
    }

    /// Return the run name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One loan-level row from the acquisition file.
///
/// Numeric columns are `Option<f64>` — an empty cell is a missing value,
/// and the missing-value policy is decided downstream by the feature
/// preparer, not by the loader. Categorical and date-like columns are kept
/// as raw strings; an empty string means missing.
#[derive(Debug, Clone)]
pub struct AcquisitionRecord {
    /// Unique loan identifier.
    pub loan_id: LoanId,
    /// Origination channel (e.g. `R`, `C`, `B`).
    pub channel: String,
    /// Seller institution name.
    pub seller_name: String,
    /// Original interest rate.
    pub interest_rate: Option<f64>,
    /// Original unpaid principal balance.
    pub upb: Option<f64>,
    /// Original loan term in months.
    pub loan_term: Option<f64>,
    /// Origination date (`MM/YYYY`).
    pub origination_date: String,
    /// First payment date (`MM/YYYY`).
    pub first_payment_date: String,
    /// Original loan-to-value ratio.
    pub ltv: Option<f64>,
    /// Original combined loan-to-value ratio.
    pub cltv: Option<f64>,
    /// Number of borrowers.
    pub num_borrowers: Option<f64>,
    /// Debt-to-income ratio.
    pub dti: Option<f64>,
    /// Borrower credit score at origination.
    pub credit_score: Option<f64>,
    /// First-time home buyer indicator (`Y`, `N`, `U`).
    pub first_time_buyer: String,
    /// Loan purpose (`P` purchase, `C` cash-out refi, `R` refi).
    pub loan_purpose: String,
    /// Property type (`SF`, `CO`, `CP`, `MH`, `PU`).
    pub property_type: String,
    /// Number of units.
    pub num_units: Option<f64>,
    /// Occupancy status (`P` principal, `S` second, `I` investor).
    pub occupancy_status: String,
    /// Property state.
    pub property_state: String,
    /// First three digits of the property zip code.
    pub zip_short: String,
    /// Mortgage insurance percentage.
    pub mortgage_insurance_pct: Option<f64>,
    /// Product type (e.g. `FRM`).
    pub product_type: String,
    /// Co-borrower credit score at origination.
    pub co_borrower_credit_score: Option<f64>,
}

/// One monthly reporting row from the performance file, reduced to the
/// fields the pipeline consumes: the loan identifier and whether this
/// period carries a modification marker.
#[derive(Debug, Clone)]
pub struct PerformanceRecord {
    /// Loan identifier this reporting period belongs to.
    pub loan_id: LoanId,
    /// Whether the modification flag for this period is `Y`.
    pub modified: bool,
}
