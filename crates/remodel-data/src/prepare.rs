//! Feature preparation: field selection, one-hot expansion, and the
//! missing-value policy.

use remodel_io::AcquisitionRecord;
use tracing::{debug, info, instrument};

use crate::DataError;
use crate::encode::OneHotEncoding;
use crate::frame::DesignMatrix;

/// A numeric acquisition field usable as a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    /// Original interest rate.
    InterestRate,
    /// Original unpaid principal balance.
    Upb,
    /// Original loan term in months.
    LoanTerm,
    /// Original loan-to-value ratio.
    Ltv,
    /// Original combined loan-to-value ratio.
    Cltv,
    /// Number of borrowers.
    NumBorrowers,
    /// Debt-to-income ratio.
    Dti,
    /// Borrower credit score.
    CreditScore,
    /// Number of units.
    NumUnits,
    /// Mortgage insurance percentage.
    MortgageInsurancePct,
    /// Co-borrower credit score.
    CoBorrowerCreditScore,
}

impl NumericField {
    /// Schema name of this field.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::InterestRate => "interest_rate",
            Self::Upb => "upb",
            Self::LoanTerm => "loan_term",
            Self::Ltv => "ltv",
            Self::Cltv => "cltv",
            Self::NumBorrowers => "num_borrowers",
            Self::Dti => "dti",
            Self::CreditScore => "credit_score",
            Self::NumUnits => "num_units",
            Self::MortgageInsurancePct => "mortgage_insurance_pct",
            Self::CoBorrowerCreditScore => "co_borrower_credit_score",
        }
    }

    /// Extract this field's value from a record.
    #[must_use]
    pub fn value(self, record: &AcquisitionRecord) -> Option<f64> {
        match self {
            Self::InterestRate => record.interest_rate,
            Self::Upb => record.upb,
            Self::LoanTerm => record.loan_term,
            Self::Ltv => record.ltv,
            Self::Cltv => record.cltv,
            Self::NumBorrowers => record.num_borrowers,
            Self::Dti => record.dti,
            Self::CreditScore => record.credit_score,
            Self::NumUnits => record.num_units,
            Self::MortgageInsurancePct => record.mortgage_insurance_pct,
            Self::CoBorrowerCreditScore => record.co_borrower_credit_score,
        }
    }
}

/// A categorical acquisition field usable for one-hot expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalField {
    /// Origination channel.
    Channel,
    /// Occupancy status.
    OccupancyStatus,
    /// First-time home buyer indicator.
    FirstTimeBuyer,
    /// Loan purpose.
    LoanPurpose,
    /// Property type.
    PropertyType,
}

impl CategoricalField {
    /// Schema name of this field.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::OccupancyStatus => "occupancy_status",
            Self::FirstTimeBuyer => "first_time_buyer",
            Self::LoanPurpose => "loan_purpose",
            Self::PropertyType => "property_type",
        }
    }

    /// Extract this field's value from a record. Empty means missing.
    #[must_use]
    pub fn value(self, record: &AcquisitionRecord) -> &str {
        match self {
            Self::Channel => &record.channel,
            Self::OccupancyStatus => &record.occupancy_status,
            Self::FirstTimeBuyer => &record.first_time_buyer,
            Self::LoanPurpose => &record.loan_purpose,
            Self::PropertyType => &record.property_type,
        }
    }
}

/// The fixed list of fields to retain, and how to treat their missing
/// values.
///
/// Column order in the output matrix: `numeric` fields in order, then
/// `zero_filled` fields in order, then one indicator block per
/// `categorical` field in order.
#[derive(Debug, Clone)]
pub struct FeatureSpec {
    /// Numeric fields where a missing value drops the row.
    numeric: Vec<NumericField>,
    /// Numeric fields where a missing value becomes zero.
    zero_filled: Vec<NumericField>,
    /// Categorical fields, one-hot expanded with a dropped reference.
    categorical: Vec<CategoricalField>,
}

impl FeatureSpec {
    /// Create an empty specification.
    #[must_use]
    pub fn new() -> Self {
        Self {
            numeric: Vec::new(),
            zero_filled: Vec::new(),
            categorical: Vec::new(),
        }
    }

    /// The standard modification-prediction feature set: the origination
    /// numerics, zero-filled mortgage insurance and co-borrower score (both
    /// structurally absent for most loans), and the origination
    /// categoricals.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_numeric(NumericField::CreditScore)
            .with_numeric(NumericField::InterestRate)
            .with_numeric(NumericField::Upb)
            .with_numeric(NumericField::LoanTerm)
            .with_numeric(NumericField::Ltv)
            .with_numeric(NumericField::Cltv)
            .with_numeric(NumericField::NumBorrowers)
            .with_numeric(NumericField::Dti)
            .with_numeric(NumericField::NumUnits)
            .with_zero_filled(NumericField::MortgageInsurancePct)
            .with_zero_filled(NumericField::CoBorrowerCreditScore)
            .with_categorical(CategoricalField::Channel)
            .with_categorical(CategoricalField::OccupancyStatus)
            .with_categorical(CategoricalField::FirstTimeBuyer)
            .with_categorical(CategoricalField::LoanPurpose)
            .with_categorical(CategoricalField::PropertyType)
    }

    /// Add a numeric field whose missing values drop the row.
    #[must_use]
    pub fn with_numeric(mut self, field: NumericField) -> Self {
        self.numeric.push(field);
        self
    }

    /// Add a numeric field whose missing values become zero.
    #[must_use]
    pub fn with_zero_filled(mut self, field: NumericField) -> Self {
        self.zero_filled.push(field);
        self
    }

    /// Add a categorical field for one-hot expansion.
    #[must_use]
    pub fn with_categorical(mut self, field: CategoricalField) -> Self {
        self.categorical.push(field);
        self
    }

    fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.zero_filled.is_empty() && self.categorical.is_empty()
    }
}

impl Default for FeatureSpec {
    fn default() -> Self {
        Self::standard()
    }
}

/// Build a fully numeric design matrix from labeled acquisition records.
///
/// Missing-value policy:
/// - `zero_filled` fields: missing becomes `0.0`
/// - every other retained field (numeric or categorical): missing drops the
///   row, along with its label
///
/// One-hot encodings are fitted on the categories observed in this call, so
/// the column set depends on the input data; within one call it is fixed
/// and deterministic (sorted categories, first one dropped as reference).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::EmptyDataset`] | Zero input records |
/// | [`DataError::LabelLengthMismatch`] | Labels not aligned 1:1 with records |
/// | [`DataError::EmptyFeatureSpec`] | Specification selects no fields |
/// | [`DataError::NoRowsRetained`] | Every row dropped by the policy |
#[instrument(skip_all, fields(n_records = records.len()))]
pub fn prepare(
    records: &[AcquisitionRecord],
    labels: &[bool],
    spec: &FeatureSpec,
) -> Result<DesignMatrix, DataError> {
    if records.is_empty() {
        return Err(DataError::EmptyDataset);
    }
    if labels.len() != records.len() {
        return Err(DataError::LabelLengthMismatch {
            n_records: records.len(),
            n_labels: labels.len(),
        });
    }
    if spec.is_empty() {
        return Err(DataError::EmptyFeatureSpec);
    }

    // Fit one encoding per categorical field on all observed values.
    let mut encodings = Vec::with_capacity(spec.categorical.len());
    for &field in &spec.categorical {
        let encoding =
            OneHotEncoding::fit(field.name(), records.iter().map(|r| field.value(r)));
        match encoding {
            Some(e) => encodings.push(e),
            // Field missing on every row: every row would be dropped anyway.
            None => {
                return Err(DataError::NoRowsRetained {
                    n_records: records.len(),
                });
            }
        }
    }

    // Assemble the fixed column set.
    let mut feature_names: Vec<String> = Vec::new();
    for &field in &spec.numeric {
        feature_names.push(field.name().to_string());
    }
    for &field in &spec.zero_filled {
        feature_names.push(field.name().to_string());
    }
    for encoding in &encodings {
        feature_names.extend(encoding.column_names());
    }
    debug!(n_columns = feature_names.len(), "column set fixed");

    // Encode rows, dropping those with disallowed missing values.
    let mut features: Vec<Vec<f64>> = Vec::with_capacity(records.len());
    let mut kept_labels: Vec<usize> = Vec::with_capacity(records.len());
    let mut n_dropped = 0usize;

    'rows: for (record, &label) in records.iter().zip(labels) {
        let mut row: Vec<f64> = Vec::with_capacity(feature_names.len());

        for &field in &spec.numeric {
            match field.value(record) {
                Some(v) => row.push(v),
                None => {
                    n_dropped += 1;
                    continue 'rows;
                }
            }
        }
        for &field in &spec.zero_filled {
            row.push(field.value(record).unwrap_or(0.0));
        }
        for (&field, encoding) in spec.categorical.iter().zip(&encodings) {
            match encoding.encode(field.value(record)) {
                Some(indicators) => row.extend(indicators),
                None => {
                    n_dropped += 1;
                    continue 'rows;
                }
            }
        }

        features.push(row);
        kept_labels.push(usize::from(label));
    }

    if features.is_empty() {
        return Err(DataError::NoRowsRetained {
            n_records: records.len(),
        });
    }

    info!(
        n_kept = features.len(),
        n_dropped,
        n_columns = feature_names.len(),
        "feature matrix prepared"
    );

    DesignMatrix::new(feature_names, features, kept_labels)
}
