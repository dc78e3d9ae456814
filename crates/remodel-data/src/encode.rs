//! One-hot encoding for categorical fields.

/// A fitted one-hot encoding for a single categorical field.
///
/// Categories are the distinct non-empty values observed at fit time, in
/// sorted order. The first sorted category is the dropped reference level:
/// it produces the all-zeros row, avoiding collinearity with an intercept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotEncoding {
    field_name: String,
    categories: Vec<String>,
}

impl OneHotEncoding {
    /// Fit an encoding from the observed values of one field.
    ///
    /// Empty strings (missing values) are skipped — the caller drops those
    /// rows per the missing-value policy. Returns `None` when no non-empty
    /// value was observed.
    pub fn fit<'a>(field_name: &str, values: impl Iterator<Item = &'a str>) -> Option<Self> {
        let mut categories: Vec<String> = values
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        categories.sort_unstable();
        categories.dedup();
        if categories.is_empty() {
            return None;
        }
        Some(Self {
            field_name: field_name.to_string(),
            categories,
        })
    }

    /// Names of the indicator columns this encoding produces, one per
    /// category except the dropped reference.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .skip(1)
            .map(|c| format!("{}={}", self.field_name, c))
            .collect()
    }

    /// Number of indicator columns (categories minus the reference).
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.categories.len() - 1
    }

    /// The dropped reference category.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.categories[0]
    }

    /// Encode a value into indicator columns.
    ///
    /// The reference category encodes as all zeros. Returns `None` for a
    /// value not observed at fit time (including the empty string).
    #[must_use]
    pub fn encode(&self, value: &str) -> Option<Vec<f64>> {
        let position = self.categories.iter().position(|c| c == value)?;
        let mut row = vec![0.0; self.n_columns()];
        if position > 0 {
            row[position - 1] = 1.0;
        }
        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_sorted_and_deduped() {
        let enc =
            OneHotEncoding::fit("channel", ["R", "C", "B", "R", "C"].into_iter()).unwrap();
        assert_eq!(enc.reference(), "B");
        assert_eq!(enc.column_names(), vec!["channel=C", "channel=R"]);
        assert_eq!(enc.n_columns(), 2);
    }

    #[test]
    fn reference_encodes_all_zeros() {
        let enc = OneHotEncoding::fit("channel", ["R", "C", "B"].into_iter()).unwrap();
        assert_eq!(enc.encode("B").unwrap(), vec![0.0, 0.0]);
        assert_eq!(enc.encode("C").unwrap(), vec![1.0, 0.0]);
        assert_eq!(enc.encode("R").unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn unseen_value_is_none() {
        let enc = OneHotEncoding::fit("channel", ["R", "C"].into_iter()).unwrap();
        assert!(enc.encode("X").is_none());
        assert!(enc.encode("").is_none());
    }

    #[test]
    fn missing_values_skipped_at_fit() {
        let enc = OneHotEncoding::fit("purpose", ["P", "", "C", ""].into_iter()).unwrap();
        assert_eq!(enc.reference(), "C");
        assert_eq!(enc.column_names(), vec!["purpose=P"]);
    }

    #[test]
    fn all_missing_yields_none() {
        assert!(OneHotEncoding::fit("purpose", ["", ""].into_iter()).is_none());
    }

    #[test]
    fn single_category_yields_zero_columns() {
        // A constant field contributes nothing beyond the reference.
        let enc = OneHotEncoding::fit("product", ["FRM", "FRM"].into_iter()).unwrap();
        assert_eq!(enc.n_columns(), 0);
        assert_eq!(enc.encode("FRM").unwrap(), Vec::<f64>::new());
    }
}
