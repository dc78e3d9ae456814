//! Label derivation: which loans were ever modified.

use std::collections::HashSet;

use remodel_io::{AcquisitionRecord, PerformanceRecord};
use tracing::info;

/// Derive one boolean label per acquisition record: `true` iff the loan's
/// identifier appears in at least one performance record carrying a positive
/// modification flag.
///
/// Unmatched loan identifiers get `false` — the majority case, not an error.
/// Duplicate performance rows per loan are fine; one positive marker is
/// enough.
#[must_use]
pub fn derive_labels(
    acquisitions: &[AcquisitionRecord],
    performances: &[PerformanceRecord],
) -> Vec<bool> {
    let modified: HashSet<&str> = performances
        .iter()
        .filter(|p| p.modified)
        .map(|p| p.loan_id.as_str())
        .collect();

    let labels: Vec<bool> = acquisitions
        .iter()
        .map(|a| modified.contains(a.loan_id.as_str()))
        .collect();

    let n_positive = labels.iter().filter(|&&l| l).count();
    info!(
        n_loans = labels.len(),
        n_positive,
        positive_fraction = n_positive as f64 / labels.len().max(1) as f64,
        "labels derived"
    );

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use remodel_io::{AcquisitionReader, PerformanceReader};
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    fn acquisition_rows(loan_ids: &[&str]) -> Vec<AcquisitionRecord> {
        let mut content = String::new();
        for id in loan_ids {
            content.push_str(&format!(
                "{id}|R|BANK|6.625|245000|360|10/2007|12/2007|80|80|2|38|724|N|P|SF|1|P|CA|945|0|FRM|698\n"
            ));
        }
        read_acquisitions(&content)
    }

    fn read_acquisitions(content: &str) -> Vec<AcquisitionRecord> {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        AcquisitionReader::new(Path::new(f.path())).read().unwrap()
    }

    fn performance_rows(rows: &[(&str, &str)]) -> Vec<PerformanceRecord> {
        let mut content = String::new();
        for (id, flag) in rows {
            content.push_str(&format!(
                "{id}|01/2008|SVC|6.625|244100|3|357|356|09/2037|31084|0|{flag}|||||||||||||||||\n"
            ));
        }
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        PerformanceReader::new(Path::new(f.path())).read().unwrap()
    }

    #[test]
    fn positive_iff_any_positive_marker() {
        let acq = acquisition_rows(&["L1", "L2", "L3"]);
        let perf = performance_rows(&[("L1", "N"), ("L1", "Y"), ("L3", "N")]);
        let labels = derive_labels(&acq, &perf);
        assert_eq!(labels, vec![true, false, false]);
    }

    #[test]
    fn duplicate_markers_count_once() {
        let acq = acquisition_rows(&["L1"]);
        let perf = performance_rows(&[("L1", "Y"), ("L1", "Y"), ("L1", "Y")]);
        let labels = derive_labels(&acq, &perf);
        assert_eq!(labels, vec![true]);
    }

    #[test]
    fn unmatched_loans_are_negative() {
        let acq = acquisition_rows(&["L1", "L2"]);
        let perf = performance_rows(&[("L9", "Y")]);
        let labels = derive_labels(&acq, &perf);
        assert_eq!(labels, vec![false, false]);
    }

    #[test]
    fn every_record_gets_exactly_one_label() {
        let acq = acquisition_rows(&["L1", "L2", "L3", "L4"]);
        let perf = performance_rows(&[("L2", "Y"), ("L4", "Y"), ("L4", "N")]);
        let labels = derive_labels(&acq, &perf);
        assert_eq!(labels.len(), acq.len());
        assert_eq!(labels, vec![false, true, false, true]);
    }
}
