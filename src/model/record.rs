//! Labeled training rows produced by the batch pipeline.

use std::fmt;

/// One `(identifier, validity)` row.
///
/// `validity` is `true` when the candidate's canonical identifier equals the identifier of the
/// geometry it was inferred from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabeledRecord {
    pub identifier: String,
    pub validity: bool,
}

impl LabeledRecord {
    pub fn new(identifier: impl Into<String>, validity: bool) -> Self {
        Self {
            identifier: identifier.into(),
            validity,
        }
    }

    /// Validity as the `0`/`1` flag used in tabular exports.
    pub fn validity_flag(&self) -> u8 {
        u8::from(self.validity)
    }
}

impl fmt::Display for LabeledRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identifier, self.validity_flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn validity_flag_maps_to_zero_or_one() {
        assert_eq!(LabeledRecord::new("CCO", true).validity_flag(), 1);
        assert_eq!(LabeledRecord::new("COC", false).validity_flag(), 0);
    }

    #[test]
    fn identical_rows_collapse_in_sets() {
        let rows: HashSet<_> = [
            LabeledRecord::new("O=C=O", true),
            LabeledRecord::new("O=C=O", true),
            LabeledRecord::new("O=C=O", false),
        ]
        .into_iter()
        .collect();
        assert_eq!(rows.len(), 2);
    }
}
