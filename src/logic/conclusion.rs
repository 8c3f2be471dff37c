//! The sixteen conclusions and the expectation × prediction table.

use serde::{Deserialize, Serialize};

use super::{Belief, Truth};

/// Qualitative verdict on how a prior-knowledge item's prediction agrees
/// with its expectation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    ConfirmedPresence,
    UnexpectedAbsence,
    ContradictoryAbsence,
    Missing,
    UnexpectedPresence,
    ConfirmedAbsence,
    ContradictoryPresence,
    Absent,
    AmbiguousPresence,
    AmbiguousAbsence,
    AmbiguousContradictory,
    Ambiguous,
    UnconfirmedPresence,
    UnconfirmedAbsence,
    UnconfirmedContradictory,
    #[default]
    Unexplained,
}

impl Conclusion {
    /// Every conclusion, row by row through the table.
    pub const ALL: [Conclusion; 16] = [
        Conclusion::ConfirmedPresence,
        Conclusion::UnexpectedAbsence,
        Conclusion::ContradictoryAbsence,
        Conclusion::Missing,
        Conclusion::UnexpectedPresence,
        Conclusion::ConfirmedAbsence,
        Conclusion::ContradictoryPresence,
        Conclusion::Absent,
        Conclusion::AmbiguousPresence,
        Conclusion::AmbiguousAbsence,
        Conclusion::AmbiguousContradictory,
        Conclusion::Ambiguous,
        Conclusion::UnconfirmedPresence,
        Conclusion::UnconfirmedAbsence,
        Conclusion::UnconfirmedContradictory,
        Conclusion::Unexplained,
    ];

    /// Look up the conclusion for an (expectation, prediction) pair.
    pub fn evaluate(expectation: Truth, prediction: Truth) -> Conclusion {
        use Truth::{Both, False, None, True};

        match (expectation, prediction) {
            (True, True) => Conclusion::ConfirmedPresence,
            (True, False) => Conclusion::UnexpectedAbsence,
            (True, Both) => Conclusion::ContradictoryAbsence,
            (True, None) => Conclusion::Missing,

            (False, True) => Conclusion::UnexpectedPresence,
            (False, False) => Conclusion::ConfirmedAbsence,
            (False, Both) => Conclusion::ContradictoryPresence,
            (False, None) => Conclusion::Absent,

            (Both, True) => Conclusion::AmbiguousPresence,
            (Both, False) => Conclusion::AmbiguousAbsence,
            (Both, Both) => Conclusion::AmbiguousContradictory,
            (Both, None) => Conclusion::Ambiguous,

            (None, True) => Conclusion::UnconfirmedPresence,
            (None, False) => Conclusion::UnconfirmedAbsence,
            (None, Both) => Conclusion::UnconfirmedContradictory,
            (None, None) => Conclusion::Unexplained,
        }
    }

    /// Look up the conclusion for stored beliefs; the direct/default tag is ignored.
    pub fn of(expectation: Belief, prediction: Belief) -> Conclusion {
        Conclusion::evaluate(expectation.truth(), prediction.truth())
    }

    /// Human-readable label, e.g. `"confirmed presence"`.
    pub fn label(self) -> &'static str {
        match self {
            Conclusion::ConfirmedPresence => "confirmed presence",
            Conclusion::UnexpectedAbsence => "unexpected absence",
            Conclusion::ContradictoryAbsence => "contradictory absence",
            Conclusion::Missing => "missing",
            Conclusion::UnexpectedPresence => "unexpected presence",
            Conclusion::ConfirmedAbsence => "confirmed absence",
            Conclusion::ContradictoryPresence => "contradictory presence",
            Conclusion::Absent => "absent",
            Conclusion::AmbiguousPresence => "ambiguous presence",
            Conclusion::AmbiguousAbsence => "ambiguous absence",
            Conclusion::AmbiguousContradictory => "ambiguous contradictory",
            Conclusion::Ambiguous => "ambiguous",
            Conclusion::UnconfirmedPresence => "unconfirmed presence",
            Conclusion::UnconfirmedAbsence => "unconfirmed absence",
            Conclusion::UnconfirmedContradictory => "unconfirmed contradictory",
            Conclusion::Unexplained => "unexplained",
        }
    }

}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn table_is_total_and_injective() {
        let mut seen = HashSet::new();
        for expectation in Truth::ALL {
            for prediction in Truth::ALL {
                seen.insert(Conclusion::evaluate(expectation, prediction));
            }
        }
        assert_eq!(seen.len(), 16);
        assert!(Conclusion::ALL.iter().all(|c| seen.contains(c)));
    }

    #[test]
    fn table_rows_follow_declaration_order() {
        let mut expected = Conclusion::ALL.iter();
        for expectation in Truth::ALL {
            for prediction in Truth::ALL {
                assert_eq!(
                    Some(&Conclusion::evaluate(expectation, prediction)),
                    expected.next()
                );
            }
        }
    }

    #[test]
    fn mismatches() {
        assert_eq!(
            Conclusion::evaluate(Truth::True, Truth::False),
            Conclusion::UnexpectedAbsence
        );
        assert_eq!(
            Conclusion::evaluate(Truth::False, Truth::True),
            Conclusion::UnexpectedPresence
        );
    }

    #[test]
    fn default_is_unexplained() {
        assert_eq!(Conclusion::default(), Conclusion::Unexplained);
    }

    #[test]
    fn tag_is_ignored() {
        assert_eq!(
            Conclusion::of(Belief::Default(Truth::True), Belief::TRUE),
            Conclusion::ConfirmedPresence
        );
        assert_eq!(
            Conclusion::of(Belief::UNSET, Belief::NO_EVIDENCE),
            Conclusion::Unexplained
        );
    }
}
