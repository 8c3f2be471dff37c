//! Truth algebra: Belnap's four-valued logic and its direct/default extension.
//!
//! [`Truth`] is the base logic carried by observations. It is ordered by
//! knowledge: `None` (no evidence) at the bottom, `Both` (conflicting evidence)
//! at the top, `True` and `False` incomparable in between.
//!
//! [`Belief`] tags each base value as either `Direct` (settled by evaluating a
//! node) or `Default` (the unset placeholder, or derived from an unset input).
//! Predictions and expectations stored on prior-knowledge items are beliefs.
//!
//! Operators:
//!
//! | operator | used for | base component |
//! |---|---|---|
//! | [`Truth::union`] | observations attached to one node | knowledge join |
//! | [`Belief::merge`] | co-occurring, all-must-hold evidence | truth meet (conjunction) |
//! | [`Belief::choice`] | mutually exclusive alternatives | best-ranked candidate |
//! | [`Belief::overlay`] | a node's own evidence on top of inferred values | knowledge join |

pub mod conclusion;

use serde::{Deserialize, Serialize};

pub use conclusion::Conclusion;

// ---------------------------------------------------------------------------
// Four-valued base logic
// ---------------------------------------------------------------------------

/// Belnap four-valued truth value.
///
/// Not `Ord`: the knowledge and truth orders are partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Truth {
    True,
    False,
    Both,
    None,
}

impl Truth {
    /// All four values, in conclusion-table order.
    pub const ALL: [Truth; 4] = [Truth::True, Truth::False, Truth::Both, Truth::None];

    /// Knowledge-order join: accumulate evidence.
    ///
    /// `None` is the identity, `Both` absorbs, and `True ⊔ False = Both`.
    pub fn join(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::None, x) | (x, Truth::None) => x,
            (Truth::Both, _) | (_, Truth::Both) => Truth::Both,
            (Truth::True, Truth::True) => Truth::True,
            (Truth::False, Truth::False) => Truth::False,
            (Truth::True, Truth::False) | (Truth::False, Truth::True) => Truth::Both,
        }
    }

    /// Truth-order meet (Belnap conjunction).
    ///
    /// `False` absorbs, `True` is the identity, and the two incomparable
    /// middle values meet at `False`.
    pub fn conjoin(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, x) | (x, Truth::True) => x,
            (Truth::Both, Truth::Both) => Truth::Both,
            (Truth::None, Truth::None) => Truth::None,
            (Truth::Both, Truth::None) | (Truth::None, Truth::Both) => Truth::False,
        }
    }

    /// Join of any number of values; the empty union is `None`.
    pub fn union<I>(values: I) -> Truth
    where
        I: IntoIterator<Item = Truth>,
    {
        values.into_iter().fold(Truth::None, Truth::join)
    }

    /// Whether this value carries no evidence at all.
    pub fn is_none(self) -> bool {
        self == Truth::None
    }

    /// Rank among mutually exclusive alternatives: a present alternative wins,
    /// a contradictory one beats an absent one, and no evidence ranks last.
    fn alternative_rank(self) -> u8 {
        match self {
            Truth::True => 3,
            Truth::Both => 2,
            Truth::False => 1,
            Truth::None => 0,
        }
    }
}

impl std::fmt::Display for Truth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Truth::True => write!(f, "t"),
            Truth::False => write!(f, "f"),
            Truth::Both => write!(f, "b"),
            Truth::None => write!(f, "n"),
        }
    }
}

impl std::str::FromStr for Truth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "t" | "true" => Ok(Truth::True),
            "f" | "false" => Ok(Truth::False),
            "b" | "both" => Ok(Truth::Both),
            "n" | "none" => Ok(Truth::None),
            other => Err(format!("unknown truth value: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Eight-valued direct/default logic
// ---------------------------------------------------------------------------

/// A four-valued truth tagged with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Belief {
    /// Settled by evaluation at the node.
    Direct(Truth),
    /// Unset, or derived from at least one unset input.
    Default(Truth),
}

impl Belief {
    /// The initial value of every prediction and expectation.
    pub const UNSET: Belief = Belief::Default(Truth::None);

    /// Explicitly evaluated, with no evidence either way.
    pub const NO_EVIDENCE: Belief = Belief::Direct(Truth::None);

    /// Plain, directly-evidenced `True`.
    pub const TRUE: Belief = Belief::Direct(Truth::True);

    /// Plain, directly-evidenced `False`.
    pub const FALSE: Belief = Belief::Direct(Truth::False);

    /// Lift a base value to a direct belief.
    pub fn direct(truth: Truth) -> Belief {
        Belief::Direct(truth)
    }

    /// Project onto the base logic, discarding the tag.
    pub fn truth(self) -> Truth {
        match self {
            Belief::Direct(t) | Belief::Default(t) => t,
        }
    }

    pub fn is_direct(self) -> bool {
        matches!(self, Belief::Direct(_))
    }

    /// Combine co-occurring evidence that must all hold.
    ///
    /// The base component is the conjunction of every input; the result is
    /// direct only when every input is direct. The empty merge is [`Belief::UNSET`].
    pub fn merge<I>(values: I) -> Belief
    where
        I: IntoIterator<Item = Belief>,
    {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return Belief::UNSET;
        };
        let (truth, all_direct) = iter.fold((first.truth(), first.is_direct()), |(t, d), b| {
            (t.conjoin(b.truth()), d && b.is_direct())
        });
        if all_direct {
            Belief::Direct(truth)
        } else {
            Belief::Default(truth)
        }
    }

    /// Select the best of several mutually exclusive alternatives.
    ///
    /// Direct beats default; within a tag, `True > Both > False > None`.
    /// The empty choice is [`Belief::UNSET`].
    pub fn choice<I>(values: I) -> Belief
    where
        I: IntoIterator<Item = Belief>,
    {
        values
            .into_iter()
            .max_by_key(|b| b.choice_key())
            .unwrap_or(Belief::UNSET)
    }

    /// Apply a node's own evidence on top of an inferred value.
    ///
    /// Evidence of `None` leaves the inferred value untouched. Any other
    /// evidence replaces the inferred `None` component and is joined with the
    /// rest, yielding a direct belief.
    pub fn overlay(self, evidence: Truth) -> Belief {
        if evidence.is_none() {
            self
        } else {
            Belief::Direct(self.truth().join(evidence))
        }
    }

    fn choice_key(self) -> (bool, u8) {
        (self.is_direct(), self.truth().alternative_rank())
    }
}

impl Default for Belief {
    fn default() -> Self {
        Belief::UNSET
    }
}

impl std::fmt::Display for Belief {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Upper case for direct, lower case for default.
        match self {
            Belief::Direct(t) => write!(f, "{}", t.to_string().to_uppercase()),
            Belief::Default(t) => write!(f, "{t}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use Truth::{Both as B, False as F, None as N, True as T};

    #[test]
    fn join_is_knowledge_order() {
        assert_eq!(T.join(F), B);
        assert_eq!(N.join(F), F);
        assert_eq!(B.join(N), B);
        assert_eq!(T.join(T), T);
        for x in Truth::ALL {
            assert_eq!(x.join(N), x);
            assert_eq!(x.join(B), B);
            for y in Truth::ALL {
                assert_eq!(x.join(y), y.join(x));
            }
        }
    }

    #[test]
    fn conjoin_is_belnap_meet() {
        assert_eq!(T.conjoin(N), N);
        assert_eq!(T.conjoin(B), B);
        assert_eq!(N.conjoin(B), F);
        for x in Truth::ALL {
            assert_eq!(x.conjoin(T), x);
            assert_eq!(x.conjoin(F), F);
            for y in Truth::ALL {
                assert_eq!(x.conjoin(y), y.conjoin(x));
            }
        }
    }

    #[test]
    fn union_of_observations() {
        assert_eq!(Truth::union(std::iter::empty()), N);
        assert_eq!(Truth::union([T]), T);
        assert_eq!(Truth::union([T, T, N]), T);
        assert_eq!(Truth::union([T, F]), B);
    }

    #[test]
    fn merge_conjoins_and_tracks_tag() {
        assert_eq!(Belief::merge(std::iter::empty()), Belief::UNSET);
        assert_eq!(Belief::merge([Belief::TRUE]), Belief::TRUE);
        assert_eq!(
            Belief::merge([Belief::TRUE, Belief::NO_EVIDENCE]),
            Belief::NO_EVIDENCE
        );
        assert_eq!(Belief::merge([Belief::TRUE, Belief::FALSE]), Belief::FALSE);
        assert_eq!(
            Belief::merge([Belief::TRUE, Belief::Default(T)]),
            Belief::Default(T)
        );
        assert_eq!(
            Belief::merge([Belief::TRUE, Belief::UNSET]),
            Belief::Default(N)
        );
    }

    #[test]
    fn choice_prefers_direct_then_rank() {
        assert_eq!(Belief::choice(std::iter::empty()), Belief::UNSET);
        assert_eq!(
            Belief::choice([Belief::FALSE, Belief::TRUE, Belief::NO_EVIDENCE]),
            Belief::TRUE
        );
        assert_eq!(
            Belief::choice([Belief::Direct(B), Belief::FALSE]),
            Belief::Direct(B)
        );
        assert_eq!(
            Belief::choice([Belief::Default(T), Belief::NO_EVIDENCE]),
            Belief::NO_EVIDENCE
        );
        assert_eq!(
            Belief::choice([Belief::UNSET, Belief::FALSE]),
            Belief::FALSE
        );
    }

    #[test]
    fn overlay_only_applies_real_evidence() {
        assert_eq!(Belief::UNSET.overlay(N), Belief::UNSET);
        assert_eq!(Belief::UNSET.overlay(T), Belief::TRUE);
        assert_eq!(Belief::NO_EVIDENCE.overlay(F), Belief::FALSE);
        assert_eq!(Belief::TRUE.overlay(F), Belief::Direct(B));
        assert_eq!(Belief::Default(T).overlay(T), Belief::TRUE);
    }

    #[test]
    fn display_distinguishes_tags() {
        assert_eq!(Belief::TRUE.to_string(), "T");
        assert_eq!(Belief::UNSET.to_string(), "n");
        assert_eq!("both".parse::<Truth>().unwrap(), B);
        assert!("maybe".parse::<Truth>().is_err());
    }
}
