//! Fidelity flags describing how trustworthy a component's configuration is.
//!
//! Configuration can be populated from a live application object or from the
//! output of a static-analysis frontend. In the latter case parts of the
//! configuration may be unknowable: a dynamic call the analyzer could not
//! follow, or a registration guarded by a condition it could not evaluate.
//! [`Fidelity`] records that uncertainty so that validation can distinguish
//! "provably well-formed" from "well-formed as far as we can tell".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

const INCOMPLETE: u8 = 1 << 0;
const SPECULATIVE: u8 = 1 << 1;

/// A small flag-set describing the completeness of a component's data.
///
/// The default value is *immaculate*: the component is a faithful,
/// unconditional description of runtime behavior. Two flags degrade it:
///
/// - **incomplete**: some value could not be determined by the source that
///   populated the component.
/// - **speculative**: the component's very presence in the configuration is
///   conditional on logic that could not be evaluated.
///
/// Fidelity values combine with [`Fidelity::merge`] (or `|`); a component's
/// fidelity is the union of its intrinsic uncertainty with any uncertainty
/// inherited while it was populated.
///
/// # Example
///
/// ```
/// use solon_config::Fidelity;
///
/// let fidelity = Fidelity::immaculate();
/// assert!(fidelity.is_immaculate());
///
/// let fidelity = fidelity | Fidelity::incomplete();
/// assert!(fidelity.is_incomplete());
/// assert!(!fidelity.is_speculative());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fidelity(u8);

impl Fidelity {
    /// Returns the immaculate fidelity: no uncertainty at all.
    #[must_use]
    pub const fn immaculate() -> Self {
        Self(0)
    }

    /// Returns a fidelity carrying only the incomplete flag.
    #[must_use]
    pub const fn incomplete() -> Self {
        Self(INCOMPLETE)
    }

    /// Returns a fidelity carrying only the speculative flag.
    #[must_use]
    pub const fn speculative() -> Self {
        Self(SPECULATIVE)
    }

    /// Returns `true` if no flags are set.
    #[must_use]
    pub const fn is_immaculate(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if some value in the component could not be determined.
    #[must_use]
    pub const fn is_incomplete(self) -> bool {
        self.0 & INCOMPLETE != 0
    }

    /// Returns `true` if the component's presence in the configuration is
    /// conditional on logic that could not be evaluated.
    #[must_use]
    pub const fn is_speculative(self) -> bool {
        self.0 & SPECULATIVE != 0
    }

    /// Returns the union of the flags in `self` and `other`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Sets the incomplete flag in place.
    pub fn mark_incomplete(&mut self) {
        self.0 |= INCOMPLETE;
    }

    /// Sets the speculative flag in place.
    pub fn mark_speculative(&mut self) {
        self.0 |= SPECULATIVE;
    }
}

impl BitOr for Fidelity {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.merge(rhs)
    }
}

impl BitOrAssign for Fidelity {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.merge(rhs);
    }
}

impl fmt::Display for Fidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_incomplete(), self.is_speculative()) {
            (false, false) => f.write_str("immaculate"),
            (true, false) => f.write_str("incomplete"),
            (false, true) => f.write_str("speculative"),
            (true, true) => f.write_str("incomplete+speculative"),
        }
    }
}
