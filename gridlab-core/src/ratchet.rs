//! Ratchet: a protective level that can only tighten.
//!
//! - Long baskets: the level can only rise
//! - Short baskets: the level can only fall
//!
//! Holds across any number of intervening samples; only `clear` (basket reset) undoes it.

use crate::domain::Direction;
use rust_decimal::Decimal;

/// Ratchet state for one basket's protective level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatchetState {
    current_level: Option<Decimal>,
    direction: Direction,
}

impl RatchetState {
    /// Create an unset ratchet for `direction`.
    pub fn new(direction: Direction) -> Self {
        Self {
            current_level: None,
            direction,
        }
    }

    /// Create a ratchet already holding `initial_level`.
    pub fn with_initial_level(direction: Direction, initial_level: Decimal) -> Self {
        Self {
            current_level: Some(initial_level),
            direction,
        }
    }

    /// Apply the ratchet to a proposed level and return the stored level.
    ///
    /// # Example
    /// ```
    /// use gridlab_core::domain::Direction;
    /// use gridlab_core::ratchet::RatchetState;
    /// use rust_decimal_macros::dec;
    ///
    /// let mut ratchet = RatchetState::with_initial_level(Direction::Long, dec!(95));
    ///
    /// // Tightening: 95 → 100 (allowed)
    /// assert_eq!(ratchet.apply(dec!(100)), dec!(100));
    ///
    /// // Loosening: 100 → 90 (blocked, stays at 100)
    /// assert_eq!(ratchet.apply(dec!(90)), dec!(100));
    /// ```
    pub fn apply(&mut self, proposed: Decimal) -> Decimal {
        let level = match self.current_level {
            None => proposed,
            Some(current) => self.direction.more_favorable(current, proposed),
        };
        self.current_level = Some(level);
        level
    }

    /// Get the current level, if one has been set.
    pub fn current_level(&self) -> Option<Decimal> {
        self.current_level
    }

    /// Get the basket direction this ratchet tightens for.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Forget the level (basket reset).
    pub fn clear(&mut self) {
        self.current_level = None;
    }
}
