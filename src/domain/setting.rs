use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::LocalValidationError;

pub const MIN_START_DAY: u32 = 1;
pub const MAX_START_DAY: u32 = 28;

/// Day of the month on which the financial month begins.
///
/// Capped at 28 so every calendar month contains the day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "u32", into = "u32")]
pub struct StartDay(u32);

impl StartDay {
    /// Payday-aligned default used until the server value is known.
    pub const DEFAULT: StartDay = StartDay(25);

    pub fn new(day: u32) -> Result<Self, LocalValidationError> {
        if (MIN_START_DAY..=MAX_START_DAY).contains(&day) {
            Ok(Self(day))
        } else {
            Err(LocalValidationError::StartDayOutOfRange(day))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for StartDay {
    type Error = LocalValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StartDay> for u32 {
    fn from(value: StartDay) -> Self {
        value.0
    }
}

impl fmt::Display for StartDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(StartDay::new(1).unwrap().get(), 1);
        assert_eq!(StartDay::new(28).unwrap().get(), 28);
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            StartDay::new(0),
            Err(LocalValidationError::StartDayOutOfRange(0))
        );
        assert_eq!(
            StartDay::new(31),
            Err(LocalValidationError::StartDayOutOfRange(31))
        );
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<StartDay>("15").is_ok());
        assert!(serde_json::from_str::<StartDay>("29").is_err());
    }
}
