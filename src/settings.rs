//! The financial month start day, mirrored with the same optimistic
//! save-and-rollback discipline as the keyed collections.

use chrono::{Datelike, Months, NaiveDate};
use uuid::Uuid;

use crate::domain::StartDay;
use crate::errors::{LocalValidationError, MutationError, RemoteFailure};
use crate::mutation::MutationState;

/// A start-day save that has been shown locally and awaits the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    id: Uuid,
    previous: StartDay,
    proposed: StartDay,
}

impl PendingSave {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn previous(&self) -> StartDay {
        self.previous
    }

    pub fn proposed(&self) -> StartDay {
        self.proposed
    }
}

/// Single-value mirror of the start-day setting.
#[derive(Debug, Clone)]
pub struct SettingsCell {
    value: StartDay,
    loaded: bool,
    state: MutationState,
}

impl SettingsCell {
    /// Creates a cell holding `fallback` until the server value is loaded.
    pub fn new(fallback: StartDay) -> Self {
        Self {
            value: fallback,
            loaded: false,
            state: MutationState::Idle,
        }
    }

    pub fn get(&self) -> StartDay {
        self.value
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// State of the most recent save.
    pub fn state(&self) -> MutationState {
        self.state
    }

    /// Stores the value reported by the server.
    pub fn load(&mut self, value: StartDay) {
        self.value = value;
        self.loaded = true;
    }

    /// Validates `day` and shows it immediately. Invalid days leave the cell
    /// untouched and never reach the remote.
    pub fn begin_save(&mut self, day: u32) -> Result<PendingSave, LocalValidationError> {
        let proposed = StartDay::new(day)?;
        self.state = MutationState::Applying;
        let pending = PendingSave {
            id: Uuid::new_v4(),
            previous: self.value,
            proposed,
        };
        self.value = proposed;
        self.state = MutationState::AwaitingRemote;
        tracing::debug!(save = %pending.id, start_day = %proposed, "applied start day locally");
        Ok(pending)
    }

    pub fn settle(
        &mut self,
        pending: PendingSave,
        response: Result<(), RemoteFailure>,
    ) -> Result<StartDay, MutationError> {
        match response {
            Ok(()) => {
                self.state = MutationState::Committed;
                self.loaded = true;
                tracing::info!(save = %pending.id, start_day = %pending.proposed, "start day saved");
                Ok(pending.proposed)
            }
            Err(failure) => {
                self.value = pending.previous;
                self.state = MutationState::RolledBack;
                tracing::warn!(save = %pending.id, error = %failure, "start day save rolled back");
                Err(MutationError::from(failure))
            }
        }
    }
}

/// One financial month: from the start day of one calendar month up to the
/// day before the start day of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinancialMonth {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FinancialMonth {
    /// The financial month containing `date`. `None` only at the edges of
    /// the supported calendar range.
    pub fn containing(date: NaiveDate, start_day: StartDay) -> Option<Self> {
        let day = start_day.get();
        let anchor = if date.day() >= day {
            date
        } else {
            date.checked_sub_months(Months::new(1))?
        };
        let start = anchor.with_day(day)?;
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { start, end })
    }

    /// The month the period is named after: the one it ends in.
    pub fn label(&self) -> NaiveDate {
        self.end.with_day(1).unwrap_or(self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(value: u32) -> StartDay {
        StartDay::new(value).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn out_of_range_day_never_applies() {
        let mut cell = SettingsCell::new(day(25));
        assert_eq!(
            cell.begin_save(31),
            Err(LocalValidationError::StartDayOutOfRange(31))
        );
        assert_eq!(cell.get(), day(25));
        assert_eq!(cell.state(), MutationState::Idle);
    }

    #[test]
    fn save_is_visible_before_remote_answers() {
        let mut cell = SettingsCell::new(day(25));
        let pending = cell.begin_save(15).unwrap();
        assert_eq!(cell.get(), day(15));
        assert_eq!(cell.state(), MutationState::AwaitingRemote);

        assert_eq!(cell.settle(pending, Ok(())), Ok(day(15)));
        assert_eq!(cell.state(), MutationState::Committed);
    }

    #[test]
    fn failed_save_restores_previous_value() {
        let mut cell = SettingsCell::new(day(25));
        cell.load(day(10));
        let pending = cell.begin_save(15).unwrap();

        let result = cell.settle(pending, Err(RemoteFailure::Transport("offline".into())));
        assert_eq!(result, Err(MutationError::TransportFailure));
        assert_eq!(cell.get(), day(10));
        assert_eq!(cell.state(), MutationState::RolledBack);
    }

    #[test]
    fn late_month_dates_belong_to_next_month() {
        let month = FinancialMonth::containing(date(2026, 10, 26), day(25)).unwrap();
        assert_eq!(month.start, date(2026, 10, 25));
        assert_eq!(month.end, date(2026, 11, 24));
        assert_eq!(month.label(), date(2026, 11, 1));
    }

    #[test]
    fn early_month_dates_belong_to_current_month() {
        let month = FinancialMonth::containing(date(2026, 10, 3), day(25)).unwrap();
        assert_eq!(month.start, date(2026, 9, 25));
        assert_eq!(month.end, date(2026, 10, 24));
        assert_eq!(month.label(), date(2026, 10, 1));
        assert!(month.contains(date(2026, 10, 24)));
        assert!(!month.contains(date(2026, 10, 25)));
    }

    #[test]
    fn start_day_one_matches_calendar_month() {
        let month = FinancialMonth::containing(date(2024, 2, 14), day(1)).unwrap();
        assert_eq!(month.start, date(2024, 2, 1));
        assert_eq!(month.end, date(2024, 2, 29));
        assert_eq!(month.label(), date(2024, 2, 1));
    }

    #[test]
    fn january_rolls_back_into_december() {
        let month = FinancialMonth::containing(date(2026, 1, 5), day(25)).unwrap();
        assert_eq!(month.start, date(2025, 12, 25));
        assert_eq!(month.label(), date(2026, 1, 1));
    }
}
