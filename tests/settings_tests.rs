mod common;

use budget_client::{
    config::ClientConfig,
    domain::StartDay,
    errors::{ClientError, LocalValidationError, MutationError, RemoteFailure},
    mutation::MutationState,
    remote::{InMemoryRemote, Operation},
    session::BudgetSession,
};
use chrono::NaiveDate;
use common::loaded_session;

#[test]
fn out_of_range_start_day_is_rejected_before_network() {
    let mut session = loaded_session(ClientConfig::default());

    let err = session.save_start_day(31).unwrap_err();

    assert!(matches!(
        err,
        ClientError::Local(LocalValidationError::StartDayOutOfRange(31))
    ));
    assert_eq!(session.remote().count_calls(Operation::SetSetting), 0);
    assert_eq!(session.settings().get(), StartDay::DEFAULT);
}

#[test]
fn valid_start_day_reaches_remote() {
    let mut session = loaded_session(ClientConfig::default());

    let saved = session.save_start_day(15).unwrap();

    assert_eq!(saved.get(), 15);
    assert_eq!(session.remote().count_calls(Operation::SetSetting), 1);
    assert_eq!(session.remote().start_day().get(), 15);
    assert_eq!(session.settings().state(), MutationState::Committed);
}

#[test]
fn rejected_save_restores_previous_day() {
    let mut session = loaded_session(ClientConfig::default());
    session.save_start_day(10).unwrap();
    session
        .remote_mut()
        .fail_next(RemoteFailure::rejected("Database is locked"));

    let err = session.save_start_day(20).unwrap_err();

    assert!(matches!(
        err,
        ClientError::Mutation(MutationError::ValidationRejected(_))
    ));
    assert_eq!(session.settings().get().get(), 10);
    assert_eq!(session.settings().state(), MutationState::RolledBack);
}

#[test]
fn unloaded_cell_uses_configured_default() {
    let config = ClientConfig {
        default_start_day: StartDay::new(1).unwrap(),
        ..ClientConfig::default()
    };
    let session = BudgetSession::new(InMemoryRemote::new(), config);

    assert!(!session.settings().is_loaded());
    assert_eq!(session.settings().get().get(), 1);
}

#[test]
fn financial_month_follows_saved_start_day() {
    let mut session = loaded_session(ClientConfig::default());
    let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

    let month = session.financial_month(today).unwrap();
    assert_eq!(month.start, NaiveDate::from_ymd_opt(2026, 9, 25).unwrap());

    session.save_start_day(15).unwrap();
    let month = session.financial_month(today).unwrap();
    assert_eq!(month.start, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
    assert_eq!(month.end, NaiveDate::from_ymd_opt(2026, 11, 14).unwrap());
    assert_eq!(month.label(), NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
}
