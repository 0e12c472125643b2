use budget_client::{
    aggregation::CategorySpend,
    domain::{Category, StartDay, TransactionDraft},
    remote::{
        CreateAccount, CreateCategory, DeleteAccount, RecordTransaction, StartDaySetting,
        UpdateAccount, UpdateCategory,
    },
};
use insta::assert_snapshot;

fn json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("serialize")
}

#[test]
fn account_payloads_use_api_field_names() {
    assert_snapshot!(
        json(&CreateAccount {
            account_name: "Checking".into(),
            account_balance: 1000.0,
        }),
        @r#"{"account_name":"Checking","account_balance":1000.0}"#
    );
    assert_snapshot!(
        json(&UpdateAccount {
            old_name: "Checking".into(),
            new_name: "Main".into(),
            amount: 1000.0,
        }),
        @r#"{"old_name":"Checking","new_name":"Main","amount":1000.0}"#
    );
    assert_snapshot!(
        json(&DeleteAccount {
            account_name: "Checking".into(),
        }),
        @r#"{"account_name":"Checking"}"#
    );
}

#[test]
fn category_payloads_use_api_field_names() {
    assert_snapshot!(
        json(&CreateCategory {
            category_name: "Food".into(),
            category_limit: 500.0,
        }),
        @r#"{"category_name":"Food","category_limit":500.0}"#
    );
    assert_snapshot!(
        json(&UpdateCategory {
            cat_name: "Food".into(),
            limit: 450.5,
        }),
        @r#"{"cat_name":"Food","limit":450.5}"#
    );
}

#[test]
fn transaction_payload_renames_category_and_fills_description() {
    let draft = TransactionDraft::new("Checking", "Food", 42.5);
    assert_snapshot!(
        json(&RecordTransaction::from(&draft)),
        @r#"{"account_name":"Checking","category":"Food","amount":42.5,"description":""}"#
    );
}

#[test]
fn setting_payload_is_a_bare_number() {
    let setting = StartDaySetting {
        start_day: StartDay::new(15).unwrap(),
    };
    assert_snapshot!(json(&setting), @r#"{"start_day":15}"#);
}

#[test]
fn category_spend_serializes_for_display() {
    let category = Category {
        name: "Fuel".into(),
        limit: 200.0,
        spent: 250.0,
    };
    assert_snapshot!(
        json(&CategorySpend::from_category(&category)),
        @r#"{"name":"Fuel","limit":200.0,"spent":250.0,"percentage":125.0,"over_budget":true,"remaining":-50.0}"#
    );
}
