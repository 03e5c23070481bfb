use chrono::Utc;
use ops_portal::models::{
    Ack, NdaAgreement, UpdateEmployeeRequest, Withdrawal, WithdrawalListResponse, WithdrawalView,
};
use uuid::Uuid;

// Wire-shape checks for the JSON surface: every 200 body leads with `success`, and
// the partial-update payloads omit their None fields entirely.

#[test]
fn ack_serializes_to_the_success_envelope() {
    let json_output = serde_json::to_string(&Ack { success: true }).unwrap();
    assert_eq!(json_output, r#"{"success":true}"#);
}

#[test]
fn update_employee_request_omits_none_fields() {
    let partial = UpdateEmployeeRequest {
        role: Some("teamlead".to_string()),
        status: None,
        team_id: None,
    };

    let json_output = serde_json::to_string(&partial).unwrap();
    assert!(json_output.contains(r#""role":"teamlead""#));
    assert!(!json_output.contains("status"));
    assert!(!json_output.contains("team_id"));
}

#[test]
fn withdrawal_round_trips_with_empty_approval_columns() {
    let withdrawal = Withdrawal {
        id: Uuid::from_u128(1),
        requester_id: Uuid::from_u128(2),
        amount: 750.5,
        currency: "EUR".to_string(),
        status: "new".to_string(),
        approval_stage: "teamlead".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        ..Withdrawal::default()
    };

    let json_output = serde_json::to_string(&withdrawal).unwrap();
    assert!(json_output.contains(r#""approval_stage":"teamlead""#));
    assert!(json_output.contains(r#""teamlead_id":null"#));

    let back: Withdrawal = serde_json::from_str(&json_output).unwrap();
    assert_eq!(back.amount, 750.5);
    assert_eq!(back.status, "new");
}

#[test]
fn withdrawal_listing_nests_the_converted_amount() {
    let listing = WithdrawalListResponse {
        success: true,
        withdrawals: vec![WithdrawalView {
            withdrawal: Withdrawal {
                amount: 100.0,
                currency: "EUR".to_string(),
                ..Withdrawal::default()
            },
            amount_usd: 108.0,
        }],
    };

    let json_output = serde_json::to_string(&listing).unwrap();
    assert!(json_output.starts_with(r#"{"success":true"#));
    assert!(json_output.contains(r#""amount_usd":108.0"#));
}

#[test]
fn nda_agreement_defaults_to_an_unsigned_record() {
    let agreement = NdaAgreement::default();
    let json_output = serde_json::to_string(&agreement).unwrap();
    assert!(json_output.contains(r#""document_key":null"#));
    assert!(json_output.contains(r#""signed_at":null"#));
}
