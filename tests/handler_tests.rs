use axum::{
    Json,
    extract::{Path, Query, State},
};
use ops_portal::{
    AppState,
    auth::Role,
    config::AppConfig,
    currency::CurrencyService,
    error::ApiError,
    handlers,
    models::{
        AmountCurrency, CasinoTest, CreateCardRequest, CreateNdaRequest, CreateTaskRequest,
        CreateTestRequest, CreateWithdrawalRequest, NdaAgreement, ResolveWithdrawalRequest,
        SignNdaRequest, Task, UpdateCardRequest, UpdateEmployeeRequest, UpdatePaypalRequest,
        UpdateTaskStatusRequest, UpdateTestRequest, Withdrawal,
    },
    storage::MockStorageService,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::test;
use uuid::Uuid;

mod common;
use common::{MockRepo, OTHER_ID, TEST_ID, create_test_state, fired, pending_withdrawal, user};

// --- AUTHORIZATION MATRICES ---

#[test]
async fn dashboard_allow_list_per_role() {
    let allowed = [Role::Manager, Role::Hr, Role::Cfo, Role::Admin, Role::Ceo];
    for role in [
        Role::Junior,
        Role::Teamlead,
        Role::Manager,
        Role::Hr,
        Role::Cfo,
        Role::Admin,
        Role::Tester,
        Role::Ceo,
    ] {
        let state = create_test_state(MockRepo::default());
        let result = handlers::analytics::get_stats(user(role), State(state)).await;
        if allowed.contains(&role) {
            assert!(result.is_ok(), "{role:?} should read the dashboard");
        } else {
            assert!(
                matches!(result.unwrap_err(), ApiError::Forbidden),
                "{role:?} should be refused"
            );
        }
    }
}

#[test]
async fn fired_employee_is_refused_even_with_an_allowed_role() {
    let state = create_test_state(MockRepo::default());
    let result = handlers::analytics::get_stats(fired(Role::Admin), State(state)).await;
    assert!(matches!(result.unwrap_err(), ApiError::Forbidden));
}

#[test]
async fn directory_is_hr_admin_ceo_only() {
    for (role, ok) in [
        (Role::Hr, true),
        (Role::Admin, true),
        (Role::Ceo, true),
        (Role::Manager, false),
        (Role::Junior, false),
    ] {
        let state = create_test_state(MockRepo::default());
        let result = handlers::employees::list_employees(user(role), State(state)).await;
        assert_eq!(result.is_ok(), ok, "directory access for {role:?}");
    }
}

#[test]
async fn inventory_desk_gates_card_creation() {
    let payload = CreateCardRequest {
        masked_pan: "4276 **** **** 1234".to_string(),
        bank: "Kaspi".to_string(),
        currency: "KZT".to_string(),
    };

    let state = create_test_state(MockRepo::default());
    let result =
        handlers::inventory::create_card(user(Role::Hr), State(state), Json(payload.clone()))
            .await;
    assert!(result.is_ok());
    assert_eq!(result.unwrap().0.card.status, "free");

    let state = create_test_state(MockRepo::default());
    let result =
        handlers::inventory::create_card(user(Role::Junior), State(state), Json(payload)).await;
    assert!(matches!(result.unwrap_err(), ApiError::Forbidden));
}

#[test]
async fn field_work_gates_test_logging() {
    let payload = CreateTestRequest {
        casino_id: TEST_ID,
        card_id: None,
        deposit_amount: 50.0,
        currency: "EUR".to_string(),
        comment: None,
    };

    let state = create_test_state(MockRepo::default());
    let result =
        handlers::casino_tests::log_test(user(Role::Tester), State(state), Json(payload.clone()))
            .await;
    assert!(result.is_ok());

    let state = create_test_state(MockRepo::default());
    let result =
        handlers::casino_tests::log_test(user(Role::Manager), State(state), Json(payload)).await;
    assert!(matches!(result.unwrap_err(), ApiError::Forbidden));
}

// --- WITHDRAWAL CHAIN ---

#[test]
async fn teamlead_advances_a_pending_withdrawal() {
    let state = create_test_state(MockRepo {
        withdrawal: Some(pending_withdrawal("teamlead")),
        ..MockRepo::default()
    });

    let result = handlers::withdrawals::approve_withdrawal(
        user(Role::Teamlead),
        State(state),
        Path(TEST_ID),
    )
    .await;

    let Json(body) = result.expect("teamlead approval at the teamlead stage");
    assert_eq!(body.withdrawal.withdrawal.approval_stage, "manager");
    assert_eq!(body.withdrawal.withdrawal.status, "new");
}

#[test]
async fn approval_out_of_stage_is_a_conflict() {
    // The request is waiting on the teamlead; the manager is too early.
    let state = create_test_state(MockRepo {
        withdrawal: Some(pending_withdrawal("teamlead")),
        ..MockRepo::default()
    });

    let result =
        handlers::withdrawals::approve_withdrawal(user(Role::Manager), State(state), Path(TEST_ID))
            .await;
    assert!(matches!(result.unwrap_err(), ApiError::Conflict(_)));
}

#[test]
async fn junior_cannot_approve_at_all() {
    let state = create_test_state(MockRepo {
        withdrawal: Some(pending_withdrawal("teamlead")),
        ..MockRepo::default()
    });

    let result =
        handlers::withdrawals::approve_withdrawal(user(Role::Junior), State(state), Path(TEST_ID))
            .await;
    assert!(matches!(result.unwrap_err(), ApiError::Forbidden));
}

#[test]
async fn cfo_approval_releases_a_safe_withdrawal() {
    let state = create_test_state(MockRepo {
        withdrawal: Some(pending_withdrawal("cfo")),
        withdrawal_safe: true,
        ..MockRepo::default()
    });

    let result =
        handlers::withdrawals::approve_withdrawal(user(Role::Cfo), State(state), Path(TEST_ID))
            .await;

    let Json(body) = result.expect("safe cfo approval");
    assert_eq!(body.withdrawal.withdrawal.status, "waiting");
    assert_eq!(body.withdrawal.withdrawal.approval_stage, "done");
    // EUR 500 through the fallback table.
    assert_eq!(body.withdrawal.amount_usd, 500.0 * 1.08);
}

#[test]
async fn cfo_approval_blocks_an_unsafe_withdrawal() {
    // Keep a concrete handle on the mock so the blocked flag stays observable after
    // the Arc<dyn Repository> coercion.
    let repo = Arc::new(MockRepo {
        withdrawal: Some(pending_withdrawal("cfo")),
        withdrawal_safe: false,
        ..MockRepo::default()
    });
    let state = AppState {
        repo: repo.clone(),
        storage: Arc::new(MockStorageService::new()),
        currency: Arc::new(CurrencyService::new("http://127.0.0.1:9/rates".to_string())),
        config: AppConfig::default(),
    };

    let result =
        handlers::withdrawals::approve_withdrawal(user(Role::Cfo), State(state), Path(TEST_ID))
            .await;
    assert!(matches!(result.unwrap_err(), ApiError::Conflict(_)));

    // The handler pushed the row to 'blocked' before reporting the conflict.
    assert!(repo.blocked.load(Ordering::SeqCst));
}

#[test]
async fn blocking_is_only_possible_while_pending() {
    let state = create_test_state(MockRepo {
        withdrawal: Some(pending_withdrawal("manager")),
        ..MockRepo::default()
    });
    let result =
        handlers::withdrawals::block_withdrawal(user(Role::Hr), State(state), Path(TEST_ID)).await;
    assert_eq!(result.unwrap().0.withdrawal.withdrawal.status, "blocked");

    // Already released: no longer blockable.
    let mut released = pending_withdrawal("done");
    released.status = "waiting".to_string();
    let state = create_test_state(MockRepo {
        withdrawal: Some(released),
        ..MockRepo::default()
    });
    let result =
        handlers::withdrawals::block_withdrawal(user(Role::Hr), State(state), Path(TEST_ID)).await;
    assert!(matches!(result.unwrap_err(), ApiError::Conflict(_)));
}

#[test]
async fn settlement_accepts_only_the_two_outcomes() {
    let mut waiting = pending_withdrawal("done");
    waiting.status = "waiting".to_string();

    let state = create_test_state(MockRepo {
        withdrawal: Some(waiting.clone()),
        ..MockRepo::default()
    });
    let result = handlers::withdrawals::resolve_withdrawal(
        user(Role::Cfo),
        State(state),
        Path(TEST_ID),
        Json(ResolveWithdrawalRequest {
            outcome: "received".to_string(),
        }),
    )
    .await;
    assert_eq!(result.unwrap().0.withdrawal.withdrawal.status, "received");

    let state = create_test_state(MockRepo {
        withdrawal: Some(waiting),
        ..MockRepo::default()
    });
    let result = handlers::withdrawals::resolve_withdrawal(
        user(Role::Cfo),
        State(state),
        Path(TEST_ID),
        Json(ResolveWithdrawalRequest {
            outcome: "vanished".to_string(),
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::BadRequest(_)));
}

#[test]
async fn settlement_requires_a_waiting_row() {
    let state = create_test_state(MockRepo {
        withdrawal: Some(pending_withdrawal("teamlead")),
        ..MockRepo::default()
    });
    let result = handlers::withdrawals::resolve_withdrawal(
        user(Role::Admin),
        State(state),
        Path(TEST_ID),
        Json(ResolveWithdrawalRequest {
            outcome: "problem".to_string(),
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::Conflict(_)));
}

#[test]
async fn withdrawal_listing_is_role_scoped() {
    fn stamped(n: usize) -> Vec<Withdrawal> {
        (0..n).map(|_| Withdrawal::default()).collect()
    }
    let repo = || MockRepo {
        my_withdrawals: stamped(1),
        team_withdrawals: stamped(2),
        all_withdrawals: stamped(3),
        ..MockRepo::default()
    };

    // Junior sees only their own.
    let state = create_test_state(repo());
    let Json(body) = handlers::withdrawals::list_withdrawals(user(Role::Junior), State(state))
        .await
        .unwrap();
    assert_eq!(body.withdrawals.len(), 1);

    // A teamlead with a team sees the team scope.
    let state = create_test_state(repo());
    let lead = ops_portal::auth::AuthUser {
        team_id: Some(OTHER_ID),
        ..user(Role::Teamlead)
    };
    let Json(body) = handlers::withdrawals::list_withdrawals(lead, State(state))
        .await
        .unwrap();
    assert_eq!(body.withdrawals.len(), 2);

    // A teamlead without a team falls back to their own requests.
    let state = create_test_state(repo());
    let Json(body) = handlers::withdrawals::list_withdrawals(user(Role::Teamlead), State(state))
        .await
        .unwrap();
    assert_eq!(body.withdrawals.len(), 1);

    // Manager and above see everything.
    let state = create_test_state(repo());
    let Json(body) = handlers::withdrawals::list_withdrawals(user(Role::Cfo), State(state))
        .await
        .unwrap();
    assert_eq!(body.withdrawals.len(), 3);
}

#[test]
async fn create_withdrawal_validates_the_body() {
    let state = create_test_state(MockRepo::default());
    let result = handlers::withdrawals::create_withdrawal(
        user(Role::Tester),
        State(state),
        Json(CreateWithdrawalRequest {
            test_id: None,
            amount: -5.0,
            currency: "EUR".to_string(),
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::BadRequest(_)));

    let state = create_test_state(MockRepo::default());
    let Json(body) = handlers::withdrawals::create_withdrawal(
        user(Role::Tester),
        State(state),
        Json(CreateWithdrawalRequest {
            test_id: None,
            amount: 1000.0,
            currency: "KZT".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(body.withdrawal.withdrawal.status, "new");
    assert_eq!(body.withdrawal.withdrawal.approval_stage, "teamlead");
    assert_eq!(body.withdrawal.amount_usd, 1000.0 * 0.0021);
}

// --- TEST SESSIONS ---

#[test]
async fn test_result_update_is_owner_only_and_single_shot() {
    let session = CasinoTest {
        id: TEST_ID,
        tester_id: TEST_ID,
        status: "in_progress".to_string(),
        ..CasinoTest::default()
    };

    // Owner closes the session.
    let state = create_test_state(MockRepo {
        casino_test: Some(session.clone()),
        ..MockRepo::default()
    });
    let result = handlers::casino_tests::update_test(
        user(Role::Tester),
        State(state),
        Path(TEST_ID),
        Json(UpdateTestRequest {
            status: Some("win".to_string()),
            comment: None,
        }),
    )
    .await;
    assert_eq!(result.unwrap().0.test.status, "win");

    // A different caller gets a 404, not a 403: the repository cannot tell
    // "not yours" from "missing".
    let state = create_test_state(MockRepo {
        casino_test: Some(CasinoTest {
            tester_id: OTHER_ID,
            ..session.clone()
        }),
        ..MockRepo::default()
    });
    let result = handlers::casino_tests::update_test(
        user(Role::Tester),
        State(state),
        Path(TEST_ID),
        Json(UpdateTestRequest {
            status: Some("lose".to_string()),
            comment: None,
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::NotFound(_)));

    // Already closed: same outcome.
    let state = create_test_state(MockRepo {
        casino_test: Some(CasinoTest {
            status: "win".to_string(),
            ..session
        }),
        ..MockRepo::default()
    });
    let result = handlers::casino_tests::update_test(
        user(Role::Tester),
        State(state),
        Path(TEST_ID),
        Json(UpdateTestRequest {
            status: Some("lose".to_string()),
            comment: None,
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::NotFound(_)));
}

#[test]
async fn unknown_test_result_string_is_rejected() {
    let state = create_test_state(MockRepo::default());
    let result = handlers::casino_tests::update_test(
        user(Role::Tester),
        State(state),
        Path(TEST_ID),
        Json(UpdateTestRequest {
            status: Some("jackpot".to_string()),
            comment: None,
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::BadRequest(_)));
}

// --- NDA FLOW ---

#[test]
async fn nda_creation_mints_a_token_gated_link() {
    let state = create_test_state(MockRepo::default());
    let Json(body) = handlers::nda::create_nda(
        user(Role::Hr),
        State(state),
        Json(CreateNdaRequest {
            employee_id: OTHER_ID,
            full_name: "Dana Architect".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(body.agreement.status, "sent");
    assert_eq!(
        body.sign_path,
        format!("/nda/sign/{}", body.agreement.sign_token)
    );
}

#[test]
async fn nda_creation_is_nda_desk_only() {
    let state = create_test_state(MockRepo::default());
    let result = handlers::nda::create_nda(
        user(Role::Teamlead),
        State(state),
        Json(CreateNdaRequest {
            employee_id: OTHER_ID,
            full_name: "Dana Architect".to_string(),
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::Forbidden));
}

#[test]
async fn nda_token_resolves_once_and_is_consumed() {
    let token = Uuid::from_u128(777);
    let pending = NdaAgreement {
        sign_token: token,
        status: "sent".to_string(),
        full_name: "Dana Architect".to_string(),
        ..NdaAgreement::default()
    };

    // Pending: the public link resolves.
    let state = create_test_state(MockRepo {
        nda: Some(pending.clone()),
        ..MockRepo::default()
    });
    let result = handlers::nda::get_nda_for_signing(State(state), Path(token)).await;
    assert!(result.is_ok());

    // Signing succeeds and records the document key.
    let state = create_test_state(MockRepo {
        nda: Some(pending.clone()),
        ..MockRepo::default()
    });
    let Json(body) = handlers::nda::sign_nda(
        State(state),
        Path(token),
        Json(SignNdaRequest {
            full_name: "Dana Architect".to_string(),
            document_key: "docs/abc.pdf".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(body.agreement.status, "signed");
    assert_eq!(body.agreement.document_key.as_deref(), Some("docs/abc.pdf"));

    // Consumed: both the link and a second signature are 404.
    let signed = NdaAgreement {
        status: "signed".to_string(),
        ..pending
    };
    let state = create_test_state(MockRepo {
        nda: Some(signed.clone()),
        ..MockRepo::default()
    });
    let result = handlers::nda::get_nda_for_signing(State(state), Path(token)).await;
    assert!(matches!(result.unwrap_err(), ApiError::NotFound(_)));

    let state = create_test_state(MockRepo {
        nda: Some(signed),
        ..MockRepo::default()
    });
    let result = handlers::nda::sign_nda(
        State(state),
        Path(token),
        Json(SignNdaRequest {
            full_name: "Dana Architect".to_string(),
            document_key: "docs/again.pdf".to_string(),
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::NotFound(_)));
}

#[test]
async fn nda_upload_url_is_token_gated() {
    let token = Uuid::from_u128(888);
    let pending = NdaAgreement {
        sign_token: token,
        status: "sent".to_string(),
        ..NdaAgreement::default()
    };

    let state = create_test_state(MockRepo {
        nda: Some(pending.clone()),
        ..MockRepo::default()
    });
    let Json(body) = handlers::nda::get_nda_upload_url(
        State(state),
        Path(token),
        Json(ops_portal::models::PresignedUrlRequest {
            filename: "scan.pdf".to_string(),
            file_type: "application/pdf".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(body.resource_key.starts_with("docs/"));
    assert!(body.resource_key.ends_with(".pdf"));

    // Consumed token: no storage access.
    let state = create_test_state(MockRepo {
        nda: Some(NdaAgreement {
            status: "signed".to_string(),
            ..pending
        }),
        ..MockRepo::default()
    });
    let result = handlers::nda::get_nda_upload_url(
        State(state),
        Path(token),
        Json(ops_portal::models::PresignedUrlRequest {
            filename: "scan.pdf".to_string(),
            file_type: "application/pdf".to_string(),
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::NotFound(_)));
}

// --- TASKS ---

#[test]
async fn task_status_walks_forward_only() {
    let task = Task {
        id: TEST_ID,
        assignee_id: TEST_ID,
        status: "new".to_string(),
        ..Task::default()
    };

    // new -> in_progress is allowed.
    let state = create_test_state(MockRepo {
        task: Some(task.clone()),
        ..MockRepo::default()
    });
    let result = handlers::tasks::update_task_status(
        user(Role::Junior),
        State(state),
        Path(TEST_ID),
        Json(UpdateTaskStatusRequest {
            status: "in_progress".to_string(),
        }),
    )
    .await;
    assert_eq!(result.unwrap().0.task.status, "in_progress");

    // new -> done skips a step.
    let state = create_test_state(MockRepo {
        task: Some(task.clone()),
        ..MockRepo::default()
    });
    let result = handlers::tasks::update_task_status(
        user(Role::Junior),
        State(state),
        Path(TEST_ID),
        Json(UpdateTaskStatusRequest {
            status: "done".to_string(),
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::Conflict(_)));

    // Someone else's task.
    let state = create_test_state(MockRepo {
        task: Some(Task {
            assignee_id: OTHER_ID,
            ..task
        }),
        ..MockRepo::default()
    });
    let result = handlers::tasks::update_task_status(
        user(Role::Junior),
        State(state),
        Path(TEST_ID),
        Json(UpdateTaskStatusRequest {
            status: "in_progress".to_string(),
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::Forbidden));
}

#[test]
async fn task_creation_checks_the_assignee_exists() {
    let state = create_test_state(MockRepo {
        employee: None,
        ..MockRepo::default()
    });
    let result = handlers::tasks::create_task(
        user(Role::Teamlead),
        State(state),
        Json(CreateTaskRequest {
            title: "Recheck geo blocks".to_string(),
            description: None,
            assignee_id: OTHER_ID,
            due_date: None,
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::NotFound(_)));
}

// --- EMPLOYEE ADMINISTRATION ---

#[test]
async fn employee_update_is_admin_only_and_validates_strings() {
    let payload = UpdateEmployeeRequest {
        role: Some("manager".to_string()),
        status: None,
        team_id: None,
    };

    let state = create_test_state(MockRepo::default());
    let result = handlers::employees::update_employee(
        user(Role::Hr),
        State(state),
        Path(OTHER_ID),
        Json(payload.clone()),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::Forbidden));

    let state = create_test_state(MockRepo::default());
    let result = handlers::employees::update_employee(
        user(Role::Admin),
        State(state),
        Path(OTHER_ID),
        Json(UpdateEmployeeRequest {
            role: Some("owner".to_string()),
            status: None,
            team_id: None,
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::BadRequest(_)));

    let state = create_test_state(MockRepo::default());
    let Json(body) = handlers::employees::update_employee(
        user(Role::Admin),
        State(state),
        Path(OTHER_ID),
        Json(payload),
    )
    .await
    .unwrap();
    assert_eq!(body.employee.role, "manager");
}

// --- INVENTORY GUARDS ---

#[test]
async fn assigning_a_card_requires_a_holder() {
    let state = create_test_state(MockRepo::default());
    let result = handlers::inventory::update_card(
        user(Role::Admin),
        State(state),
        Path(TEST_ID),
        Json(UpdateCardRequest {
            status: Some("assigned".to_string()),
            holder_id: None,
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::BadRequest(_)));
}

#[test]
async fn paypal_allows_the_dead_state_cards_do_not() {
    let state = create_test_state(MockRepo::default());
    let result = handlers::inventory::update_paypal_account(
        user(Role::Hr),
        State(state),
        Path(TEST_ID),
        Json(UpdatePaypalRequest {
            status: Some("dead".to_string()),
            holder_id: None,
            balance: None,
        }),
    )
    .await;
    assert!(result.is_ok());

    let state = create_test_state(MockRepo::default());
    let result = handlers::inventory::update_card(
        user(Role::Hr),
        State(state),
        Path(TEST_ID),
        Json(UpdateCardRequest {
            status: Some("dead".to_string()),
            holder_id: None,
        }),
    )
    .await;
    assert!(matches!(result.unwrap_err(), ApiError::BadRequest(_)));
}

// --- ANALYTICS ---

#[test]
async fn stats_convert_received_volume_with_the_table_in_effect() {
    let state = create_test_state(MockRepo {
        counters: (12, 3, 7, 2),
        received_all: vec![
            AmountCurrency {
                amount: 100.0,
                currency: "USD".to_string(),
            },
            AmountCurrency {
                amount: 100.0,
                currency: "EUR".to_string(),
            },
        ],
        ..MockRepo::default()
    });

    let Json(body) = handlers::analytics::get_stats(user(Role::Cfo), State(state))
        .await
        .unwrap();
    assert_eq!(body.stats.employees, 12);
    assert_eq!(body.stats.pending_withdrawals, 2);
    // 100 USD + 100 EUR through the fallback table.
    assert_eq!(body.stats.received_total_usd, 100.0 + 108.0);
}

#[test]
async fn trends_build_one_bucket_per_month_with_manual_rates() {
    let state = create_test_state(MockRepo {
        tests_per_month: 10,
        received_monthly: vec![
            AmountCurrency {
                amount: 50.0,
                currency: "USD".to_string(),
            },
            AmountCurrency {
                amount: 50.0,
                currency: "USD".to_string(),
            },
        ],
        ..MockRepo::default()
    });

    let Json(body) = handlers::analytics::get_trends(
        user(Role::Manager),
        State(state),
        Query(handlers::analytics::TrendQuery { months: Some(3) }),
    )
    .await
    .unwrap();

    assert_eq!(body.months.len(), 3);
    for bucket in &body.months {
        assert_eq!(bucket.tests_started, 10);
        assert_eq!(bucket.withdrawals_received, 2);
        assert_eq!(bucket.received_usd, 100.0);
        assert_eq!(bucket.success_rate, 0.2);
        assert_eq!(bucket.month.len(), 7, "YYYY-MM label");
    }
}

#[test]
async fn trend_window_is_clamped_to_a_year() {
    let state = create_test_state(MockRepo::default());
    let Json(body) = handlers::analytics::get_trends(
        user(Role::Admin),
        State(state),
        Query(handlers::analytics::TrendQuery { months: Some(48) }),
    )
    .await
    .unwrap();
    assert_eq!(body.months.len(), 12);
}

#[test]
async fn rates_endpoint_reports_the_fallback_source_offline() {
    let state = create_test_state(MockRepo::default());
    let Json(body) = handlers::analytics::get_rates(user(Role::Junior), State(state))
        .await
        .unwrap();
    assert_eq!(body.source, "fallback");
    assert_eq!(body.rates.get("USD"), Some(&1.0));
    assert_eq!(body.rates.len(), 4);
}
