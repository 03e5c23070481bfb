use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ops_portal::{
    AppState,
    auth::{AuthUser, Role},
    config::AppConfig,
    currency::CurrencyService,
    models::{
        AmountCurrency, BankAccount, Card, Casino, CasinoTest, CreateBankAccountRequest,
        CreateCardRequest, CreateCasinoRequest, CreatePaypalRequest, CreateTaskRequest,
        CreateTestRequest, CreateWithdrawalRequest, Employee, NdaAgreement, PaypalAccount, Task,
        Team, UpdateBankAccountRequest, UpdateCardRequest, UpdateCasinoRequest,
        UpdateEmployeeRequest, UpdatePaypalRequest, UpdateTestRequest, Withdrawal,
    },
    repository::Repository,
    storage::MockStorageService,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

pub const TEST_ID: Uuid = Uuid::from_u128(123);
pub const OTHER_ID: Uuid = Uuid::from_u128(456);

/// MockRepo
///
/// Central control point for testing handler logic. Handlers depend on the Repository
/// trait, so the mock carries one pre-canned value/listing per entity; the guarded
/// mutations (withdrawal stages, NDA tokens, test updates) re-implement their WHERE
/// clause guards against the stored value so the handlers' conflict paths are
/// exercised honestly.
pub struct MockRepo {
    pub employee: Option<Employee>,
    pub employees: Vec<Employee>,
    pub casino: Option<Casino>,
    pub casinos: Vec<Casino>,
    pub casino_test: Option<CasinoTest>,
    pub casino_tests: Vec<CasinoTest>,
    pub card: Option<Card>,
    pub cards: Vec<Card>,
    pub bank_account: Option<BankAccount>,
    pub bank_accounts: Vec<BankAccount>,
    pub paypal: Option<PaypalAccount>,
    pub paypals: Vec<PaypalAccount>,
    pub withdrawal: Option<Withdrawal>,
    pub my_withdrawals: Vec<Withdrawal>,
    pub team_withdrawals: Vec<Withdrawal>,
    pub all_withdrawals: Vec<Withdrawal>,
    pub withdrawal_safe: bool,
    /// Set whenever a status hop targets 'blocked'.
    pub blocked: AtomicBool,
    pub nda: Option<NdaAgreement>,
    pub ndas: Vec<NdaAgreement>,
    pub teams: Vec<Team>,
    pub task: Option<Task>,
    pub tasks: Vec<Task>,
    pub counters: (i64, i64, i64, i64),
    pub received_all: Vec<AmountCurrency>,
    pub received_monthly: Vec<AmountCurrency>,
    pub tests_per_month: i64,
}

impl Default for MockRepo {
    fn default() -> Self {
        MockRepo {
            employee: Some(Employee {
                status: "active".to_string(),
                role: "junior".to_string(),
                ..Employee::default()
            }),
            employees: vec![],
            casino: Some(Casino::default()),
            casinos: vec![],
            casino_test: None,
            casino_tests: vec![],
            card: Some(Card::default()),
            cards: vec![],
            bank_account: Some(BankAccount::default()),
            bank_accounts: vec![],
            paypal: Some(PaypalAccount::default()),
            paypals: vec![],
            withdrawal: None,
            my_withdrawals: vec![],
            team_withdrawals: vec![],
            all_withdrawals: vec![],
            withdrawal_safe: true,
            blocked: AtomicBool::new(false),
            nda: None,
            ndas: vec![],
            teams: vec![],
            task: None,
            tasks: vec![],
            counters: (0, 0, 0, 0),
            received_all: vec![],
            received_monthly: vec![],
            tests_per_month: 0,
        }
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, sqlx::Error> {
        Ok(self.employee.clone().map(|e| Employee { id, ..e }))
    }
    async fn create_employee(&self, employee: Employee) -> Result<Employee, sqlx::Error> {
        Ok(employee)
    }
    async fn list_employees(&self) -> Result<Vec<Employee>, sqlx::Error> {
        Ok(self.employees.clone())
    }
    async fn update_employee(
        &self,
        id: Uuid,
        req: UpdateEmployeeRequest,
    ) -> Result<Option<Employee>, sqlx::Error> {
        Ok(self.employee.clone().map(|mut e| {
            e.id = id;
            if let Some(role) = req.role {
                e.role = role;
            }
            if let Some(status) = req.status {
                e.status = status;
            }
            if let Some(team_id) = req.team_id {
                e.team_id = Some(team_id);
            }
            e
        }))
    }

    async fn list_casinos(&self) -> Result<Vec<Casino>, sqlx::Error> {
        Ok(self.casinos.clone())
    }
    async fn create_casino(&self, req: CreateCasinoRequest) -> Result<Casino, sqlx::Error> {
        Ok(Casino {
            name: req.name,
            url: req.url,
            geo: req.geo,
            status: "checking".to_string(),
            notes: req.notes,
            ..Casino::default()
        })
    }
    async fn update_casino(
        &self,
        _id: Uuid,
        _req: UpdateCasinoRequest,
    ) -> Result<Option<Casino>, sqlx::Error> {
        Ok(self.casino.clone())
    }

    async fn create_test(
        &self,
        req: CreateTestRequest,
        tester_id: Uuid,
    ) -> Result<CasinoTest, sqlx::Error> {
        Ok(CasinoTest {
            casino_id: req.casino_id,
            tester_id,
            card_id: req.card_id,
            deposit_amount: req.deposit_amount,
            currency: req.currency,
            status: "in_progress".to_string(),
            comment: req.comment,
            ..CasinoTest::default()
        })
    }
    async fn list_my_tests(&self, _tester_id: Uuid) -> Result<Vec<CasinoTest>, sqlx::Error> {
        Ok(self.casino_tests.clone())
    }
    async fn list_all_tests(&self) -> Result<Vec<CasinoTest>, sqlx::Error> {
        Ok(self.casino_tests.clone())
    }
    async fn update_test(
        &self,
        _id: Uuid,
        tester_id: Uuid,
        req: UpdateTestRequest,
    ) -> Result<Option<CasinoTest>, sqlx::Error> {
        // Mirror the real WHERE clause: owner + still in progress.
        Ok(self
            .casino_test
            .clone()
            .filter(|t| t.tester_id == tester_id && t.status == "in_progress")
            .map(|mut t| {
                if let Some(status) = req.status {
                    t.status = status;
                }
                if let Some(comment) = req.comment {
                    t.comment = Some(comment);
                }
                t
            }))
    }
    async fn count_tests_between(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        Ok(self.tests_per_month)
    }

    async fn list_cards(&self) -> Result<Vec<Card>, sqlx::Error> {
        Ok(self.cards.clone())
    }
    async fn list_my_cards(&self, _holder_id: Uuid) -> Result<Vec<Card>, sqlx::Error> {
        Ok(self.cards.clone())
    }
    async fn create_card(&self, req: CreateCardRequest) -> Result<Card, sqlx::Error> {
        Ok(Card {
            masked_pan: req.masked_pan,
            bank: req.bank,
            currency: req.currency,
            status: "free".to_string(),
            ..Card::default()
        })
    }
    async fn update_card(
        &self,
        _id: Uuid,
        _req: UpdateCardRequest,
    ) -> Result<Option<Card>, sqlx::Error> {
        Ok(self.card.clone())
    }

    async fn list_bank_accounts(&self) -> Result<Vec<BankAccount>, sqlx::Error> {
        Ok(self.bank_accounts.clone())
    }
    async fn list_my_bank_accounts(
        &self,
        _holder_id: Uuid,
    ) -> Result<Vec<BankAccount>, sqlx::Error> {
        Ok(self.bank_accounts.clone())
    }
    async fn create_bank_account(
        &self,
        req: CreateBankAccountRequest,
    ) -> Result<BankAccount, sqlx::Error> {
        Ok(BankAccount {
            bank: req.bank,
            iban: req.iban,
            currency: req.currency,
            status: "free".to_string(),
            ..BankAccount::default()
        })
    }
    async fn update_bank_account(
        &self,
        _id: Uuid,
        _req: UpdateBankAccountRequest,
    ) -> Result<Option<BankAccount>, sqlx::Error> {
        Ok(self.bank_account.clone())
    }

    async fn list_paypal_accounts(&self) -> Result<Vec<PaypalAccount>, sqlx::Error> {
        Ok(self.paypals.clone())
    }
    async fn list_my_paypal_accounts(
        &self,
        _holder_id: Uuid,
    ) -> Result<Vec<PaypalAccount>, sqlx::Error> {
        Ok(self.paypals.clone())
    }
    async fn create_paypal_account(
        &self,
        req: CreatePaypalRequest,
    ) -> Result<PaypalAccount, sqlx::Error> {
        Ok(PaypalAccount {
            email: req.email,
            balance: req.balance.unwrap_or(0.0),
            currency: req.currency,
            status: "free".to_string(),
            ..PaypalAccount::default()
        })
    }
    async fn update_paypal_account(
        &self,
        _id: Uuid,
        _req: UpdatePaypalRequest,
    ) -> Result<Option<PaypalAccount>, sqlx::Error> {
        Ok(self.paypal.clone())
    }

    async fn create_withdrawal(
        &self,
        req: CreateWithdrawalRequest,
        requester_id: Uuid,
    ) -> Result<Withdrawal, sqlx::Error> {
        Ok(Withdrawal {
            test_id: req.test_id,
            requester_id,
            amount: req.amount,
            currency: req.currency,
            status: "new".to_string(),
            approval_stage: "teamlead".to_string(),
            ..Withdrawal::default()
        })
    }
    async fn get_withdrawal(&self, _id: Uuid) -> Result<Option<Withdrawal>, sqlx::Error> {
        Ok(self.withdrawal.clone())
    }
    async fn list_withdrawals_all(&self) -> Result<Vec<Withdrawal>, sqlx::Error> {
        Ok(self.all_withdrawals.clone())
    }
    async fn list_withdrawals_for(
        &self,
        _requester_id: Uuid,
    ) -> Result<Vec<Withdrawal>, sqlx::Error> {
        Ok(self.my_withdrawals.clone())
    }
    async fn list_withdrawals_for_team(
        &self,
        _team_id: Uuid,
    ) -> Result<Vec<Withdrawal>, sqlx::Error> {
        Ok(self.team_withdrawals.clone())
    }
    async fn advance_withdrawal_stage(
        &self,
        _id: Uuid,
        from_stage: &str,
        to_stage: &str,
        approver_id: Uuid,
    ) -> Result<Option<Withdrawal>, sqlx::Error> {
        // Mirror the real guards: pending status, matching stage.
        Ok(self
            .withdrawal
            .clone()
            .filter(|w| w.status == "new" && w.approval_stage == from_stage)
            .map(|mut w| {
                w.approval_stage = to_stage.to_string();
                if to_stage == "done" {
                    w.status = "waiting".to_string();
                    w.cfo_id = Some(approver_id);
                }
                w
            }))
    }
    async fn set_withdrawal_status(
        &self,
        _id: Uuid,
        from_status: &str,
        to_status: &str,
    ) -> Result<Option<Withdrawal>, sqlx::Error> {
        if to_status == "blocked" {
            self.blocked.store(true, Ordering::SeqCst);
        }
        Ok(self
            .withdrawal
            .clone()
            .filter(|w| w.status == from_status)
            .map(|mut w| {
                w.status = to_status.to_string();
                w
            }))
    }
    async fn check_withdrawal_safe(&self, _id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.withdrawal_safe)
    }
    async fn received_amounts(&self) -> Result<Vec<AmountCurrency>, sqlx::Error> {
        Ok(self.received_all.clone())
    }
    async fn received_amounts_between(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<AmountCurrency>, sqlx::Error> {
        Ok(self.received_monthly.clone())
    }

    async fn create_nda(
        &self,
        employee_id: Uuid,
        full_name: String,
        sign_token: Uuid,
    ) -> Result<NdaAgreement, sqlx::Error> {
        Ok(NdaAgreement {
            employee_id,
            full_name,
            status: "sent".to_string(),
            sign_token,
            ..NdaAgreement::default()
        })
    }
    async fn list_ndas(&self) -> Result<Vec<NdaAgreement>, sqlx::Error> {
        Ok(self.ndas.clone())
    }
    async fn get_nda_by_token(&self, token: Uuid) -> Result<Option<NdaAgreement>, sqlx::Error> {
        Ok(self
            .nda
            .clone()
            .filter(|n| n.sign_token == token && n.status == "sent"))
    }
    async fn sign_nda(
        &self,
        token: Uuid,
        full_name: String,
        document_key: String,
    ) -> Result<Option<NdaAgreement>, sqlx::Error> {
        Ok(self
            .nda
            .clone()
            .filter(|n| n.sign_token == token && n.status == "sent")
            .map(|mut n| {
                n.status = "signed".to_string();
                n.full_name = full_name;
                n.document_key = Some(document_key);
                n
            }))
    }

    async fn list_teams(&self) -> Result<Vec<Team>, sqlx::Error> {
        Ok(self.teams.clone())
    }
    async fn create_team(
        &self,
        name: String,
        lead_id: Option<Uuid>,
    ) -> Result<Team, sqlx::Error> {
        Ok(Team {
            name,
            lead_id,
            ..Team::default()
        })
    }
    async fn sync_teams(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn create_task(
        &self,
        req: CreateTaskRequest,
        author_id: Uuid,
    ) -> Result<Task, sqlx::Error> {
        Ok(Task {
            title: req.title,
            description: req.description,
            author_id,
            assignee_id: req.assignee_id,
            status: "new".to_string(),
            due_date: req.due_date,
            ..Task::default()
        })
    }
    async fn list_tasks_all(&self) -> Result<Vec<Task>, sqlx::Error> {
        Ok(self.tasks.clone())
    }
    async fn list_tasks_for(&self, _assignee_id: Uuid) -> Result<Vec<Task>, sqlx::Error> {
        Ok(self.tasks.clone())
    }
    async fn get_task(&self, _id: Uuid) -> Result<Option<Task>, sqlx::Error> {
        Ok(self.task.clone())
    }
    async fn set_task_status(&self, _id: Uuid, status: &str) -> Result<Option<Task>, sqlx::Error> {
        Ok(self.task.clone().map(|mut t| {
            t.status = status.to_string();
            t
        }))
    }

    async fn stats_counters(&self) -> Result<(i64, i64, i64, i64), sqlx::Error> {
        Ok(self.counters)
    }
}

/// Creates an AppState over the mock components. The currency service points at a
/// closed port, so every conversion uses the static fallback table.
pub fn create_test_state(repo: MockRepo) -> AppState {
    AppState {
        repo: Arc::new(repo),
        storage: Arc::new(MockStorageService::new()),
        currency: Arc::new(CurrencyService::new("http://127.0.0.1:9/rates".to_string())),
        config: AppConfig::default(),
    }
}

pub fn user(role: Role) -> AuthUser {
    AuthUser {
        id: TEST_ID,
        role,
        team_id: None,
        active: true,
    }
}

pub fn fired(role: Role) -> AuthUser {
    AuthUser {
        active: false,
        ..user(role)
    }
}

pub fn pending_withdrawal(stage: &str) -> Withdrawal {
    Withdrawal {
        id: TEST_ID,
        requester_id: OTHER_ID,
        amount: 500.0,
        currency: "EUR".to_string(),
        status: "new".to_string(),
        approval_stage: stage.to_string(),
        ..Withdrawal::default()
    }
}
