use crate::models::{
    AmountCurrency, BankAccount, Card, Casino, CasinoTest, CreateBankAccountRequest,
    CreateCardRequest, CreateCasinoRequest, CreatePaypalRequest, CreateTaskRequest,
    CreateTestRequest, CreateWithdrawalRequest, Employee, NdaAgreement, PaypalAccount, Task, Team,
    UpdateBankAccountRequest, UpdateCardRequest, UpdateCasinoRequest, UpdateEmployeeRequest,
    UpdatePaypalRequest, UpdateTestRequest, Withdrawal,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Abstract contract for all persistence operations, one method per data operation.
/// Handlers interact with the data layer through `Arc<dyn Repository>` and never see
/// the concrete implementation (Postgres in production, mocks in tests).
///
/// Every method returns `Result<_, sqlx::Error>`: a downstream failure must surface
/// as a 500, never degrade into an empty result. Ownership and state guards
/// ("current status must be pending") are folded into WHERE clauses, so a `None`/
/// `false` return covers both "missing" and "not yours / wrong state".
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Employees ---
    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, sqlx::Error>;
    async fn create_employee(&self, employee: Employee) -> Result<Employee, sqlx::Error>;
    async fn list_employees(&self) -> Result<Vec<Employee>, sqlx::Error>;
    // Admin partial update (role escalation, firing, team move). COALESCE semantics.
    async fn update_employee(
        &self,
        id: Uuid,
        req: UpdateEmployeeRequest,
    ) -> Result<Option<Employee>, sqlx::Error>;

    // --- Casinos ---
    async fn list_casinos(&self) -> Result<Vec<Casino>, sqlx::Error>;
    async fn create_casino(&self, req: CreateCasinoRequest) -> Result<Casino, sqlx::Error>;
    async fn update_casino(
        &self,
        id: Uuid,
        req: UpdateCasinoRequest,
    ) -> Result<Option<Casino>, sqlx::Error>;

    // --- Casino test sessions ---
    async fn create_test(
        &self,
        req: CreateTestRequest,
        tester_id: Uuid,
    ) -> Result<CasinoTest, sqlx::Error>;
    async fn list_my_tests(&self, tester_id: Uuid) -> Result<Vec<CasinoTest>, sqlx::Error>;
    async fn list_all_tests(&self) -> Result<Vec<CasinoTest>, sqlx::Error>;
    // Owner-only, and only while the session is still 'in_progress'.
    async fn update_test(
        &self,
        id: Uuid,
        tester_id: Uuid,
        req: UpdateTestRequest,
    ) -> Result<Option<CasinoTest>, sqlx::Error>;
    async fn count_tests_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error>;

    // --- Card inventory ---
    async fn list_cards(&self) -> Result<Vec<Card>, sqlx::Error>;
    async fn list_my_cards(&self, holder_id: Uuid) -> Result<Vec<Card>, sqlx::Error>;
    async fn create_card(&self, req: CreateCardRequest) -> Result<Card, sqlx::Error>;
    async fn update_card(
        &self,
        id: Uuid,
        req: UpdateCardRequest,
    ) -> Result<Option<Card>, sqlx::Error>;

    // --- Bank account inventory ---
    async fn list_bank_accounts(&self) -> Result<Vec<BankAccount>, sqlx::Error>;
    async fn list_my_bank_accounts(&self, holder_id: Uuid)
    -> Result<Vec<BankAccount>, sqlx::Error>;
    async fn create_bank_account(
        &self,
        req: CreateBankAccountRequest,
    ) -> Result<BankAccount, sqlx::Error>;
    async fn update_bank_account(
        &self,
        id: Uuid,
        req: UpdateBankAccountRequest,
    ) -> Result<Option<BankAccount>, sqlx::Error>;

    // --- PayPal inventory ---
    async fn list_paypal_accounts(&self) -> Result<Vec<PaypalAccount>, sqlx::Error>;
    async fn list_my_paypal_accounts(
        &self,
        holder_id: Uuid,
    ) -> Result<Vec<PaypalAccount>, sqlx::Error>;
    async fn create_paypal_account(
        &self,
        req: CreatePaypalRequest,
    ) -> Result<PaypalAccount, sqlx::Error>;
    async fn update_paypal_account(
        &self,
        id: Uuid,
        req: UpdatePaypalRequest,
    ) -> Result<Option<PaypalAccount>, sqlx::Error>;

    // --- Withdrawals ---
    async fn create_withdrawal(
        &self,
        req: CreateWithdrawalRequest,
        requester_id: Uuid,
    ) -> Result<Withdrawal, sqlx::Error>;
    async fn get_withdrawal(&self, id: Uuid) -> Result<Option<Withdrawal>, sqlx::Error>;
    async fn list_withdrawals_all(&self) -> Result<Vec<Withdrawal>, sqlx::Error>;
    async fn list_withdrawals_for(
        &self,
        requester_id: Uuid,
    ) -> Result<Vec<Withdrawal>, sqlx::Error>;
    async fn list_withdrawals_for_team(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<Withdrawal>, sqlx::Error>;
    /// Advances the approval chain one stage. Guarded by `status = 'new'` and
    /// `approval_stage = from_stage` in the WHERE clause; the final advance
    /// (`to_stage = 'done'`) also flips status to 'waiting'.
    async fn advance_withdrawal_stage(
        &self,
        id: Uuid,
        from_stage: &str,
        to_stage: &str,
        approver_id: Uuid,
    ) -> Result<Option<Withdrawal>, sqlx::Error>;
    /// Single guarded status hop (block a pending request, settle a waiting one).
    async fn set_withdrawal_status(
        &self,
        id: Uuid,
        from_status: &str,
        to_status: &str,
    ) -> Result<Option<Withdrawal>, sqlx::Error>;
    /// Database-side safety check consulted before the final approval. The function
    /// body lives in the database and is not reproduced here.
    async fn check_withdrawal_safe(&self, id: Uuid) -> Result<bool, sqlx::Error>;
    async fn received_amounts(&self) -> Result<Vec<AmountCurrency>, sqlx::Error>;
    async fn received_amounts_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AmountCurrency>, sqlx::Error>;

    // --- NDA agreements ---
    async fn create_nda(
        &self,
        employee_id: Uuid,
        full_name: String,
        sign_token: Uuid,
    ) -> Result<NdaAgreement, sqlx::Error>;
    async fn list_ndas(&self) -> Result<Vec<NdaAgreement>, sqlx::Error>;
    // Resolves only while the agreement is still 'sent'; a consumed token is gone.
    async fn get_nda_by_token(&self, token: Uuid) -> Result<Option<NdaAgreement>, sqlx::Error>;
    async fn sign_nda(
        &self,
        token: Uuid,
        full_name: String,
        document_key: String,
    ) -> Result<Option<NdaAgreement>, sqlx::Error>;

    // --- Teams ---
    async fn list_teams(&self) -> Result<Vec<Team>, sqlx::Error>;
    async fn create_team(&self, name: String, lead_id: Option<Uuid>)
    -> Result<Team, sqlx::Error>;
    /// Invokes the database-side membership reconciliation routine.
    async fn sync_teams(&self) -> Result<(), sqlx::Error>;

    // --- Tasks ---
    async fn create_task(
        &self,
        req: CreateTaskRequest,
        author_id: Uuid,
    ) -> Result<Task, sqlx::Error>;
    async fn list_tasks_all(&self) -> Result<Vec<Task>, sqlx::Error>;
    async fn list_tasks_for(&self, assignee_id: Uuid) -> Result<Vec<Task>, sqlx::Error>;
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, sqlx::Error>;
    async fn set_task_status(&self, id: Uuid, status: &str)
    -> Result<Option<Task>, sqlx::Error>;

    // --- Dashboard counters ---
    /// (employees, active casinos, free cards, pending withdrawals).
    async fn stats_counters(&self) -> Result<(i64, i64, i64, i64), sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the hosted
/// Postgres instance. All queries use the runtime query API: the schema is owned by
/// the database, so there is no offline metadata to check the macro form against.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Select lists, repeated verbatim per query below for the short ones; the withdrawal
// list is long enough to warrant a constant.
const WITHDRAWAL_COLS: &str = "id, test_id, requester_id, amount, currency, status, \
     approval_stage, teamlead_id, teamlead_at, manager_id, manager_at, hr_id, hr_at, \
     cfo_id, cfo_at, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    // --- EMPLOYEES ---

    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            "SELECT id, email, role, status, team_id, created_at FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Creates the mirroring employee record after external auth signup succeeds.
    async fn create_employee(&self, employee: Employee) -> Result<Employee, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (id, email, role, status, team_id, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, email, role, status, team_id, created_at
            "#,
        )
        .bind(employee.id)
        .bind(employee.email)
        .bind(employee.role)
        .bind(employee.status)
        .bind(employee.team_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            "SELECT id, email, role, status, team_id, created_at FROM employees \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn update_employee(
        &self,
        id: Uuid,
        req: UpdateEmployeeRequest,
    ) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET role = COALESCE($2, role),
                status = COALESCE($3, status),
                team_id = COALESCE($4, team_id)
            WHERE id = $1
            RETURNING id, email, role, status, team_id, created_at
            "#,
        )
        .bind(id)
        .bind(req.role)
        .bind(req.status)
        .bind(req.team_id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- CASINOS ---

    async fn list_casinos(&self) -> Result<Vec<Casino>, sqlx::Error> {
        sqlx::query_as::<_, Casino>(
            "SELECT id, name, url, geo, status, notes, created_at FROM casinos \
             ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// New catalog entries start in 'checking' until someone confirms them working.
    async fn create_casino(&self, req: CreateCasinoRequest) -> Result<Casino, sqlx::Error> {
        sqlx::query_as::<_, Casino>(
            r#"
            INSERT INTO casinos (id, name, url, geo, status, notes, created_at)
            VALUES ($1, $2, $3, $4, 'checking', $5, NOW())
            RETURNING id, name, url, geo, status, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.name)
        .bind(req.url)
        .bind(req.geo)
        .bind(req.notes)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_casino(
        &self,
        id: Uuid,
        req: UpdateCasinoRequest,
    ) -> Result<Option<Casino>, sqlx::Error> {
        sqlx::query_as::<_, Casino>(
            r#"
            UPDATE casinos
            SET name = COALESCE($2, name),
                url = COALESCE($3, url),
                geo = COALESCE($4, geo),
                status = COALESCE($5, status),
                notes = COALESCE($6, notes)
            WHERE id = $1
            RETURNING id, name, url, geo, status, notes, created_at
            "#,
        )
        .bind(id)
        .bind(req.name)
        .bind(req.url)
        .bind(req.geo)
        .bind(req.status)
        .bind(req.notes)
        .fetch_optional(&self.pool)
        .await
    }

    // --- CASINO TEST SESSIONS ---

    async fn create_test(
        &self,
        req: CreateTestRequest,
        tester_id: Uuid,
    ) -> Result<CasinoTest, sqlx::Error> {
        sqlx::query_as::<_, CasinoTest>(
            r#"
            INSERT INTO casino_tests
                (id, casino_id, tester_id, card_id, deposit_amount, currency, status,
                 comment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'in_progress', $7, NOW(), NOW())
            RETURNING id, casino_id, tester_id, card_id, deposit_amount, currency,
                      status, comment, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.casino_id)
        .bind(tester_id)
        .bind(req.card_id)
        .bind(req.deposit_amount)
        .bind(req.currency)
        .bind(req.comment)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_my_tests(&self, tester_id: Uuid) -> Result<Vec<CasinoTest>, sqlx::Error> {
        sqlx::query_as::<_, CasinoTest>(
            "SELECT id, casino_id, tester_id, card_id, deposit_amount, currency, status, \
             comment, created_at, updated_at FROM casino_tests WHERE tester_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(tester_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_all_tests(&self) -> Result<Vec<CasinoTest>, sqlx::Error> {
        sqlx::query_as::<_, CasinoTest>(
            "SELECT id, casino_id, tester_id, card_id, deposit_amount, currency, status, \
             comment, created_at, updated_at FROM casino_tests ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// The WHERE clause carries all three guards at once: existence, ownership, and
    /// the 'in_progress' state requirement.
    async fn update_test(
        &self,
        id: Uuid,
        tester_id: Uuid,
        req: UpdateTestRequest,
    ) -> Result<Option<CasinoTest>, sqlx::Error> {
        sqlx::query_as::<_, CasinoTest>(
            r#"
            UPDATE casino_tests
            SET status = COALESCE($3, status),
                comment = COALESCE($4, comment),
                updated_at = NOW()
            WHERE id = $1 AND tester_id = $2 AND status = 'in_progress'
            RETURNING id, casino_id, tester_id, card_id, deposit_amount, currency,
                      status, comment, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(tester_id)
        .bind(req.status)
        .bind(req.comment)
        .fetch_optional(&self.pool)
        .await
    }

    async fn count_tests_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM casino_tests WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
    }

    // --- CARD INVENTORY ---

    async fn list_cards(&self) -> Result<Vec<Card>, sqlx::Error> {
        sqlx::query_as::<_, Card>(
            "SELECT id, masked_pan, bank, currency, status, holder_id, created_at \
             FROM cards ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn list_my_cards(&self, holder_id: Uuid) -> Result<Vec<Card>, sqlx::Error> {
        sqlx::query_as::<_, Card>(
            "SELECT id, masked_pan, bank, currency, status, holder_id, created_at \
             FROM cards WHERE holder_id = $1 ORDER BY created_at DESC",
        )
        .bind(holder_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_card(&self, req: CreateCardRequest) -> Result<Card, sqlx::Error> {
        sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (id, masked_pan, bank, currency, status, created_at)
            VALUES ($1, $2, $3, $4, 'free', NOW())
            RETURNING id, masked_pan, bank, currency, status, holder_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.masked_pan)
        .bind(req.bank)
        .bind(req.currency)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_card(
        &self,
        id: Uuid,
        req: UpdateCardRequest,
    ) -> Result<Option<Card>, sqlx::Error> {
        sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards
            SET status = COALESCE($2, status),
                holder_id = COALESCE($3, holder_id)
            WHERE id = $1
            RETURNING id, masked_pan, bank, currency, status, holder_id, created_at
            "#,
        )
        .bind(id)
        .bind(req.status)
        .bind(req.holder_id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- BANK ACCOUNT INVENTORY ---

    async fn list_bank_accounts(&self) -> Result<Vec<BankAccount>, sqlx::Error> {
        sqlx::query_as::<_, BankAccount>(
            "SELECT id, bank, iban, currency, status, holder_id, created_at \
             FROM bank_accounts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn list_my_bank_accounts(
        &self,
        holder_id: Uuid,
    ) -> Result<Vec<BankAccount>, sqlx::Error> {
        sqlx::query_as::<_, BankAccount>(
            "SELECT id, bank, iban, currency, status, holder_id, created_at \
             FROM bank_accounts WHERE holder_id = $1 ORDER BY created_at DESC",
        )
        .bind(holder_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_bank_account(
        &self,
        req: CreateBankAccountRequest,
    ) -> Result<BankAccount, sqlx::Error> {
        sqlx::query_as::<_, BankAccount>(
            r#"
            INSERT INTO bank_accounts (id, bank, iban, currency, status, created_at)
            VALUES ($1, $2, $3, $4, 'free', NOW())
            RETURNING id, bank, iban, currency, status, holder_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.bank)
        .bind(req.iban)
        .bind(req.currency)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_bank_account(
        &self,
        id: Uuid,
        req: UpdateBankAccountRequest,
    ) -> Result<Option<BankAccount>, sqlx::Error> {
        sqlx::query_as::<_, BankAccount>(
            r#"
            UPDATE bank_accounts
            SET status = COALESCE($2, status),
                holder_id = COALESCE($3, holder_id)
            WHERE id = $1
            RETURNING id, bank, iban, currency, status, holder_id, created_at
            "#,
        )
        .bind(id)
        .bind(req.status)
        .bind(req.holder_id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- PAYPAL INVENTORY ---

    async fn list_paypal_accounts(&self) -> Result<Vec<PaypalAccount>, sqlx::Error> {
        sqlx::query_as::<_, PaypalAccount>(
            "SELECT id, email, balance, currency, status, holder_id, created_at \
             FROM paypal_accounts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn list_my_paypal_accounts(
        &self,
        holder_id: Uuid,
    ) -> Result<Vec<PaypalAccount>, sqlx::Error> {
        sqlx::query_as::<_, PaypalAccount>(
            "SELECT id, email, balance, currency, status, holder_id, created_at \
             FROM paypal_accounts WHERE holder_id = $1 ORDER BY created_at DESC",
        )
        .bind(holder_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_paypal_account(
        &self,
        req: CreatePaypalRequest,
    ) -> Result<PaypalAccount, sqlx::Error> {
        sqlx::query_as::<_, PaypalAccount>(
            r#"
            INSERT INTO paypal_accounts (id, email, balance, currency, status, created_at)
            VALUES ($1, $2, $3, $4, 'free', NOW())
            RETURNING id, email, balance, currency, status, holder_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.email)
        .bind(req.balance.unwrap_or(0.0))
        .bind(req.currency)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_paypal_account(
        &self,
        id: Uuid,
        req: UpdatePaypalRequest,
    ) -> Result<Option<PaypalAccount>, sqlx::Error> {
        sqlx::query_as::<_, PaypalAccount>(
            r#"
            UPDATE paypal_accounts
            SET status = COALESCE($2, status),
                holder_id = COALESCE($3, holder_id),
                balance = COALESCE($4, balance)
            WHERE id = $1
            RETURNING id, email, balance, currency, status, holder_id, created_at
            "#,
        )
        .bind(id)
        .bind(req.status)
        .bind(req.holder_id)
        .bind(req.balance)
        .fetch_optional(&self.pool)
        .await
    }

    // --- WITHDRAWALS ---

    async fn create_withdrawal(
        &self,
        req: CreateWithdrawalRequest,
        requester_id: Uuid,
    ) -> Result<Withdrawal, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO withdrawals
                (id, test_id, requester_id, amount, currency, status, approval_stage,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'new', 'teamlead', NOW(), NOW())
            RETURNING {WITHDRAWAL_COLS}
            "#
        );
        sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.test_id)
            .bind(requester_id)
            .bind(req.amount)
            .bind(req.currency)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_withdrawal(&self, id: Uuid) -> Result<Option<Withdrawal>, sqlx::Error> {
        let sql = format!("SELECT {WITHDRAWAL_COLS} FROM withdrawals WHERE id = $1");
        sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_withdrawals_all(&self) -> Result<Vec<Withdrawal>, sqlx::Error> {
        let sql =
            format!("SELECT {WITHDRAWAL_COLS} FROM withdrawals ORDER BY created_at DESC");
        sqlx::query_as::<_, Withdrawal>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    async fn list_withdrawals_for(
        &self,
        requester_id: Uuid,
    ) -> Result<Vec<Withdrawal>, sqlx::Error> {
        let sql = format!(
            "SELECT {WITHDRAWAL_COLS} FROM withdrawals WHERE requester_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(requester_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Team scope resolves through the requester's employee row.
    async fn list_withdrawals_for_team(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<Withdrawal>, sqlx::Error> {
        let sql = format!(
            "SELECT {WITHDRAWAL_COLS} FROM withdrawals WHERE requester_id IN \
             (SELECT id FROM employees WHERE team_id = $1) ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(team_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn advance_withdrawal_stage(
        &self,
        id: Uuid,
        from_stage: &str,
        to_stage: &str,
        approver_id: Uuid,
    ) -> Result<Option<Withdrawal>, sqlx::Error> {
        // Stage names come from the Role enum, never from request input; the matched
        // column pair is a compile-time constant.
        let (id_col, at_col) = match from_stage {
            "teamlead" => ("teamlead_id", "teamlead_at"),
            "manager" => ("manager_id", "manager_at"),
            "hr" => ("hr_id", "hr_at"),
            "cfo" => ("cfo_id", "cfo_at"),
            other => {
                tracing::error!("unknown approval stage {other}");
                return Ok(None);
            }
        };

        let sql = format!(
            r#"
            UPDATE withdrawals
            SET approval_stage = $3,
                status = CASE WHEN $3 = 'done' THEN 'waiting' ELSE status END,
                {id_col} = $4,
                {at_col} = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'new' AND approval_stage = $2
            RETURNING {WITHDRAWAL_COLS}
            "#
        );
        sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(id)
            .bind(from_stage)
            .bind(to_stage)
            .bind(approver_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn set_withdrawal_status(
        &self,
        id: Uuid,
        from_status: &str,
        to_status: &str,
    ) -> Result<Option<Withdrawal>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE withdrawals
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {WITHDRAWAL_COLS}
            "#
        );
        sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(id)
            .bind(from_status)
            .bind(to_status)
            .fetch_optional(&self.pool)
            .await
    }

    async fn check_withdrawal_safe(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT check_withdrawal_safe_v3($1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    async fn received_amounts(&self) -> Result<Vec<AmountCurrency>, sqlx::Error> {
        sqlx::query_as::<_, AmountCurrency>(
            "SELECT amount, currency FROM withdrawals WHERE status = 'received'",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn received_amounts_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AmountCurrency>, sqlx::Error> {
        sqlx::query_as::<_, AmountCurrency>(
            "SELECT amount, currency FROM withdrawals WHERE status = 'received' \
             AND updated_at >= $1 AND updated_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }

    // --- NDA AGREEMENTS ---

    async fn create_nda(
        &self,
        employee_id: Uuid,
        full_name: String,
        sign_token: Uuid,
    ) -> Result<NdaAgreement, sqlx::Error> {
        sqlx::query_as::<_, NdaAgreement>(
            r#"
            INSERT INTO nda_agreements
                (id, employee_id, full_name, status, sign_token, created_at)
            VALUES ($1, $2, $3, 'sent', $4, NOW())
            RETURNING id, employee_id, full_name, status, sign_token, document_key,
                      created_at, signed_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(full_name)
        .bind(sign_token)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_ndas(&self) -> Result<Vec<NdaAgreement>, sqlx::Error> {
        sqlx::query_as::<_, NdaAgreement>(
            "SELECT id, employee_id, full_name, status, sign_token, document_key, \
             created_at, signed_at FROM nda_agreements ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_nda_by_token(
        &self,
        token: Uuid,
    ) -> Result<Option<NdaAgreement>, sqlx::Error> {
        sqlx::query_as::<_, NdaAgreement>(
            "SELECT id, employee_id, full_name, status, sign_token, document_key, \
             created_at, signed_at FROM nda_agreements \
             WHERE sign_token = $1 AND status = 'sent'",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
    }

    /// The `status = 'sent'` guard consumes the token: signing twice affects 0 rows.
    async fn sign_nda(
        &self,
        token: Uuid,
        full_name: String,
        document_key: String,
    ) -> Result<Option<NdaAgreement>, sqlx::Error> {
        sqlx::query_as::<_, NdaAgreement>(
            r#"
            UPDATE nda_agreements
            SET status = 'signed', full_name = $2, document_key = $3, signed_at = NOW()
            WHERE sign_token = $1 AND status = 'sent'
            RETURNING id, employee_id, full_name, status, sign_token, document_key,
                      created_at, signed_at
            "#,
        )
        .bind(token)
        .bind(full_name)
        .bind(document_key)
        .fetch_optional(&self.pool)
        .await
    }

    // --- TEAMS ---

    async fn list_teams(&self) -> Result<Vec<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(
            "SELECT id, name, lead_id, created_at FROM teams ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_team(
        &self,
        name: String,
        lead_id: Option<Uuid>,
    ) -> Result<Team, sqlx::Error> {
        sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (id, name, lead_id, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, name, lead_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(lead_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn sync_teams(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT manual_sync_teams()")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- TASKS ---

    async fn create_task(
        &self,
        req: CreateTaskRequest,
        author_id: Uuid,
    ) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks
                (id, title, description, author_id, assignee_id, status, due_date,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'new', $6, NOW(), NOW())
            RETURNING id, title, description, author_id, assignee_id, status, due_date,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.title)
        .bind(req.description)
        .bind(author_id)
        .bind(req.assignee_id)
        .bind(req.due_date)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_tasks_all(&self) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, description, author_id, assignee_id, status, due_date, \
             created_at, updated_at FROM tasks ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn list_tasks_for(&self, assignee_id: Uuid) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, description, author_id, assignee_id, status, due_date, \
             created_at, updated_at FROM tasks WHERE assignee_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(assignee_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, description, author_id, assignee_id, status, due_date, \
             created_at, updated_at FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn set_task_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, author_id, assignee_id, status, due_date,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    // --- DASHBOARD COUNTERS ---

    /// Compiles the dashboard counters, one scalar query each.
    async fn stats_counters(&self) -> Result<(i64, i64, i64, i64), sqlx::Error> {
        let employees = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;
        let active_casinos = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM casinos WHERE status = 'working'",
        )
        .fetch_one(&self.pool)
        .await?;
        let free_cards =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cards WHERE status = 'free'")
                .fetch_one(&self.pool)
                .await?;
        let pending_withdrawals = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM withdrawals WHERE status = 'new'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok((employees, active_casinos, free_cards, pending_withdrawals))
    }
}
