use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---
//
// Every entity here mirrors a table owned by the hosted Postgres instance. Schema,
// constraints, row-level security and the stored routines live database-side; the
// application treats each row as an opaque record.

/// Employee
///
/// The canonical identity record stored in `public.employees`. The primary key doubles
/// as the foreign key to the external auth provider's user table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Employee {
    pub id: Uuid,
    pub email: String,
    // The RBAC field: one of the eight role strings.
    pub role: String,
    // 'active' or 'fired'. Fired employees keep their rows but fail every role gate.
    pub status: String,
    pub team_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Casino
///
/// A catalog entry for a casino under test. Status is one of
/// 'working' | 'blocked' | 'checking'.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Casino {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub geo: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CasinoTest
///
/// One logged test session: who tested which casino with which card, the deposit
/// made, and the result ('in_progress' | 'win' | 'lose' | 'blocked').
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CasinoTest {
    pub id: Uuid,
    pub casino_id: Uuid,
    pub tester_id: Uuid,
    pub card_id: Option<Uuid>,
    pub deposit_amount: f64,
    pub currency: String,
    pub status: String,
    pub comment: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Card
///
/// Inventory record for a physical/virtual bank card. Only the masked PAN is ever
/// stored or returned. Status: 'free' | 'assigned' | 'blocked'.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Card {
    pub id: Uuid,
    pub masked_pan: String,
    pub bank: String,
    pub currency: String,
    pub status: String,
    pub holder_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// BankAccount
///
/// Inventory record for a bank account, same lifecycle as cards.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct BankAccount {
    pub id: Uuid,
    pub bank: String,
    pub iban: String,
    pub currency: String,
    pub status: String,
    pub holder_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// PaypalAccount
///
/// Inventory record for a PayPal account.
/// Status: 'free' | 'assigned' | 'blocked' | 'dead'.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct PaypalAccount {
    pub id: Uuid,
    pub email: String,
    pub balance: f64,
    pub currency: String,
    pub status: String,
    pub holder_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Withdrawal
///
/// A monetary request progressing through the fixed status enum
/// 'new' -> 'waiting' | 'blocked' -> 'received' | 'problem', with the approval chain
/// riding a second text column: `approval_stage` moves
/// teamlead -> manager -> hr -> cfo -> done. Each stage records its approver and
/// timestamp. There is no saga, rollback or retry anywhere in this lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Withdrawal {
    pub id: Uuid,
    pub test_id: Option<Uuid>,
    pub requester_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub approval_stage: String,
    pub teamlead_id: Option<Uuid>,
    #[ts(type = "string | null")]
    pub teamlead_at: Option<DateTime<Utc>>,
    pub manager_id: Option<Uuid>,
    #[ts(type = "string | null")]
    pub manager_at: Option<DateTime<Utc>>,
    pub hr_id: Option<Uuid>,
    #[ts(type = "string | null")]
    pub hr_at: Option<DateTime<Utc>>,
    pub cfo_id: Option<Uuid>,
    #[ts(type = "string | null")]
    pub cfo_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// NdaAgreement
///
/// A document-signing record. `sign_token` gates the public signing link; once the
/// agreement flips 'sent' -> 'signed' the token stops resolving.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct NdaAgreement {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub full_name: String,
    pub status: String,
    pub sign_token: Uuid,
    // Object-store key of the uploaded signed scan.
    pub document_key: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub signed_at: Option<DateTime<Utc>>,
}

/// Team
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub lead_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Task
///
/// Work item assigned to an employee. Status walks 'new' -> 'in_progress' -> 'done',
/// forward only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Uuid,
    pub assignee_id: Uuid,
    pub status: String,
    #[ts(type = "string | null")]
    pub due_date: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// AmountCurrency
///
/// Internal projection used by the analytics queries: just enough of a withdrawal row
/// to convert and sum it.
#[derive(Debug, Clone, FromRow, Default)]
pub struct AmountCurrency {
    pub amount: f64,
    pub currency: String,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input for the public registration endpoint (POST /register). The password is only
/// passed through to the hosted auth provider and never persisted or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// UpdateEmployeeRequest
///
/// Admin-only partial update of an employee record (role escalation, firing, team
/// moves). Option fields are applied with COALESCE semantics.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateEmployeeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
}

/// CreateCasinoRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCasinoRequest {
    pub name: String,
    pub url: String,
    pub geo: Option<String>,
    pub notes: Option<String>,
}

/// UpdateCasinoRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCasinoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// CreateTestRequest
///
/// Input for logging a new casino test session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateTestRequest {
    pub casino_id: Uuid,
    pub card_id: Option<Uuid>,
    pub deposit_amount: f64,
    pub currency: String,
    pub comment: Option<String>,
}

/// UpdateTestRequest
///
/// Owner-side result update, accepted only while the session is 'in_progress'.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateTestRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// CreateCardRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCardRequest {
    pub masked_pan: String,
    pub bank: String,
    pub currency: String,
}

/// UpdateCardRequest
///
/// Assignment ('assigned' + holder) or blocking of a card.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCardRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_id: Option<Uuid>,
}

/// CreateBankAccountRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateBankAccountRequest {
    pub bank: String,
    pub iban: String,
    pub currency: String,
}

/// UpdateBankAccountRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateBankAccountRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_id: Option<Uuid>,
}

/// CreatePaypalRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePaypalRequest {
    pub email: String,
    pub balance: Option<f64>,
    pub currency: String,
}

/// UpdatePaypalRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePaypalRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

/// CreateWithdrawalRequest
///
/// Opens a withdrawal with status 'new' at approval stage 'teamlead'.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateWithdrawalRequest {
    pub test_id: Option<Uuid>,
    pub amount: f64,
    pub currency: String,
}

/// ResolveWithdrawalRequest
///
/// Settlement outcome for a 'waiting' withdrawal: 'received' or 'problem'.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ResolveWithdrawalRequest {
    pub outcome: String,
}

/// CreateNdaRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateNdaRequest {
    pub employee_id: Uuid,
    pub full_name: String,
}

/// SignNdaRequest
///
/// Submitted through the token-gated public link together with the uploaded
/// document's object-store key.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignNdaRequest {
    pub full_name: String,
    pub document_key: String,
}

/// CreateTeamRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateTeamRequest {
    pub name: String,
    pub lead_id: Option<Uuid>,
}

/// CreateTaskRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Uuid,
    #[ts(type = "string | null")]
    pub due_date: Option<DateTime<Utc>>,
}

/// UpdateTaskStatusRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateTaskStatusRequest {
    pub status: String,
}

/// PresignedUrlRequest
///
/// Input payload for requesting a short-lived upload URL. The server uses these
/// fields to set security constraints on the generated URL.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "signed_nda.pdf")]
    pub filename: String,
    /// The MIME type, used to constrain the upload to the allowed type.
    #[schema(example = "application/pdf")]
    pub file_type: String,
}

/// PresignedUrlResponse
///
/// The secure, temporary URL for client-to-cloud file transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlResponse {
    pub success: bool,
    /// The time-limited URL for the PUT request.
    pub upload_url: String,
    /// The object key where the file will land (referenced later from the database).
    pub resource_key: String,
}

// --- Response Envelopes ---
//
// Every 200 body carries `success: true` plus the named payload, matching the
// `{success, ...}` contract of the HTTP surface.

/// Ack
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Ack {
    pub success: bool,
}

/// EmployeeResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EmployeeResponse {
    pub success: bool,
    pub employee: Employee,
}

/// EmployeeListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EmployeeListResponse {
    pub success: bool,
    pub employees: Vec<Employee>,
}

/// CasinoResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CasinoResponse {
    pub success: bool,
    pub casino: Casino,
}

/// CasinoListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CasinoListResponse {
    pub success: bool,
    pub casinos: Vec<Casino>,
}

/// TestResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TestResponse {
    pub success: bool,
    pub test: CasinoTest,
}

/// TestListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TestListResponse {
    pub success: bool,
    pub tests: Vec<CasinoTest>,
}

/// CardResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CardResponse {
    pub success: bool,
    pub card: Card,
}

/// CardListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CardListResponse {
    pub success: bool,
    pub cards: Vec<Card>,
}

/// BankAccountResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BankAccountResponse {
    pub success: bool,
    pub account: BankAccount,
}

/// BankAccountListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BankAccountListResponse {
    pub success: bool,
    pub accounts: Vec<BankAccount>,
}

/// PaypalResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PaypalResponse {
    pub success: bool,
    pub account: PaypalAccount,
}

/// PaypalListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PaypalListResponse {
    pub success: bool,
    pub accounts: Vec<PaypalAccount>,
}

/// WithdrawalView
///
/// A withdrawal row together with its USD-converted amount.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct WithdrawalView {
    pub withdrawal: Withdrawal,
    pub amount_usd: f64,
}

/// WithdrawalResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct WithdrawalResponse {
    pub success: bool,
    pub withdrawal: WithdrawalView,
}

/// WithdrawalListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct WithdrawalListResponse {
    pub success: bool,
    pub withdrawals: Vec<WithdrawalView>,
}

/// NdaCreatedResponse
///
/// Carries the token-gated public signing path alongside the fresh agreement.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NdaCreatedResponse {
    pub success: bool,
    pub agreement: NdaAgreement,
    pub sign_path: String,
}

/// NdaResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NdaResponse {
    pub success: bool,
    pub agreement: NdaAgreement,
}

/// NdaListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NdaListResponse {
    pub success: bool,
    pub agreements: Vec<NdaAgreement>,
}

/// TeamResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TeamResponse {
    pub success: bool,
    pub team: Team,
}

/// TeamListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TeamListResponse {
    pub success: bool,
    pub teams: Vec<Team>,
}

/// TaskResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TaskResponse {
    pub success: bool,
    pub task: Task,
}

/// TaskListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TaskListResponse {
    pub success: bool,
    pub tasks: Vec<Task>,
}

// --- Dashboard & Analytics Schemas (Output) ---

/// DashboardStats
///
/// Counter set for the administrative dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DashboardStats {
    pub employees: i64,
    pub active_casinos: i64,
    pub free_cards: i64,
    pub pending_withdrawals: i64,
    /// Sum of all 'received' withdrawals, converted to USD.
    pub received_total_usd: f64,
}

/// StatsResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: DashboardStats,
}

/// MonthTrend
///
/// One bucket of the monthly trend report.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MonthTrend {
    /// Bucket label, formatted `YYYY-MM`.
    pub month: String,
    pub tests_started: i64,
    pub withdrawals_received: i64,
    pub received_usd: f64,
    /// withdrawals_received / tests_started; 0 when no tests ran that month.
    pub success_rate: f64,
}

/// TrendsResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TrendsResponse {
    pub success: bool,
    pub months: Vec<MonthTrend>,
}

/// RatesResponse
///
/// The USD conversion table currently in effect and where it came from
/// ('live' or 'fallback').
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RatesResponse {
    pub success: bool,
    pub rates: std::collections::HashMap<String, f64>,
    pub source: String,
}
