/// Handler Module Index
///
/// Every handler follows the same four-step shape: resolve the session identity
/// (AuthUser extractor), gate on the role allow-list, perform one or a few
/// repository calls, format the `{success, ...}` response. There is deliberately
/// nothing else: business rules beyond the inline guards live database-side.
pub mod account;
pub mod analytics;
pub mod casinos;
pub mod employees;
pub mod inventory;
pub mod nda;
pub mod tasks;
pub mod teams;
pub mod uploads;
pub mod withdrawals;
