use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    repository::RepositoryState,
};

/// Claims
///
/// The payload structure expected inside a JSON Web Token issued by the hosted auth
/// provider. Claims are signed with the shared secret and validated on every
/// authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the employee, keyed to `public.employees.id`.
    pub sub: Uuid,
    /// Expiration Time (exp): timestamp after which the JWT must not be accepted.
    pub exp: usize,
    /// Issued At (iat): timestamp when the JWT was issued.
    pub iat: usize,
}

/// Role
///
/// The eight organizational role strings, which are the sole authorization primitive.
/// Stored as plain text in the database; parsed once per request by the extractor so
/// that handlers compare enum values instead of scattering string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Junior,
    Teamlead,
    Manager,
    Hr,
    Cfo,
    Admin,
    Tester,
    Ceo,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "junior" => Some(Role::Junior),
            "teamlead" => Some(Role::Teamlead),
            "manager" => Some(Role::Manager),
            "hr" => Some(Role::Hr),
            "cfo" => Some(Role::Cfo),
            "admin" => Some(Role::Admin),
            "tester" => Some(Role::Tester),
            "ceo" => Some(Role::Ceo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Junior => "junior",
            Role::Teamlead => "teamlead",
            Role::Manager => "manager",
            Role::Hr => "hr",
            Role::Cfo => "cfo",
            Role::Admin => "admin",
            Role::Tester => "tester",
            Role::Ceo => "ceo",
        }
    }
}

// --- Per-endpoint allow-lists ---
// Each endpoint picks the list it gates on. There is no implicit superuser: a role is
// allowed only where its list says so.

/// Roles that log casino test sessions and request withdrawals.
pub const FIELD_WORK: &[Role] = &[Role::Junior, Role::Tester];
/// The withdrawal approval chain, in stage order.
pub const APPROVAL_CHAIN: &[Role] = &[Role::Teamlead, Role::Manager, Role::Hr, Role::Cfo];
/// Inventory desk: card / bank-account / PayPal custody.
pub const INVENTORY_DESK: &[Role] = &[Role::Hr, Role::Admin];
/// Casino catalog maintenance.
pub const CASINO_DESK: &[Role] = &[Role::Manager, Role::Admin];
/// Dashboard and trend analytics readers.
pub const DASHBOARD: &[Role] = &[Role::Manager, Role::Hr, Role::Cfo, Role::Admin, Role::Ceo];
/// Employee directory readers.
pub const DIRECTORY: &[Role] = &[Role::Hr, Role::Admin, Role::Ceo];
/// Task creation and full task listing.
pub const TASK_DESK: &[Role] = &[Role::Teamlead, Role::Manager, Role::Admin];
/// Team creation.
pub const TEAM_DESK: &[Role] = &[Role::Manager, Role::Admin];
/// Team roster readers.
pub const TEAM_VIEW: &[Role] = &[Role::Teamlead, Role::Manager, Role::Hr, Role::Admin, Role::Ceo];
/// Full test-session listing (oversight of field work).
pub const TEST_OVERSIGHT: &[Role] = &[Role::Teamlead, Role::Manager, Role::Admin];
/// NDA desk: agreement creation and listing.
pub const NDA_DESK: &[Role] = &[Role::Hr, Role::Admin];
/// Withdrawal settlement (received / problem).
pub const SETTLEMENT: &[Role] = &[Role::Cfo, Role::Admin];

/// AuthUser
///
/// The resolved identity of an authenticated request: employee id, parsed role,
/// team membership, and whether the employee is still active. Handlers receive this
/// from the extractor and gate on it via [`AuthUser::require`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The unique identifier of the employee, mapped to `public.employees.id`.
    pub id: Uuid,
    /// The employee's current role, re-read from the database on every request.
    pub role: Role,
    /// The team the employee belongs to, if any. Drives teamlead-scoped listings.
    pub team_id: Option<Uuid>,
    /// False once the employee record is marked `fired`.
    pub active: bool,
}

impl AuthUser {
    /// require
    ///
    /// The single role gate used by every protected handler. Fired employees are
    /// refused everywhere; otherwise the caller's role must appear on the allow-list.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if !self.active {
            return Err(ApiError::Forbidden);
        }
        if !allowed.contains(&self.role) {
            return Err(ApiError::Forbidden);
        }
        Ok(())
    }

    /// require_active
    ///
    /// Gate for endpoints open to every role, which still refuse fired employees.
    pub fn require_active(&self) -> Result<(), ApiError> {
        if !self.active {
            return Err(ApiError::Forbidden);
        }
        Ok(())
    }
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any authenticated handler. The flow:
/// 1. Dependency resolution: Repository and AppConfig from the application state.
/// 2. Local bypass: development-time access using the 'x-user-id' header.
/// 3. Token validation: Bearer token extraction and JWT decoding.
/// 4. DB lookup: the employee's current role/status/team, so that role changes and
///    firings take effect immediately rather than at token expiry.
///
/// Rejection: 401 on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local Development Bypass. Guarded by the Env check: a known employee UUID in
        // the 'x-user-id' header substitutes for a JWT, but still resolves against the
        // database so roles are correctly loaded.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        if let Some(employee) = repo.get_employee(user_id).await? {
                            let role =
                                Role::parse(&employee.role).ok_or(ApiError::Unauthorized)?;
                            return Ok(AuthUser {
                                id: employee.id,
                                role,
                                team_id: employee.team_id,
                                active: employee.status == "active",
                            });
                        }
                    }
                }
            }
        }
        // Production, or bypass failed: fall through to standard JWT validation.

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        // Expired, malformed, or badly signed tokens all collapse to 401.
        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(|_| ApiError::Unauthorized)?;

        let user_id = token_data.claims.sub;

        // Final verification against the database. A token for a deleted employee is
        // rejected; a row whose role string does not parse is not a usable identity.
        let employee = repo
            .get_employee(user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        let role = Role::parse(&employee.role).ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: employee.id,
            role,
            team_id: employee.team_id,
            active: employee.status == "active",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_round_trip() {
        for s in [
            "junior", "teamlead", "manager", "hr", "cfo", "admin", "tester", "ceo",
        ] {
            let role = Role::parse(s).expect("known role string");
            assert_eq!(role.as_str(), s);
        }
        assert!(Role::parse("intern").is_none());
        assert!(Role::parse("Admin").is_none());
    }

    #[test]
    fn fired_employee_fails_every_gate() {
        let user = AuthUser {
            id: Uuid::from_u128(1),
            role: Role::Admin,
            team_id: None,
            active: false,
        };
        assert!(user.require(&[Role::Admin]).is_err());
        assert!(user.require_active().is_err());
    }

    #[test]
    fn allow_list_refuses_off_list_roles() {
        let user = AuthUser {
            id: Uuid::from_u128(2),
            role: Role::Junior,
            team_id: None,
            active: true,
        };
        assert!(user.require(FIELD_WORK).is_ok());
        assert!(user.require(DASHBOARD).is_err());
        assert!(user.require(APPROVAL_CHAIN).is_err());
    }
}
