/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing a Defense-in-Depth strategy. Access control is applied explicitly at
/// the module level (via Axum layers), preventing accidental exposure of protected
/// endpoints.
///
/// The three modules map directly to the access tiers.

/// Routes accessible to anonymous clients: health, registration, and the
/// token-gated NDA signing link.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated session.
pub mod authenticated;

/// Routes nested under '/admin'. Every handler here performs its own role
/// allow-list check after authentication.
pub mod admin;
