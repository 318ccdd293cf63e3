//! `quillgate-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it signs and
//! verifies credentials, hashes secrets, and makes role decisions. Looking up
//! principals and transporting credentials happen elsewhere.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{authorize, AuthzError, RolePolicy};
pub use claims::{validate_claims, TokenClaims, TokenValidationError};
pub use password::{hash_password, verify_password, PasswordError};
pub use principal::Principal;
pub use roles::{Role, RoleParseError};
pub use token::{IssuedToken, TokenCodec, TokenError, DEFAULT_TOKEN_TTL};
pub use user::{ensure_not_self, normalize_email, registration_role, NewUser, SelfAction, User};
