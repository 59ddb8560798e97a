// auth/mod.rs - Bearer token verification and permission checks
//
// Tokens are issued by an external identity provider; this module only
// verifies them (signature, issuer, audience, expiry) and checks the
// `permissions` claim against the permission an operation requires.

pub mod claims;
pub mod error;
pub mod guard;
pub mod keys;
pub mod verifier;

pub use claims::{Audience, Claims, Permission};
pub use error::AuthError;
pub use guard::require;
pub use keys::{KeySet, KeySetError, VerificationKey};
pub use verifier::{bearer_token, TokenVerifier, VerifierSettings};
