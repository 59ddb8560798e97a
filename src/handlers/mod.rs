// handlers/mod.rs - Handlers split by security tier
//
// Public (no auth) → Protected (bearer token + permission, enforced by
// `middleware::require_permission` before the handler runs)

pub mod protected;
pub mod public;
