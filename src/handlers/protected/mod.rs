// handlers/protected/mod.rs - Protected handlers (bearer token + permission)
//
// Each handler is mounted behind a `PermissionGate`, so by the time it runs
// the token is verified and the verified `Claims` sit in the request extensions.

pub mod drinks;

pub use drinks::create as drinks_create;
pub use drinks::delete as drinks_delete;
pub use drinks::detail as drinks_detail;
pub use drinks::update as drinks_update;
