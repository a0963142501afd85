// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Each route is wrapped in a `PermissionGate` demanding one of the scopes
// below; the gate injects the caller's `Permissions` as a request extension.

pub mod drinks;

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";
