// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer token + permission scope)
pub mod protected;
pub mod public;
