// ============================
// crates/app-lib/src/access/code.rs
// ============================
//! Lobby access-code generation.
//!
//! Codes are 6-digit numeric strings drawn uniformly from
//! [`CODE_MIN`, `CODE_MAX`]. Generation is independent per call: there is
//! no uniqueness check against the directory, so collisions are possible.
use memoria_common::{AccessCode, CODE_MAX, CODE_MIN};
use rand::Rng;

/// Draw a fresh 6-digit access code.
pub fn generate_access_code() -> AccessCode {
    let mut rng = rand::rng();
    let value: u32 = rng.random_range(CODE_MIN..=CODE_MAX);
    AccessCode::from(value.to_string())
}
