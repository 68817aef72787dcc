// ============================
// crates/app-lib/src/access/gate.rs
// ============================
//! The login gate and the code issuer.
use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use crate::access::code::generate_access_code;
use crate::access::session::SessionStore;
use crate::error::AppError;
use crate::storage::LobbyDirectory;
use memoria_common::{AccessCode, LobbyRecord};

/// Outcome of validating a user-entered code against the lobby directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The lobby exists; the code was persisted as the active session.
    Granted,
    /// No lobby under that code. Nothing was changed.
    Denied,
}

/// Validates user-entered access codes against the lobby directory.
///
/// Codes are looked up verbatim; there is no client-side format check
/// before the lookup. A directory failure is surfaced as an error and
/// leaves both the directory and the session untouched.
pub struct AccessGate<D> {
    directory: Arc<D>,
    session: Arc<dyn SessionStore>,
}

impl<D: LobbyDirectory> AccessGate<D> {
    pub fn new(directory: Arc<D>, session: Arc<dyn SessionStore>) -> Self {
        Self { directory, session }
    }

    /// Look up `code`; on a hit, persist it as the active session.
    pub async fn validate_code(&self, code: &AccessCode) -> Result<AccessDecision, AppError> {
        match self.directory.get_lobby(code).await? {
            Some(_) => {
                self.session.set_active_code(code).await?;
                counter!("access.granted").increment(1);
                info!(%code, "access granted");
                Ok(AccessDecision::Granted)
            },
            None => {
                info!(%code, "unknown access code");
                Ok(AccessDecision::Denied)
            },
        }
    }
}

/// A freshly issued access code.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: AccessCode,
    /// False when the directory write failed; the code is still usable
    /// locally and may not be joinable by anyone else.
    pub registered: bool,
}

/// Generates lobby codes and registers them.
///
/// Issuing a code registers a lobby record in the directory and
/// overwrites the local session slot. There is no collision check against
/// existing lobbies.
pub struct CodeIssuer<D> {
    directory: Arc<D>,
    session: Arc<dyn SessionStore>,
}

impl<D: LobbyDirectory> CodeIssuer<D> {
    pub fn new(directory: Arc<D>, session: Arc<dyn SessionStore>) -> Self {
        Self { directory, session }
    }

    /// Draw a code, register its lobby and remember it locally.
    ///
    /// A failed directory registration does not roll the code back: the
    /// caller still shows it, and `registered` reports the mismatch.
    pub async fn issue(&self) -> Result<IssuedCode, AppError> {
        let code = generate_access_code();

        let registered = match self.directory.put_lobby(&LobbyRecord::new(code.clone())).await {
            Ok(()) => {
                counter!("lobby.created").increment(1);
                info!(%code, "lobby registered");
                true
            },
            Err(err) => {
                warn!(%code, error = %err, "failed to register lobby code");
                false
            },
        };

        self.session.set_active_code(&code).await?;

        Ok(IssuedCode { code, registered })
    }
}
