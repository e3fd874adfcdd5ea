#![warn(missing_docs)]
//! # threat-scope-session
//!
//! ## Purpose
//! Implements credential validation and the session gate that protects the
//! dashboard view.
//!
//! ## Responsibilities
//! - Validate operator credentials (12-digit identifier, non-empty birth date).
//! - Model the login/logout session lifecycle with explicit transitions.
//! - Decide entry into the protected view before any protected state exists.
//!
//! ## Data flow
//! Entry view collects [`Credentials`] -> [`SessionManager::login`] validates
//! and opens a [`SessionContext`] -> the app injects the context into the
//! dashboard -> [`SessionManager::guard`] gates later direct navigation.
//!
//! ## Ownership and lifetimes
//! Session state is owned by a single [`SessionManager`] held at the app top
//! level; there is no ambient process-wide flag.
//!
//! ## Error model
//! Credential failures return [`SessionError`] values with user-presentable
//! messages and cause no session mutation.
//!
//! ## Security and privacy notes
//! This is a demo gate, not an authentication mechanism. The raw identifier is
//! never stored; the session id is a digest over it and the login timestamp.

use hex::encode as hex_encode;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Required identifier length in digits.
pub const IDENTIFIER_DIGITS: usize = 12;

/// User-provided login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Numeric operator identifier, exactly 12 digits.
    pub identifier: String,
    /// Date of birth as entered; only non-emptiness is checked here.
    pub date_of_birth: String,
}

/// Open session handed to the protected view at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Digest-derived session identifier; never the raw credential.
    pub session_id: String,
    /// Login time in Unix epoch milliseconds.
    pub started_at_ms: u64,
}

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No open session.
    Unauthenticated,
    /// A session is open.
    Authenticated(SessionContext),
}

/// Outcome of the protected-view entry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Caller may construct and render the protected view.
    Proceed,
    /// Caller must navigate to the entry view without rendering anything.
    RedirectToEntry,
}

/// Validates credentials without touching session state.
///
/// # Errors
/// Returns [`SessionError::InvalidIdentifier`] unless the identifier is
/// exactly twelve ASCII digits, and [`SessionError::MissingDateOfBirth`] for a
/// blank date field.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), SessionError> {
    let identifier = credentials.identifier.trim();
    if identifier.len() != IDENTIFIER_DIGITS
        || !identifier.chars().all(|character| character.is_ascii_digit())
    {
        return Err(SessionError::InvalidIdentifier);
    }

    if credentials.date_of_birth.trim().is_empty() {
        return Err(SessionError::MissingDateOfBirth);
    }

    Ok(())
}

/// Owns the single mutable session state for one app instance.
#[derive(Debug, Clone)]
pub struct SessionManager {
    state: SessionState,
}

impl SessionManager {
    /// Creates a manager with no open session.
    pub fn new() -> Self {
        Self {
            state: SessionState::Unauthenticated,
        }
    }

    /// Returns the current session state snapshot.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns `true` when a session is open.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Validates credentials and opens a session.
    ///
    /// A login while a session is already open replaces it; the previous
    /// context becomes unreachable.
    ///
    /// # Errors
    /// Propagates [`validate_credentials`] failures without mutating state.
    pub fn login(
        &mut self,
        credentials: &Credentials,
        now_ms: u64,
    ) -> Result<SessionContext, SessionError> {
        validate_credentials(credentials)?;

        let context = SessionContext {
            session_id: derive_session_id(&credentials.identifier, now_ms),
            started_at_ms: now_ms,
        };
        self.state = SessionState::Authenticated(context.clone());
        Ok(context)
    }

    /// Closes any open session.
    pub fn logout(&mut self) {
        self.state = SessionState::Unauthenticated;
    }

    /// Entry check for the protected view.
    ///
    /// Callers must act on [`GateDecision::RedirectToEntry`] before building
    /// any protected view state; there is no partial render.
    pub fn guard(&self) -> GateDecision {
        if self.is_authenticated() {
            GateDecision::Proceed
        } else {
            GateDecision::RedirectToEntry
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_session_id(identifier: &str, now_ms: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.trim().as_bytes());
    hasher.update(now_ms.to_be_bytes());
    let digest = hasher.finalize();
    // 16 hex chars is plenty for a per-process session id.
    hex_encode(&digest[..8])
}

/// Errors produced by credential validation and session transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Identifier is not exactly twelve digits.
    #[error("identifier must be exactly 12 digits")]
    InvalidIdentifier,
    /// Date of birth field is blank.
    #[error("date of birth must not be empty")]
    MissingDateOfBirth,
}
