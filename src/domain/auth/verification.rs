use serde::{Deserialize, Serialize};

/// A registration awaiting its emailed verification code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Why a verification attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    /// No pending registration exists for the email, or it expired.
    Missing,
    Mismatch,
}
