//! Authentication domain models.

use serde::{Deserialize, Serialize};

/// The client-side authentication state machine.
///
/// ```text
/// Anonymous --register(ok)-------------------> Authenticated
/// Anonymous --register(confirmationRequired)-> AwaitingConfirmation
/// AwaitingConfirmation --login(ok)-----------> Authenticated
/// Anonymous --login(ok)----------------------> Authenticated
/// Authenticated --logout/deactivate----------> Anonymous
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthPhase {
    /// No user is signed in.
    #[default]
    Anonymous,
    /// Registration succeeded but an external confirmation step (e.g. a
    /// confirmation email) is still pending. Not signed in.
    AwaitingConfirmation,
    /// A user session is active.
    Authenticated,
}

/// The outcome of a successful registration.
///
/// Cloud registration has a third terminal state distinct from success and
/// failure: the account exists but cannot sign in until the identity is
/// confirmed out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Registered and signed in.
    SignedIn,
    /// Registered; confirmation pending. The caller is not signed in.
    ConfirmationRequired,
}
