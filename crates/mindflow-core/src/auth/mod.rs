//! Authentication domain: state machine, outcomes, and the credential port.

pub mod model;
pub mod repository;

pub use model::{AuthPhase, RegisterOutcome};
pub use repository::CredentialRepository;
