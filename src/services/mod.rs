pub mod classifier;
pub mod credential_store;
pub mod form_encoder;
pub mod session_service;

pub use classifier::{ResponseClassifier, Verdict};
pub use credential_store::CredentialStore;
pub use session_service::{SessionExpiry, SessionManager, WarmupReport};
