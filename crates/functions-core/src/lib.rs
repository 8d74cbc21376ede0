/// Functions Core - shared library for the receivables serverless functions
///
/// This crate contains the Google API clients, email composition and the
/// Lambda/axum plumbing used by the `send-email` and `admin-delete-user`
/// functions.
pub mod app;
pub mod auth;
pub mod config;
pub mod constants;
pub mod email;
pub mod error;
pub mod firestore;
pub mod gmail;
pub mod google;
pub mod identity;
pub mod lambda;
pub mod middleware;
pub mod utils;

// Re-export commonly used types
pub use app::FirebaseApp;
pub use error::FunctionsError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
