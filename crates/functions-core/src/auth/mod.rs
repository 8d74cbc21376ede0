/// Authentication: service account tokens for Google APIs and Firebase ID
/// token verification for callers
pub mod id_token;
pub mod service_account;

pub use id_token::{IdTokenClaims, IdTokenVerifier};
pub use service_account::{
    AccessTokenSource, ServiceAccountKey, ServiceAccountTokenSource, StaticTokenSource,
};
