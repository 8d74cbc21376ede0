/// Application constants
///
/// Fixed endpoints, scopes and defaults shared by both functions.
use std::time::Duration;

// ============================================================================
// Gmail / OAuth2
// ============================================================================
/// Google OAuth2 token endpoint used for the refresh-token flow
pub const GMAIL_TOKEN_URI: &str = "https://accounts.google.com/o/oauth2/token";

/// Send-only Gmail scope
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

/// Gmail REST API base URL
pub const GMAIL_API_BASE_URL: &str = "https://gmail.googleapis.com";

/// Gmail user id / sender alias for the authenticated account
pub const GMAIL_USER_ME: &str = "me";

// ============================================================================
// Firebase
// ============================================================================

/// Firestore REST API base URL
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

/// Identity Toolkit (Firebase Auth admin) REST API base URL
pub const IDENTITY_TOOLKIT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Public keys used to sign Firebase ID tokens
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Minimum time between two signing key downloads caused by unknown key ids
pub const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Issuer prefix of Firebase ID tokens; the project id is appended
pub const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Scopes requested for the service account access token
pub const SERVICE_ACCOUNT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/identitytoolkit",
];

/// Lifetime of the signed JWT-bearer assertion in seconds
pub const SERVICE_ACCOUNT_ASSERTION_TTL_SECONDS: i64 = 3600;

/// Tenant used when the caller's ID token has no `app_id` claim
pub const DEFAULT_APP_ID: &str = "receivabled";

/// Role value that grants user deletion
pub const ADMIN_ROLE: &str = "admin";

// ============================================================================
// Attachments
// ============================================================================

/// Filename used when the request does not name the attachment
pub const DEFAULT_ATTACHMENT_FILENAME: &str = "attachment.pdf";

/// MIME type used when the request does not give one
pub const DEFAULT_ATTACHMENT_MIME_TYPE: &str = "application/octet-stream";

// ============================================================================
// HTTP
// ============================================================================

/// Value of `Access-Control-Allow-Origin` on every send-email response
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// Preflight cache lifetime in seconds
pub const CORS_MAX_AGE_SECONDS: u64 = 3600;

/// Maximum request body accepted by the functions (10 MB)
pub const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_GMAIL_CLIENT_ID: &str = "GMAIL_CLIENT_ID";
pub const ENV_GMAIL_CLIENT_SECRET: &str = "GMAIL_CLIENT_SECRET";
pub const ENV_GMAIL_REFRESH_TOKEN: &str = "GMAIL_REFRESH_TOKEN";
pub const ENV_GMAIL_TOKEN_URI: &str = "GMAIL_TOKEN_URI";
pub const ENV_GMAIL_API_BASE_URL: &str = "GMAIL_API_BASE_URL";
pub const ENV_GOOGLE_CLOUD_PROJECT: &str = "GOOGLE_CLOUD_PROJECT";
pub const ENV_GOOGLE_SERVICE_ACCOUNT_JSON: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";
pub const ENV_FIREBASE_JWKS_JSON: &str = "FIREBASE_JWKS_JSON";
pub const ENV_FIREBASE_JWKS_URL: &str = "FIREBASE_JWKS_URL";
pub const ENV_FIRESTORE_BASE_URL: &str = "FIRESTORE_BASE_URL";
pub const ENV_IDENTITY_TOOLKIT_BASE_URL: &str = "IDENTITY_TOOLKIT_BASE_URL";
pub const ENV_REQUIRE_APP_ID_CLAIM: &str = "REQUIRE_APP_ID_CLAIM";
