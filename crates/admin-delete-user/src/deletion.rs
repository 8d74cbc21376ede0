/// Administrator-only user deletion
use crate::callable::{CallableError, CallableRequest};
use functions_core::constants::DEFAULT_APP_ID;
use functions_core::firestore::RoleStore;
use functions_core::identity::AccountDeleter;
use serde_json::Value;
use tracing::{error, info, warn};

pub const DELETED_MESSAGE: &str = "User deleted successfully";

/// Claim naming the caller's tenant
pub const APP_ID_CLAIM: &str = "app_id";

/// Payload of the deletion call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeletionRequest {
    pub uid: Option<String>,
}

impl DeletionRequest {
    /// Reads `uid` from the callable data; anything that is not a
    /// non-empty string counts as missing
    pub fn from_data(data: &Value) -> Self {
        Self {
            uid: data
                .get("uid")
                .and_then(Value::as_str)
                .filter(|uid| !uid.is_empty())
                .map(str::to_string),
        }
    }
}

/// Options that change how the caller's tenant is resolved
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionPolicy {
    /// Refuse callers whose token has no `app_id` claim
    pub require_app_id_claim: bool,
}

/// Tenant of the caller
///
/// A present `app_id` claim must be a non-empty string. Only a token
/// without the claim falls back to the default tenant, and only when the
/// policy allows it.
fn resolve_app_id(
    request: &CallableRequest,
    policy: DeletionPolicy,
) -> Result<String, CallableError> {
    let claim = request
        .auth
        .as_ref()
        .and_then(|auth| auth.token.extra.get(APP_ID_CLAIM));

    match claim {
        Some(Value::String(app_id)) if !app_id.is_empty() => Ok(app_id.clone()),
        Some(invalid) => {
            warn!(claim = %invalid, "Caller token has an invalid app_id claim, refusing");
            Err(CallableError::permission_denied(
                "Only administrators are allowed to delete users.",
            ))
        }
        None if policy.require_app_id_claim => {
            warn!("Caller token has no app_id claim, refusing");
            Err(CallableError::permission_denied(
                "Only administrators are allowed to delete users.",
            ))
        }
        None => {
            warn!(
                app_id = %DEFAULT_APP_ID,
                "Caller token has no app_id claim, using the default tenant"
            );
            Ok(DEFAULT_APP_ID.to_string())
        }
    }
}

/// Deletes the account named by `uid` on behalf of a tenant administrator
///
/// The caller's role is checked before the payload is looked at.
pub async fn delete_user(
    request: &CallableRequest,
    roles: &dyn RoleStore,
    accounts: &dyn AccountDeleter,
    policy: DeletionPolicy,
) -> Result<String, CallableError> {
    let Some(auth) = request.auth.as_ref() else {
        warn!("Delete user called without authentication");
        return Err(CallableError::unauthenticated(
            "The function must be called while authenticated.",
        ));
    };
    let caller_uid = auth.uid.as_str();

    let app_id = resolve_app_id(request, policy)?;

    let record = roles
        .authorization_record(&app_id, caller_uid)
        .await
        .map_err(|e| {
            error!(
                caller_uid = %caller_uid,
                app_id = %app_id,
                error = %e,
                "Failed to read caller authorization record"
            );
            CallableError::internal(format!("Failed to verify caller permissions: {}", e))
        })?;

    if !record.is_some_and(|record| record.is_admin()) {
        warn!(
            caller_uid = %caller_uid,
            app_id = %app_id,
            "Non-admin caller attempted to delete a user"
        );
        return Err(CallableError::permission_denied(
            "Only administrators are allowed to delete users.",
        ));
    }

    let deletion = DeletionRequest::from_data(&request.data);
    let Some(target_uid) = deletion.uid else {
        return Err(CallableError::invalid_argument(
            "User ID (uid) is required in the request.",
        ));
    };

    if target_uid == caller_uid {
        warn!(caller_uid = %caller_uid, "Administrator attempted to delete their own account");
        return Err(CallableError::permission_denied(
            "An administrator cannot delete their own user account via this function.",
        ));
    }

    info!(
        caller_uid = %caller_uid,
        target_uid = %target_uid,
        app_id = %app_id,
        "Deleting user"
    );

    accounts.delete_user(&target_uid).await.map_err(|e| {
        error!(
            caller_uid = %caller_uid,
            target_uid = %target_uid,
            error = %e,
            "Error deleting user"
        );
        CallableError::internal(format!("Failed to delete user: {}", e))
    })?;

    info!(
        caller_uid = %caller_uid,
        target_uid = %target_uid,
        app_id = %app_id,
        "User deleted"
    );
    Ok(DELETED_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deletion_request_from_data() {
        assert_eq!(
            DeletionRequest::from_data(&json!({"uid": "user-7"})).uid.as_deref(),
            Some("user-7")
        );
        assert_eq!(DeletionRequest::from_data(&json!({"uid": ""})).uid, None);
        assert_eq!(DeletionRequest::from_data(&json!({"uid": 7})).uid, None);
        assert_eq!(DeletionRequest::from_data(&json!({})).uid, None);
        assert_eq!(DeletionRequest::from_data(&Value::Null).uid, None);
    }
}
