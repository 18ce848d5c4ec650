//! Mapping the new owner's email to a permission ID.

use crate::client::DriveApi;
use crate::models::PermissionId;
use crate::report::{Event, Reporter};

/// Look up the permission ID of `email`.
///
/// Failures are reported and yield `None`; with no ID no item ever matches,
/// so the walk still runs but mutates nothing.
pub async fn resolve_permission_id<A, R>(api: &A, email: &str, reporter: &R) -> Option<PermissionId>
where
    A: DriveApi,
    R: Reporter + ?Sized,
{
    match api.get_permission_id_for_email(email).await {
        Ok(id) => {
            tracing::info!(email, permission_id = %id, "Resolved permission ID");
            Some(id)
        }
        Err(e) => {
            tracing::warn!(email, error = %e, "Permission ID lookup failed");
            reporter.report(Event::LookupFailed {
                email: email.to_string(),
                message: e.to_string(),
            });
            None
        }
    }
}
