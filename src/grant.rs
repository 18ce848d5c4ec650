//! Per-item ownership transfer.

use crate::client::DriveApi;
use crate::error::DriveError;
use crate::models::{DriveItem, Permission, PermissionId};
use crate::prefix::child_path;
use crate::report::{Event, Reporter};
use crate::walk::FileHandler;

/// Message sent to the recipient with a newly inserted owner permission.
pub const TRANSFER_EMAIL_MESSAGE: &str = "Automated recursive transfer of ownership.";

/// What happened to a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The target already owns the item.
    AlreadyOwned,
    /// The authenticated user is not an owner, so it cannot hand ownership over.
    NotOwnedByActingUser,
    /// No permission ID was resolved for the target.
    NoTarget,
    /// Dry run: the item would have been transferred.
    DryRun,
    /// An existing permission was turned into a pending ownership.
    Upgraded,
    /// A new owner permission was created.
    Inserted,
    /// A remote call failed; only this item is affected.
    Failed,
}

/// Counts of outcomes over a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GrantTally {
    pub already_owned: usize,
    pub not_owned: usize,
    pub no_target: usize,
    pub dry_run: usize,
    pub upgraded: usize,
    pub inserted: usize,
    pub failed: usize,
}

impl GrantTally {
    pub fn record(&mut self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::AlreadyOwned => &mut self.already_owned,
            Outcome::NotOwnedByActingUser => &mut self.not_owned,
            Outcome::NoTarget => &mut self.no_target,
            Outcome::DryRun => &mut self.dry_run,
            Outcome::Upgraded => &mut self.upgraded,
            Outcome::Inserted => &mut self.inserted,
            Outcome::Failed => &mut self.failed,
        };
        *counter += 1;
    }

    /// Number of permission mutations that went through.
    pub fn transferred(&self) -> usize {
        self.upgraded + self.inserted
    }
}

impl std::fmt::Display for GrantTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} upgraded, {} created, {} already owned, {} not owned by current user, {} failed",
            self.upgraded, self.inserted, self.already_owned, self.not_owned, self.failed
        )?;
        if self.dry_run > 0 {
            write!(f, ", {} would be transferred", self.dry_run)?;
        }
        if self.no_target > 0 {
            write!(f, ", {} skipped without target", self.no_target)?;
        }
        Ok(())
    }
}

/// Hands ownership of each visited item to one user.
pub struct OwnershipGranter<'a, R: ?Sized> {
    permission_id: Option<PermissionId>,
    show_already_owned: bool,
    dry_run: bool,
    reporter: &'a R,
    tally: GrantTally,
}

impl<'a, R: Reporter + ?Sized> OwnershipGranter<'a, R> {
    pub fn new(permission_id: Option<PermissionId>, reporter: &'a R) -> Self {
        Self {
            permission_id,
            show_already_owned: true,
            dry_run: false,
            reporter,
            tally: GrantTally::default(),
        }
    }

    /// Whether items already owned by the target get a console line.
    pub fn show_already_owned(mut self, show: bool) -> Self {
        self.show_already_owned = show;
        self
    }

    /// Report what would change without mutating anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn tally(&self) -> &GrantTally {
        &self.tally
    }

    /// Transfer ownership of `item`, found in the folder at `path`, to the target.
    ///
    /// Errors are reported and end processing of this item only.
    pub async fn grant_ownership<A: DriveApi>(
        &mut self,
        api: &A,
        item: &DriveItem,
        path: &[String],
    ) -> Outcome {
        let outcome = self.decide_and_apply(api, item, path).await;
        self.tally.record(outcome);
        outcome
    }

    async fn decide_and_apply<A: DriveApi>(
        &self,
        api: &A,
        item: &DriveItem,
        path: &[String],
    ) -> Outcome {
        let full_path = child_path(path, &item.title);

        let Some(permission_id) = self.permission_id.as_ref() else {
            self.reporter.report(Event::NoTarget { path: full_path });
            return Outcome::NoTarget;
        };

        let target_owns = item
            .owners
            .iter()
            .any(|o| o.permission_id.as_deref() == Some(permission_id.as_str()));
        if target_owns {
            if self.show_already_owned {
                self.reporter.report(Event::AlreadyOwned { path: full_path });
            }
            return Outcome::AlreadyOwned;
        }

        self.reporter.report(Event::NeedsOwnership {
            path: full_path.clone(),
        });

        if !item.owners.iter().any(|o| o.is_authenticated_user) {
            self.reporter.report(Event::NotOwnedByActingUser);
            return Outcome::NotOwnedByActingUser;
        }

        if self.dry_run {
            self.reporter.report(Event::WouldTransfer {
                permission_id: permission_id.to_string(),
            });
            return Outcome::DryRun;
        }

        match api.get_permission(&item.id, permission_id).await {
            Ok(mut permission) => {
                permission.propose_ownership();
                self.reporter.report(Event::Upgrading);
                match api
                    .update_permission(&item.id, permission_id, &permission, true)
                    .await
                {
                    Ok(_) => Outcome::Upgraded,
                    Err(e) => self.fail(&full_path, "updating", e),
                }
            }
            Err(e) if e.is_not_found() => {
                self.reporter.report(Event::Creating);
                let permission = Permission::new_owner(permission_id);
                match api
                    .insert_permission(&item.id, &permission, Some(TRANSFER_EMAIL_MESSAGE))
                    .await
                {
                    Ok(_) => Outcome::Inserted,
                    Err(e) => self.fail(&full_path, "inserting", e),
                }
            }
            Err(e) => self.fail(&full_path, "updating", e),
        }
    }

    fn fail(&self, path: &str, action: &'static str, error: DriveError) -> Outcome {
        tracing::warn!(path, action, error = %error, "Ownership change failed");
        self.reporter.report(Event::GrantFailed {
            action,
            message: error.to_string(),
        });
        Outcome::Failed
    }
}

impl<A: DriveApi, R: Reporter + ?Sized> FileHandler<A> for OwnershipGranter<'_, R> {
    async fn on_file(&mut self, api: &A, item: &DriveItem, path: &[String]) {
        self.grant_ownership(api, item, path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_record() {
        let mut tally = GrantTally::default();
        tally.record(Outcome::Upgraded);
        tally.record(Outcome::Inserted);
        tally.record(Outcome::Inserted);
        tally.record(Outcome::Failed);

        assert_eq!(tally.transferred(), 3);
        assert_eq!(tally.failed, 1);
        assert_eq!(
            tally.to_string(),
            "1 upgraded, 2 created, 0 already owned, 0 not owned by current user, 1 failed"
        );
    }

    #[test]
    fn test_tally_display_optional_parts() {
        let mut tally = GrantTally::default();
        tally.record(Outcome::DryRun);
        tally.record(Outcome::NoTarget);
        let text = tally.to_string();
        assert!(text.contains("1 would be transferred"));
        assert!(text.contains("1 skipped without target"));
    }
}
