//! drive_ownership - Recursively hand over ownership of Google Drive files.
//!
//! This library provides functionality to:
//! - Authenticate against the Drive API (installed-app consent, service account, or raw token)
//! - Resolve a user's permission ID from an email address
//! - Walk "My Drive" depth-first, pruning folders outside a path prefix
//! - Propose or create owner permissions for every file under that prefix
//!
//! # Example
//!
//! ```no_run
//! use drive_ownership::{
//!     resolve_permission_id, Authenticator, ConsoleReporter, DriveClient, OwnershipGranter,
//!     PathPrefix, Walker,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = Authenticator::from_file("client_secrets.json")?;
//!     auth.authenticate().await?;
//!     let client = DriveClient::new(auth);
//!
//!     let reporter = ConsoleReporter;
//!     let prefix = PathPrefix::parse("Team/2024");
//!     let permission_id = resolve_permission_id(&client, "new.owner@example.com", &reporter).await;
//!
//!     let mut granter = OwnershipGranter::new(permission_id, &reporter);
//!     Walker::new(&client, &prefix, &reporter).walk(&mut granter).await?;
//!     println!("{}", granter.tally());
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod email;
pub mod error;
pub mod grant;
pub mod models;
pub mod prefix;
pub mod report;
pub mod resolve;
pub mod walk;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::{DriveApi, DriveClient};
pub use email::OwnerEmail;
pub use error::{DriveError, Result};
pub use grant::{GrantTally, Outcome, OwnershipGranter};
pub use models::{DriveItem, Permission, PermissionId};
pub use prefix::PathPrefix;
pub use report::{ConsoleReporter, Event, Reporter};
pub use resolve::resolve_permission_id;
pub use walk::{FileHandler, WalkSummary, Walker};
