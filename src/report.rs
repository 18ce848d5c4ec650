//! Progress lines printed while walking and granting.

use std::cell::RefCell;
use std::fmt;

/// Something the operator should see on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Listing { path: String },
    File { path: String, id: String },
    IgnoredFolder { path: String, id: String },
    RevisitedFolder { path: String, id: String },
    LookupFailed { email: String, message: String },
    AlreadyOwned { path: String },
    NeedsOwnership { path: String },
    NoTarget { path: String },
    NotOwnedByActingUser,
    WouldTransfer { permission_id: String },
    Upgrading,
    Creating,
    GrantFailed { action: &'static str, message: String },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Listing { path } => write!(f, "Listing: {} ...", path),
            Event::File { path, id } => write!(f, "File: {} ({})", path, id),
            Event::IgnoredFolder { path, id } => write!(f, "Ignore folder: {} ({})", path, id),
            Event::RevisitedFolder { path, id } => {
                write!(f, "Folder already visited, skipping: {} ({})", path, id)
            }
            Event::LookupFailed { email, message } => {
                write!(f, "Could not resolve permission ID for {}: {}", email, message)
            }
            Event::AlreadyOwned { path } => write!(f, "Item {} already has the right owner.", path),
            Event::NeedsOwnership { path } => write!(f, "Item {} needs ownership granted.", path),
            Event::NoTarget { path } => {
                write!(f, "Item {} skipped: new owner has no permission ID.", path)
            }
            Event::NotOwnedByActingUser => {
                write!(f, "    But, current user does not own the item.")
            }
            Event::WouldTransfer { permission_id } => {
                write!(f, "    Would set new owner to {}.", permission_id)
            }
            Event::Upgrading => write!(f, "    Upgrading existing permissions to ownership."),
            Event::Creating => write!(f, "    Creating new ownership permissions."),
            Event::GrantFailed { action, message } => write!(
                f,
                "    An error occurred {} ownership permissions: {}",
                action, message
            ),
        }
    }
}

/// Receives progress events.
pub trait Reporter {
    fn report(&self, event: Event);
}

/// Prints every event on its own line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, event: Event) {
        println!("{}", event);
    }
}

/// Collects events in memory.
impl Reporter for RefCell<Vec<Event>> {
    fn report(&self, event: Event) {
        self.borrow_mut().push(event);
    }
}
