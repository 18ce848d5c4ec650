//! drive_ownership CLI - Transfer ownership of every file under a Drive path.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use drive_ownership::walk::ROOT_FOLDER_ID;
use drive_ownership::{
    resolve_permission_id, Authenticator, ConsoleReporter, DriveClient, OwnerEmail,
    OwnershipGranter, PathPrefix, Walker,
};

/// Recursively transfer ownership of Google Drive files under a path to another user.
#[derive(Parser, Debug)]
#[command(name = "drive_ownership")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Minimum folder path, e.g. "Team/2024". Only files below it are processed.
    path: String,

    /// Email address of the new owner.
    new_owner: OwnerEmail,

    /// Print items that already belong to the new owner (true or false).
    #[arg(default_value_t = true, action = ArgAction::Set)]
    show_already_owned: bool,

    /// OAuth client secrets or service account key file.
    #[arg(long, env = "GOOGLE_CLIENT_SECRETS", default_value = "client_secrets.json")]
    credentials: PathBuf,

    /// User to impersonate when the credentials are a service account key.
    #[arg(long, env = "GOOGLE_IMPERSONATE_SUBJECT")]
    subject: Option<String>,

    /// Use this access token instead of a credentials file.
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Drive API v2 base URL.
    #[arg(long, env = "DRIVE_API_BASE", hide = true)]
    api_base: Option<String>,

    /// Folder ID to start from instead of the top of "My Drive".
    #[arg(long, default_value = ROOT_FOLDER_ID)]
    root: String,

    /// Show what would be transferred without changing any permission.
    #[arg(long)]
    dry_run: bool,

    /// Transfer folders under the path as well as files.
    #[arg(long)]
    include_folders: bool,

    /// Allow an empty path, which selects the entire drive.
    #[arg(long)]
    whole_drive: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let prefix = PathPrefix::parse(&cli.path);
    if prefix.is_empty() && !cli.whole_drive {
        Cli::command()
            .error(
                ErrorKind::ValueValidation,
                "the path is empty and would select the entire drive; pass --whole-drive to confirm",
            )
            .exit();
    }

    println!(
        "Changing all files at path \"{}\" to owner \"{}\"",
        cli.path, cli.new_owner
    );
    println!("Prefix: {}", prefix);

    let auth = build_authenticator(&cli)?;
    auth.authenticate().await.context("Authentication failed")?;

    let client = match &cli.api_base {
        Some(base) => DriveClient::with_base_url(auth, base.as_str()),
        None => DriveClient::new(auth),
    };
    let reporter = ConsoleReporter;

    let permission_id = resolve_permission_id(&client, cli.new_owner.as_str(), &reporter).await;
    match &permission_id {
        Some(id) => println!("User {} is permission ID {}.", cli.new_owner, id),
        None => println!(
            "User {} has no permission ID; no ownership will be changed.",
            cli.new_owner
        ),
    }

    let mut granter = OwnershipGranter::new(permission_id, &reporter)
        .show_already_owned(cli.show_already_owned)
        .dry_run(cli.dry_run);
    let walker = Walker::new(&client, &prefix, &reporter).include_folders(cli.include_folders);

    match walker.walk_from(&cli.root, &mut granter).await {
        Ok(summary) => println!(
            "Listed {} folder(s), ignored {}, matched {} item(s).",
            summary.folders_listed, summary.folders_ignored, summary.files_matched
        ),
        Err(e) => {
            tracing::error!(error = %e, "Walk aborted");
            eprintln!("An error occurred: {}", e);
        }
    }

    println!("Ownership changes: {}", granter.tally());
    println!(
        "Go to https://drive.google.com/drive/search?q=pendingowner:me (as {}), select all files, click 'Share' and accept ownership.",
        cli.new_owner
    );

    Ok(())
}

fn build_authenticator(cli: &Cli) -> Result<Authenticator> {
    if let Some(token) = &cli.access_token {
        return Ok(Authenticator::from_access_token(token.as_str()));
    }

    let auth = Authenticator::from_file(&cli.credentials)
        .with_context(|| format!("Failed to load credentials from {:?}", cli.credentials))?;
    Ok(match &cli.subject {
        Some(subject) => auth.with_subject(subject.as_str()),
        None => auth,
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_positional_arguments() {
        let cli = Cli::try_parse_from(["drive_ownership", "Team/2024", "new.owner@example.com"])
            .unwrap();
        assert_eq!(cli.path, "Team/2024");
        assert_eq!(cli.new_owner.as_str(), "new.owner@example.com");
        assert!(cli.show_already_owned);
        assert_eq!(cli.root, ROOT_FOLDER_ID);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_show_already_owned_false() {
        let cli = Cli::try_parse_from([
            "drive_ownership",
            "Team",
            "new.owner@example.com",
            "false",
        ])
        .unwrap();
        assert!(!cli.show_already_owned);
    }

    #[test]
    fn test_cli_missing_arguments() {
        let err = Cli::try_parse_from(["drive_ownership", "Team"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_rejects_bad_email() {
        let err = Cli::try_parse_from(["drive_ownership", "Team", "not-an-email"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "drive_ownership",
            "--dry-run",
            "--include-folders",
            "--root",
            "folder123",
            "-vv",
            "Team",
            "new.owner@example.com",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert!(cli.include_folders);
        assert_eq!(cli.root, "folder123");
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_build_authenticator_prefers_access_token() {
        let cli = Cli::try_parse_from([
            "drive_ownership",
            "--access-token",
            "ya29.token",
            "--credentials",
            "/nonexistent/client_secrets.json",
            "Team",
            "new.owner@example.com",
        ])
        .unwrap();
        assert!(build_authenticator(&cli).is_ok());
    }

    #[test]
    fn test_build_authenticator_missing_file() {
        let mut cli = Cli::try_parse_from([
            "drive_ownership",
            "--credentials",
            "/nonexistent/client_secrets.json",
            "Team",
            "new.owner@example.com",
        ])
        .unwrap();
        // GOOGLE_OAUTH_ACCESS_TOKEN may be set in the environment
        cli.access_token = None;

        let err = build_authenticator(&cli).err().unwrap();
        assert!(err.to_string().contains("Failed to load credentials"));
    }

    #[test]
    fn test_cli_accepts_dotless_email_domain() {
        let cli = Cli::try_parse_from(["drive_ownership", "Team", "ops@localhost"]).unwrap();
        assert_eq!(cli.new_owner.as_str(), "ops@localhost");
    }
}
