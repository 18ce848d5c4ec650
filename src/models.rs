//! Data models for Google Drive API v2 responses.

use serde::{Deserialize, Serialize};

/// MIME type Google Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Whether a drive item can have children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Folder,
}

/// Full metadata record for a file or folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub owners: Vec<Owner>,
}

impl DriveItem {
    /// Folder or file, judged by MIME type. The v2 `kind` field reads
    /// `drive#file` for both.
    pub fn item_kind(&self) -> ItemKind {
        match self.mime_type.as_deref() {
            Some(FOLDER_MIME_TYPE) => ItemKind::Folder,
            _ => ItemKind::File,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.item_kind() == ItemKind::Folder
    }
}

/// One entry of a file's `owners` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(default)]
    pub permission_id: Option<String>,
    #[serde(default)]
    pub is_authenticated_user: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Reference to a child returned by `files/{id}/children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildReference {
    pub id: String,
}

/// One page of a folder listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildList {
    #[serde(default)]
    pub items: Vec<ChildReference>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ChildList {
    /// The token for the next page, ignoring the empty string some responses carry.
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Opaque identifier of a user in the permission namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionId(String);

impl PermissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response from the `permissionIds/{email}` endpoint.
#[derive(Debug, Deserialize)]
pub struct PermissionIdResponse {
    pub id: String,
}

/// A permission record on a file.
///
/// Fields the tool does not touch are kept in `extra` so that an update
/// sends them back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub grantee_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_owner: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Permission {
    /// A fresh owner permission for a user.
    pub fn new_owner(permission_id: &PermissionId) -> Self {
        Self {
            id: Some(permission_id.as_str().to_string()),
            role: Some("owner".to_string()),
            grantee_type: Some("user".to_string()),
            ..Default::default()
        }
    }

    /// Turn an existing grant into a pending ownership transfer.
    pub fn propose_ownership(&mut self) {
        self.role = Some("writer".to_string());
        self.pending_owner = Some(true);
    }
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Service account credentials from JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// OAuth client definition from a `client_secrets.json` download.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Wrapper object of a client secrets file.
#[derive(Debug, Deserialize)]
pub struct ClientSecretsFile {
    pub installed: Option<OAuthClientSecrets>,
    pub web: Option<OAuthClientSecrets>,
}

/// Either kind of credentials file accepted on the command line.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CredentialsFile {
    ServiceAccount(ServiceAccountCredentials),
    ClientSecrets(ClientSecretsFile),
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}
