//! Google Drive API v2 client for the calls the ownership transfer needs.

use reqwest::{Client, Response, Url};

use crate::auth::Authenticator;
use crate::error::{DriveError, Result};
use crate::models::{
    ApiErrorResponse, ChildList, DriveItem, Permission, PermissionId, PermissionIdResponse,
};

/// Base URL for Google Drive API v2.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v2";

/// The remote operations the walker and the granter depend on.
#[allow(async_fn_in_trait)]
pub trait DriveApi {
    /// One page of the children of a folder.
    async fn list_children(&self, folder_id: &str, page_token: Option<&str>) -> Result<ChildList>;

    /// Full metadata of a file or folder.
    async fn get_file(&self, file_id: &str) -> Result<DriveItem>;

    /// The permission ID the API uses for an email address.
    async fn get_permission_id_for_email(&self, email: &str) -> Result<PermissionId>;

    async fn get_permission(&self, file_id: &str, permission_id: &PermissionId)
        -> Result<Permission>;

    async fn update_permission(
        &self,
        file_id: &str,
        permission_id: &PermissionId,
        permission: &Permission,
        transfer_ownership: bool,
    ) -> Result<Permission>;

    async fn insert_permission(
        &self,
        file_id: &str,
        permission: &Permission,
        email_message: Option<&str>,
    ) -> Result<Permission>;
}

/// Authenticated session against the Drive API.
pub struct DriveClient {
    base_url: String,
    auth: Authenticator,
    http: Client,
}

impl DriveClient {
    /// Create a new DriveClient talking to the public API.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_base_url(auth, DRIVE_API_BASE)
    }

    /// Create a client against another base URL (a mock server in tests).
    pub fn with_base_url(auth: Authenticator, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth,
            http: Client::new(),
        }
    }

    /// Build `<base>/<segments...>` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DriveError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| DriveError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Turn a non-success response into `DriveError::ApiError`.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}

impl DriveApi for DriveClient {
    async fn list_children(&self, folder_id: &str, page_token: Option<&str>) -> Result<ChildList> {
        let token = self.auth.get_access_token().await?;
        let url = self.endpoint(&["files", folder_id, "children"])?;
        tracing::debug!(%url, page_token, "Listing children");

        let mut request = self.http.get(url).bearer_auth(&token);
        if let Some(page_token) = page_token {
            request = request.query(&[("pageToken", page_token)]);
        }

        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn get_file(&self, file_id: &str) -> Result<DriveItem> {
        let token = self.auth.get_access_token().await?;
        let url = self.endpoint(&["files", file_id])?;
        tracing::debug!(%url, "Fetching file metadata");

        let response = self.http.get(url).bearer_auth(&token).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn get_permission_id_for_email(&self, email: &str) -> Result<PermissionId> {
        let token = self.auth.get_access_token().await?;
        let url = self.endpoint(&["permissionIds", email])?;
        tracing::debug!(%url, "Resolving permission ID");

        let response = self.http.get(url).bearer_auth(&token).send().await?;
        let response = check_status(response).await?;
        let id: PermissionIdResponse = response.json().await?;
        Ok(PermissionId::new(id.id))
    }

    async fn get_permission(
        &self,
        file_id: &str,
        permission_id: &PermissionId,
    ) -> Result<Permission> {
        let token = self.auth.get_access_token().await?;
        let url = self.endpoint(&["files", file_id, "permissions", permission_id.as_str()])?;
        tracing::debug!(%url, "Fetching permission");

        let response = self.http.get(url).bearer_auth(&token).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn update_permission(
        &self,
        file_id: &str,
        permission_id: &PermissionId,
        permission: &Permission,
        transfer_ownership: bool,
    ) -> Result<Permission> {
        let token = self.auth.get_access_token().await?;
        let url = self.endpoint(&["files", file_id, "permissions", permission_id.as_str()])?;
        tracing::debug!(%url, transfer_ownership, "Updating permission");

        let response = self
            .http
            .put(url)
            .bearer_auth(&token)
            .query(&[("transferOwnership", transfer_ownership)])
            .json(permission)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn insert_permission(
        &self,
        file_id: &str,
        permission: &Permission,
        email_message: Option<&str>,
    ) -> Result<Permission> {
        let token = self.auth.get_access_token().await?;
        let url = self.endpoint(&["files", file_id, "permissions"])?;
        tracing::debug!(%url, "Inserting permission");

        let mut request = self.http.post(url).bearer_auth(&token).json(permission);
        if let Some(message) = email_message {
            request = request.query(&[("emailMessage", message)]);
        }

        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> DriveClient {
        DriveClient::with_base_url(Authenticator::from_access_token("t"), base)
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let url = client(DRIVE_API_BASE).endpoint(&["files", "root", "children"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/drive/v2/files/root/children"
        );
    }

    #[test]
    fn test_endpoint_on_bare_host() {
        let url = client("http://127.0.0.1:1234").endpoint(&["files", "abc"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:1234/files/abc");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = client(DRIVE_API_BASE)
            .endpoint(&["files", "a b/c"])
            .unwrap();
        assert_eq!(url.path(), "/drive/v2/files/a%20b%2Fc");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(client("not a url").endpoint(&["files"]).is_err());
    }
}
