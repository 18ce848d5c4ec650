//! In-memory drive used by the walk and grant tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use drive_ownership::models::{ChildList, ChildReference, Owner, FOLDER_MIME_TYPE};
use drive_ownership::{DriveApi, DriveError, DriveItem, Permission, PermissionId, Result};

/// A remote call the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListChildren { folder_id: String, page_token: Option<String> },
    GetFile(String),
    GetPermissionId(String),
    GetPermission { file_id: String, permission_id: String },
    UpdatePermission { file_id: String, permission: Permission, transfer_ownership: bool },
    InsertPermission { file_id: String, permission: Permission, email_message: Option<String> },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::UpdatePermission { .. } | Call::InsertPermission { .. })
    }
}

#[derive(Default)]
pub struct FakeDrive {
    items: HashMap<String, DriveItem>,
    children: HashMap<String, Vec<String>>,
    permissions: HashMap<(String, String), Permission>,
    emails: HashMap<String, String>,
    page_size: Option<usize>,
    failing: HashMap<String, u16>,
    calls: RefCell<Vec<Call>>,
}

pub fn api_error(status: u16, message: &str) -> DriveError {
    DriveError::ApiError {
        status,
        message: message.to_string(),
    }
}

pub fn owner(permission_id: &str, is_authenticated_user: bool) -> Owner {
    Owner {
        permission_id: Some(permission_id.to_string()),
        is_authenticated_user,
        display_name: None,
        email_address: None,
    }
}

pub fn file(id: &str, title: &str, owners: Vec<Owner>) -> DriveItem {
    DriveItem {
        id: id.to_string(),
        title: title.to_string(),
        kind: Some("drive#file".to_string()),
        mime_type: Some("application/pdf".to_string()),
        owners,
    }
}

pub fn folder(id: &str, title: &str) -> DriveItem {
    DriveItem {
        id: id.to_string(),
        title: title.to_string(),
        kind: Some("drive#file".to_string()),
        mime_type: Some(FOLDER_MIME_TYPE.to_string()),
        owners: vec![owner("me", true)],
    }
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `item` inside `parent` ("root" for the top level).
    pub fn add(&mut self, parent: &str, item: DriveItem) -> &mut Self {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(item.id.clone());
        self.items.insert(item.id.clone(), item);
        self
    }

    pub fn add_email(&mut self, email: &str, permission_id: &str) -> &mut Self {
        self.emails.insert(email.to_string(), permission_id.to_string());
        self
    }

    pub fn add_permission(&mut self, file_id: &str, permission: Permission) -> &mut Self {
        let id = permission.id.clone().unwrap_or_default();
        self.permissions.insert((file_id.to_string(), id), permission);
        self
    }

    /// Split listings into pages of `size` children.
    pub fn page_size(&mut self, size: usize) -> &mut Self {
        self.page_size = Some(size);
        self
    }

    /// Make a call fail with `status`.
    ///
    /// Keys are a file ID for metadata fetches, or `list:`, `get:`, `update:`
    /// and `insert:` followed by the ID for the other calls.
    pub fn fail_on(&mut self, id: &str, status: u16) -> &mut Self {
        self.failing.insert(id.to_string(), status);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn listed_folders(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ListChildren { folder_id, page_token: None } => Some(folder_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, id: &str) -> Result<()> {
        match self.failing.get(id) {
            Some(status) => Err(api_error(*status, "injected failure")),
            None => Ok(()),
        }
    }
}

impl DriveApi for FakeDrive {
    async fn list_children(&self, folder_id: &str, page_token: Option<&str>) -> Result<ChildList> {
        self.record(Call::ListChildren {
            folder_id: folder_id.to_string(),
            page_token: page_token.map(str::to_string),
        });
        self.check(&format!("list:{}", folder_id))?;

        let all = self.children.get(folder_id).cloned().unwrap_or_default();
        let start: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let size = self.page_size.unwrap_or(all.len().max(1));
        let end = (start + size).min(all.len());

        Ok(ChildList {
            items: all[start..end]
                .iter()
                .map(|id| ChildReference { id: id.clone() })
                .collect(),
            next_page_token: (end < all.len()).then(|| end.to_string()),
        })
    }

    async fn get_file(&self, file_id: &str) -> Result<DriveItem> {
        self.record(Call::GetFile(file_id.to_string()));
        self.check(file_id)?;
        self.items
            .get(file_id)
            .cloned()
            .ok_or_else(|| api_error(404, "File not found"))
    }

    async fn get_permission_id_for_email(&self, email: &str) -> Result<PermissionId> {
        self.record(Call::GetPermissionId(email.to_string()));
        self.emails
            .get(email)
            .map(|id| PermissionId::new(id.as_str()))
            .ok_or_else(|| api_error(404, "User not found"))
    }

    async fn get_permission(
        &self,
        file_id: &str,
        permission_id: &PermissionId,
    ) -> Result<Permission> {
        self.record(Call::GetPermission {
            file_id: file_id.to_string(),
            permission_id: permission_id.to_string(),
        });
        self.check(&format!("get:{}", file_id))?;
        self.permissions
            .get(&(file_id.to_string(), permission_id.to_string()))
            .cloned()
            .ok_or_else(|| api_error(404, "Permission not found"))
    }

    async fn update_permission(
        &self,
        file_id: &str,
        _permission_id: &PermissionId,
        permission: &Permission,
        transfer_ownership: bool,
    ) -> Result<Permission> {
        self.record(Call::UpdatePermission {
            file_id: file_id.to_string(),
            permission: permission.clone(),
            transfer_ownership,
        });
        self.check(&format!("update:{}", file_id))?;
        Ok(permission.clone())
    }

    async fn insert_permission(
        &self,
        file_id: &str,
        permission: &Permission,
        email_message: Option<&str>,
    ) -> Result<Permission> {
        self.record(Call::InsertPermission {
            file_id: file_id.to_string(),
            permission: permission.clone(),
            email_message: email_message.map(str::to_string),
        });
        self.check(&format!("insert:{}", file_id))?;
        Ok(permission.clone())
    }
}
