//! SharePoint / Microsoft Graph model types.

use serde::{Deserialize, Serialize};

/// A resolved SharePoint site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Composite site ID used by all subsequent Graph calls.
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A document library (Graph "drive") within a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Usually `documentLibrary`.
    #[serde(default)]
    pub drive_type: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A file or folder in a document library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub web_url: Option<String>,
    /// Present iff the item is a folder.
    #[serde(default)]
    pub folder: Option<FolderFacet>,
    /// Present iff the item is a file.
    #[serde(default)]
    pub file: Option<FileFacet>,
}

impl DriveItem {
    /// True when the item is a folder.
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

/// Folder facet of a [`DriveItem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    #[serde(default)]
    pub child_count: Option<u64>,
}

/// File facet of a [`DriveItem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// A directory (Azure AD) user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

/// The kind of principal a role assignment binds.
///
/// SharePoint encodes this as an integer; the raw code stays at the boundary
/// and never flows through the aggregation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    /// Directly assigned user (code 1).
    User,
    /// Azure AD security group (code 4).
    SecurityGroup,
    /// Site-local SharePoint group (code 8).
    SiteGroup,
}

impl PrincipalKind {
    /// Map the SharePoint `PrincipalType` code. Unknown codes yield `None`
    /// and are ignored by the aggregation.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::User),
            4 => Some(Self::SecurityGroup),
            8 => Some(Self::SiteGroup),
            _ => None,
        }
    }
}

/// One role assignment contributing to a user's effective permissions.
#[derive(Debug, Clone, Serialize)]
pub struct RoleAssignment {
    pub principal_id: Option<i64>,
    pub principal_kind: PrincipalKind,
    pub principal_title: Option<String>,
    pub principal_login_name: Option<String>,
    /// Object ID of the matched security group; set only for
    /// [`PrincipalKind::SecurityGroup`].
    pub directory_group_id: Option<String>,
    /// Role names bound to this principal.
    pub roles: Vec<String>,
}

/// The user a permission report was generated for.
#[derive(Debug, Clone, Serialize)]
pub struct ReportUser {
    /// Normalized (lower-cased, trimmed) email the lookup was keyed by.
    pub email: String,
    pub id: String,
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
}

/// The site a permission report covers.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSite {
    pub hostname: String,
    /// Normalized server-relative path: single leading slash, no trailing one.
    pub site_path: String,
}

/// Effective SharePoint permissions of one user on one site.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionReport {
    pub user: ReportUser,
    pub site: ReportSite,
    /// Sorted, deduplicated union of role names across all assignments.
    pub effective_roles: Vec<String>,
    /// Assignments where the user is the principal directly.
    pub direct_assignments: Vec<RoleAssignment>,
    /// Assignments gained through a SharePoint group or a security group.
    pub group_assignments: Vec<RoleAssignment>,
    /// True iff `effective_roles` is non-empty.
    pub has_access: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_kind_codes() {
        assert_eq!(PrincipalKind::from_code(1), Some(PrincipalKind::User));
        assert_eq!(PrincipalKind::from_code(4), Some(PrincipalKind::SecurityGroup));
        assert_eq!(PrincipalKind::from_code(8), Some(PrincipalKind::SiteGroup));
        assert_eq!(PrincipalKind::from_code(2), None);
        assert_eq!(PrincipalKind::from_code(0), None);
    }

    #[test]
    fn test_drive_item_facets() {
        let folder: DriveItem = serde_json::from_value(serde_json::json!({
            "id": "1", "name": "Reports", "folder": {"childCount": 3}
        }))
        .unwrap();
        assert!(folder.is_folder());

        let file: DriveItem = serde_json::from_value(serde_json::json!({
            "id": "2", "name": "q1.xlsx", "size": 1024,
            "file": {"mimeType": "application/vnd.ms-excel"}
        }))
        .unwrap();
        assert!(!file.is_folder());
        assert_eq!(file.size, Some(1024));
    }
}
