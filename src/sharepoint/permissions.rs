//! Effective-permission inspection for a user on a SharePoint site.
//!
//! Graph does not expose SharePoint role assignments, so the aggregation
//! combines three sources: direct user assignments and site-group
//! memberships read from the SharePoint REST API, and security-group
//! memberships resolved through the user's transitive Graph group set.
//! Principal kinds arrive as integer codes and are mapped to
//! [`PrincipalKind`] at the boundary; unknown codes are ignored.

use std::collections::BTreeSet;
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::sharepoint::error::{Result, SharePointError};
use crate::sharepoint::http::{GraphClient, RestClient};
use crate::sharepoint::models::{
    DirectoryUser, PermissionReport, PrincipalKind, ReportSite, ReportUser, RoleAssignment,
};

static GUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})")
        .expect("GUID pattern compiles")
});

/// Compute the effective permissions of `user_email` on the given site.
///
/// The aggregation is atomic: any failed lookup fails the whole call and no
/// partial report is returned.
///
/// Known fidelity limitation: direct-user and site-group matching compares
/// the normalized email textually (equality or substring) against login
/// names and titles, because site principal naming is opaque. Short or
/// common display names can in principle produce false positives.
#[tracing::instrument(skip(graph, rest))]
pub(crate) async fn get_user_site_permissions(
    graph: &GraphClient,
    rest: &RestClient,
    user_email: &str,
    hostname: &str,
    site_path: &str,
) -> Result<PermissionReport> {
    let email = user_email.trim().to_lowercase();
    let path = normalize_site_path(site_path)?;

    let assignments = rest
        .get_list(
            &path,
            "/_api/web/roleassignments\
             ?$expand=Member,RoleDefinitionBindings\
             &$select=PrincipalId,Member/Id,Member/Title,Member/LoginName,\
             Member/PrincipalType,RoleDefinitionBindings/Name",
        )
        .await?;

    let user: DirectoryUser = graph
        .get(&format!(
            "/users/{email}?$select=id,displayName,mail,userPrincipalName"
        ))
        .await?;
    let directory_group_ids = transitive_group_ids(graph, &user.id).await?;

    let mut direct = Vec::new();
    let mut via_group = Vec::new();

    for assignment in &assignments {
        let member = assignment.get("Member").cloned().unwrap_or(Value::Null);
        let code = member
            .get("PrincipalType")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let Some(kind) = PrincipalKind::from_code(code) else {
            continue;
        };
        let principal_id = assignment
            .get("PrincipalId")
            .and_then(Value::as_i64)
            .or_else(|| member.get("Id").and_then(Value::as_i64));
        let title = str_field(&member, "Title");
        let login_name = str_field(&member, "LoginName");
        let roles = extract_role_names(assignment);

        match kind {
            PrincipalKind::User => {
                if matches_user(login_name.as_deref(), title.as_deref(), &email) {
                    direct.push(RoleAssignment {
                        principal_id,
                        principal_kind: kind,
                        principal_title: title,
                        principal_login_name: login_name,
                        directory_group_id: None,
                        roles,
                    });
                }
            }
            PrincipalKind::SiteGroup => {
                let Some(group_id) = principal_id else {
                    continue;
                };
                if user_in_site_group(rest, &path, group_id, &email).await? {
                    via_group.push(RoleAssignment {
                        principal_id,
                        principal_kind: kind,
                        principal_title: title,
                        principal_login_name: login_name,
                        directory_group_id: None,
                        roles,
                    });
                }
            }
            PrincipalKind::SecurityGroup => {
                let object_id = login_name.as_deref().and_then(extract_guid);
                if let Some(object_id) = object_id {
                    if directory_group_ids.contains(&object_id) {
                        via_group.push(RoleAssignment {
                            principal_id,
                            principal_kind: kind,
                            principal_title: title,
                            principal_login_name: login_name,
                            directory_group_id: Some(object_id),
                            roles,
                        });
                    }
                }
            }
        }
    }

    let effective_roles = collect_effective_roles(&direct, &via_group);
    let has_access = !effective_roles.is_empty();

    Ok(PermissionReport {
        user: ReportUser {
            email,
            id: user.id,
            display_name: user.display_name,
            user_principal_name: user.user_principal_name,
        },
        site: ReportSite {
            hostname: hostname.to_string(),
            site_path: path,
        },
        effective_roles,
        direct_assignments: direct,
        group_assignments: via_group,
        has_access,
    })
}

/// Fetch the user's full transitive directory-group membership.
async fn transitive_group_ids(graph: &GraphClient, user_id: &str) -> Result<HashSet<String>> {
    #[derive(serde::Deserialize)]
    struct GroupId {
        id: String,
    }
    let groups: Vec<GroupId> = graph
        .get_paged(&format!(
            "/users/{user_id}/transitiveMemberOf/microsoft.graph.group?$select=id"
        ))
        .await?;
    Ok(groups.into_iter().map(|g| g.id.to_lowercase()).collect())
}

/// Check whether a member list of a site-local group contains the user.
async fn user_in_site_group(
    rest: &RestClient,
    site_path: &str,
    group_id: i64,
    user_email: &str,
) -> Result<bool> {
    let members = rest
        .get_list(
            site_path,
            &format!("/_api/web/sitegroups({group_id})/users?$select=Id,Email,LoginName,Title"),
        )
        .await?;
    Ok(members.iter().any(|member| {
        let email = str_field(member, "Email").unwrap_or_default().to_lowercase();
        let login = str_field(member, "LoginName")
            .unwrap_or_default()
            .to_lowercase();
        let title = str_field(member, "Title").unwrap_or_default().to_lowercase();
        email.trim() == user_email || login.contains(user_email) || title == user_email
    }))
}

/// Normalize a server-relative site path: single leading slash, no trailing
/// one. Empty paths are rejected before any network call.
pub(crate) fn normalize_site_path(site_path: &str) -> Result<String> {
    let raw = site_path.trim();
    if raw.is_empty() {
        return Err(SharePointError::Validation(
            "site_path cannot be empty".to_string(),
        ));
    }
    let with_slash = if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{raw}")
    };
    Ok(with_slash.trim_end_matches('/').to_string())
}

/// Extract the embedded GUID (8-4-4-4-12 hex groups) from a claim-encoded
/// login name, lower-cased.
pub(crate) fn extract_guid(value: &str) -> Option<String> {
    GUID_RE
        .captures(value)
        .map(|caps| caps[1].to_lowercase())
}

fn extract_role_names(assignment: &Value) -> Vec<String> {
    assignment
        .get("RoleDefinitionBindings")
        .and_then(Value::as_array)
        .map(|bindings| {
            bindings
                .iter()
                .filter_map(|b| b.get("Name").and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Lenient textual match of a direct-user principal against the normalized
/// email: substring of the login name or equality with the title.
fn matches_user(login_name: Option<&str>, title: Option<&str>, email: &str) -> bool {
    let login = login_name.unwrap_or_default().to_lowercase();
    let title = title.unwrap_or_default().to_lowercase();
    login.contains(email) || title == email
}

/// Sorted, deduplicated union of role names across both assignment sets.
fn collect_effective_roles(direct: &[RoleAssignment], via_group: &[RoleAssignment]) -> Vec<String> {
    direct
        .iter()
        .chain(via_group)
        .flat_map(|a| a.roles.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}
