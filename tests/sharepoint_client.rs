//! Integration tests for the SharePoint client against a wiremock server.
//!
//! One wiremock instance stands in for all three remote parties: the
//! identity provider (token endpoint), the Graph API, and the SharePoint
//! REST API, distinguished by path prefix.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use collabapi::sharepoint::{
    PrincipalKind, SharePointClient, SharePointConfig, SharePointError, TokenProvider, GRAPH_SCOPE,
};

fn client_for(server: &MockServer) -> SharePointClient {
    let mut config = SharePointConfig::new("tenant-1", "client-1", "secret-1");
    config.graph_base_url = Url::parse(&format!("{}/v1.0/", server.uri())).unwrap();
    config.login_base_url = Url::parse(&format!("{}/", server.uri())).unwrap();
    config.rest_base_url = Some(Url::parse(&server.uri()).unwrap());
    SharePointClient::new(config).unwrap()
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "token-abc"
        })))
        .mount(server)
        .await;
}

// =============================================================================
// Authentication and token caching
// =============================================================================

#[tokio::test]
async fn test_authenticate_posts_client_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.authenticate().await.unwrap();
}

#[tokio::test]
async fn test_token_cached_per_scope_until_invalidated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let tokens = client.token_provider();

    // Two scopes, each fetched once then served from cache.
    tokens.get_token(GRAPH_SCOPE).await.unwrap();
    tokens.get_token(GRAPH_SCOPE).await.unwrap();
    tokens.get_token("https://contoso.sharepoint.com/.default").await.unwrap();
    tokens.get_token("https://contoso.sharepoint.com/.default").await.unwrap();

    // Invalidation evicts only the named scope.
    tokens.invalidate(GRAPH_SCOPE).await;
    tokens.get_token(GRAPH_SCOPE).await.unwrap();
    tokens.get_token("https://contoso.sharepoint.com/.default").await.unwrap();
}

#[tokio::test]
async fn test_token_error_maps_to_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, SharePointError::Authentication(_)));
}

#[tokio::test]
async fn test_missing_access_token_in_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, SharePointError::Authentication(_)));
}

// =============================================================================
// Sites and drives
// =============================================================================

#[tokio::test]
async fn test_get_site_strips_path_slashes() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1.0/sites/contoso.sharepoint.com:/sites/TeamSite"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "contoso.sharepoint.com,guid1,guid2",
            "displayName": "Team Site",
            "webUrl": "https://contoso.sharepoint.com/sites/TeamSite"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let site = client
        .get_site("contoso.sharepoint.com", "/sites/TeamSite/")
        .await
        .unwrap();
    assert_eq!(site.id, "contoso.sharepoint.com,guid1,guid2");
    assert_eq!(site.display_name.as_deref(), Some("Team Site"));
}

#[tokio::test]
async fn test_list_drives_follows_next_link() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    let next = format!("{}/v1.0/sites/site-1/drives?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/v1.0/sites/site-1/drives"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"id": "d1", "name": "Documents", "driveType": "documentLibrary"},
                {"id": "d2", "name": "Archive", "driveType": "documentLibrary"}
            ],
            "@odata.nextLink": next
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/sites/site-1/drives"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": "d3", "name": "Media", "driveType": "documentLibrary"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let drives = client.list_drives("site-1").await.unwrap();

    // Three items, server order preserved across the page boundary.
    assert_eq!(
        drives.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
        vec!["d1", "d2", "d3"]
    );
}

#[tokio::test]
async fn test_get_drive_by_name_is_case_insensitive() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1.0/sites/site-1/drives"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": "d1", "name": "Documents"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let drive = client.get_drive_by_name("site-1", "documents").await.unwrap();
    assert_eq!(drive.id, "d1");

    let err = client.get_drive_by_name("site-1", "Missing").await.unwrap_err();
    match err {
        SharePointError::NotFound { message } => {
            assert!(message.contains("Missing"));
            assert!(message.contains("Documents"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

// =============================================================================
// File transfers
// =============================================================================

#[tokio::test]
async fn test_download_file_writes_bytes() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1.0/sites/site-1/drives/d1/items/item-1/content"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"file contents".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested/report.txt");

    let client = client_for(&server);
    let written = client
        .download_file("site-1", "d1", "item-1", &dest)
        .await
        .unwrap();

    assert_eq!(written, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), b"file contents");
}

#[tokio::test]
async fn test_upload_file_puts_body() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("PUT"))
        .and(path("/v1.0/sites/site-1/drives/d1/root:/Uploads/report.txt:/content"))
        .and(body_string_contains("payload bytes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "new-item", "name": "report.txt", "size": 13
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("report.txt");
    std::fs::write(&local, "payload bytes").unwrap();

    let client = client_for(&server);
    let item = client
        .upload_file("site-1", "d1", "Uploads", &local)
        .await
        .unwrap();
    assert_eq!(item.id, "new-item");
}

#[tokio::test]
async fn test_upload_missing_local_file_fails_without_request() {
    // No mocks mounted: any request would 404 and show up as an Api error.
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client
        .upload_file("site-1", "d1", "", std::path::Path::new("/nonexistent/file.bin"))
        .await
        .unwrap_err();
    assert!(matches!(err, SharePointError::Io(_)));
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn test_graph_403_maps_to_forbidden() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1.0/sites/site-1/drives"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": "accessDenied", "message": "Insufficient privileges"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.list_drives("site-1").await.unwrap_err();
    match err {
        SharePointError::Forbidden { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("Insufficient privileges"));
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }
}

// =============================================================================
// Permission aggregation
// =============================================================================

#[tokio::test]
async fn test_permission_report_merges_all_principal_kinds() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    // Role assignments: one of each principal kind matching the user, plus
    // one unknown code that must be ignored.
    Mock::given(method("GET"))
        .and(path("/sites/TeamSite/_api/web/roleassignments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "PrincipalId": 11,
                    "Member": {
                        "Id": 11,
                        "Title": "Alice Example",
                        "LoginName": "i:0#.f|membership|alice@contoso.com",
                        "PrincipalType": 1
                    },
                    "RoleDefinitionBindings": [{"Name": "Reader"}]
                },
                {
                    "PrincipalId": 44,
                    "Member": {
                        "Id": 44,
                        "Title": "Engineering",
                        "LoginName": "c:0t.c|tenant|A1B2C3D4-E5F6-7890-ABCD-EF1234567890",
                        "PrincipalType": 4
                    },
                    "RoleDefinitionBindings": [{"Name": "Editor"}]
                },
                {
                    "PrincipalId": 12,
                    "Member": {
                        "Id": 12,
                        "Title": "Team Owners",
                        "LoginName": "Team Owners",
                        "PrincipalType": 8
                    },
                    "RoleDefinitionBindings": [{"Name": "Reader"}, {"Name": "Owner"}]
                },
                {
                    "PrincipalId": 99,
                    "Member": {"Id": 99, "Title": "Machine", "PrincipalType": 2},
                    "RoleDefinitionBindings": [{"Name": "Admin"}]
                }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/alice@contoso.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-1",
            "displayName": "Alice Example",
            "mail": "alice@contoso.com",
            "userPrincipalName": "alice@contoso.com"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/user-1/transitiveMemberOf/microsoft.graph.group"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": "a1b2c3d4-e5f6-7890-abcd-ef1234567890"}, {"id": "other-group"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sites/TeamSite/_api/web/sitegroups(12)/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"Id": 7, "Email": "bob@contoso.com", "LoginName": "bob", "Title": "Bob"},
                {"Id": 8, "Email": "Alice@Contoso.com", "LoginName": "alice", "Title": "Alice"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client
        .get_user_site_permissions(
            " Alice@Contoso.com ",
            "contoso.sharepoint.com",
            "  /sites/TeamSite/  ",
        )
        .await
        .unwrap();

    assert_eq!(report.user.email, "alice@contoso.com");
    assert_eq!(report.user.id, "user-1");
    assert_eq!(report.site.site_path, "/sites/TeamSite");
    assert_eq!(report.effective_roles, vec!["Editor", "Owner", "Reader"]);
    assert!(report.has_access);

    assert_eq!(report.direct_assignments.len(), 1);
    assert_eq!(
        report.direct_assignments[0].principal_kind,
        PrincipalKind::User
    );

    assert_eq!(report.group_assignments.len(), 2);
    let kinds: Vec<PrincipalKind> = report
        .group_assignments
        .iter()
        .map(|a| a.principal_kind)
        .collect();
    assert!(kinds.contains(&PrincipalKind::SecurityGroup));
    assert!(kinds.contains(&PrincipalKind::SiteGroup));
    let security = report
        .group_assignments
        .iter()
        .find(|a| a.principal_kind == PrincipalKind::SecurityGroup)
        .unwrap();
    assert_eq!(
        security.directory_group_id.as_deref(),
        Some("a1b2c3d4-e5f6-7890-abcd-ef1234567890")
    );
}

#[tokio::test]
async fn test_permission_report_no_matches_means_no_access() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/sites/TeamSite/_api/web/roleassignments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/users/alice@contoso.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/users/user-1/transitiveMemberOf/microsoft.graph.group"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client
        .get_user_site_permissions("alice@contoso.com", "contoso.sharepoint.com", "/sites/TeamSite")
        .await
        .unwrap();

    assert!(report.effective_roles.is_empty());
    assert!(!report.has_access);
    assert!(report.direct_assignments.is_empty());
    assert!(report.group_assignments.is_empty());
}

#[tokio::test]
async fn test_empty_site_path_fails_before_network() {
    // No mocks mounted: a request would surface as a non-Validation error.
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client
        .get_user_site_permissions("alice@contoso.com", "contoso.sharepoint.com", "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, SharePointError::Validation(_)));
}

#[tokio::test]
async fn test_permission_lookup_failure_is_atomic() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/sites/TeamSite/_api/web/roleassignments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .mount(&server)
        .await;
    // The user lookup 404s; the whole aggregation must fail.
    Mock::given(method("GET"))
        .and(path("/v1.0/users/ghost@contoso.com"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "Request_ResourceNotFound", "message": "User not found"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_user_site_permissions("ghost@contoso.com", "contoso.sharepoint.com", "/sites/TeamSite")
        .await
        .unwrap_err();
    assert!(matches!(err, SharePointError::NotFound { .. }));
}
