//! Integration tests for the stackdio client using wiremock
//!
//! These tests drive the client against mocked endpoints, covering version
//! negotiation, the 404 short-circuit, error mapping and the resource
//! operations that validate their input before sending anything.

use serde_json::json;
use stackdio::{Credentials, Error, LogDate, LogLevel, LogType, Session, StackdioClient};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn base_url(server: &MockServer) -> String {
    format!("{}/api/", server.uri())
}

async fn mount_version(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path("/api/version/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": version })))
        .mount(server)
        .await;
}

/// Start a mock server reporting `version` and connect a client to it
async fn connected(version: &str) -> (MockServer, StackdioClient) {
    let server = MockServer::start().await;
    mount_version(&server, version).await;

    let client = StackdioClient::connect(&base_url(&server), Credentials::new("alice", "secret"))
        .await
        .expect("Client should connect");

    (server, client)
}

/// Session, credentials and version negotiation
mod session_tests {
    use super::*;

    /// Authentication records the server version and sends basic auth
    #[tokio::test]
    async fn test_authenticate_records_version() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/version/"))
            .and(basic_auth("alice", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "0.7.1"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut client =
            StackdioClient::new(&base_url(&server), Credentials::new("alice", "secret")).unwrap();
        assert!(client.server_version().is_none());

        let version = client.authenticate().await.expect("Should authenticate");
        assert_eq!(version.to_string(), "0.7.1");
        assert_eq!(client.server_version(), Some(version));
    }

    /// Bad credentials surface as an API error carrying the server message
    #[tokio::test]
    async fn test_authenticate_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/version/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Invalid username/password."})),
            )
            .mount(&server)
            .await;

        let err = StackdioClient::connect(&base_url(&server), Credentials::new("alice", "wrong"))
            .await
            .err()
            .expect("Should fail");

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid username/password.");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Gated operations fail before any request when not authenticated
    #[tokio::test]
    async fn test_unauthenticated_gated_call_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/regions/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            StackdioClient::new(&base_url(&server), Credentials::new("alice", "secret")).unwrap();

        let err = client.list_regions().await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { actual: None, .. }));
    }

    /// Ungated operations work without negotiating a version
    #[tokio::test]
    async fn test_unauthenticated_ungated_call() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 1}]})))
            .mount(&server)
            .await;

        let client =
            StackdioClient::new(&base_url(&server), Credentials::new("alice", "secret")).unwrap();

        let stacks = assert_ok!(client.list_stacks().await);
        assert_eq!(stacks.len(), 1);
    }

    /// Connection failures are transport errors
    #[tokio::test]
    async fn test_connection_refused() {
        // Nothing listens on port 1
        let client =
            StackdioClient::new("http://127.0.0.1:1/api/", Credentials::new("alice", "secret"))
                .unwrap();
        let err = client.list_stacks().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    /// Admin operations use the admin credentials
    #[tokio::test]
    async fn test_admin_credentials_for_create_provider() {
        let server = MockServer::start().await;
        mount_version(&server, "0.7.0").await;

        Mock::given(method("POST"))
            .and(path("/api/providers/"))
            .and(basic_auth("root", "toor"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 4, "title": "aws"})))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(&base_url(&server), Credentials::new("alice", "secret"))
            .unwrap()
            .with_admin_credentials(Credentials::new("root", "toor"));
        let mut client = StackdioClient::from_session(session, None).unwrap();
        client.authenticate().await.unwrap();

        let form = stackdio::resource::provider::ProviderForm {
            title: Some("aws".to_string()),
            ..Default::default()
        };
        let provider = client.create_provider(&form).await.unwrap();
        assert_eq!(provider["id"], 4);
    }

    /// Admin operations without admin credentials fail locally
    #[tokio::test]
    async fn test_admin_call_without_admin_credentials() {
        let (_server, client) = connected("0.7.0").await;

        let err = client
            .create_provider(&Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredentials("admin")));
    }
}

/// Version gate behavior against a connected server
mod version_gate_tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_minimum_version_rejected() {
        let (server, client) = connected("0.6.0").await;

        Mock::given(method("GET"))
            .and(path("/api/regions/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(0)
            .mount(&server)
            .await;

        let err = client.list_regions().await.unwrap_err();
        match err {
            Error::UnsupportedVersion {
                operation,
                required,
                actual,
            } => {
                assert_eq!(operation, "list_regions");
                assert_eq!(required, ">=0.6.1");
                assert_eq!(actual.unwrap().to_string(), "0.6.0");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_minimum_version_accepted() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/regions/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": [{"id": 1, "title": "us-east-1"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let regions = client.list_regions().await.unwrap();
        assert_eq!(regions[0]["title"], "us-east-1");
    }

    /// `!=0.6` excludes every 0.6.x server
    #[tokio::test]
    async fn test_not_equal_ignores_patch() {
        let (_server, client) = connected("0.6.1").await;
        assert_err!(client.list_zones().await);
    }

    /// Deprecated operations are removed from 0.7 on
    /// Captures formatted log output for assertions
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Deprecated operations still run, and log a warning naming themselves
    #[tokio::test]
    async fn test_deprecated_operation_warns() {
        let (server, client) = connected("0.6.1").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": [{"id": 3, "title": "web"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        assert_eq!(client.get_stack_id("web").await.unwrap(), 3);

        let output = logs.contents();
        assert!(output.contains("WARN"), "no warning in {output:?}");
        assert!(output.contains("get_stack_id is deprecated"), "unexpected log {output:?}");
    }

    /// Non-deprecated operations log no warning
    #[tokio::test]
    async fn test_current_operation_does_not_warn() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        assert!(client.list_stacks().await.unwrap().is_empty());
        assert!(!logs.contents().contains("deprecated"));
    }

    #[tokio::test]
    async fn test_deprecated_lookup_removed() {
        let (_server, client) = connected("0.7.0").await;
        let err = client.get_stack_id("web").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { .. }));
    }
}

/// Transport behavior: 404 handling and error mapping
mod transport_tests {
    use super::*;

    #[tokio::test]
    async fn test_404_with_none_on_404() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/providers/999/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
            .mount(&server)
            .await;

        let provider = client.get_provider(999, true).await.unwrap();
        assert!(provider.is_none());
    }

    #[tokio::test]
    async fn test_404_without_none_on_404() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/providers/999/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
            .mount(&server)
            .await;

        let err = client.get_provider(999, false).await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            Error::Api { message, .. } => assert_eq!(message, "Not found."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_existing_provider() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/providers/3/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 3, "slug": "aws-prod"})),
            )
            .mount(&server)
            .await;

        let provider = client.get_provider(3, true).await.unwrap().unwrap();
        assert_eq!(provider["slug"], "aws-prod");
    }

    /// Server errors without a `detail` field keep a preview of the body
    #[tokio::test]
    async fn test_server_error_body_preview() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        match client.list_stacks().await.unwrap_err() {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// A list response without the `results` envelope is rejected
    #[tokio::test]
    async fn test_missing_results_envelope() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/providers/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let err = client.list_providers().await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    /// DELETE with an empty 204 body
    #[tokio::test]
    async fn test_delete_empty_response() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("DELETE"))
            .and(path("/api/stacks/12/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let body = client.delete_stack(12).await.unwrap();
        assert!(body.is_null());
    }

    /// Search filters travel as query parameters
    #[tokio::test]
    async fn test_search_sends_filters() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/"))
            .and(query_param("title", "web"))
            .and(query_param("namespace", "prod"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 8}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let stacks = client
            .search_stacks(&[("title", "web"), ("namespace", "prod")])
            .await
            .unwrap();
        assert_eq!(stacks[0]["id"], 8);
    }
}

/// Stack operations
mod stack_tests {
    use super::*;

    async fn mount_actions(server: &MockServer, stack_id: u64, actions: &[&str]) {
        Mock::given(method("GET"))
            .and(path(format!("/api/stacks/{}/action/", stack_id)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "available_actions": actions })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_valid_action_is_posted() {
        let (server, client) = connected("0.7.0").await;
        mount_actions(&server, 5, &["launch", "terminate"]).await;

        Mock::given(method("POST"))
            .and(path("/api/stacks/5/action/"))
            .and(body_json(json!({"action": "launch"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = client.do_stack_action(5, "launch").await.unwrap();
        assert_eq!(result["result"], "ok");
    }

    #[tokio::test]
    async fn test_invalid_action_is_not_posted() {
        let (server, client) = connected("0.7.0").await;
        mount_actions(&server, 5, &["launch", "terminate"]).await;

        Mock::given(method("POST"))
            .and(path("/api/stacks/5/action/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client.do_stack_action(5, "explode").await.unwrap_err();
        match err {
            Error::Validation(message) => {
                assert_eq!(message, "Invalid action, must be one of launch, terminate")
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Looking a stack up by title twice yields the same id
    #[tokio::test]
    async fn test_stack_id_lookup_is_stable() {
        let (server, client) = connected("0.6.1").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"id": 3, "title": "db"},
                    {"id": 7, "title": "web"}
                ]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let first = client.get_stack_id("web").await.unwrap();
        let second = client.get_stack_id("web").await.unwrap();
        assert_eq!(first, 7);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_stack_id_lookup_missing() {
        let (server, client) = connected("0.6.1").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let err = client.get_stack_id("web").await.unwrap_err();
        assert_eq!(err.to_string(), "Stack web not found");
    }

    #[tokio::test]
    async fn test_history_of_missing_stack() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/40/history/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client.get_stack_history(40).await.unwrap_err();
        assert!(matches!(err, Error::DomainLookup { kind: "Stack", .. }));
    }

    #[tokio::test]
    async fn test_describe_hosts() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/42/hosts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"fqdn": "web1.example.com", "ec2_metadata": {"instance_id": "i-1"}},
                    {"fqdn": "web2.example.com", "ec2_metadata": {"instance_id": "i-2"}},
                    {"hostname": "pending"}
                ]
            })))
            .mount(&server)
            .await;

        let fqdns = client.describe_hosts(42, "fqdn", false).await.unwrap();
        assert_eq!(fqdns, vec![json!("web1.example.com"), json!("web2.example.com")]);

        let instances = client.describe_hosts(42, "instance_id", true).await.unwrap();
        assert_eq!(instances, vec![json!("i-1"), json!("i-2")]);

        let err = client.describe_hosts(42, "public_ip", false).await.unwrap_err();
        assert!(matches!(err, Error::DomainLookup { .. }));
    }

    #[tokio::test]
    async fn test_get_logs() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/7/logs/provisioning.err.latest"))
            .and(query_param("tail", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_string("line 1\nline 2\n"))
            .expect(1)
            .mount(&server)
            .await;

        let text = client
            .get_logs(7, LogType::Provisioning, LogLevel::Error, LogDate::Latest, Some(50))
            .await
            .unwrap();
        assert_eq!(text, "line 1\nline 2\n");
    }

    /// A missing log is an API error, not empty text
    #[tokio::test]
    async fn test_missing_log() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/7/logs/launch.log.20150307"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
            .mount(&server)
            .await;

        let date: LogDate = "20150307".parse().unwrap();
        let err = client
            .get_logs(7, LogType::Launch, LogLevel::Log, date, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_log_level_is_not_requested() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/7/logs/launch.err.latest"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client
            .get_logs(7, LogType::Launch, LogLevel::Error, LogDate::Latest, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_access_rule_lookup() {
        let (server, client) = connected("0.6.1").await;

        Mock::given(method("GET"))
            .and(path("/api/stacks/2/security_groups/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"id": 11, "blueprint_host_definition": {"title": "web"}},
                    {"id": 12, "blueprint_host_definition": null},
                    {"id": 13, "blueprint_host_definition": {"title": "db"}}
                ]
            })))
            .mount(&server)
            .await;

        assert_eq!(client.get_access_rule_id(2, "db").await.unwrap(), 13);
        let err = client.get_access_rule_id(2, "cache").await.unwrap_err();
        assert_eq!(err.to_string(), "Access Rule cache not found");
    }

    #[tokio::test]
    async fn test_edit_access_rule() {
        let (server, client) = connected("0.7.0").await;
        let rule = json!({"action": "authorize", "protocol": "tcp", "from_port": 22, "to_port": 22, "rule": "0.0.0.0/0"});

        Mock::given(method("PUT"))
            .and(path("/api/security_groups/6/rules/"))
            .and(body_json(rule.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([rule.clone()])))
            .expect(1)
            .mount(&server)
            .await;

        let rules = client.edit_access_rule(6, &rule).await.unwrap();
        assert_eq!(rules[0]["from_port"], 22);
    }
}

/// Providers, regions, zones and settings
mod resource_tests {
    use super::*;

    async fn mount_provider_types(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/provider_types/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"id": 1, "type_name": "ec2"},
                    {"id": 2, "type_name": "gce"}
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_provider_id_by_slug_and_title() {
        let (server, client) = connected("0.6.1").await;

        Mock::given(method("GET"))
            .and(path("/api/providers/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": 9, "slug": "aws-prod", "title": "AWS Production"}]
            })))
            .mount(&server)
            .await;

        assert_eq!(client.get_provider_id("aws-prod", false).await.unwrap(), 9);
        assert_eq!(client.get_provider_id("AWS Production", true).await.unwrap(), 9);
        assert!(client.get_provider_id("AWS Production", false).await.is_err());
    }

    #[tokio::test]
    async fn test_region_id_lookup() {
        let (server, client) = connected("0.6.1").await;
        mount_provider_types(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/regions/"))
            .and(query_param("title", "us-east-1"))
            .and(query_param("provider_type", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 21}]})),
            )
            .mount(&server)
            .await;

        assert_eq!(client.get_region_id("us-east-1", "ec2").await.unwrap(), 21);
    }

    /// The version gate runs before the provider type is looked up
    #[tokio::test]
    async fn test_region_id_gated_before_any_request() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/provider_types/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/regions/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(0)
            .mount(&server)
            .await;

        let err = client.get_region_id("us-east-1", "ec2").await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedVersion {
                operation: "get_region_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_region_id_lookup_ambiguous() {
        let (server, client) = connected("0.6.1").await;
        mount_provider_types(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/regions/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 21}, {"id": 22}]})),
            )
            .mount(&server)
            .await;

        let err = client.get_region_id("us-east-1", "ec2").await.unwrap_err();
        assert!(matches!(err, Error::DomainLookup { kind: "Region", .. }));
    }

    /// Zone lookup by title is only served before the 0.6 line
    #[tokio::test]
    async fn test_zone_id_rejected_on_0_6() {
        let (server, client) = connected("0.6.1").await;

        Mock::given(method("GET"))
            .and(path("/api/zones/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(0)
            .mount(&server)
            .await;

        let err = client.get_zone_id("us-east-1a", "ec2").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { operation: "get_zone_id", .. }));
    }

    /// 0.5 servers put the provider type on the zone itself
    #[tokio::test]
    async fn test_zone_id_legacy_shape() {
        let (server, client) = connected("0.5.2").await;
        mount_provider_types(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/zones/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"id": 40, "title": "us-east-1a", "provider_type": 2},
                    {"id": 41, "title": "us-east-1a", "provider_type": 1}
                ]
            })))
            .mount(&server)
            .await;

        assert_eq!(client.get_zone_id("us-east-1a", "ec2").await.unwrap(), 41);
        let err = client.get_zone_id("eu-west-1a", "ec2").await.unwrap_err();
        assert!(matches!(err, Error::DomainLookup { kind: "Zone", .. }));
    }

    #[tokio::test]
    async fn test_set_public_key() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("PUT"))
            .and(path("/api/settings/"))
            .and(body_json(json!({"public_key": "ssh-rsa AAAA alice@host\n"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"public_key": "ssh-rsa AAAA alice@host\n"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let key = stackdio::PublicKey::Inline("ssh-rsa AAAA alice@host\n".to_string());
        let settings = client.set_public_key(&key).await.unwrap();
        assert_eq!(settings["public_key"], "ssh-rsa AAAA alice@host\n");
    }

    #[tokio::test]
    async fn test_create_stack_posts_definition() {
        let (server, client) = connected("0.7.0").await;
        let definition = json!({"title": "web", "blueprint": 3, "namespace": "prod"});

        Mock::given(method("POST"))
            .and(path("/api/stacks/"))
            .and(body_json(definition.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 30, "title": "web"})))
            .expect(1)
            .mount(&server)
            .await;

        let stack = client.create_stack(&definition).await.unwrap();
        assert_eq!(stack["id"], 30);
    }

    #[tokio::test]
    async fn test_region_and_zone_by_id() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/regions/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3, "title": "us-east-1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/zones/8"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let region = client.get_region(3, false).await.unwrap().unwrap();
        assert_eq!(region["title"], "us-east-1");
        assert!(client.get_zone(8, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_zones_and_providers() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/zones/"))
            .and(query_param("region", "3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": [{"id": 40}, {"id": 41}]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/providers/"))
            .and(query_param("title", "aws"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 9}]})))
            .mount(&server)
            .await;

        assert_eq!(client.search_zones(&[("region", "3")]).await.unwrap().len(), 2);
        assert_eq!(client.search_providers(&[("title", "aws")]).await.unwrap()[0]["id"], 9);
    }

    #[tokio::test]
    async fn test_list_rules_for_group() {
        let (server, client) = connected("0.7.0").await;

        Mock::given(method("GET"))
            .and(path("/api/security_groups/6/rules/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"protocol": "tcp", "from_port": 22, "to_port": 22, "rule": "0.0.0.0/0"}
            ])))
            .mount(&server)
            .await;

        let rules = client.list_rules_for_group(6).await.unwrap();
        assert_eq!(rules[0]["from_port"], 22);
    }
}
