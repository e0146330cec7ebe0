#![allow(clippy::unwrap_used)]
// Integration tests for the request pipeline using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unictl_api::envelope::{Overflow, decode};
use unictl_api::{
    ApiResponse, Body, Client, CommonMeta, Error, Method, TlsMode, TransportConfig, Value,
    impl_envelope,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let client = Client::new(&server.uri(), &TransportConfig::default()).unwrap();
    (server, client)
}

fn ok_envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "meta": { "rc": "ok" }, "data": data })
}

fn secret(raw: &str) -> SecretString {
    raw.to_string().into()
}

#[derive(Debug, Default)]
struct Counters {
    meta: CommonMeta,
    rx_bytes: u64,
    extra: Overflow,
}

impl_envelope!(Counters { meta, rx_bytes } overflow extra);

#[derive(Debug, Default)]
struct Health {
    meta: CommonMeta,
    subsystem: String,
    num_user: u32,
    extra: Overflow,
}

impl_envelope!(Health { meta, subsystem, num_user } overflow extra);

// ── Request construction ────────────────────────────────────────────

#[tokio::test]
async fn test_standard_headers_are_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/self"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(header("cache-control", "no-cache"))
        .and(header("accept-charset", "utf-8"))
        .and(header("user-agent", unictl_api::client::USER_AGENT_VALUE))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    client
        .execute(Method::GET, "/api/self", None, Some(&mut resp), &[])
        .await
        .unwrap();
    assert!(resp.meta.rc.is_ok());
}

#[tokio::test]
async fn test_query_pairs_are_applied() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/event"))
        .and(query_param("_limit", "50"))
        .and(query_param("within", "24"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    client
        .execute_for_site(
            Method::GET,
            "default",
            "stat/event",
            None,
            Some(&mut resp),
            &["within", "24", "_limit", "50"],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_odd_query_list_sends_no_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    client
        .execute_without_response(Method::GET, "/api/self", None, &["only-a-key"])
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.query(), None);
}

#[tokio::test]
async fn test_request_body_is_sent_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/cmd/stamgr"))
        .and(body_json(json!({ "cmd": "kick-sta", "mac": "aa:bb:cc:dd:ee:ff" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let body = Body::json(&json!({ "cmd": "kick-sta", "mac": "aa:bb:cc:dd:ee:ff" })).unwrap();
    let mut resp = ApiResponse::default();
    client
        .execute_for_site(
            Method::POST,
            "default",
            "cmd/stamgr",
            Some(body),
            Some(&mut resp),
            &[],
        )
        .await
        .unwrap();
}

// ── Decoding ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_fields_survive_a_call() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok", "count": 1 },
            "subsystem": "wlan",
            "num_user": 12,
            "num_guest": 3,
            "status": "ok",
            "tx_bytes-r": 1024.5
        })))
        .mount(&server)
        .await;

    let mut health = Health::default();
    client
        .execute_for_site(Method::GET, "default", "stat/health", None, Some(&mut health), &[])
        .await
        .unwrap();

    assert_eq!(health.subsystem, "wlan");
    assert_eq!(health.num_user, 12);
    assert_eq!(health.meta.extra.get("count"), Some(&Value::Int(1)));
    assert_eq!(health.extra.get("num_guest"), Some(&Value::Int(3)));
    assert_eq!(health.extra.get("status"), Some(&Value::from("ok")));
    assert_eq!(health.extra.get("tx_bytes-r"), Some(&Value::Float(1024.5)));
    assert!(!health.extra.contains_key("subsystem"));
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/self"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>502</html>"))
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    let result = client
        .execute(Method::GET, "/api/self", None, Some(&mut resp), &[])
        .await;

    assert!(
        matches!(result, Err(Error::Decode(_))),
        "expected Decode error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_no_destination_ignores_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/cmd/devmgr"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .expect(1)
        .mount(&server)
        .await;

    client
        .execute_without_response(Method::POST, "/api/s/default/cmd/devmgr", None, &[])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_large_unsigned_counter_is_exact() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"meta":{"rc":"ok"},"rx_bytes":18446744073709551614,"tx_bytes":18446744073709551615}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let mut counters = Counters::default();
    client
        .execute_for_site(Method::GET, "default", "stat/dev", None, Some(&mut counters), &[])
        .await
        .unwrap();

    assert_eq!(counters.rx_bytes, u64::MAX - 1);
    assert_eq!(counters.extra.get("tx_bytes"), Some(&Value::UInt(u64::MAX)));

    let body = Body::envelope(&counters).unwrap();
    assert_eq!(
        std::str::from_utf8(body.as_bytes()).unwrap(),
        r#"{"meta":{"rc":"ok","msg":null},"rx_bytes":18446744073709551614,"tx_bytes":18446744073709551615}"#
    );
}

#[tokio::test]
async fn test_non_array_data_is_preserved() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sysinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "version": "8.0.26",
            "uptime": 86400
        }))))
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    client
        .execute_for_site(Method::GET, "default", "stat/sysinfo", None, Some(&mut resp), &[])
        .await
        .unwrap();

    assert_eq!(resp.data.get("version"), Some(&Value::from("8.0.26")));
    assert_eq!(resp.data.get("uptime"), Some(&Value::Int(86400)));
}

// ── Status interpretation ───────────────────────────────────────────

#[tokio::test]
async fn test_body_without_meta_fails() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/self"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 401, "message": "Unauthorized" }
        })))
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    let err = client
        .execute(Method::GET, "/api/self", None, Some(&mut resp), &[])
        .await
        .unwrap_err();

    match err {
        Error::NonOkStatus { code, payload } => {
            assert!(code.is_empty());
            assert_eq!(
                payload.get("error").and_then(|e| e.get("message")),
                Some(&Value::from("Unauthorized"))
            );
        }
        other => panic!("expected NonOkStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_response_code_fails() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "meta": { "rc": "" },
            "data": []
        })))
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    let result = client
        .execute_for_site(Method::GET, "default", "stat/sta", None, Some(&mut resp), &[])
        .await;

    assert!(
        matches!(result, Err(Error::NonOkStatus { .. })),
        "expected NonOkStatus, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_message_is_the_error_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "bad thing" },
            "data": []
        })))
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    let err = client
        .execute_for_site(Method::GET, "default", "stat/sta", None, Some(&mut resp), &[])
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "bad thing");
    assert!(err.is_status());
}

#[tokio::test]
async fn test_missing_message_reports_code_and_payload() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "" },
            "data": [{ "mac": "aa:bb" }]
        })))
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    let err = client
        .execute_for_site(Method::GET, "default", "stat/sta", None, Some(&mut resp), &[])
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(text.starts_with("non-ok status code: error - "), "{text}");
    assert!(text.contains(r#""mac":"aa:bb""#), "{text}");
    assert!(matches!(err, Error::NonOkStatus { .. }));
}

#[tokio::test]
async fn test_http_error_status_is_judged_by_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/self"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.LoginRequired" },
            "data": []
        })))
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    let err = client
        .execute(Method::GET, "/api/self", None, Some(&mut resp), &[])
        .await
        .unwrap_err();

    assert!(err.is_login_required());
}

// ── Caller contract ─────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_site_makes_no_request() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(0)
        .mount(&server)
        .await;

    let mut resp = ApiResponse::default();
    for site in ["", "default/../other"] {
        let result = client
            .execute_for_site(Method::GET, site, "stat/sta", None, Some(&mut resp), &[])
            .await;
        assert!(
            matches!(result, Err(Error::Validation(_))),
            "expected Validation error for {site:?}, got: {result:?}"
        );
    }
}

#[tokio::test]
async fn test_transport_failure_is_returned() {
    // Nothing listens on port 1.
    let client = Client::new("http://127.0.0.1:1", &TransportConfig::default()).unwrap();
    let mut resp = ApiResponse::default();
    let err = client
        .execute(Method::GET, "/api/self", None, Some(&mut resp), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_transient());
}

// ── Construction ────────────────────────────────────────────────────

#[test]
fn test_invalid_base_url_fails_fast() {
    let result = Client::new("controller.local", &TransportConfig::default());
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_unreadable_ca_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TransportConfig {
        tls: TlsMode::CustomCa(dir.path().join("missing.pem")),
        ..TransportConfig::default()
    };
    let result = Client::new("https://10.0.0.1:8443", &transport);
    assert!(matches!(result, Err(Error::Tls(_))));
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_captures_cookies_for_later_calls() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(query_param("remember", "false"))
        .and(body_json(json!({ "username": "admin", "password": "hunter2" })))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "unifises=s3ss10n; Path=/; HttpOnly")
                .append_header("Set-Cookie", "csrf_token=c5rf; Path=/")
                .set_body_json(ok_envelope(json!([]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/self"))
        .and(header("cookie", "unifises=s3ss10n; csrf_token=c5rf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([
            { "name": "admin" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    client.login("admin", &secret("hunter2"), false).await.unwrap();
    assert!(client.has_session());

    let mut resp = ApiResponse::default();
    client
        .execute(Method::GET, "/api/self", None, Some(&mut resp), &[])
        .await
        .unwrap();
    let rows = resp.data.as_array().unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::from("admin")));
}

#[tokio::test]
async fn test_login_rejected_keeps_no_cookies() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(400)
                .append_header("Set-Cookie", "unifises=nope; Path=/")
                .set_body_json(json!({
                    "meta": { "rc": "error", "msg": "api.err.Invalid" },
                    "data": []
                })),
        )
        .mount(&server)
        .await;

    let result = client.login("admin", &secret("wrong"), false).await;

    match result {
        Err(Error::Authentication { message }) => assert_eq!(message, "api.err.Invalid"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_login_non_json_rejection() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let result = client.login("admin", &secret("wrong"), true).await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_logout_without_remember_makes_no_request() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "unifises=abc; Path=/")
                .set_body_json(ok_envelope(json!([]))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(0)
        .mount(&server)
        .await;

    client.login("admin", &secret("pw"), false).await.unwrap();
    client.logout().await.unwrap();
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_logout_with_remember_destroys_session() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(query_param("remember", "true"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "unifises=abc; Path=/")
                .set_body_json(ok_envelope(json!([]))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/logout"))
        .and(header_exists("cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    client.login("admin", &secret("pw"), true).await.unwrap();
    client.logout().await.unwrap();
    assert!(!client.has_session());
    assert_eq!(client.cookie_header(), None);
}

// ── Round trip ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_decoded_envelope_can_be_sent_back() {
    let (server, client) = setup().await;

    let setting = json!({
        "_id": "5f1",
        "key": "mgmt",
        "x_ssh_enabled": true,
        "advanced_feature_enabled": false
    });

    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/setting/mgmt/5f1"))
        .and(body_json(&setting))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    #[derive(Debug, Default)]
    struct Setting {
        id: String,
        key: String,
        extra: Overflow,
    }
    impl_envelope!(Setting { id = "_id", key } overflow extra);

    let mut decoded = Setting::default();
    decode(setting.to_string().as_bytes(), &mut decoded).unwrap();
    assert_eq!(decoded.id, "5f1");

    let body = Body::envelope(&decoded).unwrap();
    client
        .execute_for_site(
            Method::PUT,
            "default",
            "rest/setting/mgmt/5f1",
            Some(body),
            None::<&mut ApiResponse>,
            &[],
        )
        .await
        .unwrap();
}
