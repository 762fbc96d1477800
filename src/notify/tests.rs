use super::*;
use crate::change::{Change, Severity};
use crate::render::render_bucket;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pull_request() -> Source {
    Source::PullRequest {
        url: "https://example.com/org/repo/pull/7".into(),
        title: "Add pets".into(),
    }
}

fn sample_payload() -> Payload {
    let change = Change::breaking("Path '/users' removed");
    Payload::new(
        &pull_request(),
        vec![render_bucket(Severity::Breaking, &[&change])],
        Some("Schema bot".into()),
    )
}

fn webhook(server: &MockServer) -> Webhook {
    Webhook::new(Url::parse(&format!("{}/services/hook", server.uri())).unwrap())
}

#[test]
fn pull_request_headline() {
    assert_eq!(
        pull_request().headline(),
        "Schema update on <https://example.com/org/repo/pull/7|`Add pets`>"
    );
}

#[test]
fn compare_headline() {
    let source = Source::Compare(CompareLink {
        url: "https://example.com/org/repo/compare/abc1234...def5678".into(),
        head: "def5678".into(),
    });
    assert_eq!(
        source.headline(),
        "Schema update on <https://example.com/org/repo/compare/abc1234...def5678|`def5678`>"
    );
}

#[test]
fn payload_json_shape() {
    assert_eq!(
        serde_json::to_value(sample_payload()).unwrap(),
        json!({
            "username": "Schema bot",
            "text": "Schema update on <https://example.com/org/repo/pull/7|`Add pets`>",
            "attachments": [{
                "mrkdwn_in": ["text", "fallback"],
                "color": "#E74C3B",
                "author_name": "Breaking changes",
                "text": "Path `/users` removed",
                "fallback": "Path `/users` removed",
            }],
        })
    );
}

#[test]
fn username_is_omitted_without_bot_name() {
    let payload = Payload::new(&pull_request(), vec![], None);
    let value = serde_json::to_value(payload).unwrap();
    assert!(value.get("username").is_none());
}

#[tokio::test]
async fn posts_json_to_webhook() {
    let server = MockServer::start().await;
    let payload = sample_payload();
    Mock::given(method("POST"))
        .and(path("/services/hook"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::to_value(&payload).unwrap()))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let delivered = webhook(&server).send(&payload).await.unwrap();
    assert_eq!(delivered.status, StatusCode::OK);
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = webhook(&server).send(&sample_payload()).await.unwrap_err();
    match err {
        DeliveryError::Rejected { status, body } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_webhook_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let hook = Webhook::new(Url::parse(&format!("http://127.0.0.1:{port}/hook")).unwrap());

    let err = hook.send(&sample_payload()).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Transport(_)));
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn server_error_status_is_logged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let result = webhook(&server).send(&sample_payload()).await;
    assert!(matches!(result, Err(DeliveryError::Rejected { .. })));

    let output = log.contents();
    assert!(
        output.contains("webhook responded") && output.contains("status=500"),
        "log did not report the status: {output}"
    );
}
