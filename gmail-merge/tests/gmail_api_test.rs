//! Integration tests against a mocked Google token endpoint and Gmail API

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use gmail_merge::gmail::GmailProvider;
use gmail_merge::{Alias, GmailConfig, Mailer, MergeFields, Recipients, SendOutcome, Template};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = include_str!("fixtures/service_account_key.pem");
const ACCESS_TOKEN: &str = "ya29.test-token";
const SEND_PATH: &str = "/gmail/v1/users/me/messages/send";
const DRAFTS_PATH: &str = "/gmail/v1/users/me/drafts";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Start a mock server with a working token endpoint
async fn setup_server() -> MockServer {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    server
}

fn mailer_for(server: &MockServer) -> Mailer<GmailProvider> {
    let config = GmailConfig::new("mailer@project.iam.gserviceaccount.com", TEST_KEY)
        .with_delegated_user("staff@example.com")
        .with_token_url(format!("{}/token", server.uri()))
        .with_api_base_url(server.uri());

    Mailer::new(GmailProvider::new(&config).unwrap())
}

async fn mount_send(server: &MockServer, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "id": "18c2f0a1b2c3d4e5",
            "threadId": "18c2f0a1b2c3d4e5",
            "labelIds": ["SENT"]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Decoded text of every message submitted to the send endpoint
async fn sent_messages(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == SEND_PATH)
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            let raw = body["raw"].as_str().unwrap();
            String::from_utf8(URL_SAFE_NO_PAD.decode(raw).unwrap()).unwrap()
        })
        .collect()
}

fn draft_json(subject: &str, html: &str, attachment_id: Option<&str>) -> Value {
    let mut body = json!({
        "size": html.len(),
        "data": URL_SAFE_NO_PAD.encode(html)
    });
    if let Some(id) = attachment_id {
        body["attachmentId"] = json!(id);
    }

    json!({
        "id": "r-5082",
        "message": {
            "id": "18c2f0a1b2c3d4e5",
            "threadId": "18c2f0a1b2c3d4e5",
            "labelIds": ["DRAFT"],
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [
                    { "name": "MIME-Version", "value": "1.0" },
                    { "name": "Subject", "value": subject },
                    { "name": "From", "value": "staff@example.com" }
                ],
                "body": { "size": 0 },
                "parts": [
                    {
                        "partId": "0",
                        "mimeType": "text/plain",
                        "body": { "size": 2, "data": URL_SAFE_NO_PAD.encode("Hi") }
                    },
                    {
                        "partId": "1",
                        "mimeType": "text/html",
                        "body": body
                    }
                ]
            }
        }
    })
}

async fn mount_draft_search(server: &MockServer, query: &str, drafts: Value) {
    Mock::given(method("GET"))
        .and(path(DRAFTS_PATH))
        .and(query_param("q", query))
        .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(drafts))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_send_email() {
    let server = setup_server().await;
    mount_send(&server, 200, 1).await;

    let mailer = mailer_for(&server);
    let template = Template::new("Hello {{name}}", "<p>Hi {{name}}, see you at {{venue}}.</p>");
    let recipients = Recipients::to("ana@example.com")
        .with_cc("team@example.com")
        .with_bcc("audit@example.com");
    let alias = Alias::new("Events Team", "events@example.com");
    let fields = MergeFields::new().with("name", "Ana").with("venue", "Room 4");

    let outcome = mailer
        .send_email(&template, &recipients, Some(&alias), &fields)
        .await;

    assert_eq!(outcome, SendOutcome::Sent(true));

    let sent = sent_messages(&server).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0],
        "To:  ana@example.com\n\
         Cc:  team@example.com\n\
         Bcc: audit@example.com\n\
         From: Events Team <events@example.com>\n\
         Content-Type: text/html; charset=utf-8\n\
         MIME-Version: 1.0\n\
         Subject: =?utf-8?B?SGVsbG8gQW5h?=\n\
         \n\
         <p>Hi Ana, see you at Room 4.</p>"
    );
}

#[tokio::test]
async fn test_send_email_rejected_status_is_false() {
    let server = setup_server().await;
    mount_send(&server, 403, 1).await;

    let mailer = mailer_for(&server);
    let outcome = mailer
        .send_email(
            &Template::new("Hello", "<p>Hi</p>"),
            &Recipients::to("ana@example.com"),
            None,
            &MergeFields::new(),
        )
        .await;

    assert_eq!(outcome, SendOutcome::Sent(false));
}

#[tokio::test]
async fn test_send_email_missing_fields_makes_no_requests() {
    let server = setup_server().await;
    mount_send(&server, 200, 0).await;

    let mailer = mailer_for(&server);
    let outcome = mailer
        .send_email(
            &Template::new("Hello {{name}}", "<p>{{greeting}} {{name}}</p>"),
            &Recipients::to("ana@example.com"),
            None,
            &MergeFields::new(),
        )
        .await;

    assert_eq!(
        outcome,
        SendOutcome::Failed(
            "Invalid Merge Fields Provided. Missing fields: name, greeting.".to_string()
        )
    );
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_token_failure_is_returned_as_message() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;
    mount_send(&server, 200, 0).await;

    let mailer = mailer_for(&server);
    let outcome = mailer
        .send_email(
            &Template::new("Hello", "<p>Hi</p>"),
            &Recipients::to("ana@example.com"),
            None,
            &MergeFields::new(),
        )
        .await;

    let message = outcome.error().unwrap();
    assert!(message.starts_with("Authentication failed:"));
    assert!(message.contains("invalid_grant"));
}

#[tokio::test]
async fn test_send_email_from_draft() {
    let server = setup_server().await;
    mount_draft_search(
        &server,
        "subject:Welcome",
        json!({
            "drafts": [{ "id": "r-5082", "message": { "id": "18c2f0a1b2c3d4e5" } }],
            "resultSizeEstimate": 1
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/r-5082", DRAFTS_PATH)))
        .and(query_param("format", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(draft_json(
            "Welcome {{name}}",
            "<p>Dear {{name}}, your seat is {{seat}}.</p>",
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    mount_send(&server, 200, 1).await;

    let mailer = mailer_for(&server);
    let fields = MergeFields::new().with("name", "Ana").with("seat", 12);
    let outcome = mailer
        .send_email_from_draft("Welcome", &Recipients::to("ana@example.com"), None, &fields)
        .await;

    assert_eq!(outcome, SendOutcome::Sent(true));

    let sent = sent_messages(&server).await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("\nFrom:\n"));
    assert!(sent[0].contains("\nSubject: =?utf-8?B?V2VsY29tZSBBbmE=?=\n"));
    assert!(sent[0].ends_with("\n\n<p>Dear Ana, your seat is 12.</p>"));
}

#[tokio::test]
async fn test_send_email_from_draft_not_found() {
    let server = setup_server().await;
    mount_draft_search(&server, "subject:Nothing", json!({ "resultSizeEstimate": 0 })).await;
    mount_send(&server, 200, 0).await;

    let mailer = mailer_for(&server);
    let outcome = mailer
        .send_email_from_draft(
            "Nothing",
            &Recipients::to("ana@example.com"),
            None,
            &MergeFields::new(),
        )
        .await;

    assert_eq!(outcome, SendOutcome::Failed("No draft found.".to_string()));
}

#[tokio::test]
async fn test_send_email_from_draft_ambiguous() {
    let server = setup_server().await;
    mount_draft_search(
        &server,
        "subject:Welcome",
        json!({
            "drafts": [{ "id": "r-1" }, { "id": "r-2" }],
            "resultSizeEstimate": 2
        }),
    )
    .await;
    mount_send(&server, 200, 0).await;

    let mailer = mailer_for(&server);
    let outcome = mailer
        .send_email_from_draft(
            "Welcome",
            &Recipients::to("ana@example.com"),
            None,
            &MergeFields::new(),
        )
        .await;

    assert_eq!(
        outcome,
        SendOutcome::Failed("More than one draft found! Please refine query.".to_string())
    );
}

#[tokio::test]
async fn test_send_email_from_draft_with_attachment() {
    let server = setup_server().await;
    mount_draft_search(&server, "subject:Invoice", json!({ "drafts": [{ "id": "r-5082" }] })).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/r-5082", DRAFTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(draft_json(
            "Invoice",
            "",
            Some("ANGjdJ8wq3Xb"),
        )))
        .mount(&server)
        .await;
    mount_send(&server, 200, 0).await;

    let mailer = mailer_for(&server);
    let outcome = mailer
        .send_email_from_draft(
            "Invoice",
            &Recipients::to("ana@example.com"),
            None,
            &MergeFields::new(),
        )
        .await;

    assert_eq!(
        outcome,
        SendOutcome::Failed("Cannot send attachment with this method.".to_string())
    );
}

#[tokio::test]
async fn test_draft_search_provider_error() {
    let server = setup_server().await;
    Mock::given(method("GET"))
        .and(path(DRAFTS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&server)
        .await;
    mount_send(&server, 200, 0).await;

    let mailer = mailer_for(&server);
    let outcome = mailer
        .send_email_from_draft(
            "Welcome",
            &Recipients::to("ana@example.com"),
            None,
            &MergeFields::new(),
        )
        .await;

    assert_eq!(
        outcome,
        SendOutcome::Failed("Mail API error (500): backend error".to_string())
    );
}
