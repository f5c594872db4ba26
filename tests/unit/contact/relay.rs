use super::*;
use std::cell::RefCell;

#[derive(Default)]
struct Outbox {
    sent: RefCell<Vec<OutgoingMail>>,
    fail: bool,
}

impl MailRelay for Outbox {
    fn send(&self, credentials: &RelayCredentials, mail: &OutgoingMail) -> anyhow::Result<()> {
        assert_eq!(credentials.user, "site@example.com");
        if self.fail {
            anyhow::bail!("smtp timeout");
        }
        self.sent.borrow_mut().push(mail.clone());
        Ok(())
    }
}

fn settings() -> RelaySettings {
    RelaySettings {
        user: Some("site@example.com".to_owned()),
        password: Some("secret".to_owned()),
        to: None,
    }
}

fn post(body: serde_json::Value) -> RelayRequest {
    RelayRequest {
        method: "POST".to_owned(),
        body: Some(body),
    }
}

#[test]
fn forwards_a_valid_message() {
    let outbox = Outbox::default();
    let resp = handle(
        &post(serde_json::json!({ "name": "A", "email": "a@b.com", "message": "hi" })),
        &settings(),
        &outbox,
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, serde_json::json!({ "ok": true }));

    let sent = outbox.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "New website message from A");
    assert_eq!(sent[0].text, "Name: A\nEmail: a@b.com\n\nhi");
    assert_eq!(sent[0].reply_to, "a@b.com");
    assert_eq!(sent[0].to, "site@example.com");
    assert_eq!(sent[0].from, "\"A\" <site@example.com>");
}

#[test]
fn rejects_other_methods() {
    let resp = handle(
        &RelayRequest {
            method: "GET".to_owned(),
            body: None,
        },
        &settings(),
        &Outbox::default(),
    );
    assert_eq!(resp.status, 405);
    assert_eq!(resp.header("allow"), Some("POST"));
}

#[test]
fn missing_or_empty_fields_are_a_bad_request() {
    for body in [
        serde_json::json!({ "name": "A", "email": "a@b.com" }),
        serde_json::json!({ "name": "", "email": "a@b.com", "message": "hi" }),
        serde_json::Value::Null,
    ] {
        let resp = handle(&post(body), &settings(), &Outbox::default());
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["error"], "Missing required fields.");
    }
}

#[test]
fn unconfigured_relay_is_a_server_error() {
    let resp = handle(
        &post(serde_json::json!({ "name": "A", "email": "a@b.com", "message": "hi" })),
        &RelaySettings::default(),
        &Outbox::default(),
    );
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body["error"], "Email server not configured.");
}

#[test]
fn relay_failure_is_a_server_error() {
    let outbox = Outbox {
        fail: true,
        ..Outbox::default()
    };
    let mut s = settings();
    s.to = Some("owner@example.com".to_owned());
    let resp = handle(
        &post(serde_json::json!({ "name": "A", "email": "a@b.com", "message": "hi" })),
        &s,
        &outbox,
    );
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body["error"], "Failed to send email.");
}
