//! Server side of the contact form: validates a submission and forwards it to
//! a mail relay.

use crate::contact::form::ContactForm;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Incoming request to the relay endpoint.
pub struct RelayRequest {
    /// HTTP method.
    pub method: String,
    #[serde(default)]
    /// Parsed JSON body, if any.
    pub body: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Response returned by [`handle`].
pub struct RelayResponse {
    /// HTTP status code.
    pub status: u16,
    /// Extra response headers.
    pub headers: Vec<(String, String)>,
    /// JSON response body.
    pub body: serde_json::Value,
}

impl RelayResponse {
    fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Relay account settings. `to` falls back to `user`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct RelaySettings {
    /// Sending account.
    pub user: Option<String>,
    /// App password of the sending account.
    pub password: Option<String>,
    /// Recipient; defaults to `user`.
    pub to: Option<String>,
}

impl RelaySettings {
    /// Read `GMAIL_USER`, `GMAIL_APP_PASSWORD` and `CONTACT_TO`.
    pub fn from_env() -> Self {
        let var = |k: &str| std::env::var(k).ok().filter(|v| !v.is_empty());
        Self {
            user: var("GMAIL_USER"),
            password: var("GMAIL_APP_PASSWORD"),
            to: var("CONTACT_TO"),
        }
    }
}

/// Authenticated account used to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayCredentials {
    /// Account name.
    pub user: String,
    /// Account password.
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// A composed notification mail.
pub struct OutgoingMail {
    /// Display name of the sender at the relay account.
    pub from: String,
    /// The sender's own address.
    pub reply_to: String,
    /// Recipient.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
}

impl OutgoingMail {
    /// Build the mail for `form`, sent from `user` to `to`.
    pub fn compose(form: &ContactForm, user: &str, to: &str) -> Self {
        Self {
            from: format!("\"{}\" <{}>", form.name, user),
            reply_to: form.email.clone(),
            to: to.to_owned(),
            subject: format!("New website message from {}", form.name),
            text: format!("Name: {}\nEmail: {}\n\n{}", form.name, form.email, form.message),
        }
    }
}

/// Mail delivery backend.
pub trait MailRelay {
    /// Deliver `mail` using `credentials`.
    fn send(&self, credentials: &RelayCredentials, mail: &OutgoingMail) -> anyhow::Result<()>;
}

fn required_field(body: &serde_json::Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Handle one request to the contact endpoint.
pub fn handle(
    request: &RelayRequest,
    settings: &RelaySettings,
    relay: &dyn MailRelay,
) -> RelayResponse {
    if !request.method.eq_ignore_ascii_case("POST") {
        let mut response = RelayResponse::error(405, "Method Not Allowed");
        response.headers.push(("Allow".to_owned(), "POST".to_owned()));
        return response;
    }

    let null = serde_json::Value::Null;
    let body = request.body.as_ref().unwrap_or(&null);
    let (Some(name), Some(email), Some(message)) = (
        required_field(body, "name"),
        required_field(body, "email"),
        required_field(body, "message"),
    ) else {
        return RelayResponse::error(400, "Missing required fields.");
    };
    let form = ContactForm {
        name,
        email,
        message,
    };

    let (Some(user), Some(password)) = (settings.user.clone(), settings.password.clone()) else {
        return RelayResponse::error(500, "Email server not configured.");
    };
    let to = settings.to.clone().unwrap_or_else(|| user.clone());
    let mail = OutgoingMail::compose(&form, &user, &to);

    match relay.send(&RelayCredentials { user, password }, &mail) {
        Ok(()) => RelayResponse::json(200, serde_json::json!({ "ok": true })),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "email send error");
            RelayResponse::error(500, "Failed to send email.")
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/contact/relay.rs"]
mod tests;
