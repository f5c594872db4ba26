use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::error::{FolioError, FolioResult};
use crate::sched::host::{Scheduler, TaskHandle};
use crate::sched::liveness::Liveness;

/// Notice shown for any failed submission. Details are only logged.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
/// How long the "sent" notice stays before the button returns to idle.
pub const SENT_NOTICE_MS: u64 = 1500;

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Fields of the contact form; serialises to the POSTed JSON body.
pub struct ContactForm {
    /// Sender name.
    pub name: String,
    /// Sender address, used as reply-to.
    pub email: String,
    /// Message text.
    pub message: String,
}

impl ContactForm {
    /// Form with all three fields set.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Update one field by its input name.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> FolioResult<()> {
        let slot = match field {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "message" => &mut self.message,
            other => {
                return Err(FolioError::validation(format!(
                    "unknown contact field '{other}'"
                )));
            }
        };
        *slot = value.into();
        Ok(())
    }

    /// Whether every field is empty.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.message.is_empty()
    }

    /// The JSON body posted to the endpoint.
    pub fn to_json(&self) -> FolioResult<String> {
        serde_json::to_string(self).map_err(|e| FolioError::serde(e.to_string()))
    }
}

/// Outbound HTTP used by the contact form.
pub trait MessageTransport {
    /// POST `body` as `application/json` to `url` and return the response
    /// status. `Err` means the request never completed.
    fn post_json(&self, url: &str, body: &str) -> anyhow::Result<u16>;
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
/// Submission state shown on the send button.
pub enum SubmitStatus {
    /// Nothing in progress.
    Idle,
    /// Request in flight.
    Sending,
    /// The endpoint accepted the message; reverts to idle after [`SENT_NOTICE_MS`].
    Sent,
    /// The last attempt failed.
    Failed {
        /// User-facing notice, always [`GENERIC_FAILURE`].
        notice: String,
    },
}

struct ControllerState {
    form: ContactForm,
    status: SubmitStatus,
    revert: Option<TaskHandle>,
}

/// Contact form state and submission.
///
/// Failures stay here: they are logged, surfaced as [`GENERIC_FAILURE`] and
/// leave the form untouched for another attempt.
pub struct ContactController {
    endpoint: String,
    sched: Scheduler,
    state: Rc<RefCell<ControllerState>>,
    alive: Liveness,
}

impl ContactController {
    /// Idle controller with an empty form, posting to `endpoint`.
    pub fn new(endpoint: impl Into<String>, sched: Scheduler) -> Self {
        Self {
            endpoint: endpoint.into(),
            sched,
            state: Rc::new(RefCell::new(ControllerState {
                form: ContactForm::default(),
                status: SubmitStatus::Idle,
                revert: None,
            })),
            alive: Liveness::new(),
        }
    }

    /// Endpoint the form posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current form contents.
    pub fn form(&self) -> ContactForm {
        self.state.borrow().form.clone()
    }

    /// Current submission state.
    pub fn status(&self) -> SubmitStatus {
        self.state.borrow().status.clone()
    }

    /// Update one field; see [`ContactForm::set_field`].
    pub fn set_field(&self, field: &str, value: impl Into<String>) -> FolioResult<()> {
        self.state.borrow_mut().form.set_field(field, value)
    }

    /// Replace the whole form.
    pub fn fill(&self, form: ContactForm) {
        self.state.borrow_mut().form = form;
    }

    /// Send the current form through `transport`.
    #[tracing::instrument(skip(self, transport), fields(endpoint = %self.endpoint))]
    pub fn submit(&self, transport: &dyn MessageTransport) -> SubmitStatus {
        let body = {
            let mut st = self.state.borrow_mut();
            if st.status == SubmitStatus::Sending {
                return SubmitStatus::Sending;
            }
            if let Some(revert) = st.revert.take() {
                self.sched.cancel(revert);
            }
            st.status = SubmitStatus::Sending;
            st.form.to_json()
        };

        let outcome = body.and_then(|body| {
            let status = transport
                .post_json(&self.endpoint, &body)
                .map_err(|e| FolioError::submission(format!("{e:#}")))?;
            if (200..300).contains(&status) {
                Ok(())
            } else {
                Err(FolioError::submission(format!("request failed: {status}")))
            }
        });

        match outcome {
            Ok(()) => self.on_sent(),
            Err(err) => {
                tracing::warn!(error = %err, "contact form error");
                self.state.borrow_mut().status = SubmitStatus::Failed {
                    notice: GENERIC_FAILURE.to_owned(),
                };
            }
        }
        self.status()
    }

    fn on_sent(&self) {
        {
            let mut st = self.state.borrow_mut();
            st.form = ContactForm::default();
            st.status = SubmitStatus::Sent;
        }
        let state = Rc::clone(&self.state);
        let alive = self.alive.clone();
        let revert = self.sched.set_timeout(SENT_NOTICE_MS, move |_| {
            if !alive.is_alive() {
                return;
            }
            let mut st = state.borrow_mut();
            st.revert = None;
            if st.status == SubmitStatus::Sent {
                st.status = SubmitStatus::Idle;
            }
        });
        self.state.borrow_mut().revert = Some(revert);
    }

    /// Cancel the pending "sent" revert. Idempotent.
    pub fn dispose(&self) {
        if !self.alive.kill() {
            return;
        }
        if let Some(revert) = self.state.borrow_mut().revert.take() {
            self.sched.cancel(revert);
        }
    }
}

impl Drop for ContactController {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/contact/form.rs"]
mod tests;
