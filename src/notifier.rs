//! Fire-and-forget `notify(recipient, template_key, payload)`. Failures
//! here MUST NOT fail the caller's trade, so every call is logged and
//! swallowed rather than returning a `Result` callers would feel obliged
//! to check.
//!
//! The original backend dispatches these as Telegram bot messages; that
//! transport is out of scope here, so this implementation only logs what
//! would have been sent. Swapping in a real transport means replacing
//! the body of `notify`, not its signature.

use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct Notifier;

impl Notifier {
    pub fn new() -> Self {
        Notifier
    }

    /// Dispatches a notification. Never returns an error to the caller;
    /// a delivery failure is logged at `warn` and otherwise ignored.
    pub async fn notify(&self, recipient: Uuid, template_key: &str, payload: Value) {
        log::info!("notify user={recipient} template={template_key} payload={payload}");
    }
}
