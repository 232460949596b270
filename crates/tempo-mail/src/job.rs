//! The unit of work carried by the dispatch queue.

use uuid::Uuid;

/// A mail waiting to be sent. Lives only in memory; a crash loses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailJob {
    /// Correlates the admission log line with the delivery log line.
    pub id: Uuid,
    pub recipient: String,
    pub body: String,
}

impl MailJob {
    pub fn new(recipient: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            body: body.into(),
        }
    }
}
