//! The mail transmission primitive the worker calls.

use tracing::info;

use crate::error::TransportError;
use crate::job::MailJob;

/// Sends one mail. Only ever called from the dispatch worker, one job
/// at a time.
pub trait MailTransport: Send + Sync + 'static {
    fn send(&self, job: &MailJob) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Transport that writes each mail to the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    async fn send(&self, job: &MailJob) -> Result<(), TransportError> {
        info!(
            job_id = %job.id,
            recipient = %job.recipient,
            body = %job.body,
            "Mail sent (log transport)"
        );
        Ok(())
    }
}
