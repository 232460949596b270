//! Tempo Mail — a bounded, single-consumer dispatch queue for outbound
//! mail.
//!
//! Request handlers hand a [`MailJob`] to a [`MailQueue`] and get back
//! only an admission decision; one background worker sends the jobs in
//! FIFO order through a [`MailTransport`]. Delivery outcomes are logged,
//! never reported to the submitter.

pub mod error;
pub mod job;
pub mod queue;
pub mod transport;

pub use error::{DispatchError, TransportError};
pub use job::MailJob;
pub use queue::{DispatchConfig, DispatchQueue, DispatchStats, MailQueue};
pub use transport::{LogTransport, MailTransport};
