//! Host mail backend channel
//!
//! Delegates delivery to an externally supplied mail facility, for hosts
//! (typically web frameworks) that already own an outgoing-mail pipeline.
//! The sink is an opaque boundary: this channel unpacks composition fields,
//! checks what the backend structurally cannot do, and hands over.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::message::ComposedMessage;
use crate::{MailError, MailResult};

use super::DeliveryChannel;

/// The field set a host mail backend accepts: a multi-alternative mail
/// without attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendMail {
	pub subject: String,
	pub plain: String,
	pub from_email: String,
	pub to: Vec<String>,
	pub html: Option<String>,
	pub cc: Vec<String>,
	pub bcc: Vec<String>,
	pub headers: Vec<(String, String)>,
}

/// The host's "send multi-alternative mail" primitive.
#[async_trait]
pub trait MailSink: Send + Sync {
	async fn send_multipart(&self, mail: BackendMail) -> MailResult<()>;
}

/// Channel that forwards composition fields to a [`MailSink`].
///
/// Attachments are structurally unsupported by the sink interface and fail
/// fast with [`MailError::NotSupported`] instead of being dropped. Cc and
/// Bcc pass through; the sink keeps Bcc out of visible headers.
pub struct HostBackendChannel {
	sink: Arc<dyn MailSink>,
}

impl HostBackendChannel {
	pub fn new(sink: Arc<dyn MailSink>) -> Self {
		Self { sink }
	}
}

#[async_trait]
impl DeliveryChannel for HostBackendChannel {
	async fn deliver(&self, message: &ComposedMessage) -> MailResult<()> {
		if !message.attachments().is_empty() {
			return Err(MailError::NotSupported(
				"the host mail backend cannot carry attachments".to_string(),
			));
		}

		debug!(
			to = ?message.to(),
			subject = message.subject(),
			"delegating to host mail backend"
		);
		self.sink
			.send_multipart(BackendMail {
				subject: message.subject().to_string(),
				plain: message.plain().unwrap_or_default().to_string(),
				from_email: message.from_email().to_string(),
				to: message.to().to_vec(),
				html: message.html().map(String::from),
				cc: message.cc().to_vec(),
				bcc: message.bcc().to_vec(),
				headers: Vec::new(),
			})
			.await
	}
}
