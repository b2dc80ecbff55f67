//! Delivery channels
//!
//! A channel accepts a fully composed message and performs channel-specific
//! delivery. Channels own their connection parameters, are immutable after
//! construction, and keep no per-send state, so the orchestrator can hold one
//! behind an `Arc` and share it across calls.
//!
//! Email-shaped transports implement [`DeliveryChannel`]; the SMS and social
//! transports have simpler body-and-addresses contracts and live in
//! [`sms`] and [`social`].

pub mod host;
pub mod sms;
pub mod smtp;
pub mod social;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::message::ComposedMessage;
use crate::{MailResult, wire};

pub use host::{BackendMail, HostBackendChannel, MailSink};
pub use sms::{CarrierGateway, SmsChannel};
pub use social::{SocialAccount, SocialChannel, SocialGateway};

/// A delivery transport for composed messages.
///
/// Implementations do not retry and do not inspect message semantics beyond
/// what their variant requires; every call is one independent delivery
/// attempt.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
	async fn deliver(&self, message: &ComposedMessage) -> MailResult<()>;
}

/// Development channel that prints the wire text to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleChannel;

#[async_trait]
impl DeliveryChannel for ConsoleChannel {
	async fn deliver(&self, message: &ComposedMessage) -> MailResult<()> {
		println!("{}", wire::render(message));
		println!("{}", "-".repeat(76));
		Ok(())
	}
}

/// Handle over the messages captured by a [`CaptureChannel`].
///
/// Cloneable and internally synchronized; entries are the literal wire text
/// that would have been transmitted, in delivery order.
///
/// # Examples
///
/// ```
/// # #[tokio::main]
/// # async fn main() -> letterbox::MailResult<()> {
/// use letterbox::{CaptureChannel, ComposedMessage, DeliveryChannel};
///
/// let (channel, outbox) = CaptureChannel::new();
/// let message = ComposedMessage::builder()
/// 	.from("bill@example.com")
/// 	.to("larry@example.com")
/// 	.subject("hi")
/// 	.plain("hai")
/// 	.build()?;
/// channel.deliver(&message).await?;
///
/// assert_eq!(outbox.len(), 1);
/// assert!(outbox.messages()[0].contains("Subject: hi"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Outbox {
	messages: Arc<Mutex<Vec<String>>>,
}

impl Outbox {
	/// Snapshot of the captured wire texts.
	pub fn messages(&self) -> Vec<String> {
		self.messages.lock().unwrap().clone()
	}

	pub fn len(&self) -> usize {
		self.messages.lock().unwrap().len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.lock().unwrap().is_empty()
	}

	/// Drop everything captured so far.
	pub fn clear(&self) {
		self.messages.lock().unwrap().clear();
	}

	fn push(&self, message: String) {
		self.messages.lock().unwrap().push(message);
	}
}

/// Test channel that captures wire text instead of transmitting it.
///
/// Inject it wherever a real channel would go; the paired [`Outbox`] handle
/// observes everything "sent" through it.
#[derive(Debug, Clone, Default)]
pub struct CaptureChannel {
	outbox: Outbox,
}

impl CaptureChannel {
	pub fn new() -> (Self, Outbox) {
		let outbox = Outbox::default();
		let channel = Self {
			outbox: outbox.clone(),
		};
		(channel, outbox)
	}

	pub fn outbox(&self) -> Outbox {
		self.outbox.clone()
	}
}

#[async_trait]
impl DeliveryChannel for CaptureChannel {
	async fn deliver(&self, message: &ComposedMessage) -> MailResult<()> {
		debug!(
			to = ?message.to(),
			subject = message.subject(),
			"capturing message instead of delivering"
		);
		self.outbox.push(wire::render(message));
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn sample() -> ComposedMessage {
		ComposedMessage::builder()
			.from("bill@example.com")
			.to("larry@example.com")
			.subject("My cool mail")
			.plain("hai")
			.build()
			.unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn capture_records_wire_text() {
		// Arrange
		let (channel, outbox) = CaptureChannel::new();

		// Act
		channel.deliver(&sample()).await.unwrap();

		// Assert
		let messages = outbox.messages();
		assert_eq!(messages.len(), 1);
		assert!(messages[0].contains("From: bill@example.com"));
		assert!(messages[0].contains("hai"));
	}

	#[rstest]
	#[tokio::test]
	async fn identical_sends_produce_two_independent_entries() {
		// Arrange
		let (channel, outbox) = CaptureChannel::new();
		let message = sample();

		// Act
		channel.deliver(&message).await.unwrap();
		channel.deliver(&message).await.unwrap();

		// Assert: no deduplication
		assert_eq!(outbox.len(), 2);
	}

	#[rstest]
	#[tokio::test]
	async fn clear_empties_the_outbox() {
		let (channel, outbox) = CaptureChannel::new();
		channel.deliver(&sample()).await.unwrap();
		outbox.clear();
		assert!(outbox.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn console_channel_delivers_without_error() {
		let channel = ConsoleChannel;
		assert!(channel.deliver(&sample()).await.is_ok());
	}
}
