//! Short-message channel
//!
//! SMS delivery is a thin forwarding layer: the carrier gateway does all the
//! work and its errors surface unchanged.

use async_trait::async_trait;
use tracing::debug;

use crate::MailResult;

/// An external carrier gateway (e.g. a REST client for an SMS provider).
#[async_trait]
pub trait CarrierGateway: Send + Sync {
	async fn send_sms(&self, to: &str, from: &str, body: &str) -> MailResult<()>;
}

/// Channel that forwards a body and addresses to a carrier gateway.
///
/// # Examples
///
/// ```rust,no_run
/// # use async_trait::async_trait;
/// # use letterbox::{CarrierGateway, MailResult, SmsChannel};
/// # struct Carrier;
/// # #[async_trait]
/// # impl CarrierGateway for Carrier {
/// # 	async fn send_sms(&self, _: &str, _: &str, _: &str) -> MailResult<()> { Ok(()) }
/// # }
/// # #[tokio::main]
/// # async fn main() -> MailResult<()> {
/// let channel = SmsChannel::new(Carrier);
/// channel.send("+15551234567", "+15557654321", "hai").await?;
/// # Ok(())
/// # }
/// ```
pub struct SmsChannel<G: CarrierGateway> {
	gateway: G,
}

impl<G: CarrierGateway> SmsChannel<G> {
	pub fn new(gateway: G) -> Self {
		Self { gateway }
	}

	/// Send `body` to `to` from `from` as an SMS.
	pub async fn send(&self, to: &str, from: &str, body: &str) -> MailResult<()> {
		debug!(to, from, "forwarding sms to carrier gateway");
		self.gateway.send_sms(to, from, body).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{DeliveryFailure, MailError};
	use rstest::rstest;
	use std::sync::Mutex;

	#[derive(Default)]
	struct RecordingCarrier {
		sent: Mutex<Vec<(String, String, String)>>,
		fail: bool,
	}

	#[async_trait]
	impl CarrierGateway for RecordingCarrier {
		async fn send_sms(&self, to: &str, from: &str, body: &str) -> MailResult<()> {
			if self.fail {
				return Err(MailError::Delivery {
					kind: DeliveryFailure::Transport,
					message: "carrier rejected the message".to_string(),
				});
			}
			self.sent
				.lock()
				.unwrap()
				.push((to.to_string(), from.to_string(), body.to_string()));
			Ok(())
		}
	}

	#[rstest]
	#[tokio::test]
	async fn forwards_body_and_addresses() {
		// Arrange
		let channel = SmsChannel::new(RecordingCarrier::default());

		// Act
		channel.send("+15551234567", "+15557654321", "hai").await.unwrap();

		// Assert
		let sent = channel.gateway.sent.lock().unwrap();
		assert_eq!(
			sent[0],
			(
				"+15551234567".to_string(),
				"+15557654321".to_string(),
				"hai".to_string()
			)
		);
	}

	#[rstest]
	#[tokio::test]
	async fn gateway_errors_surface_unchanged() {
		// Arrange
		let channel = SmsChannel::new(RecordingCarrier {
			fail: true,
			..Default::default()
		});

		// Act
		let result = channel.send("+15551234567", "+15557654321", "hai").await;

		// Assert
		assert!(matches!(
			result,
			Err(MailError::Delivery {
				kind: DeliveryFailure::Transport,
				..
			})
		));
	}
}
