//! Social-post channel
//!
//! Posts a recipient mention plus body through a social gateway. Unlike SMS,
//! this channel enforces business rules before any network call: the sending
//! identity must have a registered credential pair, and the rendered post
//! must fit the service's length ceiling.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::{MailError, MailResult};

/// Maximum length of a rendered post, in characters.
pub const MAX_POST_LENGTH: usize = 140;

/// A registered credential pair for one sending identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialAccount {
	pub access_token: String,
	pub access_token_secret: String,
}

impl SocialAccount {
	pub fn new(access_token: impl Into<String>, access_token_secret: impl Into<String>) -> Self {
		Self {
			access_token: access_token.into(),
			access_token_secret: access_token_secret.into(),
		}
	}
}

/// The service's delivery primitives: a public post and a direct message.
#[async_trait]
pub trait SocialGateway: Send + Sync {
	async fn post(&self, account: &SocialAccount, status: &str) -> MailResult<()>;

	async fn direct_message(
		&self,
		account: &SocialAccount,
		to: &str,
		body: &str,
	) -> MailResult<()>;
}

/// Channel that posts `@{to} {body}` from a registered account.
///
/// # Examples
///
/// ```rust,no_run
/// # use async_trait::async_trait;
/// # use letterbox::{MailResult, SocialAccount, SocialChannel, SocialGateway};
/// # struct Gateway;
/// # #[async_trait]
/// # impl SocialGateway for Gateway {
/// # 	async fn post(&self, _: &SocialAccount, _: &str) -> MailResult<()> { Ok(()) }
/// # 	async fn direct_message(&self, _: &SocialAccount, _: &str, _: &str) -> MailResult<()> { Ok(()) }
/// # }
/// # #[tokio::main]
/// # async fn main() -> MailResult<()> {
/// let channel = SocialChannel::new(Gateway)
/// 	.with_account("sru_dev", SocialAccount::new("token", "secret"));
///
/// channel.send("thatdavidmiller", "sru_dev", "Hello!", false).await?;
/// # Ok(())
/// # }
/// ```
pub struct SocialChannel<G: SocialGateway> {
	gateway: G,
	accounts: HashMap<String, SocialAccount>,
}

impl<G: SocialGateway> SocialChannel<G> {
	pub fn new(gateway: G) -> Self {
		Self {
			gateway,
			accounts: HashMap::new(),
		}
	}

	pub fn with_account(mut self, name: impl Into<String>, account: SocialAccount) -> Self {
		self.accounts.insert(name.into(), account);
		self
	}

	/// Send `body` as an @-mention of `to` from the account `from`.
	///
	/// Fails with [`MailError::AccountNotFound`] when `from` has no
	/// registered credentials and with [`MailError::MessageTooLong`] when
	/// the rendered post exceeds [`MAX_POST_LENGTH`] characters; both checks
	/// run before any network call. With `direct` set, the body goes through
	/// the gateway's direct-message primitive instead of a public post.
	pub async fn send(&self, to: &str, from: &str, body: &str, direct: bool) -> MailResult<()> {
		let account = self
			.accounts
			.get(from)
			.ok_or_else(|| MailError::AccountNotFound(from.to_string()))?;

		let status = format!("@{to} {body}");
		let length = status.chars().count();
		if length > MAX_POST_LENGTH {
			return Err(MailError::MessageTooLong {
				length,
				limit: MAX_POST_LENGTH,
			});
		}

		if direct {
			debug!(to, from, "sending direct message");
			self.gateway.direct_message(account, to, body).await
		} else {
			debug!(to, from, "posting status");
			self.gateway.post(account, &status).await
		}
	}
}
