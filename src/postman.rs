//! The Postman orchestrator
//!
//! A [`Postman`] binds template search roots to one delivery channel behind a
//! single send entry point. Literal sends compose and deliver directly;
//! templated sends go through a short-lived [`TemplateScope`] that carries the
//! resolved handles, so no template state ever lives on the orchestrator
//! itself and concurrent literal sends stay safe on a shared instance.

use std::sync::Arc;

use tracing::debug;

use crate::channels::DeliveryChannel;
use crate::message::{Attachment, ComposedMessage, Recipients};
use crate::templates::{
	ContentRenderer, SearchRoots, TemplateContext, TemplateHandle, TemplateLocator,
};
use crate::{MailError, MailResult};

/// Optional per-send fields, each defaulting to absent.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
	pub cc: Option<Recipients>,
	pub bcc: Option<Recipients>,
	pub reply_to: Option<String>,
	pub attach: Vec<std::path::PathBuf>,
}

/// Binds template resolution and a delivery channel behind one `send`.
///
/// # Examples
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> letterbox::MailResult<()> {
/// use std::sync::Arc;
/// use letterbox::{CaptureChannel, Postman, SendOptions};
///
/// let (channel, outbox) = CaptureChannel::new();
/// let postman = Postman::new("templates/", Arc::new(channel));
///
/// postman
/// 	.send(
/// 		"bill@example.com",
/// 		"larry@example.com",
/// 		"My cool mail",
/// 		"hai",
/// 		SendOptions::default(),
/// 	)
/// 	.await?;
/// assert_eq!(outbox.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Postman {
	locator: TemplateLocator,
	renderer: ContentRenderer,
	channel: Arc<dyn DeliveryChannel>,
}

impl Postman {
	pub fn new(roots: impl Into<SearchRoots>, channel: Arc<dyn DeliveryChannel>) -> Self {
		Self {
			locator: TemplateLocator::new(roots),
			renderer: ContentRenderer::new(),
			channel,
		}
	}

	/// Send a message with a literal plain-text body.
	pub async fn send(
		&self,
		from: &str,
		to: impl Into<Recipients>,
		subject: &str,
		body: &str,
		options: SendOptions,
	) -> MailResult<()> {
		self.compose_and_deliver(
			from,
			to.into(),
			subject,
			Some(body.to_string()),
			None,
			options,
		)
		.await
	}

	/// Enter template mode for `name`.
	///
	/// Resolves the plain/HTML pair up front, falling back to the unified
	/// single-file format as the plain side, and fails with
	/// [`MailError::NoTemplate`] when nothing is found. The returned scope
	/// carries the resolved handles; dropping it is the only cleanup, so a
	/// failed templated send can never leave the postman in template mode.
	pub fn template(&self, name: &str) -> MailResult<TemplateScope<'_>> {
		let (plain, html) = self.locator.find_pair(name);
		let plain = plain.or_else(|| self.locator.find_single(name));
		if plain.is_none() && html.is_none() {
			return Err(MailError::NoTemplate(name.to_string()));
		}
		debug!(
			template = name,
			plain = plain.is_some(),
			html = html.is_some(),
			"entering template mode"
		);
		Ok(TemplateScope {
			postman: self,
			plain,
			html,
		})
	}

	async fn compose_and_deliver(
		&self,
		from: &str,
		to: Recipients,
		subject: &str,
		plain: Option<String>,
		html: Option<String>,
		options: SendOptions,
	) -> MailResult<()> {
		let mut builder = ComposedMessage::builder()
			.from(from)
			.to(to)
			.subject(subject);
		if let Some(plain) = plain {
			builder = builder.plain(plain);
		}
		if let Some(html) = html {
			builder = builder.html(html);
		}
		if let Some(cc) = options.cc {
			builder = builder.cc(cc);
		}
		if let Some(bcc) = options.bcc {
			builder = builder.bcc(bcc);
		}
		if let Some(reply_to) = options.reply_to {
			builder = builder.reply_to(reply_to);
		}
		for path in &options.attach {
			builder = builder.attachment(Attachment::resolve(path)?);
		}

		// Composition fails before the channel sees anything.
		let message = builder.build()?;
		debug!(
			from,
			to = ?message.to(),
			subject,
			structure = ?message.structure(),
			"delivering composed message"
		);
		self.channel.deliver(&message).await
	}
}

/// Template mode, scoped to one send.
///
/// Holds the handles resolved when the scope was entered and borrows its
/// [`Postman`]; content renders against a caller-supplied context at send
/// time.
pub struct TemplateScope<'a> {
	postman: &'a Postman,
	plain: Option<TemplateHandle>,
	html: Option<TemplateHandle>,
}

impl TemplateScope<'_> {
	pub fn plain_handle(&self) -> Option<&TemplateHandle> {
		self.plain.as_ref()
	}

	pub fn html_handle(&self) -> Option<&TemplateHandle> {
		self.html.as_ref()
	}

	/// Render the resolved templates with `context`, then compose and
	/// deliver.
	pub async fn send(
		&self,
		from: &str,
		to: impl Into<Recipients>,
		subject: &str,
		context: &TemplateContext,
		options: SendOptions,
	) -> MailResult<()> {
		let (plain, html) =
			self.postman
				.renderer
				.render_body(self.plain.as_ref(), self.html.as_ref(), context)?;
		self.postman
			.compose_and_deliver(from, to.into(), subject, plain, html, options)
			.await
	}
}
