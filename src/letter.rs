//! Declarative message descriptors
//!
//! A [`Letter`] is the static description of one message: who it is from and
//! to, what it says (a literal body or a template plus context), and the
//! optional trimmings. `send` resolves which path applies and drives the
//! bound [`Postman`]; every defaulting rule lives here, explicitly.

use std::path::PathBuf;

use crate::message::Recipients;
use crate::postman::{Postman, SendOptions};
use crate::templates::TemplateContext;
use crate::{MailError, MailResult};

/// One message, described declaratively.
///
/// Built fluently and consumed by [`Letter::send`]. A literal body always
/// wins over a template; a letter with neither fails with
/// [`MailError::NoContent`].
///
/// # Examples
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> letterbox::MailResult<()> {
/// # use std::sync::Arc;
/// # use letterbox::{CaptureChannel, Letter, Postman};
/// # let (channel, _outbox) = CaptureChannel::new();
/// # let postman = Postman::new("templates/", Arc::new(channel));
/// Letter::new("bill@example.com", "larry@example.com")
/// 	.subject("My cool mail")
/// 	.body("hai")
/// 	.attach("/tmp/some.file")
/// 	.send(&postman)
/// 	.await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Letter {
	from: String,
	to: Recipients,
	subject: Option<String>,
	body: Option<String>,
	template: Option<String>,
	context: TemplateContext,
	cc: Option<Recipients>,
	bcc: Option<Recipients>,
	reply_to: Option<String>,
	attach: Vec<PathBuf>,
}

/// File paths to attach, accepting a single path or a list.
#[derive(Debug, Clone, Default)]
pub struct AttachPaths(Vec<PathBuf>);

impl From<&str> for AttachPaths {
	fn from(path: &str) -> Self {
		AttachPaths(vec![PathBuf::from(path)])
	}
}

impl From<String> for AttachPaths {
	fn from(path: String) -> Self {
		AttachPaths(vec![PathBuf::from(path)])
	}
}

impl From<PathBuf> for AttachPaths {
	fn from(path: PathBuf) -> Self {
		AttachPaths(vec![path])
	}
}

impl From<Vec<PathBuf>> for AttachPaths {
	fn from(paths: Vec<PathBuf>) -> Self {
		AttachPaths(paths)
	}
}

impl From<Vec<&str>> for AttachPaths {
	fn from(paths: Vec<&str>) -> Self {
		AttachPaths(paths.into_iter().map(PathBuf::from).collect())
	}
}

impl Letter {
	pub fn new(from: impl Into<String>, to: impl Into<Recipients>) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			subject: None,
			body: None,
			template: None,
			context: TemplateContext::new(),
			cc: None,
			bcc: None,
			reply_to: None,
			attach: Vec::new(),
		}
	}

	pub fn subject(mut self, subject: impl Into<String>) -> Self {
		self.subject = Some(subject.into());
		self
	}

	pub fn body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());
		self
	}

	pub fn template(mut self, name: impl Into<String>) -> Self {
		self.template = Some(name.into());
		self
	}

	pub fn context(mut self, context: TemplateContext) -> Self {
		self.context = context;
		self
	}

	pub fn add_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.context.insert(key.into(), value);
		self
	}

	pub fn cc(mut self, cc: impl Into<Recipients>) -> Self {
		self.cc = Some(cc.into());
		self
	}

	pub fn bcc(mut self, bcc: impl Into<Recipients>) -> Self {
		self.bcc = Some(bcc.into());
		self
	}

	pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
		self.reply_to = Some(reply_to.into());
		self
	}

	pub fn attach(mut self, paths: impl Into<AttachPaths>) -> Self {
		self.attach.extend(paths.into().0);
		self
	}

	/// Send this letter through `postman`.
	///
	/// The subject defaults to the empty string. A literal body routes to
	/// the literal path and returns immediately, even when a template is
	/// also set; otherwise a template is required and the send goes through
	/// a template scope with whatever context is present (defaulting to an
	/// empty mapping).
	pub async fn send(&self, postman: &Postman) -> MailResult<()> {
		let subject = self.subject.clone().unwrap_or_default();
		let options = SendOptions {
			cc: self.cc.clone(),
			bcc: self.bcc.clone(),
			reply_to: self.reply_to.clone(),
			attach: self.attach.clone(),
		};

		if let Some(body) = &self.body {
			return postman
				.send(&self.from, self.to.clone(), &subject, body, options)
				.await;
		}

		let name = self.template.as_deref().ok_or(MailError::NoContent)?;
		let scope = postman.template(name)?;
		scope
			.send(&self.from, self.to.clone(), &subject, &self.context, options)
			.await
	}
}
