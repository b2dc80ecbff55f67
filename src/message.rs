//! Channel-agnostic message representation
//!
//! A [`ComposedMessage`] is the fully assembled form of one send: addresses,
//! subject, plain/HTML bodies and attachment parts. Channels consume it
//! without further validation; the builder enforces the content invariant
//! before any channel is touched.

use std::path::Path;

use mime::Mime;

use crate::{MailError, MailResult};

/// An address list that accepts a single address or a list.
///
/// # Examples
///
/// ```
/// use letterbox::Recipients;
///
/// let one: Recipients = "larry@example.com".into();
/// let many: Recipients = vec!["larry@example.com", "bill@example.com"].into();
/// assert_eq!(one.as_slice().len(), 1);
/// assert_eq!(many.as_slice().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients(Vec<String>);

impl Recipients {
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}

	pub fn into_vec(self) -> Vec<String> {
		self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<&str> for Recipients {
	fn from(address: &str) -> Self {
		Recipients(vec![address.to_string()])
	}
}

impl From<String> for Recipients {
	fn from(address: String) -> Self {
		Recipients(vec![address])
	}
}

impl From<Vec<String>> for Recipients {
	fn from(addresses: Vec<String>) -> Self {
		Recipients(addresses)
	}
}

impl From<Vec<&str>> for Recipients {
	fn from(addresses: Vec<&str>) -> Self {
		Recipients(addresses.into_iter().map(String::from).collect())
	}
}

impl From<&[&str]> for Recipients {
	fn from(addresses: &[&str]) -> Self {
		Recipients(addresses.iter().map(|a| a.to_string()).collect())
	}
}

/// How an attachment embeds into the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
	/// UTF-8 text, embedded as-is under its text subtype.
	Text,
	/// Image or audio content, base64-encoded under the detected subtype.
	Media,
	/// Everything else: generic binary, base64-encoded.
	Binary,
}

/// A self-contained attachment part.
///
/// Resolved from a source path: the MIME type is guessed from the extension,
/// the bytes are read eagerly, and the display filename is the basename of
/// the source.
///
/// # Examples
///
/// ```no_run
/// use letterbox::Attachment;
///
/// # fn main() -> letterbox::MailResult<()> {
/// let attachment = Attachment::resolve("/tmp/report.pdf")?;
/// assert_eq!(attachment.filename(), "report.pdf");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Attachment {
	filename: String,
	content: Vec<u8>,
	mime: Mime,
	kind: AttachmentKind,
}

impl Attachment {
	/// Resolve an attachment from a file on disk.
	///
	/// Fails with [`MailError::AttachmentNotFound`] when the path is missing
	/// or unreadable. Unguessable types and text files that do not decode as
	/// UTF-8 fall back to `application/octet-stream`.
	pub fn resolve(path: impl AsRef<Path>) -> MailResult<Self> {
		let path = path.as_ref();
		let content = std::fs::read(path).map_err(|source| MailError::AttachmentNotFound {
			path: path.to_path_buf(),
			source,
		})?;
		let filename = path
			.file_name()
			.and_then(|n| n.to_str())
			.map(String::from)
			.ok_or_else(|| MailError::AttachmentNotFound {
				path: path.to_path_buf(),
				source: std::io::Error::new(
					std::io::ErrorKind::InvalidInput,
					"path has no file name",
				),
			})?;

		let guessed = mime_guess::from_path(path).first_or_octet_stream();
		let (mime, kind) = Self::classify(guessed, &content);

		Ok(Self {
			filename,
			content,
			mime,
			kind,
		})
	}

	/// Build an attachment from in-memory bytes, guessing the type from
	/// `filename`.
	pub fn from_bytes(filename: impl Into<String>, content: Vec<u8>) -> Self {
		let filename = filename.into();
		let guessed = mime_guess::from_path(&filename).first_or_octet_stream();
		let (mime, kind) = Self::classify(guessed, &content);
		Self {
			filename,
			content,
			mime,
			kind,
		}
	}

	fn classify(guessed: Mime, content: &[u8]) -> (Mime, AttachmentKind) {
		let top = guessed.type_();
		if top == mime::TEXT && std::str::from_utf8(content).is_ok() {
			(guessed, AttachmentKind::Text)
		} else if top == mime::IMAGE || top == mime::AUDIO {
			(guessed, AttachmentKind::Media)
		} else {
			(mime::APPLICATION_OCTET_STREAM, AttachmentKind::Binary)
		}
	}

	pub fn filename(&self) -> &str {
		&self.filename
	}

	pub fn content(&self) -> &[u8] {
		&self.content
	}

	pub fn mime(&self) -> &Mime {
		&self.mime
	}

	pub fn kind(&self) -> AttachmentKind {
		self.kind
	}
}

/// Top-level MIME structure of a composed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStructure {
	/// One body, no attachments.
	Single,
	/// Plain and HTML bodies, no attachments.
	Alternative,
	/// Attachments alongside the body parts.
	Mixed,
}

/// A fully assembled, channel-agnostic message.
///
/// All fields are private; construction goes through [`ComposedMessage::builder`],
/// which enforces that at least one of the plain/HTML bodies is non-empty.
#[derive(Debug, Clone)]
pub struct ComposedMessage {
	from_email: String,
	to: Vec<String>,
	cc: Vec<String>,
	bcc: Vec<String>,
	subject: String,
	plain: Option<String>,
	html: Option<String>,
	reply_to: Option<String>,
	attachments: Vec<Attachment>,
}

impl ComposedMessage {
	pub fn builder() -> MessageBuilder {
		MessageBuilder::default()
	}

	pub fn from_email(&self) -> &str {
		&self.from_email
	}

	pub fn to(&self) -> &[String] {
		&self.to
	}

	pub fn cc(&self) -> &[String] {
		&self.cc
	}

	pub fn bcc(&self) -> &[String] {
		&self.bcc
	}

	pub fn subject(&self) -> &str {
		&self.subject
	}

	pub fn plain(&self) -> Option<&str> {
		self.plain.as_deref()
	}

	pub fn html(&self) -> Option<&str> {
		self.html.as_deref()
	}

	pub fn reply_to(&self) -> Option<&str> {
		self.reply_to.as_deref()
	}

	pub fn attachments(&self) -> &[Attachment] {
		&self.attachments
	}

	/// The MIME structure a channel should produce for this message.
	///
	/// Attachments always promote the message to `multipart/mixed` so they
	/// cannot be dropped when both body formats are present.
	pub fn structure(&self) -> MessageStructure {
		if !self.attachments.is_empty() {
			MessageStructure::Mixed
		} else if self.plain.is_some() && self.html.is_some() {
			MessageStructure::Alternative
		} else {
			MessageStructure::Single
		}
	}

	/// All delivery targets: the ordered To/Cc/Bcc union, not deduplicated.
	pub fn recipients(&self) -> Vec<String> {
		self.to
			.iter()
			.chain(self.cc.iter())
			.chain(self.bcc.iter())
			.cloned()
			.collect()
	}
}

#[derive(Debug, Default)]
pub struct MessageBuilder {
	from_email: String,
	to: Vec<String>,
	cc: Vec<String>,
	bcc: Vec<String>,
	subject: String,
	plain: Option<String>,
	html: Option<String>,
	reply_to: Option<String>,
	attachments: Vec<Attachment>,
}

impl MessageBuilder {
	pub fn from(mut self, from: impl Into<String>) -> Self {
		self.from_email = from.into();
		self
	}

	pub fn to(mut self, to: impl Into<Recipients>) -> Self {
		self.to = to.into().into_vec();
		self
	}

	pub fn cc(mut self, cc: impl Into<Recipients>) -> Self {
		self.cc = cc.into().into_vec();
		self
	}

	pub fn bcc(mut self, bcc: impl Into<Recipients>) -> Self {
		self.bcc = bcc.into().into_vec();
		self
	}

	pub fn subject(mut self, subject: impl Into<String>) -> Self {
		self.subject = subject.into();
		self
	}

	pub fn plain(mut self, plain: impl Into<String>) -> Self {
		self.plain = Some(plain.into());
		self
	}

	pub fn html(mut self, html: impl Into<String>) -> Self {
		self.html = Some(html.into());
		self
	}

	pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
		self.reply_to = Some(reply_to.into());
		self
	}

	pub fn attachment(mut self, attachment: Attachment) -> Self {
		self.attachments.push(attachment);
		self
	}

	/// Build the message, enforcing the content invariant.
	///
	/// Fails with [`MailError::NoContent`] unless at least one of the plain
	/// or HTML bodies is non-empty. Empty bodies count as absent.
	pub fn build(self) -> MailResult<ComposedMessage> {
		let plain = self.plain.filter(|s| !s.is_empty());
		let html = self.html.filter(|s| !s.is_empty());
		if plain.is_none() && html.is_none() {
			return Err(MailError::NoContent);
		}

		Ok(ComposedMessage {
			from_email: self.from_email,
			to: self.to,
			cc: self.cc,
			bcc: self.bcc,
			subject: self.subject,
			plain,
			html,
			reply_to: self.reply_to,
			attachments: self.attachments,
		})
	}
}
