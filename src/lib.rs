//! # Letterbox
//!
//! Declarative message composition and delivery with swappable channels.
//!
//! Letterbox assumes you will usually want to send mail from templates, and
//! makes that as short as possible while still producing correctly structured
//! multipart messages.
//!
//! ## Features
//!
//! ### Composition
//! - **ComposedMessage**: channel-agnostic message builder with plain/HTML
//!   bodies, CC/BCC, reply-to and attachments
//! - **Attachments**: resolved from disk with MIME detection; text embeds as
//!   text, media and binary content is base64-encoded
//! - **Alternative/mixed structure**: dual bodies become `multipart/alternative`,
//!   attachments promote the whole message to `multipart/mixed`
//!
//! ### Templates
//! - **TemplateLocator**: ordered search roots, substring scan with exact-name
//!   fallback, paired `.txt`/`.html` resolution
//! - **ContentRenderer**: renders located templates with Tera against a
//!   key/value context
//!
//! ### Channels
//! - **SmtpChannel**: plain unauthenticated SMTP
//! - **AuthSmtpChannel**: STARTTLS or implicit TLS with credentials
//! - **HostBackendChannel**: delegates to an injected host mail sink
//! - **SmsChannel** / **SocialChannel**: non-email transports behind gateway
//!   traits, with Social-side length and account preconditions
//! - **ConsoleChannel** / **CaptureChannel**: development output and an
//!   in-memory [`Outbox`] for asserting on the exact wire text
//!
//! ## Examples
//!
//! ### Literal body
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use letterbox::{Postman, SendOptions, SmtpChannel, SmtpConfig};
//!
//! let channel = Arc::new(SmtpChannel::new(SmtpConfig::new("localhost", 25)));
//! let postman = Postman::new("templates/", channel);
//!
//! postman
//! 	.send(
//! 		"bill@example.com",
//! 		"larry@example.com",
//! 		"My cool mail",
//! 		"hai",
//! 		SendOptions::default(),
//! 	)
//! 	.await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Templated send
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use letterbox::{Postman, SendOptions, SmtpChannel, SmtpConfig, TemplateContext};
//!
//! let channel = Arc::new(SmtpChannel::new(SmtpConfig::new("localhost", 25)));
//! let postman = Postman::new("templates/", channel);
//!
//! let mut context = TemplateContext::new();
//! context.insert("name".to_string(), "Larry".into());
//!
//! let scope = postman.template("welcome")?;
//! scope
//! 	.send(
//! 		"bill@example.com",
//! 		"larry@example.com",
//! 		"Welcome!",
//! 		&context,
//! 		SendOptions::default(),
//! 	)
//! 	.await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Declarative descriptor
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use letterbox::{Letter, Postman, SmtpChannel, SmtpConfig};
//!
//! let channel = Arc::new(SmtpChannel::new(SmtpConfig::new("localhost", 25)));
//! let postman = Postman::new("templates/", channel);
//!
//! Letter::new("bill@example.com", "larry@example.com")
//! 	.subject("My cool mail")
//! 	.template("cool_email")
//! 	.add_context("href", "http://example.com".into())
//! 	.add_context("link", "Examples!".into())
//! 	.send(&postman)
//! 	.await?;
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod letter;
pub mod message;
pub mod postman;
pub mod settings;
pub mod templates;
pub mod wire;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub use channels::smtp::{AuthSmtpChannel, SmtpChannel, SmtpConfig, SmtpSecurity};
pub use channels::{
	BackendMail, CaptureChannel, CarrierGateway, ConsoleChannel, DeliveryChannel,
	HostBackendChannel, MailSink, Outbox, SmsChannel, SocialAccount, SocialChannel, SocialGateway,
};
pub use letter::{AttachPaths, Letter};
pub use message::{
	Attachment, AttachmentKind, ComposedMessage, MessageBuilder, MessageStructure, Recipients,
};
pub use postman::{Postman, SendOptions, TemplateScope};
pub use settings::{MailSettings, channel_from_settings, postman_from_settings};
pub use templates::{
	ContentRenderer, SearchRoots, TemplateContext, TemplateHandle, TemplateLocator,
};

/// The phase of an SMTP delivery that failed.
///
/// Carried by [`MailError::Delivery`] so callers can react to the cause
/// without parsing error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
	/// Could not reach the server (DNS, connect, timeout).
	Connect,
	/// Transport encryption negotiation failed.
	Tls,
	/// The server rejected the stored credentials.
	Auth,
	/// The transaction itself failed after a connection was established.
	Transport,
}

impl fmt::Display for DeliveryFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			DeliveryFailure::Connect => "connect",
			DeliveryFailure::Tls => "tls",
			DeliveryFailure::Auth => "auth",
			DeliveryFailure::Transport => "transport",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Error)]
pub enum MailError {
	#[error("message has neither a plain nor an HTML body")]
	NoContent,

	#[error("no template named {0:?} under any search root")]
	NoTemplate(String),

	#[error("template rendering failed: {0}")]
	Render(#[from] tera::Error),

	#[error("attachment {path:?} is missing or unreadable")]
	AttachmentNotFound {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("not supported: {0}")]
	NotSupported(String),

	#[error("no registered account for {0:?}")]
	AccountNotFound(String),

	#[error("post is {length} characters, the limit is {limit}")]
	MessageTooLong { length: usize, limit: usize },

	#[error("invalid address: {0}")]
	InvalidAddress(#[from] lettre::address::AddressError),

	#[error("message assembly failed: {0}")]
	Assembly(String),

	#[error("{kind} failure: {message}")]
	Delivery {
		kind: DeliveryFailure,
		message: String,
	},

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

pub type MailResult<T> = std::result::Result<T, MailError>;
