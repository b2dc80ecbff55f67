//! SMTP delivery channels
//!
//! Two variants over the same lettre transport machinery: [`SmtpChannel`]
//! speaks unauthenticated SMTP to a host/port, [`AuthSmtpChannel`] negotiates
//! transport encryption and authenticates with stored credentials.
//!
//! Both build the outgoing message without a Bcc header and hand lettre an
//! explicit envelope covering the To/Cc/Bcc union, so blind recipients are
//! delivery targets only.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as FilePart, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::message::ComposedMessage;
use crate::{DeliveryFailure, MailError, MailResult};

use super::DeliveryChannel;

/// Transport encryption mode for [`AuthSmtpChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
	/// Upgrade a plain connection with STARTTLS.
	#[default]
	StartTls,
	/// Implicit TLS from the first byte.
	Tls,
}

/// Connection parameters for the SMTP channels.
///
/// Immutable once a channel is constructed from it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use letterbox::{SmtpConfig, SmtpSecurity};
///
/// let config = SmtpConfig::new("smtp.example.com", 587)
/// 	.with_credentials("user", "password")
/// 	.with_security(SmtpSecurity::StartTls)
/// 	.with_timeout(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct SmtpConfig {
	host: String,
	port: u16,
	username: Option<String>,
	password: Option<String>,
	security: SmtpSecurity,
	timeout: Option<Duration>,
}

impl SmtpConfig {
	pub fn new(host: impl Into<String>, port: u16) -> Self {
		Self {
			host: host.into(),
			port,
			username: None,
			password: None,
			security: SmtpSecurity::default(),
			timeout: None,
		}
	}

	pub fn with_credentials(
		mut self,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		self.username = Some(username.into());
		self.password = Some(password.into());
		self
	}

	pub fn with_security(mut self, security: SmtpSecurity) -> Self {
		self.security = security;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn host(&self) -> &str {
		&self.host
	}

	pub fn port(&self) -> u16 {
		self.port
	}
}

/// Unauthenticated, unencrypted SMTP.
///
/// One transactional send per `deliver` call; any transport failure
/// propagates as [`MailError::Delivery`] with no retry.
pub struct SmtpChannel {
	transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpChannel {
	pub fn new(config: SmtpConfig) -> Self {
		let mut builder =
			AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).port(config.port);
		if let Some(timeout) = config.timeout {
			builder = builder.timeout(Some(timeout));
		}
		Self {
			transport: builder.build(),
		}
	}
}

#[async_trait]
impl DeliveryChannel for SmtpChannel {
	async fn deliver(&self, message: &ComposedMessage) -> MailResult<()> {
		transmit(&self.transport, message).await
	}
}

/// Authenticated SMTP over an encrypted transport.
///
/// Connects, negotiates encryption per [`SmtpSecurity`], authenticates with
/// the configured credentials, sends, and releases the connection.
/// Authentication, encryption-negotiation and transport failures all surface
/// as [`MailError::Delivery`] with a classified [`DeliveryFailure`] kind.
pub struct AuthSmtpChannel {
	transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl AuthSmtpChannel {
	pub fn new(config: SmtpConfig) -> MailResult<Self> {
		let (Some(username), Some(password)) = (config.username.clone(), config.password.clone())
		else {
			return Err(MailError::Delivery {
				kind: DeliveryFailure::Auth,
				message: "authenticated SMTP requires credentials".to_string(),
			});
		};

		let builder = match config.security {
			SmtpSecurity::StartTls => {
				AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
			}
			SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host),
		}
		.map_err(classify)?;

		let mut builder = builder
			.port(config.port)
			.credentials(Credentials::new(username, password));
		if let Some(timeout) = config.timeout {
			builder = builder.timeout(Some(timeout));
		}

		Ok(Self {
			transport: builder.build(),
		})
	}
}

#[async_trait]
impl DeliveryChannel for AuthSmtpChannel {
	async fn deliver(&self, message: &ComposedMessage) -> MailResult<()> {
		transmit(&self.transport, message).await
	}
}

async fn transmit(
	transport: &AsyncSmtpTransport<Tokio1Executor>,
	message: &ComposedMessage,
) -> MailResult<()> {
	let email = to_email(message)?;
	let envelope = envelope(message)?;
	debug!(
		to = ?message.to(),
		subject = message.subject(),
		"transmitting over smtp"
	);
	transport
		.send_raw(&envelope, &email.formatted())
		.await
		.map_err(classify)?;
	Ok(())
}

/// Map one composed message onto a lettre [`Message`].
///
/// Bcc is deliberately omitted from the headers; see [`envelope`].
fn to_email(message: &ComposedMessage) -> MailResult<Message> {
	let mut builder = Message::builder()
		.from(message.from_email().parse::<Mailbox>()?)
		.subject(message.subject());
	for to in message.to() {
		builder = builder.to(to.parse::<Mailbox>()?);
	}
	for cc in message.cc() {
		builder = builder.cc(cc.parse::<Mailbox>()?);
	}
	if let Some(reply_to) = message.reply_to() {
		builder = builder.reply_to(reply_to.parse::<Mailbox>()?);
	}

	enum BodyPart {
		Single(SinglePart),
		Multi(MultiPart),
	}

	let body = match (message.plain(), message.html()) {
		(Some(plain), Some(html)) => BodyPart::Multi(MultiPart::alternative_plain_html(
			plain.to_string(),
			html.to_string(),
		)),
		(Some(plain), None) => BodyPart::Single(SinglePart::plain(plain.to_string())),
		(None, Some(html)) => BodyPart::Single(SinglePart::html(html.to_string())),
		(None, None) => return Err(MailError::NoContent),
	};

	let email = if message.attachments().is_empty() {
		match body {
			BodyPart::Single(part) => builder.singlepart(part),
			BodyPart::Multi(part) => builder.multipart(part),
		}
	} else {
		let mut mixed = match body {
			BodyPart::Single(part) => MultiPart::mixed().singlepart(part),
			BodyPart::Multi(part) => MultiPart::mixed().multipart(part),
		};
		for attachment in message.attachments() {
			let content_type = ContentType::parse(attachment.mime().as_ref())
				.map_err(|e| MailError::Assembly(e.to_string()))?;
			mixed = mixed.singlepart(
				FilePart::new(attachment.filename().to_string())
					.body(attachment.content().to_vec(), content_type),
			);
		}
		builder.multipart(mixed)
	};

	email.map_err(|e| MailError::Assembly(e.to_string()))
}

/// Envelope covering every delivery target, Bcc included.
fn envelope(message: &ComposedMessage) -> MailResult<lettre::address::Envelope> {
	let from = message.from_email().parse::<Address>()?;
	let recipients = message
		.recipients()
		.iter()
		.map(|r| r.parse::<Address>())
		.collect::<Result<Vec<_>, _>>()?;
	lettre::address::Envelope::new(Some(from), recipients)
		.map_err(|e| MailError::Assembly(e.to_string()))
}

/// Classify a lettre SMTP error into a delivery failure kind.
fn classify(error: lettre::transport::smtp::Error) -> MailError {
	let message = error.to_string();
	let lowered = message.to_ascii_lowercase();
	let kind = if error.is_timeout() {
		DeliveryFailure::Connect
	} else if lowered.contains("tls") || lowered.contains("certificate") {
		DeliveryFailure::Tls
	} else if lowered.contains("auth") || lowered.contains("credentials") {
		DeliveryFailure::Auth
	} else if lowered.contains("connection") || lowered.contains("resolve") {
		DeliveryFailure::Connect
	} else {
		DeliveryFailure::Transport
	};
	MailError::Delivery { kind, message }
}
