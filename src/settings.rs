//! Configuration-driven construction
//!
//! Deserializable settings for wiring a channel and a postman from host
//! configuration instead of code.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channels::smtp::{AuthSmtpChannel, SmtpChannel, SmtpConfig, SmtpSecurity};
use crate::channels::{ConsoleChannel, DeliveryChannel};
use crate::postman::Postman;
use crate::{MailError, MailResult};

/// Mail delivery settings.
///
/// # Examples
///
/// ```
/// use letterbox::MailSettings;
///
/// let settings: MailSettings = serde_json::from_str(
/// 	r#"{
/// 		"channel": "smtp",
/// 		"host": "smtp.example.com",
/// 		"port": 25,
/// 		"template_dirs": ["templates/"]
/// 	}"#,
/// )
/// .unwrap();
/// assert_eq!(settings.channel, "smtp");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
	/// Channel name: "console", "smtp" or "smtp+tls".
	pub channel: String,

	#[serde(default = "default_host")]
	pub host: String,

	#[serde(default = "default_port")]
	pub port: u16,

	#[serde(default)]
	pub username: Option<String>,

	#[serde(default)]
	pub password: Option<String>,

	/// Use implicit TLS instead of STARTTLS for "smtp+tls".
	#[serde(default)]
	pub use_ssl: bool,

	/// Connect-and-transfer timeout in seconds.
	#[serde(default)]
	pub timeout: Option<u64>,

	/// Ordered template search roots.
	#[serde(default)]
	pub template_dirs: Vec<PathBuf>,
}

fn default_host() -> String {
	"localhost".to_string()
}

fn default_port() -> u16 {
	25
}

impl Default for MailSettings {
	fn default() -> Self {
		Self {
			channel: "console".to_string(),
			host: default_host(),
			port: default_port(),
			username: None,
			password: None,
			use_ssl: false,
			timeout: None,
			template_dirs: Vec::new(),
		}
	}
}

impl MailSettings {
	fn smtp_config(&self) -> SmtpConfig {
		let mut config = SmtpConfig::new(&self.host, self.port);
		if let (Some(user), Some(pass)) = (&self.username, &self.password) {
			config = config.with_credentials(user, pass);
		}
		config = config.with_security(if self.use_ssl {
			SmtpSecurity::Tls
		} else {
			SmtpSecurity::StartTls
		});
		if let Some(secs) = self.timeout {
			config = config.with_timeout(Duration::from_secs(secs));
		}
		config
	}
}

/// Construct the delivery channel named by `settings.channel`.
///
/// Unknown channel names fail with [`MailError::NotSupported`].
pub fn channel_from_settings(settings: &MailSettings) -> MailResult<Arc<dyn DeliveryChannel>> {
	match settings.channel.as_str() {
		"console" => Ok(Arc::new(ConsoleChannel)),
		"smtp" => Ok(Arc::new(SmtpChannel::new(settings.smtp_config()))),
		"smtp+tls" => Ok(Arc::new(AuthSmtpChannel::new(settings.smtp_config())?)),
		other => Err(MailError::NotSupported(format!(
			"unknown channel {other:?}"
		))),
	}
}

/// Construct a [`Postman`] over the configured channel and template roots.
pub fn postman_from_settings(settings: &MailSettings) -> MailResult<Postman> {
	let channel = channel_from_settings(settings)?;
	Ok(Postman::new(settings.template_dirs.clone(), channel))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::DeliveryFailure;
	use rstest::rstest;

	#[rstest]
	fn console_channel_builds() {
		let settings = MailSettings::default();
		assert!(channel_from_settings(&settings).is_ok());
	}

	#[rstest]
	#[tokio::test]
	async fn smtp_channel_builds_without_credentials() {
		let settings = MailSettings {
			channel: "smtp".to_string(),
			..Default::default()
		};
		assert!(channel_from_settings(&settings).is_ok());
	}

	#[rstest]
	fn smtp_tls_requires_credentials() {
		// Arrange
		let settings = MailSettings {
			channel: "smtp+tls".to_string(),
			host: "smtp.example.com".to_string(),
			port: 587,
			..Default::default()
		};

		// Act
		let result = channel_from_settings(&settings);

		// Assert
		assert!(matches!(
			result,
			Err(MailError::Delivery {
				kind: DeliveryFailure::Auth,
				..
			})
		));
	}

	#[rstest]
	fn unknown_channel_name_is_rejected() {
		let settings = MailSettings {
			channel: "pigeon".to_string(),
			..Default::default()
		};
		assert!(matches!(
			channel_from_settings(&settings),
			Err(MailError::NotSupported(_))
		));
	}

	#[rstest]
	fn settings_deserialize_with_defaults() {
		// Arrange & Act
		let settings: MailSettings =
			serde_json::from_str(r#"{ "channel": "smtp" }"#).unwrap();

		// Assert
		assert_eq!(settings.host, "localhost");
		assert_eq!(settings.port, 25);
		assert!(settings.template_dirs.is_empty());
	}
}
