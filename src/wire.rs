//! Wire-format rendering of composed messages
//!
//! Produces the RFC-822-style text a message would occupy on the wire:
//! headers, multipart containers and transfer-encoded attachment parts.
//! The console and capture channels emit this text, which makes assembly
//! correctness directly assertable in tests.
//!
//! Bcc recipients are delivery targets only and never appear in a header.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::message::{Attachment, AttachmentKind, ComposedMessage, MessageStructure};

const ALT_BOUNDARY: &str = "=-alternative-boundary";
const MIXED_BOUNDARY: &str = "=-mixed-boundary";
const BASE64_LINE_WIDTH: usize = 76;

/// Render a composed message to wire text.
pub fn render(message: &ComposedMessage) -> String {
	let mut out = String::new();
	out.push_str("MIME-Version: 1.0\n");
	out.push_str(&format!("From: {}\n", message.from_email()));
	out.push_str(&format!("To: {}\n", message.to().join(", ")));
	if !message.cc().is_empty() {
		out.push_str(&format!("Cc: {}\n", message.cc().join(", ")));
	}
	if let Some(reply_to) = message.reply_to() {
		out.push_str(&format!("Reply-To: {reply_to}\n"));
	}
	out.push_str(&format!("Subject: {}\n", message.subject()));

	match message.structure() {
		MessageStructure::Single => render_single(&mut out, message),
		MessageStructure::Alternative => {
			out.push_str(&format!(
				"Content-Type: multipart/alternative; boundary=\"{ALT_BOUNDARY}\"\n\n"
			));
			render_alternative_parts(&mut out, message);
			out.push_str(&format!("--{ALT_BOUNDARY}--\n"));
		}
		MessageStructure::Mixed => {
			out.push_str(&format!(
				"Content-Type: multipart/mixed; boundary=\"{MIXED_BOUNDARY}\"\n\n"
			));
			out.push_str(&format!("--{MIXED_BOUNDARY}\n"));
			render_body_subpart(&mut out, message);
			for attachment in message.attachments() {
				out.push_str(&format!("--{MIXED_BOUNDARY}\n"));
				render_attachment(&mut out, attachment);
			}
			out.push_str(&format!("--{MIXED_BOUNDARY}--\n"));
		}
	}
	out
}

fn render_single(out: &mut String, message: &ComposedMessage) {
	if let Some(plain) = message.plain() {
		out.push_str("Content-Type: text/plain; charset=\"utf-8\"\n\n");
		out.push_str(plain);
	} else if let Some(html) = message.html() {
		out.push_str("Content-Type: text/html; charset=\"utf-8\"\n\n");
		out.push_str(html);
	}
	out.push('\n');
}

/// The body parts of a dual-format message, identical whether the container
/// is the message itself or a sub-part of `multipart/mixed`.
fn render_alternative_parts(out: &mut String, message: &ComposedMessage) {
	if let Some(plain) = message.plain() {
		out.push_str(&format!("--{ALT_BOUNDARY}\n"));
		out.push_str("Content-Type: text/plain; charset=\"utf-8\"\n\n");
		out.push_str(plain);
		out.push('\n');
	}
	if let Some(html) = message.html() {
		out.push_str(&format!("--{ALT_BOUNDARY}\n"));
		out.push_str("Content-Type: text/html; charset=\"utf-8\"\n\n");
		out.push_str(html);
		out.push('\n');
	}
}

fn render_body_subpart(out: &mut String, message: &ComposedMessage) {
	if message.plain().is_some() && message.html().is_some() {
		out.push_str(&format!(
			"Content-Type: multipart/alternative; boundary=\"{ALT_BOUNDARY}\"\n\n"
		));
		render_alternative_parts(out, message);
		out.push_str(&format!("--{ALT_BOUNDARY}--\n"));
	} else if let Some(plain) = message.plain() {
		out.push_str("Content-Type: text/plain; charset=\"utf-8\"\n\n");
		out.push_str(plain);
		out.push('\n');
	} else if let Some(html) = message.html() {
		out.push_str("Content-Type: text/html; charset=\"utf-8\"\n\n");
		out.push_str(html);
		out.push('\n');
	}
}

fn render_attachment(out: &mut String, attachment: &Attachment) {
	match attachment.kind() {
		AttachmentKind::Text => {
			out.push_str(&format!(
				"Content-Type: {}; charset=\"utf-8\"\n",
				attachment.mime()
			));
			out.push_str(&format!(
				"Content-Disposition: attachment; filename=\"{}\"\n\n",
				attachment.filename()
			));
			out.push_str(&String::from_utf8_lossy(attachment.content()));
			out.push('\n');
		}
		AttachmentKind::Media | AttachmentKind::Binary => {
			out.push_str(&format!("Content-Type: {}\n", attachment.mime()));
			out.push_str("Content-Transfer-Encoding: base64\n");
			out.push_str(&format!(
				"Content-Disposition: attachment; filename=\"{}\"\n\n",
				attachment.filename()
			));
			out.push_str(&encode_wrapped(attachment.content()));
		}
	}
}

fn encode_wrapped(content: &[u8]) -> String {
	let encoded = BASE64.encode(content);
	let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_WIDTH + 1);
	for chunk in encoded.as_bytes().chunks(BASE64_LINE_WIDTH) {
		// chunks of an ASCII string are valid UTF-8
		wrapped.push_str(std::str::from_utf8(chunk).unwrap_or_default());
		wrapped.push('\n');
	}
	wrapped
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::message::ComposedMessage;
	use rstest::rstest;

	fn base_builder() -> crate::message::MessageBuilder {
		ComposedMessage::builder()
			.from("bill@example.com")
			.to("larry@example.com")
			.subject("My cool mail")
	}

	#[rstest]
	fn single_plain_message() {
		// Arrange
		let message = base_builder().plain("hai").build().unwrap();

		// Act
		let text = render(&message);

		// Assert
		assert!(text.contains("From: bill@example.com"));
		assert!(text.contains("To: larry@example.com"));
		assert!(text.contains("Subject: My cool mail"));
		assert!(text.contains("Content-Type: text/plain"));
		assert!(text.contains("hai"));
		assert!(!text.contains("multipart"));
	}

	#[rstest]
	fn dual_bodies_render_as_alternative() {
		// Arrange
		let message = base_builder()
			.plain("plain text")
			.html("<p>html text</p>")
			.build()
			.unwrap();

		// Act
		let text = render(&message);

		// Assert
		assert!(text.contains("multipart/alternative"));
		assert!(text.contains("plain text"));
		assert!(text.contains("<p>html text</p>"));
		assert!(!text.contains("multipart/mixed"));
	}

	#[rstest]
	fn attachment_promotes_to_mixed_without_changing_the_bodies() {
		// Arrange
		let without = base_builder()
			.plain("plain text")
			.html("<p>html text</p>")
			.build()
			.unwrap();
		let with = base_builder()
			.plain("plain text")
			.html("<p>html text</p>")
			.attachment(Attachment::from_bytes("data.weirdext", vec![1, 2, 3]))
			.build()
			.unwrap();

		// Act
		let alternative_text = render(&without);
		let mixed_text = render(&with);

		// Assert: the alternative body block renders identically inside mixed
		let body_block = alternative_text
			.split_once("\n\n")
			.map(|(_, rest)| rest)
			.unwrap();
		assert!(mixed_text.contains("multipart/mixed"));
		assert!(mixed_text.contains(body_block.trim_end_matches('\n')));
		assert!(mixed_text.contains("filename=\"data.weirdext\""));
	}

	#[rstest]
	fn bcc_never_appears_in_headers() {
		// Arrange
		let message = base_builder()
			.cc("cc@example.com")
			.bcc("secret@example.com")
			.plain("hai")
			.build()
			.unwrap();

		// Act
		let text = render(&message);

		// Assert
		assert!(text.contains("Cc: cc@example.com"));
		assert!(!text.contains("secret@example.com"));
		assert!(message
			.recipients()
			.contains(&"secret@example.com".to_string()));
	}

	#[rstest]
	fn text_attachment_embeds_as_text() {
		// Arrange
		let message = base_builder()
			.plain("body")
			.attachment(Attachment::from_bytes("notes.txt", b"attached words".to_vec()))
			.build()
			.unwrap();

		// Act
		let text = render(&message);

		// Assert
		assert!(text.contains("attached words"));
		assert!(text.contains("filename=\"notes.txt\""));
		assert!(!text.contains("Content-Transfer-Encoding: base64"));
	}

	#[rstest]
	fn binary_attachment_is_base64_encoded() {
		// Arrange
		let message = base_builder()
			.plain("body")
			.attachment(Attachment::from_bytes("logo.png", vec![0x89, 0x50, 0x4e, 0x47]))
			.build()
			.unwrap();

		// Act
		let text = render(&message);

		// Assert
		assert!(text.contains("Content-Type: image/png"));
		assert!(text.contains("Content-Transfer-Encoding: base64"));
		assert!(text.contains(&BASE64.encode([0x89u8, 0x50, 0x4e, 0x47])));
	}

	#[rstest]
	fn long_base64_content_wraps_at_76_columns() {
		let encoded = encode_wrapped(&[0xab; 600]);
		assert!(encoded.lines().all(|line| line.len() <= 76));
		assert!(encoded.lines().count() > 1);
	}
}
