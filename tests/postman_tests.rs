//! Postman orchestration integration tests
//!
//! Covers template-mode resolution and rendering, the alternative/mixed
//! round trip, and scope cleanup after failures.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use letterbox::{
	CaptureChannel, MailError, Outbox, Postman, SendOptions, TemplateContext,
};
use rstest::rstest;
use tempfile::TempDir;

fn capture_postman(templates: &TempDir) -> (Postman, Outbox) {
	let (channel, outbox) = CaptureChannel::new();
	let postman = Postman::new(templates.path(), Arc::new(channel));
	(postman, outbox)
}

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
	let path = dir.path().join(name);
	let mut file = File::create(&path).unwrap();
	file.write_all(contents).unwrap();
	path
}

fn larry_context() -> TemplateContext {
	let mut context = TemplateContext::new();
	context.insert("name".to_string(), "Larry".into());
	context
}

/// Test: a plain-only template renders and satisfies the content invariant
#[rstest]
#[tokio::test]
async fn plain_only_template_renders() {
	// Arrange
	let templates = TempDir::new().unwrap();
	write_file(&templates, "welcome.txt", b"Hi {{ name }}");
	let (postman, outbox) = capture_postman(&templates);

	// Act
	let scope = postman.template("welcome").unwrap();
	scope
		.send(
			"bill@example.com",
			"larry@example.com",
			"Welcome!",
			&larry_context(),
			SendOptions::default(),
		)
		.await
		.unwrap();

	// Assert: plain body rendered, no HTML side, single-part message
	let message = &outbox.messages()[0];
	assert!(message.contains("Hi Larry"));
	assert!(message.contains("Content-Type: text/plain"));
	assert!(!message.contains("multipart"));
}

/// Test: a plain/HTML pair renders as multipart/alternative
#[rstest]
#[tokio::test]
async fn template_pair_renders_as_alternative() {
	// Arrange
	let templates = TempDir::new().unwrap();
	write_file(&templates, "welcome.txt", b"Hi {{ name }}");
	write_file(&templates, "welcome.html", b"<h1>Hi {{ name }}</h1>");
	let (postman, outbox) = capture_postman(&templates);

	// Act
	let scope = postman.template("welcome").unwrap();
	scope
		.send(
			"bill@example.com",
			"larry@example.com",
			"Welcome!",
			&larry_context(),
			SendOptions::default(),
		)
		.await
		.unwrap();

	// Assert
	let message = &outbox.messages()[0];
	assert!(message.contains("multipart/alternative"));
	assert!(message.contains("Hi Larry"));
	assert!(message.contains("<h1>Hi Larry</h1>"));
}

/// Test: adding an attachment keeps both body parts and goes mixed
#[rstest]
#[tokio::test]
async fn attachment_promotes_templated_send_to_mixed() {
	// Arrange
	let templates = TempDir::new().unwrap();
	let files = TempDir::new().unwrap();
	write_file(&templates, "welcome.txt", b"Hi {{ name }}");
	write_file(&templates, "welcome.html", b"<h1>Hi {{ name }}</h1>");
	let attachment = write_file(&files, "notes.txt", b"attached words");
	let (postman, outbox) = capture_postman(&templates);

	// Act: send once without and once with the attachment
	let scope = postman.template("welcome").unwrap();
	scope
		.send(
			"bill@example.com",
			"larry@example.com",
			"Welcome!",
			&larry_context(),
			SendOptions::default(),
		)
		.await
		.unwrap();
	scope
		.send(
			"bill@example.com",
			"larry@example.com",
			"Welcome!",
			&larry_context(),
			SendOptions {
				attach: vec![attachment],
				..Default::default()
			},
		)
		.await
		.unwrap();

	// Assert: the alternative body block is unchanged inside the mixed message
	let messages = outbox.messages();
	let alternative = &messages[0];
	let mixed = &messages[1];
	assert!(alternative.contains("multipart/alternative"));
	assert!(!alternative.contains("multipart/mixed"));
	assert!(mixed.contains("multipart/mixed"));
	assert!(mixed.contains("multipart/alternative"));
	assert!(mixed.contains("Hi Larry"));
	assert!(mixed.contains("<h1>Hi Larry</h1>"));
	assert!(mixed.contains("attached words"));
}

/// Test: a missing template fails to open the scope
#[rstest]
#[tokio::test]
async fn missing_template_is_an_error() {
	// Arrange
	let templates = TempDir::new().unwrap();
	let (postman, _outbox) = capture_postman(&templates);

	// Act
	let result = postman.template("does_not_exist");

	// Assert
	assert!(matches!(result, Err(MailError::NoTemplate(_))));
}

/// Test: the unified single-file format serves as the plain side
#[rstest]
#[tokio::test]
async fn unified_template_is_found() {
	// Arrange
	let templates = TempDir::new().unwrap();
	write_file(&templates, "cool_email.tera", b"Hello {{ name }}");
	let (postman, outbox) = capture_postman(&templates);

	// Act
	let scope = postman.template("cool_email").unwrap();
	scope
		.send(
			"bill@example.com",
			"larry@example.com",
			"Cool",
			&larry_context(),
			SendOptions::default(),
		)
		.await
		.unwrap();

	// Assert
	assert!(outbox.messages()[0].contains("Hello Larry"));
}

/// Test: a failed templated send leaves the postman fully usable
#[rstest]
#[tokio::test]
async fn failed_templated_send_does_not_stick() {
	// Arrange: template with a syntax error
	let templates = TempDir::new().unwrap();
	write_file(&templates, "broken.txt", b"Hi {{ name");
	let (postman, outbox) = capture_postman(&templates);

	// Act: the templated send fails, then a literal send goes through
	{
		let scope = postman.template("broken").unwrap();
		let result = scope
			.send(
				"bill@example.com",
				"larry@example.com",
				"Broken",
				&larry_context(),
				SendOptions::default(),
			)
			.await;
		assert!(matches!(result, Err(MailError::Render(_))));
	}
	postman
		.send(
			"bill@example.com",
			"larry@example.com",
			"Still fine",
			"hai",
			SendOptions::default(),
		)
		.await
		.unwrap();

	// Assert
	let messages = outbox.messages();
	assert_eq!(messages.len(), 1);
	assert!(messages[0].contains("Still fine"));
}

/// Test: two identical sends are two independent delivery attempts
#[rstest]
#[tokio::test]
async fn identical_sends_are_independent_attempts() {
	// Arrange
	let templates = TempDir::new().unwrap();
	let (postman, outbox) = capture_postman(&templates);

	// Act
	for _ in 0..2 {
		postman
			.send(
				"bill@example.com",
				"larry@example.com",
				"Twice",
				"hai",
				SendOptions::default(),
			)
			.await
			.unwrap();
	}

	// Assert
	assert_eq!(outbox.len(), 2);
	assert_eq!(outbox.messages()[0], outbox.messages()[1]);
}

/// Test: an empty literal body fails the content invariant before delivery
#[rstest]
#[tokio::test]
async fn empty_literal_body_fails() {
	// Arrange
	let templates = TempDir::new().unwrap();
	let (postman, outbox) = capture_postman(&templates);

	// Act
	let result = postman
		.send(
			"bill@example.com",
			"larry@example.com",
			"Empty",
			"",
			SendOptions::default(),
		)
		.await;

	// Assert
	assert!(matches!(result, Err(MailError::NoContent)));
	assert!(outbox.is_empty());
}
