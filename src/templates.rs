//! Template location and rendering
//!
//! Templates live as plain files under one or more search roots. A logical
//! name such as `"welcome"` resolves to a `.txt` and/or `.html` file; the
//! located files are rendered with Tera against a key/value context.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::{MailError, MailResult};

/// Context for template rendering.
pub type TemplateContext = HashMap<String, serde_json::Value>;

/// Extension of plain text body templates.
pub const PLAIN_EXT: &str = ".txt";
/// Extension of HTML body templates.
pub const HTML_EXT: &str = ".html";
/// Extension of single-file templates for the unified template format.
pub const UNIFIED_EXT: &str = ".tera";

/// An ordered list of template search roots.
///
/// Ordering is a priority list: the first root containing a match wins.
#[derive(Debug, Clone, Default)]
pub struct SearchRoots(Vec<PathBuf>);

impl SearchRoots {
	pub fn paths(&self) -> &[PathBuf] {
		&self.0
	}
}

impl From<&str> for SearchRoots {
	fn from(root: &str) -> Self {
		SearchRoots(vec![PathBuf::from(root)])
	}
}

impl From<String> for SearchRoots {
	fn from(root: String) -> Self {
		SearchRoots(vec![PathBuf::from(root)])
	}
}

impl From<PathBuf> for SearchRoots {
	fn from(root: PathBuf) -> Self {
		SearchRoots(vec![root])
	}
}

impl From<&Path> for SearchRoots {
	fn from(root: &Path) -> Self {
		SearchRoots(vec![root.to_path_buf()])
	}
}

impl From<Vec<PathBuf>> for SearchRoots {
	fn from(roots: Vec<PathBuf>) -> Self {
		SearchRoots(roots)
	}
}

impl From<Vec<&str>> for SearchRoots {
	fn from(roots: Vec<&str>) -> Self {
		SearchRoots(roots.into_iter().map(PathBuf::from).collect())
	}
}

/// A located template resource.
///
/// Handles are only ever produced by a successful lookup, so holding one
/// means the backing file existed at resolution time. Created fresh per
/// resolution call; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateHandle {
	path: PathBuf,
}

impl TemplateHandle {
	/// Full path of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// File name of the backing file.
	pub fn file_name(&self) -> &str {
		self.path
			.file_name()
			.map(|n| n.to_str().unwrap_or_default())
			.unwrap_or_default()
	}

	fn is_html(&self) -> bool {
		self.file_name().ends_with(HTML_EXT)
	}
}

/// Finds template files under an ordered list of search roots.
///
/// # Examples
///
/// ```rust,no_run
/// use letterbox::TemplateLocator;
///
/// let locator = TemplateLocator::new(vec!["local/templates", "shared/templates"]);
/// let (plain, html) = locator.find_pair("welcome");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateLocator {
	roots: SearchRoots,
}

impl TemplateLocator {
	pub fn new(roots: impl Into<SearchRoots>) -> Self {
		Self {
			roots: roots.into(),
		}
	}

	/// Find the best match for `name` with the given extension.
	///
	/// Each root is tried in order. Within a root, the first directory entry
	/// whose file name contains `name` and ends with `extension` wins; if the
	/// scan finds nothing, an exact `name + extension` child is tried before
	/// moving to the next root. Roots that do not exist or cannot be listed
	/// are skipped silently.
	pub fn find(&self, name: &str, extension: &str) -> Option<TemplateHandle> {
		for root in self.roots.paths() {
			let Ok(entries) = fs::read_dir(root) else {
				trace!(root = %root.display(), "skipping unreadable template root");
				continue;
			};
			for entry in entries.flatten() {
				let file_name = entry.file_name();
				let Some(file_name) = file_name.to_str() else {
					continue;
				};
				if file_name.contains(name)
					&& file_name.ends_with(extension)
					&& entry.path().is_file()
				{
					return Some(TemplateHandle { path: entry.path() });
				}
			}
			let exact = root.join(format!("{name}{extension}"));
			if exact.is_file() {
				return Some(TemplateHandle { path: exact });
			}
		}
		None
	}

	/// Resolve the `.txt` / `.html` pair for `name`.
	///
	/// Either side may be absent; callers decide whether an entirely missing
	/// pair is an error.
	pub fn find_pair(&self, name: &str) -> (Option<TemplateHandle>, Option<TemplateHandle>) {
		(self.find(name, PLAIN_EXT), self.find(name, HTML_EXT))
	}

	/// Resolve a single-file template in the unified format.
	///
	/// Legacy mode for template trees that keep one `.tera` file per message
	/// instead of a plain/HTML pair.
	pub fn find_single(&self, name: &str) -> Option<TemplateHandle> {
		self.find(name, UNIFIED_EXT)
	}
}

/// Renders located templates against a context.
///
/// A thin wrapper over [`Tera::one_off`](tera::Tera::one_off): the engine is
/// treated as a black box and any failure it reports surfaces as
/// [`MailError::Render`]. HTML templates render with autoescaping on, all
/// others with it off.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentRenderer;

impl ContentRenderer {
	pub fn new() -> Self {
		Self
	}

	/// Render one handle with the given context.
	pub fn render(&self, handle: &TemplateHandle, context: &TemplateContext) -> MailResult<String> {
		let source = fs::read_to_string(handle.path()).map_err(MailError::Io)?;
		let tera_context = tera::Context::from_serialize(context)?;
		let rendered = tera::Tera::one_off(&source, &tera_context, handle.is_html())?;
		trace!(template = handle.file_name(), "rendered template");
		Ok(rendered)
	}

	/// Render whichever sides of a plain/HTML pair are present.
	pub fn render_body(
		&self,
		plain: Option<&TemplateHandle>,
		html: Option<&TemplateHandle>,
		context: &TemplateContext,
	) -> MailResult<(Option<String>, Option<String>)> {
		let plain = plain.map(|h| self.render(h, context)).transpose()?;
		let html = html.map(|h| self.render(h, context)).transpose()?;
		Ok((plain, html))
	}
}
