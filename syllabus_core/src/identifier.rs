use std::fmt::Display;

use derive_more::Deref;
use serde::Deserialize;
use serde::Serialize;

/// Stable document name: the path relative to the project root, `/`
/// separated, without extension.
pub type DocumentId = String;

/// A namespaced `kind:value` token that a document can provide and other
/// documents can require or mention.
///
/// The kind is trimmed and lowercased. The value part is always normalized:
/// internal whitespace collapsed to a single space, trimmed, and lowercased. Compound identifiers for scoped
/// items keep their parent in front, e.g. `program:launch_file option:timeout`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
	/// Build an identifier from a kind and raw (unnormalized) text.
	pub fn new(kind: &str, text: &str) -> Self {
		Self(format!("{}:{}", kind.trim().to_lowercase(), normalize(text)))
	}

	/// Build an identifier for an item declared underneath `parent`.
	pub fn scoped(parent: &Identifier, kind: &str, text: &str) -> Self {
		Self(format!("{parent} {}", Self::new(kind, text)))
	}

	/// Parse an explicitly written `kind:value` token. Returns `None` when
	/// the token has no kind or no value.
	pub fn parse(token: &str) -> Option<Self> {
		let (kind, value) = token.split_once(':')?;
		let kind = kind.trim();
		if kind.is_empty() || value.trim().is_empty() {
			return None;
		}
		if !kind
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
		{
			return None;
		}

		Some(Self::new(kind, value))
	}

	/// The namespace in front of the first `:`.
	pub fn kind(&self) -> &str {
		self.0.split_once(':').map_or("", |(kind, _)| kind)
	}

	/// Everything after the first `:`.
	pub fn value(&self) -> &str {
		self.0.split_once(':').map_or("", |(_, value)| value)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for Identifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Collapse whitespace runs, trim, and lowercase.
pub fn normalize(text: &str) -> String {
	text.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ")
		.to_lowercase()
}
