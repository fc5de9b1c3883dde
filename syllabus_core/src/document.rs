use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::CourseDiagnostic;
use crate::Dimension;
use crate::DocumentId;
use crate::Identifier;
use crate::Vocabulary;
use crate::config::ALL;
use crate::extract::extract;

/// The identifiers a document declares, explicitly or implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTokens {
	pub required: BTreeSet<Identifier>,
	pub mentioned: BTreeSet<Identifier>,
	pub provided: BTreeSet<Identifier>,
}

/// One child entry of a navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
	/// Explicit title from a `Title <target>` entry.
	pub title: Option<String>,
	/// The document id the entry points at.
	pub target: DocumentId,
}

/// A `.. level::` or `.. scenario::` block that is only visible for some
/// filter values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentGate {
	pub dimension: Dimension,
	pub values: Vec<String>,
	/// 1-indexed line of the directive.
	pub line: usize,
}

impl ContentGate {
	/// The tag expression the renderer evaluates to decide visibility, e.g.
	/// `intro_levels_beginner or all_levels_beginner or intro_levels_all or
	/// all_levels_all`.
	pub fn expression(&self, topic: &str) -> String {
		let dimension = self.dimension.key();
		self.values
			.iter()
			.map(String::as_str)
			.chain(std::iter::once(ALL))
			.map(|value| format!("{topic}_{dimension}_{value} or all_{dimension}_{value}"))
			.collect::<Vec<_>>()
			.join(" or ")
	}
}

/// A discovered source document together with everything extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
	pub id: DocumentId,
	pub path: PathBuf,
	/// Whether the document starts with a metadata block. Documents without
	/// one are always part of the build.
	pub has_metadata: bool,
	/// Metadata fields in source order, passed through unmodified.
	pub metadata: Vec<(String, String)>,
	pub tokens: DocumentTokens,
	pub navigation: Vec<NavEntry>,
	pub gates: Vec<ContentGate>,
}

impl Document {
	/// Extract a document from its source text. Extraction never fails;
	/// problems come back as diagnostics.
	pub fn from_source(
		id: impl Into<DocumentId>,
		path: impl Into<PathBuf>,
		source: &str,
		vocabulary: &Vocabulary,
	) -> (Self, Vec<CourseDiagnostic>) {
		let id = id.into();
		let extraction = extract(source, vocabulary);
		let navigation = extraction
			.navigation
			.into_iter()
			.map(|(title, target)| NavEntry {
				title,
				target: resolve_target(&id, &target),
			})
			.collect();
		let diagnostics = extraction
			.problems
			.into_iter()
			.map(|kind| CourseDiagnostic::new(id.clone(), kind).emit())
			.collect();

		let document = Self {
			id,
			path: path.into(),
			has_metadata: extraction.has_metadata,
			metadata: extraction.metadata,
			tokens: extraction.tokens,
			navigation,
			gates: extraction.gates,
		};

		(document, diagnostics)
	}

	/// Look up a passed-through metadata field such as `unit-type`.
	pub fn field(&self, key: &str) -> Option<&str> {
		self.metadata
			.iter()
			.find(|(name, _)| name == key)
			.map(|(_, value)| value.as_str())
	}
}

/// Derive the document id for a file below `root`.
pub fn document_id(root: &Path, file: &Path) -> DocumentId {
	let relative = file.strip_prefix(root).unwrap_or(file);
	relative
		.with_extension("")
		.to_string_lossy()
		.replace('\\', "/")
}

/// Resolve a navigation target relative to the document that lists it.
/// Targets starting with `/` are relative to the project root.
pub fn resolve_target(from: &str, target: &str) -> DocumentId {
	let target = target.trim().trim_end_matches(".rst");
	if let Some(absolute) = target.strip_prefix('/') {
		return normalize_segments(Vec::new(), absolute);
	}

	let base = from
		.rsplit_once('/')
		.map(|(dir, _)| dir.split('/').filter(|segment| !segment.is_empty()).collect())
		.unwrap_or_default();
	normalize_segments(base, target)
}

fn normalize_segments<'a>(mut segments: Vec<&'a str>, target: &'a str) -> DocumentId {
	for segment in target.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			other => segments.push(other),
		}
	}
	segments.join("/")
}
