use serde::Deserialize;
use serde::Serialize;

use crate::DocumentId;
use crate::EdgeKind;
use crate::Identifier;

/// The kind of recoverable problem found while building a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DiagnosticKind {
	/// The metadata block could not be read; declared lists are empty.
	MalformedMetadata { line: usize, reason: String },
	/// A declared token does not have the `kind:value` shape.
	InvalidToken { field: String, token: String },
	/// A `level`/`scenario` gate uses a value outside the vocabulary.
	InvalidSelector {
		dimension: String,
		value: String,
		line: usize,
	},
	/// The identifier was already provided by `previous`; the later
	/// document now owns it.
	DuplicateProvider {
		identifier: Identifier,
		previous: DocumentId,
	},
	/// A leaf component whose document was excluded from discovery.
	ExcludedComponent,
	/// The file could not be read and was left out of the corpus.
	Unreadable { reason: String },
	/// The file is not valid UTF-8; invalid bytes were replaced.
	InvalidEncoding,
	/// No document provides the identifier, so the edge was dropped.
	UnsatisfiedIdentifier {
		identifier: Identifier,
		edge: EdgeKind,
		referenced_by: Vec<DocumentId>,
	},
}

/// A warning attached to a single document. Never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDiagnostic {
	/// The document the warning is about.
	pub document: DocumentId,
	pub kind: DiagnosticKind,
}

impl CourseDiagnostic {
	pub fn new(document: impl Into<DocumentId>, kind: DiagnosticKind) -> Self {
		Self {
			document: document.into(),
			kind,
		}
	}

	/// Human-readable message for this diagnostic.
	pub fn message(&self) -> String {
		match &self.kind {
			DiagnosticKind::MalformedMetadata { line, reason } => {
				format!("malformed metadata block at line {line}: {reason}")
			}
			DiagnosticKind::InvalidToken { field, token } => {
				format!("`{token}` in `{field}` is not a `kind:value` identifier")
			}
			DiagnosticKind::InvalidSelector {
				dimension,
				value,
				line,
			} => format!("invalid {dimension} selector `{value}` at line {line}"),
			DiagnosticKind::DuplicateProvider {
				identifier,
				previous,
			} => format!("`{identifier}` is already provided by `{previous}`, overriding"),
			DiagnosticKind::ExcludedComponent => {
				"component is selected by the unit configuration but its document was excluded from \
				 discovery"
					.to_string()
			}
			DiagnosticKind::Unreadable { reason } => {
				format!("document could not be read and is skipped: {reason}")
			}
			DiagnosticKind::InvalidEncoding => {
				"document is not valid UTF-8, invalid bytes were replaced".to_string()
			}
			DiagnosticKind::UnsatisfiedIdentifier {
				identifier,
				edge,
				referenced_by,
			} => format!(
				"{edge} identifier `{identifier}` has no provider (referenced by {})",
				referenced_by.join(", ")
			),
		}
	}

	/// Log through `tracing` and hand the diagnostic back for collection.
	pub(crate) fn emit(self) -> Self {
		tracing::warn!(document = %self.document, "{}", self.message());
		self
	}
}
