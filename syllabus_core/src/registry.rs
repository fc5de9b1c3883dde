use std::collections::BTreeMap;

use crate::CourseDiagnostic;
use crate::Document;
use crate::DocumentId;
use crate::Identifier;
use crate::diagnostic::DiagnosticKind;

/// Maps every provided identifier to the document that owns it.
///
/// Built fresh for each run. When two documents provide the same identifier
/// the later registration wins and a conflict diagnostic names both.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
	owners: BTreeMap<Identifier, DocumentId>,
	diagnostics: Vec<CourseDiagnostic>,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register every identifier provided by `documents`, in order.
	pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
		let mut registry = Self::new();
		for document in documents {
			for identifier in &document.tokens.provided {
				registry.register(&document.id, identifier);
			}
		}
		registry
	}

	/// Record `document` as the owner of `identifier`, overriding (and
	/// reporting) any different previous owner.
	pub fn register(&mut self, document: &str, identifier: &Identifier) {
		let previous = self
			.owners
			.insert(identifier.clone(), document.to_string());

		if let Some(previous) = previous.filter(|previous| previous != document) {
			self.diagnostics.push(
				CourseDiagnostic::new(
					document,
					DiagnosticKind::DuplicateProvider {
						identifier: identifier.clone(),
						previous,
					},
				)
				.emit(),
			);
		}
	}

	pub fn lookup(&self, identifier: &Identifier) -> Option<&DocumentId> {
		self.owners.get(identifier)
	}

	pub fn len(&self) -> usize {
		self.owners.len()
	}

	pub fn is_empty(&self) -> bool {
		self.owners.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &DocumentId)> {
		self.owners.iter()
	}

	/// Conflicts reported so far.
	pub fn diagnostics(&self) -> &[CourseDiagnostic] {
		&self.diagnostics
	}

	pub(crate) fn take_diagnostics(&mut self) -> Vec<CourseDiagnostic> {
		std::mem::take(&mut self.diagnostics)
	}
}
