use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::Document;
use crate::DocumentId;
use crate::NavEntry;

/// `all_documents − buildable`.
pub fn prune(
	all_documents: &BTreeSet<DocumentId>,
	buildable: &BTreeSet<DocumentId>,
) -> BTreeSet<DocumentId> {
	all_documents.difference(buildable).cloned().collect()
}

/// Incremental rebuild bookkeeping handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedDocuments {
	pub added: BTreeSet<DocumentId>,
	pub changed: BTreeSet<DocumentId>,
	pub removed: BTreeSet<DocumentId>,
}

/// Removes unused documents from everything the renderer sees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pruner {
	unused: BTreeSet<DocumentId>,
	/// Documents that were unused in the previous run but are buildable now.
	reinstated: BTreeSet<DocumentId>,
}

impl Pruner {
	/// Compute the unused set. `previous_unused` is the unused set persisted
	/// by the last completed run, if any.
	pub fn new(
		all_documents: &BTreeSet<DocumentId>,
		buildable: &BTreeSet<DocumentId>,
		previous_unused: Option<&BTreeSet<DocumentId>>,
	) -> Self {
		let unused = prune(all_documents, buildable);
		let reinstated = previous_unused
			.map(|previous| {
				previous
					.iter()
					.filter(|document| buildable.contains(*document))
					.cloned()
					.collect()
			})
			.unwrap_or_default();

		Self { unused, reinstated }
	}

	pub fn unused(&self) -> &BTreeSet<DocumentId> {
		&self.unused
	}

	pub fn reinstated(&self) -> &BTreeSet<DocumentId> {
		&self.reinstated
	}

	pub fn is_unused(&self, document: &str) -> bool {
		self.unused.contains(document)
	}

	/// Drop unused documents from the discovered set.
	pub fn retain_buildable(&self, documents: &mut Vec<Document>) {
		documents.retain(|document| !self.is_unused(&document.id));
	}

	/// Keep unused documents out of added/changed tracking and force them
	/// into removed. Reinstated documents are forced into added so the
	/// renderer reads them again.
	pub fn update_outdated(&self, outdated: &mut OutdatedDocuments) {
		outdated
			.added
			.retain(|document| !self.unused.contains(document));
		outdated
			.changed
			.retain(|document| !self.unused.contains(document));
		outdated.removed.extend(self.unused.iter().cloned());
		outdated.added.extend(self.reinstated.iter().cloned());
		outdated
			.changed
			.retain(|document| !self.reinstated.contains(document));
	}

	/// Strip entries pointing at unused documents, keeping sibling order.
	pub fn strip_navigation(&self, entries: &mut Vec<NavEntry>) {
		entries.retain(|entry| !self.is_unused(&entry.target));
	}
}
