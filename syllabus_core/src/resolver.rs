use std::collections::BTreeSet;
use std::collections::VecDeque;

use serde::Deserialize;
use serde::Serialize;

use crate::DependencyGraph;
use crate::DocumentId;
use crate::EdgeKind;
use crate::graph::Adjacency;

/// The documents a build needs, split by why they are needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closure {
	/// The explicitly selected seed documents.
	pub selected: BTreeSet<DocumentId>,
	/// Documents reachable from the seed through required edges.
	pub required: BTreeSet<DocumentId>,
	/// Documents reachable through mentioned edges that are not required.
	pub mentioned: BTreeSet<DocumentId>,
}

impl Closure {
	/// `selected ∪ required ∪ mentioned`.
	pub fn buildable(&self) -> BTreeSet<DocumentId> {
		self.selected
			.iter()
			.chain(&self.required)
			.chain(&self.mentioned)
			.cloned()
			.collect()
	}
}

/// Compute the required closure, then the mentioned closure, of `seed`.
///
/// A document reachable both ways is only reported as required, and seed
/// documents are never reported in either closure.
pub fn resolve(graph: &DependencyGraph, seed: &BTreeSet<DocumentId>) -> Closure {
	let mut tagged = seed.clone();

	let required = reach(&graph.dependencies(EdgeKind::Required), &mut tagged);
	let mut mentioned = reach(&graph.dependencies(EdgeKind::Mentioned), &mut tagged);
	mentioned.retain(|document| !required.contains(document));

	tracing::debug!(
		selected = seed.len(),
		required = required.len(),
		mentioned = mentioned.len(),
		"resolved closure"
	);

	Closure {
		selected: seed.clone(),
		required,
		mentioned,
	}
}

/// Worklist reachability over `dependencies` (`consumer -> {owners}`),
/// starting from every document in `tagged`. Newly reached documents are
/// added to `tagged` and returned. Terminates because `tagged` only grows
/// and each document enters the queue at most once.
fn reach(dependencies: &Adjacency, tagged: &mut BTreeSet<DocumentId>) -> BTreeSet<DocumentId> {
	let mut reached = BTreeSet::new();
	let mut queue: VecDeque<DocumentId> = tagged.iter().cloned().collect();

	while let Some(consumer) = queue.pop_front() {
		let Some(owners) = dependencies.get(&consumer) else {
			continue;
		};

		for owner in owners {
			if tagged.insert(owner.clone()) {
				reached.insert(owner.clone());
				queue.push_back(owner.clone());
			}
		}
	}

	reached
}
