use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

use crate::CourseDiagnostic;
use crate::Document;
use crate::DocumentId;
use crate::Identifier;
use crate::ProviderRegistry;
use crate::diagnostic::DiagnosticKind;

/// The strength of a dependency between two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
	/// Hard dependency: the provider is built whenever the consumer is.
	Required,
	/// Soft dependency: the provider is offered as supplementary material.
	Mentioned,
}

impl Display for EdgeKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Required => f.write_str("required"),
			Self::Mentioned => f.write_str("mentioned"),
		}
	}
}

/// Adjacency keyed by the providing document: `owner -> {consumers}`.
pub type Adjacency = BTreeMap<DocumentId, BTreeSet<DocumentId>>;

/// Required and mentioned edges between documents, validated against a
/// [`ProviderRegistry`].
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
	required_by: Adjacency,
	mentioned_by: Adjacency,
	/// Every document that referenced an identifier, valid or not.
	references: BTreeMap<Identifier, BTreeSet<DocumentId>>,
	/// Edges whose identifier had no provider, in insertion order.
	dropped: Vec<(DocumentId, Identifier, EdgeKind)>,
}

impl DependencyGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build the graph from the declared tokens of `documents`. Dropped edges
	/// are logged once the whole corpus has been seen so each warning can
	/// name every document that referenced the missing identifier.
	pub fn build<'a>(
		documents: impl IntoIterator<Item = &'a Document>,
		registry: &ProviderRegistry,
	) -> (Self, Vec<CourseDiagnostic>) {
		let mut graph = Self::new();
		for document in documents {
			for identifier in &document.tokens.required {
				graph.add_edge(registry, &document.id, identifier, EdgeKind::Required);
			}
			for identifier in &document.tokens.mentioned {
				graph.add_edge(registry, &document.id, identifier, EdgeKind::Mentioned);
			}
		}

		let diagnostics = graph
			.dropped_edges()
			.into_iter()
			.map(CourseDiagnostic::emit)
			.collect();
		(graph, diagnostics)
	}

	/// Insert the edge `consumer -> identifier` if some document provides
	/// `identifier`. Returns `false` when the edge was dropped.
	pub fn add_edge(
		&mut self,
		registry: &ProviderRegistry,
		consumer: &str,
		identifier: &Identifier,
		kind: EdgeKind,
	) -> bool {
		self.references
			.entry(identifier.clone())
			.or_default()
			.insert(consumer.to_string());

		let Some(owner) = registry.lookup(identifier) else {
			self.dropped
				.push((consumer.to_string(), identifier.clone(), kind));
			return false;
		};

		if owner != consumer {
			let adjacency = match kind {
				EdgeKind::Required => &mut self.required_by,
				EdgeKind::Mentioned => &mut self.mentioned_by,
			};
			adjacency
				.entry(owner.clone())
				.or_default()
				.insert(consumer.to_string());
		}

		true
	}

	/// One diagnostic per dropped edge.
	pub fn dropped_edges(&self) -> Vec<CourseDiagnostic> {
		self.dropped
			.iter()
			.map(|(consumer, identifier, kind)| {
				let referenced_by = self
					.references
					.get(identifier)
					.map(|documents| documents.iter().cloned().collect())
					.unwrap_or_default();
				CourseDiagnostic::new(
					consumer.clone(),
					DiagnosticKind::UnsatisfiedIdentifier {
						identifier: identifier.clone(),
						edge: *kind,
						referenced_by,
					},
				)
			})
			.collect()
	}

	/// Edges of one kind, keyed by the providing document.
	pub fn edges(&self, kind: EdgeKind) -> &Adjacency {
		match kind {
			EdgeKind::Required => &self.required_by,
			EdgeKind::Mentioned => &self.mentioned_by,
		}
	}

	/// The consumers that need `owner` through edges of `kind`.
	pub fn consumers_of(&self, owner: &str, kind: EdgeKind) -> Option<&BTreeSet<DocumentId>> {
		self.edges(kind).get(owner)
	}

	/// The reverse view of [`edges`](Self::edges): `consumer -> {owners}`.
	pub fn dependencies(&self, kind: EdgeKind) -> Adjacency {
		let mut dependencies = Adjacency::new();
		for (owner, consumers) in self.edges(kind) {
			for consumer in consumers {
				dependencies
					.entry(consumer.clone())
					.or_default()
					.insert(owner.clone());
			}
		}
		dependencies
	}
}
