use std::collections::BTreeSet;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::Dimension;
use crate::DocumentId;
use crate::config::ALL;
use crate::config::DEFAULT;
use crate::unit::ComponentTarget;
use crate::unit::FilterLists;
use crate::unit::UnitNode;

/// A leaf component with its fully resolved filter lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedComponent {
	pub name: String,
	pub scenarios: Vec<String>,
	pub levels: Vec<String>,
	/// Descriptive only; lecturers never produce tags.
	pub lecturers: Vec<String>,
}

/// The output of flattening a unit tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flattened {
	pub title: String,
	/// Selection tags in emission order, without duplicates.
	pub tags: Vec<String>,
	/// Leaf components in the order they were reached.
	pub leaves: Vec<ResolvedComponent>,
}

impl Flattened {
	/// The leaf documents explicitly requested by the configuration.
	pub fn seed(&self) -> BTreeSet<DocumentId> {
		self.leaves.iter().map(|leaf| leaf.name.clone()).collect()
	}
}

/// The tag for one `(component, dimension, value)` triple.
pub fn filter_tag(component: &str, dimension: Dimension, value: &str) -> String {
	format!("{component}_{}_{value}", dimension.key())
}

/// Resolve one dimension of a component against the inherited default.
///
/// - an omitted list inherits `inherited` as is;
/// - each `default` is replaced in place by `inherited`;
/// - any `all` collapses the list to `["all"]`.
///
/// Values keep their first occurrence only.
pub fn resolve_list(own: Option<&[String]>, inherited: &[String]) -> Vec<String> {
	let Some(own) = own else {
		return inherited.to_vec();
	};

	let mut seen = HashSet::new();
	let mut resolved = Vec::with_capacity(own.len() + inherited.len());
	for value in own {
		let expanded: &[String] = if value == DEFAULT {
			inherited
		} else {
			std::slice::from_ref(value)
		};
		for value in expanded {
			if seen.insert(value.as_str()) {
				resolved.push(value.clone());
			}
		}
	}

	if resolved.iter().any(|value| value == ALL) {
		return vec![ALL.to_string()];
	}

	resolved
}

fn resolve_all(own: &FilterLists, inherited: &FilterLists) -> FilterLists {
	Dimension::ALL
		.iter()
		.map(|dimension| {
			let inherited = inherited.get(dimension).map_or(&[][..], Vec::as_slice);
			let own = own.get(dimension).map(Vec::as_slice);
			(*dimension, resolve_list(own, inherited))
		})
		.collect()
}

/// Walk a validated unit tree and emit the selection tags for every leaf.
///
/// Each nested unit inherits the resolved lists of the component that
/// includes it. Where that component omits a dimension, the nested unit's
/// own `default_*` list applies instead, with `default` inside it meaning
/// the parent's value.
pub fn flatten(root: &UnitNode) -> Flattened {
	let mut flattened = Flattened {
		title: root.title.clone(),
		..Flattened::default()
	};
	let mut emitted = HashSet::new();
	let defaults = resolve_all(&root.defaults, &FilterLists::new());
	walk(root, &defaults, &mut flattened, &mut emitted);

	tracing::debug!(
		tags = flattened.tags.len(),
		leaves = flattened.leaves.len(),
		"flattened unit tree"
	);
	flattened
}

/// The defaults a nested unit starts from: the including component's
/// explicit lists win over the unit's own `default_*` lists.
fn nested_defaults(child: &UnitNode, given: &FilterLists, resolved: &FilterLists) -> FilterLists {
	Dimension::ALL
		.iter()
		.map(|dimension| {
			let inherited = resolved.get(dimension).map_or(&[][..], Vec::as_slice);
			let list = if given.contains_key(dimension) {
				inherited.to_vec()
			} else {
				resolve_list(child.defaults.get(dimension).map(Vec::as_slice), inherited)
			};
			(*dimension, list)
		})
		.collect()
}

fn walk(
	node: &UnitNode,
	defaults: &FilterLists,
	flattened: &mut Flattened,
	emitted: &mut HashSet<String>,
) {
	for component in &node.components {
		let resolved = resolve_all(&component.filters, defaults);

		match &component.target {
			ComponentTarget::Unit(child) => {
				let defaults = nested_defaults(child, &component.filters, &resolved);
				walk(child, &defaults, flattened, emitted);
			}
			ComponentTarget::Document => {
				let mut push = |tag: String| {
					if emitted.insert(tag.clone()) {
						flattened.tags.push(tag);
					}
				};
				push(component.name.clone());
				for dimension in Dimension::ALL.into_iter().filter(|d| d.emits_tags()) {
					for value in resolved.get(&dimension).into_iter().flatten() {
						push(filter_tag(&component.name, dimension, value));
					}
				}

				let list = |dimension: Dimension| resolved.get(&dimension).cloned().unwrap_or_default();
				flattened.leaves.push(ResolvedComponent {
					name: component.name.clone(),
					scenarios: list(Dimension::Scenarios),
					levels: list(Dimension::Levels),
					lecturers: list(Dimension::Lecturers),
				});
			}
		}
	}
}
