use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use serde_yaml_ng::Mapping;
use serde_yaml_ng::Value;

use crate::Dimension;
use crate::SyllabusError;
use crate::SyllabusResult;
use crate::Vocabulary;
use crate::config::ALL;
use crate::config::DEFAULT;

pub const TITLE: &str = "title";
pub const COMPONENTS: &str = "components";

/// Filter lists keyed by dimension. A missing dimension means "not given".
pub type FilterLists = BTreeMap<Dimension, Vec<String>>;

/// What a component name points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentTarget {
	/// A leaf document with the same name.
	Document,
	/// A nested unit configuration.
	Unit(Box<UnitNode>),
}

/// One entry of a node's `components` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
	pub name: String,
	pub filters: FilterLists,
	pub target: ComponentTarget,
}

/// A validated unit configuration node. Components keep the order of the
/// source mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitNode {
	pub title: String,
	/// Where this node came from, used in error messages.
	pub path: String,
	pub defaults: FilterLists,
	pub components: Vec<Component>,
}

/// Resolves component names to nested units or leaf documents.
pub trait ComponentSource {
	/// Whether a leaf document named `name` exists.
	fn has_document(&self, name: &str) -> bool;
	/// The raw YAML of the nested unit named `name`, if there is one.
	fn read_unit(&self, name: &str) -> SyllabusResult<Option<String>>;
}

/// Resolves `name` to `<root>/<name>.yaml` or `<root>/<name>.rst`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
	root: PathBuf,
}

impl DirectorySource {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}
}

impl ComponentSource for DirectorySource {
	fn has_document(&self, name: &str) -> bool {
		self.root.join(format!("{name}.rst")).is_file()
	}

	fn read_unit(&self, name: &str) -> SyllabusResult<Option<String>> {
		let path = self.root.join(format!("{name}.yaml"));
		if !path.is_file() {
			return Ok(None);
		}

		Ok(Some(std::fs::read_to_string(path)?))
	}
}

/// An in-memory corpus, handy for services that do not read from disk.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	pub documents: BTreeSet<String>,
	pub units: BTreeMap<String, String>,
}

impl ComponentSource for MemorySource {
	fn has_document(&self, name: &str) -> bool {
		self.documents.contains(name)
	}

	fn read_unit(&self, name: &str) -> SyllabusResult<Option<String>> {
		Ok(self.units.get(name).cloned())
	}
}

/// Names that can never be used as components.
pub fn is_reserved_name(name: &str) -> bool {
	name == ALL
		|| name == DEFAULT
		|| name == TITLE
		|| name == COMPONENTS
		|| Dimension::ALL
			.iter()
			.any(|dimension| name == dimension.key() || name == dimension.default_key())
}

impl UnitNode {
	/// Load and validate a root unit configuration file and every nested
	/// unit below it.
	pub fn load(
		path: &Path,
		source: &impl ComponentSource,
		vocabulary: &Vocabulary,
	) -> SyllabusResult<UnitNode> {
		let content = std::fs::read_to_string(path)?;
		let name = path
			.file_name()
			.map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
		Self::parse(&content, &name, source, vocabulary)
	}

	/// Parse and validate a unit configuration from YAML text. Nothing is
	/// returned unless the whole tree is valid.
	pub fn parse(
		content: &str,
		name: &str,
		source: &impl ComponentSource,
		vocabulary: &Vocabulary,
	) -> SyllabusResult<UnitNode> {
		let mut chain = vec![name.trim_end_matches(".yaml").to_string()];
		parse_node(content, name, source, vocabulary, &mut chain)
	}

	/// Number of leaf documents below this node.
	pub fn leaf_count(&self) -> usize {
		self.components
			.iter()
			.map(|component| match &component.target {
				ComponentTarget::Document => 1,
				ComponentTarget::Unit(node) => node.leaf_count(),
			})
			.sum()
	}
}

fn parse_node(
	content: &str,
	path: &str,
	source: &impl ComponentSource,
	vocabulary: &Vocabulary,
	chain: &mut Vec<String>,
) -> SyllabusResult<UnitNode> {
	let value: Value =
		serde_yaml_ng::from_str(content).map_err(|e| SyllabusError::UnitParse {
			path: path.to_string(),
			reason: e.to_string(),
		})?;
	let mapping = as_mapping(path, &value)?;

	let mut allowed = vec![TITLE, COMPONENTS];
	allowed.extend(Dimension::ALL.iter().map(|dimension| dimension.default_key()));
	check_keys(path, mapping, &allowed)?;

	let title = match required(path, mapping, TITLE)? {
		Value::String(title) => title.clone(),
		_ => {
			return Err(SyllabusError::InvalidValueType {
				node: format!("{path}/{TITLE}"),
				expected: "a string".to_string(),
			});
		}
	};

	let mut defaults = FilterLists::new();
	for dimension in Dimension::ALL {
		let key = dimension.default_key();
		if let Some(value) = mapping.get(key) {
			let list = filter_list(&format!("{path}/{key}"), dimension, value, vocabulary)?;
			defaults.insert(dimension, list);
		}
	}

	let components_path = format!("{path}/{COMPONENTS}");
	let components_mapping = as_mapping(&components_path, required(path, mapping, COMPONENTS)?)?;
	let mut components = Vec::with_capacity(components_mapping.len());

	for (key, value) in components_mapping {
		let Some(name) = key.as_str() else {
			return Err(SyllabusError::InvalidValueType {
				node: components_path.clone(),
				expected: "a mapping with string keys".to_string(),
			});
		};
		components.push(parse_component(
			&components_path,
			name,
			value,
			source,
			vocabulary,
			chain,
		)?);
	}

	Ok(UnitNode {
		title,
		path: path.to_string(),
		defaults,
		components,
	})
}

fn parse_component(
	parent: &str,
	name: &str,
	value: &Value,
	source: &impl ComponentSource,
	vocabulary: &Vocabulary,
	chain: &mut Vec<String>,
) -> SyllabusResult<Component> {
	if is_reserved_name(name) {
		return Err(SyllabusError::ReservedComponentName {
			node: parent.to_string(),
			name: name.to_string(),
		});
	}

	let path = format!("{parent}/{name}");
	let empty = Mapping::new();
	let mapping = match value {
		Value::Null => &empty,
		other => as_mapping(&path, other)?,
	};
	let allowed: Vec<&str> = Dimension::ALL.iter().map(|dimension| dimension.key()).collect();
	check_keys(&path, mapping, &allowed)?;

	let mut filters = FilterLists::new();
	for dimension in Dimension::ALL {
		if let Some(value) = mapping.get(dimension.key()) {
			let list = filter_list(
				&format!("{path}/{}", dimension.key()),
				dimension,
				value,
				vocabulary,
			)?;
			filters.insert(dimension, list);
		}
	}

	let is_document = source.has_document(name);
	let unit = source.read_unit(name)?;
	let target = match (is_document, unit) {
		(true, Some(_)) => {
			return Err(SyllabusError::AmbiguousComponent {
				node: parent.to_string(),
				name: name.to_string(),
			});
		}
		(false, None) => {
			return Err(SyllabusError::UnknownComponent {
				node: parent.to_string(),
				name: name.to_string(),
			});
		}
		(true, None) => ComponentTarget::Document,
		(false, Some(content)) => {
			if chain.iter().any(|seen| seen == name) {
				chain.push(name.to_string());
				return Err(SyllabusError::ConfigCycle {
					path: name.to_string(),
					chain: chain.join(" -> "),
				});
			}
			chain.push(name.to_string());
			let node = parse_node(&content, name, source, vocabulary, chain)?;
			chain.pop();
			ComponentTarget::Unit(Box::new(node))
		}
	};

	Ok(Component {
		name: name.to_string(),
		filters,
		target,
	})
}

fn as_mapping<'a>(path: &str, value: &'a Value) -> SyllabusResult<&'a Mapping> {
	value
		.as_mapping()
		.ok_or_else(|| SyllabusError::InvalidValueType {
			node: path.to_string(),
			expected: "a mapping".to_string(),
		})
}

fn required<'a>(path: &str, mapping: &'a Mapping, key: &str) -> SyllabusResult<&'a Value> {
	mapping.get(key).ok_or_else(|| SyllabusError::MissingKey {
		node: path.to_string(),
		key: key.to_string(),
	})
}

fn check_keys(path: &str, mapping: &Mapping, allowed: &[&str]) -> SyllabusResult<()> {
	for key in mapping.keys() {
		let name = key.as_str().unwrap_or_default();
		if !allowed.contains(&name) {
			return Err(SyllabusError::KeyNotAllowed {
				node: path.to_string(),
				key: key.as_str().map_or_else(|| format!("{key:?}"), str::to_string),
				allowed: allowed.join(", "),
			});
		}
	}

	Ok(())
}

/// Read a list of strings and check each value against the vocabulary.
fn filter_list(
	path: &str,
	dimension: Dimension,
	value: &Value,
	vocabulary: &Vocabulary,
) -> SyllabusResult<Vec<String>> {
	let invalid_type = || SyllabusError::InvalidValueType {
		node: path.to_string(),
		expected: "a list of strings".to_string(),
	};
	let sequence = value.as_sequence().ok_or_else(invalid_type)?;

	let mut list = Vec::with_capacity(sequence.len());
	for item in sequence {
		let item = item.as_str().ok_or_else(invalid_type)?;
		if !vocabulary.accepts(dimension, item) {
			return Err(SyllabusError::InvalidFilterValue {
				node: path.to_string(),
				dimension: dimension.key().to_string(),
				value: item.to_string(),
				allowed: vocabulary.allowed(dimension),
			});
		}
		list.push(item.to_string());
	}

	Ok(list)
}
