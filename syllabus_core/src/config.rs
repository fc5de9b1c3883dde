use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::SyllabusError;
use crate::SyllabusResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"syllabus.toml",
	".syllabus.toml",
	".config/syllabus.toml",
];

/// Selects every value of a dimension.
pub const ALL: &str = "all";
/// Stands for the inherited default list of a dimension.
pub const DEFAULT: &str = "default";

/// The level identifiers used when no `[levels]` table is configured.
pub const DEFAULT_LEVELS: [(&str, &str); 5] = [
	("beginner", "Beginner"),
	("elementary", "Elementary"),
	("intermediate", "Intermediate"),
	("advanced", "Advanced"),
	("proficient", "Proficient"),
];

/// A filter dimension of a unit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
	Scenarios,
	Levels,
	Lecturers,
}

impl Dimension {
	/// All dimensions in emission order.
	pub const ALL: [Dimension; 3] = [Self::Scenarios, Self::Levels, Self::Lecturers];

	/// The key used on a component and inside tags.
	pub fn key(self) -> &'static str {
		match self {
			Self::Scenarios => "scenarios",
			Self::Levels => "levels",
			Self::Lecturers => "lecturers",
		}
	}

	/// The key holding a node's default list.
	pub fn default_key(self) -> &'static str {
		match self {
			Self::Scenarios => "default_scenarios",
			Self::Levels => "default_levels",
			Self::Lecturers => "default_lecturers",
		}
	}

	/// Whether values of this dimension gate content and so produce tags.
	pub fn emits_tags(self) -> bool {
		!matches!(self, Self::Lecturers)
	}

	/// The dimension gated by a `.. level::` / `.. scenario::` directive.
	pub fn from_directive(name: &str) -> Option<Self> {
		match name {
			"level" => Some(Self::Levels),
			"scenario" => Some(Self::Scenarios),
			_ => None,
		}
	}
}

impl Display for Dimension {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.key())
	}
}

/// Valid level and scenario identifiers mapped to their display labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
	#[serde(default = "default_levels")]
	pub levels: BTreeMap<String, String>,
	#[serde(default)]
	pub scenarios: BTreeMap<String, String>,
}

impl Default for Vocabulary {
	fn default() -> Self {
		Self {
			levels: default_levels(),
			scenarios: BTreeMap::new(),
		}
	}
}

fn default_levels() -> BTreeMap<String, String> {
	DEFAULT_LEVELS
		.iter()
		.map(|(id, label)| ((*id).to_string(), (*label).to_string()))
		.collect()
}

impl Vocabulary {
	/// The vocabulary for a dimension. `None` means the dimension is free
	/// form (lecturers).
	pub fn values(&self, dimension: Dimension) -> Option<&BTreeMap<String, String>> {
		match dimension {
			Dimension::Levels => Some(&self.levels),
			Dimension::Scenarios => Some(&self.scenarios),
			Dimension::Lecturers => None,
		}
	}

	/// Check a configured value, accepting the `all` and `default` keywords.
	pub fn accepts(&self, dimension: Dimension, value: &str) -> bool {
		value == ALL
			|| value == DEFAULT
			|| self
				.values(dimension)
				.is_none_or(|values| values.contains_key(value))
	}

	/// The allowed set rendered for error messages.
	pub fn allowed(&self, dimension: Dimension) -> String {
		let mut allowed: Vec<&str> = self
			.values(dimension)
			.map(|values| values.keys().map(String::as_str).collect())
			.unwrap_or_default();
		allowed.push(ALL);
		allowed.push(DEFAULT);
		allowed.join(", ")
	}
}

/// Configuration for excluding files and directories from discovery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Gitignore-style patterns relative to the project root, e.g.
	/// `"drafts/"` or `"*.wip.rst"`.
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Configuration loaded from a `syllabus.toml` file.
///
/// ```toml
/// course = "course.yaml"
///
/// [levels]
/// beginner = "Beginner"
/// advanced = "Advanced"
///
/// [scenarios]
/// turtlebot = "TurtleBot 3"
///
/// [exclude]
/// patterns = ["drafts/"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyllabusConfig {
	/// Root unit configuration used when none is passed explicitly.
	#[serde(default)]
	pub course: Option<PathBuf>,
	#[serde(flatten)]
	pub vocabulary: Vocabulary,
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// When true, `.gitignore` files are not consulted during discovery.
	#[serde(default)]
	pub disable_gitignore: bool,
}

impl SyllabusConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is no config file.
	pub fn load(root: &Path) -> SyllabusResult<Option<SyllabusConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		Ok(Some(config))
	}

	/// Parse config file content.
	pub fn parse(content: &str) -> SyllabusResult<SyllabusConfig> {
		toml::from_str(content).map_err(|e| SyllabusError::ConfigParse(e.to_string()))
	}
}
