use miette::Diagnostic;
use thiserror::Error;

/// Fatal errors. Anything reported here aborts the whole invocation before
/// tags or a buildable set are produced.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SyllabusError {
	#[error(transparent)]
	#[diagnostic(code(syllabus::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(syllabus::config_parse),
		help("check that syllabus.toml is valid TOML with [levels], [scenarios] and/or [exclude] sections")
	)]
	ConfigParse(String),

	#[error("failed to parse unit configuration `{path}`: {reason}")]
	#[diagnostic(code(syllabus::unit_parse))]
	UnitParse { path: String, reason: String },

	#[error("key `{key}` is required in `{node}`")]
	#[diagnostic(code(syllabus::missing_key))]
	MissingKey { node: String, key: String },

	#[error("key `{key}` is not allowed in `{node}`")]
	#[diagnostic(code(syllabus::key_not_allowed), help("allowed keys: {allowed}"))]
	KeyNotAllowed {
		node: String,
		key: String,
		allowed: String,
	},

	#[error("value of `{node}` must be {expected}")]
	#[diagnostic(code(syllabus::invalid_value_type))]
	InvalidValueType { node: String, expected: String },

	#[error("component name `{name}` in `{node}` is reserved")]
	#[diagnostic(
		code(syllabus::reserved_component_name),
		help("rename the component; `all`, `default` and configuration keys cannot be used")
	)]
	ReservedComponentName { node: String, name: String },

	#[error("component `{name}` in `{node}` has no `{name}.yaml` or `{name}.rst`")]
	#[diagnostic(code(syllabus::unknown_component))]
	UnknownComponent { node: String, name: String },

	#[error("component `{name}` in `{node}` matches both `{name}.yaml` and `{name}.rst`")]
	#[diagnostic(
		code(syllabus::ambiguous_component),
		help("a component must be either a nested unit or a document, never both")
	)]
	AmbiguousComponent { node: String, name: String },

	#[error("invalid {dimension} value `{value}` in `{node}`")]
	#[diagnostic(code(syllabus::invalid_filter_value), help("allowed values: {allowed}"))]
	InvalidFilterValue {
		node: String,
		dimension: String,
		value: String,
		allowed: String,
	},

	#[error("no unit configuration given")]
	#[diagnostic(
		code(syllabus::missing_course),
		help("pass `--course <file>` or set `course = \"course.yaml\"` in syllabus.toml")
	)]
	MissingCourse,

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(syllabus::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },

	#[error("unit configuration `{path}` includes itself through `{chain}`")]
	#[diagnostic(code(syllabus::config_cycle))]
	ConfigCycle { path: String, chain: String },
}

pub type SyllabusResult<T> = Result<T, SyllabusError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
