use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use serde::Serialize;

use crate::Closure;
use crate::CourseDiagnostic;
use crate::DependencyGraph;
use crate::Dimension;
use crate::Document;
use crate::DocumentId;
use crate::NavEntry;
use crate::OutdatedDocuments;
use crate::Pruner;
use crate::ProviderRegistry;
use crate::ResolvedComponent;
use crate::SyllabusConfig;
use crate::SyllabusError;
use crate::SyllabusResult;
use crate::UnitNode;
use crate::UNIT_TYPE;
use crate::Vocabulary;
use crate::config::CONFIG_FILE_CANDIDATES;
use crate::diagnostic::DiagnosticKind;
use crate::document::document_id;
use crate::flatten;
use crate::resolve;
use crate::state;
use crate::state::BuildState;
use crate::state::Fingerprint;
use crate::unit::DirectorySource;

/// Directory the renderer writes into. Never scanned for sources.
pub const BUILD_DIRECTORY: &str = "_build";
/// Where the plan handed to the renderer is written, relative to the root.
pub const PLAN_FILE: &str = ".syllabus/cache/plan.json";

/// Options for [`plan_course`].
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
	/// Root unit configuration. Falls back to `course` in `syllabus.toml`.
	/// Relative paths are resolved against the project root.
	pub course: Option<PathBuf>,
	/// Ignore the persisted state of the previous build.
	pub ignore_state: bool,
}

/// Why a document is part of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Inclusion {
	Selected,
	Required,
	Mentioned,
}

/// A `.. level::` / `.. scenario::` block with the tag expression that
/// decides its visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateExpression {
	pub line: usize,
	pub dimension: Dimension,
	pub expression: String,
}

/// A document that survives pruning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDocument {
	pub id: DocumentId,
	pub path: PathBuf,
	pub inclusion: Inclusion,
	/// The declared `unit-type`, such as `lecture` or `demo`.
	pub unit_type: Option<String>,
	pub metadata: Vec<(String, String)>,
	/// Navigation entries, with unused targets already removed.
	pub navigation: Vec<NavEntry>,
	pub gates: Vec<GateExpression>,
}

/// Everything a renderer needs to build one course.
#[derive(Debug, Clone, Serialize)]
pub struct CoursePlan {
	pub course: PathBuf,
	pub title: String,
	/// Selection tags to enable in the renderer.
	pub tags: Vec<String>,
	pub leaves: Vec<ResolvedComponent>,
	#[serde(flatten)]
	pub closure: Closure,
	pub unused: BTreeSet<DocumentId>,
	/// Previously unused documents that are part of the build again.
	pub reinstated: BTreeSet<DocumentId>,
	/// Buildable documents in discovery order.
	pub documents: Vec<PlannedDocument>,
	pub outdated: OutdatedDocuments,
	pub diagnostics: Vec<CourseDiagnostic>,
	#[serde(skip)]
	fingerprints: BTreeMap<DocumentId, Fingerprint>,
}

impl CoursePlan {
	/// Whether any recoverable problem was reported.
	pub fn has_warnings(&self) -> bool {
		!self.diagnostics.is_empty()
	}

	pub fn document(&self, id: &str) -> Option<&PlannedDocument> {
		self.documents.iter().find(|document| document.id == id)
	}
}

/// Compute the full plan for the course rooted at `root`.
///
/// The unit configuration is validated completely before any document is
/// read, so a fatal error never comes with partial output.
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub fn plan_course(root: &Path, options: &PlanOptions) -> SyllabusResult<CoursePlan> {
	let config = SyllabusConfig::load(root)?.unwrap_or_default();
	let course = course_path(root, options, &config)?;
	let unit = UnitNode::load(&course, &DirectorySource::new(root), &config.vocabulary)?;
	let flattened = flatten(&unit);

	let files = collect_files(root, &config.exclude.patterns, config.disable_gitignore)?;
	let (documents, fingerprints, mut diagnostics) =
		read_documents(root, &files, &config.vocabulary);

	let mut registry = ProviderRegistry::from_documents(&documents);
	diagnostics.extend(registry.take_diagnostics());
	let (graph, dropped) = DependencyGraph::build(&documents, &registry);
	diagnostics.extend(dropped);

	let all_documents: BTreeSet<DocumentId> = documents.iter().map(|d| d.id.clone()).collect();
	// Documents without a metadata block are always part of the build.
	let mut seed = BTreeSet::new();
	let mut excluded = BTreeSet::new();
	for leaf in &flattened.leaves {
		if all_documents.contains(&leaf.name) {
			seed.insert(leaf.name.clone());
		} else if excluded.insert(leaf.name.clone()) {
			diagnostics.push(
				CourseDiagnostic::new(leaf.name.clone(), DiagnosticKind::ExcludedComponent).emit(),
			);
		}
	}
	seed.extend(
		documents
			.iter()
			.filter(|document| !document.has_metadata)
			.map(|document| document.id.clone()),
	);

	let closure = resolve(&graph, &seed);
	let previous = if options.ignore_state {
		None
	} else {
		state::load(root)
	};
	let pruner = Pruner::new(
		&all_documents,
		&closure.buildable(),
		previous.as_ref().map(|state| &state.unused),
	);

	let mut outdated = state::compare_fingerprints(previous.as_ref(), &fingerprints);
	pruner.update_outdated(&mut outdated);

	let mut documents = documents;
	pruner.retain_buildable(&mut documents);
	let documents = documents
		.into_iter()
		.map(|document| plan_document(document, &closure, &pruner))
		.collect::<Vec<_>>();

	tracing::debug!(
		buildable = documents.len(),
		unused = pruner.unused().len(),
		reinstated = pruner.reinstated().len(),
		"planned course"
	);

	Ok(CoursePlan {
		course,
		title: flattened.title,
		tags: flattened.tags,
		leaves: flattened.leaves,
		unused: pruner.unused().clone(),
		reinstated: pruner.reinstated().clone(),
		closure,
		documents,
		outdated,
		diagnostics,
		fingerprints,
	})
}

/// Persist the unused set and document fingerprints of `plan` for the next
/// run. Failures are ignored.
pub fn save_state(root: &Path, plan: &CoursePlan) {
	let state = BuildState::new(plan.fingerprints.clone(), plan.unused.clone());
	state::save(root, &state);
}

/// Write `plan` as JSON to [`PLAN_FILE`] so the renderer can read the
/// buildable documents, the unused ones and the filtered navigation.
pub fn write_plan(root: &Path, plan: &CoursePlan) -> SyllabusResult<PathBuf> {
	let path = root.join(PLAN_FILE);
	if let Some(dir) = path.parent() {
		std::fs::create_dir_all(dir)?;
	}

	let payload = serde_json::to_vec_pretty(plan).map_err(std::io::Error::from)?;
	std::fs::write(&path, payload)?;

	tracing::debug!(path = %path.display(), "wrote course plan");
	Ok(path)
}

/// Source paths of the unused documents, relative to the root, in the form
/// renderer exclude patterns expect.
pub fn unused_sources(plan: &CoursePlan) -> Vec<String> {
	plan.unused.iter().map(|id| format!("{id}.rst")).collect()
}

fn course_path(
	root: &Path,
	options: &PlanOptions,
	config: &SyllabusConfig,
) -> SyllabusResult<PathBuf> {
	let course = options
		.course
		.as_ref()
		.or(config.course.as_ref())
		.ok_or(SyllabusError::MissingCourse)?;

	Ok(root.join(course))
}

fn plan_document(document: Document, closure: &Closure, pruner: &Pruner) -> PlannedDocument {
	let inclusion = if closure.selected.contains(&document.id) {
		Inclusion::Selected
	} else if closure.required.contains(&document.id) {
		Inclusion::Required
	} else {
		Inclusion::Mentioned
	};

	let unit_type = document.field(UNIT_TYPE).map(str::to_string);
	let mut navigation = document.navigation;
	pruner.strip_navigation(&mut navigation);

	let gates = document
		.gates
		.iter()
		.map(|gate| GateExpression {
			line: gate.line,
			dimension: gate.dimension,
			expression: gate.expression(&document.id),
		})
		.collect();

	PlannedDocument {
		id: document.id,
		path: document.path,
		inclusion,
		unit_type,
		metadata: document.metadata,
		navigation,
		gates,
	}
}

type ReadDocuments = (
	Vec<Document>,
	BTreeMap<DocumentId, Fingerprint>,
	Vec<CourseDiagnostic>,
);

#[tracing::instrument(skip_all, fields(files = files.len()))]
fn read_documents(
	root: &Path,
	files: &[PathBuf],
	vocabulary: &Vocabulary,
) -> ReadDocuments {
	let mut documents = Vec::with_capacity(files.len());
	let mut fingerprints = BTreeMap::new();
	let mut diagnostics = Vec::new();

	for file in files {
		let id = document_id(root, file);
		let bytes = match std::fs::read(file) {
			Ok(bytes) => bytes,
			Err(e) => {
				let kind = DiagnosticKind::Unreadable {
					reason: e.to_string(),
				};
				diagnostics.push(CourseDiagnostic::new(id, kind).emit());
				continue;
			}
		};

		let text = match String::from_utf8(bytes) {
			Ok(text) => text,
			Err(e) => {
				diagnostics
					.push(CourseDiagnostic::new(id.clone(), DiagnosticKind::InvalidEncoding).emit());
				String::from_utf8_lossy(e.as_bytes()).into_owned()
			}
		};
		let content = normalize_line_endings(&text);
		fingerprints.insert(id.clone(), Fingerprint::of(&content));

		let (document, problems) = Document::from_source(id, file.clone(), &content, vocabulary);
		diagnostics.extend(problems);
		documents.push(document);
	}

	(documents, fingerprints, diagnostics)
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// Collect every `.rst` document below `root`, sorted.
///
/// Files matched by the project's `.gitignore` are skipped unless
/// `disable_gitignore` is set; `exclude_patterns` always apply. A directory
/// reached a second time through a symlink is walked once.
#[tracing::instrument(skip_all)]
pub fn collect_files(
	root: &Path,
	exclude_patterns: &[String],
	disable_gitignore: bool,
) -> SyllabusResult<Vec<PathBuf>> {
	let mut rules = vec![ignore_rules(root, exclude_patterns)?];
	if !disable_gitignore {
		rules.push(gitignore_rules(root));
	}

	let mut discovery = Discovery {
		rules,
		ancestors: Vec::new(),
		walked: HashSet::new(),
		files: Vec::new(),
	};
	discovery.walk(root)?;

	let mut files = discovery.files;
	files.sort();

	tracing::debug!(files = files.len(), "discovered documents");
	Ok(files)
}

/// `[exclude]` patterns in `.gitignore` syntax.
fn ignore_rules(root: &Path, patterns: &[String]) -> SyllabusResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			SyllabusError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}

	builder
		.build()
		.map_err(|e| SyllabusError::ConfigParse(format!("invalid exclude patterns: {e}")))
}

/// The project's own `.gitignore`. A broken file ignores nothing.
fn gitignore_rules(root: &Path) -> Gitignore {
	let path = root.join(".gitignore");
	if !path.is_file() {
		return Gitignore::empty();
	}

	let (gitignore, error) = Gitignore::new(&path);
	if let Some(error) = error {
		tracing::debug!(%error, "partially invalid .gitignore");
	}
	gitignore
}

struct Discovery {
	rules: Vec<Gitignore>,
	/// Canonical directories on the current descent.
	ancestors: Vec<PathBuf>,
	/// Canonical directories walked so far, through any path.
	walked: HashSet<PathBuf>,
	files: Vec<PathBuf>,
}

impl Discovery {
	fn walk(&mut self, dir: &Path) -> SyllabusResult<()> {
		if !dir.is_dir() {
			return Ok(());
		}

		let canonical = dir.canonicalize()?;
		if self.ancestors.contains(&canonical) {
			return Err(SyllabusError::SymlinkCycle {
				path: dir.display().to_string(),
			});
		}
		if !self.walked.insert(canonical.clone()) {
			tracing::debug!(dir = %dir.display(), "directory already walked through another path");
			return Ok(());
		}

		let mut entries = std::fs::read_dir(dir)?
			.map(|entry| entry.map(|entry| entry.path()))
			.collect::<Result<Vec<_>, _>>()?;
		entries.sort();

		self.ancestors.push(canonical);
		for path in entries {
			let is_dir = path.is_dir();
			if self.is_skipped(&path, is_dir) {
				continue;
			}

			if !is_dir {
				if is_document_file(&path) {
					self.files.push(path);
				}
				continue;
			}

			// A nested config file marks a separate course project.
			if has_project_config(&path) {
				continue;
			}
			self.walk(&path)?;
		}
		self.ancestors.pop();

		Ok(())
	}

	fn is_skipped(&self, path: &Path, is_dir: bool) -> bool {
		let hidden_or_output = is_dir
			&& path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(is_ignored_directory_name);

		hidden_or_output || self.rules.iter().any(|rules| rules.matched(path, is_dir).is_ignore())
	}
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target" || name == BUILD_DIRECTORY
}

fn has_project_config(dir: &Path) -> bool {
	CONFIG_FILE_CANDIDATES
		.iter()
		.any(|candidate| dir.join(candidate).is_file())
}

fn is_document_file(path: &Path) -> bool {
	path.extension().and_then(|ext| ext.to_str()) == Some("rst")
}
