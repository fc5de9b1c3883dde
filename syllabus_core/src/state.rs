use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

use crate::DocumentId;
use crate::OutdatedDocuments;

pub(crate) const STATE_SCHEMA_VERSION: u32 = 1;
const STATE_FILE_NAME: &str = "prune-v1.json";

/// Identifies a version of a document's content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fingerprint {
	pub size: u64,
	pub content_hash: u64,
}

impl Fingerprint {
	pub fn of(content: &str) -> Self {
		let mut hasher = DefaultHasher::new();
		content.hash(&mut hasher);
		Self {
			size: content.len() as u64,
			content_hash: hasher.finish(),
		}
	}
}

/// What the last completed build left behind, used to compute incremental
/// bookkeeping for the next one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildState {
	pub schema_version: u32,
	pub saved_unix_ms: u64,
	pub documents: BTreeMap<DocumentId, Fingerprint>,
	pub unused: BTreeSet<DocumentId>,
}

impl BuildState {
	pub fn new(documents: BTreeMap<DocumentId, Fingerprint>, unused: BTreeSet<DocumentId>) -> Self {
		Self {
			schema_version: STATE_SCHEMA_VERSION,
			saved_unix_ms: now_unix_ms(),
			documents,
			unused,
		}
	}
}

/// Compare current fingerprints with the previous build. Without a previous
/// build every document counts as added.
pub fn compare_fingerprints(
	previous: Option<&BuildState>,
	current: &BTreeMap<DocumentId, Fingerprint>,
) -> OutdatedDocuments {
	let mut outdated = OutdatedDocuments::default();
	let Some(previous) = previous else {
		outdated.added = current.keys().cloned().collect();
		return outdated;
	};

	for (document, fingerprint) in current {
		match previous.documents.get(document) {
			None => {
				outdated.added.insert(document.clone());
			}
			Some(old) if old != fingerprint => {
				outdated.changed.insert(document.clone());
			}
			Some(_) => {}
		}
	}
	outdated.removed = previous
		.documents
		.keys()
		.filter(|document| !current.contains_key(*document))
		.cloned()
		.collect();

	outdated
}

pub fn state_path(root: &Path) -> PathBuf {
	root.join(".syllabus").join("cache").join(STATE_FILE_NAME)
}

/// Read the persisted state. Anything unreadable or from another schema is
/// treated as missing.
pub fn load(root: &Path) -> Option<BuildState> {
	let bytes = std::fs::read(state_path(root)).ok()?;
	let state = serde_json::from_slice::<BuildState>(&bytes).ok()?;
	if state.schema_version != STATE_SCHEMA_VERSION {
		return None;
	}

	Some(state)
}

/// Persist the state through a temporary file. Failures are ignored; the
/// next run simply treats every document as added.
pub fn save(root: &Path, state: &BuildState) {
	let path = state_path(root);
	let Some(dir) = path.parent() else {
		return;
	};

	if std::fs::create_dir_all(dir).is_err() {
		return;
	}

	let Ok(payload) = serde_json::to_vec_pretty(state) else {
		return;
	};

	let temp_path = path.with_extension(format!(
		"json.tmp-{}-{}",
		std::process::id(),
		now_unix_ms()
	));

	if std::fs::write(&temp_path, payload).is_err() {
		return;
	}

	if std::fs::rename(&temp_path, &path).is_err() {
		let _ = std::fs::remove_file(temp_path);
	}
}

fn now_unix_ms() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.ok()
		.and_then(|duration| duration.as_millis().try_into().ok())
		.unwrap_or(0)
}
