use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use crate::CourseDiagnostic;
use crate::Document;
use crate::DocumentId;
use crate::MemorySource;
use crate::SyllabusResult;
use crate::UnitNode;
use crate::Vocabulary;

/// Default levels plus two scenarios.
pub(crate) fn vocabulary() -> Vocabulary {
	let mut vocabulary = Vocabulary::default();
	vocabulary
		.scenarios
		.insert("turtlebot".to_string(), "TurtleBot 3".to_string());
	vocabulary
		.scenarios
		.insert("gazebo".to_string(), "Gazebo".to_string());
	vocabulary
}

pub(crate) fn ids(values: &[&str]) -> BTreeSet<DocumentId> {
	values.iter().map(|value| (*value).to_string()).collect()
}

pub(crate) fn document(id: &str, source: &str) -> Document {
	document_with_diagnostics(id, source).0
}

pub(crate) fn document_with_diagnostics(
	id: &str,
	source: &str,
) -> (Document, Vec<CourseDiagnostic>) {
	Document::from_source(id, format!("{id}.rst"), source, &vocabulary())
}

pub(crate) fn memory_source(documents: &[&str], units: &[(&str, &str)]) -> MemorySource {
	MemorySource {
		documents: documents.iter().map(|name| (*name).to_string()).collect(),
		units: units
			.iter()
			.map(|(name, content)| ((*name).to_string(), (*content).to_string()))
			.collect::<BTreeMap<_, _>>(),
	}
}

pub(crate) fn parse_unit(content: &str, source: &MemorySource) -> SyllabusResult<UnitNode> {
	UnitNode::parse(content, "course.yaml", source, &vocabulary())
}

pub(crate) fn write(root: &Path, relative: &str, content: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
	}
	std::fs::write(path, content).unwrap_or_else(|e| panic!("write {relative}: {e}"));
}

/// The three documents of the hardware example: `intro` requires a glossary
/// term which mentions a demo program.
pub(crate) const INTRO: &str = "\
.. meta::
   :unit-type: lecture
   :unit-requires: term:gripper

Introduction
============

.. level:: beginner

   Start with the basics.
";

pub(crate) const HARDWARE_GLOSSARY: &str = "\
.. meta::
   :unit-type: reference
   :unit-mentions: program:demo

Hardware
========

.. glossary::

   Gripper
      The end effector of the arm.
";

pub(crate) const DEMO_WALKTHROUGH: &str = "\
.. meta::
   :unit-type: demo

Demo
====

.. program:: demo

.. option:: --speed
";

pub(crate) const ORPHAN: &str = "\
.. meta::
   :unit-type: lecture

Nobody needs this page.
";

pub(crate) const INDEX: &str = "\
Robotics
========

.. toctree::
   :maxdepth: 1

   intro
   Extra material <orphan>
   demo_walkthrough
";

/// Write a small on-disk course whose unit configuration selects `intro`
/// plus every name in `extra_components`.
pub(crate) fn write_course(root: &Path, extra_components: &[&str]) {
	write(
		root,
		"syllabus.toml",
		"course = \"course.yaml\"\n\n[scenarios]\nturtlebot = \"TurtleBot 3\"\n",
	);
	write_unit(root, extra_components);
	write(root, "index.rst", INDEX);
	write(root, "intro.rst", INTRO);
	write(root, "hardware_glossary.rst", HARDWARE_GLOSSARY);
	write(root, "demo_walkthrough.rst", DEMO_WALKTHROUGH);
	write(root, "orphan.rst", ORPHAN);
}

pub(crate) fn write_unit(root: &Path, extra_components: &[&str]) {
	let mut unit = String::from("title: Robotics\ncomponents:\n  intro:\n    levels: [beginner]\n");
	for component in extra_components {
		unit.push_str(&format!("  {component}:\n"));
	}
	write(root, "course.yaml", &unit);
}
