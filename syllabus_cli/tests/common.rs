#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn syllabus_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("syllabus"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("SYLLABUS_LOG");
	cmd
}

pub fn write(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

/// A course whose single component `intro` requires a glossary term; the
/// glossary mentions a demo and `orphan` is never needed.
pub fn write_course(root: &Path) -> std::io::Result<()> {
	write(
		root,
		"syllabus.toml",
		"course = \"course.yaml\"\n\n[scenarios]\nturtlebot = \"TurtleBot 3\"\n",
	)?;
	write(
		root,
		"course.yaml",
		"title: Robotics\ncomponents:\n  intro:\n    levels: [beginner]\n",
	)?;
	write(
		root,
		"intro.rst",
		".. meta::\n   :unit-type: lecture\n   :unit-requires: term:gripper\n\nIntro\n=====\n",
	)?;
	write(
		root,
		"hardware_glossary.rst",
		".. meta::\n   :unit-mentions: program:demo\n\n.. glossary::\n\n   Gripper\n      The \
		 hand.\n",
	)?;
	write(
		root,
		"demo_walkthrough.rst",
		".. meta::\n   :unit-type: demo\n\n.. program:: demo\n",
	)?;
	write(
		root,
		"orphan.rst",
		".. meta::\n   :unit-type: lecture\n\nUnused.\n",
	)
}
