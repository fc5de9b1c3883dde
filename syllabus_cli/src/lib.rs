use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Build multi-edition training courses from interlinked documents.",
	long_about = "syllabus selects the documents of one course edition from a shared corpus.\n\nA \
	              YAML unit configuration picks the lessons, levels and scenarios; the documents \
	              themselves declare which glossary terms, programs and options they provide, \
	              require or mention. syllabus follows those dependencies, prunes everything the \
	              course does not need and hands the renderer its selection tags.\n\nQuick \
	              start:\n  syllabus tags   Print the selection tags\n  syllabus plan   Show \
	              which documents are built and why\n  syllabus check  Validate the corpus\n  \
	              syllabus build  Run the renderer for the course"
)]
pub struct SyllabusCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Print the selection tags of a course, one per line.
	///
	/// Tags are printed in the order the unit configuration lists its
	/// components: the component name first, then one tag per scenario and
	/// level it is taught at.
	Tags {
		/// Root unit configuration. Defaults to `course` in `syllabus.toml`.
		#[arg(long)]
		course: Option<PathBuf>,
	},
	/// Show which documents a course builds and why.
	///
	/// Lists the selected, required and mentioned documents, the unused
	/// documents that are pruned, and which documents the renderer has to
	/// read again since the last build.
	Plan {
		/// Root unit configuration. Defaults to `course` in `syllabus.toml`.
		#[arg(long)]
		course: Option<PathBuf>,

		/// Output format. Use `text` for human-readable output or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Validate the unit configuration and every document.
	///
	/// Configuration errors always fail with exit code 2. Warnings about
	/// documents (malformed metadata, duplicate providers, identifiers
	/// nobody provides) only fail the check with `--strict`.
	Check {
		/// Root unit configuration. Defaults to `course` in `syllabus.toml`.
		#[arg(long)]
		course: Option<PathBuf>,

		/// Exit with code 1 when any warning is reported.
		#[arg(long, default_value_t = false)]
		strict: bool,
	},
	/// Build a course with the renderer.
	///
	/// Writes the course plan to `.syllabus/cache/plan.json`, then runs
	/// `make <format>` in the project root with the course's selection tags
	/// and the unused documents as exclude patterns. After a successful build
	/// the pruned documents are recorded so the next build can bring back
	/// documents that become needed again.
	Build {
		/// Root unit configuration. Defaults to `course` in `syllabus.toml`.
		#[arg(long)]
		course: Option<PathBuf>,

		/// Renderer output format.
		#[arg(long, value_enum, default_value_t = BuildFormat::Html)]
		format: BuildFormat,

		/// Output directory handed to the renderer.
		#[arg(long)]
		output: Option<PathBuf>,

		/// Print the renderer command instead of running it.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildFormat {
	/// A static HTML site.
	Html,
	/// A PDF through LaTeX.
	Latexpdf,
}

impl BuildFormat {
	/// The `make` target for this format.
	pub fn target(self) -> &'static str {
		match self {
			Self::Html => "html",
			Self::Latexpdf => "latexpdf",
		}
	}
}
