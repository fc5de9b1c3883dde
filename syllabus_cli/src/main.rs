use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use syllabus_cli::BuildFormat;
use syllabus_cli::Commands;
use syllabus_cli::OutputFormat;
use syllabus_cli::SyllabusCli;
use syllabus_core::AnyEmptyResult;
use syllabus_core::AnyResult;
use syllabus_core::CoursePlan;
use syllabus_core::Inclusion;
use syllabus_core::PlanOptions;
use syllabus_core::project::BUILD_DIRECTORY;
use syllabus_core::project::PLAN_FILE;
use syllabus_core::project::plan_course;
use syllabus_core::project::save_state;
use syllabus_core::project::unused_sources;
use syllabus_core::project::write_plan;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = SyllabusCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();
	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Tags { course }) => run_tags(&args, course.as_deref()),
		Some(Commands::Plan { course, format }) => run_plan(&args, course.as_deref(), *format),
		Some(Commands::Check { course, strict }) => run_check(&args, course.as_deref(), *strict),
		Some(Commands::Build {
			course,
			format,
			output,
			dry_run,
		}) => run_build(&args, course.as_deref(), *format, output.as_deref(), *dry_run),
		None => {
			eprintln!("No subcommand specified. Run `syllabus --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<syllabus_core::SyllabusError>() {
			Ok(syllabus_err) => {
				let report: miette::Report = (*syllabus_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `SYLLABUS_LOG` takes an `EnvFilter` directive and
/// defaults to `warn`; `--verbose` switches to `debug`.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_env("SYLLABUS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init();
}

fn resolve_root(args: &SyllabusCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn plan(args: &SyllabusCli, course: Option<&Path>) -> AnyResult<CoursePlan> {
	let options = PlanOptions {
		course: course.map(Path::to_path_buf),
		..PlanOptions::default()
	};

	Ok(plan_course(&resolve_root(args), &options)?)
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("{label:<28} {value}");
}

fn run_tags(args: &SyllabusCli, course: Option<&Path>) -> AnyEmptyResult {
	let plan = plan(args, course)?;
	for tag in &plan.tags {
		println!("{tag}");
	}

	Ok(())
}

fn run_plan(args: &SyllabusCli, course: Option<&Path>, format: OutputFormat) -> AnyEmptyResult {
	let plan = plan(args, course)?;

	if let OutputFormat::Json = format {
		println!("{}", serde_json::to_string_pretty(&plan)?);
		return Ok(());
	}

	println!("{}", colored!(plan.title, bold));
	print_field("Course", plan.course.display());
	print_field("Tags", plan.tags.len());
	print_field("Buildable documents", plan.documents.len());
	print_field("Unused documents", plan.unused.len());

	print_section("Tags");
	for tag in &plan.tags {
		println!("  {tag}");
	}

	print_section("Documents");
	for document in &plan.documents {
		let inclusion = match document.inclusion {
			Inclusion::Selected => colored!("selected", green),
			Inclusion::Required => "required".to_string(),
			Inclusion::Mentioned => colored!("mentioned", yellow),
		};
		match &document.unit_type {
			Some(unit_type) => println!("  {:<32} {inclusion} ({unit_type})", document.id),
			None => println!("  {:<32} {inclusion}", document.id),
		}
	}

	if !plan.unused.is_empty() {
		print_section("Unused");
		for document in &plan.unused {
			println!("  {document}");
		}
	}

	if !plan.reinstated.is_empty() {
		print_section("Reinstated");
		for document in &plan.reinstated {
			println!("  {document}");
		}
	}

	print_section("Outdated");
	print_field("  added", plan.outdated.added.len());
	print_field("  changed", plan.outdated.changed.len());
	print_field("  removed", plan.outdated.removed.len());

	if plan.has_warnings() {
		print_section("Warnings");
		print_diagnostics(&plan);
	}

	Ok(())
}

fn run_check(args: &SyllabusCli, course: Option<&Path>, strict: bool) -> AnyEmptyResult {
	let plan = plan(args, course)?;

	if !plan.has_warnings() {
		println!(
			"{} {} buildable document(s), {} unused, no warnings.",
			colored!("Check passed:", green),
			plan.documents.len(),
			plan.unused.len()
		);
		return Ok(());
	}

	print_diagnostics(&plan);
	println!();
	println!(
		"{} warning(s) in {} buildable document(s).",
		plan.diagnostics.len(),
		plan.documents.len()
	);

	if strict {
		process::exit(1);
	}

	Ok(())
}

fn print_diagnostics(plan: &CoursePlan) {
	for diagnostic in &plan.diagnostics {
		println!(
			"{} [{}] {}",
			colored!("warning:", yellow),
			diagnostic.document,
			diagnostic.message()
		);
	}
}

/// The renderer invocation for `plan`: `make <target> BUILD_DIR=<output>
/// SYLLABUS_PLAN=<plan file> SPHINX_OPTS=<tags and excludes>`.
fn make_arguments(plan: &CoursePlan, format: BuildFormat, output: &Path) -> Vec<String> {
	let mut options = plan
		.tags
		.iter()
		.map(|tag| format!("-t {tag}"))
		.collect::<Vec<_>>();

	let unused = unused_sources(plan);
	if !unused.is_empty() {
		let mut patterns = vec![output.display().to_string()];
		patterns.extend(unused);
		options.push(format!("-D exclude_patterns={}", patterns.join(",")));
	}

	vec![
		format.target().to_string(),
		format!("BUILD_DIR={}", output.display()),
		format!("SYLLABUS_PLAN={PLAN_FILE}"),
		format!("SPHINX_OPTS={}", options.join(" ")),
	]
}

fn run_build(
	args: &SyllabusCli,
	course: Option<&Path>,
	format: BuildFormat,
	output: Option<&Path>,
	dry_run: bool,
) -> AnyEmptyResult {
	let root = resolve_root(args);
	let plan = plan(args, course)?;
	let output = output.map_or_else(|| PathBuf::from(BUILD_DIRECTORY), Path::to_path_buf);
	let arguments = make_arguments(&plan, format, &output);

	if dry_run {
		let quoted = arguments
			.iter()
			.map(|argument| match argument.split_once('=') {
				Some((name, value)) if value.contains(' ') => format!("{name}=\"{value}\""),
				_ => argument.clone(),
			})
			.collect::<Vec<_>>()
			.join(" ");
		println!("make {quoted}");
		return Ok(());
	}

	write_plan(&root, &plan)?;

	tracing::debug!(?arguments, "running renderer");
	let status = process::Command::new("make")
		.args(&arguments)
		.current_dir(&root)
		.status()?;

	if !status.success() {
		return Err(format!("renderer failed with {status}").into());
	}

	// Only a completed build moves the unused set forward.
	save_state(&root, &plan);
	println!(
		"{} {} document(s) built into {}",
		colored!("Built", green),
		plan.documents.len(),
		output.display()
	);

	Ok(())
}
