use crate::Dimension;
use crate::DocumentTokens;
use crate::EdgeKind;
use crate::Identifier;
use crate::Vocabulary;
use crate::diagnostic::DiagnosticKind;
use crate::lexer::cross_references;

pub const UNIT_TYPE: &str = "unit-type";
pub const UNIT_INTERACTION: &str = "unit-interaction";
pub const UNIT_DURATION: &str = "unit-duration";
pub const UNIT_REQUIRES: &str = "unit-requires";
pub const UNIT_MENTIONS: &str = "unit-mentions";
pub const UNIT_PROVIDES: &str = "unit-provides";

/// Words that cannot be used as gate selectors because the renderer's tag
/// expressions would misread them.
const GATE_KEYWORDS: [&str; 8] = ["all", "not", "and", "or", "is", "True", "False", "None"];

/// Everything read from one document's text.
#[derive(Debug, Default)]
pub(crate) struct Extraction {
	pub has_metadata: bool,
	pub metadata: Vec<(String, String)>,
	pub tokens: DocumentTokens,
	/// Raw `(title, target)` pairs from navigation trees.
	pub navigation: Vec<(Option<String>, String)>,
	pub gates: Vec<crate::ContentGate>,
	pub problems: Vec<DiagnosticKind>,
}

/// Scan a document for its metadata block, directives, and cross references.
pub(crate) fn extract(source: &str, vocabulary: &Vocabulary) -> Extraction {
	let lines: Vec<&str> = source.lines().collect();
	let mut extraction = Extraction::default();

	let body_start = read_metadata(&lines, &mut extraction);
	scan_directives(&lines, body_start, vocabulary, &mut extraction);

	let body = lines.get(body_start..).unwrap_or_default().join("\n");
	for reference in cross_references(&body) {
		match reference.edge {
			EdgeKind::Required => extraction.tokens.required.insert(reference.identifier),
			EdgeKind::Mentioned => extraction.tokens.mentioned.insert(reference.identifier),
		};
	}

	extraction
}

fn indentation(line: &str) -> usize {
	line.len() - line.trim_start().len()
}

/// Split `:key: value` into its parts.
fn parse_field(trimmed: &str) -> Option<(&str, &str)> {
	let rest = trimmed.strip_prefix(':')?;
	let (key, value) = rest.split_once(':')?;
	let key = key.trim();
	if key.is_empty() || key.contains(char::is_whitespace) {
		return None;
	}

	Some((key, value.trim()))
}

/// Read the metadata block at the top of the document. Returns the index of
/// the first body line.
fn read_metadata(lines: &[&str], extraction: &mut Extraction) -> usize {
	let Some(header) = lines.iter().position(|line| !line.trim().is_empty()) else {
		return 0;
	};
	if lines[header].trim_end() != ".. meta::" {
		return 0;
	}

	extraction.has_metadata = true;
	let mut fields: Vec<(String, String)> = Vec::new();
	let mut field_indent = 0;
	let mut malformed = None;
	let mut end = lines.len();

	for (index, line) in lines.iter().enumerate().skip(header + 1) {
		if line.trim().is_empty() {
			continue;
		}
		let indent = indentation(line);
		if indent == 0 {
			end = index;
			break;
		}

		let trimmed = line.trim().trim_end_matches('\\').trim_end();
		if let Some((key, value)) = parse_field(trimmed) {
			fields.push((key.to_string(), value.to_string()));
			field_indent = indent;
			continue;
		}

		match fields.last_mut() {
			Some((_, value)) if indent > field_indent => {
				if !value.is_empty() {
					value.push(' ');
				}
				value.push_str(trimmed);
			}
			_ => {
				if malformed.is_none() {
					malformed = Some(DiagnosticKind::MalformedMetadata {
						line: index + 1,
						reason: format!("expected a `:key: value` field, found `{trimmed}`"),
					});
				}
			}
		}
	}

	if malformed.is_none() && fields.is_empty() {
		malformed = Some(DiagnosticKind::MalformedMetadata {
			line: header + 1,
			reason: "the block has no fields".to_string(),
		});
	}

	if let Some(problem) = malformed {
		extraction.problems.push(problem);
		return end;
	}

	for (key, value) in &fields {
		let target = match key.as_str() {
			UNIT_REQUIRES => &mut extraction.tokens.required,
			UNIT_MENTIONS => &mut extraction.tokens.mentioned,
			UNIT_PROVIDES => &mut extraction.tokens.provided,
			_ => continue,
		};

		for token in split_token_list(value) {
			match Identifier::parse(token) {
				Some(identifier) => {
					target.insert(identifier);
				}
				None => {
					extraction.problems.push(DiagnosticKind::InvalidToken {
						field: key.clone(),
						token: token.to_string(),
					});
				}
			}
		}
	}

	extraction.metadata = fields;
	end
}

/// Split a declared token list. Commas separate tokens when present, so a
/// single token may contain spaces (`term:robot arm`); otherwise whitespace
/// separates them.
fn split_token_list(value: &str) -> Vec<&str> {
	let tokens: Vec<&str> = if value.contains(',') {
		value.split(',').collect()
	} else {
		value.split_whitespace().collect()
	};

	tokens
		.into_iter()
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.collect()
}

/// The directive currently being read and the indentation of its marker.
enum Block {
	None,
	Glossary { indent: usize, body: Option<usize> },
	Toctree { indent: usize },
}

/// Split `.. name:: argument` into its parts.
fn parse_directive(trimmed: &str) -> Option<(&str, &str)> {
	let rest = trimmed.strip_prefix(".. ")?;
	let (name, argument) = rest.split_once("::")?;
	let name = name.trim();
	if name.is_empty() || name.contains(char::is_whitespace) {
		return None;
	}

	Some((name, argument.trim()))
}

fn scan_directives(
	lines: &[&str],
	start: usize,
	vocabulary: &Vocabulary,
	extraction: &mut Extraction,
) {
	let mut block = Block::None;
	let mut program: Option<Identifier> = None;

	for (index, line) in lines.iter().enumerate().skip(start) {
		let trimmed = line.trim();
		if trimmed.is_empty() {
			continue;
		}
		let indent = indentation(line);

		let in_block = match block {
			Block::Glossary { indent: marker, .. } | Block::Toctree { indent: marker } => {
				indent > marker
			}
			Block::None => false,
		};

		if in_block {
			match &mut block {
				Block::Glossary { body, .. } => {
					let body_indent = *body.get_or_insert(indent);
					if indent == body_indent && parse_field(trimmed).is_none() {
						let term = trimmed.split(" : ").next().unwrap_or(trimmed);
						extraction
							.tokens
							.provided
							.insert(Identifier::new("term", term));
					}
				}
				Block::Toctree { .. } => {
					if parse_field(trimmed).is_none() {
						extraction.navigation.push(parse_nav_entry(trimmed));
					}
				}
				Block::None => {}
			}
			continue;
		}
		block = Block::None;

		let Some((name, argument)) = parse_directive(trimmed) else {
			continue;
		};

		match name {
			"glossary" => {
				block = Block::Glossary { indent, body: None };
			}
			"toctree" => {
				block = Block::Toctree { indent };
			}
			"program" if !argument.is_empty() => {
				let identifier = Identifier::new("program", argument);
				extraction.tokens.provided.insert(identifier.clone());
				program = Some(identifier);
			}
			"option" if !argument.is_empty() => {
				let identifier = match &program {
					Some(parent) => Identifier::scoped(parent, "option", argument),
					None => Identifier::new("option", argument),
				};
				extraction.tokens.provided.insert(identifier);
			}
			"level" | "scenario" => {
				if let Some(dimension) = Dimension::from_directive(name) {
					read_gate(dimension, argument, index + 1, vocabulary, extraction);
				}
			}
			_ => {}
		}
	}
}

/// Parse `Title <target>` or a bare `target`.
fn parse_nav_entry(trimmed: &str) -> (Option<String>, String) {
	if let Some(open) = trimmed.rfind('<') {
		if trimmed.ends_with('>') {
			let title = trimmed[..open].trim();
			let target = trimmed[open + 1..trimmed.len() - 1].trim();
			if !title.is_empty() {
				return (Some(title.to_string()), target.to_string());
			}
			return (None, target.to_string());
		}
	}

	(None, trimmed.to_string())
}

fn read_gate(
	dimension: Dimension,
	argument: &str,
	line: usize,
	vocabulary: &Vocabulary,
	extraction: &mut Extraction,
) {
	let values: Vec<String> = argument.split_whitespace().map(str::to_string).collect();
	let invalid: Vec<&String> = values
		.iter()
		.filter(|value| {
			GATE_KEYWORDS.contains(&value.as_str())
				|| !vocabulary
					.values(dimension)
					.is_some_and(|known| known.contains_key(value.as_str()))
		})
		.collect();

	if values.is_empty() || !invalid.is_empty() {
		let rejected = if values.is_empty() {
			vec![String::new()]
		} else {
			invalid.into_iter().cloned().collect()
		};
		for value in rejected {
			extraction.problems.push(DiagnosticKind::InvalidSelector {
				dimension: dimension.key().to_string(),
				value,
				line,
			});
		}
		return;
	}

	extraction.gates.push(crate::ContentGate {
		dimension,
		values,
		line,
	});
}
