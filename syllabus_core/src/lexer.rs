use logos::Logos;

use crate::EdgeKind;
use crate::Identifier;

/// Raw tokens produced by logos. Only the two cross-reference roles are of
/// interest; everything else is consumed as text.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	/// `:require:kind:`text``
	#[regex(r":require:[A-Za-z0-9_-]+:`[^`]+`")]
	Required,
	/// `:mention:kind:`text``
	#[regex(r":mention:[A-Za-z0-9_-]+:`[^`]+`")]
	Mentioned,
	#[regex(r"[^:]+")]
	Text,
	#[token(":")]
	Colon,
}

/// A cross-reference marker found in a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CrossReference {
	pub edge: EdgeKind,
	pub identifier: Identifier,
}

/// Collect every strict and loose cross reference in `source`, in order of
/// appearance.
pub(crate) fn cross_references(source: &str) -> Vec<CrossReference> {
	let mut lexer = RawToken::lexer(source);
	let mut references = Vec::new();

	while let Some(token) = lexer.next() {
		let edge = match token {
			Ok(RawToken::Required) => EdgeKind::Required,
			Ok(RawToken::Mentioned) => EdgeKind::Mentioned,
			_ => continue,
		};

		if let Some(identifier) = parse_role(lexer.slice()) {
			references.push(CrossReference { edge, identifier });
		}
	}

	references
}

/// Split `:role:kind:`text`` into an identifier.
fn parse_role(slice: &str) -> Option<Identifier> {
	let rest = slice.strip_prefix(':')?;
	let (_role, rest) = rest.split_once(':')?;
	let (kind, text) = rest.split_once(':')?;
	let text = text.trim_matches('`');
	if text.trim().is_empty() {
		return None;
	}

	Some(Identifier::new(kind, text))
}
