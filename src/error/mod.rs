//! Error types shared by the codec, the resolver and the topology algorithms.
use crate::clade::CladeId;
use std::fmt;
use thiserror::Error;

/// Number of characters of input echoed back in a parse error.
const CONTEXT_LENGTH: usize = 30;

/// Everything that can go wrong while working with a tree.
#[derive(Debug, Error)]
pub enum Error {
	/// Newick text could not be turned into a tree.
	#[error(transparent)]
	Parse(#[from] ParseError),

	/// The id does not point to a live node of this forest.
	#[error("Invalid node reference {0}")]
	InvalidNode(CladeId),

	#[error("Child {child} not found under {parent}")]
	ChildNotFound { parent: CladeId, child: CladeId },

	/// Sister operations are undefined on a root.
	#[error("Node {0} has no parent")]
	NoParent(CladeId),

	#[error("Node {child} is already attached to {parent}")]
	AlreadyAttached { child: CladeId, parent: CladeId },

	#[error("Attaching {child} under {parent} would create a cycle")]
	Cycle { parent: CladeId, child: CladeId },

	#[error("Invalid branch length {0}, must be finite and non-negative")]
	InvalidBranchLength(f64),

	#[error("Ambiguous node name: {0}")]
	AmbiguousName(String),

	#[error("Node names not found: {}", .0.join(", "))]
	NamesNotFound(Vec<String>),

	#[error("Common ancestor requested for an empty set of nodes")]
	EmptyTargets,

	#[error("Nodes do not share a connected ancestor path")]
	NotConnected,
}

/// What exactly was wrong with a Newick string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
	EmptyInput,
	UnknownFormat(u32),
	/// A `)` without matching `(`, or a `;` while nodes are still open.
	UnbalancedParentheses,
	MissingTerminator,
	TrailingContent,
	UnexpectedCharacter(char),
	UnterminatedQuote,
	UnterminatedComment,
	NotANumber(String),
	NegativeBranchLength(f64),
	EmptyLeaf,
	/// Label or length present where the format code forbids it.
	ForbiddenField(&'static str),
	MissingField(&'static str),
	InvalidNhx(String),
}

/// Parse failure with the byte offset it was detected at and the input that follows.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
	kind: ParseErrorKind,
	position: usize,
	context: String,
}

impl ParseError {
	pub fn new(kind: ParseErrorKind, input: &str, position: usize) -> ParseError {
		let context = input
			.get(position..)
			.unwrap_or("")
			.chars()
			.take(CONTEXT_LENGTH)
			.collect();
		ParseError { kind, position, context }
	}

	/// Error not tied to a location in the input.
	pub fn without_context(kind: ParseErrorKind) -> ParseError {
		ParseError { kind, position: 0, context: String::new() }
	}

	pub fn kind(&self) -> &ParseErrorKind {
		&self.kind
	}

	pub fn position(&self) -> usize {
		self.position
	}
}

impl fmt::Display for ParseErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ParseErrorKind::EmptyInput => f.write_str("Empty Newick string"),
			ParseErrorKind::UnknownFormat(code) => write!(f, "Unknown Newick format code {}", code),
			ParseErrorKind::UnbalancedParentheses => f.write_str("Parentheses do not match"),
			ParseErrorKind::MissingTerminator => f.write_str("Newick string does not end with ';'"),
			ParseErrorKind::TrailingContent => f.write_str("Unexpected content after ';'"),
			ParseErrorKind::UnexpectedCharacter(c) => write!(f, "Unexpected character {:?}", c),
			ParseErrorKind::UnterminatedQuote => f.write_str("Unterminated quoted label"),
			ParseErrorKind::UnterminatedComment => f.write_str("Unterminated comment"),
			ParseErrorKind::NotANumber(text) => write!(f, "Non-numeric value [{}] in numeric field", text),
			ParseErrorKind::NegativeBranchLength(v) => write!(f, "Negative branch length {}", v),
			ParseErrorKind::EmptyLeaf => f.write_str("Empty leaf node found"),
			ParseErrorKind::ForbiddenField(field) => write!(f, "Format does not allow the {}", field),
			ParseErrorKind::MissingField(field) => write!(f, "Format requires the {}", field),
			ParseErrorKind::InvalidNhx(msg) => write!(f, "Invalid NHX block - {}", msg),
		}
	}
}

impl fmt::Display for ParseError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "Invalid Newick Format, {} at position {}", self.kind, self.position)?;
		if !self.context.is_empty() {
			write!(f, " [{}]", self.context)?;
		}
		Ok(())
	}
}

impl std::error::Error for ParseError {}
