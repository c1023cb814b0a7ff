//! Format-aware Newick parser.
//!
//! The parser walks the string once, keeping the chain of currently open
//! internal nodes on an explicit stack, so deeply nested trees do not recurse.
//! Nodes are created straight in the target [`Forest`]; when anything goes
//! wrong the forest is rolled back to the size it had before the call.
use crate::clade::{CladeId, Feature, Forest};
use crate::error::{ParseError, ParseErrorKind};
use crate::newick::format::{Field, InternalLabel, NewickFormat};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Accepted spelling of numeric fields; `inf` and `nan` are not accepted.
const NUMBER_PATTERN: &str = r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$";

fn number_pattern() -> &'static Regex {
	static NUMBER: OnceLock<Regex> = OnceLock::new();
	NUMBER.get_or_init(|| Regex::new(NUMBER_PATTERN).expect("Number pattern is a valid regex."))
}

/// Whether `text` is spelled like a Newick number.
pub(crate) fn looks_numeric(text: &str) -> bool {
	number_pattern().is_match(text)
}

/// Parser settings, loadable from any serde source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
	pub format: NewickFormat,
	/// Single-quoted labels may contain reserved characters; `''` escapes a quote.
	pub quoted_names: bool,
}

/// Parser (configuration) for single Newick strings.
///
/// # Example
/// ```
/// use nhtree::newick::NewickParser;
///
/// let parser = NewickParser::new().with_format_code(1).unwrap();
/// let (forest, root) = parser.parse_str("((A:1,B:1)E:0.5,C:2)root;").unwrap();
/// assert_eq!(forest.name(root).unwrap(), "root");
/// ```
#[derive(Debug, Clone, Default)]
pub struct NewickParser {
	options: ParseOptions,
}

impl NewickParser {
	pub fn new() -> NewickParser {
		NewickParser::default()
	}

	pub fn from_options(options: ParseOptions) -> NewickParser {
		NewickParser { options }
	}

	pub fn with_format(mut self, format: NewickFormat) -> NewickParser {
		self.options.format = format;
		self
	}

	/// Sets the format by its numeric code, failing for undocumented codes.
	pub fn with_format_code(self, code: u32) -> Result<NewickParser, ParseError> {
		Ok(self.with_format(NewickFormat::from_code(code)?))
	}

	pub fn with_quoted_names(mut self, quoted_names: bool) -> NewickParser {
		self.options.quoted_names = quoted_names;
		self
	}

	pub fn options(&self) -> &ParseOptions {
		&self.options
	}

	/// Parses a tree into a fresh forest, returning it with the root.
	pub fn parse_str(&self, newick: &str) -> Result<(Forest, CladeId), ParseError> {
		let mut forest = Forest::new();
		let root = self.parse_into(&mut forest, newick)?;
		Ok((forest, root))
	}

	/// Parses a tree into an existing forest. The new root is detached.
	///
	/// On error no node of the partial tree is left in `forest`.
	pub fn parse_into(&self, forest: &mut Forest, newick: &str) -> Result<CladeId, ParseError> {
		let mark = forest.mark();
		let mut reader = Reader {
			input: newick,
			pos: 0,
			format: self.options.format,
			quoted_names: self.options.quoted_names,
		};
		match reader.read_tree(forest) {
			Ok(root) => {
				debug!(
					"Parsed Newick tree with {} nodes (format {})",
					forest.mark() - mark,
					self.options.format.code()
				);
				Ok(root)
			}
			Err(e) => {
				forest.rollback(mark);
				Err(e)
			}
		}
	}
}

/// Label text as it appeared in the input.
struct Label {
	text: String,
	quoted: bool,
	position: usize,
}

/// Everything written after a leaf position or a closing parenthesis.
struct NodeData {
	start: usize,
	label: Option<Label>,
	dist: Option<(f64, usize)>,
	features: Vec<(String, Feature)>,
}

impl NodeData {
	fn is_empty(&self) -> bool {
		self.label.is_none() && self.dist.is_none() && self.features.is_empty()
	}
}

struct Reader<'a> {
	input: &'a str,
	pos: usize,
	format: NewickFormat,
	quoted_names: bool,
}

impl<'a> Reader<'a> {
	fn error(&self, kind: ParseErrorKind, position: usize) -> ParseError {
		ParseError::new(kind, self.input, position)
	}

	fn peek(&self) -> Option<char> {
		self.input[self.pos..].chars().next()
	}

	fn bump(&mut self) -> Option<char> {
		let c = self.peek()?;
		self.pos += c.len_utf8();
		Some(c)
	}

	fn skip_whitespace(&mut self) {
		while let Some(c) = self.peek() {
			if !c.is_whitespace() {
				break;
			}
			self.bump();
		}
	}

	/// Skips whitespace and plain comments, stopping in front of an NHX block.
	fn skip_blank(&mut self) -> Result<(), ParseError> {
		loop {
			self.skip_whitespace();
			if self.peek() != Some('[') || self.input[self.pos..].starts_with("[&&NHX") {
				return Ok(());
			}
			self.read_comment()?;
		}
	}

	fn read_tree(&mut self, forest: &mut Forest) -> Result<CladeId, ParseError> {
		if self.input.trim().is_empty() {
			return Err(self.error(ParseErrorKind::EmptyInput, 0));
		}

		// Internal nodes whose ')' has not been seen yet.
		let mut open: Vec<CladeId> = Vec::new();
		let mut root: Option<CladeId> = None;
		let mut expect_node = true;

		loop {
			self.skip_blank()?;
			let at = self.pos;
			match self.peek() {
				Some('(') if expect_node => {
					self.bump();
					let node = forest.new_clade();
					attach(forest, &open, &mut root, node);
					open.push(node);
				}
				Some(',') if !expect_node => {
					if open.is_empty() {
						return Err(self.error(ParseErrorKind::UnexpectedCharacter(','), at));
					}
					self.bump();
					expect_node = true;
				}
				Some(')') if !expect_node => {
					self.bump();
					let node = open
						.pop()
						.ok_or_else(|| self.error(ParseErrorKind::UnbalancedParentheses, at))?;
					let data = self.read_node_data()?;
					self.apply(forest, node, data, false, open.is_empty())?;
				}
				Some(';') if !expect_node => {
					if !open.is_empty() {
						return Err(self.error(ParseErrorKind::UnbalancedParentheses, at));
					}
					self.bump();
					break;
				}
				_ if expect_node => {
					// A leaf, possibly without any data, e.g. the second child in "(A,)".
					let data = self.read_node_data()?;
					let node = forest.new_clade();
					attach(forest, &open, &mut root, node);
					self.apply(forest, node, data, true, open.is_empty())?;
					expect_node = false;
				}
				None => {
					let kind = if open.is_empty() {
						ParseErrorKind::MissingTerminator
					} else {
						ParseErrorKind::UnbalancedParentheses
					};
					return Err(self.error(kind, at));
				}
				Some(c) => return Err(self.error(ParseErrorKind::UnexpectedCharacter(c), at)),
			}
		}

		self.skip_blank()?;
		if self.pos < self.input.len() {
			return Err(self.error(ParseErrorKind::TrailingContent, self.pos));
		}
		root.ok_or_else(|| self.error(ParseErrorKind::EmptyInput, 0))
	}

	fn read_node_data(&mut self) -> Result<NodeData, ParseError> {
		self.skip_whitespace();
		let mut data = NodeData { start: self.pos, label: None, dist: None, features: Vec::new() };
		loop {
			self.skip_whitespace();
			let at = self.pos;
			let c = match self.peek() {
				None | Some('(') | Some(')') | Some(',') | Some(';') => break,
				Some(c) => c,
			};
			match c {
				'[' => {
					let comment = self.read_comment()?;
					if let Some(body) = comment.strip_prefix("&&NHX") {
						self.read_nhx(body, at, &mut data.features)?;
					}
				}
				':' => {
					if data.dist.is_some() {
						return Err(self.error(ParseErrorKind::UnexpectedCharacter(':'), at));
					}
					self.bump();
					self.skip_whitespace();
					let number_at = self.pos;
					let text = self.read_unquoted();
					data.dist = Some((self.number(&text, number_at)?, number_at));
				}
				_ if data.label.is_some() || data.dist.is_some() => {
					return Err(self.error(ParseErrorKind::UnexpectedCharacter(c), at));
				}
				'\'' if self.quoted_names => {
					let text = self.read_quoted()?;
					data.label = Some(Label { text, quoted: true, position: at });
				}
				_ => {
					let text = self.read_unquoted();
					data.label = Some(Label { text, quoted: false, position: at });
				}
			}
		}
		Ok(data)
	}

	/// Reads until a reserved character; line breaks and tabs are dropped, outer spaces trimmed.
	fn read_unquoted(&mut self) -> String {
		let mut text = String::new();
		while let Some(c) = self.peek() {
			match c {
				'(' | ')' | ',' | ';' | ':' | '[' => break,
				'\'' if self.quoted_names => break,
				'\n' | '\r' | '\t' => {}
				_ => text.push(c),
			}
			self.bump();
		}
		text.trim_end().to_string()
	}

	fn read_quoted(&mut self) -> Result<String, ParseError> {
		let start = self.pos;
		self.bump();
		let mut text = String::new();
		loop {
			match self.bump() {
				Some('\'') => {
					if self.peek() == Some('\'') {
						self.bump();
						text.push('\'');
					} else {
						return Ok(text);
					}
				}
				Some(c) => text.push(c),
				None => return Err(self.error(ParseErrorKind::UnterminatedQuote, start)),
			}
		}
	}

	/// Returns the text between `[` and `]`.
	fn read_comment(&mut self) -> Result<String, ParseError> {
		let start = self.pos;
		self.bump();
		let mut text = String::new();
		loop {
			match self.bump() {
				Some(']') => return Ok(text),
				Some(c) => text.push(c),
				None => return Err(self.error(ParseErrorKind::UnterminatedComment, start)),
			}
		}
	}

	/// Parses the `:key=value` pairs of an `[&&NHX...]` block.
	fn read_nhx(&self, body: &str, at: usize, features: &mut Vec<(String, Feature)>) -> Result<(), ParseError> {
		for entry in body.split(':').filter(|entry| !entry.trim().is_empty()) {
			let (key, value) = match entry.split_once('=') {
				Some((key, value)) if !key.trim().is_empty() => (key.trim(), value.trim()),
				_ => return Err(self.error(ParseErrorKind::InvalidNhx(format!("Malformed entry [{}]", entry)), at)),
			};
			let value = if let Ok(v) = value.parse::<i64>() {
				Feature::from(v)
			} else if looks_numeric(value) {
				value.parse::<f64>().map(Feature::from).unwrap_or_else(|_| Feature::from(value))
			} else {
				Feature::from(value)
			};
			features.push((key.to_string(), value));
		}
		Ok(())
	}

	fn number(&self, text: &str, at: usize) -> Result<f64, ParseError> {
		let not_a_number = || self.error(ParseErrorKind::NotANumber(text.to_string()), at);
		if !looks_numeric(text) {
			return Err(not_a_number());
		}
		match text.parse::<f64>() {
			Ok(value) if value.is_finite() => Ok(value),
			_ => Err(not_a_number()),
		}
	}

	/// Checks node data against the format and stores it on `node`.
	///
	/// Required fields are enforced on leaves, and on non-root internal nodes
	/// that carry any data at all.
	fn apply(&self, forest: &mut Forest, node: CladeId, data: NodeData, leaf: bool, root: bool) -> Result<(), ParseError> {
		let format = self.format;
		let empty = data.is_empty();
		if leaf && empty && format.code() != 100 {
			return Err(self.error(ParseErrorKind::EmptyLeaf, data.start));
		}
		let enforce = leaf || (!root && !empty);
		let start = data.start;
		let missing = |field: &'static str| self.error(ParseErrorKind::MissingField(field), start);
		let clade = &mut forest[node];

		if leaf {
			match data.label {
				Some(label) if !format.leaf_name.allowed() => {
					return Err(self.error(ParseErrorKind::ForbiddenField("leaf name"), label.position));
				}
				Some(label) => clade.name = label.text,
				None if enforce && format.leaf_name == Field::Required => return Err(missing("leaf name")),
				None => {}
			}
		} else {
			match (format.internal_label, data.label) {
				(InternalLabel::Absent, Some(label)) => {
					return Err(self.error(ParseErrorKind::ForbiddenField("internal label"), label.position));
				}
				(InternalLabel::Name(_), Some(label)) => clade.name = label.text,
				(InternalLabel::Support(_), Some(label)) => clade.support = self.number(&label.text, label.position)?,
				(InternalLabel::SupportOrName, Some(label)) => {
					if !label.quoted && looks_numeric(&label.text) {
						clade.support = self.number(&label.text, label.position)?;
					} else {
						clade.name = label.text;
					}
				}
				(InternalLabel::Name(Field::Required), None) if enforce => return Err(missing("internal name")),
				(InternalLabel::Support(Field::Required), None) if enforce => return Err(missing("support value")),
				(_, None) => {}
			}
		}

		let dist_rule = if leaf { format.leaf_dist } else { format.internal_dist };
		match data.dist {
			Some((_, at)) if !dist_rule.allowed() => {
				return Err(self.error(ParseErrorKind::ForbiddenField("branch length"), at));
			}
			Some((value, at)) => {
				if value < 0.0 {
					return Err(self.error(ParseErrorKind::NegativeBranchLength(value), at));
				}
				clade
					.set_dist(value)
					.map_err(|_| self.error(ParseErrorKind::NotANumber(value.to_string()), at))?;
			}
			None if enforce && dist_rule == Field::Required => return Err(missing("branch length")),
			None => {}
		}

		clade.features.extend(data.features);
		Ok(())
	}
}

/// Links `node` under the innermost open node, or makes it the root.
fn attach(forest: &mut Forest, open: &[CladeId], root: &mut Option<CladeId>, node: CladeId) {
	match open.last() {
		Some(&parent) => forest.push_child(parent, node),
		None => *root = Some(node),
	}
}
