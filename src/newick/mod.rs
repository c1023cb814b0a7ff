//! Newick (New Hampshire) codec.
//!
//! A tree is written as a parenthesized, comma-separated list of children,
//! each optionally followed by `:` and a branch length; the label of an
//! internal node follows its closing parenthesis, and the whole tree ends with
//! `;`. Which labels and lengths are expected is decided by a
//! [format code](NewickFormat).
//!
//! * [`parse_newick`] / [`write_newick`] use the most common settings.
//! * [`NewickParser`] and [`NewickWriter`] expose every option.
//!
//! Extended NHX annotations (`[&&NHX:S=human:B=90]`) are read into the node's
//! features; other bracketed comments are skipped.
pub mod format;
pub mod parser;
pub mod writer;

pub use format::{Field, InternalLabel, NewickFormat, FORMAT_CODES};
pub use parser::{NewickParser, ParseOptions};
pub use writer::{FeatureSelection, NewickWriter, WriteOptions};

use crate::clade::{CladeId, Forest};
use crate::error::Error;

/// Parses a Newick string into a new forest and returns it with the tree's root.
///
/// # Example
/// ```
/// use nhtree::newick::parse_newick;
///
/// let (forest, root) = parse_newick("(A:1,(B:1,(C:1,D:1):0.5):0.5);", 0, false).unwrap();
/// assert_eq!(forest[root].children().len(), 2);
/// ```
pub fn parse_newick(newick: &str, format_code: u32, quoted_names: bool) -> Result<(Forest, CladeId), Error> {
	let parser = NewickParser::new()
		.with_format_code(format_code)?
		.with_quoted_names(quoted_names);
	Ok(parser.parse_str(newick)?)
}

/// Writes the tree under `root` in format 0 (flexible, internal support values
/// or names).
///
/// `compact` leaves out branch lengths; `show_internal_names` controls whether
/// the names of internal nodes are written.
pub fn write_newick(forest: &Forest, root: CladeId, compact: bool, show_internal_names: bool) -> Result<String, Error> {
	NewickWriter::new()
		.with_compact(compact)
		.with_internal_names(show_internal_names)
		.write(forest, root)
}

impl Forest {
	/// Parses a Newick string into this forest; see [`NewickParser::parse_into`].
	pub fn read_newick(&mut self, newick: &str, format_code: u32) -> Result<CladeId, Error> {
		let parser = NewickParser::new().with_format_code(format_code)?;
		Ok(parser.parse_into(self, newick)?)
	}

	/// Newick representation of the tree under `root` in the given format.
	pub fn to_newick(&self, root: CladeId, format_code: u32) -> Result<String, Error> {
		NewickWriter::new()
			.with_format(NewickFormat::from_code(format_code)?)
			.write(self, root)
	}
}
