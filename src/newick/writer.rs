//! Newick serialization.
use crate::clade::{Clade, CladeId, Feature, Forest};
use crate::error::Error;
use crate::newick::format::{Field, InternalLabel, NewickFormat};
use crate::newick::parser::looks_numeric;
use serde::{Deserialize, Serialize};

/// Characters that force a label into quotes when quoting is enabled.
const RESERVED: &[char] = &['(', ')', '[', ']', '\'', ':', ';', ',', ' ', '\t', '\n', '\r'];

/// Which features are written as an `[&&NHX...]` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSelection {
	None,
	All,
	Only(Vec<String>),
}

impl Default for FeatureSelection {
	fn default() -> FeatureSelection {
		FeatureSelection::None
	}
}

/// Writer settings, loadable from any serde source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
	pub format: NewickFormat,
	/// Leave out every branch length.
	pub compact: bool,
	pub show_internal_names: bool,
	pub quoted_names: bool,
	/// Also write the root's label and branch length.
	pub root_data: bool,
	pub features: FeatureSelection,
}

impl Default for WriteOptions {
	fn default() -> WriteOptions {
		WriteOptions {
			format: NewickFormat::default(),
			compact: false,
			show_internal_names: true,
			quoted_names: false,
			root_data: false,
			features: FeatureSelection::None,
		}
	}
}

/// Serializes trees of a [`Forest`] as Newick strings.
///
/// Children are written in their stored order; which labels and branch lengths
/// appear is decided by the format code, so the output parses back with the
/// same code.
///
/// # Example
/// ```
/// use nhtree::newick::{NewickParser, NewickWriter};
///
/// let (forest, root) = NewickParser::new().parse_str("(A:1,(B:1,C:1)0.9:0.5);").unwrap();
/// let newick = NewickWriter::new().write(&forest, root).unwrap();
/// assert_eq!(newick, "(A:1,(B:1,C:1)0.9:0.5);");
/// ```
#[derive(Debug, Clone, Default)]
pub struct NewickWriter {
	options: WriteOptions,
}

/// One step of the iterative depth-first walk.
enum Step {
	Enter(CladeId),
	Leave(CladeId),
	Comma,
}

impl NewickWriter {
	pub fn new() -> NewickWriter {
		NewickWriter::default()
	}

	pub fn from_options(options: WriteOptions) -> NewickWriter {
		NewickWriter { options }
	}

	pub fn with_format(mut self, format: NewickFormat) -> NewickWriter {
		self.options.format = format;
		self
	}

	pub fn with_compact(mut self, compact: bool) -> NewickWriter {
		self.options.compact = compact;
		self
	}

	pub fn with_internal_names(mut self, show_internal_names: bool) -> NewickWriter {
		self.options.show_internal_names = show_internal_names;
		self
	}

	pub fn with_quoted_names(mut self, quoted_names: bool) -> NewickWriter {
		self.options.quoted_names = quoted_names;
		self
	}

	pub fn with_root_data(mut self, root_data: bool) -> NewickWriter {
		self.options.root_data = root_data;
		self
	}

	pub fn with_features(mut self, features: FeatureSelection) -> NewickWriter {
		self.options.features = features;
		self
	}

	pub fn options(&self) -> &WriteOptions {
		&self.options
	}

	/// Returns the Newick representation of the subtree under `root`, with closing semicolon.
	pub fn write(&self, forest: &Forest, root: CladeId) -> Result<String, Error> {
		forest.get(root)?;
		let mut newick = String::new();
		let mut steps = vec![Step::Enter(root)];
		while let Some(step) = steps.pop() {
			match step {
				Step::Enter(id) => {
					let clade = forest.get(id)?;
					if clade.is_leaf() {
						self.write_data(&mut newick, clade, true, id == root);
					} else {
						newick.push('(');
						steps.push(Step::Leave(id));
						for (i, &child) in clade.children().iter().enumerate().rev() {
							steps.push(Step::Enter(child));
							if i > 0 {
								steps.push(Step::Comma);
							}
						}
					}
				}
				Step::Leave(id) => {
					newick.push(')');
					self.write_data(&mut newick, forest.get(id)?, false, id == root);
				}
				Step::Comma => newick.push(','),
			}
		}
		newick.push(';');
		Ok(newick)
	}

	fn write_data(&self, newick: &mut String, clade: &Clade, leaf: bool, root: bool) {
		let options = &self.options;
		let format = options.format;
		// A single-node tree keeps its branch length; other roots only with `root_data`.
		let full = !root || leaf || options.root_data;

		if leaf {
			if format.leaf_name.allowed() {
				newick.push_str(&self.label(&clade.name));
			}
		} else {
			match self.internal_label(clade, full) {
				Some(label) => newick.push_str(&label),
				// The parser demands the label as soon as anything else is written.
				None if !root && format.internal_label.field() == Field::Required => return,
				None => {}
			}
		}

		let dist_rule = if leaf { format.leaf_dist } else { format.internal_dist };
		if !options.compact && dist_rule.allowed() && full {
			newick.push(':');
			newick.push_str(&clade.dist().to_string());
		}

		self.write_features(newick, clade);
	}

	fn internal_label(&self, clade: &Clade, full: bool) -> Option<String> {
		let options = &self.options;
		let show_name = options.show_internal_names && !clade.name.is_empty();
		match options.format.internal_label {
			InternalLabel::Name(_) if show_name => Some(self.label(&clade.name)),
			InternalLabel::SupportOrName if show_name => {
				// A numeric name would read back as a support value unless quoted.
				if options.quoted_names && looks_numeric(&clade.name) {
					Some(quote(&clade.name))
				} else {
					Some(self.label(&clade.name))
				}
			}
			InternalLabel::Support(_) | InternalLabel::SupportOrName if full => Some(clade.support.to_string()),
			_ => None,
		}
	}

	fn write_features(&self, newick: &mut String, clade: &Clade) {
		let selected: Vec<(&String, &Feature)> = match &self.options.features {
			FeatureSelection::None => return,
			FeatureSelection::All => clade.features.iter().collect(),
			FeatureSelection::Only(keys) => keys
				.iter()
				.filter_map(|key| clade.features.get_key_value(key))
				.collect(),
		};
		if selected.is_empty() {
			return;
		}
		newick.push_str("[&&NHX");
		for (key, value) in selected {
			newick.push(':');
			newick.push_str(key);
			newick.push('=');
			match value {
				Feature::String(text) => newick.push_str(text),
				other => newick.push_str(&other.to_string()),
			}
		}
		newick.push(']');
	}

	fn label(&self, text: &str) -> String {
		if self.options.quoted_names && text.contains(RESERVED) {
			quote(text)
		} else {
			text.to_string()
		}
	}
}

fn quote(text: &str) -> String {
	format!("'{}'", text.replace('\'', "''"))
}
