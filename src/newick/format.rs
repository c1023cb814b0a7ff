//! The table of Newick format codes.
//!
//! A format code decides, per node class and field, whether the field must be
//! present, may be present, or must be absent. The same table drives both the
//! parser and the writer, which is what makes a write/parse round trip with one
//! code reproduce the tree.
use crate::error::{ParseError, ParseErrorKind};
use serde::{Deserialize, Serialize};

/// Presence rule for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
	Required,
	Optional,
	Absent,
}

impl Field {
	pub fn allowed(self) -> bool {
		self != Field::Absent
	}
}

/// How the label written after an internal node's `)` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalLabel {
	Name(Field),
	Support(Field),
	/// A support value if the label is numeric, a name otherwise.
	SupportOrName,
	Absent,
}

impl InternalLabel {
	pub fn field(self) -> Field {
		match self {
			InternalLabel::Name(field) | InternalLabel::Support(field) => field,
			InternalLabel::SupportOrName => Field::Optional,
			InternalLabel::Absent => Field::Absent,
		}
	}
}

/// A validated Newick format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct NewickFormat {
	code: u32,
	pub leaf_name: Field,
	pub leaf_dist: Field,
	pub internal_label: InternalLabel,
	pub internal_dist: Field,
}

/// Every code the codec understands.
pub const FORMAT_CODES: [u32; 11] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 100];

impl NewickFormat {
	/// Looks up a format code.
	///
	/// | code | leaf name | leaf dist | internal label    | internal dist |
	/// |------|-----------|-----------|-------------------|---------------|
	/// | 0    | optional  | optional  | support or name   | optional      |
	/// | 1    | optional  | optional  | name, optional    | optional      |
	/// | 2    | required  | required  | support, required | required      |
	/// | 3    | required  | required  | name, required    | required      |
	/// | 4    | required  | required  | -                 | -             |
	/// | 5    | required  | required  | -                 | required      |
	/// | 6    | required  | -         | -                 | required      |
	/// | 7    | required  | required  | name, required    | -             |
	/// | 8    | required  | -         | name, required    | -             |
	/// | 9    | required  | -         | -                 | -             |
	/// | 100  | -         | -         | -                 | -             |
	pub fn from_code(code: u32) -> Result<NewickFormat, ParseError> {
		use self::Field::*;
		let (leaf_name, leaf_dist, internal_label, internal_dist) = match code {
			0 => (Optional, Optional, InternalLabel::SupportOrName, Optional),
			1 => (Optional, Optional, InternalLabel::Name(Optional), Optional),
			2 => (Required, Required, InternalLabel::Support(Required), Required),
			3 => (Required, Required, InternalLabel::Name(Required), Required),
			4 => (Required, Required, InternalLabel::Absent, Absent),
			5 => (Required, Required, InternalLabel::Absent, Required),
			6 => (Required, Absent, InternalLabel::Absent, Required),
			7 => (Required, Required, InternalLabel::Name(Required), Absent),
			8 => (Required, Absent, InternalLabel::Name(Required), Absent),
			9 => (Required, Absent, InternalLabel::Absent, Absent),
			100 => (Absent, Absent, InternalLabel::Absent, Absent),
			_ => return Err(ParseError::without_context(ParseErrorKind::UnknownFormat(code))),
		};
		Ok(NewickFormat { code, leaf_name, leaf_dist, internal_label, internal_dist })
	}

	pub fn code(&self) -> u32 {
		self.code
	}

	/// Whether labels of internal nodes carry names in this format.
	pub fn internal_names(&self) -> bool {
		matches!(self.internal_label, InternalLabel::Name(_) | InternalLabel::SupportOrName)
	}
}

impl Default for NewickFormat {
	fn default() -> NewickFormat {
		NewickFormat {
			code: 0,
			leaf_name: Field::Optional,
			leaf_dist: Field::Optional,
			internal_label: InternalLabel::SupportOrName,
			internal_dist: Field::Optional,
		}
	}
}

impl std::convert::TryFrom<u32> for NewickFormat {
	type Error = ParseError;

	fn try_from(code: u32) -> Result<NewickFormat, ParseError> {
		NewickFormat::from_code(code)
	}
}

impl From<NewickFormat> for u32 {
	fn from(format: NewickFormat) -> u32 {
		format.code
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_documented_code_resolves() {
		for &code in FORMAT_CODES.iter() {
			assert_eq!(NewickFormat::from_code(code).unwrap().code(), code);
		}
	}

	#[test]
	fn unknown_code_rejected() {
		let err = NewickFormat::from_code(10).unwrap_err();
		assert_eq!(err.kind(), &ParseErrorKind::UnknownFormat(10));
	}

	#[test]
	fn default_is_flexible_support_format() {
		assert_eq!(NewickFormat::default(), NewickFormat::from_code(0).unwrap());
	}

	#[test]
	fn topology_only_forbids_every_field() {
		let format = NewickFormat::from_code(100).unwrap();
		assert!(!format.leaf_name.allowed());
		assert!(!format.leaf_dist.allowed());
		assert_eq!(format.internal_label.field(), Field::Absent);
		assert!(!format.internal_dist.allowed());
	}

	#[test]
	fn format_deserializes_from_code() {
		let format: NewickFormat = serde_json::from_str("8").unwrap();
		assert_eq!(format.internal_label, InternalLabel::Name(Field::Required));
		assert!(serde_json::from_str::<NewickFormat>("42").is_err());
	}
}
