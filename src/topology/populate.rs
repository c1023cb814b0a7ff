use crate::clade::{checked_dist, CladeAttrs, CladeId, Forest, DEFAULT_DIST, DEFAULT_SUPPORT};
use crate::error::Error;
use log::debug;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const GENERATED_NAME_LEN: usize = 10;

/// Settings for [`Forest::populate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulateOptions {
	/// Number of leaves to grow.
	pub size: usize,
	/// Leaf names, used from the back. Generated names fill in once it runs out.
	pub names: Option<Vec<String>>,
	/// Draw branch lengths and supports from the ranges below instead of using the defaults.
	pub random_branches: bool,
	pub branch_range: (f64, f64),
	pub support_range: (f64, f64),
}

impl Default for PopulateOptions {
	fn default() -> PopulateOptions {
		PopulateOptions {
			size: 2,
			names: None,
			random_branches: false,
			branch_range: (0.0, 1.0),
			support_range: (0.0, 1.0),
		}
	}
}

impl PopulateOptions {
	pub fn with_size(size: usize) -> PopulateOptions {
		PopulateOptions {
			size,
			..PopulateOptions::default()
		}
	}
}

/// Uniform draw from `[low, high)`, or `low` for an empty range.
fn draw<R: Rng>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
	if high > low {
		Uniform::new(low, high).sample(rng)
	} else {
		low
	}
}

/// Fixed-width base 26 rendering of `index`: `aaaaaaaaaa`, `aaaaaaaaab`, ...
fn generated_name(mut index: usize) -> String {
	let mut name = vec![NAME_CHARSET[0]; GENERATED_NAME_LEN];
	for slot in name.iter_mut().rev() {
		*slot = NAME_CHARSET[index % NAME_CHARSET.len()];
		index /= NAME_CHARSET.len();
	}
	name.into_iter().map(char::from).collect()
}

impl Forest {
	/// Grows a random bifurcating topology with `options.size` leaves under `root`.
	///
	/// If `root` already has children the random topology grows from a new
	/// child next to them, so `root` ends up with exactly two children. Several
	/// existing children are first moved under a new connector node.
	/// Returns the new leaves.
	pub fn populate<R: Rng>(&mut self, root: CladeId, options: &PopulateOptions, rng: &mut R) -> Result<Vec<CladeId>, Error> {
		self.get(root)?;
		if options.random_branches {
			checked_dist(options.branch_range.0)?;
			checked_dist(options.branch_range.1)?;
		}

		let start = match self[root].children().len() {
			0 => root,
			1 => self.new_child(root)?,
			_ => {
				let connector = self.new_clade();
				for child in self.take_children(root) {
					self.push_child(connector, child);
				}
				self.push_child(root, connector);
				self.new_child(root)?
			}
		};

		let mut open = VecDeque::new();
		open.push_back(start);
		for _ in 0..options.size.saturating_sub(1) {
			let parent = if rng.gen::<bool>() { open.pop_back() } else { open.pop_front() };
			let parent = match parent {
				Some(parent) => parent,
				None => break,
			};
			for _ in 0..2 {
				let attrs = if options.random_branches {
					CladeAttrs::new()
						.dist(draw(rng, options.branch_range))
						.support(draw(rng, options.support_range))
				} else {
					CladeAttrs::new().dist(DEFAULT_DIST).support(DEFAULT_SUPPORT)
				};
				let child = self.add_child(parent, None, attrs)?;
				open.push_back(child);
			}
		}

		let mut library = options.names.clone().unwrap_or_default();
		let mut generated = 0;
		for &leaf in open.iter() {
			self[leaf].name = match library.pop() {
				Some(name) => name,
				None => {
					generated += 1;
					generated_name(generated - 1)
				}
			};
		}
		debug!("Populated {} with {} leaves", root, open.len());
		Ok(open.into_iter().collect())
	}
}
