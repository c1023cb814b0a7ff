//! Data structures for use with phylogenetic trees.
//!
//! Nodes are [`Clade`] records kept in a [`Forest`] arena and addressed by
//! [`CladeId`]. A tree is simply a clade without a parent; a forest may hold
//! several of them at once, e.g. after a subtree has been detached.
use crate::error::Error;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Arbitrary metadata attached to a clade.
pub type Feature = serde_json::Value;

/// Branch length and support given to freshly created clades.
pub const DEFAULT_DIST: f64 = 1.0;
pub const DEFAULT_SUPPORT: f64 = 1.0;

/// Handle of a clade inside a [`Forest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CladeId(usize);

impl CladeId {
	/// Position of the clade in the arena.
	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for CladeId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A single node: the four fixed attributes, a feature store and its links.
///
/// The links are private; they only change through the [`Forest`] mutators,
/// which keep `parent` and `children` consistent with each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clade {
	pub name: String,
	dist: f64,
	pub support: f64,
	pub features: IndexMap<String, Feature>,
	parent: Option<CladeId>,
	children: Vec<CladeId>,
}

impl Clade {
	/// Creates a new Clade using empty / default values.
	pub(crate) fn bare() -> Clade {
		Clade {
			name: String::new(),
			dist: DEFAULT_DIST,
			support: DEFAULT_SUPPORT,
			features: IndexMap::new(),
			parent: None,
			children: Vec::new(),
		}
	}

	/// Distance to the parent.
	pub fn dist(&self) -> f64 {
		self.dist
	}

	pub fn set_dist(&mut self, dist: f64) -> Result<(), Error> {
		self.dist = checked_dist(dist)?;
		Ok(())
	}

	/// Lengthens the branch by `extra`, which must itself be a valid length.
	pub(crate) fn extend_dist(&mut self, extra: f64) {
		self.dist += extra;
	}

	/// Attributes and features without the links.
	pub(crate) fn unlinked_copy(&self) -> Clade {
		Clade {
			name: self.name.clone(),
			dist: self.dist,
			support: self.support,
			features: self.features.clone(),
			parent: None,
			children: Vec::new(),
		}
	}

	pub fn parent(&self) -> Option<CladeId> {
		self.parent
	}

	pub fn children(&self) -> &[CladeId] {
		&self.children
	}

	pub fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}

	pub fn is_root(&self) -> bool {
		self.parent.is_none()
	}
}

/// Validates a branch length.
pub(crate) fn checked_dist(dist: f64) -> Result<f64, Error> {
	if dist.is_finite() && dist >= 0.0 {
		Ok(dist)
	} else {
		Err(Error::InvalidBranchLength(dist))
	}
}

/// Attribute overrides for a new or re-attached clade; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CladeAttrs {
	pub name: Option<String>,
	pub dist: Option<f64>,
	pub support: Option<f64>,
}

impl CladeAttrs {
	pub fn new() -> CladeAttrs {
		CladeAttrs::default()
	}

	pub fn name<S: Into<String>>(mut self, name: S) -> CladeAttrs {
		self.name = Some(name.into());
		self
	}

	pub fn dist(mut self, dist: f64) -> CladeAttrs {
		self.dist = Some(dist);
		self
	}

	pub fn support(mut self, support: f64) -> CladeAttrs {
		self.support = Some(support);
		self
	}

	/// Writes the overrides into `clade`. Nothing is written if the branch length is invalid.
	pub(crate) fn apply(self, clade: &mut Clade) -> Result<(), Error> {
		if let Some(dist) = self.dist {
			clade.dist = checked_dist(dist)?;
		}
		if let Some(name) = self.name {
			clade.name = name;
		}
		if let Some(support) = self.support {
			clade.support = support;
		}
		Ok(())
	}
}

/// Arena holding the clades of one or more trees.
///
/// Freed slots are never reused, so a stale [`CladeId`] is reported as
/// [`Error::InvalidNode`] rather than silently pointing at another clade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forest {
	slots: Vec<Option<Clade>>,
}

impl Forest {
	pub fn new() -> Forest {
		Forest { slots: Vec::new() }
	}

	/// Adds a detached clade with default attributes.
	pub fn new_clade(&mut self) -> CladeId {
		self.slots.push(Some(Clade::bare()));
		CladeId(self.slots.len() - 1)
	}

	/// Adds a detached clade with the given attributes.
	pub fn new_clade_with(&mut self, attrs: CladeAttrs) -> Result<CladeId, Error> {
		let mut clade = Clade::bare();
		attrs.apply(&mut clade)?;
		self.slots.push(Some(clade));
		Ok(CladeId(self.slots.len() - 1))
	}

	pub fn get(&self, id: CladeId) -> Result<&Clade, Error> {
		self.slots
			.get(id.0)
			.and_then(Option::as_ref)
			.ok_or(Error::InvalidNode(id))
	}

	pub fn get_mut(&mut self, id: CladeId) -> Result<&mut Clade, Error> {
		self.slots
			.get_mut(id.0)
			.and_then(Option::as_mut)
			.ok_or(Error::InvalidNode(id))
	}

	/// Whether `id` refers to a live clade.
	pub fn is_valid(&self, id: CladeId) -> bool {
		self.get(id).is_ok()
	}

	/// Number of live clades across all trees.
	pub fn len(&self) -> usize {
		self.slots.iter().filter(|slot| slot.is_some()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// All live clades without a parent, in creation order.
	pub fn roots(&self) -> Vec<CladeId> {
		self.slots
			.iter()
			.enumerate()
			.filter_map(|(index, slot)| match slot {
				Some(clade) if clade.parent.is_none() => Some(CladeId(index)),
				_ => None,
			})
			.collect()
	}

	pub fn parent(&self, id: CladeId) -> Result<Option<CladeId>, Error> {
		Ok(self.get(id)?.parent)
	}

	pub fn is_leaf(&self, id: CladeId) -> Result<bool, Error> {
		Ok(self.get(id)?.is_leaf())
	}

	pub fn is_root(&self, id: CladeId) -> Result<bool, Error> {
		Ok(self.get(id)?.is_root())
	}

	pub fn name(&self, id: CladeId) -> Result<&str, Error> {
		Ok(&self.get(id)?.name)
	}

	pub fn set_name<S: Into<String>>(&mut self, id: CladeId, name: S) -> Result<(), Error> {
		self.get_mut(id)?.name = name.into();
		Ok(())
	}

	pub fn dist(&self, id: CladeId) -> Result<f64, Error> {
		Ok(self.get(id)?.dist)
	}

	pub fn set_dist(&mut self, id: CladeId, dist: f64) -> Result<(), Error> {
		self.get_mut(id)?.set_dist(dist)
	}

	pub fn support(&self, id: CladeId) -> Result<f64, Error> {
		Ok(self.get(id)?.support)
	}

	pub fn set_support(&mut self, id: CladeId, support: f64) -> Result<(), Error> {
		self.get_mut(id)?.support = support;
		Ok(())
	}

	pub fn feature(&self, id: CladeId, key: &str) -> Result<Option<&Feature>, Error> {
		Ok(self.get(id)?.features.get(key))
	}

	/// Stores a feature, returning the value it replaced.
	pub fn set_feature<K, V>(&mut self, id: CladeId, key: K, value: V) -> Result<Option<Feature>, Error>
	where
		K: Into<String>,
		V: Into<Feature>,
	{
		Ok(self.get_mut(id)?.features.insert(key.into(), value.into()))
	}

	pub fn remove_feature(&mut self, id: CladeId, key: &str) -> Result<Option<Feature>, Error> {
		Ok(self.get_mut(id)?.features.shift_remove(key))
	}

	pub fn feature_names(&self, id: CladeId) -> Result<Vec<String>, Error> {
		Ok(self.get(id)?.features.keys().cloned().collect())
	}

	/// Checks `n ∈ p.children ⟺ n.parent == p` for every clade under `root`,
	/// and that no clade is owned twice.
	pub fn check_consistency(&self, root: CladeId) -> bool {
		let mut seen = HashSet::new();
		let mut stack = vec![root];
		if !self.is_valid(root) {
			return false;
		}
		while let Some(id) = stack.pop() {
			if !seen.insert(id) {
				return false;
			}
			let clade = match self.get(id) {
				Ok(clade) => clade,
				Err(_) => return false,
			};
			for &child in clade.children.iter() {
				match self.get(child) {
					Ok(c) if c.parent == Some(id) => stack.push(child),
					_ => return false,
				}
			}
		}
		true
	}

	// Raw structural edits. Callers are responsible for validating ids and
	// for keeping both directions of the link in step.

	/// Number of slots ever allocated, used to undo a failed bulk insert.
	pub(crate) fn mark(&self) -> usize {
		self.slots.len()
	}

	/// Drops every slot allocated after `mark`.
	pub(crate) fn rollback(&mut self, mark: usize) {
		self.slots.truncate(mark);
	}

	pub(crate) fn insert(&mut self, clade: Clade) -> CladeId {
		self.slots.push(Some(clade));
		CladeId(self.slots.len() - 1)
	}

	pub(crate) fn push_child(&mut self, parent: CladeId, child: CladeId) {
		self[parent].children.push(child);
		self[child].parent = Some(parent);
	}

	pub(crate) fn insert_children(&mut self, parent: CladeId, position: usize, children: &[CladeId]) {
		let list = &mut self[parent].children;
		let position = position.min(list.len());
		list.splice(position..position, children.iter().copied());
		for &child in children {
			self[child].parent = Some(parent);
		}
	}

	/// Unlinks `child` from its parent, returning the position it occupied.
	pub(crate) fn unlink(&mut self, child: CladeId) -> Option<usize> {
		let parent = self[child].parent.take()?;
		let list = &mut self[parent].children;
		let position = list.iter().position(|&c| c == child)?;
		list.remove(position);
		Some(position)
	}

	pub(crate) fn take_children(&mut self, id: CladeId) -> Vec<CladeId> {
		let children = std::mem::take(&mut self[id].children);
		for &child in children.iter() {
			self[child].parent = None;
		}
		children
	}

	pub(crate) fn reverse_children(&mut self, id: CladeId) {
		self[id].children.reverse();
	}

	/// Frees a single slot. The clade must already be unlinked.
	pub(crate) fn free(&mut self, id: CladeId) -> Option<Clade> {
		self.slots.get_mut(id.0).and_then(Option::take)
	}
}

/// # Panics
///
/// Panics if `id` is stale or belongs to another forest; use [`Forest::get`]
/// for a checked lookup.
impl Index<CladeId> for Forest {
	type Output = Clade;

	fn index(&self, id: CladeId) -> &Clade {
		match self.slots.get(id.0) {
			Some(Some(clade)) => clade,
			_ => panic!("Invalid node reference {}", id),
		}
	}
}

impl IndexMut<CladeId> for Forest {
	fn index_mut(&mut self, id: CladeId) -> &mut Clade {
		match self.slots.get_mut(id.0) {
			Some(Some(clade)) => clade,
			_ => panic!("Invalid node reference {}", id),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bare_clade_defaults() {
		let mut forest = Forest::new();
		let id = forest.new_clade();
		assert_eq!(forest.name(id).unwrap(), "");
		assert_eq!(forest.dist(id).unwrap(), 1.0);
		assert_eq!(forest.support(id).unwrap(), 1.0);
		assert!(forest.is_leaf(id).unwrap());
		assert!(forest.is_root(id).unwrap());
	}

	#[test]
	fn negative_branch_length_rejected() {
		let mut forest = Forest::new();
		let id = forest.new_clade();
		assert!(matches!(forest.set_dist(id, -0.5), Err(Error::InvalidBranchLength(_))));
		assert!(forest.new_clade_with(CladeAttrs::new().dist(f64::NAN)).is_err());
		assert_eq!(forest.dist(id).unwrap(), 1.0);
	}

	#[test]
	fn features_keep_insertion_order() {
		let mut forest = Forest::new();
		let id = forest.new_clade();
		forest.set_feature(id, "species", "human").unwrap();
		forest.set_feature(id, "rank", 3).unwrap();
		assert_eq!(forest.feature_names(id).unwrap(), vec!["species", "rank"]);
		assert_eq!(forest.remove_feature(id, "species").unwrap(), Some(Feature::from("human")));
		assert_eq!(forest.feature(id, "species").unwrap(), None);
	}

	#[test]
	fn stale_ids_are_reported() {
		let mut forest = Forest::new();
		let id = forest.new_clade();
		forest.free(id);
		assert!(matches!(forest.get(id), Err(Error::InvalidNode(_))));
		assert!(!forest.check_consistency(id));
	}
}
