//! Structural mutation of trees and ancestor queries.
//!
//! All mutators keep `parent` and `children` in step; none of them may be
//! called while a [`Traversal`](crate::traversal::Traversal) of the same
//! forest is alive, which the borrow checker enforces.
mod ancestor;
mod populate;
mod prune;

pub use ancestor::AncestorPath;
pub use populate::PopulateOptions;

use crate::clade::{CladeAttrs, CladeId, Forest};
use crate::error::Error;
use crate::traversal::Strategy;
use log::{debug, trace};

impl Forest {
	/// Appends `child` (a fresh default clade when `None`) to the children of
	/// `parent` and applies the attribute overrides to it. Returns the child.
	///
	/// # Errors
	/// * [`Error::AlreadyAttached`] if `child` already has a parent
	/// * [`Error::Cycle`] if `child` is `parent` or one of its ancestors
	/// * [`Error::InvalidBranchLength`] for a negative or non-finite `dist`
	///
	/// Nothing is changed when an error is returned.
	pub fn add_child(&mut self, parent: CladeId, child: Option<CladeId>, attrs: CladeAttrs) -> Result<CladeId, Error> {
		self.get(parent)?;
		let child = match child {
			Some(child) => {
				if let Some(current) = self.get(child)?.parent() {
					return Err(Error::AlreadyAttached { child, parent: current });
				}
				if child == parent || self.ancestors(parent)?.contains(&child) {
					return Err(Error::Cycle { parent, child });
				}
				attrs.apply(&mut self[child])?;
				child
			}
			None => self.new_clade_with(attrs)?,
		};
		self.push_child(parent, child);
		Ok(child)
	}

	/// Shorthand for a fresh default child.
	pub fn new_child(&mut self, parent: CladeId) -> Result<CladeId, Error> {
		self.add_child(parent, None, CladeAttrs::default())
	}

	/// Removes `child` from the children of `parent` and returns it as a detached root.
	pub fn remove_child(&mut self, parent: CladeId, child: CladeId) -> Result<CladeId, Error> {
		self.get(parent)?;
		if self.get(child)?.parent() != Some(parent) {
			return Err(Error::ChildNotFound { parent, child });
		}
		self.unlink(child);
		Ok(child)
	}

	/// Adds a sister to `id`, i.e. a child of its parent.
	pub fn add_sister(&mut self, id: CladeId, sister: Option<CladeId>, attrs: CladeAttrs) -> Result<CladeId, Error> {
		let parent = self.get(id)?.parent().ok_or(Error::NoParent(id))?;
		self.add_child(parent, sister, attrs)
	}

	pub fn remove_sister(&mut self, id: CladeId, sister: CladeId) -> Result<CladeId, Error> {
		let parent = self.get(id)?.parent().ok_or(Error::NoParent(id))?;
		self.remove_child(parent, sister)
	}

	/// Cuts `id` (with its subtree) from its parent. A root is returned unchanged.
	pub fn detach(&mut self, id: CladeId) -> Result<CladeId, Error> {
		self.get(id)?;
		self.unlink(id);
		Ok(id)
	}

	/// Removes `id` and gives its children to its parent, in the position `id` held.
	///
	/// With `preserve_branch_length`, a single child absorbs the branch length
	/// of the removed node; with several children the parent absorbs it instead.
	/// With `prevent_non_bifurcating`, a parent left with fewer than two
	/// children is deleted the same way, so no knee is created.
	/// Deleting a root does nothing.
	pub fn delete(&mut self, id: CladeId, prevent_non_bifurcating: bool, preserve_branch_length: bool) -> Result<(), Error> {
		self.get(id)?;
		self.delete_where(id, prevent_non_bifurcating, preserve_branch_length, |_| true);
		Ok(())
	}

	/// Deletes `id` and then, while allowed by `collapsible`, every ancestor left with fewer than
	/// two children.
	pub(crate) fn delete_where<F>(&mut self, id: CladeId, prevent_non_bifurcating: bool, preserve_branch_length: bool, collapsible: F)
	where
		F: Fn(CladeId) -> bool,
	{
		let mut current = id;
		loop {
			let parent = match self[current].parent() {
				Some(parent) => parent,
				None => {
					debug!("Ignoring delete of root {}", current);
					return;
				}
			};
			if preserve_branch_length {
				let dist = self[current].dist();
				let heir = match self[current].children() {
					[only] => Some(*only),
					[] => None,
					_ => Some(parent),
				};
				if let Some(heir) = heir {
					self[heir].extend_dist(dist);
				}
			}
			let position = self.unlink(current).unwrap_or(0);
			let children = self.take_children(current);
			self.insert_children(parent, position, &children);
			self.free(current);
			trace!("Deleted {}, {} children moved to {}", current, children.len(), parent);

			if !prevent_non_bifurcating || self[parent].children().len() >= 2 || !collapsible(parent) {
				return;
			}
			current = parent;
		}
	}

	/// Reverses the order of the children of `id`.
	pub fn swap_children(&mut self, id: CladeId) -> Result<(), Error> {
		self.get(id)?;
		self.reverse_children(id);
		Ok(())
	}

	/// Detaches `id` and frees it together with all of its descendants.
	pub fn discard(&mut self, id: CladeId) -> Result<(), Error> {
		let doomed: Vec<CladeId> = self.traverse(id, Strategy::PostOrder)?.collect();
		self.unlink(id);
		for node in doomed {
			self.free(node);
		}
		Ok(())
	}

	/// Deep copy of the subtree under `id` as a new detached root.
	pub fn copy_subtree(&mut self, id: CladeId) -> Result<CladeId, Error> {
		let root_copy = self.get(id)?.unlinked_copy();
		let copy_root = self.insert(root_copy);
		let mut pending = vec![(id, copy_root)];
		while let Some((original, copy)) = pending.pop() {
			for child in self[original].children().to_vec() {
				let clade = self[child].unlinked_copy();
				let child_copy = self.insert(clade);
				self.push_child(copy, child_copy);
				pending.push((child, child_copy));
			}
		}
		Ok(copy_root)
	}
}
