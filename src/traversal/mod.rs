//! Ordered walks over a subtree.
//!
//! Every call builds a fresh [`Traversal`]; it holds a shared borrow of the
//! forest, so the tree cannot be mutated while a walk is in progress.
use crate::clade::{CladeId, Forest};
use crate::error::Error;
use crate::resolve::NodeRef;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Order in which a traversal produces nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
	/// A node before its children, depth first.
	PreOrder,
	/// A node after all of its descendants.
	PostOrder,
	/// Breadth first by depth, siblings in stored order.
	LevelOrder,
}

impl Default for Strategy {
	fn default() -> Strategy {
		Strategy::LevelOrder
	}
}

/// Predicate overriding the structural leaf test.
pub type LeafFn<'a> = Box<dyn Fn(CladeId) -> bool + 'a>;

/// Iterator over the clades of a subtree.
///
/// A node is terminal when it has no children or when the leaf predicate
/// holds for it; the descendants of a terminal node are never visited.
pub struct Traversal<'a> {
	forest: &'a Forest,
	strategy: Strategy,
	is_leaf: Option<LeafFn<'a>>,
	start: CladeId,
	skip_start: bool,
	leaves_only: bool,
	// (node, children already pushed); post-order is the only user of the flag
	stack: Vec<(CladeId, bool)>,
	queue: VecDeque<CladeId>,
}

impl<'a> Traversal<'a> {
	fn new(forest: &'a Forest, start: CladeId, strategy: Strategy, is_leaf: Option<LeafFn<'a>>) -> Result<Traversal<'a>, Error> {
		forest.get(start)?;
		let mut traversal = Traversal {
			forest,
			strategy,
			is_leaf,
			start,
			skip_start: false,
			leaves_only: false,
			stack: Vec::new(),
			queue: VecDeque::new(),
		};
		match strategy {
			Strategy::LevelOrder => traversal.queue.push_back(start),
			Strategy::PreOrder | Strategy::PostOrder => traversal.stack.push((start, false)),
		}
		Ok(traversal)
	}

	pub fn strategy(&self) -> Strategy {
		self.strategy
	}

	/// Leaves the starting node out of the sequence.
	pub fn descendants_only(mut self) -> Traversal<'a> {
		self.skip_start = true;
		self
	}

	/// Only produces terminal nodes.
	pub fn leaves_only(mut self) -> Traversal<'a> {
		self.leaves_only = true;
		self
	}

	fn children(&self, id: CladeId) -> &'a [CladeId] {
		match self.forest.get(id) {
			Ok(clade) => clade.children(),
			Err(_) => &[],
		}
	}

	fn is_terminal(&self, id: CladeId) -> bool {
		self.children(id).is_empty() || self.is_leaf.as_ref().map_or(false, |is_leaf| is_leaf(id))
	}

	/// Next node in traversal order together with its terminal status.
	fn advance(&mut self) -> Option<(CladeId, bool)> {
		match self.strategy {
			Strategy::PreOrder => {
				let (id, _) = self.stack.pop()?;
				let terminal = self.is_terminal(id);
				if !terminal {
					let children = self.children(id);
					self.stack.extend(children.iter().rev().map(|&child| (child, false)));
				}
				Some((id, terminal))
			}
			Strategy::PostOrder => loop {
				let (id, expanded) = self.stack.pop()?;
				if expanded {
					return Some((id, false));
				}
				if self.is_terminal(id) {
					return Some((id, true));
				}
				let children = self.children(id);
				self.stack.push((id, true));
				self.stack.extend(children.iter().rev().map(|&child| (child, false)));
			},
			Strategy::LevelOrder => {
				let id = self.queue.pop_front()?;
				let terminal = self.is_terminal(id);
				if !terminal {
					let children = self.children(id);
					self.queue.extend(children.iter().copied());
				}
				Some((id, terminal))
			}
		}
	}
}

impl<'a> Iterator for Traversal<'a> {
	type Item = CladeId;

	fn next(&mut self) -> Option<CladeId> {
		loop {
			let (id, terminal) = self.advance()?;
			if (self.leaves_only && !terminal) || (self.skip_start && id == self.start) {
				continue;
			}
			return Some(id);
		}
	}
}

impl Forest {
	/// Walks the subtree under `root` in the given order.
	pub fn traverse(&self, root: CladeId, strategy: Strategy) -> Result<Traversal<'_>, Error> {
		Traversal::new(self, root, strategy, None)
	}

	/// Walks the subtree under `root`, treating every node for which `is_leaf`
	/// holds as terminal.
	///
	/// ```
	/// use nhtree::newick::parse_newick;
	/// use nhtree::traversal::Strategy;
	///
	/// let (forest, root) = parse_newick("((A,B)E,(C,D)F);", 1, false).unwrap();
	/// let collapsed: Vec<String> = forest
	///     .traverse_with(root, Strategy::PreOrder, |id| forest[id].name == "E")
	///     .unwrap()
	///     .map(|id| forest[id].name.clone())
	///     .collect();
	/// assert_eq!(collapsed, vec!["", "E", "F", "C", "D"]);
	/// ```
	pub fn traverse_with<'a, F>(&'a self, root: CladeId, strategy: Strategy, is_leaf: F) -> Result<Traversal<'a>, Error>
	where
		F: Fn(CladeId) -> bool + 'a,
	{
		Traversal::new(self, root, strategy, Some(Box::new(is_leaf)))
	}

	/// All nodes under `root`, excluding `root` itself.
	pub fn iter_descendants(&self, root: CladeId, strategy: Strategy) -> Result<Traversal<'_>, Error> {
		Ok(self.traverse(root, strategy)?.descendants_only())
	}

	pub fn descendants(&self, root: CladeId, strategy: Strategy) -> Result<Vec<CladeId>, Error> {
		Ok(self.iter_descendants(root, strategy)?.collect())
	}

	/// Leaves under `root` in pre-order.
	pub fn iter_leaves(&self, root: CladeId) -> Result<Traversal<'_>, Error> {
		Ok(self.traverse(root, Strategy::PreOrder)?.leaves_only())
	}

	pub fn leaves(&self, root: CladeId) -> Result<Vec<CladeId>, Error> {
		Ok(self.iter_leaves(root)?.collect())
	}

	/// Terminal nodes under `root` in pre-order, `is_leaf` deciding what counts as terminal.
	pub fn leaves_with<'a, F>(&'a self, root: CladeId, is_leaf: F) -> Result<Vec<CladeId>, Error>
	where
		F: Fn(CladeId) -> bool + 'a,
	{
		Ok(self.traverse_with(root, Strategy::PreOrder, is_leaf)?.leaves_only().collect())
	}

	pub fn leaf_names(&self, root: CladeId) -> Result<Vec<String>, Error> {
		Ok(self.iter_leaves(root)?.map(|id| self[id].name.clone()).collect())
	}

	/// Copy of the child list.
	pub fn children(&self, id: CladeId) -> Result<Vec<CladeId>, Error> {
		Ok(self.get(id)?.children().to_vec())
	}

	/// The other children of this node's parent; empty for a root.
	pub fn sisters(&self, id: CladeId) -> Result<Vec<CladeId>, Error> {
		match self.get(id)?.parent() {
			Some(parent) => Ok(self[parent].children().iter().copied().filter(|&c| c != id).collect()),
			None => Ok(Vec::new()),
		}
	}

	/// Total number of nodes under and including `root`.
	pub fn node_count(&self, root: CladeId) -> Result<usize, Error> {
		Ok(self.traverse(root, Strategy::PreOrder)?.count())
	}

	/// Whether a node, or a node of the given name, occurs under `root`.
	/// `root` itself counts as contained.
	pub fn contains<R: Into<NodeRef>>(&self, root: CladeId, item: R) -> Result<bool, Error> {
		let mut nodes = self.traverse(root, Strategy::PreOrder)?;
		Ok(match item.into() {
			NodeRef::Id(target) => nodes.any(|id| id == target),
			NodeRef::Name(name) => nodes.any(|id| self[id].name == name),
		})
	}

	/// Every node under `root` with the given name, in pre-order.
	pub fn search_by_name(&self, root: CladeId, name: &str) -> Result<Vec<CladeId>, Error> {
		Ok(self
			.traverse(root, Strategy::PreOrder)?
			.filter(|&id| self[id].name == name)
			.collect())
	}

	pub fn leaves_by_name(&self, root: CladeId, name: &str) -> Result<Vec<CladeId>, Error> {
		Ok(self.iter_leaves(root)?.filter(|&id| self[id].name == name).collect())
	}
}
