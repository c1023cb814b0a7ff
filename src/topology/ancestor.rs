use crate::clade::{CladeId, Forest};
use crate::error::Error;
use indexmap::{IndexMap, IndexSet};

/// Path from a node to its root: the node first, the root last.
pub type AncestorPath = IndexSet<CladeId>;

impl Forest {
	/// Ancestors of `id`, nearest first; empty for a root.
	pub fn ancestors(&self, id: CladeId) -> Result<Vec<CladeId>, Error> {
		let mut ancestors = Vec::new();
		let mut current = self.get(id)?.parent();
		while let Some(parent) = current {
			ancestors.push(parent);
			current = self[parent].parent();
		}
		Ok(ancestors)
	}

	/// Root of the tree `id` belongs to.
	pub fn root_of(&self, id: CladeId) -> Result<CladeId, Error> {
		Ok(self.ancestors(id)?.last().copied().unwrap_or(id))
	}

	/// Number of edges between `id` and its root.
	pub fn depth(&self, id: CladeId) -> Result<usize, Error> {
		Ok(self.ancestors(id)?.len())
	}

	pub fn ancestor_path(&self, id: CladeId) -> Result<AncestorPath, Error> {
		let mut path = AncestorPath::new();
		path.insert(id);
		path.extend(self.ancestors(id)?);
		Ok(path)
	}

	/// Deepest node that is an ancestor (or self) of every target.
	///
	/// A single target is its own common ancestor.
	///
	/// # Errors
	/// * [`Error::EmptyTargets`] if `targets` is empty
	/// * [`Error::NotConnected`] if the targets belong to different trees
	pub fn common_ancestor(&self, targets: &[CladeId]) -> Result<CladeId, Error> {
		Ok(self.common_ancestor_with_paths(targets)?.0)
	}

	/// Like [`Forest::common_ancestor`], also returning the ancestor path of every
	/// target. The map is empty when there is a single target.
	pub fn common_ancestor_with_paths(&self, targets: &[CladeId]) -> Result<(CladeId, IndexMap<CladeId, AncestorPath>), Error> {
		let first = *targets.first().ok_or(Error::EmptyTargets)?;
		if targets.len() == 1 {
			self.get(first)?;
			return Ok((first, IndexMap::new()));
		}

		let mut paths = IndexMap::with_capacity(targets.len());
		for &target in targets {
			if !paths.contains_key(&target) {
				paths.insert(target, self.ancestor_path(target)?);
			}
		}

		let common = paths[&first]
			.iter()
			.copied()
			.find(|candidate| paths.values().all(|path| path.contains(candidate)))
			.ok_or(Error::NotConnected)?;
		Ok((common, paths))
	}

	/// Distance between two nodes of the same tree: the sum of branch lengths
	/// along the connecting path, or its number of edges with `topology_only`.
	pub fn distance(&self, a: CladeId, b: CladeId, topology_only: bool) -> Result<f64, Error> {
		let common = self.common_ancestor(&[a, b])?;
		let mut total = 0.0;
		for end in [a, b].iter().copied() {
			let mut current = end;
			while current != common {
				total += if topology_only { 1.0 } else { self[current].dist() };
				current = match self[current].parent() {
					Some(parent) => parent,
					None => break,
				};
			}
		}
		Ok(total)
	}
}

#[cfg(test)]
mod tests {
	use crate::clade::Forest;
	use crate::error::Error;

	#[test]
	fn depth_counts_edges() {
		let mut forest = Forest::new();
		let root = forest.new_clade();
		let inner = forest.new_child(root).unwrap();
		let leaf = forest.new_child(inner).unwrap();
		assert_eq!(forest.depth(leaf).unwrap(), 2);
		assert_eq!(forest.root_of(leaf).unwrap(), root);
		assert_eq!(forest.ancestors(leaf).unwrap(), vec![inner, root]);
		let path = forest.ancestor_path(leaf).unwrap();
		assert_eq!(path.first(), Some(&leaf));
		assert_eq!(path.last(), Some(&root));
	}

	#[test]
	fn separate_trees_share_no_ancestor() {
		let mut forest = Forest::new();
		let a = forest.new_clade();
		let b = forest.new_clade();
		assert!(matches!(forest.common_ancestor(&[a, b]), Err(Error::NotConnected)));
		assert!(matches!(forest.common_ancestor(&[]), Err(Error::EmptyTargets)));
	}
}
