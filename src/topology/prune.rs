use crate::clade::{CladeId, Forest};
use crate::error::Error;
use crate::resolve::NodeRef;
use crate::traversal::Strategy;
use indexmap::{IndexMap, IndexSet};
use log::debug;

impl Forest {
	/// Reduces the tree under `root` to the smallest topology connecting the
	/// given nodes (or names) with `root`.
	///
	/// Nodes that lead to no retained node are removed; internal nodes left
	/// with a single child are spliced out, their branch lengths folded into the
	/// remaining child when `preserve_branch_length` is set.
	///
	/// # Example
	/// ```
	/// use nhtree::newick::parse_newick;
	///
	/// let (mut forest, root) = parse_newick("(((A,B)E,C)F,D)root;", 1, false).unwrap();
	/// forest.prune(root, vec!["A", "C"], false).unwrap();
	/// assert_eq!(forest.to_newick(root, 9).unwrap(), "(A,C);");
	/// ```
	///
	/// # Errors
	/// * every error of [`Forest::resolve`]
	/// * [`Error::EmptyTargets`] when nothing is left to keep
	/// * [`Error::NotConnected`] if a target does not lie under `root`
	pub fn prune<I, R>(&mut self, root: CladeId, items: I, preserve_branch_length: bool) -> Result<(), Error>
	where
		I: IntoIterator<Item = R>,
		R: Into<NodeRef>,
	{
		let targets = self.resolve(root, items)?;
		let (_, paths) = self.common_ancestor_with_paths(&targets)?;
		for &target in targets.iter() {
			if !self.ancestor_path(target)?.contains(&root) {
				return Err(Error::NotConnected);
			}
		}

		let mut to_keep: IndexSet<CladeId> = targets.iter().copied().collect();
		to_keep.insert(root);

		// Waypoints and the targets passing through them.
		let mut visitors: IndexMap<CladeId, Vec<CladeId>> = IndexMap::new();
		for (&target, path) in paths.iter() {
			for &waypoint in path.iter().filter(|&&node| node != target) {
				let seen = visitors.entry(waypoint).or_insert_with(Vec::new);
				if !seen.contains(&target) {
					seen.push(target);
				}
			}
		}

		// Waypoints shared by the same targets form a chain; only its deepest
		// member is a branching point, unless the chain already holds a kept node.
		let mut groups: IndexMap<Vec<CladeId>, Vec<CladeId>> = IndexMap::new();
		for (waypoint, mut seen) in visitors {
			if seen.len() > 1 {
				seen.sort();
				groups.entry(seen).or_insert_with(Vec::new).push(waypoint);
			}
		}
		for (_, chain) in groups {
			if chain.iter().any(|node| to_keep.contains(node)) {
				continue;
			}
			let mut deepest = None;
			for node in chain {
				let depth = self.depth(node)?;
				if deepest.map_or(true, |(_, best)| depth > best) {
					deepest = Some((node, depth));
				}
			}
			if let Some((node, _)) = deepest {
				to_keep.insert(node);
			}
		}
		debug!("Pruning under {}: keeping {} nodes for {} targets", root, to_keep.len(), targets.len());

		let order: Vec<CladeId> = self.iter_descendants(root, Strategy::PostOrder)?.collect();
		for node in order {
			if self.is_valid(node) && !to_keep.contains(&node) {
				self.delete_where(node, true, preserve_branch_length, |n| !to_keep.contains(&n));
			}
		}
		Ok(())
	}
}
