//! Resolution of mixed node / name references against a tree.
use crate::clade::{CladeId, Forest};
use crate::error::Error;
use crate::traversal::Strategy;
use indexmap::{IndexMap, IndexSet};
use log::debug;

/// A node given either directly or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
	Id(CladeId),
	Name(String),
}

impl From<CladeId> for NodeRef {
	fn from(id: CladeId) -> NodeRef {
		NodeRef::Id(id)
	}
}

impl From<&CladeId> for NodeRef {
	fn from(id: &CladeId) -> NodeRef {
		NodeRef::Id(*id)
	}
}

impl From<&str> for NodeRef {
	fn from(name: &str) -> NodeRef {
		NodeRef::Name(name.to_string())
	}
}

impl From<String> for NodeRef {
	fn from(name: String) -> NodeRef {
		NodeRef::Name(name)
	}
}

impl From<&String> for NodeRef {
	fn from(name: &String) -> NodeRef {
		NodeRef::Name(name.clone())
	}
}

/// Turns `items` into concrete nodes of the tree under `root`.
///
/// Names are looked up in a single walk of the tree and must match exactly
/// one node. Direct references only have to be live nodes of `forest`.
/// The result lists direct references first, then named nodes, each in order
/// of first mention; a node referenced more than once appears once.
///
/// # Errors
/// * [`Error::InvalidNode`] for a stale direct reference (or a stale `root`)
/// * [`Error::AmbiguousName`] if a requested name is shared by several nodes
/// * [`Error::NamesNotFound`] listing every requested name without a match
pub fn resolve<I, R>(forest: &Forest, root: CladeId, items: I) -> Result<Vec<CladeId>, Error>
where
	I: IntoIterator<Item = R>,
	R: Into<NodeRef>,
{
	let mut direct: IndexSet<CladeId> = IndexSet::new();
	let mut wanted: IndexMap<String, Option<CladeId>> = IndexMap::new();
	for item in items {
		match item.into() {
			NodeRef::Id(id) => {
				forest.get(id)?;
				direct.insert(id);
			}
			NodeRef::Name(name) => {
				wanted.entry(name).or_insert(None);
			}
		}
	}

	if !wanted.is_empty() {
		for id in forest.traverse(root, Strategy::PreOrder)? {
			if let Some(slot) = wanted.get_mut(forest[id].name.as_str()) {
				if slot.is_some() {
					return Err(Error::AmbiguousName(forest[id].name.clone()));
				}
				*slot = Some(id);
			}
		}
		let missing: Vec<String> = wanted
			.iter()
			.filter(|(_, found)| found.is_none())
			.map(|(name, _)| name.clone())
			.collect();
		if !missing.is_empty() {
			return Err(Error::NamesNotFound(missing));
		}
	} else {
		forest.get(root)?;
	}

	let mut nodes = direct;
	nodes.extend(wanted.values().flatten().copied());
	debug!("Resolved {} node references under {}", nodes.len(), root);
	Ok(nodes.into_iter().collect())
}

impl Forest {
	/// See [`resolve`].
	pub fn resolve<I, R>(&self, root: CladeId, items: I) -> Result<Vec<CladeId>, Error>
	where
		I: IntoIterator<Item = R>,
		R: Into<NodeRef>,
	{
		resolve(self, root, items)
	}
}
