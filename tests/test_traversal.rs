use nhtree::newick::parse_newick;
use nhtree::{CladeId, Forest, Strategy};
use std::collections::HashSet;

const TREE: &str = "((A,B)E,((C,D)G,H)F)root;";

fn tree() -> (Forest, CladeId) {
	parse_newick(TREE, 1, false).unwrap()
}

fn names(forest: &Forest, ids: impl IntoIterator<Item = CladeId>) -> Vec<String> {
	ids.into_iter().map(|id| forest[id].name.clone()).collect()
}

fn walk(forest: &Forest, root: CladeId, strategy: Strategy) -> Vec<CladeId> {
	forest.traverse(root, strategy).unwrap().collect()
}

#[test]
fn test_preorder() {
	let (forest, root) = tree();
	let order = names(&forest, walk(&forest, root, Strategy::PreOrder));
	assert_eq!(order, vec!["root", "E", "A", "B", "F", "G", "C", "D", "H"]);
}

#[test]
fn test_postorder() {
	let (forest, root) = tree();
	let order = names(&forest, walk(&forest, root, Strategy::PostOrder));
	assert_eq!(order, vec!["A", "B", "E", "C", "D", "G", "H", "F", "root"]);
}

#[test]
fn test_levelorder() {
	let (forest, root) = tree();
	let order = names(&forest, walk(&forest, root, Strategy::LevelOrder));
	assert_eq!(order, vec!["root", "E", "F", "A", "B", "G", "H", "C", "D"]);
	assert_eq!(Strategy::default(), Strategy::LevelOrder);
}

#[test]
fn test_strategies_visit_same_nodes() {
	let (forest, root) = tree();
	let pre = walk(&forest, root, Strategy::PreOrder);
	let post = walk(&forest, root, Strategy::PostOrder);
	let level = walk(&forest, root, Strategy::LevelOrder);
	assert_eq!(pre.len(), forest.len());
	assert_eq!(post.len(), forest.len());
	assert_eq!(level.len(), forest.len());

	let pre_set: HashSet<CladeId> = pre.iter().copied().collect();
	assert_eq!(pre_set.len(), pre.len());
	let post_set: HashSet<CladeId> = post.iter().copied().collect();
	let level_set: HashSet<CladeId> = level.iter().copied().collect();
	assert_eq!(pre_set, post_set);
	assert_eq!(pre_set, level_set);
}

#[test]
fn test_descendant_ordering() {
	let (forest, root) = tree();
	let pre = walk(&forest, root, Strategy::PreOrder);
	let post = walk(&forest, root, Strategy::PostOrder);
	let position = |order: &[CladeId], id: CladeId| order.iter().position(|&n| n == id).unwrap();
	for &node in pre.iter() {
		for descendant in forest.descendants(node, Strategy::PreOrder).unwrap() {
			assert!(position(&pre, node) < position(&pre, descendant));
			assert!(position(&post, node) > position(&post, descendant));
		}
	}
}

#[test]
fn test_traversal_restarts() {
	let (forest, root) = tree();
	let first = walk(&forest, root, Strategy::PostOrder);
	let second = walk(&forest, root, Strategy::PostOrder);
	assert_eq!(first, second);
}

#[test]
fn test_subtree_traversal() {
	let (forest, root) = tree();
	let f = forest.search_by_name(root, "F").unwrap()[0];
	assert_eq!(names(&forest, walk(&forest, f, Strategy::PreOrder)), vec!["F", "G", "C", "D", "H"]);
	assert_eq!(names(&forest, forest.descendants(f, Strategy::LevelOrder).unwrap()), vec!["G", "H", "C", "D"]);
	assert_eq!(forest.node_count(f).unwrap(), 5);
}

#[test]
fn test_is_leaf_predicate_collapses_subtrees() {
	let (forest, root) = tree();
	let collapsed = |id: CladeId| forest[id].name == "E" || forest[id].name == "G";
	let pre = forest.traverse_with(root, Strategy::PreOrder, collapsed).unwrap();
	assert_eq!(names(&forest, pre), vec!["root", "E", "F", "G", "H"]);
	let post = forest.traverse_with(root, Strategy::PostOrder, collapsed).unwrap();
	assert_eq!(names(&forest, post), vec!["E", "G", "H", "F", "root"]);
	let level = forest.traverse_with(root, Strategy::LevelOrder, collapsed).unwrap();
	assert_eq!(names(&forest, level), vec!["root", "E", "F", "G", "H"]);

	let leaves = forest.leaves_with(root, collapsed).unwrap();
	assert_eq!(names(&forest, leaves), vec!["E", "G", "H"]);
}

#[test]
fn test_leaves() {
	let (forest, root) = tree();
	assert_eq!(forest.leaf_names(root).unwrap(), vec!["A", "B", "C", "D", "H"]);
	assert_eq!(forest.leaves(root).unwrap().len(), 5);
	for leaf in forest.iter_leaves(root).unwrap() {
		assert!(forest.is_leaf(leaf).unwrap());
	}
	let a = forest.search_by_name(root, "A").unwrap()[0];
	assert_eq!(forest.leaves(a).unwrap(), vec![a]);
}

#[test]
fn test_children_and_sisters() {
	let (forest, root) = tree();
	let e = forest.search_by_name(root, "E").unwrap()[0];
	let f = forest.search_by_name(root, "F").unwrap()[0];
	assert_eq!(forest.children(root).unwrap(), vec![e, f]);
	assert_eq!(forest.sisters(e).unwrap(), vec![f]);
	assert!(forest.sisters(root).unwrap().is_empty());
}

#[test]
fn test_contains_is_inclusive() {
	let (forest, root) = tree();
	let e = forest.search_by_name(root, "E").unwrap()[0];
	let c = forest.search_by_name(root, "C").unwrap()[0];
	assert!(forest.contains(e, e).unwrap());
	assert!(forest.contains(e, "E").unwrap());
	assert!(forest.contains(e, "A").unwrap());
	assert!(!forest.contains(e, c).unwrap());
	assert!(!forest.contains(e, "C").unwrap());
	assert!(forest.contains(root, "C").unwrap());
}

#[test]
fn test_search_by_name() {
	let (forest, root) = parse_newick("((A,B)X,(A,C)Y);", 1, false).unwrap();
	assert_eq!(forest.search_by_name(root, "A").unwrap().len(), 2);
	assert_eq!(forest.leaves_by_name(root, "A").unwrap().len(), 2);
	assert_eq!(forest.leaves_by_name(root, "X").unwrap().len(), 0);
	assert!(forest.search_by_name(root, "Z").unwrap().is_empty());
}

#[test]
fn test_stale_start_is_rejected() {
	let (mut forest, root) = tree();
	let e = forest.search_by_name(root, "E").unwrap()[0];
	forest.discard(e).unwrap();
	assert!(forest.traverse(e, Strategy::PreOrder).is_err());
	assert_eq!(forest.leaf_names(root).unwrap(), vec!["C", "D", "H"]);
}
