//! # nhtree
//!
//! `nhtree` is a library for rooted phylogenetic trees: reading and writing
//! Newick (New Hampshire) text, walking trees in several orders, and editing
//! their topology (deletion with branch folding, common ancestors, pruning).
//!
//! ```
//! use nhtree::newick::parse_newick;
//!
//! let (forest, root) = parse_newick("(A:1,(B:1,(C:1,D:1):0.5):0.5);", 0, false).unwrap();
//! let c = forest.search_by_name(root, "C").unwrap()[0];
//! let d = forest.search_by_name(root, "D").unwrap()[0];
//! let cd = forest.common_ancestor(&[c, d]).unwrap();
//! assert_eq!(forest[cd].dist(), 0.5);
//! ```
pub mod clade;
pub mod error;
pub mod newick;
pub mod resolve;
pub mod topology;
pub mod traversal;

pub use clade::{Clade, CladeAttrs, CladeId, Feature, Forest};
pub use error::{Error, ParseError, ParseErrorKind};
pub use newick::{parse_newick, write_newick, NewickFormat, NewickParser, NewickWriter};
pub use resolve::{resolve, NodeRef};
pub use topology::{AncestorPath, PopulateOptions};
pub use traversal::{Strategy, Traversal};
