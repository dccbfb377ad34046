//! seqsearch: bounded-error pattern search over small-alphabet texts.
//!
//! Two independent indexes with deliberately different error models:
//!
//! - [`PatternTrie`]: multi-keyword prefix trie, substitution-only
//!   (Hamming) mismatches.
//! - [`CompressedSuffixTrie`]: path-compressed trie of every suffix,
//!   edit-distance (substitution, insertion, deletion) matching of one
//!   pattern against suffix prefixes.
//!
//! Both are built once and are read-only afterwards, so a built index can be
//! shared between threads.

pub mod config;
pub mod error;
pub mod input;
pub mod pattern;
pub mod render;
pub mod suffix;

/// Index of a node inside a trie's node arena.
pub type NodeId = usize;

/// Every trie stores its root at this index.
pub const ROOT: NodeId = 0;

pub use config::{SearchConfig, DEFAULT_MAX_STATES, DEFAULT_SENTINEL};
pub use error::{ErrorBudget, SearchError};
pub use pattern::{Matches, PatternNode, PatternTrie};
pub use render::{tree_graph, TreeGraph, TreeView};
pub use suffix::{CompressedSuffixTrie, SuffixNode};
