//! Multi-pattern keyword trie with substitution-only search.

mod pattern_trie;

pub use self::pattern_trie::{Matches, PatternNode, PatternTrie};
