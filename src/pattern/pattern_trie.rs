//! Keyword trie over a set of patterns.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]; the root is always
//! node `0`. Search walks the trie in lock-step with the text, one edge per
//! text character, spending one unit of budget per substituted character.
//! Insertions and deletions are not modelled here; see
//! [`CompressedSuffixTrie`](crate::CompressedSuffixTrie) for edit distance.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::config::{SearchConfig, StateBudget};
use crate::render::TreeView;
use crate::{NodeId, SearchError, ROOT};

/// Matched keyword mapped to ascending start offsets in the text.
pub type Matches = BTreeMap<String, Vec<usize>>;

/// A single trie node. Terminal iff `word` is set.
#[derive(Debug, Clone, Default)]
pub struct PatternNode {
    children: BTreeMap<char, NodeId>,
    word: Option<String>,
}

impl PatternNode {
    pub fn is_terminal(&self) -> bool {
        self.word.is_some()
    }

    /// Keyword ending at this node, if any.
    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    /// Outgoing edges in key order.
    pub fn children(&self) -> impl Iterator<Item = (char, NodeId)> + '_ {
        self.children.iter().map(|(&ch, &id)| (ch, id))
    }
}

/// Prefix trie of keywords supporting Hamming-bounded multi-pattern search.
#[derive(Debug, Clone)]
pub struct PatternTrie {
    nodes: Vec<PatternNode>,
    config: SearchConfig,
}

impl Default for PatternTrie {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl PatternTrie {
    /// Empty trie holding only the root.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            nodes: vec![PatternNode::default()],
            config,
        }
    }

    /// Build a trie from an ordered collection of keywords.
    pub fn build<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build_with_config(patterns, SearchConfig::default())
    }

    pub fn build_with_config<I, S>(patterns: I, config: SearchConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self::new(config);
        for pattern in patterns {
            trie.insert(pattern.as_ref());
        }
        debug!(
            "Keyword trie built: {} keywords, {} nodes",
            trie.keyword_count(),
            trie.nodes.len()
        );
        trie
    }

    /// Insert a keyword, creating missing nodes along its path.
    ///
    /// Re-inserting a keyword overwrites the terminal marker of its node.
    pub fn insert(&mut self, word: &str) {
        let mut node = ROOT;
        for ch in word.chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(PatternNode::default());
                    self.nodes[node].children.insert(ch, child);
                    child
                }
            };
        }
        if self.nodes[node].word.replace(word.to_string()).is_some() {
            debug!("Keyword {word:?} inserted twice; terminal marker overwritten");
        }
    }

    /// Find every keyword occurring in `text` with at most `max_mismatches`
    /// substituted characters.
    ///
    /// Offsets are character positions. Each keyword's offsets are ascending.
    pub fn search_all(&self, text: &str, max_mismatches: usize) -> Result<Matches, SearchError> {
        let text: Vec<char> = text.chars().collect();
        let mut matches = Matches::new();
        let mut budget = StateBudget::new(self.config.max_states);
        // (text position, node, remaining budget)
        let mut stack: Vec<(usize, NodeId, usize)> = Vec::new();

        for start in 0..text.len() {
            stack.push((start, ROOT, max_mismatches));

            while let Some((pos, node_id, remaining)) = stack.pop() {
                budget.charge()?;
                let node = &self.nodes[node_id];

                if let Some(word) = &node.word {
                    match matches.get_mut(word) {
                        Some(positions) => positions.push(start),
                        None => {
                            matches.insert(word.clone(), vec![start]);
                        }
                    }
                }

                let Some(&current) = text.get(pos) else {
                    continue;
                };

                // Reversed so children pop in key order.
                for (&ch, &child) in node.children.iter().rev() {
                    if ch == current {
                        stack.push((pos + 1, child, remaining));
                    } else if remaining > 0 {
                        stack.push((pos + 1, child, remaining - 1));
                    }
                }
            }
        }

        trace!(
            "Keyword search over {} chars (k={}) visited {} states, {} keywords matched",
            text.len(),
            max_mismatches,
            budget.used(),
            matches.len()
        );
        Ok(matches)
    }

    /// Exact membership test for a keyword.
    pub fn contains(&self, word: &str) -> bool {
        let mut node = ROOT;
        for ch in word.chars() {
            match self.nodes[node].children.get(&ch) {
                Some(&child) => node = child,
                None => return false,
            }
        }
        self.nodes[node].is_terminal()
    }

    pub fn node(&self, id: NodeId) -> Option<&PatternNode> {
        self.nodes.get(id)
    }

    /// Number of nodes including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct keywords stored.
    pub fn keyword_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_terminal()).count()
    }

    /// True when no keyword has been inserted.
    pub fn is_empty(&self) -> bool {
        self.keyword_count() == 0
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl TreeView for PatternTrie {
    fn edges(&self, node: NodeId) -> Vec<(String, NodeId)> {
        self.nodes[node]
            .children()
            .map(|(ch, child)| (ch.to_string(), child))
            .collect()
    }

    fn annotation(&self, node: NodeId) -> Option<String> {
        self.nodes[node].word.clone()
    }
}
