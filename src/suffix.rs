//! Path-compressed suffix trie with edit-distance bounded search.
//!
//! Construction is the naive one: every suffix of the sentinel-terminated
//! text is inserted character by character, then chains of single-child
//! nodes that end no suffix are folded into string-labelled edges.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{SearchConfig, StateBudget};
use crate::render::TreeView;
use crate::{NodeId, SearchError, ROOT};

/// A node of the suffix trie.
#[derive(Debug, Clone, Default)]
pub struct SuffixNode {
    children: BTreeMap<String, NodeId>,
    /// Start offsets of the suffixes ending exactly at this node.
    indexes: Vec<usize>,
}

impl SuffixNode {
    /// Outgoing edges ordered by label.
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.children
            .iter()
            .map(|(label, &child)| (label.as_str(), child))
    }

    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// One pending search state. The incoming edge label of `node` is `label`;
/// `offset` is a byte offset into it.
#[derive(Debug, Clone, Copy)]
struct Frame<'a> {
    node: NodeId,
    label: &'a str,
    offset: usize,
    pat_idx: usize,
    remaining: usize,
}

impl Frame<'_> {
    // Every node has a single incoming edge, so the label is implied by it.
    fn key(&self) -> (NodeId, usize, usize, usize) {
        (self.node, self.offset, self.pat_idx, self.remaining)
    }
}

/// Compressed trie over all suffixes of a text.
#[derive(Debug, Clone)]
pub struct CompressedSuffixTrie {
    nodes: Vec<SuffixNode>,
    text_len: usize,
    config: SearchConfig,
}

impl CompressedSuffixTrie {
    /// Build the compressed suffix trie with the default configuration.
    pub fn build(text: &str) -> Result<Self, SearchError> {
        Self::build_with_config(text, SearchConfig::default())
    }

    pub fn build_with_config(text: &str, config: SearchConfig) -> Result<Self, SearchError> {
        let sentinel = config.sentinel;
        let mut chars: Vec<char> = text.chars().collect();
        if let Some(offset) = chars.iter().position(|&ch| ch == sentinel) {
            return Err(SearchError::SentinelInText { sentinel, offset });
        }
        let text_len = chars.len();
        chars.push(sentinel);

        let raw = insert_suffixes(&chars);
        let raw_count = raw.len();
        let nodes = compress(raw);
        debug!(
            "Suffix trie built over {} chars: {} nodes before compression, {} after",
            text_len,
            raw_count,
            nodes.len()
        );

        Ok(Self {
            nodes,
            text_len,
            config,
        })
    }

    /// All suffix start offsets stored in the subtree rooted at `node`,
    /// ascending.
    pub fn collect_indexes(&self, node: NodeId) -> Vec<usize> {
        let mut out = BTreeSet::new();
        self.collect_into(node, &mut out, &mut HashSet::new());
        out.into_iter().collect()
    }

    fn collect_into(
        &self,
        node: NodeId,
        out: &mut BTreeSet<usize>,
        collected: &mut HashSet<NodeId>,
    ) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            // A collected node already contributed its whole subtree.
            if !collected.insert(id) {
                continue;
            }
            let current = &self.nodes[id];
            out.extend(current.indexes.iter().copied());
            stack.extend(current.children.values().copied());
        }
    }

    /// Offsets in the text where some prefix of the suffix is within
    /// `max_errors` substitutions, insertions and deletions of `pattern`.
    ///
    /// Offsets are character positions, ascending and deduplicated.
    pub fn search_approx(
        &self,
        pattern: &str,
        max_errors: usize,
    ) -> Result<Vec<usize>, SearchError> {
        let pattern: Vec<char> = pattern.chars().collect();
        let mut results = BTreeSet::new();
        let mut collected = HashSet::new();
        let mut seen = HashSet::new();
        let mut budget = StateBudget::new(self.config.max_states);

        let mut stack: Vec<Frame<'_>> = Vec::new();
        self.push_children(ROOT, 0, max_errors, &mut stack);

        while let Some(frame) = stack.pop() {
            if self.config.memoize && !seen.insert(frame.key()) {
                continue;
            }
            budget.charge()?;

            let Frame {
                node,
                label,
                mut offset,
                mut pat_idx,
                remaining,
            } = frame;

            let mut mismatch = None;
            while offset < label.len() && pat_idx < pattern.len() {
                let Some(ch) = label[offset..].chars().next() else {
                    break;
                };
                if ch == pattern[pat_idx] {
                    offset += ch.len_utf8();
                    pat_idx += 1;
                } else {
                    mismatch = Some(ch.len_utf8());
                    break;
                }
            }

            if let Some(width) = mismatch {
                // Each mismatch site tries the three edits and nothing else.
                if remaining > 0 {
                    let remaining = remaining - 1;
                    // Skip in pattern: a pattern character missing from the text.
                    stack.push(Frame {
                        node,
                        label,
                        offset,
                        pat_idx: pat_idx + 1,
                        remaining,
                    });
                    // Skip in label: a text character missing from the pattern.
                    stack.push(Frame {
                        node,
                        label,
                        offset: offset + width,
                        pat_idx,
                        remaining,
                    });
                    // Substitution, explored first.
                    stack.push(Frame {
                        node,
                        label,
                        offset: offset + width,
                        pat_idx: pat_idx + 1,
                        remaining,
                    });
                }
                continue;
            }

            if pat_idx == pattern.len() {
                self.collect_into(node, &mut results, &mut collected);
            } else {
                self.push_children(node, pat_idx, remaining, &mut stack);
            }
        }

        // The sentinel-only suffix starts past the end of the text.
        results.remove(&self.text_len);

        trace!(
            "Approximate search for {} chars (k={}) visited {} states, {} hits",
            pattern.len(),
            max_errors,
            budget.used(),
            results.len()
        );
        Ok(results.into_iter().collect())
    }

    fn push_children<'a>(
        &'a self,
        node: NodeId,
        pat_idx: usize,
        remaining: usize,
        stack: &mut Vec<Frame<'a>>,
    ) {
        // Reversed so children pop in label order.
        for (label, &child) in self.nodes[node].children.iter().rev() {
            stack.push(Frame {
                node: child,
                label,
                offset: 0,
                pat_idx,
                remaining,
            });
        }
    }

    /// Run [`search_approx`](Self::search_approx) for each pattern, results
    /// in input order.
    #[cfg(feature = "parallel")]
    pub fn search_approx_many<S>(
        &self,
        patterns: &[S],
        max_errors: usize,
    ) -> Result<Vec<Vec<usize>>, SearchError>
    where
        S: AsRef<str> + Sync,
    {
        patterns
            .par_iter()
            .map(|pattern| self.search_approx(pattern.as_ref(), max_errors))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    pub fn search_approx_many<S>(
        &self,
        patterns: &[S],
        max_errors: usize,
    ) -> Result<Vec<Vec<usize>>, SearchError>
    where
        S: AsRef<str> + Sync,
    {
        patterns
            .iter()
            .map(|pattern| self.search_approx(pattern.as_ref(), max_errors))
            .collect()
    }

    /// True when no non-root node without indexes has exactly one child.
    pub fn is_compressed(&self) -> bool {
        self.nodes
            .iter()
            .skip(1)
            .all(|node| !(node.indexes.is_empty() && node.children.len() == 1))
    }

    pub fn node(&self, id: NodeId) -> Option<&SuffixNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> &SuffixNode {
        &self.nodes[ROOT]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the indexed text in characters, sentinel excluded.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn sentinel(&self) -> char {
        self.config.sentinel
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl TreeView for CompressedSuffixTrie {
    fn edges(&self, node: NodeId) -> Vec<(String, NodeId)> {
        self.nodes[node]
            .children()
            .map(|(label, child)| (label.to_string(), child))
            .collect()
    }

    fn annotation(&self, node: NodeId) -> Option<String> {
        let indexes = &self.nodes[node].indexes;
        if indexes.is_empty() {
            return None;
        }
        let joined: Vec<String> = indexes.iter().map(|idx| idx.to_string()).collect();
        Some(joined.join(","))
    }
}

/// Uncompressed trie of every suffix, one character per edge.
fn insert_suffixes(chars: &[char]) -> Vec<SuffixNode> {
    let mut nodes = vec![SuffixNode::default()];
    let mut buf = [0u8; 4];

    for start in 0..chars.len() {
        let mut node = ROOT;
        for &ch in &chars[start..] {
            let key: &str = ch.encode_utf8(&mut buf);
            node = match nodes[node].children.get(key) {
                Some(&child) => child,
                None => {
                    let child = nodes.len();
                    nodes.push(SuffixNode::default());
                    nodes[node].children.insert(key.to_string(), child);
                    child
                }
            };
        }
        nodes[node].indexes.push(start);
    }

    nodes
}

/// Fold single-child chains without indexes into one edge, producing a fresh
/// arena that holds only the surviving nodes.
fn compress(mut raw: Vec<SuffixNode>) -> Vec<SuffixNode> {
    let mut nodes = vec![SuffixNode {
        children: BTreeMap::new(),
        indexes: std::mem::take(&mut raw[ROOT].indexes),
    }];
    // (raw id, compressed id)
    let mut stack = vec![(ROOT, ROOT)];

    while let Some((raw_id, id)) = stack.pop() {
        let edges = std::mem::take(&mut raw[raw_id].children);
        for (mut label, mut child) in edges {
            loop {
                let sole = &mut raw[child];
                if sole.children.len() != 1 || !sole.indexes.is_empty() {
                    break;
                }
                let Some((next_label, next_child)) = sole.children.pop_first() else {
                    break;
                };
                label.push_str(&next_label);
                child = next_child;
            }

            let compressed = nodes.len();
            nodes.push(SuffixNode {
                children: BTreeMap::new(),
                indexes: std::mem::take(&mut raw[child].indexes),
            });
            nodes[id].children.insert(label, compressed);
            stack.push((child, compressed));
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_labels(trie: &CompressedSuffixTrie) -> Vec<&str> {
        trie.root().children().map(|(label, _)| label).collect()
    }

    #[test]
    fn compresses_banana() {
        let trie = CompressedSuffixTrie::build("BANANA").unwrap();
        assert_eq!(root_labels(&trie), vec!["$", "A", "BANANA$", "NA"]);
        assert_eq!(trie.node_count(), 11);
        assert!(trie.is_compressed());
        assert_eq!(trie.collect_indexes(ROOT), (0..=6).collect::<Vec<_>>());
    }

    #[test]
    fn every_leaf_holds_one_suffix() {
        let trie = CompressedSuffixTrie::build("ACGTTGCA").unwrap();
        for id in 0..trie.node_count() {
            let node = trie.node(id).unwrap();
            if node.is_leaf() {
                assert_eq!(node.indexes().len(), 1);
            }
        }
    }

    #[test]
    fn exact_search_finds_substrings() {
        let trie = CompressedSuffixTrie::build("AGCTAGCTTAGC").unwrap();
        assert_eq!(trie.search_approx("AGC", 0).unwrap(), vec![0, 4, 9]);
        assert!(trie.search_approx("GGG", 0).unwrap().is_empty());
    }

    #[test]
    fn substitution_within_label() {
        let trie = CompressedSuffixTrie::build("BANANA").unwrap();
        assert_eq!(trie.search_approx("ANN", 1).unwrap(), vec![1, 3]);
    }

    #[test]
    fn skip_in_label_and_pattern() {
        let trie = CompressedSuffixTrie::build("ACGT").unwrap();
        // 0: drop C from the text, 1: substitute C->A, 2: drop A from the pattern
        assert_eq!(trie.search_approx("AGT", 1).unwrap(), vec![0, 1, 2]);

        let trie = CompressedSuffixTrie::build("AGT").unwrap();
        assert_eq!(trie.search_approx("ACGT", 1).unwrap(), vec![0]);
    }

    #[test]
    fn empty_pattern_matches_every_offset() {
        let trie = CompressedSuffixTrie::build("ACG").unwrap();
        assert_eq!(trie.search_approx("", 0).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn empty_text_builds_trivial_tree() {
        let trie = CompressedSuffixTrie::build("").unwrap();
        assert_eq!(trie.node_count(), 2);
        assert_eq!(trie.text_len(), 0);
        assert!(trie.search_approx("", 0).unwrap().is_empty());
        assert!(trie.search_approx("A", 1).unwrap().is_empty());
    }

    #[test]
    fn rejects_sentinel_in_text() {
        let err = CompressedSuffixTrie::build("AC$GT").unwrap_err();
        assert_eq!(
            err,
            SearchError::SentinelInText {
                sentinel: '$',
                offset: 2
            }
        );

        let config = SearchConfig {
            sentinel: '#',
            ..SearchConfig::default()
        };
        let trie = CompressedSuffixTrie::build_with_config("AC$GT", config).unwrap();
        assert_eq!(trie.search_approx("$G", 0).unwrap(), vec![2]);
    }

    #[test]
    fn memoization_does_not_change_results() {
        let text = "ACGTACGTTGCAACGTAGCT";
        let memo = CompressedSuffixTrie::build(text).unwrap();
        let plain = CompressedSuffixTrie::build_with_config(
            text,
            SearchConfig {
                memoize: false,
                ..SearchConfig::default()
            },
        )
        .unwrap();
        for k in 0..3 {
            assert_eq!(
                memo.search_approx("ACGA", k).unwrap(),
                plain.search_approx("ACGA", k).unwrap()
            );
        }
    }

    #[test]
    fn reports_resource_limit() {
        let config = SearchConfig {
            max_states: 2,
            ..SearchConfig::default()
        };
        let trie = CompressedSuffixTrie::build_with_config("ACGTACGT", config).unwrap();
        assert_eq!(
            trie.search_approx("ACG", 1),
            Err(SearchError::ResourceLimit { limit: 2 })
        );
    }

    #[test]
    fn searches_many_patterns_in_order() {
        let trie = CompressedSuffixTrie::build("AGCTAGCTTAGC").unwrap();
        let results = trie.search_approx_many(&["TAG", "AGC"], 0).unwrap();
        assert_eq!(results, vec![vec![3, 8], vec![0, 4, 9]]);
    }

    #[test]
    fn annotates_nodes_with_indexes() {
        let trie = CompressedSuffixTrie::build("AA").unwrap();
        // root: "$" (2), "A" -> {"$" (1), "A$" (0)}
        let edges = trie.edges(ROOT);
        let labels: Vec<&str> = edges.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["$", "A"]);
        assert_eq!(trie.annotation(edges[0].1), Some("2".to_string()));
        assert_eq!(trie.annotation(edges[1].1), None);
    }
}
