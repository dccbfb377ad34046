//! Search configuration shared by both tries.

/// Default sentinel appended to the text before building the suffix trie.
pub const DEFAULT_SENTINEL: char = '$';

/// Default cap on traversal states processed by a single search call.
pub const DEFAULT_MAX_STATES: usize = 50_000_000;

/// Configuration options that govern trie construction and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Terminator appended to the suffix trie text. Must not occur in the text.
    pub sentinel: char,
    /// Maximum traversal states one search may process before failing with
    /// [`SearchError::ResourceLimit`](crate::SearchError::ResourceLimit).
    pub max_states: usize,
    /// Skip suffix-search states that were already expanded.
    pub memoize: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL,
            max_states: DEFAULT_MAX_STATES,
            memoize: true,
        }
    }
}

/// Counts processed states against [`SearchConfig::max_states`].
#[derive(Debug)]
pub(crate) struct StateBudget {
    limit: usize,
    used: usize,
}

impl StateBudget {
    pub(crate) fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    #[inline]
    pub(crate) fn charge(&mut self) -> Result<(), crate::SearchError> {
        self.used += 1;
        if self.used > self.limit {
            return Err(crate::SearchError::ResourceLimit { limit: self.limit });
        }
        Ok(())
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }
}
