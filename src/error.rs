//! Error types shared by both tries.

/// Errors returned by trie construction and search.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("error budget must be non-negative, got {0}")]
    NegativeBudget(i64),
    #[error("text contains the sentinel character {sentinel:?} at offset {offset}")]
    SentinelInText { sentinel: char, offset: usize },
    #[error("search exceeded the limit of {limit} traversal states")]
    ResourceLimit { limit: usize },
}

/// Non-negative error budget converted from an externally supplied integer.
///
/// The core search APIs take `usize` budgets directly; this type exists for
/// callers holding signed input (CLI flags, bindings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ErrorBudget(usize);

impl ErrorBudget {
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for ErrorBudget {
    type Error = SearchError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .map(Self)
            .map_err(|_| SearchError::NegativeBudget(value))
    }
}

impl From<ErrorBudget> for usize {
    fn from(budget: ErrorBudget) -> Self {
        budget.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_budget() {
        assert_eq!(
            ErrorBudget::try_from(-1),
            Err(SearchError::NegativeBudget(-1))
        );
    }

    #[test]
    fn accepts_zero_and_positive_budgets() {
        assert_eq!(ErrorBudget::try_from(0).unwrap().get(), 0);
        assert_eq!(usize::from(ErrorBudget::try_from(3).unwrap()), 3);
    }
}
