//! Token registry
//!
//! Static mapping from token id to the asset symbol it tracks. Loaded once at
//! startup; the engine only reads it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token identifier, as assigned by the token contract
pub type TokenId = u64;

/// One registry entry as it appears in configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenEntry {
    pub id: TokenId,
    pub symbol: String,
}

/// Read-only token to symbol mapping
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: BTreeMap<TokenId, String>,
}

impl TokenRegistry {
    /// Build the registry from configuration entries. Later duplicates win.
    pub fn from_entries(entries: &[TokenEntry]) -> Self {
        let tokens = entries
            .iter()
            .map(|e| (e.id, e.symbol.to_uppercase()))
            .collect();
        Self { tokens }
    }

    /// Symbol tracked by a token
    pub fn symbol(&self, token_id: TokenId) -> Option<&str> {
        self.tokens.get(&token_id).map(String::as_str)
    }

    /// All (token, symbol) pairs ordered by token id
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &str)> {
        self.tokens.iter().map(|(id, s)| (*id, s.as_str()))
    }

    /// Distinct symbols referenced by any token, sorted
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.tokens.values().cloned().collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
