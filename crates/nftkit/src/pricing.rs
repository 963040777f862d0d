//! Auction price distribution

use std::collections::HashMap;
use std::fmt::Debug;

use nftkit_common::{Amount, TokenId};

/// Default starting price of a token
pub const DEFAULT_TOKEN_PRICE: u64 = 1000;

/// Assigns a starting price to every token of an auction
pub trait PriceDistribution: Debug + Send + Sync {
    /// Prices in the same order as `token_ids`
    fn prices(&self, token_ids: &[TokenId]) -> Vec<Amount>;
}

/// Same price for every token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatPrice(pub Amount);

impl Default for FlatPrice {
    fn default() -> Self {
        Self(Amount::from(DEFAULT_TOKEN_PRICE))
    }
}

impl PriceDistribution for FlatPrice {
    fn prices(&self, token_ids: &[TokenId]) -> Vec<Amount> {
        vec![self.0; token_ids.len()]
    }
}

/// Explicit price per token, tokens without an entry get the fallback price
#[derive(Debug, Clone, Default)]
pub struct PriceSchedule {
    prices: HashMap<TokenId, Amount>,
    fallback: Amount,
}

impl PriceSchedule {
    /// Create new [`PriceSchedule`]
    pub fn new(fallback: Amount) -> Self {
        Self {
            prices: HashMap::new(),
            fallback,
        }
    }

    /// Set the price of a single token
    pub fn with_price(mut self, token_id: TokenId, price: Amount) -> Self {
        self.prices.insert(token_id, price);
        self
    }
}

impl PriceDistribution for PriceSchedule {
    fn prices(&self, token_ids: &[TokenId]) -> Vec<Amount> {
        token_ids
            .iter()
            .map(|id| self.prices.get(id).copied().unwrap_or(self.fallback))
            .collect()
    }
}

/// Prices given positionally, they must line up with the token list
impl PriceDistribution for Vec<Amount> {
    fn prices(&self, _token_ids: &[TokenId]) -> Vec<Amount> {
        self.clone()
    }
}
