//! Funding coin selection
//!
//! Descending greedy: drop coins under [`MIN_COIN_SIZE`], sort largest first and
//! take coins until the running total reaches the requirement. This keeps the
//! input count (and so signature count) low; leftover change goes back to the
//! wallet anyway.

use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::types::Coin;

/// Coins below this amount are never used for funding
pub const MIN_COIN_SIZE: u64 = 1000;

/// Outcome of a successful selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selected coins, largest first
    pub coins: Vec<Coin>,
    pub total: u64,
}

/// Select coins covering `required` duffs
///
/// Stops at the first prefix of the sorted list whose sum reaches `required`.
/// Equal amounts keep their listing order.
pub fn select_coins(available: &[Coin], required: u64) -> AppResult<Selection> {
    let mut candidates: Vec<&Coin> = available
        .iter()
        .filter(|coin| coin.amount >= MIN_COIN_SIZE)
        .collect();

    if candidates.is_empty() {
        return Err(AppError::NoCoins {
            min_amount: MIN_COIN_SIZE,
        });
    }

    candidates.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut coins = Vec::new();
    let mut total = 0u64;
    for coin in candidates {
        coins.push(coin.clone());
        total += coin.amount;
        if total >= required {
            debug!(
                "Selected {} coin(s) totalling {} duffs for {} required",
                coins.len(),
                total,
                required
            );
            return Ok(Selection { coins, total });
        }
    }

    Err(AppError::InsufficientFunds {
        needed: required,
        available: total,
    })
}
