//! Greedy largest-first coin selection.
//!
//! ```text
//! remaining = amount
//! for balance in balances (same mint, amount > 0, largest first):
//!     take = min(remaining, balance.amount)
//!     remaining -= take
//!     stop once remaining == 0
//! ```
//!
//! Shortfalls are reported before any pick is returned, so a caller never
//! dispatches a withdrawal that is known to be underfunded.

use wraith_core::error::{Result, WraithError};
use wraith_core::types::{StealthBalance, WithdrawalPick};

/// Sum of the spendable balances of `mint`.
pub fn total_available(balances: &[StealthBalance], mint: &str) -> u64 {
    balances
        .iter()
        .filter(|b| b.mint == mint)
        .fold(0u64, |acc, b| acc.saturating_add(b.amount))
}

/// Picks balances of `mint` that together cover exactly `amount`.
///
/// Balances are visited largest first; ties keep their input order.
///
/// # Errors
/// - `ValidationError` if `amount` is zero
/// - `InsufficientFunds` if the balances of `mint` sum to less than `amount`
pub fn select_balances(
    balances: &[StealthBalance],
    mint: &str,
    amount: u64,
) -> Result<Vec<WithdrawalPick>> {
    if amount == 0 {
        return Err(WraithError::ValidationError(
            "withdrawal amount must be positive".into(),
        ));
    }

    let available = total_available(balances, mint);
    if available < amount {
        return Err(WraithError::InsufficientFunds {
            requested: amount,
            available,
        });
    }

    let mut candidates: Vec<&StealthBalance> = balances
        .iter()
        .filter(|b| b.mint == mint && b.amount > 0)
        .collect();
    candidates.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut remaining = amount;
    let mut picks = Vec::new();
    for balance in candidates {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(balance.amount);
        picks.push(WithdrawalPick {
            balance: balance.clone(),
            amount_to_take: take,
        });
        remaining -= take;
    }

    if remaining != 0 {
        return Err(WraithError::InternalError(format!(
            "selector left {remaining} uncovered"
        )));
    }

    Ok(picks)
}
