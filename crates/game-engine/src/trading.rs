//! Share trading and portfolio reporting.

use crate::GameError;
use game_core::{CompanyId, PlayerSession, RoundSpec, Transaction};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Buy shares at the quoted price, debiting cash and appending a
/// transaction tagged with the active round.
///
/// Fails with [`GameError::InsufficientFunds`] when the total cost exceeds
/// cash in hand. A quantity of zero succeeds without recording anything.
pub fn buy(
    session: &mut PlayerSession,
    company: &CompanyId,
    shares: u64,
    price: Decimal,
) -> Result<(), GameError> {
    if shares == 0 {
        return Ok(());
    }
    let cost = price * Decimal::from(shares);
    if cost > session.cash {
        return Err(GameError::InsufficientFunds {
            needed: cost,
            available: session.cash,
        });
    }
    let entry = session.portfolio.entry(company.clone()).or_default();
    entry.shares += shares;
    entry.total_spent += cost;
    session.cash -= cost;
    session.transactions.push(Transaction {
        round: session.round,
        company: company.clone(),
        shares_bought: shares,
        shares_sold: 0,
        price,
    });
    debug!(player = %session.player, %company, shares, %price, "bought shares");
    Ok(())
}

/// Sell held shares at the quoted price, crediting cash and appending a
/// transaction tagged with the active round.
///
/// Fails with [`GameError::InsufficientShares`] when the request exceeds
/// the shares held, including companies never bought. A quantity of zero
/// succeeds without recording anything.
pub fn sell(
    session: &mut PlayerSession,
    company: &CompanyId,
    shares: u64,
    price: Decimal,
) -> Result<(), GameError> {
    let held = session.shares_held(company);
    if shares > held {
        return Err(GameError::InsufficientShares {
            company: company.0.clone(),
            requested: shares,
            held,
        });
    }
    if shares == 0 {
        return Ok(());
    }
    let proceeds = price * Decimal::from(shares);
    // held >= shares > 0, so the entry exists
    if let Some(entry) = session.portfolio.get_mut(company) {
        entry.shares -= shares;
        entry.total_received += proceeds;
    }
    session.cash += proceeds;
    session.transactions.push(Transaction {
        round: session.round,
        company: company.clone(),
        shares_bought: 0,
        shares_sold: shares,
        price,
    });
    debug!(player = %session.player, %company, shares, %price, "sold shares");
    Ok(())
}

/// Cash in hand plus the current-round market value of all held shares.
/// Holdings in companies delisted this round are valued at zero.
pub fn net_worth(session: &PlayerSession, round: &RoundSpec) -> Decimal {
    let mut total = session.cash;
    for (company, entry) in &session.portfolio {
        let price = round.price(company).unwrap_or(Decimal::ZERO);
        total += price * Decimal::from(entry.shares);
    }
    total
}

/// Spending and proceeds for one round of trading.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundSummary {
    /// Round the summary covers.
    pub round: u8,
    /// Total spent buying (Σ bought × price).
    pub spent: Decimal,
    /// Total received selling (Σ sold × price).
    pub received: Decimal,
}

impl RoundSummary {
    /// Net cash flow: received minus spent.
    pub fn net_flow(&self) -> Decimal {
        self.received - self.spent
    }
}

/// Summarize the transactions of the session's current round only.
pub fn round_summary(session: &PlayerSession) -> RoundSummary {
    let mut spent = Decimal::ZERO;
    let mut received = Decimal::ZERO;
    for tx in session.transactions.iter().filter(|t| t.round == session.round) {
        spent += tx.price * Decimal::from(tx.shares_bought);
        received += tx.price * Decimal::from(tx.shares_sold);
    }
    RoundSummary {
        round: session.round,
        spent,
        received,
    }
}

/// One display row of the portfolio table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HoldingRow {
    /// Held company.
    pub company: CompanyId,
    /// Current quoted price, zero when delisted.
    pub price: Decimal,
    /// Shares held.
    pub shares: u64,
    /// Cumulative amount spent on this company.
    pub total_spent: Decimal,
    /// Cumulative amount received from this company.
    pub total_received: Decimal,
    /// Shares valued at the current price.
    pub market_value: Decimal,
}

/// Portfolio rows for display: entries with shares held, valued at the
/// given round's prices. Zero-share entries are retained in the session
/// but hidden here.
pub fn holdings(session: &PlayerSession, round: &RoundSpec) -> Vec<HoldingRow> {
    session
        .portfolio
        .iter()
        .filter(|(_, entry)| entry.shares > 0)
        .map(|(company, entry)| {
            let price = round.price(company).unwrap_or(Decimal::ZERO);
            HoldingRow {
                company: company.clone(),
                price,
                shares: entry.shares,
                total_spent: entry.total_spent,
                total_received: entry.total_received,
                market_value: price * Decimal::from(entry.shares),
            }
        })
        .collect()
}
