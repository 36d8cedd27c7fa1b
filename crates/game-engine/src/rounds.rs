//! Round progression: Round 1 → Round 2 → Round 3 → Completed.
//!
//! Transitions require a confirmation flag and the round's static
//! password. No transition is reversible.

use crate::{trading, GameError};
use game_core::{GameConfig, PlayerSession};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

/// Result of a successful round submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundAdvance {
    /// Round that was submitted.
    pub submitted_round: u8,
    /// Round now active.
    pub new_round: u8,
    /// Net worth at the submitted round's prices, for the leaderboard.
    pub net_worth: Decimal,
}

/// Final leaderboard standing after the competition is completed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinalStanding {
    /// The final round.
    pub round: u8,
    /// Net worth at the final round's prices.
    pub net_worth: Decimal,
}

/// Submit the current round and advance to the next one.
///
/// Checks, in order: the confirmation flag, the round limit, and the
/// password. At the final round this always fails with
/// [`GameError::RoundLimitExceeded`], whatever the password. On success
/// the round counter increments and the prediction and round-scoped
/// rumor list are cleared; the returned net worth is computed at the
/// *submitted* round's prices so the caller can persist it.
pub fn advance_round(
    session: &mut PlayerSession,
    password: &str,
    confirmed: bool,
    config: &GameConfig,
) -> Result<RoundAdvance, GameError> {
    if !confirmed {
        return Err(GameError::MissingConfirmation);
    }
    if session.completed || session.round >= config.final_round() {
        return Err(GameError::RoundLimitExceeded);
    }
    // A round missing from the tables cannot be submitted.
    let current = config
        .round(session.round)
        .ok_or(GameError::RoundLimitExceeded)?;
    if password != current.password {
        return Err(GameError::IncorrectPassword(session.round));
    }

    let net_worth = trading::net_worth(session, current);
    let submitted_round = session.round;
    session.round += 1;
    session.prediction = None;
    session.rumors.clear();
    info!(
        player = %session.player,
        from = submitted_round,
        to = session.round,
        %net_worth,
        "round submitted"
    );
    Ok(RoundAdvance {
        submitted_round,
        new_round: session.round,
        net_worth,
    })
}

/// Submit the final round, closing the competition for this session.
///
/// Only valid at the final round; validates the confirmation flag and the
/// final round's password, then marks the session completed. Repeat
/// attempts fail with [`GameError::RoundLimitExceeded`].
pub fn finish_competition(
    session: &mut PlayerSession,
    password: &str,
    confirmed: bool,
    config: &GameConfig,
) -> Result<FinalStanding, GameError> {
    if !confirmed {
        return Err(GameError::MissingConfirmation);
    }
    if session.completed || session.round != config.final_round() {
        return Err(GameError::RoundLimitExceeded);
    }
    let current = config
        .round(session.round)
        .ok_or(GameError::RoundLimitExceeded)?;
    if password != current.password {
        return Err(GameError::IncorrectPassword(session.round));
    }

    let net_worth = trading::net_worth(session, current);
    session.completed = true;
    info!(player = %session.player, %net_worth, "competition completed");
    Ok(FinalStanding {
        round: session.round,
        net_worth,
    })
}
