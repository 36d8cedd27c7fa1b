#![deny(warnings)]

//! Game operations for the Lucerium trading game.
//!
//! This crate provides validated operations over a [`game_core::PlayerSession`]:
//! - Buying and selling shares with atomic per-session semantics
//! - Net worth and per-round transaction reporting
//! - The round-progression state machine
//! - Paid expert predictions and the sidebar calculator

use rust_decimal::Decimal;
use thiserror::Error;

mod calc;
mod expert;
mod rounds;
mod trading;

pub use calc::{calculate, CalcOp};
pub use expert::consult_expert;
pub use rounds::{advance_round, finish_competition, FinalStanding, RoundAdvance};
pub use trading::{buy, holdings, net_worth, round_summary, sell, HoldingRow, RoundSummary};

/// Errors produced by game operations. Every failure leaves the session
/// untouched; none are fatal to the process.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    /// A purchase or consultation costs more than the cash in hand.
    #[error("not enough cash: need {needed}, have {available}")]
    InsufficientFunds {
        /// Amount the operation would cost.
        needed: Decimal,
        /// Cash currently in hand.
        available: Decimal,
    },
    /// A sale requests more shares than are held.
    #[error("not enough shares of {company}: requested {requested}, held {held}")]
    InsufficientShares {
        /// Company being sold.
        company: String,
        /// Shares requested.
        requested: u64,
        /// Shares actually held.
        held: u64,
    },
    /// The expert id is not in the static table.
    #[error("unknown expert: {0}")]
    UnknownExpert(String),
    /// Round submission without the confirmation flag set.
    #[error("round submission requires confirmation")]
    MissingConfirmation,
    /// Entered password does not match the round's static password.
    #[error("incorrect password for round {0}")]
    IncorrectPassword(u8),
    /// No further round progression is possible.
    #[error("all rounds completed")]
    RoundLimitExceeded,
    /// Calculator division by zero.
    #[error("division by zero")]
    DivisionByZero,
}
