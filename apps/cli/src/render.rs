//! Pure state-to-view rendering.
//!
//! The whole page is rebuilt from current state after every interaction:
//! each function here maps session, configuration, leaderboard, and rumor
//! board to plain text, with no side effects.

use game_core::{GameConfig, PlayerSession, RoundSpec, Rumor};
use game_engine::{holdings, net_worth, round_summary};
use persistence::{latest, ranked, LeaderboardEntry};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Rumors shown on the board, matching the source page.
const RUMORS_SHOWN: usize = 5;

/// Render the complete view from current state.
pub fn view(
    config: &GameConfig,
    session: Option<&PlayerSession>,
    players: &BTreeMap<String, LeaderboardEntry>,
    rumors: &[Rumor],
) -> String {
    let mut out = String::new();
    out.push_str("================= LUCERIUM 2025 =================\n");
    match session {
        None => {
            out.push_str("No player registered. Join with: register <name>\n");
        }
        Some(session) => {
            out.push_str(&format!(
                "Player: {} (registered {})\n",
                session.player,
                session.registered_at.format("%Y-%m-%d %H:%M UTC")
            ));
            out.push_str(&format!("Cash in hand (₹): {}\n", session.cash));
            if let Some(prediction) = &session.prediction {
                out.push_str(&format!("Prediction: {}\n", prediction.message));
            }
            if session.completed {
                out.push_str(
                    "Competition completed! The winner is the one with the highest net worth.\n",
                );
            }
            if let Some(round) = config.round(session.round) {
                out.push_str(&format!(
                    "Round {} of {} (password hint: \"{}\")\n\n",
                    session.round,
                    config.final_round(),
                    round.password
                ));
                out.push_str(&news_list(round));
                out.push_str(&rumor_list(rumors));
                out.push_str(&quotes_table(round));
                out.push_str(&summary_block(session));
                out.push_str(&portfolio_table(session, round));
                out.push_str(&format!("Net worth (₹): {}\n", net_worth(session, round)));
            }
        }
    }
    out.push_str(&leaderboard_table(
        players,
        session.map(|s| s.player.as_str()),
    ));
    out
}

/// Headlines for the round.
pub fn news_list(round: &RoundSpec) -> String {
    let mut out = String::from("News for this round:\n");
    for item in &round.news {
        out.push_str(&format!("  - {item}\n"));
    }
    out
}

/// The most recent rumors, newest first. Empty when nothing was submitted.
pub fn rumor_list(rumors: &[Rumor]) -> String {
    let shown = latest(rumors, RUMORS_SHOWN);
    if shown.is_empty() {
        return String::new();
    }
    let mut out = String::from("Rumors:\n");
    for rumor in shown {
        out.push_str(&format!("  - {}: {}\n", rumor.source, rumor.text));
    }
    out
}

/// Quote table for the round.
pub fn quotes_table(round: &RoundSpec) -> String {
    let mut out = String::from("Current stock prices (₹):\n");
    for (company, price) in &round.prices {
        out.push_str(&format!("  {company:<16} {price:>8}\n"));
    }
    out
}

/// One-line spending summary for the session's current round.
pub fn summary_block(session: &PlayerSession) -> String {
    let summary = round_summary(session);
    format!(
        "Transaction summary (round {}): spent {} | received {} | net {}\n",
        summary.round,
        summary.spent,
        summary.received,
        summary.net_flow()
    )
}

/// Portfolio table, hiding zero-share entries and valuing delisted
/// holdings at zero.
pub fn portfolio_table(session: &PlayerSession, round: &RoundSpec) -> String {
    let rows = holdings(session, round);
    if rows.is_empty() {
        return String::from("No shares owned in the current round.\n");
    }
    let mut out = String::from("Portfolio:\n");
    out.push_str(&format!(
        "  {:<16} {:>8} {:>8} {:>10} {:>10} {:>10}\n",
        "Company", "Price", "Shares", "Spent", "Received", "Value"
    ));
    let mut total = Decimal::ZERO;
    for row in &rows {
        total += row.market_value;
        out.push_str(&format!(
            "  {:<16} {:>8} {:>8} {:>10} {:>10} {:>10}\n",
            row.company, row.price, row.shares, row.total_spent, row.total_received, row.market_value
        ));
    }
    out.push_str(&format!("Total portfolio value (₹): {total}\n"));
    out
}

/// Expert table; fees only, credibility is for the player to guess.
pub fn experts_table(config: &GameConfig) -> String {
    let mut out = String::from("Experts for hire:\n");
    for expert in &config.experts {
        out.push_str(&format!("  {:<12} fee (₹) {:>8}\n", expert.name, expert.fee));
    }
    out
}

/// Leaderboard sorted descending by net worth, current player marked.
pub fn leaderboard_table(
    players: &BTreeMap<String, LeaderboardEntry>,
    current: Option<&str>,
) -> String {
    let mut out = String::from("Leaderboard:\n");
    if players.is_empty() {
        out.push_str("  (no players yet)\n");
        return out;
    }
    for (idx, entry) in ranked(players).iter().enumerate() {
        let marker = if current == Some(entry.player.as_str()) {
            ">"
        } else {
            " "
        };
        out.push_str(&format!(
            "{marker}{rank:>3}. {player:<16} {net_worth:>10}  round {round}\n",
            rank = idx + 1,
            player = entry.player,
            net_worth = entry.net_worth,
            round = entry.round
        ));
    }
    out
}
