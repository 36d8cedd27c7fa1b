#![deny(warnings)]

//! Core domain models and invariants for the Lucerium trading game.
//!
//! This crate defines serializable types used across the game with
//! validation helpers to guarantee basic invariants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Maximum accepted length of a rumor text, matching the submission form.
pub const MAX_RUMOR_LEN: usize = 200;

/// Default source attributed to rumors submitted without one.
pub const ANONYMOUS_SOURCE: &str = "Anonymous";

/// Unique identifier for a listed company, e.g. "Company A".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One fixed phase of the game: quoted prices, news items, and the
/// static password gating progression out of the round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundSpec {
    /// Round number, 1-based and contiguous.
    pub number: u8,
    /// Quoted price per company. Companies absent here are delisted.
    pub prices: BTreeMap<CompanyId, Decimal>,
    /// Headlines shown for the round.
    pub news: Vec<String>,
    /// Password required to submit the round. May be empty.
    pub password: String,
}

impl RoundSpec {
    /// Quoted price for a company, or `None` when it is delisted this round.
    pub fn price(&self, company: &CompanyId) -> Option<Decimal> {
        self.prices.get(company).copied()
    }
}

/// A paid flavor-text generator with a fixed fee and hit probability.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpertSpec {
    /// Display name, also the lookup key.
    pub name: String,
    /// Fee deducted per consultation.
    pub fee: Decimal,
    /// Probability of an optimistic call, in [0, 1].
    pub accuracy: f32,
}

/// Static game configuration loaded once at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Cash every player starts with.
    pub starting_cash: Decimal,
    /// Seed for deterministic expert draws.
    pub rng_seed: u64,
    /// Ordered round tables; fixed for the whole game.
    pub rounds: Vec<RoundSpec>,
    /// Available experts.
    pub experts: Vec<ExpertSpec>,
}

impl GameConfig {
    /// Lookup a round table by number.
    pub fn round(&self, number: u8) -> Option<&RoundSpec> {
        self.rounds.iter().find(|r| r.number == number)
    }

    /// Number of the last round.
    pub fn final_round(&self) -> u8 {
        self.rounds.last().map(|r| r.number).unwrap_or(0)
    }

    /// Lookup an expert by name.
    pub fn expert(&self, name: &str) -> Option<&ExpertSpec> {
        self.experts.iter().find(|e| e.name == name)
    }

    /// The classroom tables: three rounds over two or three companies,
    /// open passwords, and three experts of wildly varying credibility.
    pub fn standard() -> Self {
        fn table(entries: &[(&str, i64)]) -> BTreeMap<CompanyId, Decimal> {
            entries
                .iter()
                .map(|(name, price)| (CompanyId(name.to_string()), Decimal::new(*price, 0)))
                .collect()
        }
        fn lines(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        GameConfig {
            starting_cash: Decimal::new(100_000, 0),
            rng_seed: 42,
            rounds: vec![
                RoundSpec {
                    number: 1,
                    prices: table(&[("Company A", 100), ("Company B", 150), ("Company C", 200)]),
                    news: lines(&[
                        "Company A announces record profits!",
                        "Company B faces regulatory scrutiny.",
                        "Company C launches a new product line.",
                    ]),
                    password: String::new(),
                },
                RoundSpec {
                    number: 2,
                    prices: table(&[("Company A", 110), ("Company B", 140), ("Company C", 210)]),
                    news: lines(&[
                        "Company A's profits decline due to market conditions.",
                        "Company B resolves regulatory issues and gains investor confidence.",
                        "Company C's new product receives mixed reviews.",
                    ]),
                    password: String::new(),
                },
                RoundSpec {
                    number: 3,
                    prices: table(&[("Company A", 120), ("Company B", 130)]),
                    news: lines(&[
                        "Company A's stock surges after a major partnership.",
                        "Company B's stock drops due to unexpected losses.",
                        "Company C is delisted from the stock exchange.",
                    ]),
                    password: String::new(),
                },
            ],
            experts: vec![
                ExpertSpec {
                    name: "Expert 1".to_string(),
                    fee: Decimal::new(50_000, 0),
                    accuracy: 0.8,
                },
                ExpertSpec {
                    name: "Expert 2".to_string(),
                    fee: Decimal::new(30_000, 0),
                    accuracy: 0.49,
                },
                ExpertSpec {
                    name: "Expert 3".to_string(),
                    fee: Decimal::new(1_000, 0),
                    accuracy: 0.21,
                },
            ],
        }
    }
}

/// Per-company holdings. Created on first buy and retained even at zero
/// shares; display layers hide empty entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    /// Shares currently held.
    pub shares: u64,
    /// Cumulative amount spent buying this company.
    pub total_spent: Decimal,
    /// Cumulative amount received selling this company.
    pub total_received: Decimal,
}

/// A single buy or sell, appended to the session log and never mutated.
/// Exactly one of `shares_bought`/`shares_sold` is non-zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Round the trade happened in.
    pub round: u8,
    /// Traded company.
    pub company: CompanyId,
    /// Shares bought (zero for sells).
    pub shares_bought: u64,
    /// Shares sold (zero for buys).
    pub shares_sold: u64,
    /// Quoted price at trade time.
    pub price: Decimal,
}

/// Direction an expert predicts for the next round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Prices will rise.
    Rise,
    /// Prices will fall.
    Fall,
}

/// A purchased expert prediction. Flavor text only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Consulted expert.
    pub expert: String,
    /// Predicted direction.
    pub direction: Direction,
    /// Rendered message shown to the player.
    pub message: String,
}

/// A submitted rumor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rumor {
    /// Attribution, defaulting to [`ANONYMOUS_SOURCE`].
    pub source: String,
    /// Rumor text, non-empty and at most [`MAX_RUMOR_LEN`] chars.
    pub text: String,
}

impl Rumor {
    /// Build a rumor, applying the anonymous default and length limits.
    pub fn new(source: Option<&str>, text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyRumor);
        }
        if text.chars().count() > MAX_RUMOR_LEN {
            return Err(ValidationError::RumorTooLong(text.chars().count()));
        }
        let source = match source.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => ANONYMOUS_SOURCE.to_string(),
        };
        Ok(Rumor {
            source,
            text: text.to_string(),
        })
    }
}

/// Mutable per-player state for one browser-session-equivalent run.
///
/// Passed by reference everywhere; created on registration and discarded
/// by the admin reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSession {
    /// Registered player name.
    pub player: String,
    /// When the session was created.
    pub registered_at: DateTime<Utc>,
    /// Active round number.
    pub round: u8,
    /// Cash in hand. Never negative: purchases are checked up front.
    pub cash: Decimal,
    /// Holdings per company.
    pub portfolio: BTreeMap<CompanyId, PortfolioEntry>,
    /// Append-only trade log.
    pub transactions: Vec<Transaction>,
    /// Last purchased prediction, cleared on round submission.
    pub prediction: Option<Prediction>,
    /// Round-scoped rumors, cleared on round submission.
    pub rumors: Vec<Rumor>,
    /// Set once the final round has been submitted.
    pub completed: bool,
}

impl PlayerSession {
    /// Register a new player with the configured starting cash.
    pub fn register(name: &str, config: &GameConfig) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(PlayerSession {
            player: name.to_string(),
            registered_at: Utc::now(),
            round: 1,
            cash: config.starting_cash,
            portfolio: BTreeMap::new(),
            transactions: Vec::new(),
            prediction: None,
            rumors: Vec::new(),
            completed: false,
        })
    }

    /// Shares currently held in a company (zero when never bought).
    pub fn shares_held(&self, company: &CompanyId) -> u64 {
        self.portfolio.get(company).map(|e| e.shares).unwrap_or(0)
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Configuration must define at least one round.
    #[error("configuration defines no rounds")]
    NoRounds,
    /// Round numbers must be contiguous starting at 1.
    #[error("round {0} is out of sequence")]
    RoundOutOfSequence(u8),
    /// Quoted prices must be strictly positive.
    #[error("non-positive price for {0}")]
    NonPositivePrice(String),
    /// Monetary amounts must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Expert accuracy must be a finite probability.
    #[error("expert accuracy {0} is not within [0, 1]")]
    InvalidAccuracy(f32),
    /// Expert names must be unique.
    #[error("duplicate expert: {0}")]
    DuplicateExpert(String),
    /// Names must be non-empty.
    #[error("empty name")]
    EmptyName,
    /// Rumor text must be non-empty.
    #[error("rumor text is empty")]
    EmptyRumor,
    /// Rumor text is limited to [`MAX_RUMOR_LEN`] chars.
    #[error("rumor text of {0} chars exceeds the limit")]
    RumorTooLong(usize),
}

/// Validate a full game configuration, including round ordering and the
/// expert table.
pub fn validate_config(config: &GameConfig) -> Result<(), ValidationError> {
    if config.rounds.is_empty() {
        return Err(ValidationError::NoRounds);
    }
    if config.starting_cash < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    for (idx, round) in config.rounds.iter().enumerate() {
        if usize::from(round.number) != idx + 1 {
            return Err(ValidationError::RoundOutOfSequence(round.number));
        }
        for (company, price) in &round.prices {
            if company.0.trim().is_empty() {
                return Err(ValidationError::EmptyName);
            }
            if *price <= Decimal::ZERO {
                return Err(ValidationError::NonPositivePrice(company.0.clone()));
            }
        }
    }
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for expert in &config.experts {
        if expert.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !names.insert(expert.name.as_str()) {
            return Err(ValidationError::DuplicateExpert(expert.name.clone()));
        }
        if expert.fee < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney);
        }
        if !expert.accuracy.is_finite() || !(0.0..=1.0).contains(&expert.accuracy) {
            return Err(ValidationError::InvalidAccuracy(expert.accuracy));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn standard_config_is_valid() {
        let config = GameConfig::standard();
        validate_config(&config).unwrap();
        assert_eq!(config.final_round(), 3);
        assert_eq!(config.starting_cash, Decimal::new(100_000, 0));
    }

    #[test]
    fn serde_roundtrip_config() {
        let config = GameConfig::standard();
        let s = serde_json::to_string_pretty(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(back.rounds.len(), 3);
        assert_eq!(back.experts.len(), 3);
        assert_eq!(
            back.round(1).unwrap().price(&CompanyId("Company A".into())),
            Some(Decimal::new(100, 0))
        );
    }

    #[test]
    fn company_c_is_delisted_in_round_three() {
        let config = GameConfig::standard();
        let c = CompanyId("Company C".into());
        assert!(config.round(2).unwrap().price(&c).is_some());
        assert_eq!(config.round(3).unwrap().price(&c), None);
    }

    #[test]
    fn registration_rejects_blank_names() {
        let config = GameConfig::standard();
        assert_eq!(
            PlayerSession::register("   ", &config),
            Err(ValidationError::EmptyName)
        );
        let session = PlayerSession::register("Asha", &config).unwrap();
        assert_eq!(session.round, 1);
        assert_eq!(session.cash, config.starting_cash);
        assert!(session.portfolio.is_empty());
        assert!(!session.completed);
    }

    #[test]
    fn rumor_defaults_and_limits() {
        let r = Rumor::new(None, "Company B is about to merge").unwrap();
        assert_eq!(r.source, ANONYMOUS_SOURCE);
        let r = Rumor::new(Some("  "), "short").unwrap();
        assert_eq!(r.source, ANONYMOUS_SOURCE);
        let r = Rumor::new(Some("Asha"), "short").unwrap();
        assert_eq!(r.source, "Asha");
        assert_eq!(Rumor::new(None, "  "), Err(ValidationError::EmptyRumor));
        let long = "x".repeat(MAX_RUMOR_LEN + 1);
        assert_eq!(
            Rumor::new(None, &long),
            Err(ValidationError::RumorTooLong(MAX_RUMOR_LEN + 1))
        );
    }

    #[test]
    fn out_of_sequence_rounds_rejected() {
        let mut config = GameConfig::standard();
        config.rounds[1].number = 5;
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::RoundOutOfSequence(5))
        );
    }

    #[test]
    fn bad_expert_table_rejected() {
        let mut config = GameConfig::standard();
        config.experts[0].accuracy = 1.5;
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::InvalidAccuracy(1.5))
        );

        let mut config = GameConfig::standard();
        config.experts[1].name = config.experts[0].name.clone();
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::DuplicateExpert(_))
        ));
    }

    #[test]
    fn zero_price_rejected() {
        let mut config = GameConfig::standard();
        config.rounds[0]
            .prices
            .insert(CompanyId("Company Z".into()), Decimal::ZERO);
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::NonPositivePrice("Company Z".into()))
        );
    }

    proptest! {
        #[test]
        fn any_probability_is_accepted(acc in 0.0f32..=1.0) {
            let mut config = GameConfig::standard();
            config.experts[0].accuracy = acc;
            prop_assert!(validate_config(&config).is_ok());
        }

        #[test]
        fn positive_prices_are_accepted(price in 1i64..1_000_000) {
            let mut config = GameConfig::standard();
            config.rounds[0]
                .prices
                .insert(CompanyId("Company Z".into()), Decimal::new(price, 0));
            prop_assert!(validate_config(&config).is_ok());
        }
    }
}
