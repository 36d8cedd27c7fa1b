//! Paid expert predictions.
//!
//! An expert is flavor text only: the fee is real, the directional call is
//! a random draw against the expert's fixed accuracy, and nothing about
//! the price tables changes.

use crate::GameError;
use game_core::{Direction, GameConfig, PlayerSession, Prediction};
use rand::Rng;
use tracing::debug;

/// Consult an expert, deducting their fee and storing the resulting
/// prediction on the session.
///
/// Fails with [`GameError::UnknownExpert`] for an id missing from the
/// table and with [`GameError::InsufficientFunds`] when cash is below the
/// fee; cash exactly equal to the fee is enough. The fee is deducted
/// unconditionally once those checks pass, whatever the draw says.
pub fn consult_expert(
    session: &mut PlayerSession,
    expert: &str,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Result<Prediction, GameError> {
    let spec = config
        .expert(expert)
        .ok_or_else(|| GameError::UnknownExpert(expert.to_string()))?;
    if session.cash < spec.fee {
        return Err(GameError::InsufficientFunds {
            needed: spec.fee,
            available: session.cash,
        });
    }
    session.cash -= spec.fee;

    let direction = if rng.gen::<f64>() < f64::from(spec.accuracy) {
        Direction::Rise
    } else {
        Direction::Fall
    };
    let message = match direction {
        Direction::Rise => format!(
            "{}'s prediction: The stock prices will rise in the next round!",
            spec.name
        ),
        Direction::Fall => format!(
            "{}'s prediction: The stock prices will fall in the next round.",
            spec.name
        ),
    };
    let prediction = Prediction {
        expert: spec.name.clone(),
        direction,
        message,
    };
    session.prediction = Some(prediction.clone());
    debug!(player = %session.player, expert = %spec.name, ?direction, "expert consulted");
    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::GameConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal::Decimal;

    fn setup() -> (PlayerSession, GameConfig, ChaCha8Rng) {
        let config = GameConfig::standard();
        let session = PlayerSession::register("Asha", &config).unwrap();
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        (session, config, rng)
    }

    #[test]
    fn unknown_experts_are_rejected() {
        let (mut session, config, mut rng) = setup();
        assert_eq!(
            consult_expert(&mut session, "Expert 9", &config, &mut rng),
            Err(GameError::UnknownExpert("Expert 9".into()))
        );
        assert_eq!(session.cash, Decimal::new(100_000, 0));
        assert!(session.prediction.is_none());
    }

    #[test]
    fn fee_is_deducted_exactly_once_per_call() {
        let (mut session, config, mut rng) = setup();
        consult_expert(&mut session, "Expert 2", &config, &mut rng).unwrap();
        assert_eq!(session.cash, Decimal::new(70_000, 0));
        consult_expert(&mut session, "Expert 3", &config, &mut rng).unwrap();
        assert_eq!(session.cash, Decimal::new(69_000, 0));
        assert!(session.prediction.is_some());
    }

    #[test]
    fn cash_equal_to_the_fee_is_enough() {
        let (mut session, config, mut rng) = setup();
        session.cash = Decimal::new(50_000, 0);
        consult_expert(&mut session, "Expert 1", &config, &mut rng).unwrap();
        assert_eq!(session.cash, Decimal::ZERO);
    }

    #[test]
    fn cash_below_the_fee_deducts_nothing() {
        let (mut session, config, mut rng) = setup();
        session.cash = Decimal::new(49_999, 0);
        assert_eq!(
            consult_expert(&mut session, "Expert 1", &config, &mut rng),
            Err(GameError::InsufficientFunds {
                needed: Decimal::new(50_000, 0),
                available: Decimal::new(49_999, 0),
            })
        );
        assert_eq!(session.cash, Decimal::new(49_999, 0));
        assert!(session.prediction.is_none());
    }

    #[test]
    fn accuracy_extremes_pin_the_direction() {
        let (mut session, mut config, mut rng) = setup();
        config.experts[0].accuracy = 1.0;
        config.experts[0].fee = Decimal::ONE;
        config.experts[1].accuracy = 0.0;
        config.experts[1].fee = Decimal::ONE;
        for _ in 0..16 {
            let p = consult_expert(&mut session, "Expert 1", &config, &mut rng).unwrap();
            assert_eq!(p.direction, Direction::Rise);
            let p = consult_expert(&mut session, "Expert 2", &config, &mut rng).unwrap();
            assert_eq!(p.direction, Direction::Fall);
        }
    }
}
