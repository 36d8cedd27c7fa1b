#![deny(warnings)]

//! Interactive terminal front-end for the Lucerium trading game.
//!
//! Every mutating command re-renders the full page from current state, so
//! the view on screen is always a function of the session alone.

mod render;

use anyhow::{Context, Result};
use game_core::{validate_config, CompanyId, GameConfig, PlayerSession, Rumor};
use persistence::{LeaderboardEntry, LeaderboardStore, RumorStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Commands:
  register <name>              join the competition
  buy <shares> <company>       buy shares at the current price
  sell <shares> <company>      sell held shares at the current price
  experts                      list experts and their fees
  predict <expert>             pay an expert for a prediction
  rumor [--source=<s>] <text>  submit a rumor (anonymous by default)
  submit [password] --confirm  submit the round and move on
  calc <a> <+|-|*|/> <b>       the trusty sidebar calculator
  quotes | news | portfolio | summary | worth | rumors | leaderboard
  dump                         print the session as JSON
  reset                        admin: discard all in-session state
  help | quit
";

const NOT_REGISTERED: &str = "no player registered yet; join with: register <name>";

/// What a dispatched command asks the main loop to do.
enum Action {
    /// Print a message only; state unchanged.
    Print(String),
    /// Re-render the full page, optionally after a banner line.
    Rerender(Option<String>),
    /// Leave the loop.
    Quit,
}

struct App {
    config: GameConfig,
    session: Option<PlayerSession>,
    players: BTreeMap<String, LeaderboardEntry>,
    leaderboard: LeaderboardStore,
    rumor_store: RumorStore,
    rng: ChaCha8Rng,
}

impl App {
    fn new(config: GameConfig, data_dir: &Path) -> Result<Self> {
        let leaderboard = LeaderboardStore::new(data_dir.join("leaderboard.csv"));
        let rumor_store = RumorStore::new(data_dir.join("rumors.csv"));
        let players = leaderboard.load()?;
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Ok(Self {
            config,
            session: None,
            players,
            leaderboard,
            rumor_store,
            rng,
        })
    }

    /// Render the full page. Rumors are re-read from the shared file on
    /// every render so submissions from other sessions show up.
    fn view(&self) -> String {
        let rumors = match self.rumor_store.load() {
            Ok(rumors) => rumors,
            Err(e) => {
                warn!(error = %e, "failed to read rumor file");
                Vec::new()
            }
        };
        render::view(&self.config, self.session.as_ref(), &self.players, &rumors)
    }

    fn dispatch(&mut self, line: &str) -> Result<Action> {
        let (cmd, rest) = split_first(line);
        match cmd {
            "" => Ok(Action::Print(String::new())),
            "help" => Ok(Action::Print(HELP.to_string())),
            "quit" | "exit" => Ok(Action::Quit),
            "register" => self.cmd_register(rest),
            "buy" => self.cmd_trade(rest, true),
            "sell" => self.cmd_trade(rest, false),
            "experts" => Ok(Action::Print(render::experts_table(&self.config))),
            "predict" => self.cmd_predict(rest),
            "rumor" => self.cmd_rumor(rest),
            "submit" => self.cmd_submit(rest),
            "calc" => Ok(cmd_calc(rest)),
            "quotes" | "news" | "portfolio" | "summary" | "worth" => self.cmd_section(cmd),
            "rumors" => Ok(Action::Print(self.rumor_section())),
            "leaderboard" => Ok(Action::Print(render::leaderboard_table(
                &self.players,
                self.session.as_ref().map(|s| s.player.as_str()),
            ))),
            "dump" => self.cmd_dump(),
            "reset" => self.cmd_reset(),
            _ => Ok(Action::Print(format!(
                "unknown command: {cmd} (try \"help\")"
            ))),
        }
    }

    fn cmd_register(&mut self, rest: &str) -> Result<Action> {
        if let Some(session) = &self.session {
            return Ok(Action::Print(format!(
                "already registered as {}",
                session.player
            )));
        }
        let session = match PlayerSession::register(rest, &self.config) {
            Ok(session) => session,
            Err(e) => return Ok(Action::Print(format!("error: {e}"))),
        };
        self.players.insert(
            session.player.clone(),
            LeaderboardEntry {
                player: session.player.clone(),
                net_worth: Decimal::ZERO,
                round: session.round,
            },
        );
        self.leaderboard.save(&self.players)?;
        let banner = format!("Welcome, {}!", session.player);
        info!(player = %session.player, "player registered");
        self.session = Some(session);
        Ok(Action::Rerender(Some(banner)))
    }

    fn cmd_trade(&mut self, rest: &str, is_buy: bool) -> Result<Action> {
        let usage = if is_buy {
            "usage: buy <shares> <company>"
        } else {
            "usage: sell <shares> <company>"
        };
        let Some(session) = self.session.as_mut() else {
            return Ok(Action::Print(NOT_REGISTERED.to_string()));
        };
        let (shares, name) = split_first(rest);
        let Ok(shares) = shares.parse::<u64>() else {
            return Ok(Action::Print(usage.to_string()));
        };
        if name.is_empty() {
            return Ok(Action::Print(usage.to_string()));
        }
        let company = CompanyId(name.to_string());
        let round = self
            .config
            .round(session.round)
            .context("active round missing from configuration")?;
        let Some(price) = round.price(&company) else {
            return Ok(Action::Print(format!(
                "{company} is not quoted in round {}",
                session.round
            )));
        };
        let result = if is_buy {
            game_engine::buy(session, &company, shares, price)
        } else {
            game_engine::sell(session, &company, shares, price)
        };
        match result {
            Ok(()) => {
                let verb = if is_buy { "bought" } else { "sold" };
                Ok(Action::Rerender(Some(format!(
                    "Successfully {verb} {shares} shares of {company}!"
                ))))
            }
            Err(e) => Ok(Action::Print(format!("error: {e}"))),
        }
    }

    fn cmd_predict(&mut self, rest: &str) -> Result<Action> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Action::Print(NOT_REGISTERED.to_string()));
        };
        if rest.is_empty() {
            return Ok(Action::Print("usage: predict <expert>".to_string()));
        }
        match game_engine::consult_expert(session, rest, &self.config, &mut self.rng) {
            Ok(prediction) => Ok(Action::Rerender(Some(format!(
                "{}\nRemaining cash (₹): {}",
                prediction.message, session.cash
            )))),
            Err(e) => Ok(Action::Print(format!("error: {e}"))),
        }
    }

    fn cmd_rumor(&mut self, rest: &str) -> Result<Action> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Action::Print(NOT_REGISTERED.to_string()));
        };
        let (source, text) = match rest.strip_prefix("--source=") {
            Some(stripped) => {
                let (source, text) = split_first(stripped);
                (Some(source), text)
            }
            None => (None, rest),
        };
        let rumor = match Rumor::new(source, text) {
            Ok(rumor) => rumor,
            Err(e) => return Ok(Action::Print(format!("error: {e}"))),
        };
        session.rumors.push(rumor);
        // The file reflects this session's view only; the last writer wins.
        self.rumor_store.save(&session.rumors)?;
        Ok(Action::Rerender(Some(
            "Rumor submitted successfully!".to_string(),
        )))
    }

    fn cmd_submit(&mut self, rest: &str) -> Result<Action> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Action::Print(NOT_REGISTERED.to_string()));
        };
        let mut password = "";
        let mut confirmed = false;
        for token in rest.split_whitespace() {
            match token {
                "--confirm" => confirmed = true,
                other => password = other,
            }
        }
        let final_round = self.config.final_round();
        if session.round < final_round {
            match game_engine::advance_round(session, password, confirmed, &self.config) {
                Ok(advance) => {
                    self.players.insert(
                        session.player.clone(),
                        LeaderboardEntry {
                            player: session.player.clone(),
                            net_worth: advance.net_worth,
                            round: advance.new_round,
                        },
                    );
                    self.leaderboard.save(&self.players)?;
                    Ok(Action::Rerender(Some(format!(
                        "Round {} submitted successfully! Now play round {}.",
                        advance.submitted_round, advance.new_round
                    ))))
                }
                Err(e) => Ok(Action::Print(format!("error: {e}"))),
            }
        } else {
            match game_engine::finish_competition(session, password, confirmed, &self.config) {
                Ok(standing) => {
                    self.players.insert(
                        session.player.clone(),
                        LeaderboardEntry {
                            player: session.player.clone(),
                            net_worth: standing.net_worth,
                            round: standing.round,
                        },
                    );
                    self.leaderboard.save(&self.players)?;
                    Ok(Action::Rerender(Some(
                        "Competition completed! The winner is the one with the highest net worth."
                            .to_string(),
                    )))
                }
                Err(e) => Ok(Action::Print(format!("error: {e}"))),
            }
        }
    }

    fn cmd_section(&self, cmd: &str) -> Result<Action> {
        let Some(session) = self.session.as_ref() else {
            return Ok(Action::Print(NOT_REGISTERED.to_string()));
        };
        let round = self
            .config
            .round(session.round)
            .context("active round missing from configuration")?;
        let text = match cmd {
            "quotes" => render::quotes_table(round),
            "news" => render::news_list(round),
            "portfolio" => render::portfolio_table(session, round),
            "summary" => render::summary_block(session),
            _ => format!("Net worth (₹): {}\n", game_engine::net_worth(session, round)),
        };
        Ok(Action::Print(text))
    }

    fn rumor_section(&self) -> String {
        match self.rumor_store.load() {
            Ok(rumors) if !rumors.is_empty() => render::rumor_list(&rumors),
            Ok(_) => "No rumors yet.\n".to_string(),
            Err(e) => format!("error: {e}"),
        }
    }

    fn cmd_dump(&self) -> Result<Action> {
        let Some(session) = self.session.as_ref() else {
            return Ok(Action::Print(NOT_REGISTERED.to_string()));
        };
        let json = serde_json::to_string_pretty(session)?;
        Ok(Action::Print(json))
    }

    fn cmd_reset(&mut self) -> Result<Action> {
        self.session = None;
        self.players = self.leaderboard.load()?;
        info!("game reset");
        Ok(Action::Rerender(Some(
            "Game reset successfully! Register to start over.".to_string(),
        )))
    }
}

fn split_first(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    }
}

fn cmd_calc(rest: &str) -> Action {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let usage = "usage: calc <a> <+|-|*|/> <b>";
    let [lhs, op, rhs] = tokens.as_slice() else {
        return Action::Print(usage.to_string());
    };
    let (Ok(lhs), Ok(rhs)) = (lhs.parse::<Decimal>(), rhs.parse::<Decimal>()) else {
        return Action::Print(usage.to_string());
    };
    let Some(op) = game_engine::CalcOp::parse(op) else {
        return Action::Print("invalid operation".to_string());
    };
    match game_engine::calculate(lhs, op, rhs) {
        Ok(result) => Action::Print(format!("Result: {result}")),
        Err(e) => Action::Print(format!("error: {e}")),
    }
}

fn parse_args() -> (Option<PathBuf>, PathBuf) {
    let mut config: Option<PathBuf> = None;
    let mut data_dir = PathBuf::from(".");
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => config = it.next().map(PathBuf::from),
            "--data-dir" => {
                if let Some(dir) = it.next() {
                    data_dir = PathBuf::from(dir);
                }
            }
            _ => {}
        }
    }
    (config, data_dir)
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => GameConfig::standard(),
    };
    validate_config(&config)?;
    Ok(config)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let (config_path, data_dir) = parse_args();
    let config = load_config(config_path.as_deref())?;
    info!(
        rounds = config.rounds.len(),
        experts = config.experts.len(),
        data_dir = %data_dir.display(),
        "starting lucerium"
    );

    let mut app = App::new(config, &data_dir)?;
    let stdout = io::stdout();
    print!("{}", app.view());
    prompt(&stdout)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match app.dispatch(line.trim()) {
            Ok(Action::Quit) => break,
            Ok(Action::Print(text)) => {
                if !text.is_empty() {
                    println!("{text}");
                }
            }
            Ok(Action::Rerender(banner)) => {
                if let Some(banner) = banner {
                    println!("{banner}");
                }
                print!("{}", app.view());
            }
            Err(e) => println!("error: {e:#}"),
        }
        prompt(&stdout)?;
    }
    Ok(())
}

fn prompt(stdout: &io::Stdout) -> Result<()> {
    let mut handle = stdout.lock();
    write!(handle, "> ")?;
    handle.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD_VARIANT: &str = r#"
starting_cash: 100000
rng_seed: 7
rounds:
  - number: 1
    prices:
      Company A: 100
      Company B: 150
    news:
      - "Company A announces record profits!"
    password: ""
  - number: 2
    prices:
      Company A: 110
    news: []
    password: "crocus"
  - number: 3
    prices:
      Company A: 120
    news: []
    password: "tulip"
experts:
  - name: "Expert 1"
    fee: 50000
    accuracy: 0.8
"#;

    #[test]
    fn yaml_config_variant_with_round_passwords() {
        let config: GameConfig = serde_yaml::from_str(PASSWORD_VARIANT).unwrap();
        validate_config(&config).unwrap();
        assert_eq!(config.final_round(), 3);
        assert_eq!(config.round(2).unwrap().password, "crocus");
        assert_eq!(
            config.round(1).unwrap().price(&CompanyId("Company B".into())),
            Some(Decimal::new(150, 0))
        );
    }

    #[test]
    fn command_words_split_off_their_arguments() {
        assert_eq!(split_first("buy 10 Company A"), ("buy", "10 Company A"));
        assert_eq!(split_first("quit"), ("quit", ""));
        assert_eq!(split_first(""), ("", ""));
    }

    #[test]
    fn calculator_reports_division_by_zero() {
        match cmd_calc("5 / 0") {
            Action::Print(text) => assert_eq!(text, "error: division by zero"),
            _ => panic!("calculator must not re-render"),
        }
        match cmd_calc("6 * 7") {
            Action::Print(text) => assert_eq!(text, "Result: 42"),
            _ => panic!("calculator must not re-render"),
        }
    }
}
