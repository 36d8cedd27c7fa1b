use criterion::{criterion_group, criterion_main, Criterion};
use game_core::{CompanyId, GameConfig, PlayerSession, RoundSpec};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn bench_net_worth(c: &mut Criterion) {
    let config = GameConfig::standard();
    let mut session = PlayerSession::register("Bench", &config).unwrap();
    session.cash = Decimal::new(100_000_000, 0);
    let mut prices = BTreeMap::new();
    for i in 0..200i64 {
        let company = CompanyId(format!("Company {i}"));
        let price = Decimal::new(100 + i, 0);
        prices.insert(company.clone(), price);
        game_engine::buy(&mut session, &company, 10, price).unwrap();
    }
    let round = RoundSpec {
        number: 1,
        prices,
        news: vec![],
        password: String::new(),
    };
    c.bench_function("net_worth", |b| {
        b.iter(|| game_engine::net_worth(&session, &round))
    });
}

criterion_group!(benches, bench_net_worth);
criterion_main!(benches);
