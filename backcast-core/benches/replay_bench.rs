//! Criterion benchmark for the replay hot path.

use backcast_core::domain::{Event, EventFactory, FilledOrder, Instrument, OrderSide};
use backcast_core::engine::{Engine, EngineConfig};
use chrono::{Duration, NaiveDate, NaiveTime};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;

/// One deposit, one small fill, and one price update per day.
fn make_events(days: usize) -> Vec<Event> {
    let mut factory = EventFactory::new();
    let start = NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_time(NaiveTime::MIN)
        .and_utc();
    let instrument = Instrument::stock("SPY");
    let mut events = Vec::with_capacity(days * 3);

    for i in 0..days {
        let ts = start + Duration::days(i as i64);
        let price = 100.0 + (i as f64 * 0.1).sin() * 10.0;
        events.push(factory.cash_flow_change(ts, 1_000.0));
        let fill = FilledOrder::new(instrument.clone(), OrderSide::Buy, 1.0, price, ts, 0.0005);
        events.push(factory.filled_order(ts, fill));
        events.push(factory.price_update(ts, HashMap::from([("SPY".to_string(), price)])));
    }
    events
}

fn bench_replay(c: &mut Criterion) {
    let events = make_events(2_520);
    c.bench_function("replay_10y_daily", |b| {
        b.iter(|| {
            let engine = Engine::new(EngineConfig::new(0.0), HashMap::new());
            black_box(
                engine
                    .replay(black_box(events.clone()))
                    .expect("replay should succeed"),
            )
        })
    });
}

criterion_group!(benches, bench_replay);
criterion_main!(benches);
