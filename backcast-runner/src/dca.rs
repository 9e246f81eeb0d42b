//! Dollar-cost-averaging schedule — the event stream for a recurring
//! deposit-and-buy strategy.

use backcast_core::data::PriceSeries;
use backcast_core::domain::{Event, EventFactory, FilledOrder, Instrument, OrderSide};
use backcast_core::metrics::Frequency;
use chrono::{Duration, NaiveDate, NaiveTime};
use thiserror::Error;
use tracing::warn;

/// Periodic contribution plan for one stock.
#[derive(Debug, Clone)]
pub struct DcaPlan {
    pub ticker: String,
    /// Cash deposited at each period, fully spent on the buy net of
    /// commission.
    pub contribution: f64,
    pub cadence: Frequency,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub commission_rate: f64,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("unsupported cadence {0:?} for a DCA schedule")]
    UnsupportedCadence(Frequency),
}

impl DcaPlan {
    /// Build the time-ordered event stream: each period, a deposit followed
    /// by a buy at that day's close. Days with no bar (weekends, holidays)
    /// are skipped with a warning.
    pub fn build_events(
        &self,
        factory: &mut EventFactory,
        series: &PriceSeries,
    ) -> Result<Vec<Event>, ScheduleError> {
        let step = match self.cadence {
            Frequency::Day => Duration::days(1),
            Frequency::Week => Duration::weeks(1),
            Frequency::Month => Duration::days(30),
            other => return Err(ScheduleError::UnsupportedCadence(other)),
        };

        let instrument = Instrument::stock(self.ticker.clone());
        let mut events = Vec::new();
        let mut day = self.start_date;
        while day <= self.end_date {
            let day_start = day.and_time(NaiveTime::MIN).and_utc();
            let day_end = day_start + Duration::days(1);
            match series.range(day_start, day_end).last() {
                Some(bar) => {
                    let close = bar.close;
                    events.push(factory.cash_flow_change(bar.ts, self.contribution));
                    // Sized so order value plus commission equals the deposit.
                    let quantity = self.contribution / (close * (1.0 + self.commission_rate));
                    let fill = FilledOrder::new(
                        instrument.clone(),
                        OrderSide::Buy,
                        quantity,
                        close,
                        bar.ts,
                        self.commission_rate,
                    );
                    events.push(factory.filled_order(bar.ts, fill));
                }
                None => {
                    warn!(ticker = %self.ticker, %day, "no bar for contribution day, skipping period");
                }
            }
            day = day + step;
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backcast_core::data::Bar;
    use backcast_core::domain::EventKind;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            ts: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap()
                .and_utc(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    fn plan(cadence: Frequency) -> DcaPlan {
        DcaPlan {
            ticker: "SPY".into(),
            contribution: 1_000.0,
            cadence,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            commission_rate: 0.0,
        }
    }

    #[test]
    fn deposit_precedes_buy_every_period() {
        let series = PriceSeries::new("SPY", vec![bar(2, 100.0), bar(3, 110.0), bar(4, 120.0)]);
        let mut factory = EventFactory::new();
        let events = plan(Frequency::Day).build_events(&mut factory, &series).unwrap();

        assert_eq!(events.len(), 6);
        for pair in events.chunks(2) {
            assert!(matches!(pair[0].kind, EventKind::CashFlowChange { .. }));
            assert!(matches!(pair[1].kind, EventKind::FilledOrder(_)));
            assert!(pair[0].id < pair[1].id);
            assert_eq!(pair[0].ts, pair[1].ts);
        }
    }

    #[test]
    fn buy_consumes_the_whole_deposit() {
        let series = PriceSeries::new("SPY", vec![bar(2, 100.0)]);
        let mut factory = EventFactory::new();
        let mut p = plan(Frequency::Day);
        p.end_date = p.start_date;
        p.commission_rate = 0.001;
        let events = p.build_events(&mut factory, &series).unwrap();

        let EventKind::FilledOrder(fill) = &events[1].kind else {
            panic!("expected a fill");
        };
        let spent = fill.order_value() + fill.commission();
        assert!((spent - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn days_without_bars_are_skipped() {
        // Only the middle day has a bar.
        let series = PriceSeries::new("SPY", vec![bar(3, 110.0)]);
        let mut factory = EventFactory::new();
        let events = plan(Frequency::Day).build_events(&mut factory, &series).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn intraday_cadence_is_rejected() {
        let series = PriceSeries::new("SPY", vec![bar(2, 100.0)]);
        let mut factory = EventFactory::new();
        assert!(matches!(
            plan(Frequency::Hour).build_events(&mut factory, &series),
            Err(ScheduleError::UnsupportedCadence(Frequency::Hour))
        ));
    }
}
