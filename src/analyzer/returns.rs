use crate::analyzer::StrategyAnalyzer;
use crate::broker::StrategyContext;
use crate::data::BarSet;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

//receives the per-bar return notification from the tracker
pub trait ReturnsSink {
    fn on_returns(&mut self, bars: &BarSet, net_return: f64, cumulative_return: f64);
}

//computes the equally-weighted average single-period return across the
//instruments held at the end of the previous bar, compounds it over the
//run, and notifies the sink once per bar
#[derive(Debug)]
pub struct ReturnsTracker<S> {
    //previous bar's adjusted close per instrument
    prev_adj_close: IndexMap<String, f64>,

    //signed share counts at the end of the previous bar
    shares: IndexMap<String, i32>,

    //geometrically compounded since the first processed bar
    cumulative_return: f64,

    //the first bar only establishes the baseline
    first_bar_processed: bool,

    sink: S,
}

impl<S: ReturnsSink> ReturnsTracker<S> {
    //creates a tracker that notifies the given sink
    pub fn new(sink: S) -> Self {
        ReturnsTracker {
            prev_adj_close: IndexMap::new(),
            shares: IndexMap::new(),
            cumulative_return: 0.0,
            first_bar_processed: false,
            sink,
        }
    }

    //returns the compounded return since tracking began
    pub fn cumulative_return(&self) -> f64 {
        self.cumulative_return
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    //net return for the bar: mean of per-instrument single-period returns
    //over the positions carried from the previous bar
    fn calculate_returns(&mut self, bars: &BarSet) {
        let mut sum = 0.0;
        let mut count = 0u32;

        for (instrument, &shares) in &self.shares {
            let bar = match bars.bar(instrument) {
                Some(bar) => bar,
                None => continue,
            };

            if shares == 0 {
                continue;
            }

            //an instrument can turn active before a prior close is on
            //record; skipping it is steady-state behavior, not an error
            let prev_adj_close = match self.prev_adj_close.get(instrument) {
                Some(&price) => price,
                None => continue,
            };

            let mut partial_return = (bar.adjusted_close() - prev_adj_close) / prev_adj_close;

            //a price increase hurts a short position
            if shares < 0 {
                partial_return = -partial_return;
            }

            sum += partial_return;
            count += 1;
        }

        //no held, priced instruments this bar means a flat return
        let net_return = if count > 0 { sum / count as f64 } else { 0.0 };

        //compound, never sum
        self.cumulative_return = (1.0 + self.cumulative_return) * (1.0 + net_return) - 1.0;

        self.sink.on_returns(bars, net_return, self.cumulative_return);
    }
}

impl<S: ReturnsSink> StrategyAnalyzer for ReturnsTracker<S> {
    fn on_bars(&mut self, strat: &dyn StrategyContext, bars: &BarSet) {
        //skip the return computation on the very first bar
        if self.first_bar_processed {
            self.calculate_returns(bars);
        } else {
            self.first_bar_processed = true;
        }

        //snapshot the shares held at the end of this bar (full overwrite,
        //instruments no longer active are dropped)
        let broker = strat.broker();
        self.shares.clear();
        for instrument in broker.active_instruments() {
            let qty = broker.shares(&instrument);
            self.shares.insert(instrument, qty);
        }

        //record this bar's adjusted closes; instruments absent from this
        //bar set keep their last recorded close
        for bar in bars.iter() {
            self.prev_adj_close
                .insert(bar.symbol.clone(), bar.adjusted_close());
        }
    }
}

//a single recorded (timestamp, net return) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub timestamp: DateTime<Utc>,
    pub net_return: f64,
}

//reference sink: records the per-bar net returns in bar order
#[derive(Debug, Clone, Default)]
pub struct NetReturns {
    points: Vec<ReturnPoint>,
}

impl NetReturns {
    pub fn new() -> Self {
        NetReturns { points: Vec::new() }
    }

    //returns the recorded (timestamp, net return) sequence
    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    //writes the recorded points to a csv file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)
            .context(format!("Failed to create CSV file: {:?}", path))?;

        for point in &self.points {
            writer.serialize(point)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl ReturnsSink for NetReturns {
    fn on_returns(&mut self, bars: &BarSet, net_return: f64, _cumulative_return: f64) {
        self.points.push(ReturnPoint {
            timestamp: bars.timestamp(),
            net_return,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::HoldingsBook;
    use crate::data::Bar;
    use chrono::TimeZone;

    const EPS: f64 = 1e-12;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn bar_set(day: u32, prices: &[(&str, f64)]) -> BarSet {
        let mut bars = BarSet::new(ts(day));
        for (symbol, price) in prices {
            bars.insert(Bar::new_unchecked(
                ts(day),
                *price,
                *price,
                *price,
                *price,
                *price,
                0.0,
                symbol.to_string(),
            ))
            .unwrap();
        }
        bars
    }

    #[test]
    fn first_bar_sets_baseline_without_notifying() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0)]));

        assert!(tracker.sink().points().is_empty());
        assert_eq!(tracker.cumulative_return(), 0.0);
    }

    #[test]
    fn long_position_compounds_over_three_bars() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);

        //bar 1: baseline at 100
        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0)]));

        //bar 2: 100 -> 102
        tracker.on_bars(&book, &bar_set(3, &[("ACME", 102.0)]));
        let points = tracker.sink().points();
        assert_eq!(points.len(), 1);
        assert!((points[0].net_return - 0.02).abs() < EPS);
        assert!((tracker.cumulative_return() - 0.02).abs() < EPS);

        //bar 3: 102 -> 99, compounded (1.02)(99/102) - 1 = -0.01
        tracker.on_bars(&book, &bar_set(4, &[("ACME", 99.0)]));
        let points = tracker.sink().points();
        assert_eq!(points.len(), 2);
        assert!((points[1].net_return - (99.0 - 102.0) / 102.0).abs() < EPS);
        assert!((tracker.cumulative_return() - (-0.01)).abs() < EPS);
        assert_eq!(points[1].timestamp, ts(4));
    }

    #[test]
    fn short_position_negates_the_price_move() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", -10);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0)]));
        //price rises 5%, the short loses 5%
        tracker.on_bars(&book, &bar_set(3, &[("ACME", 105.0)]));

        let points = tracker.sink().points();
        assert!((points[0].net_return - (-0.05)).abs() < EPS);
    }

    #[test]
    fn net_return_is_the_mean_across_held_instruments() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);
        book.set_shares("ZENITH", 5);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0), ("ZENITH", 50.0)]));
        //ACME +2%, ZENITH +4% -> mean +3%
        tracker.on_bars(&book, &bar_set(3, &[("ACME", 102.0), ("ZENITH", 52.0)]));

        let points = tracker.sink().points();
        assert!((points[0].net_return - 0.03).abs() < EPS);
    }

    #[test]
    fn zero_share_holding_contributes_nothing() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);
        book.set_shares("ZENITH", 0);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0), ("ZENITH", 50.0)]));
        //ZENITH moves +10% but holds zero shares; only ACME's +2% counts
        tracker.on_bars(&book, &bar_set(3, &[("ACME", 102.0), ("ZENITH", 55.0)]));

        let points = tracker.sink().points();
        assert!((points[0].net_return - 0.02).abs() < EPS);
    }

    #[test]
    fn held_instrument_missing_from_bar_set_is_skipped() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);
        book.set_shares("ZENITH", 5);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0), ("ZENITH", 50.0)]));
        //ZENITH has no bar this step; only ACME contributes
        tracker.on_bars(&book, &bar_set(3, &[("ACME", 102.0)]));

        let points = tracker.sink().points();
        assert!((points[0].net_return - 0.02).abs() < EPS);
    }

    #[test]
    fn newly_active_instrument_without_prior_close_is_skipped() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0)]));

        //ZENITH turns active here but had no bar on bar 3, so by bar 4 it
        //sits in the share snapshot with no recorded prior close
        book.set_shares("ZENITH", 5);
        tracker.on_bars(&book, &bar_set(3, &[("ACME", 102.0)]));
        tracker.on_bars(&book, &bar_set(4, &[("ACME", 102.0), ("ZENITH", 55.0)]));

        let points = tracker.sink().points();
        assert_eq!(points.len(), 2);
        assert!((points[0].net_return - 0.02).abs() < EPS);
        //bar 4: ACME flat, ZENITH skipped (no prior close) -> mean of {0.0}
        assert!((points[1].net_return - 0.0).abs() < EPS);
    }

    #[test]
    fn no_held_priced_instruments_gives_flat_return() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0)]));
        tracker.on_bars(&book, &bar_set(3, &[("ACME", 102.0)]));
        assert!((tracker.cumulative_return() - 0.02).abs() < EPS);

        //flatten the books; the next bar has nothing to measure
        book.close("ACME");
        tracker.on_bars(&book, &bar_set(4, &[("ACME", 110.0)]));

        //bar 4 still measures against the bar-3 snapshot, which held ACME
        let points = tracker.sink().points();
        assert_eq!(points.len(), 2);
        assert!((points[1].net_return - (110.0 - 102.0) / 102.0).abs() < EPS);

        //bar 5: the bar-4 snapshot is empty -> flat, cumulative unchanged
        let cumulative = tracker.cumulative_return();
        tracker.on_bars(&book, &bar_set(5, &[("ACME", 120.0)]));
        let points = tracker.sink().points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].net_return, 0.0);
        assert!((tracker.cumulative_return() - cumulative).abs() < EPS);
    }

    #[test]
    fn dropped_instrument_leaves_the_share_snapshot() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);
        book.set_shares("ZENITH", 5);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0), ("ZENITH", 50.0)]));

        //ZENITH goes inactive; the bar-3 snapshot must not carry it
        book.close("ZENITH");
        tracker.on_bars(&book, &bar_set(3, &[("ACME", 102.0), ("ZENITH", 55.0)]));
        //bar 4: only ACME is measured even though ZENITH rallied again
        tracker.on_bars(&book, &bar_set(4, &[("ACME", 102.0), ("ZENITH", 60.0)]));

        let points = tracker.sink().points();
        assert!((points[1].net_return - 0.0).abs() < EPS);
    }

    #[test]
    fn stale_close_survives_a_missing_bar() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0)]));
        //ACME has no bar this step; its recorded close stays at 100
        tracker.on_bars(&book, &bar_set(3, &[]));
        //ACME reappears at 110: measured against the stale 100
        tracker.on_bars(&book, &bar_set(4, &[("ACME", 110.0)]));

        let points = tracker.sink().points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].net_return, 0.0);
        assert!((points[1].net_return - 0.10).abs() < EPS);
    }

    #[test]
    fn into_sink_hands_back_the_recorded_points() {
        let mut tracker = ReturnsTracker::new(NetReturns::new());
        let mut book = HoldingsBook::new();
        book.set_shares("ACME", 10);

        tracker.on_bars(&book, &bar_set(2, &[("ACME", 100.0)]));
        tracker.on_bars(&book, &bar_set(3, &[("ACME", 101.0)]));

        let sink = tracker.into_sink();
        assert_eq!(sink.points().len(), 1);
    }
}
