use crate::data::bar::Bar;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarSetError {
    #[error("Duplicate instrument in bar set: {0}")]
    DuplicateInstrument(String),
    #[error("Bar timestamp ({bar}) does not match bar set timestamp ({expected})")]
    TimestampMismatch {
        expected: DateTime<Utc>,
        bar: DateTime<Utc>,
    },
}

//all instrument bars for a single simulation step
//iteration order is insertion order, so replays are reproducible
#[derive(Debug, Clone)]
pub struct BarSet {
    timestamp: DateTime<Utc>,
    bars: IndexMap<String, Bar>,
}

impl BarSet {
    //creates an empty bar set for the given step
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        BarSet {
            timestamp,
            bars: IndexMap::new(),
        }
    }

    //adds an instrument's bar, rejecting duplicates and timestamp drift
    pub fn insert(&mut self, bar: Bar) -> Result<(), BarSetError> {
        if bar.timestamp != self.timestamp {
            return Err(BarSetError::TimestampMismatch {
                expected: self.timestamp,
                bar: bar.timestamp,
            });
        }

        if self.bars.contains_key(&bar.symbol) {
            return Err(BarSetError::DuplicateInstrument(bar.symbol.clone()));
        }

        self.bars.insert(bar.symbol.clone(), bar);
        Ok(())
    }

    //returns the bar for an instrument, or none if absent this step
    pub fn bar(&self, instrument: &str) -> Option<&Bar> {
        self.bars.get(instrument)
    }

    //returns the instruments present this step
    pub fn instruments(&self) -> Vec<&str> {
        self.bars.keys().map(|s| s.as_str()).collect()
    }

    //iterates over the bars in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.values()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
