use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarError {
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Invalid OHLC values: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen { open: f64, high: f64, low: f64 },
    #[error("Non-positive adjusted close: {0}")]
    NonPositiveAdjustedClose(f64),
    #[error("Negative volume: {0}")]
    NegativeVolume(f64),
}

//a single time-step's price snapshot for one instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
    pub symbol: String,
}

impl Bar {
    //creates a new Bar with validation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: f64,
        symbol: String,
    ) -> Result<Self, BarError> {
        //validate high >= low
        if high < low {
            return Err(BarError::InvalidHighLow { high, low });
        }

        //validate close within [low, high]
        if close < low || close > high {
            return Err(BarError::InvalidClose { close, high, low });
        }

        //validate open within [low, high]
        if open < low || open > high {
            return Err(BarError::InvalidOpen { open, high, low });
        }

        //the adjusted close is a divisor in return computations
        if adj_close <= 0.0 {
            return Err(BarError::NonPositiveAdjustedClose(adj_close));
        }

        //validate non-negative volume
        if volume < 0.0 {
            return Err(BarError::NegativeVolume(volume));
        }

        Ok(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
            symbol,
        })
    }

    //creates a Bar without validation
    #[allow(clippy::too_many_arguments)]
    pub fn new_unchecked(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: f64,
        symbol: String,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
            symbol,
        }
    }

    //returns the reference price used for mark-to-market and returns
    pub fn adjusted_close(&self) -> f64 {
        self.adj_close
    }
}
