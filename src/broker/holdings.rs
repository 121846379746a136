use crate::broker::{BrokerContext, StrategyContext};
use indexmap::IndexMap;

//a signed share ledger keyed by instrument
//records what is held, it does not execute or match orders
#[derive(Debug, Clone, Default)]
pub struct HoldingsBook {
    shares: IndexMap<String, i32>,
}

impl HoldingsBook {
    //creates an empty ledger
    pub fn new() -> Self {
        HoldingsBook {
            shares: IndexMap::new(),
        }
    }

    //sets the signed share count for an instrument (overwrites)
    pub fn set_shares(&mut self, symbol: &str, qty: i32) {
        self.shares.insert(symbol.to_string(), qty);
    }

    //removes an instrument from the books entirely
    pub fn close(&mut self, symbol: &str) {
        self.shares.shift_remove(symbol);
    }

    //returns true if nothing is on the books
    pub fn is_flat(&self) -> bool {
        self.shares.is_empty()
    }
}

impl BrokerContext for HoldingsBook {
    fn active_instruments(&self) -> Vec<String> {
        self.shares.keys().cloned().collect()
    }

    fn shares(&self, instrument: &str) -> i32 {
        self.shares.get(instrument).copied().unwrap_or(0)
    }
}

//the ledger doubles as its own strategy context in tests and the demo driver
impl StrategyContext for HoldingsBook {
    fn broker(&self) -> &dyn BrokerContext {
        self
    }
}
