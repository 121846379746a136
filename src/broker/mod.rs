pub mod holdings;

pub use holdings::HoldingsBook;

//read-only view of the broker's books, as analyzers see them
pub trait BrokerContext {
    //instruments the broker currently carries an entry for
    fn active_instruments(&self) -> Vec<String>;

    //signed share count: positive long, negative short, 0 when unknown
    fn shares(&self, instrument: &str) -> i32;
}

//opaque per-run handle passed to analyzers on every bar
//only used to reach the broker context
pub trait StrategyContext {
    fn broker(&self) -> &dyn BrokerContext;
}
