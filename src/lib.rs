//period-over-period return tracking for simulated trading strategies

pub mod analyzer;
pub mod broker;
pub mod config;
pub mod data;
pub mod portfolio;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::analyzer::{
        NetReturns, ReturnPoint, ReturnsSink, ReturnsTracker, StrategyAnalyzer,
    };
    pub use crate::broker::{BrokerContext, HoldingsBook, StrategyContext};
    pub use crate::config::{InstrumentScenario, ScenarioConfig};
    pub use crate::data::{Bar, BarError, BarSet, BarSetError};
    pub use crate::portfolio::ReturnsCalculator;
}
