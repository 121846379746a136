pub mod returns;

pub use returns::{NetReturns, ReturnPoint, ReturnsSink, ReturnsTracker};

use crate::broker::StrategyContext;
use crate::data::BarSet;

//analyzer capability that the driving loop registers and invokes
//on_bars is called exactly once per simulated bar, in bar order
pub trait StrategyAnalyzer {
    fn on_bars(&mut self, strat: &dyn StrategyContext, bars: &BarSet);
}
