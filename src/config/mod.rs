pub mod scenario;

pub use scenario::{InstrumentScenario, ScenarioConfig};
