use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//price path and holdings schedule for one simulated instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentScenario {
    pub symbol: String,

    //adjusted close on the first bar
    pub start_price: f64,

    //fractional per-bar price change (0.01 = +1% each bar)
    pub drift: f64,

    //signed share count while the position is open
    pub shares: i32,

    //bar index at which the holding opens
    pub enter_bar: usize,

    //bar index at which the holding closes (held to the end if absent)
    pub exit_bar: Option<usize>,
}

impl InstrumentScenario {
    //adjusted close at a given bar index along the drift path
    pub fn price_at(&self, bar_index: usize) -> f64 {
        self.start_price * (1.0 + self.drift).powi(bar_index as i32)
    }

    //whether the holding is on the books at a given bar index
    pub fn is_open(&self, bar_index: usize) -> bool {
        bar_index >= self.enter_bar && self.exit_bar.map_or(true, |exit| bar_index < exit)
    }
}

//complete configuration for a demo replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    //number of bars to simulate
    pub bars: usize,

    //timestamp of the first bar
    pub start: DateTime<Utc>,

    //seconds between consecutive bars
    pub bar_interval_secs: i64,

    pub instruments: Vec<InstrumentScenario>,

    //optional output path for the per-bar net returns csv
    pub output_returns_csv: Option<PathBuf>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            bars: 10,
            start: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            bar_interval_secs: 86_400,
            instruments: vec![
                InstrumentScenario {
                    symbol: "ACME".to_string(),
                    start_price: 100.0,
                    drift: 0.01,
                    shares: 10,
                    enter_bar: 0,
                    exit_bar: None,
                },
                InstrumentScenario {
                    symbol: "ZENITH".to_string(),
                    start_price: 50.0,
                    drift: 0.005,
                    shares: -5,
                    enter_bar: 2,
                    exit_bar: Some(8),
                },
            ],
            output_returns_csv: None,
        }
    }
}

impl ScenarioConfig {
    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ScenarioConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
