pub mod returns;

pub use returns::ReturnsCalculator;
