pub mod bar;
pub mod barset;

pub use bar::{Bar, BarError};
pub use barset::{BarSet, BarSetError};
