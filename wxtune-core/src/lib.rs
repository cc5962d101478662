pub mod chart;
pub mod live;
pub mod source;
pub mod weather;
pub mod week_key;
