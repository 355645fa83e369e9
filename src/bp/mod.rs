// bp/mod.rs
pub mod counter;
pub mod ghr;
pub mod predictor;

pub use predictor::{BpStats, Predictor};
