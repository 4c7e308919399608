//! SARIMA model construction and forecasting.

pub mod graph;
mod order;
mod sarima;

pub use graph::{ModelGraph, ParamSpec, Prior};
pub use order::SarimaOrder;
pub use sarima::{BayesianSarima, ForecastInterval};
