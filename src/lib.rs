//! # bayesian-sarima
//!
//! Bayesian SARIMA modelling and forecasting for univariate time series.
//!
//! A `(p, d, q)(P, D, Q)[m]` order and a raw series are turned into a
//! declarative probabilistic regression over the differenced observations,
//! a posterior sampling engine explores its parameters, and forecasts are
//! produced by a recursive loop over the posterior point estimates.
//! Trained models persist as named JSON snapshots.

#![allow(clippy::needless_range_loop)]

pub mod diff;
pub mod error;
pub mod model;
pub mod persistence;
pub mod sampler;
pub mod utils;

pub use error::{Result, SarimaError};

pub mod prelude {
    pub use crate::error::{Result, SarimaError};
    pub use crate::model::{BayesianSarima, ForecastInterval, ModelGraph, SarimaOrder};
    pub use crate::persistence::ModelStore;
    pub use crate::sampler::{PosteriorSampler, PosteriorSamples, RandomWalkMetropolis};
}
