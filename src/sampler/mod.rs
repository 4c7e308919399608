//! Posterior sampling interface.
//!
//! The model graph is declarative, so any engine that can explore its log
//! posterior can train a model: implement [`PosteriorSampler`] and return a
//! [`PosteriorSamples`] population for every declared parameter. The crate
//! ships one engine, [`RandomWalkMetropolis`].

mod metropolis;

pub use metropolis::RandomWalkMetropolis;

use crate::error::Result;
use crate::model::ModelGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Samples of one parameter: `chains x draws x len`, chain-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleArray {
    chains: usize,
    draws: usize,
    len: usize,
    values: Vec<f64>,
}

impl SampleArray {
    /// Allocate a zero-filled array for `chains x draws` samples of a
    /// parameter of shape `len`.
    pub fn zeros(chains: usize, draws: usize, len: usize) -> Self {
        Self {
            chains,
            draws,
            len,
            values: vec![0.0; chains * draws * len],
        }
    }

    /// An array where every draw equals `value` (useful for fixed
    /// posteriors in tests and for degenerate point masses).
    pub fn constant(chains: usize, draws: usize, value: &[f64]) -> Self {
        let mut arr = Self::zeros(chains, draws, value.len());
        for chain in 0..chains {
            for draw in 0..draws {
                arr.set(chain, draw, value);
            }
        }
        arr
    }

    /// Number of chains.
    pub fn chains(&self) -> usize {
        self.chains
    }

    /// Draws per chain.
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Parameter shape.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the parameter has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn index(&self, chain: usize, draw: usize) -> usize {
        (chain * self.draws + draw) * self.len
    }

    /// Store one draw.
    pub fn set(&mut self, chain: usize, draw: usize, value: &[f64]) {
        let at = self.index(chain, draw);
        self.values[at..at + self.len].copy_from_slice(value);
    }

    /// Fetch one draw.
    pub fn get(&self, chain: usize, draw: usize) -> &[f64] {
        let at = self.index(chain, draw);
        &self.values[at..at + self.len]
    }

    /// Per-component mean across all chains and draws: the point estimate
    /// used at forecast time.
    pub fn mean(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.len];
        let total = (self.chains * self.draws) as f64;
        if total == 0.0 {
            return out;
        }
        for chain in 0..self.chains {
            for draw in 0..self.draws {
                let sample = self.get(chain, draw);
                for (acc, v) in out.iter_mut().zip(sample) {
                    *acc += v;
                }
            }
        }
        for acc in &mut out {
            *acc /= total;
        }
        out
    }
}

/// Posterior sample populations keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosteriorSamples {
    params: BTreeMap<String, SampleArray>,
}

impl PosteriorSamples {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a degenerate single-draw posterior from point values. Each
    /// parameter's mean then equals the given value exactly.
    pub fn from_point_estimates(values: &[(&str, Vec<f64>)]) -> Self {
        let mut samples = Self::new();
        for (name, value) in values {
            samples.insert(name, SampleArray::constant(1, 1, value));
        }
        samples
    }

    /// Insert samples for a parameter.
    pub fn insert(&mut self, name: &str, samples: SampleArray) {
        self.params.insert(name.to_string(), samples);
    }

    /// Samples for a parameter, if present.
    pub fn get(&self, name: &str) -> Option<&SampleArray> {
        self.params.get(name)
    }

    /// Point estimate (mean over chains and draws) for a parameter.
    pub fn mean_of(&self, name: &str) -> Option<Vec<f64>> {
        self.get(name).map(SampleArray::mean)
    }

    /// Declared parameter names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Whether no parameters are present.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// A posterior sampling engine.
///
/// Implementations must return a sample population for every parameter the
/// graph declares, and fail loudly rather than return degenerate samples.
pub trait PosteriorSampler {
    /// Sample the posterior of `graph` with the given tuning parameters.
    fn sample(
        &self,
        graph: &ModelGraph,
        draws: usize,
        tune: usize,
        target_accept: f64,
    ) -> Result<PosteriorSamples>;
}
