//! Adaptive random-walk Metropolis engine.
//!
//! A coordinate-sweep random walk over the graph's flat parameter vector.
//! During the tune phase each coordinate's proposal scale is adapted toward
//! the target acceptance rate, then frozen while draws are recorded. Not a
//! gradient-based sampler; correctness over efficiency.

use crate::error::{Result, SarimaError};
use crate::model::ModelGraph;
use crate::sampler::{PosteriorSampler, PosteriorSamples, SampleArray};
use rand::prelude::*;
use rand::SeedableRng;
use rand_distr::StandardNormal;

/// Sweeps between scale adaptations during tuning.
const ADAPT_WINDOW: usize = 25;

/// Configuration for the random-walk Metropolis engine.
#[derive(Debug, Clone)]
pub struct RandomWalkMetropolis {
    chains: usize,
    initial_scale: f64,
    seed: Option<u64>,
}

impl Default for RandomWalkMetropolis {
    fn default() -> Self {
        Self {
            chains: 2,
            initial_scale: 0.1,
            seed: None,
        }
    }
}

impl RandomWalkMetropolis {
    /// Create an engine with the default configuration (two chains).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of chains.
    pub fn with_chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    /// Set the initial per-coordinate proposal scale.
    pub fn with_initial_scale(mut self, scale: f64) -> Self {
        self.initial_scale = scale;
        self
    }

    /// Fix the random seed for reproducible sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn run_chain(
        &self,
        graph: &ModelGraph,
        draws: usize,
        tune: usize,
        target_accept: f64,
        rng: &mut StdRng,
        out: &mut [(usize, SampleArray)],
        chain: usize,
    ) -> Result<()> {
        let dim = graph.dim();
        let mut point = graph.initial_point();
        let mut current_lp = graph.log_posterior(&point);
        if !current_lp.is_finite() {
            return Err(SarimaError::Sampler(
                "initial point has zero posterior density".to_string(),
            ));
        }

        let mut log_scales = vec![self.initial_scale.ln(); dim];
        let mut accepts = vec![0usize; dim];
        let mut window = 0usize;
        let mut batch = 0usize;

        for sweep in 0..tune + draws {
            let tuning = sweep < tune;

            for k in 0..dim {
                let old = point[k];
                let z: f64 = rng.sample(StandardNormal);
                point[k] = old + log_scales[k].exp() * z;
                let proposed_lp = graph.log_posterior(&point);

                let accept = proposed_lp.is_finite()
                    && (proposed_lp - current_lp >= 0.0
                        || rng.gen::<f64>().ln() < proposed_lp - current_lp);
                if accept {
                    current_lp = proposed_lp;
                    if tuning {
                        accepts[k] += 1;
                    }
                } else {
                    point[k] = old;
                }
            }

            if tuning {
                window += 1;
                if window == ADAPT_WINDOW {
                    batch += 1;
                    let delta = 0.1_f64.min(1.0 / (batch as f64).sqrt());
                    for k in 0..dim {
                        let rate = accepts[k] as f64 / ADAPT_WINDOW as f64;
                        if rate > target_accept {
                            log_scales[k] += delta;
                        } else {
                            log_scales[k] -= delta;
                        }
                        accepts[k] = 0;
                    }
                    window = 0;
                }
            } else {
                let draw = sweep - tune;
                for (offset, samples) in out.iter_mut() {
                    let len = samples.len();
                    samples.set(chain, draw, &point[*offset..*offset + len]);
                }
            }
        }

        Ok(())
    }
}

impl PosteriorSampler for RandomWalkMetropolis {
    fn sample(
        &self,
        graph: &ModelGraph,
        draws: usize,
        tune: usize,
        target_accept: f64,
    ) -> Result<PosteriorSamples> {
        if draws == 0 {
            return Err(SarimaError::InvalidParameter(
                "draws must be positive".to_string(),
            ));
        }
        if self.chains == 0 {
            return Err(SarimaError::InvalidParameter(
                "chains must be positive".to_string(),
            ));
        }
        if !(target_accept > 0.0 && target_accept < 1.0) {
            return Err(SarimaError::InvalidParameter(
                "target_accept must lie in (0, 1)".to_string(),
            ));
        }

        let mut arrays: Vec<(usize, SampleArray)> = graph
            .params()
            .iter()
            .map(|spec| (spec.offset, SampleArray::zeros(self.chains, draws, spec.len)))
            .collect();

        for chain in 0..self.chains {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(chain as u64)),
                None => StdRng::from_entropy(),
            };
            self.run_chain(
                graph,
                draws,
                tune,
                target_accept,
                &mut rng,
                &mut arrays,
                chain,
            )?;
        }

        let mut samples = PosteriorSamples::new();
        for (spec, (_, array)) in graph.params().iter().zip(arrays) {
            samples.insert(spec.name, array);
        }
        Ok(samples)
    }
}
