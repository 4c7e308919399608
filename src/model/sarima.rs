//! Bayesian SARIMA model: training, recursive forecasting, intervals.

use crate::diff::{difference, integrate, seasonal_difference};
use crate::error::{Result, SarimaError};
use crate::model::graph::{self, ModelGraph};
use crate::model::order::SarimaOrder;
use crate::sampler::{PosteriorSampler, PosteriorSamples};
use rand::prelude::*;
use rand_distr::StandardNormal;
use statrs::distribution::{ContinuousCDF, Normal};

/// Point forecast with prediction interval bounds, one value per step.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInterval {
    /// Zero-noise point forecasts on the differenced scale.
    pub point: Vec<f64>,
    /// Lower interval bounds.
    pub lower: Vec<f64>,
    /// Upper interval bounds.
    pub upper: Vec<f64>,
}

/// Posterior point estimates driving the forecast recursion.
struct PointEstimates {
    phi: Vec<f64>,
    theta: Vec<f64>,
    seasonal_phi: Vec<f64>,
    seasonal_theta: Vec<f64>,
    sigma: f64,
    ma_seed: Vec<f64>,
}

/// A Bayesian SARIMA model.
///
/// Created untrained; [`train`](Self::train) runs differencing, builds the
/// probabilistic graph, and delegates to a [`PosteriorSampler`]. Forecasts
/// are produced on the differenced scale from posterior means, one step at
/// a time, feeding each prediction back into the lag windows.
#[derive(Debug, Clone)]
pub struct BayesianSarima {
    name: String,
    order: SarimaOrder,
    differenced: Option<Vec<f64>>,
    posterior: Option<PosteriorSamples>,
}

impl BayesianSarima {
    /// Create an untrained model.
    pub fn new(name: impl Into<String>, order: SarimaOrder) -> Self {
        Self {
            name: name.into(),
            order,
            differenced: None,
            posterior: None,
        }
    }

    /// Reassemble a model from its persisted parts.
    pub fn from_parts(
        name: impl Into<String>,
        order: SarimaOrder,
        differenced: Option<Vec<f64>>,
        posterior: PosteriorSamples,
    ) -> Self {
        Self {
            name: name.into(),
            order,
            differenced,
            posterior: Some(posterior),
        }
    }

    /// Model name, used to derive the persistence location.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The order the model was constructed with.
    pub fn order(&self) -> &SarimaOrder {
        &self.order
    }

    /// Whether the model holds posterior samples.
    pub fn is_trained(&self) -> bool {
        self.posterior.is_some()
    }

    /// Posterior samples, if trained.
    pub fn posterior(&self) -> Option<&PosteriorSamples> {
        self.posterior.as_ref()
    }

    /// The differenced training series, if trained.
    pub fn differenced(&self) -> Option<&[f64]> {
        self.differenced.as_deref()
    }

    /// Apply the model's differencing to a raw series: `d` nonseasonal
    /// rounds, then `D` seasonal rounds at stride `m` when active.
    pub fn difference_series(&self, y: &[f64]) -> Vec<f64> {
        let nonseasonal = difference(y, self.order.d);
        if self.order.seasonal && self.order.seasonal_d > 0 && self.order.m > 1 {
            seasonal_difference(&nonseasonal, self.order.seasonal_d, self.order.m)
        } else {
            nonseasonal
        }
    }

    /// Train the model on a raw series.
    ///
    /// Differences the series, validates the length invariant, builds the
    /// model graph, and samples the posterior with the supplied engine.
    /// The input series is not modified; on any error the model stays
    /// untrained.
    pub fn train<S: PosteriorSampler>(
        &mut self,
        y: &[f64],
        sampler: &S,
        draws: usize,
        tune: usize,
        target_accept: f64,
    ) -> Result<()> {
        if y.is_empty() {
            return Err(SarimaError::EmptyData);
        }

        let differenced = self.difference_series(y);
        let graph = ModelGraph::build(self.order, &differenced)?;
        let posterior = sampler.sample(&graph, draws, tune, target_accept)?;

        self.differenced = Some(differenced);
        self.posterior = Some(posterior);
        Ok(())
    }

    /// Forecast `steps` values of the differenced series.
    ///
    /// `last_observations` must hold at least the `max(p, P*m)` most recent
    /// differenced observations; extra leading values are ignored. Each
    /// step injects `Normal(0, sigma_hat)` noise from the thread RNG; use
    /// [`predict_with_rng`](Self::predict_with_rng) for reproducibility.
    pub fn predict(&self, steps: usize, last_observations: &[f64]) -> Result<Vec<f64>> {
        self.predict_with_rng(steps, last_observations, &mut rand::thread_rng())
    }

    /// [`predict`](Self::predict) with a caller-supplied noise source.
    pub fn predict_with_rng<R: Rng>(
        &self,
        steps: usize,
        last_observations: &[f64],
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        let estimates = self.point_estimates()?;
        let sigma = estimates.sigma;
        self.run_recursion(&estimates, steps, last_observations, || {
            let z: f64 = rng.sample(StandardNormal);
            sigma * z
        })
    }

    /// Zero-noise point forecasts with normal prediction intervals.
    ///
    /// The interval half-width at step `h` uses the cumulative variance
    /// `h * sigma_hat^2`, the same simplification used for non-Bayesian
    /// ARIMA intervals.
    pub fn predict_with_intervals(
        &self,
        steps: usize,
        last_observations: &[f64],
        level: f64,
    ) -> Result<ForecastInterval> {
        if !(level > 0.0 && level < 1.0) {
            return Err(SarimaError::InvalidParameter(
                "interval level must lie in (0, 1)".to_string(),
            ));
        }

        let estimates = self.point_estimates()?;
        let point = self.run_recursion(&estimates, steps, last_observations, || 0.0)?;

        let standard_normal = Normal::new(0.0, 1.0)
            .map_err(|e| SarimaError::InvalidParameter(e.to_string()))?;
        let z = standard_normal.inverse_cdf((1.0 + level) / 2.0);

        let mut lower = Vec::with_capacity(steps);
        let mut upper = Vec::with_capacity(steps);
        for (h, y_hat) in point.iter().enumerate() {
            let se = (estimates.sigma * estimates.sigma * (h + 1) as f64).sqrt();
            lower.push(y_hat - z * se);
            upper.push(y_hat + z * se);
        }

        Ok(ForecastInterval { point, lower, upper })
    }

    /// Forecast on the level scale: difference the raw history, forecast
    /// the differenced tail, and integrate back.
    ///
    /// Only available when seasonal differencing is inactive; seasonal
    /// reintegration is the caller's concern.
    pub fn forecast_levels<R: Rng>(
        &self,
        steps: usize,
        history: &[f64],
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        if self.order.seasonal && self.order.seasonal_d > 0 && self.order.m > 1 {
            return Err(SarimaError::InvalidParameter(
                "level reconstruction does not support seasonal differencing".to_string(),
            ));
        }

        let differenced = difference(history, self.order.d);
        let forecast_diff = self.predict_with_rng(steps, &differenced, rng)?;
        Ok(integrate(&forecast_diff, history, self.order.d))
    }

    /// Posterior means of every parameter the recursion needs.
    fn point_estimates(&self) -> Result<PointEstimates> {
        let posterior = self.posterior.as_ref().ok_or(SarimaError::NotTrained)?;
        let o = &self.order;

        let missing =
            |name: &str| SarimaError::Sampler(format!("posterior is missing parameter '{name}'"));
        let coefficients = |name: &str, expected: usize| -> Result<Vec<f64>> {
            if expected == 0 {
                return Ok(Vec::new());
            }
            let values = posterior.mean_of(name).ok_or_else(|| missing(name))?;
            if values.len() != expected {
                return Err(SarimaError::Sampler(format!(
                    "posterior '{name}' has {} entries, expected {expected}",
                    values.len()
                )));
            }
            Ok(values)
        };

        let phi = coefficients(graph::PHI, o.p)?;
        let theta = coefficients(graph::THETA, o.q)?;
        let seasonal_reach_p = if o.seasonal_active() { o.seasonal_p } else { 0 };
        let seasonal_reach_q = if o.seasonal_active() { o.seasonal_q } else { 0 };
        let seasonal_phi = coefficients(graph::SEASONAL_PHI, seasonal_reach_p)?;
        let seasonal_theta = coefficients(graph::SEASONAL_THETA, seasonal_reach_q)?;
        let sigma = posterior
            .mean_of(graph::SIGMA)
            .and_then(|v| v.first().copied())
            .ok_or_else(|| missing(graph::SIGMA))?;

        let q_total = o.q_total();
        let ma_seed = if q_total > 0 {
            let eps = posterior
                .mean_of(graph::EPS)
                .ok_or_else(|| missing(graph::EPS))?;
            if eps.len() < q_total {
                return Err(SarimaError::Sampler(format!(
                    "posterior 'eps' has {} entries, need at least {q_total}",
                    eps.len()
                )));
            }
            eps[eps.len() - q_total..].to_vec()
        } else {
            Vec::new()
        };

        Ok(PointEstimates {
            phi,
            theta,
            seasonal_phi,
            seasonal_theta,
            sigma,
            ma_seed,
        })
    }

    /// The recursive forecast loop of the differenced series.
    ///
    /// Windows grow by appending and are always indexed from the end, so
    /// the last-`k` semantics select the correct recent values at every
    /// step regardless of growth.
    fn run_recursion(
        &self,
        estimates: &PointEstimates,
        steps: usize,
        last_observations: &[f64],
        mut draw_noise: impl FnMut() -> f64,
    ) -> Result<Vec<f64>> {
        let o = &self.order;
        let needed = o.required_observations();
        if last_observations.len() < needed {
            return Err(SarimaError::InsufficientObservations {
                needed,
                got: last_observations.len(),
            });
        }
        let observations = &last_observations[last_observations.len() - needed..];

        let seasonal_ar_active = o.seasonal_active() && o.seasonal_p > 0;
        let seasonal_ma_active = o.seasonal_active() && o.seasonal_q > 0;
        let q_total = o.q_total();

        let mut ar_terms: Vec<f64> = if o.p > 0 {
            observations[observations.len() - o.p..].to_vec()
        } else {
            Vec::new()
        };
        let mut sar_terms: Vec<f64> = if seasonal_ar_active {
            observations[observations.len() - o.seasonal_p * o.m..].to_vec()
        } else {
            Vec::new()
        };
        let mut ma_terms: Vec<f64> = estimates.ma_seed.clone();

        let mut forecast = Vec::with_capacity(steps);
        for _ in 0..steps {
            let mut y_hat = 0.0;
            for i in 1..=o.p {
                y_hat += estimates.phi[i - 1] * ar_terms[ar_terms.len() - i];
            }
            if seasonal_ar_active {
                for big_i in 1..=o.seasonal_p {
                    y_hat +=
                        estimates.seasonal_phi[big_i - 1] * sar_terms[sar_terms.len() - big_i * o.m];
                }
            }
            for j in 1..=o.q {
                y_hat += estimates.theta[j - 1] * ma_terms[ma_terms.len() - j];
            }
            if seasonal_ma_active {
                for big_j in 1..=o.seasonal_q {
                    y_hat += estimates.seasonal_theta[big_j - 1]
                        * ma_terms[ma_terms.len() - big_j * o.m];
                }
            }

            let epsilon = draw_noise();
            y_hat += epsilon;
            forecast.push(y_hat);

            if o.p > 0 {
                ar_terms.push(y_hat);
            }
            if seasonal_ar_active {
                sar_terms.push(y_hat);
            }
            if q_total > 0 {
                ma_terms.push(epsilon);
            }
        }

        Ok(forecast)
    }
}
