//! Declarative probabilistic model graph for a SARIMA regression.
//!
//! The graph declares the random variables (AR/MA/seasonal coefficients,
//! noise scale, padded latent noise vector), the lag-aligned mean function
//! over the differenced series, and the observation likelihood. Any
//! posterior sampling engine can consume it through [`ModelGraph::dim`],
//! [`ModelGraph::initial_point`], and [`ModelGraph::log_posterior`] alone.

use crate::error::{Result, SarimaError};
use crate::model::order::SarimaOrder;
use crate::utils::stats::{ln_half_normal_pdf, ln_normal_pdf};

// Parameter names, shared by posterior sample maps and snapshots.

/// Nonseasonal AR coefficients.
pub const PHI: &str = "phi";
/// Nonseasonal MA coefficients.
pub const THETA: &str = "theta";
/// Seasonal AR coefficients.
pub const SEASONAL_PHI: &str = "PHI";
/// Seasonal MA coefficients.
pub const SEASONAL_THETA: &str = "THETA";
/// Noise scale.
pub const SIGMA: &str = "sigma";
/// Padded latent noise vector.
pub const EPS: &str = "eps";

/// Prior distribution of a declared random variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prior {
    /// Independent `Normal(mu, sigma)` entries.
    Normal { mu: f64, sigma: f64 },
    /// `HalfNormal(sigma)`, strictly positive support.
    HalfNormal { sigma: f64 },
    /// Latent noise: i.i.d. `Normal(0, sigma)` where `sigma` is the graph's
    /// noise-scale variable.
    LatentNoise,
}

/// A declared random variable: a named block of the flat parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name (`phi`, `theta`, `PHI`, `THETA`, `sigma`, `eps`).
    pub name: &'static str,
    /// Offset of the block within the flat parameter vector.
    pub offset: usize,
    /// Block length.
    pub len: usize,
    /// Prior over each entry.
    pub prior: Prior,
}

/// Fully-specified probabilistic regression over a differenced series.
#[derive(Debug, Clone)]
pub struct ModelGraph {
    order: SarimaOrder,
    observed: Vec<f64>,
    params: Vec<ParamSpec>,
    dim: usize,
    start_index: usize,
    pad: usize,
}

impl ModelGraph {
    /// Build the graph for an order and an already-differenced series.
    ///
    /// Fails with [`SarimaError::InsufficientData`] when the series is too
    /// short for the deepest lag the order reaches.
    pub fn build(order: SarimaOrder, differenced: &[f64]) -> Result<Self> {
        order.validate()?;

        let n = differenced.len();
        let needed = order.min_train_len();
        if n < needed {
            return Err(SarimaError::InsufficientData { needed, got: n });
        }

        let pad = order.pad();
        let coef_prior = Prior::Normal { mu: 0.0, sigma: 10.0 };

        let mut params = Vec::new();
        let mut offset = 0;
        let mut declare = |name, len, prior| {
            params.push(ParamSpec {
                name,
                offset,
                len,
                prior,
            });
            offset += len;
        };

        declare(PHI, order.p, coef_prior);
        declare(THETA, order.q, coef_prior);
        if order.seasonal_active() {
            declare(SEASONAL_PHI, order.seasonal_p, coef_prior);
            declare(SEASONAL_THETA, order.seasonal_q, coef_prior);
        }
        declare(SIGMA, 1, Prior::HalfNormal { sigma: 1.0 });
        declare(EPS, n + pad, Prior::LatentNoise);

        Ok(Self {
            order,
            observed: differenced.to_vec(),
            params,
            dim: offset,
            start_index: order.start_index(),
            pad,
        })
    }

    /// The order this graph was built for.
    pub fn order(&self) -> &SarimaOrder {
        &self.order
    }

    /// The differenced series the graph is bound to.
    pub fn observed(&self) -> &[f64] {
        &self.observed
    }

    /// Observed values the likelihood binds: `observed[start_index..]`.
    pub fn observed_window(&self) -> &[f64] {
        &self.observed[self.start_index..]
    }

    /// Declared random variables, in flat-vector order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Total length of the flat parameter vector.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// First output position of the mean vector.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Latent noise padding.
    pub fn pad(&self) -> usize {
        self.pad
    }

    /// Look up a declared parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Slice a parameter's block out of a flat point.
    pub fn values<'a>(&self, point: &'a [f64], name: &str) -> &'a [f64] {
        match self.param(name) {
            Some(spec) => &point[spec.offset..spec.offset + spec.len],
            None => &[],
        }
    }

    /// A valid starting point: zero coefficients and noise, unit scale.
    pub fn initial_point(&self) -> Vec<f64> {
        let mut point = vec![0.0; self.dim];
        for spec in &self.params {
            if let Prior::HalfNormal { .. } = spec.prior {
                point[spec.offset..spec.offset + spec.len].fill(1.0);
            }
        }
        point
    }

    /// The deterministic mean vector `mu` over output positions
    /// `t = start_index .. N-1`, evaluated at a flat point.
    ///
    /// All four term families are materialized as explicit loops over the
    /// lag ranges `1..=p`, `1..=q`, `m..=P*m`, `m..=Q*m`; the `pad` shift
    /// keeps every `eps` lookup in bounds.
    pub fn mean(&self, point: &[f64]) -> Vec<f64> {
        let o = &self.order;
        let n = self.observed.len();
        let start = self.start_index;
        let pad = self.pad;

        let phi = self.values(point, PHI);
        let theta = self.values(point, THETA);
        let seasonal_phi = self.values(point, SEASONAL_PHI);
        let seasonal_theta = self.values(point, SEASONAL_THETA);
        let eps = self.values(point, EPS);

        let mut mu = vec![0.0; n - start];
        for (out, t) in (start..n).enumerate() {
            let mut mu_t = 0.0;
            for i in 1..=o.p {
                mu_t += phi[i - 1] * self.observed[t - i];
            }
            if o.seasonal_active() {
                for big_i in 1..=o.seasonal_p {
                    mu_t += seasonal_phi[big_i - 1] * self.observed[t - big_i * o.m];
                }
            }
            for j in 1..=o.q {
                mu_t += theta[j - 1] * eps[t + pad - j];
            }
            if o.seasonal_active() {
                for big_j in 1..=o.seasonal_q {
                    mu_t += seasonal_theta[big_j - 1] * eps[t + pad - big_j * o.m];
                }
            }
            mu[out] = mu_t;
        }
        mu
    }

    /// Unnormalized log posterior density at a flat point.
    ///
    /// Returns negative infinity outside the support (`sigma <= 0`), which
    /// lets samplers reject invalid proposals without special-casing.
    pub fn log_posterior(&self, point: &[f64]) -> f64 {
        debug_assert_eq!(point.len(), self.dim);

        let sigma = self.values(point, SIGMA)[0];
        if !(sigma > 0.0) || !sigma.is_finite() {
            return f64::NEG_INFINITY;
        }

        let mut lp = 0.0;
        for spec in &self.params {
            let block = &point[spec.offset..spec.offset + spec.len];
            match spec.prior {
                Prior::Normal { mu, sigma: prior_sd } => {
                    for &x in block {
                        lp += ln_normal_pdf(x, mu, prior_sd);
                    }
                }
                Prior::HalfNormal { sigma: prior_sd } => {
                    for &x in block {
                        lp += ln_half_normal_pdf(x, prior_sd);
                    }
                }
                Prior::LatentNoise => {
                    for &x in block {
                        lp += ln_normal_pdf(x, 0.0, sigma);
                    }
                }
            }
        }

        let mu = self.mean(point);
        for (mu_t, y_t) in mu.iter().zip(self.observed_window()) {
            lp += ln_normal_pdf(*y_t, *mu_t, sigma);
        }
        lp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.37).sin()).collect()
    }

    #[test]
    fn declares_expected_parameters() {
        let order = SarimaOrder::seasonal(2, 0, 1, 1, 0, 1, 4);
        let graph = ModelGraph::build(order, &series(30)).unwrap();

        let names: Vec<&str> = graph.params().iter().map(|p| p.name).collect();
        assert_eq!(names, vec![PHI, THETA, SEASONAL_PHI, SEASONAL_THETA, SIGMA, EPS]);
        assert_eq!(graph.param(PHI).unwrap().len, 2);
        assert_eq!(graph.param(EPS).unwrap().len, 30 + graph.pad());
        assert_eq!(graph.pad(), 1 + 4);
        assert_eq!(graph.start_index(), 4);
        assert_eq!(graph.dim(), 2 + 1 + 1 + 1 + 1 + 35);
    }

    #[test]
    fn nonseasonal_graph_omits_seasonal_blocks() {
        let order = SarimaOrder::nonseasonal(1, 0, 1);
        let graph = ModelGraph::build(order, &series(20)).unwrap();
        assert!(graph.param(SEASONAL_PHI).is_none());
        assert!(graph.param(SEASONAL_THETA).is_none());
    }

    #[test]
    fn rejects_short_series() {
        let order = SarimaOrder::seasonal(1, 0, 0, 2, 0, 0, 5);
        let err = ModelGraph::build(order, &series(10)).unwrap_err();
        assert_eq!(err, SarimaError::InsufficientData { needed: 11, got: 10 });
    }

    #[test]
    fn accepts_minimum_length_series() {
        let order = SarimaOrder::seasonal(1, 0, 0, 2, 0, 0, 5);
        assert!(ModelGraph::build(order, &series(11)).is_ok());
    }

    #[test]
    fn white_noise_mean_is_zero() {
        // p = q = 0, nonseasonal: the likelihood reduces to Normal(0, sigma).
        let order = SarimaOrder::nonseasonal(0, 0, 0);
        let graph = ModelGraph::build(order, &series(15)).unwrap();
        let point = graph.initial_point();
        let mu = graph.mean(&point);
        assert_eq!(mu.len(), 15);
        assert!(mu.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn mean_aligns_ar_lags() {
        let y = vec![1.0, 2.0, 4.0, 8.0, 16.0];
        let order = SarimaOrder::nonseasonal(2, 0, 0);
        let graph = ModelGraph::build(order, &y).unwrap();

        let mut point = graph.initial_point();
        let phi = graph.param(PHI).unwrap();
        point[phi.offset] = 0.5; // phi_1
        point[phi.offset + 1] = 0.25; // phi_2

        // mu_t = 0.5 * y[t-1] + 0.25 * y[t-2] for t = 2, 3, 4.
        let mu = graph.mean(&point);
        assert_eq!(mu.len(), 3);
        assert_relative_eq!(mu[0], 0.5 * 2.0 + 0.25 * 1.0);
        assert_relative_eq!(mu[1], 0.5 * 4.0 + 0.25 * 2.0);
        assert_relative_eq!(mu[2], 0.5 * 8.0 + 0.25 * 4.0);
    }

    #[test]
    fn mean_aligns_seasonal_ar_lags() {
        let y: Vec<f64> = (1..=9).map(|i| i as f64).collect();
        let order = SarimaOrder::seasonal(0, 0, 0, 2, 0, 0, 3);
        let graph = ModelGraph::build(order, &y).unwrap();

        let mut point = graph.initial_point();
        let sphi = graph.param(SEASONAL_PHI).unwrap();
        point[sphi.offset] = 1.0; // PHI_1, lag m
        point[sphi.offset + 1] = -1.0; // PHI_2, lag 2m

        // start_index = 6; mu_t = y[t-3] - y[t-6].
        let mu = graph.mean(&point);
        assert_eq!(mu.len(), 3);
        assert_relative_eq!(mu[0], 4.0 - 1.0);
        assert_relative_eq!(mu[1], 5.0 - 2.0);
        assert_relative_eq!(mu[2], 6.0 - 3.0);
    }

    #[test]
    fn mean_aligns_ma_lags_through_padding() {
        let y = vec![0.5, -0.5, 0.25, -0.25];
        let order = SarimaOrder::nonseasonal(0, 0, 2);
        let graph = ModelGraph::build(order, &y).unwrap();
        assert_eq!(graph.start_index(), 0);
        assert_eq!(graph.pad(), 2);

        let mut point = graph.initial_point();
        let theta = graph.param(THETA).unwrap();
        let eps = graph.param(EPS).unwrap();
        point[theta.offset] = 1.0; // theta_1
        point[theta.offset + 1] = 10.0; // theta_2
        for (k, v) in (0..eps.len).zip([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]) {
            point[eps.offset + k] = v;
        }

        // mu_t = eps[t + 2 - 1] + 10 * eps[t + 2 - 2], t = 0..3.
        let mu = graph.mean(&point);
        assert_relative_eq!(mu[0], 2.0 + 10.0 * 1.0);
        assert_relative_eq!(mu[1], 3.0 + 10.0 * 2.0);
        assert_relative_eq!(mu[2], 4.0 + 10.0 * 3.0);
        assert_relative_eq!(mu[3], 5.0 + 10.0 * 4.0);
    }

    #[test]
    fn mean_aligns_seasonal_ma_lags_through_padding() {
        let y = vec![0.1; 7];
        let order = SarimaOrder::seasonal(0, 0, 0, 0, 0, 2, 3);
        let graph = ModelGraph::build(order, &y).unwrap();
        assert_eq!(graph.start_index(), 0);
        assert_eq!(graph.pad(), 6); // Q*m

        let mut point = graph.initial_point();
        let stheta = graph.param(SEASONAL_THETA).unwrap();
        let eps = graph.param(EPS).unwrap();
        point[stheta.offset] = 1.0; // THETA_1, lag m
        point[stheta.offset + 1] = 10.0; // THETA_2, lag 2m
        for k in 0..eps.len {
            point[eps.offset + k] = (k + 1) as f64;
        }

        // mu_t = eps[t + 6 - 3] + 10 * eps[t + 6 - 6], t = 0..7.
        let mu = graph.mean(&point);
        assert_eq!(mu.len(), 7);
        for t in 0..7 {
            assert_relative_eq!(mu[t], (t + 4) as f64 + 10.0 * (t + 1) as f64);
        }
    }

    #[test]
    fn log_posterior_rejects_nonpositive_sigma() {
        let order = SarimaOrder::nonseasonal(1, 0, 1);
        let graph = ModelGraph::build(order, &series(12)).unwrap();
        let mut point = graph.initial_point();
        let sigma = graph.param(SIGMA).unwrap();
        point[sigma.offset] = 0.0;
        assert_eq!(graph.log_posterior(&point), f64::NEG_INFINITY);
        point[sigma.offset] = -1.0;
        assert_eq!(graph.log_posterior(&point), f64::NEG_INFINITY);
    }

    #[test]
    fn log_posterior_is_finite_at_initial_point() {
        let order = SarimaOrder::seasonal(1, 0, 1, 1, 0, 1, 4);
        let graph = ModelGraph::build(order, &series(30)).unwrap();
        let lp = graph.log_posterior(&graph.initial_point());
        assert!(lp.is_finite());
    }

    #[test]
    fn log_posterior_prefers_better_fit() {
        // AR(1) data with coefficient 0.8: the true coefficient should score
        // higher than a sign-flipped one.
        let mut y = vec![1.0];
        for i in 1..40 {
            y.push(0.8 * y[i - 1] + ((i * 7) % 5) as f64 * 0.01);
        }
        let order = SarimaOrder::nonseasonal(1, 0, 0);
        let graph = ModelGraph::build(order, &y).unwrap();

        let phi = graph.param(PHI).unwrap();
        let mut good = graph.initial_point();
        good[phi.offset] = 0.8;
        let mut bad = graph.initial_point();
        bad[phi.offset] = -0.8;

        assert!(graph.log_posterior(&good) > graph.log_posterior(&bad));
    }
}
