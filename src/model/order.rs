//! SARIMA order specification and the index arithmetic derived from it.

use crate::error::{Result, SarimaError};
use serde::{Deserialize, Serialize};

/// A SARIMA `(p, d, q)(P, D, Q)[m]` order specification.
///
/// `seasonal` is authoritative: when it is `false`, the seasonal orders are
/// inert even if nonzero. Seasonal terms additionally require `m > 1` to
/// contribute anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaOrder {
    /// AR order (p).
    pub p: usize,
    /// Differencing order (d).
    pub d: usize,
    /// MA order (q).
    pub q: usize,
    /// Whether seasonal terms are enabled.
    pub seasonal: bool,
    /// Seasonal period (m).
    pub m: usize,
    /// Seasonal AR order (P).
    pub seasonal_p: usize,
    /// Seasonal differencing order (D).
    pub seasonal_d: usize,
    /// Seasonal MA order (Q).
    pub seasonal_q: usize,
}

impl SarimaOrder {
    /// Create a nonseasonal ARIMA(p, d, q) order.
    pub fn nonseasonal(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            seasonal: false,
            m: 1,
            seasonal_p: 0,
            seasonal_d: 0,
            seasonal_q: 0,
        }
    }

    /// Create a full seasonal SARIMA(p, d, q)(P, D, Q)\[m\] order.
    pub fn seasonal(
        p: usize,
        d: usize,
        q: usize,
        seasonal_p: usize,
        seasonal_d: usize,
        seasonal_q: usize,
        m: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            seasonal: true,
            m,
            seasonal_p,
            seasonal_d,
            seasonal_q,
        }
    }

    /// Validate the order parameters.
    pub fn validate(&self) -> Result<()> {
        if self.m == 0 {
            return Err(SarimaError::InvalidParameter(
                "seasonal period m must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether seasonal AR/MA/differencing terms actually contribute.
    pub fn seasonal_active(&self) -> bool {
        self.seasonal && self.m > 1
    }

    /// First output position of the mean vector: `max(p, seasonal ? P*m : 0)`.
    ///
    /// Every AR lag `t - i` and seasonal AR lag `t - I*m` stays in bounds
    /// for `t >= start_index`.
    pub fn start_index(&self) -> usize {
        let seasonal_reach = if self.seasonal {
            self.seasonal_p * self.m
        } else {
            0
        };
        self.p.max(seasonal_reach)
    }

    /// Latent noise padding: `q + (seasonal ? Q*m : 0)`.
    ///
    /// The padding guarantees MA lookups `eps[t + pad - j]` never index
    /// before position zero, even at `t = start_index` with the deepest lag.
    pub fn pad(&self) -> usize {
        self.q
            + if self.seasonal {
                self.seasonal_q * self.m
            } else {
                0
            }
    }

    /// Number of trailing latent noise values that seed the MA window.
    pub fn q_total(&self) -> usize {
        self.pad()
    }

    /// Trailing differenced observations required to seed a forecast:
    /// `max(p, seasonal-active ? P*m : 0)`.
    pub fn required_observations(&self) -> usize {
        let seasonal_reach = if self.seasonal_active() {
            self.seasonal_p * self.m
        } else {
            0
        };
        self.p.max(seasonal_reach)
    }

    /// Minimum differenced length for training: `max(p, q, P*m, Q*m) + 1`.
    pub fn min_train_len(&self) -> usize {
        self.p
            .max(self.q)
            .max(self.seasonal_p * self.m)
            .max(self.seasonal_q * self.m)
            + 1
    }
}

impl Default for SarimaOrder {
    fn default() -> Self {
        Self::nonseasonal(1, 1, 1)
    }
}
