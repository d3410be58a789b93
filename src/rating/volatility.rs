//! Volatility solver
//!
//! Finds the new log-volatility `A` as the root of
//!
//! ```text
//! F(x) = e^x (Δ² − φ² − v − e^x) / (2 (φ² + v + e^x)²) − (x − a) / τ²,   a = ln σ²
//! ```
//!
//! using the Illinois variant of regula falsi. Both the bracket search and the
//! root iteration are bounded by `max_iterations`.

use crate::config::GlickoConfig;
use crate::error::{RatingError, Result};
use tracing::{debug, warn};

/// Precomputed terms of `F` for one update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityInputs {
    /// Δ², the squared estimated improvement
    pub delta_sq: f64,
    /// φ², the squared pre-update deviation
    pub phi_sq: f64,
    /// v, the estimated variance from the match outcomes
    pub variance: f64,
    /// a = ln(σ²)
    pub a: f64,
    /// τ²
    pub tau_sq: f64,
}

impl VolatilityInputs {
    pub fn new(delta: f64, variance: f64, phi: f64, sigma: f64, tau: f64) -> Self {
        Self {
            delta_sq: delta * delta,
            phi_sq: phi * phi,
            variance,
            a: (sigma * sigma).ln(),
            tau_sq: tau * tau,
        }
    }

    /// Evaluate `F(x)`
    pub fn f(&self, x: f64) -> f64 {
        let ex = x.exp();
        let num = ex * (self.delta_sq - self.phi_sq - self.variance - ex);
        let den = self.phi_sq + self.variance + ex;

        num / (2.0 * den * den) - (x - self.a) / self.tau_sq
    }
}

/// Interval `[a, b]` over which `F` changes sign
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub a: f64,
    pub f_a: f64,
    pub b: f64,
    pub f_b: f64,
}

/// Illinois regula falsi solver for the new volatility
#[derive(Debug, Clone, Copy)]
pub struct VolatilitySolver {
    tau: f64,
    epsilon: f64,
    max_iterations: u32,
}

impl VolatilitySolver {
    pub fn new(tau: f64, epsilon: f64, max_iterations: u32) -> Self {
        Self {
            tau,
            epsilon,
            max_iterations,
        }
    }

    pub fn from_config(config: &GlickoConfig) -> Self {
        Self::new(
            config.system_constant,
            config.convergence,
            config.max_iterations,
        )
    }

    pub fn inputs(&self, delta: f64, variance: f64, phi: f64, sigma: f64) -> VolatilityInputs {
        VolatilityInputs::new(delta, variance, phi, sigma, self.tau)
    }

    /// Select the initial interval for the iteration
    pub fn bracket(&self, inputs: &VolatilityInputs) -> Result<Bracket> {
        let a = inputs.a;
        if !a.is_finite() {
            return Err(RatingError::invalid(format!(
                "volatility must be positive and finite, ln(σ²) = {a}"
            )));
        }
        let b_test = inputs.delta_sq - inputs.phi_sq - inputs.variance;

        let b = if b_test > 0.0 {
            b_test.ln()
        } else {
            let mut k = 1u32;
            let mut b = a - self.tau;
            while inputs.f(b) < 0.0 {
                if k >= self.max_iterations {
                    warn!(k, "volatility bracket search exhausted its step budget");
                    return Err(RatingError::Unconverged { iterations: k });
                }
                k += 1;
                b = a - f64::from(k) * self.tau;
            }
            b
        };

        let bracket = Bracket {
            a,
            f_a: inputs.f(a),
            b,
            f_b: inputs.f(b),
        };
        if !(bracket.b.is_finite() && bracket.f_a.is_finite() && bracket.f_b.is_finite()) {
            warn!(?bracket, "volatility bracket is not finite");
            return Err(RatingError::invalid("volatility bracket is not finite"));
        }

        Ok(bracket)
    }

    /// Return the root `A` of `F`; the new volatility is `exp(A / 2)`
    pub fn solve(&self, inputs: &VolatilityInputs) -> Result<f64> {
        let Bracket {
            mut a,
            mut f_a,
            mut b,
            mut f_b,
        } = self.bracket(inputs)?;

        let mut iterations = 0u32;
        while (b - a).abs() > self.epsilon {
            if iterations >= self.max_iterations {
                warn!(iterations, a, b, "volatility iteration did not converge");
                return Err(RatingError::Unconverged { iterations });
            }
            iterations += 1;

            let c = a + (a - b) * f_a / (f_b - f_a);
            if !c.is_finite() {
                warn!(iterations, a, b, "volatility iteration produced a non-finite step");
                return Err(RatingError::Unconverged { iterations });
            }
            let f_c = inputs.f(c);

            if f_c * f_b < 0.0 {
                a = b;
                f_a = f_b;
            } else {
                // Illinois step
                f_a /= 2.0;
            }

            b = c;
            f_b = f_c;
        }

        if !a.is_finite() {
            return Err(RatingError::Unconverged { iterations });
        }

        debug!(iterations, root = a, "volatility solver converged");
        Ok(a)
    }

    /// Convenience wrapper returning the new volatility σ'
    pub fn new_volatility(&self, delta: f64, variance: f64, phi: f64, sigma: f64) -> Result<f64> {
        let inputs = self.inputs(delta, variance, phi, sigma);
        Ok((self.solve(&inputs)? / 2.0).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // Intermediate values from the worked example in Glickman's Glicko-2 paper
    const PAPER_DELTA: f64 = -0.4839332;
    const PAPER_V: f64 = 1.7789770;
    const PAPER_PHI: f64 = 1.1512924;
    const PAPER_SIGMA: f64 = 0.06;

    fn solver() -> VolatilitySolver {
        VolatilitySolver::from_config(&GlickoConfig::default())
    }

    #[test]
    fn test_paper_volatility() {
        let sigma = solver()
            .new_volatility(PAPER_DELTA, PAPER_V, PAPER_PHI, PAPER_SIGMA)
            .unwrap();
        assert_abs_diff_eq!(sigma, 0.05999, epsilon = 0.0001);
    }

    #[test]
    fn test_f_is_zero_at_root() {
        let solver = solver();
        let inputs = solver.inputs(PAPER_DELTA, PAPER_V, PAPER_PHI, PAPER_SIGMA);
        let root = solver.solve(&inputs).unwrap();
        assert_abs_diff_eq!(inputs.f(root), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_bracket_by_stepping_down() {
        // Δ² < φ² + v, so B is found by stepping a − kτ
        let solver = solver();
        let inputs = solver.inputs(PAPER_DELTA, PAPER_V, PAPER_PHI, PAPER_SIGMA);
        assert!(inputs.delta_sq - inputs.phi_sq - inputs.variance <= 0.0);

        let bracket = solver.bracket(&inputs).unwrap();
        assert_eq!(bracket.a, inputs.a);
        assert!(bracket.b < bracket.a);
        assert!(bracket.f_a * bracket.f_b <= 0.0);
    }

    #[test]
    fn test_bracket_from_log() {
        // Large surprise: Δ² > φ² + v, so B = ln(Δ² − φ² − v)
        let solver = solver();
        let inputs = solver.inputs(4.0, 0.5, 0.3, 0.06);
        let expected_b = (16.0f64 - 0.09 - 0.5).ln();

        let bracket = solver.bracket(&inputs).unwrap();
        assert_abs_diff_eq!(bracket.b, expected_b, epsilon = 1e-12);
        assert!(bracket.f_a * bracket.f_b <= 0.0);

        let sigma = solver.new_volatility(4.0, 0.5, 0.3, 0.06).unwrap();
        assert!(sigma > 0.06);
    }

    #[test]
    fn test_iteration_bound() {
        let tight = VolatilitySolver::new(0.5, 1e-300, 3);
        let inputs = tight.inputs(PAPER_DELTA, PAPER_V, PAPER_PHI, PAPER_SIGMA);
        assert_eq!(
            tight.solve(&inputs),
            Err(RatingError::Unconverged { iterations: 3 })
        );
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        let solver = solver();

        // σ = 0 gives a = ln 0 = −∞
        let inputs = solver.inputs(PAPER_DELTA, PAPER_V, PAPER_PHI, 0.0);
        assert!(matches!(
            solver.bracket(&inputs),
            Err(RatingError::InvalidInput { .. })
        ));
        assert!(matches!(
            solver.new_volatility(PAPER_DELTA, PAPER_V, PAPER_PHI, 0.0),
            Err(RatingError::InvalidInput { .. })
        ));

        let inputs = solver.inputs(f64::NAN, PAPER_V, PAPER_PHI, PAPER_SIGMA);
        assert!(matches!(
            solver.solve(&inputs),
            Err(RatingError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_bracket_search_bound() {
        // With a huge σ the first term of F sits near −½ and (x − a)/τ² only
        // outweighs it after several a − kτ steps
        let patient = VolatilitySolver::new(10.0, 1e-6, 100);
        let inputs = patient.inputs(PAPER_DELTA, PAPER_V, PAPER_PHI, 1e30);
        let bracket = patient.bracket(&inputs).unwrap();
        assert!(bracket.b <= inputs.a - 4.0 * 10.0);
        assert!(bracket.f_a < 0.0);
        assert!(bracket.f_b >= 0.0);

        let hasty = VolatilitySolver::new(10.0, 1e-6, 3);
        assert_eq!(
            hasty.bracket(&inputs),
            Err(RatingError::Unconverged { iterations: 3 })
        );
    }
}
