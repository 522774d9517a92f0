//! Derivative-free local minimization.
//!
//! `Minimizer` is the black-box seam the placement optimizer calls once per
//! annealing round; `NelderMead` is the default implementation.

use tracing::trace;

/// Local minimizer of `f` starting from `x0`.
pub trait Minimizer {
    fn minimize(&self, f: &dyn Fn(&[f64]) -> f64, x0: &[f64]) -> Vec<f64>;
}

/// Result of a Nelder–Mead run.
#[derive(Clone, Debug)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

/// Downhill simplex with the usual coefficient names.
///
/// Stops when both the spread of the simplex values is `<= f_tol` and every
/// vertex lies within `x_tol` (max-norm) of the best one, or after
/// `max_iterations` (default `200 * n`).
#[derive(Clone, Copy, Debug)]
pub struct NelderMead {
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
    pub f_tol: f64,
    pub x_tol: f64,
    pub max_iterations: Option<usize>,
    /// Relative initial step for non-zero coordinates.
    pub nonzero_step: f64,
    /// Absolute initial step for zero coordinates.
    pub zero_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            f_tol: 1e-6,
            x_tol: 1e-5,
            max_iterations: None,
            nonzero_step: 0.05,
            zero_step: 0.001,
        }
    }
}

impl NelderMead {
    pub fn with_tolerances(mut self, f_tol: f64, x_tol: f64) -> Self {
        self.f_tol = f_tol.max(0.0);
        self.x_tol = x_tol.max(0.0);
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations.max(1));
        self
    }

    pub fn run(&self, f: &dyn Fn(&[f64]) -> f64, x0: &[f64]) -> Minimum {
        let n = x0.len();
        let eval = |x: &[f64]| {
            let v = f(x);
            if v.is_nan() {
                f64::INFINITY
            } else {
                v
            }
        };
        if n == 0 {
            return Minimum {
                x: Vec::new(),
                value: eval(x0),
                iterations: 0,
            };
        }

        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(x0.to_vec());
        for k in 0..n {
            let mut v = x0.to_vec();
            v[k] = if v[k] != 0.0 {
                v[k] * (1.0 + self.nonzero_step)
            } else {
                self.zero_step
            };
            simplex.push(v);
        }
        let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

        let max_iterations = self.max_iterations.unwrap_or(200 * n);
        let mut iterations = 0;
        while iterations < max_iterations {
            order_simplex(&mut simplex, &mut values);
            if self.converged(&simplex, &values) {
                break;
            }
            iterations += 1;

            let worst = simplex[n].clone();
            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|v| v[j]).sum::<f64>() / n as f64)
                .collect();
            let along = |t: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(&worst)
                    .map(|(c, w)| c + t * (c - w))
                    .collect()
            };

            let xr = along(self.reflection);
            let fr = eval(&xr);
            if fr < values[0] {
                let xe = along(self.reflection * self.expansion);
                let fe = eval(&xe);
                if fe < fr {
                    simplex[n] = xe;
                    values[n] = fe;
                } else {
                    simplex[n] = xr;
                    values[n] = fr;
                }
                continue;
            }
            if fr < values[n - 1] {
                simplex[n] = xr;
                values[n] = fr;
                continue;
            }
            // Contraction: outside when the reflection improved on the worst.
            let (xc, fc, accept) = if fr < values[n] {
                let xc = along(self.reflection * self.contraction);
                let fc = eval(&xc);
                (xc, fc, fc <= fr)
            } else {
                let xc = along(-self.contraction);
                let fc = eval(&xc);
                (xc, fc, fc < values[n])
            };
            if accept {
                simplex[n] = xc;
                values[n] = fc;
                continue;
            }
            let best = simplex[0].clone();
            for i in 1..=n {
                for (v, b) in simplex[i].iter_mut().zip(&best) {
                    *v = b + self.shrink * (*v - b);
                }
                values[i] = eval(&simplex[i]);
            }
        }
        order_simplex(&mut simplex, &mut values);
        trace!(iterations, value = values[0], "nelder-mead finished");
        Minimum {
            x: simplex.swap_remove(0),
            value: values[0],
            iterations,
        }
    }

    fn converged(&self, simplex: &[Vec<f64>], values: &[f64]) -> bool {
        let n = values.len() - 1;
        if !((values[n] - values[0]).abs() <= self.f_tol) {
            return false;
        }
        simplex[1..].iter().all(|v| {
            v.iter()
                .zip(&simplex[0])
                .all(|(a, b)| (a - b).abs() <= self.x_tol)
        })
    }
}

impl Minimizer for NelderMead {
    fn minimize(&self, f: &dyn Fn(&[f64]) -> f64, x0: &[f64]) -> Vec<f64> {
        self.run(f, x0).x
    }
}

/// Sort vertices by value, best first.
fn order_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = idx.iter().map(|&i| simplex[i].clone()).collect();
    *values = idx.iter().map(|&i| values[i]).collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separable_quadratic() {
        let f = |x: &[f64]| (x[0] - 3.0).powi(2) + 10.0 * (x[1] + 1.0).powi(2);
        let m = NelderMead::default().run(&f, &[0.0, 0.0]);
        assert!((m.x[0] - 3.0).abs() < 1e-3, "{:?}", m.x);
        assert!((m.x[1] + 1.0).abs() < 1e-3, "{:?}", m.x);
        assert!(m.value < 1e-5);
    }

    #[test]
    fn rosenbrock_valley() {
        let f = |x: &[f64]| 100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2);
        let nm = NelderMead::default()
            .with_max_iterations(5000)
            .with_tolerances(1e-12, 1e-8);
        let x = nm.minimize(&f, &[-1.2, 1.0]);
        assert!((x[0] - 1.0).abs() < 1e-2 && (x[1] - 1.0).abs() < 1e-2, "{x:?}");
    }

    #[test]
    fn iteration_cap_is_respected() {
        let f = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
        let m = NelderMead::default().with_max_iterations(3).run(&f, &[5.0, 5.0, 5.0]);
        assert!(m.iterations <= 3);
        assert!(m.value <= 75.0);
    }

    #[test]
    fn nan_regions_are_treated_as_uphill() {
        let f = |x: &[f64]| if x[0] < 0.0 { f64::NAN } else { (x[0] - 1.0).powi(2) };
        let m = NelderMead::default().run(&f, &[0.5]);
        assert!(m.value.is_finite());
        assert!((m.x[0] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn empty_start_is_returned_unchanged() {
        let f = |_: &[f64]| 0.0;
        assert!(NelderMead::default().minimize(&f, &[]).is_empty());
    }
}
