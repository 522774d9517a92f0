//! Goldfarb–Idnani dual active-set method.
//!
//! Phases
//! 1. Factorize: `Q = L Lᵀ`, `J = L⁻ᵀ`, unconstrained minimizer `x = J Jᵀ c`.
//! 2. Add equalities: each equality row enters the active set with a full step.
//! 3. Select: pick the most violated inactive inequality; stop when none is.
//! 4. Direction: `d = Jᵀ n⁺`, primal step `z` in the null space of the active
//!    normals, dual step `r = R⁻¹ d₁`.
//! 5. Step: the shorter of the partial (dual feasibility) and full (primal
//!    feasibility) step lengths. A full step activates the constraint; a
//!    partial step drops the blocking active inequality and repeats phase 4.
//!
//! `J` and the upper-triangular `R` are kept consistent with the active set by
//! Givens rotations on insertion and deletion.

use nalgebra::{Cholesky, DMatrix, DVector};
use tracing::trace;

use super::{QpError, QpProblem, QpSolution};
use crate::cfg::VSMALL;

/// Solve the QP. Validates dimensions first.
pub fn solve_qp(problem: &QpProblem) -> Result<QpSolution, QpError> {
    problem.validate()?;
    let solver = ActiveSet::factorize(problem)?;
    solver.run()
}

/// Solver state. `u` has one extra slot for the constraint being added.
struct ActiveSet<'a> {
    p: &'a QpProblem,
    n: usize,
    j: DMatrix<f64>,
    r: DMatrix<f64>,
    r_norm: f64,
    x: DVector<f64>,
    u: Vec<f64>,
    active: Vec<usize>,
    /// Scale of the "no infeasibility left" test (≈ cond(Q) estimate).
    psi_tol: f64,
    iterations: usize,
    max_iterations: usize,
}

impl<'a> ActiveSet<'a> {
    fn factorize(p: &'a QpProblem) -> Result<Self, QpError> {
        let n = p.dim();
        let chol = Cholesky::new(p.q.clone()).ok_or(QpError::NotPositiveDefinite)?;
        let l = chol.l();
        let scale = p.q.diagonal().amax().max(1.0);
        if (0..n).any(|i| !(l[(i, i)] > VSMALL * scale.sqrt()) || !l[(i, i)].is_finite()) {
            return Err(QpError::NotPositiveDefinite);
        }
        let j = l
            .transpose()
            .solve_upper_triangular(&DMatrix::identity(n, n))
            .ok_or(QpError::NotPositiveDefinite)?;
        let x = &j * (j.transpose() * &p.c);
        let q_rows = p.num_constraints();
        let c1 = p.q.trace();
        let c2 = j.trace();
        let psi_tol = (q_rows - p.meq) as f64 * f64::EPSILON * c1 * c2 * 100.0;
        Ok(Self {
            p,
            n,
            j,
            r: DMatrix::zeros(n, n),
            r_norm: 1.0,
            x,
            u: vec![0.0; n + 1],
            active: Vec::with_capacity(n),
            psi_tol,
            iterations: 0,
            max_iterations: 50 * (n + q_rows) + 100,
        })
    }

    fn run(mut self) -> Result<QpSolution, QpError> {
        self.add_equalities()?;
        loop {
            self.tick()?;
            let slack = self.slacks();
            let psi: f64 = (self.p.meq..slack.len()).map(|i| slack[i].min(0.0)).sum();
            if psi.abs() <= self.psi_tol {
                return Ok(self.finish());
            }
            let Some(ip) = self.most_violated(&slack) else {
                return Ok(self.finish());
            };
            self.enter(ip, slack[ip])?;
        }
    }

    fn tick(&mut self) -> Result<(), QpError> {
        self.iterations += 1;
        if self.iterations > self.max_iterations {
            return Err(QpError::Infeasible);
        }
        Ok(())
    }

    /// `A x − b` for every row.
    fn slacks(&self) -> DVector<f64> {
        &self.p.a * &self.x - &self.p.b
    }

    fn row(&self, i: usize) -> DVector<f64> {
        self.p.a.row(i).transpose()
    }

    /// Phase 2: equalities enter first with full steps.
    fn add_equalities(&mut self) -> Result<(), QpError> {
        for i in 0..self.p.meq {
            let np = self.row(i);
            let (mut d, z, r) = self.direction(&np);
            let iq = self.active.len();
            let zn = z.dot(&np);
            let t2 = if z.dot(&z).abs() > VSMALL && zn.abs() > VSMALL {
                (self.p.b[i] - np.dot(&self.x)) / zn
            } else {
                0.0
            };
            self.x += &z * t2;
            self.u[iq] = t2;
            for k in 0..iq {
                self.u[k] -= t2 * r[k];
            }
            if !self.add_constraint(i, &mut d) {
                return Err(QpError::DependentConstraints { row: i });
            }
        }
        Ok(())
    }

    /// Phase 3: most negative slack among inactive inequalities.
    fn most_violated(&self, slack: &DVector<f64>) -> Option<usize> {
        let mut best = 0.0;
        let mut pick = None;
        for i in self.p.meq..slack.len() {
            if slack[i] < best && !self.active.contains(&i) {
                best = slack[i];
                pick = Some(i);
            }
        }
        pick
    }

    /// Phases 4–5 for constraint `ip` with current slack `s`.
    fn enter(&mut self, ip: usize, mut s: f64) -> Result<(), QpError> {
        let np = self.row(ip);
        let iq0 = self.active.len();
        self.u[iq0] = 0.0;
        loop {
            let (mut d, z, r) = self.direction(&np);
            let iq = self.active.len();

            // Partial step: largest dual step keeping active inequality multipliers >= 0.
            let mut t1 = f64::INFINITY;
            let mut block = None;
            for k in self.p.meq..iq {
                if r[k] > 0.0 {
                    let tmp = self.u[k] / r[k];
                    if tmp < t1 {
                        t1 = tmp;
                        block = Some(k);
                    }
                }
            }
            // Full step: primal step that makes `ip` tight.
            let zn = z.dot(&np);
            let t2 = if z.dot(&z).abs() > VSMALL && zn.abs() > VSMALL {
                -s / zn
            } else {
                f64::INFINITY
            };
            let t = t1.min(t2);
            if !t.is_finite() {
                return Err(QpError::Infeasible);
            }

            if !t2.is_finite() {
                // Dual-only step, then drop the blocking constraint.
                for k in 0..iq {
                    self.u[k] -= t * r[k];
                }
                self.u[iq] += t;
                if let Some(k) = block {
                    self.drop_constraint(k);
                }
                self.tick()?;
                continue;
            }

            self.x += &z * t;
            for k in 0..iq {
                self.u[k] -= t * r[k];
            }
            self.u[iq] += t;

            if t2 <= t1 {
                if !self.add_constraint(ip, &mut d) {
                    return Err(QpError::DependentConstraints { row: ip });
                }
                trace!(row = ip, active = self.active.len(), "qp constraint added");
                return Ok(());
            }

            if let Some(k) = block {
                self.drop_constraint(k);
            }
            s = np.dot(&self.x) - self.p.b[ip];
            self.tick()?;
        }
    }

    /// Phase 4: `d = Jᵀ np`, `z = J₂ d₂`, `r = R⁻¹ d₁`.
    fn direction(&self, np: &DVector<f64>) -> (DVector<f64>, DVector<f64>, DVector<f64>) {
        let iq = self.active.len();
        let d = self.j.transpose() * np;
        let mut z = DVector::zeros(self.n);
        for k in iq..self.n {
            z.axpy(d[k], &self.j.column(k), 1.0);
        }
        let mut r = DVector::zeros(iq);
        for i in (0..iq).rev() {
            let mut sum = d[i];
            for k in (i + 1)..iq {
                sum -= self.r[(i, k)] * r[k];
            }
            r[i] = sum / self.r[(i, i)];
        }
        (d, z, r)
    }

    /// Rotate `d` so only its first `iq + 1` entries are non-zero, then append
    /// it as the new last column of `R`. False when the new normal is
    /// (numerically) dependent on the active ones.
    fn add_constraint(&mut self, id: usize, d: &mut DVector<f64>) -> bool {
        let n = self.n;
        let iq = self.active.len();
        if iq >= n {
            return false;
        }
        for jj in ((iq + 1)..n).rev() {
            let (mut cc, mut ss) = (d[jj - 1], d[jj]);
            let h = cc.hypot(ss);
            if h == 0.0 {
                continue;
            }
            d[jj] = 0.0;
            ss /= h;
            cc /= h;
            if cc < 0.0 {
                cc = -cc;
                ss = -ss;
                d[jj - 1] = -h;
            } else {
                d[jj - 1] = h;
            }
            let xny = ss / (1.0 + cc);
            for k in 0..n {
                let t1 = self.j[(k, jj - 1)];
                let t2 = self.j[(k, jj)];
                self.j[(k, jj - 1)] = t1 * cc + t2 * ss;
                self.j[(k, jj)] = xny * (t1 + self.j[(k, jj - 1)]) - t2;
            }
        }
        self.active.push(id);
        let iq = iq + 1;
        for i in 0..iq {
            self.r[(i, iq - 1)] = d[i];
        }
        if d[iq - 1].abs() <= VSMALL * self.r_norm {
            return false;
        }
        self.r_norm = self.r_norm.max(d[iq - 1].abs());
        true
    }

    /// Remove the active constraint at position `pos` and restore the
    /// triangular shape of `R` (and matching columns of `J`).
    fn drop_constraint(&mut self, pos: usize) {
        let n = self.n;
        let iq = self.active.len();
        self.active.remove(pos);
        for i in pos..iq {
            self.u[i] = self.u[i + 1];
        }
        self.u[iq] = 0.0;
        for i in pos..iq - 1 {
            for row in 0..n {
                self.r[(row, i)] = self.r[(row, i + 1)];
            }
        }
        for row in 0..iq {
            self.r[(row, iq - 1)] = 0.0;
        }
        let iq = iq - 1;
        for jj in pos..iq {
            let (mut cc, mut ss) = (self.r[(jj, jj)], self.r[(jj + 1, jj)]);
            let h = cc.hypot(ss);
            if h == 0.0 {
                continue;
            }
            cc /= h;
            ss /= h;
            self.r[(jj + 1, jj)] = 0.0;
            if cc < 0.0 {
                self.r[(jj, jj)] = -h;
                cc = -cc;
                ss = -ss;
            } else {
                self.r[(jj, jj)] = h;
            }
            let xny = ss / (1.0 + cc);
            for k in (jj + 1)..iq {
                let t1 = self.r[(jj, k)];
                let t2 = self.r[(jj + 1, k)];
                self.r[(jj, k)] = t1 * cc + t2 * ss;
                self.r[(jj + 1, k)] = xny * (t1 + self.r[(jj, k)]) - t2;
            }
            for k in 0..n {
                let t1 = self.j[(k, jj)];
                let t2 = self.j[(k, jj + 1)];
                self.j[(k, jj)] = t1 * cc + t2 * ss;
                self.j[(k, jj + 1)] = xny * (self.j[(k, jj)] + t1) - t2;
            }
        }
    }

    fn finish(self) -> QpSolution {
        let value = 0.5 * self.x.dot(&(&self.p.q * &self.x)) - self.p.c.dot(&self.x);
        let iq = self.active.len();
        QpSolution {
            x: self.x,
            value,
            multipliers: self.u[..iq].to_vec(),
            active: self.active,
            iterations: self.iterations,
        }
    }
}
