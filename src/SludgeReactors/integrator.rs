//! Fixed-step 4th-order Runge-Kutta for the mass balance of one zone.
//!
//! k1 = f(x), k2 = f(x + h/2 k1), k3 = f(x + h/2 k2), k4 = f(x + h k3),
//! x_new = x + h/6 (k1 + 2 k2 + 2 k3 + k4)
//!
//! After each step negative concentrations are clamped to zero and counted per component,
//! so a run can tell how often (and where) the step size was too coarse.
use crate::ASM2d::state_vector::{ComponentVector, N_COMPONENTS, clamp_non_negative};

#[derive(Debug, Clone)]
pub struct ZoneIntegrator {
    /// d
    pub time_step: f64,
    pub step_count: u64,
    /// negative-value clamps per component over the run
    pub clamp_events: [u64; N_COMPONENTS],
    k1: ComponentVector,
    k2: ComponentVector,
    k3: ComponentVector,
    k4: ComponentVector,
}

impl ZoneIntegrator {
    pub fn new(time_step: f64) -> Self {
        Self {
            time_step,
            step_count: 0,
            clamp_events: [0; N_COMPONENTS],
            k1: ComponentVector::zeros(),
            k2: ComponentVector::zeros(),
            k3: ComponentVector::zeros(),
            k4: ComponentVector::zeros(),
        }
    }

    /// Advances `x` by one step; returns the number of components clamped at this step
    pub fn step<F>(&mut self, x: &mut ComponentVector, derivatives: F) -> usize
    where
        F: Fn(&ComponentVector) -> ComponentVector,
    {
        let h = self.time_step;
        self.k1 = derivatives(x);
        self.k2 = derivatives(&(*x + self.k1 * (0.5 * h)));
        self.k3 = derivatives(&(*x + self.k2 * (0.5 * h)));
        self.k4 = derivatives(&(*x + self.k3 * h));
        *x += (self.k1 + self.k2 * 2.0 + self.k3 * 2.0 + self.k4) * (h / 6.0);

        let clamped = clamp_non_negative(x);
        for &i in &clamped {
            self.clamp_events[i] += 1;
        }
        self.step_count += 1;
        clamped.len()
    }

    pub fn total_clamps(&self) -> u64 {
        self.clamp_events.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn integrate<F>(integrator: &mut ZoneIntegrator, x: &mut ComponentVector, f: F, duration: f64)
    where
        F: Fn(&ComponentVector) -> ComponentVector,
    {
        let n_steps = (duration / integrator.time_step).round() as usize;
        for _ in 0..n_steps {
            integrator.step(x, &f);
        }
    }

    #[test]
    fn first_order_decay() {
        let mut integrator = ZoneIntegrator::new(0.01);
        let mut x = ComponentVector::from_element(1.0);
        integrate(&mut integrator, &mut x, |state| -state, 1.0);
        assert_eq!(integrator.step_count, 100);
        for i in 0..N_COMPONENTS {
            assert_relative_eq!(x[i], (-1.0_f64).exp(), epsilon = 1e-8);
        }
        assert_eq!(integrator.total_clamps(), 0);
    }

    #[test]
    fn cstr_washout_approaches_inflow() {
        // dx/dt = D (x_in - x)
        let dilution = 2.0;
        let inflow = ComponentVector::from_element(10.0);
        let mut integrator = ZoneIntegrator::new(0.001);
        let mut x = ComponentVector::zeros();
        integrate(&mut integrator, &mut x, |state| (inflow - state) * dilution, 1.0);
        let expected = 10.0 * (1.0 - (-2.0_f64).exp());
        assert_relative_eq!(x[3], expected, epsilon = 1e-9);
    }

    #[test]
    fn overshoot_is_clamped_and_counted() {
        let mut integrator = ZoneIntegrator::new(1.0);
        let mut x = ComponentVector::from_element(1.0);
        // constant consumption far larger than the stock
        let clamped = integrator.step(&mut x, |_| ComponentVector::from_element(-5.0));
        assert_eq!(clamped, N_COMPONENTS);
        assert!(x.iter().all(|&v| v == 0.0));
        assert_eq!(integrator.clamp_events[0], 1);
        assert_eq!(integrator.total_clamps(), N_COMPONENTS as u64);
        assert_eq!(integrator.step_count, 1);
    }
}
