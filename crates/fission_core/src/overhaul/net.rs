//! Two-hidden-layer regression network that scores overhaul layouts.
//!
//! Samples are collected as trajectories: feature vectors recorded while a
//! search runs, all labelled with the best fitness that search reached
//! once it finishes. Finished samples land in a bounded replay pool that
//! mini-batch training draws from.

use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use crate::config::TrainerConfig;

const LEAK: f64 = 0.1;
const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

fn leaky(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|v| if v > 0.0 { v } else { LEAK * v })
}

fn leaky_grad(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|v| if v > 0.0 { 1.0 } else { LEAK })
}

/// Fully connected layer with its Adam moments.
#[derive(Debug, Clone)]
struct Dense {
    w: Array2<f64>,
    b: Array1<f64>,
    m_w: Array2<f64>,
    v_w: Array2<f64>,
    m_b: Array1<f64>,
    v_b: Array1<f64>,
}

impl Dense {
    fn new<R: Rng>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let scale = (2.0 / inputs.max(1) as f64).sqrt();
        Self {
            w: Array2::from_shape_fn((inputs, outputs), |_| rng.gen_range(-scale..scale)),
            b: Array1::zeros(outputs),
            m_w: Array2::zeros((inputs, outputs)),
            v_w: Array2::zeros((inputs, outputs)),
            m_b: Array1::zeros(outputs),
            v_b: Array1::zeros(outputs),
        }
    }

    fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        x.dot(&self.w) + &self.b
    }

    fn apply(&mut self, g_w: &Array2<f64>, g_b: &Array1<f64>, lr: f64, t: i32) {
        let c1 = 1.0 - BETA1.powi(t);
        let c2 = 1.0 - BETA2.powi(t);

        self.m_w = &self.m_w * BETA1 + g_w * (1.0 - BETA1);
        self.v_w = &self.v_w * BETA2 + &(g_w * g_w) * (1.0 - BETA2);
        let step_w = (&self.m_w / c1) / ((&self.v_w / c2).mapv(f64::sqrt) + EPSILON);
        self.w.scaled_add(-lr, &step_w);

        self.m_b = &self.m_b * BETA1 + g_b * (1.0 - BETA1);
        self.v_b = &self.v_b * BETA2 + &(g_b * g_b) * (1.0 - BETA2);
        let step_b = (&self.m_b / c1) / ((&self.v_b / c2).mapv(f64::sqrt) + EPSILON);
        self.b.scaled_add(-lr, &step_b);
    }
}

#[derive(Debug, Clone)]
pub struct ValueNet {
    hidden1: Dense,
    hidden2: Dense,
    output: Dense,
    n_features: usize,
    learning_rate: f64,
    mini_batch: usize,
    adam_step: i32,
    pool: Vec<(Array1<f64>, f64)>,
    pool_capacity: usize,
    write_pos: usize,
    trajectory: Vec<Array1<f64>>,
}

impl ValueNet {
    pub fn new<R: Rng>(n_features: usize, config: &TrainerConfig, rng: &mut R) -> Self {
        Self {
            hidden1: Dense::new(n_features, config.hidden1, rng),
            hidden2: Dense::new(config.hidden1, config.hidden2, rng),
            output: Dense::new(config.hidden2, 1, rng),
            n_features,
            learning_rate: config.learning_rate,
            mini_batch: config.mini_batch,
            adam_step: 0,
            pool: Vec::new(),
            pool_capacity: config.pool_capacity,
            write_pos: 0,
            trajectory: Vec::new(),
        }
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Predicted fitness of one feature vector.
    #[must_use]
    pub fn infer(&self, features: &Array1<f64>) -> f64 {
        let x = features.clone().insert_axis(Axis(0));
        let a1 = leaky(&self.hidden1.forward(&x));
        let a2 = leaky(&self.hidden2.forward(&a1));
        self.output.forward(&a2)[[0, 0]]
    }

    pub fn new_trajectory(&mut self) {
        self.trajectory.clear();
    }

    pub fn append_trajectory(&mut self, features: Array1<f64>) {
        self.trajectory.push(features);
    }

    #[must_use]
    pub fn trajectory_len(&self) -> usize {
        self.trajectory.len()
    }

    /// Labels every recorded sample with `target` and moves them into the
    /// pool, overwriting the oldest entries once it is full.
    pub fn finish_trajectory(&mut self, target: f64) {
        for features in self.trajectory.drain(..) {
            if self.pool.len() < self.pool_capacity {
                self.pool.push((features, target));
            } else {
                self.pool[self.write_pos] = (features, target);
            }
            self.write_pos = (self.write_pos + 1) % self.pool_capacity;
        }
    }

    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// One Adam step on a random mini batch; returns the batch MSE, or
    /// `None` while the pool is empty.
    pub fn train<R: Rng>(&mut self, rng: &mut R) -> Option<f64> {
        if self.pool.is_empty() {
            return None;
        }
        let n = self.mini_batch;
        let mut x = Array2::<f64>::zeros((n, self.n_features));
        let mut y = Array1::<f64>::zeros(n);
        for r in 0..n {
            let (features, target) = &self.pool[rng.gen_range(0..self.pool.len())];
            x.row_mut(r).assign(features);
            y[r] = *target;
        }

        let z1 = self.hidden1.forward(&x);
        let a1 = leaky(&z1);
        let z2 = self.hidden2.forward(&a1);
        let a2 = leaky(&z2);
        let out = self.output.forward(&a2);

        let err = &out.column(0) - &y;
        let loss = err.mapv(|e| e * e).mean().unwrap_or(0.0);

        let d_out = (err * (2.0 / n as f64)).insert_axis(Axis(1));
        let g3_w = a2.t().dot(&d_out);
        let g3_b = d_out.sum_axis(Axis(0));
        let d_z2 = d_out.dot(&self.output.w.t()) * leaky_grad(&z2);
        let g2_w = a1.t().dot(&d_z2);
        let g2_b = d_z2.sum_axis(Axis(0));
        let d_z1 = d_z2.dot(&self.hidden2.w.t()) * leaky_grad(&z1);
        let g1_w = x.t().dot(&d_z1);
        let g1_b = d_z1.sum_axis(Axis(0));

        self.adam_step += 1;
        let (lr, t) = (self.learning_rate, self.adam_step);
        self.output.apply(&g3_w, &g3_b, lr, t);
        self.hidden2.apply(&g2_w, &g2_b, lr, t);
        self.hidden1.apply(&g1_w, &g1_b, lr, t);
        Some(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config() -> TrainerConfig {
        TrainerConfig {
            hidden1: 16,
            hidden2: 8,
            mini_batch: 8,
            pool_capacity: 4,
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn test_empty_pool_does_not_train() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut net = ValueNet::new(3, &config(), &mut rng);
        assert!(net.train(&mut rng).is_none());
    }

    #[test]
    fn test_pool_is_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut net = ValueNet::new(2, &config(), &mut rng);
        net.new_trajectory();
        for i in 0..10 {
            net.append_trajectory(Array1::from(vec![i as f64, 1.0]));
        }
        assert_eq!(net.trajectory_len(), 10);
        net.finish_trajectory(1.0);
        assert_eq!(net.trajectory_len(), 0);
        assert_eq!(net.pool_len(), 4);
    }

    #[test]
    fn test_training_fits_constant_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut net = ValueNet::new(2, &config(), &mut rng);
        net.new_trajectory();
        net.append_trajectory(Array1::from(vec![0.5, 0.25]));
        net.finish_trajectory(3.0);
        let first = net.train(&mut rng).unwrap();
        let mut last = first;
        for _ in 0..500 {
            last = net.train(&mut rng).unwrap();
        }
        assert!(last.is_finite());
        assert!(last < first);
        let guess = net.infer(&Array1::from(vec![0.5, 0.25]));
        assert!((guess - 3.0).abs() < 0.5);
    }
}
