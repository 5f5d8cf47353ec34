use serde::{Deserialize, Serialize};

use crate::vector;

/// Running summary of where discovered content is drifting relative to the
/// queries that produced it, accumulated one research cycle at a time.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TrajectoryAccumulator {
	query_sum: Vec<f32>,
	result_sum: Vec<f32>,
	cycles: u32,
}
impl TrajectoryAccumulator {
	pub fn new(embedding_dim: usize) -> Self {
		Self { query_sum: vec![0.0; embedding_dim], result_sum: vec![0.0; embedding_dim], cycles: 0 }
	}

	pub fn cycles(&self) -> u32 {
		self.cycles
	}

	/// Folds one cycle's query and result centroids into the running sums.
	/// A cycle with an empty side carries no signal and is skipped entirely.
	pub fn add_cycle(&mut self, query_vecs: &[Vec<f32>], result_vecs: &[Vec<f32>], weight: f32) {
		let (Some(query_centroid), Some(result_centroid)) =
			(vector::mean(query_vecs), vector::mean(result_vecs))
		else {
			return;
		};

		if query_centroid.len() != self.query_sum.len()
			|| result_centroid.len() != self.result_sum.len()
		{
			return;
		}

		for (slot, value) in self.query_sum.iter_mut().zip(&query_centroid) {
			*slot += value * weight;
		}
		for (slot, value) in self.result_sum.iter_mut().zip(&result_centroid) {
			*slot += value * weight;
		}

		self.cycles += 1;
	}

	/// Unit vector from the accumulated query centroid toward the accumulated
	/// result centroid, or `None` before the first cycle or when the two
	/// centroids coincide.
	pub fn trajectory(&self) -> Option<Vec<f32>> {
		if self.cycles == 0 {
			return None;
		}

		let count = self.cycles as f32;
		let difference: Vec<f32> = self
			.result_sum
			.iter()
			.zip(&self.query_sum)
			.map(|(result, query)| (result - query) / count)
			.collect();

		vector::normalize(&difference)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn trajectory_is_absent_before_any_cycle() {
		let accumulator = TrajectoryAccumulator::new(3);

		assert_eq!(accumulator.trajectory(), None);
	}

	#[test]
	fn trajectory_points_from_queries_toward_results() {
		let mut accumulator = TrajectoryAccumulator::new(2);

		accumulator.add_cycle(&[vec![1.0, 0.0]], &[vec![0.0, 1.0]], 1.0);

		let trajectory = accumulator.trajectory().expect("trajectory should exist");

		assert!(trajectory[1] > 0.0);
		assert!(trajectory[0] < 0.0);
		assert!((vector::norm(&trajectory) - 1.0).abs() < 1e-5);
	}

	#[test]
	fn empty_cycle_input_is_ignored() {
		let mut accumulator = TrajectoryAccumulator::new(2);

		accumulator.add_cycle(&[], &[vec![0.0, 1.0]], 1.0);

		assert_eq!(accumulator.cycles(), 0);
		assert_eq!(accumulator.trajectory(), None);
	}

	#[test]
	fn coincident_centroids_yield_no_trajectory() {
		let mut accumulator = TrajectoryAccumulator::new(2);

		accumulator.add_cycle(&[vec![0.5, 0.5]], &[vec![0.5, 0.5]], 1.0);

		assert_eq!(accumulator.trajectory(), None);
	}
}
