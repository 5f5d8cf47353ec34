use serde::{Deserialize, Serialize};

use crate::vector;

/// Preference-direction vector separating kept topics from removed ones.
///
/// `direction` is a unit vector (or `None` when no usable preference signal
/// exists), `strength` the pre-normalization magnitude of the separation, and
/// `impact` the fraction of the outline the user removed.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Pdv {
	pub direction: Option<Vec<f32>>,
	pub strength: f32,
	pub impact: f32,
}
impl Pdv {
	pub fn inert() -> Self {
		Self { direction: None, strength: 0.0, impact: 0.0 }
	}

	pub fn is_active(&self) -> bool {
		self.direction.is_some()
	}

	/// Scoring weight a PDV commands: capped so preference steering competes
	/// with, but never overwhelms, query relevance.
	pub fn influence(&self) -> f32 {
		if self.direction.is_none() {
			return 0.0;
		}

		(self.strength / 10.0).min(0.3)
	}
}
impl Default for Pdv {
	fn default() -> Self {
		Self::inert()
	}
}

/// Derives `(direction, strength)` from kept/removed embedding sets.
///
/// `None` when either side is empty, either mean is non-finite, or the two
/// means are numerically identical.
pub fn derive_direction(kept: &[Vec<f32>], removed: &[Vec<f32>]) -> Option<(Vec<f32>, f32)> {
	let kept_mean = vector::mean(kept)?;
	let removed_mean = vector::mean(removed)?;

	if !vector::is_finite(&kept_mean) || !vector::is_finite(&removed_mean) {
		return None;
	}
	if kept_mean.len() != removed_mean.len() {
		return None;
	}

	let difference: Vec<f32> =
		kept_mean.iter().zip(&removed_mean).map(|(kept, removed)| kept - removed).collect();
	let strength = vector::norm(&difference);
	let direction = vector::normalize(&difference)?;

	Some((direction, strength))
}
