use delver_domain::{Pdv, TrajectoryAccumulator, pdv, tokens, vector};

#[test]
fn trajectory_accumulates_weighted_centroids() {
	let mut accumulator = TrajectoryAccumulator::new(2);

	accumulator.add_cycle(&[vec![1.0, 0.0], vec![1.0, 0.0]], &[vec![0.0, 1.0]], 1.0);
	accumulator.add_cycle(&[vec![1.0, 0.0]], &[vec![0.0, 1.0], vec![0.0, 1.0]], 2.0);

	assert_eq!(accumulator.cycles(), 2);

	let trajectory = accumulator.trajectory().expect("trajectory should exist");

	assert!((vector::norm(&trajectory) - 1.0).abs() < 1e-5);
	assert!(trajectory[1] > 0.0);
}

#[test]
fn pdv_round_trips_through_serde() {
	let pdv = Pdv { direction: Some(vec![1.0, 0.0]), strength: 0.4, impact: 0.5 };
	let encoded = serde_json::to_string(&pdv).expect("serialize failed");
	let decoded: Pdv = serde_json::from_str(&encoded).expect("deserialize failed");

	assert!(decoded.is_active());
	assert_eq!(decoded.direction, pdv.direction);
}

#[test]
fn pdv_direction_separates_distinct_topic_sets() {
	let kept = vec![vec![0.9, 0.1, 0.0], vec![0.8, 0.2, 0.0]];
	let removed = vec![vec![0.0, 0.1, 0.9], vec![0.0, 0.2, 0.8]];
	let (direction, strength) =
		pdv::derive_direction(&kept, &removed).expect("direction should exist");

	assert!(strength > 0.0);
	assert!(direction[0] > 0.0);
	assert!(direction[2] < 0.0);
}

#[test]
fn token_estimate_matches_four_chars_per_token() {
	let text = "a".repeat(4_000);

	assert_eq!(tokens::estimate_tokens(&text), 1_000);
}
