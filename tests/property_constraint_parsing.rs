use opsearch::services::{aggregate, parse_constraint_text, AgentConstraint, AgentPayload};
use proptest::prelude::*;

fn payload(constraints: Vec<AgentConstraint>) -> AgentPayload {
    AgentPayload {
        process_overview: String::new(),
        constraints,
    }
}

prop_compose! {
    fn arb_constraint()(
        name in "[A-Za-z][A-Za-z0-9]{0,8}( [A-Za-z0-9]{1,8}){0,2}",
        low in -1.0e6f64..1.0e6,
        width in 0.0f64..1.0e6,
        unit in prop_oneof![Just(""), Just("K"), Just("°C"), Just("kg/h"), Just("kPa")],
    ) -> AgentConstraint {
        AgentConstraint {
            variable: name,
            range: [low, low + width],
            unit: unit.to_string(),
        }
    }
}

proptest! {
    /// Property: sampled constraint text parses back to the same bounds
    #[test]
    fn prop_sampled_text_parses_back(constraint in arb_constraint()) {
        let text = payload(vec![constraint.clone()]).constraint_text();
        let set = parse_constraint_text(&text);

        let key = constraint.variable.trim().to_lowercase().replace(' ', "_");
        let range = set.get(&key).expect("line should parse");
        prop_assert_eq!(range.low, constraint.range[0]);
        prop_assert_eq!(range.high, constraint.range[1]);
        prop_assert_eq!(&range.unit, &constraint.unit);
    }

    /// Property: averaging identical samples reproduces the rounded bounds
    #[test]
    fn prop_identical_samples_average_to_themselves(
        constraint in arb_constraint(),
        copies in 1usize..5,
    ) {
        let sample = parse_constraint_text(&payload(vec![constraint.clone()]).constraint_text());
        let samples = vec![sample; copies];
        let out = aggregate(samples.iter());

        prop_assert_eq!(out.len(), 1);
        let (_, [low, high]) = out.iter().next().unwrap();
        prop_assert!((low - constraint.range[0]).abs() <= 0.05 + 1e-6 * constraint.range[0].abs());
        prop_assert!((high - constraint.range[1]).abs() <= 0.05 + 1e-6 * constraint.range[1].abs());
        prop_assert!(low <= high);
    }

    /// Property: noise lines never change what parses
    #[test]
    fn prop_noise_lines_are_ignored(
        constraint in arb_constraint(),
        noise in "[a-z ]{0,30}",
    ) {
        let clean = payload(vec![constraint]).constraint_text();
        let noisy = format!("{noise}\n{clean}# trailing note\n");
        prop_assert_eq!(parse_constraint_text(&clean), parse_constraint_text(&noisy));
    }
}
