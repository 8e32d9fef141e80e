// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tests for injected cardinality estimation.

#[cfg(test)]
mod tests {
    use crate::error::ReedError;
    use crate::planner::cardinality::{CardinalityEstimator, InjectionCardinalityEstimator};
    use crate::planner::graph::QueryGraph;
    use crate::planner::subproblem::Subproblem;

    const CARDINALITIES: &str = r#"
{
  "test": [
    { "relations": ["T0"], "size": 10 },
    { "relations": ["T1"], "size": 5 },
    { "relations": ["T0", "T1"], "size": 20 }
  ]
}
"#;

    fn graph() -> QueryGraph {
        let mut g = QueryGraph::new(vec!["T0".into(), "T1".into()]).unwrap();
        g.add_join(0, 1).unwrap();
        g
    }

    #[test]
    fn test_estimate_scan() {
        let ce = InjectionCardinalityEstimator::from_json("test", CARDINALITIES).unwrap();
        let g = graph();

        let t0 = ce.estimate_scan(&g, Subproblem::singleton(0));
        assert_eq!(t0.cardinality, 10);
        assert_eq!(t0.subproblem, Subproblem::singleton(0));

        let t1 = ce.estimate_scan(&g, Subproblem::singleton(1));
        assert_eq!(t1.cardinality, 5);
    }

    #[test]
    fn test_estimate_join_uses_injected_size() {
        let ce = InjectionCardinalityEstimator::from_json("test", CARDINALITIES).unwrap();
        let g = graph();

        let t0 = ce.estimate_scan(&g, Subproblem::singleton(0));
        let t1 = ce.estimate_scan(&g, Subproblem::singleton(1));
        let joined = ce.estimate_join(&g, &t0, &t1);

        assert_eq!(joined.subproblem, Subproblem::from_bits(0b11));
        assert_eq!(joined.cardinality, 20);
        assert_eq!(ce.predict_cardinality(&joined), 20);
    }

    #[test]
    fn test_relation_order_does_not_matter() {
        let json = r#"{ "test": [ { "relations": ["T1", "T0"], "size": 20 } ] }"#;
        let ce = InjectionCardinalityEstimator::from_json("test", json).unwrap();
        let g = graph();

        let joined = ce.estimate_join(
            &g,
            &ce.estimate_scan(&g, Subproblem::singleton(0)),
            &ce.estimate_scan(&g, Subproblem::singleton(1)),
        );
        assert_eq!(joined.cardinality, 20);
    }

    #[test]
    fn test_missing_join_falls_back_to_product() {
        let json = r#"
{
  "test": [
    { "relations": ["T0"], "size": 10 },
    { "relations": ["T1"], "size": 5 }
  ]
}
"#;
        let ce = InjectionCardinalityEstimator::from_json("test", json).unwrap();
        let g = graph();

        let joined = ce.estimate_join(
            &g,
            &ce.estimate_scan(&g, Subproblem::singleton(0)),
            &ce.estimate_scan(&g, Subproblem::singleton(1)),
        );
        assert_eq!(joined.cardinality, 50);
    }

    #[test]
    fn test_missing_scan_falls_back_to_one() {
        let json = r#"{ "test": [] }"#;
        let ce = InjectionCardinalityEstimator::from_json("test", json).unwrap();
        let g = graph();
        assert_eq!(ce.estimate_scan(&g, Subproblem::singleton(0)).cardinality, 1);
    }

    #[test]
    fn test_unknown_database_is_rejected() {
        let result = InjectionCardinalityEstimator::from_json("prod", CARDINALITIES);
        match result {
            Err(ReedError::DeserializationError { reason }) => {
                assert!(reason.contains("prod"));
            }
            other => panic!("expected DeserializationError, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let result = InjectionCardinalityEstimator::from_json("test", "{ nope");
        assert!(matches!(
            result,
            Err(ReedError::DeserializationError { .. })
        ));
    }
}
