/// Objective Comparator - Tool-Agnostic Verdict Logic
///
/// **Core Responsibility:**
/// Decide whether a candidate set of objective maps reproduces a reference set.
///
/// **Critical Properties:**
/// - Knows nothing about the modeling tool or solvers
/// - Knows nothing about files
/// - Pure function: (reference maps, candidate maps, places) → verdict
///
/// **Comparison Rules:**
/// - Solution counts must be equal
/// - Per solution, objective counts must be equal (count only, not key sets)
/// - Every reference key must exist in the candidate
/// - Values must be equal to `places` decimal places (absolute, not relative)

use crate::error::CheckError;
use crate::extractor::ObjectiveMap;
use tracing::debug;

/// `true` when `a` and `b` agree to `places` decimal places,
/// i.e. the difference rounds to zero at that precision
pub fn almost_equal(a: f64, b: f64, places: u32) -> bool {
    if a == b {
        return true;
    }
    let scale = 10f64.powi(places as i32);
    ((a - b).abs() * scale).round() == 0.0
}

/// Compare one pair of corresponding solutions
fn compare_solution(
    index: usize,
    reference: &ObjectiveMap,
    candidate: &ObjectiveMap,
    places: u32,
) -> Result<(), CheckError> {
    if reference.len() != candidate.len() {
        return Err(CheckError::ObjectiveKeyCountMismatch {
            solution: index,
            expected: reference.len(),
            actual: candidate.len(),
        });
    }

    for (key, expected) in reference {
        let actual = candidate.get(key).map(|entry| entry.value);
        match actual {
            Some(actual) if almost_equal(expected.value, actual, places) => {
                debug!(solution = index, key = %key, expected = expected.value, actual, "Objective matched");
            }
            _ => {
                return Err(CheckError::ObjectiveMismatch {
                    solution: index,
                    key: key.clone(),
                    expected: expected.value,
                    actual,
                    places,
                });
            }
        }
    }

    Ok(())
}

/// Compare reference objectives against candidate objectives
///
/// Stops at the first discrepancy and reports it with full context.
pub fn compare_objectives(
    reference: &[ObjectiveMap],
    candidate: &[ObjectiveMap],
    places: u32,
) -> Result<(), CheckError> {
    if reference.len() != candidate.len() {
        return Err(CheckError::SolutionCountMismatch {
            expected: reference.len(),
            actual: candidate.len(),
        });
    }

    for (index, (reference, candidate)) in reference.iter().zip(candidate).enumerate() {
        compare_solution(index, reference, candidate, places)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ObjectiveEntry;

    /// Helper to build an objective map from (name, value) pairs
    fn make_map(entries: &[(&str, f64)]) -> ObjectiveMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), ObjectiveEntry::new(*value)))
            .collect()
    }

    #[test]
    fn test_almost_equal_three_places() {
        assert!(almost_equal(-2.0, -2.0, 3));
        assert!(almost_equal(1.0, 1.0004, 3));
        assert!(almost_equal(0.0, -3.07e-7, 3));
        assert!(!almost_equal(1.0, 1.0006, 3));
        assert!(!almost_equal(1.0, 1.01, 3));
    }

    #[test]
    fn test_almost_equal_other_precisions() {
        assert!(almost_equal(1.0, 1.04, 1));
        assert!(!almost_equal(1.0, 1.04, 2));
        assert!(almost_equal(f64::INFINITY, f64::INFINITY, 3));
    }

    #[test]
    fn test_exact_match() {
        let reference = vec![make_map(&[]), make_map(&[("f", -2.0)])];
        let candidate = vec![make_map(&[]), make_map(&[("f", -2.0)])];

        assert_eq!(compare_objectives(&reference, &candidate, 3), Ok(()));
    }

    #[test]
    fn test_within_tolerance() {
        let reference = vec![make_map(&[("objf", 0.0)])];
        let candidate = vec![make_map(&[("objf", 0.0003)])];

        assert!(compare_objectives(&reference, &candidate, 3).is_ok());
    }

    #[test]
    fn test_both_empty() {
        assert!(compare_objectives(&[], &[], 3).is_ok());
    }

    #[test]
    fn test_solution_count_mismatch() {
        let reference = vec![make_map(&[]), make_map(&[("f", 1.0)])];
        let candidate = vec![make_map(&[])];

        let err = compare_objectives(&reference, &candidate, 3).unwrap_err();

        assert_eq!(
            err,
            CheckError::SolutionCountMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_key_count_mismatch() {
        let reference = vec![make_map(&[("f", 1.0)])];
        let candidate = vec![make_map(&[("f", 1.0), ("g", 2.0)])];

        let err = compare_objectives(&reference, &candidate, 3).unwrap_err();

        assert_eq!(
            err,
            CheckError::ObjectiveKeyCountMismatch {
                solution: 0,
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_value_mismatch() {
        let reference = vec![make_map(&[("f", -2.0)])];
        let candidate = vec![make_map(&[("f", -1.0)])];

        let err = compare_objectives(&reference, &candidate, 3).unwrap_err();

        assert_eq!(
            err,
            CheckError::ObjectiveMismatch {
                solution: 0,
                key: "f".to_string(),
                expected: -2.0,
                actual: Some(-1.0),
                places: 3,
            }
        );
    }

    #[test]
    fn test_renamed_key_is_reported_missing() {
        // Same count, different names: the count check passes, the lookup does not
        let reference = vec![make_map(&[("f", -2.0)])];
        let candidate = vec![make_map(&[("obj", -2.0)])];

        let err = compare_objectives(&reference, &candidate, 3).unwrap_err();

        match err {
            CheckError::ObjectiveMismatch { key, actual, .. } => {
                assert_eq!(key, "f");
                assert_eq!(actual, None);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_failing_solution_is_reported() {
        let reference = vec![make_map(&[("f", 1.0)]), make_map(&[("f", 2.0)])];
        let candidate = vec![make_map(&[("f", 1.0)]), make_map(&[("f", 3.0)])];

        let err = compare_objectives(&reference, &candidate, 3).unwrap_err();

        match err {
            CheckError::ObjectiveMismatch { solution, .. } => assert_eq!(solution, 1),
            other => panic!("unexpected error: {other}"),
        }
    }
}
