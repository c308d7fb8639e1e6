//! Property-based tests for the path algebra

use proptest::prelude::*;
use vroot::{LogicalPath, Side};

/// Paths over a small alphabet so markers and separator runs show up often
fn paths() -> impl Strategy<Value = String> {
    "[ab./\\\\]{0,24}"
}

/// Test that normalizing twice changes nothing
#[test]
fn test_normalize_idempotent_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&paths(), |path| {
            let once = LogicalPath::posix(path.as_str()).normalize();
            let twice = once.normalize();
            assert_eq!(once, twice);

            for segment in once.segments() {
                assert_ne!(segment, ".");
                assert_ne!(segment, "..");
            }

            Ok(())
        })
        .unwrap();
}

/// Test that anything joined onto the root normalizes to a rooted path
#[test]
fn test_join_then_normalize_stays_rooted_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(paths(), paths()), |(left, right)| {
            let joined = LogicalPath::posix("/").join(&left).join(&right).normalize();
            assert!(joined.is_rooted(), "{:?} + {:?} gave {}", left, right, joined);
            Ok(())
        })
        .unwrap();
}

/// Test that grouping of joins does not matter once normalized
#[test]
fn test_join_associative_under_normalize_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(paths(), paths(), paths()), |(a, b, c)| {
            let left = LogicalPath::posix(a.as_str()).join(&b).join(&c).normalize();
            let grouped = LogicalPath::posix(b.as_str()).join(&c);
            let right = LogicalPath::posix(a.as_str()).join(grouped.as_str()).normalize();
            assert_eq!(left, right, "{:?} {:?} {:?}", a, b, c);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_split_shapes_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&paths(), |path| {
            let path = LogicalPath::posix(path.as_str());
            assert_eq!(path.split(Some(1)).len(), 2);

            let segments = path.segments();
            assert!(!segments.is_empty());
            if !path.strip(Side::Both).is_empty() {
                assert!(segments.iter().all(|segment| !segment.is_empty()));
            }

            Ok(())
        })
        .unwrap();
}

/// Test that a parent and a name join back into the path they came from
#[test]
fn test_parent_name_roundtrip_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&paths(), |path| {
            let normal = LogicalPath::posix(path.as_str()).normalize();
            prop_assume!(normal.is_rooted() && normal.segments().len() >= 2);

            let rebuilt = normal.parent().join(normal.name());
            assert_eq!(rebuilt, normal.strip(Side::Right));

            Ok(())
        })
        .unwrap();
}
