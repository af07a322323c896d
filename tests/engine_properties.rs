//! Property tests for the memoized sequence-length engine

use num_bigint::{BigInt, BigUint};
use proptest::prelude::*;

use collatz_scan::engine::{
    BaseConvention, MemoCache, SequenceLengthEngine, collatz_step, naive_length,
};
use collatz_scan::trajectory::Trajectory;

fn convention() -> impl Strategy<Value = BaseConvention> {
    prop_oneof![Just(BaseConvention::Transitions), Just(BaseConvention::Terms)]
}

proptest! {
    #[test]
    fn memoized_length_matches_naive_count(n in 1u64..100_000, convention in convention()) {
        let value = BigUint::from(n);
        let mut cache = MemoCache::new(convention);
        let length = SequenceLengthEngine::new(&mut cache).length_of_positive(&value).unwrap();
        prop_assert_eq!(length, naive_length(&value, convention));
    }

    #[test]
    fn large_values_match_naive_count(n in (u64::MAX as u128)..u128::MAX) {
        let value = BigUint::from(n);
        let mut cache = MemoCache::new(BaseConvention::Transitions);
        let length = SequenceLengthEngine::new(&mut cache).length_of_positive(&value).unwrap();
        prop_assert_eq!(length, naive_length(&value, BaseConvention::Transitions));
    }

    #[test]
    fn shared_cache_agrees_with_fresh_cache(values in prop::collection::vec(1u64..50_000, 1..40)) {
        let mut shared = MemoCache::default();
        for n in values {
            let value = BigInt::from(n);
            let warm = SequenceLengthEngine::new(&mut shared).length_of(&value).unwrap();
            let mut fresh = MemoCache::default();
            let cold = SequenceLengthEngine::new(&mut fresh).length_of(&value).unwrap();
            prop_assert_eq!(warm, cold);
        }
    }

    #[test]
    fn repeated_query_inserts_nothing(n in 1u64..1_000_000) {
        let value = BigInt::from(n);
        let mut cache = MemoCache::default();
        let first = SequenceLengthEngine::new(&mut cache).length_of(&value).unwrap();
        let size = cache.len();
        let second = SequenceLengthEngine::new(&mut cache).length_of(&value).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(cache.len(), size);
    }

    #[test]
    fn every_cached_entry_is_one_more_than_its_successor(n in 2u64..20_000) {
        let mut cache = MemoCache::default();
        SequenceLengthEngine::new(&mut cache).length_of(&BigInt::from(n)).unwrap();
        for (value, length) in cache.iter() {
            if *value == BigUint::from(1u32) {
                prop_assert_eq!(length, 0);
                continue;
            }
            let next = cache.get(&collatz_step(value));
            prop_assert_eq!(next, Some(length - 1));
        }
    }

    #[test]
    fn trajectory_has_one_more_value_than_transitions(n in 1u64..20_000) {
        let mut cache = MemoCache::new(BaseConvention::Transitions);
        let steps = SequenceLengthEngine::new(&mut cache).length_of(&BigInt::from(n)).unwrap();
        let values = Trajectory::new(&BigInt::from(n)).unwrap().count() as u64;
        prop_assert_eq!(values, steps + 1);
    }

    #[test]
    fn lengths_drop_by_one_per_step_along_a_trajectory(n in 1u64..50_000, k in 0usize..64) {
        let start = BigUint::from(n);
        let Some(later) = Trajectory::from_positive(start.clone()).unwrap().nth(k) else {
            return Ok(());
        };
        let mut cache = MemoCache::default();
        let mut engine = SequenceLengthEngine::new(&mut cache);
        let len_a = engine.length_of_positive(&start).unwrap();
        let len_b = engine.length_of_positive(&later).unwrap();
        prop_assert_eq!(len_a, len_b + k as u64);
        if k > 0 {
            prop_assert!(len_a > len_b);
        }
    }
}
