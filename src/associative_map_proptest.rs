#![cfg(test)]

// Property tests for AssociativeMap kept inside the crate so they can use
// the map with a custom hasher and small starting capacities.

use crate::associative_map::AssociativeMap;
use crate::error::MapError;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Contains(String),
    Mutate(usize, i32),
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        (1usize..=8, proptest::collection::vec(op, 1..80))
            .prop_map(move |(cap, ops)| (cap, pool.clone(), ops))
    })
}

// Apply one op to both the map under test and the model, checking results.
fn step<S: BuildHasher>(
    sut: &mut AssociativeMap<Key, i32, S>,
    model: &mut HashMap<Key, i32>,
    pool: &[String],
    op: OpI,
) -> Result<(), TestCaseError> {
    match op {
        OpI::Put(i, v) => {
            let k = key_from(pool, i);
            let already = model.contains_key(&k);
            let before = sut.capacity();
            match sut.put(k.clone(), v) {
                Ok(()) => {
                    prop_assert!(!already, "put must fail on duplicate");
                    model.insert(k, v);
                    let after = sut.capacity();
                    prop_assert!(after == before || after == before * 2, "grow by one doubling");
                }
                Err(MapError::DuplicateKey) => {
                    prop_assert!(already, "duplicate error only when key exists");
                    prop_assert_eq!(sut.capacity(), before);
                }
                Err(e) => prop_assert!(false, "unexpected error {:?}", e),
            }
        }
        OpI::Get(i) => {
            let k = key_from(pool, i);
            match model.get(&k) {
                Some(v) => prop_assert_eq!(sut.get(&k), Ok(v)),
                None => prop_assert_eq!(sut.get(&k), Err(MapError::KeyNotFound)),
            }
        }
        OpI::Remove(i) => {
            let k = key_from(pool, i);
            match model.remove(&k) {
                Some(v) => prop_assert_eq!(sut.remove(&k), Ok(v)),
                None => prop_assert_eq!(sut.remove(&k), Err(MapError::KeyNotFound)),
            }
            prop_assert!(!sut.contains_key(&k));
        }
        OpI::Contains(s) => {
            let has = sut.contains_key(s.as_str());
            let has_model = model.keys().any(|k| k.0 == s);
            prop_assert_eq!(has, has_model);
        }
        OpI::Mutate(i, d) => {
            let k = key_from(pool, i);
            if let Some(mv) = model.get_mut(&k) {
                let vr = sut.get_mut(&k).expect("live key resolves");
                *vr = vr.saturating_add(d);
                *mv = mv.saturating_add(d);
            } else {
                prop_assert!(sut.get_mut(&k).is_err());
            }
        }
        OpI::Clear => {
            let cap = sut.capacity();
            sut.clear();
            model.clear();
            prop_assert_eq!(sut.capacity(), cap);
        }
        OpI::Iterate => {
            let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
            let m_keys: BTreeSet<_> = model.keys().cloned().collect();
            prop_assert_eq!(s_keys, m_keys);
        }
    }

    // Post-conditions after each op
    prop_assert_eq!(sut.len(), model.len());
    prop_assert_eq!(sut.is_empty(), model.is_empty());
    prop_assert_eq!(sut.iter().count(), model.len());
    prop_assert!(sut.len() * 5 < sut.capacity() * 4, "load factor below 0.8");
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Duplicate keys are rejected; the stored value is left unchanged.
// - `get`/`contains_key`/`remove` agree with the model.
// - Capacity only ever doubles, once per crossing, and `clear` keeps it.
// - `iter` yields each live entry exactly once.
// - `len`/`is_empty` parity and load factor below 0.8 after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((cap, pool, ops) in arb_scenario()) {
        let mut sut: AssociativeMap<Key, i32> = AssociativeMap::with_capacity(cap);
        let mut model: HashMap<Key, i32> = HashMap::new();
        for op in ops {
            step(&mut sut, &mut model, &pool, op)?;
        }
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher). Every entry shares one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((cap, pool, ops) in arb_scenario()) {
        let mut sut: AssociativeMap<Key, i32, ConstBuildHasher> =
            AssociativeMap::with_capacity_and_hasher(cap, ConstBuildHasher);
        let mut model: HashMap<Key, i32> = HashMap::new();
        for op in ops {
            step(&mut sut, &mut model, &pool, op)?;
        }
    }
}

// Property: a rehash is transparent. Snapshot every lookup right before the
// put that crosses the threshold and compare right after it.
proptest! {
    #[test]
    fn prop_rehash_is_transparent(cap in 1usize..=16, keys in proptest::collection::btree_set(any::<u32>(), 1..200)) {
        let mut m: AssociativeMap<u32, u32> = AssociativeMap::with_capacity(cap);
        let mut inserted: Vec<u32> = Vec::new();
        for k in keys {
            let before_cap = m.capacity();
            let snapshot: Vec<_> = inserted.iter().map(|k| (m.contains_key(k), m.get(k).copied())).collect();
            m.put(k, k.wrapping_mul(3)).unwrap();
            if m.capacity() != before_cap {
                prop_assert_eq!(m.capacity(), before_cap * 2);
                let after: Vec<_> = inserted.iter().map(|k| (m.contains_key(k), m.get(k).copied())).collect();
                prop_assert_eq!(snapshot, after);
            }
            inserted.push(k);
        }
        prop_assert_eq!(m.len(), inserted.len());
        for k in &inserted {
            prop_assert_eq!(m.get(k), Ok(&k.wrapping_mul(3)));
        }
    }
}
