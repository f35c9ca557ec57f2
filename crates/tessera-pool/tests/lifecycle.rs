//! Pool reuse and the one-way pooling lifecycle, observed through storage
//! addresses.

use tessera_pool::{ArrayPool, PoolSet, PoolingState};
use tessera_test_utils::fixtures::WORKING_LENGTHS;

#[test]
fn released_storage_is_reused_for_the_same_length() {
    let set = PoolSet::new();
    for len in WORKING_LENGTHS {
        let a = set.array::<f64>(len);
        let ptr = a.as_ptr();
        drop(a);
        let b = set.array::<f64>(len);
        assert_eq!(b.as_ptr(), ptr, "length {len} was not recycled");
    }
    assert_eq!(set.pool::<f64>().lengths(), WORKING_LENGTHS.to_vec());
    let stats = set.stats();
    assert_eq!(stats.allocated, WORKING_LENGTHS.len() as u64);
    assert_eq!(stats.reused, WORKING_LENGTHS.len() as u64);
}

#[test]
fn timestep_loop_allocates_once_per_length() {
    let pool = ArrayPool::<f64>::new();
    for _ in 0..100 {
        let mut scratch = pool.array(256);
        scratch.as_mut_slice().fill(1.0);
        let mut gradient = pool.array(256);
        gradient.as_mut_slice().copy_from_slice(scratch.as_slice());
    }
    let stats = pool.stats();
    assert_eq!(stats.allocated, 2);
    assert_eq!(stats.reused, 198);
    assert_eq!(pool.free_count(256), 2);
}

#[test]
fn shared_block_returns_only_after_last_release() {
    let pool = ArrayPool::<i32>::new();
    let a = pool.array(10);
    let b = a.clone();
    let c = b.clone();
    drop(a);
    drop(c);
    assert_eq!(pool.free_count(10), 0);
    drop(b);
    assert_eq!(pool.free_count(10), 1);
}

#[test]
fn cleanup_frees_pool_and_latches_disabled() {
    let set = PoolSet::new();
    let batch: Vec<_> = (0..4).map(|_| set.array::<f64>(512)).collect();
    drop(batch);
    assert_eq!(set.pool::<f64>().free_count(512), 4);

    assert_eq!(set.cleanup(), 4);
    assert_eq!(set.pool::<f64>().free_count(512), 0);
    assert_eq!(set.pooling_state(), PoolingState::Disabled);

    // The next request is a fresh allocation, not a reuse.
    let fresh = set.array::<f64>(512);
    let stats = set.stats();
    assert_eq!(stats.allocated, 5);
    assert_eq!(stats.reused, 0);
    drop(fresh);
    assert_eq!(set.pool::<f64>().free_count(512), 0);

    // Re-enabling is ignored; releases keep freeing.
    assert!(!set.set_pooling_enabled(true));
    drop(set.array::<f64>(512));
    let stats = set.stats();
    assert_eq!(stats.free_blocks, 0);
    assert_eq!(stats.freed, 6);
}

#[test]
fn disable_without_cleanup_keeps_existing_spares() {
    let set = PoolSet::new();
    drop(set.array::<u32>(8));
    assert!(!set.set_pooling_enabled(false));
    // Spares already pooled stay until flushed and can still be handed out.
    assert_eq!(set.pool::<u32>().free_count(8), 1);
    let reused = set.array::<u32>(8);
    drop(reused);
    assert_eq!(set.pool::<u32>().free_count(8), 0);
    assert_eq!(set.flush(), 0);
}

#[test]
fn cleanup_leaves_live_arrays_usable() {
    let set = PoolSet::new();
    let mut live = set.pool::<i64>().filled(3, 7);
    let alias = live.clone();
    set.cleanup();
    assert_eq!(alias.as_slice(), &[7, 7, 7]);
    live.ensure_unique();
    live[1] = 0;
    assert_eq!(alias[1], 7);
    drop(alias);
    drop(live);
    let stats = set.stats();
    assert_eq!(stats.free_blocks, 0);
    assert_eq!(stats.outstanding(), 0);
}
