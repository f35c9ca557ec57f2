//! Shared fixtures for pool tests and benchmarks.

/// A complex number, the other element type simulation fields commonly
/// store besides plain reals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// Array lengths typical of per-timestep working buffers: a 1D line, a
/// 2D slab and a small 3D block. Entries are distinct, so each one maps to
/// its own bucket.
pub const WORKING_LENGTHS: [usize; 3] = [128, 64 * 64, 20 * 20 * 20];

/// Run `work(worker_index)` on `threads` scoped threads and wait for all of
/// them. A panic in any worker propagates to the caller.
pub fn run_workers<F>(threads: usize, work: F)
where
    F: Fn(usize) + Sync,
{
    std::thread::scope(|scope| {
        for worker in 0..threads {
            let work = &work;
            scope.spawn(move || work(worker));
        }
    });
}
