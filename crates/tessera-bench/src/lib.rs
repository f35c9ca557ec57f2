//! Benchmark workloads for Tessera pooled arrays.
//!
//! - [`diffusion_step`]: one explicit 1D diffusion update that allocates
//!   its working arrays from the pool, the pattern pooling exists for
//! - [`run_timestep_loop`]: many such steps over a single field

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessera_pool::{Array, ArrayPool};

/// Advance `field` by one explicit diffusion step with coefficient `d`
/// (fixed zero-flux boundaries).
///
/// Allocates two temporaries of `field.len()` elements from `pool` and
/// swaps the result into `field`, so with pooling enabled a steady-state
/// step performs no heap allocation.
pub fn diffusion_step(pool: &ArrayPool<f64>, field: &mut Array<f64>, d: f64) {
    let n = field.len();
    if n < 2 {
        return;
    }
    let mut laplacian = pool.array(n);
    {
        let u = field.as_slice();
        let lap = laplacian.as_mut_slice();
        lap[0] = u[1] - u[0];
        lap[n - 1] = u[n - 2] - u[n - 1];
        for i in 1..n - 1 {
            lap[i] = u[i - 1] - 2.0 * u[i] + u[i + 1];
        }
    }

    let mut next = pool.array(n);
    for ((out, &u), &l) in next
        .as_mut_slice()
        .iter_mut()
        .zip(field.as_slice())
        .zip(laplacian.as_slice())
    {
        *out = u + d * l;
    }
    field.swap(&mut next);
}

/// Run `steps` diffusion steps on a field of `cells` cells with a unit
/// spike in the middle. Returns the final field.
pub fn run_timestep_loop(pool: &ArrayPool<f64>, cells: usize, steps: usize) -> Array<f64> {
    let mut field = pool.filled(cells, 0.0);
    if cells > 0 {
        field[cells / 2] = 1.0;
    }
    for _ in 0..steps {
        diffusion_step(pool, &mut field, 0.1);
    }
    field
}
