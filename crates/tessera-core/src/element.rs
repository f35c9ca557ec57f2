//! The bound on values stored in pooled arrays.

/// A value that can live in a pooled backing block.
///
/// - `Default` supplies the contents of a freshly allocated block.
/// - `Clone` is the element-wise copy performed by copy-on-write promotion.
/// - `Send + Sync + 'static` lets blocks be recycled across worker threads
///   and keyed by type in a pool set.
///
/// Blanket-implemented for every type that satisfies the bounds, so
/// `f32`, `f64`, `i64`, complex-number structs and similar plain data
/// types are all elements without any extra code.
pub trait Element: Clone + Default + Send + Sync + 'static {}

impl<T> Element for T where T: Clone + Default + Send + Sync + 'static {}
