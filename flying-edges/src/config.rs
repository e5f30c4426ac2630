//! Types used in configuration structures
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Thread pool to use for multithreaded contouring
///
/// Most users will use the global Rayon pool, but it's possible to provide your
/// own as well.
pub enum ThreadPool {
    /// User-provided pool
    Custom(rayon::ThreadPool),
    /// Global Rayon pool
    Global,
}

impl ThreadPool {
    /// Runs a function across the thread pool
    pub fn run<F: FnOnce() -> V + Send, V: Send>(&self, f: F) -> V {
        match self {
            ThreadPool::Custom(p) => p.install(f),
            ThreadPool::Global => f(),
        }
    }

    /// Returns the number of threads in the pool
    pub fn thread_count(&self) -> usize {
        match self {
            ThreadPool::Custom(p) => p.current_num_threads(),
            ThreadPool::Global => rayon::current_num_threads(),
        }
    }
}

/// Token to cancel an in-progress operation
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Build a new token, which is initialize as "not cancelled"
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark this token as cancelled
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if the token is cancelled
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Settings when contouring a volume
pub struct Settings<'a> {
    /// Store a unit normal for every output point
    ///
    /// Normals are the negated, normalized scalar gradient.  Computing them
    /// requires gradients, even if those aren't stored.
    pub compute_normals: bool,

    /// Store the (unnormalized) scalar gradient for every output point
    pub compute_gradients: bool,

    /// Store the contour value as a per-point scalar
    pub compute_scalars: bool,

    /// Interpolate the volume's point attributes along each crossed edge
    pub interpolate_attributes: bool,

    /// Which component of a multi-component scalar array to contour on
    pub array_component: usize,

    /// Thread pool to use for contouring
    ///
    /// If this is `None`, then contouring is done in a single thread;
    /// otherwise, the provided pool is used.
    pub threads: Option<&'a ThreadPool>,

    /// Token to cancel contouring
    pub cancel: CancelToken,
}

impl Default for Settings<'_> {
    fn default() -> Self {
        Self {
            compute_normals: true,
            compute_gradients: false,
            compute_scalars: true,
            interpolate_attributes: false,
            array_component: 0,
            threads: Some(&ThreadPool::Global),
            cancel: CancelToken::new(),
        }
    }
}

impl Settings<'_> {
    /// Checks whether per-point gradients must be evaluated at all
    pub(crate) fn needs_gradients(&self) -> bool {
        self.compute_normals || self.compute_gradients
    }
}
