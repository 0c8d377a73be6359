//! Token hand-off between the expansion stage and a downstream consumer
//!
//! Many producers may `add`/`add_all` while one thread drains. A drain is
//! atomic with respect to concurrent additions: no token is lost or
//! duplicated across a drain boundary.

pub mod concurrent;

pub use concurrent::ConcurrentQueue;

/// FIFO of produced tokens
pub trait TokenQueue<T> {
    fn add(&self, item: T);

    fn add_all(&self, items: Vec<T>);

    /// Move every queued item into `destination`, returning how many moved
    fn drain_to(&self, destination: &dyn TokenQueue<T>) -> usize;

    /// Current contents in order, without removing them
    fn iterate(&self) -> std::vec::IntoIter<T>
    where
        T: Clone;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recognized implementation that supports wholesale moves
    fn as_concurrent(&self) -> Option<&ConcurrentQueue<T>> {
        None
    }
}
