mod random;
mod round_robin;

#[cfg(test)]
use mockall::automock;
use std::sync::Arc;

use crate::pool::Role;

pub use crate::load_balancing::random::RandomLoadBalancingStrategy;
pub use crate::load_balancing::round_robin::RoundRobinLoadBalancingStrategy;

/// Load balancing strategy, used for picking a connection from a pool.
///
/// Implementations must never block or fail, and must be safe to call concurrently. A single
/// strategy serves both pools, so stateful strategies keep separate state per [`Role`].
#[cfg_attr(test, automock)]
pub trait LoadBalancingStrategy {
    /// Returns an index in `[0, pool_size)`. `pool_size` is always positive - the resolver never
    /// asks for an empty pool.
    fn select(&self, role: Role, pool_size: usize) -> usize;
}

impl<T: LoadBalancingStrategy + ?Sized> LoadBalancingStrategy for Arc<T> {
    #[inline]
    fn select(&self, role: Role, pool_size: usize) -> usize {
        (**self).select(role, pool_size)
    }
}

/// Built-in strategy selector.
#[derive(Debug, PartialEq, Eq, Ord, PartialOrd, Hash, Copy, Clone, Default)]
pub enum LoadBalancerKind {
    #[default]
    RoundRobin,
    Random,
}

impl LoadBalancerKind {
    pub fn into_strategy(self) -> Box<dyn LoadBalancingStrategy + Send + Sync> {
        match self {
            LoadBalancerKind::RoundRobin => Box::new(RoundRobinLoadBalancingStrategy::new()),
            LoadBalancerKind::Random => Box::new(RandomLoadBalancingStrategy::new()),
        }
    }
}
