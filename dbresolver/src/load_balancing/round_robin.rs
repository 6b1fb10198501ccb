use std::sync::atomic::{AtomicUsize, Ordering};

use crate::load_balancing::LoadBalancingStrategy;
use crate::pool::Role;

/// Simple round-robin load balancing. Primary and replica pools rotate independently.
#[derive(Default, Debug)]
pub struct RoundRobinLoadBalancingStrategy {
    primary_idx: AtomicUsize,
    replica_idx: AtomicUsize,
}

impl RoundRobinLoadBalancingStrategy {
    pub fn new() -> Self {
        Default::default()
    }

    /// Starts rotation of both pools at given position.
    pub fn with_start(start: usize) -> Self {
        RoundRobinLoadBalancingStrategy {
            primary_idx: AtomicUsize::new(start),
            replica_idx: AtomicUsize::new(start),
        }
    }

    /// Number of selections made so far in given pool, offset by the starting position. Wraps on
    /// overflow.
    pub fn position(&self, role: Role) -> usize {
        self.counter(role).load(Ordering::SeqCst)
    }

    #[inline]
    fn counter(&self, role: Role) -> &AtomicUsize {
        match role {
            Role::Primary => &self.primary_idx,
            Role::Replica => &self.replica_idx,
        }
    }
}

impl LoadBalancingStrategy for RoundRobinLoadBalancingStrategy {
    fn select(&self, role: Role, pool_size: usize) -> usize {
        debug_assert!(pool_size > 0);

        let cur_idx = self.counter(role).fetch_add(1, Ordering::SeqCst);
        cur_idx % pool_size
    }
}
