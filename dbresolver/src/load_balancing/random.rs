use rand::{rng, Rng};

use crate::load_balancing::LoadBalancingStrategy;
use crate::pool::Role;

/// Pure random load balancing.
#[derive(Default, Debug, Clone, Copy)]
pub struct RandomLoadBalancingStrategy;

impl RandomLoadBalancingStrategy {
    pub fn new() -> Self {
        RandomLoadBalancingStrategy
    }
}

impl LoadBalancingStrategy for RandomLoadBalancingStrategy {
    fn select(&self, _role: Role, pool_size: usize) -> usize {
        debug_assert!(pool_size > 0);

        rng().random_range(0..pool_size)
    }
}
