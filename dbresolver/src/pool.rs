use derive_more::Display;
use std::sync::Arc;

/// Role of connections in a pool.
#[derive(Debug, PartialEq, Eq, Ord, PartialOrd, Hash, Copy, Clone, Display)]
pub enum Role {
    Primary,
    Replica,
}

/// Ordered set of connections sharing a role. Connections are shared, not owned - the pool never
/// opens or closes them.
#[derive(Debug)]
pub struct Pool<C> {
    role: Role,
    members: Vec<Arc<C>>,
}

impl<C> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Pool {
            role: self.role,
            members: self.members.clone(),
        }
    }
}

impl<C> Pool<C> {
    pub fn new(role: Role, members: Vec<Arc<C>>) -> Self {
        Pool { role, members }
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn members(&self) -> &[Arc<C>] {
        &self.members
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Arc<C>> {
        self.members.get(index)
    }
}
