//! **dbresolver** routes database commands between primary and replica connections.
//!
//! ## Getting started
//!
//! This example configures two primaries and two replicas, and uses round-robin load balancing.
//! `PgConnection` stands for any driver connection implementing
//! [`Connection`](crate::connection::Connection).
//!
//! ```ignore
//! use dbresolver::config::ResolverBuilder;
//! use dbresolver::connection::Context;
//! use dbresolver::load_balancing::LoadBalancerKind;
//! use std::sync::Arc;
//!
//! let resolver = ResolverBuilder::new()
//!     .with_primaries(vec![Arc::new(primary_1), Arc::new(primary_2)])
//!     .with_replicas(vec![Arc::new(replica_1), Arc::new(replica_2)])
//!     .with_load_balancer(LoadBalancerKind::RoundRobin)
//!     .build()
//!     .unwrap();
//!
//! // goes to a primary
//! resolver
//!     .execute("DELETE FROM book WHERE id=$1", &[1.into()], &Context::default())
//!     .await?;
//!
//! // goes to a replica
//! let rows = resolver
//!     .query("SELECT * FROM book WHERE id=$1", &[1.into()], &Context::default())
//!     .await?;
//! ```
//!
//! ## Classification and load balancing
//!
//! Commands are classified by their leading keyword using a
//! [`Classifier`](crate::classifier::Classifier), which is a heuristic rather than a SQL parser.
//! Unknown keywords fall back to the entry point: `execute` is treated as a write, `query` as a
//! read. A connection from the chosen pool is picked by a
//! [load balancer](crate::load_balancing), which keeps separate rotation state for each pool.

pub mod classifier;
pub mod config;
pub mod connection;
pub mod error;
pub mod future;
pub mod load_balancing;
pub mod pool;
pub mod resolver;

pub type Error = error::Error;
pub type Result<T> = error::Result<T>;
