//! This module contains a declaration of the [`Connection`] trait, which should be implemented for
//! a particular database driver in order to put its connections behind a
//! [`Resolver`](crate::resolver::Resolver).
//!
//! The resolver never opens, closes or inspects connections. It only picks one and forwards the
//! command text, positional [`Value`] parameters and [`Context`] to it.
use derive_more::Constructor;
use futures::FutureExt;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::Instant;

use crate::future::BoxFuture;

/// A single positional parameter bound to a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Call context forwarded untouched to the selected connection. The resolver itself never
/// enforces the deadline; cancellation semantics belong to the driver.
#[derive(Constructor, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Context {
    pub deadline: Option<Instant>,
}

impl Context {
    /// Context expiring after given timeout, counted from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Context::new(Some(Instant::now() + timeout))
    }

    /// Time left until the deadline, if any. Returns zero for an expired deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.remaining() == Some(Duration::ZERO)
    }
}

/// Executable database connection capability, provided by the driver layer.
pub trait Connection: Send + Sync {
    /// Row set returned by queries.
    type Rows: Send;

    /// Driver error. Forwarded verbatim by the resolver.
    type Error: Debug + Send;

    /// Runs a command which returns no rows, yielding the number of affected rows.
    fn execute<'a>(
        &'a self,
        cmd: &'a str,
        params: &'a [Value],
        ctx: &'a Context,
    ) -> BoxFuture<'a, Result<u64, Self::Error>>;

    /// Runs a command returning rows.
    fn query<'a>(
        &'a self,
        cmd: &'a str,
        params: &'a [Value],
        ctx: &'a Context,
    ) -> BoxFuture<'a, Result<Self::Rows, Self::Error>>;

    /// Checks if the connection is alive. Drivers without a cheap liveness check can rely on the
    /// default, which always succeeds.
    fn ping<'a>(&'a self, _ctx: &'a Context) -> BoxFuture<'a, Result<(), Self::Error>> {
        futures::future::ready(Ok(())).boxed()
    }
}
