#![allow(dead_code)]

use dbresolver::config::ResolverBuilder;
use dbresolver::connection::{Connection, Context, Value};
use dbresolver::future::BoxFuture;
use dbresolver::load_balancing::LoadBalancingStrategy;
use dbresolver::resolver::Resolver;
use futures::FutureExt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{connection} failed: {message}")]
pub struct FakeError {
    pub connection: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Execute,
    Query,
    Ping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub kind: CallKind,
    pub cmd: String,
    pub params: Vec<Value>,
}

/// Connection recording every call and returning canned results. Queries return the connection
/// name as a single row, executes report one affected row.
#[derive(Debug)]
pub struct FakeConnection {
    name: String,
    failure: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeConnection {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(FakeConnection {
            name: name.into(),
            failure: None,
            calls: Default::default(),
        })
    }

    pub fn failing(name: &str, message: &str) -> Arc<Self> {
        Arc::new(FakeConnection {
            name: name.into(),
            failure: Some(message.into()),
            calls: Default::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, kind: CallKind, cmd: &str, params: &[Value]) -> Result<(), FakeError> {
        self.calls.lock().unwrap().push(Call {
            kind,
            cmd: cmd.into(),
            params: params.to_vec(),
        });

        match &self.failure {
            Some(message) => Err(FakeError {
                connection: self.name.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Connection for FakeConnection {
    type Rows = Vec<String>;
    type Error = FakeError;

    fn execute<'a>(
        &'a self,
        cmd: &'a str,
        params: &'a [Value],
        _ctx: &'a Context,
    ) -> BoxFuture<'a, Result<u64, FakeError>> {
        async move {
            self.record(CallKind::Execute, cmd, params)?;
            Ok(1)
        }
        .boxed()
    }

    fn query<'a>(
        &'a self,
        cmd: &'a str,
        params: &'a [Value],
        _ctx: &'a Context,
    ) -> BoxFuture<'a, Result<Vec<String>, FakeError>> {
        async move {
            self.record(CallKind::Query, cmd, params)?;
            Ok(vec![self.name.clone()])
        }
        .boxed()
    }

    fn ping<'a>(&'a self, _ctx: &'a Context) -> BoxFuture<'a, Result<(), FakeError>> {
        async move { self.record(CallKind::Ping, "", &[]) }.boxed()
    }
}

pub fn connections(prefix: &str, count: usize) -> Vec<Arc<FakeConnection>> {
    (0..count)
        .map(|index| FakeConnection::new(&format!("{}-{}", prefix, index)))
        .collect()
}

pub fn create_resolver(
    primaries: &[Arc<FakeConnection>],
    replicas: &[Arc<FakeConnection>],
    load_balancing: impl LoadBalancingStrategy + Send + Sync + 'static,
) -> Resolver<FakeConnection> {
    ResolverBuilder::new()
        .with_primaries(primaries.iter().cloned())
        .with_replicas(replicas.iter().cloned())
        .with_load_balancing_strategy(load_balancing)
        .build()
        .unwrap()
}
