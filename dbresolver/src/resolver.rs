use derivative::Derivative;
use derive_more::Constructor;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::trace;

use crate::classifier::{Classifier, Intent, QueryType};
use crate::config::ResolverBuilder;
use crate::connection::{Connection, Context, Value};
use crate::load_balancing::LoadBalancingStrategy;
use crate::pool::{Pool, Role};

/// Routing decision for a single command.
#[derive(Constructor, Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct Route {
    pub query_type: QueryType,
    pub role: Role,
    pub index: usize,
}

/// A command with its positional parameters.
#[derive(Constructor, Debug, Clone, PartialEq)]
pub struct Statement {
    pub cmd: String,
    pub params: Vec<Value>,
}

/// Resolver holding primary and replica pools behind one logical handle. Writes go to a primary,
/// reads to a replica, or to a primary if there are no replicas. Each call is forwarded to exactly
/// one connection and its result or error is returned unchanged - there are no retries and no
/// fallback to another connection.
///
/// Use [`ResolverBuilder`] to create one.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Resolver<C> {
    primaries: Pool<C>,
    replicas: Pool<C>,
    #[derivative(Debug = "ignore")]
    load_balancing: Box<dyn LoadBalancingStrategy + Send + Sync>,
    classifier: Classifier,
}

impl<C: Connection> Resolver<C> {
    // primaries are checked to be non-empty by the builder
    pub(crate) fn new(
        primaries: Pool<C>,
        replicas: Pool<C>,
        load_balancing: Box<dyn LoadBalancingStrategy + Send + Sync>,
        classifier: Classifier,
    ) -> Self {
        Resolver {
            primaries,
            replicas,
            load_balancing,
            classifier,
        }
    }

    pub fn builder() -> ResolverBuilder<C> {
        ResolverBuilder::new()
    }

    #[inline]
    pub fn primaries(&self) -> &Pool<C> {
        &self.primaries
    }

    /// Replica pool. Might be empty, in which case reads use primaries.
    #[inline]
    pub fn replicas(&self) -> &Pool<C> {
        &self.replicas
    }

    #[inline]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classifies the command and selects a connection for it, exactly as `execute` and `query`
    /// do.
    ///
    /// **Note:** this consumes a load balancer selection. Calling it shifts the rotation seen by
    /// subsequent commands in the chosen pool.
    pub fn route(&self, cmd: &str, intent: Intent) -> Route {
        let query_type = self.classifier.classify(cmd, intent);
        let pool = self.pool(query_type);
        let index = self.select(pool);

        trace!(%intent, %query_type, role = %pool.role(), index, "Routing command.");

        Route::new(query_type, pool.role(), index)
    }

    /// Returns connection chosen by given route.
    pub fn connection(&self, route: &Route) -> Option<&Arc<C>> {
        match route.role {
            Role::Primary => self.primaries.get(route.index),
            Role::Replica => self.replicas.get(route.index),
        }
    }

    /// Selects a primary connection.
    pub fn read_write(&self) -> &Arc<C> {
        self.select_connection(QueryType::Write).1
    }

    /// Selects a replica connection, or a primary one if there are no replicas.
    pub fn read_only(&self) -> &Arc<C> {
        self.select_connection(QueryType::Read).1
    }

    /// Runs a command which returns no rows on a connection matching its classification. Commands
    /// with an unrecognized leading keyword are treated as writes.
    pub async fn execute(
        &self,
        cmd: &str,
        params: &[Value],
        ctx: &Context,
    ) -> Result<u64, C::Error> {
        self.route_connection(cmd, Intent::Execute)
            .execute(cmd, params, ctx)
            .await
    }

    /// Runs a command returning rows. Commands with an unrecognized leading keyword are treated as
    /// reads, unless they contain `RETURNING` or lock rows.
    pub async fn query(
        &self,
        cmd: &str,
        params: &[Value],
        ctx: &Context,
    ) -> Result<C::Rows, C::Error> {
        self.route_connection(cmd, Intent::Query)
            .query(cmd, params, ctx)
            .await
    }

    /// Pings all primary and replica connections concurrently.
    pub async fn ping(&self, ctx: &Context) -> Result<(), C::Error> {
        try_join_all(
            self.primaries
                .members()
                .iter()
                .chain(self.replicas.members())
                .map(|connection| connection.ping(ctx)),
        )
        .await
        .map(|_| ())
    }

    /// Pins a single primary connection for a sequence of commands.
    pub fn begin(&self) -> Transaction<'_, C> {
        let (index, connection) = self.select_connection(QueryType::Write);
        Transaction { connection, index }
    }

    /// Runs all statements in order on one primary connection, selected once. Stops at the first
    /// error and returns it. Returns affected row counts of each statement.
    pub async fn execute_batch(
        &self,
        statements: &[Statement],
        ctx: &Context,
    ) -> Result<Vec<u64>, C::Error> {
        if statements.is_empty() {
            return Ok(vec![]);
        }

        let transaction = self.begin();
        let mut affected = Vec::with_capacity(statements.len());

        for statement in statements {
            affected.push(
                transaction
                    .execute(&statement.cmd, &statement.params, ctx)
                    .await?,
            );
        }

        Ok(affected)
    }

    fn route_connection(&self, cmd: &str, intent: Intent) -> &Arc<C> {
        let route = self.route(cmd, intent);
        &self.pool(route.query_type).members()[route.index]
    }

    fn select_connection(&self, query_type: QueryType) -> (usize, &Arc<C>) {
        let pool = self.pool(query_type);
        let index = self.select(pool);
        (index, &pool.members()[index])
    }

    fn pool(&self, query_type: QueryType) -> &Pool<C> {
        match query_type {
            QueryType::Write => &self.primaries,
            QueryType::Read if self.replicas.is_empty() => &self.primaries,
            QueryType::Read => &self.replicas,
        }
    }

    // custom strategies might not honor the range contract
    #[inline]
    fn select(&self, pool: &Pool<C>) -> usize {
        self.load_balancing.select(pool.role(), pool.size()) % pool.size()
    }
}

/// Primary connection pinned for the duration of a transaction. Every command sent through it
/// goes to the same connection, regardless of its classification. Issuing `BEGIN`/`COMMIT` is up
/// to the caller.
#[derive(Debug)]
pub struct Transaction<'a, C> {
    connection: &'a Arc<C>,
    index: usize,
}

impl<C: Connection> Transaction<'_, C> {
    #[inline]
    pub fn connection(&self) -> &Arc<C> {
        self.connection
    }

    /// Index of the pinned connection in the primary pool.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub async fn execute(
        &self,
        cmd: &str,
        params: &[Value],
        ctx: &Context,
    ) -> Result<u64, C::Error> {
        self.connection.execute(cmd, params, ctx).await
    }

    pub async fn query(
        &self,
        cmd: &str,
        params: &[Value],
        ctx: &Context,
    ) -> Result<C::Rows, C::Error> {
        self.connection.query(cmd, params, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use futures::future::{ready, BoxFuture, FutureExt};

    use super::*;
    use crate::load_balancing::MockLoadBalancingStrategy;

    #[derive(Debug)]
    struct NullConnection;

    impl Connection for NullConnection {
        type Rows = ();
        type Error = ();

        fn execute<'a>(
            &'a self,
            _cmd: &'a str,
            _params: &'a [Value],
            _ctx: &'a Context,
        ) -> BoxFuture<'a, Result<u64, ()>> {
            ready(Ok(0)).boxed()
        }

        fn query<'a>(
            &'a self,
            _cmd: &'a str,
            _params: &'a [Value],
            _ctx: &'a Context,
        ) -> BoxFuture<'a, Result<(), ()>> {
            ready(Ok(())).boxed()
        }
    }

    fn create_resolver(
        primaries: usize,
        replicas: usize,
        load_balancing: MockLoadBalancingStrategy,
    ) -> Resolver<NullConnection> {
        Resolver::builder()
            .with_primaries((0..primaries).map(|_| Arc::new(NullConnection)))
            .with_replicas((0..replicas).map(|_| Arc::new(NullConnection)))
            .with_load_balancing_strategy(load_balancing)
            .build()
            .unwrap()
    }

    #[test]
    fn should_route_writes_to_primaries() {
        let mut load_balancing = MockLoadBalancingStrategy::new();
        load_balancing
            .expect_select()
            .withf(|role, pool_size| *role == Role::Primary && *pool_size == 2)
            .times(2)
            .return_const(1usize);

        let resolver = create_resolver(2, 3, load_balancing);

        assert_eq!(
            resolver.route("DELETE FROM t WHERE id=$1", Intent::Execute),
            Route::new(QueryType::Write, Role::Primary, 1)
        );
        assert_eq!(
            resolver.route("UPDATE t SET a = 1 RETURNING a", Intent::Query),
            Route::new(QueryType::Write, Role::Primary, 1)
        );
    }

    #[test]
    fn should_fall_back_to_primaries_without_replicas() {
        let mut load_balancing = MockLoadBalancingStrategy::new();
        load_balancing
            .expect_select()
            .withf(|role, pool_size| *role == Role::Primary && *pool_size == 1)
            .return_const(0usize);

        let resolver = create_resolver(1, 0, load_balancing);
        let route = resolver.route("SELECT * FROM t", Intent::Query);

        assert_eq!(route, Route::new(QueryType::Read, Role::Primary, 0));
        assert!(resolver.connection(&route).is_some());
        assert!(Arc::ptr_eq(
            resolver.read_only(),
            &resolver.primaries().members()[0]
        ));
    }

    #[test]
    fn should_wrap_out_of_range_selection() {
        let mut load_balancing = MockLoadBalancingStrategy::new();
        load_balancing.expect_select().return_const(7usize);

        let resolver = create_resolver(1, 3, load_balancing);

        assert_eq!(resolver.route("SELECT 1", Intent::Query).index, 1);
        assert_eq!(resolver.route("INSERT INTO t VALUES (1)", Intent::Query).index, 0);
    }

    #[test]
    fn should_select_once_per_transaction() {
        let mut load_balancing = MockLoadBalancingStrategy::new();
        load_balancing
            .expect_select()
            .withf(|role, _| *role == Role::Primary)
            .times(1)
            .return_const(1usize);

        let resolver = create_resolver(2, 2, load_balancing);
        let transaction = resolver.begin();

        assert_eq!(transaction.index(), 1);
        assert!(Arc::ptr_eq(
            transaction.connection(),
            &resolver.primaries().members()[1]
        ));
    }

    #[tokio::test]
    async fn should_not_select_for_empty_batch() {
        let mut load_balancing = MockLoadBalancingStrategy::new();
        load_balancing.expect_select().never();

        let resolver = create_resolver(1, 1, load_balancing);

        assert_eq!(
            resolver.execute_batch(&[], &Context::default()).await,
            Ok(vec![])
        );
    }
}
