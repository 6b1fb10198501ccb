use derivative::Derivative;
use std::sync::Arc;
use tracing::debug;

use crate::classifier::{Classifier, QueryType};
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::load_balancing::{LoadBalancerKind, LoadBalancingStrategy};
use crate::pool::{Pool, Role};
use crate::resolver::Resolver;

/// Builder structure that helps to configure a [`Resolver`]. Setting the same option more than
/// once replaces the previous value.
///
/// Defaults: no replicas, round-robin load balancing and the built-in keyword classifier.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ResolverBuilder<C> {
    primaries: Vec<Arc<C>>,
    replicas: Vec<Arc<C>>,
    #[derivative(Debug = "ignore")]
    load_balancing: Box<dyn LoadBalancingStrategy + Send + Sync>,
    classifier: Classifier,
    classifier_overrides: Vec<(String, QueryType)>,
}

impl<C> Default for ResolverBuilder<C> {
    fn default() -> Self {
        ResolverBuilder {
            primaries: vec![],
            replicas: vec![],
            load_balancing: LoadBalancerKind::default().into_strategy(),
            classifier: Default::default(),
            classifier_overrides: vec![],
        }
    }
}

impl<C: Connection> ResolverBuilder<C> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets primary connections, used for writes and as read fallback. At least one is required.
    pub fn with_primaries(mut self, primaries: impl IntoIterator<Item = Arc<C>>) -> Self {
        self.primaries = primaries.into_iter().collect();
        self
    }

    /// Sets replica connections, used for reads.
    pub fn with_replicas(mut self, replicas: impl IntoIterator<Item = Arc<C>>) -> Self {
        self.replicas = replicas.into_iter().collect();
        self
    }

    /// Sets a built-in load balancing strategy.
    pub fn with_load_balancer(mut self, kind: LoadBalancerKind) -> Self {
        self.load_balancing = kind.into_strategy();
        self
    }

    /// Sets a custom load balancing strategy.
    pub fn with_load_balancing_strategy(
        mut self,
        load_balancing: impl LoadBalancingStrategy + Send + Sync + 'static,
    ) -> Self {
        self.load_balancing = Box::new(load_balancing);
        self
    }

    /// Sets the base classifier. Overrides are applied on top of it.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Routes commands starting with given keyword according to given query type.
    pub fn with_classifier_override(mut self, keyword: &str, query_type: QueryType) -> Self {
        self.classifier_overrides
            .push((keyword.to_string(), query_type));
        self
    }

    pub fn with_classifier_overrides<K: AsRef<str>>(
        self,
        overrides: impl IntoIterator<Item = (K, QueryType)>,
    ) -> Self {
        overrides
            .into_iter()
            .fold(self, |builder, (keyword, query_type)| {
                builder.with_classifier_override(keyword.as_ref(), query_type)
            })
    }

    /// Builds the resolver. Fails if there are no primaries or an override keyword is blank.
    pub fn build(self) -> Result<Resolver<C>> {
        if self.primaries.is_empty() {
            return Err(Error::NoPrimaries);
        }

        let classifier = self.classifier_overrides.into_iter().try_fold(
            self.classifier,
            |classifier, (keyword, query_type)| {
                if keyword.trim().is_empty() {
                    Err(Error::from("Classifier override keyword is empty"))
                } else {
                    Ok(classifier.with_override(&keyword, query_type))
                }
            },
        )?;

        debug!(
            primaries = self.primaries.len(),
            replicas = self.replicas.len(),
            "Building resolver."
        );

        Ok(Resolver::new(
            Pool::new(Role::Primary, self.primaries),
            Pool::new(Role::Replica, self.replicas),
            self.load_balancing,
            classifier,
        ))
    }
}
