//! Projection handler configuration.

use crate::component::{entity_label, Component, Entity, Handler, Source};
use crate::fidelity::Fidelity;
use crate::handler::{index_handler_routes, normalize_handler, HandlerType};
use crate::identity::Identity;
use crate::message::MessageType;
use crate::normalize::{Context, Halt};
use crate::route::{Route, RouteType};
use crate::route_set::RouteSet;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

/// How events are delivered to the instances of a projection when the
/// application runs on multiple nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Each event is delivered to exactly one instance.
    #[default]
    Unicast,
    /// Each event is delivered to every instance.
    Broadcast {
        /// Deliver to the primary instance before any other.
        primary_first: bool,
    },
}

/// The as-configured state of a projection message handler.
///
/// A projection builds a read-model from events; its capability table
/// requires `handles-event` and disallows everything else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    /// The record of where this configuration came from.
    pub source: Source,
    /// The as-configured identities, in declaration order.
    pub identities: Vec<Identity>,
    /// The as-configured routes, in declaration order.
    pub routes: Vec<Route>,
    /// Whether the handler is disabled; `None` if undetermined.
    pub disabled: Option<bool>,
    /// The delivery policy; `None` means the default
    /// ([`DeliveryPolicy::Unicast`]) applies.
    pub delivery_policy: Option<DeliveryPolicy>,
    /// Uncertainty inherited while this handler was populated.
    pub fidelity: Fidelity,
}

impl Projection {
    /// Returns a builder for populating a projection configuration.
    #[must_use]
    pub fn builder() -> ProjectionBuilder {
        ProjectionBuilder {
            inner: Self {
                disabled: Some(false),
                ..Self::default()
            },
        }
    }

    /// Returns the effective delivery policy, applying the default when
    /// none was configured.
    #[must_use]
    pub fn effective_delivery_policy(&self) -> DeliveryPolicy {
        self.delivery_policy.unwrap_or_default()
    }
}

impl Component for Projection {
    fn fidelity(&self) -> Fidelity {
        let mut fidelity = self.fidelity | self.source.fidelity();
        if self.disabled.is_none() {
            fidelity.mark_incomplete();
        }
        fidelity
    }

    fn label(&self) -> String {
        entity_label(HandlerType::Projection.as_str(), &self.source, &self.identities)
    }

    fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt> {
        normalize_handler(
            &self.source,
            &mut self.identities,
            &mut self.routes,
            &HandlerType::Projection.capabilities(),
            ctx,
        )
    }
}

impl Entity for Projection {
    fn source(&self) -> &Source {
        &self.source
    }

    fn identities(&self) -> &[Identity] {
        &self.identities
    }

    fn index_routes(&self) -> RouteSet {
        index_handler_routes(&self.label(), &self.routes)
    }
}

impl Handler for Projection {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Projection
    }

    fn routes(&self) -> &[Route] {
        &self.routes
    }

    fn disabled(&self) -> Option<bool> {
        self.disabled
    }
}

/// A fluent builder for [`Projection`] configurations.
#[derive(Debug, Clone)]
pub struct ProjectionBuilder {
    inner: Projection,
}

impl ProjectionBuilder {
    /// Sets the concrete type name of the handler implementation.
    pub fn source_type(mut self, type_name: impl Into<String>) -> Self {
        self.inner.source.type_name = Some(type_name.into());
        self
    }

    /// Sets the concrete type name and the live handler value.
    pub fn source_value(
        mut self,
        type_name: impl Into<String>,
        value: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        self.inner.source = Source::resolved(type_name, value);
        self
    }

    /// Declares an identity with the given name and key.
    pub fn name_key(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.inner.identities.push(Identity::new(name, key));
        self
    }

    /// Declares an identity record as-is.
    pub fn raw_identity(mut self, identity: Identity) -> Self {
        self.inner.identities.push(identity);
        self
    }

    /// Declares a fully resolved route.
    pub fn route(mut self, route_type: RouteType, message_type: MessageType) -> Self {
        self.inner.routes.push(Route::new(route_type, message_type));
        self
    }

    /// Declares a route whose message is known only by name.
    pub fn named_route(
        mut self,
        route_type: RouteType,
        message_type_name: impl Into<String>,
    ) -> Self {
        self.inner.routes.push(Route::named(route_type, message_type_name));
        self
    }

    /// Declares a route record as-is.
    pub fn raw_route(mut self, route: Route) -> Self {
        self.inner.routes.push(route);
        self
    }

    /// Sets the disabled flag.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.inner.disabled = Some(disabled);
        self
    }

    /// Sets the delivery policy.
    pub fn delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.inner.delivery_policy = Some(policy);
        self
    }

    /// Marks the configuration as incomplete.
    pub fn incomplete(mut self) -> Self {
        self.inner.fidelity.mark_incomplete();
        self
    }

    /// Marks the configuration as speculative.
    pub fn speculative(mut self) -> Self {
        self.inner.fidelity.mark_speculative();
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> Projection {
        self.inner
    }
}
