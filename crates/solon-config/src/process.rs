//! Process handler configuration.

use crate::component::{entity_label, Component, Entity, Handler, Source};
use crate::fidelity::Fidelity;
use crate::handler::{index_handler_routes, normalize_handler, HandlerType};
use crate::identity::Identity;
use crate::message::MessageType;
use crate::normalize::{Context, Halt};
use crate::route::{Route, RouteType};
use crate::route_set::RouteSet;
use std::any::Any;
use std::sync::Arc;

/// The as-configured state of a process message handler.
///
/// A process coordinates long-running behavior: it is driven by events,
/// executes commands in response, and may schedule timeouts for itself. Its
/// capability table requires `handles-event` and `executes-command`, allows
/// `schedules-timeout`, and disallows the rest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Process {
    /// The record of where this configuration came from.
    pub source: Source,
    /// The as-configured identities, in declaration order.
    pub identities: Vec<Identity>,
    /// The as-configured routes, in declaration order.
    pub routes: Vec<Route>,
    /// Whether the handler is disabled; `None` if undetermined.
    pub disabled: Option<bool>,
    /// Uncertainty inherited while this handler was populated.
    pub fidelity: Fidelity,
}

impl Process {
    /// Returns a builder for populating a process configuration.
    #[must_use]
    pub fn builder() -> ProcessBuilder {
        ProcessBuilder {
            inner: Self {
                disabled: Some(false),
                ..Self::default()
            },
        }
    }
}

impl Component for Process {
    fn fidelity(&self) -> Fidelity {
        let mut fidelity = self.fidelity | self.source.fidelity();
        if self.disabled.is_none() {
            fidelity.mark_incomplete();
        }
        fidelity
    }

    fn label(&self) -> String {
        entity_label(HandlerType::Process.as_str(), &self.source, &self.identities)
    }

    fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt> {
        normalize_handler(
            &self.source,
            &mut self.identities,
            &mut self.routes,
            &HandlerType::Process.capabilities(),
            ctx,
        )
    }
}

impl Entity for Process {
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

impl Handler for Process {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Process
    }

    fn routes(&self) -> &[Route] {
        &self.routes
    }

    fn disabled(&self) -> Option<bool> {
        self.disabled
    }
}

/// A fluent builder for [`Process`] configurations.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    inner: Process,
}

impl ProcessBuilder {
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
    pub fn build(self) -> Process {
        self.inner
    }
}
