//! Aggregate handler configuration.

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

/// The as-configured state of an aggregate message handler.
///
/// An aggregate consumes commands and records the events that result, so its
/// capability table requires at least one `handles-command` and one
/// `records-event` route and disallows everything else.
///
/// # Example
///
/// ```
/// use solon_config::{validate, Aggregate, MessageType, Options, RouteType};
///
/// let aggregate = Aggregate::builder()
///     .source_type("bank::handlers::Account")
///     .name_key("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a")
///     .route(
///         RouteType::HandlesCommand,
///         MessageType::command("bank.OpenAccount"),
///     )
///     .route(
///         RouteType::RecordsEvent,
///         MessageType::event("bank.AccountOpened"),
///     )
///     .build();
///
/// assert!(validate(&aggregate, &Options::new()).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregate {
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

impl Aggregate {
    /// Returns a builder for populating an aggregate configuration.
    ///
    /// The builder resolves the disabled flag to `false`; populate the
    /// struct directly to represent an undetermined flag.
    #[must_use]
    pub fn builder() -> AggregateBuilder {
        AggregateBuilder {
            inner: Self {
                disabled: Some(false),
                ..Self::default()
            },
        }
    }
}

impl Component for Aggregate {
    fn fidelity(&self) -> Fidelity {
        let mut fidelity = self.fidelity | self.source.fidelity();
        if self.disabled.is_none() {
            fidelity.mark_incomplete();
        }
        fidelity
    }

    fn label(&self) -> String {
        entity_label(HandlerType::Aggregate.as_str(), &self.source, &self.identities)
    }

    fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt> {
        normalize_handler(
            &self.source,
            &mut self.identities,
            &mut self.routes,
            &HandlerType::Aggregate.capabilities(),
            ctx,
        )
    }
}

impl Entity for Aggregate {
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

impl Handler for Aggregate {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Aggregate
    }

    fn routes(&self) -> &[Route] {
        &self.routes
    }

    fn disabled(&self) -> Option<bool> {
        self.disabled
    }
}

/// A fluent builder for [`Aggregate`] configurations.
#[derive(Debug, Clone)]
pub struct AggregateBuilder {
    inner: Aggregate,
}

impl AggregateBuilder {
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

    /// Declares an identity record as-is, including partially known ones.
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

    /// Declares a route record as-is, including partially known ones.
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
    pub fn build(self) -> Aggregate {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{validate, Options};

    fn valid_aggregate() -> Aggregate {
        Aggregate::builder()
            .source_type("bank::handlers::Account")
            .name_key("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a")
            .route(
                RouteType::HandlesCommand,
                MessageType::command("bank.OpenAccount"),
            )
            .route(
                RouteType::RecordsEvent,
                MessageType::event("bank.AccountOpened"),
            )
            .build()
    }

    #[test]
    fn test_valid_aggregate_passes() {
        assert!(validate(&valid_aggregate(), &Options::new()).is_ok());
    }

    #[test]
    fn test_missing_handles_command_route() {
        let mut aggregate = valid_aggregate();
        aggregate.routes.remove(0);
        let error = validate(&aggregate, &Options::new()).expect_err("required route is missing");
        let text = error.to_string();
        assert!(
            text.contains(r#"expected at least one "handles-command" route"#),
            "{text}"
        );
        assert!(!text.contains("records-event"), "{text}");
    }

    #[test]
    fn test_disallowed_route_is_unexpected() {
        let aggregate = Aggregate {
            routes: valid_aggregate()
                .routes
                .into_iter()
                .chain([Route::new(
                    RouteType::SchedulesTimeout,
                    MessageType::timeout("bank.DormancyCheck"),
                )])
                .collect(),
            ..valid_aggregate()
        };
        let error = validate(&aggregate, &Options::new()).expect_err("timeouts are disallowed");
        assert!(
            error.to_string().contains(r#"unexpected "schedules-timeout" route"#),
            "{error}"
        );
    }

    #[test]
    fn test_undetermined_disabled_flag_is_incomplete() {
        let aggregate = Aggregate {
            disabled: None,
            ..valid_aggregate()
        };
        assert!(aggregate.fidelity().is_incomplete());
        assert!(validate(&aggregate, &Options::new()).is_err());
    }

    #[test]
    fn test_is_disabled_resolves_the_flag() {
        let aggregate = Aggregate {
            disabled: Some(true),
            ..valid_aggregate()
        };
        assert!(aggregate.is_disabled().expect("valid handler"));
    }

    #[test]
    fn test_identity_accessor_is_fail_fast() {
        let aggregate = Aggregate {
            identities: vec![
                Identity::new("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a"),
                Identity::new("account", "3a0e8373-e1b4-4bd7-a1ab-7e2e5a4e46ec"),
            ],
            ..valid_aggregate()
        };
        let error = aggregate.identity().expect_err("two identities are configured");
        assert!(
            error.to_string().contains("multiple identities"),
            "unexpected message: {error}"
        );
    }
}
