//! Application configuration: one identity and an ordered list of handlers.

use crate::component::{entity_label, Component, Entity, Handler, Source};
use crate::conflict::detect_conflicts;
use crate::error::ConfigError;
use crate::fidelity::Fidelity;
use crate::handler::{handler_labels, resolve_identities, AnyHandler};
use crate::identity::Identity;
use crate::normalize::{Context, Halt, Mode};
use crate::route_set::RouteSet;
use std::any::Any;
use std::sync::Arc;

/// The as-configured state of an application.
///
/// An application is an entity in its own right (it has an identity and a
/// route set, the union of its handlers') and the root at which
/// cross-handler conflict detection runs.
///
/// # Example
///
/// ```
/// use solon_config::{validate, Aggregate, Application, MessageType, Options, RouteType};
///
/// let application = Application::builder()
///     .source_type("bank::BankApp")
///     .name_key("bank", "14769f7f-87ad-4e64-a8ab-39c0d77a89b2")
///     .handler(
///         Aggregate::builder()
///             .source_type("bank::handlers::Account")
///             .name_key("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a")
///             .route(
///                 RouteType::HandlesCommand,
///                 MessageType::command("bank.OpenAccount"),
///             )
///             .route(
///                 RouteType::RecordsEvent,
///                 MessageType::event("bank.AccountOpened"),
///             )
///             .build(),
///     )
///     .build();
///
/// assert!(validate(&application, &Options::new()).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Application {
    /// The record of where this configuration came from.
    pub source: Source,
    /// The as-configured identities, in declaration order.
    pub identities: Vec<Identity>,
    /// The handlers registered against the application, in declaration
    /// order.
    pub handlers: Vec<AnyHandler>,
    /// Uncertainty inherited while this application was populated.
    pub fidelity: Fidelity,
}

impl Application {
    /// Returns a builder for populating an application configuration.
    #[must_use]
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder {
            inner: Self::default(),
        }
    }
}

impl Component for Application {
    fn fidelity(&self) -> Fidelity {
        self.fidelity | self.source.fidelity()
    }

    fn label(&self) -> String {
        entity_label("application", &self.source, &self.identities)
    }

    fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt> {
        resolve_identities(&mut self.identities, ctx)?;

        for handler in &mut self.handlers {
            ctx.normalize_child(handler)?;
        }

        // Conflict detection compares the handlers' normalized state, which
        // a shallow walk does not produce.
        if ctx.mode() != Mode::Shallow {
            detect_conflicts(self, ctx)?;
        }

        if ctx.options().is_runtime_values() && self.source.value.is_none() {
            let type_name = self.source.type_name.as_deref().unwrap_or("?");
            ctx.fail(ConfigError::implementation_unavailable(type_name))?;
        }

        Ok(())
    }
}

impl Entity for Application {
    fn source(&self) -> &Source {
        &self.source
    }

    fn identities(&self) -> &[Identity] {
        &self.identities
    }

    fn index_routes(&self) -> RouteSet {
        // Handlers are indexed under their numbered labels so that two
        // registrations of the same implementation type keep separate
        // entries rather than overwriting each other.
        let mut set = RouteSet::new();
        for (label, handler) in handler_labels(&self.handlers).iter().zip(&self.handlers) {
            for route in handler.routes() {
                set.add(label.as_str(), route);
            }
        }
        set
    }
}

/// A fluent builder for [`Application`] configurations.
#[derive(Debug, Clone)]
pub struct ApplicationBuilder {
    inner: Application,
}

impl ApplicationBuilder {
    /// Sets the concrete type name of the application implementation.
    pub fn source_type(mut self, type_name: impl Into<String>) -> Self {
        self.inner.source.type_name = Some(type_name.into());
        self
    }

    /// Sets the concrete type name and the live application value.
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

    /// Registers a handler of any kind.
    pub fn handler(mut self, handler: impl Into<AnyHandler>) -> Self {
        self.inner.handlers.push(handler.into());
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
    pub fn build(self) -> Application {
        self.inner
    }
}
