//! The abstract component contract: every configuration node exposes
//! fidelity; entities add identity and routes; handlers add a handler type.

use crate::error::ConfigError;
use crate::fidelity::Fidelity;
use crate::handler::HandlerType;
use crate::identity::Identity;
use crate::normalize::{fail_fast, Context, Halt, Options};
use crate::route::Route;
use crate::route_set::RouteSet;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A record of where a configuration node came from.
///
/// The population collaborator supplies the concrete type name of the object
/// that was configured and, when configuration was performed against a live
/// object rather than static-analysis output, the object itself. The type
/// name drives the component's descriptive label; the value satisfies the
/// [`with_runtime_values`](Options::with_runtime_values) check.
#[derive(Clone, Default)]
pub struct Source {
    /// The fully-qualified name of the concrete type, if known.
    pub type_name: Option<String>,
    /// The live value, when configuration was populated from one.
    pub value: Option<Arc<dyn Any + Send + Sync>>,
}

impl Source {
    /// Creates a source known only by type name.
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            value: None,
        }
    }

    /// Creates a source with both the type name and the live value.
    pub fn resolved(type_name: impl Into<String>, value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            value: Some(value),
        }
    }

    /// Returns the fidelity contributed by this source.
    ///
    /// An unknown type name makes the owning component incomplete: its label
    /// cannot be derived. An absent value does not degrade fidelity; it only
    /// matters under runtime-values validation.
    #[must_use]
    pub fn fidelity(&self) -> Fidelity {
        if self.type_name.is_none() {
            Fidelity::incomplete()
        } else {
            Fidelity::immaculate()
        }
    }

    /// Returns the last path segment of the type name, if known.
    #[must_use]
    pub fn short_name(&self) -> Option<&str> {
        self.type_name
            .as_deref()
            .map(|name| name.rsplit("::").next().unwrap_or(name))
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("type_name", &self.type_name)
            .field("value", &self.value.as_ref().map(|_| "<value>"))
            .finish()
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        let values_eq = match (&self.value, &other.value) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.type_name == other.type_name && values_eq
    }
}

impl Eq for Source {}

/// A node in a configuration tree.
///
/// Raw ("as-configured") components are built once by a population
/// collaborator and never mutated thereafter; the normalization entry points
/// in [`normalize`](crate::normalize) always operate on a clone.
pub trait Component: Clone + fmt::Debug {
    /// Returns the component's fidelity: its intrinsic uncertainty merged
    /// with any uncertainty inherited while it was populated.
    fn fidelity(&self) -> Fidelity;

    /// Returns the component's descriptive label, e.g. `aggregate:Account`.
    fn label(&self) -> String;

    /// Normalizes this component in place against `ctx`, accumulating
    /// errors into it.
    ///
    /// Not intended to be called directly; use
    /// [`normalize`](crate::normalize()), [`validate`](crate::validate), or
    /// the entity accessors instead.
    fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt>;
}

/// A component with an identity and message routes.
pub trait Entity: Component {
    /// Returns the source record this entity was populated from.
    fn source(&self) -> &Source;

    /// Returns the as-configured identities, in declaration order.
    ///
    /// A well-formed entity has exactly one; use [`identity`](Self::identity)
    /// to resolve it authoritatively.
    fn identities(&self) -> &[Identity];

    /// Builds the route-set index from the entity's routes *as they
    /// currently are*, without validating them.
    ///
    /// Most callers want [`route_set`](Self::route_set), which normalizes
    /// first.
    fn index_routes(&self) -> RouteSet;

    /// Resolves the entity's single authoritative identity.
    ///
    /// This runs normalization in fail-fast mode: the first problem found
    /// anywhere in the entity is returned as an error, wrapped with the
    /// labels of the components it was found under. A partially-valid
    /// identity is never returned. Callers that want the full diagnostic
    /// report should use [`validate`](crate::validate) instead.
    fn identity(&self) -> Result<Identity, ConfigError> {
        let normalized = fail_fast(self, &Options::new())?;
        normalized
            .identities()
            .first()
            .cloned()
            .ok_or(ConfigError::MissingIdentity)
    }

    /// Resolves the entity's normalized route set.
    ///
    /// Fail-fast, like [`identity`](Self::identity).
    fn route_set(&self) -> Result<RouteSet, ConfigError> {
        let normalized = fail_fast(self, &Options::new())?;
        Ok(normalized.index_routes())
    }
}

/// An entity that handles messages: an aggregate, process, integration, or
/// projection.
pub trait Handler: Entity {
    /// Returns the tag identifying which kind of handler this is.
    fn handler_type(&self) -> HandlerType;

    /// Returns the as-configured routes, in declaration order.
    fn routes(&self) -> &[Route];

    /// Returns the as-configured disabled flag, or `None` if the source
    /// could not determine it.
    fn disabled(&self) -> Option<bool>;

    /// Resolves whether the handler is disabled.
    ///
    /// Fail-fast, like [`Entity::identity`]; an undetermined flag is
    /// reported as an incomplete component rather than defaulted.
    fn is_disabled(&self) -> Result<bool, ConfigError> {
        let normalized = fail_fast(self, &Options::new())?;
        normalized.disabled().ok_or(ConfigError::IncompleteComponent)
    }
}

/// Derives the descriptive label for an entity.
///
/// Prefers the source's short type name, then the first configured identity
/// name, then a placeholder.
pub(crate) fn entity_label(kind: &str, source: &Source, identities: &[Identity]) -> String {
    let name = source
        .short_name()
        .map(str::to_string)
        .or_else(|| identities.iter().find_map(|identity| identity.name.clone()))
        .unwrap_or_else(|| "?".to_string());
    format!("{kind}:{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_short_name_strips_path() {
        let source = Source::named("bank::handlers::Account");
        assert_eq!(source.short_name(), Some("Account"));

        let source = Source::named("Account");
        assert_eq!(source.short_name(), Some("Account"));
    }

    #[test]
    fn test_unnamed_source_is_incomplete() {
        assert!(Source::default().fidelity().is_incomplete());
        assert!(Source::named("Account").fidelity().is_immaculate());
    }

    #[test]
    fn test_source_equality_ignores_distinct_but_absent_values() {
        assert_eq!(Source::named("Account"), Source::named("Account"));
        let value: Arc<dyn Any + Send + Sync> = Arc::new(42_u32);
        let resolved = Source::resolved("Account", Arc::clone(&value));
        assert_eq!(resolved, resolved.clone());
        assert_ne!(resolved, Source::named("Account"));
    }

    #[test]
    fn test_entity_label_fallbacks() {
        let identity = Identity::new("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a");
        assert_eq!(
            entity_label("aggregate", &Source::named("bank::Account"), &[]),
            "aggregate:Account"
        );
        assert_eq!(
            entity_label("aggregate", &Source::default(), &[identity]),
            "aggregate:account"
        );
        assert_eq!(entity_label("aggregate", &Source::default(), &[]), "aggregate:?");
    }
}
