//! The validation error taxonomy and the aggregated error tree.

use crate::identity::Identity;
use crate::message::MessageType;
use crate::route::RouteType;
use std::fmt;
use thiserror::Error;

/// An error describing one way in which a configuration is not well-formed.
///
/// Leaf errors are collected as normalization descends and aggregated
/// bottom-up into [`Component`](Self::Component) nodes, producing a single
/// tree-shaped diagnostic per [`normalize`](crate::normalize()) call. The
/// textual form of the tree nests one bullet and indentation level per
/// depth, falling back to a flat `label: cause` form when a node has exactly
/// one cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// An entity has no identity configured at all.
    #[error("no identity is configured")]
    MissingIdentity,

    /// An entity has more than one identity configured.
    #[error("multiple identities are configured: {}", join(.identities))]
    MultipleIdentities {
        /// Every configured identity, in declaration order.
        identities: Vec<Identity>,
    },

    /// An identity name is empty, unprintable, or contains whitespace.
    #[error("invalid identity name {name:?}: names must be non-empty, printable, and contain no whitespace")]
    InvalidIdentityName {
        /// The offending name.
        name: String,
    },

    /// An identity key is not a canonically formatted RFC 4122/9562 UUID.
    #[error("invalid identity key {key:?}: keys must be canonical RFC 4122 UUIDs")]
    InvalidIdentityKey {
        /// The offending key.
        key: String,
    },

    /// A handler lacks a route its handler type requires.
    #[error(r#"expected at least one "{route_type}" route"#)]
    MissingRequiredRoute {
        /// The required route type.
        route_type: RouteType,
    },

    /// A handler declares a route its handler type disallows.
    #[error(r#"unexpected "{route_type}" route for {message_type_name}"#)]
    UnexpectedRoute {
        /// The disallowed route type.
        route_type: RouteType,
        /// The routed message type, by name.
        message_type_name: String,
    },

    /// A handler declares the same route more than once.
    #[error(r#""{route_type}" route for {message_type_name} is configured {occurrences} times"#)]
    DuplicateRoute {
        /// The duplicated route type.
        route_type: RouteType,
        /// The routed message type, by name.
        message_type_name: String,
        /// How many times the route appears.
        occurrences: usize,
    },

    /// A route's type implies a different message kind than the resolved
    /// message type has.
    #[error(
        r#""{route_type}" route expects {} {} but {message_type} is {} {}"#,
        article(.route_type.message_kind()),
        .route_type.message_kind(),
        article(.message_type.kind),
        .message_type.kind
    )]
    MessageKindMismatch {
        /// The route type.
        route_type: RouteType,
        /// The resolved message type it disagrees with.
        message_type: MessageType,
    },

    /// A route's declared message-type name disagrees with the resolved
    /// type's canonical name.
    #[error("declared message type name {declared:?} does not match canonical name {canonical:?}")]
    TypeNameMismatch {
        /// The name as declared.
        declared: String,
        /// The canonical name of the resolved type.
        canonical: String,
    },

    /// Two or more entities share a full identity (name and key).
    #[error("identity {identity} is shared by multiple entities: {}", .entities.join(", "))]
    IdentityConflict {
        /// The labels of every entity sharing the identity, in declaration
        /// order.
        entities: Vec<String>,
        /// The shared identity.
        identity: Identity,
    },

    /// Two or more handlers share an identity name.
    #[error("identity name {name:?} is shared by multiple handlers: {}", .entities.join(", "))]
    IdentityNameConflict {
        /// The labels of every handler sharing the name, in declaration
        /// order.
        entities: Vec<String>,
        /// The shared name.
        name: String,
    },

    /// Two or more entities share an identity key.
    #[error("identity key {key:?} is shared by multiple entities: {}", .entities.join(", "))]
    IdentityKeyConflict {
        /// The labels of every entity sharing the key, in declaration order.
        entities: Vec<String>,
        /// The shared key.
        key: String,
    },

    /// Two or more handlers declare an exclusive route for the same message
    /// type.
    #[error(
        r#"multiple handlers have a "{route_type}" route for {message_type_name}: {}"#,
        .handlers.join(", ")
    )]
    ConflictingRoute {
        /// The labels of every conflicting handler, in declaration order.
        handlers: Vec<String>,
        /// The exclusive route type.
        route_type: RouteType,
        /// The routed message type, by name.
        message_type_name: String,
    },

    /// A component's fidelity still carries the incomplete flag after
    /// normalization.
    #[error("the configuration includes values that could not be determined")]
    IncompleteComponent,

    /// A component's fidelity still carries the speculative flag after
    /// normalization.
    #[error("the configuration is speculative: its presence depends on conditions that could not be evaluated")]
    SpeculativeComponent,

    /// A runtime value was required but only a type name is available.
    #[error("a runtime value is required for {type_name} but only a type name is available")]
    ImplementationUnavailable {
        /// The name of the type whose value is unavailable.
        type_name: String,
    },

    /// An aggregated subtree of errors attributed to one component.
    #[error(transparent)]
    Component(#[from] ComponentError),
}

impl ConfigError {
    /// Creates an [`InvalidIdentityName`](Self::InvalidIdentityName) error.
    pub fn invalid_identity_name(name: impl Into<String>) -> Self {
        Self::InvalidIdentityName { name: name.into() }
    }

    /// Creates an [`InvalidIdentityKey`](Self::InvalidIdentityKey) error.
    pub fn invalid_identity_key(key: impl Into<String>) -> Self {
        Self::InvalidIdentityKey { key: key.into() }
    }

    /// Creates a [`MultipleIdentities`](Self::MultipleIdentities) error.
    #[must_use]
    pub fn multiple_identities(identities: Vec<Identity>) -> Self {
        Self::MultipleIdentities { identities }
    }

    /// Creates a [`MissingRequiredRoute`](Self::MissingRequiredRoute) error.
    #[must_use]
    pub fn missing_required_route(route_type: RouteType) -> Self {
        Self::MissingRequiredRoute { route_type }
    }

    /// Creates an [`UnexpectedRoute`](Self::UnexpectedRoute) error.
    pub fn unexpected_route(route_type: RouteType, message_type_name: impl Into<String>) -> Self {
        Self::UnexpectedRoute {
            route_type,
            message_type_name: message_type_name.into(),
        }
    }

    /// Creates a [`DuplicateRoute`](Self::DuplicateRoute) error.
    pub fn duplicate_route(
        route_type: RouteType,
        message_type_name: impl Into<String>,
        occurrences: usize,
    ) -> Self {
        Self::DuplicateRoute {
            route_type,
            message_type_name: message_type_name.into(),
            occurrences,
        }
    }

    /// Creates a [`MessageKindMismatch`](Self::MessageKindMismatch) error.
    #[must_use]
    pub fn message_kind_mismatch(route_type: RouteType, message_type: &MessageType) -> Self {
        Self::MessageKindMismatch {
            route_type,
            message_type: message_type.clone(),
        }
    }

    /// Creates a [`TypeNameMismatch`](Self::TypeNameMismatch) error.
    pub fn type_name_mismatch(declared: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self::TypeNameMismatch {
            declared: declared.into(),
            canonical: canonical.into(),
        }
    }

    /// Creates an [`IdentityConflict`](Self::IdentityConflict) error.
    #[must_use]
    pub fn identity_conflict(entities: Vec<String>, identity: Identity) -> Self {
        Self::IdentityConflict { entities, identity }
    }

    /// Creates an [`IdentityNameConflict`](Self::IdentityNameConflict) error.
    pub fn identity_name_conflict(entities: Vec<String>, name: impl Into<String>) -> Self {
        Self::IdentityNameConflict {
            entities,
            name: name.into(),
        }
    }

    /// Creates an [`IdentityKeyConflict`](Self::IdentityKeyConflict) error.
    pub fn identity_key_conflict(entities: Vec<String>, key: impl Into<String>) -> Self {
        Self::IdentityKeyConflict {
            entities,
            key: key.into(),
        }
    }

    /// Creates a [`ConflictingRoute`](Self::ConflictingRoute) error.
    pub fn conflicting_route(
        handlers: Vec<String>,
        route_type: RouteType,
        message_type_name: impl Into<String>,
    ) -> Self {
        Self::ConflictingRoute {
            handlers,
            route_type,
            message_type_name: message_type_name.into(),
        }
    }

    /// Creates an
    /// [`ImplementationUnavailable`](Self::ImplementationUnavailable) error.
    pub fn implementation_unavailable(type_name: impl Into<String>) -> Self {
        Self::ImplementationUnavailable {
            type_name: type_name.into(),
        }
    }

    /// Creates a [`Component`](Self::Component) error node.
    pub fn component(component: impl Into<String>, causes: Vec<Self>) -> Self {
        Self::Component(ComponentError::new(component, causes))
    }

    /// Returns `true` if this error, or any nested component subtree,
    /// is attributed to the component with the given label.
    #[must_use]
    pub fn mentions_component(&self, label: &str) -> bool {
        match self {
            Self::Component(node) => node.mentions_component(label),
            _ => false,
        }
    }

    /// Collects the leaf errors attributed directly to the component with
    /// the given label, anywhere in the tree.
    #[must_use]
    pub fn errors_for<'a>(&'a self, label: &str) -> Vec<&'a Self> {
        let mut found = Vec::new();
        if let Self::Component(node) = self {
            node.collect_errors_for(label, &mut found);
        }
        found
    }
}

/// A tree of validation errors attributed to one component.
///
/// See [`ConfigError`] for the rendering rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentError {
    component: String,
    causes: Vec<ConfigError>,
}

impl ComponentError {
    /// Creates an error node for the component with the given label.
    pub fn new(component: impl Into<String>, causes: Vec<ConfigError>) -> Self {
        Self {
            component: component.into(),
            causes,
        }
    }

    /// Returns the label of the component the errors are attributed to.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Returns the causes, in the order they were detected.
    #[must_use]
    pub fn causes(&self) -> &[ConfigError] {
        &self.causes
    }

    /// Returns `true` if this node or any descendant is labeled `label`.
    #[must_use]
    pub fn mentions_component(&self, label: &str) -> bool {
        self.component == label
            || self
                .causes
                .iter()
                .any(|cause| cause.mentions_component(label))
    }

    fn collect_errors_for<'a>(&'a self, label: &str, found: &mut Vec<&'a ConfigError>) {
        if self.component == label {
            found.extend(
                self.causes
                    .iter()
                    .filter(|cause| !matches!(cause, ConfigError::Component(_))),
            );
        }
        for cause in &self.causes {
            if let ConfigError::Component(node) = cause {
                node.collect_errors_for(label, found);
            }
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        if self.causes.len() == 1 {
            write!(f, "{}: ", self.component)?;
            return render_cause(&self.causes[0], f, depth);
        }

        write!(f, "{}:", self.component)?;
        for cause in &self.causes {
            writeln!(f)?;
            for _ in 0..=depth {
                f.write_str("  ")?;
            }
            f.write_str("- ")?;
            render_cause(cause, f, depth + 1)?;
        }
        Ok(())
    }
}

fn render_cause(cause: &ConfigError, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    match cause {
        ConfigError::Component(node) => node.render(f, depth),
        leaf => write!(f, "{leaf}"),
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

impl std::error::Error for ComponentError {}

fn join(identities: &[Identity]) -> String {
    identities
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Picks "a"/"an" for a message kind, purely for readable diagnostics.
fn article(kind: crate::message::MessageKind) -> &'static str {
    match kind {
        crate::message::MessageKind::Event => "an",
        _ => "a",
    }
}
