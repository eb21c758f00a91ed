//! The closed set of handler types and the normalization rules shared by
//! every handler kind.

use crate::aggregate::Aggregate;
use crate::capability::{RouteCapabilities, RouteCapability};
use crate::component::{Component, Entity, Handler, Source};
use crate::error::ConfigError;
use crate::fidelity::Fidelity;
use crate::identity::Identity;
use crate::integration::Integration;
use crate::normalize::{Context, Halt};
use crate::process::Process;
use crate::projection::Projection;
use crate::route::{Route, RouteType};
use crate::route_set::RouteSet;
use indexmap::IndexMap;
use std::fmt;

/// The closed set of handler kinds.
///
/// Each maps, via a fixed table, to the [`RouteCapabilities`] describing
/// which route types it requires, allows, and disallows. Dispatch is by
/// exhaustive `match`: adding a variant is a compile error at every call
/// site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerType {
    /// A command handler that records events against its own state.
    Aggregate,
    /// A stateful coordinator driven by events, issuing commands and
    /// optionally scheduling timeouts.
    Process,
    /// A command handler that interacts with systems outside the
    /// application.
    Integration,
    /// A read-model builder driven by events.
    Projection,
}

impl HandlerType {
    /// All handler types, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Aggregate,
        Self::Process,
        Self::Integration,
        Self::Projection,
    ];

    /// Returns the lowercase name of this handler type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggregate => "aggregate",
            Self::Process => "process",
            Self::Integration => "integration",
            Self::Projection => "projection",
        }
    }

    /// Returns the fixed routing-capability table for this handler type.
    #[must_use]
    pub const fn capabilities(self) -> RouteCapabilities {
        use RouteCapability::{Allowed, Disallowed, Required};
        match self {
            Self::Aggregate => RouteCapabilities {
                handles_command: Required,
                handles_event: Disallowed,
                executes_command: Disallowed,
                records_event: Required,
                schedules_timeout: Disallowed,
            },
            Self::Process => RouteCapabilities {
                handles_command: Disallowed,
                handles_event: Required,
                executes_command: Required,
                records_event: Disallowed,
                schedules_timeout: Allowed,
            },
            Self::Integration => RouteCapabilities {
                handles_command: Required,
                handles_event: Disallowed,
                executes_command: Disallowed,
                records_event: Allowed,
                schedules_timeout: Disallowed,
            },
            Self::Projection => RouteCapabilities {
                handles_command: Disallowed,
                handles_event: Required,
                executes_command: Disallowed,
                records_event: Disallowed,
                schedules_timeout: Disallowed,
            },
        }
    }
}

impl fmt::Display for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves an entity's as-configured identity list toward exactly one
/// well-formed identity, accumulating errors into `ctx`.
pub(crate) fn resolve_identities(
    identities: &mut [Identity],
    ctx: &mut Context,
) -> Result<(), Halt> {
    match identities.len() {
        0 => ctx.fail(ConfigError::MissingIdentity)?,
        1 => {}
        _ => ctx.fail(ConfigError::multiple_identities(identities.to_vec()))?,
    }

    for identity in identities {
        ctx.normalize_child(identity)?;
    }

    Ok(())
}

/// Normalizes a handler's route list against its capability table.
///
/// 1. Seeds a "missing" set with every required route type.
/// 2. Normalizes each route; disallowed routes are reported, everything
///    else clears its type from the missing set.
/// 3. Groups routes by `(route type, message-type name)` and reports one
///    duplicate error per group with more than one member.
/// 4. Reports every route type still in the missing set.
pub(crate) fn normalize_routes(
    capabilities: &RouteCapabilities,
    routes: &mut [Route],
    ctx: &mut Context,
) -> Result<(), Halt> {
    let mut missing: Vec<RouteType> = capabilities.required().collect();

    for route in routes.iter_mut() {
        ctx.normalize_child(route)?;

        if let Some(route_type) = route.route_type {
            if capabilities.capability(route_type) == RouteCapability::Disallowed {
                ctx.fail(ConfigError::unexpected_route(route_type, route.display_name()))?;
            } else {
                missing.retain(|required| *required != route_type);
            }
        }
    }

    let mut occurrences: IndexMap<(RouteType, &str), usize> = IndexMap::new();
    for route in routes.iter() {
        if let (Some(route_type), Some(name)) = (route.route_type, &route.message_type_name) {
            *occurrences.entry((route_type, name.as_str())).or_insert(0) += 1;
        }
    }
    let duplicates: Vec<ConfigError> = occurrences
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((route_type, name), count)| ConfigError::duplicate_route(route_type, name, count))
        .collect();
    for error in duplicates {
        ctx.fail(error)?;
    }

    for route_type in missing {
        ctx.fail(ConfigError::missing_required_route(route_type))?;
    }

    Ok(())
}

/// The per-handler normalization pass shared by all four handler kinds:
/// identity resolution, route-set normalization, and the runtime-values
/// check against the handler's source.
pub(crate) fn normalize_handler(
    source: &Source,
    identities: &mut [Identity],
    routes: &mut [Route],
    capabilities: &RouteCapabilities,
    ctx: &mut Context,
) -> Result<(), Halt> {
    resolve_identities(identities, ctx)?;
    normalize_routes(capabilities, routes, ctx)?;

    if ctx.options().is_runtime_values() && source.value.is_none() {
        let type_name = source.type_name.as_deref().unwrap_or("?");
        ctx.fail(ConfigError::implementation_unavailable(type_name))?;
    }

    Ok(())
}

/// Derives the diagnostic label of every handler in declaration order,
/// numbering repeats the same way [`Context`] numbers sibling contexts, so
/// two registrations of one implementation type stay distinguishable.
pub(crate) fn handler_labels(handlers: &[AnyHandler]) -> Vec<String> {
    let mut seen: IndexMap<String, usize> = IndexMap::new();
    handlers
        .iter()
        .map(|handler| {
            let label = handler.label();
            let count = {
                let count = seen.entry(label.clone()).or_insert(0);
                *count += 1;
                *count
            };
            if count > 1 {
                format!("{label} ({count})")
            } else {
                label
            }
        })
        .collect()
}

/// Indexes a handler's routes under its own label.
pub(crate) fn index_handler_routes(label: &str, routes: &[Route]) -> RouteSet {
    let mut set = RouteSet::new();
    for route in routes {
        set.add(label, route);
    }
    set
}

/// One handler of any kind, as stored by an
/// [`Application`](crate::Application).
///
/// This is the closed-set counterpart of the [`Handler`] trait: storing
/// handlers as a sum type keeps dispatch exhaustive while still letting an
/// application own an ordered list of mixed handler kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyHandler {
    /// An [`Aggregate`] handler.
    Aggregate(Aggregate),
    /// A [`Process`] handler.
    Process(Process),
    /// An [`Integration`] handler.
    Integration(Integration),
    /// A [`Projection`] handler.
    Projection(Projection),
}

impl Component for AnyHandler {
    fn fidelity(&self) -> Fidelity {
        match self {
            Self::Aggregate(handler) => handler.fidelity(),
            Self::Process(handler) => handler.fidelity(),
            Self::Integration(handler) => handler.fidelity(),
            Self::Projection(handler) => handler.fidelity(),
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Aggregate(handler) => handler.label(),
            Self::Process(handler) => handler.label(),
            Self::Integration(handler) => handler.label(),
            Self::Projection(handler) => handler.label(),
        }
    }

    fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt> {
        match self {
            Self::Aggregate(handler) => handler.normalize(ctx),
            Self::Process(handler) => handler.normalize(ctx),
            Self::Integration(handler) => handler.normalize(ctx),
            Self::Projection(handler) => handler.normalize(ctx),
        }
    }
}

impl Entity for AnyHandler {
    fn source(&self) -> &Source {
        match self {
            Self::Aggregate(handler) => handler.source(),
            Self::Process(handler) => handler.source(),
            Self::Integration(handler) => handler.source(),
            Self::Projection(handler) => handler.source(),
        }
    }

    fn identities(&self) -> &[Identity] {
        match self {
            Self::Aggregate(handler) => handler.identities(),
            Self::Process(handler) => handler.identities(),
            Self::Integration(handler) => handler.identities(),
            Self::Projection(handler) => handler.identities(),
        }
    }

    fn index_routes(&self) -> RouteSet {
        match self {
            Self::Aggregate(handler) => handler.index_routes(),
            Self::Process(handler) => handler.index_routes(),
            Self::Integration(handler) => handler.index_routes(),
            Self::Projection(handler) => handler.index_routes(),
        }
    }
}

impl Handler for AnyHandler {
    fn handler_type(&self) -> HandlerType {
        match self {
            Self::Aggregate(_) => HandlerType::Aggregate,
            Self::Process(_) => HandlerType::Process,
            Self::Integration(_) => HandlerType::Integration,
            Self::Projection(_) => HandlerType::Projection,
        }
    }

    fn routes(&self) -> &[Route] {
        match self {
            Self::Aggregate(handler) => handler.routes(),
            Self::Process(handler) => handler.routes(),
            Self::Integration(handler) => handler.routes(),
            Self::Projection(handler) => handler.routes(),
        }
    }

    fn disabled(&self) -> Option<bool> {
        match self {
            Self::Aggregate(handler) => handler.disabled(),
            Self::Process(handler) => handler.disabled(),
            Self::Integration(handler) => handler.disabled(),
            Self::Projection(handler) => handler.disabled(),
        }
    }
}

impl From<Aggregate> for AnyHandler {
    fn from(handler: Aggregate) -> Self {
        Self::Aggregate(handler)
    }
}

impl From<Process> for AnyHandler {
    fn from(handler: Process) -> Self {
        Self::Process(handler)
    }
}

impl From<Integration> for AnyHandler {
    fn from(handler: Integration) -> Self {
        Self::Integration(handler)
    }
}

impl From<Projection> for AnyHandler {
    fn from(handler: Projection) -> Self {
        Self::Projection(handler)
    }
}
