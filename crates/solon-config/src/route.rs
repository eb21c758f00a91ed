//! Message routes and the closed set of route types.

use crate::component::Component;
use crate::error::ConfigError;
use crate::fidelity::Fidelity;
use crate::message::{Direction, MessageKind, MessageType};
use crate::normalize::{Context, Halt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of route kinds a handler may declare.
///
/// Every variant has a fixed message kind and direction. Dispatch over route
/// types is done with exhaustive `match` expressions throughout this crate,
/// so adding a variant is a compile error at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteType {
    /// The handler consumes a command.
    HandlesCommand,
    /// The handler consumes an event.
    HandlesEvent,
    /// The handler produces a command for some other handler to consume.
    ExecutesCommand,
    /// The handler records an event.
    RecordsEvent,
    /// The handler schedules a timeout for itself.
    SchedulesTimeout,
}

impl RouteType {
    /// All route types, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::HandlesCommand,
        Self::HandlesEvent,
        Self::ExecutesCommand,
        Self::RecordsEvent,
        Self::SchedulesTimeout,
    ];

    /// Returns the kind of message that flows along routes of this type.
    #[must_use]
    pub const fn message_kind(self) -> MessageKind {
        match self {
            Self::HandlesCommand | Self::ExecutesCommand => MessageKind::Command,
            Self::HandlesEvent | Self::RecordsEvent => MessageKind::Event,
            Self::SchedulesTimeout => MessageKind::Timeout,
        }
    }

    /// Returns the direction messages flow along routes of this type.
    ///
    /// A scheduled timeout is both produced and later consumed by the same
    /// handler, so `SchedulesTimeout` is bidirectional.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::HandlesCommand | Self::HandlesEvent => Direction::INBOUND,
            Self::ExecutesCommand | Self::RecordsEvent => Direction::OUTBOUND,
            Self::SchedulesTimeout => Direction::BOTH,
        }
    }

    /// Returns `true` if routes of this type are exclusive across an
    /// application: a command must have exactly one handler and an event
    /// exactly one recorder, whereas any number of handlers may observe the
    /// same event or schedule the same timeout type.
    #[must_use]
    pub const fn is_exclusive(self) -> bool {
        matches!(self, Self::HandlesCommand | Self::RecordsEvent)
    }

    /// Returns the kebab-case name of this route type, as used in
    /// diagnostics ("handles-command", "records-event", ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HandlesCommand => "handles-command",
            Self::HandlesEvent => "handles-event",
            Self::ExecutesCommand => "executes-command",
            Self::RecordsEvent => "records-event",
            Self::SchedulesTimeout => "schedules-timeout",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message-route declaration on a handler.
///
/// All fields are optional: a static-analysis frontend may only recover part
/// of a route. A route with an absent `route_type` or message-type name is
/// *incomplete* rather than invalid; it can still be described, but cannot be
/// asserted executable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    /// The kind of route, if known.
    pub route_type: Option<RouteType>,
    /// The message-type name as declared by the application author, if known.
    pub message_type_name: Option<String>,
    /// The resolved message type, when the concrete type was available.
    pub message_type: Option<MessageType>,
}

impl Route {
    /// Creates a fully resolved route.
    ///
    /// The declared name is taken from the descriptor, so it is canonical by
    /// construction.
    #[must_use]
    pub fn new(route_type: RouteType, message_type: MessageType) -> Self {
        Self {
            route_type: Some(route_type),
            message_type_name: Some(message_type.name.clone()),
            message_type: Some(message_type),
        }
    }

    /// Creates a route that declares its message purely by name.
    pub fn named(route_type: RouteType, message_type_name: impl Into<String>) -> Self {
        Self {
            route_type: Some(route_type),
            message_type_name: Some(message_type_name.into()),
            message_type: None,
        }
    }

    /// Returns the best available display name for the routed message type.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.message_type
            .as_ref()
            .map(|ty| ty.name.as_str())
            .or(self.message_type_name.as_deref())
            .unwrap_or("?")
    }
}

impl Component for Route {
    fn fidelity(&self) -> Fidelity {
        if self.route_type.is_none()
            || (self.message_type_name.is_none() && self.message_type.is_none())
        {
            Fidelity::incomplete()
        } else {
            Fidelity::immaculate()
        }
    }

    fn label(&self) -> String {
        let route_type = self
            .route_type
            .map_or("route", RouteType::as_str);
        format!("route:{}:{}", route_type, self.display_name())
    }

    fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt> {
        if let Some(message_type) = self.message_type.clone() {
            if let Some(route_type) = self.route_type {
                if route_type.message_kind() != message_type.kind {
                    ctx.fail(ConfigError::message_kind_mismatch(route_type, &message_type))?;
                }
            }

            if let Some(declared) = &self.message_type_name {
                if *declared != message_type.name {
                    ctx.fail(ConfigError::type_name_mismatch(declared, &message_type.name))?;
                }
            }

            // The resolved type's name is authoritative.
            self.message_type_name = Some(message_type.name);
        } else if ctx.options().is_runtime_values() {
            ctx.fail(ConfigError::implementation_unavailable(self.display_name()))?;
        }

        Ok(())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.route_type {
            Some(route_type) => write!(f, "{} route for {}", route_type, self.display_name()),
            None => write!(f, "route for {}", self.display_name()),
        }
    }
}
