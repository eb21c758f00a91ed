//! Per-handler-type routing capability tables.

use crate::route::RouteType;
use std::fmt;

/// Whether a handler type may, must, or must not declare a given route type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCapability {
    /// The route type must not appear on this handler type.
    Disallowed,
    /// The route type may appear any number of times.
    Allowed,
    /// At least one route of this type must appear.
    Required,
}

impl fmt::Display for RouteCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disallowed => "disallowed",
            Self::Allowed => "allowed",
            Self::Required => "required",
        })
    }
}

/// The capability of every [`RouteType`] for one handler type.
///
/// Tables are fixed per handler type; see
/// [`HandlerType::capabilities`](crate::HandlerType::capabilities).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCapabilities {
    /// Capability of `handles-command` routes.
    pub handles_command: RouteCapability,
    /// Capability of `handles-event` routes.
    pub handles_event: RouteCapability,
    /// Capability of `executes-command` routes.
    pub executes_command: RouteCapability,
    /// Capability of `records-event` routes.
    pub records_event: RouteCapability,
    /// Capability of `schedules-timeout` routes.
    pub schedules_timeout: RouteCapability,
}

impl RouteCapabilities {
    /// Returns the capability of the given route type.
    #[must_use]
    pub const fn capability(&self, route_type: RouteType) -> RouteCapability {
        match route_type {
            RouteType::HandlesCommand => self.handles_command,
            RouteType::HandlesEvent => self.handles_event,
            RouteType::ExecutesCommand => self.executes_command,
            RouteType::RecordsEvent => self.records_event,
            RouteType::SchedulesTimeout => self.schedules_timeout,
        }
    }

    /// Returns the route types marked [`RouteCapability::Required`], in
    /// declaration order.
    pub fn required(&self) -> impl Iterator<Item = RouteType> + '_ {
        RouteType::ALL
            .into_iter()
            .filter(|route_type| self.capability(*route_type) == RouteCapability::Required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerType;

    #[test]
    fn test_aggregate_capabilities() {
        let capabilities = HandlerType::Aggregate.capabilities();
        assert_eq!(
            capabilities.capability(RouteType::HandlesCommand),
            RouteCapability::Required
        );
        assert_eq!(
            capabilities.capability(RouteType::RecordsEvent),
            RouteCapability::Required
        );
        assert_eq!(
            capabilities.capability(RouteType::HandlesEvent),
            RouteCapability::Disallowed
        );
        assert_eq!(
            capabilities.capability(RouteType::ExecutesCommand),
            RouteCapability::Disallowed
        );
        assert_eq!(
            capabilities.capability(RouteType::SchedulesTimeout),
            RouteCapability::Disallowed
        );
    }

    #[test]
    fn test_process_capabilities() {
        let capabilities = HandlerType::Process.capabilities();
        assert_eq!(
            capabilities.capability(RouteType::HandlesEvent),
            RouteCapability::Required
        );
        assert_eq!(
            capabilities.capability(RouteType::ExecutesCommand),
            RouteCapability::Required
        );
        assert_eq!(
            capabilities.capability(RouteType::SchedulesTimeout),
            RouteCapability::Allowed
        );
        assert_eq!(
            capabilities.capability(RouteType::HandlesCommand),
            RouteCapability::Disallowed
        );
    }

    #[test]
    fn test_required_route_types_in_declaration_order() {
        let required: Vec<_> = HandlerType::Process.capabilities().required().collect();
        assert_eq!(
            required,
            vec![RouteType::HandlesEvent, RouteType::ExecutesCommand]
        );
    }
}
