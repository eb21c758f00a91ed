//! A derived, multi-index registry of normalized routes.

use crate::message::{Direction, MessageKind};
use crate::route::{Route, RouteType};
use indexmap::IndexMap;

/// A read-only index built from an entity's normalized routes.
///
/// The index is keyed message-type name → route type → owning-handler label,
/// preserving declaration order at every level. Owner labels must uniquely
/// identify a handler: for a handler the owning label is always its own,
/// while an application numbers repeated labels ("integration:Gateway (2)")
/// before indexing, so two registrations of one implementation type keep
/// separate entries.
///
/// Only routes whose route type and message-type name are both known can be
/// indexed; incomplete routes are skipped (they remain visible on the raw
/// entity for descriptive purposes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSet {
    by_message: IndexMap<String, IndexMap<RouteType, IndexMap<String, Route>>>,
}

impl RouteSet {
    /// Creates an empty route set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `route` as belonging to the handler labeled `owner`.
    ///
    /// Routes without a known route type and message-type name are ignored.
    pub fn add(&mut self, owner: impl Into<String>, route: &Route) {
        let (Some(route_type), Some(name)) = (route.route_type, route.message_type_name.clone())
        else {
            return;
        };
        self.by_message
            .entry(name)
            .or_default()
            .entry(route_type)
            .or_default()
            .insert(owner.into(), route.clone());
    }

    /// Merges every route in `other` into this set.
    pub fn merge(&mut self, other: &Self) {
        for (name, by_type) in &other.by_message {
            for (route_type, by_owner) in by_type {
                for (owner, route) in by_owner {
                    self.by_message
                        .entry(name.clone())
                        .or_default()
                        .entry(*route_type)
                        .or_default()
                        .insert(owner.clone(), route.clone());
                }
            }
        }
    }

    /// Returns `true` if the set indexes no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_message.is_empty()
    }

    /// Returns the total number of indexed routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Iterates over every `(message-type name, route type, owner, route)`
    /// entry in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RouteType, &str, &Route)> {
        self.by_message.iter().flat_map(|(name, by_type)| {
            by_type.iter().flat_map(move |(route_type, by_owner)| {
                by_owner
                    .iter()
                    .map(move |(owner, route)| (name.as_str(), *route_type, owner.as_str(), route))
            })
        })
    }

    /// Returns `true` if any handler declares a `route_type` route for the
    /// named message type.
    #[must_use]
    pub fn contains(&self, route_type: RouteType, message_type_name: &str) -> bool {
        self.by_message
            .get(message_type_name)
            .is_some_and(|by_type| by_type.contains_key(&route_type))
    }

    /// Returns the labels of the handlers declaring a `route_type` route for
    /// the named message type, in declaration order.
    pub fn handlers_for(
        &self,
        route_type: RouteType,
        message_type_name: &str,
    ) -> impl Iterator<Item = &str> {
        self.by_message
            .get(message_type_name)
            .and_then(|by_type| by_type.get(&route_type))
            .into_iter()
            .flat_map(|by_owner| by_owner.keys().map(String::as_str))
    }

    /// Returns a new set containing only routes of the given route type.
    #[must_use]
    pub fn filter_by_route_type(&self, route_type: RouteType) -> Self {
        self.filter(|rt, _| rt == route_type)
    }

    /// Returns a new set containing only routes for messages of the given
    /// kind.
    #[must_use]
    pub fn filter_by_message_kind(&self, kind: MessageKind) -> Self {
        self.filter(|rt, _| rt.message_kind() == kind)
    }

    /// Returns a new set containing only routes whose direction intersects
    /// `direction`.
    #[must_use]
    pub fn filter_by_direction(&self, direction: Direction) -> Self {
        self.filter(|rt, _| rt.direction().intersects(direction))
    }

    /// Yields the distinct message-type names in the set, each with the
    /// union of the directions of its routes.
    pub fn message_types(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.by_message.iter().map(|(name, by_type)| {
            let direction = by_type
                .keys()
                .fold(Direction::NONE, |acc, route_type| {
                    acc | route_type.direction()
                });
            (name.as_str(), direction)
        })
    }

    /// Returns the aggregate direction of the named message type, or `None`
    /// if the set contains no routes for it.
    #[must_use]
    pub fn direction_of(&self, message_type_name: &str) -> Option<Direction> {
        self.by_message.get(message_type_name).map(|by_type| {
            by_type
                .keys()
                .fold(Direction::NONE, |acc, route_type| {
                    acc | route_type.direction()
                })
        })
    }

    fn filter(&self, mut keep: impl FnMut(RouteType, &Route) -> bool) -> Self {
        let mut filtered = Self::new();
        for (_, route_type, owner, route) in self.iter() {
            if keep(route_type, route) {
                filtered.add(owner, route);
            }
        }
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;

    fn sample_set() -> RouteSet {
        let mut set = RouteSet::new();
        set.add(
            "aggregate:Account",
            &Route::new(
                RouteType::HandlesCommand,
                MessageType::command("banking.OpenAccount"),
            ),
        );
        set.add(
            "aggregate:Account",
            &Route::new(
                RouteType::RecordsEvent,
                MessageType::event("banking.AccountOpened"),
            ),
        );
        set.add(
            "process:Onboarding",
            &Route::new(
                RouteType::HandlesEvent,
                MessageType::event("banking.AccountOpened"),
            ),
        );
        set
    }

    #[test]
    fn test_len_counts_routes_not_messages() {
        assert_eq!(sample_set().len(), 3);
    }

    #[test]
    fn test_incomplete_routes_are_not_indexed() {
        let mut set = RouteSet::new();
        set.add("aggregate:Account", &Route::default());
        assert!(set.is_empty());
    }

    #[test]
    fn test_filter_by_route_type() {
        let filtered = sample_set().filter_by_route_type(RouteType::HandlesEvent);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains(RouteType::HandlesEvent, "banking.AccountOpened"));
    }

    #[test]
    fn test_filter_by_message_kind() {
        let filtered = sample_set().filter_by_message_kind(MessageKind::Event);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_by_direction() {
        let inbound = sample_set().filter_by_direction(Direction::INBOUND);
        assert!(inbound.contains(RouteType::HandlesCommand, "banking.OpenAccount"));
        assert!(!inbound.contains(RouteType::RecordsEvent, "banking.AccountOpened"));
    }

    #[test]
    fn test_message_type_direction_is_a_union() {
        // AccountOpened is both recorded (outbound) and handled (inbound).
        let direction = sample_set()
            .direction_of("banking.AccountOpened")
            .expect("message is indexed");
        assert_eq!(direction, Direction::BOTH);

        let direction = sample_set()
            .direction_of("banking.OpenAccount")
            .expect("message is indexed");
        assert_eq!(direction, Direction::INBOUND);
    }

    #[test]
    fn test_handlers_for_preserves_declaration_order() {
        let mut set = sample_set();
        set.add(
            "projection:Balances",
            &Route::new(
                RouteType::HandlesEvent,
                MessageType::event("banking.AccountOpened"),
            ),
        );
        let handlers: Vec<_> = set
            .handlers_for(RouteType::HandlesEvent, "banking.AccountOpened")
            .collect();
        assert_eq!(handlers, vec!["process:Onboarding", "projection:Balances"]);
    }

    #[test]
    fn test_merge_unions_sets() {
        let mut left = RouteSet::new();
        left.add(
            "aggregate:Account",
            &Route::new(
                RouteType::HandlesCommand,
                MessageType::command("banking.OpenAccount"),
            ),
        );
        let mut right = RouteSet::new();
        right.add(
            "integration:Notifier",
            &Route::new(
                RouteType::HandlesCommand,
                MessageType::command("banking.SendWelcomeEmail"),
            ),
        );
        left.merge(&right);
        assert_eq!(left.len(), 2);
    }
}
