//! Message kinds, directions, and resolved message-type descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// The kind of a message, as understood by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A request to make a change to the application's state.
    Command,
    /// A statement of fact about a change that has already occurred.
    Event,
    /// A message that becomes relevant at a specific point in time.
    Timeout,
}

impl MessageKind {
    /// All message kinds, in declaration order.
    pub const ALL: [Self; 3] = [Self::Command, Self::Event, Self::Timeout];

    /// Returns the lowercase human-readable name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Event => "event",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const INBOUND: u8 = 1 << 0;
const OUTBOUND: u8 = 1 << 1;

/// The direction in which messages of some type flow, relative to a handler.
///
/// Directions form a small flag-set so that a message type that is both
/// consumed and produced (or a route type like `schedules-timeout`, which is
/// inherently bidirectional) can be represented as the union of both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Direction(u8);

impl Direction {
    /// No direction; the empty flag-set.
    pub const NONE: Self = Self(0);
    /// Messages flow toward the handler.
    pub const INBOUND: Self = Self(INBOUND);
    /// Messages flow away from the handler.
    pub const OUTBOUND: Self = Self(OUTBOUND);
    /// Messages flow in both directions.
    pub const BOTH: Self = Self(INBOUND | OUTBOUND);

    /// Returns `true` if the inbound flag is set.
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        self.0 & INBOUND != 0
    }

    /// Returns `true` if the outbound flag is set.
    #[must_use]
    pub const fn is_outbound(self) -> bool {
        self.0 & OUTBOUND != 0
    }

    /// Returns the union of the flags in `self` and `other`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if any flag set in `other` is also set in `self`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Direction {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.merge(rhs)
    }
}

impl BitOrAssign for Direction {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.merge(rhs);
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_inbound(), self.is_outbound()) {
            (true, true) => f.write_str("inbound+outbound"),
            (true, false) => f.write_str("inbound"),
            (false, true) => f.write_str("outbound"),
            (false, false) => f.write_str("none"),
        }
    }
}

/// A resolved message-type descriptor.
///
/// A [`Route`](crate::Route) may declare a message purely by name (all that a
/// static-analysis frontend can recover) or carry a `MessageType` when the
/// concrete type was resolvable. The descriptor's `name` is canonical: when
/// both a declared name and a descriptor are present, normalization replaces
/// the declared name with the canonical one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageType {
    /// The canonical, fully-qualified name of the message type.
    pub name: String,
    /// The kind of message this type represents.
    pub kind: MessageKind,
}

impl MessageType {
    /// Creates a descriptor with the given kind and canonical name.
    pub fn new(kind: MessageKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Creates a command-type descriptor.
    pub fn command(name: impl Into<String>) -> Self {
        Self::new(MessageKind::Command, name)
    }

    /// Creates an event-type descriptor.
    pub fn event(name: impl Into<String>) -> Self {
        Self::new(MessageKind::Event, name)
    }

    /// Creates a timeout-type descriptor.
    pub fn timeout(name: impl Into<String>) -> Self {
        Self::new(MessageKind::Timeout, name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}
