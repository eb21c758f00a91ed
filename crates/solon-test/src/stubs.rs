//! Stub message-type descriptors.
//!
//! Tests frequently need several message types of the same kind that are
//! guaranteed distinct. Rather than inventing names inline, these stubs
//! derive a stable name from a marker type: `CommandStub::<TypeA>` produces
//! the descriptor `CommandStub[TypeA] (command)`.

use solon_config::MessageType;
use std::marker::PhantomData;

/// A marker distinguishing one stub from another of the same kind.
pub trait Marker {
    /// The name rendered inside the stub's brackets.
    const NAME: &'static str;
}

/// The first stock marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeA;

/// The second stock marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeB;

/// The third stock marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeC;

impl Marker for TypeA {
    const NAME: &'static str = "TypeA";
}

impl Marker for TypeB {
    const NAME: &'static str = "TypeB";
}

impl Marker for TypeC {
    const NAME: &'static str = "TypeC";
}

/// A stub command, distinguished by its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStub<T>(PhantomData<T>);

/// A stub event, distinguished by its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStub<T>(PhantomData<T>);

/// A stub timeout, distinguished by its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutStub<T>(PhantomData<T>);

impl<T: Marker> CommandStub<T> {
    /// Returns the descriptor for this stub command type.
    #[must_use]
    pub fn message_type() -> MessageType {
        MessageType::command(format!("CommandStub[{}]", T::NAME))
    }
}

impl<T: Marker> EventStub<T> {
    /// Returns the descriptor for this stub event type.
    #[must_use]
    pub fn message_type() -> MessageType {
        MessageType::event(format!("EventStub[{}]", T::NAME))
    }
}

impl<T: Marker> TimeoutStub<T> {
    /// Returns the descriptor for this stub timeout type.
    #[must_use]
    pub fn message_type() -> MessageType {
        MessageType::timeout(format!("TimeoutStub[{}]", T::NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solon_config::MessageKind;

    #[test]
    fn test_stub_names_embed_the_marker() {
        assert_eq!(
            CommandStub::<TypeA>::message_type().name,
            "CommandStub[TypeA]"
        );
        assert_eq!(EventStub::<TypeB>::message_type().name, "EventStub[TypeB]");
        assert_eq!(
            TimeoutStub::<TypeC>::message_type().name,
            "TimeoutStub[TypeC]"
        );
    }

    #[test]
    fn test_stub_kinds() {
        assert_eq!(
            CommandStub::<TypeA>::message_type().kind,
            MessageKind::Command
        );
        assert_eq!(EventStub::<TypeA>::message_type().kind, MessageKind::Event);
        assert_eq!(
            TimeoutStub::<TypeA>::message_type().kind,
            MessageKind::Timeout
        );
    }

    #[test]
    fn test_stubs_with_different_markers_are_distinct() {
        assert_ne!(
            CommandStub::<TypeA>::message_type(),
            CommandStub::<TypeB>::message_type()
        );
    }
}
