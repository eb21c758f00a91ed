//! # Solon Config
//!
//! Configuration modeling and validation for Solon message-handling
//! applications.
//!
//! This crate represents an application's configuration as plain data: what
//! the application and its handlers are named, which kinds of handlers
//! exist, and which message types each handler consumes and produces. The
//! model is deliberately tolerant of partial knowledge, so it can be
//! populated from a live application or from static-analysis output alike:
//!
//! - [`Application`] - The root entity: one identity plus an ordered list
//!   of handlers
//! - [`Aggregate`], [`Process`], [`Integration`], [`Projection`] - The four
//!   handler kinds, each with a fixed routing-capability table
//! - [`Route`] and [`RouteSet`] - Message-route declarations and the
//!   queryable index built from them
//! - [`Fidelity`] - Per-component trustworthiness flags (incomplete,
//!   speculative)
//! - [`normalize`](normalize()), [`validate`], [`must_normalize`] - The
//!   clone-and-validate engine producing tree-shaped [`ConfigError`]
//!   reports
//! - [`describe`](describe()) - Human-readable outline reports

#![doc(html_root_url = "https://docs.rs/solon-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregate;
mod application;
mod capability;
mod component;
mod conflict;
mod describe;
mod error;
mod fidelity;
mod handler;
mod identity;
mod integration;
mod message;
mod normalize;
mod process;
mod projection;
mod route;
mod route_set;

pub use aggregate::{Aggregate, AggregateBuilder};
pub use application::{Application, ApplicationBuilder};
pub use capability::{RouteCapabilities, RouteCapability};
pub use component::{Component, Entity, Handler, Source};
pub use describe::{describe, describe_with, Describe, Describer};
pub use error::{ComponentError, ConfigError};
pub use fidelity::Fidelity;
pub use handler::{AnyHandler, HandlerType};
pub use identity::Identity;
pub use integration::{Integration, IntegrationBuilder};
pub use message::{Direction, MessageKind, MessageType};
pub use normalize::{must_normalize, normalize, validate, Context, Halt, Mode, Options};
pub use process::{Process, ProcessBuilder};
pub use projection::{DeliveryPolicy, Projection, ProjectionBuilder};
pub use route::{Route, RouteType};
pub use route_set::RouteSet;
