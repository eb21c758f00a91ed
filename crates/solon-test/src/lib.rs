//! # Solon Test
//!
//! Test utilities for the Solon framework: stub message types and pre-built
//! configuration fixtures.
//!
//! ## Key Features
//!
//! - **Message Stubs**: Generic command, event, and timeout descriptors that
//!   are distinguishable by a marker type, so tests never invent ad-hoc
//!   message names
//! - **Configuration Fixtures**: A small, fully valid banking application
//!   with one handler of each kind, plus its individual handlers
//!
//! ## Example
//!
//! ```
//! use solon_config::{validate, Options};
//! use solon_test::fixtures;
//!
//! let application = fixtures::bank_application();
//! assert!(validate(&application, &Options::new()).is_ok());
//! ```

pub mod fixtures;
pub mod stubs;
