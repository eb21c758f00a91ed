//! Human-readable configuration reports.
//!
//! [`describe`] renders a component tree as an indented outline, one line
//! per component, each prefixed with a validity status. It is tolerant by
//! construction: incomplete and speculative components are labeled as such
//! rather than reported as errors, so a partially recovered configuration
//! still produces a useful description.

use crate::aggregate::Aggregate;
use crate::application::Application;
use crate::component::{Component, Handler};
use crate::error::ConfigError;
use crate::handler::AnyHandler;
use crate::identity::Identity;
use crate::integration::Integration;
use crate::normalize::{display_label, normalize, Options};
use crate::process::Process;
use crate::projection::Projection;
use crate::route::Route;
use indexmap::IndexMap;

/// A component that can render itself into a [`Describer`] outline.
pub trait Describe: Component {
    /// Writes this component's line, its errors, and its children.
    fn describe_to(&self, describer: &mut Describer<'_>);
}

/// The outline writer threaded through [`Describe::describe_to`].
///
/// Lines nest one bullet and indentation level per depth, matching the
/// textual form of [`ConfigError`].
#[derive(Debug)]
pub struct Describer<'a> {
    out: String,
    depth: usize,
    report: Option<&'a ConfigError>,
    sibling_labels: Vec<IndexMap<String, usize>>,
}

impl<'a> Describer<'a> {
    fn new(report: Option<&'a ConfigError>) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            report,
            sibling_labels: Vec::new(),
        }
    }

    /// Writes one line for `component` and descends into `children` one
    /// level deeper.
    ///
    /// The line reads `{status} {label}`, where the status is `invalid` if
    /// the validation report attributes any error to the component,
    /// otherwise the component's own fidelity (`speculative`, `incomplete`,
    /// or `valid`). Errors attributed to the component are written as
    /// nested lines before the children. Siblings sharing a display label
    /// are numbered the same way the validation walk numbers them, so each
    /// component picks up only its own errors from the report.
    pub fn node<C: Component>(&mut self, component: &C, children: impl FnOnce(&mut Self)) {
        let mut label = display_label(component);
        if let Some(siblings) = self.sibling_labels.last_mut() {
            let seen = {
                let count = siblings.entry(label.clone()).or_insert(0);
                *count += 1;
                *count
            };
            if seen > 1 {
                label = format!("{label} ({seen})");
            }
        }
        let status = self.status(component, &label);
        self.write_line(&format!("{status} {label}"));

        self.depth += 1;
        self.sibling_labels.push(IndexMap::new());
        if let Some(report) = self.report {
            for error in report.errors_for(&label) {
                self.write_line(&error.to_string());
            }
        }
        children(self);
        self.sibling_labels.pop();
        self.depth -= 1;
    }

    fn status<C: Component>(&self, component: &C, label: &str) -> &'static str {
        if let Some(report) = self.report {
            if !report.errors_for(label).is_empty() {
                return "invalid";
            }
        }
        let fidelity = component.fidelity();
        if fidelity.is_speculative() {
            "speculative"
        } else if fidelity.is_incomplete() {
            "incomplete"
        } else {
            "valid"
        }
    }

    fn write_line(&mut self, text: &str) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 1..=self.depth {
            self.out.push_str("  ");
        }
        if self.depth > 0 {
            self.out.push_str("- ");
        }
        self.out.push_str(text);
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Renders a report of `component`, validating it first.
///
/// The component is normalized in collect mode and the resulting errors, if
/// any, are woven into the outline next to the components they are
/// attributed to.
///
/// # Example
///
/// ```
/// use solon_config::{describe, Aggregate, Application, MessageType, RouteType};
///
/// let application = Application::builder()
///     .source_type("bank::BankApp")
///     .name_key("bank", "14769f7f-87ad-4e64-a8ab-39c0d77a89b2")
///     .handler(
///         Aggregate::builder()
///             .source_type("bank::handlers::Account")
///             .name_key("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a")
///             .route(
///                 RouteType::HandlesCommand,
///                 MessageType::command("bank.OpenAccount"),
///             )
///             .route(
///                 RouteType::RecordsEvent,
///                 MessageType::event("bank.AccountOpened"),
///             )
///             .build(),
///     )
///     .build();
///
/// let report = describe(&application);
/// assert!(report.starts_with("valid application:BankApp"));
/// ```
#[must_use]
pub fn describe<C: Describe>(component: &C) -> String {
    let (normalized, report) = normalize(component, &Options::descriptive());
    describe_with(&normalized, report.as_ref())
}

/// Renders a report of `component` against an existing validation report.
///
/// Use this to avoid re-validating when a report from
/// [`normalize`](crate::normalize()) is already at hand; pass `None` to
/// describe without validity annotations beyond fidelity.
#[must_use]
pub fn describe_with<C: Describe>(component: &C, report: Option<&ConfigError>) -> String {
    let mut describer = Describer::new(report);
    component.describe_to(&mut describer);
    describer.finish()
}

impl Describe for Identity {
    fn describe_to(&self, describer: &mut Describer<'_>) {
        describer.node(self, |_| {});
    }
}

impl Describe for Route {
    fn describe_to(&self, describer: &mut Describer<'_>) {
        describer.node(self, |_| {});
    }
}

fn describe_handler<H: Handler>(handler: &H, describer: &mut Describer<'_>) {
    describer.node(handler, |describer| {
        for identity in handler.identities() {
            identity.describe_to(describer);
        }
        for route in handler.routes() {
            route.describe_to(describer);
        }
    });
}

impl Describe for Aggregate {
    fn describe_to(&self, describer: &mut Describer<'_>) {
        describe_handler(self, describer);
    }
}

impl Describe for Process {
    fn describe_to(&self, describer: &mut Describer<'_>) {
        describe_handler(self, describer);
    }
}

impl Describe for Integration {
    fn describe_to(&self, describer: &mut Describer<'_>) {
        describe_handler(self, describer);
    }
}

impl Describe for Projection {
    fn describe_to(&self, describer: &mut Describer<'_>) {
        describe_handler(self, describer);
    }
}

impl Describe for AnyHandler {
    fn describe_to(&self, describer: &mut Describer<'_>) {
        match self {
            Self::Aggregate(handler) => handler.describe_to(describer),
            Self::Process(handler) => handler.describe_to(describer),
            Self::Integration(handler) => handler.describe_to(describer),
            Self::Projection(handler) => handler.describe_to(describer),
        }
    }
}

impl Describe for Application {
    fn describe_to(&self, describer: &mut Describer<'_>) {
        describer.node(self, |describer| {
            for identity in &self.identities {
                identity.describe_to(describer);
            }
            for handler in &self.handlers {
                handler.describe_to(describer);
            }
        });
    }
}
