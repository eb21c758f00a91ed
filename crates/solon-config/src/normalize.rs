//! The normalization engine: clone-and-validate with error aggregation.
//!
//! A [`Context`] is created per top-level call and threaded through the
//! recursive descent into sub-components. Each context accumulates its own
//! errors; on the way back out they are concatenated into a tree-shaped
//! [`ComponentError`](crate::ComponentError) mirroring the component tree.
//!
//! Two public modes share this one walk: **collect** (the default,
//! [`normalize`], [`validate`]) gathers every error and returns a full
//! report, while **fail-fast** (used internally by the entity accessors
//! [`Entity::identity`](crate::Entity::identity) and friends) returns the
//! first error found, wrapped with the chain of ancestor component labels. A
//! third, **shallow** mode normalizes only the root component without
//! descending; the diagnostics renderer uses it to re-derive display labels.

use crate::component::Component;
use crate::error::ConfigError;
use indexmap::IndexMap;
use tracing::debug;

/// The recognized, closed set of normalization options.
///
/// # Example
///
/// ```
/// use solon_config::Options;
///
/// let options = Options::new().with_runtime_values();
/// assert!(options.is_runtime_values());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    runtime_values: bool,
    suppress_fidelity_errors: bool,
}

impl Options {
    /// Creates the default option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires every message type and handler implementation to be
    /// concretely resolvable, not just named, to be considered valid.
    ///
    /// Appropriate for "about to execute" checks, as opposed to "describe
    /// statically" checks.
    #[must_use]
    pub const fn with_runtime_values(mut self) -> Self {
        self.runtime_values = true;
        self
    }

    /// Returns `true` if runtime values are required.
    #[must_use]
    pub const fn is_runtime_values(&self) -> bool {
        self.runtime_values
    }

    /// Options for producing a description rather than asserting
    /// executability: residual incomplete/speculative fidelity is not
    /// reported as an error.
    pub(crate) const fn descriptive() -> Self {
        Self {
            runtime_values: false,
            suppress_fidelity_errors: true,
        }
    }
}

/// How a normalization walk reacts to failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Gather all errors and report them together at the end of the walk.
    Collect,
    /// Stop at the first error.
    FailFast,
    /// Normalize only the root component, without descending.
    Shallow,
}

/// The unwinding value of a fail-fast walk.
///
/// Carries the error, wrapped with one ancestor label per level as it
/// propagates toward the top-level call. Never produced in collect or
/// shallow mode.
#[derive(Debug)]
pub struct Halt(ConfigError);

impl Halt {
    fn wrap(self, label: String) -> Self {
        Self(ConfigError::component(label, vec![self.0]))
    }

    /// Unwraps the underlying error.
    #[must_use]
    pub fn into_error(self) -> ConfigError {
        self.0
    }
}

/// Per-call state of one normalization walk, scoped to one component.
///
/// Contexts are created by the entry points in this module and by
/// [`normalize_child`](Self::normalize_child); they are not meant to be
/// shared across threads or reused between calls.
#[derive(Debug)]
pub struct Context {
    mode: Mode,
    options: Options,
    label: String,
    errors: Vec<ConfigError>,
    children: Vec<Context>,
    child_labels: IndexMap<String, usize>,
}

impl Context {
    fn new(mode: Mode, options: Options, label: String) -> Self {
        Self {
            mode,
            options,
            label,
            errors: Vec::new(),
            children: Vec::new(),
            child_labels: IndexMap::new(),
        }
    }

    /// Returns the mode of this walk.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the options of this walk.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Records a validation failure against this context's component.
    ///
    /// In collect and shallow modes the error is accumulated and `Ok` is
    /// returned; in fail-fast mode the error is returned immediately,
    /// wrapped with this component's label.
    pub fn fail(&mut self, error: ConfigError) -> Result<(), Halt> {
        if self.mode == Mode::FailFast {
            return Err(Halt(error).wrap(self.label.clone()));
        }
        self.errors.push(error);
        Ok(())
    }

    /// Descends into `child`, normalizing it in a child context.
    ///
    /// No-op in shallow mode. After the child normalizes, residual
    /// incomplete or speculative fidelity is reported against it unless the
    /// walk's options suppress fidelity errors. Siblings sharing a display
    /// label (the same implementation type registered more than once) are
    /// numbered, so every component in the error tree stays individually
    /// addressable.
    pub fn normalize_child<C: Component>(&mut self, child: &mut C) -> Result<(), Halt> {
        if self.mode == Mode::Shallow {
            return Ok(());
        }

        let mut ctx = Self::new(self.mode, self.options, child.label());
        let result = child
            .normalize(&mut ctx)
            .and_then(|()| ctx.check_fidelity(child));
        // Normalization may have canonicalized the data the label derives
        // from; recompute it so the error tree shows canonical labels.
        ctx.label = child.label();
        let seen = {
            let count = self.child_labels.entry(ctx.label.clone()).or_insert(0);
            *count += 1;
            *count
        };
        if seen > 1 {
            ctx.label = format!("{} ({seen})", ctx.label);
        }
        self.children.push(ctx);

        result.map_err(|halt| halt.wrap(self.label.clone()))
    }

    fn check_fidelity<C: Component>(&mut self, component: &C) -> Result<(), Halt> {
        if self.options.suppress_fidelity_errors {
            return Ok(());
        }
        let fidelity = component.fidelity();
        if fidelity.is_speculative() {
            self.fail(ConfigError::SpeculativeComponent)?;
        }
        if fidelity.is_incomplete() {
            self.fail(ConfigError::IncompleteComponent)?;
        }
        Ok(())
    }

    /// Concatenates this context's errors with its children's, recursively,
    /// into a single tree-shaped error.
    fn into_error(self) -> Option<ConfigError> {
        let mut causes = self.errors;
        causes.extend(self.children.into_iter().filter_map(Self::into_error));
        if causes.is_empty() {
            None
        } else {
            Some(ConfigError::component(self.label, causes))
        }
    }
}

fn run<C: Component>(component: &C, mode: Mode, options: Options) -> (C, Option<ConfigError>) {
    let mut normalized = component.clone();
    let mut ctx = Context::new(mode, options, normalized.label());
    debug!(component = %ctx.label, ?mode, "normalizing configuration component");

    let result = normalized
        .normalize(&mut ctx)
        .and_then(|()| ctx.check_fidelity(&normalized));
    ctx.label = normalized.label();

    match result {
        Ok(()) => {
            let error = ctx.into_error();
            (normalized, error)
        }
        Err(halt) => (normalized, Some(halt.into_error())),
    }
}

/// Clones `component` and normalizes the clone with a full recursive
/// descent, collecting every error.
///
/// Always returns the (possibly partially) normalized clone; the error, if
/// any, is the complete aggregated report. The source component is never
/// mutated.
pub fn normalize<C: Component>(component: &C, options: &Options) -> (C, Option<ConfigError>) {
    run(component, Mode::Collect, *options)
}

/// Like [`normalize`], but panics with the full report if the configuration
/// is not well-formed.
#[must_use]
pub fn must_normalize<C: Component>(component: &C, options: &Options) -> C {
    match run(component, Mode::Collect, *options) {
        (normalized, None) => normalized,
        (_, Some(error)) => panic!("configuration is invalid: {error}"),
    }
}

/// Normalizes without retaining the clone, for yes/no validity checks.
pub fn validate<C: Component>(component: &C, options: &Options) -> Result<(), ConfigError> {
    match run(component, Mode::Collect, *options) {
        (_, None) => Ok(()),
        (_, Some(error)) => Err(error),
    }
}

/// Normalizes in fail-fast mode, returning the normalized clone or the
/// first error found.
pub(crate) fn fail_fast<C: Component>(
    component: &C,
    options: &Options,
) -> Result<C, ConfigError> {
    match run(component, Mode::FailFast, *options) {
        (normalized, None) => Ok(normalized),
        (_, Some(error)) => Err(error),
    }
}

/// Re-derives a component's canonical display label by normalizing only the
/// root, without descending or reporting fidelity.
pub(crate) fn display_label<C: Component>(component: &C) -> String {
    run(component, Mode::Shallow, Options::descriptive()).0.label()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fidelity::Fidelity;

    /// A minimal component with scripted behavior.
    #[derive(Debug, Clone)]
    struct Leaf {
        label: &'static str,
        fidelity: Fidelity,
        error: Option<ConfigError>,
    }

    impl Leaf {
        fn ok(label: &'static str) -> Self {
            Self {
                label,
                fidelity: Fidelity::immaculate(),
                error: None,
            }
        }
    }

    impl Component for Leaf {
        fn fidelity(&self) -> Fidelity {
            self.fidelity
        }

        fn label(&self) -> String {
            self.label.to_string()
        }

        fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt> {
            if let Some(error) = self.error.clone() {
                ctx.fail(error)?;
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone)]
    struct Parent {
        label: &'static str,
        children: Vec<Leaf>,
    }

    impl Component for Parent {
        fn fidelity(&self) -> Fidelity {
            Fidelity::immaculate()
        }

        fn label(&self) -> String {
            self.label.to_string()
        }

        fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt> {
            for child in &mut self.children {
                ctx.normalize_child(child)?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_collect_mode_gathers_all_errors() {
        let parent = Parent {
            label: "parent",
            children: vec![
                Leaf {
                    error: Some(ConfigError::MissingIdentity),
                    ..Leaf::ok("first")
                },
                Leaf {
                    error: Some(ConfigError::MissingIdentity),
                    ..Leaf::ok("second")
                },
            ],
        };
        let error = validate(&parent, &Options::new()).expect_err("both children are invalid");
        let text = error.to_string();
        assert!(text.contains("first"), "{text}");
        assert!(text.contains("second"), "{text}");
    }

    #[test]
    fn test_fail_fast_wraps_ancestor_labels() {
        let parent = Parent {
            label: "parent",
            children: vec![Leaf {
                error: Some(ConfigError::MissingIdentity),
                ..Leaf::ok("child")
            }],
        };
        let error = fail_fast(&parent, &Options::new()).expect_err("child is invalid");
        assert_eq!(error.to_string(), "parent: child: no identity is configured");
    }

    #[test]
    fn test_fail_fast_stops_at_first_error() {
        let parent = Parent {
            label: "parent",
            children: vec![
                Leaf {
                    error: Some(ConfigError::MissingIdentity),
                    ..Leaf::ok("first")
                },
                Leaf {
                    error: Some(ConfigError::invalid_identity_name("x y")),
                    ..Leaf::ok("second")
                },
            ],
        };
        let error = fail_fast(&parent, &Options::new()).expect_err("children are invalid");
        let text = error.to_string();
        assert!(text.contains("first"), "{text}");
        assert!(!text.contains("second"), "{text}");
    }

    #[test]
    fn test_repeated_sibling_labels_are_numbered() {
        let parent = Parent {
            label: "parent",
            children: vec![
                Leaf {
                    error: Some(ConfigError::MissingIdentity),
                    ..Leaf::ok("child")
                },
                Leaf {
                    error: Some(ConfigError::MissingIdentity),
                    ..Leaf::ok("child")
                },
            ],
        };
        let error = validate(&parent, &Options::new()).expect_err("both children are invalid");
        let text = error.to_string();
        assert!(text.contains("child: no identity is configured"), "{text}");
        assert!(text.contains("child (2): no identity is configured"), "{text}");
    }

    #[test]
    fn test_shallow_mode_does_not_descend() {
        let parent = Parent {
            label: "parent",
            children: vec![Leaf {
                error: Some(ConfigError::MissingIdentity),
                ..Leaf::ok("child")
            }],
        };
        let (_, error) = run(&parent, Mode::Shallow, Options::descriptive());
        assert!(error.is_none());
    }

    #[test]
    fn test_residual_fidelity_becomes_an_error() {
        let leaf = Leaf {
            fidelity: Fidelity::speculative(),
            ..Leaf::ok("leaf")
        };
        let error = validate(&leaf, &Options::new()).expect_err("leaf is speculative");
        assert!(error.to_string().contains("speculative"), "{error}");
    }

    #[test]
    fn test_descriptive_options_suppress_fidelity_errors() {
        let leaf = Leaf {
            fidelity: Fidelity::speculative() | Fidelity::incomplete(),
            ..Leaf::ok("leaf")
        };
        let (_, error) = run(&leaf, Mode::Collect, Options::descriptive());
        assert!(error.is_none());
    }

    #[test]
    #[should_panic(expected = "configuration is invalid")]
    fn test_must_normalize_panics_on_error() {
        let leaf = Leaf {
            error: Some(ConfigError::MissingIdentity),
            ..Leaf::ok("leaf")
        };
        let _ = must_normalize(&leaf, &Options::new());
    }

    #[test]
    fn test_normalize_leaves_the_source_untouched() {
        let leaf = Leaf {
            error: Some(ConfigError::MissingIdentity),
            ..Leaf::ok("leaf")
        };
        let (_, error) = normalize(&leaf, &Options::new());
        assert!(error.is_some());
        // The original still carries its scripted error; nothing was
        // consumed or cleared by the walk.
        assert!(leaf.error.is_some());
    }
}
