//! Application-wide conflict detection.
//!
//! Per-handler normalization never sees more than one entity at a time, so
//! collisions between entities are detected here, after every handler under
//! an application has been normalized. Three kinds of identity collision are
//! reported, most specific first, plus collisions between exclusive routes.

use crate::application::Application;
use crate::component::{Component, Entity, Handler};
use crate::error::ConfigError;
use crate::handler::handler_labels;
use crate::identity::Identity;
use crate::normalize::{Context, Halt};
use crate::route::RouteType;
use indexmap::IndexMap;

/// One entity participating in conflict detection: its diagnostic label and
/// its first as-configured identity.
struct Participant {
    label: String,
    identity: Identity,
}

/// Reports every cross-entity collision under `application`.
///
/// Runs after the application's handlers have been normalized, so identity
/// keys are canonical and route message-type names are authoritative.
pub(crate) fn detect_conflicts(
    application: &Application,
    ctx: &mut Context,
) -> Result<(), Halt> {
    let participants = collect_participants(application);
    detect_identity_conflicts(&participants, ctx)?;
    detect_key_conflicts(&participants, ctx)?;
    detect_name_conflicts(application, &participants, ctx)?;
    detect_route_conflicts(application, ctx)?;
    Ok(())
}

fn collect_participants(application: &Application) -> Vec<Participant> {
    let mut participants = Vec::with_capacity(application.handlers.len() + 1);
    if let Some(identity) = application.identities.first() {
        participants.push(Participant {
            label: application.label(),
            identity: identity.clone(),
        });
    }
    let labels = handler_labels(&application.handlers);
    for (label, handler) in labels.into_iter().zip(&application.handlers) {
        if let Some(identity) = handler.identities().first() {
            participants.push(Participant {
                label,
                identity: identity.clone(),
            });
        }
    }
    participants
}

/// Entities sharing a full identity, name and key both.
fn detect_identity_conflicts(
    participants: &[Participant],
    ctx: &mut Context,
) -> Result<(), Halt> {
    let mut groups: IndexMap<(&str, &str), Vec<&Participant>> = IndexMap::new();
    for participant in participants {
        if let (Some(name), Some(key)) =
            (&participant.identity.name, &participant.identity.key)
        {
            groups
                .entry((name.as_str(), key.as_str()))
                .or_default()
                .push(participant);
        }
    }

    for group in groups.into_values() {
        if group.len() > 1 {
            let entities = group.iter().map(|p| p.label.clone()).collect();
            let identity = group[0].identity.clone();
            ctx.fail(ConfigError::identity_conflict(entities, identity))?;
        }
    }
    Ok(())
}

/// Entities sharing a key under different names. Groups whose members all
/// share one name are full-identity conflicts and are reported as such.
fn detect_key_conflicts(participants: &[Participant], ctx: &mut Context) -> Result<(), Halt> {
    let mut groups: IndexMap<&str, Vec<&Participant>> = IndexMap::new();
    for participant in participants {
        if let Some(key) = &participant.identity.key {
            groups.entry(key.as_str()).or_default().push(participant);
        }
    }

    for (key, group) in groups {
        if group.len() < 2 || !spans_distinct(&group, |p| p.identity.name.as_deref()) {
            continue;
        }
        let entities = group.iter().map(|p| p.label.clone()).collect();
        ctx.fail(ConfigError::identity_key_conflict(entities, key))?;
    }
    Ok(())
}

/// Handlers sharing a name under different keys. The application itself is
/// exempt: a handler may legitimately carry the application's name as long
/// as its key differs.
fn detect_name_conflicts(
    application: &Application,
    participants: &[Participant],
    ctx: &mut Context,
) -> Result<(), Halt> {
    let application_label = application.label();
    let mut groups: IndexMap<&str, Vec<&Participant>> = IndexMap::new();
    for participant in participants {
        if participant.label == application_label {
            continue;
        }
        if let Some(name) = &participant.identity.name {
            groups.entry(name.as_str()).or_default().push(participant);
        }
    }

    for (name, group) in groups {
        if group.len() < 2 || !spans_distinct(&group, |p| p.identity.key.as_deref()) {
            continue;
        }
        let entities = group.iter().map(|p| p.label.clone()).collect();
        ctx.fail(ConfigError::identity_name_conflict(entities, name))?;
    }
    Ok(())
}

/// Returns `true` if the group carries at least two distinct values of the
/// extracted field. Absent values count as distinct from every other value.
fn spans_distinct<'a>(
    group: &[&'a Participant],
    field: impl Fn(&'a Participant) -> Option<&'a str>,
) -> bool {
    let first = field(group[0]);
    group[1..].iter().any(|p| field(p) != first || first.is_none())
}

/// Handlers declaring an exclusive route for the same message type. Only
/// `handles-command` and `records-event` are exclusive; any number of
/// handlers may observe the same event or schedule the same timeout type.
fn detect_route_conflicts(application: &Application, ctx: &mut Context) -> Result<(), Halt> {
    let labels = handler_labels(&application.handlers);
    let mut groups: IndexMap<(RouteType, &str), Vec<(usize, &str)>> = IndexMap::new();

    for (index, handler) in application.handlers.iter().enumerate() {
        for route in handler.routes() {
            let (Some(route_type), Some(name)) = (route.route_type, &route.message_type_name)
            else {
                continue;
            };
            if !route_type.is_exclusive() {
                continue;
            }
            let group = groups.entry((route_type, name.as_str())).or_default();
            // A handler's own duplicates are reported per-handler; routes
            // are visited handler by handler, so a repeat is adjacent.
            // Handlers sharing a label are still distinct participants.
            if group.last().map(|(last, _)| *last) != Some(index) {
                group.push((index, labels[index].as_str()));
            }
        }
    }

    for ((route_type, name), group) in groups {
        if group.len() > 1 {
            let handlers = group
                .into_iter()
                .map(|(_, label)| label.to_string())
                .collect();
            ctx.fail(ConfigError::conflicting_route(handlers, route_type, name))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::aggregate::Aggregate;
    use crate::application::Application;
    use crate::integration::Integration;
    use crate::message::MessageType;
    use crate::normalize::{validate, Options};
    use crate::projection::Projection;
    use crate::route::RouteType;

    fn app() -> crate::application::ApplicationBuilder {
        Application::builder()
            .source_type("bank::BankApp")
            .name_key("bank", "14769f7f-87ad-4e64-a8ab-39c0d77a89b2")
    }

    fn aggregate(name: &str, key: &str) -> Aggregate {
        Aggregate::builder()
            .source_type("bank::handlers::Account")
            .name_key(name, key)
            .route(
                RouteType::HandlesCommand,
                MessageType::command("bank.OpenAccount"),
            )
            .route(
                RouteType::RecordsEvent,
                MessageType::event("bank.AccountOpened"),
            )
            .build()
    }

    fn integration(name: &str, key: &str, command: &str) -> Integration {
        Integration::builder()
            .source_type("bank::integrations::EmailGateway")
            .name_key(name, key)
            .route(RouteType::HandlesCommand, MessageType::command(command))
            .build()
    }

    #[test]
    fn test_full_identity_conflict_is_one_grouped_error() {
        let application = app()
            .handler(aggregate("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a"))
            .handler(integration(
                "account",
                "19cb98d5-dd17-4daf-ae00-1b413b7b899a",
                "bank.SendWelcomeEmail",
            ))
            .build();
        let error = validate(&application, &Options::new()).expect_err("identity is shared");
        let text = error.to_string();
        assert_eq!(
            text.matches("is shared by multiple entities").count(),
            1,
            "expected one grouped error: {text}"
        );
        assert!(text.contains("aggregate:Account"), "{text}");
        assert!(text.contains("integration:EmailGateway"), "{text}");
    }

    #[test]
    fn test_key_conflict_across_different_names() {
        let application = app()
            .handler(aggregate("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a"))
            .handler(integration(
                "email-gateway",
                "19cb98d5-dd17-4daf-ae00-1b413b7b899a",
                "bank.SendWelcomeEmail",
            ))
            .build();
        let error = validate(&application, &Options::new()).expect_err("key is shared");
        assert!(
            error
                .to_string()
                .contains(r#"identity key "19cb98d5-dd17-4daf-ae00-1b413b7b899a" is shared"#),
            "{error}"
        );
    }

    #[test]
    fn test_name_conflict_across_different_keys() {
        let application = app()
            .handler(aggregate("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a"))
            .handler(integration(
                "account",
                "b64d56a0-06b4-4c66-9bbc-3bb7acf66d8f",
                "bank.SendWelcomeEmail",
            ))
            .build();
        let error = validate(&application, &Options::new()).expect_err("name is shared");
        assert!(
            error
                .to_string()
                .contains(r#"identity name "account" is shared by multiple handlers"#),
            "{error}"
        );
    }

    #[test]
    fn test_handler_may_share_the_application_name() {
        let application = Application::builder()
            .source_type("bank::BankApp")
            .name_key("bank", "14769f7f-87ad-4e64-a8ab-39c0d77a89b2")
            .handler(aggregate("bank", "19cb98d5-dd17-4daf-ae00-1b413b7b899a"))
            .build();
        assert!(validate(&application, &Options::new()).is_ok());
    }

    #[test]
    fn test_handler_may_not_share_the_application_key() {
        let application = app()
            .handler(aggregate("account", "14769f7f-87ad-4e64-a8ab-39c0d77a89b2"))
            .build();
        let error = validate(&application, &Options::new()).expect_err("key is shared");
        assert!(error.to_string().contains("identity key"), "{error}");
    }

    #[test]
    fn test_two_handlers_of_the_same_command_conflict() {
        let application = app()
            .handler(aggregate("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a"))
            .handler(integration(
                "email-gateway",
                "b64d56a0-06b4-4c66-9bbc-3bb7acf66d8f",
                "bank.OpenAccount",
            ))
            .build();
        let error = validate(&application, &Options::new()).expect_err("command is handled twice");
        assert!(
            error.to_string().contains(
                r#"multiple handlers have a "handles-command" route for bank.OpenAccount"#
            ),
            "{error}"
        );
    }

    #[test]
    fn test_same_type_registered_twice_still_conflicts() {
        // Both handlers derive the label integration:EmailGateway; the
        // collision must be detected between them regardless.
        let application = app()
            .handler(integration(
                "email-primary",
                "b64d56a0-06b4-4c66-9bbc-3bb7acf66d8f",
                "bank.SendWelcomeEmail",
            ))
            .handler(integration(
                "email-secondary",
                "8e0bcc2c-4a8b-4e91-9e43-0756c7a0ae3b",
                "bank.SendWelcomeEmail",
            ))
            .build();
        let error = validate(&application, &Options::new()).expect_err("command has two handlers");
        let text = error.to_string();
        assert!(
            text.contains(
                r#"multiple handlers have a "handles-command" route for bank.SendWelcomeEmail"#
            ),
            "{text}"
        );
        assert!(text.contains("integration:EmailGateway (2)"), "{text}");
    }

    #[test]
    fn test_many_handlers_may_observe_the_same_event() {
        let observer = |name: &str, key: &str| {
            Projection::builder()
                .source_type("bank::projections::Balances")
                .name_key(name, key)
                .route(
                    RouteType::HandlesEvent,
                    MessageType::event("bank.AccountOpened"),
                )
                .build()
        };
        let application = app()
            .handler(aggregate("account", "19cb98d5-dd17-4daf-ae00-1b413b7b899a"))
            .handler(observer("balances", "8e0bcc2c-4a8b-4e91-9e43-0756c7a0ae3b"))
            .handler(observer("audit-log", "b64d56a0-06b4-4c66-9bbc-3bb7acf66d8f"))
            .build();
        assert!(validate(&application, &Options::new()).is_ok());
    }
}
