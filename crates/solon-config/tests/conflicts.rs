//! Cross-handler conflict tests.
//!
//! Identity collisions and exclusive-route collisions are only detectable
//! at the application level; these tests exercise that detection over the
//! banking fixture and stub messages.

use solon_config::{validate, Entity, Identity, Options, Process, Projection, RouteType};
use solon_test::fixtures;
use solon_test::stubs::{EventStub, TimeoutStub, TypeA};

#[test]
fn test_three_way_name_conflict_is_one_grouped_error() {
    let mut application = fixtures::bank_application();
    for handler in &mut application.handlers {
        let key = match handler.identities().first() {
            Some(identity) => identity.key.clone(),
            None => None,
        };
        let identity = Identity {
            name: Some("shared".to_string()),
            key,
        };
        match handler {
            solon_config::AnyHandler::Aggregate(h) => h.identities = vec![identity],
            solon_config::AnyHandler::Process(h) => h.identities = vec![identity],
            solon_config::AnyHandler::Integration(h) => h.identities = vec![identity],
            solon_config::AnyHandler::Projection(h) => h.identities = vec![identity],
        }
    }

    let error = validate(&application, &Options::new()).expect_err("name is shared four ways");
    let text = error.to_string();
    assert_eq!(
        text.matches(r#"identity name "shared" is shared"#).count(),
        1,
        "expected one grouped error: {text}"
    );
    for label in [
        "aggregate:Account",
        "process:Onboarding",
        "integration:EmailGateway",
        "projection:Balances",
    ] {
        assert!(text.contains(label), "{label} missing from: {text}");
    }
}

#[test]
fn test_two_recorders_of_the_same_event_conflict() {
    let mut integration = fixtures::email_integration();
    for route in &mut integration.routes {
        if route.route_type == Some(RouteType::RecordsEvent) {
            *route = solon_config::Route::new(
                RouteType::RecordsEvent,
                solon_config::MessageType::event("bank.AccountOpened"),
            );
        }
    }

    let mut application = fixtures::bank_application();
    application.handlers[2] = integration.into();

    let error = validate(&application, &Options::new()).expect_err("event is recorded twice");
    assert!(
        error.to_string().contains(
            r#"multiple handlers have a "records-event" route for bank.AccountOpened"#
        ),
        "{error}"
    );
}

#[test]
fn test_many_handlers_may_consume_the_same_event() {
    // The fixture already has a process and a projection both handling
    // bank.AccountOpened; that is the point of events.
    assert!(validate(&fixtures::bank_application(), &Options::new()).is_ok());
}

#[test]
fn test_two_processes_may_schedule_the_same_timeout_type() {
    let process = |name: &str, key: &str| {
        Process::builder()
            .source_type(format!("stubs::{name}"))
            .name_key(name.to_lowercase(), key)
            .route(RouteType::HandlesEvent, EventStub::<TypeA>::message_type())
            .named_route(RouteType::ExecutesCommand, format!("{name}.Command"))
            .route(
                RouteType::SchedulesTimeout,
                TimeoutStub::<TypeA>::message_type(),
            )
            .build()
    };
    let application = solon_config::Application::builder()
        .source_type("stubs::App")
        .name_key("app", fixtures::BANK_APP_KEY)
        .handler(process("First", fixtures::ACCOUNT_KEY))
        .handler(process("Second", fixtures::ONBOARDING_KEY))
        .build();
    assert!(validate(&application, &Options::new()).is_ok());
}

#[test]
fn test_duplicate_keys_across_handlers_conflict() {
    let mut application = fixtures::bank_application();
    if let solon_config::AnyHandler::Projection(projection) = &mut application.handlers[3] {
        projection.identities = vec![Identity::new("balances", fixtures::ACCOUNT_KEY)];
    }
    let error = validate(&application, &Options::new()).expect_err("key is shared");
    let text = error.to_string();
    assert!(text.contains("identity key"), "{text}");
    assert!(text.contains("aggregate:Account"), "{text}");
    assert!(text.contains("projection:Balances"), "{text}");
}

#[test]
fn test_conflicts_are_attributed_to_the_application() {
    let mut application = fixtures::bank_application();
    if let solon_config::AnyHandler::Projection(projection) = &mut application.handlers[3] {
        projection.identities = vec![Identity::new("balances", fixtures::ACCOUNT_KEY)];
    }
    let error = validate(&application, &Options::new()).expect_err("key is shared");
    assert_eq!(
        error.errors_for("application:BankApp").len(),
        1,
        "the collision belongs to the application, not to either handler: {error}"
    );
}

#[test]
fn test_disabled_handlers_still_conflict() {
    // Disabling affects dispatch at runtime, not the shape of the
    // configuration; collisions are reported regardless.
    let mut first = fixtures::balance_projection();
    first.disabled = Some(true);
    let second = Projection::builder()
        .source_type("bank::projections::AuditLog")
        .name_key("balances", fixtures::BALANCES_KEY)
        .route(
            RouteType::HandlesEvent,
            solon_config::MessageType::event("bank.AccountOpened"),
        )
        .build();

    let application = solon_config::Application::builder()
        .source_type("bank::BankApp")
        .name_key("bank", fixtures::BANK_APP_KEY)
        .handler(first)
        .handler(second)
        .build();
    let error = validate(&application, &Options::new()).expect_err("identity is shared");
    assert!(
        error.to_string().contains("is shared by multiple entities"),
        "{error}"
    );
}
