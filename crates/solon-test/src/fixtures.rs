//! Pre-built configuration fixtures.
//!
//! A small banking application with one handler of each kind. The fixture
//! is fully valid: every identity is well-formed, every required route is
//! present, and no two handlers collide. Tests that need an invalid
//! configuration start from one of these and break it.

use solon_config::{
    Aggregate, Application, Integration, MessageType, Process, Projection, RouteType,
};

/// The application key used by [`bank_application`].
pub const BANK_APP_KEY: &str = "14769f7f-87ad-4e64-a8ab-39c0d77a89b2";

/// The key of the [`account_aggregate`] handler.
pub const ACCOUNT_KEY: &str = "19cb98d5-dd17-4daf-ae00-1b413b7b899a";

/// The key of the [`onboarding_process`] handler.
pub const ONBOARDING_KEY: &str = "3a0e8373-e1b4-4bd7-a1ab-7e2e5a4e46ec";

/// The key of the [`email_integration`] handler.
pub const EMAIL_KEY: &str = "b64d56a0-06b4-4c66-9bbc-3bb7acf66d8f";

/// The key of the [`balance_projection`] handler.
pub const BALANCES_KEY: &str = "8e0bcc2c-4a8b-4e91-9e43-0756c7a0ae3b";

/// An aggregate managing bank accounts.
///
/// Handles `bank.OpenAccount` and records `bank.AccountOpened`.
#[must_use]
pub fn account_aggregate() -> Aggregate {
    Aggregate::builder()
        .source_type("bank::handlers::Account")
        .name_key("account", ACCOUNT_KEY)
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

/// A process coordinating customer onboarding.
///
/// Driven by `bank.AccountOpened`, executes `bank.SendWelcomeEmail`, and
/// schedules `bank.OnboardingExpired` timeouts.
#[must_use]
pub fn onboarding_process() -> Process {
    Process::builder()
        .source_type("bank::processes::Onboarding")
        .name_key("onboarding", ONBOARDING_KEY)
        .route(
            RouteType::HandlesEvent,
            MessageType::event("bank.AccountOpened"),
        )
        .route(
            RouteType::ExecutesCommand,
            MessageType::command("bank.SendWelcomeEmail"),
        )
        .route(
            RouteType::SchedulesTimeout,
            MessageType::timeout("bank.OnboardingExpired"),
        )
        .build()
}

/// An integration delivering email via an external gateway.
///
/// Handles `bank.SendWelcomeEmail` and records `bank.WelcomeEmailSent`.
#[must_use]
pub fn email_integration() -> Integration {
    Integration::builder()
        .source_type("bank::integrations::EmailGateway")
        .name_key("email-gateway", EMAIL_KEY)
        .route(
            RouteType::HandlesCommand,
            MessageType::command("bank.SendWelcomeEmail"),
        )
        .route(
            RouteType::RecordsEvent,
            MessageType::event("bank.WelcomeEmailSent"),
        )
        .build()
}

/// A projection maintaining per-account balances.
///
/// Driven by `bank.AccountOpened`.
#[must_use]
pub fn balance_projection() -> Projection {
    Projection::builder()
        .source_type("bank::projections::Balances")
        .name_key("balances", BALANCES_KEY)
        .route(
            RouteType::HandlesEvent,
            MessageType::event("bank.AccountOpened"),
        )
        .build()
}

/// A fully valid banking application with one handler of each kind.
#[must_use]
pub fn bank_application() -> Application {
    Application::builder()
        .source_type("bank::BankApp")
        .name_key("bank", BANK_APP_KEY)
        .handler(account_aggregate())
        .handler(onboarding_process())
        .handler(email_integration())
        .handler(balance_projection())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solon_config::{validate, Options};

    #[test]
    fn test_bank_application_is_valid() {
        assert!(validate(&bank_application(), &Options::new()).is_ok());
    }

    #[test]
    fn test_individual_handlers_are_valid() {
        let options = Options::new();
        assert!(validate(&account_aggregate(), &options).is_ok());
        assert!(validate(&onboarding_process(), &options).is_ok());
        assert!(validate(&email_integration(), &options).is_ok());
        assert!(validate(&balance_projection(), &options).is_ok());
    }
}
