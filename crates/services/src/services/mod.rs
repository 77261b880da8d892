pub mod auth;
pub mod database_validator;
pub mod mailer;
pub mod site;
pub mod uploads;
