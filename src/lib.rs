pub mod config;
pub mod mailer;
pub mod notifications;
pub mod server;
