//! Alert email dispatch module

mod dispatcher;
mod transport;

pub use dispatcher::{AlertAck, AlertDispatcher, AlertError};
pub use transport::{AlertEmail, MailTransport, SendReceipt, SmtpMailTransport};
