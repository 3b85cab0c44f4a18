pub mod clock;
pub mod mail;
pub mod token;

pub use clock::{Clock, SystemClock};
pub use mail::{LogMailer, MailError, Mailer, SmtpMailer};
pub use token::{Claims, TokenError, TokenService};
