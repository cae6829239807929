pub mod formatter;
pub mod question;
pub mod session;
#[cfg(feature = "gui")]
pub mod shake;
pub mod trivia;
