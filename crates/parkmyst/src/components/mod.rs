//! Built-in step types.

mod flow;
mod message;
mod question;

pub use flow::{EndNode, Finisher, Reseter, StartNode};
pub use message::HtmlMessage;
pub use question::SimpleQuestion;
