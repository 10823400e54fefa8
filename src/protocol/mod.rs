mod dispatcher;
mod message;
mod output;

pub use dispatcher::Dispatcher;
pub use message::{Atom, Message};
pub use output::Output;
