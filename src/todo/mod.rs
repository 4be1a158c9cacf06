//! Todo list storage and mutation boundary

pub mod gateway;
pub mod store;

pub use gateway::TodoGateway;
pub use store::{ListStore, Todo, TodoStore, TODOS_TAG};
