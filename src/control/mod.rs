// src/control/mod.rs

//! Interactive control channel.
//!
//! - [`dispatcher`] turns one line of operator input into effects against the
//!   registry, the launcher channel, and per-server input sinks, always
//!   producing a response string.
//! - [`input_loop`] reads operator lines from stdin for the lifetime of the
//!   supervisor and prints the dispatcher's responses.

pub mod dispatcher;
pub mod input_loop;

pub use dispatcher::CommandDispatcher;
pub use input_loop::run_input_loop;
