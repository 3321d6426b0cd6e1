//! A document store server that keeps everything in process memory.

mod collection;
mod config;
mod cursor_registry;
mod server;

pub(crate) use collection::*;
pub use config::*;
pub(crate) use cursor_registry::*;
pub use server::*;
