//! The server side of the client: the [ServerProvider] contract and the
//! in-memory server used for embedding and tests.

mod namespace;
mod server_provider;

pub mod memory;

pub use memory::{InMemoryServer, InMemoryServerConfig};
pub use namespace::*;
pub use server_provider::*;
