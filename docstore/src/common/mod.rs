//! Types and helpers shared by the client and the in-memory server.

mod constants;
mod lock;
mod sort_order;
mod stream;
mod util;
mod value;

pub use constants::*;
pub use lock::*;
pub use sort_order::*;
pub use stream::*;
pub use util::*;
pub use value::*;
