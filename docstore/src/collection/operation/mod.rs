mod modifier;
mod validator;
mod write_result;

pub use modifier::*;
pub(crate) use validator::*;
pub use write_result::*;
