pub mod error;
pub mod result;
pub mod validate;
pub mod visitor;

pub use error::*;
pub use result::*;
pub use validate::*;
pub use visitor::*;
