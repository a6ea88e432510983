#[macro_use]
extern crate regexp_macros;

mod control;
mod packages;
mod release;
mod repository;
mod version;

pub use control::*;
pub use packages::*;
pub use release::*;
pub use repository::*;
