pub mod outcomes;
pub mod requests;

pub use outcomes::*;
pub use requests::*;
