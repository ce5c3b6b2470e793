pub mod mode;
pub mod status;

pub use mode::*;
pub use status::*;
