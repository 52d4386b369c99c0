mod decode;
mod error;
mod fetch;
mod loader;
mod status;

pub use decode::*;
pub use error::*;
pub use fetch::*;
pub use loader::*;
pub use status::*;
