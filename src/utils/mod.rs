// Utility functions

pub mod logger;
pub mod stream;

pub use logger::*;
pub use stream::*;
