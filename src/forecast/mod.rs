pub mod error;
pub mod merge;
pub mod response;
pub mod window;
