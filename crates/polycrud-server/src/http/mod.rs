//! HTTP boundary.

pub mod request;
pub mod response;
pub mod serve;

pub use request::{Method, Request};
pub use response::Response;
pub use serve::serve;
