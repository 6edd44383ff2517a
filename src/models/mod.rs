// Models module for the kubevision backend
// Request/response payloads and the resource views exposed over HTTP

pub mod action;
pub mod cluster;
pub mod resource;
pub mod response;

pub use action::*;
pub use cluster::*;
pub use resource::*;
pub use response::*;
