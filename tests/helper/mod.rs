#![allow(dead_code)]

mod host;
mod registry;

pub use host::*;
pub use registry::*;
