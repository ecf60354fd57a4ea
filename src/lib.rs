pub mod config;
pub mod hosting;
pub mod parser;
pub mod service;
pub mod version;
