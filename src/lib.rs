#![forbid(unsafe_code)]

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod identity;
pub mod logging;
pub mod model;
pub mod session;
