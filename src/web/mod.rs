//! Web front end for EventHub
//!
//! Serves the public event listing with registration and checkout, and the
//! admin back-office under `/admin`.

mod admin;
mod auth;
mod forms;
mod pages;
mod server;

pub use server::{start_web_server, AppState, WebServerConfig};
