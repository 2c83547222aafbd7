#![doc = "The `tasknest` library crate."]
#![doc = ""]
#![doc = "Domain models, the credential and resource stores, authentication, the"]
#![doc = "ownership-scoped task service, routing and error handling for the TaskNest"]
#![doc = "API. The server binary (`main.rs`) wires these together; the console"]
#![doc = "binary only uses `console`."]

pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::error::AppError;
