//! Weather Service: fetch-and-store (write path) and retrieve-stored (read path).

pub mod handlers;
pub mod service;
