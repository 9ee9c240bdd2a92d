//! Client for the cloud directory backend.
//!
//! All directory data (employees, devices, attendance events) lives behind
//! one Edge Function RPC endpoint authenticated by a static API key. This
//! crate only knows the shape of the data it returns; everything else about
//! the backend is out of scope.

pub mod client;
pub mod error;

pub use client::BackendClient;
pub use error::{BackendError, BackendResult};
