//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Staff registration, password login and JWT issuing/decoding live here;
//! the HTTP cookie handling stays in the server crate.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{decode_token, AuthConfig, AuthService};
