//! Service layer providing the laundry shop's business operations on top of models.
//! - Pricing engine: derives every order total from billing flags, weight and composition.
//! - Composition table and order ledger: transactional mutations that reprice in-line.
//! - Catalog, clients and staff users: validated CRUD.
//! - Auth: argon2 password login and JWT issuing, independent of the web framework.

pub mod errors;
pub mod pagination;
pub mod pricing;
pub mod lifecycle;
pub mod composition;
pub mod order_service;
pub mod catalog_service;
pub mod client_service;
pub mod user_service;
pub mod auth;
#[cfg(test)]
pub mod test_support;
