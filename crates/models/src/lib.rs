pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod client;
pub mod address;
pub mod laundry_item;
pub mod laundry_service;
pub mod laundry_item_service;

#[cfg(test)]
mod tests;
