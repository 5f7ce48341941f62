//! Contentful content-store clients.
//!
//! This crate provides:
//! - [`ManagementClient`]: asset listing, entry lookup, create and publish
//!   (Content Management API)
//! - [`DeliveryClient`]: read-only listing of published entries with linked
//!   assets resolved (Content Delivery API)

mod delivery;
mod management;
mod wire;

pub use delivery::{DeliveredEntry, DeliveryClient};
pub use management::ManagementClient;
