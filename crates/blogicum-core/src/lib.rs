//! # Blogicum Core
//!
//! The domain layer of Blogicum.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the post visibility policy, ports and the services built on them.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use policy::{Authored, Viewer, can_mutate, filter_visible, is_visible};
