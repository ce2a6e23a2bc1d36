//! `ecoblock-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no HTTP, no
//! logging setup).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::MaterialId;
pub use value_object::ValueObject;
