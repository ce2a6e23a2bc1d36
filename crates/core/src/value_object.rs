//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two material
/// type keys spelled the same are the same key, while two material records
/// are only the same record when their ids match.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
