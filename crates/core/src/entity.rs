//! Identity for things that change over time.
//!
//! A material record keeps its [`MaterialId`](crate::MaterialId) across
//! restocks, consumption and intake replacements; only removal ends it.

/// Something with a stable identity, independent of its current field values.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
