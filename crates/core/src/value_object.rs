//! Value object trait: equality by value, not identity.
//!
//! Inventory rows have no identity of their own (two rows with the same code
//! and counts are indistinguishable, and duplicates are allowed), so every
//! record in this workspace is modelled as a value object.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new value.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Count(u64);
///
/// impl ValueObject for Count {}
///
/// assert_eq!(Count(3), Count(3));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
