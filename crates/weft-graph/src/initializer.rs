//! Multi-phase type construction.

use crate::ty::Type;

/// A type under construction.
///
/// Type kinds that build their types in several phases expose two handles:
/// the initial one is available as soon as the type can be identified (it may
/// still be incomplete); the final one only once construction is finished.
pub trait TypeInitializer {
    fn type_initial(&self) -> Type;
    fn type_final(&self) -> Type;
}
