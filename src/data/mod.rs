//! Table abstraction
//!
//! Provides the in-memory tables the search consumes:
//! - [`DataTable`] - raw rows x attributes matrix of numeric or categorical values
//! - [`DiscreteTable`] - dense integer codes with per-attribute arity
//! - [`Target`] - selection of the target attribute

mod table;

pub use table::{Attribute, AttributeKind, DataTable, DiscreteAttribute, DiscreteTable, Target};
