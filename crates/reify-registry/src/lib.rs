//! Matcher-keyed extension registry.
//!
//! Hosts hang behavior off descriptors by registering values behind
//! [`Matcher`] predicates; [`Registry`] answers lookups in priority order.

mod matcher;
mod registry;

pub use matcher::Matcher;
pub use registry::Registry;
