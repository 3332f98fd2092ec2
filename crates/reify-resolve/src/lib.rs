//! Conversion and resolution on top of the `reify-types` model.
//!
//! [`Converter`] turns reflected declaration-site types into descriptors,
//! breaking self-referential bound cycles; [`resolve_against_class`] and
//! [`resolve_declared_types`] substitute type variables and wildcards using a
//! concrete class or a fully reified parent as the source of truth.

mod convert;
mod error;
mod resolve;

pub use convert::{
    capture, descriptor_of_class, descriptor_of_field, descriptor_of_method_return,
    descriptor_of_type, generic_descriptor_of_class, AnnotationSource, Converter,
};
pub use error::{TypeError, TypeResult};
pub use resolve::{collect_generic_hierarchy, resolve_against_class, resolve_declared_types};
