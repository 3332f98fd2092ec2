//! Runtime generic type model for a Java-style class hierarchy.
//!
//! The host framework supplies the reflective facts (classes, their generic
//! supertypes, type parameters, members) through the [`TypeEnv`] capability;
//! this crate models those facts as [`ReflectedType`] values and as the
//! erasure-surviving [`TypeDescriptor`] representation that the converter and
//! resolver in `reify-resolve` operate on.

use serde::{Deserialize, Serialize};

mod descriptor;
mod hierarchy;
mod primitive;
mod render;
mod store;

pub use descriptor::{
    DeclaredType, ParameterizedType, ResolvedVariableType, TypeDescriptor, TypeVariableRef,
    UnresolvedVariableType, WildcardKind, WildcardType,
};
pub use hierarchy::{assignable, class_hierarchy};
pub use primitive::{unwrap, wrap};
pub use render::render;
pub use store::TypeStore;

/// Identifies a class (or interface, or primitive) known to the [`TypeEnv`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

impl ClassId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }
}

/// Identifies a declared type parameter (a type variable declaration site).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(pub u32);

impl TypeVarId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }
}

/// Identifies a method by declaring class and position in the class's method list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodId {
    pub class: ClassId,
    pub index: u32,
}

/// Identifies a field by declaring class and position in the class's field list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId {
    pub class: ClassId,
    pub index: u32,
}

/// The entity that declared a type variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericDeclaration {
    Class(ClassId),
    Method(MethodId),
}

/// A declaration-site annotation value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A type as it appears at a declaration site, before conversion into a
/// [`TypeDescriptor`].
///
/// This mirrors the shapes a reflective runtime hands out: a plain class
/// reference, a parameterization, a type variable, or a wildcard. Anything
/// else a host runtime produces must be degraded to a raw `Class` before it
/// reaches this model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReflectedType {
    Class(ClassId),
    Parameterized {
        raw: ClassId,
        owner: Option<Box<ReflectedType>>,
        args: Vec<ReflectedType>,
    },
    Variable(TypeVarId),
    Wildcard {
        upper_bounds: Vec<ReflectedType>,
        lower_bounds: Vec<ReflectedType>,
    },
}

impl ReflectedType {
    pub fn class(id: ClassId) -> Self {
        ReflectedType::Class(id)
    }

    pub fn parameterized(raw: ClassId, args: Vec<ReflectedType>) -> Self {
        ReflectedType::Parameterized {
            raw,
            owner: None,
            args,
        }
    }

    /// The erased class behind this type, when there is one.
    pub fn raw_class(&self) -> Option<ClassId> {
        match self {
            ReflectedType::Class(id) => Some(*id),
            ReflectedType::Parameterized { raw, .. } => Some(*raw),
            ReflectedType::Variable(_) | ReflectedType::Wildcard { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Primitive,
}

/// Reflective facts about one class, as supplied by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    /// Generic superclass edge. `None` for `Object`, interfaces and primitives.
    pub super_class: Option<ReflectedType>,
    /// Generic interface edges, in declaration order.
    pub interfaces: Vec<ReflectedType>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    /// Placeholder definition used while a class id is interned but not yet defined.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            type_params: vec![],
            super_class: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<ReflectedType>,
    pub return_type: ReflectedType,
    pub return_annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: ReflectedType,
    pub annotations: Vec<Annotation>,
}

/// One declared type parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    pub declared_by: GenericDeclaration,
    pub bounds: Vec<ReflectedType>,
}

/// Classes every environment knows about: the universal top type and the
/// primitive/boxed pairs consumed by [`wrap`]/[`unwrap`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub prim_int: ClassId,
    pub prim_long: ClassId,
    pub prim_short: ClassId,
    pub prim_byte: ClassId,
    pub prim_char: ClassId,
    pub prim_boolean: ClassId,
    pub prim_float: ClassId,
    pub prim_double: ClassId,
    pub boxed_int: ClassId,
    pub boxed_long: ClassId,
    pub boxed_short: ClassId,
    pub boxed_byte: ClassId,
    pub boxed_char: ClassId,
    pub boxed_boolean: ClassId,
    pub boxed_float: ClassId,
    pub boxed_double: ClassId,
}

/// Hierarchy-provider capability: given type identifiers, return the declared
/// generic supertypes, members and type-parameter lists.
///
/// The concrete implementation is host-specific; [`TypeStore`] is the
/// in-memory implementation used by the hosting framework and by tests.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;

    /// Type-parameter list of a declaring entity, in declaration order.
    fn declaration_params(&self, declaration: GenericDeclaration) -> &[TypeVarId] {
        match declaration {
            GenericDeclaration::Class(class) => self
                .class(class)
                .map(|def| def.type_params.as_slice())
                .unwrap_or(&[]),
            GenericDeclaration::Method(method) => self
                .class(method.class)
                .and_then(|def| def.methods.get(method.index as usize))
                .map(|m| m.type_params.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Display name of a class, for diagnostics.
    fn class_name(&self, id: ClassId) -> &str {
        self.class(id).map(|def| def.name.as_str()).unwrap_or("<unknown>")
    }
}
