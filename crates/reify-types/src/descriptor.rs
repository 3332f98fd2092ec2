//! The erasure-surviving type descriptor model.
//!
//! A descriptor is an immutable value: it owns its child descriptors
//! exclusively, `clone()` is the deep structural copy, and the only mutation
//! pattern is clone-then-mutate (annotation stripping). Self-referential
//! generic bounds are broken at conversion time by the
//! [`UnresolvedVariableType`] variant, so a descriptor is always a finite
//! tree.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{assignable, Annotation, ClassId, GenericDeclaration, TypeEnv};

/// Tagged union over the five descriptor shapes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDescriptor {
    Declared(DeclaredType),
    Parameterized(ParameterizedType),
    Wildcard(WildcardType),
    ResolvedVariable(ResolvedVariableType),
    UnresolvedVariable(UnresolvedVariableType),
}

/// A plain, never-parameterized class reference.
#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
pub struct DeclaredType {
    pub annotations: Vec<Annotation>,
    pub class: ClassId,
}

// Declared descriptors compare (and hash) by raw class only, so they remain
// interchangeable with bare class values during hierarchy walks.
impl PartialEq for DeclaredType {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
    }
}

impl Hash for DeclaredType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class.hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterizedType {
    pub annotations: Vec<Annotation>,
    pub raw: ClassId,
    pub owner: Option<Box<TypeDescriptor>>,
    pub args: Vec<TypeDescriptor>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildcardKind {
    Extends,
    Super,
    Raw,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WildcardType {
    pub annotations: Vec<Annotation>,
    pub upper_bounds: Vec<TypeDescriptor>,
    pub lower_bounds: Vec<TypeDescriptor>,
    pub kind: WildcardKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedVariableType {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub bounds: Vec<TypeDescriptor>,
    pub declared_by: GenericDeclaration,
    /// Position of the variable among its declaring entity's own type
    /// parameters; `None` when it is not found there.
    pub index: Option<usize>,
}

/// Cycle-breaking placeholder produced when a variable is referenced while its
/// own bound list is still being converted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnresolvedVariableType {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub declared_by: GenericDeclaration,
    pub index: Option<usize>,
}

/// Uniform view of the two type-variable shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeVariableRef<'a> {
    pub name: &'a str,
    pub declared_by: GenericDeclaration,
    pub index: Option<usize>,
}

impl WildcardKind {
    /// The kind is derived from the bound lists: EXTENDS iff there is an upper
    /// bound other than the universal top type, else SUPER iff there is a
    /// lower bound, else RAW.
    pub fn derive(
        env: &dyn TypeEnv,
        upper_bounds: &[TypeDescriptor],
        lower_bounds: &[TypeDescriptor],
    ) -> WildcardKind {
        match upper_bounds.first() {
            Some(first) if *first != env.well_known().object => WildcardKind::Extends,
            _ if !lower_bounds.is_empty() => WildcardKind::Super,
            _ => WildcardKind::Raw,
        }
    }
}

impl TypeDescriptor {
    pub fn declared(class: ClassId) -> TypeDescriptor {
        TypeDescriptor::Declared(DeclaredType {
            annotations: vec![],
            class,
        })
    }

    pub fn annotations(&self) -> &[Annotation] {
        match self {
            TypeDescriptor::Declared(d) => &d.annotations,
            TypeDescriptor::Parameterized(p) => &p.annotations,
            TypeDescriptor::Wildcard(w) => &w.annotations,
            TypeDescriptor::ResolvedVariable(v) => &v.annotations,
            TypeDescriptor::UnresolvedVariable(v) => &v.annotations,
        }
    }

    pub fn is_declared(&self) -> bool {
        matches!(self, TypeDescriptor::Declared(_))
    }

    pub fn is_parameterized(&self) -> bool {
        matches!(self, TypeDescriptor::Parameterized(_))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeDescriptor::Wildcard(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::ResolvedVariable(_) | TypeDescriptor::UnresolvedVariable(_)
        )
    }

    /// Whether this descriptor has generic children (type arguments or bounds).
    /// Unresolved variables carry no bounds and are not generic.
    pub fn is_generic(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Parameterized(_)
                | TypeDescriptor::Wildcard(_)
                | TypeDescriptor::ResolvedVariable(_)
        )
    }

    /// Unified child list: type arguments for a parameterization, the active
    /// bound list for a wildcard, bounds for a resolved variable.
    pub fn generics(&self) -> &[TypeDescriptor] {
        match self {
            TypeDescriptor::Parameterized(p) => &p.args,
            TypeDescriptor::Wildcard(w) => w.active_bounds(),
            TypeDescriptor::ResolvedVariable(v) => &v.bounds,
            TypeDescriptor::Declared(_) | TypeDescriptor::UnresolvedVariable(_) => &[],
        }
    }

    pub fn as_variable(&self) -> Option<TypeVariableRef<'_>> {
        match self {
            TypeDescriptor::ResolvedVariable(v) => Some(TypeVariableRef {
                name: &v.name,
                declared_by: v.declared_by,
                index: v.index,
            }),
            TypeDescriptor::UnresolvedVariable(v) => Some(TypeVariableRef {
                name: &v.name,
                declared_by: v.declared_by,
                index: v.index,
            }),
            _ => None,
        }
    }

    /// The erased class of this descriptor: the raw class for declared and
    /// parameterized shapes, the first bound (or `Object`) for wildcards and
    /// resolved variables. Unresolved variables have no erasure.
    pub fn declared_type(&self, env: &dyn TypeEnv) -> Option<ClassId> {
        match self {
            TypeDescriptor::Declared(d) => Some(d.class),
            TypeDescriptor::Parameterized(p) => Some(p.raw),
            TypeDescriptor::Wildcard(w) => w
                .active_bounds()
                .first()
                .and_then(|b| b.declared_type(env))
                .or(Some(env.well_known().object)),
            TypeDescriptor::ResolvedVariable(v) => v
                .bounds
                .first()
                .and_then(|b| b.declared_type(env))
                .or(Some(env.well_known().object)),
            TypeDescriptor::UnresolvedVariable(_) => None,
        }
    }

    /// True when `class` lies within the bounds this descriptor imposes
    /// (i.e. `class` could instantiate it).
    pub fn is_within_bounds(&self, env: &dyn TypeEnv, class: ClassId) -> bool {
        match self {
            TypeDescriptor::Declared(d) => assignable(env, class, d.class),
            TypeDescriptor::Parameterized(p) => assignable(env, class, p.raw),
            TypeDescriptor::Wildcard(w) => w.is_within_bounds(env, class),
            TypeDescriptor::ResolvedVariable(v) => v
                .bounds
                .iter()
                .any(|b| b.is_within_bounds(env, class)),
            TypeDescriptor::UnresolvedVariable(_) => false,
        }
    }

    /// True when `class` is a supertype of this descriptor's erased type.
    pub fn is_superclass_of(&self, env: &dyn TypeEnv, class: ClassId) -> bool {
        match self {
            TypeDescriptor::Declared(d) => assignable(env, d.class, class),
            TypeDescriptor::Parameterized(p) => assignable(env, p.raw, class),
            TypeDescriptor::Wildcard(w) => w
                .active_bounds()
                .iter()
                .any(|b| b.is_superclass_of(env, class)),
            TypeDescriptor::ResolvedVariable(v) => v
                .bounds
                .iter()
                .any(|b| b.is_superclass_of(env, class)),
            TypeDescriptor::UnresolvedVariable(_) => false,
        }
    }

    /// Re-type this descriptor to a concrete class.
    ///
    /// Declared descriptors produce a fresh, unannotated declared descriptor;
    /// parameterizations keep their arguments under the new raw class;
    /// wildcards and variables collapse to a declared descriptor that keeps
    /// the declaration-site annotations.
    pub fn with_class(&self, class: ClassId) -> TypeDescriptor {
        match self {
            TypeDescriptor::Declared(_) => TypeDescriptor::declared(class),
            TypeDescriptor::Parameterized(p) => TypeDescriptor::Parameterized(ParameterizedType {
                annotations: p.annotations.clone(),
                raw: class,
                owner: p.owner.clone(),
                args: p.args.clone(),
            }),
            TypeDescriptor::Wildcard(w) => TypeDescriptor::Declared(DeclaredType {
                annotations: w.annotations.clone(),
                class,
            }),
            TypeDescriptor::ResolvedVariable(v) => TypeDescriptor::Declared(DeclaredType {
                annotations: v.annotations.clone(),
                class,
            }),
            TypeDescriptor::UnresolvedVariable(v) => TypeDescriptor::Declared(DeclaredType {
                annotations: v.annotations.clone(),
                class,
            }),
        }
    }

    /// Deep copy with every annotation list cleared. Idempotent.
    pub fn strip_annotations(&self) -> TypeDescriptor {
        let mut copy = self.clone();
        copy.clear_annotations();
        copy
    }

    fn clear_annotations(&mut self) {
        match self {
            TypeDescriptor::Declared(d) => d.annotations.clear(),
            TypeDescriptor::Parameterized(p) => {
                p.annotations.clear();
                if let Some(owner) = p.owner.as_mut() {
                    owner.clear_annotations();
                }
                for arg in &mut p.args {
                    arg.clear_annotations();
                }
            }
            TypeDescriptor::Wildcard(w) => {
                w.annotations.clear();
                for bound in w.upper_bounds.iter_mut().chain(w.lower_bounds.iter_mut()) {
                    bound.clear_annotations();
                }
            }
            TypeDescriptor::ResolvedVariable(v) => {
                v.annotations.clear();
                for bound in &mut v.bounds {
                    bound.clear_annotations();
                }
            }
            TypeDescriptor::UnresolvedVariable(v) => v.annotations.clear(),
        }
    }
}

// A declared descriptor is interchangeable with its bare raw class.
impl PartialEq<ClassId> for TypeDescriptor {
    fn eq(&self, other: &ClassId) -> bool {
        matches!(self, TypeDescriptor::Declared(d) if d.class == *other)
    }
}

impl WildcardType {
    /// The bound list the kind makes active: upper bounds for EXTENDS, lower
    /// bounds otherwise (empty for RAW).
    pub fn active_bounds(&self) -> &[TypeDescriptor] {
        match self.kind {
            WildcardKind::Extends => &self.upper_bounds,
            WildcardKind::Super | WildcardKind::Raw => &self.lower_bounds,
        }
    }

    pub fn is_within_bounds(&self, env: &dyn TypeEnv, class: ClassId) -> bool {
        self.active_bounds()
            .iter()
            .any(|b| b.is_within_bounds(env, class))
    }
}

impl DeclaredType {
    /// Boxed counterpart of this declared type (identity when not primitive).
    pub fn wrap(&self, env: &dyn TypeEnv) -> DeclaredType {
        DeclaredType {
            annotations: vec![],
            class: crate::wrap(env, self.class),
        }
    }

    /// Primitive counterpart of this declared type (identity when not boxed).
    pub fn unwrap(&self, env: &dyn TypeEnv) -> DeclaredType {
        DeclaredType {
            annotations: vec![],
            class: crate::unwrap(env, self.class),
        }
    }
}

impl ParameterizedType {
    /// Rebuild with a substituted argument list, keeping raw type, owner and
    /// annotations.
    pub fn with_args(&self, args: Vec<TypeDescriptor>) -> ParameterizedType {
        ParameterizedType {
            annotations: self.annotations.clone(),
            raw: self.raw,
            owner: self.owner.clone(),
            args,
        }
    }
}

impl ResolvedVariableType {
    pub fn is_within_bounds(&self, env: &dyn TypeEnv, class: ClassId) -> bool {
        self.bounds.iter().any(|b| b.is_within_bounds(env, class))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::TypeStore;

    #[test]
    fn declared_equality_ignores_annotations_and_matches_bare_class() {
        let store = TypeStore::with_minimal_jdk();
        let string = store.well_known().string;

        let plain = TypeDescriptor::declared(string);
        let annotated = TypeDescriptor::Declared(DeclaredType {
            annotations: vec![Annotation::new("NotNull")],
            class: string,
        });

        assert_eq!(plain, annotated);
        assert!(plain == string);
        assert!(plain != store.well_known().object);
    }

    #[test]
    fn clone_is_structural_copy() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();

        let descriptor = TypeDescriptor::Parameterized(ParameterizedType {
            annotations: vec![Annotation::new("Valid")],
            raw: wk.object,
            owner: None,
            args: vec![TypeDescriptor::declared(wk.string)],
        });

        assert_eq!(descriptor.clone(), descriptor);
    }

    #[test]
    fn strip_annotations_is_idempotent_and_deep() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();

        let descriptor = TypeDescriptor::Parameterized(ParameterizedType {
            annotations: vec![Annotation::new("Outer")],
            raw: wk.object,
            owner: None,
            args: vec![TypeDescriptor::Declared(DeclaredType {
                annotations: vec![Annotation::new("Inner")],
                class: wk.string,
            })],
        });

        let stripped = descriptor.strip_annotations();
        assert!(stripped.annotations().is_empty());
        assert!(stripped.generics()[0].annotations().is_empty());
        assert_eq!(stripped.strip_annotations(), stripped);
        // The original is untouched.
        assert_eq!(descriptor.annotations().len(), 1);
    }

    #[test]
    fn wildcard_kind_derivation() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();

        let none: Vec<TypeDescriptor> = vec![];
        assert_eq!(WildcardKind::derive(&store, &none, &none), WildcardKind::Raw);

        let object_upper = vec![TypeDescriptor::declared(wk.object)];
        assert_eq!(
            WildcardKind::derive(&store, &object_upper, &none),
            WildcardKind::Raw
        );

        let string_upper = vec![TypeDescriptor::declared(wk.string)];
        assert_eq!(
            WildcardKind::derive(&store, &string_upper, &none),
            WildcardKind::Extends
        );

        let string_lower = vec![TypeDescriptor::declared(wk.string)];
        assert_eq!(
            WildcardKind::derive(&store, &object_upper, &string_lower),
            WildcardKind::Super
        );
    }

    #[test]
    fn descriptors_survive_serialization() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let list = store.class_id("java.util.List").unwrap();

        let descriptor = TypeDescriptor::Parameterized(ParameterizedType {
            annotations: vec![Annotation::new("Valid")],
            raw: list,
            owner: None,
            args: vec![TypeDescriptor::Wildcard(WildcardType {
                annotations: vec![],
                upper_bounds: vec![TypeDescriptor::declared(wk.string)],
                lower_bounds: vec![],
                kind: WildcardKind::Extends,
            })],
        });

        let json = serde_json::to_string(&descriptor).unwrap();
        let back: TypeDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, descriptor);
        // Equality on declared nodes is class-only; check the annotation too.
        assert_eq!(back.annotations(), descriptor.annotations());
    }

    #[test]
    fn with_class_collapses_wildcards_but_keeps_their_annotations() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();

        let wildcard = TypeDescriptor::Wildcard(WildcardType {
            annotations: vec![Annotation::new("Nullable")],
            upper_bounds: vec![TypeDescriptor::declared(wk.object)],
            lower_bounds: vec![],
            kind: WildcardKind::Raw,
        });

        let TypeDescriptor::Declared(declared) = wildcard.with_class(wk.string) else {
            panic!("expected a declared descriptor");
        };
        assert_eq!(declared.class, wk.string);
        assert_eq!(declared.annotations, vec![Annotation::new("Nullable")]);
    }
}
