//! Conversion from reflected types into type descriptors.

use std::collections::HashSet;

use reify_types::{
    Annotation, ClassId, DeclaredType, FieldId, GenericDeclaration, MethodId, ParameterizedType,
    ReflectedType, ResolvedVariableType, TypeDescriptor, TypeEnv, TypeVarId, UnresolvedVariableType,
    WildcardKind, WildcardType,
};

use crate::error::{TypeError, TypeResult};

/// Annotation values for one declaration site, with index-aligned children
/// for its bounds or type arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationSource {
    pub annotations: Vec<Annotation>,
    pub children: Vec<AnnotationSource>,
}

impl AnnotationSource {
    pub fn new(annotations: Vec<Annotation>) -> Self {
        Self {
            annotations,
            children: vec![],
        }
    }

    pub fn with_children(annotations: Vec<Annotation>, children: Vec<AnnotationSource>) -> Self {
        Self {
            annotations,
            children,
        }
    }
}

fn annotations_from(source: Option<&AnnotationSource>) -> Vec<Annotation> {
    source.map(|s| s.annotations.clone()).unwrap_or_default()
}

/// Converts reflected types into descriptors.
///
/// Holds the per-top-level-call recursion guard: a variable whose bound list
/// is being converted is registered here, and any recursive reference to it
/// materializes as an [`UnresolvedVariableType`] instead of descending
/// forever. The guard follows a strict push/pop discipline around each
/// variable's bound conversion, so no state leaks across sibling conversions.
#[derive(Debug, Default)]
pub struct Converter {
    in_progress: HashSet<TypeVarId>,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convert(
        &mut self,
        env: &dyn TypeEnv,
        ty: &ReflectedType,
        source: Option<&AnnotationSource>,
    ) -> TypeDescriptor {
        match ty {
            ReflectedType::Wildcard {
                upper_bounds,
                lower_bounds,
            } => {
                let children = source.map(|s| s.children.as_slice());
                let upper = self.convert_bounds(env, upper_bounds, children);
                let lower = self.convert_bounds(env, lower_bounds, children);
                let kind = WildcardKind::derive(env, &upper, &lower);
                TypeDescriptor::Wildcard(WildcardType {
                    annotations: annotations_from(source),
                    upper_bounds: upper,
                    lower_bounds: lower,
                    kind,
                })
            }
            ReflectedType::Variable(id) => self.convert_variable(env, *id, source),
            ReflectedType::Parameterized { raw, owner, args } => {
                let owner = owner
                    .as_deref()
                    .map(|o| Box::new(self.convert(env, o, source)));
                let args = self.convert_bounds(env, args, source.map(|s| s.children.as_slice()));
                TypeDescriptor::Parameterized(ParameterizedType {
                    annotations: annotations_from(source),
                    raw: *raw,
                    owner,
                    args,
                })
            }
            ReflectedType::Class(id) => TypeDescriptor::Declared(DeclaredType {
                annotations: annotations_from(source),
                class: *id,
            }),
        }
    }

    fn convert_variable(
        &mut self,
        env: &dyn TypeEnv,
        id: TypeVarId,
        source: Option<&AnnotationSource>,
    ) -> TypeDescriptor {
        let Some(def) = env.type_param(id) else {
            // A variable the provider does not know about cannot be resolved;
            // surface it as unresolved so downstream resolution fails loudly
            // instead of fabricating an answer.
            return TypeDescriptor::UnresolvedVariable(UnresolvedVariableType {
                annotations: annotations_from(source),
                name: format!("#{}", id.0),
                declared_by: GenericDeclaration::Class(env.well_known().object),
                index: None,
            });
        };
        let index = param_index(env, def.declared_by, id);

        if self.in_progress.contains(&id) {
            return TypeDescriptor::UnresolvedVariable(UnresolvedVariableType {
                annotations: annotations_from(source),
                name: def.name.clone(),
                declared_by: def.declared_by,
                index,
            });
        }

        self.in_progress.insert(id);
        let bounds =
            self.convert_bounds(env, &def.bounds, source.map(|s| s.children.as_slice()));
        self.in_progress.remove(&id);

        TypeDescriptor::ResolvedVariable(ResolvedVariableType {
            annotations: annotations_from(source),
            name: def.name.clone(),
            bounds,
            declared_by: def.declared_by,
            index,
        })
    }

    fn convert_bounds(
        &mut self,
        env: &dyn TypeEnv,
        bounds: &[ReflectedType],
        sources: Option<&[AnnotationSource]>,
    ) -> Vec<TypeDescriptor> {
        bounds
            .iter()
            .enumerate()
            .map(|(i, bound)| self.convert(env, bound, sources.and_then(|s| s.get(i))))
            .collect()
    }
}

fn param_index(env: &dyn TypeEnv, declared_by: GenericDeclaration, id: TypeVarId) -> Option<usize> {
    env.declaration_params(declared_by)
        .iter()
        .position(|param| *param == id)
}

/// Descriptor for a bare class.
pub fn descriptor_of_class(class: ClassId) -> TypeDescriptor {
    TypeDescriptor::declared(class)
}

/// Descriptor for an arbitrary reflected type, without annotations.
pub fn descriptor_of_type(env: &dyn TypeEnv, ty: &ReflectedType) -> TypeDescriptor {
    Converter::new().convert(env, ty, None)
}

/// Descriptor for a method's generic return type, carrying the return-site
/// annotations.
pub fn descriptor_of_method_return(env: &dyn TypeEnv, method: MethodId) -> Option<TypeDescriptor> {
    let def = env
        .class(method.class)?
        .methods
        .get(method.index as usize)?;
    let source = AnnotationSource::new(def.return_annotations.clone());
    Some(Converter::new().convert(env, &def.return_type, Some(&source)))
}

/// Descriptor for a field's generic type, carrying the field annotations.
pub fn descriptor_of_field(env: &dyn TypeEnv, field: FieldId) -> Option<TypeDescriptor> {
    let def = env.class(field.class)?.fields.get(field.index as usize)?;
    let source = AnnotationSource::new(def.annotations.clone());
    Some(Converter::new().convert(env, &def.ty, Some(&source)))
}

/// Descriptor for a class parameterized over its own type variables, e.g.
/// `List<E>` for `List`. Classes without type parameters yield a declared
/// descriptor.
pub fn generic_descriptor_of_class(env: &dyn TypeEnv, class: ClassId) -> TypeDescriptor {
    let params = env
        .class(class)
        .map(|def| def.type_params.clone())
        .unwrap_or_default();
    if params.is_empty() {
        return TypeDescriptor::declared(class);
    }
    let ty = ReflectedType::parameterized(
        class,
        params.into_iter().map(ReflectedType::Variable).collect(),
    );
    descriptor_of_type(env, &ty)
}

/// Capture the reified type argument a subclass passes to its generic
/// superclass: for `class StringContainer extends Container<String>`,
/// capturing from `StringContainer` yields the `String` descriptor.
pub fn capture(env: &dyn TypeEnv, class: ClassId) -> TypeResult<TypeDescriptor> {
    let failure = || TypeError::Capture {
        class: env.class_name(class).to_string(),
    };
    let def = env.class(class).ok_or_else(failure)?;
    match &def.super_class {
        Some(ReflectedType::Parameterized { args, .. }) if !args.is_empty() => {
            Ok(descriptor_of_type(env, &args[0]))
        }
        _ => Err(failure()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use reify_types::{ClassDef, ClassKind, FieldDef, TypeStore};

    #[test]
    fn declared_round_trip_for_plain_primitive_and_boxed_types() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();

        for class in [
            wk.object,
            wk.string,
            wk.prim_int,
            wk.prim_boolean,
            wk.boxed_int,
            wk.boxed_boolean,
        ] {
            let descriptor = descriptor_of_type(&store, &ReflectedType::class(class));
            assert_eq!(descriptor.declared_type(&store), Some(class));
        }
    }

    #[test]
    fn wrap_unwrap_round_trip_on_declared_descriptors() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();

        let TypeDescriptor::Declared(declared) =
            descriptor_of_type(&store, &ReflectedType::class(wk.prim_int))
        else {
            panic!("expected declared descriptor");
        };
        assert_eq!(declared.wrap(&store).class, wk.boxed_int);
        assert_eq!(declared.wrap(&store).unwrap(&store).class, wk.prim_int);
    }

    #[test]
    fn self_referential_bound_converts_to_unresolved_back_edge() {
        let mut store = TypeStore::with_minimal_jdk();
        let comparable = store.class_id("java.lang.Comparable").unwrap();

        let foo = store.intern_class_id("com.example.Foo");
        let t = store.add_type_param("T", GenericDeclaration::Class(foo), vec![]);
        store.set_type_param_bounds(
            t,
            vec![ReflectedType::parameterized(
                comparable,
                vec![ReflectedType::Variable(t)],
            )],
        );
        store.define_class(
            foo,
            ClassDef {
                type_params: vec![t],
                super_class: Some(ReflectedType::class(store.well_known().object)),
                ..ClassDef::placeholder("com.example.Foo")
            },
        );

        let TypeDescriptor::ResolvedVariable(var) =
            descriptor_of_type(&store, &ReflectedType::Variable(t))
        else {
            panic!("expected resolved variable");
        };
        assert_eq!(var.name, "T");
        assert_eq!(var.index, Some(0));

        let TypeDescriptor::Parameterized(bound) = &var.bounds[0] else {
            panic!("expected parameterized bound");
        };
        assert_eq!(bound.raw, comparable);
        let TypeDescriptor::UnresolvedVariable(back_edge) = &bound.args[0] else {
            panic!("expected the cycle to break into an unresolved variable");
        };
        assert_eq!(back_edge.name, "T");
        assert_eq!(back_edge.index, Some(0));
    }

    #[test]
    fn recursion_guard_does_not_leak_across_siblings() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = store.well_known().object;
        let foo = store.intern_class_id("com.example.Foo");
        let t = store.add_type_param(
            "T",
            GenericDeclaration::Class(foo),
            vec![ReflectedType::class(object)],
        );
        store.define_class(
            foo,
            ClassDef {
                type_params: vec![t],
                super_class: Some(ReflectedType::class(object)),
                ..ClassDef::placeholder("com.example.Foo")
            },
        );

        // Two references to the same variable in one conversion: the guard is
        // popped after each bound list, so both convert fully.
        let list = store.class_id("java.util.List").unwrap();
        let pair_like = ReflectedType::Parameterized {
            raw: list,
            owner: None,
            args: vec![ReflectedType::Variable(t), ReflectedType::Variable(t)],
        };
        let TypeDescriptor::Parameterized(p) = descriptor_of_type(&store, &pair_like) else {
            panic!("expected parameterized descriptor");
        };
        assert!(matches!(p.args[0], TypeDescriptor::ResolvedVariable(_)));
        assert!(matches!(p.args[1], TypeDescriptor::ResolvedVariable(_)));
    }

    #[test]
    fn field_annotations_are_carried_and_strippable() {
        let mut store = TypeStore::with_minimal_jdk();
        let string = store.well_known().string;
        let holder = store.add_class(ClassDef {
            super_class: Some(ReflectedType::class(store.well_known().object)),
            ..ClassDef::placeholder("com.example.Holder")
        });
        let field = store
            .add_field(
                holder,
                FieldDef {
                    name: "value".to_string(),
                    ty: ReflectedType::class(string),
                    annotations: vec![Annotation::new("NotNull")],
                },
            )
            .unwrap();

        let descriptor = descriptor_of_field(&store, field).unwrap();
        assert_eq!(descriptor.annotations(), &[Annotation::new("NotNull")]);
        assert!(descriptor.strip_annotations().annotations().is_empty());
    }

    #[test]
    fn generic_descriptor_parameterizes_over_own_variables() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();

        let TypeDescriptor::Parameterized(p) = generic_descriptor_of_class(&store, list) else {
            panic!("expected parameterized descriptor");
        };
        assert_eq!(p.raw, list);
        assert_eq!(p.args.len(), 1);
        let TypeDescriptor::ResolvedVariable(e) = &p.args[0] else {
            panic!("expected the type argument to be List's own variable");
        };
        assert_eq!(e.name, "E");

        // A class without type parameters degrades to a declared descriptor.
        let string = store.well_known().string;
        assert_eq!(
            generic_descriptor_of_class(&store, string),
            TypeDescriptor::declared(string)
        );
    }

    #[test]
    fn capture_reads_the_superclass_type_argument() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = store.well_known().object;
        let string = store.well_known().string;

        let container = store.intern_class_id("com.example.Container");
        let t = store.add_type_param(
            "T",
            GenericDeclaration::Class(container),
            vec![ReflectedType::class(object)],
        );
        store.define_class(
            container,
            ClassDef {
                kind: ClassKind::Class,
                type_params: vec![t],
                super_class: Some(ReflectedType::class(object)),
                ..ClassDef::placeholder("com.example.Container")
            },
        );

        let string_container = store.add_class(ClassDef {
            super_class: Some(ReflectedType::parameterized(
                container,
                vec![ReflectedType::class(string)],
            )),
            ..ClassDef::placeholder("com.example.StringContainer")
        });

        let captured = capture(&store, string_container).unwrap();
        assert_eq!(captured, TypeDescriptor::declared(string));

        let plain = store.add_class(ClassDef {
            super_class: Some(ReflectedType::class(object)),
            ..ClassDef::placeholder("com.example.Plain")
        });
        assert!(matches!(
            capture(&store, plain),
            Err(TypeError::Capture { .. })
        ));
    }
}
