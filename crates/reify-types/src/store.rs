//! In-memory [`TypeEnv`] implementation.

use std::collections::HashMap;

use crate::{
    ClassDef, ClassId, ClassKind, FieldDef, FieldId, GenericDeclaration, MethodDef, MethodId,
    ReflectedType, TypeEnv, TypeParamDef, TypeVarId, WellKnownTypes,
};

/// Mutable class/type-parameter store used by the hosting framework and by
/// tests. Always pre-interns the well-known classes so `well_known()` is total
/// even on an otherwise empty store.
#[derive(Debug)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    names: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeStore {
    pub fn new() -> Self {
        let mut store = TypeStore {
            classes: Vec::new(),
            names: HashMap::new(),
            type_params: Vec::new(),
            well_known: WellKnownTypes {
                object: ClassId(0),
                string: ClassId(0),
                prim_int: ClassId(0),
                prim_long: ClassId(0),
                prim_short: ClassId(0),
                prim_byte: ClassId(0),
                prim_char: ClassId(0),
                prim_boolean: ClassId(0),
                prim_float: ClassId(0),
                prim_double: ClassId(0),
                boxed_int: ClassId(0),
                boxed_long: ClassId(0),
                boxed_short: ClassId(0),
                boxed_byte: ClassId(0),
                boxed_char: ClassId(0),
                boxed_boolean: ClassId(0),
                boxed_float: ClassId(0),
                boxed_double: ClassId(0),
            },
        };

        let object = store.intern_class_id("java.lang.Object");
        let string = store.intern_class_id("java.lang.String");
        store.define_class(
            string,
            ClassDef {
                super_class: Some(ReflectedType::class(object)),
                ..ClassDef::placeholder("java.lang.String")
            },
        );

        let primitive = |store: &mut TypeStore, name: &str| {
            let id = store.intern_class_id(name);
            store.define_class(
                id,
                ClassDef {
                    kind: ClassKind::Primitive,
                    ..ClassDef::placeholder(name)
                },
            );
            id
        };
        let boxed = |store: &mut TypeStore, name: &str| {
            let id = store.intern_class_id(name);
            store.define_class(
                id,
                ClassDef {
                    super_class: Some(ReflectedType::class(object)),
                    ..ClassDef::placeholder(name)
                },
            );
            id
        };

        store.well_known = WellKnownTypes {
            object,
            string,
            prim_int: primitive(&mut store, "int"),
            prim_long: primitive(&mut store, "long"),
            prim_short: primitive(&mut store, "short"),
            prim_byte: primitive(&mut store, "byte"),
            prim_char: primitive(&mut store, "char"),
            prim_boolean: primitive(&mut store, "boolean"),
            prim_float: primitive(&mut store, "float"),
            prim_double: primitive(&mut store, "double"),
            boxed_int: boxed(&mut store, "java.lang.Integer"),
            boxed_long: boxed(&mut store, "java.lang.Long"),
            boxed_short: boxed(&mut store, "java.lang.Short"),
            boxed_byte: boxed(&mut store, "java.lang.Byte"),
            boxed_char: boxed(&mut store, "java.lang.Character"),
            boxed_boolean: boxed(&mut store, "java.lang.Boolean"),
            boxed_float: boxed(&mut store, "java.lang.Float"),
            boxed_double: boxed(&mut store, "java.lang.Double"),
        };

        store
    }

    /// A store with enough of `java.lang` / `java.util` for realistic
    /// hierarchies: `Comparable<T>`, `CharSequence`, `Number`,
    /// `Collection<E>` / `List<E>` / `ArrayList<E>`.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::new();
        let wk = store.well_known.clone();
        let object = wk.object;

        let char_sequence = store.add_class(ClassDef {
            kind: ClassKind::Interface,
            ..ClassDef::placeholder("java.lang.CharSequence")
        });

        let comparable = store.intern_class_id("java.lang.Comparable");
        let comparable_t = store.add_type_param(
            "T",
            GenericDeclaration::Class(comparable),
            vec![ReflectedType::class(object)],
        );
        store.define_class(
            comparable,
            ClassDef {
                kind: ClassKind::Interface,
                type_params: vec![comparable_t],
                ..ClassDef::placeholder("java.lang.Comparable")
            },
        );

        let number = store.add_class(ClassDef {
            super_class: Some(ReflectedType::class(object)),
            ..ClassDef::placeholder("java.lang.Number")
        });

        // String implements Comparable<String> and CharSequence.
        store.class_mut(wk.string).unwrap().interfaces = vec![
            ReflectedType::parameterized(comparable, vec![ReflectedType::class(wk.string)]),
            ReflectedType::class(char_sequence),
        ];

        let numeric_boxes = [
            wk.boxed_int,
            wk.boxed_long,
            wk.boxed_short,
            wk.boxed_byte,
            wk.boxed_float,
            wk.boxed_double,
        ];
        for id in numeric_boxes {
            let def = store.class_mut(id).unwrap();
            def.super_class = Some(ReflectedType::class(number));
            def.interfaces =
                vec![ReflectedType::parameterized(comparable, vec![ReflectedType::class(id)])];
        }
        for id in [wk.boxed_char, wk.boxed_boolean] {
            store.class_mut(id).unwrap().interfaces =
                vec![ReflectedType::parameterized(comparable, vec![ReflectedType::class(id)])];
        }

        let collection = store.intern_class_id("java.util.Collection");
        let collection_e = store.add_type_param(
            "E",
            GenericDeclaration::Class(collection),
            vec![ReflectedType::class(object)],
        );
        store.define_class(
            collection,
            ClassDef {
                kind: ClassKind::Interface,
                type_params: vec![collection_e],
                ..ClassDef::placeholder("java.util.Collection")
            },
        );

        let list = store.intern_class_id("java.util.List");
        let list_e = store.add_type_param(
            "E",
            GenericDeclaration::Class(list),
            vec![ReflectedType::class(object)],
        );
        store.define_class(
            list,
            ClassDef {
                kind: ClassKind::Interface,
                type_params: vec![list_e],
                interfaces: vec![ReflectedType::parameterized(
                    collection,
                    vec![ReflectedType::Variable(list_e)],
                )],
                ..ClassDef::placeholder("java.util.List")
            },
        );

        let array_list = store.intern_class_id("java.util.ArrayList");
        let array_list_e = store.add_type_param(
            "E",
            GenericDeclaration::Class(array_list),
            vec![ReflectedType::class(object)],
        );
        store.define_class(
            array_list,
            ClassDef {
                type_params: vec![array_list_e],
                super_class: Some(ReflectedType::class(object)),
                interfaces: vec![ReflectedType::parameterized(
                    list,
                    vec![ReflectedType::Variable(array_list_e)],
                )],
                ..ClassDef::placeholder("java.util.ArrayList")
            },
        );

        store
    }

    /// Allocate (or return) the id for `name`, installing a placeholder
    /// definition until [`define_class`](Self::define_class) is called.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        let id = ClassId::new(self.classes.len() as u32);
        self.classes.push(ClassDef::placeholder(name));
        self.names.insert(name.to_string(), id);
        id
    }

    /// Replace the definition behind `id`, keeping the name map consistent.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        self.names.insert(def.name.clone(), id);
        self.classes[id.0 as usize] = def;
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.0 as usize)
    }

    pub fn add_type_param(
        &mut self,
        name: &str,
        declared_by: GenericDeclaration,
        bounds: Vec<ReflectedType>,
    ) -> TypeVarId {
        let id = TypeVarId::new(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.to_string(),
            declared_by,
            bounds,
        });
        id
    }

    /// Rewrite a type parameter's bound list. Needed to close the knot for
    /// self-referential bounds such as `T extends Comparable<T>`, where the
    /// variable id must exist before its bounds can mention it.
    pub fn set_type_param_bounds(&mut self, id: TypeVarId, bounds: Vec<ReflectedType>) {
        if let Some(def) = self.type_params.get_mut(id.0 as usize) {
            def.bounds = bounds;
        }
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.names.get(name).copied()
    }

    pub fn add_method(&mut self, class: ClassId, method: MethodDef) -> Option<MethodId> {
        let def = self.class_mut(class)?;
        let index = def.methods.len() as u32;
        def.methods.push(method);
        Some(MethodId { class, index })
    }

    pub fn add_field(&mut self, class: ClassId, field: FieldDef) -> Option<FieldId> {
        let def = self.class_mut(class)?;
        let index = def.fields.len() as u32;
        def.fields.push(field);
        Some(FieldId { class, index })
    }

    pub fn method_id(&self, class: ClassId, name: &str) -> Option<MethodId> {
        let def = self.class(class)?;
        let index = def.methods.iter().position(|m| m.name == name)?;
        Some(MethodId {
            class,
            index: index as u32,
        })
    }

    pub fn field_id(&self, class: ClassId, name: &str) -> Option<FieldId> {
        let def = self.class(class)?;
        let index = def.fields.iter().position(|f| f.name == name)?;
        Some(FieldId {
            class,
            index: index as u32,
        })
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0 as usize)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.0 as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}
