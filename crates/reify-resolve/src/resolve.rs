//! Resolution of type variables and wildcards against a concrete hierarchy.
//!
//! Both entry points produce new descriptors; inputs are never mutated.

use std::collections::{HashSet, VecDeque};

use reify_types::{
    class_hierarchy, render, ClassId, GenericDeclaration, MethodDef, MethodId, ParameterizedType,
    ReflectedType, ResolvedVariableType, TypeDescriptor, TypeEnv, WildcardKind, WildcardType,
};

use crate::convert::{descriptor_of_method_return, descriptor_of_type};
use crate::error::{TypeError, TypeResult};

/// Pin a descriptor to a known concrete class.
///
/// Supports exactly four shapes: a parameterization (its wildcard arguments
/// are resolved through the class's hierarchy), a declared type (re-typed to
/// the class when the class lies within its bounds), and a wildcard or
/// resolved variable within bounds (collapsed to the class). Everything else
/// is an [`TypeError::UnsupportedDescriptor`].
pub fn resolve_against_class(
    env: &dyn TypeEnv,
    descriptor: &TypeDescriptor,
    class: ClassId,
) -> TypeResult<TypeDescriptor> {
    match descriptor {
        TypeDescriptor::Parameterized(p) => resolve_parameterized(env, p, class),
        TypeDescriptor::Declared(_) => Ok(if descriptor.is_within_bounds(env, class) {
            descriptor.with_class(class)
        } else {
            descriptor.clone()
        }),
        TypeDescriptor::Wildcard(w) if w.is_within_bounds(env, class) => {
            Ok(TypeDescriptor::declared(class))
        }
        TypeDescriptor::ResolvedVariable(v) if v.is_within_bounds(env, class) => {
            Ok(descriptor.with_class(class))
        }
        other => Err(TypeError::UnsupportedDescriptor {
            descriptor: render(env, other, true),
        }),
    }
}

fn resolve_parameterized(
    env: &dyn TypeEnv,
    parameterized: &ParameterizedType,
    class: ClassId,
) -> TypeResult<TypeDescriptor> {
    let params = env
        .class(parameterized.raw)
        .map(|def| def.type_params.clone())
        .unwrap_or_default();

    let mut resolved = Vec::with_capacity(parameterized.args.len());
    for (i, arg) in parameterized.args.iter().enumerate() {
        // Only wildcard arguments need more context: the declaring entity's
        // type parameter at the same position drives the hierarchy search.
        let TypeDescriptor::Wildcard(wildcard) = arg else {
            resolved.push(arg.clone());
            continue;
        };
        let Some(param) = params.get(i).copied() else {
            resolved.push(arg.clone());
            continue;
        };
        let TypeDescriptor::ResolvedVariable(target) =
            descriptor_of_type(env, &ReflectedType::Variable(param))
        else {
            resolved.push(arg.clone());
            continue;
        };
        match resolve_wildcard(env, &target, wildcard, class)? {
            Some(found) => resolved.push(found),
            None => resolved.push(arg.clone()),
        }
    }

    Ok(TypeDescriptor::Parameterized(
        parameterized.with_args(resolved),
    ))
}

/// Resolve a wildcard argument against a concrete class, in two attempts:
/// first by scanning the class's hierarchy for a generic interface
/// implementation declared by the target variable's entity, then by matching
/// method shapes (declarations constrained only by override covariance).
fn resolve_wildcard(
    env: &dyn TypeEnv,
    against: &ResolvedVariableType,
    wildcard: &WildcardType,
    class: ClassId,
) -> TypeResult<Option<TypeDescriptor>> {
    if let Some(found) = resolve_by_hierarchy(env, against, wildcard, class)? {
        return Ok(Some(found));
    }
    Ok(resolve_by_method_shape(env, against, wildcard, class))
}

fn hierarchy_mismatch(variable: &str, parent: impl Into<String>) -> TypeError {
    TypeError::HierarchyMismatch {
        variable: variable.to_string(),
        parent: parent.into(),
    }
}

fn resolve_by_hierarchy(
    env: &dyn TypeEnv,
    against: &ResolvedVariableType,
    wildcard: &WildcardType,
    class: ClassId,
) -> TypeResult<Option<TypeDescriptor>> {
    for current in class_hierarchy(env, class, false) {
        let Some(def) = env.class(current) else {
            continue;
        };
        for interface in &def.interfaces {
            let ReflectedType::Parameterized { raw, args, .. } = interface else {
                continue;
            };
            if against.declared_by != GenericDeclaration::Class(*raw) {
                continue;
            }

            let index = against
                .index
                .filter(|i| *i < args.len())
                .ok_or_else(|| hierarchy_mismatch(&against.name, env.class_name(class)))?;

            let candidate = descriptor_of_type(env, &args[index]);
            let Some(erased) = candidate.declared_type(env) else {
                continue;
            };
            if !wildcard.is_within_bounds(env, erased) {
                continue;
            }
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Fallback for variables constrained only structurally: find a method in the
/// hierarchy whose erased return type is the target variable, then a sibling
/// override (same name and arity) whose concrete return type satisfies the
/// wildcard's bounds, and use that return descriptor.
///
/// Matching ignores parameter types, so overload sets with the same arity can
/// pick the wrong sibling; registration of such hierarchies is on the host.
fn resolve_by_method_shape(
    env: &dyn TypeEnv,
    against: &ResolvedVariableType,
    wildcard: &WildcardType,
    class: ClassId,
) -> Option<TypeDescriptor> {
    tracing::debug!(
        variable = %against.name,
        class = env.class_name(class),
        "resolving wildcard through method shapes"
    );

    for current in class_hierarchy(env, class, true) {
        let Some(def) = env.class(current) else {
            continue;
        };
        for method in &def.methods {
            let ReflectedType::Variable(var) = &method.return_type else {
                continue;
            };
            let Some(param) = env.type_param(*var) else {
                continue;
            };
            if param.declared_by != against.declared_by {
                continue;
            }
            if let Some(found) = find_override_by_shape(env, current, method, wildcard, class) {
                return Some(found);
            }
        }
    }

    None
}

fn find_override_by_shape(
    env: &dyn TypeEnv,
    declaring: ClassId,
    method: &MethodDef,
    wildcard: &WildcardType,
    class: ClassId,
) -> Option<TypeDescriptor> {
    for current in class_hierarchy(env, class, false) {
        if current == declaring {
            continue;
        }
        let Some(def) = env.class(current) else {
            continue;
        };
        for (index, candidate) in def.methods.iter().enumerate() {
            if candidate.name != method.name || candidate.params.len() != method.params.len() {
                continue;
            }
            let Some(return_class) = candidate.return_type.raw_class() else {
                continue;
            };
            if !wildcard.is_within_bounds(env, return_class) {
                continue;
            }
            return descriptor_of_method_return(
                env,
                MethodId {
                    class: current,
                    index: index as u32,
                },
            );
        }
    }
    None
}

/// Substitute every variable in `descriptor` using a fully concrete
/// `parent` descriptor as the source of truth.
pub fn resolve_declared_types(
    env: &dyn TypeEnv,
    descriptor: &TypeDescriptor,
    parent: &TypeDescriptor,
) -> TypeResult<TypeDescriptor> {
    match descriptor {
        // Nothing generic to substitute. Unresolved variables carry no bounds
        // and pass through untouched.
        TypeDescriptor::Declared(_) | TypeDescriptor::UnresolvedVariable(_) => {
            Ok(descriptor.clone())
        }
        TypeDescriptor::ResolvedVariable(variable) => {
            let mismatch = || hierarchy_mismatch(&variable.name, render(env, parent, false));
            let GenericDeclaration::Class(owner) = variable.declared_by else {
                return Err(mismatch());
            };
            if parent.declared_type(env) != Some(owner) {
                return resolve_from_unknown_parent(env, variable, parent);
            }
            let TypeDescriptor::Parameterized(p) = parent else {
                return Err(mismatch());
            };
            variable
                .index
                .and_then(|i| p.args.get(i))
                .cloned()
                .ok_or_else(mismatch)
        }
        TypeDescriptor::Parameterized(p) => {
            let args = p
                .args
                .iter()
                .map(|arg| resolve_declared_types(env, arg, parent))
                .collect::<TypeResult<Vec<_>>>()?;
            Ok(TypeDescriptor::Parameterized(p.with_args(args)))
        }
        TypeDescriptor::Wildcard(w) => {
            let bounds = w
                .active_bounds()
                .iter()
                .map(|bound| resolve_declared_types(env, bound, parent))
                .collect::<TypeResult<Vec<_>>>()?;
            let mut rebuilt = w.clone();
            match w.kind {
                WildcardKind::Extends => rebuilt.upper_bounds = bounds,
                WildcardKind::Super | WildcardKind::Raw => rebuilt.lower_bounds = bounds,
            }
            Ok(TypeDescriptor::Wildcard(rebuilt))
        }
    }
}

/// Chain substitution for a variable declared by an ancestor of the parent's
/// class rather than by the parent itself: collect every parameterized
/// ancestor in the parent's generic hierarchy (plus the parent), then follow
/// variable-to-argument links until the value is no longer a variable.
///
/// A variable no hierarchy entry defines, or a substitution cycle, means the
/// type model is inconsistent with the runtime hierarchy; both are fatal.
fn resolve_from_unknown_parent(
    env: &dyn TypeEnv,
    variable: &ResolvedVariableType,
    parent: &TypeDescriptor,
) -> TypeResult<TypeDescriptor> {
    let parent_name = render(env, parent, false);
    let parent_class = parent
        .declared_type(env)
        .ok_or_else(|| hierarchy_mismatch(&variable.name, parent_name.clone()))?;

    let mut entries = collect_generic_hierarchy(env, parent_class);
    entries.push(parent.clone());

    let mut current = TypeDescriptor::ResolvedVariable(variable.clone());
    let mut seen: HashSet<(GenericDeclaration, usize)> = HashSet::new();

    loop {
        let (name, declared_by, index) = match current.as_variable() {
            Some(var) => (var.name.to_string(), var.declared_by, var.index),
            None => return Ok(current),
        };
        let mismatch = || hierarchy_mismatch(&name, parent_name.clone());

        let GenericDeclaration::Class(declaring) = declared_by else {
            return Err(mismatch());
        };
        let index = index.ok_or_else(mismatch)?;
        if !seen.insert((declared_by, index)) {
            return Err(mismatch());
        }

        current = entries
            .iter()
            .find_map(|entry| match entry {
                TypeDescriptor::Parameterized(p) if p.raw == declaring => {
                    p.args.get(index).cloned()
                }
                _ => None,
            })
            .ok_or_else(mismatch)?;
    }
}

/// Every parameterized supertype reachable from `class` through generic
/// superclass and generic interface edges, breadth-first.
pub fn collect_generic_hierarchy(env: &dyn TypeEnv, class: ClassId) -> Vec<TypeDescriptor> {
    let object = env.well_known().object;
    let mut out = Vec::new();
    let mut visited: HashSet<ClassId> = HashSet::new();
    let mut queue: VecDeque<ReflectedType> = VecDeque::new();
    queue.push_back(ReflectedType::class(class));

    while let Some(current) = queue.pop_front() {
        let Some(lookup) = current.raw_class() else {
            continue;
        };
        if !visited.insert(lookup) {
            continue;
        }
        if matches!(current, ReflectedType::Parameterized { .. }) {
            out.push(descriptor_of_type(env, &current));
        }

        let Some(def) = env.class(lookup) else {
            continue;
        };
        if let Some(superclass) = &def.super_class {
            if superclass.raw_class() != Some(object) {
                queue.push_back(superclass.clone());
            }
        }
        for interface in &def.interfaces {
            queue.push_back(interface.clone());
        }
    }

    out
}
