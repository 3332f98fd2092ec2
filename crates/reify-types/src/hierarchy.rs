//! Erased-class hierarchy walks.

use std::collections::{HashSet, VecDeque};

use crate::{ClassId, ClassKind, ReflectedType, TypeEnv};

/// Breadth-first list of `root`'s transitive superclasses and interfaces.
///
/// `Object` is never included; an identity-visited set keeps the walk finite
/// under diamond inheritance. Unknown class ids are skipped rather than
/// reported: hierarchy walks are best-effort over whatever the provider knows.
pub fn class_hierarchy(env: &dyn TypeEnv, root: ClassId, skip_root: bool) -> Vec<ClassId> {
    let object = env.well_known().object;
    let mut out = Vec::new();
    let mut visited: HashSet<ClassId> = HashSet::new();
    let mut queue: VecDeque<ClassId> = VecDeque::new();
    queue.push_back(root);

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if current != root || !skip_root {
            out.push(current);
        }

        let Some(def) = env.class(current) else {
            continue;
        };
        if let Some(superclass) = def.super_class.as_ref().and_then(ReflectedType::raw_class) {
            if superclass != object {
                queue.push_back(superclass);
            }
        }
        for interface in &def.interfaces {
            if let Some(id) = interface.raw_class() {
                queue.push_back(id);
            }
        }
    }

    out
}

/// Whether `sub` is assignable to `sup` (`sup` is `sub` or one of its
/// transitive supertypes). Primitives are assignable only to themselves.
pub fn assignable(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> bool {
    if sub == sup {
        return true;
    }
    let primitive = |id: ClassId| {
        env.class(id)
            .map(|def| def.kind == ClassKind::Primitive)
            .unwrap_or(false)
    };
    if primitive(sub) || primitive(sup) {
        return false;
    }
    if sup == env.well_known().object {
        return true;
    }
    class_hierarchy(env, sub, true).contains(&sup)
}
