//! Primitive/boxed class mapping.
//!
//! Both functions are total: a class with no mapping is returned unchanged.

use crate::{ClassId, TypeEnv, WellKnownTypes};

fn pairs(wk: &WellKnownTypes) -> [(ClassId, ClassId); 8] {
    [
        (wk.prim_int, wk.boxed_int),
        (wk.prim_long, wk.boxed_long),
        (wk.prim_short, wk.boxed_short),
        (wk.prim_byte, wk.boxed_byte),
        (wk.prim_char, wk.boxed_char),
        (wk.prim_boolean, wk.boxed_boolean),
        (wk.prim_float, wk.boxed_float),
        (wk.prim_double, wk.boxed_double),
    ]
}

/// Boxed counterpart of a primitive class.
pub fn wrap(env: &dyn TypeEnv, class: ClassId) -> ClassId {
    pairs(env.well_known())
        .iter()
        .find(|(prim, _)| *prim == class)
        .map(|(_, boxed)| *boxed)
        .unwrap_or(class)
}

/// Primitive counterpart of a boxed class.
pub fn unwrap(env: &dyn TypeEnv, class: ClassId) -> ClassId {
    pairs(env.well_known())
        .iter()
        .find(|(_, boxed)| *boxed == class)
        .map(|(prim, _)| *prim)
        .unwrap_or(class)
}
