//! Diagnostic rendering of descriptors.
//!
//! Presentation only: error messages and log lines, never a hot path.

use std::fmt::Write;

use crate::{ClassId, TypeDescriptor, TypeEnv, WildcardKind};

/// Java-like rendering of a descriptor, e.g. `Map<String, ? extends Number>`.
pub fn render(env: &dyn TypeEnv, descriptor: &TypeDescriptor, include_annotations: bool) -> String {
    let mut out = String::new();
    visit(&mut out, env, descriptor, include_annotations);
    out
}

fn simple_name(env: &dyn TypeEnv, class: ClassId) -> &str {
    let name = env.class_name(class);
    name.rsplit('.').next().unwrap_or(name)
}

fn visit(out: &mut String, env: &dyn TypeEnv, descriptor: &TypeDescriptor, annotations: bool) {
    if annotations && !descriptor.annotations().is_empty() {
        for annotation in descriptor.annotations() {
            let _ = write!(out, "@{} ", annotation.name);
        }
    }

    match descriptor {
        TypeDescriptor::Declared(d) => out.push_str(simple_name(env, d.class)),
        TypeDescriptor::Parameterized(p) => {
            out.push_str(simple_name(env, p.raw));
            out.push('<');
            join(out, env, &p.args, ", ", annotations);
            out.push('>');
        }
        TypeDescriptor::Wildcard(w) => {
            out.push('?');
            match w.kind {
                WildcardKind::Extends => out.push_str(" extends "),
                WildcardKind::Super => out.push_str(" super "),
                WildcardKind::Raw => return,
            }
            join(out, env, w.active_bounds(), " & ", annotations);
        }
        TypeDescriptor::ResolvedVariable(v) => {
            out.push_str(&v.name);
            if !v.bounds.is_empty() {
                out.push_str(" extends ");
                join(out, env, &v.bounds, " & ", annotations);
            }
        }
        TypeDescriptor::UnresolvedVariable(v) => out.push_str(&v.name),
    }
}

fn join(
    out: &mut String,
    env: &dyn TypeEnv,
    descriptors: &[TypeDescriptor],
    separator: &str,
    annotations: bool,
) {
    for (i, descriptor) in descriptors.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        visit(out, env, descriptor, annotations);
    }
}
