//! Composable descriptor predicates.

use std::fmt;
use std::sync::Arc;

use reify_types::{ClassId, DeclaredType, TypeDescriptor, TypeEnv};

type Predicate = Arc<dyn Fn(&dyn TypeEnv, &TypeDescriptor) -> bool + Send + Sync>;

/// A labelled predicate over descriptors.
///
/// Matchers are cheap to clone and freely composable with [`and`](Self::and),
/// [`or`](Self::or) and [`invert`](Self::invert); the label is carried through
/// composition so a registry dump stays readable.
#[derive(Clone)]
pub struct Matcher {
    label: String,
    predicate: Predicate,
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Matcher {
    pub fn new(
        label: impl Into<String>,
        predicate: impl Fn(&dyn TypeEnv, &TypeDescriptor) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, env: &dyn TypeEnv, descriptor: &TypeDescriptor) -> bool {
        (self.predicate)(env, descriptor)
    }

    /// Matches every descriptor. Useful as a registry fallback entry.
    pub fn any() -> Self {
        Self::new("any", |_, _| true)
    }

    pub fn is_declared() -> Self {
        Self::new("declared", |_, d| d.is_declared())
    }

    pub fn is_parameterized() -> Self {
        Self::new("parameterized", |_, d| d.is_parameterized())
    }

    pub fn is_wildcard() -> Self {
        Self::new("wildcard", |_, d| d.is_wildcard())
    }

    pub fn is_type_var() -> Self {
        Self::new("type-var", |_, d| d.is_variable())
    }

    pub fn is_generic() -> Self {
        Self::new("generic", |_, d| d.is_generic())
    }

    /// Matches descriptors whose erased class is exactly `class`.
    pub fn declared_as(class: ClassId) -> Self {
        Self::new(format!("declared-as({})", class.0), move |env, d| {
            d.declared_type(env) == Some(class)
        })
    }

    /// Matches descriptors `class` is a supertype of (the descriptor's erased
    /// class is assignable to `class`).
    pub fn is_superclass(class: ClassId) -> Self {
        Self::new(format!("superclass-of({})", class.0), move |env, d| {
            d.is_superclass_of(env, class)
        })
    }

    /// Matches descriptors any of `classes` is a supertype of.
    pub fn is_any_superclass(classes: Vec<ClassId>) -> Self {
        let label = format!(
            "superclass-of-any({})",
            classes
                .iter()
                .map(|c| c.0.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Self::new(label, move |env, d| {
            classes.iter().any(|class| d.is_superclass_of(env, *class))
        })
    }

    /// Matches declared descriptors satisfying `predicate`.
    pub fn declared_matching(
        label: impl Into<String>,
        predicate: impl Fn(&dyn TypeEnv, &DeclaredType) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(label, move |env, d| match d {
            TypeDescriptor::Declared(declared) => predicate(env, declared),
            _ => false,
        })
    }

    /// Matches generic descriptors with at least one child satisfying `inner`.
    pub fn generic_matching(inner: Matcher) -> Self {
        let label = format!("generic-with({})", inner.label);
        Self::new(label, move |env, d| {
            d.is_generic() && d.generics().iter().any(|child| inner.matches(env, child))
        })
    }

    /// Matches generic descriptors whose child at `index` satisfies `inner`.
    pub fn generic_child_at(index: usize, inner: Matcher) -> Self {
        let label = format!("generic-child-at({index}, {})", inner.label);
        Self::new(label, move |env, d| {
            d.generics()
                .get(index)
                .is_some_and(|child| inner.matches(env, child))
        })
    }

    pub fn and(self, other: Matcher) -> Self {
        let label = format!("({} and {})", self.label, other.label);
        Self::new(label, move |env, d| {
            self.matches(env, d) && other.matches(env, d)
        })
    }

    pub fn or(self, other: Matcher) -> Self {
        let label = format!("({} or {})", self.label, other.label);
        Self::new(label, move |env, d| {
            self.matches(env, d) || other.matches(env, d)
        })
    }

    pub fn invert(self) -> Self {
        let label = format!("not({})", self.label);
        Self::new(label, move |env, d| !self.matches(env, d))
    }
}
