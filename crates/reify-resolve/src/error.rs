use thiserror::Error;

pub type TypeResult<T> = Result<T, TypeError>;

/// Contract violations surfaced by conversion and resolution.
///
/// None of these are recoverable runtime conditions: a wrong resolution
/// silently propagated would corrupt every type-directed decision downstream,
/// so each kind is fatal to the call that raised it.
#[derive(Error, Debug)]
pub enum TypeError {
    /// Resolution attempted on a descriptor/context combination outside the
    /// four supported shapes.
    #[error("descriptor `{descriptor}` is not supported for resolution")]
    UnsupportedDescriptor { descriptor: String },

    /// A type variable's declaring entity cannot be located in the collected
    /// hierarchy: the type model is inconsistent with the runtime hierarchy.
    #[error("type variable `{variable}` cannot be located in the hierarchy of `{parent}`")]
    HierarchyMismatch { variable: String, parent: String },

    /// A capture was attempted from a context that provides no reified type
    /// argument.
    #[error("`{class}` provides no reified type argument to capture")]
    Capture { class: String },
}
