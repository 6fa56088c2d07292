use thiserror::Error;

use crate::slot::SlotKind;

/// Contract violations detected by the runtime.
///
/// These are programmer errors: the hooks panic with the formatted error
/// rather than returning it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("hook called outside of a render pass")]
    NoActiveRender,

    #[error(
        "slot {index} holds a `{found}` hook where a `{expected}` hook was called; \
         hooks must be called in the same order on every render"
    )]
    SlotKindMismatch {
        index: usize,
        expected: SlotKind,
        found: SlotKind,
    },

    #[error("slot {index} stores `{found}` but `{expected}` was requested")]
    SlotTypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("root '{label}' requested {passes} consecutive renders; giving up")]
    RenderLoop { label: String, passes: usize },
}
