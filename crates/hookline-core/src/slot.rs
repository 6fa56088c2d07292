use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::Deps;
use crate::effects::Dispose;
use crate::state::SetterHandle;

/// Discriminant of a [`HookSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SlotKind {
    State,
    Effect,
    Memo,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SlotKind::State => "state",
            SlotKind::Effect => "effect",
            SlotKind::Memo => "memo",
        })
    }
}

/// Per-call-position storage. The variant never changes once created for a
/// position; only the data inside it does.
pub(crate) enum HookSlot {
    State(StateSlot),
    Effect(EffectSlot),
    Memo(MemoSlot),
}

pub(crate) struct StateSlot {
    pub value: Box<dyn Any>,
    pub type_name: &'static str,
    pub setter: Rc<SetterHandle>,
}

#[derive(Default)]
pub(crate) struct EffectSlot {
    pub deps: Option<Deps>,
    pub cleanup: Option<Dispose>,
}

pub(crate) struct MemoSlot {
    pub deps: Option<Deps>,
    pub value: Option<Box<dyn Any>>,
    pub type_name: &'static str,
    /// Built by `use_callback`.
    pub callable: bool,
}

impl HookSlot {
    pub fn kind(&self) -> SlotKind {
        match self {
            HookSlot::State(_) => SlotKind::State,
            HookSlot::Effect(_) => SlotKind::Effect,
            HookSlot::Memo(_) => SlotKind::Memo,
        }
    }

    pub fn info(&self, index: usize) -> SlotInfo {
        let describe = |deps: &Option<Deps>| -> Option<Vec<String>> {
            deps.as_ref()
                .map(|d| d.iter().map(|d| d.describe()).collect())
        };
        match self {
            HookSlot::State(s) => SlotInfo {
                index,
                kind: SlotKind::State,
                value_type: Some(s.type_name),
                callable: false,
                deps: None,
                has_cleanup: false,
            },
            HookSlot::Effect(e) => SlotInfo {
                index,
                kind: SlotKind::Effect,
                value_type: None,
                callable: false,
                deps: describe(&e.deps),
                has_cleanup: e.cleanup.is_some(),
            },
            HookSlot::Memo(m) => SlotInfo {
                index,
                kind: SlotKind::Memo,
                value_type: m.value.as_ref().map(|_| m.type_name),
                callable: m.callable,
                deps: describe(&m.deps),
                has_cleanup: false,
            },
        }
    }
}

/// Read-only description of one slot, for debugging tools.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SlotInfo {
    pub index: usize,
    pub kind: SlotKind,
    /// Rust type of the stored value, if the slot holds one.
    pub value_type: Option<&'static str>,
    /// The stored value is a function handle (a memoized callback).
    pub callable: bool,
    /// `Debug` rendering of the last dependency list; `None` when the hook
    /// was called without one.
    pub deps: Option<Vec<String>>,
    pub has_cleanup: bool,
}
