use crate::HookError;
use crate::effects::Dispose;
use crate::runtime::MismatchPolicy;
use crate::slot::{HookSlot, SlotInfo, SlotKind};

/// Ordered hook slots plus the cursor pointing at the next one to use.
#[derive(Default)]
pub(crate) struct SlotStore {
    slots: Vec<HookSlot>,
    cursor: usize,
    policy: MismatchPolicy,
    // Cleanup of an effect slot that a reset displaced, not yet run.
    displaced: Option<Dispose>,
}

/// Result of reserving the slot at the cursor.
#[derive(Clone, Copy)]
pub(crate) enum Reserved {
    /// A slot of the right kind and type already lives at this index.
    Existing(usize),
    /// The caller must initialise the slot with [`SlotStore::fill`].
    Vacant(usize),
}

impl SlotStore {
    pub fn with_policy(policy: MismatchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn begin_pass(&mut self) {
        self.cursor = 0;
    }

    /// Resets the cursor. Returns the number of hooks called during the pass
    /// when it differs from the number of slots.
    pub fn end_pass(&mut self) -> Option<usize> {
        let used = std::mem::take(&mut self.cursor);
        (used != self.slots.len()).then_some(used)
    }

    /// Claims the slot at the cursor for a hook of kind `expected` storing a
    /// `T`, and advances the cursor.
    pub fn reserve<T: 'static>(&mut self, expected: SlotKind) -> Reserved {
        let index = self.cursor;
        self.cursor += 1;

        let err = match self.slots.get(index) {
            None => {
                log::trace!("allocating {expected} slot {index}");
                return Reserved::Vacant(index);
            }
            Some(slot) if slot.kind() != expected => HookError::SlotKindMismatch {
                index,
                expected,
                found: slot.kind(),
            },
            Some(slot) => match slot.foreign_type::<T>() {
                Some(stored) => HookError::SlotTypeMismatch {
                    index,
                    expected: std::any::type_name::<T>(),
                    found: stored,
                },
                None => return Reserved::Existing(index),
            },
        };

        self.reset(index, err);
        Reserved::Vacant(index)
    }

    /// Panics, or logs and detaches the pending cleanup of the slot at
    /// `index` so the caller can run it before the slot is refilled.
    fn reset(&mut self, index: usize, err: HookError) {
        if self.policy == MismatchPolicy::Panic {
            panic!("{err}");
        }
        log::error!("{err}; resetting the slot");
        if let Some(HookSlot::Effect(effect)) = self.slots.get_mut(index) {
            self.displaced = effect.cleanup.take();
        }
    }

    pub fn take_displaced(&mut self) -> Option<Dispose> {
        self.displaced.take()
    }

    /// Stores a freshly built slot at an index handed out by `reserve`.
    pub fn fill(&mut self, index: usize, slot: HookSlot) {
        if index == self.slots.len() {
            self.slots.push(slot);
        } else {
            self.slots[index] = slot;
        }
    }

    pub fn get(&self, index: usize) -> Option<&HookSlot> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut HookSlot> {
        self.slots.get_mut(index)
    }

    pub fn snapshot(&self) -> Vec<SlotInfo> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| s.info(i))
            .collect()
    }

    /// Empties the store, handing the slots back so their cleanups can run
    /// without the store borrowed.
    pub fn drain(&mut self) -> Vec<HookSlot> {
        self.cursor = 0;
        std::mem::take(&mut self.slots)
    }
}

impl HookSlot {
    /// Name of the stored type when it is not `T`.
    fn foreign_type<T: 'static>(&self) -> Option<&'static str> {
        match self {
            HookSlot::State(s) if !s.value.is::<T>() => Some(s.type_name),
            HookSlot::Memo(m) if m.value.as_ref().is_some_and(|v| !v.is::<T>()) => {
                Some(m.type_name)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{EffectSlot, MemoSlot};

    #[test]
    fn reserve_appends_then_reuses() {
        let mut store = SlotStore::default();

        let Reserved::Vacant(i) = store.reserve::<()>(SlotKind::Effect) else {
            panic!("first reserve must be vacant");
        };
        store.fill(i, HookSlot::Effect(EffectSlot::default()));
        assert_eq!(store.end_pass(), None);

        store.begin_pass();
        assert!(matches!(
            store.reserve::<()>(SlotKind::Effect),
            Reserved::Existing(0)
        ));
        assert_eq!(store.cursor(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn end_pass_reports_drift() {
        let mut store = SlotStore::default();
        for _ in 0..2 {
            if let Reserved::Vacant(i) = store.reserve::<()>(SlotKind::Effect) {
                store.fill(i, HookSlot::Effect(EffectSlot::default()));
            }
        }
        assert_eq!(store.end_pass(), None);

        store.begin_pass();
        let _ = store.reserve::<()>(SlotKind::Effect);
        assert_eq!(store.end_pass(), Some(1));
        assert_eq!(store.cursor(), 0);
    }

    #[test]
    #[should_panic(expected = "slot 0 holds a `effect` hook where a `memo` hook was called")]
    fn kind_mismatch_panics() {
        let mut store = SlotStore::with_policy(MismatchPolicy::Panic);
        if let Reserved::Vacant(i) = store.reserve::<()>(SlotKind::Effect) {
            store.fill(i, HookSlot::Effect(EffectSlot::default()));
        }
        store.begin_pass();
        let _ = store.reserve::<i32>(SlotKind::Memo);
    }

    #[test]
    fn reset_detaches_pending_cleanup() {
        let mut store = SlotStore::with_policy(MismatchPolicy::Reset);
        if let Reserved::Vacant(i) = store.reserve::<()>(SlotKind::Effect) {
            store.fill(
                i,
                HookSlot::Effect(EffectSlot {
                    deps: None,
                    cleanup: Some(Dispose::new(|| ())),
                }),
            );
        }
        store.begin_pass();

        assert!(matches!(
            store.reserve::<i32>(SlotKind::Memo),
            Reserved::Vacant(0)
        ));
        let cleanup = store.take_displaced().expect("effect cleanup was pending");
        assert!(cleanup.is_pending());
        assert!(store.take_displaced().is_none());

        // A memo holding another type resets without a cleanup.
        store.begin_pass();
        store.fill(
            0,
            HookSlot::Memo(MemoSlot {
                deps: None,
                value: Some(Box::new(1i32)),
                type_name: "i32",
                callable: false,
            }),
        );
        assert!(matches!(
            store.reserve::<u8>(SlotKind::Memo),
            Reserved::Vacant(0)
        ));
        assert!(store.take_displaced().is_none());
    }
}
