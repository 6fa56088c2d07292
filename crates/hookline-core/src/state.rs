use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use crate::runtime::{HookContext, current_context};
use crate::slot::{HookSlot, SlotKind, StateSlot};
use crate::store::{Reserved, SlotStore};

/// Type-erased identity of a state slot. One per slot, created with it.
pub(crate) struct SetterHandle {
    index: usize,
    ctx: Weak<HookContext>,
}

/// Updates the state slot it was created for and re-renders its root when
/// the value actually changed.
///
/// The setter for a given slot is the same handle on every render, so it
/// can be captured by callbacks or used as an effect dependency.
pub struct Setter<T> {
    handle: Rc<SetterHandle>,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Setter<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.handle, &other.handle)
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Setter(slot {})", self.handle.index)
    }
}

impl<T: Clone + PartialEq + 'static> Setter<T> {
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    /// Computes the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let index = self.handle.index;
        let Some(ctx) = self.handle.ctx.upgrade() else {
            log::debug!("setter for slot {index} outlived its root; ignoring");
            return;
        };

        let Some(previous) = read_state::<T>(&ctx.store.borrow(), &self.handle) else {
            log::debug!("setter for slot {index} is stale; ignoring");
            return;
        };

        // The store is released while `f` runs; reducers may do anything.
        let next = f(&previous);
        if next == previous {
            log::debug!("state slot {index}: value unchanged, not rendering");
            return;
        }

        if let Some(HookSlot::State(slot)) = ctx.store.borrow_mut().get_mut(index) {
            slot.value = Box::new(next);
        }
        ctx.request_render();
    }
}

fn read_state<T: Clone + 'static>(store: &SlotStore, handle: &Rc<SetterHandle>) -> Option<T> {
    match store.get(handle.index) {
        Some(HookSlot::State(slot)) if Rc::ptr_eq(&slot.setter, handle) => {
            slot.value.downcast_ref::<T>().cloned()
        }
        _ => None,
    }
}

/// Order-based state: the Nth `use_state*` call of a component always
/// refers to the Nth stored value.
///
/// `initial` is only used on the first render.
pub fn use_state<T: Clone + PartialEq + 'static>(initial: T) -> (T, Setter<T>) {
    use_state_with(move || initial)
}

/// Like [`use_state`], but only builds the initial value on the first render.
pub fn use_state_with<T: Clone + PartialEq + 'static>(
    init: impl FnOnce() -> T,
) -> (T, Setter<T>) {
    let ctx = current_context();

    let reserved = ctx.reserve::<T>(SlotKind::State);
    if let Reserved::Vacant(index) = reserved {
        let value = init();
        let setter = Rc::new(SetterHandle {
            index,
            ctx: Rc::downgrade(&ctx),
        });
        ctx.store.borrow_mut().fill(
            index,
            HookSlot::State(StateSlot {
                value: Box::new(value),
                type_name: std::any::type_name::<T>(),
                setter,
            }),
        );
    }

    let index = match reserved {
        Reserved::Existing(i) | Reserved::Vacant(i) => i,
    };
    let store = ctx.store.borrow();
    let Some(HookSlot::State(slot)) = store.get(index) else {
        unreachable!("reserve checked the slot kind");
    };
    let Some(value) = slot.value.downcast_ref::<T>() else {
        unreachable!("reserve checked the slot type");
    };
    (
        value.clone(),
        Setter {
            handle: slot.setter.clone(),
            _marker: PhantomData,
        },
    )
}

/// Mutable box that survives renders. Writing to it never re-renders.
pub struct MutableRef<T>(Rc<RefCell<T>>);

impl<T> MutableRef<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn current(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }

    pub fn set_current(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    pub fn with_current<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

impl<T> Clone for MutableRef<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> PartialEq for MutableRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: fmt::Debug> fmt::Debug for MutableRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableRef")
            .field("current", &self.0.borrow())
            .finish()
    }
}

/// A [`MutableRef`] kept in a state slot; its setter is discarded.
pub fn use_ref<T: 'static>(initial: T) -> MutableRef<T> {
    use_state_with(move || MutableRef::new(initial)).0
}
