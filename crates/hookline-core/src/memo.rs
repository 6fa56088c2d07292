use std::fmt;
use std::rc::Rc;

use crate::runtime::current_context;
use crate::slot::{HookSlot, MemoSlot, SlotKind};
use crate::store::Reserved;
use crate::{Deps, deps_changed};

/// Shared, cheaply clonable function handle.
///
/// Equality is pointer identity, so a `Callback` can sit in a dependency
/// list: it only counts as changed when it was rebuilt.
pub struct Callback<A, R = ()>(Rc<dyn Fn(A) -> R>);

impl<A, R> Callback<A, R> {
    pub fn new(f: impl Fn(A) -> R + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, arg: A) -> R {
        (self.0)(arg)
    }
}

impl<A, R> Clone for Callback<A, R> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A, R> PartialEq for Callback<A, R> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<A, R> fmt::Debug for Callback<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

impl<A, R, F: Fn(A) -> R + 'static> From<F> for Callback<A, R> {
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Recomputes `compute` only when `deps` changed since the previous render
/// (always, when `deps` is `None`). Otherwise returns a clone of the cached
/// value; wrap the value in an `Rc` when identity matters.
pub fn use_memo<T: Clone + 'static>(compute: impl FnOnce() -> T, deps: impl Into<Option<Deps>>) -> T {
    memo_slot(compute, deps.into(), false)
}

fn memo_slot<T: Clone + 'static>(compute: impl FnOnce() -> T, deps: Option<Deps>, callable: bool) -> T {
    let ctx = current_context();

    let reserved = ctx.reserve::<T>(SlotKind::Memo);
    let index = match reserved {
        Reserved::Existing(i) => i,
        Reserved::Vacant(i) => {
            ctx.store.borrow_mut().fill(
                i,
                HookSlot::Memo(MemoSlot {
                    deps: None,
                    value: None,
                    type_name: std::any::type_name::<T>(),
                    callable,
                }),
            );
            i
        }
    };

    {
        let store = ctx.store.borrow();
        let Some(HookSlot::Memo(slot)) = store.get(index) else {
            unreachable!("reserve checked the slot kind");
        };
        if !deps_changed(deps.as_deref(), slot.deps.as_deref())
            && let Some(cached) = slot.value.as_ref().and_then(|v| v.downcast_ref::<T>())
        {
            return cached.clone();
        }
    }

    log::trace!("memo slot {index}: recomputing");
    let value = compute();

    if let Some(HookSlot::Memo(slot)) = ctx.store.borrow_mut().get_mut(index) {
        slot.deps = deps;
        slot.value = Some(Box::new(value.clone()));
    }
    value
}

/// Memoizes the callback itself: the same [`Callback`] is returned until
/// `deps` changes.
pub fn use_callback<A: 'static, R: 'static>(
    f: impl Fn(A) -> R + 'static,
    deps: impl Into<Option<Deps>>,
) -> Callback<A, R> {
    memo_slot(move || Callback::new(f), deps.into(), true)
}
