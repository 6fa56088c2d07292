use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::current_context;
use crate::slot::{EffectSlot, HookSlot, SlotKind};
use crate::store::Reserved;
use crate::{Deps, deps_changed};

/// Cleanup handle returned from an effect body.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0.borrow().is_some()
    }
}

impl PartialEq for Dispose {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Helper to register cleanup inside an effect.
pub fn on_cleanup(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

/// What an effect body may return.
pub trait IntoCleanup {
    fn into_cleanup(self) -> Option<Dispose>;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Option<Dispose> {
        None
    }
}

impl IntoCleanup for Dispose {
    fn into_cleanup(self) -> Option<Dispose> {
        Some(self)
    }
}

impl IntoCleanup for Option<Dispose> {
    fn into_cleanup(self) -> Option<Dispose> {
        self
    }
}

/// Runs `effect` during the current render when `deps` changed since the
/// previous render, or on every render when `deps` is `None`.
///
/// The previous run's cleanup is invoked right before the effect body. Both
/// run synchronously, inside the render pass.
///
/// ```ignore
/// use_effect(
///     move || {
///         log::info!("count is {count}");
///         on_cleanup(|| log::info!("leaving"))
///     },
///     deps![count],
/// );
/// ```
pub fn use_effect<C: IntoCleanup>(effect: impl FnOnce() -> C, deps: impl Into<Option<Deps>>) {
    let ctx = current_context();
    let deps = deps.into();

    let reserved = ctx.reserve::<()>(SlotKind::Effect);
    let index = match reserved {
        Reserved::Existing(i) => i,
        Reserved::Vacant(i) => {
            ctx.store
                .borrow_mut()
                .fill(i, HookSlot::Effect(EffectSlot::default()));
            i
        }
    };

    let previous_cleanup = {
        let mut store = ctx.store.borrow_mut();
        let Some(HookSlot::Effect(slot)) = store.get_mut(index) else {
            unreachable!("reserve checked the slot kind");
        };
        if !deps_changed(deps.as_deref(), slot.deps.as_deref()) {
            log::trace!("effect slot {index}: dependencies unchanged, skipping");
            return;
        }
        slot.cleanup.take()
    };

    // Neither call may hold the store: both are free to use setters.
    if let Some(cleanup) = previous_cleanup {
        cleanup.run();
    }
    let cleanup = effect().into_cleanup();

    let mut store = ctx.store.borrow_mut();
    if let Some(HookSlot::Effect(slot)) = store.get_mut(index) {
        slot.deps = deps;
        slot.cleanup = cleanup;
    }
}
