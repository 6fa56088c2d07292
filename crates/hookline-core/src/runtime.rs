use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use web_time::{Duration, Instant};

use crate::HookError;
use crate::render_api::{Component, Renderer};
use crate::slot::{HookSlot, SlotInfo, SlotKind};
use crate::store::{Reserved, SlotStore};

thread_local! {
    // Innermost root currently rendering on this thread is last.
    static CURRENT: RefCell<Vec<Rc<HookContext>>> = const { RefCell::new(Vec::new()) };
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct PassFlags: u8 {
        const RENDERING = 1 << 0;
        const RENDER_REQUESTED = 1 << 1;
    }
}

pub(crate) trait RenderScheduler {
    fn flush(&self);
}

/// Renderer-independent half of a root: the slot store and pass bookkeeping
/// that hooks and setters talk to.
pub(crate) struct HookContext {
    pub(crate) store: RefCell<SlotStore>,
    flags: Cell<PassFlags>,
    scheduler: Weak<dyn RenderScheduler>,
    label: String,
    passes: Cell<u64>,
    last_pass: Cell<Option<Duration>>,
}

impl HookContext {
    fn new(label: String, policy: MismatchPolicy, scheduler: Weak<dyn RenderScheduler>) -> Self {
        Self {
            store: RefCell::new(SlotStore::with_policy(policy)),
            flags: Cell::new(PassFlags::empty()),
            scheduler,
            label,
            passes: Cell::new(0),
            last_pass: Cell::new(None),
        }
    }

    /// Marks the root dirty. Outside of a pass this flushes right away;
    /// during one, the driver picks the request up once the pass unwinds.
    pub(crate) fn request_render(&self) {
        let flags = self.flags.get() | PassFlags::RENDER_REQUESTED;
        self.flags.set(flags);

        if flags.contains(PassFlags::RENDERING) {
            log::trace!("[{}] render requested mid-pass; deferred", self.label);
            return;
        }
        match self.scheduler.upgrade() {
            Some(scheduler) => scheduler.flush(),
            None => log::debug!("[{}] render requested after root was dropped", self.label),
        }
    }

    /// [`SlotStore::reserve`], plus running the cleanup of an effect slot
    /// that a mismatch displaced. The cleanup runs with the store released.
    pub(crate) fn reserve<T: 'static>(&self, kind: SlotKind) -> Reserved {
        let (reserved, displaced) = {
            let mut store = self.store.borrow_mut();
            let reserved = store.reserve::<T>(kind);
            (reserved, store.take_displaced())
        };
        if let Some(cleanup) = displaced {
            cleanup.run();
        }
        reserved
    }

    fn take_request(&self) -> bool {
        let flags = self.flags.get();
        self.flags
            .set(flags.difference(PassFlags::RENDER_REQUESTED));
        flags.contains(PassFlags::RENDER_REQUESTED)
    }

    fn is_rendering(&self) -> bool {
        self.flags.get().contains(PassFlags::RENDERING)
    }
}

/// The context hooks resolve against. Panics outside of a render pass.
pub(crate) fn current_context() -> Rc<HookContext> {
    match CURRENT.with(|c| c.borrow().last().cloned()) {
        Some(ctx) => ctx,
        None => panic!("{}", HookError::NoActiveRender),
    }
}

/// Installs a context for the duration of one pass. Dropping it (also while
/// unwinding) resets the cursor and uninstalls the context.
struct PassGuard {
    ctx: Rc<HookContext>,
    started: Instant,
}

impl PassGuard {
    fn begin(ctx: &Rc<HookContext>) -> Self {
        ctx.store.borrow_mut().begin_pass();
        ctx.flags.set(ctx.flags.get() | PassFlags::RENDERING);
        CURRENT.with(|c| c.borrow_mut().push(ctx.clone()));
        log::trace!("[{}] pass {} begins", ctx.label, ctx.passes.get() + 1);

        PassGuard {
            ctx: ctx.clone(),
            started: Instant::now(),
        }
    }
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        let ctx = &self.ctx;
        CURRENT.with(|c| c.borrow_mut().pop());

        if let Ok(mut store) = ctx.store.try_borrow_mut()
            && let Some(used) = store.end_pass()
            && !std::thread::panicking()
        {
            log::warn!(
                "[{}] pass called {used} hooks but {} slots exist; \
                 hook order must not depend on branching",
                ctx.label,
                store.len()
            );
        }

        ctx.flags
            .set(ctx.flags.get().difference(PassFlags::RENDERING));
        ctx.passes.set(ctx.passes.get() + 1);
        ctx.last_pass.set(Some(self.started.elapsed()));
    }
}

/// What a root does when a hook finds a slot of another kind or type at its
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Panic with the [`HookError`].
    Panic,
    /// Log at `error` level, run the displaced effect's cleanup if any, and
    /// rebuild the slot for the new hook.
    Reset,
}

impl Default for MismatchPolicy {
    /// `Panic` in debug builds, `Reset` in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            MismatchPolicy::Panic
        } else {
            MismatchPolicy::Reset
        }
    }
}

/// Construction options for a [`Root`].
#[derive(Debug, Clone)]
pub struct RootOptions {
    /// Name used in log lines and stats.
    pub label: String,
    /// Panic with [`HookError::RenderLoop`] when one flush needs more than
    /// this many consecutive passes. `None` never gives up.
    pub pass_limit: Option<usize>,
    pub on_mismatch: MismatchPolicy,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            label: "root".to_string(),
            pass_limit: None,
            on_mismatch: MismatchPolicy::default(),
        }
    }
}

impl RootOptions {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn pass_limit(mut self, passes: usize) -> Self {
        self.pass_limit = Some(passes);
        self
    }

    pub fn on_mismatch(mut self, policy: MismatchPolicy) -> Self {
        self.on_mismatch = policy;
        self
    }
}

/// Counters describing a root, for tooling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PassStats {
    pub label: String,
    pub passes: u64,
    pub slots: usize,
    pub last_pass: Option<Duration>,
}

struct Binding<R: Renderer> {
    component: Component<R::Tree>,
    target: R::Target,
}

struct RootInner<R: Renderer> {
    hooks: Rc<HookContext>,
    renderer: RefCell<R>,
    binding: RefCell<Option<Binding<R>>>,
    // Set by `Root::render` mid-pass; swapped in before the next pass.
    pending: RefCell<Option<Binding<R>>>,
    pass_limit: Option<usize>,
}

impl<R: Renderer> RootInner<R> {
    fn run_pass(&self) {
        let mut binding = self.binding.borrow_mut();
        if let Some(next) = self.pending.borrow_mut().take() {
            log::debug!("[{}] applying deferred binding", self.hooks.label);
            *binding = Some(next);
        }
        let Some(bound) = binding.as_mut() else {
            log::debug!("[{}] nothing mounted; skipping pass", self.hooks.label);
            return;
        };
        let component = bound.component.clone();

        let _pass = PassGuard::begin(&self.hooks);
        self.renderer
            .borrow_mut()
            .draw(&component, &mut bound.target);
    }
}

impl<R: Renderer> RenderScheduler for RootInner<R> {
    fn flush(&self) {
        let mut passes = 0usize;
        while self.hooks.take_request() {
            passes += 1;
            if let Some(limit) = self.pass_limit
                && passes > limit
            {
                panic!(
                    "{}",
                    HookError::RenderLoop {
                        label: self.hooks.label.clone(),
                        passes: limit,
                    }
                );
            }
            self.run_pass();
        }
    }
}

/// A render context: one component bound to one target, with its own hook
/// slots and cursor. Any number of roots may coexist.
///
/// ```ignore
/// let root = Root::new(MyRenderer::default());
/// root.render(|| {
///     let (count, set_count) = use_state(0);
///     format!("count = {count}")
/// }, target);
/// ```
pub struct Root<R: Renderer + 'static> {
    inner: Rc<RootInner<R>>,
}

impl<R: Renderer + 'static> Root<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_options(renderer, RootOptions::default())
    }

    pub fn with_options(renderer: R, options: RootOptions) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<RootInner<R>>| {
            let scheduler: Weak<dyn RenderScheduler> = weak.clone();
            RootInner {
                hooks: Rc::new(HookContext::new(
                    options.label,
                    options.on_mismatch,
                    scheduler,
                )),
                renderer: RefCell::new(renderer),
                binding: RefCell::new(None),
                pending: RefCell::new(None),
                pass_limit: options.pass_limit,
            }
        });
        Self { inner }
    }

    /// Binds `component` to `target`, replacing any previous binding, and
    /// renders it. Returns once every re-render it caused has finished.
    ///
    /// Slots are kept across calls, so re-binding a different component that
    /// calls different hooks is a hook-order violation; `unmount` first.
    ///
    /// Called while this root is rendering (from one of its own effects),
    /// the new binding takes over once the current pass has finished.
    pub fn render(&self, component: impl Into<Component<R::Tree>>, target: R::Target) {
        let binding = Binding {
            component: component.into(),
            target,
        };
        let hooks = &self.inner.hooks;
        if hooks.is_rendering() {
            log::debug!("[{}] rebound mid-pass; deferred", hooks.label);
            *self.inner.pending.borrow_mut() = Some(binding);
        } else {
            *self.inner.binding.borrow_mut() = Some(binding);
            log::debug!("[{}] mounted", hooks.label);
        }
        hooks.request_render();
    }

    /// Runs every pending effect cleanup in slot order, drops all slots and
    /// the binding, and hands the target back.
    pub fn unmount(&self) -> Option<R::Target> {
        let hooks = &self.inner.hooks;
        if hooks.is_rendering() {
            log::error!("[{}] unmount called during a pass; ignoring", hooks.label);
            return None;
        }

        let slots = hooks.store.borrow_mut().drain();
        for slot in slots {
            if let HookSlot::Effect(effect) = slot
                && let Some(cleanup) = effect.cleanup
            {
                cleanup.run();
            }
        }
        hooks.take_request();
        self.inner.pending.borrow_mut().take();
        log::debug!("[{}] unmounted", hooks.label);
        self.inner.binding.borrow_mut().take().map(|b| b.target)
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.binding.borrow().is_some()
    }

    pub fn with_renderer<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.inner.renderer.borrow())
    }

    pub fn with_target<T>(&self, f: impl FnOnce(&R::Target) -> T) -> Option<T> {
        self.inner.binding.borrow().as_ref().map(|b| f(&b.target))
    }

    pub fn snapshot(&self) -> Vec<SlotInfo> {
        self.inner.hooks.store.borrow().snapshot()
    }

    pub fn stats(&self) -> PassStats {
        let hooks = &self.inner.hooks;
        PassStats {
            label: hooks.label.clone(),
            passes: hooks.passes.get(),
            slots: hooks.store.borrow().len(),
            last_pass: hooks.last_pass.get(),
        }
    }
}

impl<R: Renderer + 'static> Drop for Root<R> {
    fn drop(&mut self) {
        if !self.inner.hooks.is_rendering() && self.is_mounted() {
            log::debug!("[{}] dropped while mounted", self.inner.hooks.label);
            self.unmount();
        }
    }
}
