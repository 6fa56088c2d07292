//! # Hooks, Slots, and Roots
//!
//! Hookline lets a plain function keep state between calls. A component is a
//! zero-argument closure that is re-run on every render; everything it needs
//! to remember lives in hook slots owned by a [`Root`]:
//!
//! - `use_state` / `use_reducer` / `use_ref`: values that survive renders.
//! - `use_memo` / `use_callback`: values recomputed only when dependencies change.
//! - `use_effect`: side effects with cleanup, gated by dependencies.
//!
//! ## State
//!
//! ```rust
//! use hookline_core::*;
//!
//! struct Print;
//!
//! impl Renderer for Print {
//!     type Tree = String;
//!     type Target = Vec<String>;
//!
//!     fn draw(&mut self, component: &Component<String>, target: &mut Vec<String>) {
//!         target.push(component.render());
//!     }
//! }
//!
//! let clicks = std::rc::Rc::new(std::cell::RefCell::new(None));
//! let root = Root::new(Print);
//! root.render(
//!     {
//!         let clicks = clicks.clone();
//!         move || {
//!             let (count, set_count) = use_state(0);
//!             *clicks.borrow_mut() = Some(set_count);
//!             format!("count = {count}")
//!         }
//!     },
//!     Vec::new(),
//! );
//!
//! let set_count = clicks.borrow().clone().unwrap();
//! set_count.set(1);
//! set_count.set(1); // unchanged: no render
//! assert_eq!(
//!     root.with_target(|frames| frames.clone()).unwrap(),
//!     vec!["count = 0", "count = 1"],
//! );
//! ```
//!
//! - Hooks are order-based: the Nth hook call of a render always refers to
//!   the Nth slot. Never call hooks conditionally or in loops of varying
//!   length.
//! - A setter (and a reducer's dispatch, and a memoized callback) is the same
//!   handle on every render.
//!
//! ## Effects and cleanup
//!
//! ```rust
//! use hookline_core::*;
//!
//! fn ticker(interval: u32) {
//!     use_effect(
//!         move || {
//!             log::info!("start ticking every {interval}ms");
//!             on_cleanup(|| log::info!("stop ticking"))
//!         },
//!         deps![interval],
//!     );
//! }
//! ```
//!
//! - With a dependency list, an effect runs on the first render and then
//!   only when an entry changed. Without one (`None`), it runs every render.
//! - The previous cleanup always runs right before the next effect body.
//! - Effects run synchronously inside the render pass. A setter called from
//!   an effect does not re-enter the component; the root renders again once
//!   the current pass is over.

pub mod deps;
pub mod effects;
pub mod error;
pub mod memo;
pub mod prelude;
pub mod reducer;
pub mod render_api;
pub mod runtime;
pub mod slot;
pub mod state;
mod store;

pub use deps::*;
pub use effects::*;
pub use error::*;
pub use memo::*;
pub use reducer::*;
pub use render_api::*;
pub use runtime::{MismatchPolicy, PassStats, Root, RootOptions};
pub use slot::{SlotInfo, SlotKind};
pub use state::*;
