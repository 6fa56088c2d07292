pub use crate::deps;
pub use crate::deps::{Dep, Deps};
pub use crate::effects::{Dispose, IntoCleanup, on_cleanup, use_effect};
pub use crate::memo::{Callback, use_callback, use_memo};
pub use crate::reducer::{Dispatch, use_reducer, use_reducer_with_init};
pub use crate::render_api::{Component, Renderer};
pub use crate::runtime::{MismatchPolicy, Root, RootOptions};
pub use crate::state::{MutableRef, Setter, use_ref, use_state, use_state_with};
