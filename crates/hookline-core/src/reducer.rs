use crate::memo::{Callback, use_callback};
use crate::state::use_state_with;

/// Sends an action to the reducer of a [`use_reducer`] slot.
pub type Dispatch<A> = Callback<A, ()>;

/// State driven by a reducer function.
///
/// `dispatch` is built once, on the first render, and is the same handle for
/// the lifetime of the component; so is the `reducer` it captured. A reducer
/// that cannot handle an action should panic: nothing catches it.
///
/// ```ignore
/// let (count, dispatch) = use_reducer(|n: &i32, step: i32| n + step, 0);
/// dispatch.call(1);
/// ```
pub fn use_reducer<S, A>(reducer: impl Fn(&S, A) -> S + 'static, initial: S) -> (S, Dispatch<A>)
where
    S: Clone + PartialEq + 'static,
    A: 'static,
{
    reducer_slots(reducer, move || initial)
}

/// Like [`use_reducer`], with the initial state computed as
/// `init(initial_arg)` on the first render.
pub fn use_reducer_with_init<S, I, A>(
    reducer: impl Fn(&S, A) -> S + 'static,
    initial_arg: I,
    init: impl FnOnce(I) -> S,
) -> (S, Dispatch<A>)
where
    S: Clone + PartialEq + 'static,
    A: 'static,
{
    reducer_slots(reducer, move || init(initial_arg))
}

fn reducer_slots<S, A>(
    reducer: impl Fn(&S, A) -> S + 'static,
    init: impl FnOnce() -> S,
) -> (S, Dispatch<A>)
where
    S: Clone + PartialEq + 'static,
    A: 'static,
{
    let (state, set_state) = use_state_with(init);
    let dispatch = use_callback(
        move |action: A| set_state.update(|previous| reducer(previous, action)),
        crate::deps![],
    );
    (state, dispatch)
}
