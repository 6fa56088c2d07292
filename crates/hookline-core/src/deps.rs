use std::any::Any;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

/// A dependency list. `None` in the hook APIs means "no list at all".
pub type Deps = SmallVec<[Dep; 4]>;

/// One entry of a dependency list, compared shallowly against the entry at
/// the same index on the previous render.
#[derive(Clone)]
pub struct Dep(Rc<dyn DepValue>);

trait DepValue: 'static {
    fn as_any(&self) -> &dyn Any;
    fn same(&self, other: &dyn DepValue) -> bool;
    fn describe(&self) -> String;
}

struct ByValue<T>(T);

impl<T: PartialEq + fmt::Debug + 'static> DepValue for ByValue<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn same(&self, other: &dyn DepValue) -> bool {
        other
            .as_any()
            .downcast_ref::<ByValue<T>>()
            .is_some_and(|o| o.0 == self.0)
    }

    fn describe(&self) -> String {
        format!("{:?}", self.0)
    }
}

struct ByIdentity {
    addr: *const (),
    // Keeps the allocation alive so the address cannot be reused.
    _keep: Box<dyn Any>,
    type_name: &'static str,
}

impl DepValue for ByIdentity {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn same(&self, other: &dyn DepValue) -> bool {
        other
            .as_any()
            .downcast_ref::<ByIdentity>()
            .is_some_and(|o| std::ptr::eq(o.addr, self.addr))
    }

    fn describe(&self) -> String {
        format!("&{} @ {:p}", self.type_name, self.addr)
    }
}

impl Dep {
    /// Compares by allocation identity instead of by value.
    pub fn identity<T: ?Sized + 'static>(rc: &Rc<T>) -> Self {
        Dep(Rc::new(ByIdentity {
            addr: Rc::as_ptr(rc).cast::<()>(),
            _keep: Box::new(rc.clone()),
            type_name: std::any::type_name::<T>(),
        }))
    }

    pub fn same(&self, other: &Dep) -> bool {
        self.0.same(&*other.0)
    }

    pub fn describe(&self) -> String {
        self.0.describe()
    }
}

impl<T: PartialEq + fmt::Debug + 'static> From<T> for Dep {
    fn from(value: T) -> Self {
        Dep(Rc::new(ByValue(value)))
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Builds a [`Deps`] list: `deps![count, name.clone()]`, or `deps![]` for
/// "run once".
#[macro_export]
macro_rules! deps {
    ($($dep:expr),* $(,)?) => {
        <$crate::Deps as ::core::iter::FromIterator<$crate::Dep>>::from_iter(
            [$($crate::Dep::from($dep)),*]
        )
    };
}

/// Whether the hook guarded by `current` should run again.
///
/// Always true on the first call (no previous list) and whenever the caller
/// passes no list. Lists of different length count as changed.
pub fn deps_changed(current: Option<&[Dep]>, previous: Option<&[Dep]>) -> bool {
    let (Some(current), Some(previous)) = (current, previous) else {
        return true;
    };
    current.len() != previous.len() || current.iter().zip(previous).any(|(c, p)| !c.same(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_always_changes() {
        let now = deps![1];
        assert!(deps_changed(Some(&now[..]), None));
        assert!(deps_changed(None, None));
    }

    #[test]
    fn missing_current_list_always_changes() {
        let prev = deps![1];
        assert!(deps_changed(None, Some(&prev[..])));
    }

    #[test]
    fn equal_values_do_not_change() {
        let prev = deps![1, "a", 2.5f64];
        let now = deps![1, "a", 2.5f64];
        assert!(!deps_changed(Some(&now[..]), Some(&prev[..])));
    }

    #[test]
    fn any_differing_entry_changes() {
        let prev = deps![1, 2];
        let now = deps![1, 3];
        assert!(deps_changed(Some(&now[..]), Some(&prev[..])));
    }

    #[test]
    fn length_mismatch_changes() {
        let prev = deps![1, 2];
        assert!(deps_changed(Some(&deps![1][..]), Some(&prev[..])));
        assert!(deps_changed(Some(&deps![1, 2, 3][..]), Some(&prev[..])));
    }

    #[test]
    fn empty_lists_never_change() {
        assert!(!deps_changed(Some(&deps![][..]), Some(&deps![][..])));
    }

    #[test]
    fn different_types_are_never_equal() {
        let prev = deps![1i32];
        let now = deps![1i64];
        assert!(deps_changed(Some(&now[..]), Some(&prev[..])));
    }

    #[test]
    fn identity_ignores_structural_equality() {
        let a = Rc::new(vec![1, 2, 3]);
        let b = Rc::new(vec![1, 2, 3]);

        let prev: Deps = [Dep::identity(&a)].into_iter().collect();
        let same: Deps = [Dep::identity(&a.clone())].into_iter().collect();
        let other: Deps = [Dep::identity(&b)].into_iter().collect();

        assert!(!deps_changed(Some(&same[..]), Some(&prev[..])));
        assert!(deps_changed(Some(&other[..]), Some(&prev[..])));
    }

    #[test]
    fn describe_uses_debug() {
        assert_eq!(Dep::from("x").describe(), "\"x\"");
        assert_eq!(format!("{:?}", Dep::from(7u8)), "7");
    }
}
