use std::rc::Rc;

/// A zero-argument rendering function.
///
/// It may call hooks, provided it calls the same hooks in the same order on
/// every render.
pub struct Component<T>(Rc<dyn Fn() -> T>);

impl<T> Component<T> {
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn render(&self) -> T {
        (self.0)()
    }
}

impl<T> Clone for Component<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T, F: Fn() -> T + 'static> From<F> for Component<T> {
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Draws a component's output into a target.
///
/// `draw` must call [`Component::render`] exactly once per call and must be
/// safe to call repeatedly with the same target.
pub trait Renderer {
    type Tree: 'static;
    type Target: 'static;

    fn draw(&mut self, component: &Component<Self::Tree>, target: &mut Self::Target);
}
