//! Scene lifecycle interface
//!
//! [`Stage`] is what the app drives. Every [`Scene`](crate::Scene) implements
//! it, whatever its state type, so one app can hold scenes with different
//! state.

/// Handle passed to lifecycle hooks
///
/// Gives access to the shared renderer and a read-only view of the app's
/// state machine. Hooks cannot reach the app directly; an update hook asks
/// for a scene change with [`Context::request_transition`] and the app
/// performs it once the hook returns.
pub struct Context<'r, R> {
    renderer: &'r mut R,
    active: Option<usize>,
    capacity: usize,
    requested: Option<usize>,
}

impl<'r, R> Context<'r, R> {
    /// Create a context for one lifecycle call
    pub fn new(renderer: &'r mut R, active: Option<usize>, capacity: usize) -> Self {
        Self {
            renderer,
            active,
            capacity,
            requested: None,
        }
    }

    /// The shared renderer
    pub fn renderer(&mut self) -> &mut R {
        self.renderer
    }

    /// Index of the active scene at the time of the call
    pub fn active_scene(&self) -> Option<usize> {
        self.active
    }

    /// Number of scene slots in the app
    pub fn scene_capacity(&self) -> usize {
        self.capacity
    }

    /// Ask the app to transition to `target` after this hook returns
    ///
    /// Only honoured from update hooks. A later request replaces an earlier one.
    pub fn request_transition(&mut self, target: usize) {
        self.requested = Some(target);
    }

    /// The pending transition request, if any
    pub fn requested_transition(&self) -> Option<usize> {
        self.requested
    }

    pub(crate) fn take_request(&mut self) -> Option<usize> {
        self.requested.take()
    }
}

/// A screen the app can enter, update, draw and exit
pub trait Stage<R> {
    /// Run the setup hook
    fn on_enter(&mut self, ctx: &mut Context<'_, R>);

    /// Run the per-frame update hook
    fn on_update(&mut self, ctx: &mut Context<'_, R>);

    /// Run the teardown hook, then drop every layer
    fn on_exit(&mut self, ctx: &mut Context<'_, R>);

    /// Invoke every layer in registration order
    fn draw(&mut self, renderer: &mut R);

    /// Number of registered layers
    fn layer_count(&self) -> usize;
}
