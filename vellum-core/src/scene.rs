//! Scenes: an ordered layer stack plus lifecycle hooks
//!
//! A scene owns a fixed-capacity list of layers (draw callbacks) and its
//! own typed state. Layers run in registration order every frame; the setup,
//! update and teardown hooks run when the app enters, updates and leaves
//! the scene.

use alloc::boxed::Box;
use core::fmt;

use crate::stage::{Context, Stage};

/// Layer capacity used when none is specified
pub const DEFAULT_LAYER_CAPACITY: usize = 3;

/// A draw callback invoked once per frame
///
/// Implemented for every `FnMut(&mut R, &mut S)` closure, so a layer can
/// capture whatever it needs besides the scene state.
pub trait Layer<R, S> {
    /// Issue drawing primitives against the renderer
    fn draw(&mut self, renderer: &mut R, state: &mut S);
}

impl<R, S, F> Layer<R, S> for F
where
    F: FnMut(&mut R, &mut S),
{
    fn draw(&mut self, renderer: &mut R, state: &mut S) {
        self(renderer, state)
    }
}

/// Identity of a registered layer, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerId(u32);

/// Scene errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SceneError {
    /// Every layer slot is occupied
    LayersFull {
        /// Fixed layer capacity of the scene
        capacity: usize,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::LayersFull { capacity } => {
                write!(f, "all {} layer slots are in use", capacity)
            }
        }
    }
}

/// Lifecycle hook: receives the call context and the scene itself
pub type Hook<R, S, const LAYERS: usize> = fn(&mut Context<'_, R>, &mut Scene<R, S, LAYERS>);

struct Entry<R, S> {
    id: LayerId,
    layer: Box<dyn Layer<R, S>>,
}

/// A screen with its own layer stack, lifecycle hooks and state
///
/// `R` is the renderer type layers draw through, `S` the scene state and
/// `LAYERS` the fixed layer capacity.
///
/// Dropping a scene releases its layers without running the teardown hook;
/// teardown only runs through [`Scene::on_exit`].
pub struct Scene<R, S, const LAYERS: usize = DEFAULT_LAYER_CAPACITY> {
    layers: heapless::Vec<Entry<R, S>, LAYERS>,
    next_id: u32,
    setup: Option<Hook<R, S, LAYERS>>,
    update: Option<Hook<R, S, LAYERS>>,
    teardown: Option<Hook<R, S, LAYERS>>,
    state: S,
}

impl<R, S: Default, const LAYERS: usize> Default for Scene<R, S, LAYERS> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<R, S, const LAYERS: usize> Scene<R, S, LAYERS> {
    /// Create a scene with no layers and no hooks
    pub fn new(state: S) -> Self {
        trace!("Init scene with {} layer slots", LAYERS);
        Self {
            layers: heapless::Vec::new(),
            next_id: 0,
            setup: None,
            update: None,
            teardown: None,
            state,
        }
    }

    /// Builder: set the setup hook
    pub fn with_setup(mut self, hook: Hook<R, S, LAYERS>) -> Self {
        self.setup = Some(hook);
        self
    }

    /// Builder: set the update hook
    pub fn with_update(mut self, hook: Hook<R, S, LAYERS>) -> Self {
        self.update = Some(hook);
        self
    }

    /// Builder: set the teardown hook
    pub fn with_teardown(mut self, hook: Hook<R, S, LAYERS>) -> Self {
        self.teardown = Some(hook);
        self
    }

    /// Replace or remove the setup hook
    pub fn set_setup(&mut self, hook: Option<Hook<R, S, LAYERS>>) {
        self.setup = hook;
    }

    /// Replace or remove the update hook
    pub fn set_update(&mut self, hook: Option<Hook<R, S, LAYERS>>) {
        self.update = hook;
    }

    /// Replace or remove the teardown hook
    pub fn set_teardown(&mut self, hook: Option<Hook<R, S, LAYERS>>) {
        self.teardown = hook;
    }

    /// Append a layer to the end of the draw order
    ///
    /// Fails without touching existing layers once all slots are taken.
    pub fn register_layer<L>(&mut self, layer: L) -> Result<LayerId, SceneError>
    where
        L: Layer<R, S> + 'static,
    {
        if self.layers.is_full() {
            warn!("Layer stack full ({}/{})", self.layers.len(), LAYERS);
            return Err(SceneError::LayersFull { capacity: LAYERS });
        }

        let id = LayerId(self.next_id);
        self.layers
            .push(Entry {
                id,
                layer: Box::new(layer),
            })
            .map_err(|_| SceneError::LayersFull { capacity: LAYERS })?;
        self.next_id = self.next_id.wrapping_add(1);

        info!("Registered layer {} ({}/{})", id, self.layers.len(), LAYERS);
        Ok(id)
    }

    /// Remove a layer, keeping the relative order of the rest
    ///
    /// Returns `false` if no such layer is registered.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        match self.layers.iter().position(|entry| entry.id == id) {
            Some(index) => {
                drop(self.layers.remove(index));
                trace!("Removed layer {} at {}", id, index);
                true
            }
            None => false,
        }
    }

    /// Remove every layer
    pub fn clear_layers(&mut self) {
        trace!("Cleared all {} layers", self.layers.len());
        self.layers.clear();
    }

    /// Whether a layer is currently registered
    pub fn contains_layer(&self, id: LayerId) -> bool {
        self.layers.iter().any(|entry| entry.id == id)
    }

    /// Registered layers in draw order
    pub fn layer_ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.iter().map(|entry| entry.id)
    }

    /// Invoke every layer in registration order
    ///
    /// Never flushes the renderer; whoever drives the frame does that.
    pub fn draw(&mut self, renderer: &mut R) {
        trace!("Scene draw ({} layers)", self.layers.len());
        for entry in self.layers.iter_mut() {
            entry.layer.draw(renderer, &mut self.state);
        }
    }

    /// Run the setup hook, if any
    pub fn on_enter(&mut self, ctx: &mut Context<'_, R>) {
        info!("Scene enter (setup: {})", self.setup.is_some());
        if let Some(setup) = self.setup {
            setup(ctx, self);
        }
    }

    /// Run the update hook, if any
    pub fn on_update(&mut self, ctx: &mut Context<'_, R>) {
        if let Some(update) = self.update {
            update(ctx, self);
        }
    }

    /// Run teardown, then clear every layer
    ///
    /// Teardown runs first so it can release anything the layers reference.
    pub fn on_exit(&mut self, ctx: &mut Context<'_, R>) {
        info!("Scene exit (teardown: {})", self.teardown.is_some());
        if let Some(teardown) = self.teardown {
            teardown(ctx, self);
        }
        self.clear_layers();
    }

    /// Number of registered layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer is registered
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Fixed layer capacity
    pub const fn capacity(&self) -> usize {
        LAYERS
    }

    /// Scene state shared by hooks and layers
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable scene state
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

impl<R, S, const LAYERS: usize> Stage<R> for Scene<R, S, LAYERS> {
    fn on_enter(&mut self, ctx: &mut Context<'_, R>) {
        Scene::on_enter(self, ctx)
    }

    fn on_update(&mut self, ctx: &mut Context<'_, R>) {
        Scene::on_update(self, ctx)
    }

    fn on_exit(&mut self, ctx: &mut Context<'_, R>) {
        Scene::on_exit(self, ctx)
    }

    fn draw(&mut self, renderer: &mut R) {
        Scene::draw(self, renderer)
    }

    fn layer_count(&self) -> usize {
        self.len()
    }
}
