//! Scene state machine
//!
//! Each registered scene slot is a state. The app enters one scene on
//! [`App::start`], forwards per-frame updates and draws to it, and moves
//! between scenes with [`App::transition`] (exit current, then enter target).
//!
//! A transition to an empty or out-of-range slot still exits the current
//! scene and still records the target as active. The app is then degraded:
//! [`App::update`] reports the missing scene instead of drawing.

use core::fmt;

use vellum_display::{DisplayError, Surface};

use crate::stage::{Context, Stage};

/// App errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppError {
    /// Scene index beyond the app's capacity
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of scene slots
        capacity: usize,
    },
    /// No scene registered at this index
    NotRegistered {
        /// Requested index
        index: usize,
    },
    /// `update` called before `start` or after `shutdown`
    NoActiveScene,
    /// Flushing the frame failed
    Display(DisplayError),
}

impl From<DisplayError> for AppError {
    fn from(err: DisplayError) -> Self {
        AppError::Display(err)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::IndexOutOfRange { index, capacity } => {
                write!(f, "scene {} is outside capacity {}", index, capacity)
            }
            AppError::NotRegistered { index } => write!(f, "scene {} is not registered", index),
            AppError::NoActiveScene => f.write_str("no active scene"),
            AppError::Display(err) => write!(f, "display: {}", err),
        }
    }
}

/// Registry of scenes plus the index of the active one
///
/// Scenes are borrowed, not owned, and must outlive the app. `R` is the
/// renderer shared by every scene; it is passed into each call rather than
/// stored.
///
/// Dropping the app does not exit the active scene (no renderer is available
/// at that point); call [`App::shutdown`] for an orderly exit.
pub struct App<'a, R, const SCENES: usize> {
    scenes: [Option<&'a mut dyn Stage<R>>; SCENES],
    active: Option<usize>,
}

impl<'a, R, const SCENES: usize> Default for App<'a, R, SCENES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, R, const SCENES: usize> App<'a, R, SCENES> {
    /// Create an app with every slot empty and no active scene
    pub fn new() -> Self {
        info!("Setting up app (scene capacity: {})", SCENES);
        Self {
            scenes: core::array::from_fn(|_| None),
            active: None,
        }
    }

    /// Put a scene into slot `index`
    ///
    /// Replaces any previous occupant without running its lifecycle hooks.
    pub fn register_scene(
        &mut self,
        scene: &'a mut dyn Stage<R>,
        index: usize,
    ) -> Result<(), AppError> {
        let Some(slot) = self.scenes.get_mut(index) else {
            warn!(
                "Tried to register a scene outside of capacity ({}/{})",
                index, SCENES
            );
            return Err(AppError::IndexOutOfRange {
                index,
                capacity: SCENES,
            });
        };

        *slot = Some(scene);
        info!("Registered scene at index {}", index);
        Ok(())
    }

    /// Enter the initial scene
    ///
    /// The index becomes active even if the slot is empty; the error is
    /// reported and the app is left degraded.
    pub fn start(&mut self, renderer: &mut R, index: usize) -> Result<(), AppError> {
        self.active = Some(index);
        self.enter(renderer, index).map_err(|err| {
            warn!("Scene {} not registered, couldn't start", index);
            err
        })
    }

    /// Run the active scene's update hook, then draw it
    ///
    /// A transition requested by the update hook is applied before drawing,
    /// so the frame shows the new scene.
    pub fn update(&mut self, renderer: &mut R) -> Result<(), AppError> {
        let index = self.active.ok_or(AppError::NoActiveScene)?;

        let requested = {
            let scene = self.slot_mut(index)?;
            let mut ctx = Context::new(renderer, Some(index), SCENES);
            scene.on_update(&mut ctx);
            ctx.take_request()
        };

        if let Some(target) = requested {
            self.transition(renderer, target)?;
        }

        let index = self.active.ok_or(AppError::NoActiveScene)?;
        self.slot_mut(index)?.draw(renderer);
        Ok(())
    }

    /// Exit the active scene, then enter `target`
    ///
    /// The active index changes only after the exit has completed. An
    /// invalid target is still recorded as active and reported as an error.
    pub fn transition(&mut self, renderer: &mut R, target: usize) -> Result<(), AppError> {
        info!(
            "Scene transition {:?} -> {} (max: {})",
            self.active, target, SCENES
        );

        self.exit_active(renderer);
        self.active = Some(target);
        self.enter(renderer, target).map_err(|err| {
            warn!("Scene {} not registered, couldn't transition", target);
            err
        })
    }

    /// Exit the active scene and return to the "no active scene" state
    pub fn shutdown(&mut self, renderer: &mut R) {
        self.exit_active(renderer);
        self.active = None;
    }

    /// Index of the active scene
    pub fn scene(&self) -> Option<usize> {
        self.active
    }

    /// The scene in slot `index`, if any
    pub fn get_scene(&self, index: usize) -> Option<&(dyn Stage<R> + 'a)> {
        self.scenes.get(index).and_then(|slot| slot.as_deref())
    }

    /// Mutable access to the scene in slot `index`, if any
    pub fn get_scene_mut(&mut self, index: usize) -> Option<&mut (dyn Stage<R> + 'a)> {
        self.scenes.get_mut(index).and_then(|slot| slot.as_deref_mut())
    }

    /// Number of scene slots
    pub const fn capacity(&self) -> usize {
        SCENES
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut (dyn Stage<R> + 'a), AppError> {
        match self.scenes.get_mut(index) {
            Some(slot) => slot
                .as_deref_mut()
                .ok_or(AppError::NotRegistered { index }),
            None => Err(AppError::IndexOutOfRange {
                index,
                capacity: SCENES,
            }),
        }
    }

    fn enter(&mut self, renderer: &mut R, index: usize) -> Result<(), AppError> {
        let scene = self.slot_mut(index)?;
        let mut ctx = Context::new(renderer, Some(index), SCENES);
        scene.on_enter(&mut ctx);
        if ctx.take_request().is_some() {
            warn!("Transition requested from setup of scene {} ignored", index);
        }
        Ok(())
    }

    fn exit_active(&mut self, renderer: &mut R) {
        let Some(index) = self.active else {
            return;
        };

        match self.slot_mut(index) {
            Ok(scene) => {
                let mut ctx = Context::new(renderer, Some(index), SCENES);
                scene.on_exit(&mut ctx);
                if ctx.take_request().is_some() {
                    warn!("Transition requested from teardown of scene {} ignored", index);
                }
            }
            Err(_) => warn!("Active scene {} not registered, nothing to exit", index),
        }
    }
}

impl<'a, R: Surface, const SCENES: usize> App<'a, R, SCENES> {
    /// Run one frame inside a write transaction
    ///
    /// Opens a transaction, runs [`App::update`], then closes the transaction,
    /// which flushes the renderer exactly once. The flush happens even if the
    /// update fails; the update error takes precedence.
    pub fn frame(&mut self, renderer: &mut R) -> Result<(), AppError> {
        renderer.start_write();
        let result = self.update(renderer);
        let flushed = renderer.end_write();
        result?;
        flushed.map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use alloc::vec::Vec;

    /// Lifecycle events tagged with the scene name
    type Log = Vec<(&'static str, &'static str)>;
    type TestScene = Scene<Log, &'static str>;

    fn setup(ctx: &mut Context<'_, Log>, scene: &mut TestScene) {
        let name = *scene.state();
        ctx.renderer().push(("setup", name));
        scene
            .register_layer(|log: &mut Log, name: &mut &'static str| log.push(("draw", *name)))
            .unwrap();
    }

    fn update(ctx: &mut Context<'_, Log>, scene: &mut TestScene) {
        ctx.renderer().push(("update", *scene.state()));
    }

    fn teardown(ctx: &mut Context<'_, Log>, scene: &mut TestScene) {
        assert_eq!(scene.len(), 1, "layers are cleared after teardown");
        assert_eq!(ctx.active_scene(), Some(0));
        ctx.renderer().push(("teardown", *scene.state()));
    }

    fn scene(name: &'static str) -> TestScene {
        Scene::new(name)
            .with_setup(setup)
            .with_update(update)
            .with_teardown(teardown)
    }

    fn jump_to_one(ctx: &mut Context<'_, Log>, _: &mut TestScene) {
        ctx.request_transition(1);
    }

    #[test]
    fn test_start_enters_only_initial_scene() {
        let mut menu = scene("menu");
        let mut game = scene("game");
        let mut log = Log::new();

        let mut app: App<Log, 2> = App::new();
        app.register_scene(&mut menu, 0).unwrap();
        app.register_scene(&mut game, 1).unwrap();
        app.start(&mut log, 0).unwrap();

        assert_eq!(app.scene(), Some(0));
        assert_eq!(log, [("setup", "menu")]);
    }

    #[test]
    fn test_register_rejects_out_of_range() {
        let mut menu = scene("menu");
        let mut app: App<Log, 2> = App::new();
        assert_eq!(
            app.register_scene(&mut menu, 2),
            Err(AppError::IndexOutOfRange {
                index: 2,
                capacity: 2
            })
        );
        assert!(app.get_scene(0).is_none());
    }

    #[test]
    fn test_register_overwrites_silently() {
        let mut first = scene("first");
        let mut second = scene("second");
        let mut log = Log::new();

        let mut app: App<Log, 1> = App::new();
        app.register_scene(&mut first, 0).unwrap();
        app.register_scene(&mut second, 0).unwrap();
        app.start(&mut log, 0).unwrap();

        assert_eq!(log, [("setup", "second")]);
    }

    #[test]
    fn test_update_runs_hook_then_draws() {
        let mut menu = scene("menu");
        let mut log = Log::new();

        let mut app: App<Log, 1> = App::new();
        app.register_scene(&mut menu, 0).unwrap();
        app.start(&mut log, 0).unwrap();
        log.clear();

        app.update(&mut log).unwrap();
        app.update(&mut log).unwrap();
        assert_eq!(
            log,
            [
                ("update", "menu"),
                ("draw", "menu"),
                ("update", "menu"),
                ("draw", "menu")
            ]
        );
    }

    #[test]
    fn test_transition_order() {
        let mut menu = scene("menu");
        let mut game = scene("game");
        let mut log = Log::new();

        {
            let mut app: App<Log, 2> = App::new();
            app.register_scene(&mut menu, 0).unwrap();
            app.register_scene(&mut game, 1).unwrap();
            app.start(&mut log, 0).unwrap();
            app.transition(&mut log, 1).unwrap();

            assert_eq!(app.scene(), Some(1));
            assert_eq!(app.get_scene(0).map(|s| s.layer_count()), Some(0));
            assert_eq!(app.get_scene(1).map(|s| s.layer_count()), Some(1));
        }

        assert_eq!(
            log,
            [
                ("setup", "menu"),
                ("teardown", "menu"),
                ("setup", "game")
            ]
        );
        assert!(menu.is_empty());
    }

    #[test]
    fn test_transition_to_missing_scene_degrades() {
        let mut menu = scene("menu");
        let mut log = Log::new();

        let mut app: App<Log, 3> = App::new();
        app.register_scene(&mut menu, 0).unwrap();
        app.start(&mut log, 0).unwrap();

        assert_eq!(
            app.transition(&mut log, 2),
            Err(AppError::NotRegistered { index: 2 })
        );
        assert_eq!(app.scene(), Some(2));
        assert_eq!(log, [("setup", "menu"), ("teardown", "menu")]);
        assert_eq!(app.update(&mut log), Err(AppError::NotRegistered { index: 2 }));
    }

    #[test]
    fn test_transition_out_of_range_keeps_target() {
        let mut menu = scene("menu");
        let mut log = Log::new();

        let mut app: App<Log, 1> = App::new();
        app.register_scene(&mut menu, 0).unwrap();
        app.start(&mut log, 0).unwrap();

        assert_eq!(
            app.transition(&mut log, 7),
            Err(AppError::IndexOutOfRange {
                index: 7,
                capacity: 1
            })
        );
        assert_eq!(app.scene(), Some(7));
        assert!(menu_exited(&log));
    }

    fn menu_exited(log: &Log) -> bool {
        log.contains(&("teardown", "menu"))
    }

    #[test]
    fn test_start_unregistered_is_reported() {
        let mut log = Log::new();
        let mut app: App<Log, 2> = App::new();
        assert_eq!(
            app.start(&mut log, 1),
            Err(AppError::NotRegistered { index: 1 })
        );
        assert_eq!(app.scene(), Some(1));
        assert!(log.is_empty());
    }

    #[test]
    fn test_update_before_start_fails() {
        let mut log = Log::new();
        let mut app: App<Log, 2> = App::new();
        assert_eq!(app.update(&mut log), Err(AppError::NoActiveScene));
    }

    #[test]
    fn test_update_hook_can_request_transition() {
        let mut menu = scene("menu").with_update(jump_to_one);
        let mut game = scene("game");
        let mut log = Log::new();

        let mut app: App<Log, 2> = App::new();
        app.register_scene(&mut menu, 0).unwrap();
        app.register_scene(&mut game, 1).unwrap();
        app.start(&mut log, 0).unwrap();
        app.update(&mut log).unwrap();

        assert_eq!(app.scene(), Some(1));
        assert_eq!(
            log,
            [
                ("setup", "menu"),
                ("teardown", "menu"),
                ("setup", "game"),
                ("draw", "game")
            ]
        );
    }

    #[test]
    fn test_shutdown_exits_active_scene() {
        let mut menu = scene("menu");
        let mut log = Log::new();

        let mut app: App<Log, 1> = App::new();
        app.register_scene(&mut menu, 0).unwrap();
        app.start(&mut log, 0).unwrap();
        app.shutdown(&mut log);

        assert_eq!(app.scene(), None);
        assert_eq!(log, [("setup", "menu"), ("teardown", "menu")]);
        assert_eq!(app.update(&mut log), Err(AppError::NoActiveScene));
    }

    mod frame {
        use super::*;
        use embedded_graphics::pixelcolor::Rgb565;
        use embedded_graphics::prelude::*;
        use vellum_display::{Canvas16, Device, Renderer, Rotation};

        #[derive(Default)]
        struct Panel {
            blits: usize,
            dead: bool,
        }

        impl Device for Panel {
            fn width(&self) -> u16 {
                32
            }

            fn height(&self) -> u16 {
                16
            }

            fn rotation(&self) -> Rotation {
                Rotation::Deg0
            }

            fn set_rotation(&mut self, _: Rotation) -> Result<(), DisplayError> {
                Ok(())
            }

            fn invert_display(&mut self, _: bool) -> Result<(), DisplayError> {
                Ok(())
            }

            fn blit(
                &mut self,
                _: i16,
                _: i16,
                _: &[u16],
                _: u16,
                _: u16,
            ) -> Result<(), DisplayError> {
                self.blits += 1;
                if self.dead {
                    return Err(DisplayError::Communication);
                }
                Ok(())
            }
        }

        type Screen = Renderer<Panel, Canvas16>;

        fn paint(_: &mut Context<'_, Screen>, scene: &mut Scene<Screen, ()>) {
            scene
                .register_layer(|screen: &mut Screen, _: &mut ()| screen.fill_screen(Rgb565::RED))
                .unwrap();
            scene
                .register_layer(|screen: &mut Screen, _: &mut ()| {
                    screen.fill_rect(0, 0, 4, 4, Rgb565::BLUE)
                })
                .unwrap();
        }

        #[test]
        fn test_frame_flushes_once() {
            let mut screen: Screen = Renderer::new(Panel::default());
            let mut title = Scene::new(()).with_setup(paint);

            let mut app: App<Screen, 1> = App::new();
            app.register_scene(&mut title, 0).unwrap();
            app.start(&mut screen, 0).unwrap();
            assert_eq!(screen.device().blits, 0);

            app.frame(&mut screen).unwrap();
            assert_eq!(screen.device().blits, 1);
            assert!(!screen.in_transaction());
            assert_eq!(screen.canvas().pixel(0, 0), Some(Rgb565::BLUE));
            assert_eq!(screen.canvas().pixel(10, 10), Some(Rgb565::RED));
        }

        #[test]
        fn test_frame_without_scene_still_closes_transaction() {
            let mut screen: Screen = Renderer::new(Panel::default());
            let mut app: App<Screen, 1> = App::new();

            assert_eq!(app.frame(&mut screen), Err(AppError::NoActiveScene));
            assert!(!screen.in_transaction());
            assert_eq!(screen.device().blits, 1);
            assert_eq!(screen.canvas().size(), Size::new(32, 16));
        }

        #[test]
        fn test_frame_reports_update_error_over_flush_error() {
            let mut screen: Screen = Renderer::new(Panel {
                blits: 0,
                dead: true,
            });
            let mut app: App<Screen, 1> = App::new();

            assert_eq!(app.frame(&mut screen), Err(AppError::NoActiveScene));
            assert_eq!(screen.device().blits, 1);
            assert!(!screen.in_transaction());
        }

        #[test]
        fn test_frame_reports_flush_error() {
            let mut screen: Screen = Renderer::new(Panel {
                blits: 0,
                dead: true,
            });
            let mut title = Scene::new(()).with_setup(paint);

            let mut app: App<Screen, 1> = App::new();
            app.register_scene(&mut title, 0).unwrap();
            app.start(&mut screen, 0).unwrap();

            assert_eq!(
                app.frame(&mut screen),
                Err(AppError::Display(DisplayError::Communication))
            );
        }
    }
}
