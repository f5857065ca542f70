// src/engine_lib/main_loop.rs

use std::cell::Cell;
use std::rc::Rc;

use crate::engine_lib::clock::{Clock, FrameTime};

/// Per-frame callbacks driven by [`MainLoop::tick`].
///
/// `update` receives the single timestamp of the frame and must push it into
/// every time-dependent uniform before `render` runs.
pub trait FrameHandler {
    type Error;

    fn update(&mut self, frame: &FrameTime);
    fn render(&mut self, frame: &FrameTime) -> Result<(), Self::Error>;
}

/// Cloneable stop request. Single-threaded: the loop and whoever holds the
/// handle live on the render thread.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.set(true);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.get()
    }
}

/// Explicit scheduler for the per-frame Clock -> update -> render sequence.
///
/// The host (a winit event loop, a test) calls `tick` once per display
/// refresh. Nothing is scheduled implicitly, so teardown is deterministic:
/// after `stop` or a stop request every further `tick` is a no-op.
#[derive(Debug, Default)]
pub struct MainLoop {
    clock: Clock,
    running: bool,
    stop: StopHandle,
}

impl MainLoop {
    pub fn new() -> Self {
        Self::with_clock(Clock::new())
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            running: false,
            stop: StopHandle::default(),
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            log::info!("main loop started");
        }
        self.running = true;
        self.stop.0.set(false);
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("main loop stopped at t={:.3}s", self.clock.elapsed());
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.stop.is_stop_requested()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Runs one frame. Returns `Ok(None)` when the loop is not running.
    pub fn tick<H: FrameHandler>(
        &mut self,
        dt: f32,
        handler: &mut H,
    ) -> Result<Option<FrameTime>, H::Error> {
        if self.stop.is_stop_requested() {
            self.stop();
        }
        if !self.running {
            return Ok(None);
        }

        // One clock read per frame.
        let frame = self.clock.advance(dt);
        handler.update(&frame);
        handler.render(&frame)?;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        updates: Vec<f32>,
        renders: Vec<f32>,
        fail_render: bool,
    }

    impl FrameHandler for Recorder {
        type Error = String;

        fn update(&mut self, frame: &FrameTime) {
            self.updates.push(frame.elapsed);
        }

        fn render(&mut self, frame: &FrameTime) -> Result<(), String> {
            if self.fail_render {
                return Err("surface lost".to_string());
            }
            self.renders.push(frame.elapsed);
            Ok(())
        }
    }

    #[test]
    fn tick_is_a_no_op_until_started() {
        let mut main_loop = MainLoop::new();
        let mut recorder = Recorder::default();
        assert_eq!(main_loop.tick(0.016, &mut recorder), Ok(None));
        assert!(recorder.updates.is_empty());
        assert_eq!(main_loop.clock().elapsed(), 0.0);
    }

    #[test]
    fn update_and_render_see_the_same_timestamp() {
        let mut main_loop = MainLoop::new();
        main_loop.start();
        let mut recorder = Recorder::default();
        for _ in 0..3 {
            main_loop.tick(0.1, &mut recorder).unwrap();
        }
        assert_eq!(recorder.updates, recorder.renders);
        assert!((recorder.updates[2] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn stop_handle_halts_the_next_tick() {
        let mut main_loop = MainLoop::new();
        main_loop.start();
        let handle = main_loop.stop_handle();
        let mut recorder = Recorder::default();
        main_loop.tick(0.1, &mut recorder).unwrap();
        handle.request_stop();
        assert!(!main_loop.is_running());
        assert_eq!(main_loop.tick(0.1, &mut recorder), Ok(None));
        assert_eq!(recorder.renders.len(), 1);

        main_loop.start();
        assert!(main_loop.tick(0.1, &mut recorder).unwrap().is_some());
    }

    #[test]
    fn render_errors_propagate() {
        let mut main_loop = MainLoop::new();
        main_loop.start();
        let mut recorder = Recorder { fail_render: true, ..Default::default() };
        assert_eq!(main_loop.tick(0.1, &mut recorder), Err("surface lost".to_string()));
        assert_eq!(recorder.updates.len(), 1);
    }
}
