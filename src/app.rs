//! Frame driver - poll, update, render, present
//!
//! [`App`] owns the display, the canvas, the clock, the input source and the
//! [`Ui`]. Each frame it routes input, serves host requests, runs the update
//! pass, refreshes the frame-rate counter, repaints dirty components and
//! presents only the regions that changed.

use crate::canvas::Canvas;
use crate::component::ComponentId;
use crate::components::Label;
use crate::config::Config;
use crate::event::InputSource;
use crate::layout::Rect;
use crate::render::Display;
use crate::style::Style;
use crate::text::{Font, DEFAULT_FONT_SIZE};
use crate::tree::{HostRequest, Ui};
use anyhow::{anyhow, Context, Result};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// Frames averaged by [`FrameClock::fps`]
const FPS_SAMPLES: usize = 10;

/// A screenful of components, built on demand under the root
pub trait Scene {
    fn name(&self) -> &str;

    /// Add this scene's components under `ui.root()`
    fn build(&mut self, ui: &mut Ui) -> Result<()>;
}

/// Frame timing with an optional rate cap
pub struct FrameClock {
    frame_duration: Option<Duration>,
    last_frame: Instant,
    samples: VecDeque<Duration>,
}

impl FrameClock {
    /// Clock capped at `fps` frames per second, uncapped with `None`
    pub fn new(fps: Option<u32>) -> Self {
        FrameClock {
            frame_duration: fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_nanos(1_000_000_000 / fps as u64)),
            last_frame: Instant::now(),
            samples: VecDeque::with_capacity(FPS_SAMPLES),
        }
    }

    /// Time until next frame (zero if frame is due or uncapped)
    pub fn time_to_next_frame(&self) -> Duration {
        match self.frame_duration {
            Some(frame) => frame.saturating_sub(self.last_frame.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Wait out the cap, then return the time since the previous tick
    pub fn tick(&mut self) -> Duration {
        let wait = self.time_to_next_frame();
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }

        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;
        self.record(dt);
        dt
    }

    /// Add a frame duration to the average
    pub fn record(&mut self, dt: Duration) {
        if self.samples.len() == FPS_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(dt);
    }

    /// Average frame rate over the last few frames
    ///
    /// `None` before the first frame; infinite when frames take no
    /// measurable time.
    pub fn fps(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        if total.is_zero() {
            return Some(f64::INFINITY);
        }
        Some(self.samples.len() as f64 / total.as_secs_f64())
    }
}

/// Where the frame-rate counter sits on a surface of the given size
fn fps_rect(width: u32, height: u32) -> Rect {
    let (w, h) = (width as f32, height as f32);
    Rect::new(w - w / 5.0, 0.0, w / 5.0, h / 10.0)
}

/// The frame driver
pub struct App<D: Display, I: InputSource> {
    ui: Ui,
    display: D,
    input: I,
    canvas: Canvas,
    clock: FrameClock,
    scenes: Vec<Box<dyn Scene>>,
    current_scene: Option<usize>,
    fps_label: Option<ComponentId>,
    fps_text: String,
    running: bool,
    changed: Vec<Rect>,
}

impl<D: Display, I: InputSource> App<D, I> {
    /// Create the driver; the root covers the whole display
    pub fn new(display: D, input: I, config: &Config) -> Result<Self> {
        let (width, height) = display.size();

        let mut style = Style::default();
        if let Some(path) = &config.font {
            style = style.font(Font::load(path, DEFAULT_FONT_SIZE)?);
        }

        let mut ui = Ui::with_default_style(Rect::fullscreen(width, height), style);
        let fps_text = String::from("Calculating");
        let fps_label = config.show_fps.then(|| {
            let root = ui.root();
            ui.spawn(root, fps_rect(width, height), None, Label::new(fps_text.clone()))
        });

        Ok(App {
            ui,
            display,
            input,
            canvas: Canvas::new(width, height),
            clock: FrameClock::new(config.fps_cap),
            scenes: Vec::new(),
            current_scene: None,
            fps_label,
            fps_text,
            running: true,
            changed: Vec::new(),
        })
    }

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui {
        &mut self.ui
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The frame-rate counter, if shown
    pub fn fps_label(&self) -> Option<ComponentId> {
        self.fps_label
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Register a scene, returning its index
    pub fn add_scene(&mut self, scene: impl Scene + 'static) -> usize {
        self.scenes.push(Box::new(scene));
        self.scenes.len() - 1
    }

    pub fn current_scene(&self) -> Option<usize> {
        self.current_scene
    }

    /// Replace everything under the root with the scene at `index`
    ///
    /// The frame-rate counter survives the switch and stays on top.
    pub fn change_scene(&mut self, index: usize) -> Result<()> {
        let count = self.scenes.len();
        let scene = self
            .scenes
            .get_mut(index)
            .ok_or_else(|| anyhow!("no scene at index {} ({} registered)", index, count))?;

        let root = self.ui.root();
        if let Some(label) = self.fps_label {
            self.ui.remove_child(root, label);
        }
        self.ui.destroy_children(root);

        let built = scene
            .build(&mut self.ui)
            .with_context(|| format!("failed to build scene {}", scene.name()));

        // The counter comes back even over a half-built scene
        if let Some(label) = self.fps_label {
            self.ui.add_child(root, label);
        }
        self.ui.redraw(root);
        self.ui.set_invalid();

        match built {
            Ok(()) => {
                debug!(scene = scene.name(), index, "scene switched");
                self.current_scene = Some(index);
                Ok(())
            }
            Err(err) => {
                self.current_scene = None;
                Err(err)
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.display.resize(width, height)?;
        let (width, height) = self.display.size();
        debug!(width, height, "resized");

        self.canvas.resize(width, height);
        let root = self.ui.root();
        self.ui.set_rect(root, Rect::fullscreen(width, height));
        if let Some(label) = self.fps_label {
            self.ui.set_rect(label, fps_rect(width, height));
        }
        self.ui.redraw(root);
        self.ui.set_invalid();
        Ok(())
    }

    fn refresh_fps(&mut self) {
        let (Some(label), Some(fps)) = (self.fps_label, self.clock.fps()) else {
            return;
        };

        let text = if fps.is_finite() {
            (fps as u64).to_string()
        } else {
            String::from("Infinity")
        };
        if text != self.fps_text {
            self.ui.edit::<Label, _>(label, |label| label.set_text(text.clone()));
            self.fps_text = text;
        }
    }

    /// Run one frame timed by the clock
    ///
    /// Returns `false` once the application should stop.
    pub fn frame(&mut self) -> Result<bool> {
        let dt = self.clock.tick();
        self.step(dt)
    }

    /// Run one frame with an explicit time step
    pub fn step(&mut self, dt: Duration) -> Result<bool> {
        if !self.running {
            return Ok(false);
        }

        self.ui.poll_input(&mut self.input)?;

        for request in self.ui.take_requests() {
            match request {
                HostRequest::Quit => self.running = false,
                HostRequest::Resize(width, height) => self.resize(width, height)?,
                HostRequest::SwitchScene(index) => self.change_scene(index)?,
            }
        }
        if !self.running {
            return Ok(false);
        }

        self.ui.update(dt);
        self.refresh_fps();

        self.changed.clear();
        self.ui
            .render(&mut self.canvas, &mut self.changed)
            .context("render pass failed")?;
        self.display
            .present(&self.canvas, &self.changed)
            .context("failed to present frame")?;

        Ok(true)
    }

    /// Run frames until something requests quit
    pub fn run(&mut self) -> Result<()> {
        debug!("frame loop started");
        while self.frame()? {}
        debug!("frame loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Button, Panel};
    use crate::event::{Event, InputQueue, MouseButton};
    use crate::layout::Point;
    use crate::render::HeadlessDisplay;

    type TestApp = App<HeadlessDisplay, InputQueue>;

    fn app(show_fps: bool) -> TestApp {
        let config = Config::new().show_fps(show_fps).size(100, 50);
        App::new(HeadlessDisplay::from_config(&config), InputQueue::new(), &config).unwrap()
    }

    const DT: Duration = Duration::from_millis(16);

    /// Full-screen button switching to another scene
    struct Switcher {
        name: &'static str,
        target: usize,
    }

    impl Scene for Switcher {
        fn name(&self) -> &str {
            self.name
        }

        fn build(&mut self, ui: &mut Ui) -> Result<()> {
            let root = ui.root();
            let target = self.target;
            ui.spawn(
                root,
                Rect::new(0.0, 0.0, 100.0, 50.0),
                None,
                Button::new(self.name).on_click(move |cx, _| {
                    cx.request(HostRequest::SwitchScene(target));
                }),
            );
            Ok(())
        }
    }

    struct Broken;

    impl Scene for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn build(&mut self, _ui: &mut Ui) -> Result<()> {
            Err(anyhow!("missing asset"))
        }
    }

    #[test]
    fn test_only_changes_are_presented() {
        let mut app = app(false);

        assert!(app.step(DT).unwrap());
        // root background plus four border strips
        assert_eq!(app.display().frames().len(), 1);
        assert_eq!(app.display().frames()[0].len(), 5);

        assert!(app.step(DT).unwrap());
        assert_eq!(app.display().frames().len(), 1);

        let root = app.ui().root();
        let child = app
            .ui_mut()
            .spawn(root, Rect::new(10.0, 10.0, 10.0, 10.0), None, Panel::new());
        app.step(DT).unwrap();
        assert_eq!(app.display().frames().len(), 2);
        assert!(!app.ui().is_dirty(child));
    }

    #[test]
    fn test_close_stops_the_loop() {
        let mut app = app(false);
        app.input_mut().push(Event::Close);

        assert!(!app.step(DT).unwrap());
        assert!(!app.is_running());
        assert!(!app.step(DT).unwrap());
        assert!(app.display().frames().is_empty());
    }

    #[test]
    fn test_scene_switch_replaces_children() {
        let mut app = app(true);
        app.add_scene(Switcher { name: "menu", target: 1 });
        app.add_scene(Switcher { name: "game", target: 0 });
        app.change_scene(0).unwrap();

        let root = app.ui().root();
        let label = app.fps_label().unwrap();
        let menu_button = app.ui().children(root)[0];
        assert_eq!(app.ui().children(root), &[menu_button, label]);

        let center = Point::new(20.0, 25.0);
        app.input_mut().extend([
            Event::PointerMove(center),
            Event::PointerDown(MouseButton::Left, center),
            Event::PointerUp(MouseButton::Left, center),
        ]);
        app.step(DT).unwrap();

        assert_eq!(app.current_scene(), Some(1));
        assert!(!app.ui().contains(menu_button));
        let children = app.ui().children(root);
        assert_eq!(children.len(), 2);
        assert_eq!(children[1], label);
        assert_eq!(app.ui().widget::<Button>(children[0]).map(Button::text), Some("game"));
        assert_eq!(app.ui().router().focused(), None);
        assert_eq!(app.ui().router().hovered(), None);
        assert!(app.ui().router().is_invalid());
    }

    #[test]
    fn test_bad_scene_index_fails() {
        let mut app = app(false);
        assert!(app.change_scene(3).is_err());

        let index = app.add_scene(Broken);
        let err = app.change_scene(index).unwrap_err();
        assert!(err.to_string().contains("failed to build scene broken"));
    }

    #[test]
    fn test_failed_scene_keeps_fps_label() {
        let mut app = app(true);
        let menu = app.add_scene(Switcher { name: "menu", target: 0 });
        let broken = app.add_scene(Broken);
        app.change_scene(menu).unwrap();
        app.step(DT).unwrap();

        let root = app.ui().root();
        let label = app.fps_label().unwrap();
        assert!(app.change_scene(broken).is_err());

        assert_eq!(app.ui().parent(label), Some(root));
        assert_eq!(app.ui().children(root), &[label]);
        assert_eq!(app.current_scene(), None);
        assert!(app.ui().is_dirty(root));
        assert!(app.ui().router().is_invalid());
    }

    #[test]
    fn test_resize_request() {
        let mut app = app(true);
        app.input_mut().push(Event::Resize(200, 100));
        app.step(DT).unwrap();

        let root = app.ui().root();
        assert_eq!(app.display().size(), (200, 100));
        assert_eq!((app.canvas().width(), app.canvas().height()), (200, 100));
        assert_eq!(app.ui().rect(root), Some(Rect::new(0.0, 0.0, 200.0, 100.0)));
        assert_eq!(
            app.ui().rect(app.fps_label().unwrap()),
            Some(Rect::new(160.0, 0.0, 40.0, 10.0))
        );
    }

    #[test]
    fn test_fps_label_follows_clock() {
        let mut app = app(true);
        let label = app.fps_label().unwrap();

        app.step(DT).unwrap();
        assert_eq!(app.ui().widget::<Label>(label).map(Label::text), Some("Calculating"));

        app.frame().unwrap();
        let text = app.ui().widget::<Label>(label).map(|l| l.text().to_string()).unwrap();
        assert_ne!(text, "Calculating");
    }

    #[test]
    fn test_clock_average() {
        let mut clock = FrameClock::new(None);
        assert_eq!(clock.fps(), None);

        for _ in 0..20 {
            clock.record(Duration::from_millis(10));
        }
        let fps = clock.fps().unwrap();
        assert!((fps - 100.0).abs() < 1e-6);

        let mut clock = FrameClock::new(None);
        clock.record(Duration::ZERO);
        assert_eq!(clock.fps(), Some(f64::INFINITY));
    }

    #[test]
    fn test_clock_cap_waits() {
        let mut clock = FrameClock::new(Some(100));
        clock.tick();
        let dt = clock.tick();
        assert!(dt >= Duration::from_millis(10));
        assert_eq!(FrameClock::new(None).time_to_next_frame(), Duration::ZERO);
    }
}
