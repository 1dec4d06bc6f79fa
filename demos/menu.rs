//! keelson demo - a menu and a pair of Battleships boards in the terminal
//!
//! Set KEELSON_LOG to a file path to capture logs, KEELSON_BACKEND to force
//! `kitty` or `blocks`. Ctrl-C or Ctrl-Q quits.

use anyhow::{Context, Result};
use keelson::{
    App, Button, Color, Config, DrawContext, EventContext, EventPoller, FlowPanel, HostRequest,
    Label, MouseButton, Rect, Scene, Style, TerminalDisplay, Ui, Widget,
};
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const BOARD_SIZE: usize = 10;

struct Menu;

impl Scene for Menu {
    fn name(&self) -> &str {
        "menu"
    }

    fn build(&mut self, ui: &mut Ui) -> Result<()> {
        let root = ui.root();
        let bounds = ui.rect(root).context("root has no rectangle")?;
        let (w, h) = (bounds.width, bounds.height);

        let title_style = Style::new().borderless().primary(Color::rgb(20, 40, 120));
        ui.spawn(
            root,
            Rect::new(w / 4.0, h / 10.0, w / 2.0, h / 6.0),
            Some(title_style),
            Label::new("Battleships"),
        );

        let column = ui.spawn(
            root,
            Rect::new(w / 3.0, h / 3.0, w / 3.0, h / 2.0),
            Some(Style::new().background(None).borderless()),
            FlowPanel::vertical(true, false, true),
        );

        let button_size = Rect::new(0.0, 0.0, w / 3.0, h / 8.0);
        ui.spawn(
            column,
            button_size,
            None,
            Button::new("Play").on_click(|cx, _| cx.request(HostRequest::SwitchScene(1))),
        );
        ui.spawn(
            column,
            button_size,
            None,
            Button::new("Quit").on_click(|cx, _| cx.request(HostRequest::Quit)),
        );
        Ok(())
    }
}

/// Board cell: water until shot, then red for good
#[derive(Default)]
struct Target {
    shot: bool,
}

impl Widget for Target {
    fn name(&self) -> &str {
        "Target"
    }

    fn draw(&mut self, cx: &mut DrawContext<'_>) -> Result<()> {
        cx.paint_base();
        if cx.is_hovered() && !self.shot {
            let tint = cx.style().hover_tint;
            let rect = cx.rect();
            cx.tint(tint, rect);
        }
        Ok(())
    }

    fn on_click(&mut self, cx: &mut EventContext<'_>, _button: MouseButton) {
        if self.shot {
            return;
        }
        self.shot = true;
        let id = cx.id();
        let hit = Style::new().background(Color::rgb(200, 30, 30));
        cx.ui().set_style(id, Some(hit));
    }

    fn on_hover_enter(&mut self, cx: &mut EventContext<'_>) {
        cx.redraw();
    }

    fn on_hover_exit(&mut self, cx: &mut EventContext<'_>) {
        cx.redraw();
    }
}

struct Game;

impl Game {
    /// A square grid of cells that turn red when shot
    fn board(ui: &mut Ui, bounds: Rect) {
        let root = ui.root();
        let rows = ui.spawn(
            root,
            bounds,
            Some(Style::new().background(Color::rgb(30, 80, 160))),
            FlowPanel::vertical(true, true, false),
        );

        let cell = Rect::new(0.0, 0.0, 0.0, bounds.height / BOARD_SIZE as f32);
        for _ in 0..BOARD_SIZE {
            let row = ui.spawn(
                rows,
                cell,
                Some(Style::new().background(None).borderless()),
                FlowPanel::horizontal(true, true, false),
            );
            for _ in 0..BOARD_SIZE {
                let water = Style::new().background(Color::rgb(60, 120, 200));
                ui.spawn(row, cell, Some(water), Target::default());
            }
        }
    }
}

impl Scene for Game {
    fn name(&self) -> &str {
        "game"
    }

    fn build(&mut self, ui: &mut Ui) -> Result<()> {
        let root = ui.root();
        let bounds = ui.rect(root).context("root has no rectangle")?;
        let (w, h) = (bounds.width, bounds.height);
        let side = (w / 2.0 - w / 10.0).min(h * 0.7);

        Self::board(ui, Rect::new(w / 20.0, h / 8.0, side, side));
        Self::board(ui, Rect::new(w - w / 20.0 - side, h / 8.0, side, side));

        ui.spawn(
            root,
            Rect::new(w / 20.0, h - h / 8.0, w / 6.0, h / 10.0),
            None,
            Button::new("Back").on_click(|cx, _| cx.request(HostRequest::SwitchScene(0))),
        );
        Ok(())
    }
}

fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("KEELSON_LOG") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("failed to create log file {}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keelson=debug")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let config = Config::from_env()?;

    let display = TerminalDisplay::new(config.backend)?;
    let input = EventPoller::new(display.cell_size())?;

    let mut app = App::new(display, input, &config)?;
    app.add_scene(Menu);
    app.add_scene(Game);
    app.change_scene(0)?;
    app.run()?;

    drop(app);
    println!("keelson demo finished");
    Ok(())
}
