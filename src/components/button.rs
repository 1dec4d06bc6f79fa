//! Clickable text button

use crate::component::{DrawContext, EventContext, Widget};
use crate::components::Label;
use crate::event::MouseButton;
use anyhow::Result;

type ClickHandler = Box<dyn FnMut(&mut EventContext<'_>, MouseButton)>;

/// Label that reacts to clicks and is tinted while hovered
pub struct Button {
    label: Label,
    on_click: Option<ClickHandler>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Button {
            label: Label::new(text),
            on_click: None,
        }
    }

    /// Set the click handler
    pub fn on_click(mut self, handler: impl FnMut(&mut EventContext<'_>, MouseButton) + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    pub fn text(&self) -> &str {
        self.label.text()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.label.set_text(text);
    }
}

impl Widget for Button {
    fn name(&self) -> &str {
        "Button"
    }

    fn draw(&mut self, cx: &mut DrawContext<'_>) -> Result<()> {
        cx.paint_base();
        if cx.is_hovered() {
            let tint = cx.style().hover_tint;
            let rect = cx.rect();
            cx.tint(tint, rect);
        }
        self.label.draw_text(cx);
        Ok(())
    }

    fn on_click(&mut self, cx: &mut EventContext<'_>, button: MouseButton) {
        if let Some(handler) = self.on_click.as_mut() {
            handler(cx, button);
        }
    }

    fn on_hover_enter(&mut self, cx: &mut EventContext<'_>) {
        cx.redraw();
    }

    fn on_hover_exit(&mut self, cx: &mut EventContext<'_>) {
        cx.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::color::Color;
    use crate::event::Event;
    use crate::layout::{Point, Rect};
    use crate::style::Style;
    use crate::tree::{HostRequest, Ui};
    use std::cell::Cell;
    use std::rc::Rc;

    fn click_at(ui: &mut Ui, point: Point) {
        ui.dispatch(Event::PointerMove(point));
        ui.dispatch(Event::PointerDown(MouseButton::Left, point));
        ui.dispatch(Event::PointerUp(MouseButton::Left, point));
    }

    #[test]
    fn test_click_runs_handler() {
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();

        let mut ui = Ui::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let root = ui.root();
        ui.spawn(
            root,
            Rect::new(10.0, 10.0, 50.0, 20.0),
            None,
            Button::new("Quit").on_click(move |cx, _| {
                counter.set(counter.get() + 1);
                cx.request(HostRequest::Quit);
            }),
        );

        click_at(&mut ui, Point::new(20.0, 20.0));

        assert_eq!(clicks.get(), 1);
        assert_eq!(ui.take_requests(), vec![HostRequest::Quit]);
    }

    #[test]
    fn test_hover_tints_and_repaints() {
        let mut ui = Ui::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let root = ui.root();
        let button = ui.spawn(
            root,
            Rect::new(10.0, 10.0, 50.0, 20.0),
            Some(Style::new().background(Color::rgb(200, 100, 0)).borderless()),
            Button::new(""),
        );

        let mut canvas = Canvas::new(100, 100);
        ui.render(&mut canvas, &mut Vec::new()).unwrap();
        assert_eq!(canvas.pixel(20, 20), Some(Color::rgb(200, 100, 0)));

        ui.dispatch(Event::PointerMove(Point::new(20.0, 20.0)));
        assert!(ui.is_dirty(button));

        ui.render(&mut canvas, &mut Vec::new()).unwrap();
        assert_eq!(canvas.pixel(20, 20), Some(Color::rgb(149, 74, 0)));

        ui.dispatch(Event::PointerMove(Point::new(90.0, 90.0)));
        ui.render(&mut canvas, &mut Vec::new()).unwrap();
        assert_eq!(canvas.pixel(20, 20), Some(Color::rgb(200, 100, 0)));
    }

    #[test]
    fn test_restyle_from_click_is_painted() {
        let mut ui = Ui::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let root = ui.root();
        ui.spawn(
            root,
            Rect::new(10.0, 10.0, 50.0, 20.0),
            Some(Style::new().background(Color::rgb(60, 120, 200)).borderless()),
            Button::new("").on_click(|cx, _| {
                let id = cx.id();
                let hit = Style::new().background(Color::rgb(200, 30, 30)).borderless();
                cx.ui().set_style(id, Some(hit));
            }),
        );

        let mut canvas = Canvas::new(100, 100);
        ui.render(&mut canvas, &mut Vec::new()).unwrap();
        click_at(&mut ui, Point::new(20.0, 20.0));
        ui.dispatch(Event::PointerMove(Point::new(90.0, 90.0)));
        ui.render(&mut canvas, &mut Vec::new()).unwrap();

        assert_eq!(canvas.pixel(20, 20), Some(Color::rgb(200, 30, 30)));
    }
}
