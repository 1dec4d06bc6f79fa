//! Component system - widget trait, tree nodes, and hook contexts
//!
//! A component is a node in the [`Ui`] arena: rectangle, style, enable and
//! dirty flags, parent handle and ordered children. What a component *does*
//! comes from the [`Widget`] attached to it. Every hook has a no-op default so
//! a widget only implements what it reacts to.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::event::{KeyPress, MouseButton};
use crate::layout::{Point, Rect};
use crate::style::Style;
use crate::tree::{HostRequest, Ui};
use anyhow::Result;
use image::RgbaImage;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

slotmap::new_key_type! {
    /// Handle to a component in a [`Ui`]
    pub struct ComponentId;
}

/// Behaviour attached to a component
///
/// Hooks that receive an [`EventContext`] may freely mutate the tree,
/// including the component they belong to. A hook aimed at a widget that is
/// already running one of its hooks is queued and runs right after.
pub trait Widget: Any {
    /// Name for logging
    fn name(&self) -> &str {
        "Component"
    }

    /// Called after the component rectangle was set
    fn on_rect_changed(&mut self, _rect: Rect) {}

    /// Child rectangles for a layout container, `None` for no layout
    fn arrange(&self, _bounds: Rect, _children: &[Rect]) -> Option<Vec<Rect>> {
        None
    }

    /// Per-frame update, called after every child was updated
    fn update(&mut self, _cx: &mut EventContext<'_>, _dt: Duration) {}

    /// Paint the component. Only called while the component is dirty.
    fn draw(&mut self, cx: &mut DrawContext<'_>) -> Result<()> {
        cx.paint_base();
        Ok(())
    }

    /// Pressed and released inside the component
    fn on_click(&mut self, _cx: &mut EventContext<'_>, _button: MouseButton) {}

    fn on_hover_enter(&mut self, _cx: &mut EventContext<'_>) {}

    fn on_hover_exit(&mut self, _cx: &mut EventContext<'_>) {}

    /// Pointer moved while a button is held and this component has focus
    fn on_drag(&mut self, _cx: &mut EventContext<'_>, _pointer: Point) {}

    fn on_focus(&mut self, _cx: &mut EventContext<'_>) {}

    fn on_blur(&mut self, _cx: &mut EventContext<'_>) {}

    fn on_key_press(&mut self, _cx: &mut EventContext<'_>, _key: &KeyPress) {}
}

/// A hook invocation, kept so it can be replayed when the widget is busy
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Callback {
    Click(MouseButton),
    HoverEnter,
    HoverExit,
    Drag(Point),
    Focus,
    Blur,
    KeyPress(KeyPress),
    Update(Duration),
    Resized(Rect),
    Relayout,
}

impl Callback {
    pub(crate) fn apply(self, widget: &mut dyn Widget, cx: &mut EventContext<'_>) {
        match self {
            Callback::Click(button) => widget.on_click(cx, button),
            Callback::HoverEnter => widget.on_hover_enter(cx),
            Callback::HoverExit => widget.on_hover_exit(cx),
            Callback::Drag(pointer) => widget.on_drag(cx, pointer),
            Callback::Focus => widget.on_focus(cx),
            Callback::Blur => widget.on_blur(cx),
            Callback::KeyPress(key) => widget.on_key_press(cx, &key),
            Callback::Update(dt) => widget.update(cx, dt),
            Callback::Resized(rect) => widget.on_rect_changed(rect),
            // Handled by the tree itself
            Callback::Relayout => {}
        }
    }
}

/// Tree node
pub(crate) struct Node {
    pub(crate) rect: Rect,
    pub(crate) style: Arc<Style>,
    pub(crate) enabled: bool,
    pub(crate) dirty: bool,
    pub(crate) parent: Option<ComponentId>,
    pub(crate) children: Vec<ComponentId>,
    /// Taken out while one of its hooks runs
    pub(crate) widget: Option<Box<dyn Widget>>,
}

impl Node {
    pub(crate) fn new(rect: Rect, style: Arc<Style>, widget: Box<dyn Widget>) -> Self {
        Node {
            rect,
            style,
            enabled: true,
            dirty: true,
            parent: None,
            children: Vec::new(),
            widget: Some(widget),
        }
    }
}

/// Context handed to input and update hooks
pub struct EventContext<'a> {
    ui: &'a mut Ui,
    id: ComponentId,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(ui: &'a mut Ui, id: ComponentId) -> Self {
        EventContext { ui, id }
    }

    /// The component receiving the hook
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The whole UI, for tree mutation
    pub fn ui(&mut self) -> &mut Ui {
        &mut *self.ui
    }

    /// Mark this component for repaint
    pub fn redraw(&mut self) {
        self.ui.redraw(self.id);
    }

    pub fn rect(&self) -> Rect {
        self.ui.rect(self.id).unwrap_or_default()
    }

    pub fn is_hovered(&self) -> bool {
        self.ui.is_hovered(self.id)
    }

    pub fn is_focused(&self) -> bool {
        self.ui.is_focused(self.id)
    }

    /// Ask the frame driver to do something at the next frame
    pub fn request(&mut self, request: HostRequest) {
        self.ui.request(request);
    }
}

/// Context handed to [`Widget::draw`]
///
/// Drawing helpers record every pixel region they touch so the frame driver
/// can present exactly those regions.
pub struct DrawContext<'a> {
    canvas: &'a mut Canvas,
    rect: Rect,
    style: &'a Style,
    hovered: bool,
    focused: bool,
    changes: &'a mut Vec<Rect>,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(
        canvas: &'a mut Canvas,
        rect: Rect,
        style: &'a Style,
        hovered: bool,
        focused: bool,
        changes: &'a mut Vec<Rect>,
    ) -> Self {
        DrawContext {
            canvas,
            rect,
            style,
            hovered,
            focused,
            changes,
        }
    }

    /// Component rectangle
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn style(&self) -> &'a Style {
        self.style
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn record(&mut self, touched: Option<Rect>) {
        if let Some(rect) = touched {
            self.changes.push(rect);
        }
    }

    /// Fill a rectangle
    pub fn fill(&mut self, color: Color, rect: Rect) {
        let touched = self.canvas.fill(color, rect);
        self.record(touched);
    }

    /// Multiply a rectangle by a tint
    pub fn tint(&mut self, tint: Color, rect: Rect) {
        let touched = self.canvas.fill_multiply(tint, rect);
        self.record(touched);
    }

    /// Blend an image at `origin`, clipped to the component rectangle
    pub fn blit(&mut self, image: &RgbaImage, origin: Point) {
        let touched = self.canvas.blit(image, origin, self.rect);
        self.record(touched);
    }

    /// Blend an image scaled to `rect`
    pub fn blit_scaled(&mut self, image: &RgbaImage, rect: Rect) {
        let touched = self.canvas.blit_scaled(image, rect);
        self.record(touched);
    }

    /// Blend an image centered on the component
    pub fn blit_centered(&mut self, image: &RgbaImage) {
        let size = Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32);
        let placed = size.centered_on(self.rect.center());
        self.blit(image, Point::new(placed.x, placed.y));
    }

    /// Default paint: background color, background image, border
    pub fn paint_base(&mut self) {
        let style = self.style;
        let rect = self.rect;

        if let Some(color) = style.background_color {
            self.fill(color, rect);
        }

        if let Some(image) = &style.background_image {
            self.blit_scaled(image, rect);
        }

        if let Some(color) = style.visible_border() {
            let w = style.border_width as f32;
            self.fill(color, Rect::new(rect.x, rect.y, rect.width, w));
            self.fill(color, Rect::new(rect.x, rect.bottom() - w, rect.width, w));
            self.fill(color, Rect::new(rect.x, rect.y, w, rect.height));
            self.fill(color, Rect::new(rect.right() - w, rect.y, w, rect.height));
        }
    }
}
