//! Input routing - hit-testing, hover and focus tracking, event dispatch

use crate::component::{Callback, ComponentId};
use crate::event::{Event, InputSource, MouseButton};
use crate::layout::Point;
use crate::tree::{HostRequest, Ui};
use anyhow::Result;
use tracing::{debug, trace};

/// Hover, focus and pointer state of a [`Ui`]
///
/// At most one component is hovered and at most one is focused. `invalid`
/// is raised whenever the tree changes in a way that may move what lies
/// under the pointer; the hover target is recomputed at the next poll.
#[derive(Debug, Default, Clone)]
pub struct EventRouter {
    pub(crate) hovered: Option<ComponentId>,
    pub(crate) focused: Option<ComponentId>,
    pub(crate) pressed: Option<MouseButton>,
    pub(crate) invalid: bool,
    pub(crate) pointer: Option<Point>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<ComponentId> {
        self.hovered
    }

    pub fn focused(&self) -> Option<ComponentId> {
        self.focused
    }

    /// Button currently held, if any
    pub fn pressed(&self) -> Option<MouseButton> {
        self.pressed
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// Last known pointer position
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }
}

impl Ui {
    /// Router state
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    pub fn is_hovered(&self, id: ComponentId) -> bool {
        self.router.hovered == Some(id)
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.router.focused == Some(id)
    }

    /// Recompute the hover target at the next poll
    pub fn set_invalid(&mut self) {
        self.router.invalid = true;
    }

    /// Poll the input source once and dispatch everything it returned
    pub fn poll_input(&mut self, input: &mut dyn InputSource) -> Result<()> {
        if self.router.invalid && self.router.pressed.is_none() {
            self.refresh_hover();
        }

        for event in input.poll()? {
            self.dispatch(event);
        }
        Ok(())
    }

    /// Route a single event
    pub fn dispatch(&mut self, event: Event) {
        trace!(?event, "dispatch");

        match event {
            Event::Close => {
                self.request(HostRequest::Quit);
                return;
            }
            Event::Resize(width, height) => {
                self.request(HostRequest::Resize(width, height));
                self.router.invalid = true;
                return;
            }
            _ => {}
        }

        if !self.is_enabled(self.root()) {
            return;
        }

        match event {
            Event::PointerMove(pointer) => {
                self.router.pointer = Some(pointer);
                match (self.router.pressed, self.router.focused) {
                    (None, _) => self.refresh_hover(),
                    (Some(_), Some(focused)) => self.invoke(focused, Callback::Drag(pointer)),
                    (Some(_), None) => {}
                }
            }
            Event::PointerDown(button, pointer) if button != MouseButton::Middle => {
                self.router.pointer = Some(pointer);
                self.refresh_hover();
                self.router.pressed = Some(button);
                self.set_focused(self.router.hovered);
            }
            Event::PointerUp(button, pointer) if self.router.pressed == Some(button) => {
                self.router.pointer = Some(pointer);
                let hit = self.hit_test(pointer);
                match hit {
                    Some(id) if self.router.focused == Some(id) => {
                        self.invoke(id, Callback::Click(button));
                    }
                    _ => self.set_hovered(hit),
                }
                self.router.pressed = None;
            }
            Event::Key(key) => {
                if let Some(focused) = self.router.focused {
                    self.invoke(focused, Callback::KeyPress(key));
                }
            }
            _ => {}
        }
    }

    /// Topmost enabled component containing `point`
    ///
    /// Disabled components hide their whole subtree. Later children are
    /// tested before earlier ones, children before their parent.
    pub fn hit_test(&self, point: Point) -> Option<ComponentId> {
        self.hit_node(self.root(), point)
    }

    fn hit_node(&self, id: ComponentId, point: Point) -> Option<ComponentId> {
        if !self.is_enabled(id) {
            return None;
        }
        for child in self.children(id).iter().rev() {
            if let Some(hit) = self.hit_node(*child, point) {
                return Some(hit);
            }
        }
        self.rect(id)
            .filter(|rect| rect.contains(point))
            .map(|_| id)
    }

    /// Give keyboard focus to `id`
    ///
    /// Ignored unless `id` is attached and it and every ancestor are enabled.
    pub fn focus(&mut self, id: ComponentId) {
        if self.is_live(id) {
            self.set_focused(Some(id));
        }
    }

    /// Remove focus from `id` if it has it
    pub fn blur(&mut self, id: ComponentId) {
        if self.router.focused == Some(id) {
            self.set_focused(None);
        }
    }

    /// Remove focus from whatever has it
    pub fn blur_focused(&mut self) {
        self.set_focused(None);
    }

    fn is_live(&self, id: ComponentId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if !self.is_enabled(node_id) {
                return false;
            }
            if node_id == self.root() {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    fn refresh_hover(&mut self) {
        self.router.invalid = false;
        if let Some(pointer) = self.router.pointer {
            let hit = self.hit_test(pointer);
            self.set_hovered(hit);
        }
    }

    pub(crate) fn set_hovered(&mut self, hovered: Option<ComponentId>) {
        if self.router.hovered == hovered {
            return;
        }
        let old = std::mem::replace(&mut self.router.hovered, hovered);
        debug!(from = ?old, to = ?hovered, "hover changed");

        if let Some(old) = old {
            self.invoke(old, Callback::HoverExit);
        }
        if let Some(new) = hovered {
            self.invoke(new, Callback::HoverEnter);
        }
    }

    pub(crate) fn set_focused(&mut self, focused: Option<ComponentId>) {
        if self.router.focused == focused {
            return;
        }
        let old = std::mem::replace(&mut self.router.focused, focused);
        debug!(from = ?old, to = ?focused, "focus changed");

        if let Some(old) = old {
            self.invoke(old, Callback::Blur);
        }
        if let Some(new) = focused {
            self.invoke(new, Callback::Focus);
        }
    }

    /// Blur and unhover anything inside the subtree of `id`
    pub(crate) fn release_subtree(&mut self, id: ComponentId) {
        let inside = |ui: &Ui, target: Option<ComponentId>| {
            target.is_some_and(|target| ui.is_ancestor(id, target))
        };

        if inside(self, self.router.focused) {
            self.set_focused(None);
        }
        if inside(self, self.router.hovered) {
            self.set_hovered(None);
        }
    }
}
