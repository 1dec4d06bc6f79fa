//! Component tree - arena ownership, composition, redraw propagation, and
//! the update and render passes

use crate::canvas::Canvas;
use crate::component::{Callback, ComponentId, DrawContext, EventContext, Node, Widget};
use crate::components::Panel;
use crate::layout::Rect;
use crate::router::EventRouter;
use crate::style::Style;
use anyhow::{Context, Result};
use slotmap::SlotMap;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Something only the frame driver can do, requested from inside the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Stop the frame loop
    Quit,
    /// The output surface changed size (pixels)
    Resize(u32, u32),
    /// Replace the root's children with the scene at this index
    SwitchScene(usize),
}

/// A tree of components plus the input router that tracks hover and focus
///
/// Nodes live in an arena. The parent's child list is the ownership edge and
/// the parent handle is just an id. Child order is paint order and hit-test
/// stacking order: the last child is drawn last and is topmost.
pub struct Ui {
    nodes: SlotMap<ComponentId, Node>,
    root: ComponentId,
    default_style: Arc<Style>,
    pub(crate) router: EventRouter,
    requests: VecDeque<HostRequest>,
    deferred: VecDeque<(ComponentId, Callback)>,
    depth: usize,
}

impl Ui {
    /// Create a UI whose root panel covers `bounds`
    pub fn new(bounds: Rect) -> Self {
        Self::with_default_style(bounds, Style::default())
    }

    /// Create a UI with a custom default style
    pub fn with_default_style(bounds: Rect, style: Style) -> Self {
        let default_style = Arc::new(style);
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(
            bounds,
            default_style.clone(),
            Box::new(Panel::new()),
        ));

        let mut ui = Ui {
            nodes,
            root,
            default_style,
            router: EventRouter::new(),
            requests: VecDeque::new(),
            deferred: VecDeque::new(),
            depth: 0,
        };
        ui.invoke(root, Callback::Resized(bounds));
        ui
    }

    /// The root component
    pub fn root(&self) -> ComponentId {
        self.root
    }

    /// Style given to components created without one
    pub fn default_style(&self) -> &Arc<Style> {
        &self.default_style
    }

    /// Replace the default style for components created from now on
    pub fn set_default_style(&mut self, style: Style) {
        self.default_style = Arc::new(style);
    }

    /// Number of live components, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---- creation -------------------------------------------------------

    /// Create a detached component
    pub fn insert<W: Widget>(&mut self, rect: Rect, style: Option<Style>, widget: W) -> ComponentId {
        let style = match style {
            Some(style) => Arc::new(style),
            None => self.default_style.clone(),
        };
        self.insert_shared(rect, style, Box::new(widget))
    }

    /// Create a detached component with a shared style
    pub fn insert_shared(
        &mut self,
        rect: Rect,
        style: Arc<Style>,
        widget: Box<dyn Widget>,
    ) -> ComponentId {
        let id = self.nodes.insert(Node::new(rect, style, widget));
        self.invoke(id, Callback::Resized(rect));
        id
    }

    /// Create a component directly under `parent`
    pub fn spawn<W: Widget>(
        &mut self,
        parent: ComponentId,
        rect: Rect,
        style: Option<Style>,
        widget: W,
    ) -> ComponentId {
        let id = self.insert(rect, style, widget);
        self.add_child(parent, id);
        id
    }

    // ---- accessors ------------------------------------------------------

    pub fn contains(&self, id: ComponentId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn rect(&self, id: ComponentId) -> Option<Rect> {
        self.nodes.get(id).map(|node| node.rect)
    }

    pub fn style(&self, id: ComponentId) -> Option<&Arc<Style>> {
        self.nodes.get(id).map(|node| &node.style)
    }

    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Children in paint order, empty for a stale id
    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_enabled(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.enabled)
    }

    pub fn is_dirty(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.dirty)
    }

    /// Widget name, for logging
    pub fn name(&self, id: ComponentId) -> &str {
        self.nodes
            .get(id)
            .and_then(|node| node.widget.as_deref())
            .map(|widget| widget.name())
            .unwrap_or("<busy>")
    }

    /// Whether `id` is reachable from the root
    pub fn is_attached(&self, id: ComponentId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor(&self, ancestor: ComponentId, id: ComponentId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    /// `id` and every descendant, parents before children
    pub fn subtree(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.nodes.get(node_id) else {
                continue;
            };
            out.push(node_id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    // ---- typed widget access ------------------------------------------

    /// Borrow the widget of `id` as a concrete type
    pub fn widget<T: Widget>(&self, id: ComponentId) -> Option<&T> {
        let widget: &dyn Any = self.nodes.get(id)?.widget.as_deref()?;
        widget.downcast_ref::<T>()
    }

    /// Mutably borrow the widget of `id` as a concrete type
    ///
    /// Does not mark the component for repaint; see [`Ui::edit`].
    pub fn widget_mut<T: Widget>(&mut self, id: ComponentId) -> Option<&mut T> {
        let widget: &mut dyn Any = self.nodes.get_mut(id)?.widget.as_deref_mut()?;
        widget.downcast_mut::<T>()
    }

    /// Mutate the widget of `id` and mark it for repaint
    pub fn edit<T: Widget, R>(&mut self, id: ComponentId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let result = f(self.widget_mut::<T>(id)?);
        self.redraw(id);
        Some(result)
    }

    // ---- host requests -------------------------------------------------

    pub fn request(&mut self, request: HostRequest) {
        self.requests.push_back(request);
    }

    /// Drain pending host requests in arrival order
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        self.requests.drain(..).collect()
    }

    // ---- composition ---------------------------------------------------

    /// Append `child` to `parent`, detaching it from its old parent first
    pub fn add_child(&mut self, parent: ComponentId, child: ComponentId) {
        let Some(parent_node) = self.nodes.get(parent) else {
            warn!(?parent, "add_child on a stale parent");
            return;
        };
        if parent_node.children.contains(&child) {
            return;
        }
        if child == self.root {
            warn!(?parent, "refusing to give the root component a parent");
            return;
        }
        if !self.nodes.contains_key(child) {
            warn!(?child, "add_child with a stale child");
            return;
        }
        if self.is_ancestor(child, parent) {
            warn!(?parent, ?child, "refusing to add a component under itself");
            return;
        }

        if let Some(old) = self.parent(child) {
            self.unlink(old, child);
            self.redraw(old);
            self.relayout(old);
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }

        self.redraw(parent);
        self.router.invalid = true;
        self.relayout(parent);
        self.release_if_detached(child);
    }

    /// Detach `child` from `parent`; no-op if it is not a child
    pub fn remove_child(&mut self, parent: ComponentId, child: ComponentId) {
        if !self.children(parent).contains(&child) {
            return;
        }

        self.unlink(parent, child);
        self.redraw(parent);
        self.router.invalid = true;
        self.relayout(parent);
        self.release_if_detached(child);
    }

    /// Detach every child of `parent`
    pub fn clear_children(&mut self, parent: ComponentId) {
        let children = match self.nodes.get_mut(parent) {
            Some(node) if !node.children.is_empty() => std::mem::take(&mut node.children),
            _ => return,
        };

        for child in &children {
            if let Some(node) = self.nodes.get_mut(*child) {
                node.parent = None;
            }
        }

        self.redraw(parent);
        self.router.invalid = true;
        self.relayout(parent);
        for child in children {
            self.release_if_detached(child);
        }
    }

    /// Move `child` under `parent`, or detach it with `None`
    pub fn set_parent(&mut self, child: ComponentId, parent: Option<ComponentId>) {
        match parent {
            Some(parent) => self.add_child(parent, child),
            None => {
                if let Some(old) = self.parent(child) {
                    self.remove_child(old, child);
                }
            }
        }
    }

    /// Detach and free `id` with its whole subtree
    pub fn destroy(&mut self, id: ComponentId) {
        if id == self.root {
            warn!("refusing to destroy the root component");
            return;
        }
        if !self.nodes.contains_key(id) {
            return;
        }

        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        self.release_subtree(id);

        for node_id in self.subtree(id) {
            self.nodes.remove(node_id);
        }
    }

    /// Free every child subtree of `id`
    pub fn destroy_children(&mut self, id: ComponentId) {
        for child in self.children(id).to_vec() {
            self.destroy(child);
        }
    }

    fn unlink(&mut self, parent: ComponentId, child: ComponentId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
    }

    fn release_if_detached(&mut self, id: ComponentId) {
        if !self.is_attached(id) {
            self.release_subtree(id);
        }
    }

    // ---- geometry and style ------------------------------------------

    /// Move or resize a component and lay out its children
    pub fn set_rect(&mut self, id: ComponentId, rect: Rect) {
        let Some(node) = self.nodes.get_mut(id) else {
            warn!(?id, "set_rect on a stale component");
            return;
        };
        node.rect = rect;
        self.invoke(id, Callback::Resized(rect));
        self.relayout(id);
    }

    /// Recompute child rectangles if the widget is a layout container
    pub(crate) fn relayout(&mut self, id: ComponentId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let Some(widget) = node.widget.as_deref() else {
            self.deferred.push_back((id, Callback::Relayout));
            return;
        };
        if node.children.is_empty() {
            return;
        }

        let current: Vec<Rect> = node
            .children
            .iter()
            .filter_map(|child| self.nodes.get(*child).map(|n| n.rect))
            .collect();
        let Some(rects) = widget.arrange(node.rect, &current) else {
            return;
        };

        let children = node.children.clone();
        for (child, rect) in children.into_iter().zip(rects) {
            self.set_rect(child, rect);
        }
    }

    /// Install a style, or the default style with `None`
    pub fn set_style(&mut self, id: ComponentId, style: Option<Style>) {
        let style = match style {
            Some(style) => Arc::new(style),
            None => self.default_style.clone(),
        };
        self.set_shared_style(id, style);
    }

    /// Install a shared style
    pub fn set_shared_style(&mut self, id: ComponentId, style: Arc<Style>) {
        let Some(node) = self.nodes.get_mut(id) else {
            warn!(?id, "set_style on a stale component");
            return;
        };
        node.style = style;
        self.redraw(id);
    }

    // ---- enable / disable ----------------------------------------------

    pub fn enable(&mut self, id: ComponentId) {
        match self.nodes.get_mut(id) {
            Some(node) if !node.enabled => node.enabled = true,
            _ => return,
        }
        self.redraw(id);
        self.router.invalid = true;
    }

    /// Hide a component and its subtree from painting and hit-testing
    ///
    /// Anything hovered or focused inside the subtree is released, and the
    /// parent repaints the vacated area.
    pub fn disable(&mut self, id: ComponentId) {
        match self.nodes.get_mut(id) {
            Some(node) if node.enabled => node.enabled = false,
            _ => return,
        }
        self.router.invalid = true;
        self.release_subtree(id);
        if let Some(parent) = self.parent(id) {
            self.redraw(parent);
        }
    }

    // ---- redraw ----------------------------------------------------------

    /// Mark a component for repaint
    ///
    /// With `force_parent_redraw` set the parent is repainted instead;
    /// otherwise the component and all its descendants become dirty.
    pub fn redraw(&mut self, id: ComponentId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.style.force_parent_redraw {
            if let Some(parent) = node.parent {
                self.redraw(parent);
                return;
            }
        }

        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.dirty = true;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    // ---- frame passes ----------------------------------------------------

    /// Run every widget's update hook, children before their parent
    pub fn update(&mut self, dt: Duration) {
        self.update_node(self.root, dt);
    }

    fn update_node(&mut self, id: ComponentId, dt: Duration) {
        for child in self.children(id).to_vec() {
            self.update_node(child, dt);
        }
        if self.nodes.contains_key(id) {
            self.invoke(id, Callback::Update(dt));
        }
    }

    /// Paint every dirty, enabled component
    ///
    /// Regions touched on the canvas are appended to `changed`.
    pub fn render(&mut self, canvas: &mut Canvas, changed: &mut Vec<Rect>) -> Result<()> {
        self.render_node(self.root, canvas, changed)
    }

    fn render_node(
        &mut self,
        id: ComponentId,
        canvas: &mut Canvas,
        changed: &mut Vec<Rect>,
    ) -> Result<()> {
        let hovered = self.router.hovered == Some(id);
        let focused = self.router.focused == Some(id);

        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(());
        };
        if !node.enabled {
            return Ok(());
        }

        if node.dirty {
            node.dirty = false;
            let rect = node.rect;
            let style = node.style.clone();
            if let Some(widget) = node.widget.as_deref_mut() {
                let mut cx = DrawContext::new(canvas, rect, &style, hovered, focused, changed);
                widget
                    .draw(&mut cx)
                    .with_context(|| format!("failed to draw {}", widget.name()))?;
            }
        }

        let children = node.children.clone();
        for child in children {
            self.render_node(child, canvas, changed)?;
        }
        Ok(())
    }

    // ---- hook dispatch ---------------------------------------------------

    /// Run a hook on a widget, or queue it if the widget is busy
    pub(crate) fn invoke(&mut self, id: ComponentId, callback: Callback) {
        if callback == Callback::Relayout {
            self.relayout(id);
            self.flush_deferred();
            return;
        }

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let Some(mut widget) = node.widget.take() else {
            self.deferred.push_back((id, callback));
            return;
        };

        self.depth += 1;
        {
            let mut cx = EventContext::new(self, id);
            callback.apply(widget.as_mut(), &mut cx);
        }
        self.depth -= 1;

        // A widget that destroyed its own component is dropped here
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = Some(widget);
        }

        self.flush_deferred();
    }

    fn flush_deferred(&mut self) {
        if self.depth > 0 {
            return;
        }
        while let Some((id, callback)) = self.deferred.pop_front() {
            self.invoke(id, callback);
        }
    }
}
