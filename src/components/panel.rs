//! Plain and flow-layout panels

use crate::component::Widget;
use crate::layout::{Axis, FlowLayout, Rect};

/// Container with the default look and no layout of its own
#[derive(Debug, Default, Clone, Copy)]
pub struct Panel;

impl Panel {
    pub fn new() -> Self {
        Panel
    }
}

impl Widget for Panel {
    fn name(&self) -> &str {
        "Panel"
    }
}

/// Container laying its children out along one axis
///
/// Child rectangles are recomputed whenever the panel is resized or its
/// child set changes.
#[derive(Debug, Clone, Copy)]
pub struct FlowPanel {
    layout: FlowLayout,
}

impl FlowPanel {
    pub fn new(layout: FlowLayout) -> Self {
        FlowPanel { layout }
    }

    /// Children side by side, left to right
    pub fn horizontal(expand_width: bool, expand_height: bool, space_around: bool) -> Self {
        Self::new(FlowLayout::horizontal(
            expand_width,
            expand_height,
            space_around,
        ))
    }

    /// Children stacked top to bottom
    pub fn vertical(expand_width: bool, expand_height: bool, space_around: bool) -> Self {
        Self::new(FlowLayout::vertical(expand_width, expand_height, space_around))
    }

    pub fn layout(&self) -> &FlowLayout {
        &self.layout
    }
}

impl Widget for FlowPanel {
    fn name(&self) -> &str {
        match self.layout.axis() {
            Axis::Horizontal => "HorizontalPanel",
            Axis::Vertical => "VerticalPanel",
        }
    }

    fn arrange(&self, bounds: Rect, children: &[Rect]) -> Option<Vec<Rect>> {
        Some(self.layout.arrange(bounds, children))
    }
}
