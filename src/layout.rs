//! Layout system - rectangles, points, and single-axis flow layout

/// A point in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle in screen units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole screen of the given size
    pub fn fullscreen(width: u32, height: u32) -> Self {
        Rect::new(0.0, 0.0, width as f32, height as f32)
    }

    /// Get right edge x-coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get bottom edge y-coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point of the rectangle
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if point is inside rectangle (far edges excluded)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Intersection of two rectangles, `None` when they do not overlap
    pub fn clip(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > x && bottom > y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Same size, moved so its center sits on `center`
    pub fn centered_on(&self, center: Point) -> Rect {
        Rect::new(
            center.x - self.width / 2.0,
            center.y - self.height / 2.0,
            self.width,
            self.height,
        )
    }
}

/// Layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn start(self, rect: &Rect) -> f32 {
        match self {
            Axis::Horizontal => rect.x,
            Axis::Vertical => rect.y,
        }
    }

    fn extent(self, rect: &Rect) -> f32 {
        match self {
            Axis::Horizontal => rect.width,
            Axis::Vertical => rect.height,
        }
    }

    fn set_start(self, rect: &mut Rect, value: f32) {
        match self {
            Axis::Horizontal => rect.x = value,
            Axis::Vertical => rect.y = value,
        }
    }

    fn set_extent(self, rect: &mut Rect, value: f32) {
        match self {
            Axis::Horizontal => rect.width = value,
            Axis::Vertical => rect.height = value,
        }
    }

    /// The perpendicular axis
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// Single-axis flow layout calculator
///
/// Children are placed one after another along `axis` in insertion order.
/// Along the main axis they either share the container extent equally
/// (`expand_main`) or keep their own extent with the leftover space turned
/// into gaps. Along the cross axis they are either stretched
/// (`expand_cross`) or centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLayout {
    axis: Axis,
    expand_main: bool,
    expand_cross: bool,
    space_around: bool,
}

impl FlowLayout {
    /// Create a flow layout that expands along both axes
    pub fn new(axis: Axis) -> Self {
        FlowLayout {
            axis,
            expand_main: true,
            expand_cross: true,
            space_around: false,
        }
    }

    /// Horizontal flow from width/height expansion flags
    pub fn horizontal(expand_width: bool, expand_height: bool, space_around: bool) -> Self {
        FlowLayout::new(Axis::Horizontal)
            .expand_main(expand_width)
            .expand_cross(expand_height)
            .space_around(space_around)
    }

    /// Vertical flow from width/height expansion flags
    pub fn vertical(expand_width: bool, expand_height: bool, space_around: bool) -> Self {
        FlowLayout::new(Axis::Vertical)
            .expand_main(expand_height)
            .expand_cross(expand_width)
            .space_around(space_around)
    }

    /// Share the main-axis extent equally between children
    pub fn expand_main(mut self, expand: bool) -> Self {
        self.expand_main = expand;
        self
    }

    /// Stretch children across the cross axis
    pub fn expand_cross(mut self, expand: bool) -> Self {
        self.expand_cross = expand;
        self
    }

    /// Put gaps before the first and after the last child too
    pub fn space_around(mut self, space_around: bool) -> Self {
        self.space_around = space_around;
        self
    }

    /// Layout axis
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Calculate child rectangles for the given container and current child rectangles
    pub fn arrange(&self, container: Rect, children: &[Rect]) -> Vec<Rect> {
        if children.is_empty() {
            return Vec::new();
        }

        let axis = self.axis;
        let count = children.len() as f32;
        let main_extent = axis.extent(&container);

        let mut cursor = axis.start(&container);
        let mut spacing = 0.0;
        let mut share = 0.0;

        if self.expand_main {
            share = main_extent / count;
        } else {
            let total: f32 = children.iter().map(|child| axis.extent(child)).sum();

            if self.space_around {
                spacing = (main_extent - total) / (count + 1.0);
            } else if children.len() > 1 {
                spacing = (main_extent - total) / (count - 1.0);
                cursor -= spacing;
            }
        }

        let cross = axis.cross();
        let cross_start = cross.start(&container);
        let cross_extent = cross.extent(&container);
        let cross_mid = cross_start + cross_extent / 2.0;

        children
            .iter()
            .map(|child| {
                cursor += spacing;

                let mut rect = *child;
                axis.set_start(&mut rect, cursor);

                if self.expand_main {
                    axis.set_extent(&mut rect, share);
                }

                if self.expand_cross {
                    cross.set_start(&mut rect, cross_start);
                    cross.set_extent(&mut rect, cross_extent);
                } else {
                    let own = cross.extent(&rect);
                    cross.set_start(&mut rect, cross_mid - own / 2.0);
                }

                cursor += axis.extent(&rect);
                rect
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_rect_creation() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(15.0, 15.0)));
        assert!(r.contains(Point::new(10.0, 10.0))); // edge
        assert!(!r.contains(Point::new(30.0, 30.0))); // far edge excluded
        assert!(!r.contains(Point::new(5.0, 15.0)));
    }

    #[test]
    fn test_rect_clip() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.clip(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));

        let c = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert_eq!(a.clip(&c), None);
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 5.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 25.0, 15.0));
    }

    #[test]
    fn test_expand_width_shares_equally() {
        let layout = FlowLayout::horizontal(true, true, false);
        let container = Rect::new(0.0, 0.0, 400.0, 50.0);
        let children = vec![Rect::new(0.0, 0.0, 10.0, 10.0); 4];

        let rects = layout.arrange(container, &children);

        assert_eq!(rects.len(), 4);
        for (i, rect) in rects.iter().enumerate() {
            assert!(approx(rect.width, 100.0));
            assert!(approx(rect.x, 100.0 * i as f32));
            assert!(approx(rect.height, 50.0));
        }
    }

    #[test]
    fn test_space_around_vertical() {
        let layout = FlowLayout::vertical(false, false, true);
        let container = Rect::new(0.0, 0.0, 100.0, 300.0);
        let children = vec![Rect::new(0.0, 0.0, 20.0, 50.0); 2];

        let rects = layout.arrange(container, &children);
        let gap = 200.0 / 3.0;

        assert!(approx(rects[0].y, gap));
        assert!(approx(rects[1].y - rects[0].bottom(), gap));
        assert!(approx(300.0 - rects[1].bottom(), gap));
        // Centered across, size kept
        assert!(approx(rects[0].x, 40.0));
        assert!(approx(rects[0].width, 20.0));
    }

    #[test]
    fn test_space_between() {
        let layout = FlowLayout::horizontal(false, true, false);
        let container = Rect::new(10.0, 0.0, 100.0, 20.0);
        let children = vec![Rect::new(0.0, 0.0, 20.0, 5.0); 3];

        let rects = layout.arrange(container, &children);

        assert!(approx(rects[0].x, 10.0));
        assert!(approx(rects[1].x, 50.0));
        assert!(approx(rects[2].right(), 110.0));
        assert!(approx(rects[2].height, 20.0));
    }

    #[test]
    fn test_single_child_without_space_around() {
        let layout = FlowLayout::horizontal(false, false, false);
        let container = Rect::new(5.0, 0.0, 100.0, 40.0);
        let rects = layout.arrange(container, &[Rect::new(0.0, 0.0, 30.0, 10.0)]);

        assert!(approx(rects[0].x, 5.0));
        assert!(approx(rects[0].y, 15.0));
    }

    #[test]
    fn test_no_children() {
        let layout = FlowLayout::vertical(false, false, false);
        assert!(layout.arrange(Rect::new(0.0, 0.0, 10.0, 10.0), &[]).is_empty());
    }

    #[test]
    fn test_arrange_is_idempotent() {
        let layout = FlowLayout::horizontal(false, false, true);
        let container = Rect::new(0.0, 0.0, 333.0, 77.0);
        let children = vec![
            Rect::new(0.0, 0.0, 40.0, 10.0),
            Rect::new(0.0, 0.0, 25.0, 30.0),
            Rect::new(0.0, 0.0, 60.0, 5.0),
        ];

        let first = layout.arrange(container, &children);
        let second = layout.arrange(container, &first);
        assert_eq!(first, second);
    }
}
