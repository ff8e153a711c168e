//! Integer rectangle algebra used for extents, hit testing and redraw regions.

/// A point in view coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether `other` lies further than `threshold` pixels away on either axis
    pub fn exceeds_threshold(&self, other: Point, threshold: u32) -> bool {
        let t = threshold as i32;
        (self.x - other.x).abs() > t || (self.y - other.y).abs() > t
    }
}

/// An axis-aligned rectangle. Rectangles with a non-positive width or
/// height are empty and intersect nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub const fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Normalized rectangle spanning two corner points (min corner, absolute size)
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        !self.is_empty() && x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }

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

    /// Smallest rectangle containing both. An empty operand is ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Rectangle inset by `amount` on every side
    pub fn shrink(&self, amount: i32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            self.width - 2 * amount,
            self.height - 2 * amount,
        )
    }

    /// Parts of `self` not covered by `hole`, as at most four disjoint bands.
    pub fn subtract(&self, hole: &Rect) -> Vec<Rect> {
        if self.is_empty() {
            return Vec::new();
        }
        let Some(hole) = self.intersection(hole) else {
            return vec![*self];
        };

        let mut pieces = Vec::with_capacity(4);
        // top band, full width
        if hole.y > self.y {
            pieces.push(Rect::new(self.x, self.y, self.width, hole.y - self.y));
        }
        // bottom band, full width
        if hole.bottom() < self.bottom() {
            pieces.push(Rect::new(self.x, hole.bottom(), self.width, self.bottom() - hole.bottom()));
        }
        // left and right, limited to the hole's rows
        if hole.x > self.x {
            pieces.push(Rect::new(self.x, hole.y, hole.x - self.x, hole.height));
        }
        if hole.right() < self.right() {
            pieces.push(Rect::new(hole.right(), hole.y, self.right() - hole.right(), hole.height));
        }
        pieces
    }
}
