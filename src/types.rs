#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn zero() -> Self {
        Vector2D { x: 0.0, y: 0.0 }
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn dot(&self, other: Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Normalizing the zero vector yields the zero vector.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            Vector2D::zero()
        } else {
            self.scale(1.0 / mag)
        }
    }

    /// Rotates by `degrees` (positive is counterclockwise in y-up terms).
    pub fn rotate(&self, degrees: f64) -> Self {
        let radians = degrees.to_radians();
        let (sin, cos) = radians.sin_cos();
        Vector2D::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
        )
    }

    pub fn reflect(&self, normal: Vector2D) -> Self {
        let n = normal.normalize();
        self.sub(n.scale(2.0 * self.dot(n)))
    }

    pub fn distance_to(&self, other: Vector2D) -> f64 {
        self.sub(other).magnitude()
    }
}

/// Axis-aligned bounding rect in play-area coordinates, tracked by center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub center: Vector2D,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(center: Vector2D, width: f64, height: f64) -> Self {
        Rect { center, width, height }
    }

    pub fn left(&self) -> f64 {
        self.center.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.center.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.center.y + self.height / 2.0
    }

    pub fn set_left(&mut self, x: f64) {
        self.center.x = x + self.width / 2.0;
    }

    pub fn set_right(&mut self, x: f64) {
        self.center.x = x - self.width / 2.0;
    }

    pub fn set_top(&mut self, y: f64) {
        self.center.y = y + self.height / 2.0;
    }

    pub fn set_bottom(&mut self, y: f64) {
        self.center.y = y - self.height / 2.0;
    }

    pub fn translate(&mut self, delta: Vector2D) {
        self.center = self.center.add(delta);
    }

    /// Same rect scaled about its center. Used for loose collision tests.
    pub fn shrunk(&self, ratio: f64) -> Self {
        Rect::new(self.center, self.width * ratio, self.height * ratio)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// The play area everything moves in. Rendering scales this down to
/// terminal cells.
#[derive(Clone, Copy, Debug)]
pub struct PlayArea {
    pub width: f64,
    pub height: f64,
}

impl PlayArea {
    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Screen wraparound. The edge checks are mutually exclusive and run in
/// priority order bottom, top, right, left, so an entity off-screen on two
/// axes at once wraps on one axis now and the other on a later frame.
pub fn wrap_rect(rect: &mut Rect, area: &PlayArea) {
    if rect.bottom() < 0.0 {
        rect.set_top(area.height);
    } else if rect.top() > area.height {
        rect.set_bottom(0.0);
    } else if rect.right() < 0.0 {
        rect.set_left(area.width);
    } else if rect.left() > area.width {
        rect.set_right(0.0);
    }
}

pub fn normalize01(x: f64, min: f64, max: f64) -> f64 {
    ((x - min) / (max - min)).clamp(0.0, 1.0)
}

pub fn lerp(min: f64, max: f64, t: f64) -> f64 {
    (1.0 - t) * min + t * max
}
