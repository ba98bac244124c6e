use itertools::Itertools;

/// A point of the 2D plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<&Point> for [f64; 2] {
    fn from(val: &Point) -> Self {
        [val.x, val.y]
    }
}

impl From<Point> for [f64; 2] {
    fn from(val: Point) -> Self {
        (&val).into()
    }
}

impl From<&[f64; 2]> for Point {
    fn from(value: &[f64; 2]) -> Self {
        Self {
            x: value[0],
            y: value[1],
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from(value: [f64; 2]) -> Self {
        Self::from(&value)
    }
}

impl Point {
    /// Constructs a new `Point`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Positioning of a `Point` with respect to a line.
#[derive(Debug, PartialEq)]
pub(crate) enum Positioning {
    Left,
    On,
    Right,
}

impl Point {
    /// Tests if a point is Left|On|Right of an infinite 2D line defined by two points.
    ///
    /// For a segment oriented from left to right, `Left` means the point lies strictly above
    /// the supporting line and `Right` strictly below.
    pub(crate) fn position<T>(&self, p1: T, p2: T) -> Positioning
    where
        T: Into<[f64; 2]>,
    {
        let Self { x: x0, y: y0 } = self;
        let [x1, y1] = p1.into();
        let [x2, y2] = p2.into();
        match ((x2 - x1) * (y0 - y1) - (x0 - x1) * (y2 - y1)).total_cmp(&0.) {
            std::cmp::Ordering::Greater => Positioning::Left,
            std::cmp::Ordering::Less => Positioning::Right,
            std::cmp::Ordering::Equal => Positioning::On,
        }
    }

    /// Computes the winding number for a [`Point`] in a polygon (defined by a slice of [`Point`]s).
    ///
    /// This number can be:
    /// - `0` if the [`Point`] is not inside the polygon
    /// - `> 0` if the polygon "winds" at least once around the [`Point`] counter-clockwise
    /// - `< 0` if the polygon "winds" at least once around the [`Point`] clockwise
    ///
    /// For more information, see <https://web.archive.org/web/20130126163405/http://geomalgorithms.com/a03-_inclusion.html>.
    pub fn wn<I>(&self, poly: I) -> isize
    where
        I: IntoIterator,
        <I as IntoIterator>::IntoIter: Clone,
        <I as IntoIterator>::IntoIter: ExactSizeIterator,
        <I as IntoIterator>::Item: Into<[f64; 2]>,
        <I as IntoIterator>::Item: Clone,
    {
        let mut wn = 0;
        for (a, b) in poly.into_iter().circular_tuple_windows() {
            let [_, ya] = a.clone().into();
            let [_, yb] = b.clone().into();
            if ya <= self.y {
                // `a` is below self
                if yb > self.y {
                    // an upward crossing
                    if matches!(self.position(a, b), Positioning::Left) {
                        wn += 1;
                    }
                }
            } else {
                // `a` is above self
                if yb <= self.y {
                    // a downward crossing
                    if matches!(self.position(a, b), Positioning::Right) {
                        wn -= 1;
                    }
                }
            }
        }
        wn
    }

    /// Returns `true` if the point is inside the input polygon.
    pub fn is_inside<I>(&self, poly: I) -> bool
    where
        I: IntoIterator,
        <I as IntoIterator>::IntoIter: Clone,
        <I as IntoIterator>::IntoIter: ExactSizeIterator,
        <I as IntoIterator>::Item: Into<[f64; 2]>,
        <I as IntoIterator>::Item: Clone,
    {
        self.wn(poly) != 0
    }
}

/// A line segment between two [`Point`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p: Point,
    pub q: Point,
}

impl Segment {
    /// Constructs a new `Segment`.
    pub fn new<T>(p: T, q: T) -> Self
    where
        T: Into<Point>,
    {
        Self {
            p: p.into(),
            q: q.into(),
        }
    }

    /// Returns the same segment with its endpoints ordered from left to right.
    ///
    /// Ties on the x-coordinate are broken by the y-coordinate, so the result is
    /// deterministic for any pair of distinct endpoints.
    pub(crate) fn oriented(self) -> Self {
        let Self { p, q } = self;
        if matches!(
            p.x.total_cmp(&q.x).then_with(|| p.y.total_cmp(&q.y)),
            std::cmp::Ordering::Greater
        ) {
            Self { p: q, q: p }
        } else {
            self
        }
    }

    /// The y-coordinate of the supporting line at abscissa `x`.
    pub(crate) fn y_at(&self, x: f64) -> f64 {
        let Self { p, q } = self;
        if p.x == q.x {
            p.y
        } else {
            p.y + (q.y - p.y) * (x - p.x) / (q.x - p.x)
        }
    }
}
