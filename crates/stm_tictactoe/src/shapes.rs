//! Shapes drawn on the sample and the paths that trace them.

use derive_new::new;
use serde::{Deserialize, Serialize};
use tictactoe_engine::Mark;

/// A point in scan-image pixel space (x to the right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, new, Serialize, Deserialize)]
pub struct Point {
    /// Column coordinate.
    pub x: f64,
    /// Row coordinate.
    pub y: f64,
}

impl Point {
    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// This point shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Something the probe can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DataShape {
    /// An X: two diagonal strokes.
    Cross,
    /// An O: one closed polygonal stroke.
    Nought,
    /// The two vertical and two horizontal lines dividing the board.
    BoardGrid,
}

impl DataShape {
    /// Shape drawn for a mark.
    pub fn for_mark(mark: Mark) -> Self {
        match mark {
            Mark::Cross => DataShape::Cross,
            Mark::Nought => DataShape::Nought,
        }
    }
}

/// Ordered strokes for the probe to trace.
///
/// Each stroke is traced with the tip engaged; the tip lifts between strokes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawPath {
    strokes: Vec<Vec<Point>>,
}

impl DrawPath {
    /// Builds a path from strokes, dropping empty ones.
    pub fn new(strokes: Vec<Vec<Point>>) -> Self {
        Self {
            strokes: strokes.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// The strokes in drawing order.
    pub fn strokes(&self) -> &[Vec<Point>] {
        &self.strokes
    }

    /// Every point in drawing order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.strokes.iter().flatten().copied()
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Total traced length, pen lifts excluded.
    pub fn length(&self) -> f64 {
        self.strokes
            .iter()
            .map(|s| s.windows(2).map(|w| w[0].distance(w[1])).sum::<f64>())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_follow_stroke_order() {
        let path = DrawPath::new(vec![
            vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)],
            vec![],
            vec![Point::new(10.0, 0.0)],
        ]);
        assert_eq!(path.strokes().len(), 2);
        let points: Vec<Point> = path.points().collect();
        assert_eq!(points.last(), Some(&Point::new(10.0, 0.0)));
        assert_eq!(path.length(), 5.0);
    }

    #[test]
    fn test_mark_shapes() {
        assert_eq!(DataShape::for_mark(Mark::Nought), DataShape::Nought);
        assert_eq!(DataShape::BoardGrid.to_string(), "board_grid");
    }
}
