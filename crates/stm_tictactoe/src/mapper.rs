//! Mapping between board cells and scan-frame pixels.
//!
//! The board is a square of side `grid_size` centered on `grid_origin`,
//! split into nine equal regions. Cell `i` occupies row `i / 3`, column
//! `i % 3`; the mapping is fixed once the grid is placed.

use crate::shapes::{DataShape, DrawPath, Point};
use derive_more::{Display, Error};
use std::f64::consts::TAU;
use tictactoe_engine::Cell;
use tracing::{debug, instrument};

/// Fraction of a region side filled by a cross or nought.
pub const SHAPE_FILL: f64 = 0.7;

/// Segments used to approximate a nought.
pub const NOUGHT_SEGMENTS: usize = 32;

/// Distances closer than this are treated as equal.
pub const TIE_EPSILON: f64 = 1e-9;

/// A point or region fell outside the scan frame.
#[derive(Debug, Clone, PartialEq, Display, Error)]
#[display("{} at ({:.1}, {:.1}) lies outside the {}x{} scan frame", what, x, y, width, height)]
pub struct OutOfBoundsError {
    /// What was being placed.
    pub what: String,
    /// Offending column.
    pub x: f64,
    /// Offending row.
    pub y: f64,
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
}

/// Why a point could not be resolved to a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Unresolved {
    /// The point is not on the board.
    #[display("outside the board grid")]
    OutsideGrid,
    /// The point is equally close to two region centers.
    #[display("equidistant from {_0} and {_1}")]
    Equidistant(Cell, Cell),
}

/// One cell's square of pixels, half-open: `[left, left + side)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRegion {
    left: f64,
    top: f64,
    side: f64,
}

impl PixelRegion {
    /// Left edge.
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Side length.
    pub fn side(&self) -> f64 {
        self.side
    }

    /// Center of the region, the only valid draw center.
    pub fn center(&self) -> Point {
        Point::new(self.left + self.side / 2.0, self.top + self.side / 2.0)
    }

    /// The four corners, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        let (r, b) = (self.left + self.side, self.top + self.side);
        [
            Point::new(self.left, self.top),
            Point::new(r, self.top),
            Point::new(r, b),
            Point::new(self.left, b),
        ]
    }

    /// Half-open containment.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left
            && p.x < self.left + self.side
            && p.y >= self.top
            && p.y < self.top + self.side
    }

    /// True if the two regions share any area.
    pub fn overlaps(&self, other: &PixelRegion) -> bool {
        self.left < other.left + other.side
            && other.left < self.left + self.side
            && self.top < other.top + other.side
            && other.top < self.top + self.side
    }
}

/// Pure cell/pixel geometry for one placed board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    frame_width: usize,
    frame_height: usize,
    grid_origin: Point,
    grid_size: f64,
}

impl CoordinateMapper {
    /// Places a board of side `grid_size` centered on `grid_origin`.
    ///
    /// Fails if any grid corner lies outside the frame.
    #[instrument]
    pub fn new(
        frame_width: usize,
        frame_height: usize,
        grid_origin: Point,
        grid_size: f64,
    ) -> Result<Self, OutOfBoundsError> {
        let mapper = Self {
            frame_width,
            frame_height,
            grid_origin,
            grid_size,
        };
        let half = grid_size / 2.0;
        for corner in [
            grid_origin.offset(-half, -half),
            grid_origin.offset(half, half),
        ] {
            mapper.check_in_frame("board grid corner", corner)?;
        }
        debug!(%grid_origin, grid_size, "Coordinate mapper placed");
        Ok(mapper)
    }

    /// Places a board at the center of the frame.
    pub fn centered(
        frame_width: usize,
        frame_height: usize,
        grid_size: f64,
    ) -> Result<Self, OutOfBoundsError> {
        let origin = Point::new(frame_width as f64 / 2.0, frame_height as f64 / 2.0);
        Self::new(frame_width, frame_height, origin, grid_size)
    }

    /// Board center.
    pub fn grid_origin(&self) -> Point {
        self.grid_origin
    }

    /// Board side length.
    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// Region covered by the whole board.
    pub fn grid_bounds(&self) -> PixelRegion {
        let half = self.grid_size / 2.0;
        PixelRegion {
            left: self.grid_origin.x - half,
            top: self.grid_origin.y - half,
            side: self.grid_size,
        }
    }

    /// Region of one cell.
    pub fn cell_to_region(&self, cell: Cell) -> Result<PixelRegion, OutOfBoundsError> {
        let bounds = self.grid_bounds();
        let side = self.grid_size / 3.0;
        let region = PixelRegion {
            left: bounds.left + cell.col() as f64 * side,
            top: bounds.top + cell.row() as f64 * side,
            side,
        };
        for corner in region.corners() {
            self.check_in_frame("cell region corner", corner)?;
        }
        Ok(region)
    }

    /// Centers of all nine regions in cell order.
    pub fn region_centers(&self) -> Result<[Point; 9], OutOfBoundsError> {
        let mut centers = [Point::default(); 9];
        for cell in Cell::ALL {
            centers[cell.index()] = self.cell_to_region(cell)?.center();
        }
        Ok(centers)
    }

    /// Cell whose center is nearest to `point`.
    pub fn region_to_cell(&self, point: Point) -> Result<Cell, Unresolved> {
        let bounds = self.grid_bounds();
        let right = bounds.left + bounds.side;
        let bottom = bounds.top + bounds.side;
        if !point.x.is_finite()
            || !point.y.is_finite()
            || point.x < bounds.left
            || point.x > right
            || point.y < bounds.top
            || point.y > bottom
        {
            return Err(Unresolved::OutsideGrid);
        }

        let side = self.grid_size / 3.0;
        let mut ranked: Vec<(f64, Cell)> = Cell::ALL
            .into_iter()
            .map(|cell| {
                let center = Point::new(
                    bounds.left + (cell.col() as f64 + 0.5) * side,
                    bounds.top + (cell.row() as f64 + 0.5) * side,
                );
                (point.distance(center), cell)
            })
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (nearest, cell) = ranked[0];
        let (runner_up, other) = ranked[1];
        if runner_up - nearest <= TIE_EPSILON {
            return Err(Unresolved::Equidistant(cell, other));
        }
        Ok(cell)
    }

    /// Path that draws `shape` centered on `center`.
    ///
    /// Crosses and noughts are sized to a cell region; the board grid spans
    /// the full grid. Every point must land inside the frame.
    #[instrument(skip(self))]
    pub fn shape_path(
        &self,
        shape: DataShape,
        center: Point,
    ) -> Result<DrawPath, OutOfBoundsError> {
        self.check_in_frame("draw center", center)?;
        let cell_side = self.grid_size / 3.0;
        let half = cell_side * SHAPE_FILL / 2.0;

        let strokes = match shape {
            DataShape::Cross => vec![
                vec![center.offset(-half, -half), center.offset(half, half)],
                vec![center.offset(half, -half), center.offset(-half, half)],
            ],
            DataShape::Nought => {
                let ring = (0..=NOUGHT_SEGMENTS)
                    .map(|i| {
                        let angle = TAU * (i % NOUGHT_SEGMENTS) as f64 / NOUGHT_SEGMENTS as f64;
                        center.offset(half * angle.cos(), half * angle.sin())
                    })
                    .collect();
                vec![ring]
            }
            DataShape::BoardGrid => {
                let g = self.grid_size / 2.0;
                let third = self.grid_size / 6.0;
                vec![
                    vec![center.offset(-third, -g), center.offset(-third, g)],
                    vec![center.offset(third, -g), center.offset(third, g)],
                    vec![center.offset(-g, -third), center.offset(g, -third)],
                    vec![center.offset(-g, third), center.offset(g, third)],
                ]
            }
        };

        let path = DrawPath::new(strokes);
        for point in path.points() {
            self.check_in_frame("path point", point)?;
        }
        debug!(%shape, %center, strokes = path.strokes().len(), "Shape path built");
        Ok(path)
    }

    fn check_in_frame(&self, what: &str, p: Point) -> Result<(), OutOfBoundsError> {
        let inside = p.x.is_finite()
            && p.y.is_finite()
            && p.x >= 0.0
            && p.y >= 0.0
            && p.x <= self.frame_width as f64
            && p.y <= self.frame_height as f64;
        if inside {
            Ok(())
        } else {
            Err(OutOfBoundsError {
                what: what.to_string(),
                x: p.x,
                y: p.y,
                width: self.frame_width,
                height: self.frame_height,
            })
        }
    }
}
