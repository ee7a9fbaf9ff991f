//! Display surfaces for the live scan and the board.

use crate::scan::ScanImage;
use crate::shapes::{DataShape, DrawPath};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use strum::{Display, EnumString};
use tracing::{debug, instrument};

/// How a session is shown to the players.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RenderMode {
    /// Shaded scan image, board and last drawn shape.
    #[default]
    Plot,
    /// Board text only.
    Print,
    /// Nothing.
    None,
}

/// A display surface.
///
/// `bind` is called once before the first `show`.
pub trait Renderer {
    /// Prepares the surface.
    fn bind(&mut self) -> io::Result<()>;

    /// Records a shape the probe just drew.
    fn draw_shape(&mut self, shape: DataShape, path: &DrawPath) -> io::Result<()>;

    /// Shows the latest scan next to the board.
    fn show(&mut self, image: &ScanImage, board: &str) -> io::Result<()>;
}

/// Builds the renderer for a mode, writing to `out`.
pub fn build_renderer<W: Write + 'static>(mode: RenderMode, out: W) -> Box<dyn Renderer> {
    match mode {
        RenderMode::Plot => Box::new(PlotRenderer::new(out)),
        RenderMode::Print => Box::new(PrintRenderer::new(out)),
        RenderMode::None => Box::new(NullRenderer),
    }
}

/// Renderer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn bind(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn draw_shape(&mut self, _shape: DataShape, _path: &DrawPath) -> io::Result<()> {
        Ok(())
    }

    fn show(&mut self, _image: &ScanImage, _board: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Prints the board after every scan.
#[derive(Debug)]
pub struct PrintRenderer<W> {
    out: W,
}

impl<W: Write> PrintRenderer<W> {
    /// Creates the renderer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for PrintRenderer<W> {
    fn bind(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn draw_shape(&mut self, shape: DataShape, _path: &DrawPath) -> io::Result<()> {
        writeln!(self.out, "Drew {shape}")
    }

    fn show(&mut self, image: &ScanImage, board: &str) -> io::Result<()> {
        writeln!(self.out, "\n{board}\n(scan {})", image.tag())?;
        self.out.flush()
    }
}

/// Shading ramp from low to high.
const RAMP: &[u8] = b" .:-=+*#%@";

/// Character columns used for the scan panel.
pub const PLOT_COLUMNS: usize = 48;

/// Text plot: the scan as a shaded character map, then the board and the
/// last drawn shape.
#[derive(Debug)]
pub struct PlotRenderer<W> {
    out: W,
    bound: bool,
    last_shape: Option<(DataShape, usize)>,
}

impl<W: Write> PlotRenderer<W> {
    /// Creates an unbound renderer.
    pub fn new(out: W) -> Self {
        Self {
            out,
            bound: false,
            last_shape: None,
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Shaded character rows for an image, at most `columns` wide.
    pub fn shade(image: &ScanImage, columns: usize) -> Vec<String> {
        let columns = columns.clamp(1, image.width());
        let step = image.width().div_ceil(columns);
        // Character cells are about twice as tall as wide.
        let row_step = step * 2;
        let (lo, hi) = image.range().unwrap_or((0.0, 0.0));
        let span = if hi > lo { hi - lo } else { 1.0 };

        (0..image.height())
            .step_by(row_step)
            .map(|y| {
                (0..image.width())
                    .step_by(step)
                    .map(|x| {
                        let v = image.get(x, y).filter(|v| v.is_finite()).unwrap_or(lo);
                        let level = ((v - lo) / span * (RAMP.len() - 1) as f64).round() as usize;
                        RAMP[level.min(RAMP.len() - 1)] as char
                    })
                    .collect()
            })
            .collect()
    }
}

impl<W: Write> Renderer for PlotRenderer<W> {
    #[instrument(skip(self))]
    fn bind(&mut self) -> io::Result<()> {
        if !self.bound {
            writeln!(self.out, "=== STM tic-tac-toe ===")?;
            self.bound = true;
            debug!("Plot surface bound");
        }
        Ok(())
    }

    fn draw_shape(&mut self, shape: DataShape, path: &DrawPath) -> io::Result<()> {
        self.last_shape = Some((shape, path.strokes().len()));
        Ok(())
    }

    fn show(&mut self, image: &ScanImage, board: &str) -> io::Result<()> {
        if !self.bound {
            return Err(io::Error::other("plot surface shown before bind"));
        }
        writeln!(self.out, "--- scan {} ({}x{}) ---", image.tag(), image.width(), image.height())?;
        for row in Self::shade(image, PLOT_COLUMNS) {
            writeln!(self.out, "{row}")?;
        }
        writeln!(self.out, "--- board ---\n{board}")?;
        if let Some((shape, strokes)) = self.last_shape {
            writeln!(self.out, "--- last drawn: {shape} ({strokes} strokes) ---")?;
        }
        self.out.flush()
    }
}
