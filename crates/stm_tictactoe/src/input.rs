//! Turning a human's pointer or cell choice into a validated cell.

use crate::mapper::{CoordinateMapper, Unresolved};
use crate::scan::ScanImage;
use crate::shapes::Point;
use derive_more::{Display, Error};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use tictactoe_engine::{Board, Cell};
use tracing::{debug, instrument, warn};

/// One gesture from a human player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// A click in scan-image pixel coordinates.
    Pointer(Point),
    /// An explicit cell index, 0-8.
    Cell(usize),
}

/// A human move that must be asked for again. Never fatal.
#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum InputRejection {
    /// The click does not pick out exactly one cell.
    #[display("ambiguous input at {point}: {reason}")]
    Ambiguous {
        /// Where the click landed.
        point: Point,
        /// Why it could not be resolved.
        reason: Unresolved,
    },
    /// The explicit index is not a cell.
    #[display("ambiguous input: there is no cell {_0}")]
    NoSuchCell(#[error(not(source))] usize),
    /// The cell already holds a mark.
    #[display("{_0} is already occupied")]
    Occupied(#[error(not(source))] Cell),
}

impl InputRejection {
    /// True for the ambiguous-input family.
    pub fn is_ambiguous(&self) -> bool {
        !matches!(self, InputRejection::Occupied(_))
    }
}

/// Resolves human interactions against the placed board.
#[derive(Debug, Clone, Copy)]
pub struct MoveInputAdapter {
    mapper: CoordinateMapper,
}

impl MoveInputAdapter {
    /// Creates an adapter for a placed board.
    pub fn new(mapper: CoordinateMapper) -> Self {
        Self { mapper }
    }

    /// Resolves an interaction to an empty cell.
    ///
    /// Pointers resolve to the nearest region center within the scan frame.
    /// Nothing is retried here; the caller re-prompts on rejection.
    #[instrument(skip(self, image, board))]
    pub fn resolve_human_move(
        &self,
        image: &ScanImage,
        interaction: Interaction,
        board: &Board,
    ) -> Result<Cell, InputRejection> {
        let cell = match interaction {
            Interaction::Cell(index) => {
                Cell::from_index(index).ok_or(InputRejection::NoSuchCell(index))?
            }
            Interaction::Pointer(point) => {
                let in_frame = point.x >= 0.0
                    && point.y >= 0.0
                    && point.x <= image.width() as f64
                    && point.y <= image.height() as f64;
                let resolved = if in_frame {
                    self.mapper.region_to_cell(point)
                } else {
                    Err(Unresolved::OutsideGrid)
                };
                resolved.map_err(|reason| InputRejection::Ambiguous { point, reason })?
            }
        };

        if !board.is_empty(cell) {
            return Err(InputRejection::Occupied(cell));
        }
        debug!(%cell, "Human move resolved");
        Ok(cell)
    }
}

/// The human input source closed or failed.
#[derive(Debug, Clone, Display, Error)]
#[display("Input error: {} at {}:{}", message, file, line)]
pub struct InputError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl InputError {
    /// Creates a new input error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Source of human interactions.
pub trait HumanInput {
    /// Blocks until the human makes a gesture. `board` is the current board text.
    fn next_interaction(&mut self, board: &str) -> Result<Interaction, InputError>;

    /// Tells the human why the last gesture was refused.
    fn rejected(&mut self, _rejection: &InputRejection) -> Result<(), InputError> {
        Ok(())
    }
}

/// Line-oriented terminal input.
///
/// Accepts `x y` (a click in scan pixels), `#n` or `n` (cell number 1-9 as
/// shown on the board) or a cell label such as `center`.
pub struct StdinInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StdinInput<R, W> {
    /// Wraps a reader and the writer prompts go to.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn parse(line: &str) -> Option<Interaction> {
        let line = line.trim();
        let numbered = line.strip_prefix('#').unwrap_or(line);
        if let Ok(n) = numbered.trim().parse::<usize>() {
            return n.checked_sub(1).map(Interaction::Cell);
        }

        let coords: Option<Vec<f64>> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok();
        if let Some(&[x, y]) = coords.as_deref() {
            return Some(Interaction::Pointer(Point::new(x, y)));
        }
        Cell::from_label_or_number(line).map(|c| Interaction::Cell(c.index()))
    }
}

impl<R: BufRead, W: Write> HumanInput for StdinInput<R, W> {
    fn next_interaction(&mut self, board: &str) -> Result<Interaction, InputError> {
        let io_err = |e: std::io::Error| InputError::new(format!("terminal I/O failed: {e}"));
        writeln!(self.writer, "\n{board}").map_err(io_err)?;
        loop {
            write!(self.writer, "Your move (x y, #cell or label): ").map_err(io_err)?;
            self.writer.flush().map_err(io_err)?;

            let mut line = String::new();
            if self.reader.read_line(&mut line).map_err(io_err)? == 0 {
                return Err(InputError::new("input closed before a move was made"));
            }
            match Self::parse(&line) {
                Some(interaction) => return Ok(interaction),
                None => writeln!(self.writer, "Could not read '{}'", line.trim()).map_err(io_err)?,
            }
        }
    }

    fn rejected(&mut self, rejection: &InputRejection) -> Result<(), InputError> {
        writeln!(self.writer, "Try again: {rejection}")
            .map_err(|e| InputError::new(format!("terminal I/O failed: {e}")))
    }
}

/// Plays back a fixed list of interactions.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    queue: VecDeque<Interaction>,
    rejections: Vec<InputRejection>,
}

impl ScriptedInput {
    /// Creates a script.
    pub fn new(interactions: impl IntoIterator<Item = Interaction>) -> Self {
        Self {
            queue: interactions.into_iter().collect(),
            rejections: Vec::new(),
        }
    }

    /// Rejections received so far.
    pub fn rejections(&self) -> &[InputRejection] {
        &self.rejections
    }

    /// Interactions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl HumanInput for ScriptedInput {
    fn next_interaction(&mut self, _board: &str) -> Result<Interaction, InputError> {
        self.queue
            .pop_front()
            .ok_or_else(|| InputError::new("scripted input exhausted"))
    }

    fn rejected(&mut self, rejection: &InputRejection) -> Result<(), InputError> {
        warn!(%rejection, "Scripted interaction rejected");
        self.rejections.push(rejection.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ScanTag;
    use tictactoe_engine::{Mark, Square};

    fn setup() -> (MoveInputAdapter, ScanImage) {
        let mapper = CoordinateMapper::centered(512, 512, 384.0).unwrap();
        let image = ScanImage::new(512, 512, vec![0.0; 512 * 512], ScanTag::default()).unwrap();
        (MoveInputAdapter::new(mapper), image)
    }

    #[test]
    fn test_pointer_resolves_to_nearest_center() {
        let (adapter, image) = setup();
        let cell = adapter
            .resolve_human_move(
                &image,
                Interaction::Pointer(Point::new(400.0, 120.0)),
                &Board::new(),
            )
            .unwrap();
        assert_eq!(cell, Cell::TopRight);
    }

    #[test]
    fn test_boundary_click_is_ambiguous() {
        let (adapter, image) = setup();
        let err = adapter
            .resolve_human_move(
                &image,
                Interaction::Pointer(Point::new(256.0, 320.0)),
                &Board::new(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            InputRejection::Ambiguous {
                reason: Unresolved::Equidistant(Cell::Center, Cell::BottomCenter),
                ..
            }
        ));
        assert!(err.is_ambiguous());
    }

    #[test]
    fn test_click_between_first_two_cells_is_ambiguous() {
        let mapper = CoordinateMapper::centered(96, 96, 72.0).unwrap();
        let image = ScanImage::new(96, 96, vec![0.0; 96 * 96], ScanTag::default()).unwrap();
        let adapter = MoveInputAdapter::new(mapper);
        let board = Board::new();

        let err = adapter
            .resolve_human_move(&image, Interaction::Pointer(Point::new(36.0, 24.0)), &board)
            .unwrap_err();
        assert_eq!(
            err,
            InputRejection::Ambiguous {
                point: Point::new(36.0, 24.0),
                reason: Unresolved::Equidistant(Cell::TopLeft, Cell::TopCenter),
            }
        );

        // Where four regions meet.
        let four_way = Interaction::Pointer(Point::new(60.0, 60.0));
        let corner = adapter.resolve_human_move(&image, four_way, &board);
        assert!(matches!(corner, Err(InputRejection::Ambiguous { .. })));

        // The outer corner of the grid belongs to a single cell.
        assert_eq!(
            adapter.resolve_human_move(
                &image,
                Interaction::Pointer(Point::new(84.0, 84.0)),
                &board,
            ),
            Ok(Cell::BottomRight)
        );
    }

    #[test]
    fn test_click_off_grid_is_ambiguous() {
        let (adapter, image) = setup();
        for p in [Point::new(5.0, 5.0), Point::new(-1.0, 256.0), Point::new(256.0, 900.0)] {
            let err = adapter
                .resolve_human_move(&image, Interaction::Pointer(p), &Board::new())
                .unwrap_err();
            assert!(matches!(
                err,
                InputRejection::Ambiguous {
                    reason: Unresolved::OutsideGrid,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_occupied_and_missing_cells_rejected() {
        let (adapter, image) = setup();
        let mut board = Board::new();
        board.set(Cell::Center, Square::Occupied(Mark::Cross));
        assert_eq!(
            adapter.resolve_human_move(&image, Interaction::Cell(4), &board),
            Err(InputRejection::Occupied(Cell::Center))
        );
        assert_eq!(
            adapter.resolve_human_move(&image, Interaction::Cell(9), &board),
            Err(InputRejection::NoSuchCell(9))
        );
    }

    #[test]
    fn test_stdin_parsing() {
        let input = "nonsense\n120.5, 300\n#5\ntop-left\n7\n";
        let mut stdin = StdinInput::new(input.as_bytes(), Vec::new());
        assert_eq!(
            stdin.next_interaction("").unwrap(),
            Interaction::Pointer(Point::new(120.5, 300.0))
        );
        assert_eq!(stdin.next_interaction("").unwrap(), Interaction::Cell(4));
        assert_eq!(stdin.next_interaction("").unwrap(), Interaction::Cell(0));
        assert_eq!(stdin.next_interaction("").unwrap(), Interaction::Cell(6));
        assert!(stdin.next_interaction("").is_err());
    }

    #[test]
    fn test_scripted_input_records_rejections() {
        let mut script = ScriptedInput::new([Interaction::Cell(0)]);
        assert_eq!(script.next_interaction("").unwrap(), Interaction::Cell(0));
        script.rejected(&InputRejection::NoSuchCell(12)).unwrap();
        assert_eq!(script.rejections().len(), 1);
        assert!(script.next_interaction("").is_err());
    }
}
