use super::{Policy, PolicyError, RulesPolicy};
use crate::{Board, Cell, Mark};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Exported policy: per-position preference scores for the nine cells.
///
/// Keys are [`Board::key`] strings (`X`, `O`, `.`, row-major). Positions
/// missing from the table fall back to [`RulesPolicy`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyTable {
    /// Display name of the exported model.
    #[serde(default)]
    pub name: String,
    /// Preference scores keyed by board.
    pub preferences: HashMap<String, [f32; 9]>,
}

/// Leading bytes of a zip archive.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Agent that plays from a [`PolicyTable`].
pub struct TablePolicy {
    table: PolicyTable,
    fallback: RulesPolicy,
}

impl TablePolicy {
    /// Wraps an in-memory table.
    pub fn new(table: PolicyTable) -> Self {
        Self {
            table,
            fallback: RulesPolicy::new(),
        }
    }

    /// Loads a JSON-encoded table from disk.
    ///
    /// A `.zip` path must still hold the JSON table; zip archives are
    /// refused with an unsupported-format error.
    #[instrument(fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let bytes = std::fs::read(path).map_err(|e| {
            PolicyError::new(format!("Failed to read policy file {}: {}", path.display(), e))
        })?;
        if bytes.starts_with(ZIP_MAGIC) {
            return Err(PolicyError::new(format!(
                "Unsupported model format: {} is a zip archive, expected a JSON policy table",
                path.display()
            )));
        }
        let table: PolicyTable = serde_json::from_slice(&bytes).map_err(|e| {
            PolicyError::new(format!("Failed to parse policy file {}: {}", path.display(), e))
        })?;
        info!(name = %table.name, positions = table.preferences.len(), "Policy table loaded");
        Ok(Self::new(table))
    }
}

impl Policy for TablePolicy {
    fn choose(&mut self, board: &Board, mark: Mark) -> Option<Cell> {
        let Some(scores) = self.table.preferences.get(&board.key()) else {
            debug!(key = %board.key(), "Position not in table, using rules");
            return self.fallback.choose(board, mark);
        };
        board
            .empty_cells()
            .into_iter()
            .max_by(|a, b| scores[a.index()].total_cmp(&scores[b.index()]))
    }

    fn name(&self) -> &str {
        if self.table.name.is_empty() {
            "model"
        } else {
            &self.table.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Square;
    use std::io::Write;

    #[test]
    fn test_highest_scoring_empty_cell_wins() {
        let mut scores = [0.0; 9];
        scores[Cell::Center.index()] = 5.0;
        scores[Cell::BottomRight.index()] = 2.0;
        let mut board = Board::new();
        board.set(Cell::TopLeft, Square::Occupied(Mark::Cross));
        let table = PolicyTable {
            name: "unit".to_string(),
            preferences: HashMap::from([(board.key(), scores)]),
        };

        let mut policy = TablePolicy::new(table);
        assert_eq!(policy.choose(&board, Mark::Nought), Some(Cell::Center));

        board.set(Cell::Center, Square::Occupied(Mark::Nought));
        // Unknown position: rules fallback still picks a legal cell.
        let cell = policy.choose(&board, Mark::Cross).unwrap();
        assert!(board.is_empty(cell));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"{{"name": "run7", "preferences": {{".........": [0,0,9,0,0,0,0,0,0]}}}}"#
        )
        .unwrap();

        let mut policy = TablePolicy::from_file(&path).unwrap();
        assert_eq!(policy.name(), "run7");
        assert_eq!(policy.choose(&Board::new(), Mark::Cross), Some(Cell::TopRight));
    }

    #[test]
    fn test_zip_archive_is_an_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.zip");
        std::fs::write(&path, b"PK\x03\x04\x14\x00\x00\x00\x08\x00\xff\xfe").unwrap();

        let err = TablePolicy::from_file(&path).err().unwrap();
        assert!(err.to_string().contains("Unsupported model format"), "{err}");
    }

    #[test]
    fn test_json_table_under_zip_name_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.zip");
        std::fs::write(&path, r#"{"preferences": {}}"#).unwrap();
        assert!(TablePolicy::from_file(&path).is_ok());
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        assert!(TablePolicy::from_file(Path::new("missing/policy.zip")).is_err());
    }
}
