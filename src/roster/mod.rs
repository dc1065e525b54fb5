use crate::tabular::{read_table, TabularError};
use crate::utils::numeric_id;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Header of the patient identifier column
pub const ROSTER_ID_COLUMN: &str = "ID";

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Tabular error: {0}")]
    TabularError(#[from] TabularError),

    #[error("Roster {0} has no 'ID' column")]
    MissingIdColumn(String),
}

/// Patients eligible for one cancer type
#[derive(Debug, Clone, Default)]
pub struct Roster {
    ids: HashSet<u64>,
}

impl Roster {
    pub fn contains(&self, patient_id: u64) -> bool {
        self.ids.contains(&patient_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<u64> for Roster {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Load the inclusion list of one cancer type.
///
/// Cells of the `ID` column that are not integers are ignored.
pub fn load_roster(path: &Path, header_row: usize) -> Result<Roster, RosterError> {
    let table = read_table(path, header_row)?;
    let column = table
        .column(ROSTER_ID_COLUMN)
        .ok_or_else(|| RosterError::MissingIdColumn(path.display().to_string()))?;

    Ok((0..table.len())
        .filter_map(|row| table.cell(row, column))
        .filter_map(numeric_id)
        .collect())
}
