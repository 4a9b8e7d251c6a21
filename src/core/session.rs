use crate::store::Table;

/// Per-run state of the shell. Nothing here outlives the process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub current_table: Option<Table>,
    pub consistent_read: bool,
    pub show_elapsed: bool,
    /// Table names for completion, as of the last `tables` call.
    pub known_tables: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> String {
        match &self.current_table {
            Some(table) => format!("{}> ", table.name),
            None => "dynash> ".to_string(),
        }
    }
}
