use rustyline::completion::Pair;

/// Table names as of the last listing.
#[derive(Debug, Clone, Default)]
pub struct TableCompleter {
    tables: Vec<String>,
}

impl TableCompleter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_tables(&mut self, tables: &[String]) {
        self.tables = tables.to_vec();
    }

    /// Completes a bare name, or a `:name` override keeping its colon.
    pub fn complete_table(&self, word: &str) -> Vec<Pair> {
        let (marker, prefix) = match word.strip_prefix(':') {
            Some(prefix) => (":", prefix),
            None => ("", word),
        };

        self.tables
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| Pair {
                display: name.clone(),
                replacement: format!("{}{} ", marker, name),
            })
            .collect()
    }
}
