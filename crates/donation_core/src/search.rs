use shared::{directory::sample_directory, domain::DirectoryEntry};

/// Queries shorter than this never show results.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new(sample_directory())
    }
}

impl Directory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    /// Case-insensitive substring match on name or code, in directory order.
    pub fn search(&self, query: &str) -> Vec<&DirectoryEntry> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                entry.name.to_lowercase().contains(&needle)
                    || entry.code.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
