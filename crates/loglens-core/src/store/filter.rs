use crate::domain::LogEntry;

/// Case-insensitive substring match over an entry's tag or process,
/// category and message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordFilter {
    needle: String,
}

impl KeywordFilter {
    pub fn new(keyword: &str) -> Self {
        Self {
            needle: keyword.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        let hit = |field: &str| field.to_lowercase().contains(&self.needle);

        match entry {
            LogEntry::Android(e) => hit(&e.tag) || hit(&e.message),
            LogEntry::Ios(e) => {
                hit(&e.process) || e.category.as_deref().is_some_and(hit) || hit(&e.message)
            }
        }
    }
}
