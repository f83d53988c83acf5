use std::collections::VecDeque;

use crate::models::ConversionInput;

pub const HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub name: String,
    pub original_format: String,
    pub converted_format: String,
    pub size: String,
}

/// Label for where a conversion came from: `URL`, or the uploaded file's MIME subtype.
pub fn original_format(input: &ConversionInput) -> String {
    match input {
        ConversionInput::Url(_) => "URL".to_string(),
        ConversionInput::File(file) => file
            .mime_type
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .filter(|subtype| !subtype.is_empty())
            .unwrap_or("unknown")
            .to_uppercase(),
    }
}

/// Recent successful conversions, newest first. Lives only as long as the app.
#[derive(Debug, Clone, Default)]
pub struct ConversionHistory {
    entries: VecDeque<HistoryEntry>,
}

impl ConversionHistory {
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
