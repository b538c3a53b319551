use std::collections::BTreeMap;

/// Most chunk entries kept before the oldest is evicted.
pub const MAX_ENTRIES: usize = 10;
/// How many preceding chunks feed the context of the next one.
pub const LOOKBACK_CHUNKS: usize = 3;
pub const MAX_CONTEXT_POINTS: usize = 5;

/// Rolling memory of the key points each processed chunk reported.
#[derive(Debug, Default)]
pub struct ContextMemory {
    points: BTreeMap<usize, Vec<String>>,
}

impl ContextMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, index: usize, points: Vec<String>) {
        self.points.insert(index, points);
        while self.points.len() > MAX_ENTRIES {
            self.points.pop_first();
        }
    }

    /// Newline-joined points from the chunks just before `index`, newest last.
    pub fn context_for(&self, index: usize) -> String {
        let from = index.saturating_sub(LOOKBACK_CHUNKS);
        let gathered: Vec<&str> = self
            .points
            .range(from..index)
            .flat_map(|(_, points)| points.iter().map(String::as_str))
            .collect();

        let skip = gathered.len().saturating_sub(MAX_CONTEXT_POINTS);
        gathered[skip..].join("\n")
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
