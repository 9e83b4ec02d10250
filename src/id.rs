/// Source of fresh segment ids for segments created by a split
pub trait IdGenerator: Send + Sync {
    fn next_id(&mut self) -> String;
}

#[derive(Debug, Default)]
pub struct UuidIdGen;

impl IdGenerator for UuidIdGen {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic sequential ids for tests and golden-file snapshots.
#[derive(Debug, Default)]
pub struct SequentialIdGen {
    prefix: String,
    next: u64,
}

impl SequentialIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl IdGenerator for SequentialIdGen {
    fn next_id(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        format!("{}{id}", self.prefix)
    }
}
