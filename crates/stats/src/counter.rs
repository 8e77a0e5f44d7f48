use serde::{Deserialize, Serialize};

/// A pair of monotonically increasing tallies.
///
/// `registered` counts entries added to the registry, `executed` counts
/// handler invocations. Both start at zero and only ever grow by one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub registered: u64,
    pub executed: u64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new `registered` value.
    pub fn register(&mut self) -> u64 {
        self.registered += 1;
        self.registered
    }

    /// Returns the new `executed` value.
    pub fn execute(&mut self) -> u64 {
        self.executed += 1;
        self.executed
    }
}
