use std::collections::HashSet;

/// Destination sheet titles claimed during one copy run.
///
/// Titles are compared case-insensitively because the destination refuses a
/// sheet whose title differs from an existing one only by case.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    claimed: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the registry with the titles already present in the destination.
    pub fn with_existing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.claimed.insert(normalize(name.as_ref()));
        }
        registry
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claimed.contains(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Picks the first free title among `base`, `base (1)`, `base (2)`, ... and
    /// claims it.
    pub fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut suffix = 1u32;
        while self.contains(&candidate) {
            candidate = format!("{base} ({suffix})");
            suffix += 1;
        }
        self.claimed.insert(normalize(&candidate));
        candidate
    }
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
}
