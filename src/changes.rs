use crate::change::{Change, Severity};

/// Changes partitioned by severity. Each bucket keeps the order in which the
/// differ reported its changes.
#[derive(Debug, Default)]
pub struct Buckets<'a> {
    breaking: Vec<&'a Change>,
    dangerous: Vec<&'a Change>,
    safe: Vec<&'a Change>,
}

impl<'a> Buckets<'a> {
    pub fn classify(changes: &'a [Change]) -> Self {
        let of = |level: Severity| -> Vec<&'a Change> {
            changes.iter().filter(|c| c.severity == level).collect()
        };

        Self {
            breaking: of(Severity::Breaking),
            dangerous: of(Severity::Dangerous),
            safe: of(Severity::Safe),
        }
    }

    pub fn get(&self, level: Severity) -> &[&'a Change] {
        match level {
            Severity::Breaking => &self.breaking,
            Severity::Dangerous => &self.dangerous,
            Severity::Safe => &self.safe,
        }
    }

    pub fn len(&self) -> usize {
        self.breaking.len() + self.dangerous.len() + self.safe.len()
    }

    /// Non-empty buckets, Breaking first.
    pub fn non_empty(&self) -> impl Iterator<Item = (Severity, &[&'a Change])> + '_ {
        Severity::ALL
            .into_iter()
            .map(|level| (level, self.get(level)))
            .filter(|(_, bucket)| !bucket.is_empty())
    }
}
