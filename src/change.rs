use std::fmt;

/// How risky a change is for existing consumers of the API.
///
/// Variants are declared in display order: attachments are always emitted
/// Breaking first, then Dangerous, then Safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Breaking,
    Dangerous,
    Safe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Breaking, Severity::Dangerous, Severity::Safe];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Breaking => "breaking",
            Severity::Dangerous => "dangerous",
            Severity::Safe => "safe",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub severity: Severity,
    pub message: String,
}

impl Change {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

#[cfg(test)]
impl Change {
    pub fn breaking(message: impl Into<String>) -> Self {
        Self::new(Severity::Breaking, message)
    }

    pub fn dangerous(message: impl Into<String>) -> Self {
        Self::new(Severity::Dangerous, message)
    }

    pub fn safe(message: impl Into<String>) -> Self {
        Self::new(Severity::Safe, message)
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}
