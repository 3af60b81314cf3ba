//! Namespaced storage keys.

/// The entries the monitor and orchestrator share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Ids never to open automatically again.
    Handled,
    /// Ids finished through a scored unit.
    Review,
    /// Single-slot completion mailbox.
    Signal,
    AutoRun,
    /// Debounce for the most recent automatic open.
    LastOpened,
}

impl StorageKey {
    /// Every key, in reset order.
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Handled,
        StorageKey::Signal,
        StorageKey::AutoRun,
        StorageKey::Review,
        StorageKey::LastOpened,
    ];

    /// Key name without the namespace prefix.
    pub fn suffix(&self) -> &'static str {
        match self {
            StorageKey::Handled => "clicked_ids_v2",
            StorageKey::Review => "exam_check_ids",
            StorageKey::Signal => "signal_next",
            StorageKey::AutoRun => "auto_start_state",
            StorageKey::LastOpened => "last_clicked_id",
        }
    }
}

/// Key namespace shared by every tab of the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full storage key.
    pub fn key(&self, key: StorageKey) -> String {
        format!("{}{}", self.prefix, key.suffix())
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new("ct_")
    }
}
