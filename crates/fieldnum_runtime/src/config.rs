//! Registry configuration.

/// Registry configuration options.
#[derive(Clone, Copy, Debug)]
pub struct RegistryConfig {
    /// Reject registrations once the registry has served a lookup. Off by
    /// default: fields may be registered whenever the foreign runtime first
    /// hands one over.
    pub seal_on_first_lookup: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seal_on_first_lookup: false,
        }
    }
}
