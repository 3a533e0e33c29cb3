//! In-process activity type registry.

use std::collections::HashMap;
use std::sync::RwLock;

use seclog_core::ActivityType;

use crate::error::AuditError;
use crate::ports::ActivityTypeRegistry;

/// Activity type registry keyed by name. Registering an existing name
/// replaces the descriptor.
#[derive(Debug, Default)]
pub struct MemoryTypeRegistry {
    types: RwLock<HashMap<String, ActivityType>>,
}

impl MemoryTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered descriptor with the given name.
    pub fn get(&self, name: &str) -> Option<ActivityType> {
        self.types.read().ok()?.get(name).cloned()
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.types.read().map(|t| t.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActivityTypeRegistry for MemoryTypeRegistry {
    fn register(&self, activity_type: ActivityType) -> Result<(), AuditError> {
        let mut types = self.types.write().map_err(|e| {
            AuditError::RegistrationFailed(format!("Failed to acquire write lock: {}", e))
        })?;
        types.insert(activity_type.name.clone(), activity_type);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seclog_core::ActionType;

    #[test]
    fn test_register_replaces_by_name() {
        let registry = MemoryTypeRegistry::new();
        registry
            .register(ActivityType::new("T", [ActionType::new(1, "One")]))
            .unwrap();
        registry
            .register(ActivityType::new("T", [ActionType::new(2, "Two")]))
            .unwrap();

        assert_eq!(registry.len(), 1);
        let stored = registry.get("T").unwrap();
        assert_eq!(stored.actions, vec![ActionType::new(2, "Two")]);
        assert!(registry.get("missing").is_none());
    }
}
