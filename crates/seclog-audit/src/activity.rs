//! Registration of the content security activity type.

use seclog_core::{ActionType, ActivityType, SaveType, CONTENT_SECURITY_ACTIVITY};

use crate::error::AuditError;
use crate::ports::ActivityTypeRegistry;

/// Descriptor with one action per [`SaveType`] member, labelled by the
/// member's symbolic name.
pub fn content_security_activity_type() -> ActivityType {
    ActivityType::new(
        CONTENT_SECURITY_ACTIVITY,
        SaveType::ALL
            .iter()
            .map(|save_type| ActionType::new(save_type.code(), save_type.name())),
    )
}

/// Register the content security activity type.
///
/// Registries upsert by name, so this is safe to call from every wiring
/// path, any number of times.
pub fn register_activity_type(
    registry: Option<&dyn ActivityTypeRegistry>,
) -> Result<ActivityType, AuditError> {
    let registry = registry
        .ok_or_else(|| AuditError::InvalidArgument("activity type registry is required".into()))?;

    let activity_type = content_security_activity_type();
    registry.register(activity_type.clone())?;

    tracing::debug!(
        activity_type = %activity_type.name,
        actions = activity_type.actions.len(),
        "Activity type registered"
    );

    Ok(activity_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryTypeRegistry;

    #[test]
    fn test_descriptor_has_one_action_per_save_type() {
        let activity_type = content_security_activity_type();

        assert_eq!(activity_type.name, "ContentSecurity");
        assert_eq!(activity_type.actions.len(), SaveType::ALL.len());
        for save_type in SaveType::ALL {
            let action = activity_type.action(save_type.code()).unwrap();
            assert_eq!(action.name, save_type.name());
        }
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = MemoryTypeRegistry::new();

        register_activity_type(Some(&registry)).unwrap();
        register_activity_type(Some(&registry)).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(CONTENT_SECURITY_ACTIVITY),
            Some(content_security_activity_type())
        );
    }

    #[test]
    fn test_register_without_registry() {
        let err = register_activity_type(None).unwrap_err();
        assert!(matches!(err, AuditError::InvalidArgument(_)));
    }
}
