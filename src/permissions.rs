//! The fixed catalog of per-user capability flags.
//!
//! Authorization is a flat map of boolean flags stored on one
//! `user_permissions` row per user. The catalog below is the single source
//! of truth for valid flag names: updates reject any key not listed here,
//! and reads always return every key (missing entries count as `false`).

use serde_json::{Map, Value};

pub const PERMISSION_KEYS: [&str; 60] = [
    // users
    "can_view_users",
    "can_create_users",
    "can_edit_users",
    "can_delete_users",
    // guests
    "can_view_guests",
    "can_create_guests",
    "can_edit_guests",
    "can_delete_guests",
    // presenters
    "can_view_presenters",
    "can_create_presenters",
    "can_edit_presenters",
    "can_delete_presenters",
    // emissions
    "can_view_emissions",
    "can_create_emissions",
    "can_edit_emissions",
    "can_delete_emissions",
    // show plans
    "can_view_showplans",
    "can_create_showplan",
    "can_edit_showplans",
    "can_delete_showplans",
    // segments
    "can_view_segments",
    "can_create_segments",
    "can_edit_segments",
    "can_delete_segments",
    // archives
    "can_view_archives",
    "can_create_archives",
    "can_edit_archives",
    "can_delete_archives",
    // citations
    "can_view_citations",
    "can_create_citations",
    "can_edit_citations",
    "can_delete_citations",
    // notifications
    "can_view_notifications",
    "can_create_notifications",
    "can_edit_notifications",
    "can_delete_notifications",
    // management
    "can_manage_roles",
    "can_manage_permissions",
    "can_apply_role_templates",
    "can_invite_users",
    "can_view_audit_logs",
    "can_archive_audit_logs",
    "can_delete_audit_logs",
    "can_view_login_history",
    "can_export_login_history",
    "can_view_dashboard",
    "can_manage_settings",
    "can_send_notifications",
    "can_assign_presenters",
    "can_assign_guests",
    "can_reorder_segments",
    "can_change_show_status",
    "can_publish_showplans",
    "can_view_reports",
    "can_export_reports",
    "can_import_archives",
    "can_export_archives",
    "can_view_messages",
    "can_send_messages",
    "can_validate_citations",
];

pub fn is_valid_key(key: &str) -> bool {
    PERMISSION_KEYS.contains(&key)
}

/// All catalog keys set to `false`; the state of a freshly initialized user.
pub fn default_flags() -> Map<String, Value> {
    PERMISSION_KEYS
        .iter()
        .map(|k| (k.to_string(), Value::Bool(false)))
        .collect()
}

/// All catalog keys set to `true`; used by the admin bootstrap.
pub fn all_granted_flags() -> Map<String, Value> {
    PERMISSION_KEYS
        .iter()
        .map(|k| (k.to_string(), Value::Bool(true)))
        .collect()
}

/// Project a stored JSONB map onto the catalog: every key present, each a
/// bool, anything stored under an unknown name dropped. Rows written before
/// the catalog grew stay readable this way.
pub fn normalize_flags(stored: &Value) -> Map<String, Value> {
    let mut out = default_flags();
    if let Value::Object(map) = stored {
        for (key, value) in map {
            if is_valid_key(key) {
                out.insert(key.clone(), Value::Bool(value.as_bool().unwrap_or(false)));
            }
        }
    }
    out
}

pub fn flag_enabled(stored: &Value, key: &str) -> bool {
    stored
        .get(key)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_has_no_duplicates() {
        let mut keys: Vec<&str> = PERMISSION_KEYS.to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), PERMISSION_KEYS.len());
    }

    #[test]
    fn named_keys_are_in_catalog() {
        for key in [
            "can_create_showplan",
            "can_view_guests",
            "can_delete_archives",
            "can_edit_users",
            "can_manage_roles",
        ] {
            assert!(is_valid_key(key), "missing {key}");
        }
        assert!(!is_valid_key("can_fly"));
    }

    #[test]
    fn default_flags_cover_catalog_all_false() {
        let flags = default_flags();
        assert_eq!(flags.len(), PERMISSION_KEYS.len());
        assert!(flags.values().all(|v| v == &json!(false)));
    }

    #[test]
    fn normalize_fills_missing_and_drops_unknown() {
        let stored = json!({ "can_view_guests": true, "bogus_key": true });
        let flags = normalize_flags(&stored);
        assert_eq!(flags.len(), PERMISSION_KEYS.len());
        assert_eq!(flags["can_view_guests"], json!(true));
        assert_eq!(flags["can_edit_users"], json!(false));
        assert!(!flags.contains_key("bogus_key"));
    }
}
