use crate::domain::entities::record::{FieldMap, FieldValue, Record};

/// A feature flag as the mobile app consumes it. Locked flags can only be
/// changed by reseeding the store, never through the toggle API.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFlag {
    pub key: String,
    pub enabled: bool,
    pub category: String,
    pub is_locked: bool,
    pub last_modified_by: Option<String>,
    pub last_modified_at: Option<String>,
}

/// Compile-time defaults. A flag missing from the store evaluates to its
/// default here; a key missing from this table evaluates to disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagDefault {
    pub key: &'static str,
    pub enabled: bool,
    pub category: &'static str,
    pub locked: bool,
}

pub const FLAG_DEFAULTS: &[FlagDefault] = &[
    FlagDefault {
        key: "quizzes_enabled",
        enabled: true,
        category: "content",
        locked: false,
    },
    FlagDefault {
        key: "forum_enabled",
        enabled: true,
        category: "content",
        locked: false,
    },
    FlagDefault {
        key: "video_uploads",
        enabled: false,
        category: "content",
        locked: false,
    },
    FlagDefault {
        key: "dark_mode",
        enabled: true,
        category: "appearance",
        locked: false,
    },
    FlagDefault {
        key: "push_notifications",
        enabled: true,
        category: "engagement",
        locked: false,
    },
    FlagDefault {
        key: "maintenance_mode",
        enabled: false,
        category: "operations",
        locked: true,
    },
];

pub fn default_enabled(key: &str) -> bool {
    FLAG_DEFAULTS
        .iter()
        .find(|default| default.key == key)
        .map(|default| default.enabled)
        .unwrap_or(false)
}

/// Looks the key up in the current flag set, falling back to the compile-time
/// default. Absence is not an error.
pub fn is_enabled(flags: &[FeatureFlag], key: &str) -> bool {
    flags
        .iter()
        .find(|flag| flag.key == key)
        .map(|flag| flag.enabled)
        .unwrap_or_else(|| default_enabled(key))
}

pub fn can_toggle(flag: &FeatureFlag) -> bool {
    !flag.is_locked
}

impl FeatureFlag {
    pub fn from_record(record: &Record) -> FeatureFlag {
        let optional = |name: &str| match record.field(name) {
            Some(FieldValue::Null) | None => None,
            Some(value) => Some(value.query_string()),
        };

        FeatureFlag {
            key: record.field_string("key"),
            enabled: matches!(record.field("enabled"), Some(FieldValue::Bool(true))),
            category: record.field_string("category"),
            is_locked: matches!(record.field("is_locked"), Some(FieldValue::Bool(true))),
            last_modified_by: optional("last_modified_by"),
            last_modified_at: optional("last_modified_at"),
        }
    }

    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("key".to_string(), FieldValue::Text(self.key.clone()));
        fields.insert("enabled".to_string(), FieldValue::Bool(self.enabled));
        fields.insert(
            "category".to_string(),
            FieldValue::Text(self.category.clone()),
        );
        fields.insert("is_locked".to_string(), FieldValue::Bool(self.is_locked));
        fields.insert(
            "last_modified_by".to_string(),
            self.last_modified_by
                .clone()
                .map(FieldValue::Text)
                .unwrap_or(FieldValue::Null),
        );
        fields.insert(
            "last_modified_at".to_string(),
            self.last_modified_at
                .clone()
                .map(FieldValue::Text)
                .unwrap_or(FieldValue::Null),
        );
        fields
    }
}

impl From<FlagDefault> for FeatureFlag {
    fn from(default: FlagDefault) -> Self {
        FeatureFlag {
            key: default.key.to_string(),
            enabled: default.enabled,
            category: default.category.to_string(),
            is_locked: default.locked,
            last_modified_by: None,
            last_modified_at: None,
        }
    }
}
