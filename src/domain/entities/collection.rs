use crate::domain::entities::record::{FieldMap, Record};

/// The content collections the console manages. The storage name is the
/// collection key in the backing store; the label is what the UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Carousel,
    Quizzes,
    Questions,
    ForumPosts,
    Videos,
    FeatureFlags,
    ModeratorApplications,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 7] = [
        CollectionKind::Carousel,
        CollectionKind::Quizzes,
        CollectionKind::Questions,
        CollectionKind::ForumPosts,
        CollectionKind::Videos,
        CollectionKind::FeatureFlags,
        CollectionKind::ModeratorApplications,
    ];

    pub fn storage_name(self) -> &'static str {
        match self {
            CollectionKind::Carousel => "carousel_items",
            CollectionKind::Quizzes => "quizzes",
            CollectionKind::Questions => "quiz_questions",
            CollectionKind::ForumPosts => "forum_posts",
            CollectionKind::Videos => "videos",
            CollectionKind::FeatureFlags => "feature_flags",
            CollectionKind::ModeratorApplications => "moderator_applications",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Carousel => "Carousel",
            CollectionKind::Quizzes => "Quizzes",
            CollectionKind::Questions => "Quiz questions",
            CollectionKind::ForumPosts => "Forum posts",
            CollectionKind::Videos => "Videos",
            CollectionKind::FeatureFlags => "Feature flags",
            CollectionKind::ModeratorApplications => "Moderator applications",
        }
    }

    pub fn from_storage_name(name: &str) -> Option<CollectionKind> {
        CollectionKind::ALL
            .into_iter()
            .find(|kind| kind.storage_name() == name)
    }
}

/// Per-collection field configuration. This is data, not code: which fields
/// the table shows, which ones free-text search scans, and which ones a new
/// record must fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConfig {
    pub visible_fields: &'static [&'static str],
    pub searchable_fields: &'static [&'static str],
    pub required_fields: &'static [&'static str],
}

const CAROUSEL_CONFIG: FieldConfig = FieldConfig {
    visible_fields: &["title", "image_url", "link_url", "position", "active"],
    searchable_fields: &["title", "link_url"],
    required_fields: &["title", "image_url"],
};

const QUIZZES_CONFIG: FieldConfig = FieldConfig {
    visible_fields: &["title", "description", "difficulty", "tags", "published"],
    searchable_fields: &["title", "description", "tags"],
    required_fields: &["title"],
};

const QUESTIONS_CONFIG: FieldConfig = FieldConfig {
    visible_fields: &["quiz_id", "prompt", "options", "answer_index", "explanation"],
    searchable_fields: &["prompt", "explanation"],
    required_fields: &["quiz_id", "prompt"],
};

const FORUM_POSTS_CONFIG: FieldConfig = FieldConfig {
    visible_fields: &["author", "title", "body", "tags", "pinned", "reported"],
    searchable_fields: &["author", "title", "body", "tags"],
    required_fields: &["author", "title"],
};

const VIDEOS_CONFIG: FieldConfig = FieldConfig {
    visible_fields: &["title", "url", "duration_seconds", "category", "published"],
    searchable_fields: &["title", "category"],
    required_fields: &["title", "url"],
};

const FEATURE_FLAGS_CONFIG: FieldConfig = FieldConfig {
    visible_fields: &[
        "key",
        "enabled",
        "category",
        "is_locked",
        "last_modified_by",
        "last_modified_at",
    ],
    searchable_fields: &["key", "category"],
    required_fields: &["key"],
};

const MODERATOR_APPLICATIONS_CONFIG: FieldConfig = FieldConfig {
    visible_fields: &["applicant", "email", "motivation", "status"],
    searchable_fields: &["applicant", "email", "motivation"],
    required_fields: &["applicant", "email"],
};

pub fn field_config(kind: CollectionKind) -> &'static FieldConfig {
    match kind {
        CollectionKind::Carousel => &CAROUSEL_CONFIG,
        CollectionKind::Quizzes => &QUIZZES_CONFIG,
        CollectionKind::Questions => &QUESTIONS_CONFIG,
        CollectionKind::ForumPosts => &FORUM_POSTS_CONFIG,
        CollectionKind::Videos => &VIDEOS_CONFIG,
        CollectionKind::FeatureFlags => &FEATURE_FLAGS_CONFIG,
        CollectionKind::ModeratorApplications => &MODERATOR_APPLICATIONS_CONFIG,
    }
}

/// One displayed column, derived from the field configuration each render
/// pass. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub id: String,
    pub header: String,
    pub field: String,
    pub sortable: bool,
}

pub fn derive_columns(kind: CollectionKind) -> Vec<ColumnSpec> {
    field_config(kind)
        .visible_fields
        .iter()
        .map(|field| ColumnSpec {
            id: (*field).to_string(),
            header: humanize_field_name(field),
            field: (*field).to_string(),
            sortable: true,
        })
        .collect()
}

/// Strips non-visible fields from a record before display or export.
pub fn filter_item(record: &Record, kind: CollectionKind) -> Record {
    let visible = field_config(kind).visible_fields;
    let fields: FieldMap = record
        .fields
        .iter()
        .filter(|(name, _)| visible.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    Record {
        id: record.id.clone(),
        fields,
        created_at: record.created_at.clone(),
        updated_at: record.updated_at.clone(),
        deleted_at: record.deleted_at.clone(),
    }
}

/// "answer_index" -> "Answer index".
pub fn humanize_field_name(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Display-time lookup of a quiz title by its id. Questions store the parent
/// quiz id, so renaming a quiz never strands its questions.
pub fn quiz_title_by_id(quizzes: &[Record], quiz_id: &str) -> Option<String> {
    quizzes
        .iter()
        .find(|quiz| quiz.id.as_str() == quiz_id)
        .map(|quiz| quiz.field_string("title"))
}
