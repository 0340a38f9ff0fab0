use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

use crate::domain::entities::collection::{
    derive_columns, field_config, filter_item, humanize_field_name, quiz_title_by_id,
    CollectionKind,
};
use crate::domain::entities::flag::{can_toggle, default_enabled, is_enabled, FeatureFlag};
use crate::domain::entities::record::{format_number, FieldMap, FieldValue, Record, RecordId};
use crate::domain::table::cell::{classify_cell, looks_like_email, looks_like_url, truncate_text, CellContent};
use crate::domain::table::search::{
    apply_filters, apply_search, apply_search_and_filters, matches_criterion, FilterCriterion,
    FilterOperator,
};
use crate::domain::table::sort::{clamp_page_index, paginate, sort_records, total_pages};
use crate::domain::table::state::{
    next_sort, resolve_display_state, DisplayState, SelectionState, SortDirection, SortState,
};
use crate::infra::export::csv::export_visible_csv;
use crate::infra::memory::repo::MemoryRepo;
use crate::infra::sqlite::repo::SqliteRepo;
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{delete_batches, CollectionRepository, RepoError, DELETE_BATCH_LIMIT};
use crate::usecase::services::content_service::{validate_required_fields, ContentService};
use crate::usecase::services::flag_service::FlagService;
use crate::*;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("content-desk-{prefix}-{nanos}"))
}

fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

fn record(id: &str, pairs: &[(&str, FieldValue)]) -> Record {
    let mut fields = FieldMap::new();
    for (name, value) in pairs {
        fields.insert((*name).to_string(), value.clone());
    }
    Record::new(id, fields)
}

fn people() -> Vec<Record> {
    vec![
        record("1", &[("name", text("Alice")), ("city", text("Paris"))]),
        record("2", &[("name", text("Bob")), ("city", text("paris"))]),
        record("3", &[("name", text("Carol")), ("city", text("London"))]),
    ]
}

// -------- search & filter engine --------

#[test]
fn empty_search_returns_input_unchanged() {
    let records = people();

    let result = apply_search(&records, "   ", &["name", "city"]);

    assert_eq!(result, records, "blank query should be identity");
}

#[test]
fn search_matches_case_insensitively() {
    let records = people();

    let result = apply_search(&records, "PARIS", &["name", "city"]);

    let ids: Vec<&str> = result.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"], "both spellings of paris should match");
}

#[test]
fn search_never_matches_null_or_missing_fields() {
    let records = vec![
        record("1", &[("name", FieldValue::Null)]),
        record("2", &[]),
        record("3", &[("name", text(""))]),
    ];

    let result = apply_search(&records, "anything", &["name"]);

    assert!(result.is_empty(), "null/missing/empty fields should never match");
}

#[test]
fn search_result_is_subset_preserving_order() {
    let records = people();

    let result = apply_search(&records, "o", &["name"]);

    let ids: Vec<&str> = result.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3"], "Bob then Carol, in input order");
}

#[test]
fn filters_are_a_conjunction() {
    let records = people();
    let criteria = vec![
        FilterCriterion {
            field: "city".to_string(),
            operator: FilterOperator::Equals,
            value: "paris".to_string(),
        },
        FilterCriterion {
            field: "name".to_string(),
            operator: FilterOperator::StartsWith,
            value: "a".to_string(),
        },
    ];

    let result = apply_filters(&records, &criteria);

    let ids: Vec<&str> = result.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1"], "only Alice satisfies both criteria");
}

#[test]
fn empty_criteria_list_is_identity() {
    let records = people();

    let result = apply_filters(&records, &[]);

    assert_eq!(result, records);
}

#[test]
fn each_operator_matches_expected_rows() {
    let row = record("1", &[("title", text("Hello World"))]);

    let check = |operator, value: &str| {
        matches_criterion(
            &row,
            &FilterCriterion {
                field: "title".to_string(),
                operator,
                value: value.to_string(),
            },
        )
    };

    assert!(check(FilterOperator::Equals, "hello world"));
    assert!(!check(FilterOperator::Equals, "hello"));
    assert!(check(FilterOperator::Contains, "lo wo"));
    assert!(check(FilterOperator::StartsWith, "hell"));
    assert!(!check(FilterOperator::StartsWith, "world"));
    assert!(check(FilterOperator::EndsWith, "world"));
}

#[test]
fn filter_on_missing_field_matches_nothing() {
    let records = people();
    let criteria = vec![FilterCriterion {
        field: "nonexistent".to_string(),
        operator: FilterOperator::Contains,
        value: "x".to_string(),
    }];

    let result = apply_filters(&records, &criteria);

    assert!(result.is_empty());
}

#[test]
fn unknown_operator_string_parses_to_none() {
    assert_eq!(FilterOperator::parse("contains"), Some(FilterOperator::Contains));
    assert_eq!(FilterOperator::parse("regex"), None);
}

#[test]
fn search_then_filter_then_sort_pipeline() {
    let records = people();
    let criteria = vec![FilterCriterion {
        field: "city".to_string(),
        operator: FilterOperator::Equals,
        value: "paris".to_string(),
    }];

    let narrowed = apply_search_and_filters(&records, "", &["name", "city"], &criteria);
    let ids: Vec<&str> = narrowed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"], "filter keeps input order");

    let sorted = sort_records(&narrowed, "name", SortDirection::Desc);
    let names: Vec<String> = sorted.iter().map(|r| r.field_string("name")).collect();
    assert_eq!(names, vec!["Bob", "Alice"]);
}

// -------- sort & pagination --------

#[test]
fn sort_is_stable_for_equal_keys() {
    let records = vec![
        record("1", &[("rank", text("a")), ("tag", text("first"))]),
        record("2", &[("rank", text("a")), ("tag", text("second"))]),
        record("3", &[("rank", text("a")), ("tag", text("third"))]),
    ];

    let sorted = sort_records(&records, "rank", SortDirection::Asc);

    let ids: Vec<&str> = sorted.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"], "equal keys should keep input order");
}

#[test]
fn missing_sort_keys_go_last_in_both_directions() {
    let records = vec![
        record("1", &[]),
        record("2", &[("name", text("beta"))]),
        record("3", &[("name", FieldValue::Null)]),
        record("4", &[("name", text("alpha"))]),
    ];

    let asc = sort_records(&records, "name", SortDirection::Asc);
    let asc_ids: Vec<&str> = asc.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(asc_ids, vec!["4", "2", "1", "3"]);

    let desc = sort_records(&records, "name", SortDirection::Desc);
    let desc_ids: Vec<&str> = desc.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(desc_ids, vec!["2", "4", "1", "3"], "nulls stay last even descending");
}

#[test]
fn numbers_sort_numerically_not_lexically() {
    let records = vec![
        record("1", &[("position", FieldValue::Number(10.0))]),
        record("2", &[("position", FieldValue::Number(2.0))]),
        record("3", &[("position", FieldValue::Number(1.5))]),
    ];

    let sorted = sort_records(&records, "position", SortDirection::Asc);

    let ids: Vec<&str> = sorted.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2", "1"], "1.5 < 2 < 10");
}

#[test]
fn mixed_type_sort_falls_back_to_text() {
    let records = vec![
        record("1", &[("v", FieldValue::Number(5.0))]),
        record("2", &[("v", text("alpha"))]),
    ];

    let sorted = sort_records(&records, "v", SortDirection::Asc);

    let ids: Vec<&str> = sorted.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"], "\"5\" sorts before \"alpha\"");
}

#[test]
fn pages_partition_the_row_set() {
    let records: Vec<Record> = (0..7)
        .map(|i| record(&format!("{i}"), &[("n", FieldValue::Number(i as f64))]))
        .collect();

    assert_eq!(total_pages(7, 3), 3);

    let mut seen = Vec::new();
    for page in 0..3 {
        let slice = paginate(&records, page, 3);
        seen.extend(slice.rows);
    }

    assert_eq!(seen, records, "pages concatenated should rebuild the input");
}

#[test]
fn out_of_range_page_is_empty() {
    let records = people();

    let slice = paginate(&records, 9, 2);

    assert!(slice.rows.is_empty());
    assert_eq!(slice.total_pages, 2);
}

#[test]
fn clamp_targets_last_page_after_shrink() {
    assert_eq!(clamp_page_index(4, 7, 3), 2, "7 rows at size 3 has pages 0..=2");
    assert_eq!(clamp_page_index(4, 0, 3), 0, "no rows clamps to zero");
    assert_eq!(clamp_page_index(1, 7, 3), 1, "in-range index is untouched");
}

#[test]
fn zero_page_size_yields_zero_pages() {
    assert_eq!(total_pages(10, 0), 0);
    let slice = paginate(&people(), 0, 0);
    assert!(slice.rows.is_empty());
}

#[test]
fn header_click_cycles_asc_desc_unsorted() {
    let first = next_sort(None, "title");
    assert_eq!(
        first,
        Some(SortState {
            column: "title".to_string(),
            direction: SortDirection::Asc,
        })
    );

    let second = next_sort(first.as_ref(), "title");
    assert_eq!(
        second.as_ref().map(|s| s.direction),
        Some(SortDirection::Desc)
    );

    let third = next_sort(second.as_ref(), "title");
    assert_eq!(third, None, "third click clears the sort");

    let other = next_sort(second.as_ref(), "author");
    assert_eq!(
        other,
        Some(SortState {
            column: "author".to_string(),
            direction: SortDirection::Asc,
        }),
        "a different column starts ascending"
    );
}

// -------- display state & selection --------

#[test]
fn display_state_resolves_in_priority_order() {
    assert_eq!(resolve_display_state(true, Some("boom"), 5), DisplayState::Loading);
    assert_eq!(resolve_display_state(false, Some("boom"), 5), DisplayState::Error);
    assert_eq!(resolve_display_state(false, None, 0), DisplayState::Empty);
    assert_eq!(resolve_display_state(false, None, 5), DisplayState::Data);
}

#[test]
fn select_all_is_scoped_to_the_given_page() {
    let page_one: Vec<RecordId> = vec!["a".into(), "b".into()];
    let page_two: Vec<RecordId> = vec!["c".into(), "d".into()];

    let mut selection = SelectionState::new();
    selection.toggle(&"c".into());
    selection.toggle_page(&page_one);

    assert!(selection.all_selected(&page_one));
    assert!(selection.is_selected(&"c".into()), "other pages are untouched");
    assert_eq!(selection.len(), 3);

    selection.toggle_page(&page_one);
    assert!(!selection.is_selected(&"a".into()));
    assert!(selection.is_selected(&"c".into()));

    assert!(!selection.all_selected(&page_two));
    assert!(!selection.all_selected(&[]), "empty page never counts as all-selected");
}

#[test]
fn selected_records_returns_full_objects() {
    let records = people();
    let mut selection = SelectionState::new();
    selection.toggle(&"2".into());

    let selected = selection.selected_records(&records);

    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].field_string("name"), "Bob");
}

// -------- cell classification --------

#[test]
fn cells_classify_by_value_shape() {
    assert_eq!(classify_cell(None, 80), CellContent::Missing);
    assert_eq!(classify_cell(Some(&FieldValue::Null), 80), CellContent::Missing);
    assert_eq!(classify_cell(Some(&text("")), 80), CellContent::Missing);
    assert_eq!(classify_cell(Some(&FieldValue::Bool(true)), 80), CellContent::YesNo(true));
    assert_eq!(
        classify_cell(Some(&FieldValue::Number(3.0)), 80),
        CellContent::Text {
            text: "3".to_string(),
            truncated: false,
        }
    );
    assert_eq!(
        classify_cell(Some(&text("https://example.com/a")), 80),
        CellContent::Link("https://example.com/a".to_string())
    );
    assert_eq!(
        classify_cell(Some(&text("user@example.com")), 80),
        CellContent::Email("user@example.com".to_string())
    );

    let list = FieldValue::List(vec![text("one"), text("two")]);
    match classify_cell(Some(&list), 80) {
        CellContent::List { items, truncated } => {
            assert_eq!(items, vec!["one", "two"]);
            assert!(!truncated);
        }
        other => panic!("expected list cell, got {other:?}"),
    }

    let mut map = std::collections::BTreeMap::new();
    map.insert("k".to_string(), text("v"));
    match classify_cell(Some(&FieldValue::Object(map)), 10) {
        CellContent::Structured { truncated, .. } => assert!(truncated),
        other => panic!("expected structured cell, got {other:?}"),
    }
}

#[test]
fn long_text_is_flagged_for_truncation() {
    let long = "x".repeat(120);
    match classify_cell(Some(&text(&long)), 80) {
        CellContent::Text { truncated, .. } => assert!(truncated),
        other => panic!("expected text cell, got {other:?}"),
    }
}

#[test]
fn url_and_email_detection() {
    assert!(looks_like_url("https://example.com"));
    assert!(looks_like_url("http://example.com"));
    assert!(!looks_like_url("ftp://example.com"));
    assert!(!looks_like_url("example.com"));

    assert!(looks_like_email("a@b.co"));
    assert!(!looks_like_email("a b@c.co"));
    assert!(!looks_like_email("@b.co"));
    assert!(!looks_like_email("a@nodot"));
    assert!(!looks_like_email("a@.start"));
}

#[test]
fn truncation_respects_char_boundaries() {
    let text = "日本語のテキストです";
    let cut = truncate_text(text, 10);

    assert!(cut.ends_with('…'));
    assert!(cut.len() <= 10 + '…'.len_utf8());

    assert_eq!(truncate_text("short", 80), "short");
}

// -------- field visibility & columns --------

#[test]
fn hidden_fields_are_stripped_from_display_items() {
    let row = record(
        "1",
        &[
            ("title", text("Welcome")),
            ("image_url", text("https://cdn/img.png")),
            ("internal_notes", text("do not show")),
        ],
    );

    let stripped = filter_item(&row, CollectionKind::Carousel);

    assert!(stripped.field("title").is_some());
    assert!(stripped.field("internal_notes").is_none());
    assert_eq!(stripped.id, row.id);
}

#[test]
fn columns_follow_configured_field_order() {
    let columns = derive_columns(CollectionKind::Carousel);

    let fields: Vec<&str> = columns.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(
        fields,
        field_config(CollectionKind::Carousel).visible_fields,
        "column order comes straight from the config"
    );
    assert_eq!(columns[0].header, "Title");
    assert!(columns.iter().all(|c| c.sortable));
}

#[test]
fn field_names_humanize_for_headers() {
    assert_eq!(humanize_field_name("answer_index"), "Answer index");
    assert_eq!(humanize_field_name("title"), "Title");
    assert_eq!(humanize_field_name(""), "");
}

#[test]
fn question_rows_resolve_quiz_titles_by_id() {
    let quizzes = vec![
        record("quiz-1", &[("title", text("Capitals"))]),
        record("quiz-2", &[("title", text("Rivers"))]),
    ];

    assert_eq!(quiz_title_by_id(&quizzes, "quiz-2"), Some("Rivers".to_string()));
    assert_eq!(quiz_title_by_id(&quizzes, "quiz-9"), None);
}

// -------- feature flags --------

#[test]
fn absent_flags_fall_back_to_defaults_then_disabled() {
    let flags: Vec<FeatureFlag> = Vec::new();

    assert!(is_enabled(&flags, "dark_mode"), "seeded default is on");
    assert!(!is_enabled(&flags, "video_uploads"), "seeded default is off");
    assert!(!is_enabled(&flags, "totally_unknown"), "unknown keys are disabled");
    assert!(default_enabled("quizzes_enabled"));
}

#[test]
fn store_value_wins_over_default() {
    let flags = vec![FeatureFlag {
        key: "dark_mode".to_string(),
        enabled: false,
        category: "appearance".to_string(),
        is_locked: false,
        last_modified_by: None,
        last_modified_at: None,
    }];

    assert!(!is_enabled(&flags, "dark_mode"));
}

#[test]
fn toggle_flips_flag_and_stamps_audit_fields() {
    let repo = Arc::new(MemoryRepo::new());
    let service = FlagService::new(repo);

    service.seed_defaults().expect("seeding should succeed");

    let toggled = service
        .toggle("dark_mode", "tester")
        .expect("unlocked flag should toggle");

    assert!(!toggled.enabled, "dark_mode defaults on, toggle turns it off");
    assert_eq!(toggled.last_modified_by.as_deref(), Some("tester"));
    assert!(toggled.last_modified_at.is_some());
}

#[test]
fn locked_flag_toggle_is_rejected_with_state_unchanged() {
    let repo = Arc::new(MemoryRepo::new());
    let service = FlagService::new(repo);

    service.seed_defaults().expect("seeding should succeed");

    let result = service.toggle("maintenance_mode", "tester");
    assert!(
        matches!(result, Err(RepoError::ValidationFailed(_))),
        "locked flag must be rejected, got {result:?}"
    );

    let flags = service.list_flags().expect("should list flags");
    let maintenance = flags
        .iter()
        .find(|flag| flag.key == "maintenance_mode")
        .expect("seeded flag should exist");
    assert!(!maintenance.enabled, "rejected toggle must not change state");
    assert!(maintenance.last_modified_by.is_none());
    assert!(maintenance.is_locked);
    assert!(!can_toggle(maintenance));
}

#[test]
fn seeding_defaults_is_idempotent() {
    let repo = Arc::new(MemoryRepo::new());
    let service = FlagService::new(repo);

    let first = service.seed_defaults().expect("first seeding should succeed");
    let second = service.seed_defaults().expect("second seeding should succeed");

    assert!(first > 0);
    assert_eq!(second, 0, "nothing is missing on the second pass");

    let flags = service.list_flags().expect("should list flags");
    assert_eq!(flags.len(), first, "no duplicates were created");
}

// -------- validation & bulk delete --------

#[test]
fn required_fields_must_be_present_and_non_empty() {
    let mut fields = FieldMap::new();
    fields.insert("title".to_string(), text("Welcome"));
    fields.insert("image_url".to_string(), text("https://cdn/img.png"));
    assert!(validate_required_fields(CollectionKind::Carousel, &fields).is_ok());

    fields.insert("image_url".to_string(), text("   "));
    let result = validate_required_fields(CollectionKind::Carousel, &fields);
    assert!(
        matches!(result, Err(RepoError::ValidationFailed(_))),
        "whitespace-only required field must fail, got {result:?}"
    );

    fields.remove("image_url");
    assert!(validate_required_fields(CollectionKind::Carousel, &fields).is_err());
}

#[test]
fn bulk_deletes_split_into_backend_sized_batches() {
    let ids = |n: usize| -> Vec<RecordId> {
        (0..n).map(|i| RecordId(format!("id-{i}"))).collect()
    };

    assert!(delete_batches(&ids(0)).is_empty());

    let exactly_one = ids(DELETE_BATCH_LIMIT);
    assert_eq!(delete_batches(&exactly_one).len(), 1);

    let one_over = ids(DELETE_BATCH_LIMIT + 1);
    let batches = delete_batches(&one_over);
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), DELETE_BATCH_LIMIT);
    assert_eq!(batches[1].len(), 1);

    let large = ids(1200);
    let sizes: Vec<usize> = delete_batches(&large).iter().map(|b| b.len()).collect();
    assert_eq!(sizes, vec![500, 500, 200]);
}

#[test]
fn double_delete_is_ignored_by_the_service() {
    let repo = Arc::new(MemoryRepo::new());
    let service = ContentService::new(repo);

    let mut fields = FieldMap::new();
    fields.insert("title".to_string(), text("Post"));
    fields.insert("author".to_string(), text("admin"));
    let created = service
        .create(CollectionKind::ForumPosts, fields)
        .expect("create should succeed");

    service
        .delete(CollectionKind::ForumPosts, &created.id)
        .expect("first delete should succeed");
    service
        .delete(CollectionKind::ForumPosts, &created.id)
        .expect("second delete of the same record is not an error");
}

#[test]
fn moderator_review_updates_application_status() {
    let repo = Arc::new(MemoryRepo::new());
    let service = ContentService::new(repo);

    let mut fields = FieldMap::new();
    fields.insert("applicant".to_string(), text("sam"));
    fields.insert("email".to_string(), text("sam@example.com"));
    fields.insert("status".to_string(), text("pending"));
    let created = service
        .create(CollectionKind::ModeratorApplications, fields)
        .expect("create should succeed");

    let approved = service
        .review_application(&created.id, true)
        .expect("review should succeed");
    assert_eq!(approved.field_string("status"), "approved");

    let rejected = service
        .review_application(&created.id, false)
        .expect("review should succeed");
    assert_eq!(rejected.field_string("status"), "rejected");
}

// -------- sqlite adapter --------

#[test]
fn init_db_creates_required_tables() {
    let temp_dir = unique_test_dir("init-db");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("collections.sqlite");

    let result = init_db(&db_path);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('record','field')",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");

    assert_eq!(table_count, 2, "required tables should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

fn sqlite_repo(prefix: &str) -> (SqliteRepo, PathBuf) {
    let temp_dir = unique_test_dir(prefix);
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let repo = SqliteRepo::new(temp_dir.join("collections.sqlite"));
    repo.init().expect("init should succeed");
    (repo, temp_dir)
}

#[test]
fn create_assigns_id_and_timestamps() {
    let (repo, temp_dir) = sqlite_repo("create");

    let mut fields = FieldMap::new();
    fields.insert("title".to_string(), text("Welcome"));
    fields.insert("position".to_string(), FieldValue::Number(1.0));

    let created = repo
        .create(CollectionKind::Carousel, fields)
        .expect("create should succeed");

    assert!(!created.id.as_str().is_empty());
    assert!(created.created_at.is_some());
    assert_eq!(created.created_at, created.updated_at);
    assert!(created.deleted_at.is_none());

    let loaded = repo
        .get_by_id(CollectionKind::Carousel, &created.id)
        .expect("created record should load back");
    assert_eq!(loaded.field_string("title"), "Welcome");
    assert_eq!(loaded.field("position"), Some(&FieldValue::Number(1.0)));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn missing_record_is_not_found() {
    let (repo, temp_dir) = sqlite_repo("missing");

    let result = repo.get_by_id(CollectionKind::Videos, &"nope".into());

    assert!(
        matches!(result, Err(RepoError::NotFound { .. })),
        "expected NotFound, got {result:?}"
    );

    let update = repo.update(CollectionKind::Videos, &"nope".into(), FieldMap::new());
    assert!(matches!(update, Err(RepoError::NotFound { .. })));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn update_merges_partial_fields() {
    let (repo, temp_dir) = sqlite_repo("update");

    let mut fields = FieldMap::new();
    fields.insert("title".to_string(), text("Old title"));
    fields.insert("published".to_string(), FieldValue::Bool(false));
    let created = repo
        .create(CollectionKind::Quizzes, fields)
        .expect("create should succeed");

    let mut partial = FieldMap::new();
    partial.insert("published".to_string(), FieldValue::Bool(true));
    let updated = repo
        .update(CollectionKind::Quizzes, &created.id, partial)
        .expect("update should succeed");

    assert_eq!(updated.field_string("title"), "Old title", "untouched fields survive");
    assert_eq!(updated.field("published"), Some(&FieldValue::Bool(true)));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn soft_delete_hides_records_until_asked() {
    let (repo, temp_dir) = sqlite_repo("soft-delete");

    let mut fields = FieldMap::new();
    fields.insert("title".to_string(), text("Doomed"));
    let created = repo
        .create(CollectionKind::Videos, fields)
        .expect("create should succeed");

    repo.delete(CollectionKind::Videos, &created.id)
        .expect("delete should succeed");

    let visible = repo
        .get_all(CollectionKind::Videos, false)
        .expect("should list records");
    assert!(visible.is_empty(), "soft-deleted records are hidden by default");

    let with_deleted = repo
        .get_all(CollectionKind::Videos, true)
        .expect("should list records");
    assert_eq!(with_deleted.len(), 1);
    assert!(with_deleted[0].is_deleted());

    repo.purge(CollectionKind::Videos, &created.id)
        .expect("purge should succeed");
    let after_purge = repo
        .get_all(CollectionKind::Videos, true)
        .expect("should list records");
    assert!(after_purge.is_empty(), "purge removes the record entirely");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn bulk_delete_soft_deletes_every_listed_id() {
    let (repo, temp_dir) = sqlite_repo("bulk-delete");

    let mut ids = Vec::new();
    for i in 0..3 {
        let mut fields = FieldMap::new();
        fields.insert("title".to_string(), text(&format!("Video {i}")));
        let created = repo
            .create(CollectionKind::Videos, fields)
            .expect("create should succeed");
        ids.push(created.id);
    }

    let deleted = repo
        .delete_many(CollectionKind::Videos, &ids[..2])
        .expect("bulk delete should succeed");
    assert_eq!(deleted, 2);

    let visible = repo
        .get_all(CollectionKind::Videos, false)
        .expect("should list records");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, ids[2]);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn records_list_in_stable_creation_order() {
    let (repo, temp_dir) = sqlite_repo("order");

    for i in 0..4 {
        let mut fields = FieldMap::new();
        fields.insert("title".to_string(), text(&format!("Quiz {i}")));
        repo.create(CollectionKind::Quizzes, fields)
            .expect("create should succeed");
    }

    let first = repo
        .get_all(CollectionKind::Quizzes, false)
        .expect("should list records");
    let second = repo
        .get_all(CollectionKind::Quizzes, false)
        .expect("should list records");

    assert_eq!(first, second, "repeated loads return the same order");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

// -------- subscriptions --------

#[test]
fn mutations_push_full_snapshots_to_subscribers() {
    let repo = Arc::new(MemoryRepo::new());

    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_for_handler = seen.clone();
    let subscription = repo.subscribe(
        CollectionKind::Quizzes,
        Arc::new(move |snapshot| {
            seen_for_handler
                .lock()
                .expect("seen lock should not be poisoned")
                .push(snapshot.len());
        }),
        Arc::new(|_err| {}),
    );

    let mut fields = FieldMap::new();
    fields.insert("title".to_string(), text("Quiz A"));
    let created = repo
        .create(CollectionKind::Quizzes, fields)
        .expect("create should succeed");

    // A mutation in another collection must not reach this subscriber.
    let mut other = FieldMap::new();
    other.insert("title".to_string(), text("Video"));
    repo.create(CollectionKind::Videos, other)
        .expect("create should succeed");

    repo.delete(CollectionKind::Quizzes, &created.id)
        .expect("delete should succeed");

    assert_eq!(
        *seen.lock().expect("seen lock should not be poisoned"),
        vec![1, 0],
        "one snapshot per quiz mutation; deleted records are excluded"
    );

    drop(subscription);

    let mut more = FieldMap::new();
    more.insert("title".to_string(), text("Quiz B"));
    repo.create(CollectionKind::Quizzes, more)
        .expect("create should succeed");

    assert_eq!(
        seen.lock().expect("seen lock should not be poisoned").len(),
        2,
        "a dropped subscription receives nothing further"
    );
}

#[test]
fn sqlite_mutations_push_snapshots_too() {
    let (repo, temp_dir) = sqlite_repo("subscribe");

    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_for_handler = seen.clone();
    let _subscription = repo.subscribe(
        CollectionKind::Carousel,
        Arc::new(move |snapshot| {
            seen_for_handler
                .lock()
                .expect("seen lock should not be poisoned")
                .push(snapshot.len());
        }),
        Arc::new(|_err| {}),
    );

    let mut fields = FieldMap::new();
    fields.insert("title".to_string(), text("Banner"));
    repo.create(CollectionKind::Carousel, fields)
        .expect("create should succeed");

    assert_eq!(
        *seen.lock().expect("seen lock should not be poisoned"),
        vec![1]
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

// -------- csv export --------

#[test]
fn csv_export_writes_only_visible_columns() {
    let temp_dir = unique_test_dir("csv-export");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let csv_path = temp_dir.join("carousel.csv");

    let rows = vec![record(
        "item-1",
        &[
            ("title", text("Welcome")),
            ("image_url", text("https://cdn/img.png")),
            ("position", FieldValue::Number(1.0)),
            ("internal_notes", text("secret")),
        ],
    )];

    let exported = export_visible_csv(&csv_path, CollectionKind::Carousel, &rows)
        .expect("export should succeed");
    assert_eq!(exported, 1);

    let content = fs::read_to_string(&csv_path).expect("should read exported csv");
    let header = content.lines().next().expect("csv should have a header");
    assert_eq!(header, "id,title,image_url,link_url,position,active");
    assert!(!content.contains("secret"), "hidden fields never reach the file");
    assert!(content.contains("item-1"));
    assert!(content.contains("Welcome"));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

// -------- value plumbing --------

#[test]
fn form_text_parses_into_typed_field_values() {
    assert_eq!(parse_input_value(""), FieldValue::Null);
    assert_eq!(parse_input_value("  "), FieldValue::Null);
    assert_eq!(parse_input_value("true"), FieldValue::Bool(true));
    assert_eq!(parse_input_value("false"), FieldValue::Bool(false));
    assert_eq!(parse_input_value("3.5"), FieldValue::Number(3.5));
    assert_eq!(parse_input_value("-2"), FieldValue::Number(-2.0));
    assert_eq!(parse_input_value("hello"), FieldValue::Text("hello".to_string()));
}

#[test]
fn query_strings_stringify_every_value_shape() {
    assert_eq!(FieldValue::Null.query_string(), "");
    assert_eq!(FieldValue::Bool(true).query_string(), "true");
    assert_eq!(FieldValue::Number(2.0).query_string(), "2");
    assert_eq!(
        FieldValue::List(vec![text("a"), text("b")]).query_string(),
        "a, b"
    );
}

#[test]
fn numbers_format_without_integral_fraction() {
    assert_eq!(format_number(3.0), "3");
    assert_eq!(format_number(3.25), "3.25");
    assert_eq!(format_number(-1.0), "-1");
    assert_eq!(format_number(f64::NAN), "");
}

#[test]
fn collection_names_round_trip() {
    for kind in CollectionKind::ALL {
        assert_eq!(CollectionKind::from_storage_name(kind.storage_name()), Some(kind));
    }
    assert_eq!(CollectionKind::from_storage_name("unknown"), None);
}
