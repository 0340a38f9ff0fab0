use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::domain::entities::collection::{
    derive_columns, field_config, humanize_field_name, quiz_title_by_id, CollectionKind,
    ColumnSpec,
};
use crate::domain::entities::flag::FeatureFlag;
use crate::domain::entities::record::{FieldMap, Record, RecordId};
use crate::domain::table::cell::{classify_cell, truncate_text, CellContent, DEFAULT_TRUNCATE_LEN};
use crate::domain::table::search::{
    apply_search_and_filters, FilterCriterion, FilterOperator,
};
use crate::domain::table::sort::{clamp_page_index, paginate, sort_records};
use crate::domain::table::state::{
    next_sort, resolve_display_state, DisplayState, SelectionState, SortDirection,
};
use crate::infra::sqlite::repo::SqliteRepo;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::AppState;
use crate::usecase::ports::repo::{CollectionRepository, RepoError, Subscription};
use crate::usecase::services::content_service::ContentService;
use crate::usecase::services::export_service::ExportService;
use crate::usecase::services::flag_service::FlagService;
use crate::{
    default_db_path, parse_input_value, ADMIN_ACTOR, NONE_OPTION_VALUE, PAGE_SIZE_CHOICES,
};

const HEADER_CELL_STYLE: &str =
    "border: 1px solid #bbb; padding: 6px; background: #f2f2f2; cursor: pointer; user-select: none; text-align: left;";
const CELL_STYLE: &str = "border: 1px solid #bbb; padding: 6px; vertical-align: top;";
const SMALL_BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 1px 6px; border-radius: 4px; cursor: pointer; font-size: 12px; margin-left: 6px;";
const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";

/// Inbox the live subscription writes into. Pushes happen synchronously
/// during a mutation, so by the time the blocking call returns, the fresh
/// snapshot is already here.
#[derive(Clone)]
struct LiveFeed {
    snapshots: Arc<Mutex<Option<Vec<Record>>>>,
    errors: Arc<Mutex<Option<RepoError>>>,
}

fn take_slot<T>(slot: &Arc<Mutex<Option<T>>>) -> Option<T> {
    match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}

fn store_slot<T>(slot: &Arc<Mutex<Option<T>>>, value: T) {
    match slot.lock() {
        Ok(mut guard) => *guard = Some(value),
        Err(poisoned) => *poisoned.into_inner() = Some(value),
    }
}

impl LiveFeed {
    fn new() -> Self {
        LiveFeed {
            snapshots: Arc::new(Mutex::new(None)),
            errors: Arc::new(Mutex::new(None)),
        }
    }

    fn take_snapshot(&self) -> Option<Vec<Record>> {
        take_slot(&self.snapshots)
    }

    fn take_error(&self) -> Option<RepoError> {
        take_slot(&self.errors)
    }
}

/// Replaces the in-memory record set after a mutation. The pushed snapshot is
/// authoritative when present; the "show deleted" view is outside the live
/// feed and always requeries.
fn refresh_records(
    service: &Arc<ContentService>,
    kind: CollectionKind,
    include_deleted: bool,
    feed: &LiveFeed,
    mut records: Signal<Vec<Record>>,
    mut error: Signal<Option<String>>,
    mut status: Signal<String>,
) {
    if let Some(live_error) = feed.take_error() {
        *status.write() = format!("Live update failed: {live_error}");
    }

    if !include_deleted {
        if let Some(snapshot) = feed.take_snapshot() {
            records.set(snapshot);
            error.set(None);
            return;
        }
    }

    match run_blocking(|| service.list(kind, include_deleted)) {
        Ok(list) => {
            records.set(list);
            error.set(None);
        }
        Err(err) => error.set(Some(err.to_string())),
    }
}

fn reload_flags(service: &Arc<FlagService>, mut flags: Signal<Vec<FeatureFlag>>, mut status: Signal<String>) {
    match run_blocking(|| service.list_flags()) {
        Ok(list) => flags.set(list),
        Err(err) => *status.write() = format!("Failed to load flags: {err}"),
    }
}

fn sort_indicator(sort: Option<&crate::domain::table::state::SortState>, column_id: &str) -> &'static str {
    match sort {
        Some(state) if state.column == column_id => match state.direction {
            SortDirection::Asc => " ▲",
            SortDirection::Desc => " ▼",
        },
        _ => "",
    }
}

fn cell_view(
    record: &Record,
    column: &ColumnSpec,
    kind: CollectionKind,
    quizzes: &[Record],
    mut expanded_cells: Signal<BTreeSet<(String, String)>>,
    mut status: Signal<String>,
) -> Element {
    // Questions store the parent quiz id; show its title instead.
    if kind == CollectionKind::Questions && column.field == "quiz_id" {
        let quiz_id = record.field_string("quiz_id");
        if quiz_id.is_empty() {
            return rsx! { td { style: CELL_STYLE, span { style: "color: #999;", "—" } } };
        }
        let label = quiz_title_by_id(quizzes, &quiz_id)
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| format!("unknown quiz ({quiz_id})"));
        return rsx! { td { style: CELL_STYLE, "{label}" } };
    }

    let content = classify_cell(record.field(&column.field), DEFAULT_TRUNCATE_LEN);
    let cell_key = (record.id.to_string(), column.id.clone());
    let is_expanded = expanded_cells().contains(&cell_key);
    let toggle_key = cell_key.clone();
    let toggle = move |_| {
        let mut cells = expanded_cells.write();
        if !cells.remove(&toggle_key) {
            cells.insert(toggle_key.clone());
        }
    };

    match content {
        CellContent::Missing => rsx! {
            td { style: CELL_STYLE, span { style: "color: #999;", "—" } }
        },
        CellContent::YesNo(value) => rsx! {
            td { style: CELL_STYLE,
                if value {
                    span { style: "color: #1a7f37;", "Yes" }
                } else {
                    span { style: "color: #999;", "No" }
                }
            }
        },
        CellContent::Link(url) => {
            let copy_target = url.clone();
            rsx! {
                td { style: CELL_STYLE,
                    a { href: "{url}", target: "_blank", "{url}" }
                    button {
                        style: SMALL_BUTTON_STYLE,
                        onclick: move |_| {
                            let script =
                                format!("navigator.clipboard.writeText({copy_target:?})");
                            dioxus::document::eval(&script);
                            *status.write() = "Link copied".to_string();
                        },
                        "copy"
                    }
                }
            }
        }
        CellContent::Email(address) => rsx! {
            td { style: CELL_STYLE,
                a { href: "mailto:{address}", "{address}" }
            }
        },
        CellContent::List { items, truncated } => {
            let joined = items.join(", ");
            let shown = if truncated && !is_expanded {
                truncate_text(&joined, DEFAULT_TRUNCATE_LEN)
            } else {
                joined
            };
            rsx! {
                td { style: CELL_STYLE,
                    "{shown}"
                    if truncated {
                        button {
                            style: SMALL_BUTTON_STYLE,
                            onclick: toggle,
                            if is_expanded { "less" } else { "more" }
                        }
                    }
                }
            }
        }
        CellContent::Structured { text, truncated } => {
            let shown = if truncated && !is_expanded {
                truncate_text(&text, DEFAULT_TRUNCATE_LEN)
            } else {
                text
            };
            rsx! {
                td { style: CELL_STYLE,
                    pre { style: "margin: 0; white-space: pre-wrap; font-size: 12px;", "{shown}" }
                    if truncated {
                        button {
                            style: SMALL_BUTTON_STYLE,
                            onclick: toggle,
                            if is_expanded { "less" } else { "more" }
                        }
                    }
                }
            }
        }
        CellContent::Text { text, truncated } => {
            let shown = if truncated && !is_expanded {
                truncate_text(&text, DEFAULT_TRUNCATE_LEN)
            } else {
                text
            };
            rsx! {
                td { style: CELL_STYLE,
                    "{shown}"
                    if truncated {
                        button {
                            style: SMALL_BUTTON_STYLE,
                            onclick: toggle,
                            if is_expanded { "less" } else { "more" }
                        }
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn row_view(
    record: &Record,
    columns: &[ColumnSpec],
    kind: CollectionKind,
    quizzes: &[Record],
    busy: bool,
    mut selection: Signal<SelectionState>,
    expanded_cells: Signal<BTreeSet<(String, String)>>,
    status: Signal<String>,
    on_delete: EventHandler<RecordId>,
    on_purge: EventHandler<RecordId>,
    on_review: EventHandler<(RecordId, bool)>,
) -> Element {
    let record_id = record.id.clone();
    let is_selected = selection().is_selected(&record_id);
    let is_deleted = record.is_deleted();
    let row_style = if is_deleted {
        "background: #fff3f3;"
    } else {
        ""
    };

    let toggle_id = record_id.clone();
    let delete_id = record_id.clone();
    let purge_id = record_id.clone();
    let approve_id = record_id.clone();
    let reject_id = record_id.clone();
    let is_pending_application = kind == CollectionKind::ModeratorApplications
        && record.field_string("status") == "pending";

    rsx! {
        tr { style: "{row_style}",
            td { style: CELL_STYLE,
                input {
                    r#type: "checkbox",
                    checked: is_selected,
                    onclick: move |_| {
                        selection.write().toggle(&toggle_id);
                    },
                }
            }
            {columns.iter().map(|column| cell_view(record, column, kind, quizzes, expanded_cells, status))}
            td { style: CELL_STYLE,
                if is_pending_application {
                    button {
                        style: SMALL_BUTTON_STYLE,
                        disabled: busy,
                        onclick: move |_| on_review.call((approve_id.clone(), true)),
                        "Approve"
                    }
                    button {
                        style: SMALL_BUTTON_STYLE,
                        disabled: busy,
                        onclick: move |_| on_review.call((reject_id.clone(), false)),
                        "Reject"
                    }
                }
                if is_deleted {
                    span { style: "color: #c00; font-size: 12px;", "deleted" }
                    button {
                        style: SMALL_BUTTON_STYLE,
                        disabled: busy,
                        onclick: move |_| on_purge.call(purge_id.clone()),
                        "Purge"
                    }
                } else {
                    button {
                        style: SMALL_BUTTON_STYLE,
                        disabled: busy,
                        onclick: move |_| on_delete.call(delete_id.clone()),
                        "Delete"
                    }
                }
            }
        }
    }
}

fn flag_panel(flags: &[FeatureFlag], busy: bool, on_toggle: EventHandler<String>) -> Element {
    let mut by_category: BTreeMap<String, Vec<FeatureFlag>> = BTreeMap::new();
    for flag in flags {
        by_category
            .entry(flag.category.clone())
            .or_default()
            .push(flag.clone());
    }

    rsx! {
        div {
            style: "border: 1px solid #bbb; border-radius: 8px; padding: 10px; margin: 8px 0;",
            {by_category.into_iter().map(|(category, group)| rsx!(
                div {
                    style: "margin-bottom: 8px;",
                    p { style: "margin: 4px 0; font-weight: bold;", "{category}" }
                    {group.into_iter().map(|flag| {
                        let key = flag.key.clone();
                        let modified = match (&flag.last_modified_by, &flag.last_modified_at) {
                            (Some(who), Some(when)) => format!("changed by {who} at {when}"),
                            _ => String::new(),
                        };
                        rsx!(
                            div {
                                style: "display: flex; gap: 10px; align-items: center; padding: 2px 0;",
                                span { style: "min-width: 180px;", "{flag.key}" }
                                if flag.enabled {
                                    span { style: "color: #1a7f37;", "on" }
                                } else {
                                    span { style: "color: #999;", "off" }
                                }
                                if flag.is_locked {
                                    span { style: "color: #c60; font-size: 12px;", "locked" }
                                }
                                button {
                                    style: SMALL_BUTTON_STYLE,
                                    disabled: busy,
                                    onclick: move |_| on_toggle.call(key.clone()),
                                    "Toggle"
                                }
                                span { style: "color: #999; font-size: 12px;", "{modified}" }
                            }
                        )
                    })}
                }
            ))}
        }
    }
}

#[component]
pub fn App() -> Element {
    let db_path = match default_db_path() {
        Ok(path) => path,
        Err(err) => {
            return rsx! {
                div {
                    p { "Failed to resolve the data directory: {err}" }
                }
            };
        }
    };

    let AppState {
        mut collection,
        mut records,
        mut quizzes,
        mut flags,
        mut loading,
        mut error,
        mut status,
        mut search,
        mut criteria,
        mut filter_field,
        mut filter_operator,
        mut filter_value,
        mut sort,
        mut page,
        mut page_size,
        mut selection,
        mut expanded_cells,
        mut show_deleted,
        mut show_add_form,
        mut new_record_inputs,
        mut busy,
    } = AppState::new();

    let mut initialized = use_signal(|| false);
    let mut reload_nonce = use_signal(|| 0_u32);
    let mut subscription = use_signal(|| None::<Subscription>);

    let repo = Arc::new(SqliteRepo::new(db_path));
    let content_service = Arc::new(ContentService::new(repo.clone()));
    let flag_service = Arc::new(FlagService::new(repo.clone()));
    let export_service = Arc::new(ExportService::new());
    let feed = use_hook(LiveFeed::new);

    let repo_for_init = repo.clone();
    let flag_service_for_init = flag_service.clone();
    use_effect(move || {
        if initialized() {
            return;
        }
        *busy.write() = true;
        let init_result = run_blocking(|| {
            repo_for_init.init()?;
            flag_service_for_init.seed_defaults()?;
            Ok::<(), RepoError>(())
        });
        match init_result {
            Ok(()) => {
                *status.write() = "Ready".to_string();
            }
            Err(err) => {
                error.set(Some(err.to_string()));
                *status.write() = "Initialization failed".to_string();
            }
        }
        initialized.set(true);
        *busy.write() = false;
    });

    let content_service_for_load = content_service.clone();
    let flag_service_for_load = flag_service.clone();
    let feed_for_load = feed.clone();
    use_effect(move || {
        if !initialized() {
            return;
        }
        let kind = collection();
        let with_deleted = show_deleted();
        let _nonce = reload_nonce();

        *loading.write() = true;

        // Replace the live listener; dropping the previous guard unsubscribes
        // the discarded view.
        let snapshots = feed_for_load.snapshots.clone();
        let errors = feed_for_load.errors.clone();
        let guard = content_service_for_load.subscribe(
            kind,
            Arc::new(move |snapshot| store_slot(&snapshots, snapshot)),
            Arc::new(move |live_error| store_slot(&errors, live_error)),
        );
        subscription.set(Some(guard));

        match run_blocking(|| content_service_for_load.list(kind, with_deleted)) {
            Ok(list) => {
                records.set(list);
                error.set(None);
            }
            Err(err) => {
                records.set(Vec::new());
                error.set(Some(err.to_string()));
            }
        }

        if kind == CollectionKind::Questions {
            match run_blocking(|| content_service_for_load.list(CollectionKind::Quizzes, false)) {
                Ok(list) => quizzes.set(list),
                Err(err) => *status.write() = format!("Quiz lookup unavailable: {err}"),
            }
        }
        if kind == CollectionKind::FeatureFlags {
            reload_flags(&flag_service_for_load, flags, status);
        }

        *loading.write() = false;
    });

    let kind = collection();
    let config = field_config(kind);
    let columns = derive_columns(kind);
    let raw_records = records();
    let current_criteria = criteria();
    let filtered = apply_search_and_filters(
        &raw_records,
        &search(),
        config.searchable_fields,
        &current_criteria,
    );
    let current_sort = sort();
    let sorted = match &current_sort {
        Some(state) => sort_records(&filtered, &state.column, state.direction),
        None => filtered,
    };
    let current_page = clamp_page_index(page(), sorted.len(), page_size());
    let slice = paginate(&sorted, current_page, page_size());
    let display = resolve_display_state(loading(), error().as_deref(), sorted.len());
    let page_ids: Vec<RecordId> = slice.rows.iter().map(|row| row.id.clone()).collect();
    let all_on_page_selected = selection().all_selected(&page_ids);
    let selected_count = selection().len();
    let quizzes_for_rows = quizzes();
    let total_rows = sorted.len();
    let search_placeholder = format!("Search {}", kind.label());
    let empty_message = format!("No records in {} match the current view.", kind.label());
    let error_text = error().unwrap_or_default();
    let page_label = format!("Page {} / {}", current_page + 1, slice.total_pages.max(1));
    let range_label = if total_rows == 0 {
        "0 records".to_string()
    } else {
        format!(
            "{}–{} of {total_rows}",
            slice.start_index + 1,
            slice.end_index
        )
    };

    let content_service_for_delete = content_service.clone();
    let feed_for_delete = feed.clone();
    let on_delete = EventHandler::new(move |id: RecordId| {
        let confirmed = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Confirm delete")
            .set_description("Delete this record? It stays visible under 'show deleted'.")
            .set_buttons(MessageButtons::YesNo)
            .show();
        if confirmed != MessageDialogResult::Yes {
            return;
        }
        *busy.write() = true;
        match run_blocking(|| content_service_for_delete.delete(collection(), &id)) {
            Ok(()) => {
                *status.write() = "Record deleted".to_string();
                if selection().is_selected(&id) {
                    selection.write().toggle(&id);
                }
                refresh_records(
                    &content_service_for_delete,
                    collection(),
                    show_deleted(),
                    &feed_for_delete,
                    records,
                    error,
                    status,
                );
            }
            Err(err) => error.set(Some(err.to_string())),
        }
        *busy.write() = false;
    });

    let content_service_for_purge = content_service.clone();
    let feed_for_purge = feed.clone();
    let on_purge = EventHandler::new(move |id: RecordId| {
        let confirmed = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Confirm permanent delete")
            .set_description("Permanently delete this record? This cannot be undone.")
            .set_buttons(MessageButtons::YesNo)
            .show();
        if confirmed != MessageDialogResult::Yes {
            return;
        }
        *busy.write() = true;
        match run_blocking(|| content_service_for_purge.purge(collection(), &id)) {
            Ok(()) => {
                *status.write() = "Record permanently deleted".to_string();
                refresh_records(
                    &content_service_for_purge,
                    collection(),
                    show_deleted(),
                    &feed_for_purge,
                    records,
                    error,
                    status,
                );
            }
            Err(err) => error.set(Some(err.to_string())),
        }
        *busy.write() = false;
    });

    let content_service_for_review = content_service.clone();
    let feed_for_review = feed.clone();
    let on_review = EventHandler::new(move |(id, approved): (RecordId, bool)| {
        *busy.write() = true;
        match run_blocking(|| content_service_for_review.review_application(&id, approved)) {
            Ok(updated) => {
                *status.write() = format!(
                    "Application {}",
                    updated.field_string("status")
                );
                refresh_records(
                    &content_service_for_review,
                    collection(),
                    show_deleted(),
                    &feed_for_review,
                    records,
                    error,
                    status,
                );
            }
            Err(err) => error.set(Some(err.to_string())),
        }
        *busy.write() = false;
    });

    let flag_service_for_toggle = flag_service.clone();
    let content_service_for_toggle = content_service.clone();
    let feed_for_toggle = feed.clone();
    let on_toggle_flag = EventHandler::new(move |key: String| {
        *busy.write() = true;
        match run_blocking(|| flag_service_for_toggle.toggle(&key, ADMIN_ACTOR)) {
            Ok(flag) => {
                *status.write() = format!(
                    "Flag '{}' is now {}",
                    flag.key,
                    if flag.enabled { "enabled" } else { "disabled" }
                );
                reload_flags(&flag_service_for_toggle, flags, status);
                refresh_records(
                    &content_service_for_toggle,
                    collection(),
                    show_deleted(),
                    &feed_for_toggle,
                    records,
                    error,
                    status,
                );
            }
            // A locked flag is rejected here, not merely hidden in the UI.
            Err(err) => *status.write() = format!("Toggle rejected: {err}"),
        }
        *busy.write() = false;
    });

    let content_service_for_bulk = content_service.clone();
    let feed_for_bulk = feed.clone();
    let on_bulk_delete = move |_| {
        let ids = selection().ids();
        if ids.is_empty() {
            return;
        }
        let confirmed = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Confirm bulk delete")
            .set_description(&format!("Delete {} selected records?", ids.len()))
            .set_buttons(MessageButtons::YesNo)
            .show();
        if confirmed != MessageDialogResult::Yes {
            return;
        }
        *busy.write() = true;
        match run_blocking(|| content_service_for_bulk.delete_selected(collection(), &ids)) {
            Ok(deleted) => {
                *status.write() = format!("Deleted {deleted} records");
                selection.write().clear();
                refresh_records(
                    &content_service_for_bulk,
                    collection(),
                    show_deleted(),
                    &feed_for_bulk,
                    records,
                    error,
                    status,
                );
            }
            Err(err) => error.set(Some(err.to_string())),
        }
        *busy.write() = false;
    };

    let export_rows = sorted.clone();
    let export_service_for_export = export_service.clone();
    let on_export = move |_| {
        let Some(path) = FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name(&format!("{}.csv", collection().storage_name()))
            .save_file()
        else {
            *status.write() = "Export cancelled".to_string();
            return;
        };
        *busy.write() = true;
        match export_service_for_export.export_csv(&path, collection(), &export_rows) {
            Ok(exported) => *status.write() = format!("Exported {exported} records"),
            Err(err) => *status.write() = format!("Export failed: {err}"),
        }
        *busy.write() = false;
    };

    let content_service_for_create = content_service.clone();
    let feed_for_create = feed.clone();
    let on_submit_new = move |_| {
        let target = collection();
        let inputs = new_record_inputs();
        let mut fields = FieldMap::new();
        for field in field_config(target).visible_fields {
            if let Some(text) = inputs.get(*field) {
                let value = parse_input_value(text);
                if !value.is_null() {
                    fields.insert((*field).to_string(), value);
                }
            }
        }
        *busy.write() = true;
        match run_blocking(|| content_service_for_create.create(target, fields)) {
            Ok(_created) => {
                *status.write() = "Record created".to_string();
                show_add_form.set(false);
                new_record_inputs.write().clear();
                refresh_records(
                    &content_service_for_create,
                    target,
                    show_deleted(),
                    &feed_for_create,
                    records,
                    error,
                    status,
                );
            }
            Err(RepoError::ValidationFailed(message)) => {
                *status.write() = format!("Cannot create: {message}");
            }
            Err(err) => error.set(Some(err.to_string())),
        }
        *busy.write() = false;
    };

    let toggle_page_ids = page_ids.clone();

    rsx! {
        div {
            style: "font-family: sans-serif; padding: 10px;",
            nav {
                style: "display: flex; gap: 12px; align-items: center; flex-wrap: wrap; padding: 8px 0;",
                label { "Collection " }
                select {
                    disabled: busy(),
                    value: collection().storage_name(),
                    onchange: move |event| {
                        let Some(next) = CollectionKind::from_storage_name(&event.value()) else {
                            return;
                        };
                        collection.set(next);
                        search.set(String::new());
                        criteria.set(Vec::new());
                        filter_field.set(String::new());
                        filter_value.set(String::new());
                        sort.set(None);
                        page.set(0);
                        selection.write().clear();
                        expanded_cells.write().clear();
                        show_add_form.set(false);
                        new_record_inputs.write().clear();
                    },
                    {CollectionKind::ALL.into_iter().map(|option_kind| {
                        let label = option_kind.label();
                        rsx!(
                            option {
                                value: option_kind.storage_name(),
                                selected: option_kind == kind,
                                "{label}"
                            }
                        )
                    })}
                }

                label {
                    input {
                        r#type: "checkbox",
                        checked: show_deleted(),
                        onchange: move |event| {
                            let checked = event.value().parse::<bool>().unwrap_or(false);
                            show_deleted.set(checked);
                            page.set(0);
                            selection.write().clear();
                        },
                    }
                    "Show deleted"
                }

                if kind != CollectionKind::FeatureFlags {
                    button {
                        style: BUTTON_STYLE,
                        disabled: busy(),
                        onclick: move |_| {
                            let next = !show_add_form();
                            show_add_form.set(next);
                        },
                        if show_add_form() { "Close form" } else { "New record" }
                    }
                }

                button {
                    style: BUTTON_STYLE,
                    disabled: busy() || total_rows == 0,
                    onclick: on_export,
                    "Export CSV"
                }

                span { style: "color: #555;", " {status}" }
            }

            div {
                style: "display: flex; gap: 12px; align-items: center; flex-wrap: wrap; padding: 4px 0;",
                label { "Search " }
                input {
                    disabled: busy(),
                    value: search(),
                    placeholder: search_placeholder,
                    onchange: move |event| {
                        search.set(event.value());
                        page.set(0);
                    },
                }

                label { "Filter " }
                select {
                    disabled: busy(),
                    value: if filter_field().is_empty() {
                        NONE_OPTION_VALUE.to_string()
                    } else {
                        filter_field()
                    },
                    onchange: move |event| {
                        let value = event.value();
                        if value == NONE_OPTION_VALUE {
                            filter_field.set(String::new());
                        } else {
                            filter_field.set(value);
                        }
                    },
                    option { value: NONE_OPTION_VALUE, "(field)" }
                    {config.visible_fields.iter().map(|field| {
                        let label = humanize_field_name(field);
                        rsx!(option { value: *field, "{label}" })
                    })}
                }
                select {
                    disabled: busy(),
                    value: filter_operator(),
                    onchange: move |event| filter_operator.set(event.value()),
                    {FilterOperator::ALL.into_iter().map(|operator| {
                        let label = operator.label();
                        rsx!(option { value: label, "{label}" })
                    })}
                }
                input {
                    disabled: busy(),
                    value: filter_value(),
                    placeholder: "value",
                    onchange: move |event| filter_value.set(event.value()),
                }
                button {
                    style: BUTTON_STYLE,
                    disabled: busy()
                        || filter_field().is_empty()
                        || filter_value().trim().is_empty(),
                    onclick: move |_| {
                        let Some(operator) = FilterOperator::parse(&filter_operator()) else {
                            return;
                        };
                        criteria.write().push(FilterCriterion {
                            field: filter_field(),
                            operator,
                            value: filter_value().trim().to_string(),
                        });
                        filter_value.set(String::new());
                        page.set(0);
                    },
                    "Add filter"
                }
            }

            if !current_criteria.is_empty() {
                div {
                    style: "display: flex; gap: 8px; flex-wrap: wrap; padding: 4px 0;",
                    {current_criteria.iter().enumerate().map(|(idx, criterion)| {
                        let chip = format!(
                            "{} {} \"{}\"",
                            criterion.field,
                            criterion.operator.label(),
                            criterion.value
                        );
                        rsx!(
                            span {
                                style: "border: 1px solid #bbb; border-radius: 12px; padding: 2px 10px; background: #eef4ff;",
                                "{chip}"
                                button {
                                    style: SMALL_BUTTON_STYLE,
                                    onclick: move |_| {
                                        criteria.write().remove(idx);
                                        page.set(0);
                                    },
                                    "×"
                                }
                            }
                        )
                    })}
                }
            }

            if show_add_form() {
                div {
                    style: "border: 1px solid #bbb; border-radius: 8px; padding: 10px; margin: 8px 0; display: flex; gap: 10px; flex-wrap: wrap; align-items: flex-end;",
                    {config.visible_fields.iter().map(|field| {
                        let name = (*field).to_string();
                        let value = new_record_inputs().get(&name).cloned().unwrap_or_default();
                        let required = config.required_fields.contains(field);
                        let name_for_input = name.clone();
                        let label = humanize_field_name(&name);
                        rsx!(
                            label {
                                style: "display: flex; flex-direction: column; gap: 2px; font-size: 13px;",
                                span {
                                    "{label}"
                                    if required { span { style: "color: #c00;", " *" } }
                                }
                                input {
                                    value: "{value}",
                                    onchange: move |event| {
                                        new_record_inputs
                                            .write()
                                            .insert(name_for_input.clone(), event.value());
                                    },
                                }
                            }
                        )
                    })}
                    button {
                        style: BUTTON_STYLE,
                        disabled: busy(),
                        onclick: on_submit_new,
                        "Create"
                    }
                }
            }

            if kind == CollectionKind::FeatureFlags {
                {flag_panel(&flags(), busy(), on_toggle_flag)}
            }

            if selected_count > 0 {
                div {
                    style: "display: flex; gap: 12px; align-items: center; padding: 4px 0;",
                    span { "{selected_count} selected" }
                    button {
                        style: BUTTON_STYLE,
                        disabled: busy(),
                        onclick: on_bulk_delete,
                        "Delete selected"
                    }
                    button {
                        style: BUTTON_STYLE,
                        onclick: move |_| selection.write().clear(),
                        "Clear selection"
                    }
                }
            }

            match display {
                DisplayState::Loading => rsx! {
                    div { style: "padding: 24px; color: #555;", "Loading…" }
                },
                DisplayState::Error => rsx! {
                    div {
                        style: "padding: 16px; border: 1px solid #c00; border-radius: 8px; background: #fff3f3;",
                        p { style: "margin: 0 0 8px 0; color: #c00;", "{error_text}" }
                        button {
                            style: BUTTON_STYLE,
                            onclick: move |_| {
                                error.set(None);
                                reload_nonce.set(reload_nonce() + 1);
                            },
                            "Retry"
                        }
                    }
                },
                DisplayState::Empty => rsx! {
                    div { style: "padding: 24px; color: #555;", "{empty_message}" }
                },
                DisplayState::Data => rsx! {
                    table { style: "border-collapse: collapse; width: 100%; border: 1px solid #bbb;",
                        thead {
                            tr {
                                th { style: HEADER_CELL_STYLE,
                                    input {
                                        r#type: "checkbox",
                                        checked: all_on_page_selected,
                                        onclick: move |_| {
                                            selection.write().toggle_page(&toggle_page_ids);
                                        },
                                    }
                                }
                                {columns.iter().map(|column| {
                                    let column_id = column.id.clone();
                                    let indicator = sort_indicator(current_sort.as_ref(), &column.id);
                                    let header = format!("{}{indicator}", column.header);
                                    rsx!(
                                        th {
                                            style: HEADER_CELL_STYLE,
                                            onclick: move |_| {
                                                sort.set(next_sort(sort().as_ref(), &column_id));
                                            },
                                            "{header}"
                                        }
                                    )
                                })}
                                th { style: HEADER_CELL_STYLE, "Actions" }
                            }
                        }
                        tbody {
                            {slice.rows.iter().map(|record| row_view(
                                record,
                                &columns,
                                kind,
                                &quizzes_for_rows,
                                busy(),
                                selection,
                                expanded_cells,
                                status,
                                on_delete,
                                on_purge,
                                on_review,
                            ))}
                        }
                    }
                },
            }

            div {
                style: "display: flex; gap: 12px; align-items: center; padding: 8px 0;",
                span { "{range_label}" }
                button {
                    style: BUTTON_STYLE,
                    disabled: busy() || current_page == 0,
                    onclick: move |_| page.set(current_page.saturating_sub(1)),
                    "Prev"
                }
                span { "{page_label}" }
                button {
                    style: BUTTON_STYLE,
                    disabled: busy() || current_page + 1 >= slice.total_pages,
                    onclick: move |_| page.set(current_page + 1),
                    "Next"
                }
                label { "Page size " }
                select {
                    disabled: busy(),
                    value: page_size().to_string(),
                    onchange: move |event| {
                        if let Ok(size) = event.value().parse::<usize>() {
                            page_size.set(size);
                            page.set(0);
                        }
                    },
                    for choice in PAGE_SIZE_CHOICES {
                        option { value: "{choice}", "{choice}" }
                    }
                }
            }
        }
    }
}
