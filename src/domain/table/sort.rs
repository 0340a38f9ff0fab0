use std::cmp::Ordering;

use crate::domain::entities::record::{FieldValue, Record};
use crate::domain::table::state::SortDirection;

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(record: &Record, field: &str) -> Option<SortKey> {
    match record.field(field) {
        Some(FieldValue::Null) | None => None,
        Some(FieldValue::Number(value)) => Some(SortKey::Number(*value)),
        Some(value) => Some(SortKey::Text(value.query_string().to_lowercase())),
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
        // Mixed types fall back to string comparison.
        (a, b) => key_string(a).cmp(&key_string(b)),
    }
}

fn key_string(key: &SortKey) -> String {
    match key {
        SortKey::Number(value) => crate::domain::entities::record::format_number(*value),
        SortKey::Text(value) => value.clone(),
    }
}

/// Stable sort by one field. Records with a missing or null value for the
/// field sort last regardless of direction; equal keys keep input order.
pub fn sort_records(records: &[Record], field: &str, direction: SortDirection) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let key_a = sort_key(a, field);
        let key_b = sort_key(b, field);
        match (key_a, key_b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => {
                let ordering = compare_keys(&a, &b);
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    });
    sorted
}

/// One page of a record set plus the window bookkeeping the footer shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice {
    pub rows: Vec<Record>,
    pub total_pages: usize,
    pub start_index: usize,
    pub end_index: usize,
}

pub fn total_pages(total_rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_rows.div_ceil(page_size)
}

/// Returns the slice `[index*size, min(index*size+size, len))`. An
/// out-of-range page index yields an empty slice, not an error; callers clamp
/// with `clamp_page_index` after the data changes.
pub fn paginate(records: &[Record], page_index: usize, page_size: usize) -> PageSlice {
    let pages = total_pages(records.len(), page_size);
    let start_index = page_index.saturating_mul(page_size).min(records.len());
    let end_index = start_index.saturating_add(page_size).min(records.len());

    PageSlice {
        rows: records[start_index..end_index].to_vec(),
        total_pages: pages,
        start_index,
        end_index,
    }
}

pub fn clamp_page_index(page_index: usize, total_rows: usize, page_size: usize) -> usize {
    let pages = total_pages(total_rows, page_size);
    if pages == 0 {
        0
    } else {
        page_index.min(pages - 1)
    }
}
