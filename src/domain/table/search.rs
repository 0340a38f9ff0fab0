use crate::domain::entities::record::Record;

/// One field-level filter test. A filter set is a conjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriterion {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 4] = [
        FilterOperator::Equals,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
        }
    }

    /// Unknown operator strings parse to `None`; callers treat that as a
    /// criterion that matches nothing rather than an error.
    pub fn parse(text: &str) -> Option<FilterOperator> {
        FilterOperator::ALL
            .into_iter()
            .find(|operator| operator.label() == text)
    }
}

/// Case-insensitive free-text search across the given fields. An empty or
/// whitespace-only query returns the input unchanged.
pub fn apply_search(records: &[Record], query: &str, searchable_fields: &[&str]) -> Vec<Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| {
            searchable_fields.iter().any(|field| {
                let haystack = record.field_string(field).to_lowercase();
                !haystack.is_empty() && haystack.contains(&needle)
            })
        })
        .cloned()
        .collect()
}

/// A record passes iff it satisfies every criterion. An empty criteria list
/// is identity.
pub fn apply_filters(records: &[Record], criteria: &[FilterCriterion]) -> Vec<Record> {
    if criteria.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| criteria.iter().all(|criterion| matches_criterion(record, criterion)))
        .cloned()
        .collect()
}

/// Per-criterion evaluation: stringify both sides, lowercase, apply the
/// operator. A record with no value for the field never passes.
pub fn matches_criterion(record: &Record, criterion: &FilterCriterion) -> bool {
    let value = match record.field(criterion.field.as_str()) {
        Some(value) if !value.is_null() => value.query_string().to_lowercase(),
        _ => return false,
    };
    if value.is_empty() {
        return false;
    }
    let target = criterion.value.to_lowercase();

    match criterion.operator {
        FilterOperator::Equals => value == target,
        FilterOperator::Contains => value.contains(&target),
        FilterOperator::StartsWith => value.starts_with(&target),
        FilterOperator::EndsWith => value.ends_with(&target),
    }
}

/// Search narrows first, then filters. Equivalent to calling the two steps
/// separately in that order.
pub fn apply_search_and_filters(
    records: &[Record],
    query: &str,
    searchable_fields: &[&str],
    criteria: &[FilterCriterion],
) -> Vec<Record> {
    let searched = apply_search(records, query, searchable_fields);
    apply_filters(&searched, criteria)
}
