use crate::domain::entities::record::{format_number, FieldValue};

pub const DEFAULT_TRUNCATE_LEN: usize = 80;

/// What a table cell should render as. Classification is total: a missing
/// accessor or null value becomes `Missing`, never a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Renders as a neutral "—" placeholder.
    Missing,
    YesNo(bool),
    /// Comma-joined list; `truncated` asks the view for expand/collapse.
    List { items: Vec<String>, truncated: bool },
    /// Pretty-printed structured text for nested objects.
    Structured { text: String, truncated: bool },
    Link(String),
    Email(String),
    Text { text: String, truncated: bool },
}

pub fn classify_cell(value: Option<&FieldValue>, truncate_len: usize) -> CellContent {
    let value = match value {
        Some(FieldValue::Null) | None => return CellContent::Missing,
        Some(value) => value,
    };

    match value {
        FieldValue::Null => CellContent::Missing,
        FieldValue::Bool(flag) => CellContent::YesNo(*flag),
        FieldValue::Number(number) => CellContent::Text {
            text: format_number(*number),
            truncated: false,
        },
        FieldValue::List(items) => {
            let items: Vec<String> = items.iter().map(FieldValue::query_string).collect();
            let joined_len = items.iter().map(|item| item.len() + 2).sum::<usize>();
            CellContent::List {
                truncated: joined_len > truncate_len,
                items,
            }
        }
        FieldValue::Object(map) => {
            let text = serde_json::to_string_pretty(map).unwrap_or_default();
            CellContent::Structured {
                truncated: text.len() > truncate_len,
                text,
            }
        }
        FieldValue::Text(text) => {
            if text.is_empty() {
                CellContent::Missing
            } else if looks_like_url(text) {
                CellContent::Link(text.clone())
            } else if looks_like_email(text) {
                CellContent::Email(text.clone())
            } else {
                CellContent::Text {
                    text: text.clone(),
                    truncated: text.len() > truncate_len,
                }
            }
        }
    }
}

pub fn looks_like_url(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

pub fn looks_like_email(text: &str) -> bool {
    if text.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = text.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Shortens a string for collapsed display, appending an ellipsis.
pub fn truncate_text(text: &str, truncate_len: usize) -> String {
    if text.len() <= truncate_len {
        return text.to_string();
    }
    let mut cut = truncate_len;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &text[..cut])
}
