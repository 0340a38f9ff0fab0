use std::collections::{BTreeSet, HashMap};

use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::collection::CollectionKind;
use crate::domain::entities::flag::FeatureFlag;
use crate::domain::entities::record::Record;
use crate::domain::table::search::FilterCriterion;
use crate::domain::table::state::{SelectionState, SortState};

pub struct AppState {
    pub collection: Signal<CollectionKind>,
    pub records: Signal<Vec<Record>>,
    pub quizzes: Signal<Vec<Record>>,
    pub flags: Signal<Vec<FeatureFlag>>,
    pub loading: Signal<bool>,
    pub error: Signal<Option<String>>,
    pub status: Signal<String>,
    pub search: Signal<String>,
    pub criteria: Signal<Vec<FilterCriterion>>,
    pub filter_field: Signal<String>,
    pub filter_operator: Signal<String>,
    pub filter_value: Signal<String>,
    pub sort: Signal<Option<SortState>>,
    pub page: Signal<usize>,
    pub page_size: Signal<usize>,
    pub selection: Signal<SelectionState>,
    pub show_deleted: Signal<bool>,
    pub expanded_cells: Signal<BTreeSet<(String, String)>>,
    pub show_add_form: Signal<bool>,
    pub new_record_inputs: Signal<HashMap<String, String>>,
    pub busy: Signal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            collection: use_signal(|| CollectionKind::Carousel),
            records: use_signal(Vec::<Record>::new),
            quizzes: use_signal(Vec::<Record>::new),
            flags: use_signal(Vec::<FeatureFlag>::new),
            loading: use_signal(|| true),
            error: use_signal(|| None::<String>),
            status: use_signal(|| "Starting".to_string()),
            search: use_signal(String::new),
            criteria: use_signal(Vec::<FilterCriterion>::new),
            filter_field: use_signal(String::new),
            filter_operator: use_signal(|| "contains".to_string()),
            filter_value: use_signal(String::new),
            sort: use_signal(|| None::<SortState>),
            page: use_signal(|| 0_usize),
            page_size: use_signal(|| crate::DEFAULT_PAGE_SIZE),
            selection: use_signal(SelectionState::new),
            show_deleted: use_signal(|| false),
            expanded_cells: use_signal(BTreeSet::<(String, String)>::new),
            show_add_form: use_signal(|| false),
            new_record_inputs: use_signal(HashMap::<String, String>::new),
            busy: use_signal(|| false),
        }
    }
}
