//! In-memory list engine: search, category filter and sort.
//!
//! A [`ListView`] owns one fetched collection and derives the visible,
//! ordered sequence from it on every read. Searching and sorting never touch
//! the network.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

use crate::models::{
    Command, EntityKind, KeyValue, Note, Project, Record, Website, WebsiteCategory,
};
use crate::{Error, Result};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// A comparable projection of one record for one sort key.
///
/// A given key always yields the same variant, so the derived ordering only
/// ever compares like with like.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    /// Lowercased text, compared lexicographically
    Text(String),
    /// Timestamp, compared chronologically
    Time(DateTime<Utc>),
    /// Derived count, compared numerically
    Count(usize),
}

impl SortValue {
    fn text(s: &str) -> Self {
        Self::Text(s.to_lowercase())
    }
}

/// Website category filter; `All` lets everything through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(WebsiteCategory),
}

impl CategoryFilter {
    fn admits(&self, category: Option<WebsiteCategory>) -> bool {
        match (self, category) {
            (Self::All, _) => true,
            (Self::Only(wanted), Some(actual)) => *wanted == actual,
            // Records without a category are not subject to the filter.
            (Self::Only(_), None) => true,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Only(category) => write!(f, "{}", category),
        }
    }
}

/// A record type the list engine can search and sort.
pub trait Listable {
    /// The fields this type can be sorted by.
    type SortKey: ValueEnum + Copy + Eq + fmt::Debug + Send + Sync + 'static;

    /// Which kind of record this is, for messages.
    const KIND: EntityKind;

    /// Text fields matched by the search term.
    fn search_fields(&self) -> Vec<&str>;

    /// Comparable value for a sort key.
    fn sort_value(&self, key: Self::SortKey) -> SortValue;

    /// Category, for kinds that have one.
    fn category(&self) -> Option<WebsiteCategory> {
        None
    }

    /// Whether the lowercased search term occurs in any search field.
    fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Why a list rendered nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyState {
    /// The collection itself is empty
    NoRecords,
    /// The collection has records but none pass the search/filter
    NoMatches { term: String },
}

impl EmptyState {
    /// Message shown in place of the list.
    pub fn message(&self, kind: EntityKind) -> String {
        match self {
            Self::NoRecords => format!("No {} found.", kind.plural_label()),
            Self::NoMatches { term } if term.is_empty() => {
                format!("No {} match the selected filters.", kind.plural_label())
            }
            Self::NoMatches { term } => {
                format!("No {} match your search \"{}\".", kind.plural_label(), term)
            }
        }
    }
}

/// A fetched collection plus the current search, filter and sort settings.
#[derive(Debug, Clone)]
pub struct ListView<R: Listable> {
    records: Vec<R>,
    term: String,
    category: CategoryFilter,
    sort: Option<(R::SortKey, Direction)>,
}

impl<R: Listable> ListView<R> {
    /// Start a view in the collection's own order, with no search or filter.
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            term: String::new(),
            category: CategoryFilter::All,
            sort: None,
        }
    }

    /// Swap in a freshly fetched collection, keeping the settings.
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
    }

    /// Take the outcome of a refetch; on failure the current records stay.
    pub fn apply_fetch(&mut self, fetched: Result<Vec<R>>) -> Result<()> {
        self.records = fetched?;
        Ok(())
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    pub fn search(&self) -> &str {
        &self.term
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    /// Select a sort key: the current key flips direction, a new key starts ascending.
    pub fn toggle_sort(&mut self, key: R::SortKey) {
        self.sort = match self.sort {
            Some((current, direction)) if current == key => Some((key, direction.flipped())),
            _ => Some((key, Direction::Ascending)),
        };
    }

    /// Set key and direction directly.
    pub fn set_sort(&mut self, key: R::SortKey, direction: Direction) {
        self.sort = Some((key, direction));
    }

    pub fn sort(&self) -> Option<(R::SortKey, Direction)> {
        self.sort
    }

    /// The visible records: search, then category filter, then sort.
    pub fn items(&self) -> Vec<&R> {
        let needle = self.term.to_lowercase();
        let mut items: Vec<&R> = self
            .records
            .iter()
            .filter(|record| record.matches(&needle))
            .filter(|record| self.category.admits(record.category()))
            .collect();

        if let Some((key, direction)) = self.sort {
            items.sort_by(|a, b| {
                let ordering = a.sort_value(key).cmp(&b.sort_value(key));
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        items
    }

    /// What to show instead of the list, if it renders nothing.
    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.records.is_empty() {
            Some(EmptyState::NoRecords)
        } else if self.items().is_empty() {
            Some(EmptyState::NoMatches {
                term: self.term.clone(),
            })
        } else {
            None
        }
    }
}

/// Parse a sort key name (case-insensitive), listing valid names on failure.
pub fn parse_sort_key<K: ValueEnum>(name: &str) -> Result<K> {
    K::from_str(name, true).map_err(|_| {
        let valid: Vec<String> = K::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        Error::InvalidInput(format!(
            "Unknown sort key '{}' (expected one of: {})",
            name,
            valid.join(", ")
        ))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyValueSort {
    Key,
    Value,
    CreatedAt,
}

impl Listable for Record<KeyValue> {
    type SortKey = KeyValueSort;
    const KIND: EntityKind = EntityKind::KeyValue;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.doc.key.as_str(), self.doc.value.as_str()]
    }

    fn sort_value(&self, key: KeyValueSort) -> SortValue {
        match key {
            KeyValueSort::Key => SortValue::text(&self.doc.key),
            KeyValueSort::Value => SortValue::text(&self.doc.value),
            KeyValueSort::CreatedAt => SortValue::Time(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectSort {
    Name,
    #[value(alias = "urls")]
    UrlCount,
    CreatedAt,
}

impl Listable for Record<Project> {
    type SortKey = ProjectSort;
    const KIND: EntityKind = EntityKind::Project;

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.doc.name.as_str()];
        fields.extend(self.doc.urls.iter().map(String::as_str));
        fields
    }

    fn sort_value(&self, key: ProjectSort) -> SortValue {
        match key {
            ProjectSort::Name => SortValue::text(&self.doc.name),
            ProjectSort::UrlCount => SortValue::Count(self.doc.urls.len()),
            ProjectSort::CreatedAt => SortValue::Time(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CommandSort {
    Title,
    Command,
    CreatedAt,
}

impl Listable for Record<Command> {
    type SortKey = CommandSort;
    const KIND: EntityKind = EntityKind::Command;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.doc.title.as_str(), self.doc.command.as_str()]
    }

    fn sort_value(&self, key: CommandSort) -> SortValue {
        match key {
            CommandSort::Title => SortValue::text(&self.doc.title),
            CommandSort::Command => SortValue::text(&self.doc.command),
            CommandSort::CreatedAt => SortValue::Time(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoteSort {
    Title,
    Content,
    CreatedAt,
}

impl Listable for Record<Note> {
    type SortKey = NoteSort;
    const KIND: EntityKind = EntityKind::Note;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.doc.title.as_str(), self.doc.content.as_str()]
    }

    fn sort_value(&self, key: NoteSort) -> SortValue {
        match key {
            NoteSort::Title => SortValue::text(&self.doc.title),
            NoteSort::Content => SortValue::text(&self.doc.content),
            NoteSort::CreatedAt => SortValue::Time(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WebsiteSort {
    Title,
    Category,
    CreatedAt,
}

impl Listable for Record<Website> {
    type SortKey = WebsiteSort;
    const KIND: EntityKind = EntityKind::Website;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.doc.title.as_str(), self.doc.url.as_str(), self.doc.category.as_str()]
    }

    fn sort_value(&self, key: WebsiteSort) -> SortValue {
        match key {
            WebsiteSort::Title => SortValue::text(&self.doc.title),
            WebsiteSort::Category => SortValue::text(self.doc.category.as_str()),
            WebsiteSort::CreatedAt => SortValue::Time(self.created_at),
        }
    }

    fn category(&self) -> Option<WebsiteCategory> {
        Some(self.doc.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn note(title: &str, content: &str, minutes: i64) -> Record<Note> {
        Record {
            id: format!("note-{}", title),
            doc: Note {
                title: title.to_string(),
                content: content.to_string(),
            },
            created_at: at(minutes),
            updated_at: at(minutes),
        }
    }

    fn project(name: &str, urls: usize) -> Record<Project> {
        Record {
            id: format!("project-{}", name),
            doc: Project {
                name: name.to_string(),
                urls: (0..urls).map(|i| format!("https://{}/{}", name, i)).collect(),
            },
            created_at: at(0),
            updated_at: at(0),
        }
    }

    fn website(title: &str, category: WebsiteCategory) -> Record<Website> {
        Record {
            id: format!("site-{}", title),
            doc: Website {
                title: title.to_string(),
                url: format!("https://{}.example", title.to_lowercase()),
                category,
            },
            created_at: at(0),
            updated_at: at(0),
        }
    }

    fn titles(items: &[&Record<Note>]) -> Vec<String> {
        items.iter().map(|n| n.doc.title.clone()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut view = ListView::new(vec![note("Foo", "", 0), note("Bar", "", 1)]);
        for term in ["foo", "FOO", "fOo"] {
            view.set_search(term);
            assert_eq!(titles(&view.items()), vec!["Foo"]);
        }
    }

    #[test]
    fn test_empty_search_keeps_existing_order() {
        let mut view = ListView::new(vec![note("Foo", "", 0), note("Bar", "", 1)]);
        view.set_search("");
        assert_eq!(titles(&view.items()), vec!["Foo", "Bar"]);
    }

    #[test]
    fn test_search_looks_at_every_field() {
        let view_items = |term: &str| {
            let mut view = ListView::new(vec![note("Groceries", "eggs and MILK", 0)]);
            view.set_search(term);
            view.items().len()
        };
        assert_eq!(view_items("milk"), 1);
        assert_eq!(view_items("grocer"), 1);
        assert_eq!(view_items("bread"), 0);
    }

    #[test]
    fn test_toggle_same_key_reverses_order() {
        let mut view = ListView::new(vec![
            note("banana", "", 0),
            note("Apple", "", 1),
            note("cherry", "", 2),
        ]);

        view.toggle_sort(NoteSort::Title);
        assert_eq!(view.sort(), Some((NoteSort::Title, Direction::Ascending)));
        let ascending = titles(&view.items());
        assert_eq!(ascending, vec!["Apple", "banana", "cherry"]);

        view.toggle_sort(NoteSort::Title);
        assert_eq!(view.sort(), Some((NoteSort::Title, Direction::Descending)));
        let mut descending = titles(&view.items());
        assert_eq!(descending, vec!["cherry", "banana", "Apple"]);

        descending.reverse();
        assert_eq!(descending, ascending);
    }

    #[test]
    fn test_new_key_resets_to_ascending() {
        let mut view = ListView::new(vec![note("a", "z", 0), note("b", "y", 1)]);
        view.toggle_sort(NoteSort::Title);
        view.toggle_sort(NoteSort::Title);
        view.toggle_sort(NoteSort::Content);
        assert_eq!(view.sort(), Some((NoteSort::Content, Direction::Ascending)));
        assert_eq!(titles(&view.items()), vec!["b", "a"]);
    }

    #[test]
    fn test_sort_by_creation_time_is_chronological() {
        let mut view = ListView::new(vec![note("late", "", 30), note("early", "", -30), note("mid", "", 0)]);
        view.toggle_sort(NoteSort::CreatedAt);
        assert_eq!(titles(&view.items()), vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_sort_by_url_count_is_numeric() {
        let mut view = ListView::new(vec![project("ten", 10), project("two", 2), project("one", 1)]);
        view.toggle_sort(ProjectSort::UrlCount);
        let names: Vec<&str> = view.items().iter().map(|p| p.doc.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "ten"]);
    }

    #[test]
    fn test_sort_applies_to_filtered_set_only() {
        let mut view = ListView::new(vec![note("b-match", "", 0), note("other", "", 1), note("a-match", "", 2)]);
        view.set_search("match");
        view.toggle_sort(NoteSort::Title);
        assert_eq!(titles(&view.items()), vec!["a-match", "b-match"]);
    }

    #[test]
    fn test_category_filter_after_search() {
        let mut view = ListView::new(vec![
            website("Claude", WebsiteCategory::Ai),
            website("Crew", WebsiteCategory::AiAgent),
            website("Portfolio", WebsiteCategory::Deployed),
        ]);

        view.set_category(CategoryFilter::Only(WebsiteCategory::AiAgent));
        let titles: Vec<&str> = view.items().iter().map(|w| w.doc.title.as_str()).collect();
        assert_eq!(titles, vec!["Crew"]);

        view.set_search("claude");
        assert!(view.items().is_empty());

        view.set_category(CategoryFilter::All);
        assert_eq!(view.items().len(), 1);
    }

    #[test]
    fn test_category_is_searchable() {
        let mut view = ListView::new(vec![
            website("Crew", WebsiteCategory::AiAgent),
            website("Portfolio", WebsiteCategory::Deployed),
        ]);
        view.set_search("deployed");
        let titles: Vec<&str> = view.items().iter().map(|w| w.doc.title.as_str()).collect();
        assert_eq!(titles, vec!["Portfolio"]);
    }

    #[test]
    fn test_items_reflect_replaced_records() {
        let mut view = ListView::new(vec![note("old", "", 0)]);
        view.set_search("new");
        assert!(view.items().is_empty());
        view.set_records(vec![note("new", "", 1)]);
        assert_eq!(view.items().len(), 1);
    }

    #[test]
    fn test_failed_fetch_keeps_records() {
        let mut view = ListView::new(vec![note("kept", "", 0)]);
        let err = view
            .apply_fetch(Err(Error::Other("connection refused".to_string())))
            .unwrap_err();
        assert!(err.to_string().contains("refused"));
        assert_eq!(titles(&view.items()), vec!["kept"]);

        view.apply_fetch(Ok(vec![note("fresh", "", 1)])).unwrap();
        assert_eq!(titles(&view.items()), vec!["fresh"]);
    }

    #[test]
    fn test_empty_states() {
        let empty: ListView<Record<Note>> = ListView::new(Vec::new());
        assert_eq!(empty.empty_state(), Some(EmptyState::NoRecords));
        assert_eq!(
            EmptyState::NoRecords.message(EntityKind::Note),
            "No notes found."
        );

        let mut view = ListView::new(vec![note("Foo", "", 0)]);
        assert_eq!(view.empty_state(), None);
        view.set_search("zzz");
        let state = view.empty_state().unwrap();
        assert_eq!(
            state,
            EmptyState::NoMatches {
                term: "zzz".to_string()
            }
        );
        assert_eq!(
            state.message(EntityKind::Note),
            "No notes match your search \"zzz\"."
        );
    }

    #[test]
    fn test_category_filter_parsing() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "AI Agent".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(WebsiteCategory::AiAgent)
        );
        assert!("Blogs".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn test_parse_sort_key() {
        assert_eq!(parse_sort_key::<ProjectSort>("urls").unwrap(), ProjectSort::UrlCount);
        assert_eq!(parse_sort_key::<ProjectSort>("url-count").unwrap(), ProjectSort::UrlCount);
        assert_eq!(parse_sort_key::<NoteSort>("Created-At").unwrap(), NoteSort::CreatedAt);
        let err = parse_sort_key::<KeyValueSort>("title").unwrap_err();
        assert!(err.to_string().contains("key, value, created-at"));
    }
}
