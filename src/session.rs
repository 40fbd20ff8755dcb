//! Client-side rating session.
//!
//! Models the search-and-rate flow as a pure state machine, independent of
//! any UI or transport: debounced search with latest-request-wins response
//! handling, candidate selection, clamped star edits, and an optimistic
//! save cycle that adopts the datastore-assigned id after a create so the
//! next save targets an update.

use crate::types::{clamp_stars, PersonFields, PersonRecord};

/// What the search pane is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchView {
    Idle,
    /// A request is in flight for the given sequence number
    Loading(u64),
    /// Candidates found; "did-you-mean" list, never a full result set
    Results(Vec<PersonRecord>),
    /// Nothing matched; the client offers to create a new record
    NoMatch,
}

/// The record currently being edited. A record is either new (held only in
/// client memory) or persisted (has a datastore id).
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    New {
        first_name: String,
        last_name: String,
        stars: u32,
    },
    Existing {
        id: String,
        fields: PersonFields,
    },
}

/// Per-save lifecycle: idle -> saving -> saved | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    Saving,
    Saved,
    Failed,
}

/// What a save should send to the facade. A present `record_id` targets
/// update semantics, otherwise create.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub record_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub stars: u32,
}

pub struct Session {
    max_stars: u32,
    revert_on_failure: bool,
    next_seq: u64,
    view: SearchView,
    selection: Option<Selection>,
    save: SaveState,
    /// Last rating loaded from or persisted to the datastore; reverts go
    /// back to this, never to an intermediate edit.
    stars_before_save: u32,
    /// False when the selection was seeded from an identifier alone and
    /// the stored rating is unknown.
    baseline_known: bool,
}

impl Session {
    pub fn new(max_stars: u32, revert_on_failure: bool) -> Self {
        Self {
            max_stars,
            revert_on_failure,
            next_seq: 0,
            view: SearchView::Idle,
            selection: None,
            save: SaveState::Idle,
            stars_before_save: 0,
            baseline_known: true,
        }
    }

    pub fn view(&self) -> &SearchView {
        &self.view
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn save_state(&self) -> SaveState {
        self.save
    }

    /// Start a search for `query`, superseding any in-flight request.
    ///
    /// Returns the sequence number to tag the request with, or `None` for
    /// a blank query, which clears the result view without issuing a
    /// request at all.
    pub fn begin_search(&mut self, query: &str) -> Option<u64> {
        if query.trim().is_empty() {
            self.view = SearchView::Idle;
            return None;
        }
        self.next_seq += 1;
        self.view = SearchView::Loading(self.next_seq);
        Some(self.next_seq)
    }

    /// Apply a search response. Only the response matching the latest
    /// issued request is applied; anything older is discarded and the
    /// method returns false.
    pub fn apply_results(&mut self, seq: u64, records: Vec<PersonRecord>) -> bool {
        if seq != self.next_seq || !matches!(self.view, SearchView::Loading(_)) {
            return false;
        }
        self.view = if records.is_empty() {
            SearchView::NoMatch
        } else {
            SearchView::Results(records)
        };
        true
    }

    /// Select the candidate at `index`, loading its rating into the editor.
    pub fn select(&mut self, index: usize) -> bool {
        let SearchView::Results(records) = &self.view else {
            return false;
        };
        let Some(record) = records.get(index) else {
            return false;
        };
        self.select_record(record.clone());
        true
    }

    /// Load a known record into the editor directly, bypassing search.
    pub fn select_record(&mut self, record: PersonRecord) {
        self.stars_before_save = record.fields.stars;
        self.baseline_known = true;
        self.selection = Some(Selection::Existing {
            id: record.id,
            fields: record.fields,
        });
        self.view = SearchView::Idle;
        self.save = SaveState::Idle;
    }

    /// Target a record known only by its identifier. The stored rating is
    /// unknown, so any absolute edit counts as a change and must be saved
    /// rather than skipped as a no-op.
    pub fn select_unrated(&mut self, id: String) {
        self.stars_before_save = 0;
        self.baseline_known = false;
        self.selection = Some(Selection::Existing {
            id,
            fields: PersonFields::default(),
        });
        self.view = SearchView::Idle;
        self.save = SaveState::Idle;
    }

    /// Seed a transient unsaved record from the query text: first token
    /// becomes the first name, the remainder the last name.
    pub fn start_new(&mut self, query: &str) {
        let mut tokens = query.trim().split_whitespace();
        let first_name = tokens.next().unwrap_or_default().to_string();
        let last_name = tokens.collect::<Vec<_>>().join(" ");
        self.stars_before_save = 0;
        self.baseline_known = true;
        self.selection = Some(Selection::New {
            first_name,
            last_name,
            stars: 0,
        });
        self.view = SearchView::Idle;
        self.save = SaveState::Idle;
    }

    /// Current rating of the selected record, if any.
    pub fn stars(&self) -> Option<u32> {
        match &self.selection {
            Some(Selection::New { stars, .. }) => Some(*stars),
            Some(Selection::Existing { fields, .. }) => Some(fields.stars),
            None => None,
        }
    }

    /// Set an absolute rating, clamped to the active bound.
    pub fn set_stars(&mut self, stars: u32) -> bool {
        let clamped = clamp_stars(stars, self.max_stars);
        self.write_stars(clamped)
    }

    /// Raise the rating by one. A press at the maximum is a no-op and
    /// returns false, so callers skip the save.
    pub fn increment(&mut self) -> bool {
        match self.stars() {
            Some(stars) if stars < self.max_stars => self.write_stars(stars + 1),
            _ => false,
        }
    }

    /// Lower the rating by one; a press at zero is a no-op.
    pub fn decrement(&mut self) -> bool {
        match self.stars() {
            Some(stars) if stars > 0 => self.write_stars(stars - 1),
            _ => false,
        }
    }

    /// Begin a save of the current selection. Returns `None` when nothing
    /// is selected or a save is already in flight.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        if self.save == SaveState::Saving {
            return None;
        }
        let request = match self.selection.as_ref()? {
            Selection::New {
                first_name,
                last_name,
                stars,
            } => SaveRequest {
                record_id: None,
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                stars: *stars,
            },
            Selection::Existing { id, fields } => SaveRequest {
                record_id: Some(id.clone()),
                first_name: fields.first_name.clone(),
                last_name: fields.last_name.clone(),
                stars: fields.stars,
            },
        };
        self.save = SaveState::Saving;
        Some(request)
    }

    /// Record a successful save. A create adopts the datastore-assigned
    /// identifier so subsequent edits target update, not create.
    pub fn save_succeeded(&mut self, record: PersonRecord) {
        self.stars_before_save = record.fields.stars;
        self.baseline_known = true;
        self.selection = Some(Selection::Existing {
            id: record.id,
            fields: record.fields,
        });
        self.save = SaveState::Saved;
    }

    /// Record a failed save. Depending on policy the locally edited rating
    /// is either kept for a retry or reverted to the pre-save value.
    pub fn save_failed(&mut self) {
        if self.revert_on_failure {
            let before = self.stars_before_save;
            self.write_raw_stars(before);
        }
        self.save = SaveState::Failed;
    }

    fn write_stars(&mut self, stars: u32) -> bool {
        // Without a known baseline there is no no-op short circuit
        if self.baseline_known && self.stars() == Some(stars) {
            return false;
        }
        self.write_raw_stars(stars)
    }

    fn write_raw_stars(&mut self, stars: u32) -> bool {
        match self.selection.as_mut() {
            Some(Selection::New { stars: s, .. }) => {
                *s = stars;
                true
            }
            Some(Selection::Existing { fields, .. }) => {
                fields.stars = stars;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, first: &str, last: &str, stars: u32) -> PersonRecord {
        PersonRecord {
            id: id.to_string(),
            fields: PersonFields {
                short_id: None,
                first_name: first.to_string(),
                last_name: last.to_string(),
                stars,
                log: None,
            },
        }
    }

    #[test]
    fn test_blank_query_clears_without_request() {
        let mut session = Session::new(5, false);
        assert!(session.begin_search("   ").is_none());
        assert_eq!(*session.view(), SearchView::Idle);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = Session::new(5, false);
        let first = session.begin_search("an").unwrap();
        let second = session.begin_search("anna").unwrap();
        assert!(second > first);

        // Response for the superseded request arrives late
        assert!(!session.apply_results(first, vec![record("rec1", "Andreas", "Alt", 2)]));
        assert_eq!(*session.view(), SearchView::Loading(second));

        // Latest response is applied
        assert!(session.apply_results(second, vec![record("rec2", "Anna", "Muster", 3)]));
        assert!(matches!(session.view(), SearchView::Results(r) if r.len() == 1));
    }

    #[test]
    fn test_empty_response_offers_create() {
        let mut session = Session::new(5, false);
        let seq = session.begin_search("Anna Muster").unwrap();
        assert!(session.apply_results(seq, vec![]));
        assert_eq!(*session.view(), SearchView::NoMatch);
    }

    #[test]
    fn test_select_loads_rating() {
        let mut session = Session::new(5, false);
        let seq = session.begin_search("anna").unwrap();
        session.apply_results(seq, vec![record("rec1", "Anna", "Muster", 4)]);
        assert!(session.select(0));
        assert_eq!(session.stars(), Some(4));
        assert!(matches!(
            session.selection(),
            Some(Selection::Existing { id, .. }) if id == "rec1"
        ));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut session = Session::new(5, false);
        let seq = session.begin_search("anna").unwrap();
        session.apply_results(seq, vec![record("rec1", "Anna", "Muster", 4)]);
        assert!(!session.select(3));
    }

    #[test]
    fn test_start_new_splits_query() {
        let mut session = Session::new(5, false);
        session.start_new("  Anna Maria  Muster ");
        assert!(matches!(
            session.selection(),
            Some(Selection::New { first_name, last_name, stars: 0 })
                if first_name == "Anna" && last_name == "Maria Muster"
        ));
    }

    #[test]
    fn test_increment_clamps_at_max() {
        let mut session = Session::new(5, false);
        session.start_new("Anna Muster");
        session.set_stars(5);
        assert!(!session.increment());
        assert_eq!(session.stars(), Some(5));
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut session = Session::new(5, false);
        session.start_new("Anna Muster");
        assert!(!session.decrement());
        assert_eq!(session.stars(), Some(0));
    }

    #[test]
    fn test_set_stars_clamps_to_bound() {
        let mut session = Session::new(5, false);
        session.start_new("Anna Muster");
        session.set_stars(99);
        assert_eq!(session.stars(), Some(5));

        let mut wide = Session::new(20, false);
        wide.start_new("Anna Muster");
        wide.set_stars(99);
        assert_eq!(wide.stars(), Some(20));
    }

    #[test]
    fn test_save_after_create_targets_update() {
        let mut session = Session::new(5, false);
        session.start_new("Anna Muster");

        let request = session.begin_save().unwrap();
        assert!(request.record_id.is_none());
        assert_eq!(request.first_name, "Anna");
        assert_eq!(request.last_name, "Muster");
        assert_eq!(request.stars, 0);

        // Facade responds with the created record; the id is adopted
        session.save_succeeded(record("recNEW", "Anna", "Muster", 0));
        assert_eq!(session.save_state(), SaveState::Saved);

        assert!(session.increment());
        let request = session.begin_save().unwrap();
        assert_eq!(request.record_id.as_deref(), Some("recNEW"));
        assert_eq!(request.stars, 1);
    }

    #[test]
    fn test_no_double_save_while_in_flight() {
        let mut session = Session::new(5, false);
        session.start_new("Anna Muster");
        assert!(session.begin_save().is_some());
        assert!(session.begin_save().is_none());
    }

    #[test]
    fn test_failed_save_keeps_local_rating_by_default() {
        let mut session = Session::new(5, false);
        session.start_new("Anna Muster");
        session.set_stars(3);
        session.begin_save().unwrap();
        session.save_failed();
        assert_eq!(session.save_state(), SaveState::Failed);
        assert_eq!(session.stars(), Some(3));
    }

    #[test]
    fn test_unrated_selection_saves_absolute_zero() {
        // The stored rating is unknown, so even "set to 0" is a real write
        let mut session = Session::new(5, false);
        session.select_unrated("rec123".to_string());

        assert!(session.set_stars(0));
        let request = session.begin_save().unwrap();
        assert_eq!(request.record_id.as_deref(), Some("rec123"));
        assert_eq!(request.stars, 0);
    }

    #[test]
    fn test_known_baseline_keeps_noop_short_circuit() {
        let mut session = Session::new(5, false);
        session.select_record(record("rec1", "Anna", "Muster", 2));
        assert!(!session.set_stars(2));
    }

    #[test]
    fn test_failed_save_reverts_under_policy() {
        let mut session = Session::new(5, true);
        let seq = session.begin_search("anna").unwrap();
        session.apply_results(seq, vec![record("rec1", "Anna", "Muster", 2)]);
        session.select(0);

        session.set_stars(4);
        session.begin_save().unwrap();
        session.save_failed();
        assert_eq!(session.stars(), Some(2));
    }

    #[test]
    fn test_failed_save_reverts_past_intermediate_edits() {
        // Two edits before the save; the revert goes back to the loaded
        // rating, not to the intermediate never-persisted value
        let mut session = Session::new(5, true);
        session.select_record(record("rec1", "Anna", "Muster", 2));

        session.set_stars(3);
        session.set_stars(4);
        session.begin_save().unwrap();
        session.save_failed();
        assert_eq!(session.stars(), Some(2));
    }

    #[test]
    fn test_revert_baseline_advances_on_successful_save() {
        let mut session = Session::new(5, true);
        session.select_record(record("rec1", "Anna", "Muster", 2));

        session.set_stars(4);
        session.begin_save().unwrap();
        session.save_succeeded(record("rec1", "Anna", "Muster", 4));

        session.set_stars(5);
        session.begin_save().unwrap();
        session.save_failed();
        assert_eq!(session.stars(), Some(4));
    }

    #[test]
    fn test_edits_without_selection_are_noops() {
        let mut session = Session::new(5, false);
        assert!(session.stars().is_none());
        assert!(!session.set_stars(3));
        assert!(!session.increment());
        assert!(session.begin_save().is_none());
    }
}
