//! Faceted drill-down: possible values and time periods of a facet under a
//! set of applied filters and an optional full-text search.
//!
//! - [`filter`] - facet definitions and the operations callers use
//! - [`applied`] - selections made on other facets
//! - [`compose`] - tables, joins and conditions of the filtered row set
//! - [`granularity`] - time bucket selection for date facets
//! - [`aggregate`] - grouped value and time-period counts
//!
//! Every operation is a fresh read against the store; nothing is cached and
//! no state is kept between calls.

pub mod aggregate;
pub mod applied;
pub mod compose;
pub mod filter;
pub mod granularity;

pub use aggregate::{FacetCounts, NONE_KEY};
pub use applied::{AppliedFilter, FilterValue};
pub use compose::{compose, JoinCondition, QueryParts};
pub use filter::Filter;
pub use granularity::{select_granularity, DateParts, TimeGranularity};

use crate::search::{FullTextSearch, LikeSearch};

static DEFAULT_SEARCH: LikeSearch = LikeSearch::new();

/// The request a facet is evaluated in: applied filters plus an optional
/// full-text search.
#[derive(Clone, Copy)]
pub struct FacetContext<'a> {
    applied: &'a [AppliedFilter],
    search_term: Option<&'a str>,
    search: &'a dyn FullTextSearch,
}

impl<'a> FacetContext<'a> {
    /// Context over `applied` with no search term.
    ///
    /// Search uses an unprefixed [`LikeSearch`] (`_pageData`, `_fileData`).
    /// Filters built from [`Settings`](crate::config::Settings) with a
    /// `table_prefix` need [`Self::with_search_provider`] with
    /// `Settings::search_provider()` so the text tables carry the prefix too.
    pub fn new(applied: &'a [AppliedFilter]) -> Self {
        Self {
            applied,
            search_term: None,
            search: &DEFAULT_SEARCH,
        }
    }

    /// Narrow to rows matching `term`. A blank term is ignored.
    pub fn with_search_term(mut self, term: &'a str) -> Self {
        self.search_term = Some(term).filter(|t| !t.trim().is_empty());
        self
    }

    /// Use `provider` instead of the default [`LikeSearch`].
    pub fn with_search_provider(mut self, provider: &'a dyn FullTextSearch) -> Self {
        self.search = provider;
        self
    }

    pub fn applied(&self) -> &'a [AppliedFilter] {
        self.applied
    }

    pub fn search_term(&self) -> Option<&'a str> {
        self.search_term
    }

    pub fn search_provider(&self) -> &'a dyn FullTextSearch {
        self.search
    }
}

impl std::fmt::Debug for FacetContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacetContext")
            .field("applied", &self.applied)
            .field("search_term", &self.search_term)
            .finish_non_exhaustive()
    }
}
