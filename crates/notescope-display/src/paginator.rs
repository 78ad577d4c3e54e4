//! Filtered note search partitioned into fixed-size pages.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, trace};

use notescope_core::{Note, NoteSearchRequest, NoteSearchService, Result, SelectionSnapshot};

/// Ordered search results split into pages.
///
/// Every page except possibly the last holds exactly `page_size` notes, and
/// concatenating the pages yields the search results in their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedResults {
    pages: Vec<Vec<Note>>,
    page_size: usize,
}

impl PagedResults {
    /// No pages. What the rendering layer sees before a search completes or
    /// after one fails.
    pub fn empty(page_size: usize) -> Self {
        Self {
            pages: Vec::new(),
            page_size: page_size.max(1),
        }
    }

    /// Partition `notes` into consecutive chunks of `page_size`.
    /// A zero page size is treated as 1.
    pub fn from_notes(notes: Vec<Note>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let mut pages = Vec::with_capacity(notes.len().div_ceil(page_size));
        let mut remaining = notes.into_iter().peekable();
        while remaining.peek().is_some() {
            pages.push(remaining.by_ref().take(page_size).collect());
        }
        Self { pages, page_size }
    }

    /// Notes on page `n` (zero-based). Empty when `n` is out of range.
    pub fn page(&self, n: usize) -> Vec<Note> {
        self.pages.get(n).cloned().unwrap_or_default()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_notes(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Vec<Note>] {
        &self.pages
    }
}

impl Default for PagedResults {
    fn default() -> Self {
        Self::empty(notescope_core::defaults::NOTES_PER_PAGE)
    }
}

/// Runs one search per call against the note search service and pages the
/// result.
pub struct SearchPaginator {
    search: Arc<dyn NoteSearchService>,
    notes_per_page: usize,
}

impl SearchPaginator {
    pub fn new(search: Arc<dyn NoteSearchService>, notes_per_page: usize) -> Self {
        Self {
            search,
            notes_per_page: notes_per_page.max(1),
        }
    }

    pub fn notes_per_page(&self) -> usize {
        self.notes_per_page
    }

    /// Build the search request for a selection snapshot.
    pub fn request_for(&self, snapshot: &SelectionSnapshot) -> NoteSearchRequest {
        NoteSearchRequest::from_snapshot(snapshot, self.notes_per_page)
    }

    /// Execute the search. Failures are returned unchanged so the caller can
    /// surface the collaborator's message.
    #[instrument(
        skip(self, request),
        fields(
            component = "paginator",
            workspace_id = %request.workspace_id,
            note_type = %request.note_type,
            query = %request.search_query,
        )
    )]
    pub async fn search(&self, request: &NoteSearchRequest) -> Result<PagedResults> {
        let start = Instant::now();
        let notes = self.search.find(request).await?;
        let result_count = notes.len();
        let results = PagedResults::from_notes(notes, self.notes_per_page);

        debug!(
            result_count,
            page_count = results.page_count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        for (n, page) in results.pages().iter().enumerate() {
            trace!(page = n, result_count = page.len(), "Page");
        }
        Ok(results)
    }
}
