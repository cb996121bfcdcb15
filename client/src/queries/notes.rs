//! Catalogue browsing with local pagination and filters, plus the seller's
//! note CRUD.

use shared::{CreateNoteRequest, Note, NoteFilters, NoteSort, Paginated, UpdateNoteRequest};

use super::pager::Pager;
use super::{keys, QueryContext};
use crate::cache::QueryKey;
use crate::core::Result;

pub const NOTES_PAGE_SIZE: u32 = 12;

pub struct NotesQueries {
    ctx: QueryContext,
    pager: Pager,
    filters: NoteFilters,
}

impl NotesQueries {
    pub(crate) fn new(ctx: QueryContext) -> Self {
        Self {
            ctx,
            pager: Pager::new(NOTES_PAGE_SIZE),
            filters: NoteFilters::default(),
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn filters(&self) -> &NoteFilters {
        &self.filters
    }

    /// Replace the filters; the list starts over at page 1.
    pub fn set_filters(&mut self, filters: NoteFilters) {
        if filters != self.filters {
            self.filters = filters;
            self.pager.reset();
        }
    }

    pub fn set_search(&mut self, search: Option<String>) {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.set_filters(NoteFilters {
            search,
            ..self.filters.clone()
        });
    }

    pub fn set_sort(&mut self, sort: NoteSort) {
        self.set_filters(NoteFilters {
            sort,
            ..self.filters.clone()
        });
    }

    pub fn clear_filters(&mut self) {
        self.set_filters(NoteFilters::default());
    }

    pub fn next_page(&mut self, total_pages: u32) -> bool {
        self.pager.next_page(total_pages)
    }

    pub fn prev_page(&mut self) -> bool {
        self.pager.prev_page()
    }

    pub fn set_page(&mut self, page: u32) {
        self.pager.set_page(page);
    }

    /// Current page of the public catalogue.
    pub async fn list(&self) -> Result<Paginated<Note>> {
        let page = self.pager.query();
        let filters = &self.filters;
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::notes_list(page, filters), || api.list_notes(page, filters))
            .await
    }

    pub async fn detail(&self, id: &str) -> Result<Note> {
        let api = &self.ctx.api;
        self.ctx.cache.fetch(keys::note(id), || api.get_note(id)).await
    }

    /// The seller's own notes, on the handle's current page.
    pub async fn mine(&self) -> Result<Paginated<Note>> {
        let page = self.pager.query();
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::my_notes(page), || api.my_notes(page))
            .await
    }

    /// Notes the user has bought, on the handle's current page.
    pub async fn purchased(&self) -> Result<Paginated<Note>> {
        let page = self.pager.query();
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::purchased_notes(page), || api.purchased_notes(page))
            .await
    }

    pub async fn create(&self, request: CreateNoteRequest) -> Result<Note> {
        self.ctx
            .cache
            .mutate(
                "create_note",
                &[keys::notes(), keys::dashboard()],
                self.ctx.api.create_note(request),
            )
            .await
    }

    pub async fn update(&self, id: &str, request: UpdateNoteRequest) -> Result<Note> {
        self.ctx
            .cache
            .mutate("update_note", &Self::stale_after_write(id), self.ctx.api.update_note(id, request))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.ctx
            .cache
            .mutate("delete_note", &Self::stale_after_write(id), self.ctx.api.delete_note(id))
            .await
    }

    fn stale_after_write(id: &str) -> [QueryKey; 3] {
        [keys::notes(), keys::note(id), keys::dashboard()]
    }
}
