// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};

use crate::resource::{Resource, ResourceBackend};

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;
pub const ROWS_PER_PAGE_CHOICES: [usize; 3] = [10, 20, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// First load or filter change: jump back to page 1.
    Reset,
    /// Refresh after a mutation: stay on the current page, clamped.
    Preserve,
}

/// Issued by [`ListController::begin_load`]; only the newest ticket may apply.
#[derive(Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    Failed(String),
    /// A newer load was issued after this one; the result was dropped.
    Stale,
    /// The list was torn down before the result arrived.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingLoad {
    sequence: u64,
    mode: LoadMode,
}

#[derive(Debug, Clone)]
pub struct ListController<R: Resource> {
    items: Vec<R>,
    filter: String,
    current_page: usize,
    rows_per_page: usize,
    issued: u64,
    pending: Option<PendingLoad>,
    mounted: bool,
    error: Option<String>,
}

impl<R: Resource> Default for ListController<R> {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl<R: Resource> ListController<R> {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            items: Vec::new(),
            filter: String::new(),
            current_page: 1,
            rows_per_page: if rows_per_page == 0 {
                DEFAULT_ROWS_PER_PAGE
            } else {
                rows_per_page
            },
            issued: 0,
            pending: None,
            mounted: true,
            error: None,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: R::Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Rows that pass the current filter, in collection order.
    pub fn rows(&self) -> Vec<&R> {
        let needle = self.filter.trim();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.matches(needle))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.row_count(), self.rows_per_page)
    }

    /// The slice of filtered rows shown on the current page.
    pub fn visible(&self) -> Vec<&R> {
        let start = (self.current_page - 1) * self.rows_per_page;
        self.rows()
            .into_iter()
            .skip(start)
            .take(self.rows_per_page)
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn set_page(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.total_pages());
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.current_page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> usize {
        self.set_page(self.current_page.saturating_sub(1))
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<()> {
        if rows_per_page == 0 {
            bail!("rows per page must be at least 1");
        }
        self.rows_per_page = rows_per_page;
        self.current_page = 1;
        Ok(())
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_owned();
        self.current_page = 1;
    }

    pub fn begin_load(&mut self, mode: LoadMode) -> LoadTicket {
        self.issued = self.issued.saturating_add(1);
        self.pending = Some(PendingLoad {
            sequence: self.issued,
            mode,
        });
        LoadTicket(self.issued)
    }

    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Vec<R>>) -> LoadOutcome {
        if !self.mounted {
            tracing::debug!(
                kind = R::KIND.noun(),
                sequence = ticket.0,
                "dropping load that finished after teardown"
            );
            return LoadOutcome::Detached;
        }

        let Some(pending) = self.pending.filter(|pending| pending.sequence == ticket.0) else {
            tracing::debug!(
                kind = R::KIND.noun(),
                sequence = ticket.0,
                latest = self.issued,
                "dropping stale load"
            );
            return LoadOutcome::Stale;
        };
        self.pending = None;

        match result {
            Ok(items) => {
                let count = items.len();
                self.items = items;
                self.error = None;
                match pending.mode {
                    LoadMode::Reset => self.current_page = 1,
                    LoadMode::Preserve => self.clamp_page(),
                }
                LoadOutcome::Applied { count }
            }
            Err(error) => {
                let message = format!("{error:#}");
                tracing::warn!(kind = R::KIND.noun(), error = %message, "load failed");
                self.error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    pub fn load<B>(&mut self, backend: &mut B, mode: LoadMode) -> LoadOutcome
    where
        B: ResourceBackend<R> + ?Sized,
    {
        let ticket = self.begin_load(mode);
        let result = backend.list();
        self.finish_load(ticket, result)
    }

    /// Like [`load`](Self::load), but a failed fetch comes back with its
    /// source error intact instead of flattened into the outcome.
    pub fn try_load<B>(&mut self, backend: &mut B, mode: LoadMode) -> Result<LoadOutcome>
    where
        B: ResourceBackend<R> + ?Sized,
    {
        let ticket = self.begin_load(mode);
        match backend.list() {
            Ok(items) => Ok(self.finish_load(ticket, Ok(items))),
            Err(error) => {
                self.finish_load(ticket, Err(anyhow!("{error:#}")));
                Err(error)
            }
        }
    }

    /// Stops all later load completions from touching this list.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.pending = None;
    }

    pub fn insert(&mut self, record: R) {
        self.items.push(record);
        self.clamp_page();
    }

    /// Swaps in `record` for the row with the same id, keeping server fields
    /// the incoming copy lacks.
    pub fn replace(&mut self, mut record: R) -> bool {
        let id = record.id();
        let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) else {
            return false;
        };
        record.keep_server_fields(slot);
        *slot = record;
        self.clamp_page();
        true
    }

    pub fn remove(&mut self, id: R::Id) -> Option<R> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        let removed = self.items.remove(index);
        self.clamp_page();
        Some(removed)
    }

    fn clamp_page(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }
}

pub fn total_pages(count: usize, rows_per_page: usize) -> usize {
    count.div_ceil(rows_per_page.max(1)).max(1)
}
