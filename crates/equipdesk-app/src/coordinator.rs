// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::confirm::ConfirmedDelete;
use crate::forms::{Draft, FormModal, FormMode};
use crate::list::{ListController, LoadMode, LoadOutcome};
use crate::notice::{Notice, Notices};
use crate::resource::{MutationReply, Resource, ResourceBackend};

/// How the list catches up after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reconcile {
    /// Re-fetch the whole collection, keeping the current page.
    #[default]
    Reload,
    /// Splice the returned record in place. Falls back to a reload when the
    /// server only acknowledged the write.
    Patch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Update,
    Delete,
}

impl Action {
    const fn past(self) -> &'static str {
        match self {
            Self::Add => "added",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MutationCoordinator {
    strategy: Reconcile,
    notices: Notices,
}

impl MutationCoordinator {
    pub fn new(strategy: Reconcile) -> Self {
        Self {
            strategy,
            notices: Notices::default(),
        }
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn create<R, B>(
        &mut self,
        backend: &mut B,
        list: &mut ListController<R>,
        input: &R::Input,
    ) -> Result<Option<R::Id>>
    where
        R: Resource,
        B: ResourceBackend<R> + ?Sized,
    {
        let reply = backend
            .create(input)
            .map_err(|error| self.failed::<R>(Action::Add, error))?;
        let id = match reply {
            MutationReply::Record(record) if self.strategy == Reconcile::Patch => {
                let id = record.id();
                list.insert(record);
                Some(id)
            }
            reply => {
                let id = reply.into_record().map(|record| record.id());
                self.reload(backend, list);
                id
            }
        };
        self.succeeded::<R>(Action::Add, id);
        Ok(id)
    }

    pub fn update<R, B>(
        &mut self,
        backend: &mut B,
        list: &mut ListController<R>,
        id: R::Id,
        input: &R::Input,
    ) -> Result<()>
    where
        R: Resource,
        B: ResourceBackend<R> + ?Sized,
    {
        let reply = backend
            .update(id, input)
            .map_err(|error| self.failed::<R>(Action::Update, error))?;
        let patched = match reply {
            MutationReply::Record(record) if self.strategy == Reconcile::Patch => {
                list.replace(record)
            }
            _ => false,
        };
        if !patched {
            self.reload(backend, list);
        }
        self.succeeded::<R>(Action::Update, Some(id));
        Ok(())
    }

    /// Deletes the confirmed record. A failure leaves it in the list.
    pub fn delete<R, B>(
        &mut self,
        backend: &mut B,
        list: &mut ListController<R>,
        confirmed: ConfirmedDelete<R::Id>,
    ) -> Result<()>
    where
        R: Resource,
        B: ResourceBackend<R> + ?Sized,
    {
        let id = confirmed.id();
        backend
            .delete(id)
            .map_err(|error| self.failed::<R>(Action::Delete, error))?;
        match self.strategy {
            Reconcile::Patch => {
                list.remove(id);
            }
            Reconcile::Reload => self.reload(backend, list),
        }
        self.succeeded::<R>(Action::Delete, Some(id));
        Ok(())
    }

    /// Submits the open form as an add or an edit. The form closes on
    /// success and reopens with its draft on any failure.
    pub fn submit<D, B>(
        &mut self,
        backend: &mut B,
        list: &mut ListController<D::Record>,
        form: &mut FormModal<D>,
    ) -> Result<()>
    where
        D: Draft,
        B: ResourceBackend<D::Record> + ?Sized,
    {
        let submission = match form.begin_submit() {
            Ok(submission) => submission,
            Err(error) => {
                self.notices.push(Notice::error(format!("{error:#}")));
                return Err(error);
            }
        };
        let result = match submission.mode {
            FormMode::Add => self
                .create(backend, list, &submission.input)
                .map(|_| ()),
            FormMode::Edit(id) => self.update(backend, list, id, &submission.input),
        };
        form.finish_submit(result.as_ref().map(|_| ()).map_err(|error| format!("{error:#}")));
        result
    }

    fn reload<R, B>(&mut self, backend: &mut B, list: &mut ListController<R>)
    where
        R: Resource,
        B: ResourceBackend<R> + ?Sized,
    {
        if let LoadOutcome::Failed(message) = list.load(backend, LoadMode::Preserve) {
            self.notices.push(Notice::error(format!(
                "saved, but refreshing the {} list failed: {message}",
                R::KIND.noun()
            )));
        }
    }

    fn succeeded<R: Resource>(&mut self, action: Action, id: Option<R::Id>) {
        let noun = R::KIND.noun();
        match id {
            Some(id) => tracing::info!(kind = noun, id = %id, action = action.verb(), "mutation applied"),
            None => tracing::info!(kind = noun, action = action.verb(), "mutation applied"),
        }
        self.notices
            .push(Notice::success(format!("{noun} {}", action.past())));
    }

    fn failed<R: Resource>(&mut self, action: Action, error: anyhow::Error) -> anyhow::Error {
        let noun = R::KIND.noun();
        let summary = format!("could not {} {noun}", action.verb());
        tracing::warn!(kind = noun, action = action.verb(), error = %format!("{error:#}"), "mutation failed");
        self.notices.push(Notice::error(format!("{summary}: {error:#}")));
        error.context(summary)
    }
}
