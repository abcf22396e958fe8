// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Proof that the user accepted a delete prompt. Only
/// [`DeleteConfirmation::accept`] can build one.
#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmedDelete<Id> {
    id: Id,
}

impl<Id: Copy> ConfirmedDelete<Id> {
    pub fn id(&self) -> Id {
        self.id
    }
}

/// The delete prompt for one list. At most one record is pending at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation<Id> {
    pending: Option<Id>,
}

impl<Id> Default for DeleteConfirmation<Id> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<Id: Copy + PartialEq> DeleteConfirmation<Id> {
    pub fn open(&mut self, id: Id) {
        self.pending = Some(id);
    }

    pub fn pending(&self) -> Option<Id> {
        self.pending
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Closes the prompt and hands out the token for the pending record.
    pub fn accept(&mut self) -> Option<ConfirmedDelete<Id>> {
        self.pending.take().map(|id| ConfirmedDelete { id })
    }
}
