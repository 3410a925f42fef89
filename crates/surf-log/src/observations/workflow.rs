//! Create/edit/delete lifecycle of a single user's session with the log.
//!
//! A [`WorkflowSession`] is an explicit value threaded through each step by
//! `&mut`. Creating a record walks four pages (session, swell, wind, tide);
//! moving forward checks the current page, moving back never does, and the
//! final submit re-validates the whole record. Editing and deleting work on
//! a stored record, with deletion behind an explicit confirmation step.
//! A storage failure leaves the session where it was so the draft survives.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{ObservationRecord, RecordId};
use super::ingest::{ingest, RawRecord};
use super::repository::{ObservationRepository, StoredObservation};
use super::service::{ObservationService, ServiceError};
use super::validation::{validate_page, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DraftPage {
    Session,
    Swell,
    Wind,
    Tide,
}

impl DraftPage {
    pub const ALL: [DraftPage; 4] = [
        DraftPage::Session,
        DraftPage::Swell,
        DraftPage::Wind,
        DraftPage::Tide,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|index| Self::ALL[index])
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Browsing,
    Drafting {
        page: DraftPage,
        draft: ObservationRecord,
    },
    Editing {
        id: RecordId,
        draft: ObservationRecord,
    },
    ConfirmingDelete {
        id: RecordId,
        draft: ObservationRecord,
    },
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Browsing => "browsing",
            WorkflowState::Drafting { .. } => "drafting",
            WorkflowState::Editing { .. } => "editing",
            WorkflowState::ConfirmingDelete { .. } => "confirming delete",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("page incomplete: {}", .0.messages().join("; "))]
    PageIncomplete(ValidationReport),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Clone)]
pub struct WorkflowSession {
    state: WorkflowState,
    last_saved: Option<RecordId>,
}

impl Default for WorkflowSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowSession {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Browsing,
            last_saved: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Id of the record most recently persisted through this session.
    pub fn last_saved(&self) -> Option<&RecordId> {
        self.last_saved.as_ref()
    }

    pub fn page(&self) -> Option<DraftPage> {
        match &self.state {
            WorkflowState::Drafting { page, .. } => Some(*page),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&ObservationRecord> {
        match &self.state {
            WorkflowState::Drafting { draft, .. }
            | WorkflowState::Editing { draft, .. }
            | WorkflowState::ConfirmingDelete { draft, .. } => Some(draft),
            WorkflowState::Browsing => None,
        }
    }

    /// The record being entered or edited, for field updates between steps.
    pub fn draft_mut(&mut self) -> Option<&mut ObservationRecord> {
        match &mut self.state {
            WorkflowState::Drafting { draft, .. } | WorkflowState::Editing { draft, .. } => {
                Some(draft)
            }
            _ => None,
        }
    }

    pub fn begin_draft(&mut self) -> Result<(), WorkflowError> {
        self.begin_draft_with(ObservationRecord::default())
    }

    /// Starts a new record on the first page, pre-filled with `draft`.
    pub fn begin_draft_with(&mut self, draft: ObservationRecord) -> Result<(), WorkflowError> {
        self.require_browsing("start a record")?;
        self.state = WorkflowState::Drafting {
            page: DraftPage::Session,
            draft,
        };
        Ok(())
    }

    /// Advances one page once the current page's fields are acceptable.
    pub fn next(&mut self) -> Result<DraftPage, WorkflowError> {
        let state = self.state.name();
        let WorkflowState::Drafting { page, draft } = &mut self.state else {
            return Err(WorkflowError::InvalidTransition {
                action: "move to the next page",
                state,
            });
        };
        let Some(following) = page.next() else {
            return Err(WorkflowError::InvalidTransition {
                action: "move past the last page",
                state,
            });
        };
        let report = validate_page(draft, *page);
        if !report.is_valid() {
            return Err(WorkflowError::PageIncomplete(report));
        }
        *page = following;
        debug!(page = ?following, "draft advanced");
        Ok(following)
    }

    /// Steps back one page; on the first page this is a no-op.
    pub fn previous(&mut self) -> Result<DraftPage, WorkflowError> {
        let state = self.state.name();
        let WorkflowState::Drafting { page, .. } = &mut self.state else {
            return Err(WorkflowError::InvalidTransition {
                action: "move to the previous page",
                state,
            });
        };
        *page = page.previous().unwrap_or(*page);
        Ok(*page)
    }

    /// Abandons any draft, edit, or pending deletion.
    pub fn cancel(&mut self) {
        self.state = WorkflowState::Browsing;
    }

    /// Validates and persists the draft from the last page.
    pub fn submit<R>(&mut self, service: &ObservationService<R>) -> Result<RecordId, WorkflowError>
    where
        R: ObservationRepository + 'static,
    {
        let draft = match &self.state {
            WorkflowState::Drafting { page, draft } if page.is_last() => draft.clone(),
            other => {
                return Err(WorkflowError::InvalidTransition {
                    action: "submit",
                    state: other.name(),
                })
            }
        };
        let stored = service.submit(draft)?;
        Ok(self.finish(stored))
    }

    /// Opens a stored record for editing.
    pub fn begin_edit(&mut self, stored: StoredObservation) -> Result<(), WorkflowError> {
        self.require_browsing("edit a record")?;
        self.state = WorkflowState::Editing {
            id: stored.id,
            draft: stored.record,
        };
        Ok(())
    }

    /// Opens a loosely typed row for editing, normalizing legacy values on the way in.
    pub fn begin_edit_raw(&mut self, id: RecordId, raw: &RawRecord) -> Result<(), WorkflowError> {
        self.begin_edit(StoredObservation {
            id,
            record: ingest(raw),
        })
    }

    pub fn save_edit<R>(&mut self, service: &ObservationService<R>) -> Result<RecordId, WorkflowError>
    where
        R: ObservationRepository + 'static,
    {
        let (id, draft) = match &self.state {
            WorkflowState::Editing { id, draft } => (id.clone(), draft.clone()),
            other => {
                return Err(WorkflowError::InvalidTransition {
                    action: "save changes",
                    state: other.name(),
                })
            }
        };
        let stored = service.update(&id, draft)?;
        Ok(self.finish(stored))
    }

    pub fn request_delete(&mut self) -> Result<(), WorkflowError> {
        match std::mem::replace(&mut self.state, WorkflowState::Browsing) {
            WorkflowState::Editing { id, draft } => {
                self.state = WorkflowState::ConfirmingDelete { id, draft };
                Ok(())
            }
            other => {
                let state = other.name();
                self.state = other;
                Err(WorkflowError::InvalidTransition {
                    action: "request deletion",
                    state,
                })
            }
        }
    }

    pub fn cancel_delete(&mut self) -> Result<(), WorkflowError> {
        match std::mem::replace(&mut self.state, WorkflowState::Browsing) {
            WorkflowState::ConfirmingDelete { id, draft } => {
                self.state = WorkflowState::Editing { id, draft };
                Ok(())
            }
            other => {
                let state = other.name();
                self.state = other;
                Err(WorkflowError::InvalidTransition {
                    action: "cancel deletion",
                    state,
                })
            }
        }
    }

    pub fn confirm_delete<R>(&mut self, service: &ObservationService<R>) -> Result<(), WorkflowError>
    where
        R: ObservationRepository + 'static,
    {
        let id = match &self.state {
            WorkflowState::ConfirmingDelete { id, .. } => id.clone(),
            other => {
                return Err(WorkflowError::InvalidTransition {
                    action: "confirm deletion",
                    state: other.name(),
                })
            }
        };
        service.delete(&id)?;
        self.state = WorkflowState::Browsing;
        if self.last_saved.as_ref() == Some(&id) {
            self.last_saved = None;
        }
        Ok(())
    }

    fn finish(&mut self, stored: StoredObservation) -> RecordId {
        self.state = WorkflowState::Browsing;
        self.last_saved = Some(stored.id.clone());
        stored.id
    }

    fn require_browsing(&self, action: &'static str) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Browsing => Ok(()),
            ref other => Err(WorkflowError::InvalidTransition {
                action,
                state: other.name(),
            }),
        }
    }
}
