use crate::gate::{Gate, GateError, UnlockFollowUp};
use crate::model::{AppState, Lecture, LectureStatus, Subject};
use crate::stats::{compute_stats, DerivedStats};
use crate::store::StateStore;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(String),
    #[error("admin mode required to {0}")]
    Permission(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("absence limit reached ({absent}/{cap})")]
    LimitExceeded { absent: usize, cap: u32 },
    #[error("confirmation required to {0}")]
    ConfirmationRequired(&'static str),
}

impl TrackerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Permission(_) => "permission_denied",
            Self::NotFound(_) => "not_found",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::ConfirmationRequired(_) => "confirmation_required",
        }
    }
}

/// Result of a mutation that reached the store (or tried to).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved<T> {
    pub value: T,
    /// `None` when the write went through, or when nothing needed writing.
    pub persist_error: Option<String>,
}

impl<T> Saved<T> {
    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// Parse a limit the way the limit editor submits it.
pub fn parse_limit(raw: &str) -> Result<u32, TrackerError> {
    let t = raw.trim();
    let invalid =
        || TrackerError::Validation("limit must be a whole number greater than or equal to 0".into());
    if t.is_empty() || !t.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    t.parse::<u32>().map_err(|_| invalid())
}

/// Owns the application state, the admin gate and the store. Every accepted
/// mutation is written through to the store before it returns.
pub struct Tracker<S: StateStore> {
    state: AppState,
    selected: Option<String>,
    gate: Gate,
    store: S,
}

impl<S: StateStore> Tracker<S> {
    pub fn open(store: S, gate: Gate) -> Self {
        let state = store.load();
        let selected = state.subjects.first().map(|s| s.id.clone());
        info!(
            subjects = state.subjects.len(),
            default_max_absences = state.default_max_absences,
            "state loaded"
        );
        Self {
            state,
            selected,
            gate,
            store,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn selected_subject_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn stats(&self, subject: Option<&Subject>) -> DerivedStats {
        compute_stats(subject, self.state.default_max_absences)
    }

    pub fn subject_stats(&self, subject_id: &str) -> Result<DerivedStats, TrackerError> {
        let subject = self
            .state
            .subject(subject_id)
            .ok_or(TrackerError::NotFound("subject"))?;
        Ok(self.stats(Some(subject)))
    }

    pub fn unlock(&mut self, passcode: &str) -> Result<UnlockFollowUp, GateError> {
        let res = self.gate.unlock(passcode);
        match &res {
            Ok(_) => info!("admin mode unlocked"),
            Err(e) => debug!(error = %e, "unlock rejected"),
        }
        res
    }

    pub fn lock(&mut self) {
        self.gate.lock();
        info!("admin mode locked");
    }

    pub fn select_subject(&mut self, subject_id: &str) -> Result<(), TrackerError> {
        if self.state.subject(subject_id).is_none() {
            return Err(TrackerError::NotFound("subject"));
        }
        self.selected = Some(subject_id.to_string());
        Ok(())
    }

    /// An empty name is reported as `Validation`; a form that only submits
    /// non-empty names can ignore that error and treat it as nothing to do.
    pub fn add_subject(&mut self, name: &str, code: &str) -> Result<Saved<String>, TrackerError> {
        self.require_admin("add subjects")?;
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::Validation("subject name must not be empty".into()));
        }
        let subject = Subject::new(name, code.trim(), self.state.default_max_absences);
        let id = subject.id.clone();
        self.state.subjects.push(subject);
        self.selected = Some(id.clone());
        info!(subject_id = %id, "subject added");
        Ok(self.persist(id))
    }

    /// Removes the subject and all of its lectures. Unknown ids are a no-op.
    pub fn delete_subject(
        &mut self,
        subject_id: &str,
        confirmed: bool,
    ) -> Result<Saved<bool>, TrackerError> {
        self.require_admin("delete subjects")?;
        if !confirmed {
            return Err(TrackerError::ConfirmationRequired("delete subject"));
        }
        let Some(idx) = self.state.subjects.iter().position(|s| s.id == subject_id) else {
            return Ok(Saved {
                value: false,
                persist_error: None,
            });
        };
        let removed = self.state.subjects.remove(idx);
        if self.selected.as_deref() == Some(subject_id) {
            self.selected = self.state.subjects.first().map(|s| s.id.clone());
        }
        info!(
            subject_id = %subject_id,
            lectures = removed.lectures.len(),
            "subject deleted"
        );
        Ok(self.persist(true))
    }

    pub fn add_lecture(
        &mut self,
        subject_id: &str,
        date: &str,
        topic: &str,
    ) -> Result<Saved<String>, TrackerError> {
        self.require_admin("add lectures")?;
        let date = date.trim();
        let subject = self
            .state
            .subject_mut(subject_id)
            .ok_or(TrackerError::NotFound("subject"))?;
        if date.is_empty() {
            return Err(TrackerError::Validation("lecture date is required".into()));
        }
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(TrackerError::Validation(format!(
                "lecture date must be YYYY-MM-DD: {date}"
            )));
        }
        if subject.has_lecture_on(date) {
            return Err(TrackerError::Validation(
                "a lecture for this date already exists".into(),
            ));
        }
        let lecture = Lecture::new(date, topic.trim());
        let id = lecture.id.clone();
        subject.lectures.push(lecture);
        info!(subject_id = %subject_id, lecture_id = %id, date = %date, "lecture added");
        Ok(self.persist(id))
    }

    pub fn delete_lecture(
        &mut self,
        subject_id: &str,
        lecture_id: &str,
        confirmed: bool,
    ) -> Result<Saved<bool>, TrackerError> {
        self.require_admin("delete lectures")?;
        if !confirmed {
            return Err(TrackerError::ConfirmationRequired("delete lecture"));
        }
        let Some(subject) = self.state.subject_mut(subject_id) else {
            return Ok(Saved {
                value: false,
                persist_error: None,
            });
        };
        let before = subject.lectures.len();
        subject.lectures.retain(|l| l.id != lecture_id);
        if subject.lectures.len() == before {
            return Ok(Saved {
                value: false,
                persist_error: None,
            });
        }
        info!(subject_id = %subject_id, lecture_id = %lecture_id, "lecture deleted");
        Ok(self.persist(true))
    }

    /// Marks attendance. Open to both modes. Returns whether anything changed;
    /// an unchanged status does not touch the store.
    pub fn set_lecture_status(
        &mut self,
        subject_id: &str,
        lecture_id: &str,
        status: LectureStatus,
    ) -> Result<Saved<bool>, TrackerError> {
        let default_cap = self.state.default_max_absences;
        let subject = self
            .state
            .subject_mut(subject_id)
            .ok_or(TrackerError::NotFound("subject"))?;
        let current = subject
            .lecture(lecture_id)
            .map(|l| l.status)
            .ok_or(TrackerError::NotFound("lecture"))?;
        if current == status {
            return Ok(Saved {
                value: false,
                persist_error: None,
            });
        }
        if status == LectureStatus::Absent {
            let absent = subject.absent_count();
            let cap = subject.effective_cap(default_cap);
            if absent >= cap as usize {
                debug!(subject_id = %subject_id, absent, cap, "absence rejected at limit");
                return Err(TrackerError::LimitExceeded { absent, cap });
            }
        }
        if let Some(l) = subject.lectures.iter_mut().find(|l| l.id == lecture_id) {
            l.status = status;
        }
        debug!(
            subject_id = %subject_id,
            lecture_id = %lecture_id,
            status = status.as_str(),
            "lecture status set"
        );
        Ok(self.persist(true))
    }

    /// Sets the subject's cap and, with it, the global default.
    pub fn set_absence_limit(
        &mut self,
        subject_id: &str,
        value: i64,
    ) -> Result<Saved<DerivedStats>, TrackerError> {
        self.require_admin("change absence limits")?;
        let value = limit_from_i64(value)?;
        let subject = self
            .state
            .subject_mut(subject_id)
            .ok_or(TrackerError::NotFound("subject"))?;
        subject.max_absences = Some(value);
        self.state.default_max_absences = value;
        info!(subject_id = %subject_id, value, "absence limit set");
        let stats = self.subject_stats(subject_id)?;
        Ok(self.persist(stats))
    }

    pub fn set_default_absence_limit(&mut self, value: i64) -> Result<Saved<u32>, TrackerError> {
        self.require_admin("change absence limits")?;
        let value = limit_from_i64(value)?;
        self.state.default_max_absences = value;
        info!(value, "default absence limit set");
        Ok(self.persist(value))
    }

    pub fn require_admin(&self, action: &'static str) -> Result<(), TrackerError> {
        if self.gate.is_unlocked() {
            Ok(())
        } else {
            Err(TrackerError::Permission(action))
        }
    }

    fn persist<T>(&mut self, value: T) -> Saved<T> {
        let persist_error = match self.store.save(&self.state) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "failed to persist state; keeping in-memory copy");
                Some(format!("{e:#}"))
            }
        };
        Saved {
            value,
            persist_error,
        }
    }
}

fn limit_from_i64(value: i64) -> Result<u32, TrackerError> {
    u32::try_from(value).map_err(|_| {
        TrackerError::Validation("limit must be a whole number greater than or equal to 0".into())
    })
}
