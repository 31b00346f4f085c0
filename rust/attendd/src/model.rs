use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Absence cap used when nothing else is known.
pub const FALLBACK_MAX_ABSENCES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LectureStatus {
    #[default]
    Pending,
    Present,
    Absent,
}

impl LectureStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pending" => Some(Self::Pending),
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: String,
    /// ISO `YYYY-MM-DD`; unique within the owning subject.
    pub date: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub status: LectureStatus,
}

impl Lecture {
    pub fn new(date: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date: date.into(),
            topic: topic.into(),
            status: LectureStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_absences: Option<u32>,
    #[serde(default)]
    pub lectures: Vec<Lecture>,
}

impl Subject {
    pub fn new(name: impl Into<String>, code: impl Into<String>, max_absences: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            code: code.into(),
            max_absences: Some(max_absences),
            lectures: Vec::new(),
        }
    }

    /// The subject's own cap, else the global default.
    pub fn effective_cap(&self, default_max_absences: u32) -> u32 {
        self.max_absences.unwrap_or(default_max_absences)
    }

    pub fn has_lecture_on(&self, date: &str) -> bool {
        self.lectures.iter().any(|l| l.date == date)
    }

    pub fn absent_count(&self) -> usize {
        self.lectures
            .iter()
            .filter(|l| l.status == LectureStatus::Absent)
            .count()
    }

    pub fn lecture(&self, lecture_id: &str) -> Option<&Lecture> {
        self.lectures.iter().find(|l| l.id == lecture_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub default_max_absences: u32,
    pub subjects: Vec<Subject>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            default_max_absences: FALLBACK_MAX_ABSENCES,
            subjects: Vec::new(),
        }
    }
}

impl AppState {
    pub fn subject(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == subject_id)
    }

    pub fn subject_mut(&mut self, subject_id: &str) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|s| s.id == subject_id)
    }
}
