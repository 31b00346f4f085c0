use crate::model::{AppState, Lecture, LectureStatus, Subject, FALLBACK_MAX_ABSENCES};
use anyhow::Context;
use serde_json::Value;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const STATE_FILE_NAME: &str = "uniAttendState_v1.json";

/// Where the single state blob lives.
pub trait StateStore {
    /// Never fails: missing or unreadable state yields `AppState::default()`.
    fn load(&self) -> AppState;
    fn save(&mut self, state: &AppState) -> anyhow::Result<()>;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn in_workspace(workspace: &Path) -> Self {
        Self {
            path: workspace.join(STATE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn load(&self) -> AppState {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => parse_state(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved state; starting fresh");
                AppState::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read saved state");
                AppState::default()
            }
        }
    }

    fn save(&mut self, state: &AppState) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
        let text = serde_json::to_string(state).context("failed to serialize state")?;

        let tmp = self.path.with_extension("json.saving");
        {
            let mut f = std::fs::File::create(&tmp)
                .with_context(|| format!("failed to create {}", tmp.to_string_lossy()))?;
            f.write_all(text.as_bytes())
                .with_context(|| format!("failed to write {}", tmp.to_string_lossy()))?;
            f.flush().context("failed to flush state file")?;
        }
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!("failed to move state into {}", self.path.to_string_lossy())
        })?;
        Ok(())
    }
}

/// Decode a stored blob. Malformed JSON degrades to the default state.
pub fn parse_state(text: &str) -> AppState {
    match serde_json::from_str::<Value>(text) {
        Ok(raw) => normalize_state(&raw),
        Err(e) => {
            warn!(error = %e, "saved state is not valid JSON; starting fresh");
            AppState::default()
        }
    }
}

/// Field-by-field default fill. Idempotent: normalizing a saved normalized
/// state yields the same state.
pub fn normalize_state(raw: &Value) -> AppState {
    let Some(obj) = raw.as_object() else {
        return AppState::default();
    };

    let default_max_absences = non_negative(obj.get("defaultMaxAbsences"))
        .or_else(|| non_negative(obj.get("maxAbsences")))
        .unwrap_or(FALLBACK_MAX_ABSENCES);

    let mut seen_ids: HashSet<String> = HashSet::new();
    let subjects: Vec<Subject> = obj
        .get("subjects")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| normalize_subject(item, default_max_absences))
                .filter(|s| seen_ids.insert(s.id.clone()))
                .collect()
        })
        .unwrap_or_default();

    AppState {
        default_max_absences,
        subjects,
    }
}

fn normalize_subject(raw: &Value, default_max_absences: u32) -> Option<Subject> {
    let obj = raw.as_object()?;
    let id = id_string(obj.get("id"))?;
    let name = obj.get("name").and_then(|v| v.as_str())?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let code = text(obj.get("code"));
    let max_absences = non_negative(obj.get("maxAbsences")).unwrap_or(default_max_absences);

    let mut dates: HashSet<String> = HashSet::new();
    let lectures: Vec<Lecture> = obj
        .get("lectures")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(normalize_lecture)
                .filter(|l| dates.insert(l.date.clone()))
                .collect()
        })
        .unwrap_or_default();

    Some(Subject {
        id,
        name,
        code,
        max_absences: Some(max_absences),
        lectures,
    })
}

fn normalize_lecture(raw: &Value) -> Option<Lecture> {
    let obj = raw.as_object()?;
    let id = id_string(obj.get("id"))?;
    let date = obj.get("date").and_then(|v| v.as_str())?.trim().to_string();
    if date.is_empty() {
        return None;
    }
    let status = obj
        .get("status")
        .and_then(|v| v.as_str())
        .and_then(LectureStatus::parse)
        .unwrap_or_default();
    Some(Lecture {
        id,
        date,
        topic: text(obj.get("topic")),
        status,
    })
}

fn non_negative(v: Option<&Value>) -> Option<u32> {
    v.and_then(|v| v.as_u64()).and_then(|n| u32::try_from(n).ok())
}

fn id_string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(v: Option<&Value>) -> String {
    v.and_then(|v| v.as_str()).unwrap_or("").to_string()
}

#[cfg(test)]
pub struct MemoryStore {
    pub blob: Option<String>,
    pub saves: usize,
    pub fail_saves: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self {
            blob: None,
            saves: 0,
            fail_saves: false,
        }
    }

    pub fn with_blob(blob: &str) -> Self {
        Self {
            blob: Some(blob.to_string()),
            ..Self::new()
        }
    }
}

#[cfg(test)]
impl StateStore for MemoryStore {
    fn load(&self) -> AppState {
        self.blob.as_deref().map(parse_state).unwrap_or_default()
    }

    fn save(&mut self, state: &AppState) -> anyhow::Result<()> {
        if self.fail_saves {
            anyhow::bail!("storage quota exceeded");
        }
        self.blob = Some(serde_json::to_string(state)?);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_or_garbage_blob_is_default() {
        assert_eq!(MemoryStore::new().load(), AppState::default());
        assert_eq!(parse_state("{not json"), AppState::default());
        assert_eq!(parse_state("[1,2]"), AppState::default());
        assert_eq!(AppState::default().default_max_absences, 3);
    }

    #[test]
    fn legacy_blob_normalizes() {
        let st = parse_state(r#"{"maxAbsences":5,"subjects":[{"id":"a","name":"Algo"}]}"#);
        assert_eq!(st.default_max_absences, 5);
        assert_eq!(st.subjects.len(), 1);
        assert_eq!(st.subjects[0].id, "a");
        assert_eq!(st.subjects[0].max_absences, Some(5));
        assert!(st.subjects[0].lectures.is_empty());
    }

    #[test]
    fn default_field_wins_over_legacy_field() {
        let st = normalize_state(&json!({ "defaultMaxAbsences": 2, "maxAbsences": 7 }));
        assert_eq!(st.default_max_absences, 2);
        assert!(st.subjects.is_empty());
    }

    #[test]
    fn malformed_fields_degrade_per_field() {
        let st = normalize_state(&json!({
            "defaultMaxAbsences": -1,
            "subjects": [
                "junk",
                { "id": "x", "name": "   " },
                { "id": "s1", "name": " Physics ", "maxAbsences": "four", "lectures": "nope" },
                { "id": "s2", "name": "Chem", "lectures": [
                    { "id": "l1", "date": "2024-01-01", "status": "late" },
                    { "id": "l2", "date": "2024-01-01", "status": "absent" },
                    { "id": "l3" },
                    { "id": "l4", "date": "2024-01-02", "topic": 5, "status": "absent" }
                ]},
                { "id": "s2", "name": "Dup" }
            ]
        }));
        assert_eq!(st.default_max_absences, 3);
        assert_eq!(st.subjects.len(), 2);
        let physics = &st.subjects[0];
        assert_eq!(physics.name, "Physics");
        assert_eq!(physics.max_absences, Some(3));
        assert!(physics.lectures.is_empty());
        let chem = &st.subjects[1];
        let ids: Vec<&str> = chem.lectures.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "l4"]);
        assert_eq!(chem.lectures[0].status, LectureStatus::Pending);
        assert_eq!(chem.lectures[1].status, LectureStatus::Absent);
        assert_eq!(chem.lectures[1].topic, "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = parse_state(
            r#"{"maxAbsences":4,"subjects":[{"id":"a","name":"Algo","lectures":[{"id":"l","date":"2024-03-01","status":"present"}]}]}"#,
        );
        let text = serde_json::to_string(&once).expect("serialize");
        let twice = parse_state(&text);
        assert_eq!(once, twice);
        let raw: Value = serde_json::from_str(&text).expect("reparse");
        assert_eq!(raw["defaultMaxAbsences"], json!(4));
        assert_eq!(raw["subjects"][0]["maxAbsences"], json!(4));
    }

    #[test]
    fn file_store_round_trips_through_workspace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::in_workspace(dir.path());
        assert_eq!(store.load(), AppState::default());

        let mut st = AppState::default();
        st.subjects.push(Subject::new("Algo", "CS1", 3));
        store.save(&st).expect("save");
        assert!(store.path().is_file());
        assert_eq!(store.load(), st);
    }
}
