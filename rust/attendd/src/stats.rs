use crate::model::{Lecture, LectureStatus, Subject};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub total: usize,
    pub attended: usize,
    pub absent: usize,
    pub pending: usize,
    pub percentage: u32,
    pub max_absences: u32,
    pub remaining_allowance: u32,
    /// No further absence may be marked.
    pub at_limit: bool,
    /// More absences recorded than the cap allows (cap lowered after the fact).
    pub over_limit: bool,
}

/// Round-half-up integer percentage: `Int(100 * part / whole + 0.5)`.
pub fn round_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u64;
    let whole = whole as u64;
    ((200 * part + whole) / (2 * whole)) as u32
}

pub fn compute_stats(subject: Option<&Subject>, default_max_absences: u32) -> DerivedStats {
    let Some(subject) = subject else {
        return DerivedStats {
            total: 0,
            attended: 0,
            absent: 0,
            pending: 0,
            percentage: 0,
            max_absences: default_max_absences,
            remaining_allowance: default_max_absences,
            at_limit: default_max_absences == 0,
            over_limit: false,
        };
    };

    let mut attended: usize = 0;
    let mut absent: usize = 0;
    let mut pending: usize = 0;
    for l in &subject.lectures {
        match l.status {
            LectureStatus::Present => attended += 1,
            LectureStatus::Absent => absent += 1,
            LectureStatus::Pending => pending += 1,
        }
    }
    let total = subject.lectures.len();
    let max_absences = subject.effective_cap(default_max_absences);
    let absent_u32 = u32::try_from(absent).unwrap_or(u32::MAX);

    DerivedStats {
        total,
        attended,
        absent,
        pending,
        percentage: round_percent(attended, total),
        max_absences,
        remaining_allowance: max_absences.saturating_sub(absent_u32),
        at_limit: absent_u32 >= max_absences,
        over_limit: absent_u32 > max_absences,
    }
}

/// Newest date first. Unparseable dates sort last; ties keep insertion order.
pub fn sorted_lectures(subject: &Subject) -> Vec<&Lecture> {
    let mut out: Vec<&Lecture> = subject.lectures.iter().collect();
    out.sort_by(|a, b| {
        let da = NaiveDate::parse_from_str(&a.date, "%Y-%m-%d").ok();
        let db = NaiveDate::parse_from_str(&b.date, "%Y-%m-%d").ok();
        db.cmp(&da)
    });
    out
}
