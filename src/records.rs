use crate::calc::{self, Derived, Grade};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    English,
    Urdu,
    Maths,
    Physics,
    Chemistry,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::English,
        Subject::Urdu,
        Subject::Maths,
        Subject::Physics,
        Subject::Chemistry,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Subject::English => "english",
            Subject::Urdu => "urdu",
            Subject::Maths => "maths",
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subject::English => "English",
            Subject::Urdu => "Urdu",
            Subject::Maths => "Maths",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Marks {
    pub english: i64,
    pub urdu: i64,
    pub maths: i64,
    pub physics: i64,
    pub chemistry: i64,
}

impl Marks {
    pub fn as_array(&self) -> [i64; 5] {
        [
            self.english,
            self.urdu,
            self.maths,
            self.physics,
            self.chemistry,
        ]
    }

    pub fn get(&self, subject: Subject) -> i64 {
        match subject {
            Subject::English => self.english,
            Subject::Urdu => self.urdu,
            Subject::Maths => self.maths,
            Subject::Physics => self.physics,
            Subject::Chemistry => self.chemistry,
        }
    }

    fn set(&mut self, subject: Subject, value: i64) {
        match subject {
            Subject::English => self.english = value,
            Subject::Urdu => self.urdu = value,
            Subject::Maths => self.maths = value,
            Subject::Physics => self.physics = value,
            Subject::Chemistry => self.chemistry = value,
        }
    }
}

/// A stored row. `total`, `percent`, `grade` and `remarks` are only ever
/// written together from the marks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    pub english: i64,
    pub urdu: i64,
    pub maths: i64,
    pub physics: i64,
    pub chemistry: i64,
    pub total: i64,
    pub percent: f64,
    pub grade: String,
    pub remarks: String,
}

impl StudentRecord {
    pub fn marks(&self) -> Marks {
        Marks {
            english: self.english,
            urdu: self.urdu,
            maths: self.maths,
            physics: self.physics,
            chemistry: self.chemistry,
        }
    }
}

/// Everything a write persists, derived fields included.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFields {
    pub name: String,
    pub marks: Marks,
    pub total: i64,
    pub percent: f64,
    pub grade: Grade,
    pub remarks: &'static str,
}

impl RecordFields {
    pub fn compute(name: String, marks: Marks) -> Self {
        let Derived {
            total,
            percent,
            grade,
            remarks,
        } = calc::derive(&marks.as_array());
        Self {
            name,
            marks,
            total,
            percent,
            grade,
            remarks,
        }
    }
}

pub const NAME_REQUIRED: &str = "Student name is required";
pub const MARKS_OUT_OF_RANGE: &str = "All marks must be between 0 and 100";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub name: Option<String>,
    pub marks: Vec<(Subject, String)>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.marks.is_empty()
    }

    /// One-line message for the API envelope; the name check is reported first.
    pub fn summary(&self) -> &'static str {
        if self.name.is_some() {
            NAME_REQUIRED
        } else {
            MARKS_OUT_OF_RANGE
        }
    }

    pub fn for_subject(&self, subject: Subject) -> Option<&str> {
        self.marks
            .iter()
            .find(|(s, _)| *s == subject)
            .map(|(_, m)| m.as_str())
    }

    pub fn messages(&self) -> Vec<String> {
        self.name
            .iter()
            .cloned()
            .chain(self.marks.iter().map(|(_, m)| m.clone()))
            .collect()
    }
}

/// Parses and validates a record payload (`name` plus the five subject
/// keys). Absent marks count as 0; present but non-numeric or out-of-range
/// marks are rejected. The name is sanitized before the emptiness check.
pub fn parse_record_input(
    params: &serde_json::Value,
) -> Result<RecordFields, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .map(calc::sanitize_name)
        .unwrap_or_default();
    if name.is_empty() {
        errors.name = Some(NAME_REQUIRED.to_string());
    }

    let mut marks = Marks::default();
    for subject in Subject::ALL {
        let value = match params.get(subject.key()) {
            None | Some(serde_json::Value::Null) => Some(0),
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => Some(0),
            Some(v) if calc::validate_mark(v) => calc::mark_value(v),
            Some(_) => None,
        };
        match value {
            Some(m) => marks.set(subject, m),
            None => errors.marks.push((
                subject,
                format!("{} marks must be between 0 and 100", subject.label()),
            )),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(RecordFields::compute(name, marks))
}

/// Positive integer id from a number or numeric string.
pub fn parse_id(v: Option<&serde_json::Value>) -> Option<i64> {
    let id = match v? {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (id > 0).then_some(id)
}
