use serde::{Deserialize, Serialize};

pub const MARK_MIN: i64 = 0;
pub const MARK_MAX: i64 = 100;
pub const MAX_TOTAL: i64 = 500;
pub const PERCENT_PLACES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn parse(raw: &str) -> Option<Grade> {
        match raw.trim() {
            "A+" => Some(Grade::APlus),
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "F" => Some(Grade::F),
            _ => None,
        }
    }

    pub fn remarks(self) -> &'static str {
        match self {
            Grade::APlus => "Excellent",
            Grade::A => "Great",
            Grade::B => "Good",
            Grade::C => "Satisfactory",
            Grade::D => "Needs Improvement",
            Grade::F => DEFAULT_REMARKS,
        }
    }
}

const DEFAULT_REMARKS: &str = "Work Hard";

/// Lower bound of each band, highest first. The first band whose bound is
/// reached wins.
const GRADE_BANDS: [(f64, Grade); 5] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::B),
    (60.0, Grade::C),
    (50.0, Grade::D),
];

pub fn compute_total(scores: &[i64; 5]) -> i64 {
    scores.iter().sum()
}

/// Rounds half away from zero, which is what `f64::round` does at the
/// scaled position.
pub fn round_half_away(x: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (x * scale).round() / scale
}

pub fn compute_percent(total: i64, max_total: i64, places: u32) -> f64 {
    if max_total == 0 {
        return 0.0;
    }
    round_half_away((total as f64 / max_total as f64) * 100.0, places)
}

pub fn grade_for(percent: f64) -> Grade {
    GRADE_BANDS
        .iter()
        .find(|(floor, _)| percent >= *floor)
        .map(|(_, g)| *g)
        .unwrap_or(Grade::F)
}

/// Unknown grade text falls through to the default remark instead of failing.
pub fn remarks_for(grade: &str) -> &'static str {
    Grade::parse(grade)
        .map(Grade::remarks)
        .unwrap_or(DEFAULT_REMARKS)
}

/// Reads a mark from request input. Integers, integral floats and numeric
/// strings count as numeric; anything else does not.
pub fn mark_value(v: &serde_json::Value) -> Option<i64> {
    match v {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f.is_finite() {
                Some(f as i64)
            } else {
                None
            }
        }
        serde_json::Value::String(s) => {
            let t = s.trim();
            if let Ok(i) = t.parse::<i64>() {
                return Some(i);
            }
            match t.parse::<f64>() {
                Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
                _ => None,
            }
        }
        _ => None,
    }
}

pub fn validate_mark(v: &serde_json::Value) -> bool {
    mark_value(v)
        .map(|m| (MARK_MIN..=MARK_MAX).contains(&m))
        .unwrap_or(false)
}

/// Drops anything between `<` and the next `>`. An unterminated tag swallows
/// the rest of the input.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn sanitize_name(raw: &str) -> String {
    escape_markup(&strip_tags(raw.trim()))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub total: i64,
    pub percent: f64,
    pub grade: Grade,
    pub remarks: &'static str,
}

pub fn derive(scores: &[i64; 5]) -> Derived {
    let total = compute_total(scores);
    let percent = compute_percent(total, MAX_TOTAL, PERCENT_PLACES);
    let grade = grade_for(percent);
    Derived {
        total,
        percent,
        grade,
        remarks: grade.remarks(),
    }
}
