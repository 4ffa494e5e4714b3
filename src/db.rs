use crate::calc;
use crate::records::{RecordFields, StudentRecord};
use anyhow::Context;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_FILE: &str = "records.sqlite3";

pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE)
}

/// Opens the database and brings the schema up to date. Run once at startup;
/// per-request handles come from [`connect`].
pub fn open_db(data_dir: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data dir {}", data_dir.to_string_lossy()))?;
    let conn = connect(&db_path(data_dir))?;
    ensure_schema(&conn)?;
    Ok(conn)
}

pub fn ensure_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS records(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            english INTEGER NOT NULL CHECK(english BETWEEN 0 AND 100),
            urdu INTEGER NOT NULL CHECK(urdu BETWEEN 0 AND 100),
            maths INTEGER NOT NULL CHECK(maths BETWEEN 0 AND 100),
            physics INTEGER NOT NULL CHECK(physics BETWEEN 0 AND 100),
            chemistry INTEGER NOT NULL CHECK(chemistry BETWEEN 0 AND 100),
            total INTEGER NOT NULL,
            percent REAL NOT NULL,
            grade TEXT NOT NULL,
            remarks TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create records table")?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_records_name ON records(name)",
        [],
    )?;
    Ok(())
}

pub fn connect(path: &Path) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database {}", path.to_string_lossy()))?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    Name,
    English,
    Urdu,
    Maths,
    Physics,
    Chemistry,
    Total,
    Percent,
    Grade,
    Remarks,
}

impl SortColumn {
    /// Accepts field names and the legacy upper-case column names, ignoring case.
    pub fn parse(raw: &str) -> Option<SortColumn> {
        let col = match raw.trim().to_ascii_lowercase().as_str() {
            "id" => SortColumn::Id,
            "name" => SortColumn::Name,
            "english" | "eng" => SortColumn::English,
            "urdu" => SortColumn::Urdu,
            "maths" => SortColumn::Maths,
            "physics" => SortColumn::Physics,
            "chemistry" => SortColumn::Chemistry,
            "total" => SortColumn::Total,
            "percent" => SortColumn::Percent,
            "grade" => SortColumn::Grade,
            "remarks" => SortColumn::Remarks,
            _ => return None,
        };
        Some(col)
    }

    /// Column identifier placed into query text. Only these literals ever
    /// reach the ORDER BY clause.
    pub fn column(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Name => "name",
            SortColumn::English => "english",
            SortColumn::Urdu => "urdu",
            SortColumn::Maths => "maths",
            SortColumn::Physics => "physics",
            SortColumn::Chemistry => "chemistry",
            SortColumn::Total => "total",
            SortColumn::Percent => "percent",
            SortColumn::Grade => "grade",
            SortColumn::Remarks => "remarks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<SortDirection> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn flip(self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Sort {
    /// Unknown column or direction each fall back to the default on their own.
    pub fn from_params(column: Option<&str>, direction: Option<&str>) -> Sort {
        Sort {
            column: column.and_then(SortColumn::parse).unwrap_or_default(),
            direction: direction.and_then(SortDirection::parse).unwrap_or_default(),
        }
    }

    fn order_by(self) -> String {
        match self.column {
            SortColumn::Id => format!("id {}", self.direction.keyword()),
            col => format!("{} {}, id ASC", col.column(), self.direction.keyword()),
        }
    }
}

/// Free-text term matched against name, grade and remarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pattern: String,
}

impl Filter {
    /// Returns `None` for a blank term. Names are stored escaped, so the term
    /// is escaped the same way before matching.
    pub fn new(term: &str) -> Option<Filter> {
        let t = term.trim();
        if t.is_empty() {
            return None;
        }
        let escaped = calc::escape_markup(t);
        let mut pattern = String::with_capacity(escaped.len() + 2);
        pattern.push('%');
        for ch in escaped.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        Some(Filter { pattern })
    }

    fn clause(filter: Option<&Filter>) -> (&'static str, Vec<Value>) {
        match filter {
            Some(f) => (
                "WHERE name LIKE ?1 ESCAPE '\\' OR grade LIKE ?1 ESCAPE '\\' OR remarks LIKE ?1 ESCAPE '\\'",
                vec![Value::Text(f.pattern.clone())],
            ),
            None => ("", Vec::new()),
        }
    }
}

const RECORD_COLUMNS: &str =
    "id, name, english, urdu, maths, physics, chemistry, total, percent, grade, remarks";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    Ok(StudentRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        english: row.get(2)?,
        urdu: row.get(3)?,
        maths: row.get(4)?,
        physics: row.get(5)?,
        chemistry: row.get(6)?,
        total: row.get(7)?,
        percent: row.get(8)?,
        grade: row.get(9)?,
        remarks: row.get(10)?,
    })
}

pub struct RecordStore<'a> {
    conn: &'a Connection,
}

impl<'a> RecordStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        RecordStore { conn }
    }

    pub fn count(&self, filter: Option<&Filter>) -> rusqlite::Result<i64> {
        let (where_clause, binds) = Filter::clause(filter);
        self.conn.query_row(
            &format!("SELECT COUNT(*) FROM records {where_clause}"),
            params_from_iter(binds),
            |r| r.get(0),
        )
    }

    /// A negative offset (page before the first) yields no rows.
    pub fn list(
        &self,
        filter: Option<&Filter>,
        sort: Sort,
        limit: i64,
        offset: i64,
    ) -> rusqlite::Result<Vec<StudentRecord>> {
        if offset < 0 || limit <= 0 {
            return Ok(Vec::new());
        }
        let (where_clause, mut binds) = Filter::clause(filter);
        let n = binds.len();
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records {where_clause} ORDER BY {} LIMIT ?{} OFFSET ?{}",
            sort.order_by(),
            n + 1,
            n + 2
        );
        binds.push(Value::Integer(limit));
        binds.push(Value::Integer(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_by_id(&self, id: i64) -> rusqlite::Result<Option<StudentRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?"),
                [id],
                record_from_row,
            )
            .optional()
    }

    pub fn insert(&self, f: &RecordFields) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO records(
               name, english, urdu, maths, physics, chemistry, total, percent, grade, remarks
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                f.name,
                f.marks.english,
                f.marks.urdu,
                f.marks.maths,
                f.marks.physics,
                f.marks.chemistry,
                f.total,
                f.percent,
                f.grade.as_str(),
                f.remarks,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replaces every field of the row. Returns 0 when the id is absent or
    /// when nothing would change.
    pub fn update(&self, id: i64, f: &RecordFields) -> rusqlite::Result<usize> {
        self.conn.execute(
            "UPDATE records SET
               name = ?1, english = ?2, urdu = ?3, maths = ?4, physics = ?5, chemistry = ?6,
               total = ?7, percent = ?8, grade = ?9, remarks = ?10
             WHERE id = ?11
               AND (name IS NOT ?1 OR english IS NOT ?2 OR urdu IS NOT ?3 OR maths IS NOT ?4
                    OR physics IS NOT ?5 OR chemistry IS NOT ?6 OR total IS NOT ?7
                    OR percent IS NOT ?8 OR grade IS NOT ?9 OR remarks IS NOT ?10)",
            params![
                f.name,
                f.marks.english,
                f.marks.urdu,
                f.marks.maths,
                f.marks.physics,
                f.marks.chemistry,
                f.total,
                f.percent,
                f.grade.as_str(),
                f.remarks,
                id,
            ],
        )
    }

    pub fn delete(&self, id: i64) -> rusqlite::Result<usize> {
        self.conn.execute("DELETE FROM records WHERE id = ?", [id])
    }
}
