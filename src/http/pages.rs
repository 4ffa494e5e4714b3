use std::collections::HashMap;

use askama::Template;
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

use super::with_conn;
use crate::calc;
use crate::db::{Filter, RecordStore, Sort, SortColumn, SortDirection};
use crate::ipc::{AppState, GENERIC_FAILURE};
use crate::paging::{self, PageInfo, PageLink};
use crate::records::{parse_id, parse_record_input, StudentRecord, Subject, ValidationErrors};

/// Page handler failure. Detail is logged, the browser gets a generic page.
pub struct PageError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for PageError {
    fn from(e: E) -> Self {
        PageError(e.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "page request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Html(GENERIC_FAILURE)).into_response()
    }
}

type PageResult = Result<Response, PageError>;

const WINDOW_RADIUS: i64 = 2;

const HEADERS: [(&str, SortColumn); 11] = [
    ("ID", SortColumn::Id),
    ("Name", SortColumn::Name),
    ("English", SortColumn::English),
    ("Urdu", SortColumn::Urdu),
    ("Maths", SortColumn::Maths),
    ("Physics", SortColumn::Physics),
    ("Chemistry", SortColumn::Chemistry),
    ("Total", SortColumn::Total),
    ("Percent", SortColumn::Percent),
    ("Grade", SortColumn::Grade),
    ("Remarks", SortColumn::Remarks),
];

pub struct HeaderCell {
    pub label: &'static str,
    pub href: String,
    pub arrow: &'static str,
}

pub struct PagerItem {
    pub label: String,
    pub href: String,
    pub active: bool,
    pub gap: bool,
}

pub struct Flash {
    pub kind: &'static str,
    pub text: &'static str,
}

#[derive(Template)]
#[template(path = "records_list.html")]
pub struct ListPage {
    pub records: Vec<StudentRecord>,
    pub info: PageInfo,
    pub search: String,
    pub limit: i64,
    pub headers: Vec<HeaderCell>,
    pub pager: Vec<PagerItem>,
    pub prev_href: String,
    pub next_href: String,
    pub flash: Vec<Flash>,
}

pub struct MarkField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "record_form.html")]
pub struct FormPage {
    pub title: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    /// Already markup-safe: either a stored (escaped) name or escaped input.
    pub name_html: String,
    pub name_error: String,
    pub marks: Vec<MarkField>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "record_delete.html")]
pub struct DeletePage {
    pub record: StudentRecord,
}

struct ListQuery {
    page: i64,
    limit: i64,
    search: String,
    sort: Sort,
}

impl ListQuery {
    fn from_query(q: &HashMap<String, String>) -> Self {
        let int = |k: &str| q.get(k).and_then(|v| v.trim().parse::<i64>().ok());
        ListQuery {
            page: paging::clamp_page(int("page")),
            limit: paging::clamp_page_size(int("limit")),
            search: q.get("search").map(|s| s.trim().to_string()).unwrap_or_default(),
            sort: Sort::from_params(
                q.get("sort").map(String::as_str),
                q.get("direction").map(String::as_str),
            ),
        }
    }

    fn href(&self, page: i64, sort: Sort) -> String {
        format!(
            "/?page={}&limit={}&search={}&sort={}&direction={}",
            page,
            self.limit,
            utf8_percent_encode(&self.search, NON_ALPHANUMERIC),
            sort.column.column(),
            sort.direction.keyword()
        )
    }
}

fn flash_for(q: &HashMap<String, String>) -> Vec<Flash> {
    let success = match q.get("success").map(String::as_str) {
        Some("created") => Some("Student record created successfully!"),
        Some("updated") => Some("Student record updated successfully!"),
        Some("deleted") => Some("Student record deleted successfully!"),
        _ => None,
    };
    let error = match q.get("error").map(String::as_str) {
        Some("invalid_id") => Some("Invalid student ID."),
        Some("not_found") => Some("Student not found."),
        _ => None,
    };
    success
        .map(|text| Flash { kind: "success", text })
        .into_iter()
        .chain(error.map(|text| Flash { kind: "danger", text }))
        .collect()
}

fn header_cells(lq: &ListQuery) -> Vec<HeaderCell> {
    HEADERS
        .iter()
        .map(|(label, column)| {
            let current = lq.sort.column == *column;
            let direction = if current {
                lq.sort.direction.flip()
            } else {
                SortDirection::Asc
            };
            let arrow = match (current, lq.sort.direction) {
                (false, _) => "",
                (true, SortDirection::Asc) => " ▲",
                (true, SortDirection::Desc) => " ▼",
            };
            HeaderCell {
                label: *label,
                href: lq.href(
                    1,
                    Sort {
                        column: *column,
                        direction,
                    },
                ),
                arrow,
            }
        })
        .collect()
}

fn pager_items(lq: &ListQuery, info: &PageInfo) -> Vec<PagerItem> {
    paging::page_window(info, WINDOW_RADIUS)
        .into_iter()
        .map(|link| match link {
            PageLink::Page { number, active } => PagerItem {
                label: number.to_string(),
                href: lq.href(number, lq.sort),
                active,
                gap: false,
            },
            PageLink::Gap => PagerItem {
                label: "…".to_string(),
                href: String::new(),
                active: false,
                gap: true,
            },
        })
        .collect()
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> PageResult {
    let lq = ListQuery::from_query(&q);
    let (search, page, limit, sort) = (lq.search.clone(), lq.page, lq.limit, lq.sort);
    let (info, records) = with_conn(&state, move |conn| {
        let store = RecordStore::new(conn);
        let filter = Filter::new(&search);
        let total = store.count(filter.as_ref())?;
        let info = paging::page_info(total, page, limit);
        let records = store.list(filter.as_ref(), sort, limit, info.offset)?;
        Ok((info, records))
    })
    .await?;

    let page = ListPage {
        headers: header_cells(&lq),
        pager: pager_items(&lq, &info),
        prev_href: if info.has_prev {
            lq.href(info.current_page - 1, lq.sort)
        } else {
            String::new()
        },
        next_href: if info.has_next {
            lq.href(info.current_page + 1, lq.sort)
        } else {
            String::new()
        },
        flash: flash_for(&q),
        search: lq.search,
        limit: lq.limit,
        records,
        info,
    };
    Ok(Html(page.render()?).into_response())
}

fn form_page(
    title: &'static str,
    action: String,
    submit_label: &'static str,
    name_html: String,
    values: impl Fn(Subject) -> String,
    errors: Option<&ValidationErrors>,
) -> FormPage {
    let marks = Subject::ALL
        .iter()
        .map(|s| MarkField {
            key: s.key(),
            label: s.label(),
            value: values(*s),
            error: errors
                .and_then(|e| e.for_subject(*s))
                .unwrap_or_default()
                .to_string(),
        })
        .collect();
    FormPage {
        title,
        action,
        submit_label,
        name_html,
        name_error: errors
            .and_then(|e| e.name.clone())
            .unwrap_or_default(),
        marks,
        errors: errors.map(ValidationErrors::messages).unwrap_or_default(),
    }
}

/// Form fields as the JSON payload the record parser reads.
fn form_params(form: &HashMap<String, String>) -> Value {
    Value::Object(
        form.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<String, Value>>(),
    )
}

fn submitted_form(
    title: &'static str,
    action: String,
    submit_label: &'static str,
    form: &HashMap<String, String>,
    errors: &ValidationErrors,
) -> FormPage {
    form_page(
        title,
        action,
        submit_label,
        calc::escape_markup(form.get("name").map(String::as_str).unwrap_or_default()),
        |s| form.get(s.key()).cloned().unwrap_or_default(),
        Some(errors),
    )
}

fn id_from(q: &HashMap<String, String>) -> Option<i64> {
    let raw = q.get("id").or_else(|| q.get("ID"))?;
    parse_id(Some(&Value::String(raw.clone())))
}

pub async fn create_form() -> PageResult {
    let page = form_page(
        "Add Student Record",
        "/create".to_string(),
        "Save Record",
        String::new(),
        |_| String::new(),
        None,
    );
    Ok(Html(page.render()?).into_response())
}

pub async fn create_submit(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> PageResult {
    let fields = match parse_record_input(&form_params(&form)) {
        Ok(f) => f,
        Err(errors) => {
            let page = submitted_form(
                "Add Student Record",
                "/create".to_string(),
                "Save Record",
                &form,
                &errors,
            );
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page.render()?)).into_response());
        }
    };
    let id = with_conn(&state, move |conn| Ok(RecordStore::new(conn).insert(&fields)?)).await?;
    tracing::info!(id, "record created from form");
    Ok(Redirect::to("/?success=created").into_response())
}

pub async fn update_form(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> PageResult {
    let Some(id) = id_from(&q) else {
        return Ok(Redirect::to("/?error=invalid_id").into_response());
    };
    let record = with_conn(&state, move |conn| Ok(RecordStore::new(conn).get_by_id(id)?)).await?;
    let Some(record) = record else {
        return Ok(Redirect::to("/?error=not_found").into_response());
    };
    let marks = record.marks();
    let page = form_page(
        "Update Student Record",
        format!("/update?id={id}"),
        "Update Record",
        record.name.clone(),
        |s| marks.get(s).to_string(),
        None,
    );
    Ok(Html(page.render()?).into_response())
}

pub async fn update_submit(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> PageResult {
    let Some(id) = id_from(&q).or_else(|| id_from(&form)) else {
        return Ok(Redirect::to("/?error=invalid_id").into_response());
    };
    let fields = match parse_record_input(&form_params(&form)) {
        Ok(f) => f,
        Err(errors) => {
            let page = submitted_form(
                "Update Student Record",
                format!("/update?id={id}"),
                "Update Record",
                &form,
                &errors,
            );
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page.render()?)).into_response());
        }
    };
    let (exists, changed) = with_conn(&state, move |conn| {
        let store = RecordStore::new(conn);
        let exists = store.get_by_id(id)?.is_some();
        let changed = if exists { store.update(id, &fields)? } else { 0 };
        Ok((exists, changed))
    })
    .await?;
    if !exists {
        return Ok(Redirect::to("/?error=not_found").into_response());
    }
    tracing::info!(id, changed, "record updated from form");
    Ok(Redirect::to("/?success=updated").into_response())
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> PageResult {
    let Some(id) = id_from(&q) else {
        return Ok(Redirect::to("/?error=invalid_id").into_response());
    };
    let record = with_conn(&state, move |conn| Ok(RecordStore::new(conn).get_by_id(id)?)).await?;
    match record {
        Some(record) => Ok(Html(DeletePage { record }.render()?).into_response()),
        None => Ok(Redirect::to("/?error=not_found").into_response()),
    }
}

pub async fn delete_submit(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> PageResult {
    let Some(id) = id_from(&q) else {
        return Ok(Redirect::to("/?error=invalid_id").into_response());
    };
    if !form.contains_key("confirm_delete") {
        return Ok(Redirect::to(&format!("/delete?id={id}")).into_response());
    }
    let deleted = with_conn(&state, move |conn| Ok(RecordStore::new(conn).delete(id)?)).await?;
    if deleted == 0 {
        return Ok(Redirect::to("/?error=not_found").into_response());
    }
    tracing::info!(id, "record deleted from form");
    Ok(Redirect::to("/?success=deleted").into_response())
}
