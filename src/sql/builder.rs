//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for one backend table.
//!
//! Identifiers are checked against the plain-identifier pattern and always quoted;
//! values are always parameters. Every statement yields rows with a single `record`
//! column holding `to_jsonb(row)`.

use crate::config::{is_identifier, DEFAULT_PRIMARY_KEY};
use crate::error::ProviderError;
use crate::provider::{Filter, Identifier, Pagination, Sort, SortOrder};
use crate::sql::PgBindValue;
use serde_json::{Map, Value};

const ALIAS: &str = "r";
pub const MAX_PER_PAGE: u32 = 1000;

/// Backend table addressed by a schema-qualified identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub primary_key: Vec<String>,
}

impl Table {
    fn qualified(&self) -> String {
        format!("{}.{}", quoted(&self.schema), quoted(&self.name))
    }

    /// True when `name` is the `id` synthesized for a table keyed by other column(s).
    fn is_synthesized_id(&self, name: &str) -> bool {
        name == DEFAULT_PRIMARY_KEY && !(self.primary_key.len() == 1 && self.primary_key[0] == DEFAULT_PRIMARY_KEY)
    }

    /// Column for a caller-supplied field on a single-key table; `id` maps to the key column.
    fn column(&self, name: &str) -> Result<String, ProviderError> {
        if self.is_synthesized_id(name) && self.primary_key.len() == 1 {
            return Ok(format!("{}.{}", ALIAS, quoted(&self.primary_key[0])));
        }
        Ok(format!("{}.{}", ALIAS, field(name)?))
    }
}

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quoted column for a caller-supplied field name.
fn field(name: &str) -> Result<String, ProviderError> {
    if is_identifier(name) {
        Ok(quoted(name))
    } else {
        Err(ProviderError::BadRequest(format!("invalid field name: {}", name)))
    }
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// What a list query selects: filters, optional reference constraint, ordering, page.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListQuery<'a> {
    pub filter: Option<&'a Filter>,
    /// `(target field, id)`: only rows whose target equals id.
    pub reference: Option<(&'a str, &'a Identifier)>,
    pub sort: Option<&'a Sort>,
    pub pagination: Option<Pagination>,
}

fn where_clause(q: &mut QueryBuf, table: &Table, list: &ListQuery<'_>) -> Result<String, ProviderError> {
    let mut parts = Vec::new();
    if let Some((target, id)) = list.reference {
        if table.is_synthesized_id(target) && table.primary_key.len() > 1 {
            parts.push(key_eq(q, table, id)?);
        } else {
            let col = table.column(target)?;
            let n = q.push_param(PgBindValue::Text(id.to_string()));
            parts.push(format!("{}::text = ${}", col, n));
        }
    }
    if let Some(filter) = list.filter {
        for (key, value) in filter {
            parts.push(filter_condition(q, table, key, value)?);
        }
    }
    Ok(if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    })
}

/// One filter entry. Keys are `field` or `field@op` with op in eq, neq, like, ilike.
fn filter_condition(q: &mut QueryBuf, table: &Table, key: &str, value: &Value) -> Result<String, ProviderError> {
    let (name, op) = key.split_once('@').unwrap_or((key, "eq"));
    if table.is_synthesized_id(name) && table.primary_key.len() > 1 {
        return composite_id_condition(q, table, op, value);
    }
    let col = table.column(name)?;
    Ok(match (op, value) {
        ("eq", Value::Null) => format!("{} IS NULL", col),
        ("neq", Value::Null) => format!("{} IS NOT NULL", col),
        ("eq", Value::Array(items)) => {
            let n = q.push_param(PgBindValue::text_array(items)?);
            format!("{}::text = ANY(${})", col, n)
        }
        ("neq", Value::Array(items)) => {
            let n = q.push_param(PgBindValue::text_array(items)?);
            format!("{}::text <> ALL(${})", col, n)
        }
        (op, v) => {
            let sql_op = match op {
                "eq" => "=",
                "neq" => "<>",
                "like" => "LIKE",
                "ilike" => "ILIKE",
                other => {
                    return Err(ProviderError::BadRequest(format!(
                        "unsupported filter operator: {}",
                        other
                    )))
                }
            };
            let n = q.push_param(PgBindValue::Text(PgBindValue::scalar_text(v)?));
            format!("{}::text {} ${}", col, sql_op, n)
        }
    })
}

/// Filter on the synthesized `id` of a composite-key table: ids are JSON-array text.
fn composite_id_condition(q: &mut QueryBuf, table: &Table, op: &str, value: &Value) -> Result<String, ProviderError> {
    let id = |v: &Value| {
        Identifier::from_json(v).ok_or_else(|| ProviderError::BadRequest(format!("invalid id filter value: {}", v)))
    };
    match (op, value) {
        ("eq", Value::Null) => Ok("FALSE".into()),
        ("neq", Value::Null) => Ok("TRUE".into()),
        ("eq", Value::Array(items)) => {
            let ids = items.iter().map(id).collect::<Result<Vec<_>, _>>()?;
            key_in(q, table, &ids)
        }
        ("neq", Value::Array(items)) => {
            let ids = items.iter().map(id).collect::<Result<Vec<_>, _>>()?;
            Ok(format!("NOT {}", key_in(q, table, &ids)?))
        }
        ("eq", v) => key_eq(q, table, &id(v)?),
        ("neq", v) => Ok(format!("NOT {}", key_eq(q, table, &id(v)?)?)),
        (other, _) => Err(ProviderError::BadRequest(format!(
            "unsupported filter operator on composite id: {}",
            other
        ))),
    }
}

fn order_clause(table: &Table, sort: Option<&Sort>) -> Result<String, ProviderError> {
    match sort {
        Some(s) => {
            let dir = match s.order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            };
            if table.is_synthesized_id(&s.field) && table.primary_key.len() > 1 {
                let cols = table
                    .primary_key
                    .iter()
                    .map(|c| format!("{}.{} {}", ALIAS, quoted(c), dir))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Ok(format!(" ORDER BY {}", cols));
            }
            Ok(format!(" ORDER BY {} {}", table.column(&s.field)?, dir))
        }
        None => Ok(format!(
            " ORDER BY {}",
            table
                .primary_key
                .iter()
                .map(|c| format!("{}.{}", ALIAS, quoted(c)))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn page_clause(pagination: Option<Pagination>) -> String {
    match pagination {
        Some(p) => {
            let per_page = p.per_page.min(MAX_PER_PAGE);
            let offset = u64::from(p.page.max(1) - 1) * u64::from(per_page);
            format!(" LIMIT {} OFFSET {}", per_page, offset)
        }
        None => String::new(),
    }
}

/// Decode one identifier into the text of each key column.
fn key_values(table: &Table, id: &Identifier) -> Result<Vec<String>, ProviderError> {
    if table.primary_key.len() == 1 {
        return Ok(vec![id.to_string()]);
    }
    let invalid = || {
        ProviderError::BadRequest(format!(
            "composite id must be a JSON array of {} values: {}",
            table.primary_key.len(),
            id
        ))
    };
    let Identifier::Text(raw) = id else {
        return Err(invalid());
    };
    let values: Vec<Value> = serde_json::from_str(raw).map_err(|_| invalid())?;
    if values.len() != table.primary_key.len() {
        return Err(invalid());
    }
    values.iter().map(PgBindValue::scalar_text).collect()
}

fn key_group(q: &mut QueryBuf, table: &Table, id: &Identifier) -> Result<String, ProviderError> {
    let values = key_values(table, id)?;
    let parts: Vec<String> = table
        .primary_key
        .iter()
        .zip(values)
        .map(|(col, v)| {
            let n = q.push_param(PgBindValue::Text(v));
            format!("{}.{}::text = ${}", ALIAS, quoted(col), n)
        })
        .collect();
    Ok(format!("({})", parts.join(" AND ")))
}

/// Match one row by primary key.
fn key_eq(q: &mut QueryBuf, table: &Table, id: &Identifier) -> Result<String, ProviderError> {
    key_group(q, table, id)
}

/// Match any of `ids` by primary key.
fn key_in(q: &mut QueryBuf, table: &Table, ids: &[Identifier]) -> Result<String, ProviderError> {
    if ids.is_empty() {
        return Ok("FALSE".into());
    }
    if table.primary_key.len() == 1 {
        let n = q.push_param(PgBindValue::TextArray(ids.iter().map(|i| i.to_string()).collect()));
        return Ok(format!("{}.{}::text = ANY(${})", ALIAS, quoted(&table.primary_key[0]), n));
    }
    let groups = ids
        .iter()
        .map(|id| key_group(q, table, id))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", groups.join(" OR ")))
}

/// SELECT page of rows.
pub fn select_list(table: &Table, list: &ListQuery<'_>) -> Result<QueryBuf, ProviderError> {
    let mut q = QueryBuf::default();
    let where_sql = where_clause(&mut q, table, list)?;
    let order = order_clause(table, list.sort)?;
    q.sql = format!(
        "SELECT to_jsonb({a}) AS record FROM {} {a}{}{}{}",
        table.qualified(),
        where_sql,
        order,
        page_clause(list.pagination),
        a = ALIAS
    );
    Ok(q)
}

/// SELECT COUNT(*) over the same filters as [`select_list`], ignoring sort and page.
pub fn count(table: &Table, list: &ListQuery<'_>) -> Result<QueryBuf, ProviderError> {
    let mut q = QueryBuf::default();
    let where_sql = where_clause(&mut q, table, list)?;
    q.sql = format!("SELECT COUNT(*) FROM {} {}{}", table.qualified(), ALIAS, where_sql);
    Ok(q)
}

pub fn select_by_id(table: &Table, id: &Identifier) -> Result<QueryBuf, ProviderError> {
    let mut q = QueryBuf::default();
    let cond = key_eq(&mut q, table, id)?;
    q.sql = format!(
        "SELECT to_jsonb({a}) AS record FROM {} {a} WHERE {}",
        table.qualified(),
        cond,
        a = ALIAS
    );
    Ok(q)
}

pub fn select_by_ids(table: &Table, ids: &[Identifier]) -> Result<QueryBuf, ProviderError> {
    let mut q = QueryBuf::default();
    let cond = key_in(&mut q, table, ids)?;
    q.sql = format!(
        "SELECT to_jsonb({a}) AS record FROM {} {a} WHERE {}",
        table.qualified(),
        cond,
        a = ALIAS
    );
    Ok(q)
}

fn column_list(data: &Map<String, Value>) -> Result<Vec<String>, ProviderError> {
    data.keys().map(|k| field(k)).collect()
}

/// INSERT one row; values are cast server side through `jsonb_populate_record`.
pub fn insert(table: &Table, data: &Map<String, Value>) -> Result<QueryBuf, ProviderError> {
    let mut q = QueryBuf::default();
    let target = table.qualified();
    if data.is_empty() {
        q.sql = format!(
            "INSERT INTO {} AS {a} DEFAULT VALUES RETURNING to_jsonb({a}) AS record",
            target,
            a = ALIAS
        );
        return Ok(q);
    }
    let cols = column_list(data)?.join(", ");
    let n = q.push_param(PgBindValue::Json(Value::Object(data.clone())));
    q.sql = format!(
        "INSERT INTO {t} AS {a} ({c}) SELECT {c} FROM jsonb_populate_record(NULL::{t}, ${n}) RETURNING to_jsonb({a}) AS record",
        t = target,
        a = ALIAS,
        c = cols,
        n = n
    );
    Ok(q)
}

fn update_with(
    table: &Table,
    data: &Map<String, Value>,
    cond: impl FnOnce(&mut QueryBuf) -> Result<String, ProviderError>,
) -> Result<QueryBuf, ProviderError> {
    if data.is_empty() {
        return Err(ProviderError::BadRequest("update requires at least one field".into()));
    }
    let mut q = QueryBuf::default();
    let assignments = column_list(data)?
        .into_iter()
        .map(|c| format!("{c} = p.{c}", c = c))
        .collect::<Vec<_>>()
        .join(", ");
    let n = q.push_param(PgBindValue::Json(Value::Object(data.clone())));
    let cond = cond(&mut q)?;
    q.sql = format!(
        "UPDATE {t} AS {a} SET {s} FROM jsonb_populate_record(NULL::{t}, ${n}) AS p WHERE {w} RETURNING to_jsonb({a}) AS record",
        t = table.qualified(),
        a = ALIAS,
        s = assignments,
        n = n,
        w = cond
    );
    Ok(q)
}

pub fn update(table: &Table, id: &Identifier, data: &Map<String, Value>) -> Result<QueryBuf, ProviderError> {
    update_with(table, data, |q| key_eq(q, table, id))
}

pub fn update_many(
    table: &Table,
    ids: &[Identifier],
    data: &Map<String, Value>,
) -> Result<QueryBuf, ProviderError> {
    update_with(table, data, |q| key_in(q, table, ids))
}

pub fn delete(table: &Table, id: &Identifier) -> Result<QueryBuf, ProviderError> {
    let mut q = QueryBuf::default();
    let cond = key_eq(&mut q, table, id)?;
    q.sql = format!(
        "DELETE FROM {} AS {a} WHERE {} RETURNING to_jsonb({a}) AS record",
        table.qualified(),
        cond,
        a = ALIAS
    );
    Ok(q)
}

pub fn delete_many(table: &Table, ids: &[Identifier]) -> Result<QueryBuf, ProviderError> {
    let mut q = QueryBuf::default();
    let cond = key_in(&mut q, table, ids)?;
    q.sql = format!(
        "DELETE FROM {} AS {a} WHERE {} RETURNING to_jsonb({a}) AS record",
        table.qualified(),
        cond,
        a = ALIAS
    );
    Ok(q)
}
