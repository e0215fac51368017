//! Parameter and result bundles for the nine data provider operations.
//!
//! Field names serialize in camelCase to match what admin clients send and expect.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A record as stored by the backend. Opaque to the provider layer.
pub type Record = Value;

/// Filter object: field name (optionally with an `@op` suffix) → value.
pub type Filter = Map<String, Value>;

/// Record identifier: integer or string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Int(i64),
    Text(String),
}

impl Identifier {
    /// Parse a path or query segment. Only canonical integers become `Int`, so text keys such as
    /// `007` or `+5` keep their exact spelling. UUIDs are normalised to the lowercase form
    /// PostgreSQL renders; anything else is text.
    pub fn parse(s: &str) -> Self {
        if let Ok(n) = s.parse::<i64>() {
            if n.to_string() == s {
                return Identifier::Int(n);
            }
            return Identifier::Text(s.to_string());
        }
        if let Ok(u) = uuid::Uuid::parse_str(s) {
            return Identifier::Text(u.to_string());
        }
        Identifier::Text(s.to_string())
    }

    /// Build from a JSON value. Only numbers (integral) and strings are identifiers.
    pub fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_i64().map(Identifier::Int),
            Value::String(s) => Some(Identifier::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Identifier::Int(n) => Value::Number((*n).into()),
            Identifier::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Int(n) => write!(f, "{}", n),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Identifier::Int(n)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::Text(s.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetListResult {
    pub data: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetOneParams {
    pub id: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetOneResult {
    pub data: Record,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetManyParams {
    pub ids: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetManyResult {
    pub data: Vec<Record>,
}

/// Records of one resource that point at `id` through the `target` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetManyReferenceParams {
    pub target: String,
    pub id: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

pub type GetManyReferenceResult = GetListResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateParams {
    pub data: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateResult {
    pub data: Record,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    pub id: Identifier,
    pub data: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_data: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub data: Record,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateManyParams {
    pub ids: Vec<Identifier>,
    pub data: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateManyResult {
    pub data: Vec<Identifier>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    pub id: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_data: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub data: Record,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteManyParams {
    pub ids: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteManyResult {
    pub data: Vec<Identifier>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifier_parse() {
        assert_eq!(Identifier::parse("42"), Identifier::Int(42));
        assert_eq!(Identifier::parse("-3"), Identifier::Int(-3));
        assert_eq!(Identifier::parse("A-100"), Identifier::Text("A-100".into()));
        assert_eq!(
            Identifier::parse("6F9619FF-8B86-D011-B42D-00C04FC964FF"),
            Identifier::Text("6f9619ff-8b86-d011-b42d-00c04fc964ff".into())
        );
    }

    #[test]
    fn identifier_parse_keeps_non_canonical_numbers_as_text() {
        assert_eq!(Identifier::parse("007"), Identifier::Text("007".into()));
        assert_eq!(Identifier::parse("+5"), Identifier::Text("+5".into()));
        assert_eq!(Identifier::parse("-0"), Identifier::Text("-0".into()));
        assert_eq!(Identifier::parse("007").to_string(), "007");
    }

    #[test]
    fn identifier_is_untagged_in_json() {
        let ids: Vec<Identifier> = serde_json::from_value(json!([1, "two"])).unwrap();
        assert_eq!(ids, vec![Identifier::Int(1), Identifier::Text("two".into())]);
        assert_eq!(serde_json::to_value(&ids).unwrap(), json!([1, "two"]));
        assert_eq!(Identifier::from_json(&json!(true)), None);
        assert_eq!(Identifier::from_json(&json!(1.5)), None);
    }

    #[test]
    fn list_params_use_admin_client_field_names() {
        let params: GetListParams = serde_json::from_value(json!({
            "pagination": { "page": 2, "perPage": 25 },
            "sort": { "field": "item_number", "order": "DESC" },
            "filter": { "item_type": "ASY" }
        }))
        .unwrap();
        assert_eq!(params.pagination, Some(Pagination { page: 2, per_page: 25 }));
        assert_eq!(params.sort.as_ref().map(|s| s.order), Some(SortOrder::Desc));
        assert_eq!(params.filter.get("item_type"), Some(&json!("ASY")));

        let update = UpdateParams {
            id: 1.into(),
            data: json!({ "description": "x" }),
            previous_data: Some(json!({ "description": "y" })),
            meta: None,
        };
        let v = serde_json::to_value(&update).unwrap();
        assert!(v.get("previousData").is_some());
    }

    #[test]
    fn sort_order_parse() {
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("DESC"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("up"), None);
    }
}
