//! Data provider over PostgreSQL. Resources are backend identifiers (`schema.table`).

use super::*;
use crate::config::{check_identifier, BackendIdentifier, ProviderSettings, DEFAULT_PRIMARY_KEY};
use crate::error::ProviderError;
use crate::sql::{self, bind_all, ListQuery, QueryBuf, Table};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;

pub struct PgDataProvider {
    pool: PgPool,
    /// Backend identifier → primary key columns. Missing entries use `id`.
    primary_keys: HashMap<String, Vec<String>>,
}

impl PgDataProvider {
    pub fn new(pool: PgPool) -> Self {
        PgDataProvider {
            pool,
            primary_keys: HashMap::new(),
        }
    }

    pub fn with_primary_keys(mut self, primary_keys: HashMap<String, Vec<String>>) -> Self {
        self.primary_keys = primary_keys;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Connect to the configured instance; the API key is used as the connection password.
    pub async fn connect(settings: &ProviderSettings, max_connections: u32) -> Result<PgPool, ProviderError> {
        let options = PgConnectOptions::from_str(&settings.instance_url)?.password(&settings.api_key);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(pool)
    }

    fn table(&self, backend: &str) -> Result<Table, ProviderError> {
        let id = BackendIdentifier::parse(backend)?;
        check_identifier("schema", &id.schema)?;
        check_identifier("table", &id.resource)?;
        let primary_key = self
            .primary_keys
            .get(backend)
            .cloned()
            .unwrap_or_else(|| vec![DEFAULT_PRIMARY_KEY.to_string()]);
        Ok(Table {
            schema: id.schema,
            name: id.resource,
            primary_key,
        })
    }

    async fn fetch_records(&self, table: &Table, q: &QueryBuf) -> Result<Vec<Value>, ProviderError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        rows.iter()
            .map(|row| -> Result<Value, ProviderError> {
                let record: Value = row.try_get("record")?;
                Ok(with_id(table, record))
            })
            .collect()
    }

    async fn fetch_optional_record(&self, table: &Table, q: &QueryBuf) -> Result<Option<Value>, ProviderError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        match row {
            Some(row) => {
                let record: Value = row.try_get("record")?;
                Ok(Some(with_id(table, record)))
            }
            None => Ok(None),
        }
    }

    async fn fetch_count(&self, q: &QueryBuf) -> Result<u64, ProviderError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "count");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        let n: i64 = row.try_get(0)?;
        Ok(n.max(0) as u64)
    }

    async fn list(&self, table: &Table, list: ListQuery<'_>) -> Result<GetListResult, ProviderError> {
        let rows = self.fetch_records(table, &sql::select_list(table, &list)?).await?;
        let total = self.fetch_count(&sql::count(table, &list)?).await?;
        Ok(GetListResult {
            data: rows,
            total: Some(total),
        })
    }
}

/// Set `id` on records whose key column is named differently, so clients can address them.
/// Composite keys become a JSON array string of the key values. A plain `id` column on such
/// a table is shadowed: `id` always carries the key.
fn with_id(table: &Table, mut record: Value) -> Value {
    if table.primary_key.len() == 1 && table.primary_key[0] == DEFAULT_PRIMARY_KEY {
        return record;
    }
    if let Value::Object(map) = &mut record {
        let id = if table.primary_key.len() == 1 {
            map.get(&table.primary_key[0]).cloned().unwrap_or(Value::Null)
        } else {
            let values: Vec<Value> = table
                .primary_key
                .iter()
                .map(|c| map.get(c).cloned().unwrap_or(Value::Null))
                .collect();
            Value::String(Value::Array(values).to_string())
        };
        map.insert(DEFAULT_PRIMARY_KEY.to_string(), id);
    }
    record
}

/// Write payload as a column map. Drops the synthesized `id` when the table is keyed differently.
fn write_payload(table: &Table, data: &Value) -> Result<Map<String, Value>, ProviderError> {
    let Value::Object(map) = data else {
        return Err(ProviderError::BadRequest("data must be a JSON object".into()));
    };
    let mut map = map.clone();
    if !table.primary_key.iter().any(|c| c == DEFAULT_PRIMARY_KEY) {
        map.remove(DEFAULT_PRIMARY_KEY);
    }
    Ok(map)
}

fn record_ids(records: &[Value]) -> Vec<Identifier> {
    records
        .iter()
        .filter_map(|r| r.get(DEFAULT_PRIMARY_KEY).and_then(Identifier::from_json))
        .collect()
}

/// Constraint violations become client errors; everything else stays a database error.
fn map_db_error(e: sqlx::Error) -> ProviderError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() || db.is_foreign_key_violation() {
            return ProviderError::Conflict(db.message().to_string());
        }
        if db.is_check_violation() {
            return ProviderError::BadRequest(db.message().to_string());
        }
    }
    ProviderError::Db(e)
}

fn not_found(backend: &str, id: &Identifier) -> ProviderError {
    ProviderError::NotFound(format!("{} {}", backend, id))
}

#[async_trait]
impl DataProvider for PgDataProvider {
    async fn get_list(&self, resource: &str, params: GetListParams) -> Result<GetListResult, ProviderError> {
        let table = self.table(resource)?;
        let list = ListQuery {
            filter: Some(&params.filter),
            reference: None,
            sort: params.sort.as_ref(),
            pagination: params.pagination,
        };
        self.list(&table, list).await
    }

    async fn get_one(&self, resource: &str, params: GetOneParams) -> Result<GetOneResult, ProviderError> {
        let table = self.table(resource)?;
        let q = sql::select_by_id(&table, &params.id)?;
        let data = self
            .fetch_optional_record(&table, &q)
            .await?
            .ok_or_else(|| not_found(resource, &params.id))?;
        Ok(GetOneResult { data })
    }

    async fn get_many(&self, resource: &str, params: GetManyParams) -> Result<GetManyResult, ProviderError> {
        let table = self.table(resource)?;
        if params.ids.is_empty() {
            return Ok(GetManyResult { data: Vec::new() });
        }
        let q = sql::select_by_ids(&table, &params.ids)?;
        let data = self.fetch_records(&table, &q).await?;
        Ok(GetManyResult { data })
    }

    async fn get_many_reference(
        &self,
        resource: &str,
        params: GetManyReferenceParams,
    ) -> Result<GetManyReferenceResult, ProviderError> {
        let table = self.table(resource)?;
        let list = ListQuery {
            filter: Some(&params.filter),
            reference: Some((params.target.as_str(), &params.id)),
            sort: params.sort.as_ref(),
            pagination: params.pagination,
        };
        self.list(&table, list).await
    }

    async fn create(&self, resource: &str, params: CreateParams) -> Result<CreateResult, ProviderError> {
        let table = self.table(resource)?;
        let data = write_payload(&table, &params.data)?;
        let q = sql::insert(&table, &data)?;
        let data = self
            .fetch_optional_record(&table, &q)
            .await?
            .ok_or(ProviderError::Db(sqlx::Error::RowNotFound))?;
        Ok(CreateResult { data })
    }

    async fn update(&self, resource: &str, params: UpdateParams) -> Result<UpdateResult, ProviderError> {
        let table = self.table(resource)?;
        let data = write_payload(&table, &params.data)?;
        let q = sql::update(&table, &params.id, &data)?;
        let data = self
            .fetch_optional_record(&table, &q)
            .await?
            .ok_or_else(|| not_found(resource, &params.id))?;
        Ok(UpdateResult { data })
    }

    async fn update_many(&self, resource: &str, params: UpdateManyParams) -> Result<UpdateManyResult, ProviderError> {
        let table = self.table(resource)?;
        if params.ids.is_empty() {
            return Ok(UpdateManyResult { data: Vec::new() });
        }
        let data = write_payload(&table, &params.data)?;
        let q = sql::update_many(&table, &params.ids, &data)?;
        let records = self.fetch_records(&table, &q).await?;
        Ok(UpdateManyResult {
            data: record_ids(&records),
        })
    }

    async fn delete(&self, resource: &str, params: DeleteParams) -> Result<DeleteResult, ProviderError> {
        let table = self.table(resource)?;
        let q = sql::delete(&table, &params.id)?;
        let data = self
            .fetch_optional_record(&table, &q)
            .await?
            .ok_or_else(|| not_found(resource, &params.id))?;
        Ok(DeleteResult { data })
    }

    async fn delete_many(&self, resource: &str, params: DeleteManyParams) -> Result<DeleteManyResult, ProviderError> {
        let table = self.table(resource)?;
        if params.ids.is_empty() {
            return Ok(DeleteManyResult { data: Vec::new() });
        }
        let q = sql::delete_many(&table, &params.ids)?;
        let records = self.fetch_records(&table, &q).await?;
        Ok(DeleteManyResult {
            data: record_ids(&records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(pk: &[&str]) -> Table {
        Table {
            schema: "ConfigDB".into(),
            name: "t".into(),
            primary_key: pk.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn lazy_provider() -> PgDataProvider {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/configdb")
            .unwrap();
        let mut keys = HashMap::new();
        keys.insert("ConfigDB.boms".to_string(), vec!["bom_id".to_string()]);
        PgDataProvider::new(pool).with_primary_keys(keys)
    }

    #[test]
    fn with_id_leaves_id_keyed_tables_alone() {
        let record = json!({ "id": 1, "item_number": "100-200" });
        assert_eq!(with_id(&table(&["id"]), record.clone()), record);
    }

    #[test]
    fn with_id_copies_single_key() {
        let record = with_id(&table(&["bom_id"]), json!({ "bom_id": 12, "bom_revision": "A" }));
        assert_eq!(record["id"], json!(12));
        assert_eq!(record_ids(&[record]), vec![Identifier::Int(12)]);
    }

    #[test]
    fn with_id_encodes_composite_key() {
        let record = with_id(
            &table(&["variant_id", "attribute_id"]),
            json!({ "variant_id": 3, "attribute_id": 9, "value": "red" }),
        );
        assert_eq!(record["id"], json!("[3,9]"));
    }

    #[test]
    fn with_id_shadows_non_key_id_column() {
        let record = with_id(&table(&["bom_id"]), json!({ "id": 900, "bom_id": 12 }));
        assert_eq!(record["id"], json!(12));
        assert_eq!(record["bom_id"], json!(12));
        assert_eq!(record_ids(&[record]), vec![Identifier::Int(12)]);
    }

    #[test]
    fn write_payload_drops_synthesized_id() {
        let data = json!({ "id": 12, "bom_id": 12, "description": "x" });
        let map = write_payload(&table(&["bom_id"]), &data).unwrap();
        assert!(!map.contains_key("id"));
        assert!(map.contains_key("bom_id"));

        let map = write_payload(&table(&["id"]), &data).unwrap();
        assert!(map.contains_key("id"));

        assert!(matches!(
            write_payload(&table(&["id"]), &json!([1, 2])),
            Err(ProviderError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn table_resolution_uses_configured_keys() {
        let provider = lazy_provider();
        let boms = provider.table("ConfigDB.boms").unwrap();
        assert_eq!(boms.primary_key, vec!["bom_id".to_string()]);
        let items = provider.table("ConfigDB.items").unwrap();
        assert_eq!(items.primary_key, vec!["id".to_string()]);
        assert!(provider.table("items").is_err());
        assert!(provider.table("Config DB.items").is_err());
    }

    #[tokio::test]
    async fn empty_id_lists_skip_the_database() {
        let provider = lazy_provider();
        let many = provider
            .get_many("ConfigDB.items", GetManyParams { ids: vec![], meta: None })
            .await
            .unwrap();
        assert!(many.data.is_empty());
        let deleted = provider
            .delete_many("ConfigDB.items", DeleteManyParams { ids: vec![], meta: None })
            .await
            .unwrap();
        assert!(deleted.data.is_empty());
    }
}
