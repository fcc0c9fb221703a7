use crate::group_repository::group_repository::{GroupRepository, hosts_of_unique_match};
use crate::inventory::group::Group;
use crate::inventory::host_vars::HostVars;
use crate::inventory::inventory_data::decode_record;
use crate::settings::settings_manager::Settings;
use crate::shared::inventory_error::{InventoryError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

/// SQL for a pair of document collections: `id bigserial, doc jsonb` tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Queries {
    pub all_groups: String,
    pub groups_by_name: String,
    pub groups_by_host_pattern: String,
    pub groups_by_name_and_datacenter: String,
    pub hosts_by_name_pattern: String,
}

impl Queries {
    pub fn new(groups_collection: &str, hosts_collection: &str) -> Result<Self> {
        let groups = validate_identifier(groups_collection)?;
        let hosts = validate_identifier(hosts_collection)?;
        Ok(Self {
            all_groups: format!("SELECT doc FROM {groups} ORDER BY id;"),
            groups_by_name: format!(
                "SELECT doc FROM {groups} WHERE doc->>'name' = $1 ORDER BY id;"
            ),
            groups_by_host_pattern: format!(
                "SELECT doc FROM {groups} WHERE EXISTS (\
                 SELECT 1 FROM jsonb_array_elements_text(\
                 CASE WHEN jsonb_typeof(doc->'hosts') = 'array' THEN doc->'hosts' ELSE '[]'::jsonb END\
                 ) AS h(name) WHERE h.name ~* $1) ORDER BY id;"
            ),
            groups_by_name_and_datacenter: format!(
                "SELECT doc FROM {groups} WHERE doc->>'name' = $1 AND doc->>'datacenter' = $2 ORDER BY id;"
            ),
            hosts_by_name_pattern: format!(
                "SELECT doc FROM {hosts} WHERE doc->>'name' ~* $1 ORDER BY id;"
            ),
        })
    }
}

/// Accepts `name` or `schema.name` made of ASCII letters, digits and `_`.
pub fn validate_identifier(name: &str) -> Result<&str> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|p| valid_part(p)) {
        Ok(name)
    } else {
        Err(InventoryError::InvalidIdentifier(name.to_string()))
    }
}

pub struct PostgresGroupRepository {
    client: Client,
    queries: Queries,
    query_timeout: Duration,
}

impl PostgresGroupRepository {
    pub async fn connect(settings: &Settings, password: Option<&str>) -> Result<Self> {
        let queries = Queries::new(settings.groups_collection(), settings.hosts_collection())?;

        let connection_string = settings.connection_string(password);
        let (client, connection) = tokio_postgres::connect(&connection_string, NoTls)
            .await
            .map_err(|e| InventoryError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "connection error");
            }
        });
        info!(
            host = settings.host.as_deref().unwrap_or("localhost"),
            "connected to document store"
        );

        Ok(Self {
            client,
            queries,
            query_timeout: settings.query_timeout(),
        })
    }

    async fn query_documents(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Value>> {
        debug!(sql, "query");
        let rows = tokio::time::timeout(self.query_timeout, self.client.query(sql, params))
            .await
            .map_err(|_| {
                InventoryError::Query(format!("timed out after {:?}", self.query_timeout))
            })??;

        let mut result: Vec<Value> = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(row.try_get(0)?);
        }
        Ok(result)
    }

    async fn query_records<T: DeserializeOwned>(
        &self,
        kind: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<T>> {
        self.query_documents(sql, params)
            .await?
            .into_iter()
            .enumerate()
            .map(|(index, document)| decode_record(kind, index, document))
            .collect()
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_groups(
        &self,
        name_or_pattern: &str,
        match_by_host_pattern: bool,
    ) -> Result<Vec<Group>> {
        let sql = if match_by_host_pattern {
            &self.queries.groups_by_host_pattern
        } else {
            &self.queries.groups_by_name
        };
        self.query_records("group", sql, &[&name_or_pattern]).await
    }

    async fn find_hosts(&self, name_pattern: &str) -> Result<Vec<HostVars>> {
        self.query_records("host", &self.queries.hosts_by_name_pattern, &[&name_pattern])
            .await
    }

    async fn hosts_for_group_in_datacenter(
        &self,
        group: &str,
        datacenter: &str,
    ) -> Result<Vec<String>> {
        let matches: Vec<Group> = self
            .query_records(
                "group",
                &self.queries.groups_by_name_and_datacenter,
                &[&group, &datacenter],
            )
            .await?;
        Ok(hosts_of_unique_match(matches, group, datacenter))
    }

    async fn all_groups(&self) -> Result<Vec<Group>> {
        self.query_records("group", &self.queries.all_groups, &[])
            .await
    }
}
