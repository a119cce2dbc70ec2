// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage resource CRUD, listing, and group-by counts.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use serde::de::DeserializeOwned;
use strata_core::query::{SortKey, StatGroupBy};
use strata_core::{
    StatBucket, StatQuery, StorageQuery, StorageResource, StorageState, StorageUpdate,
    StrataError,
};

use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "storage_id, domain_id, name, state, tags, capability, plugin_info, \
                       user_id, created_at, deleted_at";

/// Serialized forms of the non-scalar columns.
struct Encoded {
    tags: String,
    capability: Option<String>,
    plugin_info: String,
    created_at: String,
    deleted_at: Option<String>,
}

fn encode(resource: &StorageResource) -> Result<Encoded, serde_json::Error> {
    Ok(Encoded {
        tags: serde_json::to_string(&resource.tags)?,
        capability: resource
            .capability
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?,
        plugin_info: serde_json::to_string(&resource.plugin_info)?,
        created_at: format_timestamp(&resource.created_at),
        deleted_at: resource.deleted_at.as_ref().map(format_timestamp),
    })
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| conversion_error(idx, e))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        DateTime::parse_from_rfc3339(&t)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| conversion_error(idx, e))
    })
    .transpose()
}

fn row_to_resource(row: &Row<'_>) -> rusqlite::Result<StorageResource> {
    let state: String = row.get(3)?;
    let capability: Option<String> = row.get(5)?;
    Ok(StorageResource {
        storage_id: row.get(0)?,
        domain_id: row.get(1)?,
        name: row.get(2)?,
        state: state
            .parse::<StorageState>()
            .map_err(|e| conversion_error(3, e))?,
        tags: json_column(row, 4)?,
        capability: capability
            .map(|c| serde_json::from_str(&c).map_err(|e| conversion_error(5, e)))
            .transpose()?,
        plugin_info: json_column(row, 6)?,
        user_id: row.get(7)?,
        created_at: timestamp_column(row, 8)?
            .ok_or(rusqlite::Error::InvalidColumnType(8, "created_at".into(), Type::Null))?,
        deleted_at: timestamp_column(row, 9)?,
    })
}

fn select_one(
    conn: &rusqlite::Connection,
    storage_id: &str,
    domain_id: &str,
) -> rusqlite::Result<Option<StorageResource>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM storages WHERE storage_id = ?1 AND domain_id = ?2"),
        params![storage_id, domain_id],
        row_to_resource,
    )
    .optional()
}

fn storage_error(e: serde_json::Error) -> StrataError {
    StrataError::Storage {
        source: Box::new(e),
    }
}

pub async fn insert_storage(
    db: &Database,
    resource: &StorageResource,
) -> Result<(), StrataError> {
    let encoded = encode(resource).map_err(storage_error)?;
    let resource = resource.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO storages (storage_id, domain_id, name, state, tags, capability, \
                 plugin_id, plugin_info, user_id, created_at, deleted_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    resource.storage_id,
                    resource.domain_id,
                    resource.name,
                    resource.state.to_string(),
                    encoded.tags,
                    encoded.capability,
                    resource.plugin_info.plugin_id,
                    encoded.plugin_info,
                    resource.user_id,
                    encoded.created_at,
                    encoded.deleted_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one record, including soft-deleted ones.
pub async fn get_storage(
    db: &Database,
    storage_id: &str,
    domain_id: &str,
) -> Result<Option<StorageResource>, StrataError> {
    let storage_id = storage_id.to_string();
    let domain_id = domain_id.to_string();
    db.connection()
        .call(move |conn| select_one(conn, &storage_id, &domain_id))
        .await
        .map_err(map_tr_err)
}

/// Read-modify-write inside one transaction. `None` if the record is missing.
pub async fn update_storage(
    db: &Database,
    storage_id: &str,
    domain_id: &str,
    update: StorageUpdate,
) -> Result<Option<StorageResource>, StrataError> {
    let storage_id = storage_id.to_string();
    let domain_id = domain_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<StorageResource>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let Some(mut resource) = select_one(&tx, &storage_id, &domain_id)? else {
                return Ok(None);
            };
            update.apply(&mut resource);
            let encoded =
                encode(&resource).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            tx.execute(
                "UPDATE storages SET name = ?1, state = ?2, tags = ?3, capability = ?4, \
                 plugin_id = ?5, plugin_info = ?6, deleted_at = ?7 \
                 WHERE storage_id = ?8 AND domain_id = ?9",
                params![
                    resource.name,
                    resource.state.to_string(),
                    encoded.tags,
                    encoded.capability,
                    resource.plugin_info.plugin_id,
                    encoded.plugin_info,
                    encoded.deleted_at,
                    storage_id,
                    domain_id,
                ],
            )?;
            tx.commit()?;
            Ok(Some(resource))
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_storage(
    db: &Database,
    storage_id: &str,
    domain_id: &str,
) -> Result<bool, StrataError> {
    let storage_id = storage_id.to_string();
    let domain_id = domain_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let n = conn.execute(
                "DELETE FROM storages WHERE storage_id = ?1 AND domain_id = ?2",
                params![storage_id, domain_id],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// WHERE clause with positional `?` placeholders and their values, in order.
#[derive(Debug, Default)]
struct Filter {
    clauses: Vec<String>,
    values: Vec<SqlValue>,
}

impl Filter {
    fn push(&mut self, clause: &str, values: impl IntoIterator<Item = SqlValue>) {
        self.clauses.push(clause.to_string());
        self.values.extend(values);
    }

    fn sql(&self) -> String {
        self.clauses.join(" AND ")
    }
}

fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}

/// Escape LIKE wildcards; the pattern is used with `ESCAPE '\'`.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn storage_filter(query: &StorageQuery) -> Filter {
    let mut filter = Filter::default();
    filter.push("domain_id = ?", [text(&query.domain_id)]);
    filter.push("deleted_at IS NULL", []);

    if let Some(storage_id) = &query.storage_id {
        filter.push("storage_id = ?", [text(storage_id)]);
    }
    if let Some(name) = &query.name {
        filter.push("name = ?", [text(name)]);
    }
    if let Some(state) = query.state {
        filter.push("state = ?", [text(&state.to_string())]);
    }
    if let Some(user_id) = &query.user_id {
        filter.push("user_id = ?", [text(user_id)]);
    }
    if let Some(plugin_id) = &query.plugin_id {
        filter.push("plugin_id = ?", [text(plugin_id)]);
    }
    for (key, value) in &query.tags {
        filter.push(
            "EXISTS (SELECT 1 FROM json_each(storages.tags) AS t WHERE t.key = ? AND t.value = ?)",
            [text(key), text(value)],
        );
    }
    if let Some(keyword) = &query.keyword {
        let pattern = like_pattern(keyword);
        filter.push(
            "(lower(storage_id) LIKE ? ESCAPE '\\' OR lower(name) LIKE ? ESCAPE '\\')",
            [text(&pattern), text(&pattern)],
        );
    }
    filter
}

fn sort_column(key: SortKey) -> &'static str {
    match key {
        SortKey::StorageId => "storage_id",
        SortKey::Name => "name",
        SortKey::State => "state",
        SortKey::CreatedAt => "created_at",
    }
}

/// Filtered, sorted page of records plus the total number of matches.
pub async fn query_storages(
    db: &Database,
    query: &StorageQuery,
) -> Result<(Vec<StorageResource>, u64), StrataError> {
    let filter = storage_filter(query);
    let sort = query.sort.unwrap_or_default();
    let direction = if sort.desc { "DESC" } else { "ASC" };
    let column = sort_column(sort.key);
    let (limit, offset) = match query.page {
        Some(page) => (
            i64::try_from(page.limit).unwrap_or(i64::MAX),
            i64::try_from(page.start.saturating_sub(1)).unwrap_or(i64::MAX),
        ),
        None => (-1, 0),
    };

    db.connection()
        .call(move |conn| -> Result<(Vec<StorageResource>, u64), rusqlite::Error> {
            let where_sql = filter.sql();
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM storages WHERE {where_sql}"),
                params_from_iter(filter.values.iter()),
                |row| row.get(0),
            )?;

            let mut values = filter.values.clone();
            values.push(SqlValue::Integer(limit));
            values.push(SqlValue::Integer(offset));
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM storages WHERE {where_sql} \
                 ORDER BY {column} {direction}, storage_id {direction} LIMIT ? OFFSET ?"
            ))?;
            let items = stmt
                .query_map(params_from_iter(values.iter()), row_to_resource)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((items, u64::try_from(total).unwrap_or_default()))
        })
        .await
        .map_err(map_tr_err)
}

pub async fn stat_storages(
    db: &Database,
    query: &StatQuery,
) -> Result<Vec<StatBucket>, StrataError> {
    let column = match query.group_by {
        StatGroupBy::State => "state",
        StatGroupBy::PluginId => "plugin_id",
        StatGroupBy::UserId => "user_id",
    };
    let mut filter = Filter::default();
    filter.push("domain_id = ?", [text(&query.domain_id)]);
    filter.push("deleted_at IS NULL", []);
    if let Some(state) = query.state {
        filter.push("state = ?", [text(&state.to_string())]);
    }

    db.connection()
        .call(move |conn| -> Result<Vec<StatBucket>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {column}, COUNT(*) FROM storages WHERE {} \
                 GROUP BY {column} ORDER BY {column}",
                filter.sql()
            ))?;
            let buckets = stmt
                .query_map(params_from_iter(filter.values.iter()), |row| {
                    let count: i64 = row.get(1)?;
                    Ok(StatBucket {
                        key: row.get(0)?,
                        count: u64::try_from(count).unwrap_or_default(),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(buckets)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Ab"), "%ab%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn filter_keeps_placeholders_and_values_aligned() {
        let mut query = StorageQuery::for_domain("dom-1");
        query.tags.insert("env".into(), "prod".into());
        query.keyword = Some("s1".into());
        let filter = storage_filter(&query);

        let placeholders = filter.sql().matches('?').count();
        assert_eq!(placeholders, filter.values.len());
        assert!(filter.sql().contains("deleted_at IS NULL"));
    }
}
