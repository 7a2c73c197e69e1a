//! Supabase REST client for the discovery tables.
//!
//! Thin pass-through to the hosted database's HTTP API. Call failures
//! are logged and treated as no-ops; idempotency across runs comes from
//! the store's upsert-by-key semantics, not from anything here.

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::time::Duration;

use super::types::{GroupTarget, Tournament};

const PROVIDER: &str = "gotsport";
const TOURNAMENTS_TABLE: &str = "tournament_sources";
const TARGETS_TABLE: &str = "scrape_targets";
const REQUEST_TIMEOUT_SECONDS: u64 = 30;

pub struct SupabaseStore {
    client: Client,
    base_url: String,
}

impl SupabaseStore {
    pub fn new(url: &str, service_role_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key_value =
            HeaderValue::from_str(service_role_key).context("Invalid service role key")?;
        headers.insert("apikey", key_value);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", service_role_key))
                .context("Invalid service role key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .default_headers(headers)
            .build()
            .context("Failed to build Supabase client")?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// SELECT rows matching the given filter params. Failures yield an
    /// empty list.
    pub async fn select(&self, table: &str, params: &[(&str, &str)]) -> Vec<Value> {
        let result = async {
            let rows: Vec<Value> = self
                .client
                .get(self.table_url(table))
                .query(params)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, reqwest::Error>(rows)
        }
        .await;

        match result {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Supabase SELECT error on {}: {}", table, e);
                Vec::new()
            }
        }
    }

    /// UPSERT one row, optionally resolving conflicts on the given
    /// column set. Returns the stored row, or `None` on failure.
    pub async fn upsert(&self, table: &str, data: &Value, on_conflict: Option<&str>) -> Option<Value> {
        let mut request = self.client.post(self.table_url(table)).json(data);
        if let Some(conflict_target) = on_conflict {
            request = request
                .query(&[("on_conflict", conflict_target)])
                .header("Prefer", "resolution=merge-duplicates,return=representation");
        }

        let result = async {
            let body: Value = request
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, reqwest::Error>(body)
        }
        .await;

        match result {
            // PostgREST returns a one-element array under return=representation
            Ok(Value::Array(mut rows)) if !rows.is_empty() => Some(rows.remove(0)),
            Ok(other) => Some(other),
            Err(e) => {
                tracing::error!("Supabase UPSERT error on {}: {}", table, e);
                None
            }
        }
    }

    /// PATCH rows where `match_column` equals `match_value`.
    pub async fn update(
        &self,
        table: &str,
        data: &Value,
        match_column: &str,
        match_value: &str,
    ) -> bool {
        let result = async {
            self.client
                .patch(self.table_url(table))
                .query(&[(match_column, &format!("eq.{}", match_value))])
                .json(data)
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, reqwest::Error>(())
        }
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Supabase UPDATE error on {}: {}", table, e);
                false
            }
        }
    }

    /// Save or refresh a tournament; returns the store's row id.
    /// Existing rows (matched by event id) get their name and state
    /// patched; new rows are inserted with the provider tag.
    pub async fn save_tournament(&self, tournament: &Tournament) -> Option<String> {
        let filter = format!("eq.{}", tournament.event_id);
        let existing = self
            .select(TOURNAMENTS_TABLE, &[("event_id", &filter), ("select", "id")])
            .await;

        if let Some(row) = existing.first() {
            self.update(
                TOURNAMENTS_TABLE,
                &json!({
                    "name": tournament.name,
                    "state": tournament.state,
                }),
                "event_id",
                &tournament.event_id,
            )
            .await;
            return row.get("id").and_then(Value::as_str).map(String::from);
        }

        let inserted = self
            .upsert(
                TOURNAMENTS_TABLE,
                &json!({
                    "event_id": tournament.event_id,
                    "name": tournament.name,
                    "state": tournament.state,
                    "provider": PROVIDER,
                }),
                None,
            )
            .await?;
        inserted.get("id").and_then(Value::as_str).map(String::from)
    }

    /// Upsert one group as an active scrape target, keyed on the
    /// (event id, group id) pair.
    pub async fn save_scrape_target(
        &self,
        tournament_id: &str,
        group: &GroupTarget,
        state: Option<&str>,
    ) -> bool {
        let data = json!({
            "tournament_id": tournament_id,
            "event_id": group.event_id,
            "group_id": group.group_id,
            "url": group.url,
            "age_group": group.age_group,
            "gender": group.gender,
            "division_name": group.division_name,
            "state": state,
            "is_active": true,
        });

        self.upsert(TARGETS_TABLE, &data, Some("event_id,group_id"))
            .await
            .is_some()
    }
}
