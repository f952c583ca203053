//! Airtable REST API 実装

use super::{Fields, RecordStore, StoreError};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.airtable.com/v0";

pub struct AirtableStore {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    base_id: String,
    table: String,
}

#[derive(Deserialize)]
struct RecordResponse {
    id: String,
    #[serde(default)]
    fields: Fields,
}

impl AirtableStore {
    pub fn new(
        api_key: String,
        base_id: String,
        table: String,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            base_id,
            table,
        })
    }

    /// テスト用サーバー等に向ける
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// テーブル名は空白や日本語を含みうるのでセグメント単位でエンコードする
    fn url(&self, record_id: Option<&str>) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| StoreError::Request(format!("invalid api base: {}", e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Request("api base cannot be a base".into()))?;
            segments.pop_if_empty().push(&self.base_id).push(&self.table);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        record_id: Option<&str>,
    ) -> Result<RecordResponse, StoreError> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(record_id.unwrap_or(&self.table).to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        response
            .json::<RecordResponse>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn create(&self, fields: Fields) -> Result<String, StoreError> {
        let url = self.url(None)?;
        let body = json!({ "fields": fields, "typecast": true });
        let record = self.send(self.http.post(url).json(&body), None).await?;
        Ok(record.id)
    }

    async fn get(&self, record_id: &str) -> Result<Fields, StoreError> {
        let url = self.url(Some(record_id))?;
        let record = self.send(self.http.get(url), Some(record_id)).await?;
        Ok(record.fields)
    }

    async fn update(&self, record_id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.url(Some(record_id))?;
        let body = json!({ "fields": fields, "typecast": true });
        self.send(self.http.patch(url).json(&body), Some(record_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AirtableStore {
        AirtableStore::new(
            "pat".into(),
            "app123".into(),
            "Analysis Results".into(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_table_url_is_encoded() {
        let url = store().url(None).unwrap();
        assert_eq!(url.as_str(), "https://api.airtable.com/v0/app123/Analysis%20Results");
    }

    #[test]
    fn test_record_url() {
        let url = store()
            .with_api_base("http://127.0.0.1:9999/v0/")
            .url(Some("recABC"))
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9999/v0/app123/Analysis%20Results/recABC");
    }
}
