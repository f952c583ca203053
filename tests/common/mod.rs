//! 統合テスト用のフェイク実装

#![allow(dead_code)]

use async_trait::async_trait;
use camp_report::analyzer::{Analyzer, ImageFetcher};
use camp_report::error::{ReportError, Result};
use camp_report::gemini::{GenerativeModel, InlineImage, ModelError};
use camp_report::notify::Notifier;
use camp_report::server::AppState;
use camp_report::store::{Fields, RecordStore, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// モデルごとに応答を固定したフェイク
#[derive(Default)]
pub struct ScriptedModel {
    replies: HashMap<String, std::result::Result<String, String>>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, model: &str, text: &str) -> Self {
        self.replies.insert(model.to_string(), Ok(text.to_string()));
        self
    }

    pub fn fail(mut self, model: &str, reason: &str) -> Self {
        self.replies.insert(model.to_string(), Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(
        &self,
        model: &str,
        _prompt: &str,
        _images: &[InlineImage],
    ) -> std::result::Result<String, ModelError> {
        self.calls.lock().unwrap().push(model.to_string());
        match self.replies.get(model) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(reason)) => Err(ModelError::Request(reason.clone())),
            None => Err(ModelError::Status {
                model: model.to_string(),
                status: 404,
                body: "model not found".to_string(),
            }),
        }
    }
}

/// メモリ上のレコードストア
#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<HashMap<String, Fields>>,
    pub fail_create: bool,
    /// create の前に待つ時間（保存の遅延を再現）
    pub create_delay: Option<Duration>,
    next_id: AtomicUsize,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            create_delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn insert(&self, id: &str, fields: Fields) {
        self.records.lock().unwrap().insert(id.to_string(), fields);
    }

    pub fn fields(&self, id: &str) -> Option<Fields> {
        self.records.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, fields: Fields) -> std::result::Result<String, StoreError> {
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_create {
            return Err(StoreError::Status {
                status: 422,
                body: "INVALID_VALUE_FOR_COLUMN".to_string(),
            });
        }
        let id = format!("rec{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.insert(&id, fields);
        Ok(id)
    }

    async fn get(&self, record_id: &str) -> std::result::Result<Fields, StoreError> {
        self.fields(record_id)
            .ok_or_else(|| StoreError::NotFound(record_id.to_string()))
    }

    async fn update(&self, record_id: &str, fields: Fields) -> std::result::Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(record_id)
            .ok_or_else(|| StoreError::NotFound(record_id.to_string()))?;
        record.extend(fields);
        Ok(())
    }
}

/// URLごとに固定バイト列を返すフェイク（`fail` を含むURLは失敗）
#[derive(Default)]
pub struct StaticFetcher {
    pub calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<InlineImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("fail") {
            return Err(ReportError::ImageFetch {
                url: url.to_string(),
                reason: "HTTP 404".to_string(),
            });
        }
        Ok(InlineImage {
            mime_type: "image/jpeg".to_string(),
            data: url.as_bytes().to_vec(),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub subjects: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, _body: &str) -> Result<()> {
        self.subjects.lock().unwrap().push(subject.to_string());
        Ok(())
    }
}

pub const MODELS: [&str; 2] = ["model-pro", "model-flash"];

/// テスト用の AppState を組み立てる
pub fn state(
    model: Option<Arc<ScriptedModel>>,
    fetcher: Arc<StaticFetcher>,
    store: Option<Arc<MemoryStore>>,
    notifier: Option<Arc<RecordingNotifier>>,
) -> AppState {
    let model = model.map(|m| m as Arc<dyn GenerativeModel>);
    let analyzer = Analyzer::new(
        model,
        fetcher,
        MODELS.iter().map(|m| m.to_string()).collect(),
    );
    AppState {
        analyzer: Arc::new(analyzer),
        store: store.map(|s| s as Arc<dyn RecordStore>),
        notifier: notifier.map(|n| n as Arc<dyn Notifier>),
        storage: None,
        persist_wait: Duration::from_secs(5),
        body_limit_bytes: 10 * 1024 * 1024,
    }
}

/// 80/60/70/50 のモデル応答（コードフェンス・前置き付き）
pub fn fenced_reply() -> String {
    r#"분석 결과입니다.
```json
{
  "total_score": 99,
  "evaluation": {
    "vibe": "감성적인 노을", "vibe_score": 80,
    "hygiene": "개수대 정돈이 아쉽습니다", "hygiene_score": 60,
    "contents": "불멍 존", "contents_score": 70,
    "season": "겨울 사진 부족", "season_score": 50
  },
  "ranking": [
    {"rank": 2, "filename": "input_file_1", "category": "facility", "reason": "깔끔함"},
    {"rank": 1, "filename": "input_file_2", "category": "main", "reason": "노을"}
  ],
  "marketing_comment": "겨울 썸네일을 추가하세요",
  "upsell_needed": true,
  "description": "계곡 옆 캠핑장",
  "one_line_intro": "노을 맛집"
}
```
감사합니다."#
        .to_string()
}
