//! モデルフォールバックのテスト

mod common;

use camp_report::gemini::{generate_with_fallback, try_in_order, ModelError};
use common::ScriptedModel;
use std::sync::atomic::{AtomicUsize, Ordering};

fn candidates(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// 成功した候補以降は呼ばれない
#[tokio::test]
async fn test_stops_at_first_success() {
    let calls = AtomicUsize::new(0);
    let list = candidates(&["a", "b", "c"]);

    let result = try_in_order(&list, |name| {
        calls.fetch_add(1, Ordering::SeqCst);
        let name = name.clone();
        async move {
            if name == "b" {
                Ok(format!("{} ok", name))
            } else {
                Err(format!("{} down", name))
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(result.candidate, "b");
    assert_eq!(result.index, 1);
    assert_eq!(result.value, "b ok");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// 全滅時は最後の失敗を報告し、全候補の失敗を保持する
#[tokio::test]
async fn test_reports_last_failure() {
    let list = candidates(&["pro", "flash", "lite"]);
    let err = try_in_order(&list, |name| {
        let name = name.clone();
        async move { Err::<(), _>(format!("{} quota", name)) }
    })
    .await
    .unwrap_err();

    assert_eq!(err.attempts(), 3);
    let last = err.last().unwrap();
    assert_eq!(last.candidate, "lite");
    assert_eq!(last.error, "lite quota");
    assert!(err.to_string().contains("lite quota"));
}

#[tokio::test]
async fn test_blank_reply_counts_as_failure() {
    let model = ScriptedModel::new()
        .reply("m1", "\n  \n")
        .reply("m2", "{\"evaluation\": {}}");

    let reply = generate_with_fallback(&model, &candidates(&["m1", "m2"]), "prompt", &[])
        .await
        .unwrap();

    assert_eq!(reply.model, "m2");
    assert_eq!(model.calls(), vec!["m1", "m2"]);
}

#[tokio::test]
async fn test_exhausted_keeps_model_errors() {
    let model = ScriptedModel::new().fail("m1", "timeout");

    let err = generate_with_fallback(&model, &candidates(&["m1", "m2"]), "prompt", &[])
        .await
        .unwrap_err();

    assert_eq!(err.attempts(), 2);
    assert!(matches!(err.failures[0].error, ModelError::Request(_)));
    assert!(matches!(err.failures[1].error, ModelError::Status { status: 404, .. }));
}
