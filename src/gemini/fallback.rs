//! 候補の順次フォールバック
//!
//! 候補を先頭から1つずつ試し、最初に成功したものを返す。
//! 並列の投機的呼び出しはせず、失敗はログに残して次へ進む。
//! 全滅時は各候補の失敗を保持したエラーを返す（表示は最後の失敗から）。

use std::fmt;
use std::future::Future;

/// 成功した候補
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success<T> {
    pub candidate: String,
    pub index: usize,
    pub value: T,
}

/// 失敗した候補
#[derive(Debug)]
pub struct Failure<E> {
    pub candidate: String,
    pub error: E,
}

/// 全候補の失敗
#[derive(Debug)]
pub struct FallbackError<E> {
    pub failures: Vec<Failure<E>>,
}

impl<E> FallbackError<E> {
    /// 最後に観測した失敗（候補が空なら None）
    pub fn last(&self) -> Option<&Failure<E>> {
        self.failures.last()
    }

    pub fn attempts(&self) -> usize {
        self.failures.len()
    }
}

impl<E: fmt::Display> fmt::Display for FallbackError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last() {
            Some(last) => write!(
                f,
                "{} candidate(s) failed; last ({}): {}",
                self.failures.len(),
                last.candidate,
                last.error
            ),
            None => write!(f, "no candidates configured"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for FallbackError<E> {}

/// 候補を順に試行する
///
/// `attempt` が `Ok` を返した時点で打ち切り、以降の候補は呼ばない。
pub async fn try_in_order<'a, C, T, E, F, Fut>(
    candidates: &'a [C],
    mut attempt: F,
) -> Result<Success<T>, FallbackError<E>>
where
    C: AsRef<str>,
    E: fmt::Display,
    F: FnMut(&'a C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let name = candidate.as_ref();
        match attempt(candidate).await {
            Ok(value) => {
                if index > 0 {
                    tracing::info!(candidate = name, index, "fallback candidate succeeded");
                }
                return Ok(Success {
                    candidate: name.to_string(),
                    index,
                    value,
                });
            }
            Err(error) => {
                tracing::warn!(candidate = name, %error, "candidate failed, trying next");
                failures.push(Failure {
                    candidate: name.to_string(),
                    error,
                });
            }
        }
    }

    Err(FallbackError { failures })
}
