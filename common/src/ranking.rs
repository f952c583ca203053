//! 位置参照ファイル名（`input_file_<n>`）の生成と解決
//!
//! モデルには実ファイル名を見せず、アップロード順の連番で画像を参照させる。
//! `input_file_<n>` は 1 始まりで、元の並び順の `n-1` 番目を指す。

use lazy_static::lazy_static;
use regex::Regex;

const POSITIONAL_PREFIX: &str = "input_file_";

lazy_static! {
    /// 末尾の整数（拡張子付きも許容）
    static ref TRAILING_INDEX: Regex = Regex::new(r"(\d+)(?:\.[A-Za-z0-9]+)?\s*$").unwrap();
}

/// 0始まりのインデックスから位置参照名を生成
pub fn positional_label(index: usize) -> String {
    format!("{}{}", POSITIONAL_PREFIX, index + 1)
}

/// 位置参照名から 1 始まりの番号を取り出す
pub fn parse_positional_index(filename: &str) -> Option<usize> {
    TRAILING_INDEX
        .captures(filename)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
}

/// 位置参照名を元の並びの要素に解決する（範囲外は None）
pub fn resolve_positional<'a, T>(filename: &str, items: &'a [T]) -> Option<&'a T> {
    let n = parse_positional_index(filename)?;
    if n == 0 {
        return None;
    }
    items.get(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_label() {
        assert_eq!(positional_label(0), "input_file_1");
        assert_eq!(positional_label(9), "input_file_10");
    }

    #[test]
    fn test_parse_positional_index() {
        assert_eq!(parse_positional_index("input_file_3"), Some(3));
        assert_eq!(parse_positional_index("input_file_12.jpg"), Some(12));
        assert_eq!(parse_positional_index("input_file_"), None);
        assert_eq!(parse_positional_index("main photo"), None);
    }

    #[test]
    fn test_resolve_positional() {
        let urls = vec!["a.jpg", "b.jpg", "c.jpg"];
        assert_eq!(resolve_positional("input_file_1", &urls), Some(&"a.jpg"));
        assert_eq!(resolve_positional("input_file_3", &urls), Some(&"c.jpg"));
    }

    #[test]
    fn test_resolve_positional_out_of_range() {
        let urls = vec!["a.jpg", "b.jpg"];
        assert_eq!(resolve_positional("input_file_0", &urls), None);
        assert_eq!(resolve_positional("input_file_3", &urls), None);
        assert_eq!(resolve_positional("cover", &urls), None);

        let empty: Vec<&str> = Vec::new();
        assert_eq!(resolve_positional("input_file_1", &empty), None);
    }

    #[test]
    fn test_label_roundtrip_indexes_original_order() {
        let items = vec![10, 20, 30, 40];
        for (i, item) in items.iter().enumerate() {
            assert_eq!(resolve_positional(&positional_label(i), &items), Some(item));
        }
    }
}
