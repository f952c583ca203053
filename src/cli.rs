use camp_report_common::LeadAction;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "camp-report")]
#[command(about = "キャンプ場写真AI診断・成長レポート", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTP APIサーバーを起動
    Serve {
        /// 待ち受けアドレス（省略時は設定値）
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// 写真フォルダを診断
    Analyze {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// キャンプ場名
        #[arg(short, long)]
        name: String,

        /// 住所
        #[arg(short, long, default_value = "")]
        address: String,

        /// レジャータグ（カンマ区切り）
        #[arg(long, value_delimiter = ',')]
        leisure: Vec<String>,

        /// 設備タグ（カンマ区切り）
        #[arg(long, value_delimiter = ',')]
        facility: Vec<String>,

        /// 体験タグ（カンマ区切り）
        #[arg(long, value_delimiter = ',')]
        activity: Vec<String>,

        /// 診断結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// レコードストアに保存しない
        #[arg(long)]
        no_save: bool,
    },

    /// 保存済みレポートを表示
    Report {
        /// レコードID
        #[arg(required = true)]
        record_id: String,
    },

    /// 後続アクションを記録
    Lead {
        /// レコードID
        #[arg(required = true)]
        record_id: String,

        /// アクション（省略時は対話選択）
        #[arg(short, long)]
        action: Option<LeadAction>,
    },

    /// 共有トークンを生成
    Share {
        /// レポートJSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
