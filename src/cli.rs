use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shade-match")]
#[command(about = "肌のトーン・アンダートーンに合うファンデーション/コンシーラーを推薦", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// シェードカタログ（CSV/Excel、設定ファイルより優先）
    #[arg(short, long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 肌情報を手入力して推薦
    Manual {
        /// トーン（fair, light, medium, medium-dark, deep など）
        #[arg(short, long)]
        tone: String,

        /// アンダートーン（cool, neutral, warm, olive, golden など）
        #[arg(short, long)]
        undertone: String,

        /// 肌質（表示のみ）
        #[arg(short, long, default_value = "")]
        skin_type: String,

        /// 肌の色見本（#RRGGBB）
        #[arg(long)]
        color: Option<String>,

        /// 推薦件数（設定ファイルより優先）
        #[arg(short = 'n', long)]
        max_results: Option<usize>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 画像解析サービスの返答JSONから推薦
    Photo {
        /// 返答テキストのファイル（`-` で標準入力）
        #[arg(required = true)]
        response: PathBuf,

        /// 推薦件数（設定ファイルより優先）
        #[arg(short = 'n', long)]
        max_results: Option<usize>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// ラベルの正規化結果を表示
    Normalize {
        /// ラベルの種類
        #[arg(value_enum)]
        kind: LabelKind,

        /// 正規化するラベル
        #[arg(required = true)]
        label: String,
    },

    /// カタログの読み込み結果を表示
    Catalog {
        /// スキップした行を表示
        #[arg(long)]
        dropped: bool,
    },

    /// 設定を表示/編集
    Config {
        /// カタログパスを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 推薦件数を設定
        #[arg(long)]
        set_max_results: Option<usize>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LabelKind {
    Tone,
    Undertone,
}
