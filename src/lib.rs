//! 貸出記録（本・借り手・貸出日/返却日・返却状態）の一覧/フォーム管理。
//!
//! - `domain`: レコード・下書き・検証ルール、リモートコレクションの抽象
//! - `application`: Record Store とリスト/フォームコントローラ、Markdown描画
//! - `infra`: REST バックエンド実装
//! - `interface`: MCP (stdio) サーバ

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod interface;
