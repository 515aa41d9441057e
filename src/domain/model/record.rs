use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::draft::FormDraft;
use super::id::RecordId;
use crate::domain::error::DomainError;

/// 返却状態。旧データのベトナム語ラベルも読み込み時に受け付ける。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorrowStatus {
    #[default]
    #[serde(alias = "Chưa trả")]
    NotReturned,
    #[serde(alias = "Đã trả")]
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReturned => "NotReturned",
            Self::Returned => "Returned",
        }
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BorrowStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "NotReturned" | "not_returned" | "not-returned" | "Chưa trả" => Ok(Self::NotReturned),
            "Returned" | "returned" | "Đã trả" => Ok(Self::Returned),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// 1件の貸出記録。Record Storeが所有し、バックエンドの返却値が正となる。
///
/// 未知のフィールドは `extra` にそのまま保持し、更新時に送り返す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RecordId>,
    #[serde(default, deserialize_with = "null_as_default")]
    book_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    borrower: String,
    #[serde(default, deserialize_with = "null_as_default")]
    borrow_date: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    return_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    status: BorrowStatus,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl BorrowRecord {
    /// 未採番（idなし）のレコードを作る。
    pub fn new(
        book_name: impl Into<String>,
        borrower: impl Into<String>,
        borrow_date: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            book_name: book_name.into(),
            borrower: borrower.into(),
            borrow_date: borrow_date.into(),
            return_date: None,
            status: BorrowStatus::NotReturned,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_return_date(mut self, return_date: impl Into<String>) -> Self {
        self.return_date = non_empty_date(&return_date.into());
        self
    }

    pub fn with_status(mut self, status: BorrowStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    pub fn book_name(&self) -> &str {
        &self.book_name
    }

    pub fn borrower(&self) -> &str {
        &self.borrower
    }

    pub fn borrow_date(&self) -> &str {
        &self.borrow_date
    }

    pub fn return_date(&self) -> Option<&str> {
        self.return_date.as_deref()
    }

    pub fn status(&self) -> BorrowStatus {
        self.status
    }

    /// バックエンド固有の追加フィールド
    pub fn extra(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extra
    }

    /// idが一致するか（文字列表現で比較）
    pub fn has_id(&self, id: &RecordId) -> bool {
        self.id.as_ref() == Some(id)
    }

    /// 自身に下書きを浅くマージした更新ペイロード。下書き側が優先され、idと追加フィールドは残る。
    pub fn merged_with(&self, draft: &FormDraft) -> Self {
        Self {
            id: self.id.clone(),
            book_name: draft.book_name.clone(),
            borrower: draft.borrower.clone(),
            borrow_date: draft.borrow_date.trim().to_string(),
            return_date: non_empty_date(&draft.return_date),
            status: draft.status,
            extra: self.extra.clone(),
        }
    }
}

/// 日付は前後の空白を除いて保存する。空なら未設定。
fn non_empty_date(s: &str) -> Option<String> {
    Some(s.trim()).filter(|d| !d.is_empty()).map(str::to_string)
}

/// `null` を欠損と同様に既定値として読む。
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
