use async_trait::async_trait;

use super::model::id::RecordId;
use super::model::record::BorrowRecord;

/// 貸出コレクション（リモート）の抽象。Infra層が実装する。
///
/// 返却されるレコードはバックエンド側の表現であり、送信した値と異なり得る。
#[async_trait]
pub trait BorrowRepository: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn list(&self) -> Result<Vec<BorrowRecord>, Self::Error>;
    async fn create(&self, record: &BorrowRecord) -> Result<BorrowRecord, Self::Error>;
    async fn update(&self, id: &RecordId, record: &BorrowRecord)
        -> Result<BorrowRecord, Self::Error>;
    async fn delete(&self, id: &RecordId) -> Result<(), Self::Error>;
}
