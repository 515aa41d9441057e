use crate::domain::model::draft::FormDraft;
use crate::domain::model::id::RecordId;
use crate::domain::model::record::BorrowRecord;
use crate::domain::repository::BorrowRepository;

use super::error::AppError;

/// リモートコレクションと同期するローカルの貸出記録一覧。
/// remote → 成功時のみローカルを部分更新、のパターンで操作する（再取得はしない）。
pub struct RecordStore<R: BorrowRepository> {
    repo: R,
    records: Vec<BorrowRecord>,
}

impl<R: BorrowRepository> RecordStore<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            records: Vec::new(),
        }
    }

    /// バックエンド順（新規作成分は先頭）の一覧
    pub fn records(&self) -> &[BorrowRecord] {
        &self.records
    }

    pub fn find(&self, id: &RecordId) -> Option<&BorrowRecord> {
        self.records.iter().find(|r| r.has_id(id))
    }

    /// 全件を取得して一覧を置き換える。失敗時は一覧を変更しない。
    pub async fn load_all(&mut self) -> Result<&[BorrowRecord], AppError> {
        let records = self.repo.list().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to load borrow records");
            Self::network(e)
        })?;
        tracing::info!(count = records.len(), "loaded borrow records");
        self.records = records;
        Ok(&self.records)
    }

    /// 下書きを送信し、採番済みのレコードを一覧の先頭に追加する。
    pub async fn create(&mut self, draft: &FormDraft) -> Result<BorrowRecord, AppError> {
        let created = self.repo.create(&draft.to_record()).await.map_err(|e| {
            tracing::warn!(error = %e, "failed to create borrow record");
            Self::network(e)
        })?;
        tracing::debug!(id = ?created.id(), "created borrow record");
        self.records.insert(0, created.clone());
        Ok(created)
    }

    /// レコード全体を送信し、idが一致するローカル要素をサーバの返却値で置き換える。
    pub async fn update(
        &mut self,
        id: &RecordId,
        patch: &BorrowRecord,
    ) -> Result<BorrowRecord, AppError> {
        let saved = self.repo.update(id, patch).await.map_err(|e| {
            tracing::warn!(error = %e, %id, "failed to update borrow record");
            Self::network(e)
        })?;
        for record in self.records.iter_mut().filter(|r| r.has_id(id)) {
            *record = saved.clone();
        }
        tracing::debug!(%id, "updated borrow record");
        Ok(saved)
    }

    /// リモートで削除してから、idが一致するローカル要素を取り除く。
    pub async fn remove(&mut self, id: &RecordId) -> Result<(), AppError> {
        self.repo.delete(id).await.map_err(|e| {
            tracing::warn!(error = %e, %id, "failed to delete borrow record");
            Self::network(e)
        })?;
        self.records.retain(|r| !r.has_id(id));
        tracing::debug!(%id, "deleted borrow record");
        Ok(())
    }

    // --- private ---

    fn network(e: R::Error) -> AppError {
        AppError::Network(Box::new(e))
    }
}
