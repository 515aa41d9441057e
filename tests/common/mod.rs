//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use borrow_ledger::application::controller::BorrowListController;
use borrow_ledger::application::store::RecordStore;
use borrow_ledger::domain::model::id::RecordId;
use borrow_ledger::domain::model::record::{BorrowRecord, BorrowStatus};
use borrow_ledger::domain::repository::BorrowRepository;

// =============================================================================
// FakeBackend — テスト用のインメモリRESTコレクション
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FakeError {
    #[error("fake backend unavailable")]
    Unavailable,
    #[error("404 not found: {0}")]
    NotFound(RecordId),
}

/// バックエンドが受け取った呼び出し
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(BorrowRecord),
    Update(RecordId, BorrowRecord),
    Delete(RecordId),
}

#[derive(Default)]
struct FakeState {
    rows: Vec<BorrowRecord>,
    calls: Vec<Call>,
    failing: bool,
    revision: u64,
}

/// 採番・呼び出し記録・障害注入のできるバックエンド。
/// cloneは同じ状態を共有するので、Storeに渡した後も検査できる。
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn with_rows(rows: Vec<BorrowRecord>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().rows = rows;
        backend
    }

    /// 標準的なテスト用データ:
    /// ```text
    /// 1  Dune         Alice  2024-01-05  -           NotReturned
    /// 2  Neuromancer  Bob    2024-01-10  2024-01-20  Returned
    /// 3  Hyperion     Carol  2024-02-01  -           NotReturned  (shelf: "C3")
    /// ```
    pub fn standard() -> Self {
        let hyperion: BorrowRecord = serde_json::from_value(serde_json::json!({
            "id": 3,
            "bookName": "Hyperion",
            "borrower": "Carol",
            "borrowDate": "2024-02-01",
            "status": "NotReturned",
            "shelf": "C3"
        }))
        .unwrap();

        Self::with_rows(vec![
            BorrowRecord::new("Dune", "Alice", "2024-01-05").with_id(1),
            BorrowRecord::new("Neuromancer", "Bob", "2024-01-10")
                .with_id(2)
                .with_return_date("2024-01-20")
                .with_status(BorrowStatus::Returned),
            hyperion,
        ])
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// List以外の（変更系の）呼び出し
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::List))
            .collect()
    }

    pub fn rows(&self) -> Vec<BorrowRecord> {
        self.state.lock().unwrap().rows.clone()
    }

    fn record(&self, call: Call) -> Result<std::sync::MutexGuard<'_, FakeState>, FakeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing {
            return Err(FakeError::Unavailable);
        }
        Ok(state)
    }
}

#[async_trait]
impl BorrowRepository for FakeBackend {
    type Error = FakeError;

    async fn list(&self) -> Result<Vec<BorrowRecord>, Self::Error> {
        let state = self.record(Call::List)?;
        Ok(state.rows.clone())
    }

    async fn create(&self, record: &BorrowRecord) -> Result<BorrowRecord, Self::Error> {
        let mut state = self.record(Call::Create(record.clone()))?;
        let id = uuid::Uuid::new_v4().simple().to_string()[..4].to_string();
        let created = record.clone().with_id(id);
        state.rows.push(created.clone());
        Ok(created)
    }

    /// 保存後の表現を返す。サーバ側で `revision` を付与する。
    async fn update(&self, id: &RecordId, record: &BorrowRecord) -> Result<BorrowRecord, Self::Error> {
        let mut state = self.record(Call::Update(id.clone(), record.clone()))?;
        state.revision += 1;
        let mut json = serde_json::to_value(record).unwrap();
        json["revision"] = serde_json::json!(state.revision);
        let saved: BorrowRecord = serde_json::from_value(json).unwrap();

        let row = state
            .rows
            .iter_mut()
            .find(|r| r.has_id(id))
            .ok_or_else(|| FakeError::NotFound(id.clone()))?;
        *row = saved.clone();
        Ok(saved)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), Self::Error> {
        let mut state = self.record(Call::Delete(id.clone()))?;
        let before = state.rows.len();
        state.rows.retain(|r| !r.has_id(id));
        if state.rows.len() == before {
            return Err(FakeError::NotFound(id.clone()));
        }
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// 読み込み済みのStoreを返す。
pub async fn loaded_store(backend: &FakeBackend) -> RecordStore<FakeBackend> {
    let mut store = RecordStore::new(backend.clone());
    store.load_all().await.unwrap();
    store
}

/// 読み込み済みのControllerを返す。
pub async fn loaded_controller(backend: &FakeBackend) -> BorrowListController<FakeBackend> {
    let mut ctl = BorrowListController::new(RecordStore::new(backend.clone()));
    ctl.load().await;
    ctl
}

/// 一覧のid列（文字列表現）
pub fn ids(records: &[BorrowRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.id().map(|id| id.to_string()).unwrap_or_default())
        .collect()
}
