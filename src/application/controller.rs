use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;
use crate::domain::model::draft::{FormDraft, FormField};
use crate::domain::model::id::RecordId;
use crate::domain::model::record::{BorrowRecord, BorrowStatus};
use crate::domain::repository::BorrowRepository;
use crate::domain::validation::{validate, ValidationErrors};

use super::error::AppError;
use super::store::RecordStore;

/// 一覧の状態フィルタ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Returned,
    NotReturned,
}

impl StatusFilter {
    pub fn matches(&self, status: BorrowStatus) -> bool {
        match self {
            Self::All => true,
            Self::Returned => status == BorrowStatus::Returned,
            Self::NotReturned => status == BorrowStatus::NotReturned,
        }
    }

    /// 派生ビュー。元の一覧は変更しない。
    pub fn apply<'a>(&self, records: &'a [BorrowRecord]) -> Vec<&'a BorrowRecord> {
        records.iter().filter(|r| self.matches(r.status())).collect()
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Returned => f.write_str(BorrowStatus::Returned.as_str()),
            Self::NotReturned => f.write_str(BorrowStatus::NotReturned.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "ALL" | "All" => Ok(Self::All),
            other => match other.parse::<BorrowStatus>()? {
                BorrowStatus::Returned => Ok(Self::Returned),
                BorrowStatus::NotReturned => Ok(Self::NotReturned),
            },
        }
    }
}

/// 入力中のフォーム（下書き + 検証結果）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    draft: FormDraft,
    errors: ValidationErrors,
}

impl FormState {
    fn new(draft: FormDraft) -> Self {
        Self {
            draft,
            errors: ValidationErrors::default(),
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn revalidate(&mut self) -> &ValidationErrors {
        self.errors = validate(&self.draft);
        &self.errors
    }
}

/// モーダルの状態。同時に開けるのは1つだけ。
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Modal {
    #[default]
    Closed,
    Add(FormState),
    Edit {
        id: RecordId,
        selected: BorrowRecord,
        form: FormState,
    },
    Delete {
        id: RecordId,
        selected: BorrowRecord,
    },
}

impl Modal {
    pub fn form(&self) -> Option<&FormState> {
        match self {
            Self::Add(form) | Self::Edit { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// 追加/編集フォーム送信の結果
#[derive(Debug)]
pub enum SubmitOutcome {
    /// 検証エラーで中断。モーダルは開いたまま、通信なし。
    Invalid(ValidationErrors),
    /// サーバが返したレコード
    Saved(BorrowRecord),
    /// 通信失敗（ログ済み）。モーダルは閉じる。
    Failed,
}

#[derive(Debug)]
pub enum DeleteOutcome {
    Removed(RecordId),
    Failed,
}

#[derive(Debug)]
pub enum StatusChange {
    /// 既に同じ状態なので通信しない
    Unchanged,
    Saved(BorrowRecord),
    Failed,
}

enum Pending {
    Create(FormDraft),
    Update(RecordId, BorrowRecord),
}

/// 一覧画面のコントローラ。フィルタ・モーダル・フォーム検証を持ち、
/// 変更はRecordStoreに委譲する。通信エラーはStoreでログ済みのため、ここでは握りつぶす。
pub struct BorrowListController<R: BorrowRepository> {
    store: RecordStore<R>,
    filter: StatusFilter,
    modal: Modal,
}

impl<R: BorrowRepository> BorrowListController<R> {
    pub fn new(store: RecordStore<R>) -> Self {
        Self {
            store,
            filter: StatusFilter::All,
            modal: Modal::Closed,
        }
    }

    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// 最新の一覧から毎回計算するフィルタ済みビュー
    pub fn filtered(&self) -> Vec<&BorrowRecord> {
        self.filter.apply(self.store.records())
    }

    /// 起動時の一括取得。失敗しても一覧は空のまま続行する。
    pub async fn load(&mut self) -> usize {
        match self.store.load_all().await {
            Ok(records) => records.len(),
            Err(_) => 0,
        }
    }

    pub fn open_add(&mut self) {
        self.modal = Modal::Add(FormState::new(FormDraft::default()));
    }

    pub fn open_edit(&mut self, id: &RecordId) -> Result<(), AppError> {
        let selected = self.selected_record(id)?;
        let form = FormState::new(FormDraft::from_record(&selected));
        self.modal = Modal::Edit {
            id: id.clone(),
            selected,
            form,
        };
        Ok(())
    }

    pub fn open_delete(&mut self, id: &RecordId) -> Result<(), AppError> {
        let selected = self.selected_record(id)?;
        self.modal = Modal::Delete {
            id: id.clone(),
            selected,
        };
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.modal = Modal::Closed;
    }

    /// 開いているフォームの1欄を書き換え、検証結果を再計算する。
    pub fn change_field(
        &mut self,
        field: FormField,
        value: &str,
    ) -> Result<&ValidationErrors, AppError> {
        let form = match &mut self.modal {
            Modal::Add(form) | Modal::Edit { form, .. } => form,
            _ => return Err(AppError::NoActiveForm),
        };
        form.draft.set(field, value)?;
        Ok(form.revalidate())
    }

    /// 追加/編集フォームを送信する。検証エラーがあれば通信せずに中断する。
    /// 通信の成否に関わらず、完了後はモーダルを閉じる。
    pub async fn submit(&mut self) -> Result<SubmitOutcome, AppError> {
        let pending = match &mut self.modal {
            Modal::Add(form) => {
                if !form.revalidate().is_empty() {
                    return Ok(SubmitOutcome::Invalid(form.errors.clone()));
                }
                Pending::Create(form.draft.clone())
            }
            Modal::Edit { id, selected, form } => {
                if !form.revalidate().is_empty() {
                    return Ok(SubmitOutcome::Invalid(form.errors.clone()));
                }
                Pending::Update(id.clone(), selected.merged_with(&form.draft))
            }
            _ => return Err(AppError::NoActiveForm),
        };

        let result = match pending {
            Pending::Create(draft) => self.store.create(&draft).await,
            Pending::Update(id, payload) => self.store.update(&id, &payload).await,
        };
        self.modal = Modal::Closed;

        Ok(match result {
            Ok(record) => SubmitOutcome::Saved(record),
            Err(_) => SubmitOutcome::Failed,
        })
    }

    /// 削除確認を実行する。成否に関わらずモーダルを閉じる。
    pub async fn confirm_delete(&mut self) -> Result<DeleteOutcome, AppError> {
        let id = match &self.modal {
            Modal::Delete { id, .. } => id.clone(),
            _ => return Err(AppError::NoPendingDelete),
        };

        let result = self.store.remove(&id).await;
        self.modal = Modal::Closed;

        Ok(match result {
            Ok(()) => DeleteOutcome::Removed(id),
            Err(_) => DeleteOutcome::Failed,
        })
    }

    /// 行のドロップダウンからの状態変更。モーダルも検証も経由しない。
    pub async fn quick_status(
        &mut self,
        id: &RecordId,
        status: BorrowStatus,
    ) -> Result<StatusChange, AppError> {
        let record = self.selected_record(id)?;
        if record.status() == status {
            return Ok(StatusChange::Unchanged);
        }

        let payload = record.with_status(status);
        Ok(match self.store.update(id, &payload).await {
            Ok(saved) => StatusChange::Saved(saved),
            Err(_) => StatusChange::Failed,
        })
    }

    // --- private ---

    fn selected_record(&self, id: &RecordId) -> Result<BorrowRecord, AppError> {
        self.store
            .find(id)
            .cloned()
            .ok_or_else(|| AppError::RecordNotFound(id.clone()))
    }
}
