use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::record::{BorrowRecord, BorrowStatus};
use crate::domain::error::DomainError;

/// フォームの入力欄。検証エラーのキーにもなる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    BookName,
    Borrower,
    BorrowDate,
    ReturnDate,
    Status,
}

impl FormField {
    /// フォーム上の表示順
    pub const ALL: [FormField; 5] = [
        FormField::BookName,
        FormField::Borrower,
        FormField::BorrowDate,
        FormField::ReturnDate,
        FormField::Status,
    ];

    /// JSON上のフィールド名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookName => "bookName",
            Self::Borrower => "borrower",
            Self::BorrowDate => "borrowDate",
            Self::ReturnDate => "returnDate",
            Self::Status => "status",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BookName => "Book name",
            Self::Borrower => "Borrower",
            Self::BorrowDate => "Borrow date",
            Self::ReturnDate => "Return date",
            Self::Status => "Status",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bookName" | "book_name" => Ok(Self::BookName),
            "borrower" => Ok(Self::Borrower),
            "borrowDate" | "borrow_date" => Ok(Self::BorrowDate),
            "returnDate" | "return_date" => Ok(Self::ReturnDate),
            "status" => Ok(Self::Status),
            other => Err(DomainError::UnknownField(other.to_string())),
        }
    }
}

/// 追加/編集フォームの入力中の値。永続化されず、検証済みの内容だけがStoreへ渡る。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub book_name: String,
    pub borrower: String,
    pub borrow_date: String,
    /// 空文字列は「未返却日」を表す
    pub return_date: String,
    pub status: BorrowStatus,
}

impl FormDraft {
    /// 既存レコードの値で下書きを作る（欠けている値は空文字列）。
    pub fn from_record(record: &BorrowRecord) -> Self {
        Self {
            book_name: record.book_name().to_string(),
            borrower: record.borrower().to_string(),
            borrow_date: record.borrow_date().to_string(),
            return_date: record.return_date().unwrap_or_default().to_string(),
            status: record.status(),
        }
    }

    /// 1欄を書き換える。statusは既知の値のみ受け付ける。
    pub fn set(&mut self, field: FormField, value: &str) -> Result<(), DomainError> {
        match field {
            FormField::BookName => self.book_name = value.to_string(),
            FormField::Borrower => self.borrower = value.to_string(),
            FormField::BorrowDate => self.borrow_date = value.to_string(),
            FormField::ReturnDate => self.return_date = value.to_string(),
            FormField::Status => self.status = value.parse()?,
        }
        Ok(())
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::BookName => &self.book_name,
            FormField::Borrower => &self.borrower,
            FormField::BorrowDate => &self.borrow_date,
            FormField::ReturnDate => &self.return_date,
            FormField::Status => self.status.as_str(),
        }
    }

    /// 新規作成用のペイロード（id未採番）
    pub fn to_record(&self) -> BorrowRecord {
        BorrowRecord::new(&*self.book_name, &*self.borrower, self.borrow_date.trim())
            .with_return_date(&*self.return_date)
            .with_status(self.status)
    }
}
