use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::draft::{FormDraft, FormField};

pub const BOOK_NAME_REQUIRED: &str = "book name required";
pub const BORROWER_REQUIRED: &str = "borrower name required";
pub const BORROW_DATE_REQUIRED: &str = "borrow date required";
pub const BORROW_DATE_INVALID: &str = "borrow date must be a valid date (YYYY-MM-DD)";
pub const RETURN_DATE_INVALID: &str = "return date must be a valid date (YYYY-MM-DD)";
pub const RETURN_BEFORE_BORROW: &str = "return date must be on or after borrow date";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 欄ごとの検証メッセージ。エントリが無い欄は現在有効。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<FormField, &'static str>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    fn insert(&mut self, field: FormField, message: &'static str) {
        self.0.insert(field, message);
    }
}

/// 下書きを検証する。副作用なし。入力の度と送信時に呼ばれる。
pub fn validate(draft: &FormDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if draft.book_name.trim().is_empty() {
        errors.insert(FormField::BookName, BOOK_NAME_REQUIRED);
    }
    if draft.borrower.trim().is_empty() {
        errors.insert(FormField::Borrower, BORROWER_REQUIRED);
    }

    let borrow_date = match draft.borrow_date.trim() {
        "" => {
            errors.insert(FormField::BorrowDate, BORROW_DATE_REQUIRED);
            None
        }
        s => parse_date(s).or_else(|| {
            errors.insert(FormField::BorrowDate, BORROW_DATE_INVALID);
            None
        }),
    };

    let return_date = match draft.return_date.trim() {
        "" => None,
        s => parse_date(s).or_else(|| {
            errors.insert(FormField::ReturnDate, RETURN_DATE_INVALID);
            None
        }),
    };

    if let (Some(borrowed), Some(returned)) = (borrow_date, return_date) {
        if returned < borrowed {
            errors.insert(FormField::ReturnDate, RETURN_BEFORE_BORROW);
        }
    }

    errors
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}
