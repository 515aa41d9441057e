use crate::domain::model::draft::FormField;
use crate::domain::model::record::BorrowRecord;
use crate::domain::repository::BorrowRepository;

use super::controller::{BorrowListController, FormState, Modal, StatusFilter};

/// 一覧画面（表 + 開いているモーダル）をMarkdownに描画する。
/// 状態変更の後、常に最新の一覧から再計算して描画する。
pub struct ListView;

impl ListView {
    pub fn render<R: BorrowRepository>(controller: &BorrowListController<R>) -> String {
        let mut buf = Self::render_table(
            &controller.filtered(),
            controller.filter(),
            controller.store().records().len(),
        );
        let modal = Self::render_modal(controller.modal());
        if !modal.is_empty() {
            buf.push('\n');
            buf.push_str(&modal);
        }
        buf
    }

    /// フィルタ済みの行を表にする。0件なら空表示の行を1つ出す。
    pub fn render_table(rows: &[&BorrowRecord], filter: StatusFilter, total: usize) -> String {
        let mut buf = String::from("# Borrow records\n\n");
        buf.push_str(&format!(
            "Filter: {} ({} of {} shown)\n\n",
            filter,
            rows.len(),
            total
        ));
        buf.push_str("| ID | Book | Borrower | Borrowed | Returned on | Status |\n");
        buf.push_str("|----|------|----------|----------|-------------|--------|\n");

        if rows.is_empty() {
            buf.push_str("| | No records | | | | |\n");
        }
        for record in rows {
            buf.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                record.id().map(|id| id.to_string()).unwrap_or_default(),
                cell(record.book_name()),
                cell(record.borrower()),
                cell(record.borrow_date()),
                cell(record.return_date().unwrap_or_default()),
                record.status()
            ));
        }
        buf
    }

    /// 開いているモーダルを描画する。閉じていれば空文字列。
    pub fn render_modal(modal: &Modal) -> String {
        match modal {
            Modal::Closed => String::new(),
            Modal::Add(form) => Self::render_form("Add borrow record", form),
            Modal::Edit { id, form, .. } => {
                Self::render_form(&format!("Edit borrow record {id}"), form)
            }
            Modal::Delete { selected, .. } => format!(
                "## Confirm delete\n\nDelete the borrow record **{}** of **{}**?\n",
                selected.book_name(),
                selected.borrower()
            ),
        }
    }

    fn render_form(title: &str, form: &FormState) -> String {
        let mut buf = format!("## {title}\n\n");
        for field in FormField::ALL {
            let value = form.draft().value(field);
            let value = if value.is_empty() { "(empty)" } else { value };
            buf.push_str(&format!("- {}: {}", field.label(), value));
            if let Some(message) = form.errors().get(field) {
                buf.push_str(&format!(" [error: {message}]"));
            }
            buf.push('\n');
        }
        buf
    }
}

/// 表のセルを壊す文字を無害化する。
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::id::RecordId;
    use crate::domain::model::record::BorrowStatus;

    #[test]
    fn empty_view_renders_placeholder_row() {
        let table = ListView::render_table(&[], StatusFilter::Returned, 1);
        assert!(table.contains("Filter: Returned (0 of 1 shown)"));
        assert!(table.contains("| | No records | | | | |"));
    }

    #[test]
    fn pipes_in_values_are_escaped() {
        let record = BorrowRecord::new("A|B", "X", "2024-01-01")
            .with_id(4)
            .with_status(BorrowStatus::Returned);
        let table = ListView::render_table(&[&record], StatusFilter::All, 1);
        assert!(table.contains("| 4 | A\\|B | X | 2024-01-01 |  | Returned |"));
        assert!(!table.contains("No records"));
    }

    #[test]
    fn closed_modal_renders_nothing() {
        assert!(ListView::render_modal(&Modal::Closed).is_empty());
    }

    #[test]
    fn delete_modal_names_book_and_borrower() {
        let selected = BorrowRecord::new("Dune", "Alice", "2024-01-05").with_id(1);
        let out = ListView::render_modal(&Modal::Delete {
            id: RecordId::from(1),
            selected,
        });
        assert!(out.contains("**Dune** of **Alice**"));
    }
}
