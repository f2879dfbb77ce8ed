#![warn(clippy::uninlined_format_args)]

pub mod currency;
pub mod ledger_presenter;
pub mod report_presenter;
pub mod text_table;

pub use currency::{CurrencyFormat, DEFAULT_CURRENCY_SYMBOL};
pub use ledger_presenter::LedgerPresenter;
pub use report_presenter::SpendingReportPresenter;
