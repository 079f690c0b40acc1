//! Store Report Common Library
//!
//! ネットワークに依存しない型・グルーピング・日付解析・レイアウト計算

pub mod types;
pub mod layout;
pub mod error;
pub mod grouping;
pub mod dates;
pub mod export;

pub use types::{ImageStatus, ReportRow, ResolvedItem, StoreDateGroup, TextField};
pub use layout::PdfLayout;
pub use error::{Error, Result};
pub use grouping::{group_rows, DuplicatePolicy};
pub use dates::parse_sheet_date;
