//! Persisted reporting artifacts (§6): an `.xlsx` workbook with one sheet per
//! class and one per teacher.

mod xlsx;

pub use xlsx::write_combined_workbook;
