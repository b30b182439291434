pub mod basis;
pub mod clock;
pub mod error;
pub mod eval;
pub mod period;

pub use basis::{ReportRecord, ReportStatus, WarrantyBasis};
pub use error::Error;
pub use eval::{compute_all, compute_standard, PeriodState, PeriodStatus, WarrantyReport};
pub use period::{PeriodKind, Schedule};
