//! Layout engine: printable range, pagination and page styling

mod engine;
pub mod font;
mod pagination;
mod range;

pub use engine::{LayoutConstraints, LayoutState, PageStyle, PlannedPage, PrintPlan};
pub use font::FontTier;
pub use pagination::{paginate, PageLayout, PaginationRules};
pub use range::{reduce_to_printable, PrintableRange};
