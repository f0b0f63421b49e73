// ── Object tables and their owners ──

mod precedence;
mod shared;
mod table;

pub use precedence::{Ordered, PrecedenceTable};
pub use shared::SharedTable;
pub use table::{Expiring, Table};
