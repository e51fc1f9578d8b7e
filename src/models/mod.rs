pub mod dataset;
pub mod record;
pub mod run_date;
pub mod vocabulary;

pub use dataset::*;
pub use record::*;
pub use run_date::*;
pub use vocabulary::*;
