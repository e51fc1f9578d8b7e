pub mod error;
pub mod io;
pub mod models;
pub mod stages;

pub use error::PipelineError;
pub use io::{read_merged_table, write_merged_table};
pub use models::{AnnotationRecord, Dataset, Plurality, RunDate};
pub use stages::{
    execute_stage1, execute_stage2, normalize, percent, NormalizeConfig, Stage1Config,
    Stage2Config,
};
