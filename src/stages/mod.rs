pub mod stage0_normalize;
pub mod stage1_stats;
pub mod stage2_correlate;

pub use stage0_normalize::*;
pub use stage1_stats::*;
pub use stage2_correlate::*;
