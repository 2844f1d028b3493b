//! Built-in stages.

mod convention;
mod terraform;

pub use convention::{ConventionBuild, ConventionScan, ConventionStubs};
pub use terraform::{
    namespace_vars, ConventionTerraformApply, ConventionTerraformDestroy, ConventionTerraformInit,
    ConventionTerraformOutputs, ConventionTerraformPlan,
};
