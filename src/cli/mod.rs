//! Workflows behind the command-line interface

pub mod orchestration;

pub use orchestration::{
    run_ci_workflow, run_next_alpha, run_publish_workflow, CiWorkflowArgs, PublishWorkflowArgs,
    ReleaseContext, VersionSource, WorkflowResult,
};
