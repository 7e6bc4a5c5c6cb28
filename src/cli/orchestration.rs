//! Release workflow orchestration
//!
//! The manual flow runs guard → smoke test → version → pack → publish, each
//! stage gated on the previous one. Nothing is rolled back: when a later
//! stage fails, the operator re-runs with the `skip` flags for the stages
//! that already completed. Stages hand the version along explicitly through
//! [StageState] instead of re-reading it from disk.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::domain::{BranchExpectation, Channel, ReleaseRequest, SemanticVersion, VersionHistory};
use crate::error::ReleaseError;
use crate::exec::CommandRunner;
use crate::git::Repository;
use crate::guard::{GuardFinding, ReleaseGuard};
use crate::registry::{self, CredentialSource, EnvironmentCredential, Registry};
use crate::resolver;
use crate::ui;
use crate::workspace::Workspace;

/// Arguments for the manual publish workflow
///
/// Mirrors the CLI Args in a form that can be built without clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublishWorkflowArgs {
    /// `release`, `beta`, `canary`, `lts` or `release-<major>-<minor>`
    pub channel: String,

    /// Registry tag; derived from the channel when absent
    pub dist_tag: Option<String>,

    pub skip_version: bool,
    pub skip_pack: bool,
    pub skip_publish: bool,
    pub skip_smoke_test: bool,
    pub bump_major: bool,
    pub bump_minor: bool,

    /// Downgrade working-tree guard failures to warnings
    pub force: bool,
}

/// Arguments for the automated workflow
#[derive(Debug, Clone, PartialEq)]
pub struct CiWorkflowArgs {
    /// Version to publish, already resolved
    pub version: String,
    pub dist_tag: String,
}

/// Where the `next-alpha` workflow reads published versions from
#[derive(Debug, Clone, PartialEq)]
pub enum VersionSource {
    /// Ask the registry for the configured package
    Registry,
    /// A file holding a JSON array or one version per line
    File(PathBuf),
    /// The same formats, read from stdin
    Stdin,
}

/// Collaborators shared by the workflows
pub struct ReleaseContext<'a> {
    pub config: &'a Config,
    pub workspace: Workspace,
    pub runner: CommandRunner,
    pub registry: &'a dyn Registry,
}

/// A validated manual release, computed before any side effect
#[derive(Debug, Clone, PartialEq)]
pub struct PublishPlan {
    pub request: ReleaseRequest,
    pub dist_tag: String,
    pub expected_branch: BranchExpectation,
}

/// Version carried from one stage to the next
#[derive(Debug, Clone, PartialEq)]
pub struct StageState {
    pub version: String,
}

/// Result of a successful workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// The version the run released
    pub version: String,
    pub dist_tag: String,
    /// Archives published, in order
    pub published: Vec<PathBuf>,
    /// Guard findings overridden by `--force`
    pub warnings: Vec<GuardFinding>,
}

/// Validate the channel and flags against the recorded version.
///
/// Every usage error surfaces here, before the working tree is inspected.
pub fn plan_publish(args: &PublishWorkflowArgs, current: SemanticVersion) -> Result<PublishPlan> {
    let channel = Channel::parse(&args.channel)?;
    let request = ReleaseRequest::new(
        channel,
        args.bump_major,
        args.bump_minor,
        current,
        args.force,
    )?;

    let dist_tag = args
        .dist_tag
        .clone()
        .unwrap_or_else(|| channel.default_dist_tag());
    let expected_branch = BranchExpectation::for_channel(channel, &dist_tag, &current);

    Ok(PublishPlan {
        request,
        dist_tag,
        expected_branch,
    })
}

/// Run the working-tree guard, printing overridden findings
pub fn check_working_tree(
    repo: &dyn Repository,
    plan: &PublishPlan,
) -> Result<Vec<GuardFinding>> {
    let status = repo.status_text().context("reading git status")?;
    let guard = ReleaseGuard::new(
        plan.expected_branch.clone(),
        plan.dist_tag.clone(),
        plan.request.force(),
    );

    let warnings = guard.evaluate(&status).into_result()?;
    for warning in &warnings {
        ui::display_guard_warning(warning);
    }
    Ok(warnings)
}

/// Run the project's lint and test suite
pub fn smoke_test_stage(ctx: &ReleaseContext<'_>) -> Result<()> {
    ui::display_status("Running Smoke Test");
    ctx.runner.run_proxied(&ctx.config.commands.smoke_test)?;
    ui::display_success("Project passes Smoke Test");
    Ok(())
}

/// Resolve the next version, stamp it into the manifests and record it as
/// a release commit and tag pushed to the remote
pub fn version_stage(
    ctx: &ReleaseContext<'_>,
    repo: &dyn Repository,
    plan: &PublishPlan,
) -> Result<StageState> {
    let next = resolver::next_version(&plan.request);
    let version = next.to_string();
    ui::display_version_change(&plan.request.current_version().to_string(), &version);

    let stamped = ctx.workspace.set_version(&version)?;

    let tag = format!("v{}", version);
    let branch = repo.current_branch()?;
    repo.commit_files(&stamped, &tag)?;
    repo.create_tag(&tag, &tag)?;
    repo.push(&ctx.config.remote, &branch, &tag)
        .with_context(|| format!("pushing {} to {}", tag, ctx.config.remote))?;

    info!("versioned {} on {}", version, branch);
    ui::display_success(&format!("Successfully Versioned {}", version));
    Ok(StageState { version })
}

/// Clean build output, reinstall and pack every publishable package
pub fn pack_stage(ctx: &ReleaseContext<'_>, state: StageState) -> Result<StageState> {
    ui::display_status("Cleaning and reinstalling dependencies");
    for command in &ctx.config.commands.clean {
        ctx.runner.run(command)?;
    }
    ctx.runner.run_proxied(&ctx.config.commands.install)?;
    ctx.workspace
        .pack_all(&ctx.runner, &ctx.config.commands.npm)?;

    ui::display_success(&format!("Successfully Packaged {}", state.version));
    Ok(state)
}

/// Publish every packed archive under `dist_tag`
pub fn publish_stage(
    ctx: &ReleaseContext<'_>,
    state: &StageState,
    dist_tag: &str,
    credentials: &mut dyn CredentialSource,
) -> Result<Vec<PathBuf>> {
    let tarballs = ctx.workspace.tarball_paths()?;
    ui::display_status(&format!("Publishing {} packages as '{}'", tarballs.len(), dist_tag));
    let published = registry::publish_all(ctx.registry, &tarballs, dist_tag, credentials)?;

    ui::display_success(&format!("Successfully Published {}", state.version));
    Ok(published)
}

/// Manual release of one channel
pub fn run_publish_workflow(
    args: &PublishWorkflowArgs,
    ctx: &ReleaseContext<'_>,
    repo: &dyn Repository,
    credentials: &mut dyn CredentialSource,
) -> Result<WorkflowResult> {
    let current = ctx.workspace.current_version()?;
    let plan = plan_publish(args, current)?;
    info!(
        "publishing {} as '{}' from {}",
        plan.request.channel(),
        plan.dist_tag,
        current
    );

    let warnings = check_working_tree(repo, &plan)?;

    if args.skip_smoke_test {
        ui::display_skip("Smoke Test");
    } else {
        smoke_test_stage(ctx)?;
    }

    let state = if args.skip_version {
        ui::display_skip("Versioning");
        StageState {
            version: current.to_string(),
        }
    } else {
        version_stage(ctx, repo, &plan)?
    };

    let state = if args.skip_pack {
        ui::display_skip("Packaging");
        state
    } else {
        pack_stage(ctx, state)?
    };

    let published = if args.skip_publish {
        ui::display_skip("Publishing");
        Vec::new()
    } else {
        publish_stage(ctx, &state, &plan.dist_tag, credentials)?
    };

    Ok(WorkflowResult {
        version: state.version,
        dist_tag: plan.dist_tag,
        published,
        warnings,
    })
}

/// Automated release of an already-resolved version.
///
/// The registry token must be in the environment; its absence is checked
/// before anything else.
pub fn run_ci_workflow(args: &CiWorkflowArgs, ctx: &ReleaseContext<'_>) -> Result<WorkflowResult> {
    let mut credential = EnvironmentCredential::require(&ctx.config.credential_env)?;

    semver::Version::parse(&args.version)
        .map_err(|_| ReleaseError::malformed(&args.version))
        .with_context(|| format!("Version \"{}\" is not a valid semantic version", args.version))?;

    ctx.workspace.set_version(&args.version)?;
    ctx.workspace
        .pack_all(&ctx.runner, &ctx.config.commands.npm)?;
    ui::display_success(&format!("Successfully Packaged {}", args.version));

    let state = StageState {
        version: args.version.clone(),
    };
    let published = publish_stage(ctx, &state, &args.dist_tag, &mut credential)?;

    Ok(WorkflowResult {
        version: state.version,
        dist_tag: args.dist_tag.clone(),
        published,
        warnings: Vec::new(),
    })
}

/// Next nightly alpha from the published history
pub fn run_next_alpha(
    source: &VersionSource,
    config: &Config,
    registry: &dyn Registry,
) -> Result<SemanticVersion> {
    let versions = match source {
        VersionSource::Registry => registry
            .published_versions(&config.package_name)
            .with_context(|| format!("listing published versions of {}", config.package_name))?,
        VersionSource::File(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            registry::parse_version_list(&text)?
        }
        VersionSource::Stdin => {
            let text = std::io::read_to_string(std::io::stdin())?;
            registry::parse_version_list(&text)?
        }
    };

    let history = VersionHistory::from_versions(&versions);
    info!("resolving next alpha from {} published versions", history.len());
    Ok(resolver::next_alpha(&history))
}
