use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use release_train::cli::{
    run_ci_workflow, run_next_alpha, run_publish_workflow, CiWorkflowArgs, PublishWorkflowArgs,
    ReleaseContext, VersionSource,
};
use release_train::config::{self, Config};
use release_train::exec::CommandRunner;
use release_train::git::Git2Repository;
use release_train::registry::NpmRegistry;
use release_train::ui::{self, OtpPrompt};
use release_train::workspace::Workspace;
use release_train::ReleaseError;

#[derive(Parser)]
#[command(
    name = "release-train",
    version,
    about = "Resolve, version and publish releases across canary, beta, release and LTS channels"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Cut and publish a release of one channel
    Publish(PublishArgs),

    /// Publish an already-resolved version from automation
    Ci(CiArgs),

    /// Print the next nightly alpha version
    NextAlpha(NextAlphaArgs),
}

#[derive(clap::Args)]
struct PublishArgs {
    #[arg(help = "release | beta | canary | lts | release-<major>-<minor>")]
    channel: String,

    #[arg(short = 't', long = "distTag", alias = "dist-tag", help = "Registry distribution tag")]
    dist_tag: Option<String>,

    #[arg(long = "skipVersion", alias = "skip-version")]
    skip_version: bool,

    #[arg(long = "skipPack", alias = "skip-pack")]
    skip_pack: bool,

    #[arg(long = "skipPublish", alias = "skip-publish")]
    skip_publish: bool,

    #[arg(long = "skipSmokeTest", alias = "skip-smoke-test")]
    skip_smoke_test: bool,

    #[arg(long = "bumpMajor", alias = "bump-major", help = "Re-release as a new major")]
    bump_major: bool,

    #[arg(long = "bumpMinor", alias = "bump-minor", help = "Re-release as a new minor")]
    bump_minor: bool,

    #[arg(long, help = "Publish despite an unclean, unsynced or unexpected branch")]
    force: bool,
}

#[derive(clap::Args)]
struct CiArgs {
    #[arg(long = "version", help = "Version to publish")]
    release_version: String,

    #[arg(short = 't', long = "distTag", alias = "dist-tag", default_value = "alpha")]
    dist_tag: String,
}

#[derive(clap::Args)]
struct NextAlphaArgs {
    #[arg(
        long,
        help = "File listing published versions ('-' for stdin); queries the registry when omitted"
    )]
    versions_file: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        if e
            .downcast_ref::<ReleaseError>()
            .is_some_and(ReleaseError::is_guard_failure)
        {
            ui::display_status("Re-run with --force to publish anyway");
        }
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    let cwd = std::env::current_dir()?;

    match args.command {
        Command::Publish(publish) => {
            // Held for the whole run and released on every exit path
            let mut prompt = OtpPrompt::open();
            let repo = Git2Repository::open(&cwd)?;
            let root = repo.workdir().to_path_buf();
            let npm = registry(&config, &root);
            let ctx = context(&config, root, &npm);
            let result = run_publish_workflow(&publish.into(), &ctx, &repo, &mut prompt);
            prompt.close();
            result.map(|_| ())
        }
        Command::Ci(ci) => {
            let workflow = CiWorkflowArgs {
                version: ci.release_version,
                dist_tag: ci.dist_tag,
            };
            let npm = registry(&config, &cwd);
            let ctx = context(&config, cwd.clone(), &npm);
            run_ci_workflow(&workflow, &ctx).map(|_| ())
        }
        Command::NextAlpha(next) => {
            let source = match next.versions_file {
                Some(path) if path.to_str() == Some("-") => VersionSource::Stdin,
                Some(path) => VersionSource::File(path),
                None => VersionSource::Registry,
            };
            let version = run_next_alpha(&source, &config, &registry(&config, &cwd))?;
            println!("{}", version);
            Ok(())
        }
    }
}

fn registry(config: &Config, root: &Path) -> NpmRegistry {
    NpmRegistry::new(CommandRunner::new(root), config.commands.npm.clone())
}

fn context<'a>(config: &'a Config, root: PathBuf, registry: &'a NpmRegistry) -> ReleaseContext<'a> {
    ReleaseContext {
        config,
        workspace: Workspace::new(&root, config),
        runner: CommandRunner::new(root),
        registry,
    }
}

impl From<PublishArgs> for PublishWorkflowArgs {
    fn from(args: PublishArgs) -> Self {
        PublishWorkflowArgs {
            channel: args.channel,
            dist_tag: args.dist_tag,
            skip_version: args.skip_version,
            skip_pack: args.skip_pack,
            skip_publish: args.skip_publish,
            skip_smoke_test: args.skip_smoke_test,
            bump_major: args.bump_major,
            bump_minor: args.bump_minor,
            force: args.force,
        }
    }
}
