//! buildstamp CLI - print reproducible build identifiers from git state

mod logging;

use buildstamp_core::{BuildIdOptions, Config};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

const DEFAULT_ENV_VAR: &str = "BUILD_ID";

#[derive(Parser)]
#[command(name = "buildstamp")]
#[command(about = "Reproducible build identifiers from git state", long_about = None)]
struct Cli {
    /// Directory to start the repository search from (default: cwd)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// TOML config file with a [build_id] table
    #[arg(long, global = true, env = "BUILDSTAMP_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the build identifier (default)
    Id(IdArgs),

    /// Print the located repository root
    Root,

    /// Write a default config file
    InitConfig {
        /// Where to write the config
        #[arg(default_value = "buildstamp.toml")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct IdArgs {
    /// Argument for `git describe` (repeatable, e.g. --describe=--tags)
    #[arg(long = "describe", allow_hyphen_values = true)]
    describe: Vec<String>,

    /// Emit <tag>.<commits since tag>-g<short sha>
    #[arg(long)]
    semver: bool,

    /// Fail instead of falling back to the commit hash
    #[arg(long)]
    no_fallback: bool,

    /// Resolve on an async runtime instead of blocking calls
    #[arg(long = "async")]
    use_async: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// Variable name for --format cargo
    #[arg(long, default_value = DEFAULT_ENV_VAR)]
    env_var: String,
}

impl Default for IdArgs {
    fn default() -> Self {
        Self {
            describe: Vec::new(),
            semver: false,
            no_fallback: false,
            use_async: false,
            format: OutputFormat::Plain,
            env_var: DEFAULT_ENV_VAR.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// The bare identifier
    #[default]
    Plain,
    /// `{"build_id", "repo_root"}` object
    Json,
    /// `cargo:` directives for build scripts
    Cargo,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        None => cmd_id(cli.dir, cli.config.as_deref(), IdArgs::default(), cli.json),
        Some(Commands::Id(args)) => cmd_id(cli.dir, cli.config.as_deref(), args, cli.json),
        Some(Commands::Root) => cmd_root(cli.dir, cli.config.as_deref(), cli.json),
        Some(Commands::InitConfig { path }) => cmd_init_config(&path, cli.json),
    };

    if let Err(e) = result {
        if cli.json {
            let error_json = serde_json::json!({
                "code": error_code(&e),
                "message": e.to_string(),
            });
            eprintln!("{:#}", error_json);
        } else {
            use colored::Colorize;
            eprintln!("{}: {}", "Error".red(), e);
        }
        std::process::exit(1);
    }
}

fn error_code(e: &buildstamp_core::BuildIdError) -> &'static str {
    use buildstamp_core::BuildIdError::*;
    match e {
        GitCommand(_) => "git_command",
        GitOutputEmpty { .. } => "git_output_empty",
        GitOutputInvalid { .. } => "git_output_invalid",
        FileAccess { .. } | EmptyMetadata(_) => "file_access",
        Spawn { .. } | ProcessExit { .. } => "process",
        CurrentDir(_) => "current_dir",
        ConfigExists(_) => "config_exists",
        ConfigParse(_) => "config_parse",
        Io(_) => "io",
    }
}

/// Config file values first, then command-line overrides.
fn build_options(
    dir: Option<PathBuf>,
    config: Option<&Path>,
    args: &IdArgs,
) -> buildstamp_core::Result<BuildIdOptions> {
    let mut options = match config {
        Some(path) => Config::load(path)?.build_id,
        None => BuildIdOptions::default(),
    };

    if let Some(dir) = dir {
        options.directory = Some(dir);
    }
    if !args.describe.is_empty() {
        options.describe_flags = args.describe.clone();
    }
    if args.semver {
        options.use_semantic_versioning = true;
    }
    if args.no_fallback {
        options.fallback_to_commit_sha = false;
    }
    Ok(options)
}

fn start_dir(options: &BuildIdOptions) -> buildstamp_core::Result<PathBuf> {
    match &options.directory {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(buildstamp_core::BuildIdError::CurrentDir),
    }
}

fn cmd_id(
    dir: Option<PathBuf>,
    config: Option<&Path>,
    args: IdArgs,
    json: bool,
) -> buildstamp_core::Result<()> {
    let mut options = build_options(dir, config, &args)?;
    let start = start_dir(&options)?;

    // Resolving from the located root keeps the root walk to a single pass.
    let (build_id, repo_root) = if args.use_async {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(async {
            let repo_root = buildstamp_core::locate_repo_root_async(&start).await;
            options.directory = Some(repo_root.clone());
            let build_id = buildstamp_core::resolve_build_id_async(&options).await?;
            Ok::<_, buildstamp_core::BuildIdError>((build_id, repo_root))
        })?
    } else {
        let repo_root = buildstamp_core::locate_repo_root(&start);
        options.directory = Some(repo_root.clone());
        (buildstamp_core::resolve_build_id(&options)?, repo_root)
    };
    tracing::debug!(%build_id, root = %repo_root.display(), "resolved");

    let format = if json { OutputFormat::Json } else { args.format };
    match format {
        OutputFormat::Plain => println!("{}", build_id),
        OutputFormat::Json => {
            let out = serde_json::json!({
                "build_id": build_id,
                "repo_root": repo_root.display().to_string(),
            });
            println!("{:#}", out);
        }
        OutputFormat::Cargo => {
            println!("cargo:rustc-env={}={}", args.env_var, build_id);
            for path in buildstamp_core::rerun_paths(&repo_root) {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }
    }
    Ok(())
}

fn cmd_root(dir: Option<PathBuf>, config: Option<&Path>, json: bool) -> buildstamp_core::Result<()> {
    let options = build_options(dir, config, &IdArgs::default())?;
    let repo_root = buildstamp_core::locate_repo_root(&start_dir(&options)?);

    if json {
        println!("{:#}", serde_json::json!({ "repo_root": repo_root.display().to_string() }));
    } else {
        println!("{}", repo_root.display());
    }
    Ok(())
}

fn cmd_init_config(path: &Path, json: bool) -> buildstamp_core::Result<()> {
    use colored::Colorize;

    Config::write_default(path)?;

    if json {
        println!("{:#}", serde_json::json!({ "created": path.display().to_string() }));
    } else {
        println!("{} {}", "Created".green(), path.display());
    }
    Ok(())
}
