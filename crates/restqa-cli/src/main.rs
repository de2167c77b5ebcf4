mod prompt;

use anyhow::Context;
use clap::{Parser, Subcommand};
use restqa_adapters::{
    ConfigStore, CurlScenarioGenerator, DEFAULT_FETCH_TIMEOUT, FeatureRepository,
    PreferencesStore, ScenarioGenerator, split_command,
};
use restqa_app::{FsProjectService, InitUseCase, SampleOutcome, pick_tip, strip_ansi};
use restqa_server::{AppState, DEFAULT_PORT, ServerOptions};
use restqa_types::{CONFIG_FILE_NAME, InitAnswers};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(
    name = "restqa",
    version,
    about = "Scaffold API test projects and browse them from a dashboard"
)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a .restqa.yml configuration (and optionally a CI pipeline).
    Init {
        /// Accept the defaults for every question not given as a flag
        #[arg(short = 'y', long = "yes", default_value_t = false)]
        yes: bool,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Url of the api under test
        #[arg(long)]
        url: Option<String>,

        /// Environment name of the url
        #[arg(long)]
        env: Option<String>,

        /// github-action, gitlab-ci, bitbucket-pipeline, circle-ci or travis
        #[arg(long)]
        ci: Option<String>,

        /// Target folder (default: current directory)
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Do not fetch the welcome scenario
        #[arg(long, default_value_t = false)]
        no_sample: bool,
    },

    /// Serve the dashboard API.
    Dashboard {
        #[arg(long, short, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
        host: IpAddr,

        #[arg(long, short, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Folder holding the feature files (default: current directory)
        #[arg(long)]
        tests: Option<PathBuf>,

        /// Folder holding the HTML reports (default: ./reports)
        #[arg(long)]
        reports: Option<PathBuf>,

        /// Url prefix the reports are served under
        #[arg(long, default_value = "/reports")]
        report_prefix: String,

        /// Extra CORS origin. Repeatable.
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,

        /// Built dashboard assets to serve as the fallback
        #[arg(long)]
        dashboard_dir: Option<PathBuf>,

        /// Preferences file (default: ~/.config/restqa.pref)
        #[arg(long)]
        preferences: Option<PathBuf>,
    },

    /// Print the project configuration as JSON.
    Config {
        #[arg(long, short, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        /// Only print this environment
        #[arg(long)]
        env: Option<String>,
    },

    /// List the feature files of a test folder.
    Features {
        #[arg(long, default_value = ".")]
        tests: PathBuf,
    },

    /// Turn a curl command into Gherkin steps.
    Generate {
        /// The full command, quoted: "curl -H 'Accept: application/json' https://..."
        cmd: String,

        #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },

    /// Print a random tip.
    Tips {
        #[arg(long, short, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        /// Strip terminal colors
        #[arg(long, default_value_t = false)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    if let Err(err) = real_main(cli.cmd).await {
        eprintln!("{err:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .init();
    }
}

async fn real_main(cmd: Command) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("resolve current directory")?;
    debug!(command = ?cmd, cwd = %cwd.display(), "starting");

    match cmd {
        Command::Init {
            yes,
            name,
            description,
            url,
            env,
            ci,
            folder,
            no_sample,
        } => {
            let given = InitAnswers {
                name,
                description,
                url,
                env,
                ci,
                folder,
            };
            let answers =
                prompt::complete_answers(given, yes, &mut io::stdin().lock(), &mut io::stdout())
                    .context("read answers")?;

            let generator = CurlScenarioGenerator::new(DEFAULT_FETCH_TIMEOUT)?;
            let mut usecase = InitUseCase::new(generator, cwd);
            if no_sample {
                usecase = usecase.without_sample();
            }
            let outcome = usecase.execute(answers).await?;

            println!("Configuration created: {}", outcome.config_path.display());
            if let Some((flavor, path)) = &outcome.ci {
                println!(
                    "{} configuration created: {}",
                    flavor.display_name(),
                    path.display()
                );
            }
            match &outcome.sample {
                SampleOutcome::Written(path) => {
                    println!("Welcome scenario created: {}", path.display())
                }
                SampleOutcome::Skipped(reason) => println!("Welcome scenario skipped: {reason}"),
            }
            Ok(())
        }

        Command::Dashboard {
            config,
            host,
            port,
            tests,
            reports,
            report_prefix,
            allow_origins,
            dashboard_dir,
            preferences,
        } => {
            let mut options = ServerOptions::new(&cwd)
                .with_bind(SocketAddr::new(host, port))
                .with_report_prefix(&report_prefix)?;
            if let Some(tests) = tests {
                options = options.with_test_folder(tests);
            }
            if let Some(reports) = reports {
                options = options.with_report_folder(reports);
            }
            if let Some(dir) = dashboard_dir {
                options = options.with_dashboard_dir(dir);
            }
            for origin in allow_origins {
                options = options.with_allowed_origin(origin);
            }

            let preferences = preferences
                .map(|p| PreferencesStore::new(cwd.join(p)))
                .unwrap_or_else(PreferencesStore::default_location);
            let service = FsProjectService::new(options.folders(), preferences);
            let generator = CurlScenarioGenerator::new(DEFAULT_FETCH_TIMEOUT)?;

            let state = AppState::new(
                Arc::new(service),
                Arc::new(generator),
                options,
                cwd.join(config),
            );
            restqa_server::serve(state).await?;
            Ok(())
        }

        Command::Config { config, env } => {
            let path = cwd.join(config);
            let descriptor = ConfigStore.read(&path)?;
            let json = match env {
                None => serde_json::to_string_pretty(&descriptor)?,
                Some(name) => {
                    let environment = descriptor.environment(&name).with_context(|| {
                        format!("environment `{name}` is not declared in {}", path.display())
                    })?;
                    serde_json::to_string_pretty(environment)?
                }
            };
            println!("{json}");
            Ok(())
        }

        Command::Features { tests } => {
            for file in FeatureRepository::new(cwd.join(tests)).list()? {
                println!("{file}");
            }
            Ok(())
        }

        Command::Generate { cmd, timeout_secs } => {
            let args = split_command(&cmd)?;
            let generator = CurlScenarioGenerator::new(Duration::from_secs(timeout_secs))?;
            let scenario = generator.generate(&args).await?;
            print!("{scenario}");
            Ok(())
        }

        Command::Tips { config, plain } => {
            let path = cwd.join(config);
            // No project yet still gets the built-in tips.
            let descriptor = match ConfigStore.read(&path) {
                Ok(d) => Some(d),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e.into()),
            };
            if let Some(tip) = pick_tip(descriptor.as_ref().and_then(|d| d.tips())) {
                if plain {
                    println!("{}", strip_ansi(&tip));
                } else {
                    println!("{tip}");
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn init_flags_parse() {
        let cli = Cli::parse_from([
            "restqa", "init", "-y", "--name", "Shop", "--ci", "travis", "--no-sample",
        ]);
        match cli.cmd {
            Command::Init {
                yes,
                name,
                ci,
                no_sample,
                ..
            } => {
                assert!(yes);
                assert!(no_sample);
                assert_eq!(name.as_deref(), Some("Shop"));
                assert_eq!(ci.as_deref(), Some("travis"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn dashboard_defaults() {
        let cli = Cli::parse_from(["restqa", "dashboard", "--allow-origin", "http://a"]);
        match cli.cmd {
            Command::Dashboard {
                config,
                port,
                report_prefix,
                allow_origins,
                ..
            } => {
                assert_eq!(config, PathBuf::from(".restqa.yml"));
                assert_eq!(port, DEFAULT_PORT);
                assert_eq!(report_prefix, "/reports");
                assert_eq!(allow_origins, vec!["http://a"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
