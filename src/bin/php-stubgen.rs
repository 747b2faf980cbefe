use clap::Parser;
use php_stubgen::StubError;
use php_stubgen::reflection::IntrospectionProvider;
use php_stubgen::reflection::archive::SnapshotArchive;
use php_stubgen::runtime::context::EngineContext;
use php_stubgen::stubgen::{OutputMode, StubConfig, StubGenerator, StubOutput};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "php-stubgen")]
#[command(about = "Generate PHP stubs for the API of an extension", long_about = None)]
struct Cli {
    /// Name of the extension
    #[arg(long, required_unless_present = "list")]
    ext: Option<String>,

    /// Write one file per namespace and class instead of printing to stdout
    #[arg(long)]
    tree: bool,

    /// Root directory for --tree
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Read extensions from a JSON snapshot instead of the bundled ones
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Print the extension snapshot as JSON instead of stubs
    #[arg(long)]
    dump_snapshot: bool,

    /// List the extensions that can be stubbed
    #[arg(long)]
    list: bool,

    /// Indentation inside class bodies
    #[arg(long, default_value = "\t")]
    indent: String,
}

fn main() -> anyhow::Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let provider: Box<dyn IntrospectionProvider> = match &cli.snapshot {
        Some(path) => Box::new(SnapshotArchive::from_path(path)?),
        None => Box::new(create_engine()?),
    };

    if cli.list {
        let mut stdout = std::io::stdout().lock();
        for name in provider.extension_names() {
            writeln!(stdout, "{name}")?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(extension) = cli.ext else {
        anyhow::bail!("--ext is required");
    };

    let snapshot = match provider.snapshot(&extension) {
        Ok(snapshot) => snapshot,
        Err(err @ StubError::ExtensionNotFound(_)) => {
            println!("{err}");
            return Ok(ExitCode::from(1));
        }
        Err(err) => return Err(err.into()),
    };

    if cli.dump_snapshot {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(ExitCode::SUCCESS);
    }

    let generator = StubGenerator::new(StubConfig {
        indent: cli.indent,
        mode: if cli.tree {
            OutputMode::Tree
        } else {
            OutputMode::Combined
        },
        output_dir: cli.out_dir,
    });

    match generator.generate(&snapshot)? {
        StubOutput::Combined(text) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        StubOutput::Tree(paths) => {
            info!(
                extension = %snapshot.name,
                files = paths.len(),
                dir = %generator.config().output_dir.display(),
                "stub tree written"
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("PHP_STUBGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn create_engine() -> anyhow::Result<EngineContext> {
    EngineContext::bundled().map_err(|e| anyhow::anyhow!("Failed to build engine: {}", e))
}
