use clap::Parser;
use std::path::PathBuf;
use std::sync::Once;

/// A compiler for dependent pattern matches
#[derive(Parser)]
#[clap(author, version, about)]
enum Cli {
    /// Compile the matches of a problem file, printing a summary to stdout
    #[clap(after_help = COMPILE_COMMAND_AFTER_HELP)]
    Compile {
        /// Path to the problem file
        #[clap(name = "FILE")]
        problem_file: PathOrStdin,
        /// Log each compilation step to stderr
        #[clap(long = "trace")]
        trace: bool,
        /// Maximum depth of the case tree built for a match
        #[clap(long = "max-depth", name = "N")]
        max_depth: Option<usize>,
        /// Report unused clauses as warnings rather than errors
        #[clap(long = "allow-unused")]
        allow_unused: bool,
    },
}

const COMPILE_COMMAND_AFTER_HELP: &str = "\
Examples:

  $ depmatch compile tests/cases/vec/zip.toml
  $ depmatch compile --trace --allow-unused problem.toml
  $ DEPMATCH_LOG=depmatch::matcher=trace depmatch compile problem.toml
";

#[derive(Clone, Debug)]
enum PathOrStdin {
    StdIn,
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(src: &str) -> Result<PathOrStdin, std::convert::Infallible> {
        match src {
            "-" => Ok(PathOrStdin::StdIn),
            _ => Ok(PathOrStdin::Path(PathBuf::from(src))),
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Log to stderr, filtered by `DEPMATCH_LOG`.
fn init_tracing(trace: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let fallback = match trace {
            true => "warn,depmatch::matcher=debug",
            false => "warn",
        };
        let filter = EnvFilter::try_from_env("DEPMATCH_LOG")
            .unwrap_or_else(|_| EnvFilter::new(fallback));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}

fn unwrap_or_exit<T>(option: Option<T>) -> T {
    option.unwrap_or_else(|| std::process::exit(depmatch::Status::Error.exit_code()))
}

fn load_file_or_exit(driver: &mut depmatch::Driver, file: PathOrStdin) -> depmatch::source::FileId {
    unwrap_or_exit(match file {
        PathOrStdin::StdIn => driver.load_source("<stdin>".to_owned(), std::io::stdin()),
        PathOrStdin::Path(path) => driver.load_source_path(&path),
    })
}

const MAX_PRETTY_WIDTH: usize = 80;

fn get_pretty_width() -> usize {
    let term_width = termsize::get().map_or(MAX_PRETTY_WIDTH, |size| usize::from(size.cols));
    std::cmp::min(term_width, MAX_PRETTY_WIDTH)
}

fn main() -> ! {
    match Cli::parse() {
        Cli::Compile {
            problem_file,
            trace,
            max_depth,
            allow_unused,
        } => {
            init_tracing(trace);

            let mut driver = depmatch::Driver::new();
            driver.install_panic_hook();
            driver.set_allow_unused(allow_unused);
            driver.set_emit_width(get_pretty_width());
            if let Some(max_depth) = max_depth {
                driver.set_max_recursion_depth(max_depth);
            }

            let file_id = load_file_or_exit(&mut driver, problem_file);
            let status = driver.compile_and_emit_module(file_id);

            std::process::exit(status.exit_code());
        }
    }
}
