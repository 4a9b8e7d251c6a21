use std::process::ExitCode;

use clap::Parser;
use dynash::core::commands::CommandExecutor;
use dynash::core::config::Config;
use dynash::error::ShellError;
use dynash::flags::Flags;
use dynash::highlight::SyntaxHighlighter;
use dynash::input::{LineInput, RustylineInput, ScriptedInput, ShellCompleter};
use dynash::shell::{Shell, Startup};
use dynash::store::{DynamoStore, Store};
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(debug: bool) {
    let default = if debug { "dynash=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("DYNASH_LOG")
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let flags = Flags::parse();
    init_logging(flags.debug);

    match run(flags) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dynash: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(flags: Flags) -> Result<(), ShellError> {
    // The loop handles Ctrl-C at the prompt; this keeps the shell alive while
    // a `shell` command or a store call is interrupted.
    ctrlc::set_handler(|| debug!("interrupt"))?;

    let mut config = Config::new(flags.config.clone())?;
    if !flags.no_config {
        if let Err(e) = config.load() {
            if flags.config.is_some() {
                return Err(e.into());
            }
            warn!(path = %config.rc_path().display(), error = %e, "skipping rc file");
        }
    }

    let startup = Startup {
        table: flags.table.clone(),
        consistent: flags.consistent,
        elapsed: flags.elapsed,
        commands: config.commands().to_vec(),
    };
    let store = DynamoStore::connect(flags.store_options())?;

    if flags.is_interactive() {
        let highlighter = SyntaxHighlighter::new();
        let completer = ShellCompleter::new(&CommandExecutor::new(), highlighter);
        let input = RustylineInput::new(completer, config.history_path().to_path_buf())?;
        drive(Shell::new(store, input).with_highlighter(highlighter), &flags, &startup)
    } else {
        let input = ScriptedInput::new(flags.execute.iter().cloned());
        drive(
            Shell::new(store, input).with_highlighter(SyntaxHighlighter::plain()),
            &flags,
            &startup,
        )
    }
}

fn drive<S: Store, I: LineInput>(
    shell: Shell<S, I>,
    flags: &Flags,
    startup: &Startup,
) -> Result<(), ShellError> {
    let quiet = flags.quiet || !flags.is_interactive();
    let mut shell = shell.quiet(quiet).debug(flags.debug);
    shell.start(startup);
    shell.run()
}
