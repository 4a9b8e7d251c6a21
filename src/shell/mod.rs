use std::io::{self, Write};
use std::time::Instant;

use tracing::{debug, warn};

use crate::{
    core::{
        commands::{CommandError, CommandExecutor, Context, Flow},
        parse::split_command,
        session::Session,
    },
    error::ShellError,
    highlight::SyntaxHighlighter,
    input::{Input, LineInput},
    output::print_tables,
    process::ProcessExecutor,
    store::Store,
};

const GREETING: &str = "A simple shell to interact with DynamoDB";
const FAREWELL: &str = "Goodbye!";

/// What to set up before the first prompt.
#[derive(Debug, Clone, Default)]
pub struct Startup {
    pub table: Option<String>,
    pub consistent: bool,
    pub elapsed: bool,
    /// Lines from the rc file, run in order.
    pub commands: Vec<String>,
}

pub struct Shell<S: Store, I: LineInput> {
    store: S,
    input: I,
    executor: CommandExecutor,
    session: Session,
    process: ProcessExecutor,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    highlighter: SyntaxHighlighter,
    quiet: bool,
    debug: bool,
}

impl<S: Store, I: LineInput> Shell<S, I> {
    pub fn new(store: S, input: I) -> Self {
        Shell {
            store,
            input,
            executor: CommandExecutor::new(),
            session: Session::new(),
            process: ProcessExecutor::new(),
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            highlighter: SyntaxHighlighter::new(),
            quiet: false,
            debug: false,
        }
    }

    pub fn with_output(mut self, out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        self.out = out;
        self.err = err;
        self
    }

    pub fn with_highlighter(mut self, highlighter: SyntaxHighlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    pub fn with_process(mut self, process: ProcessExecutor) -> Self {
        self.process = process;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    /// Greets, fetches the table list and applies the startup settings.
    /// Nothing here is fatal: failures are reported and the shell carries on.
    pub fn start(&mut self, startup: &Startup) {
        if !self.quiet {
            writeln!(self.out, "{}", GREETING).ok();
        }

        match self.store.list_tables() {
            Ok(tables) => {
                if !self.quiet {
                    print_tables(&mut *self.out, &tables).ok();
                }
                self.set_known_tables(tables);
            }
            Err(e) => self.report("tables", &CommandError::Store(e)),
        }

        if let Some(table) = &startup.table {
            self.run_line(&format!("use {}", table));
        }
        self.session.consistent_read |= startup.consistent;
        self.session.show_elapsed |= startup.elapsed;

        for line in &startup.commands {
            debug!(command = %line, "rc");
            if self.run_line(line) == Flow::Exit {
                warn!(command = %line, "exit in the startup file ignored");
            }
        }
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        loop {
            let prompt = self.session.prompt();
            match self.input.read_line(&prompt)? {
                Input::Line(line) => {
                    if !line.trim().is_empty() {
                        self.input.add_history(line.trim());
                    }
                    if self.run_line(&line) == Flow::Exit {
                        break;
                    }
                }
                Input::Interrupted => continue,
                Input::Eof => break,
            }
        }

        if let Err(e) = self.input.save_history() {
            warn!(error = %e, "couldn't save history");
        }
        if !self.quiet {
            writeln!(self.out, "{}", FAREWELL).ok();
        }
        self.out.flush()?;
        Ok(())
    }

    /// Dispatches one line and reports the outcome. Errors never escape.
    pub fn run_line(&mut self, line: &str) -> Flow {
        let timer = self.session.show_elapsed.then(Instant::now);
        let tables_before = self.session.known_tables.clone();

        let result = {
            let mut ctx = Context {
                store: &self.store,
                session: &mut self.session,
                out: &mut *self.out,
                process: &self.process,
            };
            self.executor.execute(line, &mut ctx)
        };

        let flow = match result {
            Ok(flow) => flow,
            Err(e) => {
                self.report(line, &e);
                Flow::Continue
            }
        };

        if let Some(start) = timer {
            writeln!(self.out, "elapsed time: {:.3}s", start.elapsed().as_secs_f64()).ok();
        }
        if self.session.known_tables != tables_before {
            let tables = self.session.known_tables.clone();
            self.input.set_tables(&tables);
        }
        self.out.flush().ok();
        flow
    }

    fn set_known_tables(&mut self, tables: Vec<String>) {
        self.input.set_tables(&tables);
        self.session.known_tables = tables;
    }

    fn report(&mut self, line: &str, error: &CommandError) {
        let message = match error {
            CommandError::InvalidArguments => {
                let (name, _) = split_command(line);
                match self.executor.lookup(name) {
                    Some(spec) => format!("{}\nusage: {}", error, spec.usage),
                    None => error.to_string(),
                }
            }
            _ => error.to_string(),
        };
        self.out.flush().ok();
        writeln!(self.err, "{}", self.highlighter.highlight_error(&message)).ok();

        if self.debug {
            if let Some(detail) = error.detail() {
                writeln!(self.err, "{}", detail).ok();
            }
        }
        debug!(line, error = ?error, "command failed");
    }
}
