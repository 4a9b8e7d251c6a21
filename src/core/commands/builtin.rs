use std::io::Write;

use super::{CommandError, Context, Flow, COMMANDS};
use crate::core::parse::{parse_switch, tokenize};

/// No argument flips the switch; otherwise the argument must read as on/off.
fn switch(current: bool, args: &str) -> Result<bool, CommandError> {
    let tokens = tokenize(args)?;
    match tokens.as_slice() {
        [] => Ok(!current),
        [value] => parse_switch(value).ok_or(CommandError::InvalidArguments),
        _ => Err(CommandError::InvalidArguments),
    }
}

pub(super) fn elapsed(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let value = switch(ctx.session.show_elapsed, args)?;
    ctx.session.show_elapsed = value;
    writeln!(ctx.out, "print elapsed time: {}", value)?;
    Ok(Flow::Continue)
}

pub(super) fn consistent(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let value = switch(ctx.session.consistent_read, args)?;
    ctx.session.consistent_read = value;
    writeln!(ctx.out, "use consistent reads: {}", value)?;
    Ok(Flow::Continue)
}

pub(super) fn shell(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let command_line = args.trim();
    if command_line.is_empty() {
        return Err(CommandError::InvalidArguments);
    }
    ctx.process.run(command_line, ctx.out)?;
    Ok(Flow::Continue)
}

pub(super) fn help(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let tokens = tokenize(args)?;
    match tokens.as_slice() {
        [] => {
            for spec in COMMANDS {
                let name = if spec.aliases.is_empty() {
                    spec.name.to_string()
                } else {
                    format!("{} ({})", spec.name, spec.aliases.join(", "))
                };
                writeln!(ctx.out, "  {:<22} {}", name, spec.summary)?;
            }
            writeln!(ctx.out, "  {:<22} {}", "!command", "same as shell")?;
        }
        [name] => {
            let spec = COMMANDS
                .iter()
                .find(|spec| spec.name == name || spec.aliases.contains(&name.as_str()))
                .ok_or_else(|| CommandError::NotFound(name.clone()))?;
            writeln!(ctx.out, "usage: {}", spec.usage)?;
            writeln!(ctx.out, "  {}", spec.summary)?;
        }
        _ => return Err(CommandError::InvalidArguments),
    }
    Ok(Flow::Continue)
}

pub(super) fn exit(_ctx: &mut Context<'_>, _args: &str) -> Result<Flow, CommandError> {
    Ok(Flow::Exit)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{fixture, run};
    use super::*;
    use crate::core::session::Session;

    #[test]
    fn test_consistent_toggle() {
        let store = fixture();
        let mut session = Session::new();

        let (result, out) = run(&store, &mut session, "consistent");
        result.expect("toggle");
        assert!(session.consistent_read);
        assert_eq!(out, "use consistent reads: true\n");

        run(&store, &mut session, "consistent").0.expect("toggle");
        assert!(!session.consistent_read);

        for _ in 0..2 {
            run(&store, &mut session, "consistent on").0.expect("on");
            assert!(session.consistent_read);
        }

        run(&store, &mut session, "consistent no").0.expect("off");
        assert!(!session.consistent_read);
    }

    #[test]
    fn test_switch_rejects_garbage() {
        let store = fixture();
        let mut session = Session::new();

        for line in ["elapsed maybe", "consistent on off"] {
            let (result, out) = run(&store, &mut session, line);
            assert!(matches!(result, Err(CommandError::InvalidArguments)));
            assert!(out.is_empty());
        }
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_elapsed() {
        let store = fixture();
        let mut session = Session::new();

        let (result, out) = run(&store, &mut session, "elapsed ON");
        result.expect("elapsed");
        assert!(session.show_elapsed);
        assert_eq!(out, "print elapsed time: true\n");

        run(&store, &mut session, "elapsed 0").0.expect("elapsed");
        assert!(!session.show_elapsed);
    }

    #[test]
    fn test_help() {
        let store = fixture();
        let mut session = Session::new();

        let (result, out) = run(&store, &mut session, "help");
        result.expect("help");
        for spec in COMMANDS {
            assert!(out.contains(spec.name), "{} missing from help", spec.name);
        }
        assert!(out.contains("tables (ls)"));

        let (result, out) = run(&store, &mut session, "? cd");
        result.expect("help for alias");
        assert!(out.starts_with("usage: use tablename"));

        let (result, _) = run(&store, &mut session, "help frobnicate");
        assert!(matches!(result, Err(CommandError::NotFound(_))));
    }

    #[test]
    fn test_exit() {
        let store = fixture();
        let mut session = Session::new();
        for line in ["exit", "quit"] {
            let (result, _) = run(&store, &mut session, line);
            assert_eq!(result.expect("exit"), Flow::Exit);
        }
    }

    #[test]
    fn test_shell_runs_command() {
        let store = fixture();
        let mut session = Session::new();

        let (result, out) = run(&store, &mut session, "shell true");
        result.expect("shell");
        assert!(out.is_empty());

        let (result, out) = run(&store, &mut session, "!exit 3");
        result.expect("failed command is reported, not an error");
        assert!(out.starts_with("Process exited with status:"));
    }
}
