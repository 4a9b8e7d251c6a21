use std::io::Write;

use super::{CommandError, Context, Flow};
use crate::core::parse::{split_table_override, tokenize};
use crate::output::{print_description, print_tables};
use crate::store::{Capacity, KeyAttr, KeySchema};
use crate::value::ScalarType;

pub(super) fn list(ctx: &mut Context<'_>, _args: &str) -> Result<Flow, CommandError> {
    let tables = ctx.store.list_tables()?;
    print_tables(ctx.out, &tables)?;
    ctx.session.known_tables = tables;
    Ok(Flow::Continue)
}

pub(super) fn describe(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let tokens = tokenize(args)?;
    let name = match tokens.first() {
        Some(name) => name.trim_start_matches(':').to_string(),
        None => ctx.resolve(None)?.name,
    };

    let desc = ctx.store.describe_table(&name)?;
    print_description(ctx.out, &desc)?;
    Ok(Flow::Continue)
}

pub(super) fn use_table(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let tokens = tokenize(args)?;
    let [name] = tokens.as_slice() else {
        return Err(CommandError::InvalidArguments);
    };

    let desc = ctx.store.describe_table(name.trim_start_matches(':'))?;
    print_description(ctx.out, &desc)?;
    ctx.session.current_table = Some(desc.table());
    Ok(Flow::Continue)
}

/// Reads `name[:type]`; the type defaults to string.
fn key_attr(token: &str) -> Result<KeyAttr, CommandError> {
    let (name, kind) = match token.split_once(':') {
        Some((name, type_token)) => {
            let kind = ScalarType::from_token(type_token)
                .ok_or_else(|| CommandError::InvalidKeyType(type_token.to_string()))?;
            (name, kind)
        }
        None => (token, ScalarType::S),
    };
    if name.is_empty() {
        return Err(CommandError::InvalidArguments);
    }
    Ok(KeyAttr::new(name, kind))
}

pub(super) fn create(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let tokens = tokenize(args)?;
    let (name, hash, range) = match tokens.as_slice() {
        [name, hash] => (name, hash, None),
        [name, hash, range] => (name, hash, Some(range)),
        _ => return Err(CommandError::InvalidArguments),
    };

    let schema = KeySchema {
        hash_key: key_attr(hash)?,
        range_key: range.map(|r| key_attr(r)).transpose()?,
    };
    let desc = ctx.store.create_table(name, &schema, Capacity::default())?;
    print_description(ctx.out, &desc)?;
    Ok(Flow::Continue)
}

pub(super) fn delete(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let tokens = tokenize(args)?;
    let [name] = tokens.as_slice() else {
        return Err(CommandError::InvalidArguments);
    };

    let table = ctx.store.get_table(name.trim_start_matches(':'))?;
    ctx.store.delete_table(&table)?;

    if ctx
        .session
        .current_table
        .as_ref()
        .is_some_and(|current| current.name == table.name)
    {
        ctx.session.current_table = None;
    }
    writeln!(ctx.out, "deleted table {}", table.name)?;
    Ok(Flow::Continue)
}

pub(super) fn refresh(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let (override_name, rest) = split_table_override(args);
    let tokens = tokenize(rest)?;
    let name = override_name.or(tokens.first().map(String::as_str));

    let mut table = ctx.resolve(name)?;
    let desc = ctx.store.refresh_table(&mut table)?;

    let is_current = ctx
        .session
        .current_table
        .as_ref()
        .is_some_and(|current| current.name == table.name);
    if is_current {
        ctx.session.current_table = Some(table);
    }
    print_description(ctx.out, &desc)?;
    Ok(Flow::Continue)
}
