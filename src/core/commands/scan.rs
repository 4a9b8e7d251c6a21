use std::io::Write;

use tracing::debug;

use super::{CommandError, Context, Flow};
use crate::core::parse::{split_list, split_table_override, take_flag, tokenize};
use crate::output::print_item;
use crate::store::Items;
use crate::value::{item_to_json, AttrValue};

fn print_items(ctx: &mut Context<'_>, items: Items<'_>) -> Result<(), CommandError> {
    for item in items {
        print_item(ctx.out, &item?)?;
    }
    Ok(())
}

pub(super) fn scan(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let (override_name, rest) = split_table_override(args);
    let tokens = tokenize(rest)?;
    let attributes = match tokens.as_slice() {
        [] => None,
        [list] => Some(split_list(list)),
        _ => return Err(CommandError::InvalidArguments),
    };

    let table = ctx.resolve(override_name)?;
    let store = ctx.store;
    let items = store.scan(&table, attributes.as_deref())?;
    print_items(ctx, items)?;
    Ok(Flow::Continue)
}

pub(super) fn query(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let (override_name, rest) = split_table_override(args);
    let mut tokens = tokenize(rest)?;
    let descending = take_flag(&mut tokens, "-r");

    let (hash, attributes) = match tokens.as_slice() {
        [hash] => (hash, None),
        [hash, list] => (hash, Some(split_list(list))),
        _ => return Err(CommandError::InvalidArguments),
    };

    let table = ctx.resolve(override_name)?;
    let hash = AttrValue::from_key_arg(table.schema.hash_key.kind, hash)?;
    let store = ctx.store;
    let items = store.query(&table, &hash, attributes.as_deref(), !descending)?;
    print_items(ctx, items)?;
    Ok(Flow::Continue)
}

pub(super) fn remove_all(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let mut tokens = tokenize(args)?;
    if tokens.last().map(String::as_str) != Some("yes") {
        writeln!(ctx.out, "ok, never mind...")?;
        return Ok(Flow::Continue);
    }
    tokens.pop();

    let tables = if tokens.is_empty() {
        vec![ctx.resolve(None)?]
    } else {
        tokens
            .iter()
            .map(|name| ctx.resolve(Some(name.trim_start_matches(':'))))
            .collect::<Result<Vec<_>, _>>()?
    };

    let store = ctx.store;
    for table in tables {
        writeln!(ctx.out, "from table {}", table.name)?;
        let key_names = table.key_names();
        let mut removed = 0usize;

        for item in store.scan(&table, Some(key_names.as_slice()))? {
            let item = item?;
            let Some(key) = table.key_of(&item) else {
                continue;
            };
            writeln!(ctx.out, "  removing {}", item_to_json(&key))?;
            store.delete_item(&table, &key)?;
            removed += 1;
        }
        debug!(table = %table.name, removed, "rmall finished");
    }
    Ok(Flow::Continue)
}
