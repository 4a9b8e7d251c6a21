use super::{CommandError, Context, Flow};
use crate::core::parse::{split_table_override, tokenize};
use crate::output::{print_item, print_maybe_item};
use crate::store::ReturnValues;
use crate::value::item_from_json;

/// `hashkey [rangekey]`, tokenized the same way for every item command.
fn key_tokens(args: &str) -> Result<(String, Option<String>), CommandError> {
    let mut tokens = tokenize(args)?.into_iter();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(hash), range, None) => Ok((hash, range)),
        _ => Err(CommandError::InvalidArguments),
    }
}

pub(super) fn put(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let (override_name, body) = split_table_override(args);
    if body.is_empty() {
        return Err(CommandError::InvalidArguments);
    }

    let item = item_from_json(body)?;
    let table = ctx.resolve(override_name)?;
    ctx.store.put_item(&table, &item)?;
    Ok(Flow::Continue)
}

pub(super) fn update(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let (override_name, rest) = split_table_override(args);
    let brace = rest.find('{').ok_or(CommandError::InvalidArguments)?;
    let (key_part, rest) = rest.split_at(brace);
    let (hash, range) = key_tokens(key_part)?;

    let end = rest.rfind('}').ok_or(CommandError::InvalidArguments)?;
    let (body, trailer) = rest.split_at(end + 1);
    let returns = match trailer.trim() {
        "" => ReturnValues::default(),
        token => token
            .parse()
            .map_err(CommandError::InvalidReturnValues)?,
    };

    let attributes = item_from_json(body)?;
    if attributes.is_empty() {
        return Err(CommandError::InvalidArguments);
    }

    let table = ctx.resolve(override_name)?;
    let key = table.key(&hash, range.as_deref())?;

    let mut pending = key.clone();
    pending.extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
    print_item(ctx.out, &pending)?;

    let returned = ctx.store.update_item(&table, &key, &attributes, returns)?;
    print_maybe_item(ctx.out, returned.as_ref())?;
    Ok(Flow::Continue)
}

pub(super) fn get(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let (override_name, rest) = split_table_override(args);
    let (hash, range) = key_tokens(rest)?;

    let table = ctx.resolve(override_name)?;
    let key = table.key(&hash, range.as_deref())?;
    let item = ctx
        .store
        .get_item(&table, &key, None, ctx.session.consistent_read)?;
    print_maybe_item(ctx.out, item.as_ref())?;
    Ok(Flow::Continue)
}

pub(super) fn remove(ctx: &mut Context<'_>, args: &str) -> Result<Flow, CommandError> {
    let (override_name, rest) = split_table_override(args);
    let (hash, range) = key_tokens(rest)?;

    let table = ctx.resolve(override_name)?;
    let key = table.key(&hash, range.as_deref())?;
    let key_names = table.key_names();
    let existing = ctx.store.get_item(
        &table,
        &key,
        Some(key_names.as_slice()),
        ctx.session.consistent_read,
    )?;

    if let Some(item) = existing {
        let stored_key = table.key_of(&item).unwrap_or(key);
        ctx.store.delete_item(&table, &stored_key)?;
    }
    Ok(Flow::Continue)
}
