mod alias_cmd;
mod apply;
mod help;
mod jtj;
mod rank;
mod review;
mod silent;
mod subscribe;

use crate::{Data, Error};

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        jtj::jtj(),
        subscribe::subscribe(),
        subscribe::unsubscribe(),
        subscribe::subscribe_city(),
        subscribe::unsubscribe_city(),
        alias_cmd::alias_add(),
        alias_cmd::alias_remove(),
        alias_cmd::alias_list(),
        silent::silent(),
        rank::rank(),
        apply::apply(),
        review::review(),
        review::review_pass(),
        review::review_clear(),
        help::help(),
    ]
}

/// Guild id of the invocation, or a user-facing error for DMs.
fn guild_id(ctx: &crate::Context<'_>) -> Result<u64, Error> {
    ctx.guild_id()
        .map(|id| id.get())
        .ok_or_else(|| "仅限群内使用".into())
}

/// Split a space/comma separated id list, tolerating Chinese commas.
/// `None` when anything fails to parse or the list comes out empty.
fn parse_id_list(raw: &str) -> Option<Vec<u64>> {
    let cleaned = raw.replace('，', " ").replace(',', " ");
    let ids: Vec<u64> = cleaned
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    (!ids.is_empty()).then_some(ids)
}
