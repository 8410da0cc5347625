use poise::serenity_prelude as serenity;

use crate::alias::{self, AliasAction, UpdateOp};
use crate::utils::{format, now_ts};
use crate::{config, ratelimit, Data, Error};

/// Alias-triggered text commands: `万达j` queries, `万达10` / `万达+2` /
/// `万达-1` report headcounts. Anything that doesn't resolve against the
/// alias map is silently ignored, so this handler can run on every guild
/// message.
pub async fn handle(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    if msg.author.bot {
        return Ok(());
    }
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let guild_id = guild_id.get();
    let text = msg.content.trim();
    if text.is_empty() {
        return Ok(());
    }

    let resolved = {
        let aliases = data.store.aliases.read().await;
        alias::resolve(&aliases, text)
    };
    let Some((matched_alias, action)) = resolved else {
        return Ok(());
    };

    // 简称目标按本群订阅过滤; 未订阅的简称不产生任何噪音
    let mut subscribed = Vec::new();
    for shop_id in data.store.alias_targets(&matched_alias).await {
        if data.store.is_subscribed(guild_id, shop_id).await {
            subscribed.push(shop_id);
        }
    }
    if subscribed.is_empty() {
        return Ok(());
    }

    let bot_id = ctx.cache.current_user().id;
    let mentioned = msg.mentions.iter().any(|u| u.id == bot_id);
    let should_send = !data.store.is_silent(guild_id).await || mentioned;

    match action {
        AliasAction::Query => handle_query(ctx, msg, data, guild_id, &subscribed, should_send).await,
        AliasAction::Update(op) => {
            // 同一简称指向多个已订阅机厅时, 按列表顺序取第一个
            handle_update(ctx, msg, data, guild_id, subscribed[0], op, should_send).await
        }
    }
}

async fn handle_query(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
    guild_id: u64,
    shop_ids: &[u64],
    should_send: bool,
) -> Result<(), Error> {
    let mut blocks = Vec::new();
    for &shop_id in shop_ids {
        let Some(record) = data.api.get_shop(shop_id).await else {
            continue;
        };
        data.store
            .set_last_number(guild_id, shop_id, record.shop_number)
            .await;
        blocks.push(format::shop_block(&record));
    }

    if should_send && !blocks.is_empty() {
        msg.channel_id.say(ctx, blocks.join("\n\n")).await?;
    }
    Ok(())
}

/// Headcount a report would set, or `None` when it exceeds the safety
/// ceiling. Rejected reports must not mutate state or touch the network.
pub fn plan_new_number(prev: u32, op: UpdateOp) -> Option<u32> {
    let new_number = op.apply(prev);
    (new_number <= config::MAX_REPORT_NUMBER).then_some(new_number)
}

async fn handle_update(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
    guild_id: u64,
    shop_id: u64,
    op: UpdateOp,
    should_send: bool,
) -> Result<(), Error> {
    let user_id = msg.author.id.get();
    let now = now_ts();

    let verdict = ratelimit::check_and_record(&data.store, guild_id, user_id, now).await;
    if let Some(reason) = verdict.rejection_message() {
        // 刷榜提示不受静默模式影响
        msg.reply(ctx, reason).await?;
        return Ok(());
    }

    let prev = data.store.last_number(guild_id, shop_id).await.unwrap_or(0);
    let Some(new_number) = plan_new_number(prev, op) else {
        msg.reply(
            ctx,
            format!("人数超过{}？禁止恶意上报！", config::MAX_REPORT_NUMBER),
        )
        .await?;
        return Ok(());
    };

    let nickname = msg
        .author_nick(ctx)
        .await
        .unwrap_or_else(|| msg.author.name.clone());
    let source = format::make_source(&nickname, user_id);

    let shop_name = data
        .api
        .get_shop(shop_id)
        .await
        .map(|r| format::shop_display_name(&r))
        .unwrap_or_else(|| format!("机厅{shop_id}"));

    // 乐观回复在先, 远端上报失败只记日志
    if should_send {
        msg.channel_id
            .say(
                ctx,
                format!("✅ 更新成功！\n{shop_name}\n当前：{new_number} 人"),
            )
            .await?;
    }

    if !data.api.update_shop_number(shop_id, new_number, &source).await {
        tracing::warn!("机厅 {shop_id} 人数远端上报失败 (本地已更新为 {new_number})");
    }

    data.store.set_last_number(guild_id, shop_id, new_number).await;
    data.store
        .record_report(guild_id, user_id, &nickname, now)
        .await;
    Ok(())
}
