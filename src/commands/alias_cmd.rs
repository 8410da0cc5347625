use crate::utils::format;
use crate::{Context, Error};

async fn alias_add_impl(ctx: Context<'_>, shop_id: u64, alias: String) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();
    let alias = alias.trim().to_string();
    if alias.is_empty() {
        ctx.say("简称不能为空。").await?;
        return Ok(());
    }

    if !data.store.is_subscribed(guild_id, shop_id).await {
        ctx.say(format!("未订阅ID为 {shop_id} 的机厅，请先订阅后再设置简称。"))
            .await?;
        return Ok(());
    }

    if !data.store.add_alias(&alias, shop_id).await {
        ctx.say(format!("机厅 {shop_id} 已经有简称: {alias}")).await?;
        return Ok(());
    }

    ctx.defer().await?;
    let shop_name = data
        .api
        .get_shop(shop_id)
        .await
        .map(|r| format::shop_display_name(&r))
        .unwrap_or_else(|| format!("机厅{shop_id}"));
    ctx.say(format!("✅ 已为 {shop_name}({shop_id}) 添加简称: {alias}"))
        .await?;
    Ok(())
}

async fn alias_remove_impl(ctx: Context<'_>, shop_id: u64, alias: String) -> Result<(), Error> {
    super::guild_id(&ctx)?;
    let data = ctx.data();
    let alias = alias.trim().to_string();

    if data.store.remove_alias(&alias, shop_id).await {
        ctx.say(format!("🗑️ 已删除机厅 {shop_id} 的简称: {alias}"))
            .await?;
    } else {
        ctx.say(format!("机厅 {shop_id} 没有简称: {alias}")).await?;
    }
    Ok(())
}

async fn alias_list_impl(ctx: Context<'_>, shop_id: Option<u64>) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();

    // 指定机厅: 列出它的全部简称
    if let Some(shop_id) = shop_id {
        if !data.store.is_subscribed(guild_id, shop_id).await {
            ctx.say(format!("未订阅ID为 {shop_id} 的机厅，无法查看其简称。"))
                .await?;
            return Ok(());
        }

        let shop_aliases: Vec<String> = {
            let aliases = data.store.aliases.read().await;
            let mut names: Vec<String> = aliases
                .alias_to_ids
                .iter()
                .filter(|(_, ids)| ids.contains(&shop_id))
                .map(|(alias, _)| alias.clone())
                .collect();
            names.sort();
            names
        };

        ctx.defer().await?;
        let shop_name = data
            .api
            .get_shop(shop_id)
            .await
            .map(|r| format::shop_display_name(&r))
            .unwrap_or_else(|| "未知机厅".to_string());

        if shop_aliases.is_empty() {
            ctx.say(format!("{shop_name}({shop_id}) 没有设置简称。")).await?;
        } else {
            ctx.say(format!(
                "{shop_name}({shop_id}) 的简称:\n{}",
                shop_aliases.join("\n")
            ))
            .await?;
        }
        return Ok(());
    }

    // 不带参数: 按简称分组列出本群订阅机厅的全部简称
    let subscribed = data.store.subscribed_ids(guild_id).await;
    if subscribed.is_empty() {
        ctx.say("本群尚未订阅任何机厅。").await?;
        return Ok(());
    }

    let mut lines: Vec<String> = {
        let aliases = data.store.aliases.read().await;
        aliases
            .alias_to_ids
            .iter()
            .filter_map(|(alias, ids)| {
                let in_group: Vec<String> = ids
                    .iter()
                    .filter(|id| subscribed.contains(id))
                    .map(u64::to_string)
                    .collect();
                (!in_group.is_empty()).then(|| format!("• {alias}: {}", in_group.join(", ")))
            })
            .collect()
    };
    lines.sort();

    if lines.is_empty() {
        ctx.say("本群订阅的机厅均未设置简称。").await?;
    } else {
        ctx.say(format!("本群机厅简称列表:\n{}", lines.join("\n")))
            .await?;
    }
    Ok(())
}

/// 为机厅添加简称 (需先订阅)
#[poise::command(slash_command, guild_only)]
pub async fn alias_add(
    ctx: Context<'_>,
    #[description = "机厅ID"] shop_id: u64,
    #[description = "简称"] alias: String,
) -> Result<(), Error> {
    alias_add_impl(ctx, shop_id, alias).await
}

/// 删除机厅的简称
#[poise::command(slash_command, guild_only)]
pub async fn alias_remove(
    ctx: Context<'_>,
    #[description = "机厅ID"] shop_id: u64,
    #[description = "简称"] alias: String,
) -> Result<(), Error> {
    alias_remove_impl(ctx, shop_id, alias).await
}

/// 查看简称 (不带参数列出本群全部简称)
#[poise::command(slash_command, guild_only)]
pub async fn alias_list(
    ctx: Context<'_>,
    #[description = "机厅ID"] shop_id: Option<u64>,
) -> Result<(), Error> {
    alias_list_impl(ctx, shop_id).await
}
