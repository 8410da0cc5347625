use crate::utils::format;
use crate::{Context, Error};

/// 城市批量订阅结果明细的展示上限
const DETAIL_LIMIT: usize = 10;

async fn subscribe_impl(ctx: Context<'_>, ids: String) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();

    let Some(shop_ids) = super::parse_id_list(&ids) else {
        ctx.say("机厅ID必须是数字，多个ID用空格分隔。").await?;
        return Ok(());
    };

    ctx.defer().await?;
    let mut results = Vec::new();
    for shop_id in shop_ids {
        let record = data.api.get_shop(shop_id).await;
        let shop_name = record
            .as_ref()
            .map(format::shop_display_name)
            .unwrap_or_else(|| "未知机厅".to_string());

        if data.store.is_subscribed(guild_id, shop_id).await {
            results.push(format!("✅ {shop_name}({shop_id}) - 已订阅"));
            continue;
        }
        if record.is_none() {
            results.push(format!("⚠️ {shop_id} - 机厅不存在或无法获取信息"));
            continue;
        }
        data.store.subscribe(guild_id, shop_id).await;
        results.push(format!("🎉 {shop_name}({shop_id}) - 订阅成功"));
    }
    ctx.say(results.join("\n")).await?;
    Ok(())
}

async fn unsubscribe_impl(ctx: Context<'_>, ids: String) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();

    let Some(shop_ids) = super::parse_id_list(&ids) else {
        ctx.say("机厅ID必须是数字，多个ID用空格分隔。").await?;
        return Ok(());
    };

    ctx.defer().await?;
    let mut results = Vec::new();
    for shop_id in shop_ids {
        // 即使机厅已从API下线, 只要在订阅列表中就可以退订
        let shop_name = data
            .api
            .get_shop(shop_id)
            .await
            .map(|r| format::shop_display_name(&r))
            .unwrap_or_else(|| format!("机厅{shop_id}"));

        if data.store.unsubscribe(guild_id, shop_id).await {
            results.push(format!("🗑️ {shop_name} - 取消订阅成功"));
        } else {
            results.push(format!("⚠️ {shop_name} - 未订阅"));
        }
    }
    ctx.say(results.join("\n")).await?;
    Ok(())
}

async fn subscribe_city_impl(ctx: Context<'_>, city: String) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();
    let city = city.trim().to_string();
    if city.is_empty() {
        ctx.say("请输入要订阅的城市名称。").await?;
        return Ok(());
    }

    ctx.defer().await?;
    let shops = match data.api.get_city_shops(&city).await {
        Some(shops) if !shops.is_empty() => shops,
        _ => {
            ctx.say(format!("没有查到 {city} 的机厅信息，请检查城市名称是否正确。"))
                .await?;
            return Ok(());
        }
    };

    let mut added = Vec::new();
    let mut already = 0;
    for record in &shops {
        if data.store.subscribe(guild_id, record.id).await {
            added.push(format!("{}({})", format::shop_display_name(record), record.id));
        } else {
            already += 1;
        }
    }

    let reply = if added.is_empty() {
        if already > 0 {
            format!("已订阅 {city} 的所有机厅，共 {already} 个。")
        } else {
            format!("未能订阅 {city} 的任何机厅。")
        }
    } else {
        let mut summary = format!("成功订阅 {city} 的 {} 个机厅", added.len());
        if already > 0 {
            summary.push_str(&format!("，已有 {already} 个机厅被订阅"));
        }
        if added.len() > DETAIL_LIMIT {
            format!("{summary}。\n包括：{} 等。", added[..DETAIL_LIMIT].join(", "))
        } else {
            format!("{summary}：\n{}", added.join("\n"))
        }
    };
    ctx.say(reply).await?;
    Ok(())
}

async fn unsubscribe_city_impl(ctx: Context<'_>, city: String) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();
    let city = city.trim().to_string();
    if city.is_empty() {
        ctx.say("请输入要取消订阅的城市名称。").await?;
        return Ok(());
    }

    ctx.defer().await?;
    let shops = match data.api.get_city_shops(&city).await {
        Some(shops) if !shops.is_empty() => shops,
        _ => {
            ctx.say(format!("没有查到 {city} 的机厅信息。")).await?;
            return Ok(());
        }
    };

    let mut removed = Vec::new();
    for record in &shops {
        if data.store.unsubscribe(guild_id, record.id).await {
            removed.push(format::shop_display_name(record));
        }
    }

    let reply = if removed.is_empty() {
        format!("本群未订阅 {city} 的任何机厅。")
    } else if removed.len() > DETAIL_LIMIT {
        format!("成功取消订阅 {city} 的 {} 个机厅。", removed.len())
    } else {
        format!(
            "成功取消订阅 {city} 的 {} 个机厅：\n{}",
            removed.len(),
            removed.join(", ")
        )
    };
    ctx.say(reply).await?;
    Ok(())
}

/// 订阅机厅 (多个ID用空格分隔)
#[poise::command(slash_command, guild_only)]
pub async fn subscribe(
    ctx: Context<'_>,
    #[description = "机厅ID, 多个用空格分隔"] ids: String,
) -> Result<(), Error> {
    subscribe_impl(ctx, ids).await
}

/// 退订机厅 (多个ID用空格分隔)
#[poise::command(slash_command, guild_only)]
pub async fn unsubscribe(
    ctx: Context<'_>,
    #[description = "机厅ID, 多个用空格分隔"] ids: String,
) -> Result<(), Error> {
    unsubscribe_impl(ctx, ids).await
}

/// 订阅指定城市的所有机厅
#[poise::command(slash_command, guild_only)]
pub async fn subscribe_city(
    ctx: Context<'_>,
    #[description = "城市名"] city: String,
) -> Result<(), Error> {
    subscribe_city_impl(ctx, city).await
}

/// 退订指定城市的所有机厅
#[poise::command(slash_command, guild_only)]
pub async fn unsubscribe_city(
    ctx: Context<'_>,
    #[description = "城市名"] city: String,
) -> Result<(), Error> {
    unsubscribe_city_impl(ctx, city).await
}
