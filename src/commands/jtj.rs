use crate::utils::format;
use crate::{Context, Error};

/// 城市列表最多逐条展示的机厅数
const CITY_LIST_LIMIT: usize = 20;

async fn jtj_impl(ctx: Context<'_>, identifier: Option<String>) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();
    let identifier = identifier.unwrap_or_default().trim().to_string();

    // 无参数: 查询本群订阅的全部机厅
    if identifier.is_empty() {
        let mut shop_ids = data.store.subscribed_ids(guild_id).await;
        if shop_ids.is_empty() {
            ctx.say("本群尚未订阅任何机厅，请使用 /subscribe 进行订阅。")
                .await?;
            return Ok(());
        }
        shop_ids.sort_unstable();

        ctx.defer().await?;
        let blocks = render_shops(&ctx, guild_id, &shop_ids).await;
        ctx.say(blocks.join("\n\n")).await?;
        return Ok(());
    }

    // 简称查询: 只展示本群已订阅的目标
    let targets = data.store.alias_targets(&identifier).await;
    if !targets.is_empty() {
        let mut subscribed = Vec::new();
        for shop_id in targets {
            if data.store.is_subscribed(guild_id, shop_id).await {
                subscribed.push(shop_id);
            }
        }
        if subscribed.is_empty() {
            ctx.say(format!("本群未订阅简称 '{identifier}' 对应的任何机厅。"))
                .await?;
            return Ok(());
        }

        ctx.defer().await?;
        let blocks = render_shops(&ctx, guild_id, &subscribed).await;
        ctx.say(blocks.join("\n\n")).await?;
        return Ok(());
    }

    // 纯数字: 按机厅ID查询
    if let Ok(shop_id) = identifier.parse::<u64>() {
        ctx.defer().await?;
        match data.api.get_shop(shop_id).await {
            Some(record) => ctx.say(format::shop_block(&record)).await?,
            None => ctx.say(format!("未找到ID为{shop_id}的机厅信息")).await?,
        };
        return Ok(());
    }

    // 其余输入按城市名处理
    ctx.defer().await?;
    let shops = data.api.get_city_shops(&identifier).await;
    let shops = match shops {
        Some(shops) if !shops.is_empty() => shops,
        _ => {
            ctx.say(format!(
                "没有查到城市 '{identifier}' 的机厅信息，请确认城市名是否正确。"
            ))
            .await?;
            return Ok(());
        }
    };

    let mut lines = vec![format!("城市 '{identifier}' 的机厅信息：")];
    for record in shops.iter().take(CITY_LIST_LIMIT) {
        lines.push(format::shop_line(record));
    }
    if shops.len() > CITY_LIST_LIMIT {
        lines.push(format!("……共 {} 家机厅", shops.len()));
    }
    ctx.say(lines.join("\n")).await?;
    Ok(())
}

/// Fetch and render each shop, syncing the locally tracked headcount as a
/// side effect of the query (the original does the same).
async fn render_shops(ctx: &Context<'_>, guild_id: u64, shop_ids: &[u64]) -> Vec<String> {
    let data = ctx.data();
    let mut blocks = Vec::new();
    for &shop_id in shop_ids {
        match data.api.get_shop(shop_id).await {
            Some(record) => {
                data.store
                    .set_last_number(guild_id, shop_id, record.shop_number)
                    .await;
                blocks.push(format::shop_block(&record));
            }
            None => blocks.push(format!("机厅{shop_id} (数据获取失败)")),
        }
    }
    blocks
}

/// 查询机厅人数 (简称/ID/城市, 留空查询本群订阅)
#[poise::command(slash_command, guild_only)]
pub async fn jtj(
    ctx: Context<'_>,
    #[description = "简称、机厅ID或城市名"] identifier: Option<String>,
) -> Result<(), Error> {
    jtj_impl(ctx, identifier).await
}
