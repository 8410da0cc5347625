use crate::utils::now_ts;
use crate::{Context, Error};

fn is_super_user(ctx: &Context<'_>) -> bool {
    ctx.data().super_users.contains(&ctx.author().id.get())
}

async fn review_impl(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    if !is_super_user(&ctx) {
        ctx.say("无权限操作，仅超级用户可用。").await?;
        return Ok(());
    }

    ctx.defer().await?;
    match data.api.list_pending().await {
        Ok(pending) if !pending.is_empty() => {
            let mut lines = vec!["待审核机厅列表：".to_string()];
            for shop in &pending {
                lines.push(format!(
                    "ID: {}\n店名: {}\n地址: {}\n",
                    shop.id, shop.shop_name, shop.shop_address
                ));
            }
            lines.push("请使用 /review_pass <ID> 通过审核".to_string());
            ctx.say(lines.join("\n")).await?;
        }
        other => {
            if let Err(e) = other {
                tracing::warn!("获取远端待审核列表失败: {e}");
            }
            // 远端不可用或为空时回退到本地登记
            let review = data.store.review_cache.read().await;
            if review.pending_shops.is_empty() {
                ctx.say("暂无待审核机厅。").await?;
            } else {
                let mut lines = vec!["待审核机厅列表（本地缓存）：".to_string()];
                for shop in &review.pending_shops {
                    lines.push(format!(
                        "ID: {}\n店名: {}\n城市: {}\n申请者: {}\n",
                        shop.id, shop.shop_name, shop.city, shop.applicant
                    ));
                }
                lines.push("请使用 /review_pass <ID> 通过审核".to_string());
                ctx.say(lines.join("\n")).await?;
            }
        }
    }
    Ok(())
}

async fn review_pass_impl(ctx: Context<'_>, shop_id: u64) -> Result<(), Error> {
    let data = ctx.data();
    if !is_super_user(&ctx) {
        ctx.say("无权限操作，仅超级用户可用。").await?;
        return Ok(());
    }

    ctx.defer().await?;
    match data.api.pass_shop(shop_id).await {
        Ok(()) => {
            ctx.say(format!("机厅ID {shop_id} 审核通过成功！")).await?;
        }
        Err(e) => {
            tracing::warn!("远端审核机厅 {shop_id} 失败: {e}");
            // 回退到本地登记的申请
            let found = {
                let mut review = data.store.review_cache.write().await;
                let before = review.pending_shops.len();
                review.pending_shops.retain(|shop| shop.id != shop_id);
                let found = review.pending_shops.len() != before;
                if found {
                    review.last_update = now_ts();
                }
                found
            };
            if found {
                data.store.save_review_cache().await;
                ctx.say(format!("机厅ID {shop_id} 审核通过成功（本地缓存）！"))
                    .await?;
            } else {
                ctx.say(format!("审核失败：{e}")).await?;
            }
        }
    }
    Ok(())
}

async fn review_clear_impl(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    if !is_super_user(&ctx) {
        ctx.say("无权限操作，仅超级用户可用。").await?;
        return Ok(());
    }

    ctx.defer().await?;
    match data.api.clear_review().await {
        Ok(()) => ctx.say("清空审核机厅列表成功！").await?,
        Err(e) => ctx.say(format!("清空审核机厅失败：{e}")).await?,
    };
    Ok(())
}

/// 查看待审核机厅列表 (超级用户)
#[poise::command(slash_command)]
pub async fn review(ctx: Context<'_>) -> Result<(), Error> {
    review_impl(ctx).await
}

/// 通过指定机厅的审核 (超级用户)
#[poise::command(slash_command)]
pub async fn review_pass(
    ctx: Context<'_>,
    #[description = "机厅ID"] shop_id: u64,
) -> Result<(), Error> {
    review_pass_impl(ctx, shop_id).await
}

/// 清空待审核机厅列表 (超级用户)
#[poise::command(slash_command)]
pub async fn review_clear(ctx: Context<'_>) -> Result<(), Error> {
    review_clear_impl(ctx).await
}
