use poise::serenity_prelude as serenity;

use crate::store::PendingShop;
use crate::utils::now_ts;
use crate::{Context, Error};

async fn apply_impl(ctx: Context<'_>, shop_name: String, city: String) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();
    let shop_name = shop_name.trim().to_string();
    let city = city.trim().to_string();
    if shop_name.is_empty() || city.is_empty() {
        ctx.say("请输入机厅名称和所在城市，例如：/apply 新机厅 杭州")
            .await?;
        return Ok(());
    }

    let user_id = ctx.author().id.get();
    let nickname = ctx
        .author_member()
        .await
        .and_then(|m| m.nick.clone())
        .unwrap_or_else(|| ctx.author().name.clone());
    let applicant = format!("{nickname}({user_id})");
    let now = now_ts();

    // 本地登记一份, 远端审核接口不可用时 /review 仍有数据
    {
        let mut review = data.store.review_cache.write().await;
        review.pending_shops.push(PendingShop {
            id: now as u64,
            shop_name: shop_name.clone(),
            city: city.clone(),
            applicant: applicant.clone(),
            add_time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
        review.last_update = now;
    }
    data.store.save_review_cache().await;

    let apply_info = format!(
        "收到新的机厅申请：\n机厅名称：{shop_name}\n所在城市：{city}\n申请者：{applicant}\n申请群组：{guild_id}"
    );
    for &super_user in &data.super_users {
        let dm = serenity::UserId::new(super_user)
            .direct_message(
                ctx.serenity_context(),
                serenity::CreateMessage::new().content(apply_info.clone()),
            )
            .await;
        if let Err(e) = dm {
            tracing::warn!("转发机厅申请给超级用户 {super_user} 失败: {e}");
        }
    }

    ctx.say("成功提交机厅申请，请等待审核").await?;
    Ok(())
}

/// 申请添加新机厅
#[poise::command(slash_command, guild_only)]
pub async fn apply(
    ctx: Context<'_>,
    #[description = "机厅名称"] shop_name: String,
    #[description = "所在城市"] city: String,
) -> Result<(), Error> {
    apply_impl(ctx, shop_name, city).await
}
