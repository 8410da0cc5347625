use crate::{Context, Error};

async fn silent_impl(ctx: Context<'_>, mode: Option<String>) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();

    let Some(mode) = mode else {
        let state = if data.store.is_silent(guild_id).await {
            "开启"
        } else {
            "关闭"
        };
        ctx.say(format!("当前群组静默模式：{state}")).await?;
        return Ok(());
    };

    match mode.trim() {
        "开" | "开启" | "on" | "1" => {
            if data.store.set_silent(guild_id, true).await {
                ctx.say("已开启静默模式，机器人将不再主动回复人数消息，但可通过@机器人进行查询。")
                    .await?;
            } else {
                ctx.say("静默模式已经开启").await?;
            }
        }
        "关" | "关闭" | "off" | "0" => {
            if data.store.set_silent(guild_id, false).await {
                ctx.say("已关闭静默模式，机器人将正常回复人数消息").await?;
            } else {
                ctx.say("静默模式已经关闭").await?;
            }
        }
        _ => {
            ctx.say("参数错误，请使用：开启/关闭").await?;
        }
    }
    Ok(())
}

/// 本群机厅消息静默模式 (不带参数查看状态)
#[poise::command(slash_command, guild_only)]
pub async fn silent(
    ctx: Context<'_>,
    #[description = "开启/关闭"] mode: Option<String>,
) -> Result<(), Error> {
    silent_impl(ctx, mode).await
}
