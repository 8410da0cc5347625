use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::{Context, Error};

async fn help_impl(ctx: Context<'_>) -> Result<(), Error> {
    let query_cmds = "\
`/jtj [简称/ID/城市]` — 查询机厅人数, 留空查询本群订阅
`/subscribe <id...>` — 订阅机厅
`/unsubscribe <id...>` — 退订机厅
`/subscribe_city <城市>` — 订阅城市全部机厅
`/unsubscribe_city <城市>` — 退订城市全部机厅
`/alias_add <id> <简称>` — 添加机厅简称
`/alias_remove <id> <简称>` — 删除机厅简称
`/alias_list [id]` — 查看简称
`/rank` — 今日上报贡献榜
`/silent [开启/关闭]` — 本群静默模式
`/apply <名称> <城市>` — 申请添加机厅";

    let text_cmds = "\
`<简称>j` / `<简称>几` — 查询该机厅人数
`<简称><数字>` — 人数设置为指定值 (如: 万达10)
`<简称>+<数字>` — 人数增加 (如: 万达+2)
`<简称>-<数字>` — 人数减少 (如: 万达-1)";

    let embed = CreateEmbed::new()
        .title("机厅人数查询帮助")
        .field("指令", query_cmds, false)
        .field("文本触发", text_cmds, false)
        .color(0x5865F2);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// 机器人命令帮助
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    help_impl(ctx).await
}
