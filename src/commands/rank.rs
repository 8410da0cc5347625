use crate::{Context, Error};

const RANK_LIMIT: usize = 10;

async fn rank_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = super::guild_id(&ctx)?;
    let data = ctx.data();
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    let mut user_counts: Vec<(String, u32)> = {
        let stats = data.store.report_stats.read().await;
        let Some(group_stats) = stats
            .daily_stats
            .get(&today)
            .and_then(|day| day.get(&guild_id))
        else {
            ctx.say("今日暂无上报数据，快去更新机厅人数吧！").await?;
            return Ok(());
        };
        group_stats
            .iter()
            .map(|(user_id, count)| {
                let nickname = stats
                    .user_stats
                    .get(user_id)
                    .map(|u| u.nickname.split('(').next().unwrap_or("匿名用户").to_string())
                    .unwrap_or_else(|| "匿名用户".to_string());
                (nickname, *count)
            })
            .collect()
    };

    if user_counts.is_empty() {
        ctx.say("今日暂无上报数据。").await?;
        return Ok(());
    }
    user_counts.sort_by(|a, b| b.1.cmp(&a.1));

    let mut rank_text = String::from("【今日机厅上报榜】\n");
    for (i, (nickname, count)) in user_counts.iter().take(RANK_LIMIT).enumerate() {
        let prefix = match i {
            0 => "🥇".to_string(),
            1 => "🥈".to_string(),
            2 => "🥉".to_string(),
            _ => format!("{}. ", i + 1),
        };
        rank_text.push_str(&format!("{prefix} {nickname}: {count}次\n"));
    }
    ctx.say(rank_text.trim_end()).await?;
    Ok(())
}

/// 今日机厅上报贡献榜
#[poise::command(slash_command, guild_only)]
pub async fn rank(ctx: Context<'_>) -> Result<(), Error> {
    rank_impl(ctx).await
}
