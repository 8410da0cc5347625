use std::sync::Arc;
use std::time::Duration;

use maihere_bot::{api, commands, config, events, store, tasks, Data};
use poise::serenity_prelude as serenity;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    let store = Arc::new(store::Store::load(&config.data_dir));
    let api = api::ApiClient::new(
        &config.api_url,
        &config.api_key,
        config::CACHE_TTL,
        Arc::clone(&store),
    );
    let super_users = config.super_users.clone();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // 后台定时重刷已订阅机厅的缓存
                tokio::spawn(tasks::refresh_loop(
                    Arc::clone(&store),
                    api.clone(),
                    Duration::from_secs(config::REFRESH_INTERVAL_SECS),
                ));

                tracing::info!("maihere-bot 启动完成");
                Ok(Data {
                    store,
                    api,
                    super_users,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .expect("创建客户端失败");

    if let Err(e) = client.start().await {
        tracing::error!("客户端运行错误: {e}");
    }
}
