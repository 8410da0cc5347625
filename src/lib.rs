use std::sync::Arc;

pub mod alias;
pub mod api;
pub mod commands;
pub mod config;
pub mod events;
pub mod ratelimit;
pub mod store;
pub mod tasks;
pub mod utils;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub struct Data {
    pub store: Arc<store::Store>,
    pub api: api::ApiClient,
    pub super_users: Vec<u64>,
}
