use std::future::Future;
use threatboard::config;
use threatboard::models::{
    Health, IocPage, IocQuery, IocStats, NewSource, ScrapeResult, SessionIocs, SessionPage,
    SessionQuery, Source, SourceUpdate,
};
use threatboard::{ApiClient, ApiError, ApiResponse};
use yew::{Component, Context};

pub enum FetchState<T> {
    NotStarted,
    Fetching,
    Success(T),
    Failed(anyhow::Error),
}

impl<T> From<anyhow::Result<T>> for FetchState<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => FetchState::Success(value),
            Err(err) => FetchState::Failed(err),
        }
    }
}

thread_local! {
    static CLIENT: ApiClient = ApiClient::new(base_url());
}

fn base_url() -> String {
    let location = gloo_utils::window().location();
    let origin = location.origin().unwrap_or_default();
    config::resolve_base_url(config::build_time_api_base_url(), &origin)
}

/// The application wide client, created on first use.
pub fn client() -> ApiClient {
    CLIENT.with(|client| client.clone())
}

fn fetch<C, R, Fut, D, F, M>(ctx: &Context<C>, request: R, callback: F)
where
    C: Component,
    R: FnOnce(ApiClient) -> Fut + 'static,
    Fut: Future<Output = Result<ApiResponse, ApiError>> + 'static,
    D: serde::de::DeserializeOwned,
    F: FnOnce(anyhow::Result<D>) -> M + 'static,
    M: Into<C::Message>,
{
    let client = client();
    ctx.link().send_future(async move {
        let result = request(client)
            .await
            .and_then(|response| response.json::<D>())
            .map_err(anyhow::Error::from);
        callback(result)
    });
}

pub fn health_check<C, F, M>(ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<Health>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(ctx, |client| async move { client.health_check().await }, callback);
}

pub fn get_sources<C, F, M>(ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<Vec<Source>>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(ctx, |client| async move { client.get_sources().await }, callback);
}

pub fn create_source<C, F, M>(source: NewSource, ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<Source>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(
        ctx,
        move |client| async move { client.create_source(&source).await },
        callback,
    );
}

pub fn update_source<C, F, M>(id: u64, update: SourceUpdate, ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<Source>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(
        ctx,
        move |client| async move { client.update_source(id, &update).await },
        callback,
    );
}

pub fn delete_source<C, F, M>(id: u64, ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<()>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(
        ctx,
        move |client| async move { client.delete_source(id).await },
        callback,
    );
}

pub fn scrape_adhoc<C, F, M>(url: String, include_private_ips: bool, ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<ScrapeResult>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(
        ctx,
        move |client| async move { client.scrape_adhoc(&url, Some(include_private_ips)).await },
        callback,
    );
}

pub fn scrape_source<C, F, M>(id: u64, ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<ScrapeResult>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(
        ctx,
        move |client| async move { client.scrape_source(id).await },
        callback,
    );
}

pub fn get_iocs<C, F, M>(query: IocQuery, ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<IocPage>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(
        ctx,
        move |client| async move { client.get_iocs(&query).await },
        callback,
    );
}

pub fn get_ioc_stats<C, F, M>(ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<IocStats>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(ctx, |client| async move { client.get_ioc_stats().await }, callback);
}

pub fn get_sessions<C, F, M>(query: SessionQuery, ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<SessionPage>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(
        ctx,
        move |client| async move { client.get_sessions(&query).await },
        callback,
    );
}

pub fn get_session_iocs<C, F, M>(id: u64, ctx: &Context<C>, callback: F)
where
    C: Component,
    F: FnOnce(anyhow::Result<SessionIocs>) -> M + 'static,
    M: Into<C::Message>,
{
    fetch(
        ctx,
        move |client| async move { client.get_session_iocs(id).await },
        callback,
    );
}
