use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::app::Result;
use crate::domain::{FeedType, Item};
use crate::fetcher::ItemStore;
use crate::normalizer::Normalizer;

pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0/";

const USER_AGENT: &str = concat!("thicket/", env!("CARGO_PKG_VERSION"));

pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    normalizer: Normalizer,
}

impl HttpFetcher {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(USER_AGENT)
            .build()?;

        // Url::join drops the last path segment unless the base ends in '/'
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            normalizer: Normalizer::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn item_url(&self, id: i64) -> Result<Url> {
        Ok(self.base_url.join(&format!("item/{}.json", id))?)
    }

    pub fn feed_url(&self, feed: FeedType) -> Result<Url> {
        Ok(self.base_url.join(&format!("{}.json", feed.endpoint()))?)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ItemStore for HttpFetcher {
    async fn fetch_item(&self, id: i64) -> Result<Item> {
        let body = self.get(self.item_url(id)?).await?;
        self.normalizer.normalize_item(id, &body)
    }

    async fn fetch_id_list(&self, feed: FeedType) -> Result<Vec<i64>> {
        let body = self.get(self.feed_url(feed)?).await?;
        self.normalizer.normalize_id_list(&body)
    }
}
