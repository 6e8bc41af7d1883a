//! Test helpers for API tests.
//!
//! Provides a scripted HTTP client standing in for the platform, feed
//! document builders, and a ready-to-use test server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;

use subfeed::web::{create_health_router, create_router, AppState};
use subfeed::youtube::feed::feed_url;
use subfeed::youtube::resolver::channel_page_url;
use subfeed::{Database, HttpClient, RequestProfile, ScheduleClock, SubfeedError};

pub const ALPHA: &str = "UCaaaaaaaaaaaaaaaaaaaaaa";
pub const BETA: &str = "UCbbbbbbbbbbbbbbbbbbbbbb";

/// Scripted platform: canned bodies per URL, 404 for everything else.
#[derive(Default)]
pub struct ScriptedPlatform {
    pages: Mutex<HashMap<String, Result<Vec<u8>, u16>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.into()));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(status));
    }

    /// Serve a channel feed and an avatar page for it.
    pub fn add_channel(&self, channel_id: &str, name: &str, videos: &[(&str, &str)]) {
        self.serve(&feed_url(channel_id), feed_xml(channel_id, name, videos));
        self.serve(
            &channel_page_url(channel_id),
            format!(
                r#"<script>var ytInitialData = {{"avatar":{{"thumbnails":[{{"url":"https://yt3.googleusercontent.com/{}=s88"}}]}}}};</script>"#,
                channel_id
            ),
        );
    }

    /// Serve a handle page that names `channel_id`.
    pub fn add_handle_page(&self, handle: &str, channel_id: &str) {
        self.serve(
            &format!("https://www.youtube.com/{}", handle),
            format!(
                r#"<html><head><meta itemprop="channelId" content="{}"></head></html>"#,
                channel_id
            ),
        );
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| *u == url)
            .count()
    }

    pub fn feed_requests(&self, channel_id: &str) -> usize {
        self.request_count(&feed_url(channel_id))
    }
}

#[async_trait]
impl HttpClient for ScriptedPlatform {
    async fn get(&self, url: &str, _profile: RequestProfile) -> subfeed::Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(SubfeedError::HttpStatus(*status)),
            None => Err(SubfeedError::HttpStatus(404)),
        }
    }
}

/// Atom feed with `(video_id, published)` entries.
pub fn feed_xml(channel_id: &str, name: &str, videos: &[(&str, &str)]) -> String {
    let entries: String = videos
        .iter()
        .map(|(id, published)| {
            format!(
                r#"<entry>
  <id>yt:video:{id}</id>
  <yt:videoId>{id}</yt:videoId>
  <title>Video {id}</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v={id}"/>
  <published>{published}</published>
  <media:group>
   <media:title>Video {id}</media:title>
   <media:thumbnail url="https://i4.ytimg.com/vi/{id}/hqdefault.jpg" width="480" height="360"/>
   <media:description>Description of {id}</media:description>
  </media:group>
 </entry>
"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
 <id>yt:channel:{channel_id}</id>
 <title>{name}</title>
 <author><name>{name}</name><uri>https://www.youtube.com/channel/{channel_id}</uri></author>
 {entries}
</feed>"#
    )
}

/// Test server over an in-memory database and the scripted platform.
pub async fn create_test_server(platform: Arc<ScriptedPlatform>) -> (TestServer, Database) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let clock = ScheduleClock::new("America/Sao_Paulo", &[8, 20]).expect("valid schedule");
    let state = AppState::new(db.clone(), platform, clock, Duration::from_secs(2));

    let router = create_router(Arc::new(state), &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}
