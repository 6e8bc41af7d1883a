//! Test doubles for the HTTP seam.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, SubfeedError};
use crate::youtube::feed::feed_url;
use crate::youtube::http::{HttpClient, RequestProfile};

#[derive(Clone)]
enum Reply {
    Body(Vec<u8>),
    Status(u16),
    Network,
}

#[derive(Clone)]
struct Route {
    reply: Reply,
    delay: Option<Duration>,
}

/// Canned-response client that records every request.
///
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeHttpClient {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<(String, RequestProfile)>>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(&self, url: &str, reply: Reply, delay: Option<Duration>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route { reply, delay });
    }

    pub fn with_body(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.route(url, Reply::Body(body.into()), None);
        self
    }

    pub fn with_delayed_body(self, url: &str, body: impl Into<Vec<u8>>, delay: Duration) -> Self {
        self.route(url, Reply::Body(body.into()), Some(delay));
        self
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.route(url, Reply::Status(status), None);
        self
    }

    pub fn with_network_error(self, url: &str) -> Self {
        self.route(url, Reply::Network, None);
        self
    }

    /// Serve `xml` as the feed for `channel_id`.
    pub fn with_feed(self, channel_id: &str, xml: String) -> Self {
        self.with_body(&feed_url(channel_id), xml)
    }

    pub fn calls(&self) -> Vec<(String, RequestProfile)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == url)
            .count()
    }

    pub fn feed_calls(&self, channel_id: &str) -> usize {
        self.call_count(&feed_url(channel_id))
    }
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn get(&self, url: &str, profile: RequestProfile) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push((url.to_string(), profile));
        let route = self.routes.lock().unwrap().get(url).cloned();

        let Some(route) = route else {
            return Err(SubfeedError::HttpStatus(404));
        };
        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }
        match route.reply {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(SubfeedError::HttpStatus(status)),
            Reply::Network => Err(SubfeedError::Network("connection refused".to_string())),
        }
    }
}

/// A video in a generated feed document.
pub struct FixtureVideo<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub published: &'a str,
}

pub fn video<'a>(id: &'a str, title: &'a str, published: &'a str) -> FixtureVideo<'a> {
    FixtureVideo {
        id,
        title,
        published,
    }
}

/// Build a channel feed document shaped like the platform's Atom feeds.
pub fn feed_xml(channel_id: &str, name: &str, videos: &[FixtureVideo<'_>]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
 <link rel="self" href="http://www.youtube.com/feeds/videos.xml?channel_id={id}"/>
 <id>yt:channel:{id}</id>
 <yt:channelId>{id}</yt:channelId>
 <title>{name}</title>
 <link rel="alternate" href="https://www.youtube.com/channel/{id}"/>
 <author>
  <name>{name}</name>
  <uri>https://www.youtube.com/channel/{id}</uri>
 </author>
 <published>2015-03-01T10:00:00+00:00</published>
"#,
        id = channel_id,
        name = name
    );
    for v in videos {
        xml.push_str(&format!(
            r#" <entry>
  <id>yt:video:{vid}</id>
  <yt:videoId>{vid}</yt:videoId>
  <yt:channelId>{id}</yt:channelId>
  <title>{title}</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v={vid}"/>
  <author>
   <name>{name}</name>
   <uri>https://www.youtube.com/channel/{id}</uri>
  </author>
  <published>{published}</published>
  <updated>{published}</updated>
  <media:group>
   <media:title>{title}</media:title>
   <media:content url="https://www.youtube.com/v/{vid}?version=3" type="application/x-shockwave-flash" width="640" height="390"/>
   <media:thumbnail url="https://i1.ytimg.com/vi/{vid}/hqdefault.jpg" width="480" height="360"/>
   <media:description>About {title}</media:description>
  </media:group>
 </entry>
"#,
            vid = v.id,
            id = channel_id,
            name = name,
            title = v.title,
            published = v.published
        ));
    }
    xml.push_str("</feed>\n");
    xml
}
