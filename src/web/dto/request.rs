//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{channel_url_input, video_id_chars};

/// Body for adding or previewing a channel.
#[derive(Debug, Deserialize, Validate)]
pub struct ChannelUrlRequest {
    /// Channel URL as typed by the user; scheme optional.
    #[validate(
        length(max = 2048, message = "URL is too long"),
        custom(function = "channel_url_input")
    )]
    pub url: String,
}

/// Body for marking a video as watched or unwatched.
#[derive(Debug, Deserialize, Validate)]
pub struct WatchedRequest {
    #[validate(
        length(min = 1, max = 64, message = "Video id must be 1-64 characters"),
        custom(function = "video_id_chars")
    )]
    pub video_id: String,
    /// Clear the watched marker instead of setting it.
    #[serde(default)]
    pub undo: bool,
}
