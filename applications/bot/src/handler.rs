//! Chat command handling
//!
//! Transport-independent: a front end feeds [`IncomingMessage`]s in and sends
//! back whatever [`Reply`] comes out. Supported input:
//!
//! | Input                     | Effect                                   |
//! |---------------------------|------------------------------------------|
//! | `/start`                  | greeting                                 |
//! | `<link>`                  | queue a download request for the link    |
//! | `/queue`                  | list active download requests            |
//! | `/deactivate <id>`        | deactivate a download request            |
//! | `/p <link> [nopull]`      | register a playlist                      |

use crate::resolver::{is_valid_source_url, NameResolver};
use album_queue_core::{
    CreatorId, DownloadQueueRequest, ErrorKind, NewDownloadRequest, NewPlaylistRequest,
    OpContext, QueueError, RequestId, RequestLifecycle,
};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const GREETING: &str = "Hi! Send me a link to an album or track on open.spotify.com \
     and I'll put it in the download queue. /queue shows what's pending.";
const NOT_A_SOURCE_URL: &str = "That doesn't look like a link to open.spotify.com.";
const NAME_LOOKUP_FAILED: &str = "Couldn't look up a name for that link, nothing was queued.";
const QUEUE_EMPTY: &str = "The download queue is empty.";
const DEACTIVATE_USAGE: &str = "Usage: /deactivate <request_id>";
const PLAYLIST_USAGE: &str = "Usage: /p <playlist_link> [nopull]";

/// A message from a chat user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub sender_id: i64,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(sender_id: i64, text: impl Into<String>) -> Self {
        Self {
            sender_id,
            text: text.into(),
        }
    }
}

/// Text sent back to the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
}

impl Reply {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A parsed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    Queue,
    Deactivate(Vec<&'a str>),
    Playlist(Vec<&'a str>),
    Submit(&'a str),
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(text: &'a str) -> Self {
        let text = text.trim();
        if !text.starts_with('/') {
            return Command::Submit(text);
        }

        let mut parts = text.split_whitespace();
        let head = parts.next().unwrap_or_default();
        // `/queue@SomeBot` addresses a specific bot in group chats
        let name = head.split('@').next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match name {
            "/start" => Command::Start,
            "/queue" => Command::Queue,
            "/deactivate" => Command::Deactivate(args),
            "/p" | "/playlist" => Command::Playlist(args),
            _ => Command::Unknown(head),
        }
    }
}

/// Dispatches chat commands onto the request lifecycle
pub struct CommandHandler {
    lifecycle: RequestLifecycle,
    resolver: Arc<dyn NameResolver>,
    whitelist: HashSet<i64>,
    root: OpContext,
    request_timeout: Duration,
}

impl CommandHandler {
    pub fn new(
        lifecycle: RequestLifecycle,
        resolver: Arc<dyn NameResolver>,
        whitelist: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            lifecycle,
            resolver,
            whitelist: whitelist.into_iter().collect(),
            root: OpContext::new(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Cancel in-flight store calls when `root` is cancelled
    #[must_use]
    pub fn with_root_context(mut self, root: OpContext) -> Self {
        self.root = root;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn is_authorized(&self, sender_id: i64) -> bool {
        self.whitelist.contains(&sender_id)
    }

    /// Handle one message. Messages from unauthorized senders get no reply.
    pub async fn handle(&self, message: &IncomingMessage) -> Option<Reply> {
        if !self.is_authorized(message.sender_id) {
            warn!(sender_id = message.sender_id, "Unauthorized sender");
            return None;
        }

        let ctx = self.root.child().with_timeout(self.request_timeout);
        let creator = CreatorId::new(message.sender_id);

        let reply = match Command::parse(&message.text) {
            Command::Start => Reply::new(GREETING),
            Command::Queue => self.queue(&ctx).await,
            Command::Deactivate(args) => self.deactivate(&ctx, &args).await,
            Command::Playlist(args) => self.playlist(&ctx, creator, &args).await,
            Command::Submit(url) => self.submit(&ctx, creator, url).await,
            Command::Unknown(command) => Reply::new(format!(
                "Unknown command {command}. Try /start, /queue, /deactivate or /p."
            )),
        };

        Some(reply)
    }

    async fn submit(&self, ctx: &OpContext, creator: CreatorId, url: &str) -> Reply {
        info!(sender_id = %creator, url, "Received link");

        if !is_valid_source_url(url) {
            return Reply::new(NOT_A_SOURCE_URL);
        }

        let name = match self.resolver.resolve(url).await {
            Ok(name) => name,
            Err(e) => {
                error!(url, error = %e, "Failed to resolve name");
                return Reply::new(NAME_LOOKUP_FAILED);
            }
        };

        let request = NewDownloadRequest::new(url, creator).with_name(name);
        match self.lifecycle.submit_download(ctx, request).await {
            Ok(id) => Reply::new(format!("Added to the download queue (id {id}).")),
            Err(e) => error_reply("submit", &e),
        }
    }

    async fn queue(&self, ctx: &OpContext) -> Reply {
        let requests = match self.lifecycle.list_active(ctx).await {
            Ok(requests) => requests,
            Err(e) => return error_reply("list", &e),
        };

        if requests.is_empty() {
            return Reply::new(QUEUE_EMPTY);
        }

        let mut text = String::from("Active download requests:\n");
        for request in &requests {
            let _ = writeln!(text, "{}", format_queue_line(request));
        }

        Reply::new(text.trim_end())
    }

    async fn deactivate(&self, ctx: &OpContext, args: &[&str]) -> Reply {
        let [id] = args else {
            return Reply::new(DEACTIVATE_USAGE);
        };

        let id = RequestId::new(*id);
        info!(request_id = %id, "Deactivating request");

        match self.lifecycle.deactivate(ctx, &id).await {
            Ok(()) => Reply::new(format!("Request {id} deactivated.")),
            Err(e) => error_reply("deactivate", &e),
        }
    }

    async fn playlist(&self, ctx: &OpContext, creator: CreatorId, args: &[&str]) -> Reply {
        let (url, no_pull) = match args {
            [url] => (*url, false),
            [url, flag] if flag.eq_ignore_ascii_case("nopull") => (*url, true),
            _ => return Reply::new(PLAYLIST_USAGE),
        };

        info!(sender_id = %creator, url, no_pull, "Received playlist");

        if !is_valid_source_url(url) {
            return Reply::new(NOT_A_SOURCE_URL);
        }

        let request = NewPlaylistRequest::new(url, creator, no_pull);
        match self.lifecycle.submit_playlist(ctx, request).await {
            Ok(id) if no_pull => {
                Reply::new(format!("Playlist registered without pulling (id {id})."))
            }
            Ok(id) => Reply::new(format!("Playlist added to the queue (id {id}).")),
            Err(e) => error_reply("playlist", &e),
        }
    }
}

/// One `/queue` line: id, name, progress, sync and retry bookkeeping
pub fn format_queue_line(request: &DownloadQueueRequest) -> String {
    let name = if request.name.is_empty() {
        "(unnamed)"
    } else {
        request.name.as_str()
    };

    let expected = if request.expected_track_count == 0 {
        "?".to_string()
    } else {
        request.expected_track_count.to_string()
    };

    format!(
        "{}: {} [{}/{} tracks] syncs: {}, errored: {}, retries: {}",
        request.id,
        name,
        request.found_track_count,
        expected,
        request.sync_count,
        if request.errored { "yes" } else { "no" },
        request.retry_count,
    )
}

/// Map a queue failure onto the reply for its kind
pub fn error_reply(action: &str, err: &QueueError) -> Reply {
    error!(action, error = %err, "Queue operation failed");

    let text = match err.kind() {
        ErrorKind::StorageUnavailable => {
            "The queue is unavailable right now, please try again later.".to_string()
        }
        ErrorKind::NotFound => "No request with that id.".to_string(),
        ErrorKind::InvalidArgument => format!("Request rejected: {err}"),
        ErrorKind::DecodeFailure => {
            "A stored request is unreadable, ask the operator to check the logs.".to_string()
        }
        ErrorKind::RequestInactive => "That request is no longer active.".to_string(),
        ErrorKind::Cancelled => "The bot is shutting down, nothing was changed.".to_string(),
        ErrorKind::TimedOut => "The queue took too long to answer, please try again.".to_string(),
    };

    Reply::new(text)
}
