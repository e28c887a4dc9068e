//! Resolution orchestrator.
//!
//! A resolution is a loop over pages. Each attempt fetches and deobfuscates
//! one page, then tries, in order:
//!
//! 1. playlist URLs, which end the loop with a lazy stream of descriptors
//! 2. iframes, whose single (or chosen) survivor becomes the next page
//! 3. a `window.location.href` script redirect to an unvisited URL
//!
//! When a page offers none of these, the fallback resolver gets the last
//! page URL. The number of follows is capped by `Config::max_depth`.

mod choice;
mod debug;

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, error, info, trace};
use url::Url;

use crate::app::normalize_input;
use crate::config::{Config, VERSION};
use crate::error_handling::{
    categorize_fetch_error, FetchError, FetchFailure, InfoType, InitializationError,
    ResolutionStats, ResolveError,
};
use crate::extract::{
    extract_iframes, extract_playlists, extract_window_location, page_author, page_title,
};
use crate::fallback::{FallbackResolver, YtDlpResolver};
use crate::fetch::{alternate_headers, page_headers, FetchedPage, HttpFetcher, PageFetcher};
use crate::filter::{drops_referer, Classifier};
use crate::protocol::{Dispatcher, StreamDescriptor};
use crate::session::Session;
use crate::unpack::deobfuscate;

use choice::pick_index;
use debug::write_debug_dump;

// Re-export public API
pub use choice::{IframeChooser, NoChoice};

/// Successful outcome of a resolution.
pub struct Resolution {
    /// Page the streams were found on
    pub page_url: String,
    /// Page title, or the page URL when the page has none
    pub title: String,
    /// Author derived from the page URL
    pub author: Option<String>,
    /// Streams, resolved lazily as they are polled
    pub streams: BoxStream<'static, StreamDescriptor>,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("page_url", &self.page_url)
            .field("title", &self.title)
            .field("author", &self.author)
            .finish_non_exhaustive()
    }
}

/// What a single page attempt led to.
enum Step {
    Streams(Resolution),
    Follow(String),
    Exhausted { title: Option<String> },
}

/// Resolves web pages into media streams.
///
/// Build one with [`Resolver::builder`]. The session is shared by every call
/// to [`Resolver::resolve`], so URLs visited by an earlier resolution are
/// refused by later ones unless `ignore_same_url` is set.
pub struct Resolver {
    config: Arc<Config>,
    session: Arc<Session>,
    fetcher: Arc<dyn PageFetcher>,
    dispatcher: Dispatcher,
    fallback: Option<Arc<dyn FallbackResolver>>,
    chooser: Arc<dyn IframeChooser>,
    stats: Arc<ResolutionStats>,
}

/// Builder for [`Resolver`]. Unset collaborators get their defaults in
/// [`ResolverBuilder::build`].
pub struct ResolverBuilder {
    config: Config,
    session: Option<Arc<Session>>,
    fetcher: Option<Arc<dyn PageFetcher>>,
    dispatcher: Option<Dispatcher>,
    fallback: Option<Arc<dyn FallbackResolver>>,
    chooser: Arc<dyn IframeChooser>,
    stats: Option<Arc<ResolutionStats>>,
}

impl ResolverBuilder {
    /// Starts from `config` with the `yt-dlp` fallback and no iframe chooser.
    pub fn new(config: Config) -> Self {
        let fallback: Arc<dyn FallbackResolver> = Arc::new(YtDlpResolver::from_config(&config));
        Self {
            config,
            session: None,
            fetcher: None,
            dispatcher: None,
            fallback: Some(fallback),
            chooser: Arc::new(NoChoice),
            stats: None,
        }
    }

    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn fallback(mut self, fallback: Arc<dyn FallbackResolver>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Removes the fallback resolver entirely.
    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    pub fn chooser(mut self, chooser: Arc<dyn IframeChooser>) -> Self {
        self.chooser = chooser;
        self
    }

    pub fn stats(mut self, stats: Arc<ResolutionStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Builds the resolver, creating the default HTTP fetcher and dispatcher
    /// if none were given.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if an HTTP client
    /// cannot be built.
    pub fn build(self) -> Result<Resolver, InitializationError> {
        let fetcher: Arc<dyn PageFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::from_config(&self.config)?),
        };
        let dispatcher = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Dispatcher::from_config(&self.config)?,
        };
        Ok(Resolver {
            config: Arc::new(self.config),
            session: self.session.unwrap_or_default(),
            fetcher,
            dispatcher,
            fallback: self.fallback,
            chooser: self.chooser,
            stats: self.stats.unwrap_or_default(),
        })
    }
}

impl Resolver {
    /// Starts building a resolver for `config`.
    pub fn builder(config: Config) -> ResolverBuilder {
        ResolverBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Visited-URL history shared by every resolution of this resolver.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn stats(&self) -> &ResolutionStats {
        &self.stats
    }

    /// Resolves `input` (a URL, optionally prefixed with `generic://` or
    /// `resolve://`) into a lazy stream of descriptors.
    ///
    /// # Errors
    ///
    /// - `NoResolver` for input that is not an http(s) URL, and when the
    ///   pages offered nothing to follow and the fallback found nothing
    /// - `NoStreamsFound` when a page answered 403/404
    /// - `RecursionLimitExceeded` after more than `max_depth` follows
    /// - `Fetch` for other page fetch failures
    pub async fn resolve(&self, input: &str) -> Result<Resolution, ResolveError> {
        let mut url = normalize_input(input)?;

        if self.config.ytdl_only {
            return match self.run_fallback(&url, None).await {
                Some(resolution) => Ok(resolution),
                None => Err(ResolveError::NoResolver(url)),
            };
        }

        let mut drop_referer = false;
        let mut follows = 0;
        loop {
            match self.attempt(&url, drop_referer).await? {
                Step::Streams(resolution) => {
                    self.stats.log_summary();
                    return Ok(resolution);
                }
                Step::Follow(next) => {
                    follows += 1;
                    if follows > self.config.max_depth {
                        return Err(ResolveError::RecursionLimitExceeded {
                            limit: self.config.max_depth,
                            url: next,
                        });
                    }
                    drop_referer = drops_referer(&next);
                    url = next;
                }
                Step::Exhausted { title } => {
                    if self.config.fallback_enabled() {
                        if let Some(resolution) = self.run_fallback(&url, title).await {
                            return Ok(resolution);
                        }
                    }
                    self.stats.log_summary();
                    error!("No playlist, iframe or redirect left on {}", url);
                    return Err(ResolveError::NoResolver(url));
                }
            }
        }
    }

    /// Fetches and examines one page.
    async fn attempt(&self, url: &str, drop_referer: bool) -> Result<Step, ResolveError> {
        let attempt = self.session.begin_attempt(url);
        if attempt.number <= 1 {
            info!("Version {} - {}", VERSION, env!("CARGO_PKG_NAME"));
        }
        info!("  {}. URL={}", attempt.number, url);

        let referer = (!drop_referer).then_some(attempt.referer.as_str());
        let page = self.fetch_page(url, referer).await?;
        for _ in &page.redirect_chain {
            self.stats.increment_info(InfoType::HttpRedirect);
        }

        let html = deobfuscate(&page.body);
        if self.config.debug {
            write_debug_dump(&self.config.debug_dir, attempt.number, url, &html).await;
        }

        let base = Url::parse(url).map_err(FetchError::from)?;
        let classifier = Classifier::new(&self.config, &self.session, &self.stats);

        let playlists = extract_playlists(&html);
        if playlists.is_empty() {
            trace!("No Playlists");
        } else {
            debug!("Found Playlists: {}", playlists.len());
            let accepted = classifier.make_url_list(playlists, &base);
            if !accepted.is_empty() {
                info!("Found Playlists: {} (valid)", accepted.len());
                return Ok(Step::Streams(self.playlist_resolution(&base, url, &html, accepted)));
            }
        }

        let iframes = extract_iframes(&html);
        let mut next = None;
        if iframes.is_empty() {
            trace!("No iframes");
        } else {
            debug!("Found Iframes: {}", iframes.len());
            let mut accepted = classifier.make_url_list(iframes, &base);
            next = match accepted.len() {
                0 => None,
                1 => accepted.pop(),
                _ => Some(self.choose_iframe(accepted).await),
            };
            if next.is_some() {
                self.stats.increment_info(InfoType::IframeFollowed);
            }
        }

        if next.is_none() {
            next = self.window_location(&html, &base);
        }

        Ok(match next {
            Some(next) => Step::Follow(next),
            None => Step::Exhausted {
                title: page_title(&html),
            },
        })
    }

    /// Fetches `url`, retrying once with the alternate headers when the body
    /// cannot be decoded.
    async fn fetch_page(&self, url: &str, referer: Option<&str>) -> Result<FetchedPage, ResolveError> {
        let headers = page_headers(referer);
        let result = match self.fetcher.fetch(url, &headers).await {
            Err(e) if categorize_fetch_error(&e) == FetchFailure::ContentEncoding => {
                debug!("Content decoding failed for {}: {}", url, e);
                self.fetcher.fetch(url, &alternate_headers(&headers)).await
            }
            result => result,
        };

        result.map_err(|e| match categorize_fetch_error(&e) {
            FetchFailure::NoStreams => {
                match &e {
                    FetchError::Status { status: 403, .. } => error!(
                        "Website Access Denied/Forbidden, you might be geo-blocked or other params are missing."
                    ),
                    _ => error!("Website was not found, the link is broken or dead."),
                }
                ResolveError::NoStreamsFound(url.to_string())
            }
            _ => ResolveError::Fetch(e),
        })
    }

    fn playlist_resolution(&self, base: &Url, url: &str, html: &str, accepted: Vec<String>) -> Resolution {
        let referer = self
            .config
            .playlist_referer
            .clone()
            .unwrap_or_else(|| url.to_string());
        Resolution {
            page_url: url.to_string(),
            title: page_title(html).unwrap_or_else(|| url.to_string()),
            author: page_author(url),
            streams: self
                .dispatcher
                .dispatch(accepted, base, referer, Arc::clone(&self.stats)),
        }
    }

    async fn choose_iframe(&self, mut candidates: Vec<String>) -> String {
        info!("--- IFRAMES ---");
        for (i, candidate) in candidates.iter().enumerate() {
            info!("{} - {}", i + 1, candidate);
        }
        info!("--- IFRAMES ---");
        let answer = self.chooser.choose(&candidates).await;
        let index = pick_index(answer.as_deref(), candidates.len());
        candidates.swap_remove(index)
    }

    /// Target of a script redirect on the page, unless already visited.
    fn window_location(&self, html: &str, base: &Url) -> Option<String> {
        let Some(candidate) = extract_window_location(html) else {
            trace!("No window_location");
            return None;
        };
        match base.join(&candidate.url) {
            Ok(target) if !self.session.contains(target.as_str()) => {
                debug!("Found window_location: {}", target);
                self.stats.increment_info(InfoType::ScriptRedirectFollowed);
                Some(target.to_string())
            }
            Ok(target) => {
                trace!("window_location already visited: {}", target);
                None
            }
            Err(e) => {
                debug!("Invalid window_location {}: {}", candidate.url, e);
                None
            }
        }
    }

    /// Runs the fallback resolver on `url`. `None` when there is no fallback,
    /// it fails, or it finds nothing.
    async fn run_fallback(&self, url: &str, page_title: Option<String>) -> Option<Resolution> {
        let fallback = self.fallback.as_ref()?;
        let output = match fallback.resolve(url).await {
            Ok(output) => output,
            Err(e) => {
                error!("Error extracting info: {}", e);
                return None;
            }
        };
        if output.is_empty() {
            debug!("Fallback found no streams for {}", url);
            return None;
        }

        self.stats.increment_info(InfoType::FallbackUsed);
        info!(
            "Fallback found {} streams and {} manifests",
            output.streams.len(),
            output.manifests.len()
        );
        let base = Url::parse(url).ok()?;
        let manifests =
            self.dispatcher
                .dispatch(output.manifests, &base, url.to_string(), Arc::clone(&self.stats));
        Some(Resolution {
            page_url: url.to_string(),
            title: output
                .title
                .or(page_title)
                .unwrap_or_else(|| url.to_string()),
            author: page_author(url),
            streams: stream::iter(output.streams).chain(manifests).boxed(),
        })
    }
}
