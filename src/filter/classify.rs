//! Candidate classification and the accepted-URL list.

use std::collections::{BTreeSet, HashSet, VecDeque};

use log::{debug, error};
use url::Url;

use super::repair::repair;
use super::rules::{
    is_ads_url, is_same_path_blacklisted, matches_any_prefix, netloc, BLACKLIST_ENDSWITH,
    EMBEDLY_NETLOC, EMBEDLY_PATH, STATIC_BLACKLIST_NETLOC,
};
use crate::config::Config;
use crate::error_handling::{InfoType, RejectReason, ResolutionStats};
use crate::extract::{CandidateKind, RawCandidate};
use crate::session::Session;

/// Outcome of classifying one repaired URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The URL may be resolved.
    Accept,
    /// The URL is dropped for the given reason.
    Reject(RejectReason),
    /// An embed widget; the inner URL from its query (if any) replaces it.
    Embedded(Option<String>),
}

/// Applies the allow/deny policy of a configuration and session.
pub struct Classifier<'a> {
    config: &'a Config,
    session: &'a Session,
    stats: &'a ResolutionStats,
}

fn ends_with_any(value: &str, suffixes: &[impl AsRef<str>]) -> bool {
    suffixes.iter().any(|suffix| value.ends_with(suffix.as_ref()))
}

fn embedded_url(url: &Url) -> Option<String> {
    let param = |name: &str| {
        url.query_pairs()
            .filter(|(key, _)| key == name)
            .last()
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    };
    param("url").or_else(|| param("src"))
}

impl<'a> Classifier<'a> {
    /// Creates a classifier over the given policy and history.
    pub fn new(config: &'a Config, session: &'a Session, stats: &'a ResolutionStats) -> Self {
        Self {
            config,
            session,
            stats,
        }
    }

    /// Classifies `url`. The checks run in a fixed order and the first
    /// failing one decides the rejection reason.
    pub fn classify(&self, url: &Url, kind: CandidateKind) -> Verdict {
        let config = self.config;
        let netloc = netloc(url);
        let path = url.path();
        let is_iframe = kind == CandidateKind::Iframe;
        let whitelist_path_fails = || {
            let whitelist = self.session.whitelist_path(config);
            !whitelist.is_empty() && !matches_any_prefix(whitelist, url)
        };

        let reason = if !config.ignore_same_url && self.session.contains(url.as_str()) {
            RejectReason::SameUrl
        } else if !matches!(url.scheme(), "http" | "https") {
            RejectReason::BadScheme
        } else if is_iframe
            && !config.whitelist_netloc.is_empty()
            && !ends_with_any(&netloc, &config.whitelist_netloc)
        {
            RejectReason::WhitelistNetlocFail
        } else if is_iframe && whitelist_path_fails() {
            RejectReason::WhitelistPathFail
        } else if ends_with_any(&netloc, STATIC_BLACKLIST_NETLOC) {
            RejectReason::BlacklistStatic
        } else if ends_with_any(&netloc, &config.blacklist_netloc) {
            RejectReason::BlacklistNetloc
        } else if matches_any_prefix(self.session.blacklist_path(config), url) {
            RejectReason::BlacklistPath
        } else if ends_with_any(path, BLACKLIST_ENDSWITH) {
            RejectReason::BlacklistEndswith
        } else if ends_with_any(path, &config.blacklist_filepath) {
            RejectReason::BlacklistFilepath
        } else if is_ads_url(url) {
            RejectReason::AdsHeuristic
        } else if is_same_path_blacklisted(url) {
            RejectReason::SamePathBlacklist
        } else if netloc == EMBEDLY_NETLOC && path == EMBEDLY_PATH {
            return Verdict::Embedded(embedded_url(url));
        } else {
            return Verdict::Accept;
        };
        Verdict::Reject(reason)
    }

    /// Repairs and classifies `candidates`, returning the accepted URLs
    /// deduplicated and sorted.
    ///
    /// URLs substituted from embed widgets are classified like any other
    /// candidate of the same kind; each inner URL is substituted once.
    pub fn make_url_list(&self, candidates: Vec<RawCandidate>, base_url: &Url) -> Vec<String> {
        let mut queue: VecDeque<RawCandidate> = candidates.into();
        let mut substituted: HashSet<String> = HashSet::new();
        let mut accepted = Vec::new();

        while let Some(candidate) = queue.pop_front() {
            let url = match repair(&candidate.url, base_url, None) {
                Ok(url) => url,
                Err(e) => {
                    debug!(
                        "{} - Removed: {} ({})",
                        RejectReason::BadScheme,
                        candidate.url,
                        e
                    );
                    self.stats.increment_rejection(RejectReason::BadScheme);
                    continue;
                }
            };

            match self.classify(&url, candidate.kind) {
                Verdict::Accept => accepted.push(url.to_string()),
                Verdict::Reject(reason) => {
                    debug!("{} - Removed: {}", reason, url);
                    self.stats.increment_rejection(reason);
                }
                Verdict::Embedded(Some(inner)) => {
                    // The inner URL goes back on the queue and is classified
                    // like any other candidate, so deny rules still apply to it.
                    if substituted.insert(inner.clone()) {
                        debug!("Embed {} - Substituted: {}", url, inner);
                        self.stats.increment_info(InfoType::EmbedSubstituted);
                        queue.push_back(RawCandidate::new(inner, candidate.kind));
                    }
                }
                Verdict::Embedded(None) => {
                    error!("Missing params URL or SRC for {}", url);
                }
            }
        }

        debug!("List length: {} (with duplicates)", accepted.len());
        accepted
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn verdict(config: &Config, session: &Session, s: &str, kind: CandidateKind) -> Verdict {
        let stats = ResolutionStats::new();
        Classifier::new(config, session, &stats).classify(&url(s), kind)
    }

    fn reject(reason: RejectReason) -> Verdict {
        Verdict::Reject(reason)
    }

    #[test]
    fn test_accept_plain_playlist() {
        let config = Config::default();
        let session = Session::new();
        assert_eq!(
            verdict(&config, &session, "https://cdn.example.com/live.m3u8", CandidateKind::Playlist),
            Verdict::Accept
        );
    }

    #[test]
    fn test_same_url_rejected_unless_ignored() {
        let session = Session::new();
        session.begin_attempt("https://a.com/embed/1");
        let config = Config::default();
        assert_eq!(
            verdict(&config, &session, "https://a.com/embed/1", CandidateKind::Iframe),
            reject(RejectReason::SameUrl)
        );
        let config = Config {
            ignore_same_url: true,
            ..Default::default()
        };
        assert_eq!(
            verdict(&config, &session, "https://a.com/embed/1", CandidateKind::Iframe),
            Verdict::Accept
        );
    }

    #[test]
    fn test_bad_scheme() {
        let config = Config::default();
        let session = Session::new();
        assert_eq!(
            verdict(&config, &session, "ftp://a.com/x.mp4", CandidateKind::Playlist),
            reject(RejectReason::BadScheme)
        );
        assert_eq!(
            verdict(&config, &session, "about:blank", CandidateKind::Iframe),
            reject(RejectReason::BadScheme)
        );
    }

    #[test]
    fn test_whitelists_apply_to_iframes_only() {
        let config = Config {
            whitelist_netloc: vec!["player.example.com".to_string()],
            ..Default::default()
        };
        let session = Session::new();
        assert_eq!(
            verdict(&config, &session, "https://other.com/e/1", CandidateKind::Iframe),
            reject(RejectReason::WhitelistNetlocFail)
        );
        assert_eq!(
            verdict(&config, &session, "https://other.com/e/1.m3u8", CandidateKind::Playlist),
            Verdict::Accept
        );
    }

    #[test]
    fn test_whitelist_path_precedes_static_blacklist() {
        let config = Config {
            whitelist_path: vec!["player.example.com/embed/".to_string()],
            ..Default::default()
        };
        let session = Session::new();
        assert_eq!(
            verdict(&config, &session, "https://www.googletagmanager.com/ns.html", CandidateKind::Iframe),
            reject(RejectReason::WhitelistPathFail)
        );
        assert_eq!(
            verdict(&config, &session, "https://www.googletagmanager.com/ns.html", CandidateKind::Playlist),
            reject(RejectReason::BlacklistStatic)
        );
    }

    #[test]
    fn test_blacklist_order() {
        let config = Config {
            blacklist_netloc: vec!["bad.com".to_string()],
            blacklist_path: vec!["cdn.com/private/".to_string()],
            blacklist_filepath: vec!["/promo.mp4".to_string()],
            ..Default::default()
        };
        let session = Session::new();
        let kind = CandidateKind::Playlist;
        let cases = [
            ("https://www.bad.com/a.mp4", RejectReason::BlacklistNetloc),
            ("https://cdn.com/private/a.mp4", RejectReason::BlacklistPath),
            ("https://www.facebook.com/plugins/video.php", RejectReason::BlacklistPath),
            ("https://cdn.com/thumb.jpg", RejectReason::BlacklistEndswith),
            ("https://cdn.com/v/novideo.mp4", RejectReason::BlacklistEndswith),
            ("https://cdn.com/v/promo.mp4", RejectReason::BlacklistFilepath),
            ("https://cdn.com/ads/300x250.html", RejectReason::AdsHeuristic),
            ("https://ads.cdn.com/v.mp4", RejectReason::AdsHeuristic),
            ("https://www.youtube.com/embed/", RejectReason::SamePathBlacklist),
        ];
        for (s, reason) in cases {
            assert_eq!(verdict(&config, &session, s, kind), reject(reason), "{s}");
        }
    }

    #[test]
    fn test_embedly_substitution() {
        let config = Config::default();
        let session = Session::new();
        assert_eq!(
            verdict(
                &config,
                &session,
                "http://cdn.embedly.com/widgets/media.html?src=x&url=http%3A%2F%2Fhost%2Fvideo.mp4",
                CandidateKind::Iframe
            ),
            Verdict::Embedded(Some("http://host/video.mp4".to_string()))
        );
        assert_eq!(
            verdict(&config, &session, "http://cdn.embedly.com/widgets/media.html", CandidateKind::Iframe),
            Verdict::Embedded(None)
        );
    }

    #[test]
    fn test_make_url_list_sorted_and_deduplicated() {
        let config = Config::default();
        let session = Session::new();
        let stats = ResolutionStats::new();
        let classifier = Classifier::new(&config, &session, &stats);
        let base = url("https://site.example.com/watch/1");
        let candidates = vec![
            RawCandidate::new("https://z.example.com/b.m3u8", CandidateKind::Playlist),
            RawCandidate::new("/a.m3u8", CandidateKind::Playlist),
            RawCandidate::new("https://z.example.com/b.m3u8", CandidateKind::Playlist),
            RawCandidate::new("https://www.googletagmanager.com/gtm.mp4", CandidateKind::Playlist),
        ];
        assert_eq!(
            classifier.make_url_list(candidates, &base),
            vec![
                "https://site.example.com/a.m3u8".to_string(),
                "https://z.example.com/b.m3u8".to_string(),
            ]
        );
        assert_eq!(stats.get_rejection_count(RejectReason::BlacklistStatic), 1);
    }

    #[test]
    fn test_make_url_list_embedly() {
        let config = Config::default();
        let session = Session::new();
        let stats = ResolutionStats::new();
        let classifier = Classifier::new(&config, &session, &stats);
        let base = url("https://site.example.com/");
        let candidates = vec![RawCandidate::new(
            "http://cdn.embedly.com/widgets/media.html?url=http://host/video.mp4",
            CandidateKind::Iframe,
        )];
        assert_eq!(
            classifier.make_url_list(candidates, &base),
            vec!["http://host/video.mp4".to_string()]
        );
        assert_eq!(stats.get_info_count(InfoType::EmbedSubstituted), 1);
    }

    #[test]
    fn test_embedded_url_is_classified_again() {
        let config = Config::default();
        let session = Session::new();
        let stats = ResolutionStats::new();
        let classifier = Classifier::new(&config, &session, &stats);
        let base = url("https://site.example.com/");
        let candidates = vec![RawCandidate::new(
            "http://cdn.embedly.com/widgets/media.html?url=https://www.googletagmanager.com/gtm.mp4",
            CandidateKind::Iframe,
        )];
        assert!(classifier.make_url_list(candidates, &base).is_empty());
        assert_eq!(stats.get_info_count(InfoType::EmbedSubstituted), 1);
        assert_eq!(stats.get_rejection_count(RejectReason::BlacklistStatic), 1);
    }

    #[test]
    fn test_self_referencing_embed_terminates() {
        let config = Config::default();
        let session = Session::new();
        let stats = ResolutionStats::new();
        let classifier = Classifier::new(&config, &session, &stats);
        let base = url("https://site.example.com/");
        let embed = "http://cdn.embedly.com/widgets/media.html?url=http://cdn.embedly.com/widgets/media.html";
        let candidates = vec![RawCandidate::new(embed, CandidateKind::Iframe)];
        assert!(classifier.make_url_list(candidates, &base).is_empty());
    }
}
