//! In-memory response cache with TTL, size-bounded eviction and
//! similarity-based fallback.
//!
//! One instance is constructed at startup and shared behind an `Arc`; it
//! is the only cross-request mutable state in the process. All map state
//! sits behind a single mutex so an entry is published atomically — a
//! concurrent reader sees a fully-formed entry or nothing.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::domain::chat::ExplanationOutcome;
use crate::domain::language::TranslationInfo;

pub const DEFAULT_MAX_ENTRIES: usize = 200;
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Minimum token-set Jaccard similarity for a fallback match.
const SIMILARITY_THRESHOLD: f64 = 0.3;
/// Stored original messages are truncated for similarity matching.
const ORIGINAL_MESSAGE_MAX_CHARS: usize = 100;

/// Minimal slice of a chat response worth keeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedReply {
    pub reply: String,
    pub translation_info: Option<TranslationInfo>,
    pub explanation_result: Option<ExplanationOutcome>,
    pub final_approved: bool,
    pub success: bool,
    #[serde(default)]
    pub is_fallback: bool,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedReply,
    timestamp: Instant,
    ttl: Duration,
    /// Insertion order tiebreaker for eviction.
    seq: u64,
    original_message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
    pub max_entries: usize,
    pub default_ttl_seconds: u64,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    next_seq: u64,
}

/// Key-normalizing, TTL-bounded, size-bounded store of prior successful
/// responses.
pub struct ResponseCache {
    max_entries: usize,
    default_ttl: Duration,
    inner: Mutex<CacheInner>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            max_entries,
            default_ttl,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Normalize text for consistent cache keys: lowercase, trimmed,
    /// newlines collapsed to spaces.
    fn normalize(text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        text.to_lowercase()
            .trim()
            .replace('\n', " ")
            .replace('\r', "")
    }

    /// Fixed-width key from the normalized message and document flag.
    fn entry_key(message: &str, has_document: bool) -> String {
        let key_data = format!("{}|doc:{}", Self::normalize(message), has_document);
        let mut hasher = DefaultHasher::new();
        key_data.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    /// Store a response. Expired entries are pruned afterwards, then the
    /// oldest entries are evicted until the size limit holds.
    pub fn put(
        &self,
        message: &str,
        value: CachedReply,
        has_document: bool,
        ttl: Option<Duration>,
    ) {
        self.put_at(Instant::now(), message, value, has_document, ttl)
    }

    fn put_at(
        &self,
        now: Instant,
        message: &str,
        value: CachedReply,
        has_document: bool,
        ttl: Option<Duration>,
    ) {
        let key = Self::entry_key(message, has_document);
        let ttl = ttl.unwrap_or(self.default_ttl);

        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        inner.entries.insert(
            key,
            CacheEntry {
                value,
                timestamp: now,
                ttl,
                seq,
                original_message: truncate_chars(message, ORIGINAL_MESSAGE_MAX_CHARS),
            },
        );

        Self::cleanup_expired(&mut inner, now);
        self.enforce_size_limit(&mut inner);
    }

    /// TTL-checked lookup; expired entries are removed on read.
    pub fn get(&self, message: &str, has_document: bool) -> Option<CachedReply> {
        self.get_at(Instant::now(), message, has_document)
    }

    fn get_at(&self, now: Instant, message: &str, has_document: bool) -> Option<CachedReply> {
        let key = Self::entry_key(message, has_document);
        let mut inner = self.inner.lock();

        let expired = match inner.entries.get(&key) {
            Some(entry) => is_expired(entry, now),
            None => return None,
        };

        if expired {
            inner.entries.remove(&key);
            debug!(key = %key, "Cache entry expired");
            return None;
        }

        debug!(key = %key, "Cache hit");
        inner.entries.get(&key).map(|e| e.value.clone())
    }

    /// Best stored entry whose original message shares at least 30% of its
    /// token set with the input. Ties resolve to the first seen highest
    /// score under map iteration order.
    pub fn find_similar(&self, message: &str) -> Option<CachedReply> {
        let normalized = Self::normalize(message);
        let input_words: HashSet<&str> = normalized.split_whitespace().collect();

        let inner = self.inner.lock();
        let mut best_score = 0.0;
        let mut best_match: Option<&CacheEntry> = None;

        for entry in inner.entries.values() {
            let cached = Self::normalize(&entry.original_message);
            let cached_words: HashSet<&str> = cached.split_whitespace().collect();
            if cached_words.is_empty() {
                continue;
            }

            let score = jaccard(&input_words, &cached_words);
            if score > best_score && score >= SIMILARITY_THRESHOLD {
                best_score = score;
                best_match = Some(entry);
            }
        }

        if let Some(entry) = best_match {
            debug!(score = best_score, "Found similar cached response");
            return Some(entry.value.clone());
        }
        None
    }

    /// Degraded-mode reply when live processing fails: a similar cached
    /// response if one exists, else a synthesized structured reply. Always
    /// marked successful so the caller can still present something.
    pub fn fallback_response(&self, message: &str, reason: &str) -> CachedReply {
        if let Some(mut similar) = self.find_similar(message) {
            similar.reply = format!(
                "**[Cached Response]** Service temporarily unavailable. \
                 Here's a previous similar response:\n\n{}",
                similar.reply
            );
            similar.is_fallback = true;
            return similar;
        }

        let status = serde_json::json!({
            "status": "fallback_mode",
            "reason": reason,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "message_length": message.chars().count(),
            "cache_entries": self.inner.lock().entries.len(),
        });

        let reply = format!(
            "**Summary:**\n\
             The AI service is temporarily unavailable, but I can still help you with a structured response.\n\n\
             **Your Request:**\n{}\n\n\
             **Key Points:**\n\
             - Your message has been received and processed locally\n\
             - This is a temporary fallback response\n\
             - Full AI capabilities will return when the service reconnects\n\n\
             **Status Information:**\n```json\n{}\n```\n\n\
             **Next Steps:**\n\
             - Try your request again in a few moments\n\
             - The system will automatically reconnect when available\n\
             - Your conversation history is preserved",
            message,
            serde_json::to_string_pretty(&status).unwrap_or_default(),
        );

        CachedReply {
            reply,
            translation_info: None,
            explanation_result: None,
            final_approved: true,
            success: true,
            is_fallback: true,
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats_at(Instant::now())
    }

    fn stats_at(&self, now: Instant) -> CacheStats {
        let inner = self.inner.lock();
        let expired = inner
            .entries
            .values()
            .filter(|e| is_expired(e, now))
            .count();

        CacheStats {
            total_entries: inner.entries.len(),
            active_entries: inner.entries.len() - expired,
            expired_entries: expired,
            max_entries: self.max_entries,
            default_ttl_seconds: self.default_ttl.as_secs(),
        }
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
        tracing::info!("Cache cleared");
    }

    fn cleanup_expired(inner: &mut CacheInner, now: Instant) {
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !is_expired(entry, now));
        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!(removed = removed, "Cleaned up expired cache entries");
        }
    }

    /// Evict oldest-by-timestamp (insertion time, not last read) until the
    /// entry count fits the limit.
    fn enforce_size_limit(&self, inner: &mut CacheInner) {
        if inner.entries.len() <= self.max_entries {
            return;
        }

        let mut ordered: Vec<(String, Instant, u64)> = inner
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.timestamp, e.seq))
            .collect();
        ordered.sort_by_key(|&(_, timestamp, seq)| (timestamp, seq));

        let excess = inner.entries.len() - self.max_entries;
        for (key, _, _) in ordered.into_iter().take(excess) {
            inner.entries.remove(&key);
        }

        debug!(removed = excess, "Evicted old cache entries to enforce size limit");
    }
}

fn is_expired(entry: &CacheEntry, now: Instant) -> bool {
    now.duration_since(entry.timestamp) > entry.ttl
}

fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(text: &str) -> CachedReply {
        CachedReply {
            reply: text.to_string(),
            translation_info: None,
            explanation_result: None,
            final_approved: true,
            success: true,
            is_fallback: false,
        }
    }

    #[test]
    fn normalize_collapses_case_and_newlines() {
        assert_eq!(
            ResponseCache::normalize("  Hello\nWorld\r\n"),
            "hello world"
        );
        assert_eq!(ResponseCache::normalize(""), "");
    }

    #[test]
    fn key_distinguishes_document_flag() {
        let with_doc = ResponseCache::entry_key("grade this", true);
        let without_doc = ResponseCache::entry_key("grade this", false);
        assert_ne!(with_doc, without_doc);
        assert_eq!(with_doc.len(), 16);
    }

    #[test]
    fn key_is_normalization_insensitive() {
        assert_eq!(
            ResponseCache::entry_key("  Hello World ", false),
            ResponseCache::entry_key("hello world", false),
        );
    }

    #[test]
    fn round_trip() {
        let cache = ResponseCache::default();
        cache.put("What is gravity?", reply("a force"), false, None);

        let hit = cache.get("What is gravity?", false).expect("expected hit");
        assert_eq!(hit.reply, "a force");
        assert!(hit.success);

        // Different document flag misses
        assert!(cache.get("What is gravity?", true).is_none());
    }

    #[test]
    fn ttl_expiry_with_simulated_clock() {
        let cache = ResponseCache::default();
        let start = Instant::now();
        let ttl = Duration::from_secs(60);

        cache.put_at(start, "hello", reply("hi"), false, Some(ttl));

        // Present up to and including the TTL boundary
        assert!(cache.get_at(start + Duration::from_secs(59), "hello", false).is_some());
        assert!(cache.get_at(start + ttl, "hello", false).is_some());

        // Absent strictly after the TTL elapses, and deleted on read
        assert!(cache
            .get_at(start + ttl + Duration::from_millis(1), "hello", false)
            .is_none());
        assert_eq!(cache.stats_at(start).total_entries, 0);
    }

    #[test]
    fn eviction_removes_least_recently_inserted() {
        let cache = ResponseCache::new(3, DEFAULT_TTL);
        let start = Instant::now();

        for (i, msg) in ["one", "two", "three"].iter().enumerate() {
            cache.put_at(start + Duration::from_secs(i as u64), msg, reply(msg), false, None);
        }

        // Reading the oldest entry must not protect it: eviction is by
        // insertion time, not last read.
        assert!(cache.get_at(start + Duration::from_secs(3), "one", false).is_some());

        cache.put_at(start + Duration::from_secs(4), "four", reply("four"), false, None);

        assert_eq!(cache.stats_at(start + Duration::from_secs(4)).total_entries, 3);
        assert!(cache.get_at(start + Duration::from_secs(4), "one", false).is_none());
        assert!(cache.get_at(start + Duration::from_secs(4), "two", false).is_some());
        assert!(cache.get_at(start + Duration::from_secs(4), "four", false).is_some());
    }

    #[test]
    fn expired_entries_pruned_on_put() {
        let cache = ResponseCache::default();
        let start = Instant::now();

        cache.put_at(start, "short lived", reply("a"), false, Some(Duration::from_secs(1)));
        cache.put_at(start + Duration::from_secs(5), "fresh", reply("b"), false, None);

        let stats = cache.stats_at(start + Duration::from_secs(5));
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.active_entries, 1);
    }

    #[test]
    fn find_similar_respects_threshold() {
        let cache = ResponseCache::default();
        cache.put(
            "explain the laws of thermodynamics",
            reply("thermo answer"),
            false,
            None,
        );

        // Heavy token overlap matches
        let hit = cache.find_similar("explain the laws of motion");
        assert_eq!(hit.expect("expected similar hit").reply, "thermo answer");

        // Zero token overlap never matches
        assert!(cache.find_similar("completely unrelated query").is_none());
    }

    #[test]
    fn find_similar_prefers_highest_score() {
        let cache = ResponseCache::default();
        cache.put("explain quantum theory applications today", reply("weak"), false, None);
        cache.put("explain quantum mechanics basics", reply("strong"), false, None);

        let hit = cache.find_similar("explain quantum mechanics");
        assert_eq!(hit.expect("expected hit").reply, "strong");
    }

    #[test]
    fn fallback_prefers_similar_then_synthesizes() {
        let cache = ResponseCache::default();
        cache.put("how do plants make food", reply("photosynthesis"), false, None);

        let similar = cache.fallback_response("how do plants make energy", "network");
        assert!(similar.is_fallback);
        assert!(similar.reply.contains("[Cached Response]"));
        assert!(similar.reply.contains("photosynthesis"));

        cache.clear();
        let synthetic = cache.fallback_response("anything at all", "service_error");
        assert!(synthetic.is_fallback);
        assert!(synthetic.success);
        assert!(synthetic.final_approved);
        assert!(synthetic.reply.contains("anything at all"));
        assert!(synthetic.reply.contains("service_error"));
    }

    #[test]
    fn stats_and_clear() {
        let cache = ResponseCache::new(10, Duration::from_secs(30));
        cache.put("a", reply("a"), false, None);
        cache.put("b", reply("b"), false, None);

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.max_entries, 10);
        assert_eq!(stats.default_ttl_seconds, 30);

        cache.clear();
        assert_eq!(cache.stats().total_entries, 0);
    }
}
