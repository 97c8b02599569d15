//! Shared Secret Cache
//!
//! Кэш симметричных ключей по неупорядоченной паре identity.
//!
//! ## Жизненный цикл записи
//!
//! ```text
//! CREATED ──► VALID (age < TTL) ──► EXPIRED (age ≥ TTL) ──► REMOVED
//!                 │                      │
//!                 └──── purge(identity) ─┴──► REMOVED
//! ```
//!
//! - `get_or_create` отдаёт запись только в состоянии VALID, иначе делает новую
//!   деривацию с новой версией.
//! - EXPIRED запись остаётся видимой через `peek` до `sweep`.
//! - Никакого LRU: вытеснение только по возрасту.
//!
//! ## Single-flight
//!
//! Параллельные `get_or_create` для одной и той же пары ждут одну деривацию,
//! а не считают ECDH каждый сам. Повторная деривация не была бы ошибкой
//! (результат детерминирован), но это лишняя работа.

use crate::utils::error::Result;
use crate::utils::time::Clock;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use zeroize::Zeroizing;

// ============================================================================
// PairKey
// ============================================================================

/// Каноничный идентификатор пары: `PairKey::new(a, b) == PairKey::new(b, a)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub fn references(&self, identity: &str) -> bool {
        self.first == identity || self.second == identity
    }

    /// Однозначная байтовая форма (length-prefixed) для HKDF info
    pub fn to_info_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.first.len() + self.second.len());
        out.extend_from_slice(&(self.first.len() as u32).to_be_bytes());
        out.extend_from_slice(self.first.as_bytes());
        out.extend_from_slice(&(self.second.len() as u32).to_be_bytes());
        out.extend_from_slice(self.second.as_bytes());
        out
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.second)
    }
}

// ============================================================================
// TtlCache
// ============================================================================

struct CacheEntry<V> {
    value: V,
    inserted_at: i64,
}

/// Простой кэш с вытеснением по возрасту.
///
/// Время передаётся снаружи (миллисекунды), сам кэш часов не читает.
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl_millis: i64,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl_millis: i64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_millis,
        }
    }

    /// Запись, только если она ещё не просрочена
    pub fn get(&self, key: &K, now: i64) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| &entry.value)
    }

    /// Запись независимо от возраста
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn put(&mut self, key: K, value: V, now: i64) -> Option<V> {
        self.entries
            .insert(key, CacheEntry { value, inserted_at: now })
            .map(|old| old.value)
    }

    pub fn evict(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Удалить все записи, для которых предикат вернул `true`
    pub fn purge_by<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|key, entry| !predicate(key, &entry.value));
        before - self.entries.len()
    }

    /// Удалить просроченные записи. Идемпотентно.
    pub fn sweep(&mut self, now: i64) -> usize {
        let ttl = self.ttl_millis;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.inserted_at) < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: i64) -> bool {
        now.saturating_sub(entry.inserted_at) >= self.ttl_millis
    }
}

// ============================================================================
// SharedSecret
// ============================================================================

/// Симметричный ключ пары
#[derive(Clone)]
pub struct SharedSecret {
    pub pair_key: PairKey,
    pub symmetric_key: Zeroizing<Vec<u8>>,
    /// Unix millis
    pub created_at: i64,
    pub version: String,
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("pair_key", &self.pair_key)
            .field("created_at", &self.created_at)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SharedSecretCache
// ============================================================================

pub struct SharedSecretCache {
    entries: Mutex<TtlCache<PairKey, SharedSecret>>,
    in_flight: Mutex<HashMap<PairKey, Arc<tokio::sync::Mutex<()>>>>,
    sequence: AtomicU64,
    /// Счётчик purge по identity: деривация пары, начатая до purge любого из
    /// её участников, не кэшируется
    purge_epochs: Mutex<HashMap<String, u64>>,
    clock: Arc<dyn Clock>,
}

impl SharedSecretCache {
    pub fn new(ttl_millis: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(TtlCache::new(ttl_millis)),
            in_flight: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            purge_epochs: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Вернуть действующий секрет пары или вывести новый через `derive`.
    ///
    /// `derive` получает каноничный `PairKey` и должен вернуть байты
    /// симметричного ключа. Вызывается не более одного раза на пару
    /// одновременно.
    pub async fn get_or_create<F, Fut>(
        &self,
        self_identity: &str,
        peer_identity: &str,
        derive: F,
    ) -> Result<SharedSecret>
    where
        F: FnOnce(PairKey) -> Fut,
        Fut: Future<Output = Result<Zeroizing<Vec<u8>>>>,
    {
        let pair_key = PairKey::new(self_identity, peer_identity);

        if let Some(secret) = self.fresh(&pair_key) {
            tracing::debug!(pair = %pair_key, version = %secret.version, "Shared secret cache hit");
            return Ok(secret);
        }

        let flight = self.flight_lock(&pair_key);
        let guard = flight.lock().await;

        // Пока ждали, секрет мог вывести другой вызов
        if let Some(secret) = self.fresh(&pair_key) {
            tracing::debug!(pair = %pair_key, "Shared secret derived by concurrent caller");
            return Ok(secret);
        }

        let epoch = self.pair_epoch(&pair_key);
        let result = self.derive_and_store(&pair_key, epoch, derive).await;

        // Запись уже в кэше (или деривация упала), только теперь отпускаем ожидающих
        drop(guard);
        self.release_flight(&pair_key, &flight);

        result
    }

    async fn derive_and_store<F, Fut>(
        &self,
        pair_key: &PairKey,
        epoch: (u64, u64),
        derive: F,
    ) -> Result<SharedSecret>
    where
        F: FnOnce(PairKey) -> Fut,
        Fut: Future<Output = Result<Zeroizing<Vec<u8>>>>,
    {
        let symmetric_key = derive(pair_key.clone()).await?;
        let now = self.clock.now_millis();
        let secret = SharedSecret {
            pair_key: pair_key.clone(),
            symmetric_key,
            created_at: now,
            version: self.next_version(now),
        };

        // Сверка эпох и вставка под одним lock: purge не может вклиниться между ними
        let mut entries = self.lock_entries();
        if self.pair_epoch(pair_key) == epoch {
            entries.put(pair_key.clone(), secret.clone(), now);
            tracing::debug!(pair = %pair_key, version = %secret.version, "Shared secret derived");
        } else {
            tracing::debug!(pair = %pair_key, "Purge raced with derivation; secret not cached");
        }

        Ok(secret)
    }

    /// Удалить все секреты, где участвует `identity`
    pub fn purge(&self, identity: &str) -> usize {
        let mut entries = self.lock_entries();
        *self
            .lock_epochs()
            .entry(identity.to_string())
            .or_insert(0) += 1;
        let removed = entries.purge_by(|pair_key, _| pair_key.references(identity));
        drop(entries);
        tracing::debug!(identity, removed, "Purged shared secrets");
        removed
    }

    /// Удалить просроченные секреты
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        self.lock_entries().sweep(now)
    }

    /// Есть ли в кэше хоть одна запись с участием `identity`
    pub fn references(&self, identity: &str) -> bool {
        self.lock_entries()
            .entries
            .keys()
            .any(|pair_key| pair_key.references(identity))
    }

    /// Запись без учёта возраста (для диагностики)
    pub fn peek(&self, a: &str, b: &str) -> Option<SharedSecret> {
        self.lock_entries().peek(&PairKey::new(a, b)).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn fresh(&self, pair_key: &PairKey) -> Option<SharedSecret> {
        let now = self.clock.now_millis();
        self.lock_entries().get(pair_key, now).cloned()
    }

    fn pair_epoch(&self, pair_key: &PairKey) -> (u64, u64) {
        let epochs = self.lock_epochs();
        let of = |identity: &str| epochs.get(identity).copied().unwrap_or(0);
        (of(&pair_key.first), of(&pair_key.second))
    }

    fn lock_epochs(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.purge_epochs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_version(&self, now: i64) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", now, seq)
    }

    fn flight_lock(&self, pair_key: &PairKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight
            .entry(pair_key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn release_flight(&self, pair_key: &PairKey, flight: &Arc<tokio::sync::Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if in_flight
            .get(pair_key)
            .map(|current| Arc::ptr_eq(current, flight))
            .unwrap_or(false)
        {
            in_flight.remove(pair_key);
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, TtlCache<PairKey, SharedSecret>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::E2eeError;
    use crate::utils::time::ManualClock;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    const TTL: i64 = 60 * 60 * 1000;

    fn cache() -> (SharedSecretCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        (SharedSecretCache::new(TTL, clock.clone()), clock)
    }

    async fn fixed_key(_: PairKey) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(vec![7u8; 32]))
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(PairKey::new("alice", "bob"), PairKey::new("bob", "alice"));
        assert_eq!(PairKey::new("bob", "alice").to_string(), "alice:bob");
        assert!(PairKey::new("alice", "bob").references("bob"));
        assert!(!PairKey::new("alice", "bob").references("carol"));
    }

    #[test]
    fn test_pair_key_info_bytes_are_unambiguous() {
        assert_ne!(
            PairKey::new("a:b", "c").to_info_bytes(),
            PairKey::new("a", "b:c").to_info_bytes()
        );
    }

    #[test]
    fn test_ttl_cache_expiry_and_sweep() {
        let mut cache = TtlCache::new(1_000);
        cache.put("k", 1, 0);
        assert_eq!(cache.get(&"k", 999), Some(&1));
        assert_eq!(cache.get(&"k", 1_000), None);
        // Просроченная запись ещё видна через peek до sweep
        assert_eq!(cache.peek(&"k"), Some(&1));

        assert_eq!(cache.sweep(1_000), 1);
        assert_eq!(cache.sweep(1_000), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_cache_purge_by() {
        let mut cache = TtlCache::new(1_000);
        cache.put(1, "a", 0);
        cache.put(2, "b", 0);
        cache.put(3, "c", 0);
        assert_eq!(cache.purge_by(|k, _| k % 2 == 1), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.evict(&2), Some("b"));
    }

    #[tokio::test]
    async fn test_get_or_create_caches_per_pair() {
        let (cache, _) = cache();
        let first = cache.get_or_create("alice", "bob", fixed_key).await.unwrap();
        let second = cache.get_or_create("bob", "alice", fixed_key).await.unwrap();

        assert_eq!(first.version, second.version);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_secret_is_rederived_with_new_version() {
        let (cache, clock) = cache();
        let first = cache.get_or_create("alice", "bob", fixed_key).await.unwrap();

        clock.advance(Duration::from_millis(TTL as u64));
        let second = cache.get_or_create("alice", "bob", fixed_key).await.unwrap();

        assert_ne!(first.version, second.version);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_removes_only_referencing_pairs() {
        let (cache, _) = cache();
        cache.get_or_create("alice", "bob", fixed_key).await.unwrap();
        cache.get_or_create("alice", "carol", fixed_key).await.unwrap();
        cache.get_or_create("bob", "carol", fixed_key).await.unwrap();

        assert_eq!(cache.purge("alice"), 2);
        assert!(cache.peek("bob", "carol").is_some());
        assert!(cache.peek("alice", "bob").is_none());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let (cache, clock) = cache();
        cache.get_or_create("alice", "bob", fixed_key).await.unwrap();
        clock.advance(Duration::from_secs(30 * 60));
        cache.get_or_create("alice", "carol", fixed_key).await.unwrap();
        clock.advance(Duration::from_secs(30 * 60));

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.peek("alice", "carol").is_some());
    }

    #[tokio::test]
    async fn test_failed_derivation_is_not_cached() {
        let (cache, _) = cache();
        let result = cache
            .get_or_create("alice", "bob", |_| async {
                Err(E2eeError::KeyNotFound {
                    identity: "bob".to_string(),
                    purpose: crate::crypto::peer_keys::KeyPurpose::KeyAgreement,
                })
            })
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_derivation() {
        let (cache, _) = cache();
        let cache = Arc::new(cache);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                let (a, b) = if i % 2 == 0 { ("alice", "bob") } else { ("bob", "alice") };
                cache
                    .get_or_create(a, b, |_| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(Zeroizing::new(vec![1u8; 32]))
                    })
                    .await
                    .unwrap()
                    .version
            }));
        }

        let mut versions = Vec::new();
        for handle in handles {
            versions.push(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(versions.iter().all(|v| v == &versions[0]));
        assert!(cache.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_secret_is_cached_before_waiters_resume() {
        let (cache, _) = cache();
        let cache = Arc::new(cache);
        let observer = cache.clone();

        let secret = cache
            .get_or_create("alice", "bob", |_| async {
                Ok(Zeroizing::new(vec![3u8; 32]))
            })
            .await
            .unwrap();

        // Flight lock уже отпущен, а запись уже лежит в кэше
        assert!(observer.in_flight.lock().unwrap().is_empty());
        assert_eq!(observer.peek("alice", "bob").unwrap().version, secret.version);
    }

    #[tokio::test]
    async fn test_unrelated_purge_during_derivation_keeps_secret() {
        let (cache, _) = cache();
        let cache = Arc::new(cache);
        let purger = cache.clone();

        let secret = cache
            .get_or_create("alice", "bob", |_| async move {
                purger.purge("carol");
                Ok(Zeroizing::new(vec![4u8; 32]))
            })
            .await
            .unwrap();

        assert_eq!(cache.len(), 1);
        let again = cache.get_or_create("bob", "alice", fixed_key).await.unwrap();
        assert_eq!(again.version, secret.version);
    }

    #[tokio::test]
    async fn test_purge_during_derivation_is_not_cached() {
        let (cache, _) = cache();
        let cache = Arc::new(cache);
        let purger = cache.clone();

        let secret = cache
            .get_or_create("alice", "bob", |_| async move {
                purger.purge("alice");
                Ok(Zeroizing::new(vec![2u8; 32]))
            })
            .await
            .unwrap();

        assert_eq!(secret.symmetric_key.as_slice(), &[2u8; 32]);
        assert!(cache.is_empty());
    }
}
