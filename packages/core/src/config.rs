//! Централизованная конфигурация для E2EE движка
//!
//! Все константы и настройки определены здесь, чтобы избежать хардкода по всему
//! проекту. Глобального экземпляра нет: конфигурация передаётся в
//! [`crate::api::E2eeService::new`] явно.

use std::time::Duration;

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // КРИПТОГРАФИЧЕСКИЕ ПАРАМЕТРЫ
    // ============================================

    /// Длина симметричного AEAD ключа (в байтах)
    pub key_length: usize,

    /// Длина IV для AEAD (в байтах), 96 бит
    pub nonce_length: usize,

    /// Размер authentication tag (в байтах)
    pub tag_length: usize,

    /// Размер публичного ключа X25519 / Ed25519 (в байтах)
    pub public_key_size: usize,

    /// Размер Ed25519 подписи (в байтах)
    pub signature_size: usize,

    /// Salt для HKDF при деривации shared secret
    pub suite_label: &'static [u8],

    // ============================================
    // SHARED SECRET CACHE
    // ============================================

    /// Время жизни shared secret. По умолчанию: 1 час
    pub shared_secret_ttl: Duration,

    /// Период фоновой очистки просроченных секретов. По умолчанию: 5 минут
    pub sweep_interval: Duration,

    // ============================================
    // ВРЕМЕННЫЕ ПАРАМЕТРЫ
    // ============================================

    /// Таймаут на один вызов криптографического примитива
    pub crypto_timeout: Duration,

    /// Насколько timestamp сообщения может опережать локальные часы (в миллисекундах)
    pub max_clock_skew_ms: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_length: 32,
            nonce_length: 12,
            tag_length: 16,
            public_key_size: 32,
            signature_size: 64,
            suite_label: b"cipherlink-shared-secret-v1",

            shared_secret_ttl: Duration::from_secs(60 * 60), // 1 hour
            sweep_interval: Duration::from_secs(5 * 60),

            crypto_timeout: Duration::from_secs(5),
            max_clock_skew_ms: 5 * 60 * 1000, // 5 minutes
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    ///
    /// Нераспознанные значения игнорируются, остаются значения по умолчанию.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = env_parse::<u64>("E2EE_SECRET_TTL_SECS") {
            config.shared_secret_ttl = Duration::from_secs(secs);
        }

        if let Some(secs) = env_parse::<u64>("E2EE_SWEEP_INTERVAL_SECS") {
            config.sweep_interval = Duration::from_secs(secs);
        }

        if let Some(ms) = env_parse::<u64>("E2EE_CRYPTO_TIMEOUT_MS") {
            config.crypto_timeout = Duration::from_millis(ms);
        }

        if let Some(ms) = env_parse::<i64>("E2EE_MAX_CLOCK_SKEW_MS") {
            config.max_clock_skew_ms = ms;
        }

        config
    }

    /// Переопределить TTL (удобно для тестов и host-приложений)
    pub fn with_shared_secret_ttl(mut self, ttl: Duration) -> Self {
        self.shared_secret_ttl = ttl;
        self
    }

    pub fn with_crypto_timeout(mut self, timeout: Duration) -> Self {
        self.crypto_timeout = timeout;
        self
    }

    pub(crate) fn ttl_millis(&self) -> i64 {
        i64::try_from(self.shared_secret_ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|val| val.parse().ok())
}
