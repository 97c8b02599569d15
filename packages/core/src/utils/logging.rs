// Логирование (tracing)

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Установить fmt subscriber с `EnvFilter`.
///
/// `RUST_LOG` переопределяет уровень по умолчанию. Повторный вызов ничего не делает,
/// поэтому функцию можно звать из тестов и из host-приложения.
pub fn init_logging(default_level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();
}
