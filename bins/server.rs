use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

use configs::AppConfig;

/// Resolves on Ctrl+C; the server then stops accepting and drains open requests.
async fn shutdown_signal(instance: Uuid) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // 无法监听信号时不主动停机，只能由进程外部终止
        warn!(service = "laundry", event = "signal_unavailable", error = %e, "ctrl_c listener failed");
        std::future::pending::<()>().await;
    }
    info!(service = "laundry", event = "shutdown_signal", %instance, "draining open requests");
}

fn main() -> ExitCode {
    // 提前加载 .env，使 RUST_LOG / LOG_FORMAT / DATABASE_URL 生效
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let instance = Uuid::new_v4();
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "laundry", event = "panic", %instance, message = %info, "unhandled panic occurred");
    }));

    // 配置只加载一次，运行时线程数与服务参数共用同一份
    let cfg = match AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "laundry", event = "config_invalid", error = %e, "refusing to start");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "laundry",
        event = "start",
        %instance,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        host = %cfg.server.host,
        port = cfg.server.port,
        weight_rate = %cfg.pricing.weight_rate,
        run_migrations = cfg.database.run_migrations,
        token_ttl_minutes = cfg.auth.token_ttl_minutes,
        "laundry server starting"
    );

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "laundry", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(server::serve(cfg, shutdown_signal(instance))) {
        Ok(()) => {
            info!(service = "laundry", event = "stop", %instance, "server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "laundry", event = "serve_failed", %instance, error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}
