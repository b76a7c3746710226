use std::path::Path;
use std::process::ExitCode;

use common::utils::logging::{init_logging, LogFormat};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

fn main() -> ExitCode {
    // Load .env first so RUST_LOG, DATABASE_URL and APP_PORT take effect
    dotenv().ok();

    let cfg = configs::AppConfig::load_and_validate();

    // Logging settings come from the config when it loaded; defaults otherwise
    let logging = cfg.as_ref().map(|c| c.logging.clone()).unwrap_or_default();
    let format = logging.format.parse::<LogFormat>().unwrap_or_default();
    let log_guard = match init_logging(format, logging.file.as_deref().map(Path::new)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(service = "server", event = "logger_init", log_file = ?logging.file, "tracing subscriber initialized");
    if logging.format.parse::<LogFormat>().is_err() {
        warn!(format = %logging.format, "unknown log format, using json");
    }

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "server", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Service instance context (no secrets)
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "server service starting"
    );

    // run() returns after Ctrl+C once in-flight requests are drained
    let exit_code = match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "server", event = "run_failed", error = %e, "server::run returned error");
            ExitCode::FAILURE
        }
    };

    drop(rt);
    log_guard.shutdown();
    exit_code
}
