use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use log::{error, info, warn};

use ediag::app::EyeDiagApp;
use ediag::cli::Cli;
use ediag::client::OpenIrisClient;
use ediag::logger;
use ediag::pipeline::{DeferredRedraw, IngestionWorker, TraceCoordinator};

const EXIT_INGESTION_FAILED: i32 = 1;
const EXIT_CONFIG_OR_GUI: i32 = 2;

fn main() {
    let cli = Cli::parse();
    logger::init_logger(cli.log_level());
    info!("Application starting");

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(EXIT_CONFIG_OR_GUI);
        }
    };

    if let Some(path) = &cli.write_config {
        match config.save_to_file(path) {
            Ok(()) => {
                info!("Configuration written to {}", path.display());
                return;
            }
            Err(e) => {
                error!("Cannot write configuration: {}", e);
                std::process::exit(EXIT_CONFIG_OR_GUI);
            }
        }
    }

    let client = match OpenIrisClient::connect(&config.server) {
        Ok(client) => client,
        Err(e) => {
            error!("Cannot open connection to {}: {}", config.server.address(), e);
            std::process::exit(EXIT_INGESTION_FAILED);
        }
    };

    let coordinator = Arc::new(TraceCoordinator::new(&config.plot));
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let redraw = DeferredRedraw::default();
    let (exit_sender, exit_receiver) = bounded(1);

    let worker = IngestionWorker::new(
        client,
        Arc::clone(&coordinator),
        redraw.clone(),
        config.retry.to_policy(),
        Arc::clone(&shutdown_signal),
    )
    .with_exit_sender(exit_sender);
    let ingestion_handle = thread::Builder::new()
        .name("ingestion".to_string())
        .spawn(move || worker.run());
    let ingestion_handle = match ingestion_handle {
        Ok(handle) => handle,
        Err(e) => {
            error!("Cannot spawn ingestion thread: {}", e);
            std::process::exit(EXIT_INGESTION_FAILED);
        }
    };

    let options = eframe::NativeOptions {
        vsync: true,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_resizable(true),
        ..Default::default()
    };

    let title = config.window.title.clone();
    let gui_result = eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            redraw.attach(cc.egui_ctx.clone());
            Ok(Box::new(EyeDiagApp::new(config, coordinator, exit_receiver)))
        }),
    );

    // GUI 关闭后，发送关闭信号给采集线程；阻塞中的 fetch 最多再等一个超时
    info!("GUI closed, signaling ingestion thread to shutdown");
    shutdown_signal.store(true, Ordering::Relaxed);

    let ingestion_failed = match ingestion_handle.join() {
        Ok(Ok(summary)) => {
            info!("Ingestion thread shut down gracefully ({} frames)", summary.frames);
            false
        }
        Ok(Err(e)) => {
            error!("Ingestion thread ended with error: {}", e);
            true
        }
        Err(e) => {
            warn!("Ingestion thread panicked: {:?}", e);
            true
        }
    };

    if let Err(e) = gui_result {
        error!("GUI failed: {}", e);
        std::process::exit(EXIT_CONFIG_OR_GUI);
    }
    if ingestion_failed {
        std::process::exit(EXIT_INGESTION_FAILED);
    }
}
