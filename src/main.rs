use color_eyre::{eyre::eyre, Result};
use dualcover::config::AppConfig;
use dualcover::mqtt::link::{ConnectionState, DeviceLink, DeviceLinkHandle};
use dualcover::mqtt::sink::ChannelCommandSink;
use dualcover::ui::DualCoverApp;
use dualcover::widget::{WidgetController, WidgetView};
use eframe::egui;
use std::path::PathBuf;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&path).await?;

    let capacity = config.mqtt.channel_capacity.max(1);
    let (update_tx, update_rx) = mpsc::channel(capacity);
    let (command_tx, command_rx) = mpsc::channel(capacity);
    let (status_tx, status_rx) = watch::channel(ConnectionState::Disconnected);

    let entities = config.card.entities();
    let widget = WidgetController::new(
        config.card.clone(),
        config.track,
        ChannelCommandSink::new(command_tx),
    )
    .map_err(|e| {
        error!("Widget not usable: {}", e);
        WidgetView::from_error(config.card.display_title(), &e)
    });

    // no link without a usable widget, the card only shows the warning then
    let mut link_handle = match &widget {
        Ok(_) => {
            let link = DeviceLink::create(
                config.mqtt.clone(),
                entities.clone(),
                update_tx,
                command_rx,
                status_tx,
            );
            Some(DeviceLinkHandle::spawn(link).map_err(|e| eyre!("Failed to start device link: {}", e))?)
        }
        Err(_) => None,
    };

    info!("Starting UI");
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([320.0, 520.0]),
        ..Default::default()
    };

    let title = config.card.display_title().to_string();
    let ui_result = eframe::run_native(
        &title,
        native_options,
        Box::new(|cc| {
            Ok(Box::new(DualCoverApp::new(
                cc, widget, entities, update_rx, status_rx,
            )))
        }),
    );

    if let Some(handle) = link_handle.as_mut() {
        handle.shutdown().await;
    }
    ui_result.map_err(|e| eyre!("UI terminated with an error: {}", e))
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
