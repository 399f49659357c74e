use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use qbdash_client::{
    ActionDispatcher, ApiClient, DashboardCommands, DashboardQueries, FileWatchers,
    Poller, SharedStore,
};
use qbdash_config::{DashboardConfig, LogOutput};
use qbdash_events::EventBus;
use qbdash_telemetry::{LogFormat, LoggingConfig};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::view::{render_event, render_frame};

/// Dependencies required to bootstrap the dashboard.
pub(crate) struct BootstrapDependencies {
    config: DashboardConfig,
    api: Arc<dyn DashboardQueries>,
    commands: Arc<dyn DashboardCommands>,
    events: EventBus,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            DashboardConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        Self::from_config(config)
    }

    pub(crate) fn from_config(config: DashboardConfig) -> AppResult<Self> {
        let client = ApiClient::from_config(&config)
            .map_err(|err| AppError::client("api_client.new", err))?;
        debug!(request_id = client.request_id(), base = %client.base(), "api client ready");
        let client = Arc::new(client);
        Ok(Self {
            config,
            api: client.clone(),
            commands: client,
            events: EventBus::new(),
        })
    }
}

/// Entry point for the dashboard boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, logging or client construction fails,
/// or if the terminal can no longer be written to.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    let logging = LoggingConfig {
        level: &dependencies.config.log_level,
        format: log_format(dependencies.config.log_output),
        ..LoggingConfig::default()
    };
    qbdash_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_app_with(dependencies, shutdown_signal(), &mut out).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify testing.
pub(crate) async fn run_app_with<W: Write>(
    dependencies: BootstrapDependencies,
    shutdown: impl Future<Output = AppResult<()>>,
    out: &mut W,
) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        api,
        commands,
        events,
    } = dependencies;
    info!(
        api_url = %config.api_url,
        build_sha = qbdash_telemetry::build_sha(),
        "dashboard starting"
    );

    let mut notices = events.subscribe(None);
    let dispatcher = ActionDispatcher::new(commands, events);
    let poller = Poller::new(api, SharedStore::default());
    poller.load_snapshots().await;
    submit_startup_links(&config, &poller, &dispatcher).await;
    poller.refresh_torrents().await;

    let mut watchers = FileWatchers::new(poller.clone(), config.files_poll);
    for hash in &config.expand {
        watchers.expand(hash);
    }
    let torrents = poller.spawn_torrents(config.torrents_poll);

    let mut changes = poller.subscribe();
    write_frame(out, &poller)?;

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let pruned = watchers.prune();
                if pruned > 0 {
                    debug!(pruned, "stopped watching removed torrents");
                }
                write_frame(out, &poller)?;
            }
            Some(envelope) = notices.next() => {
                writeln!(out, "{}", render_event(&envelope))
                    .map_err(|err| AppError::io("stdout.write", err))?;
            }
        }
    }

    drop(torrents);
    drop(watchers);
    info!("dashboard stopped");
    Ok(())
}

/// Add the configured links using the form defaults from the daemon
/// preferences. The outcome reaches the terminal through the event bus.
async fn submit_startup_links(
    config: &DashboardConfig,
    poller: &Poller,
    dispatcher: &ActionDispatcher,
) {
    if config.add_links.is_empty() {
        return;
    }
    let (form, destination) = poller.read(|store| {
        let mut form = store.add_torrents_form();
        form.links.clone_from(&config.add_links);
        if let Some(category) = &config.add_category {
            form.category.clone_from(category);
            form.auto_manage = true;
        }
        let destination = store.add_destination(&form);
        (form, destination)
    });
    info!(links = form.links.len(), destination = %destination, "adding configured links");
    let outcome = dispatcher.add_torrents(&form).await;
    debug!(?outcome, "configured links submitted");
}

fn write_frame<W: Write>(out: &mut W, poller: &Poller) -> AppResult<()> {
    let frame = poller.read(render_frame);
    writeln!(out, "{frame}")
        .and_then(|()| out.flush())
        .map_err(|err| AppError::io("stdout.write", err))
}

const fn log_format(output: Option<LogOutput>) -> LogFormat {
    match output {
        Some(LogOutput::Json) => LogFormat::Json,
        Some(LogOutput::Pretty) => LogFormat::Pretty,
        None => LogFormat::infer(),
    }
}

async fn shutdown_signal() -> AppResult<()> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|err| AppError::io("signal.ctrl_c", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use url::Url;

    fn config_for(server: &MockServer) -> anyhow::Result<DashboardConfig> {
        let mut config = DashboardConfig::with_api_url(Url::parse(&server.base_url())?);
        config.torrents_poll = Duration::from_millis(20);
        config.files_poll = Duration::from_millis(20);
        config.expand = vec!["abc".to_string()];
        Ok(config)
    }

    #[test]
    fn log_output_maps_to_format() {
        assert_eq!(log_format(Some(LogOutput::Json)), LogFormat::Json);
        assert_eq!(log_format(Some(LogOutput::Pretty)), LogFormat::Pretty);
        assert_eq!(log_format(None), LogFormat::infer());
    }

    #[tokio::test]
    async fn dashboard_renders_until_shutdown() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/qbittorrent/applicationName");
            then.status(200).body("\"qBittorrent v4.3.1\"");
        });
        let torrents = server.mock(|when, then| {
            when.method(GET).path("/api/qbittorrent/torrents");
            then.status(200).json_body(json!([
                {"hash": "abc", "name": "Ubuntu", "state": 7, "priority": 1, "size": 1000}
            ]));
        });
        let files = server.mock(|when, then| {
            when.method(GET).path("/api/qbittorrent/torrent/abc/files");
            then.status(200).json_body(json!([
                {"name": "ubuntu.iso", "size": 1000, "progress": 0.25, "priority": 1}
            ]));
        });

        let dependencies = BootstrapDependencies::from_config(config_for(&server)?)?;
        let mut out = Vec::new();
        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        };
        run_app_with(dependencies, shutdown, &mut out).await?;

        let text = String::from_utf8(out)?;
        assert!(text.starts_with("qBittorrent v4.3.1\n"));
        assert!(text.contains("Ubuntu"));
        assert!(text.contains("== Ubuntu =="));
        assert!(text.contains("[ ] ubuntu.iso  1 kB  25.00%"));
        assert!(torrents.hits_async().await >= 2);
        assert!(files.hits_async().await >= 1);
        Ok(())
    }

    #[tokio::test]
    async fn configured_links_are_added_with_preference_defaults() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/qbittorrent/preferences");
            then.status(200).json_body(json!({
                "savePath": "/downloads/",
                "startPausedEnabled": true,
                "createSubfolderEnabled": true
            }));
        });
        let add = server.mock(|when, then| {
            when.method(POST)
                .path("/api/qbittorrent/torrents/add")
                .json_body(json!({
                    "links": ["magnet:?xt=urn:btih:abc"],
                    "category": "linux",
                    "autoManage": true,
                    "startTorrent": false,
                    "skipHashCheck": false,
                    "createSubfolder": true,
                    "downloadSeqOrder": false,
                    "downloadEdgeFirst": false
                }));
            then.status(200);
        });

        let mut config = config_for(&server)?;
        config.add_links = vec!["magnet:?xt=urn:btih:abc".to_string()];
        config.add_category = Some("linux".to_string());
        let dependencies = BootstrapDependencies::from_config(config)?;
        let mut out = Vec::new();
        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(())
        };
        run_app_with(dependencies, shutdown, &mut out).await?;

        add.assert_async().await;
        let text = String::from_utf8(out)?;
        assert!(text.contains("* Torrents Added: 1 torrent(s) have been added!"));
        Ok(())
    }

    #[tokio::test]
    async fn shutdown_errors_propagate() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let dependencies = BootstrapDependencies::from_config(config_for(&server)?)?;
        let mut out = Vec::new();
        let shutdown = async { Err(AppError::io("signal.ctrl_c", std::io::Error::other("denied"))) };

        let result = run_app_with(dependencies, shutdown, &mut out).await;
        assert!(matches!(result, Err(AppError::Io { operation: "signal.ctrl_c", .. })));
        Ok(())
    }
}
