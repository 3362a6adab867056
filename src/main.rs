use anyhow::Result;
use clap::Parser;
use winit::event_loop::EventLoop;

use prql_preview::{bridge, config_paths};
use prql_preview::cli::{CliArgs, StartupMode};
use prql_preview::fs_watcher::{FileSystemWatcher, WatchTargets};
use prql_preview::syntax::HighlighterCache;
use prql_preview::template::ResourceRoot;
use prql_preview::worker::CompileWorker;
use prql_preview::{Msg, Pipeline, PreviewConfig, PreviewSession, PrqlCompiler};

mod runtime;

use runtime::App;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let startup = args.into_config().map_err(anyhow::Error::msg)?;

    let _log_guard = prql_preview::tracing::init();

    if startup.mode == StartupMode::InitConfig {
        let themes_dir = config_paths::ensure_themes_dir().map_err(anyhow::Error::msg)?;
        let path = config_paths::config_file()
            .ok_or_else(|| anyhow::anyhow!("No config directory available"))?;
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            startup
                .apply_overrides(PreviewConfig::default())
                .save()
                .map_err(anyhow::Error::msg)?;
            println!("Wrote {}", path.display());
        }
        println!("Theme overrides go in {}", themes_dir.display());
        return Ok(());
    }

    let config = startup.apply_overrides(PreviewConfig::load());
    tracing::info!(
        theme = config.color_theme_or_default(),
        target = %config.target,
        "Starting prql-preview"
    );

    let event_loop = EventLoop::<Msg>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();

    let pipeline = Pipeline::new(
        PrqlCompiler::new(&config),
        HighlighterCache::new(config.color_theme.clone()),
    );
    let worker_proxy = proxy.clone();
    let worker = CompileWorker::spawn(pipeline, move |outcome| {
        let _ = worker_proxy.send_event(Msg::Compiled(outcome));
    })?;

    let session = PreviewSession::new(worker, ResourceRoot::new(startup.resources.clone()));
    let mut app = App::new(startup.clone(), config, session, proxy.clone());

    match &startup.mode {
        StartupMode::Watch(files) => {
            let targets = WatchTargets::new(files, config_paths::config_file());
            let watch_proxy = proxy.clone();
            let watcher = FileSystemWatcher::new(targets, move |events| {
                let _ = watch_proxy.send_event(Msg::Watch(events));
            })?;
            app.set_watcher(watcher);
        }
        StartupMode::Bridge => {
            let bridge_proxy = proxy.clone();
            let stdin = std::io::BufReader::new(std::io::stdin());
            bridge::spawn_reader(stdin, move |message| {
                let _ = bridge_proxy.send_event(Msg::Bridge(message));
            })?;
        }
        StartupMode::InitConfig => {}
    }

    event_loop.run_app(&mut app)?;

    Ok(())
}
