mod cli;

use crate::cli::CliArgs;
use clap::Parser;
use raylink_server::scene::{self, SceneDescription};
use raylink_server::{start_server, SharedScene};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    builder.parse_default_env();
    builder.init();

    let args = CliArgs::parse();

    /*
     * Load the scene (physics only).
     */
    let description = match &args.scene {
        Some(path) => SceneDescription::load(path)?,
        None => scene::builtin_scene(),
    };
    let scene = SharedScene::default();
    scene.install(description.build()?)?;
    log::info!(
        "loaded scene `{}` ({} colliders)",
        description.name,
        description.colliders.len()
    );

    /*
     * Serve raycasts until the process is killed.
     */
    let never = start_server(&args.server_config(), Arc::new(scene))?;
    match never {}
}
