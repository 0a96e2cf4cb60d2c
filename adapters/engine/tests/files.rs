use std::{fs, path::PathBuf};

use citysim_core::{CityLocation, ToolKind};
use citysim_engine::{Engine, EngineConfig};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("citysim-engine-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir");
    dir.join(name)
}

fn bundled_resource() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tiles/assets/tiles.rc")
}

#[test]
fn config_files_are_read_from_disk() {
    let path = scratch("city.toml");
    fs::write(&path, "seed = 3\nwidth = 24\nheight = 16\n").expect("write config");

    let config = EngineConfig::from_path(&path).expect("config");
    assert_eq!((config.seed, config.width, config.height), (3, 24, 16));

    let engine = Engine::with_tile_resource(config, bundled_resource()).expect("engine");
    assert!(engine.tile(CityLocation::new(23, 15)).is_some());
    assert!(engine.tile(CityLocation::new(24, 15)).is_none());
}

#[test]
fn missing_files_name_the_path() {
    let path = scratch("absent.toml");
    let error = EngineConfig::from_path(&path).expect_err("missing");
    assert!(format!("{error:#}").contains("absent.toml"));

    let error = Engine::with_tile_resource(EngineConfig::default(), scratch("absent.rc"))
        .expect_err("missing");
    assert!(format!("{error:#}").contains("absent.rc"));
}

#[test]
fn invalid_config_files_report_the_cause() {
    let path = scratch("tiny.toml");
    fs::write(&path, "width = 0\n").expect("write config");
    let error = EngineConfig::from_path(&path).expect_err("rejected");
    let message = format!("{error:#}");
    assert!(message.contains("tiny.toml"));
    assert!(message.contains("0x100"));
}

#[test]
fn cities_survive_a_trip_through_a_file() {
    let path = scratch("city.sav");
    let mut engine = Engine::from_config(EngineConfig {
        width: 32,
        height: 32,
        ..EngineConfig::default()
    })
    .expect("engine");
    let _ = engine.apply_tool(ToolKind::FireStation, CityLocation::new(6, 6));
    engine.step().expect("tick");
    engine.save_path(&path).expect("save");

    let mut restored = Engine::from_config(EngineConfig::default()).expect("engine");
    restored.load_path(&path).expect("load");
    assert_eq!(restored.save(), engine.save());
}
