#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host-facing engine that owns a city and drives its systems.
//!
//! The engine is the only component that sequences the systems. Hosts submit
//! [`Command`] values or call the matching methods, then receive the resulting
//! [`Event`] values through listeners registered with [`Engine::subscribe`].
//! Listeners run after the command completes, in subscription order.

mod config;

use std::{fmt, fs, path::Path};

use anyhow::Context;
use citysim_core::{
    CityLocation, CityOptions, Command, DisasterKind, Event, Tile, TileId, ToolKind, ToolResult,
};
use citysim_system_disasters::Disasters;
use citysim_system_propagation::{update_environment, Propagation};
use citysim_system_sprites::SpriteManager;
use citysim_system_tools::{ToolPreview, ToolStroke};
use citysim_system_zoning::{Budget, ZoneEvaluator};
use citysim_tiles::{RegistryError, TileRegistry};
use citysim_world::{query, save, SaveError, World};
use thiserror::Error;
use tracing::{info, warn};

pub use config::{ConfigError, EngineConfig, MAX_EDGE};

/// Failures surfaced to the host.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The tile catalogue could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A save could not be decoded.
    #[error(transparent)]
    Save(#[from] SaveError),
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A host named a tool the engine does not know.
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    /// A tick left the map in a state the catalogue cannot describe.
    #[error("world invariant violated: {0}")]
    InvariantViolation(String),
}

/// Receives every event the engine broadcasts.
pub trait CityListener {
    /// Called once per event, in emission order.
    fn on_event(&mut self, event: &Event);
}

impl<F> CityListener for F
where
    F: FnMut(&Event),
{
    fn on_event(&mut self, event: &Event) {
        self(event);
    }
}

/// A city together with the systems that simulate it.
pub struct Engine {
    registry: TileRegistry,
    world: World,
    zoning: ZoneEvaluator,
    propagation: Propagation,
    sprites: SpriteManager,
    disasters: Disasters,
    budget: Budget,
    listeners: Vec<Box<dyn CityListener>>,
    pending: Vec<Event>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("world", &self.world)
            .field("sprites", &self.sprites)
            .field("disasters", &self.disasters)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Founds a city of bare dirt described by `config`.
    pub fn new(config: EngineConfig, registry: TileRegistry) -> Result<Self, EngineError> {
        config.validate()?;
        let mut world = World::new(
            config.width,
            config.height,
            config.seed,
            config.starting_funds,
        );
        let mut ignored = Vec::new();
        citysim_world::apply(
            &mut world,
            Command::SetOptions {
                options: config.options,
            },
            &mut ignored,
        );
        info!(
            width = config.width,
            height = config.height,
            seed = config.seed,
            tiles = registry.len(),
            "city founded"
        );
        Ok(Self {
            registry,
            world,
            zoning: ZoneEvaluator::new(config.zoning),
            propagation: Propagation::new(config.propagation()),
            sprites: SpriteManager::new(),
            disasters: Disasters::new(config.disasters),
            budget: Budget::new(config.budget),
            listeners: Vec::new(),
            pending: Vec::new(),
        })
    }

    /// Founds a city using the bundled tile catalogue.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        let registry = TileRegistry::bundled()?;
        Self::new(config, registry)
    }

    /// Founds a city using a tile catalogue read from `tiles`.
    pub fn with_tile_resource(config: EngineConfig, tiles: impl AsRef<Path>) -> anyhow::Result<Self> {
        let tiles = tiles.as_ref();
        let registry = TileRegistry::from_path(tiles)
            .with_context(|| format!("failed to load tile catalogue {}", tiles.display()))?;
        Ok(Self::new(config, registry)?)
    }

    /// Registers a listener; it sees every event emitted from now on.
    pub fn subscribe(&mut self, listener: impl CityListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Executes a host command.
    ///
    /// Tool commands report their outcome through [`Event::ToolApplied`].
    pub fn apply(&mut self, command: Command) -> Result<(), EngineError> {
        match command {
            Command::Step => return self.step(),
            Command::ApplyTool { tool, location } => {
                let _ = self.apply_tool(tool, location);
            }
            Command::DragTool { tool, from, to } => {
                let _ = self.drag_tool(tool, from, to);
            }
            Command::TriggerDisaster { kind, location } => {
                let _ = self.trigger_disaster(kind, location);
            }
            command @ (Command::SetOptions { .. } | Command::SetFunds { .. }) => {
                citysim_world::apply(&mut self.world, command, &mut self.pending);
                self.flush();
            }
        }
        Ok(())
    }

    /// Advances the city by one tick.
    ///
    /// Phases run in a fixed order: zone evaluation, propagation, sprites,
    /// hazards, random disasters and finally the budget. Events are delivered
    /// once every phase has finished, even when the tick fails the final map
    /// check.
    pub fn step(&mut self) -> Result<(), EngineError> {
        citysim_world::apply(&mut self.world, Command::Step, &mut self.pending);
        {
            let mut ctx = self.world.tick_context();
            self.zoning.run(&mut ctx, &self.registry, &mut self.pending);
            self.propagation.run(&mut ctx, &self.registry);
            self.sprites
                .advance_all(&mut ctx, &self.registry, &mut self.pending);
            self.disasters.update_hazards(&mut ctx, &self.registry);
            let _ = self.disasters.random_disaster(
                &mut ctx,
                &self.registry,
                &mut self.sprites,
                &mut self.pending,
            );
            self.budget.run(&mut ctx, &self.registry, &mut self.pending);
        }
        let checked = self.check_tiles();
        self.flush();
        checked
    }

    /// Applies a tool anchored at a single tile.
    pub fn apply_tool(&mut self, tool: ToolKind, location: CityLocation) -> ToolResult {
        self.drag_tool(tool, location, location)
    }

    /// Applies a tool selected by its stable name.
    pub fn apply_tool_named(
        &mut self,
        name: &str,
        location: CityLocation,
    ) -> Result<ToolResult, EngineError> {
        let tool =
            ToolKind::from_name(name).ok_or_else(|| EngineError::UnknownTool(name.to_owned()))?;
        Ok(self.apply_tool(tool, location))
    }

    /// Applies a tool along a drag from `from` to `to`.
    pub fn drag_tool(&mut self, tool: ToolKind, from: CityLocation, to: CityLocation) -> ToolResult {
        let result = citysim_system_tools::drag_tool(
            &mut self.world,
            &self.registry,
            tool,
            from,
            to,
            &mut self.pending,
        );
        self.flush();
        result
    }

    /// Reports what a tool would do without touching the city.
    #[must_use]
    pub fn preview_tool(
        &self,
        tool: ToolKind,
        from: CityLocation,
        to: CityLocation,
    ) -> ToolPreview {
        let options = query::options(&self.world);
        let mut stroke = ToolStroke::new(tool, from)
            .drag_to(to)
            .auto_bulldoze(options.auto_bulldoze);
        citysim_system_tools::preview_tool(
            query::map(&self.world),
            &self.registry,
            &mut stroke,
            query::funds(&self.world),
        )
    }

    /// Triggers a disaster; `None` lets the city RNG choose where.
    ///
    /// Returns whether anything happened.
    pub fn trigger_disaster(&mut self, kind: DisasterKind, location: Option<CityLocation>) -> bool {
        let triggered = {
            let mut ctx = self.world.tick_context();
            self.disasters.trigger(
                kind,
                location,
                &mut ctx,
                &self.registry,
                &mut self.sprites,
                &mut self.pending,
            )
        };
        self.flush();
        triggered
    }

    /// Replaces the city with one decoded from `bytes`.
    ///
    /// Sprites and disasters in progress are discarded. Pollution, coverage,
    /// land value and crime are rebuilt from the loaded tiles; traffic starts
    /// empty. On failure the current city is left untouched.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        let world = save::decode(bytes, &self.registry)?;
        self.world = world;
        self.sprites.clear();
        self.disasters.reset();
        {
            let ctx = self.world.tick_context();
            update_environment(ctx.map, &self.registry, ctx.maps);
        }
        info!(
            width = query::map(&self.world).width(),
            height = query::map(&self.world).height(),
            cycle = query::cycle(&self.world),
            "city loaded"
        );
        self.pending.push(Event::FundsChanged {
            funds: query::funds(&self.world),
        });
        self.pending.push(Event::OptionsChanged {
            options: query::options(&self.world),
        });
        self.flush();
        Ok(())
    }

    /// Encodes the city in the big-endian save format.
    #[must_use]
    pub fn save(&self) -> Vec<u8> {
        let bytes = save::encode(&self.world);
        info!(bytes = bytes.len(), cycle = query::cycle(&self.world), "city saved");
        bytes
    }

    /// Reads a save file and loads it.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("failed to read city save {}", path.display()))?;
        self.load(&bytes)
            .with_context(|| format!("failed to load city save {}", path.display()))
    }

    /// Writes the city to a save file.
    pub fn save_path(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        fs::write(path, self.save())
            .with_context(|| format!("failed to write city save {}", path.display()))
    }

    /// Raw cell at the location, or `None` outside the map.
    #[must_use]
    pub fn tile(&self, location: CityLocation) -> Option<Tile> {
        query::tile(&self.world, location)
    }

    /// Tile id at the location, or [`TileId::CLEAR`] outside the map.
    #[must_use]
    pub fn tile_id(&self, location: CityLocation) -> TileId {
        query::tile_id(&self.world, location)
    }

    /// Active gameplay options.
    #[must_use]
    pub fn options(&self) -> CityOptions {
        query::options(&self.world)
    }

    /// Read-only access to the city state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Tile catalogue the city is built from.
    #[must_use]
    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    /// Sprites currently alive.
    #[must_use]
    pub fn sprites(&self) -> &SpriteManager {
        &self.sprites
    }

    fn check_tiles(&self) -> Result<(), EngineError> {
        match query::first_unregistered_tile(&self.world, &self.registry) {
            None => Ok(()),
            Some((location, id)) => {
                warn!(
                    x = location.x(),
                    y = location.y(),
                    id = id.get(),
                    "unregistered tile after tick"
                );
                Err(EngineError::InvariantViolation(format!(
                    "tile {} at ({}, {}) is not in the catalogue",
                    id.get(),
                    location.x(),
                    location.y()
                )))
            }
        }
    }

    fn flush(&mut self) {
        for event in self.pending.drain(..) {
            for listener in &mut self.listeners {
                listener.on_event(&event);
            }
        }
    }
}
