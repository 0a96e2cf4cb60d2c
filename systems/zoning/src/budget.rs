use citysim_core::{Census, CityMessage, Evaluation, Event, Network};
use citysim_tiles::{Category, TileRegistry};
use citysim_world::{DerivedMaps, TickContext, TileMap};
use serde::Deserialize;
use tracing::debug;

const SERVICE_UPKEEP: i64 = 10;
const HIGH_TRAFFIC: u8 = 120;
const HIGH_POLLUTION: u8 = 100;
const HIGH_CRIME: u8 = 100;

/// Tunables for taxes and the periodic evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Tax collected per ten inhabitants and jobs, every tax period.
    pub tax_rate_percent: u32,
    /// Ticks between tax collections.
    pub tax_period: u32,
    /// Ticks between evaluations.
    pub evaluation_period: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            tax_rate_percent: 7,
            tax_period: 48,
            evaluation_period: 48,
        }
    }
}

/// Collects taxes, pays upkeep and grades the city on a fixed schedule.
#[derive(Debug, Default)]
pub struct Budget {
    config: BudgetConfig,
}

impl Budget {
    /// Creates the system with the provided tunables.
    #[must_use]
    pub fn new(config: BudgetConfig) -> Self {
        Self { config }
    }

    /// Runs the periodic treasury and evaluation updates due this tick.
    pub fn run(&mut self, ctx: &mut TickContext<'_>, registry: &TileRegistry, out: &mut Vec<Event>) {
        if is_due(ctx.cycle, self.config.tax_period) {
            let balance = net_income(ctx.census, self.config.tax_rate_percent);
            if balance != 0 {
                *ctx.funds += balance;
                debug!(cycle = ctx.cycle, balance, funds = *ctx.funds, "budget settled");
                out.push(Event::FundsChanged { funds: *ctx.funds });
            }
        }

        if is_due(ctx.cycle, self.config.evaluation_period) {
            let evaluation = evaluate(ctx.map, registry, ctx.maps, ctx.census);
            report_problems(ctx.census, &evaluation, out);
            if evaluation != *ctx.evaluation {
                *ctx.evaluation = evaluation;
                out.push(Event::EvaluationChanged { evaluation });
            }
        }
    }
}

fn is_due(cycle: u32, period: u32) -> bool {
    period > 0 && cycle % period == 0
}

/// Taxes minus upkeep for one period.
#[must_use]
pub fn net_income(census: &Census, tax_rate_percent: u32) -> i64 {
    let income = i64::from(census.total_population()) * i64::from(tax_rate_percent) / 10;
    let transport = (i64::from(census.road_tiles) + i64::from(census.rail_tiles)) / 8;
    let services =
        (i64::from(census.fire_stations) + i64::from(census.police_stations)) * SERVICE_UPKEEP;
    income - transport - services
}

/// Grades the city from 0 to 1000.
#[must_use]
pub fn evaluate(
    map: &TileMap,
    registry: &TileRegistry,
    maps: &DerivedMaps,
    census: &Census,
) -> Evaluation {
    let mut developed = Vec::new();
    let mut roads = Vec::new();
    for (location, cell) in map.iter() {
        let Some(spec) = registry.get(cell.id()) else {
            continue;
        };
        if spec.category == Category::Zone {
            developed.push(location);
        }
        if spec.link(Network::Road).is_some() || spec.link(Network::Rail).is_some() {
            roads.push(location);
        }
    }

    let average_crime = maps.crime.mean_over(developed.iter().copied());
    let average_pollution = maps.pollution.mean_over(developed.iter().copied());
    let average_traffic = maps.traffic.mean_over(roads);

    let zones = census.powered_zones + census.unpowered_zones;
    let unpowered = if zones == 0 {
        0
    } else {
        i64::from(census.unpowered_zones) * 1_000 / i64::from(zones)
    };
    let score = 1_000
        - i64::from(average_crime)
        - i64::from(average_pollution)
        - i64::from(average_traffic)
        - unpowered / 4
        - i64::from(census.fires) * 10;

    Evaluation {
        score: score.clamp(0, 1_000) as u16,
        average_crime,
        average_pollution,
        average_traffic,
    }
}

fn report_problems(census: &Census, evaluation: &Evaluation, out: &mut Vec<Event>) {
    let zones = census.powered_zones + census.unpowered_zones;
    let mut problems = Vec::new();
    if census.unpowered_zones > 0 && census.unpowered_zones * 5 > zones {
        problems.push(CityMessage::NeedElectricity);
    }
    if evaluation.average_traffic > HIGH_TRAFFIC {
        problems.push(CityMessage::HighTraffic);
    }
    if evaluation.average_pollution > HIGH_POLLUTION {
        problems.push(CityMessage::HighPollution);
    }
    if evaluation.average_crime > HIGH_CRIME {
        problems.push(CityMessage::HighCrime);
    }
    out.extend(problems.into_iter().map(|message| Event::CityMessage {
        message,
        location: None,
    }));
}
