//! Natural spawning of hostiles.
//!
//! On every turn divisible by the spawn interval the controller tops the
//! dungeon up with a small batch of hostiles, placed in rooms away from the
//! player. Every random choice goes through the [`RngOracle`], so a seeded
//! oracle replays the same spawns.

use tracing::{debug, info, warn};

use super::report::SpawnReport;
use super::speed::SpeedTierPolicy;
use crate::config::{PopulationConfig, SpawnCountBand, TurnSystemConfig};
use crate::env::{CellKind, CollaboratorKind, Env, RngOracle, Room, World};
use crate::error::SchedulerError;
use crate::state::{Faction, Position, TurnManager};

/// Draws a spawn count from the cumulative per-mille table.
///
/// The roll selects the first band whose threshold exceeds it. A table whose
/// last threshold is below 1000 falls back to its last band; an empty table
/// yields 0.
pub fn sample_spawn_count(bands: &[SpawnCountBand], rng: &mut dyn RngOracle) -> u32 {
    let roll = rng.roll_permille();
    bands
        .iter()
        .find(|band| roll < band.cumulative_permille)
        .or_else(|| bands.last())
        .map_or(0, |band| band.count)
}

pub struct PopulationController<'s> {
    config: &'s TurnSystemConfig,
    manager: &'s mut TurnManager,
}

impl<'s> PopulationController<'s> {
    pub fn new(config: &'s TurnSystemConfig, manager: &'s mut TurnManager) -> Self {
        Self { config, manager }
    }

    fn population(&self) -> &'s PopulationConfig {
        let config: &'s TurnSystemConfig = self.config;
        &config.population
    }

    /// Whether spawning is considered on the manager's current turn.
    pub fn is_due(&self) -> bool {
        let interval = self.population().spawn_interval;
        interval != 0 && self.manager.current_turn % interval == 0
    }

    /// Runs the spawn check. Returns `None` on turns that are not due.
    pub fn run<W: World + ?Sized>(&mut self, env: &mut Env<'_, W>) -> Option<SpawnReport> {
        if !self.is_due() {
            return None;
        }

        let population = self.population();
        let turn = self.manager.current_turn;
        let hostiles = self.manager.count(Faction::Hostile);
        if hostiles >= population.population_cap {
            debug!(turn, hostiles, cap = population.population_cap, "population at cap; no spawn");
            return Some(SpawnReport::skipped(hostiles));
        }

        let required = [CollaboratorKind::Rng, CollaboratorKind::SpawnFactory]
            .into_iter()
            .try_for_each(|kind| env.require(kind));
        if let Err(error) = required {
            warn!(turn, %error, code = error.error_code(), "skipping natural spawn");
            return Some(SpawnReport::skipped(hostiles));
        }
        let (Some(rng), Some(spawner)) = (env.rng.as_deref_mut(), env.spawner.as_deref_mut())
        else {
            return Some(SpawnReport::skipped(hostiles));
        };

        let mut report = SpawnReport {
            attempted: true,
            hostiles_before: hostiles,
            requested: sample_spawn_count(&population.spawn_count_table, &mut *rng),
            ..SpawnReport::default()
        };

        let candidates = self.candidate_rooms(&*env.world);
        let policy = SpeedTierPolicy::new(&self.config.speed);

        for unit in 0..report.requested {
            let Some(position) = self.pick_tile(&*env.world, &candidates, &mut *rng) else {
                debug!(turn, unit, "no free spawn tile; unit abandoned");
                report.exhausted_units += 1;
                continue;
            };

            let Some(spec) = spawner.create_hostile(&mut *env.world, position) else {
                debug!(turn, unit, %position, "spawn factory declined");
                report.declined_units += 1;
                continue;
            };

            if self.manager.track(spec.entity, policy.initial_state(&spec)) {
                self.manager.sort_turn_order();
                report.spawned.push(spec.entity.id);
            } else {
                warn!(entity = %spec.entity.id, "spawned entity was already tracked");
            }
        }

        info!(
            turn,
            requested = report.requested,
            spawned = report.spawned.len(),
            exhausted = report.exhausted_units,
            "natural spawn"
        );
        Some(report)
    }

    /// Every room except the one the player stands in.
    fn candidate_rooms<W: World + ?Sized>(&self, world: &W) -> Vec<Room> {
        let player_room = self
            .manager
            .player()
            .and_then(|player| world.position_of(player.id))
            .and_then(|position| world.room_containing(position));

        world
            .rooms()
            .into_iter()
            .filter(|room| player_room.is_none_or(|occupied| occupied.id != room.id))
            .collect()
    }

    fn hostiles_in<W: World + ?Sized>(&self, world: &W, room: &Room) -> usize {
        self.manager
            .turn_order
            .iter()
            .filter(|entity| entity.faction == Faction::Hostile)
            .filter_map(|entity| world.position_of(entity.id))
            .filter(|&position| room.contains(position))
            .count()
    }

    /// Picks a random eligible room, then up to `max_tile_attempts` random
    /// tiles in it. Eligibility is re-evaluated per unit so earlier spawns
    /// count toward room capacity.
    fn pick_tile<W: World + ?Sized>(
        &self,
        world: &W,
        candidates: &[Room],
        rng: &mut dyn RngOracle,
    ) -> Option<Position> {
        let population = self.population();
        let eligible: Vec<&Room> = candidates
            .iter()
            .filter(|room| {
                room.width >= population.min_room_width
                    && room.height >= population.min_room_height
                    && self.hostiles_in(world, room) < population.room_capacity
            })
            .collect();

        if eligible.is_empty() {
            return None;
        }

        let index = rng.below(eligible.len() as u32) as usize;
        let room = eligible.get(index)?;

        (0..population.max_tile_attempts).find_map(|_| {
            let position = Position::new(
                room.x + rng.below(room.width) as i32,
                room.y + rng.below(room.height) as i32,
            );
            let free = world.is_walkable(position)
                && world.cell_kind_at(position) == CellKind::Room
                && !world.is_occupied(position);
            free.then_some(position)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;

    struct Fixed(u32);

    impl RngOracle for Fixed {
        fn next_u32(&mut self) -> u32 {
            self.0
        }

        fn roll_permille(&mut self) -> u32 {
            self.0
        }
    }

    #[test]
    fn spawn_count_follows_band_thresholds() {
        let table = PopulationConfig::DEFAULT_SPAWN_COUNT_TABLE;
        let cases = [
            (0, 2),
            (49, 2),
            (50, 3),
            (249, 3),
            (250, 4),
            (749, 4),
            (750, 5),
            (949, 5),
            (950, 6),
            (999, 6),
        ];
        for (roll, expected) in cases {
            assert_eq!(sample_spawn_count(&table, &mut Fixed(roll)), expected, "roll {roll}");
        }
        assert_eq!(sample_spawn_count(&[], &mut Fixed(10)), 0);
    }

    #[test]
    fn spawn_count_distribution_matches_table() {
        let table = PopulationConfig::DEFAULT_SPAWN_COUNT_TABLE;
        let mut rng = PcgRng::new(0x5eed);
        let mut counts = [0u32; 7];
        let trials = 1000;
        for _ in 0..trials {
            counts[sample_spawn_count(&table, &mut rng) as usize] += 1;
        }

        let expected = [(2, 50), (3, 200), (4, 500), (5, 200), (6, 50)];
        for (count, per_mille) in expected {
            let observed = counts[count];
            assert!(
                observed.abs_diff(per_mille) <= 45,
                "count {count}: observed {observed}/1000, expected about {per_mille}"
            );
        }
        assert_eq!(counts[0] + counts[1], 0);
    }
}
