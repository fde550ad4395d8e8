//! Collaborator interfaces consumed by the scheduler.
//!
//! The world is mandatory; every other collaborator is optional. A missing
//! collaborator never fails a turn: the affected entities are skipped for that
//! phase (or the affected step is skipped) and a warning is logged. The
//! [`Env`] aggregate bundles them so the engine can reach everything it needs
//! without hard coupling to concrete implementations.
mod agents;
mod effects;
mod error;
mod rng;
mod world;

pub use agents::{AiPlanner, AttackOutcome, Combat, Decision, Items, MoveOutcome, Movement};
pub use effects::{EffectProcessor, SpawnFactory, Traps};
pub use error::{CollaboratorError, CollaboratorKind};
pub use rng::{PcgRng, RngOracle};
pub use world::{CellKind, Room, World};

/// Mutable borrows of the world and every collaborator for one scheduler call.
pub struct Env<'a, W: World + ?Sized> {
    pub(crate) world: &'a mut W,
    pub(crate) ai: Option<&'a mut dyn AiPlanner<W>>,
    pub(crate) movement: Option<&'a mut dyn Movement<W>>,
    pub(crate) combat: Option<&'a mut dyn Combat<W>>,
    pub(crate) items: Option<&'a mut dyn Items<W>>,
    pub(crate) traps: Option<&'a mut dyn Traps<W>>,
    pub(crate) status: Option<&'a mut dyn EffectProcessor<W>>,
    pub(crate) slip_damage: Option<&'a mut dyn EffectProcessor<W>>,
    pub(crate) hunger: Option<&'a mut dyn EffectProcessor<W>>,
    pub(crate) spawner: Option<&'a mut dyn SpawnFactory<W>>,
    pub(crate) rng: Option<&'a mut dyn RngOracle>,
}

impl<'a, W: World + ?Sized> Env<'a, W> {
    /// Creates an environment with only the world wired up.
    pub fn new(world: &'a mut W) -> Self {
        Self {
            world,
            ai: None,
            movement: None,
            combat: None,
            items: None,
            traps: None,
            status: None,
            slip_damage: None,
            hunger: None,
            spawner: None,
            rng: None,
        }
    }

    pub fn with_ai(mut self, ai: &'a mut dyn AiPlanner<W>) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn with_movement(mut self, movement: &'a mut dyn Movement<W>) -> Self {
        self.movement = Some(movement);
        self
    }

    pub fn with_combat(mut self, combat: &'a mut dyn Combat<W>) -> Self {
        self.combat = Some(combat);
        self
    }

    pub fn with_items(mut self, items: &'a mut dyn Items<W>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_traps(mut self, traps: &'a mut dyn Traps<W>) -> Self {
        self.traps = Some(traps);
        self
    }

    pub fn with_status(mut self, status: &'a mut dyn EffectProcessor<W>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_slip_damage(mut self, slip_damage: &'a mut dyn EffectProcessor<W>) -> Self {
        self.slip_damage = Some(slip_damage);
        self
    }

    pub fn with_hunger(mut self, hunger: &'a mut dyn EffectProcessor<W>) -> Self {
        self.hunger = Some(hunger);
        self
    }

    pub fn with_spawner(mut self, spawner: &'a mut dyn SpawnFactory<W>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn with_rng(mut self, rng: &'a mut dyn RngOracle) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn world(&self) -> &W {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut *self.world
    }

    /// Whether the given collaborator is wired up.
    pub fn has(&self, kind: CollaboratorKind) -> bool {
        match kind {
            CollaboratorKind::Ai => self.ai.is_some(),
            CollaboratorKind::Movement => self.movement.is_some(),
            CollaboratorKind::Combat => self.combat.is_some(),
            CollaboratorKind::Items => self.items.is_some(),
            CollaboratorKind::Traps => self.traps.is_some(),
            CollaboratorKind::StatusEffects => self.status.is_some(),
            CollaboratorKind::SlipDamage => self.slip_damage.is_some(),
            CollaboratorKind::Hunger => self.hunger.is_some(),
            CollaboratorKind::SpawnFactory => self.spawner.is_some(),
            CollaboratorKind::Rng => self.rng.is_some(),
        }
    }

    /// Returns `Ok(())` if the collaborator is wired up.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Missing`] otherwise.
    pub fn require(&self, kind: CollaboratorKind) -> Result<(), CollaboratorError> {
        if self.has(kind) {
            Ok(())
        } else {
            Err(CollaboratorError::Missing(kind))
        }
    }
}
