mod common;

use common::{FixedCombat, ScriptedAi, StepMovement, TestWorld, spawn};
use turn_core::{
    ActionData, ActionError, ActionKind, ActionOutcome, Decision, Dispatch, DispatchOrigin,
    EntityId, EntityRef, Env, ErrorSeverity, Phase, PhaseCondition, PhaseConfig, Position,
    SchedulerError, SkipReason, Slot, SlotOverride, SpeedOverride, SpeedTier, TurnScheduler,
    TurnSystemConfig,
};

#[test]
fn actions_are_accepted_only_for_the_addressed_entity() {
    let mut world = TestWorld::new();
    let specs = [
        spawn(&mut world, EntityRef::player(0), (0, 0), SpeedTier::Normal),
        spawn(&mut world, EntityRef::hostile(1), (5, 5), SpeedTier::Normal),
    ];
    let mut scheduler = TurnScheduler::with_defaults();
    scheduler.initialize(specs);

    let mut ai = ScriptedAi::new();
    let mut movement = StepMovement;
    let mut env = Env::new(&mut world)
        .with_ai(&mut ai)
        .with_movement(&mut movement);

    let step = scheduler.create_action(
        ActionKind::Move,
        EntityId(0),
        ActionData::Destination(Position::new(1, 0)),
        100,
    );

    // turn-start dispatches nobody.
    assert_eq!(
        scheduler.try_process_action(&mut env, &step),
        Err(ActionError::NotEntityTurn(EntityId(0)))
    );

    let ghost = scheduler.create_action(ActionKind::Wait, EntityId(99), ActionData::None, 0);
    let error = scheduler.try_process_action(&mut env, &ghost).unwrap_err();
    assert_eq!(error, ActionError::UnknownEntity(EntityId(99)));
    assert_eq!(error.severity(), ErrorSeverity::Internal);

    scheduler.run_next_phase(&mut env);
    assert_eq!(scheduler.current_phase(), Some(Phase::PlayerAction(Slot::First)));
    assert!(scheduler.is_entity_turn(EntityId(0)));
    assert!(!scheduler.is_entity_turn(EntityId(1)));

    let hostile_wait = scheduler.create_action(ActionKind::Wait, EntityId(1), ActionData::None, 0);
    assert!(!scheduler.process_action(&mut env, &hostile_wait));

    let bare_attack = scheduler.create_action(ActionKind::Attack, EntityId(0), ActionData::None, 0);
    assert_eq!(
        scheduler.try_process_action(&mut env, &bare_attack),
        Err(ActionError::MissingData {
            kind: ActionKind::Attack
        })
    );

    assert!(scheduler.process_action(&mut env, &step));
    assert!(!scheduler.is_entity_turn(EntityId(0)));
    assert_eq!(
        scheduler.try_process_action(&mut env, &step),
        Err(ActionError::NotEntityTurn(EntityId(0)))
    );

    let report = scheduler.run_next_phase(&mut env).unwrap();
    assert_eq!(
        report.dispatches,
        [
            Dispatch {
                entity: EntityId(0),
                outcome: ActionOutcome::Moved,
                origin: DispatchOrigin::External,
            },
            Dispatch {
                entity: EntityId(0),
                outcome: ActionOutcome::Skipped(SkipReason::AlreadyActed),
                origin: DispatchOrigin::Phase,
            },
        ]
    );
    drop(env);

    assert!(!ai.calls.contains(&EntityId(0)));
    assert_eq!(world.bodies[0].position, Position::new(1, 0));
}

#[test]
fn movement_only_phase_rejects_attacks_and_items() {
    let mut config = TurnSystemConfig::default();
    config.phases[3] =
        PhaseConfig::new(Phase::AllyAction(Slot::First)).with_condition(PhaseCondition::MovementOnly);

    let mut world = TestWorld::new();
    let specs = [
        spawn(&mut world, EntityRef::player(0), (0, 0), SpeedTier::Normal),
        spawn(&mut world, EntityRef::ally(2), (4, 3), SpeedTier::Normal),
        spawn(&mut world, EntityRef::ally(3), (4, 5), SpeedTier::Normal),
        spawn(&mut world, EntityRef::hostile(1), (4, 4), SpeedTier::Normal),
    ];
    let mut scheduler = TurnScheduler::new(config).unwrap();
    scheduler.initialize(specs);

    let mut ai = ScriptedAi::new().plan(3, Decision::Attack(EntityId(1)));
    let mut movement = StepMovement;
    let mut combat = FixedCombat { damage: 1 };
    let mut env = Env::new(&mut world)
        .with_ai(&mut ai)
        .with_movement(&mut movement)
        .with_combat(&mut combat);

    for _ in 0..3 {
        scheduler.run_next_phase(&mut env);
    }
    assert_eq!(scheduler.current_phase(), Some(Phase::AllyAction(Slot::First)));

    for (kind, data) in [
        (ActionKind::Attack, ActionData::Target(EntityId(1))),
        (ActionKind::UseItem, ActionData::Item(7)),
    ] {
        let action = scheduler.create_action(kind, EntityId(2), data, 0);
        let error = scheduler.try_process_action(&mut env, &action).unwrap_err();
        assert_eq!(
            error,
            ActionError::PhaseDisallows {
                phase: Phase::AllyAction(Slot::First),
                kind,
            }
        );
        assert_eq!(error.severity(), ErrorSeverity::Validation);
    }

    let step = scheduler.create_action(
        ActionKind::Move,
        EntityId(2),
        ActionData::Destination(Position::new(3, 3)),
        100,
    );
    assert_eq!(
        scheduler.try_process_action(&mut env, &step),
        Ok(ActionOutcome::Moved)
    );

    // The planner's attack is filtered the same way during the phase itself.
    let report = scheduler.run_next_phase(&mut env).unwrap();
    assert_eq!(
        report.outcomes_for(EntityId(3)),
        [ActionOutcome::Skipped(SkipReason::KindNotPermitted)]
    );
}

#[test]
fn slot_override_can_forbid_an_action_kind() {
    let forbid_attack = SpeedOverride {
        slot1: SlotOverride {
            can_attack: Some(false),
            ..SlotOverride::default()
        },
        ..SpeedOverride::default()
    };

    let mut world = TestWorld::new();
    let specs = [
        spawn(&mut world, EntityRef::player(0), (0, 0), SpeedTier::Normal)
            .with_override(forbid_attack),
        spawn(&mut world, EntityRef::hostile(1), (1, 0), SpeedTier::Normal),
    ];
    let mut scheduler = TurnScheduler::with_defaults();
    scheduler.initialize(specs);

    let mut combat = FixedCombat { damage: 1 };
    let mut env = Env::new(&mut world).with_combat(&mut combat);
    scheduler.run_next_phase(&mut env);

    let attack = scheduler.create_action(
        ActionKind::Attack,
        EntityId(0),
        ActionData::Target(EntityId(1)),
        100,
    );
    let error = scheduler.try_process_action(&mut env, &attack).unwrap_err();
    assert_eq!(
        error,
        ActionError::SlotUnavailable {
            entity: EntityId(0),
            slot: Slot::First,
        }
    );
    assert!(error.severity().is_recoverable());
    assert_eq!(error.error_code(), "ACTION_SLOT_UNAVAILABLE");

    let wait = scheduler.create_action(ActionKind::Wait, EntityId(0), ActionData::None, 0);
    assert!(scheduler.process_action(&mut env, &wait));
    drop(env);

    assert_eq!(world.bodies[1].health, TestWorld::DEFAULT_HEALTH);
}
