//! Headless movement scenarios.
//!
//! These tests drive `ActorState::step` directly against `StaticGeometry`
//! boxes, with no Bevy app involved. Each test prints PROOF lines with the
//! numbers it checks.

use bevy::prelude::*;
use platformer_controller::movement::{GROUND_ADHESION_SPEED, VERTICAL_SPEED_LIMIT};
use platformer_controller::prelude::*;

const DT: f32 = 1.0 / 60.0;

/// Collider of every test actor: 1 wide, 2 tall.
const ACTOR_SIZE: Vec2 = Vec2::new(1.0, 2.0);

/// Centre height of an actor standing on the floor.
const STANDING_Y: f32 = 1.0;

fn floor() -> StaticGeometry {
    StaticGeometry::new().with_box(Vec2::new(-500.0, -1.0), Vec2::new(500.0, 0.0), 1)
}

struct Sim {
    config: MovementConfig,
    state: ActorState,
    body: ActorBody,
    intent: MovementIntent,
    world: StaticGeometry,
}

impl Sim {
    fn new(tunables: MovementTunables, world: StaticGeometry, position: Vec2) -> Self {
        Self {
            config: MovementConfig::validate_and_derive(tunables, DT).unwrap(),
            state: ActorState::default(),
            body: ActorBody::new(position, ACTOR_SIZE),
            intent: MovementIntent::default(),
            world,
        }
    }

    /// Standing on the default floor, already settled.
    fn on_floor(tunables: MovementTunables) -> Self {
        let mut sim = Self::new(tunables, floor(), Vec2::new(0.0, STANDING_Y));
        sim.settle();
        sim
    }

    fn step(&mut self) -> StepReport {
        self.state
            .step(&self.config, &mut self.intent, &mut self.body, &self.world)
    }

    fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Contacts start empty, so give the probe a few steps to find the floor.
    fn settle(&mut self) {
        self.run(3);
        assert!(self.state.is_grounded(), "actor should rest on the floor");
    }

    /// Step until `done` holds for the report, at most `limit` steps.
    fn step_until(&mut self, limit: usize, mut done: impl FnMut(&StepReport, &Self) -> bool) -> Option<StepReport> {
        for _ in 0..limit {
            let report = self.step();
            if done(&report, self) {
                return Some(report);
            }
        }
        None
    }

    /// Highest centre height reached before landing.
    fn peak_until_landed(&mut self, limit: usize) -> f32 {
        let mut peak = self.body.position.y;
        for _ in 0..limit {
            let report = self.step();
            peak = peak.max(self.body.position.y);
            if report.landed {
                break;
            }
        }
        peak
    }
}

// ==================== Configuration ====================

#[test]
fn derive_kinematics_is_idempotent() {
    for tunables in [
        MovementTunables::default(),
        MovementTunables::simple(),
        MovementTunables::default().with_jump(3.0, 0.2),
    ] {
        let first = derive_kinematics(&tunables, DT).unwrap();
        let second = derive_kinematics(&tunables, DT).unwrap();

        assert_eq!(first.gravity.to_bits(), second.gravity.to_bits());
        assert_eq!(
            first.initial_jump_velocity.to_bits(),
            second.initial_jump_velocity.to_bits()
        );
        assert_eq!(
            first.initial_wall_jump_velocity.to_bits(),
            second.initial_wall_jump_velocity.to_bits()
        );
        assert_eq!(
            first.dash_target_apex_height.to_bits(),
            second.dash_target_apex_height.to_bits()
        );
        assert_eq!(first, second);
    }
}

// ==================== Ground ====================

#[test]
fn grounded_actor_decelerates_and_stays_pinned() {
    let mut sim = Sim::on_floor(MovementTunables::default());
    sim.state.velocity.x = 10.0;

    for _ in 0..120 {
        let report = sim.step();
        assert!(report.contacts.is_grounded());
        assert_eq!(sim.state.velocity.y, GROUND_ADHESION_SPEED);
    }

    println!(
        "PROOF: vx={:.6}, vy={}, y={:.6}",
        sim.state.velocity.x, sim.state.velocity.y, sim.body.position.y
    );
    assert!(sim.state.velocity.x.abs() < 1e-3);
    assert!((sim.body.position.y - STANDING_Y).abs() < 1e-4);
    assert_eq!(sim.state.mode(), MovementMode::Grounded);
}

#[test]
fn walking_turns_the_actor() {
    let mut sim = Sim::on_floor(MovementTunables::default());
    assert_eq!(sim.state.facing, Facing::Right);

    sim.intent.set_move_axis(Vec2::NEG_X);
    let report = sim.step();
    assert_eq!(report.turned, Some(Facing::Left));
    assert_eq!(sim.state.facing, Facing::Left);

    // No repeated turn while the input keeps pointing the same way.
    let report = sim.step();
    assert_eq!(report.turned, None);

    sim.run(60);
    assert!(sim.state.velocity.x < -10.0);
    assert!(sim.body.position.x < -5.0);
}

#[test]
fn input_below_threshold_does_not_move() {
    let mut sim = Sim::on_floor(MovementTunables::default());
    sim.intent.set_move_axis(Vec2::new(0.2, 0.0));
    sim.run(30);
    assert_eq!(sim.state.velocity.x, 0.0);
    assert_eq!(sim.body.position.x, 0.0);
}

// ==================== Jump ====================

#[test]
fn held_jump_peaks_at_derived_height_and_lands_back() {
    let mut sim = Sim::on_floor(MovementTunables::default());
    let start_y = sim.body.position.y;

    sim.intent.set_jump_held(true);
    let report = sim.step();
    assert!(report.jumped);
    assert_eq!(report.mode, MovementMode::Jumping);

    let peak = sim.peak_until_landed(400) - start_y;
    let k = *sim.config.kinematics();
    let expected = k.initial_jump_velocity.powi(2) / (2.0 * k.gravity.abs());
    let tolerance = k.initial_jump_velocity * DT;

    println!("PROOF: peak={peak:.4}, expected={expected:.4}, tolerance={tolerance:.4}");
    assert!((peak - expected).abs() < tolerance);

    sim.run(2);
    println!("PROOF: landed at y={:.6}", sim.body.position.y);
    assert!(sim.state.is_grounded());
    assert!((sim.body.position.y - start_y).abs() < 1e-3);
    assert_eq!(sim.state.jump.air_jumps_used, 0);
}

#[test]
fn early_release_cuts_the_jump() {
    let held_peak = {
        let mut sim = Sim::on_floor(MovementTunables::default());
        sim.intent.set_jump_held(true);
        sim.peak_until_landed(400)
    };

    let mut sim = Sim::on_floor(MovementTunables::default());
    sim.intent.set_jump_held(true);
    assert!(sim.step().jumped);

    sim.intent.set_jump_held(false);
    assert!(sim.intent.jump_released());
    sim.step();
    println!("PROOF: vy right after release={:.4}", sim.state.velocity.y);
    assert!(sim.state.velocity.y >= 0.0);
    assert!(sim.state.jump.fast_fall.active);

    let cut_peak = sim.peak_until_landed(400);
    println!("PROOF: held peak={held_peak:.4}, cut peak={cut_peak:.4}");
    assert!(cut_peak < held_peak);
}

#[test]
fn tap_between_steps_is_a_short_hop() {
    let held_peak = {
        let mut sim = Sim::on_floor(MovementTunables::default());
        sim.intent.set_jump_held(true);
        sim.peak_until_landed(400)
    };

    let mut sim = Sim::on_floor(MovementTunables::default());
    sim.intent.press_jump();
    sim.intent.release_jump();

    let report = sim.step();
    assert!(report.jumped);
    assert!(sim.state.jump.fast_fall.active);

    let hop_peak = sim.peak_until_landed(400);
    println!("PROOF: held peak={held_peak:.4}, hop peak={hop_peak:.4}");
    assert!(hop_peak < held_peak);
    assert!(hop_peak > STANDING_Y);
}

#[test]
fn air_jump_budget_is_enforced() {
    let tunables = MovementTunables::default().with_air_jumps(1);
    let mut sim = Sim::new(tunables, floor(), Vec2::new(0.0, 60.0));
    sim.run(5);
    assert_eq!(sim.state.mode(), MovementMode::Falling);

    sim.intent.press_jump();
    let report = sim.step();
    assert!(report.air_jumped, "first air jump should be granted");
    assert!(!report.jumped);
    assert_eq!(sim.state.jump.air_jumps_used, 1);
    assert!(sim.state.velocity.y > 0.0);
    assert!(sim.state.velocity.y <= sim.config.kinematics().initial_jump_velocity);

    sim.run(10);
    sim.intent.press_jump();
    let before = sim.state.velocity.y;
    for _ in 0..10 {
        let report = sim.step();
        assert!(!report.air_jumped && !report.jumped, "budget is spent");
    }
    println!("PROOF: vy before={before:.4}, after={:.4}", sim.state.velocity.y);
    assert!(sim.state.velocity.y < before);
    assert_eq!(sim.state.jump.air_jumps_used, 1);
}

/// Walk right off a ledge ending at x = 0 and return once airborne.
fn walk_off_ledge(tunables: MovementTunables) -> Sim {
    let ledge = StaticGeometry::new().with_box(Vec2::new(-50.0, -1.0), Vec2::new(0.0, 0.0), 1);
    let mut sim = Sim::new(tunables, ledge, Vec2::new(-2.0, STANDING_Y));
    sim.settle();

    sim.intent.set_move_axis(Vec2::X);
    sim.step_until(300, |report, _| !report.contacts.is_grounded())
        .expect("actor should walk off the ledge");
    sim.intent.set_move_axis(Vec2::ZERO);
    sim
}

#[test]
fn coyote_jump_is_a_ground_jump() {
    let mut sim = walk_off_ledge(MovementTunables::default());
    sim.step();
    assert!(!sim.state.is_grounded());

    sim.intent.press_jump();
    let report = sim.step();
    println!("PROOF: coyote remaining={:.4}", sim.state.timers.coyote.remaining());
    assert!(report.jumped, "jump inside coyote time is a ground jump");
    assert!(!report.air_jumped);
    assert_eq!(sim.state.jump.air_jumps_used, 0);
}

#[test]
fn late_jump_after_ledge_uses_the_air_jump() {
    let mut sim = walk_off_ledge(MovementTunables::default());
    sim.run(12);
    assert!(!sim.state.timers.coyote.is_active());

    sim.intent.press_jump();
    let report = sim.step();
    assert!(report.air_jumped);
    assert!(!report.jumped);
    assert_eq!(sim.state.jump.air_jumps_used, 1);
}

#[test]
fn buffered_jump_fires_on_landing() {
    // Without air jumps the early press can only be buffered.
    let tunables = MovementTunables::default().with_air_jumps(0);
    let mut sim = Sim::new(tunables, floor(), Vec2::new(0.0, STANDING_Y + 2.0));

    sim.step_until(100, |_, sim| sim.body.min().y < 0.6)
        .expect("actor should fall towards the floor");
    assert!(!sim.state.is_grounded());

    sim.intent.press_jump();
    let report = sim.step();
    assert!(!report.jumped);
    assert!(sim.state.timers.jump_buffer.is_active());

    let mut jumped = false;
    for _ in 0..10 {
        let grounded_before = sim.state.is_grounded();
        let report = sim.step();
        if grounded_before {
            assert!(report.jumped, "buffered jump should fire on the first grounded step");
            jumped = true;
            break;
        }
    }
    assert!(jumped);
    assert_eq!(sim.state.jump.air_jumps_used, 0);
}

#[test]
fn press_on_the_landing_step_spends_the_air_jump() {
    let mut sim = Sim::on_floor(MovementTunables::default());
    sim.intent.set_jump_held(true);
    assert!(sim.step().jumped);

    sim.step_until(200, |_, sim| sim.state.velocity.y < 0.0)
        .expect("jump should peak");
    sim.intent.set_jump_held(false);
    sim.step_until(200, |report, _| report.contacts.is_grounded())
        .expect("jump should come back down");

    // The land check has not run yet, so the jump is still live.
    assert!(sim.state.jump.jumping);

    sim.intent.press_jump();
    let report = sim.step();

    println!(
        "PROOF: air_jumped={}, jumped={}, used={}, vy={:.4}",
        report.air_jumped, report.jumped, sim.state.jump.air_jumps_used, sim.state.velocity.y
    );
    assert!(report.air_jumped);
    assert!(!report.jumped);
    assert!(!report.landed);
    assert_eq!(sim.state.jump.air_jumps_used, 1);
    assert!(sim.state.velocity.y > 0.0);
}

// ==================== Wall ====================

fn wall_world() -> StaticGeometry {
    floor().with_box(Vec2::new(2.0, 0.0), Vec2::new(3.0, 50.0), 1)
}

#[test]
fn wall_slide_then_wall_jump() {
    let mut sim = Sim::new(MovementTunables::default(), wall_world(), Vec2::new(1.0, STANDING_Y));
    sim.settle();

    sim.intent.set_move_axis(Vec2::X);
    sim.intent.set_jump_held(true);
    sim.step_until(200, |report, _| report.mode == MovementMode::WallSliding)
        .expect("actor should start sliding down the wall");

    sim.run(20);
    println!("PROOF: slide vy={:.4}", sim.state.velocity.y);
    assert_eq!(sim.state.mode(), MovementMode::WallSliding);
    assert!((sim.state.velocity.y + 5.0).abs() < 0.1);
    assert!((sim.body.max().x - 2.0).abs() < 1e-3);

    sim.intent.set_move_axis(Vec2::ZERO);
    sim.intent.set_jump_held(false);
    sim.step();
    sim.intent.set_jump_held(true);
    let report = sim.step();

    println!("PROOF: wall jump velocity={:?}", sim.state.velocity);
    assert!(report.wall_jumped);
    assert_eq!(report.mode, MovementMode::WallJumping);
    assert!(sim.state.velocity.x < 0.0, "wall jump pushes away from the wall");
    assert!(sim.state.velocity.y > 0.0);
    assert_eq!(sim.state.wall_jump.last_wall_direction, 1);

    sim.run(10);
    assert!(sim.body.max().x < 1.5);
}

/// Drop next to the right wall of [`wall_world`] while pushing into it and
/// return on the first wall sliding step.
fn sliding_on_right_wall(tunables: MovementTunables) -> Sim {
    sliding_on_right_wall_in(tunables, wall_world())
}

fn sliding_on_right_wall_in(tunables: MovementTunables, world: StaticGeometry) -> Sim {
    let mut sim = Sim::new(tunables, world, Vec2::new(1.5, 20.0));
    sim.intent.set_move_axis(Vec2::X);
    sim.step_until(20, |report, _| report.mode == MovementMode::WallSliding)
        .expect("actor should start sliding down the wall");
    sim
}

#[test]
fn jump_press_while_wall_sliding_is_a_wall_jump() {
    let mut sim = sliding_on_right_wall(MovementTunables::default());
    sim.run(5);
    assert_eq!(sim.state.mode(), MovementMode::WallSliding);

    sim.intent.press_jump();
    let report = sim.step();

    println!("PROOF: report={report:?}");
    assert!(report.wall_jumped);
    assert!(!report.jumped && !report.air_jumped, "the ground and air jump paths refuse the press");
    assert!(!sim.state.timers.jump_buffer.is_active(), "the press is not buffered");
    assert_eq!(sim.state.jump.air_jumps_used, 0);
    assert!(!sim.state.jump.jumping);
    assert_eq!(report.mode, MovementMode::WallJumping);
}

/// Slide on the right wall, then steer left hard enough to leave it in one
/// step. Returns on the step the slide turns into slide-falling.
fn leave_the_wall_sideways() -> Sim {
    let mut tunables = MovementTunables::default();
    tunables.air_acceleration = 60.0;
    let mut sim = sliding_on_right_wall(tunables);

    sim.intent.set_move_axis(Vec2::NEG_X);
    let report = sim.step();
    assert!(!report.contacts.right && !report.contacts.left, "one step clears the wall");
    assert_eq!(report.mode, MovementMode::WallSliding, "the slide ends on the next check");

    let report = sim.step();
    assert_eq!(report.previous_mode, MovementMode::WallSliding);
    assert_eq!(report.mode, MovementMode::Falling);
    assert!(sim.state.wall_slide.slide_falling);
    assert!(!sim.state.wall_slide.sliding);
    assert_eq!(sim.state.wall_jump.last_wall_direction, 1);
    sim
}

#[test]
fn wall_jump_is_granted_shortly_after_leaving_the_wall() {
    let mut sim = leave_the_wall_sideways();
    sim.step();
    assert!(sim.body.max().x < 1.6);
    assert!(!sim.state.contacts.right && !sim.state.contacts.left);
    assert!(sim.state.timers.wall_jump_post_buffer.is_active());

    sim.intent.press_jump();
    let report = sim.step();

    println!(
        "PROOF: post buffer={:.4}, velocity={:?}",
        sim.state.timers.wall_jump_post_buffer.remaining(),
        sim.state.velocity
    );
    assert!(report.wall_jumped);
    assert!(!report.air_jumped);
    assert_eq!(report.mode, MovementMode::WallJumping);
    assert!(sim.state.velocity.x < -15.0, "launch points away from the remembered wall");
    assert!(sim.state.velocity.y > 0.0);
    assert_eq!(sim.state.jump.air_jumps_used, 0);
}

#[test]
fn slide_falling_press_after_the_post_buffer_is_an_air_jump() {
    let mut sim = leave_the_wall_sideways();
    sim.run(10);
    assert!(sim.state.wall_slide.slide_falling);
    assert!(!sim.state.is_grounded());
    let height = sim.body.position.y;

    sim.intent.press_jump();
    let report = sim.step();

    println!(
        "PROOF: post buffer={:.4}, used={}, vy={:.4}, y={height:.4}",
        sim.state.timers.wall_jump_post_buffer.remaining(),
        sim.state.jump.air_jumps_used,
        sim.state.velocity.y
    );
    assert!(!sim.state.timers.wall_jump_post_buffer.is_active());
    assert!(report.air_jumped);
    assert!(!report.wall_jumped && !report.jumped);
    assert_eq!(sim.state.jump.air_jumps_used, 1);
    assert!(!sim.state.wall_slide.slide_falling);
    assert!(sim.state.velocity.y > 0.0);
    assert!(height > 10.0);
}

#[test]
fn wall_jump_move_stats_expire_at_apex_time() {
    let mut sim = sliding_on_right_wall(MovementTunables::default());
    sim.intent.set_move_axis(Vec2::ZERO);
    sim.intent.press_jump();
    assert!(sim.step().wall_jumped);
    assert!(sim.state.wall_jump.use_move_stats);

    let apex_time = sim.config.tunables().time_until_jump_apex;
    let report = sim
        .step_until(60, |_, sim| !sim.state.wall_jump.use_move_stats)
        .expect("override should be released");

    println!("PROOF: released at wall jump time {:.4}", sim.state.wall_jump.time);
    assert!(!report.contacts.bumped_head());
    assert!(sim.state.wall_jump.wall_jumping);
    assert!(sim.state.wall_jump.time >= apex_time);
    assert!(sim.state.wall_jump.time < apex_time + 2.0 * DT);
}

#[test]
fn ceiling_releases_wall_jump_move_stats_early() {
    let world = wall_world().with_box(Vec2::new(-10.0, 22.5), Vec2::new(3.0, 23.5), 1);
    let mut sim = sliding_on_right_wall_in(MovementTunables::default(), world);
    sim.intent.set_move_axis(Vec2::ZERO);
    sim.intent.press_jump();
    assert!(sim.step().wall_jumped);

    sim.step_until(20, |report, _| report.contacts.bumped_head())
        .expect("wall jump should reach the ceiling");
    assert!(sim.state.wall_jump.use_move_stats);

    sim.step();

    println!(
        "PROOF: wall jump time={:.4}, vy={:.4}",
        sim.state.wall_jump.time, sim.state.velocity.y
    );
    assert!(!sim.state.wall_jump.use_move_stats);
    assert!(sim.state.wall_jump.time < sim.config.tunables().time_until_jump_apex);
    assert!(sim.state.wall_jump.fast_fall.active);
    assert!(sim.state.velocity.y <= 0.0);
}

/// Spend one air jump and one air dash, then dash into the wall and slide.
fn slide_after_spending_budgets(tunables: MovementTunables) -> Sim {
    let mut sim = Sim::new(tunables, wall_world(), Vec2::new(0.0, 30.0));
    sim.run(2);

    sim.intent.press_jump();
    assert!(sim.step().air_jumped);
    assert_eq!(sim.state.jump.air_jumps_used, 1);

    sim.intent.set_move_axis(Vec2::X);
    sim.intent.press_dash();
    assert!(sim.step().dashed);
    assert_eq!(sim.state.dash.dashes_used, 1);

    sim.step_until(60, |report, _| report.mode == MovementMode::WallSliding)
        .expect("actor should slide after dashing into the wall");
    sim
}

#[test]
fn wall_slide_refills_jumps_and_dashes() {
    let sim = slide_after_spending_budgets(MovementTunables::default());
    println!(
        "PROOF: air_jumps_used={}, dashes_used={}",
        sim.state.jump.air_jumps_used, sim.state.dash.dashes_used
    );
    assert_eq!(sim.state.jump.air_jumps_used, 0);
    assert_eq!(sim.state.dash.dashes_used, 0);
}

#[test]
fn wall_slide_refills_can_be_turned_off() {
    let mut tunables = MovementTunables::default();
    tunables.reset_jumps_on_wall_slide = false;
    tunables.reset_dash_on_wall_slide = false;

    let sim = slide_after_spending_budgets(tunables);
    println!(
        "PROOF: air_jumps_used={}, dashes_used={}",
        sim.state.jump.air_jumps_used, sim.state.dash.dashes_used
    );
    assert_eq!(sim.state.jump.air_jumps_used, 1);
    assert_eq!(sim.state.dash.dashes_used, 1);
}

// ==================== Dash ====================

#[test]
fn biased_air_dash_goes_diagonal() {
    let mut sim = Sim::new(MovementTunables::default(), floor(), Vec2::new(0.0, 40.0));
    sim.run(2);

    sim.intent.set_move_axis(Vec2::new(1.0, 1.0));
    sim.intent.press_dash();
    let report = sim.step();

    let up_right = Vec2::new(1.0, 1.0).normalize();
    println!("PROOF: direction={:?}, velocity={:?}", sim.state.dash.direction, sim.state.velocity);
    assert!(report.dashed);
    assert_eq!(report.mode, MovementMode::Dashing);
    assert!((sim.state.dash.direction - up_right).length() < 1e-6);
    assert!((sim.state.velocity - up_right * 40.0).length() < 1e-3);
    assert_eq!(sim.state.dash.dashes_used, 1);
}

#[test]
fn ground_dash_into_the_floor_is_flattened() {
    let mut sim = Sim::on_floor(MovementTunables::default());

    sim.intent.set_move_axis(Vec2::new(1.0, -1.0));
    sim.intent.press_dash();
    let report = sim.step();

    println!("PROOF: direction={:?}, velocity={:?}", sim.state.dash.direction, sim.state.velocity);
    assert!(report.dashed);
    assert_eq!(sim.state.dash.direction, Vec2::X);
    assert_eq!(sim.state.velocity.x, 40.0);
    assert!(sim.state.velocity.y <= 0.0);
    assert!(report.contacts.is_grounded());
}

#[test]
fn ground_dash_upwards_keeps_both_components() {
    let mut sim = Sim::on_floor(MovementTunables::default());

    sim.intent.set_move_axis(Vec2::new(1.0, 1.0));
    sim.intent.press_dash();
    assert!(sim.step().dashed);

    let direction = sim.state.dash.direction;
    assert!(direction.x > 0.0 && direction.y > 0.0);
    assert!(sim.state.velocity.y > 20.0);
}

#[test]
fn neutral_dash_follows_facing_and_ends() {
    let mut sim = Sim::on_floor(MovementTunables::default());
    sim.intent.set_move_axis(Vec2::NEG_X);
    sim.step();
    sim.intent.set_move_axis(Vec2::ZERO);

    sim.intent.press_dash();
    assert!(sim.step().dashed);
    assert_eq!(sim.state.dash.direction, Vec2::NEG_X);

    let report = sim
        .step_until(20, |report, _| report.mode != MovementMode::Dashing)
        .expect("dash should end");
    assert_eq!(report.previous_mode, MovementMode::Dashing);
    assert!(!sim.state.dash.dashing);
    assert_eq!(sim.state.dash.dashes_used, 0, "ending on the ground refills dashes");
}

#[test]
fn air_dashes_are_limited() {
    let tunables = MovementTunables::default().with_dashes(1);
    let mut sim = Sim::new(tunables, floor(), Vec2::new(0.0, 80.0));
    sim.run(2);

    sim.intent.set_move_axis(Vec2::X);
    sim.intent.press_dash();
    assert!(sim.step().dashed);
    sim.step_until(20, |_, sim| !sim.state.dash.dashing)
        .expect("dash should end");
    assert!(sim.state.dash.fast_fall.active);

    sim.intent.press_dash();
    for _ in 0..10 {
        assert!(!sim.step().dashed);
    }
}

#[test]
fn dashing_down_outruns_the_fall_limit() {
    let mut sim = Sim::new(MovementTunables::default(), floor(), Vec2::new(0.0, 60.0));
    sim.run(2);
    let max_fall_speed = sim.config.tunables().max_fall_speed;

    sim.intent.set_move_axis(Vec2::NEG_Y);
    sim.intent.press_dash();
    assert!(sim.step().dashed);

    println!("PROOF: dashing vy={:.4}", sim.state.velocity.y);
    assert_eq!(sim.state.velocity.y, -40.0);
    assert!(sim.state.velocity.y < -max_fall_speed);
    assert!(sim.state.velocity.y >= -VERTICAL_SPEED_LIMIT);

    sim.step_until(20, |_, sim| !sim.state.dash.dashing)
        .expect("dash should end");
    println!("PROOF: vy after the dash={:.4}", sim.state.velocity.y);
    assert_eq!(sim.state.velocity.y, -max_fall_speed);
}

// ==================== Head bump ====================

#[test]
fn head_bump_slide_keeps_the_jump() {
    // Ceiling edge just inside the actor's left side.
    let world = floor().with_box(Vec2::new(-5.0, 4.0), Vec2::new(-0.45, 5.0), 1);
    let mut sim = Sim::new(MovementTunables::default(), world, Vec2::new(0.0, STANDING_Y));
    sim.settle();

    sim.intent.set_jump_held(true);
    sim.step_until(60, |report, _| report.mode == MovementMode::HeadBumpSliding)
        .expect("clipping the ceiling edge should start a slide");
    assert_eq!(sim.state.head_bump.direction, 1);

    let report = sim
        .step_until(30, |report, _| report.mode != MovementMode::HeadBumpSliding)
        .expect("slide should end once the ceiling is cleared");

    println!("PROOF: exit velocity={:?}, x={:.4}", sim.state.velocity, sim.body.position.x);
    assert_eq!(report.previous_mode, MovementMode::HeadBumpSliding);
    assert_eq!(sim.state.velocity.x, 0.0);
    assert!(sim.state.velocity.y >= 0.0);
    assert!(sim.body.position.x > 0.0);

    // The reseeded jump carries the actor above the ceiling's underside.
    let peak = sim.peak_until_landed(400);
    assert!(peak + ACTOR_SIZE.y * 0.5 > 4.0);
}

#[test]
fn flat_ceiling_stops_the_jump() {
    let world = floor().with_box(Vec2::new(-5.0, 4.0), Vec2::new(5.0, 5.0), 1);
    let mut sim = Sim::new(MovementTunables::default(), world, Vec2::new(0.0, STANDING_Y));
    sim.settle();

    sim.intent.set_jump_held(true);
    sim.step_until(60, |report, _| report.contacts.bumped_head())
        .expect("jump should reach the ceiling");

    sim.step();
    assert!(!sim.state.head_bump.sliding);
    assert!(sim.state.jump.fast_fall.active);
    assert!(sim.state.velocity.y <= 0.0);
    assert!(sim.body.max().y <= 4.0 + 1e-4);
}

#[test]
fn head_bump_slide_holds_while_the_corner_is_overhead() {
    // The left ray stays under this edge for two slide steps.
    let world = floor().with_box(Vec2::new(-5.0, 4.0), Vec2::new(-0.2, 5.0), 1);
    let mut sim = Sim::new(MovementTunables::default(), world, Vec2::new(0.0, STANDING_Y));
    sim.settle();

    sim.intent.set_jump_held(true);
    sim.step_until(60, |report, _| report.mode == MovementMode::HeadBumpSliding)
        .expect("clipping the ceiling edge should start a slide");
    // Left edge one slide step in: the corner ray is still under the ceiling.
    assert!(sim.body.min().x < -0.25);

    let report = sim.step();
    println!("PROOF: second slide step contacts={:?}, x={:.4}", report.contacts, sim.body.position.x);
    assert_eq!(report.previous_mode, MovementMode::HeadBumpSliding);
    assert_eq!(report.mode, MovementMode::HeadBumpSliding);

    let report = sim.step();
    println!("PROOF: exit velocity={:?}", sim.state.velocity);
    assert_eq!(report.previous_mode, MovementMode::HeadBumpSliding);
    assert_eq!(report.mode, MovementMode::Jumping);
    assert_eq!(sim.state.velocity.x, 0.0);
    assert!(sim.state.velocity.y >= 0.0);
}

#[test]
fn dash_head_bump_reseeds_towards_the_dash_apex() {
    let world = floor().with_box(Vec2::new(-5.0, 4.0), Vec2::new(-0.45, 5.0), 1);
    let mut sim = Sim::new(MovementTunables::default(), world, Vec2::new(0.0, STANDING_Y));
    sim.settle();

    sim.intent.set_move_axis(Vec2::Y);
    sim.intent.press_dash();
    assert!(sim.step().dashed);

    sim.step_until(10, |report, _| report.mode == MovementMode::HeadBumpSliding)
        .expect("upward dash should clip the ceiling edge");
    assert!(sim.state.head_bump.from_dash);

    let y = sim.body.position.y;
    let report = sim.step();
    assert_eq!(report.previous_mode, MovementMode::HeadBumpSliding);

    let k = *sim.config.kinematics();
    let dash_target = sim.state.dash.start_y + k.dash_target_apex_height;
    let expected = (2.0 * k.gravity.abs() * (dash_target - y)).sqrt();
    let tunables = sim.config.tunables();
    let jump_target = sim.state.dash.start_y
        + tunables.jump_height * (2.0 - tunables.jump_height_compensation_factor);
    let jump_speed = (2.0 * k.gravity.abs() * (jump_target - y)).sqrt();

    println!(
        "PROOF: exit vy={:.4}, dash target speed={expected:.4}, jump target speed={jump_speed:.4}",
        sim.state.velocity.y
    );
    assert!(!sim.state.head_bump.from_dash);
    assert_eq!(sim.state.velocity.x, 0.0);
    assert!((sim.state.velocity.y - expected).abs() < 1e-3);
    assert!((sim.state.velocity.y - jump_speed).abs() > 0.1);
}

// ==================== Determinism ====================

fn scripted_input(step: usize, intent: &mut MovementIntent) {
    match step {
        0 => intent.set_move_axis(Vec2::X),
        5 => intent.set_jump_held(true),
        25 => intent.set_jump_held(false),
        30 => {
            intent.set_move_axis(Vec2::new(1.0, 1.0));
            intent.press_dash();
        }
        40 => intent.set_move_axis(Vec2::NEG_X),
        45 => intent.set_jump_held(true),
        _ => {}
    }
}

#[test]
fn ron_snapshot_resumes_bit_identically() {
    let world = floor().with_box(Vec2::new(-3.0, 3.0), Vec2::new(-2.0, 4.0), 1);
    let mut sim = Sim::new(MovementTunables::default(), world, Vec2::new(0.0, STANDING_Y));
    sim.settle();

    let mut snapshot = None;
    let mut reference = Vec::new();
    for step in 0..90 {
        if step == 35 {
            snapshot = Some(ron::to_string(&(&sim.state, &sim.body, &sim.intent)).unwrap());
        }
        scripted_input(step, &mut sim.intent);
        sim.step();
        if step >= 35 {
            reference.push((sim.body.position, sim.state.velocity));
        }
    }

    let snapshot = snapshot.unwrap();
    let (state, body, intent): (ActorState, ActorBody, MovementIntent) =
        ron::from_str(&snapshot).unwrap();
    sim.state = state;
    sim.body = body;
    sim.intent = intent;

    for (i, step) in (35..90).enumerate() {
        scripted_input(step, &mut sim.intent);
        sim.step();
        let (position, velocity) = reference[i];
        assert_eq!(sim.body.position.x.to_bits(), position.x.to_bits(), "step {step}");
        assert_eq!(sim.body.position.y.to_bits(), position.y.to_bits(), "step {step}");
        assert_eq!(sim.state.velocity.x.to_bits(), velocity.x.to_bits(), "step {step}");
        assert_eq!(sim.state.velocity.y.to_bits(), velocity.y.to_bits(), "step {step}");
    }
}

#[test]
fn tunables_round_trip_through_ron() {
    let tunables = MovementTunables::player().with_air_jumps(2).with_dash_bias(0.1);
    let text = ron::to_string(&tunables).unwrap();
    let config = MovementConfig::from_ron_str(&text, DT).unwrap();
    assert_eq!(config.tunables(), &tunables);
}
