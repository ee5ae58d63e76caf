//! Basic demonstration of the Over The Top match core.
//!
//! Run with: cargo run --example basic_demo
//! Set `RUST_LOG=ott_sim=debug` to see every command and wind change.

use ott_sim::{Difficulty, MatchWorld, Side, SimError, SimEvent, TickInput};
use tracing_subscriber::EnvFilter;

const DT: f32 = 1.0 / 60.0;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Over The Top - Match Demo ===\n");

    let mut sim = MatchWorld::start_match_seeded(Difficulty::Weak, 2024)?;
    print_state(&mut sim);

    // Each side walks its power up a notch per turn until something lands.
    let mut shots = 0;
    let mut impacts = 0;
    while sim.winner().is_none() && shots < 40 {
        let power_step = if shots % 2 == 0 { 2.0 } else { 3.0 };
        let aim = if sim.active_side() == Side::Blue && shots < 2 {
            90.0 // swing Blue's cannon round to face Red
        } else {
            0.0
        };
        let output = sim.advance(
            TickInput {
                aim_delta: aim,
                power_delta: power_step,
                fire: true,
            },
            DT,
        );
        report(&output.events);
        impacts += output.events.iter().filter(|e| e.is_impact()).count();
        shots += 1;

        for _ in 0..600 {
            let output = sim.advance(TickInput::idle(), DT);
            report(&output.events);
            impacts += output.events.iter().filter(|e| e.is_impact()).count();
            if output
                .events
                .iter()
                .any(|e| matches!(e, SimEvent::TurnChanged { .. } | SimEvent::MatchOver { .. }))
            {
                break;
            }
        }
    }

    println!(
        "\n--- After {} shots, {} impacts (tick {}, t={:.1}s) ---",
        shots,
        impacts,
        sim.current_tick(),
        sim.current_time()
    );
    print_state(&mut sim);

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty()?);
    Ok(())
}

fn report(events: &[SimEvent]) {
    for event in events {
        match event {
            SimEvent::ShotFired { side, angle, power } => {
                println!("  {side:?} fires: angle={angle:.0} power={power:.0}")
            }
            SimEvent::TerrainImpact { x, y } => println!("    ground hit at ({x:.1}, {y:.1})"),
            SimEvent::TankHit { side, health, .. } => println!("    {side:?} tank hit, {health} left"),
            SimEvent::ProjectileLost { .. } => println!("    shell flew off the field"),
            SimEvent::WindChanged { current, .. } => println!("    wind is now {current:.2}"),
            SimEvent::MatchOver { winner } => println!("\n  *** {winner:?} wins ***"),
            SimEvent::TurnChanged { .. } | SimEvent::CommandRejected { .. } => {}
        }
    }
}

fn print_state(sim: &mut MatchWorld) {
    let snapshot = sim.snapshot();
    println!(
        "  phase={:?} active={:?} turn={} wind={:.2}",
        snapshot.phase, snapshot.active, snapshot.turn_counter, snapshot.wind
    );
    for tank in &snapshot.tanks {
        println!(
            "    {:?}: pos=({:.0}, {:.1}) angle={:.0} power={:.0} hp={}/{}",
            tank.side, tank.x, tank.y, tank.angle, tank.power, tank.health, tank.health_max
        );
    }
}
