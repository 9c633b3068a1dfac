//! Basic demonstration of crack tracking.
//!
//! Run with: cargo run --example crack_demo

use crack_sim::{
    BondFamily, ColorMode, CrackPrimitive, CrackViewConfig, CrackWorld, DrawStatus, FailureMode,
};

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Crack Tracking Demo ===\n");

    let mut sim = CrackWorld::new();
    let (particles, bonds) = sim.spawn_lattice(6, 4, 0.5, BondFamily::Parallel);
    println!(
        "Lattice: {} particles, {} bonds\n",
        particles.len(),
        bonds.len()
    );

    // Break every third bond, one per cycle, alternating failure modes
    for (i, bond) in bonds.iter().enumerate().filter(|(i, _)| i % 3 == 0) {
        sim.step(0.01);
        let mode = if (i / 3) % 2 == 0 {
            FailureMode::Normal
        } else {
            FailureMode::Shear
        };
        if let Err(e) = sim.break_bond(*bond, mode) {
            println!("  break failed: {}", e);
        }
    }
    print_counters(&sim);

    // Remove a corner particle; its cracks go with it
    println!("\n--- Deleting particle at the origin ---\n");
    sim.delete_particle(particles[0]);
    print_counters(&sim);

    // Draw colored by formation time
    println!("\n--- Rendering by formation time ---\n");
    let config = CrackViewConfig {
        color_mode: ColorMode::ByFormationTime,
        time_buckets: 8,
        ..Default::default()
    };
    sim.select_all();
    let summary = sim.render(&config, &mut |p: &CrackPrimitive| {
        println!(
            "    crack {}: {:<15} class={} radius={:.3} aperture={:.3}",
            p.id.index(),
            p.kind.name(),
            p.color_class,
            p.geometry.radius,
            p.geometry.aperture
        );
        DrawStatus::Continue
    });
    match summary {
        Ok(s) => println!("\n  drawn {} of {} selected", s.drawn, s.selected),
        Err(e) => println!("\n  render failed: {}", e),
    }

    // Re-initialize: everything starts over
    sim.init();
    println!("\n--- After init ---\n");
    print_counters(&sim);

    println!("\n=== Final State (JSON) ===\n");
    match sim.snapshot().to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(e) => println!("snapshot failed: {}", e),
    }
}

fn print_counters(sim: &CrackWorld) {
    let c = sim.counters();
    println!(
        "  formed={} live={} cn={} cs={} pn={} ps={}",
        c.total_formed, c.live, c.contact_normal, c.contact_shear, c.parallel_normal, c.parallel_shear
    );
}
