//! Poll a SpaceMouse at a fixed step rate, the way a simulation loop would.
//!
//! Usage: cargo run --example teleop [profile]
//! Profile defaults to `spacemouse_wireless`. Press the right button to
//! request a reset; the loop re-arms the controller on the next step.

use std::time::{Duration, Instant};

fn main() {
    env_logger::init();

    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "spacemouse_wireless".to_string());

    let controller = match spacemouse::Controller::open_by_name(&name) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to open {}: {}", name, e);
            std::process::exit(1);
        }
    };

    let desc = controller.description();
    println!("Manufacturer: {}", desc.manufacturer);
    println!("Product:      {}", desc.product);
    println!("{}", spacemouse::controls_help());

    let step = Duration::from_millis(50);
    let start = Instant::now();
    let mut steps: u64 = 0;

    loop {
        let frame = match controller.snapshot() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        };
        steps += 1;

        if frame.reset_requested {
            println!("--- reset requested after {} steps, re-arming ---", steps);
            if let Err(e) = controller.rearm() {
                eprintln!("Failed to re-arm: {}", e);
                break;
            }
            continue;
        }

        // Print every 10th step to avoid flooding the terminal
        if steps % 10 == 1 {
            let r = &frame.rotation;
            println!(
                "dpos=[{:+.3}, {:+.3}, {:+.3}]  drot=[{:+.3}, {:+.3}, {:+.3}]  r0=[{:+.3}, {:+.3}, {:+.3}]  gripper={:?}",
                frame.dpos[0], frame.dpos[1], frame.dpos[2],
                frame.raw_drotation[0], frame.raw_drotation[1], frame.raw_drotation[2],
                r[0][0], r[0][1], r[0][2],
                frame.gripper_command(),
            );
        }

        std::thread::sleep(step);
    }

    let stats = controller.stats();
    println!(
        "\n{} steps in {:.1}s, reports: read={} applied={} ignored={} unrecognized={} malformed={}",
        steps,
        start.elapsed().as_secs_f64(),
        stats.read,
        stats.applied,
        stats.ignored,
        stats.unrecognized,
        stats.malformed
    );
}
