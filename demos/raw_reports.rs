//! Dump raw and decoded reports from a SpaceMouse without the controller.
//!
//! Usage: cargo run --example raw_reports [profile]

use spacemouse::{protocol, DeviceProfile, HidTransport, Transport};

fn main() {
    env_logger::init();

    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "spacemouse_wireless".to_string());

    let profile = match DeviceProfile::by_name(&name) {
        Ok(p) => p.with_env_overrides(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut transport = match HidTransport::open(profile.vendor_id, profile.product_id) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to open device: {}", e);
            std::process::exit(1);
        }
    };

    let desc = transport.describe();
    println!("{} {} ({:?} layout)", desc.manufacturer, desc.product, profile.layout);

    let mut buf = vec![0u8; profile.report_length];
    loop {
        match transport.read(&mut buf, profile.read_timeout) {
            Ok(Some(n)) => {
                let data = &buf[..n];
                match protocol::decode(data, &profile) {
                    Ok(report) => println!("{:02x?} -> {:?}", data, report),
                    Err(e) => println!("{:02x?} -> {}", data, e),
                }
            }
            Ok(None) => continue,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }
}
