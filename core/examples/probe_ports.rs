//! Example: Probe a port range and report which ports are free.

use portprobe_core::{AsyncPortProber, ErrorKind};

const FROM: u64 = 20000;
const TO: u64 = 20009;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("Probing ports {}..={}...\n", FROM, TO);

    let prober = AsyncPortProber::new();

    match prober.allocate_range(FROM, TO).await {
        Ok(free) => {
            println!("{:<6} {}", "PORT", "STATE");
            println!("{}", "-".repeat(14));

            for port in FROM..=TO {
                let state = if free.contains(&(port as u16)) {
                    "free"
                } else {
                    "busy"
                };
                println!("{:<6} {}", port, state);
            }

            for err in free.release_errors() {
                eprintln!("warning: {}", err);
            }

            println!("\nTotal: {} free", free.len());
        }
        Err(e) => {
            eprintln!("Error probing ports: {}", e);
        }
    }

    match prober.allocate_range_first_fit(FROM, TO).await {
        Ok(alloc) => println!("First free port: {}", alloc.port()),
        Err(e) if e.kind() == ErrorKind::PortBusy => println!("No free port in range"),
        Err(e) => eprintln!("Error probing ports: {}", e),
    }
}
