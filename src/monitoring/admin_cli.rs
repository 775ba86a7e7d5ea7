use crate::simulation_engine::simulation::SimulationHandle;
use log::info;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

fn print_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\nIntersection Monitor Admin CLI")?;
    writeln!(out, "1. Start / Resume Simulation")?;
    writeln!(out, "2. Pause Simulation")?;
    writeln!(out, "3. Clear Log Feed")?;
    writeln!(out, "4. Regenerate Vehicles")?;
    writeln!(out, "5. Export Charts")?;
    writeln!(out, "6. Show Snapshot")?;
    writeln!(out, "7. Exit")?;
    write!(out, "Enter your choice: ")?;
    out.flush()
}

/// Reads menu choices from `input` until `7` or end of input, forwarding each one to
/// the simulation. Exiting also shuts the simulation down.
pub async fn run_cli<R, W>(input: R, out: &mut W, handle: &SimulationHandle) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        print_menu(out)?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let choice = line.trim().parse::<u32>().unwrap_or(0);

        let delivered = match choice {
            1 => {
                let sent = handle.start().await;
                writeln!(out, "Simulation running.")?;
                sent
            }
            2 => {
                let sent = handle.pause().await;
                writeln!(out, "Simulation paused.")?;
                sent
            }
            3 => {
                let sent = handle.clear_logs().await;
                writeln!(out, "Log feed cleared.")?;
                sent
            }
            4 => {
                let sent = handle.regenerate_vehicles().await;
                writeln!(out, "Vehicles regenerated.")?;
                sent
            }
            5 => {
                let sent = handle.export_charts().await;
                writeln!(out, "Chart export requested.")?;
                sent
            }
            6 => match handle.snapshot().await {
                Some(snapshot) => {
                    let pretty = serde_json::to_string_pretty(&snapshot).map_err(io::Error::other)?;
                    writeln!(out, "{}", pretty)?;
                    true
                }
                None => false,
            },
            7 => {
                writeln!(out, "Exiting CLI.")?;
                break;
            }
            _ => {
                writeln!(out, "Invalid choice. Try again.")?;
                true
            }
        };

        if !delivered {
            writeln!(out, "Simulation is no longer running.")?;
            return Ok(());
        }
    }

    info!("Admin CLI closed");
    handle.shutdown().await;
    Ok(())
}
