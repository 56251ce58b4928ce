//! tcc353x: operator tool for the TCC353x control core.
//!
//! Inspects and packs coldboot images, queries the PLL and spur tables,
//! dumps op-config blocks and runs simulated tune sessions.

use clap::Parser;
use log::error;

mod commands;
mod config;
mod context;
mod error;
mod logging;

use commands::firmware::PackInputs;
use commands::simulate::SimulateArgs;
use commands::tables::Placement;
use config::BoardOverrides;
use context::{Cli, Commands};
use error::CliError;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    if let Err(e) = run(cli) {
        error!("{}", e);
        return Err(e.into());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Inspect { image, format } => commands::firmware::inspect(&image, format),
        Commands::Pack {
            code,
            dagu,
            dint,
            rand,
            col_order,
            output,
        } => {
            let inputs = PackInputs {
                code,
                dagu,
                dint,
                rand,
                col_order,
            };
            commands::firmware::pack(&inputs, &output)
        }
        Commands::Pll {
            frequency,
            service,
            osc_khz,
            format,
        } => commands::tables::pll(&service.request(), frequency, osc_khz, format),
        Commands::Opconfig {
            frequency,
            service,
            topology,
            role,
            baseband,
            stream_interface,
            osc_khz,
            format,
        } => {
            let placement = Placement {
                topology,
                role,
                baseband,
                stream_interface,
                osc_khz,
            };
            commands::tables::opconfig(&service.request(), frequency, &placement, format)
        }
        Commands::Tables { name, format } => commands::tables::tables(name.as_deref(), format),
        Commands::Simulate {
            frequency,
            service,
            topology,
            osc_khz,
            pll,
            pll_policy,
            stream_interface,
            firmware,
            retune,
            format,
        } => {
            let mut frequencies = vec![frequency];
            frequencies.extend(retune);
            commands::simulate::simulate(SimulateArgs {
                board: cli.config.as_deref(),
                overrides: BoardOverrides {
                    topology,
                    osc_khz,
                    pll,
                    pll_policy,
                    stream_interface,
                },
                firmware: firmware.as_deref(),
                request: service.request(),
                frequencies,
                format,
            })
        }
    }
}
