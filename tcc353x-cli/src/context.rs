use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_num::maybe_hex;
use serde::de::DeserializeOwned;
use tcc353x::PllPolicy;
use tcc353x_protocol::{
    BasebandVariant, BoardTopology, DiversityRole, RfIfType, Segment, StreamInterface, TmmSlot,
    TuneRequest,
};

#[derive(Debug, Parser)]
#[command(name = "tcc353x")]
#[command(about = "Inspect TCC353x coldboot images, query PLL tables and run simulated tune sessions.", long_about = None)]
#[command(author, version)]
pub(crate) struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Board description file (TOML).{n}
    /// Falls back to `tcc353x.toml` in the working directory when present.
    #[arg(short = 'f', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Parse a coldboot image and check its code CRC.
    Inspect {
        /// The coldboot image file.
        image: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Build a coldboot image from raw segment files.{n}
    /// The CRC-32/MPEG-2 trailer of the code segment is appended.
    Pack {
        /// Raw DSP code.
        #[arg(long, required = true)]
        code: PathBuf,

        #[arg(long)]
        dagu: Option<PathBuf>,

        #[arg(long)]
        dint: Option<PathBuf>,

        #[arg(long)]
        rand: Option<PathBuf>,

        #[arg(long)]
        col_order: Option<PathBuf>,

        /// Output image path.
        #[arg(short, long, required = true)]
        output: PathBuf,
    },
    /// Show the PLL word and spur settings chosen for a channel.
    Pll {
        /// Channel centre frequency in kHz.
        frequency: i32,

        #[command(flatten)]
        service: ServiceArgs,

        /// Crystal frequency in kHz.
        #[arg(long, default_value_t = 38400)]
        osc_khz: u32,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Dump the baseband op-config block for a tune.
    Opconfig {
        /// Channel centre frequency in kHz.
        frequency: i32,

        #[command(flatten)]
        service: ServiceArgs,

        #[arg(long, value_parser = parse_kebab::<BoardTopology>, default_value = "single")]
        topology: BoardTopology,

        #[arg(long, value_parser = parse_kebab::<DiversityRole>, default_value = "master")]
        role: DiversityRole,

        #[arg(long, value_parser = parse_kebab::<BasebandVariant>, default_value = "tcc3530")]
        baseband: BasebandVariant,

        #[arg(long, value_parser = parse_kebab::<StreamInterface>, default_value = "spi")]
        stream_interface: StreamInterface,

        /// Crystal frequency in kHz.
        #[arg(long, default_value_t = 38400)]
        osc_khz: u32,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List the DPLL tables, or dump the rows of one table.
    Tables {
        /// Table name (e.g. `fullseg`, `tmm-user-13seg`).
        name: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Attach, initialise and tune a simulated module.{n}
    /// The board comes from the `--config` file; without one, chips are
    /// generated for `--topology`.
    Simulate {
        /// Channel centre frequency in kHz.
        frequency: i32,

        #[command(flatten)]
        service: ServiceArgs,

        /// Board topology used when the board file lists no slots.
        #[arg(long, value_parser = parse_kebab::<BoardTopology>)]
        topology: Option<BoardTopology>,

        /// Crystal frequency in kHz, applied to every slot.
        #[arg(long)]
        osc_khz: Option<u32>,

        /// Fixed PLL word, disables per-channel selection.
        #[arg(long, value_parser = maybe_hex::<u16>)]
        pll: Option<u16>,

        #[arg(long, value_parser = parse_kebab::<PllPolicy>)]
        pll_policy: Option<PllPolicy>,

        #[arg(long, value_parser = parse_kebab::<StreamInterface>)]
        stream_interface: Option<StreamInterface>,

        /// Coldboot image; a synthetic one is built when omitted.
        #[arg(long)]
        firmware: Option<PathBuf>,

        /// Frequencies (kHz) to retune to after the first tune.
        #[arg(long, value_delimiter = ',')]
        retune: Vec<i32>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// Service selection shared by the tuning subcommands.
#[derive(Debug, Clone, Args)]
pub(crate) struct ServiceArgs {
    /// Service type: full-seg, partial1-seg, tsb1-seg, tsb3-seg or tsb1-of3-seg.
    #[arg(short, long, value_parser = parse_kebab::<Segment>, default_value = "full-seg")]
    pub segment: Segment,

    /// ISDB-Tmm time slot (e.g. `a1st13-seg`); selects an ISDB-Tmm service.
    #[arg(long, value_parser = parse_kebab::<TmmSlot>)]
    pub tmm_slot: Option<TmmSlot>,

    /// The RF front end is low-IF.
    #[arg(long)]
    pub low_if: bool,

    /// FIFO threshold override in bytes (main-I/O output).
    #[arg(long, value_parser = maybe_hex::<u32>)]
    pub fifo_threshold: Option<u32>,
}

impl ServiceArgs {
    pub(crate) fn request(&self) -> TuneRequest {
        let segment = match self.tmm_slot {
            Some(slot) => Segment::Tmm(slot),
            None => self.segment,
        };
        TuneRequest {
            segment,
            rf_if: if self.low_if {
                RfIfType::LowIf
            } else {
                RfIfType::ZeroIf
            },
            fifo_threshold: self.fifo_threshold,
            ..TuneRequest::new(segment)
        }
    }
}

/// Parse a value by its kebab-case serde name, the same spelling the board file uses.
pub(crate) fn parse_kebab<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase()))
        .map_err(|_| format!("unrecognised value `{}`", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kebab_names() {
        assert_eq!(parse_kebab::<Segment>("full-seg"), Ok(Segment::FullSeg));
        assert_eq!(
            parse_kebab::<BoardTopology>("Two-Diversity"),
            Ok(BoardTopology::TwoDiversity)
        );
        assert_eq!(
            parse_kebab::<TmmSlot>("a1st13-seg"),
            Ok(TmmSlot::A1st13Seg)
        );
        assert_eq!(parse_kebab::<PllPolicy>("always"), Ok(PllPolicy::Always));
        assert!(parse_kebab::<Segment>("dvb-t").is_err());
    }

    #[test]
    fn test_tmm_slot_selects_tmm_service() {
        let cli = Cli::try_parse_from([
            "tcc353x",
            "pll",
            "214714",
            "--tmm-slot",
            "b2nd13-seg",
            "--low-if",
        ])
        .unwrap();
        match cli.command {
            Commands::Pll { service, .. } => {
                let request = service.request();
                assert_eq!(request.segment, Segment::Tmm(TmmSlot::B2nd13Seg));
                assert_eq!(request.rf_if, RfIfType::LowIf);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_simulate_arguments() {
        let cli = Cli::try_parse_from([
            "tcc353x",
            "-v",
            "simulate",
            "473143",
            "--topology",
            "two-diversity",
            "--pll",
            "0xAC8E",
            "--retune",
            "479143,485143",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Simulate {
                frequency,
                topology,
                pll,
                retune,
                ..
            } => {
                assert_eq!(frequency, 473143);
                assert_eq!(topology, Some(BoardTopology::TwoDiversity));
                assert_eq!(pll, Some(0xAC8E));
                assert_eq!(retune, vec![479143, 485143]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
