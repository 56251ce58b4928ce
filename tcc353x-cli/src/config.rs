//! TOML board description.
//!
//! ```toml
//! [driver]
//! pll_policy = "on-change"
//!
//! [[slot]]
//! address = 0xA8
//! topology = "two-diversity"
//! role = "master"
//!
//! [slot.registers]
//! stream_data_config = [0x2F, 0x21, 0x00, 0x00]
//!
//! [[slot]]
//! address = 0xAA
//! topology = "two-diversity"
//! role = "slave"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tcc353x::sim::SimulatedBus;
use tcc353x::{DriverConfig, PllPolicy, ReceiverOptions};
use tcc353x_protocol::{BoardTopology, StreamInterface};

use crate::error::{read_file, CliError};

/// Board file looked up in the working directory when `-f` is not given.
pub(crate) const DEFAULT_BOARD_FILE: &str = "tcc353x.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct BoardFile {
    pub driver: DriverConfig,
    #[serde(rename = "slot")]
    pub slots: Vec<ReceiverOptions>,
}

/// Command-line values that take precedence over the board file.
#[derive(Debug, Default, Clone)]
pub(crate) struct BoardOverrides {
    pub topology: Option<BoardTopology>,
    pub osc_khz: Option<u32>,
    pub pll: Option<u16>,
    pub pll_policy: Option<PllPolicy>,
    pub stream_interface: Option<StreamInterface>,
}

impl BoardFile {
    pub(crate) fn parse(contents: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load the board file: explicit path > auto-detect > default.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let path = path.map(Path::to_path_buf).or_else(|| {
            let default_path = PathBuf::from(DEFAULT_BOARD_FILE);
            if default_path.exists() {
                Some(default_path)
            } else {
                None
            }
        });

        match path {
            Some(path) => {
                let contents = read_file(&path)?;
                let board = Self::parse(&String::from_utf8_lossy(&contents))?;
                log::info!(
                    "Loaded board from {} ({} slots)",
                    path.display(),
                    board.slots.len()
                );
                Ok(board)
            }
            None => Ok(Self::default()),
        }
    }

    /// Driver configuration and per-slot options with overrides applied.
    ///
    /// A board without slots gets one simulated chip per diversity slot of
    /// the requested topology.
    pub(crate) fn resolve(self, overrides: &BoardOverrides) -> (DriverConfig, Vec<ReceiverOptions>) {
        let mut driver = self.driver;
        if let Some(policy) = overrides.pll_policy {
            driver.pll_policy = policy;
        }

        let mut slots = if self.slots.is_empty() {
            SimulatedBus::slot_options(overrides.topology.unwrap_or_default())
        } else {
            self.slots
        };

        for slot in slots.iter_mut() {
            if let Some(topology) = overrides.topology {
                slot.topology = topology;
            }
            if let Some(osc_khz) = overrides.osc_khz {
                slot.osc_khz = osc_khz;
            }
            if let Some(pll) = overrides.pll {
                slot.pll_override = Some(pll);
            }
            if let Some(stream_interface) = overrides.stream_interface {
                slot.stream_interface = stream_interface;
            }
        }

        (driver, slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcc353x_protocol::{CommandInterface, DiversityRole};

    const BOARD: &str = r#"
        [driver]
        pll_policy = "always"
        stop_ack_poll_limit = 50

        [[slot]]
        address = 0xA8
        topology = "two-diversity"
        role = "master"
        osc_khz = 19200
        rf_switch_gpio = 9

        [slot.registers]
        stream_data_config = [0x2F, 0x21, 0x00, 0x01]

        [[slot]]
        interface = "tcc-spi"
        address = 0xAA
        topology = "two-diversity"
        role = "slave"
    "#;

    #[test]
    fn test_parse_board_file() {
        let board = BoardFile::parse(BOARD).unwrap();
        assert_eq!(board.driver.pll_policy, PllPolicy::Always);
        assert_eq!(board.driver.stop_ack_poll_limit, 50);
        assert_eq!(board.driver.mailbox_poll_limit, 100);
        assert_eq!(board.slots.len(), 2);

        let master = &board.slots[0];
        assert_eq!(master.osc_khz, 19200);
        assert_eq!(master.rf_switch_gpio, Some(9));
        assert_eq!(master.registers.stream_data_config, [0x2F, 0x21, 0x00, 0x01]);
        assert_eq!(master.registers.buffer_a_end, [0x9F, 0xD6]);

        let slave = &board.slots[1];
        assert_eq!(slave.interface, CommandInterface::TccSpi);
        assert_eq!(slave.role, DiversityRole::Slave);
        assert_eq!(slave.osc_khz, 38400);
    }

    #[test]
    fn test_empty_board_generates_slots() {
        let overrides = BoardOverrides {
            topology: Some(BoardTopology::ThreeDiversity),
            ..Default::default()
        };
        let (driver, slots) = BoardFile::default().resolve(&overrides);
        assert_eq!(driver, DriverConfig::default());
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[1].address, 0xAA);
        assert_eq!(slots[1].role, DiversityRole::Mid);
        assert_eq!(slots[2].role, DiversityRole::Slave);
    }

    #[test]
    fn test_flags_override_board_file() {
        let overrides = BoardOverrides {
            osc_khz: Some(38400),
            pll: Some(0xAC8E),
            pll_policy: Some(PllPolicy::OnChange),
            stream_interface: Some(StreamInterface::MainIo),
            ..Default::default()
        };
        let (driver, slots) = BoardFile::parse(BOARD).unwrap().resolve(&overrides);
        assert_eq!(driver.pll_policy, PllPolicy::OnChange);
        assert_eq!(driver.stop_ack_poll_limit, 50);
        for slot in &slots {
            assert_eq!(slot.osc_khz, 38400);
            assert_eq!(slot.pll_override, Some(0xAC8E));
            assert_eq!(slot.stream_interface, StreamInterface::MainIo);
            assert_eq!(slot.topology, BoardTopology::TwoDiversity);
        }
    }

    #[test]
    fn test_invalid_board_file() {
        let result = BoardFile::parse("[[slot]]\ntopology = \"five-diversity\"\n");
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
