//! Frequency table, PLL and op-config queries. Nothing here touches a chip.

use serde::Serialize;
use tcc353x::DriverError;
use tcc353x_protocol::opconfig::DEFAULT_RC_STEP;
use tcc353x_protocol::tables::ALL_TABLES;
use tcc353x_protocol::{
    apply_spur_suppression, auto_pll, build_op_config, main_clock_khz, BasebandVariant,
    BoardTopology, DiversityRole, FrequencyTableEntry, OpConfig, OpConfigParams, OpField,
    PllRegisters, PllTable, SpurSettings, StreamInterface, TuneRequest,
};

use crate::context::OutputFormat;
use crate::error::CliError;

/// Frequency after the ISDB-Tmm slot shift, rejecting non-positive results.
fn shifted_frequency(request: &TuneRequest, frequency_khz: i32) -> Result<u32, CliError> {
    match request.segment.shifted_frequency(frequency_khz) {
        Some(shifted) if shifted > 0 => Ok(shifted as u32),
        shifted => Err(DriverError::InvalidFrequency(shifted.unwrap_or(frequency_khz)).into()),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PllReport {
    pub frequency_khz: u32,
    pub table: Option<String>,
    pub pll: u16,
    pub feedback_divider: u32,
    pub reference_divider: u32,
    pub output_shift: u32,
    pub post_divide: u32,
    pub main_clock_khz: u32,
    /// RC step and ADC clock replaced by the spur table.
    pub spur_override: Option<(u64, u32)>,
    pub ici_cancellation: bool,
}

pub(crate) fn pll_report(
    request: &TuneRequest,
    frequency_khz: i32,
    osc_khz: u32,
) -> Result<PllReport, CliError> {
    let frequency_khz = shifted_frequency(request, frequency_khz)?;
    let pll = auto_pll(request, frequency_khz);
    let registers = PllRegisters::from_word(pll);

    let mut spur = SpurSettings {
        rc_step: DEFAULT_RC_STEP,
        adc_clk_cfg: 0,
        ici_cancellation: true,
    };
    let overridden = apply_spur_suppression(&request.segment, frequency_khz, osc_khz, &mut spur);

    Ok(PllReport {
        frequency_khz,
        table: PllTable::for_request(request).map(|t| format!("{:?}", t)),
        pll,
        feedback_divider: registers.feedback_divider(),
        reference_divider: registers.reference_divider(),
        output_shift: registers.output_shift(),
        post_divide: registers.post_divide(),
        main_clock_khz: main_clock_khz(osc_khz, pll),
        spur_override: overridden.then_some((spur.rc_step, spur.adc_clk_cfg)),
        ici_cancellation: spur.ici_cancellation,
    })
}

pub(crate) fn pll(
    request: &TuneRequest,
    frequency_khz: i32,
    osc_khz: u32,
    format: OutputFormat,
) -> Result<(), CliError> {
    let report = pll_report(request, frequency_khz, osc_khz)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            println!("frequency     {} kHz", report.frequency_khz);
            println!(
                "table         {}",
                report.table.as_deref().unwrap_or("fixed clock")
            );
            println!(
                "pll           0x{:04X} (F={} R={} OD={} M={})",
                report.pll,
                report.feedback_divider,
                report.reference_divider,
                report.output_shift,
                report.post_divide
            );
            println!("main clock    {} kHz @ {} kHz", report.main_clock_khz, osc_khz);
            match report.spur_override {
                Some((rc_step, adc)) => {
                    println!("spur          rc_step 0x{:010X}, adc_clk 0x{:02X}", rc_step, adc)
                }
                None => println!("spur          -"),
            }
            println!("icic          {}", report.ici_cancellation);
        }
    }
    Ok(())
}

/// Board shape used when building an op-config offline.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    pub topology: BoardTopology,
    pub role: DiversityRole,
    pub baseband: BasebandVariant,
    pub stream_interface: StreamInterface,
    pub osc_khz: u32,
}

pub(crate) fn op_config_for(
    request: &TuneRequest,
    frequency_khz: i32,
    placement: &Placement,
) -> Result<OpConfig, CliError> {
    let frequency_khz = shifted_frequency(request, frequency_khz)?;
    Ok(build_op_config(&OpConfigParams {
        segment: request.segment,
        rf_if: request.rf_if,
        frequency_khz,
        diversity_count: placement.topology.diversity_count(),
        topology: placement.topology,
        role: placement.role,
        stream_interface: placement.stream_interface,
        baseband: placement.baseband,
        osc_khz: placement.osc_khz,
    }))
}

const REPORTED_FIELDS: [(&str, OpField); 9] = [
    ("segment_type", OpField::SegmentType),
    ("start_sub_channel", OpField::StartSubChannel),
    ("diversity_config", OpField::DiversityConfig),
    ("ici_cancellation", OpField::IciCancellation),
    ("adc_clock", OpField::AdcClock),
    ("output_mode", OpField::OutputMode),
    ("rc_step_high", OpField::RcStepHigh),
    ("frequency_form", OpField::FrequencyForm),
    ("variant_trailer", OpField::VariantTrailer),
];

pub(crate) fn opconfig(
    request: &TuneRequest,
    frequency_khz: i32,
    placement: &Placement,
    format: OutputFormat,
) -> Result<(), CliError> {
    let config = op_config_for(request, frequency_khz, placement)?;
    match format {
        OutputFormat::Json => {
            let fields: serde_json::Map<String, serde_json::Value> = REPORTED_FIELDS
                .iter()
                .map(|(name, field)| (name.to_string(), config.get(*field).into()))
                .collect();
            let report = serde_json::json!({
                "words": config.words(),
                "fields": fields,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            for (i, word) in config.words().iter().enumerate() {
                println!("CFG{:02}  0x{:08X}", i, word);
            }
            println!();
            for (name, field) in REPORTED_FIELDS {
                println!("{:<18} 0x{:X}", name, config.get(field));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub(crate) struct TableSummary {
    pub name: &'static str,
    pub rows: usize,
    pub lowest_khz: Option<u32>,
    pub highest_khz: Option<u32>,
    pub fallback_pll: Option<u16>,
}

pub(crate) fn summarize(name: &'static str, table: &[FrequencyTableEntry]) -> TableSummary {
    let rows = table.iter().filter(|e| !e.is_sentinel());
    TableSummary {
        name,
        rows: rows.clone().count(),
        lowest_khz: rows.clone().map(|e| e.frequency_khz).min(),
        highest_khz: rows.map(|e| e.frequency_khz).max(),
        fallback_pll: table.iter().find(|e| e.is_sentinel()).map(|e| e.pll),
    }
}

pub(crate) fn find_table(name: &str) -> Result<&'static [FrequencyTableEntry], CliError> {
    ALL_TABLES
        .iter()
        .find(|(table_name, _)| table_name.eq_ignore_ascii_case(name))
        .map(|(_, table)| *table)
        .ok_or_else(|| CliError::UnknownTable(name.to_string()))
}

#[derive(Debug, Serialize)]
struct RowView {
    frequency_khz: u32,
    pll: u16,
    rc_step: u64,
    adc_clk_cfg: u8,
}

pub(crate) fn tables(name: Option<&str>, format: OutputFormat) -> Result<(), CliError> {
    let Some(name) = name else {
        let summaries: Vec<_> = ALL_TABLES
            .iter()
            .map(|&(name, table)| summarize(name, table))
            .collect();
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
            OutputFormat::Table => {
                println!(
                    "{:<16} {:>5} {:>10} {:>10} {:>8}",
                    "TABLE", "ROWS", "LOW kHz", "HIGH kHz", "DEFAULT"
                );
                for s in &summaries {
                    println!(
                        "{:<16} {:>5} {:>10} {:>10} {:>8}",
                        s.name,
                        s.rows,
                        s.lowest_khz.map_or("-".to_string(), |f| f.to_string()),
                        s.highest_khz.map_or("-".to_string(), |f| f.to_string()),
                        s.fallback_pll
                            .map_or("-".to_string(), |p| format!("0x{:04X}", p)),
                    );
                }
            }
        }
        return Ok(());
    };

    let rows: Vec<RowView> = find_table(name)?
        .iter()
        .filter(|e| !e.is_sentinel())
        .map(|e| RowView {
            frequency_khz: e.frequency_khz,
            pll: e.pll,
            rc_step: e.rc_step(),
            adc_clk_cfg: e.adc_clk_cfg,
        })
        .collect();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Table => {
            println!("{:>10} {:>8} {:>14} {:>6}", "kHz", "PLL", "RC STEP", "ADC");
            for row in &rows {
                println!(
                    "{:>10} {:>8} {:>14} {:>6}",
                    row.frequency_khz,
                    format!("0x{:04X}", row.pll),
                    format!("0x{:010X}", row.rc_step),
                    format!("0x{:02X}", row.adc_clk_cfg),
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcc353x_protocol::{Segment, TmmSlot, PLL_ISDB_TSB, PLL_ISDB_T_FULLSEG_2C};

    fn placement() -> Placement {
        Placement {
            topology: BoardTopology::Single,
            role: DiversityRole::Master,
            baseband: BasebandVariant::Tcc3530,
            stream_interface: StreamInterface::Spi,
            osc_khz: 38400,
        }
    }

    #[test]
    fn test_pll_report_fullseg() {
        let report = pll_report(&TuneRequest::new(Segment::FullSeg), 473143, 38400).unwrap();
        assert_eq!(report.pll, PLL_ISDB_T_FULLSEG_2C);
        assert_eq!(report.table.as_deref(), Some("FullSeg"));
        assert_eq!(report.main_clock_khz, main_clock_khz(38400, PLL_ISDB_T_FULLSEG_2C));
    }

    #[test]
    fn test_pll_report_tsb_has_fixed_clock() {
        let report = pll_report(&TuneRequest::new(Segment::Tsb3Seg), 100000, 38400).unwrap();
        assert_eq!(report.pll, PLL_ISDB_TSB);
        assert_eq!(report.table, None);
        assert_eq!(report.spur_override, None);
    }

    #[test]
    fn test_tmm_shift_below_zero_is_rejected() {
        let request = TuneRequest::new(Segment::Tmm(TmmSlot::A1st1Seg));
        let result = pll_report(&request, 5000, 38400);
        assert!(matches!(
            result,
            Err(CliError::Driver {
                source: DriverError::InvalidFrequency(-1857),
                ..
            })
        ));
    }

    #[test]
    fn test_op_config_frequency_form() {
        let config =
            op_config_for(&TuneRequest::new(Segment::FullSeg), 473143, &placement()).unwrap();
        assert_eq!(config.get(OpField::FrequencyForm), 473143 >> 4);
        assert_eq!(config.get(OpField::SegmentType), 2);
        assert_eq!(config.get(OpField::DiversityConfig), 0);
        assert_eq!(config.get(OpField::VariantTrailer), 0x03BE_FF42);
    }

    #[test]
    fn test_op_config_slave_role() {
        let slave = Placement {
            topology: BoardTopology::TwoDiversity,
            role: DiversityRole::Slave,
            ..placement()
        };
        let config =
            op_config_for(&TuneRequest::new(Segment::Partial1Seg), 473143, &slave).unwrap();
        assert_eq!(config.get(OpField::DiversityConfig), 0x13D);
        assert_eq!(config.get(OpField::SegmentType), 0);
    }

    #[test]
    fn test_table_summaries() {
        for (name, table) in ALL_TABLES {
            let summary = summarize(name, table);
            assert!(summary.rows > 0, "{}", name);
            assert!(summary.fallback_pll.is_some(), "{}", name);
            assert!(summary.lowest_khz <= summary.highest_khz, "{}", name);
        }
    }

    #[test]
    fn test_find_table() {
        assert!(find_table("FULLSEG").is_ok());
        assert!(matches!(
            find_table("dvb-t"),
            Err(CliError::UnknownTable(_))
        ));
    }
}
