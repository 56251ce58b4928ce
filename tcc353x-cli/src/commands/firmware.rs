//! Coldboot image handlers for inspect and pack.

use std::path::{Path, PathBuf};

use colored::Colorize;
use log::info;
use serde::Serialize;
use tcc353x_protocol::{crc32_mpeg2, ContainerBuilder, FirmwareContainer};

use crate::context::OutputFormat;
use crate::error::{read_file, CliError};

#[derive(Debug, Serialize)]
pub(crate) struct SegmentSummary {
    pub name: &'static str,
    pub size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageSummary {
    pub image_size: usize,
    pub segments: Vec<SegmentSummary>,
    pub stored_crc: u32,
    pub computed_crc: u32,
}

impl ImageSummary {
    pub(crate) fn crc_valid(&self) -> bool {
        self.stored_crc == self.computed_crc
    }
}

pub(crate) fn describe(image: &[u8]) -> Result<ImageSummary, CliError> {
    let container = FirmwareContainer::parse(image)?;
    let body = container.code_body()?;

    let segments = vec![
        SegmentSummary {
            name: "code",
            size: Some(container.code.len()),
        },
        SegmentSummary {
            name: "dagu",
            size: container.dagu.map(<[u8]>::len),
        },
        SegmentSummary {
            name: "dint",
            size: container.dint.map(<[u8]>::len),
        },
        SegmentSummary {
            name: "rand",
            size: container.rand.map(<[u8]>::len),
        },
        SegmentSummary {
            name: "col-order",
            size: container.col_order.map(<[u8]>::len),
        },
    ];

    Ok(ImageSummary {
        image_size: image.len(),
        segments,
        stored_crc: container.code_crc()?,
        computed_crc: crc32_mpeg2(body),
    })
}

pub(crate) fn inspect(path: &Path, format: OutputFormat) -> Result<(), CliError> {
    let image = read_file(path)?;
    let summary = describe(&image)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Table => {
            println!("{} ({} bytes)", path.display(), summary.image_size);
            println!("{:<10} {:>10}", "SEGMENT", "SIZE");
            for segment in &summary.segments {
                match segment.size {
                    Some(size) => println!("{:<10} {:>10}", segment.name, size),
                    None => println!("{:<10} {:>10}", segment.name, "-"),
                }
            }
            let status = if summary.crc_valid() {
                "OK".green()
            } else {
                "MISMATCH".red()
            };
            println!(
                "code CRC: stored 0x{:08X}, computed 0x{:08X} {}",
                summary.stored_crc, summary.computed_crc, status
            );
        }
    }
    Ok(())
}

/// Raw segment files for [`pack`].
#[derive(Debug)]
pub(crate) struct PackInputs {
    pub code: PathBuf,
    pub dagu: Option<PathBuf>,
    pub dint: Option<PathBuf>,
    pub rand: Option<PathBuf>,
    pub col_order: Option<PathBuf>,
}

pub(crate) fn build_image(inputs: &PackInputs) -> Result<Vec<u8>, CliError> {
    let mut builder = ContainerBuilder::new().code(&read_file(&inputs.code)?);
    if let Some(path) = &inputs.dagu {
        builder = builder.dagu(&read_file(path)?);
    }
    if let Some(path) = &inputs.dint {
        builder = builder.dint(&read_file(path)?);
    }
    if let Some(path) = &inputs.rand {
        builder = builder.rand(&read_file(path)?);
    }
    if let Some(path) = &inputs.col_order {
        builder = builder.col_order(&read_file(path)?);
    }
    Ok(builder.build().to_vec())
}

pub(crate) fn pack(inputs: &PackInputs, output: &Path) -> Result<(), CliError> {
    let image = build_image(inputs)?;
    std::fs::write(output, &image).map_err(|source| CliError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    info!("Wrote {} ({} bytes)", output.display(), image.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_built_image() {
        let image = ContainerBuilder::new()
            .code(&[0x11; 64])
            .dint(&[0x22; 16])
            .build();
        let summary = describe(&image).unwrap();
        assert_eq!(summary.image_size, image.len());
        assert_eq!(summary.segments[0].size, Some(68));
        assert_eq!(summary.segments[1].size, None);
        assert_eq!(summary.segments[2].size, Some(16));
        assert!(summary.crc_valid());
    }

    #[test]
    fn test_describe_reports_bad_crc() {
        let mut image = ContainerBuilder::new().code(&[0x11; 64]).build().to_vec();
        // last byte of the code CRC trailer
        let trailer_end = 8 + 68;
        image[trailer_end - 1] ^= 0xFF;
        let summary = describe(&image).unwrap();
        assert!(!summary.crc_valid());
    }

    #[test]
    fn test_describe_rejects_garbage() {
        assert!(matches!(
            describe(&[0x00, 0x00, 0x00, 0x07, 0, 0, 0, 0]),
            Err(CliError::Protocol(_))
        ));
    }

    #[test]
    fn test_pack_round_trip() {
        let dir = std::env::temp_dir().join(format!("tcc353x-pack-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let code = dir.join("code.bin");
        let rand = dir.join("rand.bin");
        let output = dir.join("coldboot.bin");
        std::fs::write(&code, [0x5A; 40]).unwrap();
        std::fs::write(&rand, [0x01, 0x02, 0x03, 0x04]).unwrap();

        let inputs = PackInputs {
            code,
            dagu: None,
            dint: None,
            rand: Some(rand),
            col_order: None,
        };
        pack(&inputs, &output).unwrap();

        let image = std::fs::read(&output).unwrap();
        let container = FirmwareContainer::parse(&image).unwrap();
        assert_eq!(container.code_body().unwrap(), &[0x5A; 40][..]);
        assert_eq!(container.rand, Some(&[0x01, 0x02, 0x03, 0x04][..]));
        assert!(container.code_crc_valid());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
