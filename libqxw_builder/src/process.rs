use super::config::Config;
use super::document::{assemble, CompiledDocument};
use super::error::ProcessorError;
use super::fixture::read_fixtures;
use super::groups::read_groups;
use super::universe::read_universes;
use super::xml_writer::{write_rendered, XMLWriter};

/// Summary of a finished compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    pub n_universes: usize,
    pub n_fixtures: usize,
    pub n_channel_groups: usize,
    pub bytes_written: u64,
}

/// Run every stage except the final write.
///
/// Returns the assembled document and its rendered markup. Nothing is written to disk, which
/// makes this usable as a dry run.
pub fn compile(config: &Config) -> Result<(CompiledDocument, Vec<u8>), ProcessorError> {
    spdlog::info!(
        "Reading universes from {}...",
        config.universes_path.to_string_lossy()
    );
    let universes = read_universes(&config.universes_path)?;

    spdlog::info!(
        "Reading fixtures from {}...",
        config.fixtures_path.to_string_lossy()
    );
    let fixtures = read_fixtures(&config.fixtures_path)?;

    let groups = match &config.groups_path {
        Some(path) => {
            spdlog::info!("Reading channel groups from {}...", path.to_string_lossy());
            Some(read_groups(path)?)
        }
        None => None,
    };

    let mut doc = assemble(&universes, &fixtures, config.id_start)?;
    if let Some(rows) = groups {
        doc.attach_channel_groups(&rows)?;
    }

    let bytes = XMLWriter::from_config(config).render(&doc)?;
    Ok((doc, bytes))
}

/// The main pipeline: read both sources, assemble and write the workspace.
///
/// All reading and rendering happens before the output file is opened, so any failure leaves
/// the previous output (if any) untouched.
pub fn process(config: &Config) -> Result<CompileReport, ProcessorError> {
    let (doc, bytes) = compile(config)?;

    spdlog::info!(
        "Writing workspace to {}...",
        config.output_path.to_string_lossy()
    );
    let bytes_written = write_rendered(&bytes, &config.output_path)?;
    spdlog::info!(
        "Wrote workspace with size: {}",
        human_bytes::human_bytes(bytes_written as f64)
    );

    Ok(CompileReport {
        n_universes: doc.universes.len(),
        n_fixtures: doc.fixtures.len(),
        n_channel_groups: doc.channel_groups.len(),
        bytes_written,
    })
}
