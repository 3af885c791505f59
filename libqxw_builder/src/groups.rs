//! Channel group bootstrap.
//!
//! The groups file is a copy of the fixture source with two derived columns (`id` and
//! `category`). It is meant to be edited by hand: the user assigns each fixture a category,
//! and every category later becomes a `ChannelsGroup` in the workspace. Because of this, an
//! existing groups file is never rewritten, only extended with fixtures it does not yet know.
use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::GroupsError;
use super::fixture::{read_fixtures, FixtureRecord};

/// Category given to fixtures which have not been sorted into a group
pub const UNASSIGNED_CATEGORY: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: u32,
    pub category: String,
    #[serde(rename = "Universe")]
    pub universe: u32,
    #[serde(rename = "Address")]
    pub address: u32,
    #[serde(rename = "Manufacturer")]
    pub manufacturer: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Channels")]
    pub channels: u32,
    #[serde(rename = "Mode")]
    pub mode: u32,
}

impl GroupRecord {
    fn from_fixture(id: u32, fixture: &FixtureRecord) -> Self {
        Self {
            id,
            category: String::from(UNASSIGNED_CATEGORY),
            universe: fixture.universe,
            address: fixture.address,
            manufacturer: fixture.manufacturer.clone(),
            model: fixture.model.clone(),
            channels: fixture.channels,
            mode: fixture.mode,
        }
    }

    /// True if the fixture has been given a real category
    pub fn is_assigned(&self) -> bool {
        !self.category.is_empty() && self.category != UNASSIGNED_CATEGORY
    }

    /// The (universe, address) patch, 1-based
    pub fn patch(&self) -> (u32, u32) {
        (self.universe, self.address)
    }
}

/// What [ensure_groups_file] did to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupsOutcome {
    /// A new file was written with this many rows
    Created(usize),
    /// This many missing fixtures were appended to an existing file
    Updated(usize),
    /// Every fixture was already present
    UpToDate,
}

/// Read a groups file in file order
pub fn read_groups(path: &Path) -> Result<Vec<GroupRecord>, GroupsError> {
    if !path.exists() {
        return Err(GroupsError::BadFilePath(path.to_path_buf()));
    }
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| into_groups_error(e, path))?;

    let mut groups = Vec::new();
    for result in rdr.deserialize::<GroupRecord>() {
        groups.push(result.map_err(|e| into_groups_error(e, path))?);
    }
    Ok(groups)
}

/// Create the groups file from the fixture source if it is absent or empty, otherwise append
/// any fixture whose patch is not yet listed.
pub fn ensure_groups_file(
    fixture_source: &Path,
    groups_target: &Path,
) -> Result<GroupsOutcome, GroupsError> {
    let fixtures = read_fixtures(fixture_source)?;

    if is_absent_or_empty(groups_target)? {
        let rows: Vec<GroupRecord> = fixtures
            .iter()
            .enumerate()
            .map(|(idx, fixture)| GroupRecord::from_fixture(idx as u32, fixture))
            .collect();
        if let Some(parent) = groups_target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_groups(groups_target, &rows)?;
        spdlog::info!(
            "Created new groups file {} with {} fixtures",
            groups_target.to_string_lossy(),
            rows.len()
        );
        return Ok(GroupsOutcome::Created(rows.len()));
    }

    let mut rows = read_groups(groups_target)?;
    let known: FxHashSet<(u32, u32)> = rows.iter().map(GroupRecord::patch).collect();
    let mut added: FxHashSet<(u32, u32)> = FxHashSet::default();
    let mut n_new = 0;
    for fixture in fixtures.iter() {
        let patch = (fixture.universe, fixture.address);
        if known.contains(&patch) || !added.insert(patch) {
            continue;
        }
        let id = rows.len() as u32;
        rows.push(GroupRecord::from_fixture(id, fixture));
        n_new += 1;
    }

    if n_new == 0 {
        spdlog::info!("All fixtures are already in the groups file");
        return Ok(GroupsOutcome::UpToDate);
    }

    write_groups(groups_target, &rows)?;
    spdlog::info!("Updated groups file with {} new fixtures", n_new);
    Ok(GroupsOutcome::Updated(n_new))
}

fn is_absent_or_empty(path: &Path) -> Result<bool, GroupsError> {
    if !path.exists() {
        return Ok(true);
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.trim().is_empty())
}

fn write_groups(path: &Path, rows: &[GroupRecord]) -> Result<(), GroupsError> {
    let write_error = |reason: String| GroupsError::WriteError {
        path: path.to_path_buf(),
        reason,
    };
    // Serialize fully before touching the file so a failure never truncates the user's groups
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(row).map_err(|e| write_error(e.to_string()))?;
    }
    let bytes = wtr.into_inner().map_err(|e| write_error(e.to_string()))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn into_groups_error(error: csv::Error, path: &Path) -> GroupsError {
    let line = error.position().map(|p| p.line()).unwrap_or(0);
    match error.into_kind() {
        csv::ErrorKind::Io(e) => GroupsError::IOError(e),
        csv::ErrorKind::Deserialize { err, .. } => GroupsError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            reason: err.to_string(),
        },
        other => GroupsError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            reason: format!("{other:?}"),
        },
    }
}
