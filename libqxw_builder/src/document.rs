use fxhash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

use super::error::AssemblerError;
use super::fixture::FixtureRecord;
use super::groups::GroupRecord;
use super::universe::{OutputBinding, UniverseRecord};

/// A Universe element of the InputOutputMap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseElement {
    pub name: String,
    pub id: i64,
    pub output: Option<OutputBinding>,
}

/// A Fixture element, already converted to controller addressing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureElement {
    pub manufacturer: String,
    pub model: String,
    pub mode: String,
    pub id: u32,
    pub name: String,
    /// 0-based universe
    pub universe: u32,
    pub address: u32,
    pub channels: u32,
    /// 1-based (universe, address) from the source; used to resolve channel groups
    source_patch: (u32, u32),
}

/// A ChannelsGroup element: a named set of (fixture id, channel) pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroupElement {
    pub id: u32,
    pub name: String,
    pub channels: Vec<(u32, u32)>,
}

impl ChannelGroupElement {
    /// The element text, a flat comma separated `fixture,channel,fixture,channel,...` list
    pub fn value_text(&self) -> String {
        self.channels
            .iter()
            .map(|(fixture, channel)| format!("{fixture},{channel}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// The assembled document. The order of every list is the order of the sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledDocument {
    pub universes: Vec<UniverseElement>,
    pub fixtures: Vec<FixtureElement>,
    pub channel_groups: Vec<ChannelGroupElement>,
}

/// Build the document from the records of both readers.
///
/// Universe ids are passed through untouched. Fixtures receive the sequential id
/// `index + id_start` and have their universe converted to 0-based. This function does no IO.
pub fn assemble(
    universes: &[UniverseRecord],
    fixtures: &[FixtureRecord],
    id_start: u32,
) -> Result<CompiledDocument, AssemblerError> {
    let mut doc = CompiledDocument::default();

    let mut seen_ids: FxHashSet<i64> = FxHashSet::default();
    for universe in universes {
        if !seen_ids.insert(universe.id) {
            spdlog::warn!(
                "Universe {:?} reuses ID {}; the ID is kept as declared",
                universe.name,
                universe.id
            );
        }
        doc.universes.push(UniverseElement {
            name: universe.name.clone(),
            id: universe.id,
            output: universe.output.clone(),
        });
    }

    for (index, fixture) in fixtures.iter().enumerate() {
        doc.fixtures.push(assemble_fixture(index, fixture, id_start)?);
    }

    spdlog::info!(
        "Assembled {} universes and {} fixtures",
        doc.universes.len(),
        doc.fixtures.len()
    );
    Ok(doc)
}

fn assemble_fixture(
    index: usize,
    fixture: &FixtureRecord,
    id_start: u32,
) -> Result<FixtureElement, AssemblerError> {
    if !fixture.is_mode_consistent() {
        spdlog::warn!(
            "Fixture {} ({}) declares mode {} but {} channels; both are kept as declared",
            index,
            fixture.model,
            fixture.mode,
            fixture.channels
        );
    }

    let universe = fixture
        .universe
        .checked_sub(1)
        .ok_or_else(|| AssemblerError::Conversion {
            index,
            model: fixture.model.clone(),
            universe: fixture.universe,
        })?;

    let id = u32::try_from(index)
        .ok()
        .and_then(|i| i.checked_add(id_start))
        .ok_or(AssemblerError::IdOverflow { index, id_start })?;

    Ok(FixtureElement {
        manufacturer: fixture.manufacturer.clone(),
        model: fixture.model.clone(),
        mode: fixture.mode_label(),
        id,
        name: fixture.model.clone(),
        universe,
        address: fixture.address,
        channels: fixture.channels,
        source_patch: (fixture.universe, fixture.address),
    })
}

impl CompiledDocument {
    /// Look up the assigned fixture id for a 1-based (universe, address) patch
    fn fixture_ids_by_patch(&self) -> FxHashMap<(u32, u32), u32> {
        let mut map = FxHashMap::default();
        for fixture in self.fixtures.iter() {
            // First fixture patched at an address wins, matching the groups file semantics
            map.entry(fixture.source_patch).or_insert(fixture.id);
        }
        map
    }

    /// Turn the categorised rows of a groups file into ChannelsGroup elements.
    ///
    /// Categories become groups in name order, unassigned rows are skipped and group ids
    /// count up from 0. Every channel of each member fixture is part of the group.
    pub fn attach_channel_groups(&mut self, rows: &[GroupRecord]) -> Result<(), AssemblerError> {
        let ids = self.fixture_ids_by_patch();

        let mut categories: BTreeMap<&str, Vec<&GroupRecord>> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.is_assigned()) {
            categories.entry(row.category.as_str()).or_default().push(row);
        }

        let mut groups = Vec::with_capacity(categories.len());
        for (category, members) in categories {
            let mut channels = Vec::new();
            for member in members {
                let fixture_id =
                    ids.get(&member.patch())
                        .ok_or_else(|| AssemblerError::UnknownGroupMember {
                            category: category.to_string(),
                            universe: member.universe,
                            address: member.address,
                        })?;
                channels.extend((0..member.channels).map(|ch| (*fixture_id, ch)));
            }
            if channels.is_empty() {
                continue;
            }
            groups.push(ChannelGroupElement {
                id: groups.len() as u32,
                name: category.to_string(),
                channels,
            });
        }

        spdlog::info!("Assembled {} channel groups", groups.len());
        self.channel_groups = groups;
        Ok(())
    }
}
