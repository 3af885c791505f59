use std::path::Path;

use libqxw_builder::config::Config;
use libqxw_builder::error::{ErrorKind, ProcessorError};
use libqxw_builder::groups::ensure_groups_file;
use libqxw_builder::process::{compile, process};

const FIXTURES: &str = "Manufacturer,Model,Mode,Universe,Address,Channels\n\
                        ACME,Par64,8,1,1,8\n\
                        ACME,Par64,8,1,9,8\n\
                        Stairville,LED Bar,12,2,1,12\n";

const UNIVERSES: &str = r#"{
    "universes": [
        {"name": "Universe 1", "id": 0,
         "output": {"plugin": "USB DMX", "line": "0", "parameters": {"Bus": "1"}}},
        {"name": "Universe 2", "id": 1}
    ]
}"#;

fn setup(dir: &Path, fixtures: &str) -> Config {
    std::fs::create_dir_all(dir.join("setup")).unwrap();
    std::fs::write(dir.join("setup/fixtures.csv"), fixtures).unwrap();
    std::fs::write(dir.join("setup/universes.json"), UNIVERSES).unwrap();
    Config::default().resolve_relative_to(dir)
}

#[test]
fn compiles_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), FIXTURES);

    let report = process(&config).unwrap();
    assert_eq!(report.n_universes, 2);
    assert_eq!(report.n_fixtures, 3);
    assert_eq!(report.n_channel_groups, 0);

    let text = std::fs::read_to_string(&config.output_path).unwrap();
    assert_eq!(report.bytes_written, text.len() as u64);
    assert!(text.contains("<Universe Name=\"Universe 1\" ID=\"0\">"));
    assert!(text.contains("<PluginParameters Bus=\"1\"/>"));
    assert_eq!(text.matches("<Fixture>").count(), 3);
    assert!(text.contains("<ID>2</ID>"));
    assert!(text.contains("<Universe>1</Universe>"));
    assert!(text.contains("<Mode>12 Channels Mode</Mode>"));
}

#[test]
fn recompiling_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), FIXTURES);
    let (first_doc, first) = compile(&config).unwrap();
    let (second_doc, second) = compile(&config).unwrap();
    assert_eq!(first_doc, second_doc);
    assert_eq!(first, second);
}

#[test]
fn id_start_offsets_fixture_ids() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), FIXTURES);
    config.id_start = 20;
    let (doc, _) = compile(&config).unwrap();
    let ids: Vec<u32> = doc.fixtures.iter().map(|f| f.id).collect();
    assert_eq!(ids, [20, 21, 22]);
}

#[test]
fn malformed_fixture_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(
        dir.path(),
        "Manufacturer,Model,Mode,Universe,Address\nACME,Par64,8,1,1\n",
    );

    let err = process(&config).unwrap_err();
    assert!(matches!(err, ProcessorError::FixtureError(_)));
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    assert_eq!(err.stage(), "read-fixtures");
    assert!(err.to_string().starts_with("Stage read-fixtures failed"));
    assert!(!config.output_path.exists());
}

#[test]
fn unwritable_output_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), FIXTURES);
    config.output_path = dir.path().join("no_such_dir").join("workspace.qxw");
    let err = process(&config).unwrap_err();
    assert_eq!(err.stage(), "emit");
    assert_eq!(err.kind(), ErrorKind::IO);
}

#[test]
fn channel_groups_from_bootstrapped_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), FIXTURES);
    let groups_path = dir.path().join("setup/groups.csv");
    ensure_groups_file(&config.fixtures_path, &groups_path).unwrap();

    // Sort the two pars into a group, as a user would by hand
    let edited = std::fs::read_to_string(&groups_path)
        .unwrap()
        .replacen(",None,1,1,", ",Front,1,1,", 1)
        .replacen(",None,1,9,", ",Front,1,9,", 1);
    std::fs::write(&groups_path, edited).unwrap();
    config.groups_path = Some(groups_path);

    let (doc, bytes) = compile(&config).unwrap();
    assert_eq!(doc.channel_groups.len(), 1);
    assert_eq!(doc.channel_groups[0].channels.len(), 16);
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("<ChannelsGroup ID=\"0\" Name=\"Front\" Value=\"0\">0,0,0,1,"));
}
