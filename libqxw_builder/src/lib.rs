//! # qxw_builder
//!
//! qxw_builder compiles a lighting rig description into a Q Light Controller Plus (QLC+)
//! workspace. It takes a CSV table of patched fixtures and a JSON description of the DMX
//! universes and their outputs, and writes a single `.qxw` XML document which QLC+ can open
//! directly.
//!
//! ## Building & Install
//!
//! To build and install the CLI use `cargo install --path ./qxw_builder_cli` from the top
//! level qxw_builder repository. Serial port detection (`qxw_builder_cli devices`) needs the
//! `serial` feature: `cargo install --path ./qxw_builder_cli --features serial`.
//!
//! ## Configuration
//!
//! A run is described by a YAML file. A template can be made with
//! `qxw_builder_cli -p config.yml new`. The format is as follows:
//!
//! ```yml
//! fixtures_path: setup/fixtures.csv
//! universes_path: setup/universes.json
//! groups_path: null
//! output_path: workspace.qxw
//! id_start: 0
//! workspace:
//!   author: ''
//!   current_window: FixtureManager
//!   creator_name: Q Light Controller Plus
//!   creator_version: 4.12.4
//! virtual_console:
//!   background_color: Default
//!   width: 1920
//!   height: 1080
//!   grand_master:
//!     channel_mode: Intensity
//!     value_mode: Reduce
//!     slider_mode: Normal
//! ```
//!
//! Relative paths are resolved against the directory of the configuration file. If
//! `groups_path` is `null` no channel groups are written.
//!
//! ### Fixture Format
//!
//! The fixture table is a CSV file with the header
//!
//! ```csv
//! Manufacturer,Model,Mode,Universe,Address,Channels
//! ```
//!
//! Universe and Address are 1-based, as printed on the rig plot. The universe is converted to
//! the 0-based index QLC+ uses; the address is written as given. Fixtures are numbered in file
//! order starting at `id_start`, and each fixture is named after its model.
//!
//! ### Universe Format
//!
//! ```json
//! {"universes": [
//!   {"name": "Universe 1", "id": 0,
//!    "output": {"plugin": "DMX USB", "line": "0", "parameters": {"Bus": "1"}}}
//! ]}
//! ```
//!
//! `output` may be omitted, in which case the universe has no output. Universe ids are written
//! exactly as given.
//!
//! ### Channel Groups
//!
//! `qxw_builder_cli -p config.yml groups` creates (or extends) the groups file from the fixture
//! table. Fill in the `category` column; every category other than `None` becomes a
//! `ChannelsGroup` containing all channels of its fixtures.
//!
//! ## Output
//!
//! ```text
//! workspace.qxw
//! Workspace - xmlns, CurrentWindow
//! |---- Creator
//! |---- Engine
//! |    |---- InputOutputMap
//! |    |    |---- Universe - Name, ID
//! |    |    |    |---- Output - Plugin, Line
//! |    |    |    |    |---- PluginParameters
//! |    |---- Fixture - Manufacturer, Model, Mode, ID, Name, Universe, Address, Channels
//! |    |---- ChannelsGroup - ID, Name, Value
//! |---- VirtualConsole
//! |---- SimpleDesk
//! ```
pub mod config;
pub mod device;
pub mod document;
pub mod error;
pub mod fixture;
pub mod groups;
pub mod process;
pub mod universe;
pub mod xml_writer;
