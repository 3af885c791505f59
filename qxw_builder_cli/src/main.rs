use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use libqxw_builder::config::Config;
use libqxw_builder::device::list_candidate_devices;
use libqxw_builder::groups::{ensure_groups_file, GroupsOutcome};
use libqxw_builder::process::process;

/// Route the library logging to a file
fn init_file_logging(path: &Path) -> Result<(), spdlog::Error> {
    let file_sink = Arc::new(
        spdlog::sink::FileSink::builder()
            .path(path)
            .formatter(Box::new(spdlog::formatter::PatternFormatter::new(
                spdlog::formatter::pattern!(
                    "[{date_short} {time_short}] - [{^{level}}] - {payload}{eol}"
                ),
            )))
            .truncate(true)
            .build()?,
    );
    let logger = Arc::new(
        spdlog::Logger::builder()
            .flush_level_filter(spdlog::LevelFilter::All)
            .sink(file_sink)
            .build()?,
    );
    spdlog::set_default_logger(logger);
    Ok(())
}

/// Load the config, resolving its relative paths against the config file's directory
fn load_config(config_path: &Path) -> Option<Config> {
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Stage read-config failed: {e}");
            return None;
        }
    };
    let base = config_path.parent().unwrap_or(Path::new(""));
    let config = config.resolve_relative_to(base);
    log::info!("Config successfully loaded.");
    log::info!("Fixtures Path: {}", config.fixtures_path.to_string_lossy());
    log::info!("Universes Path: {}", config.universes_path.to_string_lossy());
    if let Some(groups) = &config.groups_path {
        log::info!("Groups Path: {}", groups.to_string_lossy());
    }
    log::info!("Output Path: {}", config.output_path.to_string_lossy());
    log::info!("First Fixture ID: {}", config.id_start);
    Some(config)
}

fn build_cli() -> Command {
    Command::new("qxw_builder_cli")
        .about("Compile a fixture table and universe list into a QLC+ workspace")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .subcommand(
            Command::new("groups")
                .about("Create or extend the channel groups file from the fixture table"),
        )
        .subcommand(Command::new("devices").about("List serial ports which may be DMX interfaces"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .help("Write the library's detailed log to this file; progress messages still go to the terminal"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show debug messages"),
        )
}

fn main() -> ExitCode {
    // Create a cli
    let matches = build_cli().get_matches();

    // Initialize feedback
    let level = if matches.get_flag("verbose") {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    if let Err(e) = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("Could not create logging: {e}");
        return ExitCode::FAILURE;
    }
    if let Some(log_path) = matches.get_one::<String>("log") {
        if let Err(e) = init_file_logging(Path::new(log_path)) {
            log::error!("Could not create log file {log_path}: {e}");
            return ExitCode::FAILURE;
        }
    }
    if matches.get_flag("verbose") {
        spdlog::default_logger().set_level_filter(spdlog::LevelFilter::All);
    }

    if let Some(("devices", _)) = matches.subcommand() {
        for device in list_candidate_devices() {
            log::info!("{} [{}]", device.display_name(), device.hardware_id);
        }
        return ExitCode::SUCCESS;
    }

    // Parse the cli
    let Some(config_path) = matches.get_one::<String>("path").map(PathBuf::from) else {
        log::error!("A configuration file is required (--path)");
        return ExitCode::FAILURE;
    };

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        if let Err(e) = Config::default().write_config_file(&config_path) {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
        log::info!("Done.");
        return ExitCode::SUCCESS;
    }

    // Load our config
    let Some(config) = load_config(&config_path) else {
        return ExitCode::FAILURE;
    };

    if let Some(("groups", _)) = matches.subcommand() {
        let groups_path = config
            .groups_path
            .clone()
            .unwrap_or_else(|| config.fixtures_path.with_file_name("groups.csv"));
        return match ensure_groups_file(&config.fixtures_path, &groups_path) {
            Ok(GroupsOutcome::Created(n)) => {
                log::info!("Created {} with {n} fixtures.", groups_path.to_string_lossy());
                ExitCode::SUCCESS
            }
            Ok(GroupsOutcome::Updated(n)) => {
                log::info!("Added {n} fixtures to {}.", groups_path.to_string_lossy());
                ExitCode::SUCCESS
            }
            Ok(GroupsOutcome::UpToDate) => {
                log::info!("All fixtures are already in {}.", groups_path.to_string_lossy());
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Creating channel groups failed with error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match process(&config) {
        Ok(report) => {
            log::info!(
                "Successfully compiled {} universes, {} fixtures and {} channel groups!",
                report.n_universes,
                report.n_fixtures,
                report.n_channel_groups
            );
            log::info!("Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Compiling failed with error: {e}");
            ExitCode::FAILURE
        }
    }
}
