use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{App, AppSettings, Arg, ArgMatches};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use termtime::config::{Config, ConfigFile};
use termtime::error::{Result, TermtimeError};
use termtime::report::{self, Source};
use termtime::{analysis, filter, history};

fn build_cli() -> App<'static, 'static> {
    App::new("termtime")
        .version(env!("CARGO_PKG_VERSION"))
        .about("When and what you run: statistics from your zsh or bash history")
        .setting(AppSettings::ColoredHelp)
        .arg(Arg::with_name("limit")
            .short("n")
            .long("limit")
            .value_name("N")
            .help("Number of top commands to show (0 shows all)")
            .takes_value(true)
            .allow_hyphen_values(true))
        .arg(Arg::with_name("ignore")
            .short("i")
            .long("ignore")
            .value_name("LIST")
            .help("Comma-separated list of commands to ignore (e.g. 'cd,ls,pwd')")
            .takes_value(true))
        .arg(Arg::with_name("shell")
            .short("s")
            .long("shell")
            .value_name("SHELL")
            .help("Preferred shell, overrides $SHELL when locating the history file")
            .takes_value(true))
        .arg(Arg::with_name("file")
            .short("f")
            .long("file")
            .value_name("FILE")
            .help("Use specific history file")
            .takes_value(true))
        .arg(Arg::with_name("grep")
            .short("g")
            .long("grep")
            .value_name("REGEX")
            .help("Only analyze commands matching this regular expression")
            .takes_value(true))
        .arg(Arg::with_name("json")
            .short("j")
            .long("json")
            .help("Output in JSON format")
            .conflicts_with("csv"))
        .arg(Arg::with_name("csv")
            .long("csv")
            .help("Output the top commands as CSV"))
        .arg(Arg::with_name("quiet")
            .short("q")
            .long("quiet")
            .help("Only log errors")
            .conflicts_with("verbose"))
        .arg(Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .help("Log each pipeline stage"))
        .after_help("EXAMPLES:\n  termtime                     # Analyze the detected history file\n  termtime -n 20 -i cd,ls      # Top 20, ignoring cd and ls\n  termtime -f ~/.zsh_history   # Analyze a specific file\n  termtime -g '^git ' --json   # Only git commands, as JSON\n\nSettings may also be stored in ~/.termtimerc (limit, shell, ignore, file, pattern).")
}

fn setup_logging(matches: &ArgMatches) {
    let level = if matches.is_present("verbose") {
        "debug"
    } else if matches.is_present("quiet") {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Defaults, then `~/.termtimerc`, then command-line flags.
fn build_config(matches: &ArgMatches) -> Result<Config> {
    build_config_from(ConfigFile::load(), matches)
}

fn build_config_from(file: ConfigFile, matches: &ArgMatches) -> Result<Config> {
    let mut config = Config::default().apply_file(file);

    if let Some(limit) = matches.value_of("limit") {
        config.top_limit = limit.trim().parse().map_err(|_| {
            TermtimeError::Config(format!("limit must be an integer, got '{}'", limit))
        })?;
    }
    if let Some(ignore) = matches.value_of("ignore") {
        config.add_ignore_commands(ignore);
    }
    if let Some(shell) = matches.value_of("shell") {
        config.shell_hint = Some(shell.to_string());
    }
    if let Some(file) = matches.value_of("file") {
        config.history_file = Some(PathBuf::from(file));
    }
    if let Some(pattern) = matches.value_of("grep") {
        config.pattern = Some(pattern.to_string());
    }

    config.validate()
}

fn run(matches: &ArgMatches) -> std::result::Result<(), Box<dyn Error>> {
    let config = build_config(matches)?;
    debug!("Configuration: {:?}", config);

    let (path, shell) = match &config.history_file {
        Some(path) => (path.clone(), history::determine_dialect(path)),
        None => history::locate(config.shell_hint.as_deref())?,
    };
    info!("Analyzing {} history at {}", shell, path.display());

    let records = history::parse_file(&path)?;
    if records.is_empty() {
        eprintln!("Warning: No command records found in history file");
        return Ok(());
    }

    let filtered =
        filter::filter_records(&records, &config.ignore_list, config.command_pattern());
    debug!("{} of {} records left after filtering", filtered.len(), records.len());
    if filtered.is_empty() {
        eprintln!("Warning: All commands filtered by ignore list");
        return Ok(());
    }

    let stats = analysis::analyze(&filtered);
    let source = Source {
        shell: shell.name(),
        path: &path,
    };
    let limit = config.top_limit();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if matches.is_present("json") {
        report::print_json_report(&mut out, &source, &stats, limit)?;
    } else if matches.is_present("csv") {
        report::print_csv_report(&mut out, &stats, limit)?;
    } else {
        report::print_text_report(&mut out, &source, &config.ignore_list, &stats, limit)?;
    }
    out.flush()?;

    Ok(())
}

fn main() {
    let matches = build_cli().get_matches();
    setup_logging(&matches);

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
