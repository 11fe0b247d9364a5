//! The kvs-cli executable supports the following command line arguments:
//!
//! `kvs-cli [--host HOST] [--port PORT] [--socket PATH] [--multiline]`
//!
//!     Start an interactive session with the server at HOST:PORT (127.0.0.1:12345 by default),
//!     or at the unix socket PATH if given. The socket wins when both are given.
//!     --multiline enables multi-line editing of long command lines.
//!
//! `kvs-cli --keycodes`
//!
//!     Print the codes of the keys pressed until `quit` is typed, then exit.
//!
//! Any other argument prints the usage and exits with status 1.

use std::io;
use std::path::PathBuf;
use std::process::exit;
use clap::{crate_version, App, Arg, ArgMatches, ErrorKind};
use kvs_cli::config::{DEFAULT_HOST, DEFAULT_PORT, HISTORY_FILE};
use kvs_cli::{
    keycodes, ConnectFlags, History, Repl, Result, RustylineEditor, Session, SessionConfig,
    SocketTransport,
};
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "[--multiline] [--keycodes] [--host HOST] [--port PORT] [--socket PATH]";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    multiline: bool,
    keycodes: bool,
    config: SessionConfig,
}

impl Opt {
    /// validates the matched arguments
    /// returns `None` if the port is not a valid TCP port
    fn build(matches: &ArgMatches) -> Option<Opt> {
        let host = matches.value_of("host").unwrap_or(DEFAULT_HOST);
        let port = match matches.value_of("port") {
            Some(port) => port.parse::<u16>().ok()?,
            None => DEFAULT_PORT,
        };
        let socket = matches.value_of("socket").map(PathBuf::from);

        Some(Opt {
            multiline: matches.is_present("multiline"),
            keycodes: matches.is_present("keycodes"),
            config: SessionConfig::new(host, port, socket),
        })
    }
}

fn main() -> Result<()> {
    // configure a subscriber that will log messages to STDERR
    subscriber_config();

    let prgname = std::env::args().next().unwrap_or_else(|| "kvs-cli".to_string());
    let app = App::new("kvs-cli")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("an interactive key-value store client")
        .arg(Arg::with_name("multiline")
            .long("multiline")
            .help("enables multi-line editing"))
        .arg(Arg::with_name("keycodes")
            .long("keycodes")
            .help("prints the codes of pressed keys and exits"))
        .arg(Arg::with_name("host")
            .long("host")
            .value_name("HOST")
            .takes_value(true)
            .help("the host of the server to connect to"))
        .arg(Arg::with_name("port")
            .long("port")
            .value_name("PORT")
            .takes_value(true)
            .help("the port of the server to connect to"))
        .arg(Arg::with_name("socket")
            .long("socket")
            .value_name("PATH")
            .takes_value(true)
            .help("the unix socket of the server, overrides host and port"));

    let matches = match app.get_matches_safe() {
        Ok(matches) => matches,
        Err(e) if e.kind == ErrorKind::HelpDisplayed || e.kind == ErrorKind::VersionDisplayed => {
            e.exit()
        }
        Err(_) => usage(&prgname),
    };
    let opt = match Opt::build(&matches) {
        Some(opt) => opt,
        None => usage(&prgname),
    };

    if opt.keycodes {
        keycodes::print_key_codes()?;
        return Ok(());
    }
    if opt.multiline {
        println!("Multi-line mode enabled.");
    }

    run(opt)
}

/// connects to the configured server and runs the REPL until the user quits
fn run(opt: Opt) -> Result<()> {
    let mut session = Session::new(opt.config, SocketTransport);
    // the prompt tells whether this worked
    let _ = session.connect(ConnectFlags::QUIET, &mut io::stderr());

    let history = History::load(HISTORY_FILE).unwrap_or_else(|e| {
        warn!("could not load history from {}: {}", HISTORY_FILE, e);
        History::in_memory()
    });
    let editor = RustylineEditor::new()?;

    let mut repl = Repl::new(session, editor, history);
    repl.run(&mut io::stdout(), &mut io::stderr())
}

fn usage(prgname: &str) -> ! {
    eprintln!("Usage: {} {}", prgname, USAGE);
    exit(1);
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config() {
    // quiet unless RUST_LOG asks for more, the terminal belongs to the REPL
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting tracing default subscriber failed: {}", e);
    }
}
