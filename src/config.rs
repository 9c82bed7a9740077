use std::{fs::File, io::{BufRead, BufReader}, process::exit};
use crate::{log::LogLevel, util::yes_no_to_bool};

const DEFAULT_PORT: u16 = 6379;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_MAX_CLIENTS: usize = 10000;

/// Server configuration.
///
/// `daemonize` is accepted so existing config files keep loading, but the
/// flag is otherwise unused.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_clients: usize,
    pub daemonize: bool,
    pub verbosity: LogLevel,
    pub log_file: String,
}

impl ServerConfig {
    pub fn new() -> ServerConfig {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            daemonize: false,
            verbosity: LogLevel::Verbose,
            log_file: String::new(),        // "" = log on standard output
        }
    }

    /// I agree, this is a very rudimental way to load a configuration...
    /// will improve later if the config gets more complex
    pub fn load(&mut self, filename: &str) {
        let file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Fatal error, can't open config file '{}': {}", filename, e);
                exit(1);
            },
        };

        fn load_err(err: &str, line: &str, line_num: i32) -> ! {
            eprintln!("*** FATAL CONFIG FILE ERROR ***");
            eprintln!("Reading the configuration file, at line {line_num}");
            eprintln!(">>> '{line}'");
            eprintln!("{err}");
            exit(1);
        }

        let mut line_num = 0;
        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => load_err("Directive parsing failed", "", line_num),
            };
            line_num += 1;
            let trimmed = line.trim();

            // Skip comments and blank lines
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }

            // Split into arguments
            let argv: Vec<&str> = trimmed.split_whitespace().collect();
            let argc = argv.len();

            // Execute config directives
            match &argv[0].to_ascii_lowercase()[..] {
                "bind" if argc == 2 => { self.host = argv[1].to_string(); },
                "port" if argc == 2 => {
                    match argv[1].parse::<u16>() {
                        Ok(p) if p >= 1 => { self.port = p; },
                        Ok(_) => { load_err("Invalid port", trimmed, line_num); },
                        Err(e) => { load_err(&e.to_string(), trimmed, line_num); },
                    }
                },
                "maxclients" if argc == 2 => {
                    match argv[1].parse::<usize>() {
                        Ok(m) if m >= 1 => { self.max_clients = m; },
                        Ok(_) => { load_err("Invalid max clients value", trimmed, line_num); },
                        Err(e) => { load_err(&e.to_string(), trimmed, line_num); },
                    }
                },
                "daemonize" if argc == 2 => {
                    match yes_no_to_bool(argv[1]) {
                        Ok(b) => { self.daemonize = b; },
                        Err(e) => { load_err(&e, trimmed, line_num); },
                    }
                },
                "loglevel" if argc == 2 => {
                    match &argv[1].to_ascii_lowercase()[..] {
                        "debug" => { self.verbosity = LogLevel::Debug; },
                        "verbose" => { self.verbosity = LogLevel::Verbose; },
                        "notice" => { self.verbosity = LogLevel::Notice; },
                        "warning" => { self.verbosity = LogLevel::Warning; },
                        _ => {
                            let err = "Invalid log level. Must be one of debug, verbose, notice or warning";
                            load_err(err, trimmed, line_num);
                        },
                    }
                },
                "logfile" if argc == 2 => {
                    match &argv[1].to_ascii_lowercase()[..] {
                        "stdout" => { self.log_file = String::new(); },
                        f if !f.is_empty() => { self.log_file = argv[1].to_string(); },
                        _ => { load_err("logfile can't be empty", trimmed, line_num); },
                    }
                },
                _ => {
                    let err = "Bad directive or wrong number of arguments";
                    load_err(err, trimmed, line_num);
                },
            }
        }
    }
}
