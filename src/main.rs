use std::{env, process::exit};
use rmedis::{
    config::ServerConfig,
    log::{configure_logger, log, LogLevel},
    server::{print_banner, setup_signal_handlers, Server},
};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut config = ServerConfig::new();
    if args.len() == 2 {
        config.load(&args[1]);
    } else if args.len() > 2 {
        eprintln!("Usage: ./rmedis-server [/path/to/rmedis.conf]");
        exit(1);
    } else {
        log(LogLevel::Warning, "Warning: no config file specified, using the default config. In order to specify a config file use 'rmedis-server /path/to/rmedis.conf'");
    }
    configure_logger(config.verbosity, &config.log_file);

    setup_signal_handlers();

    let mut server = Server::new(config);
    if let Err(e) = server.init() {
        log(LogLevel::Warning, &format!("Opening TCP port: {}", e));
        exit(1);
    }
    print_banner(server.port());

    server.run();
}
