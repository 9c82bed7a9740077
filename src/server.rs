//! The server instance: listener, client table, keyspace, and the
//! single-threaded readiness loop driving them all.

use std::{process::id, sync::atomic::{AtomicBool, Ordering}, thread, time::Duration};
use libc::{SIGHUP, SIGINT, SIGPIPE, SIGTERM, SIG_IGN};
use crate::{
    client::Client,
    cmd::process_command,
    config::ServerConfig,
    dict::Dict,
    log::{log, LogLevel},
    net,
    proto::{parse_request, ParsedRequest},
};

pub const IO_BUF_LEN: usize = 4096;

static REDIS_VERSION: &str = "0.1.0";

/// The run flag. The signal handler flips it; the loop polls it at the
/// top of every iteration. An atomic instead of a global server pointer
/// keeps the handler trivial.
static RUNNING: AtomicBool = AtomicBool::new(false);

pub fn is_running() -> bool {
    RUNNING.load(Ordering::SeqCst)
}

pub fn set_running(on: bool) {
    RUNNING.store(on, Ordering::SeqCst);
}

extern "C" fn sigterm_handler(_sig: libc::c_int) {
    set_running(false);
}

/// SIGINT and SIGTERM request shutdown; SIGHUP and SIGPIPE are noise for
/// a socket server and get ignored.
pub fn setup_signal_handlers() {
    unsafe {
        libc::signal(SIGINT, sigterm_handler as extern "C" fn(libc::c_int) as libc::sighandler_t);
        libc::signal(SIGTERM, sigterm_handler as extern "C" fn(libc::c_int) as libc::sighandler_t);
        libc::signal(SIGHUP, SIG_IGN);
        libc::signal(SIGPIPE, SIG_IGN);
    }
}

pub struct Server {
    config: ServerConfig,
    fd: i32,
    db: Dict,
    clients: Vec<Client>,
    // Fields used only for stats
    stat_numconnections: u64,
    stat_numcommands: u64,
}

impl Server {
    pub fn new(config: ServerConfig) -> Server {
        Server {
            config,
            fd: -1,
            db: Dict::new(),
            clients: Vec::new(),
            stat_numconnections: 0,
            stat_numcommands: 0,
        }
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Bind the listening socket. Failure here is fatal for the caller.
    pub fn init(&mut self) -> Result<(), String> {
        let fd = net::tcp_server(self.config.port, &self.config.host)?;
        net::nonblock(fd)?;
        self.fd = fd;
        Ok(())
    }

    /// The readiness loop. Each iteration accepts whoever is waiting,
    /// drains and serves every connected client, flushes replies, then
    /// naps briefly so an idle server does not spin.
    pub fn run(&mut self) {
        set_running(true);
        log(LogLevel::Notice,
            &format!("The server is now ready to accept connections on port {}", self.config.port));

        while is_running() {
            self.accept_new_clients();
            self.service_clients();
            self.reap_closed_clients();
            thread::sleep(Duration::from_millis(1));
        }

        log(LogLevel::Notice, "Run flag cleared, draining and exiting");
        self.release();
    }

    pub fn stop(&self) {
        set_running(false);
    }

    fn accept_new_clients(&mut self) {
        loop {
            let (fd, ip, port) = match net::accept(self.fd) {
                Ok(Some(conn)) => conn,
                Ok(None) => break,
                Err(e) => {
                    log(LogLevel::Warning, &format!("Accepting client connection: {}", e));
                    break;
                },
            };

            // Over the cap the socket is closed right away
            if self.clients.len() >= self.config.max_clients {
                log(LogLevel::Verbose, "Max number of clients reached, closing connection");
                net::close_fd(fd);
                continue;
            }

            match Client::create(fd, ip, port) {
                Ok(client) => {
                    log(LogLevel::Verbose, &format!("Accepted {}:{}", ip, port));
                    self.clients.push(client);
                    self.stat_numconnections += 1;
                },
                Err(e) => {
                    log(LogLevel::Warning, &format!("Error allocating resources for the client: {}", e));
                    net::close_fd(fd);
                },
            }
        }
    }

    fn service_clients(&mut self) {
        let db = &mut self.db;
        let stat_numcommands = &mut self.stat_numcommands;

        for client in self.clients.iter_mut() {
            if client.should_close {
                continue;
            }
            read_from_client(client);

            // Run every complete request sitting in the buffer, in
            // arrival order
            while !client.should_close {
                match parse_request(&client.query_buf) {
                    Ok(ParsedRequest::Complete { argv, consumed }) => {
                        client.query_buf.drain(..consumed);
                        if !argv.is_empty() {
                            process_command(client, &argv, db);
                            *stat_numcommands += 1;
                        }
                    },
                    Ok(ParsedRequest::Incomplete) => break,
                    Err(e) => {
                        log(LogLevel::Verbose, &format!("Client protocol error: {}", e));
                        client.should_close = true;
                    },
                }
            }

            flush_to_client(client);
        }
    }

    fn reap_closed_clients(&mut self) {
        self.clients.retain(|client| {
            if client.should_close {
                log(LogLevel::Verbose, "Closing client connection");
                net::close_fd(client.fd());
                false
            } else {
                true
            }
        });
    }

    /// Drop every connection and the listener. The keyspace goes down
    /// with the instance.
    fn release(&mut self) {
        for client in self.clients.drain(..) {
            net::close_fd(client.fd());
        }
        if self.fd != -1 {
            net::close_fd(self.fd);
            self.fd = -1;
        }
        self.db.clear();
    }

    pub fn stat_numconnections(&self) -> u64 {
        self.stat_numconnections
    }

    pub fn stat_numcommands(&self) -> u64 {
        self.stat_numcommands
    }
}

/// Pull everything the socket has for us into the receive buffer.
fn read_from_client(client: &mut Client) {
    let mut buf = [0u8; IO_BUF_LEN];
    loop {
        match net::read(client.fd(), &mut buf) {
            Ok(Some(0)) => {
                log(LogLevel::Verbose, "Client closed connection");
                client.should_close = true;
                return;
            },
            Ok(Some(nread)) => {
                client.query_buf.extend_from_slice(&buf[..nread]);
                if nread < IO_BUF_LEN {
                    return;
                }
            },
            Ok(None) => return,     // nothing more right now
            Err(e) => {
                log(LogLevel::Verbose, &format!("Reading from client: {}", e));
                client.should_close = true;
                return;
            },
        }
    }
}

/// Push pending reply bytes out; whatever the socket refuses stays
/// buffered for the next loop iteration.
fn flush_to_client(client: &mut Client) {
    while client.has_pending_reply() {
        match net::write(client.fd(), &client.reply) {
            Ok(Some(0)) | Ok(None) => return,
            Ok(Some(nwritten)) => {
                client.reply.drain(..nwritten);
            },
            Err(e) => {
                log(LogLevel::Verbose, &format!("Error writing to client: {}", e));
                client.should_close = true;
                return;
            },
        }
    }
}

pub fn print_banner(port: u16) {
    log(LogLevel::Notice, &format!("rmedis {}", REDIS_VERSION));
    log(LogLevel::Notice, &format!("Port: {}, PID: {}", port, id()));
}
