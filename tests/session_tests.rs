//! Session Tests
//!
//! End-to-end client/server exchanges over a loopback TCP connection.

use std::io::{BufReader, Cursor, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::JoinHandle;

use tinyftp::client::{ClientState, Outcome};
use tinyftp::network::{Connection, ConnectionState, ShutdownHandle, HELP_TEXT};
use tinyftp::protocol::{read_response, write_request, ErrorCode, Request, Response};
use tinyftp::store::{FileStore, MemoryStore};
use tinyftp::{Client, Config, FtpError, Server, Termination, UserCommand, WireConfig};

// =============================================================================
// Harness
// =============================================================================

struct TestServer {
    addr: SocketAddr,
    store: Arc<MemoryStore>,
    shutdown: ShutdownHandle,
    thread: JoinHandle<()>,
}

impl TestServer {
    fn start(termination: Termination) -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = Config::builder()
            .listen_addr("127.0.0.1:0")
            .termination(termination)
            .build();

        let mut server = Server::bind(config, Arc::clone(&store)).unwrap();
        let addr = server.local_addr();
        let shutdown = server.shutdown_handle();
        let thread = std::thread::spawn(move || {
            server.run().unwrap();
        });

        Self {
            addr,
            store,
            shutdown,
            thread,
        }
    }

    fn client(&self, termination: Termination) -> Client<Arc<MemoryStore>> {
        self.client_with_store(termination, Arc::new(MemoryStore::new()))
    }

    fn client_with_store(
        &self,
        termination: Termination,
        store: Arc<MemoryStore>,
    ) -> Client<Arc<MemoryStore>> {
        let config = Config::builder()
            .server_addr(self.addr.to_string())
            .termination(termination)
            .build();
        Client::connect(&config, store).unwrap()
    }

    /// Clients must be dropped first: the server only notices the shutdown
    /// flag between connections.
    fn stop(self) {
        self.shutdown.shutdown();
        self.thread.join().unwrap();
    }
}

fn sample_file(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_put_stores_identical_file() {
    let server = TestServer::start(Termination::DeclaredLength);
    let local = Arc::new(MemoryStore::new());
    let data = sample_file(2500);
    local.write("report.txt", &data).unwrap();

    let mut client = server.client_with_store(Termination::DeclaredLength, Arc::clone(&local));
    let outcome = client
        .execute(UserCommand::Put {
            path: "report.txt".to_string(),
        })
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Stored {
            name: "report.txt".to_string(),
            size: 2500
        }
    );
    assert_eq!(server.store.read("report.txt").unwrap(), data);
    assert_eq!(client.state(), ClientState::AwaitingCommand);

    drop(client);
    server.stop();
}

#[test]
fn test_put_is_acknowledged_with_single_zero_byte() {
    let server = TestServer::start(Termination::DeclaredLength);
    let wire = WireConfig::default();
    let mut stream = TcpStream::connect(server.addr).unwrap();

    let put = Request::Put {
        name: "raw.bin".to_string(),
        data: sample_file(100),
    };
    write_request(&mut stream, &put, &wire).unwrap();

    let mut ack = [0xFFu8; 1];
    stream.read_exact(&mut ack).unwrap();
    assert_eq!(ack, [0x00]);

    // Nothing else followed the ack: the next byte belongs to the Help answer
    write_request(&mut stream, &Request::Help, &wire).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    assert_eq!(
        read_response(&mut reader, &wire).unwrap(),
        Response::HelpData {
            text: HELP_TEXT.as_bytes().to_vec()
        }
    );

    drop(reader);
    drop(stream);
    server.stop();
}

#[test]
fn test_get_missing_file_reports_error() {
    let server = TestServer::start(Termination::DeclaredLength);
    let mut client = server.client(Termination::DeclaredLength);

    let err = client
        .execute(UserCommand::Get {
            name: "missing.txt".to_string(),
        })
        .unwrap_err();

    assert!(matches!(err, FtpError::Application(ErrorCode::Failed)));
    assert!(!err.is_fatal());
    assert!(!client.store().exists("missing.txt"));
    assert_eq!(client.state(), ClientState::AwaitingCommand);

    drop(client);
    server.stop();
}

#[test]
fn test_get_downloads_file() {
    let server = TestServer::start(Termination::DeclaredLength);
    let data = sample_file(5000);
    server.store.write("remote.bin", &data).unwrap();

    let mut client = server.client(Termination::DeclaredLength);
    let outcome = client
        .execute(UserCommand::Get {
            name: "remote.bin".to_string(),
        })
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Fetched {
            name: "remote.bin".to_string(),
            size: 5000
        }
    );
    assert_eq!(client.store().read("remote.bin").unwrap(), data);

    drop(client);
    server.stop();
}

#[test]
fn test_change_renames_file() {
    let server = TestServer::start(Termination::DeclaredLength);
    server.store.write("a.txt", b"contents").unwrap();

    let mut client = server.client(Termination::DeclaredLength);
    let outcome = client
        .execute(UserCommand::Change {
            old_name: "a.txt".to_string(),
            new_name: "b.txt".to_string(),
        })
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Renamed {
            old_name: "a.txt".to_string(),
            new_name: "b.txt".to_string()
        }
    );
    assert!(!server.store.exists("a.txt"));
    assert_eq!(server.store.read("b.txt").unwrap(), b"contents");

    drop(client);
    server.stop();
}

#[test]
fn test_change_missing_file_reports_error() {
    let server = TestServer::start(Termination::DeclaredLength);
    let mut client = server.client(Termination::DeclaredLength);

    let err = client
        .execute(UserCommand::Change {
            old_name: "nope.txt".to_string(),
            new_name: "b.txt".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, FtpError::Application(ErrorCode::Failed)));
    assert!(server.store.is_empty());

    drop(client);
    server.stop();
}

#[test]
fn test_help_returns_static_text() {
    let server = TestServer::start(Termination::DeclaredLength);
    let mut client = server.client(Termination::DeclaredLength);

    let outcome = client.execute(UserCommand::Help).unwrap();
    assert_eq!(outcome, Outcome::Help(HELP_TEXT.to_string()));

    drop(client);
    server.stop();
}

// =============================================================================
// Name Boundary Tests
// =============================================================================

#[test]
fn test_31_byte_name_transfers() {
    let server = TestServer::start(Termination::DeclaredLength);
    let local = Arc::new(MemoryStore::new());
    let name = "a".repeat(31);
    local.write(&name, b"boundary").unwrap();

    let mut client = server.client_with_store(Termination::DeclaredLength, local);
    client
        .execute(UserCommand::Put { path: name.clone() })
        .unwrap();
    assert_eq!(server.store.read(&name).unwrap(), b"boundary");

    drop(client);
    server.stop();
}

#[test]
fn test_32_byte_name_fails_before_io() {
    let server = TestServer::start(Termination::DeclaredLength);
    let local = Arc::new(MemoryStore::new());
    let name = "a".repeat(32);
    local.write(&name, b"too long").unwrap();

    let mut client = server.client_with_store(Termination::DeclaredLength, local);
    let err = client
        .execute(UserCommand::Put { path: name.clone() })
        .unwrap_err();
    assert!(matches!(err, FtpError::Encoding(_)));

    let err = client.execute(UserCommand::Get { name }).unwrap_err();
    assert!(matches!(err, FtpError::Encoding(_)));

    // The connection is still in sync: nothing was sent for either command
    assert_eq!(client.state(), ClientState::AwaitingCommand);
    assert!(matches!(
        client.execute(UserCommand::Help).unwrap(),
        Outcome::Help(_)
    ));
    assert!(server.store.is_empty());

    drop(client);
    server.stop();
}

#[test]
fn test_put_missing_local_file_sends_nothing() {
    let server = TestServer::start(Termination::DeclaredLength);
    let mut client = server.client(Termination::DeclaredLength);

    let err = client
        .execute(UserCommand::Put {
            path: "nowhere.txt".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, FtpError::FileNotFound(_)));
    assert!(matches!(
        client.execute(UserCommand::Help).unwrap(),
        Outcome::Help(_)
    ));

    drop(client);
    server.stop();
}

// =============================================================================
// Termination Policy Tests
// =============================================================================

/// File whose FileData frame ends in an all-zero chunk
fn zero_tailed_file(name: &str) -> Vec<u8> {
    let preamble = 1 + name.len() + 4;
    let mut data = vec![0x42; 1024 - preamble];
    data.extend_from_slice(&[0u8; 1024]);
    data
}

#[test]
fn test_declared_length_transfers_zero_tailed_file() {
    let server = TestServer::start(Termination::DeclaredLength);
    let data = zero_tailed_file("zeros.bin");
    server.store.write("zeros.bin", &data).unwrap();

    let mut client = server.client(Termination::DeclaredLength);
    client
        .execute(UserCommand::Get {
            name: "zeros.bin".to_string(),
        })
        .unwrap();
    assert_eq!(client.store().read("zeros.bin").unwrap(), data);

    drop(client);
    server.stop();
}

#[test]
fn test_legacy_sentinel_truncates_zero_tailed_file() {
    let server = TestServer::start(Termination::DeclaredLength);
    let data = zero_tailed_file("zeros.bin");
    server.store.write("zeros.bin", &data).unwrap();

    let mut client = server.client(Termination::Sentinel);
    let err = client
        .execute(UserCommand::Get {
            name: "zeros.bin".to_string(),
        })
        .unwrap_err();

    assert!(matches!(err, FtpError::Protocol(_)));
    assert_eq!(client.state(), ClientState::Closed);
    assert!(!client.store().exists("zeros.bin"));

    drop(client);
    server.stop();
}

// =============================================================================
// Connection Lifecycle Tests
// =============================================================================

#[test]
fn test_server_accepts_next_client_after_bye() {
    let server = TestServer::start(Termination::DeclaredLength);

    let mut first = server.client(Termination::DeclaredLength);
    assert_eq!(first.execute(UserCommand::Bye).unwrap(), Outcome::Closed);
    assert_eq!(first.state(), ClientState::Closed);
    assert!(matches!(
        first.execute(UserCommand::Help),
        Err(FtpError::Command(_))
    ));
    drop(first);

    let mut second = server.client(Termination::DeclaredLength);
    assert!(matches!(
        second.execute(UserCommand::Help).unwrap(),
        Outcome::Help(_)
    ));

    drop(second);
    server.stop();
}

#[test]
fn test_server_drops_connection_on_unknown_opcode() {
    let server = TestServer::start(Termination::DeclaredLength);

    let mut raw = TcpStream::connect(server.addr).unwrap();
    raw.write_all(&[0x80]).unwrap();
    // The server closes without answering; unread input may turn the FIN into a reset
    let mut buf = [0u8; 1];
    assert_eq!(raw.read(&mut buf).unwrap_or(0), 0);
    drop(raw);

    let mut client = server.client(Termination::DeclaredLength);
    assert!(matches!(
        client.execute(UserCommand::Help).unwrap(),
        Outcome::Help(_)
    ));

    drop(client);
    server.stop();
}

#[test]
fn test_connection_is_closed_after_client_leaves() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let mut raw = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (stream, _) = listener.accept().unwrap();

    let wire = WireConfig::default();
    write_request(&mut raw, &Request::Help, &wire).unwrap();
    raw.shutdown(std::net::Shutdown::Write).unwrap();

    let store = MemoryStore::new();
    let mut connection = Connection::new(stream, &store, wire).unwrap();
    assert_eq!(connection.state(), ConnectionState::AwaitingRequest);
    connection.handle().unwrap();
    assert_eq!(connection.state(), ConnectionState::Closed);

    let mut reader = BufReader::new(raw);
    assert!(matches!(
        read_response(&mut reader, &wire).unwrap(),
        Response::HelpData { .. }
    ));
}

#[test]
fn test_shutdown_after_server_stopped_does_not_panic() {
    let server = TestServer::start(Termination::DeclaredLength);
    let handle = server.shutdown.clone();
    server.stop();

    // Nothing listens any more, so the wake-up connect is refused
    handle.shutdown();
    handle.shutdown();
}

// =============================================================================
// Interactive Loop Tests
// =============================================================================

#[test]
fn test_interactive_session() {
    let server = TestServer::start(Termination::DeclaredLength);
    let local = Arc::new(MemoryStore::new());
    local.write("notes.txt", b"remember the milk").unwrap();
    let mut client = server.client_with_store(Termination::DeclaredLength, Arc::clone(&local));

    let mut input = Cursor::new(
        "put\nput notes.txt\n\nfetch notes.txt\nchange notes.txt todo.txt\nget todo.txt\nhelp\nbye\n",
    );
    let mut output = Vec::new();
    client.run(&mut input, &mut output).unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("wrong number of arguments for 'put'"));
    assert!(output.contains("put notes.txt (17 bytes): ok"));
    assert!(output.contains("unknown command 'fetch'"));
    assert!(output.contains("change notes.txt -> todo.txt: ok"));
    assert!(output.contains("get todo.txt (17 bytes): ok"));
    assert!(output.contains(HELP_TEXT));
    assert!(output.ends_with("bye\n"));

    assert_eq!(local.read("todo.txt").unwrap(), b"remember the milk");
    assert_eq!(server.store.names(), vec!["todo.txt".to_string()]);
    assert_eq!(client.state(), ClientState::Closed);

    drop(client);
    server.stop();
}

#[test]
fn test_interactive_session_ends_on_eof() {
    let server = TestServer::start(Termination::DeclaredLength);
    let mut client = server.client(Termination::DeclaredLength);

    let mut input = Cursor::new("get missing.txt\n");
    let mut output = Vec::new();
    client.run(&mut input, &mut output).unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("error: Server reported failure: request failed"));
    assert_eq!(client.state(), ClientState::Closed);

    drop(client);
    server.stop();
}

// =============================================================================
// Command Parsing Tests
// =============================================================================

#[test]
fn test_parse_commands() {
    assert_eq!(
        "put report.txt".parse::<UserCommand>().unwrap(),
        UserCommand::Put {
            path: "report.txt".to_string()
        }
    );
    assert_eq!(
        "  change  a.txt   b.txt ".parse::<UserCommand>().unwrap(),
        UserCommand::Change {
            old_name: "a.txt".to_string(),
            new_name: "b.txt".to_string()
        }
    );
    assert_eq!("HELP".parse::<UserCommand>().unwrap(), UserCommand::Help);
    assert_eq!("bye".parse::<UserCommand>().unwrap(), UserCommand::Bye);

    for bad in ["", "get", "get a b", "change a", "help me", "rm a"] {
        assert!(matches!(bad.parse::<UserCommand>(), Err(FtpError::Command(_))));
    }
}

#[test]
fn test_config_rejects_tiny_chunks() {
    let config = Config::builder().chunk_size(16).build();
    assert!(matches!(config.validate(), Err(FtpError::Config(_))));
    assert!(Config::default().validate().is_ok());
}
