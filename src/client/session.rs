//! Client session
//!
//! Drives one connection from the client side: validate a command, send
//! its request, block for the response, and apply it to the local store.

use std::fmt;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream};

use crate::config::{Config, WireConfig};
use crate::error::{FtpError, Result};
use crate::protocol::frame::{check_name, check_new_name};
use crate::protocol::{read_response, write_request, Request, Response};
use crate::store::FileStore;
use super::UserCommand;

/// Where the client is in its request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// The server closed the connection
    Disconnected,
    /// Connected, no command issued yet
    Connected,
    AwaitingCommand,
    AwaitingResponse,
    Closed,
}

/// Result of a successfully executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server acknowledged an upload
    Stored { name: String, size: usize },

    /// The server acknowledged a rename
    Renamed { old_name: String, new_name: String },

    /// A file was downloaded into the local store
    Fetched { name: String, size: usize },

    /// Command listing sent by the server
    Help(String),

    /// The session was closed with `bye`
    Closed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Stored { name, size } => write!(f, "put {} ({} bytes): ok", name, size),
            Outcome::Renamed { old_name, new_name } => {
                write!(f, "change {} -> {}: ok", old_name, new_name)
            }
            Outcome::Fetched { name, size } => write!(f, "get {} ({} bytes): ok", name, size),
            Outcome::Help(text) => write!(f, "{}", text),
            Outcome::Closed => write!(f, "bye"),
        }
    }
}

/// Client side of a connection
pub struct Client<S: FileStore> {
    /// TCP stream reader (buffered so the response header can be peeked)
    reader: BufReader<TcpStream>,

    /// TCP stream writer
    writer: BufWriter<TcpStream>,

    /// Local files: source for put, destination for get
    store: S,

    wire: WireConfig,

    state: ClientState,

    /// Recoverable error waiting to be shown at the next prompt
    pending_error: Option<FtpError>,
}

impl<S: FileStore> Client<S> {
    /// Connect to `config.server_addr`
    pub fn connect(config: &Config, store: S) -> Result<Self> {
        config.validate()?;
        let stream = TcpStream::connect(&config.server_addr)?;
        tracing::info!("Connected to {}", config.server_addr);
        Self::from_stream(stream, config.wire, store)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, wire: WireConfig, store: S) -> Result<Self> {
        wire.validate()?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            store,
            wire,
            state: ClientState::Connected,
            pending_error: None,
        })
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Execute one command.
    ///
    /// Invalid input fails before anything is sent. Fatal errors (transport
    /// or undecodable frames) close the session.
    pub fn execute(&mut self, command: UserCommand) -> Result<Outcome> {
        if !matches!(self.state, ClientState::Connected | ClientState::AwaitingCommand) {
            return Err(FtpError::Command(format!(
                "cannot run '{}': session is {:?}",
                command.keyword(),
                self.state
            )));
        }

        let result = self.dispatch(command);
        if let Err(e) = &result {
            if e.is_disconnect() {
                tracing::warn!("Server went away: {}", e);
                self.state = ClientState::Disconnected;
            } else if e.is_fatal() {
                tracing::warn!("Closing session after fatal error: {}", e);
                self.state = ClientState::Closed;
            }
        }
        result
    }

    fn dispatch(&mut self, command: UserCommand) -> Result<Outcome> {
        match command {
            UserCommand::Put { path } => self.put(path),
            UserCommand::Get { name } => self.get(name),
            UserCommand::Change { old_name, new_name } => self.change(old_name, new_name),
            UserCommand::Help => self.help(),
            UserCommand::Bye => self.bye(),
        }
    }

    fn put(&mut self, path: String) -> Result<Outcome> {
        check_name(&path)?;
        if !self.store.exists(&path) {
            return Err(FtpError::FileNotFound(path));
        }
        // Files over 4 GiB are refused here, before any I/O
        self.store.size(&path)?;
        let data = self.store.read(&path)?;
        let size = data.len();
        let checksum = crc32fast::hash(&data);

        match self.exchange(&Request::Put { name: path.clone(), data })? {
            Response::Ack => {
                tracing::info!("Uploaded {} ({} bytes, crc32 {:08x})", path, size, checksum);
                Ok(Outcome::Stored { name: path, size })
            }
            other => Err(unexpected("put", &other)),
        }
    }

    fn get(&mut self, name: String) -> Result<Outcome> {
        check_name(&name)?;

        match self.exchange(&Request::Get { name })? {
            Response::FileData { name, data } => {
                self.store.write(&name, &data)?;
                tracing::info!(
                    "Downloaded {} ({} bytes, crc32 {:08x})",
                    name,
                    data.len(),
                    crc32fast::hash(&data)
                );
                Ok(Outcome::Fetched {
                    name,
                    size: data.len(),
                })
            }
            other => Err(unexpected("get", &other)),
        }
    }

    fn change(&mut self, old_name: String, new_name: String) -> Result<Outcome> {
        check_name(&old_name)?;
        check_new_name(&new_name)?;

        let request = Request::Change {
            old_name: old_name.clone(),
            new_name: new_name.clone(),
        };
        match self.exchange(&request)? {
            Response::Ack => Ok(Outcome::Renamed { old_name, new_name }),
            other => Err(unexpected("change", &other)),
        }
    }

    fn help(&mut self) -> Result<Outcome> {
        match self.exchange(&Request::Help)? {
            Response::HelpData { text } => {
                Ok(Outcome::Help(String::from_utf8_lossy(&text).into_owned()))
            }
            other => Err(unexpected("help", &other)),
        }
    }

    fn bye(&mut self) -> Result<Outcome> {
        self.writer.flush()?;
        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Write) {
            tracing::debug!("Shutdown after bye failed: {}", e);
        }
        self.state = ClientState::Closed;
        tracing::info!("Connection closed");
        Ok(Outcome::Closed)
    }

    /// Send a request and block for its response. `Error` responses become
    /// `FtpError::Application`.
    fn exchange(&mut self, request: &Request) -> Result<Response> {
        write_request(&mut self.writer, request, &self.wire)?;
        tracing::debug!("Sent {:?} request", request.kind());

        self.state = ClientState::AwaitingResponse;
        let response = read_response(&mut self.reader, &self.wire)?;
        self.state = ClientState::AwaitingCommand;
        tracing::trace!("Received {:?} response", response.kind());

        match response {
            Response::Error { code } => Err(FtpError::Application(code)),
            other => Ok(other),
        }
    }

    /// Interactive loop: prompt, read a command line, execute, report.
    ///
    /// Recoverable errors are shown at the next prompt. Returns on `bye`,
    /// end of input, or a fatal error.
    pub fn run<I: BufRead, O: Write>(&mut self, input: &mut I, output: &mut O) -> Result<()> {
        let mut line = String::new();

        loop {
            if let Some(err) = self.pending_error.take() {
                writeln!(output, "error: {}", err)?;
            }
            write!(output, "ftp> ")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                if matches!(self.state, ClientState::Connected | ClientState::AwaitingCommand) {
                    self.execute(UserCommand::Bye)?;
                }
                writeln!(output)?;
                return Ok(());
            }
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<UserCommand>().and_then(|cmd| self.execute(cmd)) {
                Ok(Outcome::Closed) => {
                    writeln!(output, "{}", Outcome::Closed)?;
                    return Ok(());
                }
                Ok(outcome) => writeln!(output, "{}", outcome)?,
                Err(e) if e.is_fatal() => {
                    writeln!(output, "error: {}", e)?;
                    return Err(e);
                }
                Err(e) => self.pending_error = Some(e),
            }
        }
    }
}

fn unexpected(command: &str, response: &Response) -> FtpError {
    FtpError::Protocol(format!(
        "unexpected {:?} response to {}",
        response.kind(),
        command
    ))
}
