//! Minimal scripted FTP server for connector integration tests.
//!
//! Speaks just enough of RFC 959/3659 for libcurl: login, CWD, TYPE, EPSV/PASV,
//! MLSD, NLST, SIZE, REST and RETR over passive data connections. Every command
//! received is recorded so tests can check which path the client took.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use gapfill_core::connector::ensure_supported;
use gapfill_core::site::Protocol;

#[derive(Debug, Clone, Default)]
pub struct FtpServerOptions {
    /// If false, MLSD is answered with 500 (pre-RFC 3659 servers).
    pub mlsd: bool,
    /// Files whose SIZE query is refused.
    pub hide_size: Vec<String>,
    /// If true, NLST on an empty directory answers `550 No files found`.
    pub nlst_550_when_empty: bool,
}

pub struct FtpServer {
    pub port: u16,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FtpServer {
    /// Command verbs received so far, in order, across all connections.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn received(&self, verb: &str) -> bool {
        self.commands().iter().any(|c| c == verb)
    }
}

/// Whether the linked libcurl can speak FTP at all; bundled curl-sys builds cannot.
pub fn ftp_enabled() -> bool {
    ensure_supported([Protocol::Ftp]).is_ok()
}

/// Starts a server in a background thread serving `files` from every directory.
/// The server runs until the process exits.
pub fn start(files: &[(&str, Vec<u8>)], opts: FtpServerOptions) -> FtpServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let files: Arc<BTreeMap<String, Vec<u8>>> = Arc::new(
        files
            .iter()
            .map(|(name, body)| (name.to_string(), body.clone()))
            .collect(),
    );
    let commands = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&commands);
    let opts = Arc::new(opts);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let files = Arc::clone(&files);
            let log = Arc::clone(&log);
            let opts = Arc::clone(&opts);
            thread::spawn(move || {
                let _ = handle(stream, &files, &opts, &log);
            });
        }
    });
    FtpServer { port, commands }
}

fn reply(stream: &mut TcpStream, line: &str) -> std::io::Result<()> {
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\r\n")
}

fn open_passive() -> std::io::Result<(TcpListener, u16)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

fn send_data(
    control: &mut TcpStream,
    passive: &mut Option<TcpListener>,
    opening: &str,
    body: &[u8],
) -> std::io::Result<()> {
    let Some(listener) = passive.take() else {
        return reply(control, "425 Use EPSV or PASV first");
    };
    reply(control, opening)?;
    let (mut data, _) = listener.accept()?;
    data.write_all(body)?;
    drop(data);
    reply(control, "226 Transfer complete")
}

fn handle(
    stream: TcpStream,
    files: &BTreeMap<String, Vec<u8>>,
    opts: &FtpServerOptions,
    log: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut control = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    let mut passive: Option<TcpListener> = None;
    reply(&mut control, "220 gapfill test server")?;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let trimmed = line.trim_end();
        let (verb, arg) = match trimmed.split_once(' ') {
            Some((v, a)) => (v.to_ascii_uppercase(), a.to_string()),
            None => (trimmed.to_ascii_uppercase(), String::new()),
        };
        log.lock().unwrap().push(verb.clone());

        match verb.as_str() {
            "USER" => reply(&mut control, "331 Password required")?,
            "PASS" => reply(&mut control, "230 Logged in")?,
            "PWD" => reply(&mut control, "257 \"/\" is the current directory")?,
            "CWD" => reply(&mut control, "250 Directory changed")?,
            "TYPE" => reply(&mut control, "200 Type set")?,
            "EPSV" => {
                let (listener, port) = open_passive()?;
                passive = Some(listener);
                reply(&mut control, &format!("229 Entering Extended Passive Mode (|||{}|)", port))?;
            }
            "PASV" => {
                let (listener, port) = open_passive()?;
                passive = Some(listener);
                reply(
                    &mut control,
                    &format!("227 Entering Passive Mode (127,0,0,1,{},{})", port >> 8, port & 0xff),
                )?;
            }
            "MLSD" if !opts.mlsd => reply(&mut control, "500 MLSD not understood")?,
            "MLSD" => {
                let mut body = String::from("type=cdir;perm=el; .\r\n");
                for (name, data) in files {
                    body.push_str(&format!("type=file;size={};perm=r; {}\r\n", data.len(), name));
                }
                send_data(&mut control, &mut passive, "150 Here comes the listing", body.as_bytes())?;
            }
            "NLST" if files.is_empty() && opts.nlst_550_when_empty => {
                passive = None;
                reply(&mut control, "550 No files found")?;
            }
            "NLST" => {
                let body: String = files.keys().map(|n| format!("{}\r\n", n)).collect();
                send_data(&mut control, &mut passive, "150 Here comes the listing", body.as_bytes())?;
            }
            "SIZE" => match files.get(&arg) {
                Some(data) if !opts.hide_size.contains(&arg) => {
                    reply(&mut control, &format!("213 {}", data.len()))?
                }
                Some(_) => reply(&mut control, "550 Could not get file size")?,
                None => reply(&mut control, "550 No such file")?,
            },
            "REST" => reply(&mut control, &format!("350 Restarting at {}", arg))?,
            "RETR" => match files.get(&arg) {
                Some(data) => send_data(
                    &mut control,
                    &mut passive,
                    &format!("150 Opening BINARY mode data connection ({} bytes)", data.len()),
                    data,
                )?,
                None => {
                    passive = None;
                    reply(&mut control, "550 No such file")?;
                }
            },
            "QUIT" => {
                reply(&mut control, "221 Bye")?;
                return Ok(());
            }
            _ => reply(&mut control, "502 Command not implemented")?,
        }
    }
}
