//! Infrastructure implementation of the `SshProbe` port using libssh2.
//!
//! Each probe opens a fresh TCP connection, runs the SSH handshake and
//! authenticates, then disconnects. Transport errors are mapped into
//! [`SshFailure`] from their `io::ErrorKind` or libssh2 error code; the
//! message is only consulted when neither is recognised.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use ssh2::{ErrorCode, Session};

use crate::application::ports::SshProbe;
use crate::domain::{AuthMode, SshFailure, SshTarget};

// libssh2 session error codes (libssh2.h).
const LIBSSH2_ERROR_BANNER_RECV: i32 = -2;
const LIBSSH2_ERROR_SOCKET_SEND: i32 = -7;
const LIBSSH2_ERROR_TIMEOUT: i32 = -9;
const LIBSSH2_ERROR_SOCKET_DISCONNECT: i32 = -13;
const LIBSSH2_ERROR_FILE: i32 = -16;
const LIBSSH2_ERROR_AUTHENTICATION_FAILED: i32 = -18;
const LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED: i32 = -19;
const LIBSSH2_ERROR_SOCKET_TIMEOUT: i32 = -30;
const LIBSSH2_ERROR_EAGAIN: i32 = -37;
const LIBSSH2_ERROR_SOCKET_RECV: i32 = -43;

/// Production `SshProbe` backed by the `ssh2` crate.
pub struct Ssh2Probe;

impl SshProbe for Ssh2Probe {
    async fn probe(&self, target: &SshTarget, connect_timeout: Duration) -> Result<(), SshFailure> {
        let target = target.clone();
        tokio::task::spawn_blocking(move || try_login(&target, connect_timeout))
            .await
            .map_err(|e| SshFailure::Fatal(format!("SSH probe task failed: {e}")))?
    }
}

fn try_login(target: &SshTarget, timeout: Duration) -> Result<(), SshFailure> {
    let addr = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(|e| classify_io_error(&e))?
        .next()
        .ok_or_else(|| SshFailure::Fatal(format!("cannot resolve {}", target.host)))?;

    tracing::debug!(host = %target.host, port = target.port, "ssh probe");
    let tcp = TcpStream::connect_timeout(&addr, timeout).map_err(|e| classify_io_error(&e))?;
    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session = Session::new().map_err(|e| classify_ssh2_error(&e))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session.handshake().map_err(|e| classify_ssh2_error(&e))?;

    let username = target.identity.username.as_str();
    match &target.identity.auth {
        AuthMode::Key { file } => session.userauth_pubkey_file(username, None, file, None),
        AuthMode::Password { password } => session.userauth_password(username, password),
    }
    .map_err(|e| classify_ssh2_error(&e))?;

    if !session.authenticated() {
        return Err(SshFailure::AuthenticationFailed);
    }
    let _ = session.disconnect(None, "paws readiness check", None);
    Ok(())
}

/// Classify a TCP-level error.
#[must_use]
pub fn classify_io_error(err: &io::Error) -> SshFailure {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => SshFailure::Timeout,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable => SshFailure::PortUnreachable,
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => SshFailure::ConnectionReset,
        _ => SshFailure::from_message(&err.to_string()),
    }
}

fn classify_ssh2_error(err: &ssh2::Error) -> SshFailure {
    match err.code() {
        ErrorCode::Session(code) => classify_session_code(code, err.message()),
        ErrorCode::SFTP(_) => SshFailure::from_message(err.message()),
    }
}

/// Classify a libssh2 session error code, falling back to its message.
#[must_use]
pub fn classify_session_code(code: i32, message: &str) -> SshFailure {
    match code {
        LIBSSH2_ERROR_TIMEOUT | LIBSSH2_ERROR_SOCKET_TIMEOUT | LIBSSH2_ERROR_EAGAIN => {
            SshFailure::Timeout
        }
        LIBSSH2_ERROR_AUTHENTICATION_FAILED | LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED => {
            SshFailure::AuthenticationFailed
        }
        LIBSSH2_ERROR_BANNER_RECV
        | LIBSSH2_ERROR_SOCKET_SEND
        | LIBSSH2_ERROR_SOCKET_DISCONNECT
        | LIBSSH2_ERROR_SOCKET_RECV => SshFailure::ConnectionReset,
        LIBSSH2_ERROR_FILE => SshFailure::Fatal(format!("cannot use key file: {message}")),
        _ => SshFailure::from_message(message),
    }
}
