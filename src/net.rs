//! Basic TCP socket stuff made a bit less boring.

use std::{mem::{size_of, size_of_val, zeroed}, net::Ipv4Addr};
use libc::{bind, c_void, close, fcntl, listen, setsockopt, sockaddr, sockaddr_in, socket, AF_INET, EINTR, F_GETFL, F_SETFL, INADDR_ANY, IPPROTO_TCP, O_NONBLOCK, SOCK_STREAM, SOL_SOCKET, SO_REUSEADDR, TCP_NODELAY};
use crate::util::{error, error_str};

pub fn tcp_server(port: u16, bindaddr: &str) -> Result<i32, String> {
    let on = 1;
    let mut sa: sockaddr_in;

    unsafe {
        let sock = socket(AF_INET, SOCK_STREAM, 0);
        if sock == -1 {
            return Err(format!("socket: {}", error_str()));
        }
        if setsockopt(sock, SOL_SOCKET, SO_REUSEADDR, &on as *const _ as *const c_void, size_of::<i32>() as u32) == -1 {
            close(sock);
            return Err(format!("setsockopt SO_REUSEADDR: {}", error_str()));
        }
        sa = zeroed();
        #[cfg(target_os = "linux")]
        {
            sa.sin_family = AF_INET as u16;
        }
        #[cfg(target_os = "macos")]
        {
            sa.sin_family = AF_INET as u8;
        }
        sa.sin_port = port.to_be();     // Network byte order is big endian, or most significant byte first
        sa.sin_addr.s_addr = INADDR_ANY.to_be();
        if !bindaddr.is_empty() {
            match bindaddr.parse::<Ipv4Addr>() {
                Ok(addr) => {
                    sa.sin_addr.s_addr = u32::from(addr).to_be();
                },
                Err(e) => {
                    close(sock);
                    return Err(format!("Invalid bind address '{}': {}", bindaddr, e));
                },
            }
        }

        if bind(sock, &sa as *const _ as *const sockaddr, size_of::<sockaddr>() as u32) == -1 {
            close(sock);
            return Err(format!("bind: {}", error_str()));
        }

        if listen(sock, 511) == -1 {   // the magic 511 constant is from nginx
            close(sock);
            return Err(format!("listen: {}", error_str()));
        }
        Ok(sock)
    }
}

/// Accept one pending connection. `Ok(None)` means nothing was waiting on
/// the (non-blocking) listening socket.
pub fn accept(serversock: i32) -> Result<Option<(i32, Ipv4Addr, u16)>, String> {
    loop {
        unsafe {
            let mut sa: sockaddr_in = zeroed();
            let mut len = size_of::<sockaddr>() as u32;
            let fd = libc::accept(serversock, &mut sa as *mut _ as *mut sockaddr, &mut len);
            if fd == -1 {
                let errno = error();
                if errno == EINTR {
                    continue;
                } else if errno == libc::EAGAIN || errno == libc::EWOULDBLOCK {
                    return Ok(None);
                } else {
                    return Err(format!("accept: {}", error_str()));
                }
            }

            let c_ip = Ipv4Addr::from(u32::from_be(sa.sin_addr.s_addr));
            let c_port = u16::from_be(sa.sin_port);
            return Ok(Some((fd, c_ip, c_port)));
        }
    }
}

pub fn nonblock(fd: i32) -> Result<(), String> {
    // Set the socket nonblocking.
    // Note that fcntl(2) for F_GETFL and F_SETFL can't be
    // interrupted by a signal.
    unsafe {
        let flag = fcntl(fd, F_GETFL);
        if flag == -1 {
            return Err(format!("fcntl(F_GETFL): {}", error_str()));
        }
        if fcntl(fd, F_SETFL, flag | O_NONBLOCK) == -1 {
            return Err(format!("fcntl(F_SETFL,O_NONBLOCK): {}", error_str()));
        }
    }
    Ok(())
}

pub fn tcp_no_delay(fd: i32) -> Result<(), String> {
    let yes = 1;
    unsafe {
        if setsockopt(fd, IPPROTO_TCP, TCP_NODELAY, &yes as *const _ as *const c_void, size_of_val(&yes) as u32) == -1 {
            return Err(format!("setsockopt TCP_NODELAY: {}", error_str()));
        }
    }
    Ok(())
}

/// Read what is available on a non-blocking socket into `buf`.
///
/// `Ok(Some(0))` is end of stream; `Ok(None)` means the read would block.
pub fn read(fd: i32, buf: &mut [u8]) -> Result<Option<usize>, String> {
    unsafe {
        let nread = libc::read(fd, buf.as_mut_ptr() as *mut c_void, buf.len());
        if nread == -1 {
            let errno = error();
            if errno == libc::EAGAIN || errno == libc::EWOULDBLOCK {
                return Ok(None);
            }
            if errno == EINTR {
                return Ok(None);
            }
            return Err(format!("read: {}", error_str()));
        }
        Ok(Some(nread as usize))
    }
}

/// Write as much of `buf` as the socket accepts; `Ok(None)` when the
/// write would block before any byte went out.
pub fn write(fd: i32, buf: &[u8]) -> Result<Option<usize>, String> {
    unsafe {
        let nwritten = libc::write(fd, buf.as_ptr() as *const c_void, buf.len());
        if nwritten == -1 {
            let errno = error();
            if errno == libc::EAGAIN || errno == libc::EWOULDBLOCK {
                return Ok(None);
            }
            if errno == EINTR {
                return Ok(None);
            }
            return Err(format!("write: {}", error_str()));
        }
        Ok(Some(nwritten as usize))
    }
}

pub fn close_fd(fd: i32) {
    unsafe { close(fd); }   // May be already closed, just ignore errors
}
