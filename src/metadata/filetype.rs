/*!
 * Resource Type Classification
 * Maps native mode bits and socket kinds onto portable resource types
 */

use nix::libc;
use serde::{Deserialize, Serialize};
use std::fmt;

const S_IFMT: u32 = libc::S_IFMT as u32;
const S_IFBLK: u32 = libc::S_IFBLK as u32;
const S_IFCHR: u32 = libc::S_IFCHR as u32;
const S_IFDIR: u32 = libc::S_IFDIR as u32;
const S_IFIFO: u32 = libc::S_IFIFO as u32;
const S_IFLNK: u32 = libc::S_IFLNK as u32;
const S_IFREG: u32 = libc::S_IFREG as u32;
const S_IFSOCK: u32 = libc::S_IFSOCK as u32;

/// Portable resource type
///
/// Discriminants follow the WASI filetype numbering and are part of the
/// encoded stat record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ResourceType {
    Unspecified = 0,
    BlockDevice = 1,
    CharacterDevice = 2,
    Directory = 3,
    RegularFile = 4,
    SocketDatagram = 5,
    SocketStream = 6,
    SymbolicLink = 7,
}

impl ResourceType {
    /// Stable numeric code
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a numeric code, `None` for anything outside the enumeration
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Unspecified),
            1 => Some(Self::BlockDevice),
            2 => Some(Self::CharacterDevice),
            3 => Some(Self::Directory),
            4 => Some(Self::RegularFile),
            5 => Some(Self::SocketDatagram),
            6 => Some(Self::SocketStream),
            7 => Some(Self::SymbolicLink),
            _ => None,
        }
    }

    pub fn is_socket(self) -> bool {
        matches!(self, Self::SocketDatagram | Self::SocketStream)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unspecified => "unspecified",
            Self::BlockDevice => "block-device",
            Self::CharacterDevice => "character-device",
            Self::Directory => "directory",
            Self::RegularFile => "regular-file",
            Self::SocketDatagram => "socket-datagram",
            Self::SocketStream => "socket-stream",
            Self::SymbolicLink => "symbolic-link",
        };
        f.write_str(name)
    }
}

/// Transport kind reported by a native socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    Stream,
    Datagram,
    /// Any other native kind (raw, seqpacket, ...), carrying the raw value
    Other(i32),
}

impl SocketKind {
    /// Interpret a raw `SO_TYPE` value
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            libc::SOCK_STREAM => Self::Stream,
            libc::SOCK_DGRAM => Self::Datagram,
            other => Self::Other(other),
        }
    }
}

/// Classify a native resource from its mode bits
///
/// `probe` is only invoked for sockets. A failing probe or an unrecognized
/// socket kind degrades to [`ResourceType::Unspecified`]; it is never an error.
pub fn classify<E, F>(mode: u32, probe: F) -> ResourceType
where
    F: FnOnce() -> Result<SocketKind, E>,
{
    match mode & S_IFMT {
        S_IFBLK => ResourceType::BlockDevice,
        S_IFCHR => ResourceType::CharacterDevice,
        S_IFDIR => ResourceType::Directory,
        // Named pipes behave like a byte stream to the guest
        S_IFIFO => ResourceType::SocketStream,
        S_IFLNK => ResourceType::SymbolicLink,
        S_IFREG => ResourceType::RegularFile,
        S_IFSOCK => match probe() {
            Ok(SocketKind::Datagram) => ResourceType::SocketDatagram,
            Ok(SocketKind::Stream) => ResourceType::SocketStream,
            Ok(SocketKind::Other(_)) | Err(_) => ResourceType::Unspecified,
        },
        _ => ResourceType::Unspecified,
    }
}
