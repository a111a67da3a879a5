/*!
 * Portable Stat Record
 * Read-only snapshot of native metadata in a platform-independent layout
 */

use super::filetype::{classify, ResourceType, SocketKind};
use super::timestamp::normalize_timestamp;
use crate::core::limits::PORTABLE_STAT_SIZE;
use crate::core::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Native (seconds, nanoseconds) pair as reported by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeTimespec {
    pub seconds: i64,
    pub nanoseconds: i64,
}

impl NativeTimespec {
    pub const fn new(seconds: i64, nanoseconds: i64) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }

    #[inline]
    pub fn normalize(self) -> Timestamp {
        normalize_timestamp(self.seconds, self.nanoseconds)
    }
}

/// Host metadata before normalization
///
/// Field widths are the widest any supported host uses; conversion from a
/// native `stat` widens every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeMetadata {
    pub dev: u64,
    pub ino: u64,
    pub nlink: u64,
    pub size: i64,
    pub mode: u32,
    pub atime: NativeTimespec,
    pub mtime: NativeTimespec,
    pub ctime: NativeTimespec,
}

#[allow(clippy::unnecessary_cast)]
impl From<nix::sys::stat::FileStat> for NativeMetadata {
    fn from(st: nix::sys::stat::FileStat) -> Self {
        Self {
            dev: st.st_dev as u64,
            ino: st.st_ino as u64,
            nlink: st.st_nlink as u64,
            size: st.st_size as i64,
            mode: st.st_mode as u32,
            atime: NativeTimespec::new(st.st_atime as i64, st.st_atime_nsec as i64),
            mtime: NativeTimespec::new(st.st_mtime as i64, st.st_mtime_nsec as i64),
            ctime: NativeTimespec::new(st.st_ctime as i64, st.st_ctime_nsec as i64),
        }
    }
}

/// Portable stat record
///
/// Encoded field order (little-endian): dev, ino, nlink, size, atim, mtim,
/// ctim, then the resource type code in byte 56, zero padding to 64 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortableStat {
    pub dev: u64,
    pub ino: u64,
    pub nlink: u64,
    pub size: u64,
    pub atim: Timestamp,
    pub mtim: Timestamp,
    pub ctim: Timestamp,
    pub filetype: ResourceType,
}

impl PortableStat {
    /// Normalize native metadata
    ///
    /// `probe` reports the transport kind and is only consulted for sockets.
    pub fn from_native<E, F>(native: &NativeMetadata, probe: F) -> Self
    where
        F: FnOnce() -> Result<SocketKind, E>,
    {
        Self {
            dev: native.dev,
            ino: native.ino,
            nlink: native.nlink,
            size: native.size.max(0) as u64,
            atim: native.atime.normalize(),
            mtim: native.mtime.normalize(),
            ctim: native.ctime.normalize(),
            filetype: classify(native.mode, probe),
        }
    }

    /// Same snapshot with the resource type replaced
    pub fn with_filetype(self, filetype: ResourceType) -> Self {
        Self { filetype, ..self }
    }

    pub fn encode(&self) -> [u8; PORTABLE_STAT_SIZE] {
        let mut out = [0u8; PORTABLE_STAT_SIZE];
        let words = [
            self.dev, self.ino, self.nlink, self.size, self.atim, self.mtim, self.ctim,
        ];
        for (chunk, word) in out.chunks_exact_mut(8).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out[56] = self.filetype.code();
        out
    }

    /// Decode an encoded record; `None` on short input or an unknown type code
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < PORTABLE_STAT_SIZE {
            return None;
        }
        let word = |i: usize| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[i * 8..i * 8 + 8]);
            u64::from_le_bytes(buf)
        };
        Some(Self {
            dev: word(0),
            ino: word(1),
            nlink: word(2),
            size: word(3),
            atim: word(4),
            mtim: word(5),
            ctim: word(6),
            filetype: ResourceType::from_code(bytes[56])?,
        })
    }
}
