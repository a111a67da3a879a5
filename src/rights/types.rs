/*!
 * Rights Types
 * Base and inheriting capability masks with subset semantics
 */

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Individual descriptor rights (WASI preview-1 bit assignments)
    ///
    /// The bridge treats rights opaquely: bits outside the named set are
    /// retained and take part in subset checks like any other bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Rights: u64 {
        const FD_DATASYNC = 1 << 0;
        const FD_READ = 1 << 1;
        const FD_SEEK = 1 << 2;
        const FD_FDSTAT_SET_FLAGS = 1 << 3;
        const FD_SYNC = 1 << 4;
        const FD_TELL = 1 << 5;
        const FD_WRITE = 1 << 6;
        const FD_ADVISE = 1 << 7;
        const FD_ALLOCATE = 1 << 8;
        const PATH_CREATE_DIRECTORY = 1 << 9;
        const PATH_CREATE_FILE = 1 << 10;
        const PATH_LINK_SOURCE = 1 << 11;
        const PATH_LINK_TARGET = 1 << 12;
        const PATH_OPEN = 1 << 13;
        const FD_READDIR = 1 << 14;
        const PATH_READLINK = 1 << 15;
        const PATH_RENAME_SOURCE = 1 << 16;
        const PATH_RENAME_TARGET = 1 << 17;
        const PATH_FILESTAT_GET = 1 << 18;
        const PATH_FILESTAT_SET_SIZE = 1 << 19;
        const PATH_FILESTAT_SET_TIMES = 1 << 20;
        const FD_FILESTAT_GET = 1 << 21;
        const FD_FILESTAT_SET_SIZE = 1 << 22;
        const FD_FILESTAT_SET_TIMES = 1 << 23;
        const PATH_SYMLINK = 1 << 24;
        const PATH_REMOVE_DIRECTORY = 1 << 25;
        const PATH_UNLINK_FILE = 1 << 26;
        const POLL_FD_READWRITE = 1 << 27;
        const SOCK_SHUTDOWN = 1 << 28;
        const SOCK_ACCEPT = 1 << 29;
    }
}

impl Rights {
    /// Rights that make sense on a bound bus socket
    pub const BUS_SOCKET: Rights = Rights::FD_READ
        .union(Rights::FD_WRITE)
        .union(Rights::FD_FDSTAT_SET_FLAGS)
        .union(Rights::FD_FILESTAT_GET)
        .union(Rights::POLL_FD_READWRITE)
        .union(Rights::SOCK_SHUTDOWN);
}

/// Immutable pair of base and inheriting rights
///
/// `base` gates operations on the descriptor itself, `inheriting` caps what
/// descriptors derived from it may ever receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RightsSet {
    base: Rights,
    inheriting: Rights,
}

impl RightsSet {
    /// Every named right in both masks
    pub const ALL: RightsSet = RightsSet {
        base: Rights::all(),
        inheriting: Rights::all(),
    };

    /// No rights at all
    pub const NONE: RightsSet = RightsSet {
        base: Rights::empty(),
        inheriting: Rights::empty(),
    };

    /// Build a rights set from raw masks, keeping unknown bits
    #[inline]
    pub const fn new(base: u64, inheriting: u64) -> Self {
        Self {
            base: Rights::from_bits_retain(base),
            inheriting: Rights::from_bits_retain(inheriting),
        }
    }

    #[inline]
    pub const fn from_rights(base: Rights, inheriting: Rights) -> Self {
        Self { base, inheriting }
    }

    #[inline]
    pub const fn base(&self) -> Rights {
        self.base
    }

    #[inline]
    pub const fn inheriting(&self) -> Rights {
        self.inheriting
    }

    /// True iff every base and inheriting bit of `self` is also set in `other`
    #[inline]
    pub const fn is_subset_of(&self, other: &RightsSet) -> bool {
        other.base.contains(self.base) && other.inheriting.contains(self.inheriting)
    }

    /// Bits present in both sets
    #[inline]
    pub const fn intersect(&self, other: &RightsSet) -> RightsSet {
        RightsSet {
            base: self.base.intersection(other.base),
            inheriting: self.inheriting.intersection(other.inheriting),
        }
    }

    /// Rights a descriptor derived from this one may receive
    ///
    /// Returns `None` when `requested` asks for anything outside this set's
    /// inheriting mask.
    pub fn derive(&self, requested: RightsSet) -> Option<RightsSet> {
        let allowed = RightsSet::from_rights(self.inheriting, self.inheriting);
        requested.is_subset_of(&allowed).then_some(requested)
    }
}

impl Default for RightsSet {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for RightsSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "base={:#x} inheriting={:#x}",
            self.base.bits(),
            self.inheriting.bits()
        )
    }
}
