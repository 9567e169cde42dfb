/// HTTP Version.
///
/// Any `HTTP/<digit>.<digit>` protocol token is representable, versions compare by major then
/// minor number.
///
/// [httpwg](https://httpwg.org/specs/rfc9112.html#http.version)
#[derive(Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Version {
    major: u8,
    minor: u8,
}

impl Version {
    /// `HTTP/0.9`
    pub const HTTP_09: Version = Version::new(0, 9);

    /// `HTTP/1.0`
    pub const HTTP_10: Version = Version::new(1, 0);

    /// `HTTP/1.1`
    pub const HTTP_11: Version = Version::new(1, 1);

    /// `HTTP/2.0`
    pub const HTTP_2: Version = Version::new(2, 0);

    /// `HTTP/3.0`
    pub const HTTP_3: Version = Version::new(3, 0);

    #[inline]
    pub const fn new(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    /// Parse protocol token in the form of `HTTP/<digit>.<digit>`.
    pub const fn from_bytes(bytes: &[u8]) -> Option<Version> {
        match bytes {
            [b'H', b'T', b'T', b'P', b'/', major, b'.', minor]
                if major.is_ascii_digit() && minor.is_ascii_digit() =>
            {
                Some(Version::new(*major - b'0', *minor - b'0'))
            }
            _ => None,
        }
    }

    #[inline]
    pub const fn major(&self) -> u8 {
        self.major
    }

    #[inline]
    pub const fn minor(&self) -> u8 {
        self.minor
    }
}

impl Default for Version {
    #[inline]
    fn default() -> Version {
        Version::HTTP_11
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

impl std::fmt::Debug for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}
