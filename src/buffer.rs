use std::borrow::Cow;
use std::fmt;

/// Memory-backed payload handed from one pipeline stage to the next.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the current content and take `data` instead.
    pub fn replace(&mut self, data: impl Into<Vec<u8>>) {
        self.bytes = data.into();
    }

    pub fn append(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content as text, with invalid UTF-8 replaced.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl From<&str> for Buffer {
    fn from(s: &str) -> Self {
        Self {
            bytes: s.as_bytes().to_vec(),
        }
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Buffer").field(&self.to_string_lossy()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_then_append() {
        let mut buf = Buffer::from("old");
        buf.replace("foo\n");
        buf.append(b"bar\n");
        assert_eq!(buf.to_string_lossy(), "foo\nbar\n");
    }

    #[test]
    fn test_lossy_view_of_invalid_utf8() {
        let buf = Buffer::from(vec![b'a', 0xff, b'b']);
        assert_eq!(buf.to_string_lossy(), "a\u{fffd}b");
    }
}
