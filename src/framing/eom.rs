//! RFC 6242 §4.1 — end-of-message framing.
//!
//! Every message, including the hello exchange itself, is terminated by
//! the literal byte sequence `]]>]]>`. There is no length prefix; a
//! receiver must scan for the separator.

/// The end-of-message separator.
pub const SEPARATOR: &[u8] = b"]]>]]>";

/// Appends the EOM separator to `payload`, producing the bytes that
/// should be written to the transport for a single message.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(payload.len() + SEPARATOR.len());
    framed.extend_from_slice(payload);
    framed.extend_from_slice(SEPARATOR);
    framed
}

/// Searches `buf` for the separator and, if found, returns the length of
/// the message body that precedes it together with the total number of
/// bytes (body + separator) that should be drained from the buffer.
pub fn find_separator(buf: &[u8]) -> Option<(usize, usize)> {
    find_subslice(buf, SEPARATOR).map(|idx| (idx, idx + SEPARATOR.len()))
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_appends_separator() {
        let framed = encode(b"hello");
        assert_eq!(framed, b"hello]]>]]>");
    }

    #[test]
    fn find_separator_locates_message_boundary() {
        let buf = b"hello world]]>]]>leftover";
        let (body_len, consumed) = find_separator(buf).unwrap();
        assert_eq!(&buf[..body_len], b"hello world");
        assert_eq!(&buf[consumed..], b"leftover");
    }

    #[test]
    fn find_separator_absent_returns_none() {
        assert!(find_separator(b"no separator here").is_none());
    }

    #[test]
    fn find_separator_straddling_is_only_found_once_whole() {
        // Half the separator present; caller must accumulate more bytes.
        assert!(find_separator(b"partial]]>").is_none());
    }
}
