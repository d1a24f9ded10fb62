//! @acp:module "Source Sanitizer"
//! @acp:summary "Blank out //line position directives before parsing"
//! @acp:domain analysis
//! @acp:layer parser
//!
//! Works on raw bytes without tokenizing. A `//line ` that starts a line
//! inside a string or block comment is blanked as well; a full scan to tell
//! those apart is not worth the cost for how rarely it happens.

/// Marker that starts a positional-redirect directive
pub const LINE_DIRECTIVE: &[u8] = b"//line ";

/// @acp:summary "Replace every line starting with `//line ` with spaces"
/// Length and line structure of `src` are preserved. Occurrences of the
/// marker that are not at the start of a line are left alone.
pub fn blank_line_directives(src: &mut [u8]) {
    let mut pos = 0;
    while let Some(offset) = find(&src[pos..], LINE_DIRECTIVE) {
        let mut i = pos + offset;
        if i == 0 || src[i - 1] == b'\n' {
            let start = i;
            while i < src.len() && src[i] != b'\n' {
                src[i] = b' ';
                i += 1;
            }
            tracing::trace!(offset = start, "blanked line directive");
        } else {
            i += LINE_DIRECTIVE.len();
        }
        pos = i;
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
