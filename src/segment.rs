//! Splits long model output into Discord-sized pieces without breaking lines.

/// Default upper bound for a single segment, in characters.
///
/// Discord rejects messages above 2000 characters; the remaining room is left for the
/// marker and user mention prepended during delivery.
pub const MAX_SEGMENT_LENGTH: usize = 1900;

/// Splits `text` into ordered segments of at most `max_len` characters, cutting only at
/// line breaks.
///
/// Lines are accumulated greedily. A line that would push the running segment over
/// `max_len` (counting the joining `\n`) starts a new segment instead. A single line longer
/// than `max_len` is never cut and becomes its own oversized segment.
///
/// Empty lines are kept, so re-splitting every segment on `\n` and concatenating the results
/// gives back exactly the lines of `text`. Empty input produces no segments.
pub fn segment(text: &str, max_len: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    // Running segment and its length in characters; `None` until the first line lands.
    let mut current: Option<(String, usize)> = None;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        current = Some(match current.take() {
            None => (line.to_owned(), line_len),
            Some((buffer, len)) if len + line_len + 1 > max_len => {
                segments.push(buffer);
                (line.to_owned(), line_len)
            }
            Some((mut buffer, len)) => {
                buffer.push('\n');
                buffer.push_str(line);
                (buffer, len + line_len + 1)
            }
        });
    }

    segments.extend(current.map(|(buffer, _)| buffer));
    segments
}
