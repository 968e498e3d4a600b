//! # Telemetry Parser Module
//!
//! Parses orientation telemetry lines arriving from the IMU over serial.
//!
//! ## Line Format
//!
//! The sensor firmware prints one line per sample:
//!
//! ```text
//! Orientation: <heading>, <roll>, <pitch>
//! ```
//!
//! All three values are signed decimal degrees. Whitespace around numbers and
//! commas is tolerated, and anything after the third number is ignored. The
//! marker must appear at the start of the (trimmed) line.
//!
//! ## Field Order
//!
//! The wire order is **heading, roll, pitch**. This is the single place where
//! raw field positions are bound to semantic names; everything downstream goes
//! through [`OrientationSample`]'s named fields. Swapping two fields here would
//! silently break the axis mapping, so the order is fixed and tested rather
//! than inferred.
//!
//! | Position | Field | Axis use (default mapping) |
//! |----------|---------|-----------------------------|
//! | 1 | heading | stick X (heading-pitch mode) |
//! | 2 | roll | stick X (roll-pitch mode) |
//! | 3 | pitch | stick Y (both modes) |
//!
//! ## Failure Behavior
//!
//! Malformed lines (missing marker, wrong field count, non-numeric field) are
//! rejected wholesale: the parser returns `None` and never a partial sample.
//! Rejections are counted by the session loop, not surfaced as errors.

/// Marker text that identifies an orientation telemetry line.
pub const ORIENTATION_MARKER: &str = "Orientation:";

/// One orientation reading from the IMU, in degrees.
///
/// Immutable value produced from a single telemetry line. All three fields
/// parsed successfully or the sample does not exist.
///
/// # Examples
///
/// ```
/// use tiltstick::telemetry::parse_orientation_line;
///
/// let sample = parse_orientation_line("Orientation: 10.0, 2.0, -3.0").unwrap();
/// assert_eq!(sample.heading, 10.0);
/// assert_eq!(sample.roll, 2.0);
/// assert_eq!(sample.pitch, -3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    /// Heading (yaw) in degrees.
    pub heading: f64,
    /// Pitch in degrees.
    pub pitch: f64,
    /// Roll in degrees.
    pub roll: f64,
}

/// Parses one telemetry line into an [`OrientationSample`].
///
/// Tokenizes explicitly: trim the line, strip the `Orientation:` marker
/// anchored at the start, split the remainder on commas, trim each field and
/// parse it as a decimal. Content after the third number is ignored.
///
/// # Arguments
///
/// * `line` - One raw line of text from the transport (without the newline)
///
/// # Returns
///
/// `Some(OrientationSample)` for a well-formed line, `None` otherwise.
/// Malformed input is never an error; the caller simply skips the line.
///
/// # Examples
///
/// ```
/// use tiltstick::telemetry::parse_orientation_line;
///
/// // Tolerates whitespace and trailing content
/// assert!(parse_orientation_line("  Orientation: 1.5 ,-2 , 3.25 (filtered)").is_some());
///
/// // Rejected wholesale
/// assert!(parse_orientation_line("Orientation: 1.5, abc, 3.25").is_none());
/// assert!(parse_orientation_line("Orientation: 1.5, 3.25").is_none());
/// assert!(parse_orientation_line("Temp: 21.0").is_none());
/// assert!(parse_orientation_line("").is_none());
/// ```
#[must_use]
pub fn parse_orientation_line(line: &str) -> Option<OrientationSample> {
    let rest = line.trim().strip_prefix(ORIENTATION_MARKER)?;

    // Anything after the third number rides along in the third chunk (or a
    // fourth chunk if it contains commas); only the leading token of the
    // third chunk is the pitch value.
    let mut fields = rest.splitn(4, ',');

    let heading = parse_field(fields.next()?)?;
    let roll = parse_field(fields.next()?)?;
    let pitch = parse_trailing_field(fields.next()?)?;

    Some(OrientationSample {
        heading,
        pitch,
        roll,
    })
}

/// Parses a comma-delimited field as a decimal. The whole field (after
/// trimming) must be the number; junk between the number and the comma
/// rejects the line.
#[inline]
fn parse_field(raw: &str) -> Option<f64> {
    parse_finite(raw.trim())
}

/// Parses the final field, where trailing content after the number is
/// tolerated and discarded.
#[inline]
fn parse_trailing_field(raw: &str) -> Option<f64> {
    parse_finite(raw.trim().split_whitespace().next()?)
}

/// Accepts only finite values; the mapping engine is total for finite inputs
/// and "inf"/"NaN" never appear in real sensor output.
#[inline]
fn parse_finite(token: &str) -> Option<f64> {
    let value: f64 = token.parse().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_canonical_line() {
        let sample = parse_orientation_line("Orientation: 10.0, 2.0, -3.0").unwrap();
        assert_eq!(sample.heading, 10.0, "First field is heading");
        assert_eq!(sample.roll, 2.0, "Second field is roll");
        assert_eq!(sample.pitch, -3.0, "Third field is pitch");
    }

    #[test]
    fn test_parses_integer_values() {
        let sample = parse_orientation_line("Orientation: 180, -90, 45").unwrap();
        assert_eq!(sample.heading, 180.0);
        assert_eq!(sample.roll, -90.0);
        assert_eq!(sample.pitch, 45.0);
    }

    #[test]
    fn test_parses_signed_fractional_values() {
        let sample = parse_orientation_line("Orientation: -0.25, +1.5, -179.99").unwrap();
        assert_eq!(sample.heading, -0.25);
        assert_eq!(sample.roll, 1.5);
        assert_eq!(sample.pitch, -179.99);
    }

    #[test]
    fn test_tolerates_whitespace_around_fields() {
        let sample = parse_orientation_line("Orientation:   10.0 ,  2.0 ,   -3.0  ").unwrap();
        assert_eq!(sample.heading, 10.0);
        assert_eq!(sample.roll, 2.0);
        assert_eq!(sample.pitch, -3.0);
    }

    #[test]
    fn test_tolerates_leading_whitespace_on_line() {
        assert!(parse_orientation_line("  \tOrientation: 1, 2, 3").is_some());
    }

    #[test]
    fn test_ignores_trailing_content_after_third_number() {
        let sample = parse_orientation_line("Orientation: 1.0, 2.0, 3.0 cal=3").unwrap();
        assert_eq!(sample.pitch, 3.0);

        // Trailing content containing commas lands in the unread fourth chunk
        let sample = parse_orientation_line("Orientation: 1.0, 2.0, 3.0, 4.0, 5.0").unwrap();
        assert_eq!(sample.pitch, 3.0);
    }

    #[test]
    fn test_rejects_missing_marker() {
        assert!(parse_orientation_line("10.0, 2.0, -3.0").is_none());
        assert!(parse_orientation_line("Position: 10.0, 2.0, -3.0").is_none());
    }

    #[test]
    fn test_rejects_marker_not_at_start() {
        assert!(parse_orientation_line("log: Orientation: 1, 2, 3").is_none());
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        assert!(parse_orientation_line("Orientation: 10.0, 2.0").is_none());
        assert!(parse_orientation_line("Orientation: 10.0").is_none());
        assert!(parse_orientation_line("Orientation:").is_none());
    }

    #[test]
    fn test_rejects_non_numeric_field() {
        assert!(parse_orientation_line("Orientation: abc, 2.0, 3.0").is_none());
        assert!(parse_orientation_line("Orientation: 1.0, abc, 3.0").is_none());
        assert!(parse_orientation_line("Orientation: 1.0, 2.0, abc").is_none());
    }

    #[test]
    fn test_rejects_junk_between_number_and_comma() {
        // Only the final field tolerates trailing content
        assert!(parse_orientation_line("Orientation: 1.0 junk, 2.0, 3.0").is_none());
        assert!(parse_orientation_line("Orientation: 1.0, 2.0 junk, 3.0").is_none());
    }

    #[test]
    fn test_rejects_empty_and_blank_lines() {
        assert!(parse_orientation_line("").is_none());
        assert!(parse_orientation_line("   ").is_none());
        assert!(parse_orientation_line("\r").is_none());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        assert!(parse_orientation_line("Orientation: inf, 2.0, 3.0").is_none());
        assert!(parse_orientation_line("Orientation: 1.0, NaN, 3.0").is_none());
    }

    #[test]
    fn test_never_emits_partial_sample() {
        // Two good fields plus one bad one must reject the entire line
        assert!(parse_orientation_line("Orientation: 10.0, 2.0, x").is_none());
    }
}
