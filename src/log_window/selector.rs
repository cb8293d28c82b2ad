use chrono::{DateTime, Duration, Utc};

use super::parser::parse_line;
use super::{WindowMode, LOOK_BACK_MINUTES};

/// Collects latency samples from `text`, newest line first.
///
/// Precondition: lines are in non-decreasing timestamp order, as an access
/// log is written. In tail mode the scan therefore stops at the first
/// parseable line older than `now - LOOK_BACK_MINUTES`; unparseable lines
/// never stop it. Full-file mode takes every parseable line.
pub fn select_window(text: &str, mode: WindowMode, now: DateTime<Utc>) -> Vec<f64> {
    let cutoff = now - Duration::minutes(LOOK_BACK_MINUTES);
    let mut samples = Vec::new();

    for line in text.lines().rev() {
        let Some(record) = parse_line(line) else {
            continue;
        };

        if mode.is_time_bounded() && record.timestamp.with_timezone(&Utc) < cutoff {
            break;
        }
        samples.push(record.latency);
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_window::parser::LOG_TIME_ZONE;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        LOG_TIME_ZONE
            .with_ymd_and_hms(2024, 1, 5, 10, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn line_at(minutes_ago: i64, latency: &str) -> String {
        let at = now().with_timezone(&LOG_TIME_ZONE) - Duration::minutes(minutes_ago);
        format!(
            r#"1.2.3.4 - - [{}] "GET / HTTP/1.1" 200 {latency}"#,
            at.format("%d/%b/%Y:%H:%M:%S %z")
        )
    }

    fn log(lines: &[String]) -> String {
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    #[test]
    fn tail_mode_stops_at_first_old_record() {
        let text = log(&[
            line_at(20, "9.0"),
            line_at(10, "7.0"),
            line_at(1, "0.5"),
            line_at(0, "0.25"),
        ]);

        let samples = select_window(&text, WindowMode::Tail, now());
        assert_eq!(samples, vec![0.25, 0.5]);
    }

    #[test]
    fn old_record_hides_in_window_records_before_it() {
        // Out-of-order line: the scan trusts ordering and stops at the old one.
        let text = log(&[line_at(1, "3.0"), line_at(10, "7.0"), line_at(0, "0.25")]);

        let samples = select_window(&text, WindowMode::Tail, now());
        assert_eq!(samples, vec![0.25]);
    }

    #[test]
    fn unparseable_lines_do_not_stop_the_scan() {
        let text = log(&[
            line_at(2, "1.5"),
            r#"1.2.3.4 - - [05/Zzz/2024:09:59:00 +0300] "GET / HTTP/1.1" 200 8.0"#.to_owned(),
            line_at(1, "0.5"),
            "garbage".to_owned(),
        ]);

        let samples = select_window(&text, WindowMode::Tail, now());
        assert_eq!(samples, vec![0.5, 1.5]);
    }

    #[test]
    fn cutoff_is_exclusive_of_the_boundary() {
        let text = log(&[line_at(6, "2.0"), line_at(5, "1.0")]);

        let samples = select_window(&text, WindowMode::Tail, now());
        assert_eq!(samples, vec![1.0]);
    }

    #[test]
    fn full_file_mode_ignores_age() {
        let text = log(&[
            line_at(600, "4.0"),
            line_at(10, "3.0"),
            "not a record".to_owned(),
            line_at(0, "1.0"),
        ]);

        let samples = select_window(&text, WindowMode::FullFile, now());
        assert_eq!(samples, vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn full_file_mode_keeps_rolled_over_and_ambiguous_timestamps() {
        let text = log(&[
            r#"1.2.3.4 - - [26/Oct/2014:01:30:00 +0400] "GET / HTTP/1.1" 200 0.3"#.to_owned(),
            r#"1.2.3.4 - - [31/Feb/2024:10:00:00 +0300] "GET / HTTP/1.1" 200 0.2"#.to_owned(),
            line_at(0, "0.1"),
        ]);

        let samples = select_window(&text, WindowMode::FullFile, now());
        assert_eq!(samples, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn empty_text_yields_no_samples() {
        assert!(select_window("", WindowMode::Tail, now()).is_empty());
        assert!(select_window("\n\n", WindowMode::FullFile, now()).is_empty());
    }
}
