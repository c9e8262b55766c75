// src/table/dialect.rs

use std::collections::HashMap;

use crate::config::TableOptions;

/// Delimiter and quote byte of a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Dialect {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter,
            quote: b'"',
        }
    }
}

/// Share of lines that must agree on a delimiter count before it is trusted.
const MIN_CONSISTENCY: f64 = 0.9;

/// Guess the dialect from the leading `sample` of a file.
///
/// `truncated` says the sample stops mid-file, in which case the trailing
/// partial line is ignored. When `expected_fields` is given, the first
/// candidate that splits the first line into exactly that many fields wins.
/// Otherwise a delimiter wins when it occurs the same non-zero number of
/// times (outside quotes) on at least 90% of the sampled lines; ties go to
/// the earlier entry in `options.candidate_delimiters`.
/// Returns `None` when no candidate qualifies.
pub fn sniff(
    sample: &[u8],
    truncated: bool,
    expected_fields: Option<usize>,
    options: &TableOptions,
) -> Option<Dialect> {
    let text = String::from_utf8_lossy(sample);
    let mut lines: Vec<&str> = text.lines().collect();
    if truncated && lines.len() > 1 {
        lines.pop();
    }
    lines.retain(|l| !l.trim().is_empty());
    if lines.is_empty() {
        return None;
    }

    let quote = detect_quote(&lines, &options.candidate_bytes());

    let mut best: Option<(u8, f64)> = None;
    for delim in options.candidate_bytes() {
        let counts: Vec<usize> = lines
            .iter()
            .map(|l| count_outside_quotes(l, delim, quote))
            .collect();

        // 1) a first line that splits into the expected fields settles it
        if let Some(n) = expected_fields {
            if n > 1 && counts[0] == n - 1 {
                return Some(Dialect {
                    delimiter: delim,
                    quote,
                });
            }
        }

        // 2) most common per-line count, ignoring lines without the delimiter
        let mut freq: HashMap<usize, usize> = HashMap::new();
        for &c in counts.iter().filter(|&&c| c > 0) {
            *freq.entry(c).or_default() += 1;
        }
        let Some((_, hits)) = freq.into_iter().max_by_key(|&(count, hits)| (hits, count)) else {
            continue;
        };

        // 3) how consistently the lines agree on it
        let consistency = hits as f64 / lines.len() as f64;
        if consistency < MIN_CONSISTENCY {
            continue;
        }
        if best.map_or(true, |(_, score)| consistency > score) {
            best = Some((delim, consistency));
        }
    }

    best.map(|(delimiter, _)| Dialect { delimiter, quote })
}

/// `'` only when it is the sole character that wraps whole fields.
fn detect_quote(lines: &[&str], delimiters: &[u8]) -> u8 {
    let wraps = |q: u8| lines.iter().any(|l| quotes_a_field(l.as_bytes(), q, delimiters));
    if !wraps(b'"') && wraps(b'\'') {
        b'\''
    } else {
        b'"'
    }
}

/// A run opened by `q` at a field start (line start, or a delimiter plus
/// one optional space) and closed by `q` right before a delimiter or the
/// end of the line.
fn quotes_a_field(line: &[u8], q: u8, delimiters: &[u8]) -> bool {
    let at_field_start = |i: usize| match i {
        0 => true,
        1 => delimiters.contains(&line[0]) || line[0] == b' ',
        _ => {
            delimiters.contains(&line[i - 1])
                || (line[i - 1] == b' ' && delimiters.contains(&line[i - 2]))
        }
    };
    (0..line.len())
        .filter(|&i| line[i] == q && at_field_start(i))
        .any(|open| {
            line[open + 1..]
                .iter()
                .position(|&c| c == q)
                .map(|off| open + 1 + off)
                .is_some_and(|close| {
                    line.get(close + 1)
                        .map_or(true, |next| delimiters.contains(next))
                })
        })
}

fn count_outside_quotes(line: &str, delim: u8, quote: u8) -> usize {
    let mut inside = false;
    let mut count = 0;
    for &b in line.as_bytes() {
        if b == quote {
            inside = !inside;
        } else if b == delim && !inside {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sniff_str(s: &str) -> Option<Dialect> {
        sniff(s.as_bytes(), false, None, &TableOptions::default())
    }

    #[test]
    fn detects_common_delimiters() {
        let comma = "sprint-id(int),sprint-description(str)\n1,kickoff\n2,polish\n";
        assert_eq!(sniff_str(comma), Some(Dialect::with_delimiter(b',')));

        let semi = "sprint-id(int);sprint-description(str)\n1;kickoff, then demo\n";
        assert_eq!(sniff_str(semi).map(|d| d.delimiter), Some(b';'));

        let tab = "a\tb\tc\n1\t2\t3\n";
        assert_eq!(sniff_str(tab).map(|d| d.delimiter), Some(b'\t'));
    }

    #[test]
    fn quoted_delimiters_do_not_count() {
        let text = "story-id(int),task-id(int),task-description(str),initial-hrs(float)\n\
                    1,1,\"write, review; merge\",2.5\n\
                    1,2,\"deploy\",1\n";
        let d = sniff_str(text).expect("dialect");
        assert_eq!(d.delimiter, b',');
        assert_eq!(d.quote, b'"');
    }

    #[test]
    fn single_quotes_are_detected() {
        let text = "a,b\n1,'x, y'\n2,'z'\n";
        assert_eq!(sniff_str(text).map(|d| d.quote), Some(b'\''));
    }

    #[test]
    fn unbalanced_apostrophes_keep_double_quote() {
        let text = "a,b,c,d\n1,1,'tis the season,2\n1,2,don't stop,1\n";
        let d = sniff_str(text).expect("dialect");
        assert_eq!(d.delimiter, b',');
        assert_eq!(d.quote, b'"');

        // closed, but not at the end of the field
        let text = "a,b\n1,'x' and y\n";
        assert_eq!(sniff_str(text).map(|d| d.quote), Some(b'"'));
    }

    #[test]
    fn truncated_tail_is_ignored() {
        let text = "a,b,c\n1,2,3\n4";
        let opts = TableOptions::default();
        assert_eq!(
            sniff(text.as_bytes(), true, None, &opts).map(|d| d.delimiter),
            Some(b',')
        );
        assert_eq!(sniff(text.as_bytes(), false, None, &opts), None);
    }

    #[test]
    fn expected_width_tolerates_ragged_rows() {
        let text = "a;b;c\n1;2\n3\n4;5;6\n";
        let opts = TableOptions::default();
        assert_eq!(sniff(text.as_bytes(), false, None, &opts), None);
        assert_eq!(
            sniff(text.as_bytes(), false, Some(3), &opts).map(|d| d.delimiter),
            Some(b';')
        );
        // a header that never splits right falls back to the consistency rule
        assert_eq!(sniff(text.as_bytes(), false, Some(5), &opts), None);
    }

    #[test]
    fn fails_without_a_consistent_delimiter() {
        assert_eq!(sniff_str(""), None);
        assert_eq!(sniff_str("\n\n"), None);
        assert_eq!(sniff_str("just words here\nand more words\n"), None);
    }
}
