//! Natural interface-name ordering
//!
//! Numeric-aware comparison so "GigabitEthernet1/0/2" precedes
//! "GigabitEthernet1/0/10". Names split into alternating text and digit
//! runs; digit runs compare numerically, text runs lexically.

use std::cmp::Ordering;

/// One run of a name: text or a number
#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    Number(u64),
}

fn chunks(name: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let bytes = name.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let digit = bytes[start].is_ascii_digit();
        let mut end = start + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() == digit {
            end += 1;
        }
        let run = &name[start..end];
        if digit {
            // Runs longer than a u64 fall back to text comparison
            match run.parse::<u64>() {
                Ok(n) => out.push(Chunk::Number(n)),
                Err(_) => out.push(Chunk::Text(run)),
            }
        } else {
            out.push(Chunk::Text(run));
        }
        start = end;
    }
    out
}

/// Compare two names numerically-aware
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_chunks = chunks(a);
    let b_chunks = chunks(b);
    for (ca, cb) in a_chunks.iter().zip(b_chunks.iter()) {
        let ordering = match (ca, cb) {
            (Chunk::Number(na), Chunk::Number(nb)) => na.cmp(nb),
            (Chunk::Text(ta), Chunk::Text(tb)) => ta.cmp(tb),
            // Digits sort before text at the same position
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a_chunks.len().cmp(&b_chunks.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs_compare_numerically() {
        assert_eq!(
            natural_cmp("GigabitEthernet1/0/2", "GigabitEthernet1/0/10"),
            Ordering::Less
        );
        assert_eq!(natural_cmp("eth2", "eth10"), Ordering::Less);
        assert_eq!(natural_cmp("eth10", "eth2"), Ordering::Greater);
    }

    #[test]
    fn test_text_runs_compare_lexically() {
        assert_eq!(natural_cmp("eth0", "lo0"), Ordering::Less);
        assert_eq!(natural_cmp("xe-0/0/0", "xe-0/0/0"), Ordering::Equal);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("eth1", "eth1.100"), Ordering::Less);
    }

    #[test]
    fn test_full_sort() {
        let mut names = vec!["eth1/0/10", "eth1/0/2", "eth1/0/1", "mgmt0"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["eth1/0/1", "eth1/0/2", "eth1/0/10", "mgmt0"]);
    }
}
