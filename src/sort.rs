//! Slide ordering: by name, by modification time, or shuffled.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::discovery::Slide;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Name,
    /// Last-modified timestamp; slides without one sort as epoch 0.
    #[serde(alias = "dateModified")]
    Modified,
    Random,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Reorder `slides` in place. Stable for the deterministic keys, so ties
/// keep their input order; `direction` is ignored for `Random`.
pub fn sort_slides(slides: &mut [Slide], by: SortBy, direction: Direction) {
    match by {
        SortBy::Random => slides.shuffle(&mut rand::rng()),
        SortBy::Name => slides.sort_by(|a, b| directed(name_order(a, b), direction)),
        SortBy::Modified => slides.sort_by(|a, b| directed(modified_order(a, b), direction)),
    }
}

fn directed(ord: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => ord,
        Direction::Desc => ord.reverse(),
    }
}

fn name_order(a: &Slide, b: &Slide) -> Ordering {
    a.file.to_lowercase().cmp(&b.file.to_lowercase())
}

fn modified_order(a: &Slide, b: &Slide) -> Ordering {
    modified_key(a).cmp(&modified_key(b))
}

fn modified_key(slide: &Slide) -> DateTime<Utc> {
    slide.date_modified.unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slide(file: &str) -> Slide {
        Slide {
            file: file.to_string(),
            src: format!("https://x.example/{file}"),
            title: None,
            date_modified: None,
        }
    }

    fn dated(file: &str, ts: i64) -> Slide {
        Slide {
            date_modified: Some(Utc.timestamp_opt(ts, 0).unwrap()),
            ..slide(file)
        }
    }

    fn files(slides: &[Slide]) -> Vec<&str> {
        slides.iter().map(|s| s.file.as_str()).collect()
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut v = vec![slide("Beta.jpg"), slide("alpha.jpg"), slide("GAMMA.jpg")];
        sort_slides(&mut v, SortBy::Name, Direction::Asc);
        assert_eq!(files(&v), ["alpha.jpg", "Beta.jpg", "GAMMA.jpg"]);
    }

    #[test]
    fn desc_is_the_exact_reverse_of_asc() {
        let mut asc = vec![slide("c.jpg"), slide("A.jpg"), slide("b.jpg")];
        let mut desc = asc.clone();
        sort_slides(&mut asc, SortBy::Name, Direction::Asc);
        sort_slides(&mut desc, SortBy::Name, Direction::Desc);
        let mut reversed = files(&asc);
        reversed.reverse();
        assert_eq!(files(&desc), reversed);
    }

    #[test]
    fn deterministic_sorts_are_idempotent() {
        let mut v = vec![dated("a.jpg", 300), dated("b.jpg", 100), dated("c.jpg", 200)];
        sort_slides(&mut v, SortBy::Modified, Direction::Desc);
        let once = files(&v).into_iter().map(String::from).collect::<Vec<_>>();
        sort_slides(&mut v, SortBy::Modified, Direction::Desc);
        assert_eq!(files(&v), once);
    }

    #[test]
    fn missing_timestamps_sort_earliest() {
        let mut v = vec![dated("new.jpg", 1000), slide("undated.jpg"), dated("old.jpg", 10)];
        sort_slides(&mut v, SortBy::Modified, Direction::Asc);
        assert_eq!(files(&v), ["undated.jpg", "old.jpg", "new.jpg"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut v = vec![dated("z.jpg", 50), dated("a.jpg", 50), dated("m.jpg", 50)];
        sort_slides(&mut v, SortBy::Modified, Direction::Asc);
        assert_eq!(files(&v), ["z.jpg", "a.jpg", "m.jpg"]);
        sort_slides(&mut v, SortBy::Modified, Direction::Desc);
        assert_eq!(files(&v), ["z.jpg", "a.jpg", "m.jpg"]);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let input: Vec<Slide> = (0..32).map(|i| slide(&format!("{i:03}.jpg"))).collect();
        let mut v = input.clone();
        sort_slides(&mut v, SortBy::Random, Direction::Desc);
        assert_eq!(v.len(), input.len());
        let mut sorted_in = files(&input);
        let mut sorted_out = files(&v);
        sorted_in.sort();
        sorted_out.sort();
        assert_eq!(sorted_in, sorted_out);
    }

    #[test]
    fn legacy_sort_key_alias_deserializes() {
        let by: SortBy = serde_json::from_value(serde_json::json!("dateModified")).unwrap();
        assert_eq!(by, SortBy::Modified);
    }
}
