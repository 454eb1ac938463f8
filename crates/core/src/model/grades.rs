use serde::Deserialize;

/// Raw previous-grade input as it arrives from a sheet cell or JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GradeInput {
    /// A single cell delimited by commas, semicolons or newlines.
    Text(String),
    List(Vec<String>),
}

impl GradeInput {
    /// Trimmed, non-empty labels with duplicates removed (first occurrence wins).
    #[must_use]
    pub fn normalize(&self) -> Vec<String> {
        match self {
            Self::Text(text) => dedup_labels(text.split([',', ';', '\n'])),
            Self::List(items) => dedup_labels(items.iter().map(String::as_str)),
        }
    }
}

impl From<&str> for GradeInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Vec<String>> for GradeInput {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Shorthand for `GradeInput::from(raw).normalize()`.
#[must_use]
pub fn normalize_grades(raw: impl Into<GradeInput>) -> Vec<String> {
    raw.into().normalize()
}

pub(crate) fn dedup_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        let label = label.trim();
        if label.is_empty() || out.iter().any(|seen| seen == label) {
            continue;
        }
        out.push(label.to_owned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_empty_list() {
        assert!(normalize_grades("").is_empty());
        assert!(normalize_grades("  ;, \n").is_empty());
    }

    #[test]
    fn splits_every_delimiter() {
        assert_eq!(
            normalize_grades("Grade 1, Grade 2;Grade 3\nGrade 4"),
            vec!["Grade 1", "Grade 2", "Grade 3", "Grade 4"]
        );
    }

    #[test]
    fn removes_duplicates_keeping_first_occurrence() {
        assert_eq!(
            normalize_grades("Grade 5; Grade 4 ;Grade 5,Grade 4"),
            vec!["Grade 5", "Grade 4"]
        );
    }

    #[test]
    fn native_list_is_trimmed_and_deduplicated() {
        let input = vec![" Grade 2".to_owned(), String::new(), "Grade 2".to_owned(), "Grade 1 ".to_owned()];
        assert_eq!(normalize_grades(input), vec!["Grade 2", "Grade 1"]);
    }

    #[test]
    fn deserializes_either_shape() {
        let text: GradeInput = serde_json::from_str("\"Grade 1;Grade 2\"").unwrap();
        let list: GradeInput = serde_json::from_str(r#"["Grade 1", "Grade 2"]"#).unwrap();
        assert_eq!(text.normalize(), list.normalize());
    }

    mod proptest_grades {
        use super::*;
        use proptest::prelude::*;

        fn label() -> impl Strategy<Value = String> {
            prop_oneof![
                Just(String::new()),
                Just("  ".to_owned()),
                "Grade [1-4]",
                " Grade [1-4] ",
                "[A-Za-z ]{0,8}",
            ]
        }

        fn delimiter() -> impl Strategy<Value = &'static str> {
            prop_oneof![Just(","), Just(";"), Just("\n")]
        }

        /// First-occurrence order of the trimmed, non-empty labels.
        fn reference(labels: &[String]) -> Vec<String> {
            let mut out: Vec<String> = Vec::new();
            for label in labels.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
                if !out.iter().any(|seen| seen == label) {
                    out.push(label.to_owned());
                }
            }
            out
        }

        proptest! {
            #[test]
            fn list_input_is_trimmed_unique_and_ordered(labels in prop::collection::vec(label(), 0..12)) {
                let normalized = normalize_grades(labels.clone());
                prop_assert_eq!(&normalized, &reference(&labels));
                for grade in &normalized {
                    prop_assert!(!grade.is_empty());
                    prop_assert_eq!(grade.trim(), grade.as_str());
                }
            }

            #[test]
            fn delimited_text_matches_list_form(
                labels in prop::collection::vec(label(), 0..12),
                delimiters in prop::collection::vec(delimiter(), 12),
            ) {
                let mut text = String::new();
                for (i, label) in labels.iter().enumerate() {
                    if i > 0 {
                        text.push_str(delimiters[i]);
                    }
                    text.push_str(label);
                }
                prop_assert_eq!(normalize_grades(text.as_str()), normalize_grades(labels));
            }
        }
    }
}
