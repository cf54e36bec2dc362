use crate::models::CanonicalLabel;

/// One prompt per label, nudging the user toward the missing prop.
pub const SUGGESTIONS: &[(CanonicalLabel, &str)] = &[
    (CanonicalLabel::Books, "Show a book (feminist lit even better)"),
    (CanonicalLabel::Camera, "Show a camera"),
    (CanonicalLabel::Matcha, "Hold a green drink (matcha) in frame"),
    (CanonicalLabel::Plushie, "Bring a plushie into view"),
    (
        CanonicalLabel::WiredEarphones,
        "Wear wired earphones (visible in the upper frame)",
    ),
];

pub fn suggestion_for(label: CanonicalLabel) -> Option<&'static str> {
    SUGGESTIONS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, text)| *text)
}

/// Prompts for every label not in `present`, in label order.
pub fn suggest(present: &[CanonicalLabel]) -> Vec<String> {
    let mut missing: Vec<CanonicalLabel> = CanonicalLabel::ALL
        .into_iter()
        .filter(|label| !present.contains(label))
        .collect();
    missing.sort();

    missing
        .into_iter()
        .filter_map(suggestion_for)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_present_yields_all_prompts_in_order() {
        let all = suggest(&[]);
        assert_eq!(all.len(), 5);
        assert_eq!(all[0], "Show a book (feminist lit even better)");
        assert_eq!(all[4], "Wear wired earphones (visible in the upper frame)");
    }

    #[test]
    fn present_labels_are_skipped() {
        let s = suggest(&[CanonicalLabel::Matcha, CanonicalLabel::Books]);
        assert_eq!(
            s,
            vec![
                "Show a camera".to_string(),
                "Bring a plushie into view".to_string(),
                "Wear wired earphones (visible in the upper frame)".to_string(),
            ]
        );
        assert!(suggest(&CanonicalLabel::ALL).is_empty());
    }
}
