use crate::models::TagVocabulary;
use std::cmp::Ordering;

/// Most used first; equal counts fall back to [`compare_names`].
pub fn rank(vocabulary: &TagVocabulary) -> Vec<String> {
    let mut tags: Vec<(&String, usize)> = vocabulary.iter().collect();
    tags.sort_by(|(a, count_a), (b, count_b)| {
        count_b.cmp(count_a).then_with(|| compare_names(a, b))
    });
    tags.into_iter().map(|(tag, _)| tag.clone()).collect()
}

/// Dictionary-like order: letters compare without accents or case first,
/// then unaccented before accented, then lowercase before uppercase. Code
/// point order breaks whatever is left, so distinct names never tie.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let (lower_a, lower_b) = (a.to_lowercase(), b.to_lowercase());
    fold(&lower_a)
        .cmp(fold(&lower_b))
        .then_with(|| lower_a.cmp(&lower_b))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Base letter for the accented Latin letters common in folder names.
fn fold(lowered: &str) -> impl Iterator<Item = char> + '_ {
    lowered.chars().map(|c| match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ì'..='ï' | 'ī' | 'į' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' => 's',
        'ť' => 't',
        'ù'..='ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    })
}
