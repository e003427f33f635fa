/// Canonical form of an administrative name: trimmed, single-spaced,
/// diacritics removed, uppercase. "  Cañete " and "CANETE" compare equal.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.chars().map(fold_char).collect::<String>().to_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fold a Spanish accented letter to its base letter.
fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}
