//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Canonical form used for every answer/option/guess comparison:
/// trim, lowercase, strip diacritics, collapse internal whitespace.
pub fn normalize_answer(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut last_was_space = true; // leading whitespace is dropped
  for ch in s.trim().to_lowercase().chars() {
    if ch.is_whitespace() {
      if !last_was_space {
        out.push(' ');
        last_was_space = true;
      }
      continue;
    }
    out.push(fold_diacritic(ch));
    last_was_space = false;
  }
  while out.ends_with(' ') {
    out.pop();
  }
  out
}

/// A tiny, hand-curated diacritics fold covering the Latin names in the
/// corpus. Characters outside the table pass through unchanged.
pub fn fold_diacritic(ch: char) -> char {
  match ch {
    'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' | 'æ' => 'a',
    'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
    'í' | 'ì' | 'î' | 'ï' | 'ī' | 'ı' => 'i',
    'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' | 'ő' | 'œ' => 'o',
    'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
    'ç' | 'ć' | 'č' => 'c',
    'ñ' | 'ń' | 'ň' => 'n',
    'ý' | 'ÿ' => 'y',
    'š' | 'ś' | 'ş' | 'ș' | 'ß' => 's',
    'ž' | 'ź' | 'ż' => 'z',
    'ł' => 'l',
    'đ' | 'ď' => 'd',
    'ř' => 'r',
    'ť' | 'ț' => 't',
    'ğ' => 'g',
    _ => ch,
  }
}

/// Lowercase alphanumeric slug joined by single dashes.
/// Used for content-derived question ids.
pub fn slug(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut last_was_dash = true;
  for ch in s.to_lowercase().chars() {
    let folded = fold_diacritic(ch);
    if folded.is_ascii_alphanumeric() {
      out.push(folded);
      last_was_dash = false;
    } else if !last_was_dash {
      out.push('-');
      last_was_dash = true;
    }
  }
  while out.ends_with('-') {
    out.pop();
  }
  out
}

/// Leading initials of a full name, folded and uppercased ("Lionel Messi" -> "LM").
pub fn name_initials(name: &str) -> String {
  name
    .split_whitespace()
    .filter_map(|w| w.chars().next())
    .map(|c| fold_diacritic(c.to_lowercase().next().unwrap_or(c)).to_ascii_uppercase())
    .collect()
}
