use std::path::Path;

use thicket_core::Language;

/// Resolve language from an explicit name, or from the file extension.
pub fn resolve_lang(explicit: Option<&str>, path: Option<&Path>) -> Option<Language> {
    if let Some(name) = explicit {
        return thicket_langs::from_name(name);
    }

    let ext = path?.extension()?.to_str()?;
    thicket_langs::from_ext(ext)
}

pub fn resolve_lang_required(name: &str) -> Result<Language, String> {
    thicket_langs::from_name(name).ok_or_else(|| format!("unknown language: '{name}'"))
}

/// Resolves the language or exits with a hint about what went wrong.
pub fn require_lang(explicit: Option<&str>, path: Option<&Path>, command: &str) -> Language {
    if let Some(name) = explicit {
        match resolve_lang_required(name) {
            Ok(language) => return language,
            Err(msg) => {
                eprintln!("error: {msg}");
                if let Some(suggestion) = suggest_language(name) {
                    eprintln!();
                    eprintln!("Did you mean '{suggestion}'?");
                }
                eprintln!();
                eprintln!("Run 'thicket langs' for the full list.");
                std::process::exit(1);
            }
        }
    }

    if let Some(language) = resolve_lang(None, path) {
        return language;
    }

    eprintln!("error: language is required for {command}");
    eprintln!();
    eprintln!("hint: use -l <language> to specify the language");
    std::process::exit(1);
}

/// Closest known language name within two edits.
pub fn suggest_language(input: &str) -> Option<String> {
    let input = input.to_lowercase();
    thicket_langs::all()
        .iter()
        .map(|language| (edit_distance(language.name(), &input), language.name()))
        .filter(|&(distance, _)| distance <= 2)
        .min_by_key(|&(distance, _)| distance)
        .map(|(_, name)| name.to_string())
}

pub(super) fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}

