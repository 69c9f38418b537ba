use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Text handed to a command plus the name it is reported under.
pub struct LoadedText {
    pub name: String,
    pub text: String,
}

/// Reads inline text, a file, or stdin when the path is `-`.
pub fn load_text(path: Option<&Path>, inline: Option<&str>, what: &str) -> Result<LoadedText, String> {
    if let Some(text) = inline {
        return Ok(LoadedText {
            name: "<inline>".to_string(),
            text: text.to_string(),
        });
    }

    let Some(path) = path else {
        return Err(format!("{what} is required"));
    };

    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        return Ok(LoadedText {
            name: "<stdin>".to_string(),
            text,
        });
    }

    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?;
    Ok(LoadedText {
        name: path.display().to_string(),
        text,
    })
}

/// Like [`load_text`], but prints the error and exits.
pub fn require_text(path: Option<&Path>, inline: Option<&str>, what: &str) -> LoadedText {
    load_text(path, inline, what).unwrap_or_else(|msg| {
        eprintln!("error: {msg}");
        std::process::exit(1);
    })
}
